pub mod inject_build_scans;
pub mod maintain_one_comment;
