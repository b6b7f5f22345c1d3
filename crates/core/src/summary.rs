use crate::{models::BuildStatuses, patch::scan_link_markdown};

/// Markdown table listing every job with its status and build scan link, in display order.
pub fn generate_scan_table(statuses: &BuildStatuses) -> String {
    let mut out = String::new();
    out.push_str("| Status | Name | Build scan |\n");
    out.push_str("| :-:  | --  | :-:  |\n");
    for build in statuses.builds() {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            build.status.emoji(),
            build.name,
            scan_link_markdown(&build.scan_link)
        ));
    }
    out
}
