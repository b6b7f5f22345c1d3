/// Placeholder the report uses for a build scan that isn't available yet.
pub const PENDING_PLACEHOLDER: &str = ":construction:";

pub fn scan_link_markdown(link: &str) -> String { format!("[:mag:]({link})") }

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Patched {
    pub body: String,
    pub changed: bool,
}

/// Replaces the pending placeholder on every table row naming a job in `scan_links`.
///
/// A row matches a job when it contains the cell `| {name} |`. Jobs are tried in the given
/// order and only the first matching job is applied to a row. Rows without a match, and all
/// line endings, are kept byte for byte, so `changed` is only set when a placeholder was
/// actually replaced.
pub fn patch_body(body: &str, scan_links: &[(&str, &str)]) -> Patched {
    let cells = scan_links
        .iter()
        .map(|&(name, link)| (format!("| {name} |"), scan_link_markdown(link)))
        .collect::<Vec<_>>();
    let mut out = String::with_capacity(body.len());
    for line in body.split_inclusive('\n') {
        let (content, ending) = split_line_ending(line);
        match cells.iter().find(|(cell, _)| content.contains(cell.as_str())) {
            Some((_, link)) => {
                out.push_str(&content.replace(PENDING_PLACEHOLDER, link));
                out.push_str(ending);
            }
            None => out.push_str(line),
        }
    }
    let changed = out != body;
    Patched { body: out, changed }
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}
