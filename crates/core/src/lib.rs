pub mod commands;
pub mod config;
pub mod models;
pub mod patch;
pub mod summary;

/// Marker embedded in the report comment posted for a workflow run, tying it back to the run.
pub fn workflow_run_marker(tool_id: &str, run_id: u64) -> String {
    format!("<!-- {tool_id}/workflow-run-id:{run_id} -->")
}

#[cfg(test)]
mod tests {
    use super::workflow_run_marker;

    #[test]
    fn test_workflow_run_marker() {
        assert_eq!(
            workflow_run_marker("Quarkus-GitHub-Bot", 4242),
            "<!-- Quarkus-GitHub-Bot/workflow-run-id:4242 -->"
        );
    }
}
