//! Keeping a single marker-tagged comment on a pull request.

use anyhow::{Context, Result, ensure};

use crate::api::RemoteApi;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MaintainOutcome {
    Created { comment_id: u64 },
    Updated { comment_id: u64 },
}

pub fn marked_body(body: &str, marker: &str) -> String { format!("{body}\n\n{marker}") }

/// Creates the comment tagged with `marker`, or replaces the body of the existing one.
///
/// The existing comment is always rewritten, even when its content is already up to date.
pub async fn maintain_one_comment(
    api: &dyn RemoteApi,
    number: u64,
    body: &str,
    marker: &str,
) -> Result<MaintainOutcome> {
    ensure!(!marker.is_empty(), "Comment marker must not be empty");
    let pull_request = api.pull_request(number).await?;
    let comments = api
        .list_comments(pull_request.number, None)
        .await
        .with_context(|| format!("Failed to list comments of pull request #{number}"))?;
    let marked_body = marked_body(body, marker);
    match comments.iter().find(|comment| comment.body.contains(marker)) {
        Some(comment) => {
            api.update_comment(comment.id, &marked_body).await?;
            tracing::info!("Updated comment {} on pull request #{}", comment.id, number);
            Ok(MaintainOutcome::Updated { comment_id: comment.id })
        }
        None => {
            let comment = api.create_comment(pull_request.number, &marked_body).await?;
            tracing::info!("Created comment {} on pull request #{}", comment.id, number);
            Ok(MaintainOutcome::Created { comment_id: comment.id })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{Call, FakeRemote, comment};

    const MARKER: &str = "<!-- dependency-report -->";

    fn marked_comments(api: &FakeRemote) -> Vec<String> {
        api.state()
            .comments
            .iter()
            .filter(|c| c.body.contains(MARKER))
            .map(|c| c.body.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_creates_comment() {
        let api = FakeRemote::new(|state| {
            state.pull_requests = vec![5];
            state.comments = vec![comment(1, "Hello", 0)];
        });
        let outcome = maintain_one_comment(&api, 5, "Report", MARKER).await.unwrap();
        let MaintainOutcome::Created { comment_id } = outcome else {
            panic!("Expected a new comment, got {outcome:?}");
        };
        assert_eq!(api.comment_body(comment_id).unwrap(), format!("Report\n\n{MARKER}"));
        assert_eq!(api.comment_body(1).unwrap(), "Hello");
    }

    #[tokio::test]
    async fn test_updates_first_marked_comment() {
        let api = FakeRemote::new(|state| {
            state.pull_requests = vec![5];
            state.comments = vec![
                comment(1, "Hello", 0),
                comment(2, &format!("Old report\n\n{MARKER}"), 1),
                comment(3, &format!("Stray copy\n\n{MARKER}"), 2),
            ];
        });
        let outcome = maintain_one_comment(&api, 5, "New report", MARKER).await.unwrap();
        assert_eq!(outcome, MaintainOutcome::Updated { comment_id: 2 });
        assert_eq!(api.comment_body(2).unwrap(), format!("New report\n\n{MARKER}"));
        assert_eq!(api.comment_body(3).unwrap(), format!("Stray copy\n\n{MARKER}"));
    }

    #[tokio::test]
    async fn test_twice_keeps_single_comment() {
        let api = FakeRemote::new(|state| state.pull_requests = vec![5]);
        let first = maintain_one_comment(&api, 5, "Report", MARKER).await.unwrap();
        let second = maintain_one_comment(&api, 5, "Report", MARKER).await.unwrap();
        let MaintainOutcome::Created { comment_id } = first else {
            panic!("Expected a new comment, got {first:?}");
        };
        assert_eq!(second, MaintainOutcome::Updated { comment_id });
        assert_eq!(marked_comments(&api), vec![format!("Report\n\n{MARKER}")]);
        // Unchanged content is still written
        assert_eq!(api.writes(), vec![Call::CreateComment(5), Call::UpdateComment(comment_id)]);
    }

    #[tokio::test]
    async fn test_lists_full_history() {
        let api = FakeRemote::new(|state| state.pull_requests = vec![5]);
        maintain_one_comment(&api, 5, "Report", MARKER).await.unwrap();
        assert_eq!(api.calls()[..2], [Call::PullRequest(5), Call::ListComments(5, None)]);
    }

    #[tokio::test]
    async fn test_errors() {
        let api = FakeRemote::new(|state| state.pull_requests = vec![5]);
        assert!(maintain_one_comment(&api, 5, "Report", "").await.is_err());
        assert!(maintain_one_comment(&api, 6, "Report", MARKER).await.is_err());
        assert!(api.writes().is_empty());

        let api = FakeRemote::new(|state| {
            state.pull_requests = vec![5];
            state.fail_list_comments = true;
        });
        assert!(maintain_one_comment(&api, 5, "Report", MARKER).await.is_err());
        assert!(api.writes().is_empty());
    }
}
