use serde::Serialize;

use crate::client::{parse_repo_name, GithubClient};
use crate::error::ToolError;
use crate::outcome::ActionOutcome;
use crate::pulls::HtmlUrl;

#[derive(Debug, Clone, Default)]
pub struct NewIssue {
    /// `owner/repo`
    pub repo_name: String,
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CreateIssue<'a> {
    title: &'a str,
    body: &'a str,
    labels: &'a [String],
    assignees: &'a [String],
}

impl GithubClient {
    /// Open an issue. Failures are reported in the outcome.
    pub async fn create_issue(&self, issue: &NewIssue) -> ActionOutcome {
        match self.open_issue(issue).await {
            Ok(url) => {
                tracing::info!(repo = %issue.repo_name, %url, "Created issue");
                ActionOutcome::success(url)
            }
            Err(e) => {
                tracing::warn!(repo = %issue.repo_name, error = %e, "Issue creation failed");
                ActionOutcome::from(e)
            }
        }
    }

    async fn open_issue(&self, issue: &NewIssue) -> Result<String, ToolError> {
        let (owner, repo) = parse_repo_name(&issue.repo_name)?;
        if issue.title.trim().is_empty() {
            return Err(ToolError::Validation("title must not be empty".to_string()));
        }

        let created: HtmlUrl = self
            .post_json(
                &format!("/repos/{}/{}/issues", owner, repo),
                &CreateIssue {
                    title: &issue.title,
                    body: &issue.body,
                    labels: &issue.labels,
                    assignees: &issue.assignees,
                },
            )
            .await?;
        Ok(created.html_url)
    }
}
