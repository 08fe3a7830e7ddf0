//! Branch + pull request creation.
//!
//! Steps run strictly in order and stop at the first failure: resolve the
//! base branch head, create the new ref, commit each file onto it, open the
//! pull request. Work already done on GitHub is left in place when a later
//! step fails.

use base64::Engine;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::client::{contents_route, encode_path, parse_repo_name, sanitize_url_value, GithubClient};
use crate::error::ToolError;
use crate::outcome::ActionOutcome;

pub const DEFAULT_COMMIT_MESSAGE: &str = "Initial commit on new branch";

#[derive(Debug, Clone)]
pub struct BranchPullRequest {
    /// `owner/repo`
    pub repo_name: String,
    pub base_branch: String,
    pub new_branch: String,
    pub title: String,
    pub body: String,
    /// Path to file content; committed in the caller's order.
    pub files: IndexMap<String, String>,
    pub commit_message: String,
}

#[derive(Debug, thiserror::Error)]
enum PullRequestError {
    #[error(transparent)]
    Api(#[from] ToolError),

    #[error("File commit failed: {source}")]
    FileCommit { path: String, source: ToolError },
}

#[derive(Debug, Deserialize)]
struct BranchHead {
    commit: CommitSha,
}

#[derive(Debug, Deserialize)]
struct CommitSha {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ExistingFile {
    sha: String,
}

#[derive(Debug, Serialize)]
struct CreateRef<'a> {
    #[serde(rename = "ref")]
    git_ref: String,
    sha: &'a str,
}

#[derive(Debug, Serialize)]
struct PutFile<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreatePull<'a> {
    title: &'a str,
    body: &'a str,
    head: &'a str,
    base: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HtmlUrl {
    pub html_url: String,
}

impl GithubClient {
    /// Create `new_branch` from `base_branch`, commit the given files onto it
    /// and open a pull request back into `base_branch`.
    ///
    /// Never returns an error; failures are reported in the outcome.
    pub async fn create_branch_pull_request(&self, request: &BranchPullRequest) -> ActionOutcome {
        match self.open_branch_pull_request(request).await {
            Ok(url) => {
                tracing::info!(repo = %request.repo_name, head = %request.new_branch, %url, "Opened pull request");
                ActionOutcome::success(url)
            }
            Err(e) => {
                if let PullRequestError::FileCommit { path, .. } = &e {
                    tracing::warn!(repo = %request.repo_name, %path, "File commit failed");
                }
                tracing::warn!(repo = %request.repo_name, error = %e, "Pull request creation failed");
                ActionOutcome::failure(e.to_string())
            }
        }
    }

    async fn open_branch_pull_request(
        &self,
        request: &BranchPullRequest,
    ) -> Result<String, PullRequestError> {
        let (owner, repo) = parse_repo_name(&request.repo_name)?;
        sanitize_url_value(&request.base_branch, "base_branch")?;
        sanitize_url_value(&request.new_branch, "new_branch")?;

        let base: BranchHead = self
            .get_json(&format!(
                "/repos/{}/{}/branches/{}",
                owner,
                repo,
                encode_path(&request.base_branch)
            ))
            .await?;

        let _: serde_json::Value = self
            .post_json(
                &format!("/repos/{}/{}/git/refs", owner, repo),
                &CreateRef {
                    git_ref: format!("refs/heads/{}", request.new_branch),
                    sha: &base.commit.sha,
                },
            )
            .await?;
        tracing::debug!(%owner, %repo, branch = %request.new_branch, sha = %base.commit.sha, "Created branch");

        for (path, content) in &request.files {
            self.commit_file(&owner, &repo, &request.new_branch, path, content, &request.commit_message)
                .await
                .map_err(|source| PullRequestError::FileCommit {
                    path: path.clone(),
                    source,
                })?;
        }

        let pull: HtmlUrl = self
            .post_json(
                &format!("/repos/{}/{}/pulls", owner, repo),
                &CreatePull {
                    title: &request.title,
                    body: &request.body,
                    head: &request.new_branch,
                    base: &request.base_branch,
                },
            )
            .await?;
        Ok(pull.html_url)
    }

    /// Create or overwrite `path` on `branch`.
    async fn commit_file(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), ToolError> {
        sanitize_url_value(path, "file path")?;
        let route = contents_route(owner, repo, path);

        let existing = match self
            .get_json::<ExistingFile>(&format!("{}?ref={}", route, urlencoding::encode(branch)))
            .await
        {
            Ok(file) => Some(file.sha),
            Err(ToolError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };

        let _: serde_json::Value = self
            .put_json(
                &route,
                &PutFile {
                    message,
                    content: base64::engine::general_purpose::STANDARD.encode(content),
                    branch,
                    sha: existing,
                },
            )
            .await?;
        tracing::debug!(owner, repo, branch, path, "Committed file");
        Ok(())
    }
}
