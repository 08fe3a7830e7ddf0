use crate::client::{encode_path, sanitize_github_name, sanitize_url_value, GithubClient};
use crate::error::ToolError;

impl GithubClient {
    /// Raw-content URL of `path` on the configured default branch.
    pub fn raw_file_url(&self, owner: &str, repo: &str, path: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.raw_base_url(),
            owner,
            repo,
            encode_path(self.default_branch()),
            encode_path(path)
        )
    }

    /// Download a file over unauthenticated HTTP.
    ///
    /// HTTP failures are not errors: any status other than 200 comes back as
    /// `"Error fetching file: <status>"`. Only a request that never got a
    /// response fails.
    pub async fn fetch_raw_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<String, ToolError> {
        sanitize_github_name(owner, "owner")?;
        sanitize_github_name(repo, "repo")?;
        sanitize_url_value(path, "path")?;

        let url = self.raw_file_url(owner, repo, path);
        tracing::debug!(%url, "Fetching raw file");

        let response = self.http().get(&url).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::warn!(owner, repo, path, status = status.as_u16(), "Raw file fetch failed");
            return Ok(format!("Error fetching file: {}", status.as_u16()));
        }

        Ok(response.text().await?)
    }
}
