use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ToolError;

pub const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_BRANCH: &str = "main";

/// Long-lived handle shared by every tool call.
///
/// Holds the authenticated octocrab client for REST calls and a plain reqwest
/// client for unauthenticated raw-content downloads. Nothing in here is
/// mutated after construction.
#[derive(Clone)]
pub struct GithubClient {
    api: Arc<octocrab::Octocrab>,
    http: reqwest::Client,
    raw_base_url: String,
    default_branch: String,
}

impl GithubClient {
    pub fn new(api: octocrab::Octocrab) -> Result<Self, ToolError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("mcp-github-tools/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ToolError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            api: Arc::new(api),
            http,
            raw_base_url: DEFAULT_RAW_URL.to_string(),
            default_branch: DEFAULT_BRANCH.to_string(),
        })
    }

    pub fn with_raw_base_url(mut self, url: impl Into<String>) -> Self {
        self.raw_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }

    pub fn raw_base_url(&self) -> &str {
        &self.raw_base_url
    }

    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, route: &str) -> Result<T, ToolError> {
        tracing::debug!(route, "GET");
        Ok(self.api.get(route, None::<&()>).await?)
    }

    pub(crate) async fn post_json<B, T>(&self, route: &str, body: &B) -> Result<T, ToolError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(route, "POST");
        Ok(self.api.post(route, Some(body)).await?)
    }

    pub(crate) async fn put_json<B, T>(&self, route: &str, body: &B) -> Result<T, ToolError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(route, "PUT");
        Ok(self.api.put(route, Some(body)).await?)
    }
}

/// Check an owner, repo or username before it becomes a single segment of
/// a `/repos/...` or `/users/...` route.
pub fn sanitize_github_name(name: &str, field: &str) -> Result<(), ToolError> {
    if name.is_empty() {
        return Err(ToolError::Validation(format!("{} must not be empty", field)));
    }
    for ch in ['/', '?', '#', '%', '\0', ' ', '\n', '\t'] {
        if name.contains(ch) {
            return Err(ToolError::Validation(format!(
                "{} contains invalid character '{}'",
                field,
                ch.escape_default()
            )));
        }
    }
    Ok(())
}

/// Check a file path or branch name bound for the contents, branches or
/// raw-content URLs. Slashes pass through (`docs/intro.md`, `feature/x`);
/// query and fragment delimiters do not.
pub fn sanitize_url_value(value: &str, field: &str) -> Result<(), ToolError> {
    if value.is_empty() {
        return Err(ToolError::Validation(format!("{} must not be empty", field)));
    }
    for ch in ['?', '#', '&', '\0', '\n', '\r', '\t'] {
        if value.contains(ch) {
            return Err(ToolError::Validation(format!(
                "{} contains invalid character",
                field
            )));
        }
    }
    Ok(())
}

/// Split `owner/repo` into its two halves.
pub fn parse_repo_name(full_name: &str) -> Result<(String, String), ToolError> {
    let (owner, repo) = full_name.split_once('/').ok_or_else(|| {
        ToolError::Validation(format!(
            "repo_name must be in the form owner/repo, got '{}'",
            full_name
        ))
    })?;
    sanitize_github_name(owner, "owner")?;
    sanitize_github_name(repo, "repo")?;
    Ok((owner.to_string(), repo.to_string()))
}

/// Percent-encode each segment of a repository path, keeping the separators.
pub fn encode_path(path: &str) -> String {
    path.trim_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Route of the contents API for `path`; an empty path addresses the repository root.
pub fn contents_route(owner: &str, repo: &str, path: &str) -> String {
    let path = path.trim_matches('/');
    if path.is_empty() {
        format!("/repos/{}/{}/contents", owner, repo)
    } else {
        format!("/repos/{}/{}/contents/{}", owner, repo, encode_path(path))
    }
}
