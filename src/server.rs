use indexmap::IndexMap;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{schemars, tool, tool_handler, tool_router, ServerHandler};
use serde::Deserialize;

use crate::client::GithubClient;
use crate::error::ToolError;
use crate::issues::NewIssue;
use crate::pulls::{BranchPullRequest, DEFAULT_COMMIT_MESSAGE};

#[derive(Clone)]
pub struct McpGithubToolsServer {
    github: GithubClient,
    tool_router: ToolRouter<Self>,
}

// -- Tool parameter types --

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserParams {
    #[schemars(description = "GitHub username")]
    pub username: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TreeParams {
    #[schemars(description = "Repository owner (user or org)")]
    pub owner: String,

    #[schemars(description = "Repository name")]
    pub repo: String,

    #[schemars(description = "Directory to start from (empty for the repository root)")]
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FileParams {
    #[schemars(description = "Repository owner (user or org)")]
    pub owner: String,

    #[schemars(description = "Repository name")]
    pub repo: String,

    #[schemars(description = "File path within the repository")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreatePullRequestParams {
    #[schemars(description = "Repository in the form owner/repo")]
    pub repo_name: String,

    #[schemars(description = "Branch to branch off and merge into (e.g. main)")]
    pub base_branch: String,

    #[schemars(description = "Name of the branch to create")]
    pub new_branch: String,

    #[schemars(description = "Pull request title")]
    pub pr_title: String,

    #[schemars(description = "Pull request description")]
    #[serde(default)]
    pub pr_body: String,

    #[schemars(description = "Files to create or overwrite on the new branch, as {\"path\": \"content\"}")]
    #[serde(default)]
    pub files_to_commit: Option<IndexMap<String, String>>,

    #[schemars(description = "Commit message for the file changes (default: \"Initial commit on new branch\")")]
    #[serde(default)]
    pub commit_message: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateIssueParams {
    #[schemars(description = "Repository in the form owner/repo")]
    pub repo_name: String,

    #[schemars(description = "Issue title")]
    pub title: String,

    #[schemars(description = "Issue description")]
    #[serde(default)]
    pub body: Option<String>,

    #[schemars(description = "Label names to attach")]
    #[serde(default)]
    pub labels: Option<Vec<String>>,

    #[schemars(description = "GitHub usernames to assign")]
    #[serde(default)]
    pub assignees: Option<Vec<String>>,
}

impl From<CreatePullRequestParams> for BranchPullRequest {
    fn from(params: CreatePullRequestParams) -> Self {
        BranchPullRequest {
            repo_name: params.repo_name,
            base_branch: params.base_branch,
            new_branch: params.new_branch,
            title: params.pr_title,
            body: params.pr_body,
            files: params.files_to_commit.unwrap_or_default(),
            commit_message: params
                .commit_message
                .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string()),
        }
    }
}

impl From<CreateIssueParams> for NewIssue {
    fn from(params: CreateIssueParams) -> Self {
        NewIssue {
            repo_name: params.repo_name,
            title: params.title,
            body: params.body.unwrap_or_default(),
            labels: params.labels.unwrap_or_default(),
            assignees: params.assignees.unwrap_or_default(),
        }
    }
}

impl McpGithubToolsServer {
    pub fn new(github: GithubClient) -> Self {
        Self {
            github,
            tool_router: Self::tool_router(),
        }
    }

    fn err(&self, e: ToolError) -> ErrorData {
        e.to_mcp_error()
    }
}

// -- MCP tool handlers --

#[tool_router]
impl McpGithubToolsServer {
    #[tool(
        name = "get_user_bio",
        description = "Fetch the profile bio of a GitHub user"
    )]
    async fn get_user_bio(
        &self,
        Parameters(params): Parameters<UserParams>,
    ) -> Result<CallToolResult, ErrorData> {
        tracing::info!(username = %params.username, "get_user_bio");

        let bio = self
            .github
            .user_bio(&params.username)
            .await
            .map_err(|e| self.err(e))?;
        Ok(CallToolResult::success(vec![Content::text(bio)]))
    }

    #[tool(
        name = "get_github_files",
        description = "Recursively list all files and directories of a repository starting at a path. \
                       Directories are nested objects, files map to their path"
    )]
    async fn get_github_files(
        &self,
        Parameters(params): Parameters<TreeParams>,
    ) -> Result<CallToolResult, ErrorData> {
        tracing::info!(owner = %params.owner, repo = %params.repo, path = %params.path, "get_github_files");

        let tree = self
            .github
            .build_tree(&params.owner, &params.repo, &params.path)
            .await
            .map_err(|e| self.err(e))?;

        let text = serde_json::to_string_pretty(&tree).unwrap_or_else(|_| "{}".to_string());
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        name = "get_file_content",
        description = "Fetch the raw content of a file from a repository's default branch"
    )]
    async fn get_file_content(
        &self,
        Parameters(params): Parameters<FileParams>,
    ) -> Result<CallToolResult, ErrorData> {
        tracing::info!(owner = %params.owner, repo = %params.repo, path = %params.path, "get_file_content");

        let text = self
            .github
            .fetch_raw_file(&params.owner, &params.repo, &params.path)
            .await
            .map_err(|e| self.err(e))?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        name = "create_pull_request_with_branch",
        description = "Create a new branch from a base branch, optionally commit files to it, \
                       and open a pull request back into the base branch"
    )]
    async fn create_pull_request_with_branch(
        &self,
        Parameters(params): Parameters<CreatePullRequestParams>,
    ) -> Result<CallToolResult, ErrorData> {
        tracing::info!(
            repo = %params.repo_name,
            base = %params.base_branch,
            head = %params.new_branch,
            files = params.files_to_commit.as_ref().map(|f| f.len()).unwrap_or(0),
            "create_pull_request_with_branch"
        );

        let outcome = self
            .github
            .create_branch_pull_request(&params.into())
            .await;
        Ok(CallToolResult::success(vec![Content::text(outcome.to_json())]))
    }

    #[tool(
        name = "create_github_issue",
        description = "Create an issue with optional body, labels, and assignees"
    )]
    async fn create_github_issue(
        &self,
        Parameters(params): Parameters<CreateIssueParams>,
    ) -> Result<CallToolResult, ErrorData> {
        tracing::info!(repo = %params.repo_name, title = %params.title, "create_github_issue");

        let outcome = self.github.create_issue(&params.into()).await;
        Ok(CallToolResult::success(vec![Content::text(outcome.to_json())]))
    }
}

#[tool_handler]
impl ServerHandler for McpGithubToolsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mcp-github-tools".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "GitHub tools. Use get_user_bio for profile bios, get_github_files to list a \
                 repository tree, get_file_content to read a file, \
                 create_pull_request_with_branch to branch, commit and open a PR, \
                 and create_github_issue to file issues. Write tools answer with \
                 {\"success\": true, \"url\"} or {\"success\": false, \"error\"}."
                    .to_string(),
            ),
        }
    }
}
