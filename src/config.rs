use anyhow::Result;
use clap::Parser;
use octocrab::service::middleware::retry::RetryConfig;

use crate::client::{GithubClient, DEFAULT_BRANCH, DEFAULT_RAW_URL};

pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// MCP server exposing GitHub tools: user bios, repository trees, raw files,
/// branch pull requests, and issues
#[derive(Debug, Parser)]
#[command(name = "mcp-github-tools", version, about)]
pub struct Cli {
    /// GitHub personal access token.
    /// Can also be set via GITHUB_TOKEN environment variable.
    #[arg(long)]
    pub token: Option<String>,

    /// Read GitHub token from an environment variable.
    /// Default: GITHUB_TOKEN
    #[arg(long = "token-env")]
    pub token_env: Option<String>,

    /// GitHub REST API base URL
    #[arg(long = "api-url", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Base URL for raw file downloads
    #[arg(long = "raw-url", default_value = DEFAULT_RAW_URL)]
    pub raw_url: String,

    /// Branch used when downloading raw files
    #[arg(long = "default-branch", default_value = DEFAULT_BRANCH)]
    pub default_branch: String,
}

impl Cli {
    /// Resolve token: --token > --token-env > GITHUB_TOKEN
    pub fn resolve_token(&self) -> Option<String> {
        self.resolve_token_with(|name| std::env::var(name).ok())
    }

    fn resolve_token_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        if let Some(t) = self.token.as_ref().filter(|t| !t.is_empty()) {
            return Some(t.clone());
        }
        let env_name = self.token_env.as_deref().unwrap_or(DEFAULT_TOKEN_ENV);
        match lookup(env_name) {
            Some(t) if !t.is_empty() => {
                tracing::info!(env = env_name, "Read GitHub token from environment variable");
                Some(t)
            }
            _ => None,
        }
    }

    /// Build the shared client from the parsed options.
    pub fn build_client(&self) -> Result<GithubClient> {
        let token = self.resolve_token();

        let mut builder = octocrab::OctocrabBuilder::new()
            .base_uri(self.api_url.as_str())
            .map_err(|e| anyhow::anyhow!("Invalid --api-url {}: {}", self.api_url, e))?
            .add_retry_config(RetryConfig::None);
        if let Some(t) = token {
            builder = builder.personal_token(t);
        } else {
            tracing::warn!("No GitHub token provided, API rate limits will be very restrictive");
        }
        let api = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create GitHub client: {}", e))?;

        let client = GithubClient::new(api)?
            .with_raw_base_url(self.raw_url.as_str())
            .with_default_branch(self.default_branch.as_str());
        Ok(client)
    }
}
