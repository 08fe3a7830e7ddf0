use anyhow::Result;
use clap::Parser;
use mcp_github_tools::config::Cli;
use mcp_github_tools::server;
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let github = cli.build_client()?;

    tracing::info!(
        api_url = %cli.api_url,
        raw_url = github.raw_base_url(),
        default_branch = github.default_branch(),
        "Starting mcp-github-tools server"
    );

    let service = server::McpGithubToolsServer::new(github);
    let running = service.serve(stdio()).await?;
    running.waiting().await?;

    Ok(())
}
