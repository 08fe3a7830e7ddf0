//! MCP server exposing a handful of GitHub tools to LLM hosts.
//!
//! Provides user bio lookup, recursive repository tree listing, raw file
//! download, branch + pull request creation, and issue creation.

pub mod client;
pub mod config;
pub mod content;
pub mod error;
pub mod issues;
pub mod outcome;
pub mod pulls;
pub mod server;
pub mod tree;
pub mod users;
