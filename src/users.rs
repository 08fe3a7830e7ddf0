use serde::Deserialize;

use crate::client::{sanitize_github_name, GithubClient};
use crate::error::ToolError;

pub const NO_BIO: &str = "No bio available for this user.";

#[derive(Debug, Deserialize)]
struct UserProfile {
    #[serde(default)]
    bio: Option<String>,
}

impl GithubClient {
    /// Bio of `username`, or [`NO_BIO`] when the profile has none.
    pub async fn user_bio(&self, username: &str) -> Result<String, ToolError> {
        sanitize_github_name(username, "username")?;

        let profile: UserProfile = self.get_json(&format!("/users/{}", username)).await?;
        Ok(profile
            .bio
            .filter(|bio| !bio.is_empty())
            .unwrap_or_else(|| NO_BIO.to_string()))
    }
}
