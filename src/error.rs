use rmcp::model::ErrorData;

/// Classified failure of a GitHub call or of local parameter checks.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("GitHub unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid request: {0}")]
    Validation(String),
}

impl ToolError {
    /// Classify an HTTP error status returned by GitHub.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            format!("HTTP {}", status)
        } else {
            format!("{} (HTTP {})", message, status)
        };
        match status {
            404 => ToolError::NotFound(message),
            401 | 403 => ToolError::Unauthorized(message),
            400 | 409 | 422 => ToolError::Validation(message),
            _ => ToolError::Unavailable(message),
        }
    }

    pub fn to_mcp_error(&self) -> ErrorData {
        match self {
            ToolError::NotFound(_) | ToolError::Unauthorized(_) | ToolError::Validation(_) => {
                ErrorData::invalid_params(self.to_string(), None)
            }
            ToolError::Unavailable(_) => ErrorData::internal_error(self.to_string(), None),
        }
    }
}

impl From<octocrab::Error> for ToolError {
    fn from(e: octocrab::Error) -> Self {
        match e {
            octocrab::Error::GitHub { source, .. } => {
                ToolError::from_status(source.status_code.as_u16(), source.message.clone())
            }
            other => ToolError::Unavailable(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => ToolError::from_status(status.as_u16(), e.to_string()),
            None => ToolError::Unavailable(e.to_string()),
        }
    }
}
