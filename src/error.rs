use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlackNotifError {
    #[error("Slack API error: {0}")]
    SlackApi(String),

    #[error("Directory lookup failed for {id}: {reason}")]
    Directory { id: String, reason: String },

    #[error("Malformed stream frame: {0}")]
    MalformedFrame(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl SlackNotifError {
    pub fn directory(id: impl Into<String>, reason: impl ToString) -> Self {
        Self::Directory {
            id: id.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SlackNotifError>;
