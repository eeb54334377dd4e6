use wikinav_types::TextError;

#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected HTTP status {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("encyclopedia API error ({code}): {info}")]
    Api { code: String, info: String },
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<TextError> for NavError {
    fn from(err: TextError) -> Self {
        NavError::InvalidInput(err.to_string())
    }
}

impl NavError {
    /// Short text suitable for the inline message slot of the UI.
    pub fn user_message(&self) -> String {
        match self {
            NavError::InvalidInput(msg) => msg.clone(),
            NavError::Api { info, .. } => info.clone(),
            NavError::Transport(err) if err.is_timeout() => "The request timed out.".into(),
            NavError::Transport(_) | NavError::Status { .. } => {
                "Could not reach the server.".into()
            }
            NavError::Decode(_) | NavError::UnexpectedShape(_) => {
                "The server sent an unexpected response.".into()
            }
            NavError::Config(msg) => msg.clone(),
            NavError::Url(err) => err.to_string(),
        }
    }
}

pub type NavResult<T> = std::result::Result<T, NavError>;
