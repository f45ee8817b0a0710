#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("remote request failed: {0}")]
    Remote(String),
    #[error("remote returned status {status} for {path}")]
    RemoteStatus { status: u16, path: String },
    #[error("failed to decode remote payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid value: {0}")]
    Value(#[from] desk_types::ValueError),
}

pub type DeskResult<T> = std::result::Result<T, DeskError>;
