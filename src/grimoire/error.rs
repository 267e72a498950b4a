use thiserror::Error;

#[derive(Error, Debug)]
pub enum GrimoireError {
    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    /// The import payload was not valid JSON or not a JSON object.
    #[error("Malformed import: {0}")]
    MalformedImport(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, GrimoireError>;
