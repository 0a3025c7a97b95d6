use thiserror::Error;

#[derive(Error, Debug)]
pub enum JurnalError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load {list}: {source}")]
    RuleLoad {
        list: &'static str,
        #[source]
        source: Box<JurnalError>,
    },

    #[error("Unknown batch: {0}")]
    UnknownBatch(i64),

    #[error("Invalid batch status: {0}")]
    InvalidStatus(String),

    #[error("Unknown tax type: {0}")]
    InvalidTaxType(String),

    #[error("Unknown correction tag: {0}")]
    InvalidTag(String),

    #[error("Unknown tax keyword category: {0}")]
    InvalidCategory(String),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, JurnalError>;
