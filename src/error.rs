use thiserror::Error;

use crate::entity::EntityKind;

/// Longest response body excerpt kept in a status error
const BODY_EXCERPT_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GraphQL endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GraphQL errors: {0}")]
    GraphQl(String),

    #[error("Response has no `data.{0}` array")]
    MissingData(EntityKind),

    #[error("Record {index} of {kind} is not a JSON object")]
    NotAnObject { kind: EntityKind, index: usize },

    #[error("Column `{column}` required by table `{table}` is missing from fetched data")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("Failed to load table `{table}`: {source}")]
    Load {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown entity kind `{0}` (expected missions, rockets or launches)")]
    UnknownKind(String),
}

impl EtlError {
    /// Build a status error, keeping only the start of the body
    pub fn status(status: reqwest::StatusCode, body: &str) -> Self {
        let body = match body.char_indices().nth(BODY_EXCERPT_LEN) {
            Some((idx, _)) => format!("{}...", &body[..idx]),
            None => body.to_string(),
        };
        EtlError::Status { status, body }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
