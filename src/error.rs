use std::io;

use thiserror::Error;

/// Error type for SRU transport, response parsing, extraction, and cache
/// persistence failures. Classification never produces one of these.
#[derive(Debug, Error)]
pub enum KamerstukError {
    #[error("non-success status {status} from SRU endpoint for query {query}")]
    Transport { status: u16, query: String },
    #[error("malformed SRU response: {0}")]
    Protocol(String),
    #[error("no records found for dossiernummer {dossiernummer}, ondernummer {ondernummer}")]
    NotFound {
        dossiernummer: String,
        ondernummer: String,
    },
    #[error("record is missing mandatory field '{0}'")]
    MissingField(&'static str),
    #[error("record has unrecognized product-area '{0}'")]
    UnknownProductArea(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("failed to parse response XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("failed to serialize cache: {0}")]
    Json(#[from] serde_json::Error),
}
