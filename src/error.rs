use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The outline is structurally unusable (not JSON, no `sections` array).
    /// Field-level problems are repaired during ingest and never reach this variant.
    #[error("Invalid outline: {0}")]
    InvalidOutline(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The PDF backend could not produce a valid document. Never retried.
    #[error("Render error: {0}")]
    Render(String),
}
