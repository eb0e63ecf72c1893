//! Error types shared by loading, placement and reporting
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PermError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{}:{}: {}", .path.display(), .line, .message)]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// No chromosome in the genome is wide enough to hold the span
    #[error("cannot place {chrom}:{start}-{stop} ({width}bp) anywhere in the genome")]
    InvalidPlacement {
        chrom: String,
        start: u64,
        stop: u64,
        width: u64,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PermError>;
