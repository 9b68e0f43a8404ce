use std::path::PathBuf;
use thiserror::Error;

use crate::pdf::crop::CropStage;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Input file is missing, not a file, or has the wrong extension.
    #[error("Invalid path {}: {reason}", .path.display())]
    InvalidPath { path: PathBuf, reason: &'static str },

    #[error("Output directory does not exist: {}", .0.display())]
    InvalidOutputDirectory(PathBuf),

    /// Nothing was extracted, or nothing would be left to write.
    #[error("Nothing to write: {0}")]
    EmptyContent(&'static str),

    #[error("Malformed page filter {token:?}: {reason}")]
    MalformedFilter { token: String, reason: &'static str },

    #[error("No pages selected for removal")]
    EmptyFilter,

    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: u32, total: u32 },

    #[error("Cannot {operation} while the document is {stage}")]
    InvalidState {
        operation: &'static str,
        stage: CropStage,
    },

    #[error("{0}")]
    Argument(String),

    #[error("Document is encrypted and no password was given")]
    PasswordRequired,

    #[error("Incorrect password for encrypted document")]
    InvalidPassword,

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
