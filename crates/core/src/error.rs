//! Error types for ppt-preview conversion.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the ppt-preview library.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// A required external tool is not installed or not found in PATH.
    #[error("'{tool}' not found. Please install {package} and ensure '{tool}' is in PATH")]
    ToolNotFound {
        tool: &'static str,
        package: &'static str,
    },

    /// An external process could not be spawned.
    #[error("Failed to start '{program}': {source}")]
    ProcessStartFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// An external process exited with a non-zero status.
    #[error("'{program}' exited with {}: {stderr}", display_code(.code))]
    SubprocessFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// LibreOffice did not produce a PDF.
    #[error("LibreOffice conversion failed for '{path}': {message}")]
    ConversionFailed { path: PathBuf, message: String },

    /// LibreOffice process timed out.
    #[error("LibreOffice conversion timed out after {timeout_secs} seconds for '{path}'")]
    Timeout { path: PathBuf, timeout_secs: u64 },

    /// Input file not found.
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// Unsupported file format.
    #[error("Unsupported file format: {extension}. Supported: .ppt, .pptx, .pps, .ppsx, .odp")]
    UnsupportedFormat { extension: String },

    /// pdfinfo output had no usable `Pages:` line.
    #[error("Unable to determine number of pages for '{path}'")]
    PageCount { path: PathBuf },

    /// A rasterizer output file does not end in `-<page>.png`.
    #[error("Rasterizer output '{path}' does not end in '-<page>.png'")]
    MalformedPageFilename { path: PathBuf },

    /// The rasterized page numbers do not match the document's pages.
    #[error("Expected pages 1..={expected}, rasterizer produced {found:?}")]
    PageSetMismatch { expected: usize, found: Vec<usize> },

    /// A rasterized page could not be decoded.
    #[error("Failed to decode image '{path}': {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    PngEncodingError(String),

    /// Output directory creation or write failed.
    #[error("Failed to write output '{path}': {message}")]
    OutputDirError { path: PathBuf, message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A worker task panicked or was cancelled.
    #[error("Worker task failed: {0}")]
    TaskFailed(String),

    /// Generic I/O failure on temporary files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (killed by signal)".to_string(),
    }
}

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, ConversionError>;

impl From<tokio::task::JoinError> for ConversionError {
    fn from(err: tokio::task::JoinError) -> Self {
        ConversionError::TaskFailed(err.to_string())
    }
}
