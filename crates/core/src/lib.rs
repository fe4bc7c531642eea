//! # ppt-preview-core
//!
//! Presentation to slide-image conversion.
//!
//! The pipeline shells out for everything format-specific:
//!
//! - **LibreOffice** exports the presentation to PDF
//! - **pdfinfo** counts the pages
//! - **pdftoppm** rasterizes the pages at 300 DPI, one process per page range,
//!   several ranges at a time
//! - the rasterized pages are reassembled in page order, scaled to fit a
//!   bounding box and written as `slide-<index>.png`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ppt_preview_core::{Converter, ConverterConfig, ConversionRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let converter = Converter::new(ConverterConfig::default())?;
//!
//!     let request = ConversionRequest::new("deck.pptx", "./ppt-preview");
//!     let result = converter.convert(request).await?;
//!
//!     println!("Wrote {} slides", result.page_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Rasterizing a PDF directly
//!
//! ```rust,no_run
//! use ppt_preview_core::{RangeRasterizer, RasterConfig, ThinLineMode};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RasterConfig::default()
//!         .num_threads(4)
//!         .thin_line_mode(ThinLineMode::None);
//!     let rasterizer = RangeRasterizer::new(config)?;
//!
//!     let bytes = std::fs::read("deck.pdf")?;
//!     for page in rasterizer.rasterize_bytes(&bytes).await? {
//!         println!("page {}: {}x{}", page.page_number, page.image.width(), page.image.height());
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod office;
pub mod planner;
pub mod poppler;
pub mod rasterizer;
pub mod resize;
pub mod tools;

// Re-export main types for convenience
pub use config::{
    BatchResult, ConversionRequest, ConverterConfig, FailedFile, FileResult, OfficeConfig,
    RasterConfig, ResizeConfig, ThinLineMode,
};
pub use converter::{Converter, ConverterBuilder};
pub use error::{ConversionError, Result};
pub use office::OfficeConverter;
pub use planner::{plan_ranges, PageRange};
pub use poppler::Poppler;
pub use rasterizer::{RangeBackend, RangeRasterizer, RasterJob, RasterizedPage};
pub use resize::Resizer;

/// Supported presentation file extensions.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pptx", "ppt", "ppsx", "pps", "odp"];

/// Check if a file extension is supported.
pub fn is_supported_extension(ext: &str) -> bool {
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|&e| e.eq_ignore_ascii_case(ext))
}

/// Initialize the library's logging.
/// Call this once at application startup if you want to see logs.
/// Falls back to `info` when `RUST_LOG` is unset.
pub fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
