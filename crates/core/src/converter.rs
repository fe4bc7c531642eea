//! Main converter that ties together LibreOffice export, range rasterization
//! and the resize pass.

use crate::config::{
    BatchResult, ConversionRequest, ConverterConfig, FailedFile, FileResult,
};
use crate::error::Result;
use crate::office::OfficeConverter;
use crate::poppler::Poppler;
use crate::rasterizer::{RangeBackend, RangeRasterizer};
use crate::resize::Resizer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Converts presentations into resized slide PNGs.
pub struct Converter<B = Poppler> {
    office: OfficeConverter,
    rasterizer: RangeRasterizer<B>,
    resizer: Arc<Resizer>,
    config: ConverterConfig,
}

impl Converter<Poppler> {
    /// Create a new converter, locating soffice, pdfinfo and pdftoppm.
    pub fn new(config: ConverterConfig) -> Result<Self> {
        config.validate()?;

        info!(
            "Initializing converter with threads={}, dpi={}, bounds={}x{}",
            config.raster.num_threads,
            config.raster.dpi,
            config.resize.max_width,
            config.resize.max_height
        );

        let office = OfficeConverter::new(config.office.clone())?;
        let rasterizer = RangeRasterizer::new(config.raster.clone())?;
        let resizer = Resizer::new(config.resize.clone())?;

        Ok(Self {
            office,
            rasterizer,
            resizer: Arc::new(resizer),
            config,
        })
    }
}

impl<B: RangeBackend> Converter<B> {
    /// Create a converter with a custom rasterizer backend.
    pub fn with_backend(config: ConverterConfig, backend: B) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            office: OfficeConverter::new(config.office.clone())?,
            rasterizer: RangeRasterizer::with_backend(backend, config.raster.clone())?,
            resizer: Arc::new(Resizer::new(config.resize.clone())?),
            config,
        })
    }

    /// Convert one presentation into `slide-<index>.png` files.
    pub async fn convert(&self, request: ConversionRequest) -> Result<FileResult> {
        let start = Instant::now();
        let input_path = request.input_path.clone();

        info!("Converting {:?}", input_path);

        debug!("Stage 1: Exporting to PDF");
        let pdf = self.office.convert_to_pdf(&request.input_path).await?;
        let pdf_bytes = tokio::fs::read(pdf.path()).await?;
        drop(pdf);

        debug!("Stage 2: Rasterizing {} bytes of PDF", pdf_bytes.len());
        let pages = self.rasterizer.rasterize_bytes(&pdf_bytes).await?;

        debug!("Stage 3: Resizing {} pages", pages.len());
        let resizer = Arc::clone(&self.resizer);
        let output_dir = request.output_dir.clone();
        let output_paths: Vec<PathBuf> = tokio::task::spawn_blocking(move || {
            resizer.resize_and_save_all(&pages, &output_dir)
        })
        .await??;

        info!(
            "Converted {:?} to {} slides in {:?}",
            input_path,
            output_paths.len(),
            start.elapsed()
        );

        Ok(FileResult {
            input_path,
            page_count: output_paths.len(),
            output_paths,
            duration: start.elapsed(),
        })
    }

    /// Convert several presentations one after another. A failure is recorded
    /// and the batch moves on to the next file.
    pub async fn convert_batch(&self, requests: Vec<ConversionRequest>) -> BatchResult {
        let start = Instant::now();
        let mut successful = Vec::new();
        let mut failed = Vec::new();
        let mut total_pages = 0;

        for request in requests {
            let input_path = request.input_path.clone();
            match self.convert(request).await {
                Ok(result) => {
                    total_pages += result.page_count;
                    successful.push(result);
                }
                Err(e) => {
                    error!("Failed to convert {:?}: {}", input_path, e);
                    failed.push(FailedFile {
                        input_path,
                        error: e.to_string(),
                    });
                }
            }
        }

        BatchResult {
            successful,
            failed,
            total_duration: start.elapsed(),
            total_pages,
        }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }
}

/// Builder for creating a Converter with custom settings.
pub struct ConverterBuilder {
    config: ConverterConfig,
}

impl ConverterBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ConverterConfig::default(),
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Set the number of concurrent rasterizer processes.
    pub fn threads(mut self, threads: usize) -> Self {
        self.config.raster.num_threads = threads;
        self
    }

    /// Set the rasterization DPI.
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.raster.dpi = dpi;
        self
    }

    /// Set the thin-line mode.
    pub fn thin_line_mode(mut self, mode: crate::config::ThinLineMode) -> Self {
        self.config.raster.thin_line_mode = mode;
        self
    }

    /// Set the slide bounding box.
    pub fn max_size(mut self, max_width: u32, max_height: u32) -> Self {
        self.config.resize.max_width = max_width;
        self.config.resize.max_height = max_height;
        self
    }

    /// Set the number of resize workers.
    pub fn resize_workers(mut self, workers: usize) -> Self {
        self.config.resize.workers = workers;
        self
    }

    /// Set the LibreOffice export timeout.
    pub fn conversion_timeout(mut self, timeout: Duration) -> Self {
        self.config.office.conversion_timeout = timeout;
        self
    }

    /// Set the path to soffice binary.
    pub fn soffice_path(mut self, path: PathBuf) -> Self {
        self.config.office.soffice_path = Some(path);
        self
    }

    /// Set the temporary directory for every stage.
    pub fn temp_dir(mut self, dir: PathBuf) -> Self {
        self.config.office.temp_dir = Some(dir.clone());
        self.config.raster.temp_dir = Some(dir);
        self
    }

    /// The configuration built so far.
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Build the converter.
    pub fn build(self) -> Result<Converter> {
        Converter::new(self.config)
    }
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
