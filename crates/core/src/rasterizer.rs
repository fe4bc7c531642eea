//! Parallel PDF rasterization over contiguous page ranges.
//!
//! A document's pages are split into ranges by [`plan_ranges`], one
//! rasterizer job is dispatched per range, and the per-page files the jobs
//! write into a shared directory are reassembled into page order. Jobs finish
//! in any order; the final sequence is ordered by the page number embedded in
//! each output filename, never by completion or submission order.

use crate::config::{RasterConfig, ThinLineMode};
use crate::error::{ConversionError, Result};
use crate::planner::{plan_ranges, PageRange};
use crate::poppler::Poppler;
use image::DynamicImage;
use rayon::prelude::*;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tempfile::{NamedTempFile, TempDir};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// One rasterizer invocation over a page range.
#[derive(Debug, Clone)]
pub struct RasterJob {
    /// Pages to render.
    pub range: PageRange,
    /// Source PDF, shared by all jobs of one call.
    pub pdf_path: Arc<Path>,
    /// Directory shared by all jobs of one call.
    pub output_dir: Arc<Path>,
    /// Filename prefix unique to this job.
    pub prefix: String,
    /// Rendering resolution.
    pub dpi: u32,
    /// Hairline rendering mode.
    pub thin_line_mode: ThinLineMode,
}

impl RasterJob {
    /// The prefix the backend must give every file it writes, including the
    /// separator in front of the tool's page numbering.
    pub fn output_prefix(&self) -> PathBuf {
        self.output_dir.join(format!("{}_", self.prefix))
    }
}

/// A decoded page image.
#[derive(Debug, Clone)]
pub struct RasterizedPage {
    /// Page number (1-indexed), taken from the output filename.
    pub page_number: usize,
    /// Decoded pixels.
    pub image: DynamicImage,
}

/// The external tooling a [`RangeRasterizer`] drives.
///
/// `render_range` must write one PNG per page of `job.range`, each named
/// `<job.output_prefix()>-<page>.png`.
pub trait RangeBackend: Send + Sync + 'static {
    /// Count the pages of a PDF.
    fn page_count(&self, pdf_path: &Path) -> impl Future<Output = Result<usize>> + Send;

    /// Render one page range into the job's output directory.
    fn render_range(&self, job: &RasterJob) -> impl Future<Output = Result<()>> + Send;
}

/// Rasterizes PDFs by fanning page ranges out over a bounded worker pool.
#[derive(Debug)]
pub struct RangeRasterizer<B = Poppler> {
    backend: Arc<B>,
    config: RasterConfig,
}

impl RangeRasterizer<Poppler> {
    /// Create a rasterizer backed by poppler's `pdfinfo` and `pdftoppm`.
    pub fn new(config: RasterConfig) -> Result<Self> {
        let backend = Poppler::locate(&config)?;
        Self::with_backend(backend, config)
    }
}

impl<B: RangeBackend> RangeRasterizer<B> {
    /// Create a rasterizer with a custom backend.
    pub fn with_backend(backend: B, config: RasterConfig) -> Result<Self> {
        config.validate()?;

        info!(
            "Range rasterizer initialized with {} threads, {} DPI, thin line mode {}",
            config.num_threads, config.dpi, config.thin_line_mode
        );

        Ok(Self {
            backend: Arc::new(backend),
            config,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    /// Rasterize a PDF held in memory.
    ///
    /// The bytes are written to a temporary file that is removed on every exit
    /// path, including failures.
    pub async fn rasterize_bytes(&self, pdf_bytes: &[u8]) -> Result<Vec<RasterizedPage>> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("ppt-preview-").suffix(".pdf");
        let mut temp_pdf: NamedTempFile = match &self.config.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        temp_pdf.write_all(pdf_bytes)?;
        temp_pdf.flush()?;

        self.rasterize_file(temp_pdf.path()).await
    }

    /// Rasterize a PDF on disk.
    pub async fn rasterize_file(&self, pdf_path: &Path) -> Result<Vec<RasterizedPage>> {
        let start = Instant::now();

        let total_pages = self.backend.page_count(pdf_path).await?;
        let ranges = plan_ranges(total_pages, self.config.num_threads)?;
        debug!(
            "Rasterizing {} pages from {:?} in {} ranges",
            total_pages,
            pdf_path,
            ranges.len()
        );

        let mut builder = tempfile::Builder::new();
        builder.prefix("ppt-preview-pages-");
        let work_dir: TempDir = match &self.config.temp_dir {
            Some(dir) => builder.tempdir_in(dir)?,
            None => builder.tempdir()?,
        };

        let paths = self
            .run_jobs(Arc::from(pdf_path), Arc::from(work_dir.path()), ranges)
            .await?;
        let ordered = order_by_page(paths, total_pages)?;

        let pages = tokio::task::spawn_blocking(move || load_pages(ordered)).await??;

        info!(
            "Rasterized {} pages in {:?}",
            pages.len(),
            start.elapsed()
        );

        drop(work_dir);
        Ok(pages)
    }

    /// Dispatch one task per range, at most `num_threads` at a time, and
    /// collect every path they produced. The first failure is returned and the
    /// remaining results are dropped.
    async fn run_jobs(
        &self,
        pdf_path: Arc<Path>,
        output_dir: Arc<Path>,
        ranges: Vec<PageRange>,
    ) -> Result<Vec<PathBuf>> {
        let permits = Arc::new(Semaphore::new(self.config.num_threads));
        let mut tasks = JoinSet::new();

        for range in ranges {
            let job = RasterJob {
                range,
                pdf_path: Arc::clone(&pdf_path),
                output_dir: Arc::clone(&output_dir),
                prefix: range.prefix(),
                dpi: self.config.dpi,
                thin_line_mode: self.config.thin_line_mode,
            };
            let backend = Arc::clone(&self.backend);
            let permits = Arc::clone(&permits);

            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| ConversionError::TaskFailed(e.to_string()))?;
                run_job(backend.as_ref(), &job).await
            });
        }

        let mut all_paths = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            // Returning early drops the set and aborts the remaining tasks.
            // Their child processes are not killed and run to completion;
            // whatever they write goes away with the work directory.
            all_paths.extend(joined??);
        }

        Ok(all_paths)
    }
}

/// Render one range and list the files it produced, sorted by name.
pub async fn run_job<B: RangeBackend>(backend: &B, job: &RasterJob) -> Result<Vec<PathBuf>> {
    let start = Instant::now();
    backend.render_range(job).await?;

    let paths = list_job_outputs(&job.output_dir, &job.prefix)?;
    debug!(
        "Range {} produced {} files in {:?}",
        job.range,
        paths.len(),
        start.elapsed()
    );
    Ok(paths)
}

/// Files in `dir` written under `prefix`, in lexicographic order.
///
/// Within one job the tool zero-pads page numbers consistently, so name order
/// equals page order there.
pub fn list_job_outputs(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let marker = format!("{}_", prefix);
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with(&marker) && name.ends_with(".png")
        })
        .map(|entry| entry.path())
        .collect();
    paths.sort();
    Ok(paths)
}

/// Parse the page number from a `<anything>-<digits>.png` filename.
pub fn page_number_from_path(path: &Path) -> Result<usize> {
    let malformed = || ConversionError::MalformedPageFilename {
        path: path.to_path_buf(),
    };

    let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(malformed)?;
    let stem = name.strip_suffix(".png").ok_or_else(malformed)?;
    let (_, digits) = stem.rsplit_once('-').ok_or_else(malformed)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    digits.parse().map_err(|_| malformed())
}

/// Sort output paths by their embedded page number and check that they are
/// exactly pages `1..=total_pages`.
pub fn order_by_page(paths: Vec<PathBuf>, total_pages: usize) -> Result<Vec<(usize, PathBuf)>> {
    let mut numbered = paths
        .into_iter()
        .map(|path| Ok((page_number_from_path(&path)?, path)))
        .collect::<Result<Vec<_>>>()?;
    numbered.sort_by_key(|(page, _)| *page);

    let complete = numbered.len() == total_pages
        && numbered
            .iter()
            .enumerate()
            .all(|(idx, (page, _))| *page == idx + 1);
    if !complete {
        return Err(ConversionError::PageSetMismatch {
            expected: total_pages,
            found: numbered.iter().map(|(page, _)| *page).collect(),
        });
    }

    Ok(numbered)
}

/// Decode page files in parallel, keeping the input order.
fn load_pages(ordered: Vec<(usize, PathBuf)>) -> Result<Vec<RasterizedPage>> {
    ordered
        .into_par_iter()
        .map(|(page_number, path)| {
            let image = image::open(&path)
                .map_err(|source| ConversionError::ImageDecode { path, source })?;
            Ok(RasterizedPage { page_number, image })
        })
        .collect()
}
