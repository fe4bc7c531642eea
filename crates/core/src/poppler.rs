//! Poppler-utils backend: `pdfinfo` for page counts, `pdftoppm` for pages.

use crate::config::RasterConfig;
use crate::error::{ConversionError, Result};
use crate::rasterizer::{RangeBackend, RasterJob};
use crate::tools::{run_checked, PDFINFO, PDFTOPPM};
use async_process::Command;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Drives the poppler command-line tools.
#[derive(Debug, Clone)]
pub struct Poppler {
    pdfinfo_path: PathBuf,
    pdftoppm_path: PathBuf,
}

impl Poppler {
    /// Locate `pdfinfo` and `pdftoppm`, honouring explicit paths in the config.
    pub fn locate(config: &RasterConfig) -> Result<Self> {
        let pdfinfo_path = PDFINFO.locate(config.pdfinfo_path.as_deref())?;
        let pdftoppm_path = PDFTOPPM.locate(config.pdftoppm_path.as_deref())?;
        debug!(
            "Using pdfinfo at {:?}, pdftoppm at {:?}",
            pdfinfo_path, pdftoppm_path
        );
        Ok(Self {
            pdfinfo_path,
            pdftoppm_path,
        })
    }

    /// Use the given binaries as-is.
    pub fn from_paths(pdfinfo_path: PathBuf, pdftoppm_path: PathBuf) -> Self {
        Self {
            pdfinfo_path,
            pdftoppm_path,
        }
    }

    /// Arguments for one `pdftoppm` range invocation.
    fn pdftoppm_args(job: &RasterJob) -> Vec<std::ffi::OsString> {
        vec![
            "-r".into(),
            job.dpi.to_string().into(),
            "-png".into(),
            "-thinlinemode".into(),
            job.thin_line_mode.as_str().into(),
            "-f".into(),
            job.range.start.to_string().into(),
            "-l".into(),
            job.range.end.to_string().into(),
            job.pdf_path.as_os_str().into(),
            job.output_prefix().into_os_string(),
        ]
    }
}

impl RangeBackend for Poppler {
    async fn page_count(&self, pdf_path: &Path) -> Result<usize> {
        let mut cmd = Command::new(&self.pdfinfo_path);
        cmd.arg(pdf_path);
        let output = run_checked(PDFINFO.name, &mut cmd).await?;

        parse_page_count(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
            ConversionError::PageCount {
                path: pdf_path.to_path_buf(),
            }
        })
    }

    async fn render_range(&self, job: &RasterJob) -> Result<()> {
        let mut cmd = Command::new(&self.pdftoppm_path);
        cmd.args(Self::pdftoppm_args(job));
        run_checked(PDFTOPPM.name, &mut cmd).await?;
        Ok(())
    }
}

/// Read the page count from `pdfinfo` output.
///
/// The first line starting with `Pages:` decides; a missing line, an
/// unparsable value or zero yields `None`.
pub fn parse_page_count(pdfinfo_stdout: &str) -> Option<usize> {
    let line = pdfinfo_stdout
        .lines()
        .find(|line| line.starts_with("Pages:"))?;
    line["Pages:".len()..]
        .trim()
        .parse()
        .ok()
        .filter(|&pages| pages > 0)
}
