//! Presentation to PDF export through a headless LibreOffice.
//!
//! Every export runs with its own throwaway user profile so several exports
//! can run side by side without fighting over LibreOffice's profile lock.

use crate::config::OfficeConfig;
use crate::error::{ConversionError, Result};
use crate::tools::SOFFICE;
use async_process::Command;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::TempDir;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A PDF exported by LibreOffice. The containing temp directory lives as long
/// as this value does.
#[derive(Debug)]
pub struct ExportedPdf {
    path: PathBuf,
    _workspace: TempDir,
}

impl ExportedPdf {
    /// Path to the PDF.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Runs `soffice --headless --convert-to pdf` on presentations.
#[derive(Debug, Clone)]
pub struct OfficeConverter {
    config: OfficeConfig,
    soffice_path: PathBuf,
}

impl OfficeConverter {
    /// Create a converter, locating the soffice binary.
    pub fn new(config: OfficeConfig) -> Result<Self> {
        config.validate()?;

        let soffice_path = SOFFICE.locate(config.soffice_path.as_deref())?;
        info!("Found LibreOffice at: {:?}", soffice_path);

        Ok(Self {
            config,
            soffice_path,
        })
    }

    /// Path of the soffice binary in use.
    pub fn soffice_path(&self) -> &Path {
        &self.soffice_path
    }

    /// Export a presentation to PDF.
    pub async fn convert_to_pdf(&self, input_path: &Path) -> Result<ExportedPdf> {
        if !input_path.exists() {
            return Err(ConversionError::InputNotFound(input_path.to_path_buf()));
        }

        let ext = input_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        if !crate::is_supported_extension(ext) {
            return Err(ConversionError::UnsupportedFormat {
                extension: ext.to_string(),
            });
        }

        let start = Instant::now();

        let mut builder = tempfile::Builder::new();
        builder.prefix("ppt-preview-office-");
        let workspace = match &self.config.temp_dir {
            Some(dir) => builder.tempdir_in(dir)?,
            None => builder.tempdir()?,
        };
        let profile_dir = workspace.path().join("profile");
        let output_dir = workspace.path().join(Uuid::new_v4().to_string());
        std::fs::create_dir_all(&output_dir).map_err(|e| ConversionError::OutputDirError {
            path: output_dir.clone(),
            message: e.to_string(),
        })?;

        let mut cmd = Command::new(&self.soffice_path);
        cmd.args([
            "--headless",
            "--invisible",
            "--nologo",
            "--nofirststartwizard",
            "--norestore",
        ]);
        cmd.arg(format!(
            "-env:UserInstallation=file://{}",
            profile_dir.display()
        ));
        cmd.args(["--convert-to", "pdf", "--outdir"]);
        cmd.arg(&output_dir);
        cmd.arg(input_path);
        cmd.kill_on_drop(true);

        debug!("Exporting {:?} to PDF", input_path.file_name());

        let output = timeout(self.config.conversion_timeout, cmd.output())
            .await
            .map_err(|_| ConversionError::Timeout {
                path: input_path.to_path_buf(),
                timeout_secs: self.config.conversion_timeout.as_secs(),
            })?
            .map_err(|source| ConversionError::ProcessStartFailed {
                program: SOFFICE.name.to_string(),
                source,
            })?;

        let input_stem = input_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        let expected = output_dir.join(format!("{}.pdf", input_stem));
        let pdf_path = if expected.exists() {
            Some(expected)
        } else {
            find_pdf(&output_dir)
        };

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let path = match (pdf_path, output.status.success()) {
            (Some(path), true) => path,
            (Some(path), false) => {
                // soffice can exit non-zero after writing a complete PDF.
                warn!(
                    "LibreOffice exited with {} for {:?} but produced {:?}: {}",
                    output.status, input_path, path, stderr
                );
                path
            }
            (None, success) => {
                let message = if success {
                    "PDF output file not found".to_string()
                } else {
                    format!("soffice exited with {}: {}", output.status, stderr)
                };
                return Err(ConversionError::ConversionFailed {
                    path: input_path.to_path_buf(),
                    message,
                });
            }
        };

        info!(
            "Exported {:?} to PDF in {:?}",
            input_path.file_name(),
            start.elapsed()
        );

        Ok(ExportedPdf {
            path,
            _workspace: workspace,
        })
    }
}

/// LibreOffice may write the PDF under a slightly different name; take any PDF
/// in the directory.
fn find_pdf(dir: &Path) -> Option<PathBuf> {
    std::fs::read_dir(dir).ok().and_then(|entries| {
        entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .find(|p| p.extension().map(|ext| ext == "pdf").unwrap_or(false))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter_with(soffice: PathBuf) -> OfficeConverter {
        OfficeConverter {
            config: OfficeConfig::default(),
            soffice_path: soffice,
        }
    }

    #[test]
    fn test_new_with_nonexistent_soffice_path() {
        let config = OfficeConfig::default().soffice_path(PathBuf::from("/nonexistent/soffice"));
        assert!(matches!(
            OfficeConverter::new(config),
            Err(ConversionError::ToolNotFound { tool: "soffice", .. })
        ));
    }

    #[test]
    fn test_new_rejects_zero_timeout() {
        let config = OfficeConfig::default().conversion_timeout(std::time::Duration::ZERO);
        assert!(matches!(
            OfficeConverter::new(config),
            Err(ConversionError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_convert_missing_input() {
        let converter = converter_with(std::env::current_exe().unwrap());
        let result = converter
            .convert_to_pdf(Path::new("/nonexistent/deck.pptx"))
            .await;
        assert!(matches!(result, Err(ConversionError::InputNotFound(_))));
    }

    #[tokio::test]
    async fn test_convert_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        std::fs::write(&input, "hello").unwrap();

        let converter = converter_with(std::env::current_exe().unwrap());
        match converter.convert_to_pdf(&input).await {
            Err(ConversionError::UnsupportedFormat { extension }) => assert_eq!(extension, "txt"),
            other => panic!("Expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_convert_without_pdf_output_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("deck.pptx");
        std::fs::write(&input, "not really a deck").unwrap();

        // `true` accepts any arguments and writes nothing.
        let converter = converter_with(PathBuf::from("/bin/true"));
        match converter.convert_to_pdf(&input).await {
            Err(ConversionError::ConversionFailed { message, .. }) => {
                assert!(message.contains("not found"));
            }
            other => panic!("Expected ConversionFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_find_pdf() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_pdf(dir.path()).is_none());

        std::fs::write(dir.path().join("other.txt"), "x").unwrap();
        std::fs::write(dir.path().join("Deck (1).pdf"), "%PDF").unwrap();
        assert_eq!(
            find_pdf(dir.path()).unwrap().file_name().unwrap(),
            "Deck (1).pdf"
        );
    }
}
