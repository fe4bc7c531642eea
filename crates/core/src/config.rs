//! Configuration types for ppt-preview conversion.

use crate::error::{ConversionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Configuration for the LibreOffice PDF export step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficeConfig {
    /// Path to soffice binary. If None, searches common locations and PATH.
    pub soffice_path: Option<PathBuf>,

    /// Timeout for a single document export.
    /// Default: 120 seconds.
    pub conversion_timeout: Duration,

    /// Directory for temporary files.
    /// Default: system temp directory.
    pub temp_dir: Option<PathBuf>,
}

impl Default for OfficeConfig {
    fn default() -> Self {
        Self {
            soffice_path: None,
            conversion_timeout: Duration::from_secs(120),
            temp_dir: None,
        }
    }
}

impl OfficeConfig {
    /// Set the soffice binary path.
    pub fn soffice_path(mut self, path: PathBuf) -> Self {
        self.soffice_path = Some(path);
        self
    }

    /// Set the conversion timeout.
    pub fn conversion_timeout(mut self, timeout: Duration) -> Self {
        self.conversion_timeout = timeout;
        self
    }

    /// Set the temporary directory.
    pub fn temp_dir(mut self, dir: PathBuf) -> Self {
        self.temp_dir = Some(dir);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.conversion_timeout.is_zero() {
            return Err(ConversionError::InvalidConfig(
                "conversion_timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// How `pdftoppm` rasterizes hairline strokes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThinLineMode {
    #[default]
    None,
    Solid,
    Shape,
}

impl ThinLineMode {
    /// The value passed to `-thinlinemode`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThinLineMode::None => "none",
            ThinLineMode::Solid => "solid",
            ThinLineMode::Shape => "shape",
        }
    }
}

impl fmt::Display for ThinLineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThinLineMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(ThinLineMode::None),
            "solid" => Ok(ThinLineMode::Solid),
            "shape" => Ok(ThinLineMode::Shape),
            other => Err(format!(
                "unknown thin line mode '{}', expected one of: none, solid, shape",
                other
            )),
        }
    }
}

/// Configuration for PDF page-range rasterization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Output DPI (dots per inch).
    /// Default: 300.
    pub dpi: u32,

    /// Thin-line rendering mode passed through to the rasterizer.
    /// Default: none.
    pub thin_line_mode: ThinLineMode,

    /// Number of concurrent rasterizer processes, also the divisor used to
    /// size page ranges.
    /// Default: 4.
    pub num_threads: usize,

    /// Path to pdfinfo binary. If None, searches PATH.
    pub pdfinfo_path: Option<PathBuf>,

    /// Path to pdftoppm binary. If None, searches PATH.
    pub pdftoppm_path: Option<PathBuf>,

    /// Directory for the temporary PDF copy and page images.
    /// Default: system temp directory.
    pub temp_dir: Option<PathBuf>,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            thin_line_mode: ThinLineMode::None,
            num_threads: 4,
            pdfinfo_path: None,
            pdftoppm_path: None,
            temp_dir: None,
        }
    }
}

impl RasterConfig {
    /// Create a raster config with specified DPI.
    pub fn with_dpi(dpi: u32) -> Self {
        Self {
            dpi,
            ..Default::default()
        }
    }

    /// Set the number of concurrent rasterizer processes.
    pub fn num_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Set the thin-line mode.
    pub fn thin_line_mode(mut self, mode: ThinLineMode) -> Self {
        self.thin_line_mode = mode;
        self
    }

    /// Set the temporary directory.
    pub fn temp_dir(mut self, dir: PathBuf) -> Self {
        self.temp_dir = Some(dir);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 || self.dpi > 1200 {
            return Err(ConversionError::InvalidConfig(
                "dpi must be between 1 and 1200".to_string(),
            ));
        }
        if self.num_threads == 0 {
            return Err(ConversionError::InvalidConfig(
                "num_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the resize-and-save pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
    /// Bounding box width in pixels.
    /// Default: 1600.
    pub max_width: u32,

    /// Bounding box height in pixels.
    /// Default: 900.
    pub max_height: u32,

    /// Number of threads resizing and encoding slides.
    /// Default: 8.
    pub workers: usize,

    /// PNG compression level (0-9, higher = smaller file, slower).
    /// Default: 6.
    pub png_compression: u8,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            max_width: 1600,
            max_height: 900,
            workers: 8,
            png_compression: 6,
        }
    }
}

impl ResizeConfig {
    /// Create a resize config with the given bounding box.
    pub fn with_bounds(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
            ..Default::default()
        }
    }

    /// Set the number of resize workers.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set PNG compression level.
    pub fn png_compression(mut self, level: u8) -> Self {
        self.png_compression = level.min(9);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_width == 0 || self.max_height == 0 {
            return Err(ConversionError::InvalidConfig(
                "max_width and max_height must be at least 1".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(ConversionError::InvalidConfig(
                "workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Combined configuration for the converter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// LibreOffice configuration.
    pub office: OfficeConfig,

    /// Rasterization configuration.
    pub raster: RasterConfig,

    /// Resize configuration.
    pub resize: ResizeConfig,
}

impl ConverterConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| {
            ConversionError::InvalidConfig(format!("{}: {}", path.display(), e))
        })
    }

    /// Validate the entire configuration.
    pub fn validate(&self) -> Result<()> {
        self.office.validate()?;
        self.raster.validate()?;
        self.resize.validate()?;
        Ok(())
    }
}

/// A single conversion request.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Path to the input presentation.
    pub input_path: PathBuf,

    /// Directory to write `slide-<index>.png` files into.
    pub output_dir: PathBuf,
}

impl ConversionRequest {
    /// Create a new conversion request.
    pub fn new(input_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_dir: output_dir.into(),
        }
    }
}

/// Result of a batch conversion operation.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Successfully converted files.
    pub successful: Vec<FileResult>,

    /// Failed conversions.
    pub failed: Vec<FailedFile>,

    /// Total processing time.
    pub total_duration: Duration,

    /// Total slides written.
    pub total_pages: usize,
}

/// Result for a single successfully converted file.
#[derive(Debug, Clone)]
pub struct FileResult {
    /// Original input path.
    pub input_path: PathBuf,

    /// Slide PNG paths in slide order.
    pub output_paths: Vec<PathBuf>,

    /// Number of slides.
    pub page_count: usize,

    /// Processing time for this file.
    pub duration: Duration,
}

/// Information about a failed conversion.
#[derive(Debug, Clone)]
pub struct FailedFile {
    /// Original input path.
    pub input_path: PathBuf,

    /// Error message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_office_config_defaults() {
        let config = OfficeConfig::default();
        assert_eq!(config.conversion_timeout.as_secs(), 120);
        assert!(config.soffice_path.is_none());
        assert!(config.temp_dir.is_none());
    }

    #[test]
    fn test_office_config_validation_zero_timeout() {
        let config = OfficeConfig::default().conversion_timeout(Duration::from_secs(0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_raster_config_defaults() {
        let config = RasterConfig::default();
        assert_eq!(config.dpi, 300);
        assert_eq!(config.num_threads, 4);
        assert_eq!(config.thin_line_mode, ThinLineMode::None);
    }

    #[test]
    fn test_raster_config_builder_pattern() {
        let config = RasterConfig::with_dpi(150)
            .num_threads(2)
            .thin_line_mode(ThinLineMode::Shape);

        assert_eq!(config.dpi, 150);
        assert_eq!(config.num_threads, 2);
        assert_eq!(config.thin_line_mode, ThinLineMode::Shape);
    }

    #[test]
    fn test_raster_config_validation() {
        assert!(RasterConfig::default().validate().is_ok());
        assert!(RasterConfig::with_dpi(0).validate().is_err());
        assert!(RasterConfig::with_dpi(1201).validate().is_err());
        assert!(RasterConfig::default().num_threads(0).validate().is_err());
    }

    #[test]
    fn test_thin_line_mode_parse() {
        assert_eq!("none".parse::<ThinLineMode>().unwrap(), ThinLineMode::None);
        assert_eq!("Solid".parse::<ThinLineMode>().unwrap(), ThinLineMode::Solid);
        assert_eq!("shape".parse::<ThinLineMode>().unwrap(), ThinLineMode::Shape);
        assert!("hairline".parse::<ThinLineMode>().is_err());
        assert_eq!(ThinLineMode::Solid.to_string(), "solid");
    }

    #[test]
    fn test_resize_config_defaults() {
        let config = ResizeConfig::default();
        assert_eq!(config.max_width, 1600);
        assert_eq!(config.max_height, 900);
        assert_eq!(config.workers, 8);
        assert_eq!(config.png_compression, 6);
    }

    #[test]
    fn test_resize_config_png_compression_clamped() {
        let config = ResizeConfig::default().png_compression(15);
        assert_eq!(config.png_compression, 9);
    }

    #[test]
    fn test_resize_config_validation() {
        assert!(ResizeConfig::with_bounds(1600, 900).validate().is_ok());
        assert!(ResizeConfig::with_bounds(0, 900).validate().is_err());
        assert!(ResizeConfig::default().workers(0).validate().is_err());
    }

    #[test]
    fn test_converter_config_validate_propagates() {
        let mut config = ConverterConfig::default();
        assert!(config.validate().is_ok());
        config.raster.num_threads = 0;
        assert!(config.validate().is_err());

        let mut config2 = ConverterConfig::default();
        config2.resize.max_height = 0;
        assert!(config2.validate().is_err());
    }

    #[test]
    fn test_converter_config_partial_json_uses_defaults() {
        let json = r#"{ "raster": { "num_threads": 2, "thin_line_mode": "solid" } }"#;
        let config: ConverterConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.raster.num_threads, 2);
        assert_eq!(config.raster.thin_line_mode, ThinLineMode::Solid);
        assert_eq!(config.raster.dpi, 300);
        assert_eq!(config.resize.max_width, 1600);
        assert_eq!(config.office.conversion_timeout.as_secs(), 120);
    }

    #[test]
    fn test_converter_config_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "resize": { "max_width": 800 } }"#).unwrap();

        let config = ConverterConfig::from_json_file(&path).unwrap();
        assert_eq!(config.resize.max_width, 800);
        assert_eq!(config.resize.max_height, 900);
    }

    #[test]
    fn test_converter_config_from_invalid_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        match ConverterConfig::from_json_file(&path) {
            Err(ConversionError::InvalidConfig(msg)) => assert!(msg.contains("config.json")),
            other => panic!("Expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_conversion_request_new() {
        let request = ConversionRequest::new("deck.pptx", "/output");
        assert_eq!(request.input_path, PathBuf::from("deck.pptx"));
        assert_eq!(request.output_dir, PathBuf::from("/output"));
    }
}
