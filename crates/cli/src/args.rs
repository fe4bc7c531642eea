//! Arguments for the ppt-preview command

use anyhow::{bail, Context};
use clap::Parser;
use ppt_preview_core::{ConversionRequest, ConverterConfig, ThinLineMode};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Convert a presentation into resized slide images
#[derive(Parser, Debug)]
#[clap(version, author)]
pub struct Args {
    /// Path to the input presentation (or a directory containing presentations)
    #[clap(long)]
    pub input: PathBuf,
    /// Directory to save output images
    #[clap(long, default_value = "ppt-preview")]
    pub output: PathBuf,
    /// A JSON converter config; flags given here override its values
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// The number of concurrent pdftoppm processes [default: 4]
    #[clap(long)]
    pub threads: Option<usize>,
    /// The number of threads resizing slides [default: 8]
    #[clap(long)]
    pub resize_workers: Option<usize>,
    /// The maximum slide width in pixels [default: 1600]
    #[clap(long)]
    pub max_width: Option<u32>,
    /// The maximum slide height in pixels [default: 900]
    #[clap(long)]
    pub max_height: Option<u32>,
    /// The rasterization resolution [default: 300]
    #[clap(long)]
    pub dpi: Option<u32>,
    /// How pdftoppm draws hairlines: none, solid or shape [default: none]
    #[clap(long)]
    pub thin_line_mode: Option<ThinLineMode>,
    /// The soffice binary to use instead of searching for one
    #[clap(long)]
    pub soffice: Option<PathBuf>,
    /// Seconds to wait for LibreOffice before giving up [default: 120]
    #[clap(long)]
    pub timeout: Option<u64>,
}

impl Args {
    /// Build the converter config from the optional config file and the flags
    pub fn converter_config(&self) -> anyhow::Result<ConverterConfig> {
        // start from the config file if we were given one
        let mut config = match &self.config {
            Some(path) => ConverterConfig::from_json_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => ConverterConfig::default(),
        };
        // apply any explicit overrides
        if let Some(threads) = self.threads {
            config.raster.num_threads = threads;
        }
        if let Some(workers) = self.resize_workers {
            config.resize.workers = workers;
        }
        if let Some(max_width) = self.max_width {
            config.resize.max_width = max_width;
        }
        if let Some(max_height) = self.max_height {
            config.resize.max_height = max_height;
        }
        if let Some(dpi) = self.dpi {
            config.raster.dpi = dpi;
        }
        if let Some(mode) = self.thin_line_mode {
            config.raster.thin_line_mode = mode;
        }
        if let Some(soffice) = &self.soffice {
            config.office.soffice_path = Some(soffice.clone());
        }
        if let Some(secs) = self.timeout {
            config.office.conversion_timeout = Duration::from_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }

    /// Build the conversion requests for our input
    pub fn requests(&self) -> anyhow::Result<Vec<ConversionRequest>> {
        requests_for(&self.input, &self.output)
    }
}

/// Map an input file or directory onto conversion requests
///
/// A single presentation writes straight into `output`. A directory with
/// several presentations gets one `output/<stem>` directory per file.
pub fn requests_for(input: &Path, output: &Path) -> anyhow::Result<Vec<ConversionRequest>> {
    if !input.is_dir() {
        return Ok(vec![ConversionRequest::new(input, output)]);
    }
    // find every presentation directly inside this directory
    let mut decks: Vec<PathBuf> = std::fs::read_dir(input)
        .with_context(|| format!("failed to read {}", input.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(ppt_preview_core::is_supported_extension)
        })
        .collect();
    decks.sort();
    match decks.len() {
        0 => bail!("no presentations found in {}", input.display()),
        1 => Ok(vec![ConversionRequest::new(decks.remove(0), output)]),
        _ => Ok(decks
            .into_iter()
            .map(|deck| {
                let stem = deck
                    .file_stem()
                    .map(|stem| stem.to_os_string())
                    .unwrap_or_else(|| "presentation".into());
                let output_dir = output.join(stem);
                ConversionRequest::new(deck, output_dir)
            })
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["ppt-preview", "--input", "deck.pptx"]).unwrap();
        assert_eq!(args.input, PathBuf::from("deck.pptx"));
        assert_eq!(args.output, PathBuf::from("ppt-preview"));

        let config = args.converter_config().unwrap();
        assert_eq!(config.raster.num_threads, 4);
        assert_eq!(config.raster.dpi, 300);
        assert_eq!(config.raster.thin_line_mode, ThinLineMode::None);
        assert_eq!(config.resize.max_width, 1600);
        assert_eq!(config.resize.max_height, 900);
        assert_eq!(config.resize.workers, 8);
    }

    #[test]
    fn input_is_required() {
        assert!(Args::try_parse_from(["ppt-preview", "--output", "out"]).is_err());
    }

    #[test]
    fn flags_override_config() {
        let args = Args::try_parse_from([
            "ppt-preview",
            "--input",
            "deck.pptx",
            "--output",
            "slides",
            "--threads",
            "6",
            "--max-width",
            "1280",
            "--max-height",
            "720",
            "--thin-line-mode",
            "shape",
            "--timeout",
            "30",
        ])
        .unwrap();
        let config = args.converter_config().unwrap();
        assert_eq!(args.output, PathBuf::from("slides"));
        assert_eq!(config.raster.num_threads, 6);
        assert_eq!(config.resize.max_width, 1280);
        assert_eq!(config.resize.max_height, 720);
        assert_eq!(config.raster.thin_line_mode, ThinLineMode::Shape);
        assert_eq!(config.office.conversion_timeout, Duration::from_secs(30));
    }

    #[test]
    fn bad_thin_line_mode_is_rejected() {
        let parsed = Args::try_parse_from([
            "ppt-preview",
            "--input",
            "deck.pptx",
            "--thin-line-mode",
            "hairline",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn invalid_values_fail_validation() {
        let args =
            Args::try_parse_from(["ppt-preview", "--input", "deck.pptx", "--threads", "0"]).unwrap();
        assert!(args.converter_config().is_err());
    }

    #[test]
    fn config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "raster": { "num_threads": 2, "dpi": 150 }, "resize": { "workers": 3 } }"#,
        )
        .unwrap();

        let args = Args::try_parse_from([
            "ppt-preview",
            "--input",
            "deck.pptx",
            "--config",
            path.to_str().unwrap(),
            "--dpi",
            "200",
        ])
        .unwrap();
        let config = args.converter_config().unwrap();
        assert_eq!(config.raster.num_threads, 2);
        assert_eq!(config.raster.dpi, 200);
        assert_eq!(config.resize.workers, 3);
    }

    #[test]
    fn single_file_writes_into_output() {
        let requests = requests_for(Path::new("deck.pptx"), Path::new("out")).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].input_path, PathBuf::from("deck.pptx"));
        assert_eq!(requests[0].output_dir, PathBuf::from("out"));
    }

    #[test]
    fn directory_with_one_deck_writes_into_output() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("talk.pptx"), b"PK").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let requests = requests_for(dir.path(), Path::new("out")).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].input_path, dir.path().join("talk.pptx"));
        assert_eq!(requests[0].output_dir, PathBuf::from("out"));
    }

    #[test]
    fn directory_with_several_decks_gets_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.odp"), b"").unwrap();
        std::fs::write(dir.path().join("a.PPTX"), b"").unwrap();

        let requests = requests_for(dir.path(), Path::new("out")).unwrap();
        let outputs: Vec<PathBuf> = requests.iter().map(|r| r.output_dir.clone()).collect();
        assert_eq!(outputs, vec![PathBuf::from("out/a"), PathBuf::from("out/b")]);
    }

    #[test]
    fn directory_without_decks_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(requests_for(dir.path(), Path::new("out")).is_err());
    }
}
