//! Fitting rasterized pages into a bounding box and saving them as slides.
//!
//! This module provides:
//! - Aspect-preserving scaling with Lanczos resampling
//! - Parallel resize and encode via a dedicated rayon pool
//! - PNG encoding through the `png` crate with configurable compression

use crate::config::ResizeConfig;
use crate::error::{ConversionError, Result};
use crate::rasterizer::RasterizedPage;
use image::imageops::FilterType;
use image::RgbaImage;
use rayon::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Scale `(width, height)` so it fits in `(max_width, max_height)` with the
/// aspect ratio kept. Pages smaller than the box are scaled up. Each side is
/// at least one pixel.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let (w, h) = (width.max(1) as u64, height.max(1) as u64);
    let (max_w, max_h) = (max_width as u64, max_height as u64);

    // Integer cross-multiplication keeps the bounding side exact.
    let (new_width, new_height) = if w * max_h >= h * max_w {
        (max_w, h * max_w / w)
    } else {
        (w * max_h / h, max_h)
    };
    (new_width.max(1) as u32, new_height.max(1) as u32)
}

/// Output filename for the slide at `index` (0-based, in page order).
pub fn slide_filename(index: usize) -> String {
    format!("slide-{}.png", index)
}

/// Resizes pages and writes them as `slide-<index>.png`.
pub struct Resizer {
    config: ResizeConfig,
    thread_pool: rayon::ThreadPool,
}

impl Resizer {
    /// Create a resizer with its own worker pool.
    pub fn new(config: ResizeConfig) -> Result<Self> {
        config.validate()?;

        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("ppt-preview-resize-{}", i))
            .build()
            .map_err(|e| {
                ConversionError::InvalidConfig(format!("Failed to create thread pool: {}", e))
            })?;

        info!(
            "Resizer initialized with {} workers, bounds {}x{}",
            config.workers, config.max_width, config.max_height
        );

        Ok(Self {
            config,
            thread_pool,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &ResizeConfig {
        &self.config
    }

    /// Resize one page to the configured bounding box.
    pub fn resize(&self, page: &RasterizedPage) -> RgbaImage {
        let (width, height) = fit_within(
            page.image.width(),
            page.image.height(),
            self.config.max_width,
            self.config.max_height,
        );
        image::imageops::resize(&page.image.to_rgba8(), width, height, FilterType::Lanczos3)
    }

    /// Resize every page and save it into `output_dir`. Returns the written
    /// paths in the order of `pages`.
    pub fn resize_and_save_all(
        &self,
        pages: &[RasterizedPage],
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        let start = Instant::now();

        std::fs::create_dir_all(output_dir).map_err(|e| ConversionError::OutputDirError {
            path: output_dir.to_path_buf(),
            message: e.to_string(),
        })?;

        let compression = compression_for_level(self.config.png_compression);
        let paths = self.thread_pool.install(|| {
            pages
                .par_iter()
                .enumerate()
                .map(|(index, page)| {
                    let resized = self.resize(page);
                    let data = encode_png(&resized, compression)?;
                    let output_path = output_dir.join(slide_filename(index));
                    std::fs::write(&output_path, data).map_err(|e| {
                        ConversionError::OutputDirError {
                            path: output_path.clone(),
                            message: e.to_string(),
                        }
                    })?;
                    debug!(
                        "Page {} -> {:?} ({}x{})",
                        page.page_number,
                        output_path.file_name(),
                        resized.width(),
                        resized.height()
                    );
                    Ok(output_path)
                })
                .collect::<Result<Vec<_>>>()
        })?;

        debug!("Saved {} slides in {:?}", paths.len(), start.elapsed());
        Ok(paths)
    }
}

/// Map a 0-9 compression level onto the encoder's presets.
fn compression_for_level(level: u8) -> png::Compression {
    match level {
        0..=3 => png::Compression::Fast,
        4..=6 => png::Compression::Default,
        _ => png::Compression::Best,
    }
}

/// Encode an RGBA image to PNG bytes.
fn encode_png(image: &RgbaImage, compression: png::Compression) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());

    let mut encoder = png::Encoder::new(&mut buffer, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(compression);

    let mut writer = encoder.write_header().map_err(|e| {
        ConversionError::PngEncodingError(format!("Failed to write PNG header: {}", e))
    })?;

    writer.write_image_data(image.as_raw()).map_err(|e| {
        ConversionError::PngEncodingError(format!("Failed to write PNG data: {}", e))
    })?;

    drop(writer);

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba};

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn page(number: usize, width: u32, height: u32, shade: u8) -> RasterizedPage {
        RasterizedPage {
            page_number: number,
            image: DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                width,
                height,
                Rgba([shade, shade, shade, 255]),
            )),
        }
    }

    #[test]
    fn test_fit_within_widescreen_slide_at_300_dpi() {
        // 13.333in x 7.5in slide at 300 DPI
        assert_eq!(fit_within(4000, 2250, 1600, 900), (1600, 900));
    }

    #[test]
    fn test_fit_within_height_bound() {
        // 4:3 slide is limited by height
        assert_eq!(fit_within(3000, 2250, 1600, 900), (1200, 900));
    }

    #[test]
    fn test_fit_within_portrait_page() {
        // US Letter at 300 DPI
        assert_eq!(fit_within(2550, 3300, 1600, 900), (695, 900));
    }

    #[test]
    fn test_fit_within_upscales_small_pages() {
        assert_eq!(fit_within(160, 90, 1600, 900), (1600, 900));
    }

    #[test]
    fn test_fit_within_never_collapses_to_zero() {
        assert_eq!(fit_within(10_000, 1, 1600, 900), (1600, 1));
    }

    #[test]
    fn test_slide_filename() {
        assert_eq!(slide_filename(0), "slide-0.png");
        assert_eq!(slide_filename(12), "slide-12.png");
    }

    #[test]
    fn test_compression_for_level() {
        assert!(matches!(compression_for_level(0), png::Compression::Fast));
        assert!(matches!(compression_for_level(6), png::Compression::Default));
        assert!(matches!(compression_for_level(9), png::Compression::Best));
    }

    #[test]
    fn test_encode_png_small_image() {
        let image = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let png_data = encode_png(&image, png::Compression::Fast).unwrap();
        assert!(png_data.len() > 8);
        assert_eq!(&png_data[0..8], &PNG_MAGIC);
    }

    #[test]
    fn test_resizer_rejects_invalid_config() {
        assert!(Resizer::new(ResizeConfig::default().workers(0)).is_err());
    }

    #[test]
    fn test_resize_and_save_all_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/out");
        let resizer = Resizer::new(ResizeConfig::with_bounds(160, 90).workers(2)).unwrap();

        let pages: Vec<RasterizedPage> = (1..=5)
            .map(|n| page(n, 400, 300, (n * 40) as u8))
            .collect();
        let paths = resizer.resize_and_save_all(&pages, &out).unwrap();

        assert_eq!(paths.len(), 5);
        for (index, path) in paths.iter().enumerate() {
            assert_eq!(path, &out.join(format!("slide-{}.png", index)));

            let saved = image::open(path).unwrap().to_rgba8();
            assert_eq!(saved.dimensions(), (120, 90));
            let shade = ((index + 1) * 40) as u8;
            assert_eq!(saved.get_pixel(60, 45), &Rgba([shade, shade, shade, 255]));
        }
    }
}
