// SYNOID Palette Sampler
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Dominant color through color_thief's median cut quantizer. Transparent
// and near-white pixels are dropped before quantization.

use crate::error::{CanvasError, Result};
use color_thief::ColorFormat;
use image::DynamicImage;
use std::path::Path;
use tracing::debug;

/// An (r, g, b) triple.
pub type Rgb = [u8; 3];

const PALETTE_SIZE: u8 = 5;
const MIN_ALPHA: u8 = 125;
const WHITE_CUTOFF: u8 = 250;
const SIGBITS_SHIFT: u8 = 3;

/// Source of the dominant color for an image on disk.
pub trait ColorSampler: Send + Sync {
    fn dominant_color(&self, image_path: &Path) -> Result<Rgb>;
}

/// Production sampler: decodes the file and quantizes every `quality`-th pixel.
#[derive(Debug, Clone, Copy)]
pub struct QuantizingSampler {
    pub quality: u32,
}

impl Default for QuantizingSampler {
    fn default() -> Self {
        Self { quality: 1 }
    }
}

impl ColorSampler for QuantizingSampler {
    fn dominant_color(&self, image_path: &Path) -> Result<Rgb> {
        dominant_color_from_path(image_path, self.quality)
    }
}

/// Decode `path` and return its dominant color. Decode errors propagate unchanged.
pub fn dominant_color_from_path(path: &Path, quality: u32) -> Result<Rgb> {
    let img = image::open(path)?;
    dominant_color(&img, quality)
}

/// Dominant color of a decoded image. `quality` is the pixel sampling stride (1 = every pixel).
pub fn dominant_color(img: &DynamicImage, quality: u32) -> Result<Rgb> {
    let step = quality.max(1) as usize;
    let rgba = img.to_rgba8();

    let mut opaque = Vec::new();
    let mut colored = Vec::new();
    for px in rgba.pixels().step_by(step) {
        let [r, g, b, a] = px.0;
        if a < MIN_ALPHA {
            continue;
        }
        opaque.push([r, g, b]);
        if !(r > WHITE_CUTOFF && g > WHITE_CUTOFF && b > WHITE_CUTOFF) {
            colored.push([r, g, b]);
        }
    }

    if opaque.is_empty() {
        return Err(CanvasError::Palette(
            "image has no opaque pixels to sample".to_string(),
        ));
    }

    // the quantizer skips near-white itself, so a blank page is averaged here
    if colored.is_empty() {
        debug!("[PALETTE] {} near-white samples only", opaque.len());
        return Ok(average(&opaque));
    }

    // one occupied cell cannot be cut
    if single_cell(&colored) {
        return Ok(average(&colored));
    }

    let bytes: Vec<u8> = colored.iter().flatten().copied().collect();
    let palette = color_thief::get_palette(&bytes, ColorFormat::Rgb, 1, PALETTE_SIZE)
        .map_err(|e| CanvasError::Palette(format!("quantization failed: {:?}", e)))?;
    debug!("[PALETTE] {} samples -> {:?}", colored.len(), palette);

    palette
        .first()
        .map(|c| [c.r, c.g, c.b])
        .ok_or_else(|| CanvasError::Palette("quantization produced no colors".to_string()))
}

fn single_cell(samples: &[Rgb]) -> bool {
    let cell = |px: &Rgb| px.map(|c| c >> SIGBITS_SHIFT);
    samples
        .first()
        .map(|first| samples.iter().all(|px| cell(px) == cell(first)))
        .unwrap_or(true)
}

fn average(samples: &[Rgb]) -> Rgb {
    let n = samples.len().max(1) as u64;
    let mut sums = [0u64; 3];
    for px in samples {
        for (sum, c) in sums.iter_mut().zip(px) {
            *sum += *c as u64;
        }
    }
    sums.map(|s| ((s + n / 2) / n) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn solid(w: u32, h: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(color))
    }

    fn close(a: Rgb, b: Rgb, tol: i32) -> bool {
        a.iter()
            .zip(b.iter())
            .all(|(x, y)| (*x as i32 - *y as i32).abs() <= tol)
    }

    #[test]
    fn test_solid_color_is_dominant() {
        let img = DynamicImage::ImageRgba8(solid(16, 16, [210, 50, 40, 255]));
        let color = dominant_color(&img, 1).unwrap();
        assert!(close(color, [210, 50, 40], 8), "got {:?}", color);
    }

    #[test]
    fn test_majority_color_wins() {
        let mut img = solid(20, 20, [20, 40, 220, 255]);
        for x in 0..2 {
            for y in 0..20 {
                img.put_pixel(x, y, Rgba([240, 200, 10, 255]));
            }
        }
        let color = dominant_color(&DynamicImage::ImageRgba8(img), 1).unwrap();
        assert!(close(color, [20, 40, 220], 8), "got {:?}", color);
    }

    #[test]
    fn test_dominant_color_comes_from_the_input() {
        let mut img = solid(30, 20, [250, 10, 10, 255]);
        for x in 15..30 {
            for y in 0..20 {
                img.put_pixel(x, y, Rgba([10, 10, 250, 255]));
            }
        }
        let color = dominant_color(&DynamicImage::ImageRgba8(img), 1).unwrap();
        assert!(
            close(color, [250, 10, 10], 8) || close(color, [10, 10, 250], 8),
            "got {:?}",
            color
        );
    }

    #[test]
    fn test_transparent_and_white_pixels_ignored() {
        let mut img = solid(10, 10, [255, 255, 255, 255]);
        for x in 0..10 {
            img.put_pixel(x, 0, Rgba([0, 200, 0, 255]));
            img.put_pixel(x, 1, Rgba([200, 0, 0, 10]));
        }
        let color = dominant_color(&DynamicImage::ImageRgba8(img), 1).unwrap();
        assert!(close(color, [0, 200, 0], 8), "got {:?}", color);
    }

    #[test]
    fn test_all_white_image_still_has_a_color() {
        let img = DynamicImage::ImageRgba8(solid(8, 8, [255, 255, 255, 255]));
        let color = dominant_color(&img, 1).unwrap();
        assert!(color.iter().all(|c| *c > 240), "got {:?}", color);
    }

    #[test]
    fn test_fully_transparent_image_errors() {
        let img = DynamicImage::ImageRgba8(solid(8, 8, [10, 10, 10, 0]));
        assert!(matches!(dominant_color(&img, 1), Err(CanvasError::Palette(_))));
    }

    #[test]
    fn test_quality_stride_still_finds_color() {
        let img = DynamicImage::ImageRgba8(solid(30, 30, [0, 0, 200, 255]));
        let color = dominant_color(&img, 10).unwrap();
        assert!(close(color, [0, 0, 200], 8), "got {:?}", color);
        // zero is treated as 1
        assert!(dominant_color(&img, 0).is_ok());
    }

    #[test]
    fn test_average_rounds() {
        assert_eq!(average(&[[0, 0, 0], [1, 3, 255]]), [1, 2, 128]);
        assert!(single_cell(&[[16, 16, 16], [23, 20, 17]]));
        assert!(!single_cell(&[[16, 16, 16], [24, 16, 16]]));
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let err = dominant_color_from_path(Path::new("does/not/exist.png"), 1).unwrap_err();
        assert!(matches!(err, CanvasError::Decode(_)));
    }
}
