// SYNOID Frame Compositor
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Lays the story over the lower third of the drawing: a translucent black
// band with white, word-wrapped text, flattened to an RGB PNG. When no
// candidate font loads, the DejaVu Sans Bold copy compiled into the binary is used.

use crate::error::Result;
use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{imageops, DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const FRAME_FILE_NAME: &str = "frame_story.png";
pub const DEFAULT_FONT_SIZE: f32 = 36.0;
pub const WRAP_WIDTH: usize = 40;

const BAND_START: f32 = 0.65;
const BAND_FILL: Rgba<u8> = Rgba([0, 0, 0, 160]);
const TEXT_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TEXT_LEFT: i32 = 30;
const TEXT_TOP_PADDING: i32 = 20;

const BUNDLED_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans-Bold.ttf");

const SYSTEM_FONTS: &[&str] = &[
    "DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
    "C:/Windows/Fonts/arialbd.ttf",
];

#[derive(Debug, Clone)]
pub struct FrameCompositor {
    pub font_candidates: Vec<PathBuf>,
    pub font_size: f32,
}

impl Default for FrameCompositor {
    fn default() -> Self {
        Self::with_font(None)
    }
}

impl FrameCompositor {
    /// `preferred` is tried before the bundled system font list.
    pub fn with_font(preferred: Option<PathBuf>) -> Self {
        let font_candidates = preferred
            .into_iter()
            .chain(SYSTEM_FONTS.iter().map(PathBuf::from))
            .collect();
        Self {
            font_candidates,
            font_size: DEFAULT_FONT_SIZE,
        }
    }

    /// First candidate that exists and parses as a font, else the bundled one.
    pub fn load_font(&self) -> Option<FontArc> {
        let found = self.font_candidates.iter().find_map(|path| {
            let bytes = std::fs::read(path).ok()?;
            match FontArc::try_from_vec(bytes) {
                Ok(font) => Some(font),
                Err(e) => {
                    warn!("[FRAME] {:?} is not a usable font: {}", path, e);
                    None
                }
            }
        });
        if found.is_some() {
            return found;
        }

        warn!("[FRAME] No font candidate loaded, using the bundled DejaVu Sans Bold");
        match FontArc::try_from_slice(BUNDLED_FONT) {
            Ok(font) => Some(font),
            Err(e) => {
                warn!("[FRAME] Bundled font is unusable: {}", e);
                None
            }
        }
    }

    pub async fn compose(
        &self,
        image_path: &Path,
        story: &str,
        output_path: &Path,
    ) -> Result<PathBuf> {
        let compositor = self.clone();
        let image_path = image_path.to_path_buf();
        let output_path = output_path.to_path_buf();
        let story = story.to_string();

        tokio::task::spawn_blocking(move || {
            compositor.compose_blocking(&image_path, &story, &output_path)
        })
        .await?
    }

    pub fn compose_blocking(
        &self,
        image_path: &Path,
        story: &str,
        output_path: &Path,
    ) -> Result<PathBuf> {
        info!("[FRAME] Composing story frame from {:?}", image_path);
        let img = image::open(image_path)?;
        let frame = self.render(&img, story);

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        DynamicImage::ImageRgba8(frame)
            .to_rgb8()
            .save_with_format(output_path, image::ImageFormat::Png)?;

        info!("[FRAME] Saved {:?}", output_path);
        Ok(output_path.to_path_buf())
    }

    /// Draw the band and story text onto an RGBA copy of `img`.
    pub fn render(&self, img: &DynamicImage, story: &str) -> RgbaImage {
        let mut canvas = img.to_rgba8();
        let (width, height) = canvas.dimensions();
        let box_y = band_top(height);

        if width == 0 || height == 0 {
            return canvas;
        }

        let mut overlay = RgbaImage::new(width, height);
        let band = Rect::at(0, box_y as i32).of_size(width, height - box_y);
        draw_filled_rect_mut(&mut overlay, band, BAND_FILL);
        imageops::overlay(&mut canvas, &overlay, 0, 0);

        let Some(font) = self.load_font() else {
            return canvas;
        };

        let scale = PxScale::from(self.font_size);
        let scaled = font.as_scaled(scale);
        let line_height = (scaled.height() + scaled.line_gap()).ceil() as i32;
        let top = box_y as i32 + TEXT_TOP_PADDING;

        // lines past the bottom edge are clipped by draw_text_mut
        for (i, line) in wrap_text(story, WRAP_WIDTH).iter().enumerate() {
            let y = top + i as i32 * line_height;
            draw_text_mut(&mut canvas, TEXT_FILL, TEXT_LEFT, y, scale, &font, line);
        }

        canvas
    }
}

/// First row of the caption band.
pub fn band_top(height: u32) -> u32 {
    (height as f32 * BAND_START).floor() as u32
}

/// Greedy word wrap. Whitespace (newlines included) collapses to single
/// spaces; words longer than `width` are broken to fill the current line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line: Vec<char> = Vec::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while !word.is_empty() {
            let sep = usize::from(!line.is_empty());
            if line.len() + sep + word.len() <= width {
                if sep == 1 {
                    line.push(' ');
                }
                line.append(&mut word);
                break;
            }

            if word.len() > width {
                let room = width.saturating_sub(line.len() + sep);
                if room > 0 {
                    if sep == 1 {
                        line.push(' ');
                    }
                    let rest = word.split_off(room);
                    line.append(&mut word);
                    word = rest;
                }
            }

            if !line.is_empty() {
                lines.push(line.drain(..).collect());
            }
        }
    }

    if !line.is_empty() {
        lines.push(line.into_iter().collect());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_wrap_greedy_at_width() {
        let story = "Once upon a time a little red dragon found a glowing stone by the river";
        let lines = wrap_text(story, 40);
        assert_eq!(
            lines,
            vec![
                "Once upon a time a little red dragon",
                "found a glowing stone by the river",
            ]
        );
        assert!(lines.iter().all(|l| l.chars().count() <= 40));
    }

    #[test]
    fn test_wrap_collapses_whitespace() {
        assert_eq!(
            wrap_text("  Once\nthere   was\ta sun.\n\nIt smiled. ", 40),
            vec!["Once there was a sun. It smiled."]
        );
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        assert_eq!(wrap_text("aaaa bbbbbbbbbb", 6), vec!["aaaa b", "bbbbbb", "bbb"]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_empty_text() {
        assert!(wrap_text("", 40).is_empty());
        assert!(wrap_text(" \n\t ", 40).is_empty());
    }

    #[test]
    fn test_band_top() {
        assert_eq!(band_top(100), 65);
        assert_eq!(band_top(480), 312);
        assert_eq!(band_top(1), 0);
    }

    fn no_fonts() -> FrameCompositor {
        FrameCompositor {
            font_candidates: vec![PathBuf::from("/definitely/not/a/font.ttf")],
            font_size: DEFAULT_FONT_SIZE,
        }
    }

    #[test]
    fn test_band_darkens_lower_third_only() {
        let gray = image::RgbImage::from_pixel(20, 100, Rgb([200, 200, 200]));
        let frame = no_fonts().render(&DynamicImage::ImageRgb8(gray), "");
        let flat = DynamicImage::ImageRgba8(frame).to_rgb8();

        assert_eq!(flat.get_pixel(10, 64).0, [200, 200, 200]);

        // 200 * (1 - 160/255) ~= 75
        let inside = flat.get_pixel(10, 65).0;
        assert!(inside[0] < 90 && inside[0] > 60, "got {:?}", inside);
        assert_eq!(flat.get_pixel(0, 99).0, inside);
    }

    #[test]
    fn test_story_drawn_without_any_font_file() {
        let black = image::RgbImage::from_pixel(400, 300, Rgb([0, 0, 0]));
        let frame = no_fonts().render(&DynamicImage::ImageRgb8(black), "Once there was a sun.");

        let top = band_top(300);
        let bright = frame
            .enumerate_pixels()
            .filter(|(_, y, px)| *y >= top && px.0[0] > 200)
            .count();
        assert!(bright > 50, "only {} text pixels", bright);
        assert!(frame.enumerate_pixels().all(|(_, y, px)| y >= top || px.0[0] == 0));
    }

    #[test]
    fn test_bundled_font_parses() {
        assert!(FontArc::try_from_slice(BUNDLED_FONT).is_ok());
    }

    #[test]
    fn test_missing_font_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("drawing.png");
        image::RgbImage::from_pixel(64, 64, Rgb([10, 120, 220]))
            .save(&src)
            .unwrap();
        let out = dir.path().join("nested").join(FRAME_FILE_NAME);

        let path = no_fonts()
            .compose_blocking(&src, "Once there was a sun.", &out)
            .unwrap();

        assert_eq!(path, out);
        let saved = image::open(&out).unwrap();
        assert_eq!(saved.color(), image::ColorType::Rgb8);
        assert_eq!((saved.width(), saved.height()), (64, 64));
    }

    #[tokio::test]
    async fn test_undecodable_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("broken.png");
        std::fs::write(&src, b"not a png").unwrap();

        let err = no_fonts()
            .compose(&src, "story", &dir.path().join(FRAME_FILE_NAME))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::CanvasError::Decode(_)));
    }

    #[test]
    fn test_preferred_font_comes_first() {
        let c = FrameCompositor::with_font(Some(PathBuf::from("/opt/fonts/Story.ttf")));
        assert_eq!(c.font_candidates[0], PathBuf::from("/opt/fonts/Story.ttf"));
        assert_eq!(c.font_candidates[1], PathBuf::from("DejaVuSans-Bold.ttf"));
        assert_eq!(c.font_size, 36.0);
    }
}
