//! The artwork compositor: photo on top, poem below, one flattened PNG.
//!
//! Rendering is pure and stateless: every call decodes its own copy of the
//! source image, allocates its own surface and hands the encoded result
//! back. Sizing is two-pass: a provisional surface is allocated from a
//! pre-wrap line-count estimate, then cropped or re-rendered once the
//! width-constrained wrapping pass has established the true text bottom.

use std::cmp::Ordering;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use imageproc::drawing::draw_text_mut;

use crate::error::{PoetError, PoetResult};
use crate::theme::Theme;

/// Images wider than this are scaled down; smaller ones keep full resolution.
pub const MAX_IMAGE_WIDTH: u32 = 800;
/// Uniform margin around the photo and the text block.
pub const PADDING: u32 = 40;
/// Vertical advance per visual poem line.
pub const LINE_HEIGHT: u32 = 24;
/// Poem face size in pixels.
pub const FONT_SIZE: f32 = 18.0;

/// The final composed raster, ready for download.
#[derive(Debug)]
pub struct Artifact {
    pub png: Vec<u8>,
    pub file_name: String,
}

/// Renders `(image, poem, style, theme)` into a downloadable PNG.
///
/// An empty poem is legal and produces an artifact holding only the image
/// block. Fails with `Decode` when the source bytes cannot be rasterized
/// and `Surface` when the output cannot be flattened.
pub fn compose(
    image_bytes: &[u8],
    poem: &str,
    style: &str,
    theme: &Theme,
    font: &FontVec,
) -> PoetResult<Artifact> {
    let img = image::load_from_memory(image_bytes)
        .map_err(|e| PoetError::decode(format!("could not decode source image: {e}")))?;

    let (scaled_w, scaled_h) = scaled_dimensions(img.width(), img.height());
    let scaled = img
        .resize_exact(scaled_w, scaled_h, FilterType::Lanczos3)
        .to_rgba8();

    let canvas_w = scaled_w + 2 * PADDING;
    let max_text_width = (canvas_w - 2 * PADDING) as f32;
    let scale = PxScale::from(FONT_SIZE);

    // Explicit lines are the poem's own breaks; wrapping happens per line.
    let explicit: Vec<&str> = if poem.is_empty() {
        Vec::new()
    } else {
        poem.split('\n').collect()
    };
    let lines: Vec<String> = explicit
        .iter()
        .flat_map(|line| wrap_line(line, font, scale, max_text_width))
        .collect();

    // Pre-wrap estimate: explicit line count only, deliberately approximate.
    let provisional_text_h = explicit.len() as u32 * LINE_HEIGHT + 2 * PADDING;
    let provisional_h = scaled_h + provisional_text_h + PADDING;

    let render = |height: u32| -> RgbaImage {
        let mut canvas = RgbaImage::from_pixel(canvas_w, height, theme.background);
        imageops::overlay(&mut canvas, &scaled, i64::from(PADDING), i64::from(PADDING));
        let mut cursor = scaled_h + 2 * PADDING;
        for line in &lines {
            if !line.is_empty() {
                draw_text_mut(
                    &mut canvas,
                    theme.foreground,
                    PADDING as i32,
                    cursor as i32,
                    scale,
                    font,
                    line,
                );
            }
            cursor += LINE_HEIGHT;
        }
        canvas
    };

    let surface = render(provisional_h);

    let true_bottom = scaled_h + 2 * PADDING + lines.len() as u32 * LINE_HEIGHT;
    // Never shorter than the image block plus its bottom margin.
    let final_h = true_bottom.max(scaled_h + 2 * PADDING);

    let surface = match final_h.cmp(&provisional_h) {
        // The estimate was short: re-render at full height, reusing the
        // already-wrapped lines (wrapping runs once; drawing is idempotent).
        Ordering::Greater => render(final_h),
        // The estimate was generous: crop the trailing dead space.
        Ordering::Less => imageops::crop_imm(&surface, 0, 0, canvas_w, final_h).to_image(),
        Ordering::Equal => surface,
    };

    let mut png = Vec::new();
    DynamicImage::ImageRgba8(surface)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| PoetError::surface(format!("could not encode artwork: {e}")))?;

    Ok(Artifact {
        png,
        file_name: artifact_file_name(style),
    })
}

/// `min(800, w)` wide, height from the original aspect ratio.
pub fn scaled_dimensions(natural_w: u32, natural_h: u32) -> (u32, u32) {
    let scaled_w = natural_w.min(MAX_IMAGE_WIDTH);
    let aspect = natural_w as f32 / natural_h as f32;
    let scaled_h = (scaled_w as f32 / aspect).round().max(1.0) as u32;
    (scaled_w, scaled_h)
}

/// `PicturePoem_<style-with-whitespace-as-underscores>.png`
pub fn artifact_file_name(style: &str) -> String {
    let slug = style.split_whitespace().collect::<Vec<_>>().join("_");
    format!("PicturePoem_{slug}.png")
}

/// Greedy word wrap of one explicit poem line: words accumulate until the
/// next would overflow the bound, then the line flushes. A single word wider
/// than the bound still gets its own line. An empty explicit line (stanza
/// break) keeps exactly one visual row.
fn wrap_line<F: Font>(line: &str, font: &F, scale: PxScale, max_width: f32) -> Vec<String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return vec![String::new()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in words {
        let test = if current.is_empty() {
            word.to_owned()
        } else {
            format!("{current} {word}")
        };
        if measure_width(font, scale, &test) > max_width && !current.is_empty() {
            lines.push(current);
            current = word.to_owned();
        } else {
            current = test;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Advance-width of a text run including kerning.
fn measure_width<F: Font>(font: &F, scale: PxScale, text: &str) -> f32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0f32;
    let mut prev = None;
    for c in text.chars() {
        let glyph_id = scaled.glyph_id(c);
        if let Some(prev_id) = prev {
            width += scaled.kern(prev_id, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev = Some(glyph_id);
    }
    width
}

const FONT_CANDIDATES: [&str; 6] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
    "/usr/share/fonts/dejavu/DejaVuSerif.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSerif-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Times New Roman.ttf",
    "C:\\Windows\\Fonts\\times.ttf",
];

/// Loads the poem face: an explicit override path, or the first serif face
/// found among the well-known system locations.
pub fn load_serif_font(override_path: Option<&Path>) -> PoetResult<FontVec> {
    let candidates: Vec<PathBuf> = match override_path {
        Some(p) => vec![p.to_path_buf()],
        None => FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
    };

    for path in &candidates {
        if let Ok(data) = std::fs::read(path) {
            let font = FontVec::try_from_vec(data)
                .map_err(|e| PoetError::surface(format!("invalid font {}: {e}", path.display())))?;
            tracing::debug!(path = %path.display(), "loaded poem font");
            return Ok(font);
        }
    }

    Err(PoetError::surface(
        "no serif font found on this system; set POEM_FONT_PATH",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Font-dependent tests skip on hosts with no serif face installed.
    fn test_font() -> Option<FontVec> {
        let override_path = std::env::var_os("POEM_FONT_PATH").map(PathBuf::from);
        match load_serif_font(override_path.as_deref()) {
            Ok(font) => Some(font),
            Err(_) => {
                eprintln!("skipping: no serif font available on this host");
                None
            }
        }
    }

    fn png_of(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([90, 120, 150, 255]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn scaling_formula_is_exact() {
        assert_eq!(scaled_dimensions(1600, 900), (800, 450));
        assert_eq!(scaled_dimensions(800, 600), (800, 600));
        // Smaller images keep their natural resolution.
        assert_eq!(scaled_dimensions(640, 480), (640, 480));
        assert_eq!(scaled_dimensions(100, 50), (100, 50));
        // Tall portrait input.
        assert_eq!(scaled_dimensions(1000, 2000), (800, 1600));
    }

    #[test]
    fn file_name_slugs_whitespace() {
        assert_eq!(artifact_file_name("Free Verse"), "PicturePoem_Free_Verse.png");
        assert_eq!(artifact_file_name("Haiku"), "PicturePoem_Haiku.png");
    }

    #[test]
    fn two_line_poem_crops_to_exact_height() {
        let Some(font) = test_font() else { return };

        let artifact = compose(
            &png_of(1600, 900),
            "A lonely tree\nstands in silence",
            "Free Verse",
            &Theme::default(),
            &font,
        )
        .unwrap();

        let out = image::load_from_memory(&artifact.png).unwrap();
        // 800x450 image block, two visual lines: 450 + 2*40 + 2*24.
        assert_eq!(out.width(), 800 + 2 * PADDING);
        assert_eq!(out.height(), 450 + 2 * PADDING + 2 * LINE_HEIGHT);
        assert_eq!(artifact.file_name, "PicturePoem_Free_Verse.png");
    }

    #[test]
    fn empty_poem_keeps_only_the_image_block() {
        let Some(font) = test_font() else { return };

        let artifact = compose(&png_of(1600, 900), "", "Haiku", &Theme::default(), &font).unwrap();
        let out = image::load_from_memory(&artifact.png).unwrap();
        assert_eq!(out.height(), 450 + 2 * PADDING);
    }

    #[test]
    fn background_uses_theme_color() {
        let Some(font) = test_font() else { return };

        let artifact = compose(&png_of(200, 200), "", "Haiku", &Theme::default(), &font).unwrap();
        let out = image::load_from_memory(&artifact.png).unwrap().to_rgba8();
        assert_eq!(out.get_pixel(0, 0), &crate::theme::DEFAULT_BACKGROUND);
    }

    #[test]
    fn overflowing_line_extends_the_surface() {
        let Some(font) = test_font() else { return };

        // One explicit line, many words: the pre-wrap estimate covers a
        // single row, the wrapped text needs far more.
        let long_line = "over the hills and far away the morning light is slowly breaking"
            .repeat(4);
        let artifact = compose(
            &png_of(100, 100),
            &long_line,
            "Ballad",
            &Theme::default(),
            &font,
        )
        .unwrap();

        let out = image::load_from_memory(&artifact.png).unwrap();
        let provisional = 100 + (LINE_HEIGHT + 2 * PADDING) + PADDING;
        assert!(out.height() > provisional, "height {} <= {provisional}", out.height());
        // Final height is always image block + whole visual lines.
        assert_eq!((out.height() - (100 + 2 * PADDING)) % LINE_HEIGHT, 0);
    }

    #[test]
    fn stanza_break_keeps_its_row() {
        let Some(font) = test_font() else { return };

        let with_break = compose(&png_of(400, 300), "one\n\ntwo", "Haiku", &Theme::default(), &font)
            .unwrap();
        let without = compose(&png_of(400, 300), "one\ntwo", "Haiku", &Theme::default(), &font)
            .unwrap();

        let tall = image::load_from_memory(&with_break.png).unwrap().height();
        let short = image::load_from_memory(&without.png).unwrap().height();
        assert_eq!(tall, short + LINE_HEIGHT);
    }

    #[test]
    fn tighter_bound_never_produces_fewer_lines() {
        let Some(font) = test_font() else { return };

        let scale = PxScale::from(FONT_SIZE);
        let line = "the quick brown fox jumps over the lazy dog near the riverbank";
        let mut last = 0usize;
        for width in [800.0, 400.0, 200.0, 100.0, 50.0] {
            let count = wrap_line(line, &font, scale, width).len();
            assert!(count >= last, "count {count} shrank at width {width}");
            last = count;
        }
    }

    #[test]
    fn undecodable_bytes_are_a_decode_failure() {
        let Some(font) = test_font() else { return };

        let err = compose(b"not pixels", "poem", "Haiku", &Theme::default(), &font).unwrap_err();
        assert!(matches!(err, PoetError::Decode(_)), "got {err:?}");
    }
}
