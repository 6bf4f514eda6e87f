//! Built-in 5x7 bitmap font used for on-surface text (the fps counter).
//!
//! Each glyph is seven rows; bit 4 of a row is the leftmost column. Glyphs sit in an
//! 8-row em square and are scaled by an integer factor derived from the requested
//! font size. Characters without a glyph advance but draw nothing.

use super::raster::{Canvas, Rgba};

const GLYPH_WIDTH: i64 = 5;
const GLYPH_ROWS: i64 = 7;
const EM_ROWS: f64 = 8.0;
const ADVANCE_COLUMNS: i64 = GLYPH_WIDTH + 1;

fn glyph(ch: char) -> Option<[u8; 7]> {
    Some(match ch {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'f' => [0x06, 0x09, 0x08, 0x1C, 0x08, 0x08, 0x08],
        'p' => [0x00, 0x00, 0x1E, 0x11, 0x1E, 0x10, 0x10],
        's' => [0x00, 0x00, 0x0E, 0x10, 0x0E, 0x01, 0x1E],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        _ => return None,
    })
}

/// Pixel scale for a font size in px (at least 1).
pub fn scale_for(font_size: f64) -> i64 {
    if font_size.is_finite() {
        ((font_size / EM_ROWS).floor() as i64).max(1)
    } else {
        1
    }
}

/// Width in pixels that `text` occupies at `font_size`.
pub fn measure(text: &str, font_size: f64) -> i64 {
    text.chars().count() as i64 * ADVANCE_COLUMNS * scale_for(font_size)
}

/// Draw `text` with its left edge at `x` and its baseline at `baseline`.
pub fn fill_text(
    canvas: &mut Canvas<'_>,
    text: &str,
    font_size: f64,
    x: f64,
    baseline: f64,
    color: Rgba,
) {
    if !x.is_finite() || !baseline.is_finite() {
        return;
    }
    let scale = scale_for(font_size);
    let top = baseline.round() as i64 - GLYPH_ROWS * scale;
    let mut pen_x = x.round() as i64;

    // Whole run clipped away.
    let (width, height) = (canvas.width as i64, canvas.height as i64);
    let off_x = pen_x >= width || pen_x + measure(text, font_size) <= 0;
    let off_y = top >= height || top + GLYPH_ROWS * scale <= 0;
    if off_x || off_y {
        return;
    }

    for ch in text.chars() {
        if let Some(rows) = glyph(ch) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    let gx = pen_x + col * scale;
                    let gy = top + row as i64 * scale;
                    for sy in 0..scale {
                        for sx in 0..scale {
                            canvas.plot(gx + sx, gy + sy, color);
                        }
                    }
                }
            }
        }
        pen_x += ADVANCE_COLUMNS * scale;
    }
}

/// Text shown by `js_draw_fps`: the value rounded half-up, like `Math.round`.
pub fn fps_label(fps: f64) -> String {
    if fps.is_nan() {
        return "fps: NaN".to_string();
    }
    if fps.is_infinite() {
        return if fps > 0.0 { "fps: Infinity" } else { "fps: -Infinity" }.to_string();
    }
    let rounded = (fps + 0.5).floor();
    format!("fps: {}", rounded as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_label_rounds_half_up() {
        assert_eq!(fps_label(59.5), "fps: 60");
        assert_eq!(fps_label(59.49), "fps: 59");
        assert_eq!(fps_label(-0.4), "fps: 0");
        assert_eq!(fps_label(-2.5), "fps: -2");
        assert_eq!(fps_label(f64::NAN), "fps: NaN");
    }

    #[test]
    fn scale_follows_font_size() {
        assert_eq!(scale_for(40.0), 5);
        assert_eq!(scale_for(8.0), 1);
        assert_eq!(scale_for(2.0), 1);
        assert_eq!(scale_for(f64::INFINITY), 1);
        assert_eq!(measure("fps", 8.0), 18);
    }

    #[test]
    fn glyphs_sit_on_the_baseline() {
        let mut pixels = vec![0u32; 32 * 16];
        let mut canvas = Canvas {
            width: 32,
            height: 16,
            pixels: &mut pixels,
        };
        fill_text(&mut canvas, "1", 8.0, 0.0, 10.0, Rgba::WHITE);

        let rows: Vec<usize> = (0..16)
            .filter(|&y| (0..32).any(|x| pixels[y * 32 + x] != 0))
            .collect();
        assert_eq!(rows, (3..10).collect::<Vec<_>>());
    }

    #[test]
    fn runs_left_of_the_canvas_are_clipped_but_partial_runs_draw() {
        let mut pixels = vec![0u32; 32 * 16];
        let mut canvas = Canvas {
            width: 32,
            height: 16,
            pixels: &mut pixels,
        };
        let width = measure("11", 8.0) as f64;
        fill_text(&mut canvas, "11", 8.0, -width, 10.0, Rgba::WHITE);
        fill_text(&mut canvas, "11", 8.0, 32.0, 10.0, Rgba::WHITE);
        fill_text(&mut canvas, "11", 8.0, 0.0, 40.0, Rgba::WHITE);
        assert!(pixels.iter().all(|&p| p == 0));

        let mut canvas = Canvas {
            width: 32,
            height: 16,
            pixels: &mut pixels,
        };
        // Only the second glyph lands on the canvas.
        fill_text(&mut canvas, "11", 8.0, -6.0, 10.0, Rgba::WHITE);
        assert!(pixels.iter().any(|&p| p != 0));
        assert!((6..32).all(|x| (0..16).all(|y| pixels[y * 32 + x] == 0)));
    }

    #[test]
    fn unknown_characters_only_advance() {
        let mut pixels = vec![0u32; 64 * 16];
        let mut canvas = Canvas {
            width: 64,
            height: 16,
            pixels: &mut pixels,
        };
        fill_text(&mut canvas, "?? ", 8.0, 0.0, 10.0, Rgba::WHITE);
        assert!(pixels.iter().all(|&p| p == 0));
    }
}
