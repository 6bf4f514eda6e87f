//! Software rasterization into packed `0xAARRGGBB` pixel buffers.
//!
//! Coverage is sampled at pixel centres: pixel `(i, j)` is covered when
//! `(i + 0.5, j + 0.5)` lies inside the shape. No anti-aliasing. Everything is
//! clipped to the target buffer.

/// Straight-alpha RGBA color.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// CSS `hsla(h, s%, l%, a)`.
    ///
    /// Hue wraps around 360; saturation and lightness are percentages clamped to
    /// `[0, 100]`; alpha is clamped to `[0, 1]`. Non-finite inputs count as 0.
    pub fn from_hsla(hue: f64, saturation: f64, lightness: f64, alpha: f64) -> Self {
        let h = finite_or_zero(hue).rem_euclid(360.0) / 60.0;
        let s = (finite_or_zero(saturation) / 100.0).clamp(0.0, 1.0);
        let l = (finite_or_zero(lightness) / 100.0).clamp(0.0, 1.0);
        let a = finite_or_zero(alpha).clamp(0.0, 1.0);

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let (r1, g1, b1) = match h as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma / 2.0;

        Self::new(
            unit_to_u8(r1 + m),
            unit_to_u8(g1 + m),
            unit_to_u8(b1 + m),
            unit_to_u8(a),
        )
    }

    pub const fn pack(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    pub const fn unpack(px: u32) -> Self {
        Self::new((px >> 16) as u8, (px >> 8) as u8, px as u8, (px >> 24) as u8)
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

fn unit_to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Source-over composite of `src` onto the packed pixel `dst`.
pub fn blend(dst: u32, src: Rgba) -> u32 {
    match src.a {
        0 => dst,
        255 => src.pack(),
        _ => {
            let d = Rgba::unpack(dst);
            let sa = src.a as f32 / 255.0;
            let da = d.a as f32 / 255.0;
            let out_a = sa + da * (1.0 - sa);
            let channel = |s: u8, d: u8| -> u8 {
                let c = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
                c.round().clamp(0.0, 255.0) as u8
            };
            Rgba::new(
                channel(src.r, d.r),
                channel(src.g, d.g),
                channel(src.b, d.b),
                (out_a * 255.0).round() as u8,
            )
            .pack()
        }
    }
}

/// Mutable view of a pixel buffer with its dimensions.
pub struct Canvas<'a> {
    pub width: u32,
    pub height: u32,
    pub pixels: &'a mut [u32],
}

impl Canvas<'_> {
    /// Index range of pixels whose centres fall in `[lo, hi)` along an axis of `extent` pixels.
    fn covered(lo: f64, hi: f64, extent: u32) -> std::ops::Range<usize> {
        let start = (lo - 0.5).ceil().clamp(0.0, extent as f64) as usize;
        let end = (hi - 0.5).ceil().clamp(0.0, extent as f64) as usize;
        start..end.max(start)
    }

    /// Fill an axis-aligned rectangle. Negative extents grow left/up, as on a 2D canvas.
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        if ![x, y, w, h].iter().all(|v| v.is_finite()) || color.a == 0 {
            return;
        }
        let (x0, x1) = if w < 0.0 { (x + w, x) } else { (x, x + w) };
        let (y0, y1) = if h < 0.0 { (y + h, y) } else { (y, y + h) };

        let cols = Self::covered(x0, x1, self.width);
        let stride = self.width as usize;
        for row in Self::covered(y0, y1, self.height) {
            let line = &mut self.pixels[row * stride + cols.start..row * stride + cols.end];
            if color.a == 255 {
                line.fill(color.pack());
            } else {
                for px in line {
                    *px = blend(*px, color);
                }
            }
        }
    }

    /// Fill a full circle of radius `r` centred on `(cx, cy)`.
    pub fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: Rgba) {
        if ![cx, cy, r].iter().all(|v| v.is_finite()) || r <= 0.0 || color.a == 0 {
            return;
        }
        let r_sq = r * r;
        let stride = self.width as usize;
        let cols = Self::covered(cx - r, cx + r + 1.0, self.width);

        for row in Self::covered(cy - r, cy + r + 1.0, self.height) {
            let dy = row as f64 + 0.5 - cy;
            for col in cols.clone() {
                let dx = col as f64 + 0.5 - cx;
                if dx * dx + dy * dy <= r_sq {
                    let px = &mut self.pixels[row * stride + col];
                    *px = blend(*px, color);
                }
            }
        }
    }

    /// Plot one integer pixel if it is inside the buffer.
    pub fn plot(&mut self, x: i64, y: i64, color: Rgba) {
        if x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64 {
            let idx = y as usize * self.width as usize + x as usize;
            self.pixels[idx] = blend(self.pixels[idx], color);
        }
    }
}
