//! Render layers and the registry the module draws through.
//!
//! A layer is a host-owned pixel buffer (packed `0xAARRGGBB`, straight alpha) plus the
//! size it is displayed at. The module addresses layers by small integer keys handed
//! out by itself in `js_create_layer`; every other layer call must name a key that
//! already exists.
//!
//! Layers are never removed during a session. The registry keeps creation order,
//! which is also the stacking order used when compositing.

pub mod font;
pub mod raster;
mod screen;


use std::collections::HashMap;
use std::io::Write;

use crate::error::BridgeError;
use raster::{Canvas, Rgba};

pub use screen::Screen;

/// Backing size of a freshly created surface (the 2D canvas default).
pub const DEFAULT_LAYER_WIDTH: u32 = 300;
pub const DEFAULT_LAYER_HEIGHT: u32 = 150;

/// Upper bound on either backing-store dimension.
pub const MAX_LAYER_DIMENSION: u32 = 16_384;

/// Font size and baseline used by the fps counter.
pub const FPS_FONT_SIZE: f64 = 40.0;
pub const FPS_ORIGIN: (f64, f64) = (5.0, 45.0);

/// Convert a requested surface dimension to a backing-store dimension.
pub(crate) fn backing_dimension(v: f64) -> u32 {
    if v.is_nan() || v <= 0.0 {
        0
    } else {
        v.floor().min(MAX_LAYER_DIMENSION as f64) as u32
    }
}

/// One drawable surface.
#[derive(Clone, Debug)]
pub struct Layer {
    id: String,
    width: u32,
    height: u32,
    quality: f64,
    display_width: f64,
    display_height: f64,
    pixels: Vec<u32>,
}

impl Layer {
    pub fn new(id: impl Into<String>) -> Self {
        let width = DEFAULT_LAYER_WIDTH;
        let height = DEFAULT_LAYER_HEIGHT;
        Self {
            id: id.into(),
            width,
            height,
            quality: 1.0,
            display_width: width as f64,
            display_height: height as f64,
            pixels: vec![0; (width * height) as usize],
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Backing-store size in device pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Displayed size in logical pixels (`backing / quality`).
    pub fn display_size(&self) -> (f64, f64) {
        (self.display_width, self.display_height)
    }

    pub fn quality(&self) -> f64 {
        self.quality
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Packed pixel at `(x, y)`, or `None` outside the backing store.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        (x < self.width && y < self.height)
            .then(|| self.pixels[(y * self.width + x) as usize])
    }

    /// Resize the backing store to `width x height` and display it at
    /// `width/quality x height/quality`.
    ///
    /// Like assigning a canvas size, this always resets the contents to transparent.
    pub fn set_size(&mut self, width: f64, height: f64, quality: f64) {
        self.width = backing_dimension(width);
        self.height = backing_dimension(height);
        self.quality = quality;
        self.display_width = width / quality;
        self.display_height = height / quality;
        self.pixels.clear();
        self.pixels.resize(self.width as usize * self.height as usize, 0);
    }

    /// Clear the whole backing store to transparent.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn canvas(&mut self) -> Canvas<'_> {
        Canvas {
            width: self.width,
            height: self.height,
            pixels: &mut self.pixels,
        }
    }

    /// Fill the square `[x, x+size) x [y, y+size)`.
    pub fn fill_square(&mut self, x: f64, y: f64, size: f64, color: Rgba) {
        self.canvas().fill_rect(x, y, size, size, color);
    }

    pub fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
        self.canvas().fill_circle(x, y, radius, color);
    }

    pub fn fill_text(&mut self, text: &str, font_size: f64, x: f64, baseline: f64, color: Rgba) {
        font::fill_text(&mut self.canvas(), text, font_size, x, baseline, color);
    }

    /// Draw the rounded fps counter at its fixed position.
    pub fn draw_fps(&mut self, fps: f64) {
        let (x, y) = FPS_ORIGIN;
        self.fill_text(&font::fps_label(fps), FPS_FONT_SIZE, x, y, Rgba::WHITE);
    }

    /// Straight-alpha RGBA8 bytes, row-major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        to_rgba8(&self.pixels)
    }

    /// Encode the backing store as a PNG snapshot.
    pub fn write_png<W: Write>(&self, writer: W) -> Result<(), BridgeError> {
        write_png(writer, self.width, self.height, &self.pixels)
    }
}

/// Unpack `0xAARRGGBB` pixels into RGBA8 bytes.
pub fn to_rgba8(pixels: &[u32]) -> Vec<u8> {
    pixels
        .iter()
        .flat_map(|&px| {
            let c = Rgba::unpack(px);
            [c.r, c.g, c.b, c.a]
        })
        .collect()
}

/// Encode a packed pixel buffer as an 8-bit RGBA PNG.
pub fn write_png<W: Write>(
    writer: W,
    width: u32,
    height: u32,
    pixels: &[u32],
) -> Result<(), BridgeError> {
    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&to_rgba8(pixels))?;
    Ok(())
}

/// Integer-keyed arena of layers.
#[derive(Debug, Default)]
pub struct LayerRegistry {
    slots: HashMap<i32, usize>,
    layers: Vec<(i32, Layer)>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new layer under `key`.
    ///
    /// A key can only be created once; the existing layer is left untouched and a
    /// [`BridgeError::DuplicateLayer`] is returned.
    pub fn create(&mut self, key: i32, id: impl Into<String>) -> Result<&mut Layer, BridgeError> {
        if let Some(&slot) = self.slots.get(&key) {
            return Err(BridgeError::DuplicateLayer {
                key,
                existing_id: self.layers[slot].1.id.clone(),
            });
        }
        let slot = self.layers.len();
        self.slots.insert(key, slot);
        self.layers.push((key, Layer::new(id)));
        Ok(&mut self.layers[slot].1)
    }

    pub fn contains(&self, key: i32) -> bool {
        self.slots.contains_key(&key)
    }

    pub fn get(&self, key: i32) -> Result<&Layer, BridgeError> {
        let slot = *self
            .slots
            .get(&key)
            .ok_or(BridgeError::UnknownLayer { key })?;
        Ok(&self.layers[slot].1)
    }

    pub fn get_mut(&mut self, key: i32) -> Result<&mut Layer, BridgeError> {
        let slot = *self
            .slots
            .get(&key)
            .ok_or(BridgeError::UnknownLayer { key })?;
        Ok(&mut self.layers[slot].1)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &Layer)> {
        self.layers.iter().map(|(key, layer)| (*key, layer))
    }

    // --- Operations behind the import surface ---

    pub fn set_layer_size(
        &mut self,
        key: i32,
        width: f64,
        height: f64,
        quality: f64,
    ) -> Result<(), BridgeError> {
        self.get_mut(key)?.set_size(width, height, quality);
        Ok(())
    }

    pub fn clear_screen(&mut self, key: i32) -> Result<(), BridgeError> {
        self.get_mut(key)?.clear();
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_tile(
        &mut self,
        key: i32,
        x: f64,
        y: f64,
        size: f64,
        hue: f64,
        saturation: f64,
        lightness: f64,
        alpha: f64,
    ) -> Result<(), BridgeError> {
        let color = Rgba::from_hsla(hue, saturation, lightness, alpha);
        self.get_mut(key)?.fill_square(x, y, size, color);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_circle(
        &mut self,
        key: i32,
        x: f64,
        y: f64,
        radius: f64,
        hue: f64,
        saturation: f64,
        lightness: f64,
        alpha: f64,
    ) -> Result<(), BridgeError> {
        let color = Rgba::from_hsla(hue, saturation, lightness, alpha);
        self.get_mut(key)?.fill_circle(x, y, radius, color);
        Ok(())
    }

    pub fn draw_fps(&mut self, key: i32, fps: f64) -> Result<(), BridgeError> {
        self.get_mut(key)?.draw_fps(fps);
        Ok(())
    }
}
