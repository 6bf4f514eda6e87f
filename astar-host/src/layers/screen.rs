//! The display container that layers are stacked inside.

use super::raster::{Rgba, blend};
use super::{LayerRegistry, backing_dimension};

fn display_dimension(v: f64) -> u32 {
    if v.is_finite() { backing_dimension(v) } else { 0 }
}

/// Logical display container (the element layers are appended to).
#[derive(Clone, Debug)]
pub struct Screen {
    id: String,
    display_width: f64,
    display_height: f64,
}

impl Screen {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_width: 0.0,
            display_height: 0.0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Size the container to `width/quality x height/quality` logical pixels.
    ///
    /// Independent of any single layer.
    pub fn set_size(&mut self, width: f64, height: f64, quality: f64) {
        self.display_width = width / quality;
        self.display_height = height / quality;
    }

    pub fn display_size(&self) -> (f64, f64) {
        (self.display_width, self.display_height)
    }

    /// Flatten all layers into one frame at the container's logical size.
    ///
    /// Layers are stacked in creation order from the top-left corner, each scaled
    /// (nearest neighbour) from its backing store to its displayed size, and clipped
    /// to the container. Returns `(width, height, pixels)`.
    ///
    /// A non-finite size (quality 0) is not a displayable size: such a container
    /// composites to an empty frame and such layers are skipped.
    pub fn composite(&self, layers: &LayerRegistry) -> (u32, u32, Vec<u32>) {
        let out_w = display_dimension(self.display_width);
        let out_h = display_dimension(self.display_height);
        let mut frame = vec![0u32; out_w as usize * out_h as usize];

        for (_, layer) in layers.iter() {
            let (src_w, src_h) = layer.size();
            let (disp_w, disp_h) = layer.display_size();
            let visible = src_w > 0
                && src_h > 0
                && disp_w.is_finite()
                && disp_h.is_finite()
                && disp_w > 0.0
                && disp_h > 0.0;
            if !visible {
                continue;
            }
            let cols = backing_dimension(disp_w).min(out_w);
            let rows = backing_dimension(disp_h).min(out_h);
            let sx = src_w as f64 / disp_w;
            let sy = src_h as f64 / disp_h;

            for y in 0..rows {
                let src_y = (((y as f64 + 0.5) * sy) as u32).min(src_h - 1);
                for x in 0..cols {
                    let src_x = (((x as f64 + 0.5) * sx) as u32).min(src_w - 1);
                    let src = layer.pixels()[(src_y * src_w + src_x) as usize];
                    let dst = &mut frame[(y * out_w + x) as usize];
                    *dst = blend(*dst, Rgba::unpack(src));
                }
            }
        }

        (out_w, out_h, frame)
    }
}
