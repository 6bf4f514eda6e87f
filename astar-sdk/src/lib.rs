#![cfg_attr(not(feature = "std"), no_std)]

//! astar-sdk
//!
//! Bindings used by **guest** modules that run under the astar host bridge.
//!
//! ABI model:
//! - The host owns every render layer; the module refers to them by small integer keys
//!   it picks itself.
//! - The module issues draw commands against those keys.
//! - The module exports `init`, `tick`, `key_down` and `key_up` (plus its `memory`).
//!
//! All imports live in module `"env"` and carry a `js_` prefix.

/// Re-exported so modules can install it as their global allocator.
#[cfg(feature = "wee_alloc")]
pub use wee_alloc;

/// Low-level raw ABI imports.
pub mod sys {
    unsafe extern "C" {
        // Engine
        pub fn js_random() -> f64;
        pub fn js_random_range(min: i32, max: i32) -> i32;
        pub fn js_log(ptr: u32, len: u32);
        pub fn js_request_tick();
        pub fn js_start_interval_tick(period_ms: i32);
        pub fn js_update();

        // Layers
        pub fn js_create_layer(id_ptr: u32, id_len: u32, key: i32);
        pub fn js_set_screen_size(width: f64, height: f64, quality: f64);
        pub fn js_set_layer_size(key: i32, width: f64, height: f64, quality: f64);
        pub fn js_clear_screen(key: i32);

        // Drawing
        pub fn js_draw_tile(key: i32, x: f64, y: f64, size: f64, h: f64, s: f64, l: f64, a: f64);
        pub fn js_draw_circle(key: i32, x: f64, y: f64, r: f64, h: f64, s: f64, l: f64, a: f64);
        pub fn js_draw_fps(key: i32, fps: f64);
    }
}

/// A fill color in CSS `hsla()` terms.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hsla {
    /// Degrees; wraps around 360.
    pub h: f64,
    /// Percent, 0-100.
    pub s: f64,
    /// Percent, 0-100.
    pub l: f64,
    /// 0-1.
    pub a: f64,
}

impl Hsla {
    pub const BLACK: Hsla = Hsla::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Hsla = Hsla::new(0.0, 0.0, 100.0, 1.0);

    pub const fn new(h: f64, s: f64, l: f64, a: f64) -> Self {
        Self { h, s, l, a }
    }

    pub const fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }
}

/// Key codes as delivered to `key_down` / `key_up`.
pub mod keys {
    pub const LEFT: u32 = 37;
    pub const UP: u32 = 38;
    pub const RIGHT: u32 = 39;
    pub const DOWN: u32 = 40;
    pub const A: u32 = 65;
    pub const D: u32 = 68;
    pub const S: u32 = 83;
    pub const W: u32 = 87;
}

/// Engine API: randomness, logging and tick scheduling.
pub mod engine {
    use super::sys;

    /// Uniform float in `[0, 1)`.
    pub fn random() -> f64 {
        unsafe { sys::js_random() }
    }

    /// Integer in `[min, max]` (inclusive). Returns `min` when `max <= min`.
    pub fn random_range(min: i32, max: i32) -> i32 {
        unsafe { sys::js_random_range(min, max) }
    }

    /// Log a message to the host console.
    pub fn log(message: &str) {
        unsafe { sys::js_log(message.as_ptr() as u32, message.len() as u32) }
    }

    /// Ask for one `tick` at the next display refresh. Call again from each tick to keep
    /// the loop going. Ignored once the interval tick is running.
    pub fn request_tick() {
        unsafe { sys::js_request_tick() }
    }

    /// Switch to fixed-period ticks. The first tick arrives on the host's next turn, never
    /// from inside this call.
    pub fn start_interval_tick(period_ms: i32) {
        unsafe { sys::js_start_interval_tick(period_ms) }
    }

    /// Reserved hook; currently does nothing on the host.
    pub fn update() {
        unsafe { sys::js_update() }
    }
}

/// Layer API: the screen container and the layers stacked inside it.
pub mod layers {
    use super::sys;

    /// Create a layer with a DOM-style `id` under `key`. Each key can be created once.
    pub fn create(id: &str, key: i32) {
        unsafe { sys::js_create_layer(id.as_ptr() as u32, id.len() as u32, key) }
    }

    /// Size the screen container to `width/quality x height/quality`.
    pub fn set_screen_size(width: f64, height: f64, quality: f64) {
        unsafe { sys::js_set_screen_size(width, height, quality) }
    }

    /// Give layer `key` a `width x height` backing store shown at `width/quality x height/quality`.
    /// Resets its contents.
    pub fn set_size(key: i32, width: f64, height: f64, quality: f64) {
        unsafe { sys::js_set_layer_size(key, width, height, quality) }
    }

    /// Clear layer `key` to transparent.
    pub fn clear(key: i32) {
        unsafe { sys::js_clear_screen(key) }
    }
}

/// Drawing API.
pub mod draw {
    use super::{Hsla, sys};

    /// Fill the square `[x, x+size) x [y, y+size)`.
    pub fn tile(key: i32, x: f64, y: f64, size: f64, color: Hsla) {
        unsafe { sys::js_draw_tile(key, x, y, size, color.h, color.s, color.l, color.a) }
    }

    /// Fill a circle of radius `r` centred on `(x, y)`.
    pub fn circle(key: i32, x: f64, y: f64, r: f64, color: Hsla) {
        unsafe { sys::js_draw_circle(key, x, y, r, color.h, color.s, color.l, color.a) }
    }

    /// Draw the `fps: N` counter in the top-left corner.
    pub fn fps(key: i32, fps: f64) {
        unsafe { sys::js_draw_fps(key, fps) }
    }
}

/// Convenience prelude for guest modules.
pub mod prelude {
    pub use crate::Hsla;
    pub use crate::draw;
    pub use crate::engine;
    pub use crate::keys;
    pub use crate::layers;
}
