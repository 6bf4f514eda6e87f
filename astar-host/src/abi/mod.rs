//! ABI contract between the host bridge and the loaded module.
//!
//! ## Imports (module -> host)
//! Imported from module `"env"`. Every name carries a `js_` prefix so the
//! interop layer is easy to find on the guest side.
//!
//! ### Engine
//! - `js_random() -> f64`
//! - `js_random_range(min: i32, max: i32) -> i32`
//! - `js_log(ptr: u32, len: u32)`
//! - `js_request_tick()`
//! - `js_start_interval_tick(period_ms: i32)`
//! - `js_update()`
//!
//! ### Layers
//! - `js_create_layer(id_ptr: u32, id_len: u32, key: i32)`
//! - `js_set_screen_size(width: f64, height: f64, quality: f64)`
//! - `js_set_layer_size(key: i32, width: f64, height: f64, quality: f64)`
//! - `js_clear_screen(key: i32)`
//!
//! ### Drawing
//! - `js_draw_tile(key: i32, x: f64, y: f64, size: f64, h: f64, s: f64, l: f64, a: f64)`
//! - `js_draw_circle(key: i32, x: f64, y: f64, r: f64, h: f64, s: f64, l: f64, a: f64)`
//! - `js_draw_fps(key: i32, fps: f64)`
//!
//! ## Exports (host -> module) required
//! - `memory`
//! - `init(debug: i32, render_interval_ms: i32)`
//! - `tick(elapsed_ms: f64)`
//! - `key_down(key_code: u32)`
//! - `key_up(key_code: u32)`
//!
//! ## ABI Stability
//! Names, parameter order and types are the wire contract; instantiation fails on any
//! mismatch.

use wasmtime::{Instance, Memory, Store, TypedFunc};

/// Import module name used by the guest.
pub const IMPORT_MODULE: &str = "env";

/// Guest export names (entrypoints).
pub mod guest_exports {
    pub const MEMORY: &str = "memory";
    pub const INIT: &str = "init";
    pub const TICK: &str = "tick";
    pub const KEY_DOWN: &str = "key_down";
    pub const KEY_UP: &str = "key_up";
}

/// Host import names provided to the guest under [`IMPORT_MODULE`](super::IMPORT_MODULE).
pub mod host_imports {
    // Engine
    pub const RANDOM: &str = "js_random";
    pub const RANDOM_RANGE: &str = "js_random_range";
    pub const LOG: &str = "js_log";
    pub const REQUEST_TICK: &str = "js_request_tick";
    pub const START_INTERVAL_TICK: &str = "js_start_interval_tick";
    pub const UPDATE: &str = "js_update";

    // Layers
    pub const CREATE_LAYER: &str = "js_create_layer";
    pub const SET_SCREEN_SIZE: &str = "js_set_screen_size";
    pub const SET_LAYER_SIZE: &str = "js_set_layer_size";
    pub const CLEAR_SCREEN: &str = "js_clear_screen";

    // Drawing
    pub const DRAW_TILE: &str = "js_draw_tile";
    pub const DRAW_CIRCLE: &str = "js_draw_circle";
    pub const DRAW_FPS: &str = "js_draw_fps";
}

/// Typed view of the module's entrypoints plus its memory.
///
/// Resolved once after instantiation and kept for the whole session.
#[derive(Clone)]
pub struct GuestEntrypoints {
    pub memory: Memory,
    pub init: TypedFunc<(i32, i32), ()>,
    pub tick: TypedFunc<f64, ()>,
    pub key_down: TypedFunc<u32, ()>,
    pub key_up: TypedFunc<u32, ()>,
}

impl GuestEntrypoints {
    /// Resolve all required exports, naming the first one that is missing or mistyped.
    pub fn resolve<T: 'static>(
        instance: &Instance,
        store: &mut Store<T>,
    ) -> Result<Self, MissingExport> {
        let memory = instance
            .get_memory(&mut *store, guest_exports::MEMORY)
            .ok_or(MissingExport {
                name: guest_exports::MEMORY,
                detail: "no exported memory".to_string(),
            })?;

        Ok(Self {
            memory,
            init: typed(instance, store, guest_exports::INIT)?,
            tick: typed(instance, store, guest_exports::TICK)?,
            key_down: typed(instance, store, guest_exports::KEY_DOWN)?,
            key_up: typed(instance, store, guest_exports::KEY_UP)?,
        })
    }
}

fn typed<T: 'static, P, R>(
    instance: &Instance,
    store: &mut Store<T>,
    name: &'static str,
) -> Result<TypedFunc<P, R>, MissingExport>
where
    P: wasmtime::WasmParams,
    R: wasmtime::WasmResults,
{
    instance
        .get_typed_func::<P, R>(&mut *store, name)
        .map_err(|e| MissingExport {
            name,
            detail: format!("{e:#}"),
        })
}

/// A required export was absent or had the wrong signature.
#[derive(Debug)]
pub struct MissingExport {
    pub name: &'static str,
    pub detail: String,
}
