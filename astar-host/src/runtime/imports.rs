//! Host import definitions.
//!
//! This module defines all the host functions imported by the module under `"env"`.
//! Imports only touch the [`HostContext`]; none of them calls back into the module.
//! A usage error parks the original [`BridgeError`] in the context and traps the guest.

use tracing::{debug, info};
use wasmtime::{Caller, Extern, Linker};

use crate::abi::{IMPORT_MODULE, guest_exports, host_imports};
use crate::error::BridgeError;
use crate::memory;
use crate::state::HostContext;

/// Decode a string argument out of the caller's exported memory.
fn guest_str(
    caller: &mut Caller<'_, HostContext>,
    ptr: u32,
    len: u32,
) -> Result<String, BridgeError> {
    let memory = caller
        .get_export(guest_exports::MEMORY)
        .and_then(Extern::into_memory)
        .ok_or(BridgeError::MissingMemory)?;
    memory::read_str(memory, &*caller, ptr, len)
}

/// Turn a usage error into a guest trap, keeping the error for the session.
fn trap_on<T>(
    caller: &mut Caller<'_, HostContext>,
    result: Result<T, BridgeError>,
) -> anyhow::Result<T> {
    result.map_err(|err| caller.data_mut().fault(err))
}

/// Define all host imports expected by the module under [`IMPORT_MODULE`].
///
/// Must be called before instantiating the module.
pub fn define_imports(linker: &mut Linker<HostContext>) -> Result<(), anyhow::Error> {
    // --- Engine ---
    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::RANDOM,
        |mut caller: Caller<'_, HostContext>| -> f64 { caller.data_mut().random() },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::RANDOM_RANGE,
        |mut caller: Caller<'_, HostContext>, min: i32, max: i32| -> i32 {
            caller.data_mut().random_range(min, max)
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::LOG,
        |mut caller: Caller<'_, HostContext>, ptr: u32, len: u32| -> anyhow::Result<()> {
            let msg = guest_str(&mut caller, ptr, len);
            let msg = trap_on(&mut caller, msg)?;
            info!(target: "guest", "{msg}");
            caller.data_mut().logs.push(msg);
            Ok(())
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::REQUEST_TICK,
        |mut caller: Caller<'_, HostContext>| {
            caller.data_mut().scheduler.request_tick();
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::START_INTERVAL_TICK,
        |mut caller: Caller<'_, HostContext>, period_ms: i32| {
            if caller.data_mut().scheduler.start_interval(period_ms) {
                info!(period_ms, "start interval tick");
            }
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::UPDATE,
        |_caller: Caller<'_, HostContext>| {},
    )?;

    // --- Layers ---
    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::CREATE_LAYER,
        |mut caller: Caller<'_, HostContext>,
         id_ptr: u32,
         id_len: u32,
         key: i32|
         -> anyhow::Result<()> {
            let id = guest_str(&mut caller, id_ptr, id_len);
            let id = trap_on(&mut caller, id)?;
            let ctx = caller.data_mut();
            debug!(key, id = %id, container = ctx.screen.id(), "create layer");
            let created = ctx.layers.create(key, id).map(|_| ());
            trap_on(&mut caller, created)
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::SET_SCREEN_SIZE,
        |mut caller: Caller<'_, HostContext>, width: f64, height: f64, quality: f64| {
            caller.data_mut().screen.set_size(width, height, quality);
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::SET_LAYER_SIZE,
        |mut caller: Caller<'_, HostContext>,
         key: i32,
         width: f64,
         height: f64,
         quality: f64|
         -> anyhow::Result<()> {
            let resized = caller
                .data_mut()
                .layers
                .set_layer_size(key, width, height, quality);
            trap_on(&mut caller, resized)
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::CLEAR_SCREEN,
        |mut caller: Caller<'_, HostContext>, key: i32| -> anyhow::Result<()> {
            let cleared = caller.data_mut().layers.clear_screen(key);
            trap_on(&mut caller, cleared)
        },
    )?;

    // --- Drawing ---
    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::DRAW_TILE,
        |mut caller: Caller<'_, HostContext>,
         key: i32,
         x: f64,
         y: f64,
         size: f64,
         h: f64,
         s: f64,
         l: f64,
         a: f64|
         -> anyhow::Result<()> {
            let drawn = caller
                .data_mut()
                .layers
                .draw_tile(key, x, y, size, h, s, l, a);
            trap_on(&mut caller, drawn)
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::DRAW_CIRCLE,
        |mut caller: Caller<'_, HostContext>,
         key: i32,
         x: f64,
         y: f64,
         r: f64,
         h: f64,
         s: f64,
         l: f64,
         a: f64|
         -> anyhow::Result<()> {
            let drawn = caller
                .data_mut()
                .layers
                .draw_circle(key, x, y, r, h, s, l, a);
            trap_on(&mut caller, drawn)
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::DRAW_FPS,
        |mut caller: Caller<'_, HostContext>, key: i32, fps: f64| -> anyhow::Result<()> {
            let drawn = caller.data_mut().layers.draw_fps(key, fps);
            trap_on(&mut caller, drawn)
        },
    )?;

    Ok(())
}
