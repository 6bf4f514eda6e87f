//! astar-host: the host bridge that loads the wasm-astar module and runs it.
//!
//! The module is a pre-compiled WebAssembly program that owns its own simulation. The
//! bridge gives it three things:
//! - a fixed import surface (`env.js_*`) for randomness, logging, layer creation and
//!   drawing, and tick requests;
//! - a registry of integer-keyed render layers it draws into, stacked inside a screen;
//! - a tick scheduler that invokes its `tick` export either once per display refresh or
//!   on a fixed interval.
//!
//! Required module exports:
//! - `memory`
//! - `init(debug, render_interval_ms)`
//! - `tick(elapsed_ms)`
//! - `key_down(key_code)` / `key_up(key_code)`
//!
//! The ABI surface is defined in [`abi`] and mirrored by `astar-sdk`.
//!
//! ```no_run
//! use std::time::Duration;
//! use astar_host::{BridgeConfig, FsSource, Session};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! astar_host::logging::init("info");
//! let config = BridgeConfig::load("astar.toml")?;
//! let mut session = Session::start(config, &FsSource::new("."))?;
//! let keys = session.publisher();
//! keys.key_down(astar_host::input::keys::RIGHT);
//! session.run_realtime(Duration::from_secs(5))?;
//! let mut frame = Vec::new();
//! session.write_png(&mut frame)?;
//! # Ok(())
//! # }
//! ```

pub mod abi;
pub mod config;
pub mod error;
pub mod event_loop;
pub mod input;
pub mod layers;
pub mod loader;
pub mod logging;
pub mod memory;
pub mod runtime;
pub mod session;
pub mod state;
pub mod tick;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{BridgeConfig, ConfigError};
pub use error::{BridgeError, Result};
pub use input::{EventBus, HostEvent, Publisher};
pub use layers::{Layer, LayerRegistry, Screen};
pub use loader::{BytesSource, FsSource, LoadError, ModuleSource};
pub use runtime::{ModuleHandle, WasmtimeRuntime};
pub use session::Session;
pub use state::HostContext;
pub use tick::{TickMode, TickScheduler, Turnstile};
