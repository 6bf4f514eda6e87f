//! Wasmtime-backed runtime glue.
//!
//! - [`WasmtimeRuntime`] owns the engine and a linker with every host import defined.
//! - [`ModuleHandle`] owns the store (with its [`HostContext`](crate::state::HostContext))
//!   and calls the module's entry points.

mod handle;
pub mod imports;
pub mod runtime;

pub use handle::ModuleHandle;
pub use runtime::WasmtimeRuntime;
