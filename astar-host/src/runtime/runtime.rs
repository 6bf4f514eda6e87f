//! Engine setup and instantiation.

use tracing::{debug, info};
use wasmtime::{Engine, Linker, Module, Store};

use super::{ModuleHandle, imports};
use crate::abi::GuestEntrypoints;
use crate::error::BridgeError;
use crate::loader::{self, ModuleSource};
use crate::state::HostContext;

/// Host-side runtime container.
pub struct WasmtimeRuntime {
    engine: Engine,
    linker: Linker<HostContext>,
}

impl WasmtimeRuntime {
    /// Create an engine and a linker with all host imports already defined.
    ///
    /// The module is a plain `wasm32-unknown-unknown` build, so only the long-standardized
    /// proposals are turned on.
    pub fn new() -> Result<Self, BridgeError> {
        let mut cfg = wasmtime::Config::new();
        cfg.wasm_multi_value(true);
        cfg.wasm_bulk_memory(true);
        cfg.wasm_reference_types(true);
        cfg.wasm_simd(true);

        let engine = Engine::new(&cfg).map_err(BridgeError::Engine)?;
        let mut linker = Linker::new(&engine);
        imports::define_imports(&mut linker).map_err(BridgeError::Engine)?;

        Ok(Self { engine, linker })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Fetch, compile and instantiate in one go.
    pub fn load(
        &self,
        source: &dyn ModuleSource,
        id: &str,
        context: HostContext,
    ) -> Result<ModuleHandle, BridgeError> {
        let module = loader::load_module(&self.engine, source, id)?;
        self.instantiate(&module, context)
    }

    /// Instantiate a compiled module against the import surface and resolve its exports.
    pub fn instantiate(
        &self,
        module: &Module,
        context: HostContext,
    ) -> Result<ModuleHandle, BridgeError> {
        let mut store = Store::new(&self.engine, context);
        let instance = self.linker.instantiate(&mut store, module).map_err(|e| {
            // A start function can trap on a usage error just like any other entry point.
            match store.data_mut().take_fault() {
                Some(fault) => fault,
                None => BridgeError::Instantiate(e),
            }
        })?;

        let entrypoints = GuestEntrypoints::resolve(&instance, &mut store).map_err(|e| {
            BridgeError::MissingExport {
                name: e.name,
                detail: e.detail,
            }
        })?;

        debug!(
            memory_bytes = entrypoints.memory.data_size(&store),
            "resolved module exports"
        );
        info!("module instantiated");
        Ok(ModuleHandle::new(store, instance, entrypoints))
    }
}
