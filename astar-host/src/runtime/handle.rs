use wasmtime::{Instance, Memory, Store, TypedFunc, WasmParams, WasmResults};

use crate::abi::{GuestEntrypoints, guest_exports};
use crate::error::BridgeError;
use crate::memory;
use crate::state::HostContext;
use crate::tick::Turnstile;

/// A loaded and instantiated module.
///
/// Every entry-point call goes through a [`Turnstile`]: the module is never entered
/// while one of its calls is still on the stack.
pub struct ModuleHandle {
    store: Store<HostContext>,
    // Keeps the exports alive for the lifetime of the store.
    #[allow(dead_code)]
    instance: Instance,
    entry: GuestEntrypoints,
    turnstile: Turnstile,
}

impl ModuleHandle {
    pub(super) fn new(
        store: Store<HostContext>,
        instance: Instance,
        entry: GuestEntrypoints,
    ) -> Self {
        Self {
            store,
            instance,
            entry,
            turnstile: Turnstile::new(),
        }
    }

    /// `init(debug, render_interval_ms)`.
    pub fn init(&mut self, debug: bool, render_interval_ms: i32) -> Result<(), BridgeError> {
        let init = self.entry.init.clone();
        self.call(guest_exports::INIT, init, (i32::from(debug), render_interval_ms))
    }

    /// `tick(elapsed_ms)`.
    pub fn tick(&mut self, elapsed_ms: f64) -> Result<(), BridgeError> {
        let tick = self.entry.tick.clone();
        self.call(guest_exports::TICK, tick, elapsed_ms)
    }

    pub fn key_down(&mut self, key_code: u32) -> Result<(), BridgeError> {
        let key_down = self.entry.key_down.clone();
        self.call(guest_exports::KEY_DOWN, key_down, key_code)
    }

    pub fn key_up(&mut self, key_code: u32) -> Result<(), BridgeError> {
        let key_up = self.entry.key_up.clone();
        self.call(guest_exports::KEY_UP, key_up, key_code)
    }

    fn call<P, R>(
        &mut self,
        entry: &'static str,
        func: TypedFunc<P, R>,
        params: P,
    ) -> Result<R, BridgeError>
    where
        P: WasmParams,
        R: WasmResults,
    {
        self.turnstile.enter(entry)?;
        let result = func.call(&mut self.store, params);
        self.turnstile.exit();

        result.map_err(|source| match self.store.data_mut().take_fault() {
            Some(fault) => fault,
            None => BridgeError::Trap { entry, source },
        })
    }

    /// Entry point currently executing, if any.
    pub fn executing(&self) -> Option<&'static str> {
        self.turnstile.active()
    }

    pub fn context(&self) -> &HostContext {
        self.store.data()
    }

    pub fn context_mut(&mut self) -> &mut HostContext {
        self.store.data_mut()
    }

    pub fn memory(&self) -> Memory {
        self.entry.memory
    }

    /// Copy `len` bytes of guest memory at `ptr`.
    pub fn read_bytes(&self, ptr: u32, len: u32) -> Result<Vec<u8>, BridgeError> {
        memory::read_bytes(self.entry.memory, &self.store, ptr, len)
    }

    /// Decode `len` bytes of guest memory at `ptr` as text.
    pub fn read_str(&self, ptr: u32, len: u32) -> Result<String, BridgeError> {
        memory::read_str(self.entry.memory, &self.store, ptr, len)
    }

    /// Copy `bytes` into guest memory at `ptr`.
    pub fn write_bytes(&mut self, ptr: u32, bytes: &[u8]) -> Result<(), BridgeError> {
        let memory_size = self.entry.memory.data_size(&self.store);
        self.entry
            .memory
            .write(&mut self.store, ptr as usize, bytes)
            .map_err(|_| BridgeError::MemoryOutOfBounds {
                ptr,
                len: bytes.len() as u32,
                memory_size,
            })
    }
}
