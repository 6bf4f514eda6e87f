//! Error types for the host bridge.
//!
//! Three families:
//! - load failures (fetch, format, compile, instantiate, missing exports): surfaced once at
//!   startup, never retried.
//! - usage errors (unknown/duplicate layer key, bad guest pointer, reentrant entry): fatal for
//!   the current guest call. When raised from inside an import they trap the guest, and the
//!   session hands the original error back to the caller.
//! - traps raised by the guest itself.

use crate::loader::LoadError;

/// Result alias used across the crate.
pub type Result<T, E = BridgeError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("failed to fetch module `{path}`: {source}")]
    Fetch {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("failed to instantiate module: {0:#}")]
    Instantiate(anyhow::Error),

    #[error("module is missing required export `{name}` ({detail})")]
    MissingExport { name: &'static str, detail: String },

    #[error("layer {key} was never created")]
    UnknownLayer { key: i32 },

    #[error("layer {key} already exists (id `{existing_id}`)")]
    DuplicateLayer { key: i32, existing_id: String },

    #[error("guest range {ptr:#x}+{len} is outside linear memory ({memory_size} bytes)")]
    MemoryOutOfBounds { ptr: u32, len: u32, memory_size: usize },

    #[error("module does not export its linear memory")]
    MissingMemory,

    #[error("`{entry}` called while the module is already executing `{active}`")]
    Reentrancy {
        entry: &'static str,
        active: &'static str,
    },

    #[error("module trapped in `{entry}`: {source:#}")]
    Trap {
        entry: &'static str,
        source: anyhow::Error,
    },

    #[error("failed to encode layer snapshot: {0}")]
    Snapshot(#[from] png::EncodingError),

    #[error("wasm engine setup failed: {0:#}")]
    Engine(anyhow::Error),
}

impl BridgeError {
    /// Usage errors are contract violations between module and host.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            BridgeError::UnknownLayer { .. }
                | BridgeError::DuplicateLayer { .. }
                | BridgeError::MemoryOutOfBounds { .. }
                | BridgeError::MissingMemory
                | BridgeError::Reentrancy { .. }
        )
    }

    /// Load failures abort startup.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            BridgeError::Fetch { .. }
                | BridgeError::Load(_)
                | BridgeError::Instantiate(_)
                | BridgeError::MissingExport { .. }
        )
    }
}
