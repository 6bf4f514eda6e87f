//! Module loader.
//!
//! Responsibilities:
//! - Fetch the module bytes from a [`ModuleSource`] (filesystem path or in-memory bytes).
//! - Detect whether the bytes are a `.wasm` binary or `.wat` text.
//! - If it looks like WAT, convert it to WASM bytes (via the `wat` crate).
//! - Compile a Wasmtime `Module` from the resulting WASM bytes.
//!
//! Instantiation against the import surface lives in `crate::runtime`.
//!
//! Notes:
//! - The module identifier is configurable, so extension sniffing is unreliable;
//!   we sniff the bytes themselves.
//! - We accept leading whitespace/BOM for WAT as best-effort.

use std::path::{Path, PathBuf};

use wasmtime::{Engine, Module};

use crate::error::BridgeError;

/// Error returned by loader helpers.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The input was empty or otherwise not recognized as WASM/WAT.
    #[error("unrecognized module format (expected wasm or wat)")]
    UnrecognizedFormat,
    /// WAT parsing failed.
    #[error("failed to parse WAT: {0}")]
    WatParseFailed(#[from] wat::Error),
    /// Wasmtime module compilation failed.
    #[error("failed to compile WASM module: {0:#}")]
    CompileFailed(anyhow::Error),
}

/// Where module bytes come from.
pub trait ModuleSource {
    /// Fetch the raw bytes for `id`. Called once per session; failures are not retried.
    fn fetch(&self, id: &str) -> Result<Vec<u8>, BridgeError>;
}

/// Reads modules from the filesystem, resolving identifiers against `root`.
#[derive(Clone, Debug, Default)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, id: &str) -> PathBuf {
        let path = Path::new(id);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl ModuleSource for FsSource {
    fn fetch(&self, id: &str) -> Result<Vec<u8>, BridgeError> {
        let path = self.resolve(id);
        std::fs::read(&path).map_err(|source| BridgeError::Fetch {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Serves a single module from memory, whatever identifier is asked for.
#[derive(Clone, Debug)]
pub struct BytesSource {
    bytes: Vec<u8>,
}

impl BytesSource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl ModuleSource for BytesSource {
    fn fetch(&self, _id: &str) -> Result<Vec<u8>, BridgeError> {
        Ok(self.bytes.clone())
    }
}

/// What kind of module the loader inferred from the bytes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DetectedFormat {
    Wasm,
    Wat,
}

/// Result of normalizing (detecting + possibly converting) the input.
#[derive(Clone, Debug)]
pub struct Detected {
    pub format: DetectedFormat,
    /// Always valid WASM bytes (for WASM/WAT inputs).
    pub wasm_bytes: Vec<u8>,
}

/// Fetch -> detect -> (optional) wat->wasm -> compile.
pub fn load_module(
    engine: &Engine,
    source: &dyn ModuleSource,
    id: &str,
) -> Result<Module, BridgeError> {
    let bytes = source.fetch(id)?;
    let module = compile_module(engine, &bytes)?;
    tracing::info!(module = id, bytes = bytes.len(), "compiled module");
    Ok(module)
}

/// Detect -> (optional) wat->wasm -> compile.
pub fn compile_module(engine: &Engine, bytes: &[u8]) -> Result<Module, LoadError> {
    let Detected { format, wasm_bytes } = normalize_to_wasm(bytes)?;
    tracing::debug!(?format, len = wasm_bytes.len(), "normalized module bytes");
    Module::new(engine, &wasm_bytes).map_err(LoadError::CompileFailed)
}

/// Detect format and normalize to valid WASM bytes.
pub fn normalize_to_wasm(bytes: &[u8]) -> Result<Detected, LoadError> {
    let format = detect_format(bytes).ok_or(LoadError::UnrecognizedFormat)?;

    let wasm_bytes = match format {
        DetectedFormat::Wasm => bytes.to_vec(),
        DetectedFormat::Wat => wat::parse_bytes(bytes)?.into_owned(),
    };
    Ok(Detected { format, wasm_bytes })
}

/// Best-effort detection.
///
/// Rules:
/// - If the first 4 bytes are `\0asm`, treat as WASM.
/// - Else, after stripping UTF-8 BOM / leading whitespace, if the first non-ws byte is `(`,
///   treat as WAT (common WAT starts with `(module ...)`).
pub fn detect_format(bytes: &[u8]) -> Option<DetectedFormat> {
    if bytes.starts_with(b"\0asm") {
        return Some(DetectedFormat::Wasm);
    }

    let rest = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match rest.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'(') => Some(DetectedFormat::Wat),
        _ => None,
    }
}
