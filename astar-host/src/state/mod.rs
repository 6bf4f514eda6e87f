//! Host-side state the import surface works against.
//!
//! One [`HostContext`] lives in the wasmtime store for the whole session. Imports reach
//! it through `Caller::data_mut`, so there is no ambient global state.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::layers::{LayerRegistry, Screen};
use crate::logging::LogSink;
use crate::tick::TickScheduler;

pub struct HostContext {
    pub layers: LayerRegistry,
    pub screen: Screen,
    pub scheduler: TickScheduler,
    pub logs: LogSink,
    rng: Pcg32,
    fault: Option<BridgeError>,
}

impl HostContext {
    pub fn new(config: &BridgeConfig) -> Self {
        let seed = config.rng_seed.unwrap_or_else(|| rand::rng().random());
        Self {
            layers: LayerRegistry::new(),
            screen: Screen::new(config.container_id.clone()),
            scheduler: TickScheduler::new(),
            logs: LogSink::default(),
            rng: Pcg32::seed_from_u64(seed),
            fault: None,
        }
    }

    /// Uniform float in `[0, 1)`.
    pub fn random(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Inclusive integer in `[min, max]`, computed as `floor(r * (max + 1 - min)) + min`.
    ///
    /// An empty or single-value range (`max <= min`) yields `min`.
    pub fn random_range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = max as f64 + 1.0 - min as f64;
        let value = (self.random() * span).floor() + min as f64;
        value.clamp(min as f64, max as f64) as i32
    }

    /// Park a usage error raised inside an import and produce the trap that unwinds the
    /// guest. The session picks the stashed error back up with [`Self::take_fault`].
    pub fn fault(&mut self, err: BridgeError) -> anyhow::Error {
        let trap = anyhow::anyhow!("{err}");
        // Keep the first one; anything after it happened while unwinding.
        self.fault.get_or_insert(err);
        trap
    }

    pub fn take_fault(&mut self) -> Option<BridgeError> {
        self.fault.take()
    }
}
