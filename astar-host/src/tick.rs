//! Tick scheduling: which driver invokes the module's `tick` export, and when.
//!
//! Imports only *record* requests here. Nothing in this module calls into the guest:
//! the session drains [`TickScheduler::take_requests`] after each guest call returns and
//! turns the requests into event-loop tasks.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::BridgeError;

/// Shortest interval period accepted from the module.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Which driver owns the tick loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TickMode {
    /// Neither driver has been requested yet.
    #[default]
    Uninitialized,
    /// One tick per display refresh, re-requested by the module each frame.
    AnimationFrame,
    /// Fixed-period ticks, started once and never cancelled.
    FixedInterval { period: Duration },
}

/// A scheduling request recorded during a guest call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickRequest {
    /// Run one tick at the next display refresh.
    AnimationFrame,
    /// Run a tick on the next turn, then every `period`.
    StartInterval { period: Duration },
}

#[derive(Debug, Default)]
pub struct TickScheduler {
    mode: TickMode,
    outbox: Vec<TickRequest>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> TickMode {
        self.mode
    }

    /// `js_request_tick`: ask for one tick at the next refresh.
    ///
    /// Returns whether the request was recorded. Every call queues its own frame
    /// callback. Once the interval driver is running this is a permanent no-op.
    pub fn request_tick(&mut self) -> bool {
        match self.mode {
            TickMode::FixedInterval { .. } => {
                debug!("request_tick ignored: interval tick is active");
                return false;
            }
            TickMode::Uninitialized => {
                debug!("tick mode -> animation frame");
                self.mode = TickMode::AnimationFrame;
            }
            TickMode::AnimationFrame => {}
        }

        self.outbox.push(TickRequest::AnimationFrame);
        true
    }

    /// `js_start_interval_tick`: switch to fixed-period ticks.
    ///
    /// Only the first call has any effect. Non-positive periods clamp to [`MIN_INTERVAL`].
    pub fn start_interval(&mut self, period_ms: i32) -> bool {
        if let TickMode::FixedInterval { period } = self.mode {
            warn!(
                requested_ms = period_ms,
                active_ms = period.as_millis() as u64,
                "interval tick already running; ignoring restart"
            );
            return false;
        }

        let period = if period_ms <= 0 {
            MIN_INTERVAL
        } else {
            Duration::from_millis(period_ms as u64)
        };
        debug!(period_ms = period.as_millis() as u64, "tick mode -> fixed interval");
        self.mode = TickMode::FixedInterval { period };
        self.outbox.push(TickRequest::StartInterval { period });
        true
    }

    /// Hand over everything recorded since the last drain, in request order.
    pub fn take_requests(&mut self) -> Vec<TickRequest> {
        std::mem::take(&mut self.outbox)
    }
}

/// Exclusivity guard around guest entry points.
///
/// At most one of `init`, `tick`, `key_down` or `key_up` may be executing at a time.
#[derive(Debug, Default)]
pub struct Turnstile {
    active: Option<&'static str>,
}

impl Turnstile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the entry point currently executing, if any.
    pub fn active(&self) -> Option<&'static str> {
        self.active
    }

    pub fn enter(&mut self, entry: &'static str) -> Result<(), BridgeError> {
        match self.active {
            Some(active) => Err(BridgeError::Reentrancy { entry, active }),
            None => {
                self.active = Some(entry);
                Ok(())
            }
        }
    }

    pub fn exit(&mut self) {
        self.active = None;
    }
}
