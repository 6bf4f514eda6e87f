//! The running bridge: one module, one event loop, one input bus.
//!
//! A [`Session`] is the process-scoped owner of the [`ModuleHandle`]. Time is virtual:
//! nothing happens until the embedder drives the loop with [`Session::run_until_idle`],
//! [`Session::advance`] or [`Session::run_realtime`]. Each turn delivers one task to the
//! module, then converts whatever tick requests the module made into new tasks.

use std::io::Write;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace};

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::event_loop::{EventLoop, Task};
use crate::input::{self, EventBus, Publisher};
use crate::layers::{self, LayerRegistry, Screen};
use crate::loader::ModuleSource;
use crate::logging::LogSink;
use crate::runtime::{ModuleHandle, WasmtimeRuntime};
use crate::state::HostContext;
use crate::tick::{TickMode, TickRequest};

#[cfg(test)]
mod tests;

/// Longest the realtime driver sleeps before checking the input bus again.
const MAX_IDLE_SLEEP: Duration = Duration::from_millis(4);

pub struct Session {
    config: BridgeConfig,
    handle: ModuleHandle,
    events: EventLoop,
    bus: EventBus,
    ticks: u64,
}

impl Session {
    /// Load the configured module from `source`, then signal readiness by calling `init`.
    pub fn start(config: BridgeConfig, source: &dyn ModuleSource) -> Result<Self, BridgeError> {
        let runtime = WasmtimeRuntime::new()?;
        let context = HostContext::new(&config);
        let handle = runtime.load(source, &config.module_path, context)?;
        Self::with_handle(config, handle)
    }

    /// Take over an already instantiated module and call its `init`.
    pub fn with_handle(config: BridgeConfig, handle: ModuleHandle) -> Result<Self, BridgeError> {
        let mut session = Self {
            events: EventLoop::new(config.refresh_rate_hz),
            config,
            handle,
            bus: EventBus::new(),
            ticks: 0,
        };

        info!(
            debug = session.config.debug,
            render_interval_ms = session.config.render_interval_ms,
            "module ready; calling init"
        );
        let result = session
            .handle
            .init(session.config.debug, session.config.render_interval_ms);
        session.schedule_requests();
        result?;
        Ok(session)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// A cloneable sender for key events.
    pub fn publisher(&self) -> Publisher {
        self.bus.publisher()
    }

    /// Virtual time since the session started.
    pub fn now(&self) -> Duration {
        self.events.now()
    }

    pub fn tick_mode(&self) -> TickMode {
        self.handle.context().scheduler.mode()
    }

    /// Number of `tick` calls delivered so far.
    pub fn ticks_delivered(&self) -> u64 {
        self.ticks
    }

    /// Tasks waiting in the queue (including recurring interval ticks).
    pub fn pending_tasks(&self) -> usize {
        self.events.len()
    }

    pub fn layers(&self) -> &LayerRegistry {
        &self.handle.context().layers
    }

    pub fn screen(&self) -> &Screen {
        &self.handle.context().screen
    }

    pub fn logs(&self) -> &LogSink {
        &self.handle.context().logs
    }

    pub fn handle(&self) -> &ModuleHandle {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut ModuleHandle {
        &mut self.handle
    }

    /// Move published input into the task queue, behind anything already due now.
    pub fn pump_events(&mut self) -> usize {
        let mut count = 0;
        for event in self.bus.drain() {
            self.events.schedule_now(Task::Input(event));
            count += 1;
        }
        count
    }

    /// Run every task that is due without moving the clock.
    pub fn run_until_idle(&mut self) -> Result<usize, BridgeError> {
        self.run_through(self.events.now())
    }

    /// Run every task due within the next `delta`, then leave the clock at `now + delta`.
    pub fn advance(&mut self, delta: Duration) -> Result<usize, BridgeError> {
        let deadline = self.events.now() + delta;
        let turns = self.run_through(deadline)?;
        self.events.advance_to(deadline);
        Ok(turns)
    }

    /// Drive the loop against the wall clock for `budget`, sleeping between due tasks.
    ///
    /// Input published from other threads is picked up at least every few milliseconds.
    pub fn run_realtime(&mut self, budget: Duration) -> Result<usize, BridgeError> {
        let anchor = Instant::now();
        let base = self.events.now();
        let mut turns = 0;

        loop {
            let elapsed = anchor.elapsed().min(budget);
            turns += self.run_through(base + elapsed)?;
            self.events.advance_to(base + elapsed);
            if elapsed >= budget {
                break;
            }

            let until_budget = budget - elapsed;
            let until_due = self
                .events
                .next_due()
                .map(|due| due.saturating_sub(self.events.now()))
                .unwrap_or(until_budget);
            let nap = until_due.min(until_budget).min(MAX_IDLE_SLEEP);
            if !nap.is_zero() {
                std::thread::sleep(nap);
            }
        }
        Ok(turns)
    }

    fn run_through(&mut self, deadline: Duration) -> Result<usize, BridgeError> {
        let mut turns = 0;
        loop {
            self.pump_events();
            let Some(task) = self.events.pop_until(deadline) else {
                return Ok(turns);
            };
            turns += 1;
            self.run_task(task)?;
        }
    }

    fn run_task(&mut self, task: Task) -> Result<(), BridgeError> {
        trace!(?task, now_ms = self.events.now_ms(), "turn");
        let result = match task {
            Task::Input(event) => input::forward(&mut self.handle, event),
            Task::DeferredTick => self.deliver_tick(),
            Task::IntervalTick { period } => {
                self.events.schedule_after(period, Task::IntervalTick { period });
                self.deliver_tick()
            }
            Task::AnimationFrame => self.deliver_tick(),
        };
        self.schedule_requests();
        result
    }

    fn deliver_tick(&mut self) -> Result<(), BridgeError> {
        self.ticks += 1;
        self.handle.tick(self.events.now_ms())
    }

    /// Turn tick requests recorded during the last guest call into tasks.
    fn schedule_requests(&mut self) {
        for request in self.handle.context_mut().scheduler.take_requests() {
            match request {
                TickRequest::AnimationFrame => {
                    let at = self.events.next_refresh();
                    debug!(at_ms = at.as_secs_f64() * 1000.0, "animation frame scheduled");
                    self.events.schedule_at(at, Task::AnimationFrame);
                }
                TickRequest::StartInterval { period } => {
                    self.events.schedule_now(Task::DeferredTick);
                    self.events
                        .schedule_after(period, Task::IntervalTick { period });
                }
            }
        }
    }

    /// Flatten every layer into one frame the size of the screen.
    ///
    /// Returns `(width, height, pixels)` with pixels packed as `0xAARRGGBB`.
    pub fn composite(&self) -> (u32, u32, Vec<u32>) {
        let ctx = self.handle.context();
        ctx.screen.composite(&ctx.layers)
    }

    /// Encode the composited frame as PNG.
    pub fn write_png<W: Write>(&self, writer: W) -> Result<(), BridgeError> {
        let (width, height, pixels) = self.composite();
        layers::write_png(writer, width, height, &pixels)
    }
}
