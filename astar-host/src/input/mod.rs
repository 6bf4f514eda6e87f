//! Keyboard input: the host side publishes, the session forwards to the module.
//!
//! Events are never buffered beyond the bus, filtered, or debounced. They reach
//! `key_down`/`key_up` in exactly the order they were published.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::error::BridgeError;
use crate::runtime::ModuleHandle;

/// A raw signal from the window system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEvent {
    /// Key pressed, carrying the platform key code (DOM `keyCode` numbering).
    KeyDown(u32),
    /// Key released.
    KeyUp(u32),
}

/// Well-known key codes in the numbering the module expects.
pub mod keys {
    pub const LEFT: u32 = 37;
    pub const UP: u32 = 38;
    pub const RIGHT: u32 = 39;
    pub const DOWN: u32 = 40;
    pub const A: u32 = 65;
    pub const D: u32 = 68;
    pub const S: u32 = 83;
    pub const W: u32 = 87;
}

/// Publish/subscribe channel carrying [`HostEvent`]s into the session.
///
/// The receiving end stays with the session thread; [`Publisher`]s can be cloned and
/// moved to whatever thread owns the window.
pub struct EventBus {
    tx: Sender<HostEvent>,
    rx: Receiver<HostEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn publisher(&self) -> Publisher {
        Publisher {
            tx: self.tx.clone(),
        }
    }

    /// Everything published so far, in publish order, without blocking.
    pub fn drain(&self) -> impl Iterator<Item = HostEvent> + '_ {
        self.rx.try_iter()
    }
}

/// Sending half of an [`EventBus`].
#[derive(Clone, Debug)]
pub struct Publisher {
    tx: Sender<HostEvent>,
}

impl Publisher {
    /// Returns `false` once the session (and its bus) is gone.
    pub fn publish(&self, event: HostEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn key_down(&self, code: u32) -> bool {
        self.publish(HostEvent::KeyDown(code))
    }

    pub fn key_up(&self, code: u32) -> bool {
        self.publish(HostEvent::KeyUp(code))
    }
}

/// Deliver one event to the matching module export.
pub fn forward(handle: &mut ModuleHandle, event: HostEvent) -> Result<(), BridgeError> {
    match event {
        HostEvent::KeyDown(code) => handle.key_down(code),
        HostEvent::KeyUp(code) => handle.key_up(code),
    }
}
