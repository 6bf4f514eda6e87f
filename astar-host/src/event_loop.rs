//! Cooperative task queue with a virtual clock.
//!
//! Every delivery into the module (key events and ticks) is a task. A turn pops the
//! earliest task and runs it to completion before the next one is looked at. Tasks due at
//! the same instant run in the order they were scheduled.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use crate::input::HostEvent;

/// Work the session performs on one turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    /// Forward a host event to the module.
    Input(HostEvent),
    /// One-shot tick on the turn after the interval driver was started.
    DeferredTick,
    /// Recurring fixed-interval tick; reschedules itself `period` later.
    IntervalTick { period: Duration },
    /// Tick delivered at a display refresh.
    AnimationFrame,
}

#[derive(Debug)]
struct Scheduled {
    due: Duration,
    seq: u64,
    task: Task,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    // Reversed so the max-heap yields the earliest (due, seq) first.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due, other.seq).cmp(&(self.due, self.seq))
    }
}

pub struct EventLoop {
    now: Duration,
    seq: u64,
    refresh_period: Duration,
    queue: BinaryHeap<Scheduled>,
}

impl EventLoop {
    /// New loop at time zero, refreshing the display `refresh_rate_hz` times per second.
    pub fn new(refresh_rate_hz: u32) -> Self {
        let refresh_period = Duration::from_secs_f64(1.0 / refresh_rate_hz.max(1) as f64);
        Self {
            now: Duration::ZERO,
            seq: 0,
            refresh_period,
            queue: BinaryHeap::new(),
        }
    }

    /// Virtual time since the session started.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// `now()` in milliseconds, the timestamp handed to `tick`.
    pub fn now_ms(&self) -> f64 {
        self.now.as_secs_f64() * 1000.0
    }

    pub fn refresh_period(&self) -> Duration {
        self.refresh_period
    }

    /// First refresh boundary strictly after `now()`.
    pub fn next_refresh(&self) -> Duration {
        let period = self.refresh_period.as_nanos();
        let frames = self.now.as_nanos() / period + 1;
        Duration::from_nanos((frames * period) as u64)
    }

    pub fn schedule_at(&mut self, due: Duration, task: Task) {
        let due = due.max(self.now);
        self.seq += 1;
        self.queue.push(Scheduled {
            due,
            seq: self.seq,
            task,
        });
    }

    /// Queue `task` behind everything already due now.
    pub fn schedule_now(&mut self, task: Task) {
        self.schedule_at(self.now, task);
    }

    pub fn schedule_after(&mut self, delay: Duration, task: Task) {
        self.schedule_at(self.now + delay, task);
    }

    /// When the earliest queued task is due.
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.peek().map(|s| s.due)
    }

    /// Pop the earliest task if it is due at or before `deadline`, moving the clock to
    /// its due time.
    pub fn pop_until(&mut self, deadline: Duration) -> Option<Task> {
        if self.next_due()? > deadline {
            return None;
        }
        let next = self.queue.pop()?;
        self.now = self.now.max(next.due);
        Some(next.task)
    }

    /// Move the clock forward without running anything.
    pub fn advance_to(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
