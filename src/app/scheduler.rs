//! Frame gates, debouncers and one-shot timers on an explicit page clock.
//!
//! Time is a `Duration` since page start, passed in by the caller.  Nothing
//! here sleeps or spawns; the runtime polls these on every animation frame.

use std::collections::BTreeMap;
use std::time::Duration;

/// Single-slot scheduler for one pipeline.  Any number of requests between
/// two frames collapse into a single run.
#[derive(Debug, Clone, Default)]
pub struct FrameGate {
    pending: bool,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a run on the next frame.  Returns `false` (no-op) if one is
    /// already pending.
    pub fn request_tick(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    /// Called by the frame loop: `true` if a run was pending.  Clears the
    /// slot so the next event can schedule again.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

/// Trailing-edge debounce: fires once, `wait` after the last trigger.
#[derive(Debug, Clone)]
pub struct Debouncer {
    wait: Duration,
    deadline: Option<Duration>,
}

impl Debouncer {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            deadline: None,
        }
    }

    /// (Re)arm; any earlier pending deadline is dropped.
    pub fn trigger(&mut self, now: Duration) {
        self.deadline = Some(now + self.wait);
    }

    /// `true` exactly once when the deadline has passed.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }
}

/// Boolean that turns on with every event and off after a quiet period.
#[derive(Debug, Clone)]
pub struct QuietFlag {
    on: bool,
    timer: Debouncer,
}

impl QuietFlag {
    pub fn new(quiet: Duration) -> Self {
        Self {
            on: false,
            timer: Debouncer::new(quiet),
        }
    }

    /// Set the flag and restart the quiet timer.  Returns `true` if the flag
    /// was previously off.
    pub fn touch(&mut self, now: Duration) -> bool {
        self.timer.trigger(now);
        !std::mem::replace(&mut self.on, true)
    }

    /// Returns `true` when the flag has just been cleared.
    pub fn poll(&mut self, now: Duration) -> bool {
        if self.timer.poll(now) {
            self.on = false;
            return true;
        }
        false
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

/// One-shot timers keyed by due time; equal times fire in insertion order.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    items: BTreeMap<(Duration, u64), T>,
    seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
            seq: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, at: Duration, item: T) {
        self.items.insert((at, self.seq), item);
        self.seq += 1;
    }

    /// Remove and return everything due at or before `now`.
    pub fn drain_due(&mut self, now: Duration) -> Vec<T> {
        let later = self.items.split_off(&(now, u64::MAX));
        let due = std::mem::replace(&mut self.items, later);
        due.into_values().collect()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.items.keys().next().map(|(at, _)| *at)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn frame_gate_coalesces() {
        let mut gate = FrameGate::new();
        assert!(gate.request_tick());
        for _ in 0..10 {
            assert!(!gate.request_tick());
        }
        assert!(gate.take());
        assert!(!gate.take());
        assert!(gate.request_tick());
    }

    #[test]
    fn debouncer_fires_once_after_last_trigger() {
        let mut d = Debouncer::new(ms(250));
        d.trigger(ms(0));
        d.trigger(ms(100));
        d.trigger(ms(200));
        assert!(!d.poll(ms(300)));
        assert!(!d.poll(ms(449)));
        assert!(d.poll(ms(450)));
        assert!(!d.poll(ms(1000)));
    }

    #[test]
    fn quiet_flag_restarts_on_every_touch() {
        let mut f = QuietFlag::new(ms(150));
        assert!(f.touch(ms(0)));
        assert!(!f.touch(ms(100)));
        assert!(!f.poll(ms(200)));
        assert!(f.is_on());
        assert!(f.poll(ms(250)));
        assert!(!f.is_on());
        assert!(!f.poll(ms(400)));
    }

    #[test]
    fn timer_queue_orders_by_time_then_insertion() {
        let mut q = TimerQueue::new();
        q.push(ms(200), "c");
        q.push(ms(0), "a");
        q.push(ms(100), "b1");
        q.push(ms(100), "b2");
        assert_eq!(q.next_deadline(), Some(ms(0)));
        assert_eq!(q.drain_due(ms(100)), vec!["a", "b1", "b2"]);
        assert_eq!(q.len(), 1);
        assert!(q.drain_due(ms(150)).is_empty());
        assert_eq!(q.drain_due(ms(200)), vec!["c"]);
        assert!(q.is_empty());
    }
}
