//! Per-page polling
//!
//! Each page schedules its own refresh loop; there is no shared scheduler.
//! The loop stops when the page's reactive owner is disposed (navigation away),
//! and the page's [`Liveness`] flips so that a response still in flight at
//! that moment is dropped instead of written into disposed state.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use gloo_timers::future::TimeoutFuture;
use leptos::*;
use wasm_bindgen_futures::spawn_local;

/// Cleared when the owning page unmounts. Clones share the flag.
#[derive(Debug, Clone)]
pub struct Liveness(Rc<Cell<bool>>);

impl Liveness {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.get()
    }

    pub fn retire(&self) {
        self.0.set(false);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// Liveness tied to the current reactive owner, without a timer
pub fn use_liveness() -> Liveness {
    let liveness = Liveness::new();
    let on_unmount = liveness.clone();
    on_cleanup(move || on_unmount.retire());
    liveness
}

/// When a poll loop fires its first tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstTick {
    /// Fetch on mount, then every interval
    #[default]
    Immediate,
    /// Wait one interval first; the page triggers its own initial fetch
    AfterInterval,
}

/// Run `tick` immediately, then every `interval`, until the current reactive
/// owner is disposed.
pub fn use_polling<F>(interval: Duration, tick: F) -> Liveness
where
    F: Fn() + 'static,
{
    use_polling_with(interval, FirstTick::Immediate, tick)
}

/// [`use_polling`] with control over the first tick
pub fn use_polling_with<F>(interval: Duration, first: FirstTick, tick: F) -> Liveness
where
    F: Fn() + 'static,
{
    let liveness = use_liveness();
    let millis = interval_millis(interval);
    let running = liveness.clone();

    spawn_local(async move {
        if let Some(delay) = initial_delay_millis(first, interval) {
            TimeoutFuture::new(delay).await;
        }
        while running.is_alive() {
            tick();
            TimeoutFuture::new(millis).await;
        }
        tracing::trace!(interval_ms = millis, "polling stopped");
    });

    liveness
}

/// Wait before the first tick, if any
pub fn initial_delay_millis(first: FirstTick, interval: Duration) -> Option<u32> {
    match first {
        FirstTick::Immediate => None,
        FirstTick::AfterInterval => Some(interval_millis(interval)),
    }
}

/// Timer resolution used by gloo-timers, never zero
pub fn interval_millis(interval: Duration) -> u32 {
    interval.as_millis().clamp(1, u32::MAX as u128) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liveness_shared_between_clones() {
        let liveness = Liveness::new();
        let clone = liveness.clone();
        assert!(clone.is_alive());

        liveness.retire();
        assert!(!clone.is_alive());
        assert!(!liveness.is_alive());
    }

    #[test]
    fn test_interval_millis() {
        assert_eq!(interval_millis(Duration::from_secs(5)), 5_000);
        assert_eq!(interval_millis(Duration::ZERO), 1);
        assert_eq!(interval_millis(Duration::from_secs(u64::MAX)), u32::MAX);
    }

    #[test]
    fn test_initial_delay() {
        let interval = Duration::from_secs(5);
        assert_eq!(initial_delay_millis(FirstTick::Immediate, interval), None);
        assert_eq!(initial_delay_millis(FirstTick::AfterInterval, interval), Some(5_000));
        assert_eq!(FirstTick::default(), FirstTick::Immediate);
    }
}
