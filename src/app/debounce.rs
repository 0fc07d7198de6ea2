// src/app/debounce.rs
use std::time::{Duration, Instant};

/// Single-slot, last-write-wins debounce timer.
///
/// Only one deadline is ever pending; scheduling again replaces it.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// (Re)start the timer from `now`, dropping any pending deadline.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consume the pending deadline if it has passed.
    pub fn fire_if_ready(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(at) if now >= at => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Time left before the pending deadline (zero if overdue).
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|at| at.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(600);

    #[test]
    fn fires_once_after_delay() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(DELAY);
        d.schedule(t0);
        assert!(!d.fire_if_ready(t0 + Duration::from_millis(599)));
        assert!(d.fire_if_ready(t0 + DELAY));
        assert!(!d.fire_if_ready(t0 + DELAY * 2));
        assert!(!d.is_pending());
    }

    #[test]
    fn rescheduling_pushes_the_deadline() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(DELAY);
        d.schedule(t0);
        d.schedule(t0 + Duration::from_millis(400));
        assert!(!d.fire_if_ready(t0 + DELAY));
        assert_eq!(
            d.remaining(t0 + DELAY),
            Some(Duration::from_millis(400))
        );
        assert!(d.fire_if_ready(t0 + Duration::from_millis(1000)));
    }

    #[test]
    fn cancel_drops_pending_deadline() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(DELAY);
        d.schedule(t0);
        d.cancel();
        assert!(!d.fire_if_ready(t0 + DELAY * 3));
        assert_eq!(d.remaining(t0), None);
    }

    #[test]
    fn remaining_saturates_at_zero() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(DELAY);
        d.schedule(t0);
        assert_eq!(d.remaining(t0 + DELAY * 2), Some(Duration::ZERO));
    }
}
