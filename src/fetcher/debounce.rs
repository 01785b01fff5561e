//! Debouncer: keeps only the most recently scheduled item
//!
//! Time is passed in by the caller, so hosts decide how they are woken
//! (a browser timer, a render loop tick) and tests never sleep.

use instant::Instant;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// (Re)start the quiet period with `item`, replacing anything pending
    pub fn schedule(&mut self, now: Instant, item: T) {
        self.pending = Some((now + self.delay, item));
    }

    /// Make `item` due immediately, replacing anything pending
    pub fn schedule_now(&mut self, now: Instant, item: T) {
        self.pending = Some((now, item));
    }

    /// Drop the pending item, if any
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, item)| item)
    }

    /// Take the pending item once its quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((due, _)) if *due <= now => self.cancel(),
            _ => None,
        }
    }

    /// When the pending item becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(due, _)| *due)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn test_not_due_before_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule(start, "a");

        assert_eq!(debouncer.poll(start + Duration::from_millis(299)), None);
        assert_eq!(debouncer.poll(start + DELAY), Some("a"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_rescheduling_restarts_window_and_keeps_last() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule(start, "r");
        debouncer.schedule(start + Duration::from_millis(100), "re");
        debouncer.schedule(start + Duration::from_millis(200), "red");

        assert_eq!(debouncer.poll(start + DELAY), None);
        assert_eq!(debouncer.deadline(), Some(start + Duration::from_millis(500)));
        assert_eq!(debouncer.poll(start + Duration::from_millis(500)), Some("red"));
        assert_eq!(debouncer.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_cancel_and_schedule_now() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule(start, 1);
        assert_eq!(debouncer.cancel(), Some(1));
        assert_eq!(debouncer.poll(start + DELAY), None);

        debouncer.schedule_now(start, 2);
        assert_eq!(debouncer.poll(start), Some(2));
    }
}
