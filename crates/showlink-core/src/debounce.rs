//! Deadline-based debouncers driven by an injected clock.
//!
//! Nothing here sleeps or spawns. Callers pass `now` into every method and
//! ask for [`GatherDebouncer::deadline`] to know when to poll next, which
//! keeps the behaviour deterministic under a virtual clock.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// Collects keys and releases them all at once after a quiet period.
///
/// Every `enqueue` pushes the shared deadline out again, so a burst of
/// updates produces a single flush containing the union of its keys.
#[derive(Debug)]
pub struct GatherDebouncer<T: Ord> {
    window: Duration,
    pending: BTreeSet<T>,
    deadline: Option<Instant>,
}

impl<T: Ord> GatherDebouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: BTreeSet::new(),
            deadline: None,
        }
    }

    /// Add keys and restart the quiet period.
    pub fn enqueue<I>(&mut self, keys: I, now: Instant)
    where
        I: IntoIterator<Item = T>,
    {
        let mut any = false;
        for key in keys {
            self.pending.insert(key);
            any = true;
        }
        if any {
            self.deadline = Some(now + self.window);
        }
    }

    /// Return the gathered keys once the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<Vec<T>> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                let flushed: Vec<T> = std::mem::take(&mut self.pending).into_iter().collect();
                (!flushed.is_empty()).then_some(flushed)
            }
            _ => None,
        }
    }

    /// Drop pending keys without flushing.
    pub fn cancel(&mut self) {
        self.pending.clear();
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

/// Fires once after the last trigger in a burst.
#[derive(Debug)]
pub struct TrailingDebouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl TrailingDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// `true` exactly once per burst, when the window has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
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

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// Earliest of several optional deadlines.
pub fn earliest<I>(deadlines: I) -> Option<Instant>
where
    I: IntoIterator<Item = Option<Instant>>,
{
    deadlines.into_iter().flatten().min()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_gather_coalesces_burst() {
        let t0 = Instant::now();
        let mut debouncer = GatherDebouncer::new(ms(50));

        debouncer.enqueue(["a"], t0);
        debouncer.enqueue(["b"], t0 + ms(10));
        assert_eq!(debouncer.poll(t0 + ms(55)), None);

        let flushed = debouncer.poll(t0 + ms(60)).unwrap();
        assert_eq!(flushed, vec!["a", "b"]);
        assert_eq!(debouncer.poll(t0 + ms(200)), None);
    }

    #[test]
    fn test_gather_separate_bursts_flush_twice() {
        let t0 = Instant::now();
        let mut debouncer = GatherDebouncer::new(ms(50));

        debouncer.enqueue(["a"], t0);
        assert_eq!(debouncer.poll(t0 + ms(50)), Some(vec!["a"]));

        debouncer.enqueue(["b"], t0 + ms(100));
        assert_eq!(debouncer.poll(t0 + ms(150)), Some(vec!["b"]));
    }

    #[test]
    fn test_gather_deduplicates() {
        let t0 = Instant::now();
        let mut debouncer = GatherDebouncer::new(ms(50));
        debouncer.enqueue(["a", "a"], t0);
        debouncer.enqueue(["a"], t0 + ms(1));
        assert_eq!(debouncer.poll(t0 + ms(60)), Some(vec!["a"]));
    }

    #[test]
    fn test_gather_cancel_and_empty_enqueue() {
        let t0 = Instant::now();
        let mut debouncer: GatherDebouncer<&str> = GatherDebouncer::new(ms(50));
        debouncer.enqueue([], t0);
        assert!(!debouncer.is_pending());

        debouncer.enqueue(["a"], t0);
        debouncer.cancel();
        assert_eq!(debouncer.deadline(), None);
        assert_eq!(debouncer.poll(t0 + ms(100)), None);
    }

    #[test]
    fn test_trailing_fires_once_after_last_trigger() {
        let t0 = Instant::now();
        let mut debouncer = TrailingDebouncer::new(ms(20));
        debouncer.trigger(t0);
        debouncer.trigger(t0 + ms(15));
        assert!(!debouncer.poll(t0 + ms(25)));
        assert!(debouncer.poll(t0 + ms(35)));
        assert!(!debouncer.poll(t0 + ms(100)));
    }

    #[test]
    fn test_earliest() {
        let t0 = Instant::now();
        assert_eq!(earliest([None, Some(t0 + ms(5)), Some(t0)]), Some(t0));
        assert_eq!(earliest([None, None]), None);
    }
}
