//! Critical-section interval recording.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// One visit to a critical section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    /// Who was inside.
    pub participant: usize,
    /// Taken right after the lock was acquired.
    pub start: Instant,
    /// Taken right before the lock was released.
    pub end: Instant,
}

impl Interval {
    /// Whether the two visits share any instant other than an endpoint.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Shared record of every visit to one critical section.
///
/// Besides the timestamps, a live occupancy counter catches two visitors
/// even when the clock is too coarse to separate their intervals.
#[derive(Debug, Default)]
pub struct CriticalSectionLog {
    occupancy: AtomicUsize,
    max_occupancy: AtomicUsize,
    intervals: Mutex<Vec<Interval>>,
}

impl CriticalSectionLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `participant` as inside. The visit ends when the guard drops.
    pub fn enter(&self, participant: usize) -> Visit<'_> {
        let now_inside = self.occupancy.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_occupancy.fetch_max(now_inside, Ordering::SeqCst);
        Visit {
            log: self,
            participant,
            start: Instant::now(),
        }
    }

    /// Highest number of simultaneous visitors ever observed.
    pub fn max_occupancy(&self) -> usize {
        self.max_occupancy.load(Ordering::SeqCst)
    }

    /// Number of completed visits.
    pub fn total_visits(&self) -> usize {
        self.intervals.lock().len()
    }

    /// Number of completed visits by `participant`.
    pub fn visits_by(&self, participant: usize) -> usize {
        self.intervals
            .lock()
            .iter()
            .filter(|i| i.participant == participant)
            .count()
    }

    /// Find two visits that overlap in time, if any.
    pub fn find_overlap(&self) -> Option<(Interval, Interval)> {
        let mut sorted = self.intervals.lock().clone();
        sorted.sort_by_key(|i| i.start);

        // Track the visit that reaches furthest so far; any later start
        // before its end is an overlap.
        let mut furthest: Option<Interval> = None;
        for interval in sorted {
            if let Some(prev) = furthest {
                if prev.overlaps(&interval) {
                    return Some((prev, interval));
                }
                if interval.end > prev.end {
                    furthest = Some(interval);
                }
            } else {
                furthest = Some(interval);
            }
        }
        None
    }

    /// True if at most one participant was ever inside at a time.
    pub fn is_exclusive(&self) -> bool {
        self.max_occupancy() <= 1 && self.find_overlap().is_none()
    }

    fn record(&self, interval: Interval) {
        self.intervals.lock().push(interval);
        self.occupancy.fetch_sub(1, Ordering::SeqCst);
    }
}

/// An in-progress visit. Dropping it records the interval.
#[derive(Debug)]
pub struct Visit<'a> {
    log: &'a CriticalSectionLog,
    participant: usize,
    start: Instant,
}

impl Drop for Visit<'_> {
    fn drop(&mut self) {
        self.log.record(Interval {
            participant: self.participant,
            start: self.start,
            end: Instant::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_sequential_visits_are_exclusive() {
        let log = CriticalSectionLog::new();
        for p in 0..3 {
            let _visit = log.enter(p);
        }

        assert_eq!(log.total_visits(), 3);
        assert_eq!(log.max_occupancy(), 1);
        assert!(log.find_overlap().is_none());
        assert!(log.is_exclusive());
        assert_eq!(log.visits_by(1), 1);
    }

    #[test]
    fn test_nested_visits_detected() {
        let log = CriticalSectionLog::new();
        {
            let _outer = log.enter(0);
            std::thread::sleep(Duration::from_millis(2));
            let _inner = log.enter(1);
            std::thread::sleep(Duration::from_millis(2));
        }

        assert_eq!(log.max_occupancy(), 2);
        assert!(log.find_overlap().is_some());
        assert!(!log.is_exclusive());
    }

    #[test]
    fn test_interval_overlap() {
        let base = Instant::now();
        let ms = Duration::from_millis;
        let a = Interval {
            participant: 0,
            start: base,
            end: base + ms(10),
        };
        let b = Interval {
            participant: 1,
            start: base + ms(10),
            end: base + ms(20),
        };
        let c = Interval {
            participant: 2,
            start: base + ms(5),
            end: base + ms(6),
        };

        // Touching endpoints do not count
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
        assert!(!b.overlaps(&c));
    }
}
