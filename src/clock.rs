//! Wall-clock deadline shared across the whole run. Started once at program
//! entry, before input parsing, so parse time counts against the limit.

use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct Deadline {
    begun: Instant,
    search: Duration,
    hard: Duration,
}

impl Deadline {
    pub fn start(search_ms: u64, hard_ms: u64) -> Deadline {
        Deadline {
            begun: Instant::now(),
            search: Duration::from_millis(search_ms),
            hard: Duration::from_millis(hard_ms),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.begun.elapsed()
    }

    /// No further restarts or phases should begin past this point.
    pub fn search_expired(&self) -> bool {
        self.begun.elapsed() >= self.search
    }

    pub fn search_remaining(&self) -> Duration {
        self.search.saturating_sub(self.begun.elapsed())
    }

    /// Everything must stop; only printing the answer remains.
    pub fn hard_expired(&self) -> bool {
        self.begun.elapsed() >= self.hard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_deadline_is_live() {
        let d = Deadline::start(10_000, 20_000);
        assert!(!d.search_expired());
        assert!(!d.hard_expired());
        assert!(d.search_remaining() > Duration::from_secs(5));
    }

    #[test]
    fn test_zero_deadline_is_expired() {
        let d = Deadline::start(0, 0);
        assert!(d.search_expired());
        assert!(d.hard_expired());
        assert_eq!(d.search_remaining(), Duration::ZERO);
    }
}
