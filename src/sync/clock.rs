use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic sequence source for tagging asynchronous requests
///
/// Each consumer owns its own clock. A response tagged with a sequence that
/// is no longer [`latest`](Self::latest) has been superseded.
#[derive(Debug, Default)]
pub struct GenerationClock {
    current: AtomicU64,
}

impl GenerationClock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: AtomicU64::new(0),
        }
    }

    /// Issue the next sequence number; the first call returns 1
    pub fn next(&self) -> u64 {
        self.current.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Highest sequence issued so far, 0 if none
    #[must_use]
    pub fn latest(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_latest(&self, seq: u64) -> bool {
        self.latest() == seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequences_strictly_increase() {
        let clock = GenerationClock::new();
        assert_eq!(clock.latest(), 0);
        let a = clock.next();
        let b = clock.next();
        assert_eq!(a, 1);
        assert!(b > a);
        assert!(clock.is_latest(b));
        assert!(!clock.is_latest(a));
    }
}
