//! Round-robin load balancing strategy.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::load_balancer::Selector;

/// Round-robin selector.
/// Stores an internal counter to rotate through backends.
///
/// Each call draws a unique counter value, so concurrent callers never share
/// or skip a slot. The first draw is `1 % size`.
#[derive(Debug)]
pub struct RoundRobin {
    counter: AtomicUsize,
    size: NonZeroUsize,
}

impl RoundRobin {
    pub fn new(size: NonZeroUsize) -> Self {
        Self {
            counter: AtomicUsize::new(0),
            size,
        }
    }

    /// Number of draws so far.
    pub fn draws(&self) -> usize {
        self.counter.load(Ordering::Relaxed)
    }
}

impl Selector for RoundRobin {
    fn next(&self) -> usize {
        let value = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        value % self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_round_robin() {
        let lb = RoundRobin::new(size(3));
        let picks: Vec<_> = (0..6).map(|_| lb.next()).collect();
        assert_eq!(picks, [1, 2, 0, 1, 2, 0]);
        assert_eq!(lb.draws(), 6);
    }

    #[test]
    fn test_single_backend() {
        let lb = RoundRobin::new(size(1));
        assert!((0..100).all(|_| lb.next() == 0));
    }

    #[test]
    fn test_exact_under_concurrency() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 3_000;
        const BACKENDS: usize = 4;

        let lb = Arc::new(RoundRobin::new(size(BACKENDS)));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let lb = lb.clone();
                thread::spawn(move || (0..PER_THREAD).map(|_| lb.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut hits = [0usize; BACKENDS];
        for handle in handles {
            for index in handle.join().unwrap() {
                hits[index] += 1;
            }
        }

        // N is a multiple of K, so {1..=N} mod K hits every slot equally.
        let total = THREADS * PER_THREAD;
        assert_eq!(lb.draws(), total);
        assert!(hits.iter().all(|&h| h == total / BACKENDS), "{hits:?}");
    }

    #[test]
    fn test_counter_wraps() {
        let lb = RoundRobin {
            counter: AtomicUsize::new(usize::MAX),
            size: size(3),
        };
        assert_eq!(lb.next(), 0);
        assert_eq!(lb.next(), 1);
    }
}
