//! Sample-schedule construction.
//!
//! Fixed checkpoints are merged with a seeded pseudo-random subset drawn
//! uniformly from a window. Same seed, count, and window -> same schedule,
//! always.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::time::TimePoint;

/// An ordered sequence of unique sample timestamps, built once per run and
/// immutable thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    times: Vec<TimePoint>,
}

impl Schedule {
    pub fn times(&self) -> &[TimePoint] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimePoint> {
        self.times.iter()
    }
}

/// Build the probe schedule: sorted union of `fixed` and `random_count`
/// uniform draws from `[window.0, window.1)`, exact-value duplicates
/// collapsed.
///
/// The generator is seeded exactly once per call. `seed: None` draws from
/// entropy; reproducible runs pass a fixed seed.
pub fn build_schedule(
    fixed: &[TimePoint],
    random_count: usize,
    window: (TimePoint, TimePoint),
    seed: Option<u64>,
) -> Schedule {
    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let mut times: Vec<TimePoint> = fixed.to_vec();
    let (min, max) = (window.0.secs(), window.1.secs());
    for _ in 0..random_count {
        times.push(TimePoint::from_secs(rng.gen_range(min..max)));
    }

    times.sort_by(|a, b| a.total_cmp(b));
    times.dedup();

    Schedule { times }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> (TimePoint, TimePoint) {
        (TimePoint::from_secs(0.2), TimePoint::from_secs(1.6))
    }

    fn fixed() -> Vec<TimePoint> {
        [0.48, 0.70, 0.90, 1.10]
            .iter()
            .map(|&t| TimePoint::from_secs(t))
            .collect()
    }

    #[test]
    fn test_same_seed_same_schedule() {
        let a = build_schedule(&fixed(), 6, window(), Some(1337));
        let b = build_schedule(&fixed(), 6, window(), Some(1337));
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = build_schedule(&fixed(), 6, window(), Some(1337));
        let b = build_schedule(&fixed(), 6, window(), Some(1338));
        assert_ne!(a, b);
    }

    #[test]
    fn test_strictly_increasing_no_duplicates() {
        let schedule = build_schedule(&fixed(), 6, window(), Some(42));
        let times = schedule.times();
        for pair in times.windows(2) {
            assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_every_fixed_time_present() {
        let schedule = build_schedule(&fixed(), 6, window(), Some(42));
        for t in fixed() {
            assert!(schedule.times().contains(&t), "missing fixed time {t}");
        }
    }

    #[test]
    fn test_random_times_within_window() {
        let schedule = build_schedule(&[], 50, window(), Some(7));
        for t in schedule.times() {
            assert!(t.secs() >= 0.2 && t.secs() < 1.6);
        }
    }

    #[test]
    fn test_duplicate_fixed_times_collapse() {
        let fixed = vec![TimePoint::from_secs(0.5), TimePoint::from_secs(0.5)];
        let schedule = build_schedule(&fixed, 0, window(), Some(1));
        assert_eq!(schedule.len(), 1);
    }

    #[test]
    fn test_zero_random_count_is_fixed_only() {
        let schedule = build_schedule(&fixed(), 0, window(), Some(1));
        assert_eq!(schedule.len(), 4);
    }
}
