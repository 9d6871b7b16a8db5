//! Randomized holds spliced into the timeline.

use rand::Rng;

use crate::tuning::PauseTuning;

/// Returns the time at which motion resumes after a hold starting at `start_time`.
///
/// The hold length is drawn uniformly from `0..=max_ms`; a zero-length hold
/// is a valid no-op.
pub fn pause<R: Rng + ?Sized>(start_time: u64, tuning: &PauseTuning, rng: &mut R) -> u64 {
    start_time + rng.gen_range(0..=tuning.max_ms)
}

#[cfg(test)]
mod tests {
    use super::pause;
    use crate::tuning::PauseTuning;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn holds_stay_within_bounds() {
        let tuning = PauseTuning::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
        let mut longest = 0;
        for _ in 0..2_000 {
            let resumed = pause(10_000, &tuning, &mut rng);
            assert!((10_000..=13_000).contains(&resumed));
            longest = longest.max(resumed - 10_000);
        }
        assert!(longest > 2_000, "draws should cover the upper half of the range");
    }

    #[test]
    fn zero_maximum_is_a_no_op() {
        let tuning = PauseTuning {
            max_ms: 0,
            ..PauseTuning::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(pause(500, &tuning, &mut rng), 500);
    }
}
