#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded timeline generation system.
//!
//! The generator walks a single clock from zero towards the configured total
//! duration. Each iteration toggles the periodic speed boost, fires any due
//! full-range cycle, optionally splices in a hold, and otherwise appends one
//! regular segment whose shape and destination are drawn from the tuned
//! distributions. Every random draw flows through the caller's [`Rng`], so a
//! fixed seed always reproduces the same [`Timeline`].

pub mod duration;
pub mod finalize;
pub mod pause;
pub mod segments;
pub mod tuning;

mod schedule;

use motion_forge_core::{Action, Error, Position, Result, Script, Timeline};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Bernoulli, Distribution, WeightedIndex};
use tracing::{debug, info, warn};

pub use duration::DurationModel;
pub use finalize::{finalize, sort_and_dedupe};
pub use segments::{MotionShape, Segment, SegmentRequest};
pub use tuning::{
    DurationTuning, FullRangeTuning, GenerationTuning, PauseTuning, SampleRange, ShapeTuning,
    SpeedVariationTuning, TargetTuning,
};

use schedule::{choose_target, GenerationState};

/// Timeline generator bound to a validated tuning surface.
#[derive(Clone, Debug, Default)]
pub struct Generation {
    tuning: GenerationTuning,
}

impl Generation {
    /// Creates a generator, rejecting tuning the scheduler cannot honour.
    pub fn new(tuning: GenerationTuning) -> Result<Self> {
        tuning.validate()?;
        Ok(Self { tuning })
    }

    /// Tuning the generator was created with.
    #[must_use]
    pub fn tuning(&self) -> &GenerationTuning {
        &self.tuning
    }

    /// Generates a timeline using a ChaCha8 stream seeded from `seed`.
    pub fn generate_seeded(&self, seed: u64) -> Result<Timeline> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.generate(&mut rng)
    }

    /// Generates a timeline and packages it with the configured labels.
    ///
    /// The artifact's metadata carries the target duration, not the
    /// timestamp of the final keyframe.
    pub fn generate_script<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Script> {
        let timeline = self.generate(rng)?;
        Ok(Script::from_timeline(
            timeline,
            self.tuning.labels.clone(),
            self.tuning.total_duration_ms,
        ))
    }

    /// Runs the scheduling loop and returns the finalized timeline.
    ///
    /// The loop stops once the clock reaches the total duration, or
    /// unconditionally once it overshoots the total by more than the
    /// configured margin.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Timeline> {
        let tuning = &self.tuning;
        let total = tuning.total_duration_ms;
        let shape_index = WeightedIndex::new(tuning.shapes.weights())
            .map_err(|error| Error::InvalidParameter(format!("shape weights: {error}")))?;
        let pause_roll = Bernoulli::new(tuning.pause.probability)
            .map_err(|error| Error::InvalidParameter(format!("pause probability: {error}")))?;

        let start = Position::new(tuning.start_position)?;
        let mut state =
            GenerationState::new(start, total, &tuning.speed, &tuning.full_range, rng);
        debug!(triggers = ?state.cycle_triggers(), "full-range cycles scheduled");

        let mut actions = vec![Action::new(0, start)];
        while state.current_time < total {
            state.update_speed_variation(&tuning.speed, rng);

            if state.take_due_cycle() {
                debug!(
                    at = state.current_time,
                    from = state.current_pos.get(),
                    "full-range cycle"
                );
                let request = state.request(state.current_pos);
                let segment = MotionShape::FullRange.generate(&request, tuning, rng)?;
                state.apply(segment, &mut actions);
                continue;
            }

            if state.pause_allowed() && pause_roll.sample(rng) {
                let resume_at = pause::pause(state.current_time, &tuning.pause, rng);
                state.hold_until(resume_at, &mut actions);
            }

            let shape = MotionShape::REGULAR[shape_index.sample(rng)];
            let target = choose_target(state.current_pos, &tuning.targets, rng)?;
            let segment = shape.generate(&state.request(target), tuning, rng)?;
            state.apply(segment, &mut actions);

            if state.current_time > total.saturating_add(tuning.overshoot_margin_ms) {
                warn!(
                    at = state.current_time,
                    total, "generation overshot its margin, stopping early"
                );
                break;
            }
        }

        let closing = Position::new(tuning.closing_position)?;
        let timeline = finalize(actions, total, closing)?;
        info!(
            actions = timeline.len(),
            duration_ms = timeline.duration_ms(),
            average_speed = timeline.average_speed(),
            "timeline generated"
        );
        Ok(timeline)
    }
}
