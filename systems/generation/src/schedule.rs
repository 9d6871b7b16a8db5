//! Scheduler-owned state and the per-iteration decisions that mutate it.

use motion_forge_core::{Action, Position, Result};
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use tracing::debug;

use crate::segments::{Segment, SegmentRequest};
use crate::tuning::{FullRangeTuning, SpeedVariationTuning, TargetTuning};

/// Transient state threaded through the generation loop.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct GenerationState {
    pub(crate) current_time: u64,
    pub(crate) current_pos: Position,
    pub(crate) speed_multiplier: f64,
    pub(crate) in_speed_variation: bool,
    pub(crate) next_speed_change: u64,
    cycle_triggers: Vec<u64>,
    next_cycle: usize,
}

impl GenerationState {
    /// Opens the state at time zero and pre-selects the full-range trigger times.
    pub(crate) fn new<R: Rng + ?Sized>(
        start_pos: Position,
        total_duration_ms: u64,
        speed: &SpeedVariationTuning,
        cycles: &FullRangeTuning,
        rng: &mut R,
    ) -> Self {
        Self {
            current_time: 0,
            current_pos: start_pos,
            speed_multiplier: 1.0,
            in_speed_variation: false,
            next_speed_change: speed.interval_ms,
            cycle_triggers: draw_cycle_triggers(total_duration_ms, cycles, rng),
            next_cycle: 0,
        }
    }

    /// Sorted trigger times for full-range cycles.
    pub(crate) fn cycle_triggers(&self) -> &[u64] {
        &self.cycle_triggers
    }

    /// Toggles the boost window once the current boundary has been reached.
    ///
    /// The boundary advances by exactly one interval per toggle regardless of
    /// how far the clock overshot it.
    pub(crate) fn update_speed_variation<R: Rng + ?Sized>(
        &mut self,
        speed: &SpeedVariationTuning,
        rng: &mut R,
    ) {
        if self.current_time < self.next_speed_change {
            return;
        }

        if self.in_speed_variation {
            self.speed_multiplier = 1.0;
            self.in_speed_variation = false;
            debug!(at = self.current_time, "speed boost ended");
        } else {
            self.speed_multiplier = 1.0 + rng.gen_range(speed.boost_min..=speed.boost_max);
            self.in_speed_variation = true;
            debug!(
                at = self.current_time,
                multiplier = self.speed_multiplier,
                "speed boost started"
            );
        }
        self.next_speed_change += speed.interval_ms;
    }

    /// Pauses are only spliced in outside a boost window.
    pub(crate) fn pause_allowed(&self) -> bool {
        !self.in_speed_variation
    }

    /// Consumes the next trigger time if the clock has reached it.
    pub(crate) fn take_due_cycle(&mut self) -> bool {
        match self.cycle_triggers.get(self.next_cycle) {
            Some(&trigger) if self.current_time >= trigger => {
                self.next_cycle += 1;
                true
            }
            _ => false,
        }
    }

    /// Describes a segment departing from the current state.
    pub(crate) fn request(&self, end_pos: Position) -> SegmentRequest {
        SegmentRequest {
            start_pos: self.current_pos,
            end_pos,
            start_time: self.current_time,
            speed_multiplier: self.speed_multiplier,
        }
    }

    /// Holds the current position until `resume_at`, recording a keyframe if time advanced.
    pub(crate) fn hold_until(&mut self, resume_at: u64, actions: &mut Vec<Action>) {
        if resume_at > self.current_time {
            debug!(
                at = self.current_time,
                hold_ms = resume_at - self.current_time,
                "pause injected"
            );
            actions.push(Action::new(resume_at, self.current_pos));
            self.current_time = resume_at;
        }
    }

    /// Appends a generated segment and moves the clock and position to its end.
    pub(crate) fn apply(&mut self, segment: Segment, actions: &mut Vec<Action>) {
        actions.extend(segment.actions);
        self.current_time = segment.end_time;
        self.current_pos = segment.end_pos;
    }
}

/// Chooses the destination of the next regular segment.
///
/// A tease jumps near an extreme; otherwise the target is biased back toward
/// the middle of the range depending on which zone the motion currently sits in.
pub(crate) fn choose_target<R: Rng + ?Sized>(
    current: Position,
    targets: &TargetTuning,
    rng: &mut R,
) -> Result<Position> {
    if !targets.tease_positions.is_empty() && rng.gen_bool(targets.tease_probability) {
        let index = rng.gen_range(0..targets.tease_positions.len());
        return Position::new(targets.tease_positions[index]);
    }

    let band = if current.get() < targets.low_zone_below {
        targets.low_band
    } else if current.get() > targets.high_zone_above {
        targets.high_band
    } else {
        targets.mid_band
    };
    let drawn = band.sample(rng);
    Position::try_from(drawn)
}

fn draw_cycle_triggers<R: Rng + ?Sized>(
    total_duration_ms: u64,
    cycles: &FullRangeTuning,
    rng: &mut R,
) -> Vec<u64> {
    if cycles.count == 0 {
        return Vec::new();
    }

    let earliest = cycles.safety_margin_ms;
    let latest = total_duration_ms.saturating_sub(cycles.safety_margin_ms).max(earliest);
    let window = Uniform::new_inclusive(earliest, latest);
    let mut triggers: Vec<u64> = window.sample_iter(rng).take(cycles.count).collect();
    triggers.sort_unstable();
    triggers
}
