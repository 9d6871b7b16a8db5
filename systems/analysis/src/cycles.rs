//! Detection of full-range cycles in a finished timeline.
//!
//! A cycle is a pair of legs meeting on one extreme and ending on the other.
//! Each leg is a run of evenly spaced samples travelling strictly in one
//! direction, which is what separates a scheduled cycle from a wave that
//! merely brushes an extreme on its way past.
//!
//! Legs are matched by sample count: a leg must hold exactly
//! [`VerifierTuning::leg_samples`] samples. Strokes sampled more or less
//! densely, or built from a handful of keyframes, are not reported even when
//! they sweep the full range. Spacing only needs to be roughly even; the gaps
//! of a leg may spread by the larger of a fixed tolerance and a fraction of
//! the leg's mean gap.

use motion_forge_core::{Action, Error, Result};
use serde::{Deserialize, Serialize};

/// Parameters of the cycle detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierTuning {
    /// Cycles must complete strictly within this many milliseconds of their first sample.
    pub window_ms: u64,
    /// Samples per leg, counting both leg endpoints.
    pub leg_samples: usize,
    /// Smallest allowed difference between the shortest and longest gap inside a leg.
    pub spacing_tolerance_ms: u64,
    /// Allowed gap spread as a fraction of the leg's mean gap, used when it
    /// exceeds `spacing_tolerance_ms`.
    pub spacing_tolerance_ratio: f64,
}

impl Default for VerifierTuning {
    fn default() -> Self {
        Self {
            window_ms: 15_000,
            leg_samples: 8,
            spacing_tolerance_ms: 1,
            spacing_tolerance_ratio: 0.05,
        }
    }
}

/// One detected cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DetectedCycle {
    /// Timestamp of the sample the first leg departs from.
    pub start_at: u64,
    /// Timestamp of the first extreme.
    pub midpoint_at: u64,
    /// Timestamp of the opposite extreme.
    pub end_at: u64,
    /// `end_at - start_at`.
    pub duration_ms: u64,
    /// Positions at the start, midpoint, and end.
    pub pattern: [u8; 3],
}

/// Verifier output.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CycleReport {
    /// Number of detected cycles.
    pub count: usize,
    /// Cycles in timeline order; they never share a leg.
    pub cycles: Vec<DetectedCycle>,
    /// Mean cycle duration, absent when nothing was detected.
    pub average_duration_ms: Option<f64>,
}

/// Scans a keyframe sequence for full-range cycles.
pub fn verify_cycles(actions: &[Action], tuning: &VerifierTuning) -> Result<CycleReport> {
    if actions.len() < 2 {
        return Err(Error::EmptyTimeline {
            actions: actions.len(),
        });
    }
    if tuning.leg_samples < 2 {
        return Err(Error::InvalidParameter(
            "verifier leg_samples must be at least 2".to_owned(),
        ));
    }
    if !(tuning.spacing_tolerance_ratio.is_finite() && tuning.spacing_tolerance_ratio >= 0.0) {
        return Err(Error::InvalidParameter(
            "verifier spacing_tolerance_ratio must be finite and non-negative".to_owned(),
        ));
    }

    let span = tuning.leg_samples - 1;
    let mut cycles = Vec::new();
    let mut turn = span;
    while turn + span < actions.len() {
        match cycle_at(actions, turn, span, tuning) {
            Some(cycle) => {
                cycles.push(cycle);
                turn += span * 2;
            }
            None => turn += 1,
        }
    }

    let average_duration_ms = if cycles.is_empty() {
        None
    } else {
        let total: u64 = cycles.iter().map(|cycle| cycle.duration_ms).sum();
        Some(total as f64 / cycles.len() as f64)
    };

    Ok(CycleReport {
        count: cycles.len(),
        cycles,
        average_duration_ms,
    })
}

fn cycle_at(
    actions: &[Action],
    turn: usize,
    span: usize,
    tuning: &VerifierTuning,
) -> Option<DetectedCycle> {
    let start = &actions[turn - span];
    let first = &actions[turn];
    let last = &actions[turn + span];

    if !first.pos.is_extreme() || !last.pos.is_extreme() || first.pos == last.pos {
        return None;
    }

    let duration_ms = last.at.checked_sub(start.at)?;
    if duration_ms >= tuning.window_ms {
        return None;
    }

    let inbound = &actions[turn - span..=turn];
    let outbound = &actions[turn..=turn + span];
    if !is_leg(inbound, tuning) || !is_leg(outbound, tuning) {
        return None;
    }

    Some(DetectedCycle {
        start_at: start.at,
        midpoint_at: first.at,
        end_at: last.at,
        duration_ms,
        pattern: [start.pos.get(), first.pos.get(), last.pos.get()],
    })
}

fn is_leg(run: &[Action], tuning: &VerifierTuning) -> bool {
    let (Some(head), Some(tail)) = (run.first(), run.last()) else {
        return false;
    };
    let rising = tail.pos > head.pos;
    let monotonic = run.windows(2).all(|pair| {
        if rising {
            pair[1].pos > pair[0].pos
        } else {
            pair[1].pos < pair[0].pos
        }
    });
    if !monotonic {
        return false;
    }

    let (mut shortest, mut longest) = (u64::MAX, 0);
    for gap in run.windows(2).map(|pair| pair[1].at.checked_sub(pair[0].at)) {
        match gap {
            Some(gap) if gap > 0 => {
                shortest = shortest.min(gap);
                longest = longest.max(gap);
            }
            _ => return false,
        }
    }
    let mean_gap = (tail.at - head.at) as f64 / (run.len() - 1) as f64;
    let allowed =
        (tuning.spacing_tolerance_ratio * mean_gap).max(tuning.spacing_tolerance_ms as f64);
    (longest - shortest) as f64 <= allowed
}
