#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Read-only statistics over finished motion timelines.
//!
//! [`analyze`] recomputes the shape statistics of a keyframe sequence so a
//! generated artifact can be checked against its targets, and
//! [`verify_cycles`] locates the full-range cycles embedded in it. Neither
//! pass mutates its input.

mod cycles;

use motion_forge_core::{Action, Error, Position, Result};
use serde::{Deserialize, Serialize};

pub use cycles::{verify_cycles, CycleReport, DetectedCycle, VerifierTuning};

/// Thresholds used when classifying intervals between keyframes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisTuning {
    /// Intervals strictly longer than this count as fluid motion.
    pub fluid_threshold_ms: u64,
    /// Equal-position intervals strictly longer than this count as pauses.
    pub pause_threshold_ms: u64,
    /// Moves must exceed this many units to contribute to directional speeds.
    pub significant_distance: u8,
}

impl Default for AnalysisTuning {
    fn default() -> Self {
        Self {
            fluid_threshold_ms: 40,
            pause_threshold_ms: 500,
            significant_distance: 5,
        }
    }
}

/// Complete analyzer output.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Number of keyframes inspected.
    pub action_count: usize,
    /// Timestamp of the final keyframe.
    pub duration_ms: u64,
    /// Total distance over elapsed seconds, truncated; zero for instantaneous inputs.
    pub average_speed: u32,
    /// Statistics over the intervals between consecutive keyframes.
    pub segments: SegmentStats,
    /// Holds detected between equal-position keyframes.
    pub pauses: PauseStats,
    /// Keyframes sitting on either end of the range.
    pub extremes: ExtremeCounts,
    /// Directional speeds; absent unless both directions contributed a move.
    pub speed: Option<DirectionalSpeed>,
    /// Keyframe counts per position bucket, in ascending bucket order.
    pub distribution: Vec<PositionBucket>,
}

/// Interval statistics between consecutive keyframes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SegmentStats {
    /// Number of intervals, one fewer than the number of keyframes.
    pub count: usize,
    /// Mean interval length in milliseconds.
    pub average_ms: f64,
    /// Shortest interval.
    pub min_ms: u64,
    /// Longest interval.
    pub max_ms: u64,
    /// Intervals longer than the fluid threshold.
    pub fluid_count: usize,
    /// Share of fluid intervals, in percent.
    pub fluid_percentage: f64,
}

/// Holds where the position stays unchanged for longer than the pause threshold.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PauseStats {
    /// Number of detected holds.
    pub count: usize,
    /// Mean hold length, absent when no hold was found.
    pub average_ms: Option<f64>,
    /// Longest hold, absent when no hold was found.
    pub longest_ms: Option<u64>,
}

/// Keyframes on the range extremes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ExtremeCounts {
    /// Keyframes at position 0.
    pub bottom: usize,
    /// Keyframes at position 100.
    pub top: usize,
}

impl ExtremeCounts {
    /// Keyframes at either extreme.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.bottom + self.top
    }
}

/// Average per-interval speeds split by direction, in units per second.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DirectionalSpeed {
    /// Mean speed over increasing moves.
    pub average_up: f64,
    /// Mean speed over decreasing moves.
    pub average_down: f64,
    /// `average_up / average_down`.
    pub ratio: f64,
}

/// Keyframe count for one inclusive position bucket.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionBucket {
    /// Human readable bucket label such as `"21-40"`.
    pub label: String,
    /// Lowest position in the bucket.
    pub min: u8,
    /// Highest position in the bucket.
    pub max: u8,
    /// Keyframes falling into the bucket.
    pub count: usize,
    /// Share of all keyframes, in percent.
    pub percentage: f64,
}

const BUCKETS: [(u8, u8); 5] = [(0, 20), (21, 40), (41, 60), (61, 80), (81, 100)];

/// Computes the full statistics report for a keyframe sequence.
///
/// Timestamps may repeat but must never decrease. Fewer than two keyframes
/// fail with [`Error::EmptyTimeline`].
pub fn analyze(actions: &[Action], tuning: &AnalysisTuning) -> Result<AnalysisReport> {
    let intervals = intervals(actions)?;
    let duration_ms = actions.last().map_or(0, |action| action.at);

    Ok(AnalysisReport {
        action_count: actions.len(),
        duration_ms,
        average_speed: average_speed(&intervals, duration_ms),
        segments: segment_stats(&intervals, tuning),
        pauses: pause_stats(&intervals, tuning),
        extremes: extreme_counts(actions),
        speed: directional_speed(&intervals, tuning),
        distribution: distribution(actions),
    })
}

#[derive(Clone, Copy, Debug)]
struct Interval {
    from: Position,
    to: Position,
    duration_ms: u64,
}

impl Interval {
    fn distance(&self) -> u8 {
        self.from.distance(self.to)
    }
}

fn intervals(actions: &[Action]) -> Result<Vec<Interval>> {
    if actions.len() < 2 {
        return Err(Error::EmptyTimeline {
            actions: actions.len(),
        });
    }

    actions
        .windows(2)
        .map(|pair| {
            let duration_ms = pair[1].at.checked_sub(pair[0].at).ok_or_else(|| {
                Error::MalformedArtifact(format!(
                    "timestamps decrease from {} ms to {} ms",
                    pair[0].at, pair[1].at
                ))
            })?;
            Ok(Interval {
                from: pair[0].pos,
                to: pair[1].pos,
                duration_ms,
            })
        })
        .collect()
}

fn average_speed(intervals: &[Interval], duration_ms: u64) -> u32 {
    if duration_ms == 0 {
        return 0;
    }
    let distance: u64 = intervals
        .iter()
        .map(|interval| u64::from(interval.distance()))
        .sum();
    let speed = distance as f64 / (duration_ms as f64 / 1_000.0);
    speed.min(f64::from(u32::MAX)) as u32
}

fn segment_stats(intervals: &[Interval], tuning: &AnalysisTuning) -> SegmentStats {
    let durations = move || intervals.iter().map(|interval| interval.duration_ms);
    let count = intervals.len();
    let fluid_count = durations()
        .filter(|duration| *duration > tuning.fluid_threshold_ms)
        .count();

    SegmentStats {
        count,
        average_ms: durations().sum::<u64>() as f64 / count as f64,
        min_ms: durations().min().unwrap_or(0),
        max_ms: durations().max().unwrap_or(0),
        fluid_count,
        fluid_percentage: percentage(fluid_count, count),
    }
}

fn pause_stats(intervals: &[Interval], tuning: &AnalysisTuning) -> PauseStats {
    let holds: Vec<u64> = intervals
        .iter()
        .filter(|interval| {
            interval.from == interval.to && interval.duration_ms > tuning.pause_threshold_ms
        })
        .map(|interval| interval.duration_ms)
        .collect();

    PauseStats {
        count: holds.len(),
        average_ms: mean(holds.iter().map(|hold| *hold as f64)),
        longest_ms: holds.iter().copied().max(),
    }
}

fn extreme_counts(actions: &[Action]) -> ExtremeCounts {
    actions
        .iter()
        .fold(ExtremeCounts { bottom: 0, top: 0 }, |mut counts, action| {
            if action.pos == Position::MIN {
                counts.bottom += 1;
            } else if action.pos == Position::MAX {
                counts.top += 1;
            }
            counts
        })
}

fn directional_speed(intervals: &[Interval], tuning: &AnalysisTuning) -> Option<DirectionalSpeed> {
    let significant = move || {
        intervals.iter().filter(move |interval| {
            interval.distance() > tuning.significant_distance && interval.duration_ms > 0
        })
    };
    let speed = |interval: &Interval| {
        f64::from(interval.distance()) / (interval.duration_ms as f64 / 1_000.0)
    };

    let average_up = mean(
        significant()
            .filter(|interval| interval.to > interval.from)
            .map(speed),
    )?;
    let average_down = mean(
        significant()
            .filter(|interval| interval.to < interval.from)
            .map(speed),
    )?;

    Some(DirectionalSpeed {
        average_up,
        average_down,
        ratio: average_up / average_down,
    })
}

fn distribution(actions: &[Action]) -> Vec<PositionBucket> {
    BUCKETS
        .iter()
        .map(|&(min, max)| {
            let count = actions
                .iter()
                .filter(|action| (min..=max).contains(&action.pos.get()))
                .count();
            PositionBucket {
                label: format!("{min}-{max}"),
                min,
                max,
                count,
                percentage: percentage(count, actions.len()),
            }
        })
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
