#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Motion Forge workspace.
//!
//! This crate defines the vocabulary that connects the generation system, the
//! analysis system, and the command-line adapter. Generation produces a
//! [`Timeline`] of [`Action`] keyframes, the [`Script`] artifact persists that
//! timeline together with its [`Metadata`], and analysis reads the artifact
//! back without mutating it. Every fallible operation reports through the
//! shared [`Error`] type.

pub mod script;

use serde::{Deserialize, Serialize};

pub use script::{Metadata, Script, ScriptLabels, SCRIPT_RANGE, SCRIPT_VERSION};

/// Result type for Motion Forge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by every Motion Forge crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A caller supplied a value outside its documented domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A statistic was requested from a sequence holding fewer than two actions.
    #[error("insufficient data: timeline holds {actions} action(s), at least 2 are required")]
    EmptyTimeline {
        /// Number of actions present in the rejected sequence.
        actions: usize,
    },

    /// A persisted artifact is missing fields or violates its invariants.
    #[error("malformed artifact: {0}")]
    MalformedArtifact(String),

    /// Reading or writing an artifact failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Normalized stroke position expressed on the closed `[0, 100]` scale.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u32", into = "u8")]
pub struct Position(u8);

impl Position {
    /// Bottom extreme of the stroke range.
    pub const MIN: Self = Self(0);
    /// Top extreme of the stroke range.
    pub const MAX: Self = Self(100);
    /// Midpoint used for the opening and closing keyframes.
    pub const NEUTRAL: Self = Self(50);

    /// Creates a position, rejecting values above [`Position::MAX`].
    pub fn new(value: u8) -> Result<Self> {
        if value > Self::MAX.0 {
            return Err(Error::InvalidParameter(format!(
                "position {value} exceeds {}",
                Self::MAX.0
            )));
        }
        Ok(Self(value))
    }

    /// Normalizes a fractional position by clamping it into range and truncating.
    ///
    /// Non-finite inputs collapse onto the nearest meaningful bound: `NaN`
    /// becomes [`Position::MIN`] and infinities saturate.
    #[must_use]
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self::MIN;
        }
        let bounded = value.clamp(f64::from(Self::MIN.0), f64::from(Self::MAX.0));
        Self(bounded.floor() as u8)
    }

    /// Retrieves the numeric representation of the position.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Reports whether the position sits on either end of the range.
    #[must_use]
    pub const fn is_extreme(&self) -> bool {
        self.0 == Self::MIN.0 || self.0 == Self::MAX.0
    }

    /// Absolute distance between two positions.
    #[must_use]
    pub const fn distance(self, other: Position) -> u8 {
        self.0.abs_diff(other.0)
    }
}

impl TryFrom<u32> for Position {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        let narrowed = u8::try_from(value).map_err(|_| {
            Error::InvalidParameter(format!("position {value} exceeds {}", Self::MAX.0))
        })?;
        Self::new(narrowed)
    }
}

impl From<Position> for u8 {
    fn from(position: Position) -> Self {
        position.0
    }
}

/// Single keyframe of the motion timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    /// Timestamp measured in milliseconds from the start of the timeline.
    pub at: u64,
    /// Position reached at the timestamp.
    pub pos: Position,
}

impl Action {
    /// Creates a keyframe at the provided timestamp and position.
    #[must_use]
    pub const fn new(at: u64, pos: Position) -> Self {
        Self { at, pos }
    }
}

/// Finalized, strictly ordered sequence of actions.
///
/// A timeline always holds at least two actions, starts at `at = 0`, and
/// never repeats a timestamp. It is immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timeline {
    actions: Vec<Action>,
}

impl Timeline {
    /// Validates the provided actions and wraps them as a timeline.
    pub fn new(actions: Vec<Action>) -> Result<Self> {
        if actions.len() < 2 {
            return Err(Error::EmptyTimeline {
                actions: actions.len(),
            });
        }

        if actions[0].at != 0 {
            return Err(Error::MalformedArtifact(format!(
                "first action must be at 0 ms, found {} ms",
                actions[0].at
            )));
        }

        if let Some(pair) = actions.windows(2).find(|pair| pair[1].at <= pair[0].at) {
            return Err(Error::MalformedArtifact(format!(
                "timestamps must strictly increase, found {} ms followed by {} ms",
                pair[0].at, pair[1].at
            )));
        }

        Ok(Self { actions })
    }

    /// Ordered keyframes composing the timeline.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Consumes the timeline, yielding the underlying keyframes.
    #[must_use]
    pub fn into_actions(self) -> Vec<Action> {
        self.actions
    }

    /// Number of keyframes in the timeline.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Always `false`; a timeline holds at least two actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Timestamp of the final keyframe.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.actions.last().map_or(0, |action| action.at)
    }

    /// Sum of absolute position changes between consecutive keyframes.
    #[must_use]
    pub fn total_distance(&self) -> u64 {
        self.actions
            .windows(2)
            .map(|pair| u64::from(pair[0].pos.distance(pair[1].pos)))
            .sum()
    }

    /// Aggregate speed in position units per second, truncated.
    #[must_use]
    pub fn average_speed(&self) -> u32 {
        let seconds = self.duration_ms() as f64 / 1_000.0;
        let speed = self.total_distance() as f64 / seconds;
        speed.min(f64::from(u32::MAX)) as u32
    }
}
