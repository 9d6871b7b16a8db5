//! Tuning surface controlling every adjustable aspect of timeline generation.

use motion_forge_core::{Error, Position, Result, ScriptLabels};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Aggregated tuning knobs for the generator.
///
/// `Default` reproduces the reference session: thirty minutes, five
/// full-range cycles, a boost window every minute.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationTuning {
    /// Target length of the timeline in milliseconds; the loop stops once time reaches it.
    pub total_duration_ms: u64,
    /// Position of the opening keyframe at `at = 0`.
    pub start_position: u8,
    /// Position of the closing keyframe appended when generation falls short of the target.
    pub closing_position: u8,
    /// Overshoot past the target after which the loop terminates unconditionally.
    pub overshoot_margin_ms: u64,
    /// Converts distance and direction into elapsed time.
    pub duration: DurationTuning,
    /// Sampling density and selection weights of the regular segment shapes.
    pub shapes: ShapeTuning,
    /// Controls where regular segments travel.
    pub targets: TargetTuning,
    /// Randomized holds spliced between segments.
    pub pause: PauseTuning,
    /// Periodic speed boost windows.
    pub speed: SpeedVariationTuning,
    /// Scheduled full-range cycles.
    pub full_range: FullRangeTuning,
    /// Descriptive labels copied into the artifact metadata.
    pub labels: ScriptLabels,
}

impl Default for GenerationTuning {
    fn default() -> Self {
        Self {
            total_duration_ms: 30 * 60 * 1_000,
            start_position: 50,
            closing_position: 50,
            overshoot_margin_ms: 60_000,
            duration: DurationTuning::default(),
            shapes: ShapeTuning::default(),
            targets: TargetTuning::default(),
            pause: PauseTuning::default(),
            speed: SpeedVariationTuning::default(),
            full_range: FullRangeTuning::default(),
            labels: ScriptLabels::default(),
        }
    }
}

impl GenerationTuning {
    /// Rejects configurations the scheduler cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.total_duration_ms == 0 {
            return Err(invalid("total_duration_ms must be positive"));
        }
        let _ = Position::new(self.start_position)?;
        let _ = Position::new(self.closing_position)?;
        self.duration.validate()?;
        self.shapes.validate()?;
        self.targets.validate()?;
        self.pause.validate()?;
        self.speed.validate()?;
        self.full_range.validate(self.total_duration_ms)
    }
}

/// Parameters of the duration model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationTuning {
    /// Milliseconds spent per position unit at multiplier 1.0; raising this slows every move.
    pub ms_per_unit: f64,
    /// Divisor applied to upward moves; values above 1.0 make increasing motion faster.
    pub up_speed_multiplier: f64,
}

impl Default for DurationTuning {
    fn default() -> Self {
        Self {
            ms_per_unit: 150.0,
            up_speed_multiplier: 1.5,
        }
    }
}

impl DurationTuning {
    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.ms_per_unit.is_finite() && self.ms_per_unit > 0.0) {
            return Err(invalid("duration.ms_per_unit must be positive"));
        }
        if !(self.up_speed_multiplier.is_finite() && self.up_speed_multiplier > 1.0) {
            return Err(invalid("duration.up_speed_multiplier must exceed 1.0"));
        }
        Ok(())
    }
}

/// Inclusive integer range sampled uniformly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRange {
    /// Smallest value that may be drawn.
    pub min: u32,
    /// Largest value that may be drawn.
    pub max: u32,
}

impl SampleRange {
    /// Creates a range covering `min..=max`.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Draws a value uniformly from the range.
    ///
    /// # Panics
    ///
    /// Panics when `min > max`; validated tuning never holds such a range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.min..=self.max)
    }

    fn validate(&self, name: &str, floor: u32) -> Result<()> {
        if self.min > self.max {
            return Err(invalid(&format!(
                "{name} is inverted ({} > {})",
                self.min, self.max
            )));
        }
        if self.min < floor {
            return Err(invalid(&format!("{name} must start at {floor} or above")));
        }
        Ok(())
    }

    fn validate_positions(&self, name: &str) -> Result<()> {
        self.validate(name, 0)?;
        if self.max > u32::from(Position::MAX.get()) {
            return Err(invalid(&format!("{name} exceeds the position range")));
        }
        Ok(())
    }
}

/// Sampling density and relative weights of the regular segment shapes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeTuning {
    /// Relative likelihood of choosing the oscillating wave shape.
    pub wave_weight: u32,
    /// Relative likelihood of choosing the eased gradual shape.
    pub gradual_weight: u32,
    /// Relative likelihood of choosing the plateau shape.
    pub plateau_weight: u32,
    /// Number of intervals in a wave segment; a wave emits one more sample than intervals.
    pub wave_intervals: SampleRange,
    /// Peak sinusoidal offset of a wave, drawn once per segment.
    pub wave_amplitude: SampleRange,
    /// Number of intervals in a gradual segment.
    pub gradual_intervals: SampleRange,
    /// Number of move-and-hold steps in a plateau segment.
    pub plateau_steps: u32,
}

impl Default for ShapeTuning {
    fn default() -> Self {
        Self {
            wave_weight: 2,
            gradual_weight: 2,
            plateau_weight: 1,
            wave_intervals: SampleRange::new(5, 7),
            wave_amplitude: SampleRange::new(5, 10),
            gradual_intervals: SampleRange::new(8, 10),
            plateau_steps: 3,
        }
    }
}

impl ShapeTuning {
    /// Shape weights in wave, gradual, plateau order.
    #[must_use]
    pub fn weights(&self) -> [u32; 3] {
        [self.wave_weight, self.gradual_weight, self.plateau_weight]
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.weights().iter().all(|weight| *weight == 0) {
            return Err(invalid("shapes require at least one non-zero weight"));
        }
        self.wave_intervals.validate("shapes.wave_intervals", 1)?;
        self.wave_amplitude.validate("shapes.wave_amplitude", 0)?;
        self.gradual_intervals.validate("shapes.gradual_intervals", 1)?;
        if self.plateau_steps == 0 {
            return Err(invalid("shapes.plateau_steps must be positive"));
        }
        Ok(())
    }
}

/// Controls how the next regular target position is chosen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetTuning {
    /// Probability of jumping to one of the tease positions.
    pub tease_probability: f64,
    /// Near-extreme positions used for teases.
    pub tease_positions: Vec<u8>,
    /// Positions strictly below this value count as the low zone.
    pub low_zone_below: u8,
    /// Positions strictly above this value count as the high zone.
    pub high_zone_above: u8,
    /// Targets drawn while in the low zone.
    pub low_band: SampleRange,
    /// Targets drawn while in the high zone.
    pub high_band: SampleRange,
    /// Targets drawn while between the zones.
    pub mid_band: SampleRange,
}

impl Default for TargetTuning {
    fn default() -> Self {
        Self {
            tease_probability: 0.15,
            tease_positions: vec![15, 20, 85, 90],
            low_zone_below: 35,
            high_zone_above: 75,
            low_band: SampleRange::new(45, 85),
            high_band: SampleRange::new(25, 65),
            mid_band: SampleRange::new(25, 85),
        }
    }
}

impl TargetTuning {
    fn validate(&self) -> Result<()> {
        validate_probability("targets.tease_probability", self.tease_probability)?;
        if self.tease_probability > 0.0 && self.tease_positions.is_empty() {
            return Err(invalid("targets.tease_positions must not be empty"));
        }
        for position in &self.tease_positions {
            let _ = Position::new(*position)?;
        }
        self.low_band.validate_positions("targets.low_band")?;
        self.high_band.validate_positions("targets.high_band")?;
        self.mid_band.validate_positions("targets.mid_band")
    }
}

/// Randomized hold parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PauseTuning {
    /// Chance of injecting a hold before a regular segment outside boost windows.
    pub probability: f64,
    /// Longest hold in milliseconds; holds are drawn from `0..=max_ms`.
    pub max_ms: u64,
}

impl Default for PauseTuning {
    fn default() -> Self {
        Self {
            probability: 0.15,
            max_ms: 3_000,
        }
    }
}

impl PauseTuning {
    fn validate(&self) -> Result<()> {
        validate_probability("pause.probability", self.probability)
    }
}

/// Periodic speed boost parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedVariationTuning {
    /// Distance between boost boundaries; each boundary toggles the boost on or off.
    pub interval_ms: u64,
    /// Smallest fractional boost; a value of 0.1 makes moves 10% faster.
    pub boost_min: f64,
    /// Largest fractional boost.
    pub boost_max: f64,
}

impl Default for SpeedVariationTuning {
    fn default() -> Self {
        Self {
            interval_ms: 60_000,
            boost_min: 0.10,
            boost_max: 0.30,
        }
    }
}

impl SpeedVariationTuning {
    fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(invalid("speed.interval_ms must be positive"));
        }
        let finite = self.boost_min.is_finite() && self.boost_max.is_finite();
        if !finite || self.boost_min <= -1.0 || self.boost_min > self.boost_max {
            return Err(invalid(
                "speed boost range must be finite, ordered, and keep the multiplier positive",
            ));
        }
        Ok(())
    }
}

/// Scheduled full-range cycle parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FullRangeTuning {
    /// Number of cycles scheduled across the timeline.
    pub count: usize,
    /// Distance kept between trigger times and either end of the timeline.
    pub safety_margin_ms: u64,
    /// Band the total cycle duration is drawn from and clamped into.
    pub duration_ms: SampleRange,
    /// Evenly spaced samples per leg, counting both leg endpoints.
    pub samples_per_leg: u32,
}

impl Default for FullRangeTuning {
    fn default() -> Self {
        Self {
            count: 5,
            safety_margin_ms: 60_000,
            duration_ms: SampleRange::new(10_000, 12_000),
            samples_per_leg: 8,
        }
    }
}

impl FullRangeTuning {
    /// Checks the parameters that shape a single cycle.
    pub(crate) fn validate_cycle(&self) -> Result<()> {
        self.duration_ms.validate("full_range.duration_ms", 1)?;
        if self.samples_per_leg < 2 {
            return Err(invalid("full_range.samples_per_leg must be at least 2"));
        }
        Ok(())
    }

    fn validate(&self, total_duration_ms: u64) -> Result<()> {
        self.validate_cycle()?;
        if self.count > 0 && self.safety_margin_ms.saturating_mul(2) > total_duration_ms {
            return Err(invalid(
                "full_range.safety_margin_ms leaves no room for trigger times",
            ));
        }
        Ok(())
    }
}

fn validate_probability(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(&format!("{name} must lie within [0, 1]")))
    }
}

fn invalid(message: &str) -> Error {
    Error::InvalidParameter(message.to_owned())
}
