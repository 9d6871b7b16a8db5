//! Distance-to-time conversion encoding the directional speed asymmetry.

use motion_forge_core::{Error, Result};

use crate::tuning::DurationTuning;

/// Converts position distances into elapsed milliseconds.
///
/// For equal distance and multiplier an increasing move always takes less
/// time than a decreasing one, by the fixed `up_speed_multiplier` ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DurationModel {
    ms_per_unit: f64,
    up_speed_multiplier: f64,
}

impl DurationModel {
    /// Builds the model, rejecting a non-positive rate or a bias that does
    /// not favour increasing moves.
    pub fn new(tuning: &DurationTuning) -> Result<Self> {
        tuning.validate()?;
        Ok(Self {
            ms_per_unit: tuning.ms_per_unit,
            up_speed_multiplier: tuning.up_speed_multiplier,
        })
    }

    /// Elapsed whole milliseconds for a move spanning `distance` units.
    pub fn duration(&self, distance: u8, increasing: bool, speed_multiplier: f64) -> Result<u64> {
        let budget = self.ms_per_unit * f64::from(distance);
        let scaled = self.scale(budget, increasing, speed_multiplier)?;
        Ok(scaled as u64)
    }

    /// Applies the speed multiplier and directional bias to an arbitrary budget.
    pub fn scale(&self, budget_ms: f64, increasing: bool, speed_multiplier: f64) -> Result<f64> {
        check_multiplier(speed_multiplier)?;
        let mut scaled = budget_ms.max(0.0) / speed_multiplier;
        if increasing {
            scaled /= self.up_speed_multiplier;
        }
        Ok(scaled)
    }

    /// Ratio by which increasing moves outpace decreasing ones.
    #[must_use]
    pub fn up_speed_multiplier(&self) -> f64 {
        self.up_speed_multiplier
    }
}

fn check_multiplier(speed_multiplier: f64) -> Result<()> {
    if speed_multiplier.is_finite() && speed_multiplier > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "speed multiplier must be positive and finite, got {speed_multiplier}"
        )))
    }
}
