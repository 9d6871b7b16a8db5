//! Parametric motion-segment generators.
//!
//! Every generator is pure apart from the random source it is handed: it
//! reads a [`SegmentRequest`], returns a fresh [`Segment`], and never touches
//! scheduler state. All four honour the same contract: the first action sits
//! at `start_time`, the last at `end_time`, timestamps never decrease, and
//! positions are clamped into range.

use std::f64::consts::{PI, TAU};

use motion_forge_core::{Action, Position, Result};
use rand::Rng;

use crate::duration::DurationModel;
use crate::tuning::{FullRangeTuning, GenerationTuning, ShapeTuning};

/// Inputs shared by every segment generator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentRequest {
    /// Position the segment departs from.
    pub start_pos: Position,
    /// Requested destination; full-range cycles choose their own.
    pub end_pos: Position,
    /// Timestamp of the first emitted action.
    pub start_time: u64,
    /// Multiplier applied to every duration; must be positive.
    pub speed_multiplier: f64,
}

/// Actions emitted by one generator call and the state they leave behind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Ordered keyframes, starting at the requested time.
    pub actions: Vec<Action>,
    /// Timestamp of the final keyframe.
    pub end_time: u64,
    /// Position the timeline rests at after the segment.
    pub end_pos: Position,
}

/// Interpolation shapes available to the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MotionShape {
    /// Linear travel overlaid with one full sine cycle.
    Wave,
    /// Cosine ease-in/ease-out travel.
    Gradual,
    /// Stepped travel with visible holds.
    Plateau,
    /// Excursion touching both extremes before settling on one of them.
    FullRange,
}

impl MotionShape {
    /// Regular shapes in the order matching [`ShapeTuning::weights`].
    pub const REGULAR: [MotionShape; 3] = [Self::Wave, Self::Gradual, Self::Plateau];

    /// Runs the generator for this shape.
    ///
    /// The whole tuning is validated first, so a configuration rejected by
    /// [`GenerationTuning::validate`] fails here with `InvalidParameter`.
    pub fn generate<R: Rng + ?Sized>(
        self,
        request: &SegmentRequest,
        tuning: &GenerationTuning,
        rng: &mut R,
    ) -> Result<Segment> {
        tuning.validate()?;
        let model = DurationModel::new(&tuning.duration)?;
        match self {
            Self::Wave => wave(request, &model, &tuning.shapes, rng),
            Self::Gradual => gradual(request, &model, &tuning.shapes, rng),
            Self::Plateau => plateau(request, &model, &tuning.shapes),
            Self::FullRange => full_range(request, &model, &tuning.full_range, rng),
        }
    }
}

/// Oscillating travel: linear progress plus a sinusoidal offset.
///
/// The amplitude is drawn once per call and the offset vanishes on both
/// endpoints so the segment starts and ends exactly where requested.
pub fn wave<R: Rng + ?Sized>(
    request: &SegmentRequest,
    model: &DurationModel,
    shapes: &ShapeTuning,
    rng: &mut R,
) -> Result<Segment> {
    shapes.validate()?;
    let duration = travel_duration(request, model)?;
    let intervals = shapes.wave_intervals.sample(rng);
    let amplitude = f64::from(shapes.wave_amplitude.sample(rng));
    let (start, delta) = span(request);

    let actions = (0..=intervals)
        .map(|index| {
            let progress = f64::from(index) / f64::from(intervals);
            let offset = if index == 0 || index == intervals {
                0.0
            } else {
                amplitude * (progress * TAU).sin()
            };
            Action::new(
                request.start_time + fraction_of(duration, progress),
                Position::clamped(start + delta * progress + offset),
            )
        })
        .collect();

    Ok(Segment {
        actions,
        end_time: request.start_time + duration,
        end_pos: request.end_pos,
    })
}

/// Eased travel using `(cos((1 - t)·π) + 1) / 2` as the progress curve.
pub fn gradual<R: Rng + ?Sized>(
    request: &SegmentRequest,
    model: &DurationModel,
    shapes: &ShapeTuning,
    rng: &mut R,
) -> Result<Segment> {
    shapes.validate()?;
    let duration = travel_duration(request, model)?;
    let intervals = shapes.gradual_intervals.sample(rng);
    let (start, delta) = span(request);

    let actions = (0..=intervals)
        .map(|index| {
            let progress = f64::from(index) / f64::from(intervals);
            let eased = (((1.0 - progress) * PI).cos() + 1.0) / 2.0;
            Action::new(
                request.start_time + fraction_of(duration, progress),
                Position::clamped(start + delta * eased),
            )
        })
        .collect();

    Ok(Segment {
        actions,
        end_time: request.start_time + duration,
        end_pos: request.end_pos,
    })
}

/// Stepped travel: each step moves to its sub-target and then holds there.
///
/// Each step contributes a move keyframe and a hold keyframe spaced
/// `duration / (2 * steps)` apart, followed by one final keyframe on the
/// requested destination.
pub fn plateau(
    request: &SegmentRequest,
    model: &DurationModel,
    shapes: &ShapeTuning,
) -> Result<Segment> {
    shapes.validate()?;
    let duration = travel_duration(request, model)?;
    let steps = shapes.plateau_steps;
    let step_ms = duration / (u64::from(steps) * 2);
    let (start, delta) = span(request);

    let mut actions = Vec::with_capacity(steps as usize * 2 + 1);
    let mut time = request.start_time;
    let mut current = request.start_pos;
    for step in 1..=steps {
        let target = Position::clamped(start + delta * f64::from(step) / f64::from(steps));
        actions.push(Action::new(time, current));
        time += step_ms;
        actions.push(Action::new(time, target));
        time += step_ms;
        current = target;
    }
    actions.push(Action::new(time, request.end_pos));

    Ok(Segment {
        actions,
        end_time: time,
        end_pos: request.end_pos,
    })
}

/// Two-leg excursion through both extremes.
///
/// Departing below the midpoint the cycle visits the top first and settles on
/// the bottom; otherwise the order is reversed. The total duration is drawn
/// from the tuned band, shortened by the speed multiplier without leaving the
/// band, and split between the legs by the duration model's directional bias.
/// The requested destination is ignored.
pub fn full_range<R: Rng + ?Sized>(
    request: &SegmentRequest,
    model: &DurationModel,
    cycle: &FullRangeTuning,
    rng: &mut R,
) -> Result<Segment> {
    cycle.validate_cycle()?;
    let (first, last) = if request.start_pos < Position::NEUTRAL {
        (Position::MAX, Position::MIN)
    } else {
        (Position::MIN, Position::MAX)
    };

    let band = cycle.duration_ms;
    let drawn = f64::from(band.sample(rng));
    let budget = (drawn / request.speed_multiplier).clamp(f64::from(band.min), f64::from(band.max));
    let half = budget / 2.0;
    let first_weight = model.scale(half, first > request.start_pos, request.speed_multiplier)?;
    let second_weight = model.scale(half, last > first, request.speed_multiplier)?;

    let total_ms = budget as u64;
    let first_ms = fraction_of(total_ms, first_weight / (first_weight + second_weight));
    let second_ms = total_ms - first_ms;

    let samples = cycle.samples_per_leg;
    let mut actions = Vec::with_capacity(samples as usize * 2 - 1);
    actions.extend(leg(request.start_time, request.start_pos, first, first_ms, samples, 0));
    actions.extend(leg(request.start_time + first_ms, first, last, second_ms, samples, 1));

    Ok(Segment {
        actions,
        end_time: request.start_time + total_ms,
        end_pos: last,
    })
}

fn leg(
    start_time: u64,
    from: Position,
    to: Position,
    duration: u64,
    samples: u32,
    skip: u32,
) -> impl Iterator<Item = Action> {
    let intervals = samples - 1;
    let origin = f64::from(from.get());
    let delta = f64::from(to.get()) - origin;
    (skip..=intervals).map(move |index| {
        let progress = f64::from(index) / f64::from(intervals);
        Action::new(
            start_time + fraction_of(duration, progress),
            Position::clamped(origin + delta * progress),
        )
    })
}

fn travel_duration(request: &SegmentRequest, model: &DurationModel) -> Result<u64> {
    let distance = request.start_pos.distance(request.end_pos);
    model.duration(
        distance,
        request.end_pos > request.start_pos,
        request.speed_multiplier,
    )
}

fn span(request: &SegmentRequest) -> (f64, f64) {
    let start = f64::from(request.start_pos.get());
    (start, f64::from(request.end_pos.get()) - start)
}

fn fraction_of(duration: u64, progress: f64) -> u64 {
    (duration as f64 * progress) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::SampleRange;
    use motion_forge_core::Error;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn position(value: u8) -> Position {
        Position::new(value).expect("valid position")
    }

    fn request(start: u8, end: u8, start_time: u64, speed_multiplier: f64) -> SegmentRequest {
        SegmentRequest {
            start_pos: position(start),
            end_pos: position(end),
            start_time,
            speed_multiplier,
        }
    }

    fn assert_contract(segment: &Segment, start_time: u64) {
        let first = segment.actions.first().expect("segment emits actions");
        let last = segment.actions.last().expect("segment emits actions");
        assert_eq!(first.at, start_time, "first action must sit at the start time");
        assert_eq!(last.at, segment.end_time, "last action must sit at the end time");
        assert_eq!(last.pos, segment.end_pos, "last action must sit at the end position");
        assert!(
            segment.actions.windows(2).all(|pair| pair[0].at <= pair[1].at),
            "timestamps must not decrease: {:?}",
            segment.actions
        );
        assert!(segment
            .actions
            .iter()
            .all(|action| action.pos <= Position::MAX));
    }

    #[test]
    fn regular_shapes_honour_contract_across_seeds() {
        let tuning = GenerationTuning::default();
        let pairs = [(50, 85), (85, 25), (0, 15), (100, 90), (30, 30), (15, 90)];
        for seed in 0..32u64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for (start, end) in pairs {
                for shape in MotionShape::REGULAR {
                    let request = request(start, end, 12_345, 1.2);
                    let segment = shape
                        .generate(&request, &tuning, &mut rng)
                        .expect("segment generates");
                    assert_contract(&segment, 12_345);
                    assert_eq!(segment.end_pos, position(end));
                    assert_eq!(segment.actions[0].pos, position(start));
                }
            }
        }
    }

    #[test]
    fn wave_emits_six_to_eight_samples_and_leaves_the_line() {
        let tuning = GenerationTuning::default();
        let model = DurationModel::new(&tuning.duration).expect("valid duration tuning");
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut deviated = false;
        for _ in 0..50 {
            let segment = wave(&request(30, 70, 0, 1.0), &model, &tuning.shapes, &mut rng)
                .expect("wave generates");
            assert!((6..=8).contains(&segment.actions.len()));
            assert_eq!(segment.end_time, 4_000);
            let intervals = (segment.actions.len() - 1) as f64;
            deviated |= segment.actions.iter().enumerate().any(|(index, action)| {
                let linear = 30.0 + 40.0 * index as f64 / intervals;
                (f64::from(action.pos.get()) - linear).abs() >= 2.0
            });
        }
        assert!(deviated, "wave offsets must move samples off the straight line");
    }

    #[test]
    fn wave_spacing_stays_fluid() {
        let tuning = GenerationTuning::default();
        let model = DurationModel::new(&tuning.duration).expect("valid duration tuning");
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let segment = wave(&request(45, 60, 0, 1.3), &model, &tuning.shapes, &mut rng)
            .expect("wave generates");
        let gaps: Vec<u64> = segment
            .actions
            .windows(2)
            .map(|pair| pair[1].at - pair[0].at)
            .collect();
        let average = gaps.iter().sum::<u64>() as f64 / gaps.len() as f64;
        assert!(average > 40.0, "average spacing {average} ms is too dense");
    }

    #[test]
    fn gradual_eases_monotonically() {
        let tuning = GenerationTuning::default();
        let model = DurationModel::new(&tuning.duration).expect("valid duration tuning");
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let segment = gradual(&request(80, 20, 1_000, 1.0), &model, &tuning.shapes, &mut rng)
            .expect("gradual generates");
        assert!((9..=11).contains(&segment.actions.len()));
        assert_eq!(segment.end_time, 1_000 + 9_000);
        assert!(segment
            .actions
            .windows(2)
            .all(|pair| pair[1].pos <= pair[0].pos));

        let first_step = segment.actions[0].pos.distance(segment.actions[1].pos);
        let middle = segment.actions.len() / 2;
        let middle_step = segment.actions[middle - 1]
            .pos
            .distance(segment.actions[middle].pos);
        assert!(first_step < middle_step, "ease-in must start slowly");
    }

    #[test]
    fn plateau_holds_between_steps() {
        let tuning = GenerationTuning::default();
        let model = DurationModel::new(&tuning.duration).expect("valid duration tuning");
        let segment = plateau(&request(20, 80, 0, 1.0), &model, &tuning.shapes)
            .expect("plateau generates");

        let positions: Vec<u8> = segment.actions.iter().map(|action| action.pos.get()).collect();
        assert_eq!(positions, vec![20, 40, 40, 60, 60, 80, 80]);

        let times: Vec<u64> = segment.actions.iter().map(|action| action.at).collect();
        assert_eq!(times, vec![0, 1_000, 2_000, 3_000, 4_000, 5_000, 6_000]);
        assert_eq!(segment.end_time, 6_000);
    }

    #[test]
    fn plateau_descends_with_truncated_steps() {
        let tuning = GenerationTuning::default();
        let model = DurationModel::new(&tuning.duration).expect("valid duration tuning");
        let segment = plateau(&request(80, 30, 0, 1.0), &model, &tuning.shapes)
            .expect("plateau generates");
        let positions: Vec<u8> = segment.actions.iter().map(|action| action.pos.get()).collect();
        assert_eq!(positions, vec![80, 63, 63, 46, 46, 30, 30]);
    }

    #[test]
    fn full_range_visits_both_extremes_within_band() {
        let tuning = GenerationTuning::default();
        let model = DurationModel::new(&tuning.duration).expect("valid duration tuning");
        for seed in 0..16u64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for (start, expected) in [(20, [100, 0]), (75, [0, 100]), (50, [0, 100])] {
                for multiplier in [1.0, 1.3] {
                    let request = request(start, 60, 90_000, multiplier);
                    let segment = full_range(&request, &model, &tuning.full_range, &mut rng)
                        .expect("cycle generates");
                    assert_contract(&segment, 90_000);
                    assert_eq!(segment.actions.len(), 15);
                    assert_eq!(segment.actions[0].pos, position(start));
                    assert_eq!(segment.actions[7].pos, position(expected[0]));
                    assert_eq!(segment.actions[14].pos, position(expected[1]));
                    assert_eq!(segment.end_pos, position(expected[1]));

                    let total = segment.end_time - 90_000;
                    assert!((10_000..=12_000).contains(&total), "cycle lasted {total} ms");
                }
            }
        }
    }

    #[test]
    fn full_range_upward_leg_is_shorter() {
        let tuning = GenerationTuning::default();
        let model = DurationModel::new(&tuning.duration).expect("valid duration tuning");
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let segment = full_range(&request(10, 10, 0, 1.0), &model, &tuning.full_range, &mut rng)
            .expect("cycle generates");
        let up_leg = segment.actions[7].at - segment.actions[0].at;
        let down_leg = segment.actions[14].at - segment.actions[7].at;
        assert!(up_leg < down_leg, "up {up_leg} ms vs down {down_leg} ms");
    }

    #[test]
    fn generators_reject_invalid_multiplier() {
        let tuning = GenerationTuning::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for shape in [
            MotionShape::Wave,
            MotionShape::Gradual,
            MotionShape::Plateau,
            MotionShape::FullRange,
        ] {
            let result = shape.generate(&request(40, 60, 0, 0.0), &tuning, &mut rng);
            assert!(matches!(result, Err(Error::InvalidParameter(_))), "{shape:?}");
        }
    }

    #[test]
    fn cycles_without_enough_leg_samples_are_rejected() {
        let mut tuning = GenerationTuning::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for samples in [0, 1] {
            tuning.full_range.samples_per_leg = samples;
            let result =
                MotionShape::FullRange.generate(&request(20, 20, 0, 1.0), &tuning, &mut rng);
            assert!(matches!(result, Err(Error::InvalidParameter(_))), "{samples} samples");

            let model = DurationModel::new(&tuning.duration).expect("valid duration tuning");
            let result =
                full_range(&request(20, 20, 0, 1.0), &model, &tuning.full_range, &mut rng);
            assert!(matches!(result, Err(Error::InvalidParameter(_))), "{samples} samples");
        }
    }

    #[test]
    fn degenerate_shape_tuning_is_rejected_before_sampling() {
        let mut tuning = GenerationTuning::default();
        tuning.shapes.wave_intervals = SampleRange::new(0, 0);
        tuning.shapes.gradual_intervals = SampleRange::new(5, 2);
        let model = DurationModel::new(&tuning.duration).expect("valid duration tuning");
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        for shape in [MotionShape::Wave, MotionShape::Gradual, MotionShape::Plateau] {
            let result = shape.generate(&request(0, 100, 0, 1.0), &tuning, &mut rng);
            assert!(matches!(result, Err(Error::InvalidParameter(_))), "{shape:?}");
        }
        assert!(matches!(
            wave(&request(0, 100, 0, 1.0), &model, &tuning.shapes, &mut rng),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            gradual(&request(0, 100, 0, 1.0), &model, &tuning.shapes, &mut rng),
            Err(Error::InvalidParameter(_))
        ));

        tuning.shapes = ShapeTuning {
            plateau_steps: 0,
            ..ShapeTuning::default()
        };
        assert!(matches!(
            plateau(&request(0, 100, 0, 1.0), &model, &tuning.shapes),
            Err(Error::InvalidParameter(_))
        ));
    }
}
