use motion_forge_core::{Position, Timeline};
use motion_forge_system_analysis::{analyze, verify_cycles, AnalysisTuning, VerifierTuning};
use motion_forge_system_generation::{sort_and_dedupe, Generation, GenerationTuning};

fn generate(tuning: GenerationTuning, seed: u64) -> Timeline {
    Generation::new(tuning)
        .expect("valid tuning")
        .generate_seeded(seed)
        .expect("generation succeeds")
}

fn assert_invariants(timeline: &Timeline) {
    let actions = timeline.actions();
    assert_eq!(actions[0].at, 0, "timeline must open at 0 ms");
    assert!(
        actions.windows(2).all(|pair| pair[0].at < pair[1].at),
        "timestamps must strictly increase"
    );
    assert!(actions.iter().all(|action| action.pos <= Position::MAX));
}

#[test]
fn reference_sessions_hold_their_invariants() {
    for seed in 0..4 {
        let timeline = generate(GenerationTuning::default(), seed);
        assert_invariants(&timeline);
        assert!(
            (1_800_000..=1_860_000).contains(&timeline.duration_ms()),
            "seed {seed} ended at {} ms",
            timeline.duration_ms()
        );
    }
}

#[test]
fn finalization_is_idempotent_on_generated_timelines() {
    let timeline = generate(GenerationTuning::default(), 21);
    let again = sort_and_dedupe(timeline.actions().to_vec());
    assert_eq!(again.as_slice(), timeline.actions());
}

#[test]
fn short_session_without_cycles_or_pauses_covers_its_duration() {
    let mut tuning = GenerationTuning::default();
    tuning.total_duration_ms = 30_000;
    tuning.full_range.count = 0;
    tuning.pause.probability = 0.0;

    for seed in 0..16 {
        let timeline = generate(tuning.clone(), seed);
        assert_invariants(&timeline);
        assert!(timeline.duration_ms() >= 30_000, "seed {seed} stopped short");
        assert!(timeline.average_speed() > 0, "seed {seed} never moved");
    }
}

#[test]
fn upward_motion_outpaces_downward_motion() {
    let seeds = 0..8u64;
    let mut ratios = Vec::new();
    for seed in seeds {
        let timeline = generate(GenerationTuning::default(), seed);
        let report =
            analyze(timeline.actions(), &AnalysisTuning::default()).expect("analysis succeeds");
        let speed = report.speed.expect("both directions occur over thirty minutes");
        assert!(
            (1.1..=1.7).contains(&speed.ratio),
            "seed {seed} produced an up/down ratio of {:.3}",
            speed.ratio
        );
        ratios.push(speed.ratio);
    }

    let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
    assert!(
        (1.25..=1.5).contains(&mean),
        "mean up/down ratio {mean:.3} drifted from the target band"
    );
}

#[test]
fn every_scheduled_cycle_is_detected_within_its_band() {
    for seed in [3, 8, 13, 2024] {
        let timeline = generate(GenerationTuning::default(), seed);
        let report =
            verify_cycles(timeline.actions(), &VerifierTuning::default()).expect("verifies");
        assert_eq!(report.count, 5, "seed {seed}: {:?}", report.cycles);
        for cycle in &report.cycles {
            assert!(
                (10_000..=12_000).contains(&cycle.duration_ms),
                "seed {seed}: cycle at {} ms lasted {} ms",
                cycle.start_at,
                cycle.duration_ms
            );
            assert!(cycle.pattern[1] == 0 || cycle.pattern[1] == 100);
            assert_ne!(cycle.pattern[1], cycle.pattern[2]);
        }
    }
}

#[test]
fn cycle_count_follows_tuning() {
    let mut tuning = GenerationTuning::default();
    tuning.total_duration_ms = 10 * 60 * 1_000;
    tuning.full_range.count = 2;
    let timeline = generate(tuning, 99);
    let report = verify_cycles(timeline.actions(), &VerifierTuning::default()).expect("verifies");
    assert_eq!(report.count, 2);

    let mut tuning = GenerationTuning::default();
    tuning.total_duration_ms = 10 * 60 * 1_000;
    tuning.full_range.count = 0;
    let timeline = generate(tuning, 99);
    let report = verify_cycles(timeline.actions(), &VerifierTuning::default()).expect("verifies");
    assert_eq!(report.count, 0);
}
