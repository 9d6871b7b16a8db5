//! Turns the accumulated samples into a finalized [`Timeline`].

use motion_forge_core::{Action, Position, Result, Timeline};

/// Closes, orders, and deduplicates the accumulated samples.
///
/// A closing keyframe at `total_duration_ms` is appended when the samples
/// stop short of the target. Samples sharing a timestamp keep the one that
/// was emitted first.
pub fn finalize(
    mut actions: Vec<Action>,
    total_duration_ms: u64,
    closing: Position,
) -> Result<Timeline> {
    if actions
        .last()
        .map_or(true, |action| action.at < total_duration_ms)
    {
        actions.push(Action::new(total_duration_ms, closing));
    }
    Timeline::new(sort_and_dedupe(actions))
}

/// Stable-sorts by timestamp and drops every later sample sharing a timestamp.
#[must_use]
pub fn sort_and_dedupe(mut actions: Vec<Action>) -> Vec<Action> {
    actions.sort_by_key(|action| action.at);
    actions.dedup_by_key(|action| action.at);
    actions
}
