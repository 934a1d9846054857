//! Per-refresh metrics for the environment.
//!
//! [`StepMetrics`] captures timing and counters for the most recent
//! snapshot refresh. Timings are wall clock, not simulation time.

/// Timing and counter metrics from the most recent refresh.
///
/// All durations are in microseconds. Counters marked cumulative cover
/// the whole episode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Wall-clock time for the whole refresh, in microseconds.
    pub total_us: u64,
    /// Time spent replaying the frame or polling procedural mobility.
    pub replay_us: u64,
    /// Time spent aggregating the snapshot into features.
    pub aggregate_us: u64,
    /// Active vehicles in the refreshed snapshot.
    pub active_count: usize,
    /// Cumulative frame entries dropped for falling outside the roster.
    pub roster_mismatch_drops: u64,
    /// Cumulative actions rejected because the episode was terminal.
    pub rejected_actions: u64,
}
