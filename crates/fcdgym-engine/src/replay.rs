//! Trace replay: tick → frame → roster + snapshot.
//!
//! [`MobilityReplayEngine::apply`] resolves the frame for a tick under a
//! [`ReplayPolicy`], teleports every in-range actor of that frame, and
//! returns a freshly built
//! [`ActiveStateSnapshot`](fcdgym_core::ActiveStateSnapshot). Actors whose
//! index is outside the roster are dropped and counted.

use fcdgym_core::{ActiveStateSnapshot, TickId};
use fcdgym_trace::Trajectory;

use crate::roster::ActorRoster;

/// How a tick past the last frame is resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReplayPolicy {
    /// Hold the last frame: `min(tick, N - 1)`.
    #[default]
    Clamp,
    /// Wrap around: `tick mod N`.
    Loop,
}

impl ReplayPolicy {
    /// Frame index for `tick` in a trajectory of `frame_count` frames.
    ///
    /// Returns 0 for an empty trajectory.
    pub fn effective_index(self, tick: TickId, frame_count: usize) -> usize {
        if frame_count == 0 {
            return 0;
        }
        let n = frame_count as u64;
        let index = match self {
            Self::Clamp => tick.0.min(n - 1),
            Self::Loop => tick.0 % n,
        };
        index as usize
    }
}

/// Where a replayed vehicle's speed comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpeedSource {
    /// The trace's `speed` attribute.
    #[default]
    Reported,
    /// Planar distance from the previous frame divided by the tick
    /// duration; 0 at frame 0 or when absent from the previous frame.
    Derived,
}

/// Result of one replay.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReplayOutcome {
    /// The vehicles active this tick.
    pub snapshot: ActiveStateSnapshot,
    /// Frame the tick resolved to.
    pub frame_index: usize,
    /// Frame entries dropped because their actor is outside the roster.
    pub dropped: usize,
}

/// Applies trajectory frames to an actor roster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MobilityReplayEngine {
    policy: ReplayPolicy,
    speed_source: SpeedSource,
}

impl MobilityReplayEngine {
    /// An engine resolving ticks with `policy`.
    pub fn new(policy: ReplayPolicy, speed_source: SpeedSource) -> Self {
        Self {
            policy,
            speed_source,
        }
    }

    /// The tick resolution policy.
    pub fn policy(&self) -> ReplayPolicy {
        self.policy
    }

    /// Replay `tick`: teleport in-range actors and report them.
    ///
    /// Only roster positions are touched. Actors absent from the frame
    /// are absent from the snapshot and keep their previous position.
    pub fn apply(
        &self,
        tick: TickId,
        roster: &mut ActorRoster,
        trajectory: &Trajectory,
    ) -> ReplayOutcome {
        let frame_index = self.policy.effective_index(tick, trajectory.frame_count());
        let Some(frame) = trajectory.frame(frame_index) else {
            return ReplayOutcome::default();
        };
        let previous = match (self.speed_source, frame_index) {
            (SpeedSource::Derived, i) if i > 0 => trajectory.frame(i - 1),
            _ => None,
        };

        let mut snapshot = ActiveStateSnapshot::new();
        let mut dropped = 0;
        for (&actor, state) in frame.iter() {
            if !roster.teleport(actor, state) {
                dropped += 1;
                continue;
            }
            let mut state = state.clone();
            if self.speed_source == SpeedSource::Derived {
                state.speed = previous
                    .and_then(|p| p.get(actor))
                    .map(|p| p.position.planar_distance(&state.position) / trajectory.tick_duration())
                    .unwrap_or(0.0);
            }
            snapshot.insert(actor, state);
        }

        ReplayOutcome {
            snapshot,
            frame_index,
            dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcdgym_core::{ActorIndex, VehicleState};
    use fcdgym_trace::TrajectoryFrame;

    fn frame(entries: &[(u32, f64, f64, f64)]) -> TrajectoryFrame {
        entries
            .iter()
            .map(|&(i, x, y, s)| (ActorIndex(i), VehicleState::new(x, y, s)))
            .collect()
    }

    fn three_frames() -> Trajectory {
        Trajectory::new(
            vec![
                frame(&[(0, 0.0, 0.0, 1.0), (1, 5.0, 5.0, 2.0)]),
                frame(&[(0, 3.0, 4.0, 1.0)]),
                frame(&[(0, 6.0, 8.0, 1.0), (1, 6.0, 6.0, 2.0)]),
            ],
            1.0,
        )
        .unwrap()
    }

    #[test]
    fn clamp_and_loop_resolution() {
        assert_eq!(ReplayPolicy::Clamp.effective_index(TickId(1), 3), 1);
        assert_eq!(ReplayPolicy::Clamp.effective_index(TickId(3), 3), 2);
        assert_eq!(ReplayPolicy::Clamp.effective_index(TickId(99), 3), 2);
        assert_eq!(ReplayPolicy::Loop.effective_index(TickId(3), 3), 0);
        assert_eq!(ReplayPolicy::Loop.effective_index(TickId(7), 3), 1);
        assert_eq!(ReplayPolicy::Loop.effective_index(TickId(5), 0), 0);
    }

    #[test]
    fn absent_actor_keeps_position_but_is_inactive() {
        let traj = three_frames();
        let engine = MobilityReplayEngine::new(ReplayPolicy::Clamp, SpeedSource::Reported);
        let mut roster = ActorRoster::new(2);
        engine.apply(TickId(0), &mut roster, &traj);
        let out = engine.apply(TickId(1), &mut roster, &traj);
        assert!(!out.snapshot.is_active(ActorIndex(1)));
        assert_eq!(roster.position(ActorIndex(1)).unwrap().x, 5.0);
        assert_eq!(roster.position(ActorIndex(0)).unwrap().x, 3.0);
    }

    #[test]
    fn roster_mismatch_dropped_others_unaffected() {
        let traj = Trajectory::new(
            vec![frame(&[(3, 1.0, 1.0, 1.0), (50, 9.0, 9.0, 9.0)])],
            0.1,
        )
        .unwrap();
        let engine = MobilityReplayEngine::default();
        let mut roster = ActorRoster::new(10);
        let out = engine.apply(TickId(0), &mut roster, &traj);
        assert_eq!(out.dropped, 1);
        assert_eq!(out.snapshot.len(), 1);
        assert!(out.snapshot.is_active(ActorIndex(3)));
        assert_eq!(roster.len(), 10);
    }

    #[test]
    fn clamp_past_end_holds_last_frame() {
        let traj = three_frames();
        let engine = MobilityReplayEngine::new(ReplayPolicy::Clamp, SpeedSource::Reported);
        let mut roster = ActorRoster::new(2);
        let out = engine.apply(TickId(10), &mut roster, &traj);
        assert_eq!(out.frame_index, 2);
        assert_eq!(out.snapshot.len(), 2);
    }

    #[test]
    fn derived_speed_from_previous_frame() {
        let traj = three_frames();
        let engine = MobilityReplayEngine::new(ReplayPolicy::Clamp, SpeedSource::Derived);
        let mut roster = ActorRoster::new(2);

        let out = engine.apply(TickId(0), &mut roster, &traj);
        assert_eq!(out.snapshot.get(ActorIndex(0)).unwrap().speed, 0.0);

        // (0,0) -> (3,4) over 1 s.
        let out = engine.apply(TickId(1), &mut roster, &traj);
        assert!((out.snapshot.get(ActorIndex(0)).unwrap().speed - 5.0).abs() < 1e-12);

        // Actor 1 is absent from frame 1.
        let out = engine.apply(TickId(2), &mut roster, &traj);
        assert_eq!(out.snapshot.get(ActorIndex(1)).unwrap().speed, 0.0);
    }

    #[test]
    fn derived_speed_finite_for_zero_tick_duration() {
        let traj = Trajectory::new(
            vec![frame(&[(0, 0.0, 0.0, 0.0)]), frame(&[(0, 0.3, 0.4, 0.0)])],
            0.0,
        )
        .unwrap();
        let engine = MobilityReplayEngine::new(ReplayPolicy::Clamp, SpeedSource::Derived);
        let mut roster = ActorRoster::new(1);
        engine.apply(TickId(0), &mut roster, &traj);
        let out = engine.apply(TickId(1), &mut roster, &traj);
        // 0.5 m over the 0.1 s fallback tick.
        let speed = out.snapshot.get(ActorIndex(0)).unwrap().speed;
        assert!((speed - 5.0).abs() < 1e-9);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn effective_index_in_range(tick in 0u64..10_000, n in 1usize..500) {
                let clamp = ReplayPolicy::Clamp.effective_index(TickId(tick), n);
                let looped = ReplayPolicy::Loop.effective_index(TickId(tick), n);
                prop_assert!(clamp < n);
                prop_assert!(looped < n);
                prop_assert_eq!(looped as u64, tick % n as u64);
                if (tick as usize) < n {
                    prop_assert_eq!(clamp, tick as usize);
                } else {
                    prop_assert_eq!(clamp, n - 1);
                }
            }
        }
    }
}
