//! Per-tick metrics aggregation.

use fcdgym_core::ActiveStateSnapshot;

use crate::layout::ObservationLayout;

/// Summary over the actors active this tick.
///
/// All fields are zero when nothing is active.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlobalStats {
    /// Active actors inside the roster range.
    pub active_count: usize,
    /// Mean speed in m/s.
    pub mean_speed: f64,
    /// Mean x in metres.
    pub mean_x: f64,
    /// Mean y in metres.
    pub mean_y: f64,
}

/// Features of one roster slot; all zero when the actor is inactive.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ActorFeatures {
    /// Position x.
    pub x: f64,
    /// Position y.
    pub y: f64,
    /// Speed.
    pub speed: f64,
}

/// Global statistics plus one [`ActorFeatures`] per roster slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Aggregate {
    /// Global statistics.
    pub global: GlobalStats,
    /// Per-slot features in actor index order; length is the roster size.
    pub actors: Vec<ActorFeatures>,
}

impl Aggregate {
    /// The flat observation vector:
    /// `[active_count, mean_speed, mean_x, mean_y, x0, y0, s0, x1, ...]`.
    pub fn feature_vector(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(4 + 3 * self.actors.len());
        self.write_features(&mut out);
        out
    }

    /// Append the observation vector to `out`.
    pub fn write_features(&self, out: &mut Vec<f32>) {
        let g = &self.global;
        out.extend_from_slice(&[
            g.active_count as f32,
            g.mean_speed as f32,
            g.mean_x as f32,
            g.mean_y as f32,
        ]);
        for a in &self.actors {
            out.extend_from_slice(&[a.x as f32, a.y as f32, a.speed as f32]);
        }
    }
}

/// Turns snapshots into observation aggregates for a fixed roster.
///
/// Actors whose index is outside `[0, roster_size)` are ignored both in
/// the global statistics and in the per-slot features.
///
/// # Examples
///
/// ```
/// use fcdgym_core::{ActiveStateSnapshot, ActorIndex, VehicleState};
/// use fcdgym_obs::MetricsAggregator;
///
/// let snapshot: ActiveStateSnapshot = [
///     (ActorIndex(0), VehicleState::new(1.0, 2.0, 3.0)),
///     (ActorIndex(1), VehicleState::new(5.0, 6.0, 0.0)),
/// ]
/// .into_iter()
/// .collect();
/// let agg = MetricsAggregator::new(2).aggregate(&snapshot);
/// assert_eq!(
///     agg.feature_vector(),
///     vec![2.0, 1.5, 3.0, 4.0, 1.0, 2.0, 3.0, 5.0, 6.0, 0.0]
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MetricsAggregator {
    roster_size: usize,
}

impl MetricsAggregator {
    /// Aggregator for a roster of `roster_size` slots.
    pub fn new(roster_size: usize) -> Self {
        Self { roster_size }
    }

    /// Aggregator matching `layout`.
    pub fn for_layout(layout: &ObservationLayout) -> Self {
        Self::new(layout.roster_size())
    }

    /// Roster size this aggregator emits features for.
    pub fn roster_size(&self) -> usize {
        self.roster_size
    }

    /// Aggregate `snapshot`.
    pub fn aggregate(&self, snapshot: &ActiveStateSnapshot) -> Aggregate {
        let mut actors = vec![ActorFeatures::default(); self.roster_size];
        let (mut speed, mut x, mut y) = (0.0, 0.0, 0.0);
        let mut active_count = 0usize;

        for (idx, state) in snapshot {
            let Some(slot) = actors.get_mut(idx.as_usize()) else {
                continue;
            };
            *slot = ActorFeatures {
                x: state.position.x,
                y: state.position.y,
                speed: state.speed,
            };
            speed += state.speed;
            x += state.position.x;
            y += state.position.y;
            active_count += 1;
        }

        let global = if active_count == 0 {
            GlobalStats::default()
        } else {
            let n = active_count as f64;
            GlobalStats {
                active_count,
                mean_speed: speed / n,
                mean_x: x / n,
                mean_y: y / n,
            }
        };
        Aggregate { global, actors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcdgym_core::{ActorIndex, VehicleState};

    #[test]
    fn empty_snapshot_is_all_zero() {
        let agg = MetricsAggregator::new(3).aggregate(&ActiveStateSnapshot::new());
        assert_eq!(agg.global, GlobalStats::default());
        assert!(agg.feature_vector().iter().all(|&v| v == 0.0));
        assert_eq!(agg.feature_vector().len(), 13);
    }

    #[test]
    fn inactive_slots_are_zero() {
        let snapshot: ActiveStateSnapshot = [(ActorIndex(1), VehicleState::new(7.0, 8.0, 9.0))]
            .into_iter()
            .collect();
        let v = MetricsAggregator::new(3).aggregate(&snapshot).feature_vector();
        assert_eq!(&v[4..7], &[0.0, 0.0, 0.0]);
        assert_eq!(&v[7..10], &[7.0, 8.0, 9.0]);
        assert_eq!(&v[10..13], &[0.0, 0.0, 0.0]);
        assert_eq!(&v[..4], &[1.0, 9.0, 7.0, 8.0]);
    }

    #[test]
    fn out_of_roster_actors_are_ignored() {
        let snapshot: ActiveStateSnapshot = [
            (ActorIndex(0), VehicleState::new(2.0, 2.0, 2.0)),
            (ActorIndex(50), VehicleState::new(1000.0, 1000.0, 100.0)),
        ]
        .into_iter()
        .collect();
        let agg = MetricsAggregator::new(10).aggregate(&snapshot);
        assert_eq!(agg.global.active_count, 1);
        assert_eq!(agg.global.mean_speed, 2.0);
        assert_eq!(agg.actors.len(), 10);
    }

    #[test]
    fn zero_roster_emits_globals_only() {
        let snapshot: ActiveStateSnapshot = [(ActorIndex(0), VehicleState::new(1.0, 1.0, 1.0))]
            .into_iter()
            .collect();
        let agg = MetricsAggregator::new(0).aggregate(&snapshot);
        assert_eq!(agg.feature_vector(), vec![0.0; 4]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn feature_len_is_fixed(
                roster in 0usize..32,
                actors in prop::collection::vec((0u32..64, -500.0f64..500.0, -500.0f64..500.0, 0.0f64..40.0), 0..48),
            ) {
                let snapshot: ActiveStateSnapshot = actors
                    .into_iter()
                    .map(|(i, x, y, s)| (ActorIndex(i), VehicleState::new(x, y, s)))
                    .collect();
                let agg = MetricsAggregator::new(roster).aggregate(&snapshot);
                let layout = ObservationLayout::new(roster, -1000.0, 1000.0);
                prop_assert_eq!(agg.feature_vector().len(), layout.feature_len());
                prop_assert!(agg.global.active_count <= roster);
                prop_assert!(layout.space().contains(&agg.feature_vector()));
            }
        }
    }
}
