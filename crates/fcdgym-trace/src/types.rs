//! Trajectory data types.

use std::collections::btree_map;
use std::collections::BTreeMap;

use fcdgym_core::{ActorIndex, VehicleState};

use crate::error::TraceError;
use crate::loader::DEFAULT_TICK_DURATION;

/// `tick_duration`, or [`DEFAULT_TICK_DURATION`] when it is not finite and
/// positive.
pub(crate) fn effective_tick_duration(tick_duration: f64) -> f64 {
    if tick_duration.is_finite() && tick_duration > 0.0 {
        tick_duration
    } else {
        DEFAULT_TICK_DURATION
    }
}

/// All vehicle states reported at one tick.
///
/// Sparse: a frame may omit actors that appear at other ticks, and may be
/// empty. Each actor appears at most once per frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrajectoryFrame {
    states: BTreeMap<ActorIndex, VehicleState>,
}

impl TrajectoryFrame {
    /// An empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `state` for `actor`. A later insert for the same actor
    /// replaces the earlier one.
    pub fn insert(&mut self, actor: ActorIndex, state: VehicleState) {
        self.states.insert(actor, state);
    }

    /// The state reported for `actor`, if any.
    pub fn get(&self, actor: ActorIndex) -> Option<&VehicleState> {
        self.states.get(&actor)
    }

    /// Number of vehicles in the frame.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True when no vehicle reported at this tick.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Reported vehicles in ascending actor index order.
    pub fn iter(&self) -> btree_map::Iter<'_, ActorIndex, VehicleState> {
        self.states.iter()
    }
}

impl FromIterator<(ActorIndex, VehicleState)> for TrajectoryFrame {
    fn from_iter<I: IntoIterator<Item = (ActorIndex, VehicleState)>>(iter: I) -> Self {
        Self {
            states: iter.into_iter().collect(),
        }
    }
}

/// A tick-indexed sequence of frames.
///
/// Frame `i` holds the states observed at `i * tick_duration` seconds.
/// The sequence has no holes (missing ticks are empty frames) and is
/// never empty. Immutable once built.
///
/// # Examples
///
/// ```
/// use fcdgym_core::{ActorIndex, VehicleState};
/// use fcdgym_trace::{Trajectory, TrajectoryFrame};
///
/// let frame: TrajectoryFrame = [(ActorIndex(0), VehicleState::new(1.0, 2.0, 3.0))]
///     .into_iter()
///     .collect();
/// let traj = Trajectory::new(vec![frame, TrajectoryFrame::new()], 0.5).unwrap();
/// assert_eq!(traj.frame_count(), 2);
/// assert_eq!(traj.max_time(), 0.5);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    frames: Vec<TrajectoryFrame>,
    tick_duration: f64,
}

impl Trajectory {
    /// Build a trajectory from an ordered frame sequence.
    ///
    /// A non-positive or non-finite `tick_duration` is replaced with
    /// [`DEFAULT_TICK_DURATION`].
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Empty`] if `frames` is empty or every frame
    /// is empty.
    pub fn new(frames: Vec<TrajectoryFrame>, tick_duration: f64) -> Result<Self, TraceError> {
        let vehicle_records: usize = frames.iter().map(TrajectoryFrame::len).sum();
        if vehicle_records == 0 {
            return Err(TraceError::Empty {
                vehicle_records,
                skipped_records: 0,
            });
        }
        Ok(Self {
            frames,
            tick_duration: effective_tick_duration(tick_duration),
        })
    }

    /// Number of frames (`N`). Always at least 1.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// The frame at `index`, if in range.
    pub fn frame(&self, index: usize) -> Option<&TrajectoryFrame> {
        self.frames.get(index)
    }

    /// All frames in tick order.
    pub fn frames(&self) -> &[TrajectoryFrame] {
        &self.frames
    }

    /// Seconds per frame.
    pub fn tick_duration(&self) -> f64 {
        self.tick_duration
    }

    /// Time of the last frame: `tick_duration * (N - 1)`.
    pub fn max_time(&self) -> f64 {
        self.tick_duration * (self.frames.len() - 1) as f64
    }
}
