//! Vehicle state values and the per-tick active-state snapshot.

use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::id::ActorIndex;

/// Vehicle type assumed when a trace record does not carry one.
pub const DEFAULT_VEHICLE_TYPE: &str = "passenger";

/// A point in the simulation plane, in metres.
///
/// `z` is carried for compatibility with 3-D mobility collaborators but
/// is always 0 for replayed and procedural vehicles.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    /// Easting.
    pub x: f64,
    /// Northing.
    pub y: f64,
    /// Elevation (always 0 in this environment).
    pub z: f64,
}

impl Position {
    /// A position on the ground plane (`z = 0`).
    pub fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Euclidean distance to `other`, ignoring elevation.
    pub fn planar_distance(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The reported state of one vehicle at one tick.
///
/// A value type: once stored in a trajectory frame it is never mutated.
///
/// # Examples
///
/// ```
/// use fcdgym_core::{VehicleState, DEFAULT_VEHICLE_TYPE};
///
/// let state = VehicleState::new(1.0, 2.0, 3.0);
/// assert_eq!(state.position.z, 0.0);
/// assert_eq!(state.vehicle_type, DEFAULT_VEHICLE_TYPE);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleState {
    /// Position on the ground plane.
    pub position: Position,
    /// Scalar speed in m/s. Never negative.
    pub speed: f64,
    /// Vehicle class as reported by the trace (e.g. `"passenger"`, `"bus"`).
    pub vehicle_type: String,
}

impl VehicleState {
    /// A `"passenger"` vehicle at `(x, y, 0)`.
    ///
    /// Negative speeds are clamped to 0.
    pub fn new(x: f64, y: f64, speed: f64) -> Self {
        Self {
            position: Position::planar(x, y),
            speed: speed.max(0.0),
            vehicle_type: DEFAULT_VEHICLE_TYPE.to_string(),
        }
    }

    /// Replace the vehicle type.
    pub fn with_type(mut self, vehicle_type: impl Into<String>) -> Self {
        self.vehicle_type = vehicle_type.into();
        self
    }
}

/// The vehicles that are reporting at the current tick.
///
/// Rebuilt from scratch on every refresh; an actor absent from the
/// snapshot is inactive for this tick. Iteration is in ascending actor
/// index order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActiveStateSnapshot {
    states: BTreeMap<ActorIndex, VehicleState>,
}

impl ActiveStateSnapshot {
    /// An empty snapshot (no active actors).
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `state` for `actor`, replacing any previous entry.
    pub fn insert(&mut self, actor: ActorIndex, state: VehicleState) {
        self.states.insert(actor, state);
    }

    /// The state of `actor`, if it is active.
    pub fn get(&self, actor: ActorIndex) -> Option<&VehicleState> {
        self.states.get(&actor)
    }

    /// Whether `actor` is reporting this tick.
    pub fn is_active(&self, actor: ActorIndex) -> bool {
        self.states.contains_key(&actor)
    }

    /// Number of active actors.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True when no actor is active.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Active actors in ascending index order.
    pub fn iter(&self) -> btree_map::Iter<'_, ActorIndex, VehicleState> {
        self.states.iter()
    }
}

impl FromIterator<(ActorIndex, VehicleState)> for ActiveStateSnapshot {
    fn from_iter<I: IntoIterator<Item = (ActorIndex, VehicleState)>>(iter: I) -> Self {
        Self {
            states: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ActiveStateSnapshot {
    type Item = (&'a ActorIndex, &'a VehicleState);
    type IntoIter = btree_map::Iter<'a, ActorIndex, VehicleState>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}
