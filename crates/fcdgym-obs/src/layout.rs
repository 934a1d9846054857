//! Observation and action space layout.

use fcdgym_core::BoxSpace;

/// Global features at the head of the observation vector:
/// active count, mean speed, mean x, mean y.
pub const GLOBAL_FEATURES: usize = 4;

/// Features per roster slot: x, y, speed.
pub const PER_ACTOR_FEATURES: usize = 3;

/// Length of the action vector.
pub const ACTION_LEN: usize = 4;

/// Lower bound of every action element.
pub const ACTION_LOW: f32 = 0.0;

/// Upper bound of every action element.
pub const ACTION_HIGH: f32 = 10.0;

/// The fixed action space: four elements in `[0, 10]`.
pub fn action_space() -> BoxSpace {
    BoxSpace::vector(ACTION_LOW, ACTION_HIGH, ACTION_LEN)
}

/// Shape and bounds of the observation vector for a fixed roster.
///
/// # Examples
///
/// ```
/// use fcdgym_obs::ObservationLayout;
///
/// let layout = ObservationLayout::new(10, -1000.0, 1000.0);
/// assert_eq!(layout.feature_len(), 34);
/// assert_eq!(layout.space().to_string(), "BoxSpace low=-1000 high=1000 shape=(34,) dtype=float");
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObservationLayout {
    roster_size: usize,
    low: f32,
    high: f32,
}

impl ObservationLayout {
    /// Layout for `roster_size` actors with element bounds `[low, high]`.
    pub fn new(roster_size: usize, low: f32, high: f32) -> Self {
        Self {
            roster_size,
            low,
            high,
        }
    }

    /// Number of roster slots covered.
    pub fn roster_size(&self) -> usize {
        self.roster_size
    }

    /// Observation length: `4 + 3 * roster_size`.
    pub fn feature_len(&self) -> usize {
        GLOBAL_FEATURES + PER_ACTOR_FEATURES * self.roster_size
    }

    /// Offset of actor `slot`'s first feature.
    pub fn actor_offset(&self, slot: usize) -> Option<usize> {
        (slot < self.roster_size).then(|| GLOBAL_FEATURES + PER_ACTOR_FEATURES * slot)
    }

    /// The observation space descriptor.
    pub fn space(&self) -> BoxSpace {
        BoxSpace::vector(self.low, self.high, self.feature_len())
    }
}
