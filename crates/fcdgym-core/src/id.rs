//! Strongly-typed identifiers.

use std::fmt;

/// Identifies a simulated vehicle within the actor roster.
///
/// Trace vehicles receive indices in first-seen order from the registry;
/// procedural vehicles are numbered `0..vehicle_count`. `ActorIndex(n)`
/// addresses roster slot `n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorIndex(pub u32);

impl ActorIndex {
    /// The index as a `usize`, for slot addressing.
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ActorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ActorIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Monotonically increasing environment step counter.
///
/// Starts at 0 and is incremented once per accepted action. The tick is
/// also the key used to index the replayed trajectory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

impl TickId {
    /// The tick that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
