//! Fixed-size actor roster.

use fcdgym_core::{ActorIndex, Position, VehicleState};

/// `N` actor slots, sized once at startup and never resized.
///
/// Each slot holds the last state applied to it. Replay teleports a slot
/// to the state's position; a slot whose actor is absent from the current
/// frame keeps its previous position.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorRoster {
    slots: Vec<Option<VehicleState>>,
}

impl ActorRoster {
    /// A roster of `size` empty slots.
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True for a zero-slot roster.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether `actor` addresses a slot.
    pub fn contains(&self, actor: ActorIndex) -> bool {
        actor.as_usize() < self.slots.len()
    }

    /// Move `actor` to `state`. Returns `false` (and does nothing) when
    /// `actor` is outside the roster.
    pub fn teleport(&mut self, actor: ActorIndex, state: &VehicleState) -> bool {
        match self.slots.get_mut(actor.as_usize()) {
            Some(slot) => {
                *slot = Some(state.clone());
                true
            }
            None => false,
        }
    }

    /// Last applied state of `actor`.
    pub fn state(&self, actor: ActorIndex) -> Option<&VehicleState> {
        self.slots.get(actor.as_usize()).and_then(Option::as_ref)
    }

    /// Last applied position of `actor`.
    pub fn position(&self, actor: ActorIndex) -> Option<Position> {
        self.state(actor).map(|s| s.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teleport_within_range() {
        let mut roster = ActorRoster::new(2);
        assert!(roster.teleport(ActorIndex(1), &VehicleState::new(4.0, 5.0, 1.0)));
        assert_eq!(roster.position(ActorIndex(1)), Some(Position::planar(4.0, 5.0)));
        assert_eq!(roster.position(ActorIndex(0)), None);
    }

    #[test]
    fn teleport_out_of_range_is_refused() {
        let mut roster = ActorRoster::new(2);
        assert!(!roster.teleport(ActorIndex(2), &VehicleState::new(0.0, 0.0, 0.0)));
        assert_eq!(roster.len(), 2);
        assert!(!roster.contains(ActorIndex(2)));
    }
}
