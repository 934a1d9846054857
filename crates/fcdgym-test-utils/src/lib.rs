//! Test utilities for fcdgym development.
//!
//! Provides stand-ins for the environment's external collaborators:
//! [`ScriptedTransport`] for the RL agent hand-off and [`FixedMobility`]
//! for procedural mobility. Trace text fixtures live in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::VecDeque;
use std::time::Duration;

use fcdgym_core::{
    ActiveStateSnapshot, ActorIndex, AgentReply, BoxSpace, EnvState, ProceduralMobility,
    Transport, TransportError, VehicleState,
};

/// What a [`ScriptedTransport`] does once its reply queue is empty.
#[derive(Clone, Debug, PartialEq)]
pub enum WhenExhausted {
    /// Keep answering with this action.
    Repeat(Vec<f32>),
    /// Answer [`AgentReply::EndSession`].
    EndSession,
    /// Fail with [`TransportError::Disconnected`].
    Disconnect,
}

/// Transport that replays a fixed script of agent replies and records
/// everything the environment publishes.
///
/// ```
/// use fcdgym_core::{AgentReply, EnvState, TickId, Transport};
/// use fcdgym_test_utils::{ScriptedTransport, WhenExhausted};
///
/// let mut t = ScriptedTransport::new(WhenExhausted::EndSession)
///     .with_reply(AgentReply::Action(vec![1.0; 4]));
/// let state = EnvState {
///     tick: TickId(0),
///     game_over: false,
///     observation: vec![],
///     reward: 0.0,
///     extra_info: String::new(),
/// };
/// assert_eq!(t.exchange(state.clone()).unwrap(), AgentReply::Action(vec![1.0; 4]));
/// assert_eq!(t.exchange(state).unwrap(), AgentReply::EndSession);
/// assert_eq!(t.states().len(), 2);
/// ```
#[derive(Debug)]
pub struct ScriptedTransport {
    replies: VecDeque<AgentReply>,
    when_exhausted: WhenExhausted,
    states: Vec<EnvState>,
    spaces: Option<(BoxSpace, BoxSpace)>,
    end_notifications: usize,
}

impl ScriptedTransport {
    pub fn new(when_exhausted: WhenExhausted) -> Self {
        Self {
            replies: VecDeque::new(),
            when_exhausted,
            states: Vec::new(),
            spaces: None,
            end_notifications: 0,
        }
    }

    /// An agent that always sends a zero action of the reference
    /// four-element shape.
    pub fn idle() -> Self {
        Self::new(WhenExhausted::Repeat(vec![0.0; 4]))
    }

    /// Queue one reply.
    pub fn with_reply(mut self, reply: AgentReply) -> Self {
        self.replies.push_back(reply);
        self
    }

    /// Queue several replies.
    pub fn with_replies(mut self, replies: impl IntoIterator<Item = AgentReply>) -> Self {
        self.replies.extend(replies);
        self
    }

    /// Every state published so far, in order.
    pub fn states(&self) -> &[EnvState] {
        &self.states
    }

    /// The `(observation, action)` spaces received in the handshake.
    pub fn spaces(&self) -> Option<&(BoxSpace, BoxSpace)> {
        self.spaces.as_ref()
    }

    /// How many times the end-of-simulation notice was delivered.
    pub fn end_notifications(&self) -> usize {
        self.end_notifications
    }
}

impl Transport for ScriptedTransport {
    fn handshake(
        &mut self,
        observation_space: &BoxSpace,
        action_space: &BoxSpace,
    ) -> Result<(), TransportError> {
        self.spaces = Some((observation_space.clone(), action_space.clone()));
        Ok(())
    }

    fn exchange(&mut self, state: EnvState) -> Result<AgentReply, TransportError> {
        self.states.push(state);
        if let Some(reply) = self.replies.pop_front() {
            return Ok(reply);
        }
        match &self.when_exhausted {
            WhenExhausted::Repeat(action) => Ok(AgentReply::Action(action.clone())),
            WhenExhausted::EndSession => Ok(AgentReply::EndSession),
            WhenExhausted::Disconnect => Err(TransportError::Disconnected),
        }
    }

    fn notify_simulation_end(&mut self) {
        self.end_notifications += 1;
    }
}

/// Procedural mobility whose vehicles never move.
///
/// Vehicle `i` sits at `(i * spacing, 0)` with speed `speed`, for every
/// poll. Records the times it was polled at.
#[derive(Clone, Debug)]
pub struct FixedMobility {
    count: usize,
    spacing: f64,
    speed: f64,
    polls: Vec<Duration>,
}

impl FixedMobility {
    pub fn new(count: usize, spacing: f64, speed: f64) -> Self {
        Self {
            count,
            spacing,
            speed,
            polls: Vec::new(),
        }
    }

    /// Times passed to [`ProceduralMobility::poll`], in call order.
    pub fn polls(&self) -> &[Duration] {
        &self.polls
    }
}

impl ProceduralMobility for FixedMobility {
    fn vehicle_count(&self) -> usize {
        self.count
    }

    fn poll(&mut self, now: Duration) -> ActiveStateSnapshot {
        self.polls.push(now);
        (0..self.count)
            .map(|i| {
                (
                    ActorIndex(i as u32),
                    VehicleState::new(i as f64 * self.spacing, 0.0, self.speed),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcdgym_core::TickId;

    fn state(tick: u64) -> EnvState {
        EnvState {
            tick: TickId(tick),
            game_over: false,
            observation: vec![0.0],
            reward: 0.0,
            extra_info: String::new(),
        }
    }

    #[test]
    fn scripted_replies_then_fallback() {
        let mut t = ScriptedTransport::new(WhenExhausted::Disconnect)
            .with_replies([AgentReply::Action(vec![1.0]), AgentReply::Action(vec![2.0])]);
        assert_eq!(t.exchange(state(0)).unwrap(), AgentReply::Action(vec![1.0]));
        assert_eq!(t.exchange(state(1)).unwrap(), AgentReply::Action(vec![2.0]));
        assert_eq!(t.exchange(state(2)), Err(TransportError::Disconnected));
        assert_eq!(t.states().len(), 3);
        assert_eq!(t.states()[2].tick, TickId(2));
    }

    #[test]
    fn idle_repeats_zero_action() {
        let mut t = ScriptedTransport::idle();
        for tick in 0..3 {
            assert_eq!(
                t.exchange(state(tick)).unwrap(),
                AgentReply::Action(vec![0.0; 4])
            );
        }
    }

    #[test]
    fn handshake_records_spaces() {
        let mut t = ScriptedTransport::idle();
        let obs = BoxSpace::vector(-1.0, 1.0, 7);
        let act = BoxSpace::vector(0.0, 10.0, 4);
        t.handshake(&obs, &act).unwrap();
        assert_eq!(t.spaces(), Some(&(obs, act)));
    }

    #[test]
    fn fixed_mobility_is_stationary() {
        let mut m = FixedMobility::new(3, 10.0, 2.0);
        let a = m.poll(Duration::from_secs(0));
        let b = m.poll(Duration::from_secs(5));
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        assert_eq!(a.get(ActorIndex(2)).unwrap().position.x, 20.0);
        assert_eq!(m.polls().len(), 2);
    }
}
