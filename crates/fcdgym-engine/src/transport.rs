//! In-process agent transport over crossbeam channels.
//!
//! ```text
//!   simulation thread                         agent thread
//!   ─────────────────                         ────────────
//!   ChannelTransport                          AgentEndpoint
//!     handshake() ──[EnvMessage::Spaces]────▶ recv()
//!     exchange()  ──[EnvMessage::State]─────▶ recv()
//!                 ◀──[AgentReply, bounded(1)]── send_action() / end_session()
//!     notify_simulation_end() ─[SimulationEnd]▶ recv()
//! ```
//!
//! Only `exchange` blocks the simulation thread. Dropping either half is
//! seen by the other as [`TransportError::Disconnected`].

use crossbeam_channel::{Receiver, Sender};
use fcdgym_core::{AgentReply, BoxSpace, EnvState, Transport, TransportError};

/// Messages from the environment to the agent.
#[derive(Clone, Debug, PartialEq)]
pub enum EnvMessage {
    /// Sent once before the first state.
    Spaces {
        /// Observation space.
        observation: BoxSpace,
        /// Action space.
        action: BoxSpace,
    },
    /// One tick's state; the agent must answer with a reply.
    State(EnvState),
    /// The simulation has stopped; no reply expected.
    SimulationEnd,
}

/// Create a connected transport/agent pair.
pub fn channel_pair() -> (ChannelTransport, AgentEndpoint) {
    let (to_agent, from_env) = crossbeam_channel::bounded(1);
    let (to_env, from_agent) = crossbeam_channel::bounded(1);
    (
        ChannelTransport {
            to_agent,
            from_agent,
        },
        AgentEndpoint { from_env, to_env },
    )
}

/// Environment half of [`channel_pair`].
#[derive(Debug)]
pub struct ChannelTransport {
    to_agent: Sender<EnvMessage>,
    from_agent: Receiver<AgentReply>,
}

impl Transport for ChannelTransport {
    fn handshake(
        &mut self,
        observation_space: &BoxSpace,
        action_space: &BoxSpace,
    ) -> Result<(), TransportError> {
        self.to_agent
            .send(EnvMessage::Spaces {
                observation: observation_space.clone(),
                action: action_space.clone(),
            })
            .map_err(|_| TransportError::Disconnected)
    }

    fn exchange(&mut self, state: EnvState) -> Result<AgentReply, TransportError> {
        self.to_agent
            .send(EnvMessage::State(state))
            .map_err(|_| TransportError::Disconnected)?;
        self.from_agent
            .recv()
            .map_err(|_| TransportError::Disconnected)
    }

    fn notify_simulation_end(&mut self) {
        // The agent may already be gone.
        let _ = self.to_agent.try_send(EnvMessage::SimulationEnd);
    }
}

/// Agent half of [`channel_pair`]. Can be moved to another thread.
#[derive(Debug)]
pub struct AgentEndpoint {
    from_env: Receiver<EnvMessage>,
    to_env: Sender<AgentReply>,
}

impl AgentEndpoint {
    /// Wait for the next message from the environment.
    pub fn recv(&self) -> Result<EnvMessage, TransportError> {
        self.from_env
            .recv()
            .map_err(|_| TransportError::Disconnected)
    }

    /// Answer the last state with an action.
    pub fn send_action(&self, action: Vec<f32>) -> Result<(), TransportError> {
        self.reply(AgentReply::Action(action))
    }

    /// Answer the last state by ending the session.
    pub fn end_session(&self) -> Result<(), TransportError> {
        self.reply(AgentReply::EndSession)
    }

    fn reply(&self, reply: AgentReply) -> Result<(), TransportError> {
        self.to_env
            .send(reply)
            .map_err(|_| TransportError::Disconnected)
    }
}
