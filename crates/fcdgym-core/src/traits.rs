//! Contract traits between the environment and its collaborators.
//!
//! - [`EnvironmentBridge`] is the six-operation environment contract the
//!   step scheduler drives once per tick.
//! - [`Transport`] carries the published state to the remote agent and
//!   brings its action back. It is the only suspension point of a tick.
//! - [`ProceduralMobility`] supplies vehicle states when no trace is
//!   loaded.

use std::time::Duration;

use crate::error::{BridgeError, TransportError};
use crate::id::TickId;
use crate::space::BoxSpace;
use crate::state::ActiveStateSnapshot;

/// The environment contract consumed by an RL-agent transport.
///
/// Per tick the scheduler calls, in order: [`game_over`], [`observation`],
/// [`reward`], [`extra_info`], then (after the transport returns the
/// agent's action) [`execute_actions`]. The two space descriptors are
/// static and may be queried at any time.
///
/// [`game_over`]: EnvironmentBridge::game_over
/// [`observation`]: EnvironmentBridge::observation
/// [`reward`]: EnvironmentBridge::reward
/// [`extra_info`]: EnvironmentBridge::extra_info
/// [`execute_actions`]: EnvironmentBridge::execute_actions
pub trait EnvironmentBridge {
    /// Shape and bounds of the observation vector. Pure.
    fn observation_space(&self) -> BoxSpace;

    /// Shape and bounds of the action vector. Pure.
    fn action_space(&self) -> BoxSpace;

    /// Whether the episode is over. Once this returns `true` it returns
    /// `true` for the rest of the episode.
    fn game_over(&mut self) -> bool;

    /// Refresh the active-state snapshot for the current tick and return
    /// its feature vector. In the terminal state, returns the features of
    /// the last valid snapshot.
    fn observation(&mut self) -> Vec<f32>;

    /// Reward for the current tick.
    fn reward(&self) -> f64;

    /// Free-form diagnostic string for the current tick.
    fn extra_info(&self) -> String;

    /// Accept the agent's action and advance the tick counter by one.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ActionAfterTerminal`] once the episode is
    /// terminal or the step budget is exhausted; the tick is unchanged.
    fn execute_actions(&mut self, action: &[f32]) -> Result<(), BridgeError>;
}

/// Everything published to the agent for one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct EnvState {
    /// Tick the state was produced at.
    pub tick: TickId,
    /// Terminal flag.
    pub game_over: bool,
    /// Fixed-shape feature vector.
    pub observation: Vec<f32>,
    /// Scalar reward.
    pub reward: f64,
    /// Diagnostic string.
    pub extra_info: String,
}

/// What the agent sent back after seeing an [`EnvState`].
#[derive(Clone, Debug, PartialEq)]
pub enum AgentReply {
    /// An action to execute before the next tick.
    Action(Vec<f32>),
    /// The agent is done with the session; no action follows.
    EndSession,
}

/// Hand-off point between the simulation and a remote agent.
///
/// `exchange` blocks (conceptually) until the agent answers. The core
/// never observes the wait; it only sees the reply.
pub trait Transport {
    /// Announce the observation and action spaces before the first tick.
    fn handshake(
        &mut self,
        observation_space: &BoxSpace,
        action_space: &BoxSpace,
    ) -> Result<(), TransportError>;

    /// Publish `state` and wait for the agent's reply.
    fn exchange(&mut self, state: EnvState) -> Result<AgentReply, TransportError>;

    /// Tell the agent the simulation has ended. Best effort.
    fn notify_simulation_end(&mut self);
}

/// Vehicle states produced by a procedural mobility model.
///
/// Used in place of trace replay when no trace is available. Polling at the
/// same `now` twice must return the same snapshot.
pub trait ProceduralMobility {
    /// Number of vehicles the model drives. Fixed for its lifetime.
    fn vehicle_count(&self) -> usize;

    /// Advance the model to simulation time `now` (no-op if `now` is not
    /// later than the last poll) and report every vehicle it drives.
    fn poll(&mut self, now: Duration) -> ActiveStateSnapshot;
}
