//! Trace replay, environment bridge and step scheduler for fcdgym.
//!
//! Provides [`VehicularEnv`], the step-synchronized environment that
//! replays an FCD trace (or drives [`RandomWalkMobility`]) and exposes it
//! through the [`EnvironmentBridge`](fcdgym_core::EnvironmentBridge)
//! contract, and [`StepScheduler`], which drives one episode on a
//! discrete-event [`EventQueue`] against any
//! [`Transport`](fcdgym_core::Transport).
//!
//! # Per-tick order
//!
//! ```text
//! sync_clock → refresh (replay or poll) → game_over → observation
//!   → reward → extra_info → transport.exchange → execute_actions
//!   → game_over? stop : re-arm
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bridge;
pub mod clock;
pub mod config;
pub mod metrics;
pub mod mobility;
pub mod replay;
pub mod reward;
pub mod roster;
pub mod scheduler;
pub mod throttle;
pub mod transport;

pub use bridge::{EnvPhase, VehicularEnv};
pub use clock::EventQueue;
pub use config::{ConfigError, EnvConfig};
pub use metrics::StepMetrics;
pub use mobility::RandomWalkMobility;
pub use replay::{MobilityReplayEngine, ReplayOutcome, ReplayPolicy, SpeedSource};
pub use reward::{ActiveCountReward, RewardConfig, RewardPolicy, TimeScaledReward};
pub use roster::ActorRoster;
pub use scheduler::{RunSummary, StepScheduler, StopReason};
pub use throttle::LogThrottle;
pub use transport::{channel_pair, AgentEndpoint, ChannelTransport, EnvMessage};
