//! fcdgym: a vehicular floating-car-data replay environment for
//! reinforcement learning agents.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all fcdgym sub-crates. For most users, adding `fcdgym` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use fcdgym::prelude::*;
//!
//! let text = r#"
//! <fcd-export>
//!   <timestep time="0.0"><vehicle id="a" x="1" y="2" speed="3"/></timestep>
//!   <timestep time="0.1"><vehicle id="a" x="2" y="2" speed="3"/></timestep>
//! </fcd-export>"#;
//! let trace = TraceLoader::new(0.1).load_str(text).unwrap();
//!
//! let mut config = EnvConfig::basic();
//! config.max_steps = 3;
//! let mut env = VehicularEnv::from_trace(&config, trace).unwrap();
//!
//! while !env.game_over() {
//!     let obs = env.observation();
//!     assert_eq!(obs.len(), 4 + 3);
//!     env.execute_actions(&[0.0; 4]).unwrap();
//! }
//! assert_eq!(env.current_tick(), TickId(3));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `fcdgym-core` | IDs, vehicle state, spaces, bridge and transport traits |
//! | [`trace`] | `fcdgym-trace` | FCD trace loading and the vehicle id registry |
//! | [`obs`] | `fcdgym-obs` | Observation layout and metrics aggregation |
//! | [`engine`] | `fcdgym-engine` | Replay, environment, scheduler and transport |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`fcdgym-core`).
pub use fcdgym_core as types;

/// Trace loading (`fcdgym-trace`).
///
/// [`trace::TraceLoader`] parses FCD text into a [`trace::Trajectory`];
/// [`trace::VehicleIdRegistry`] maps vehicle ids to actor indices.
pub use fcdgym_trace as trace;

/// Observation layout and aggregation (`fcdgym-obs`).
pub use fcdgym_obs as obs;

/// Replay engine, environment, and scheduler (`fcdgym-engine`).
///
/// [`engine::VehicularEnv`] implements the environment bridge;
/// [`engine::StepScheduler`] drives it against a transport.
pub use fcdgym_engine as engine;

/// Common imports for typical fcdgym usage.
pub mod prelude {
    // Core types and traits
    pub use fcdgym_core::{
        ActiveStateSnapshot, ActorIndex, AgentReply, BoxSpace, EnvState, EnvironmentBridge,
        ProceduralMobility, TickId, Transport, VehicleState,
    };

    // Errors
    pub use fcdgym_core::{BridgeError, TransportError};
    pub use fcdgym_engine::ConfigError;
    pub use fcdgym_trace::TraceError;

    // Trace
    pub use fcdgym_trace::{LoadedTrace, TraceLoader, Trajectory};

    // Observation
    pub use fcdgym_obs::{MetricsAggregator, ObservationLayout};

    // Engine
    pub use fcdgym_engine::{
        channel_pair, EnvConfig, ReplayPolicy, RewardConfig, RewardPolicy, RunSummary,
        StepMetrics, StepScheduler, StopReason, VehicularEnv,
    };
}
