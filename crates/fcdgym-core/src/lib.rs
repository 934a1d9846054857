//! Core types and traits for the fcdgym vehicular environment.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the rest of the workspace: actor and tick
//! identifiers, vehicle state values, the observation/action space
//! descriptor, error types, and the traits at which the environment meets
//! its external collaborators (the RL transport and procedural mobility).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod space;
pub mod state;
pub mod traits;

pub use error::{BridgeError, TransportError};
pub use id::{ActorIndex, TickId};
pub use space::{BoxSpace, Dtype};
pub use state::{ActiveStateSnapshot, Position, VehicleState, DEFAULT_VEHICLE_TYPE};
pub use traits::{AgentReply, EnvState, EnvironmentBridge, ProceduralMobility, Transport};
