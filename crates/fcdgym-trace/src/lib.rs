//! Floating-car-data (FCD) trace loading for fcdgym.
//!
//! Turns an external mobility trace into an immutable, tick-indexed
//! [`Trajectory`] that the replay engine can resolve frames from.
//!
//! # Architecture
//!
//! - [`codec`] scans `<timestep>` / `<vehicle>` tags and their
//!   `key="value"` attributes
//! - [`VehicleIdRegistry`] maps external vehicle ids to stable
//!   [`ActorIndex`](fcdgym_core::ActorIndex) values in first-seen order
//! - [`TraceLoader`] quantizes timestep times to ticks, skips malformed
//!   records, and builds the frame arena once parsing is complete
//!
//! # Format
//!
//! ```text
//! <fcd-export>
//!   <timestep time="0.00">
//!     <vehicle id="veh0" x="12.5" y="40.0" speed="13.9" type="passenger"/>
//!   </timestep>
//! </fcd-export>
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod loader;
pub mod registry;
pub mod types;

pub use error::{RecordError, TraceError};
pub use loader::{LoadStats, LoadedTrace, TraceLoader, DEFAULT_MAX_FRAMES, DEFAULT_TICK_DURATION};
pub use registry::VehicleIdRegistry;
pub use types::{Trajectory, TrajectoryFrame};
