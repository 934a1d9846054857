//! Observation layout and metrics aggregation for fcdgym.
//!
//! An [`ObservationLayout`] fixes the shape and bounds of the observation
//! vector for a roster of `N` actors: four global features followed by
//! three per-actor features, `4 + 3N` elements in total. The
//! [`MetricsAggregator`] turns an
//! [`ActiveStateSnapshot`](fcdgym_core::ActiveStateSnapshot) into an
//! [`Aggregate`] laid out accordingly.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod aggregate;
pub mod layout;

pub use aggregate::{ActorFeatures, Aggregate, GlobalStats, MetricsAggregator};
pub use layout::{
    action_space, ObservationLayout, ACTION_HIGH, ACTION_LEN, ACTION_LOW, GLOBAL_FEATURES,
    PER_ACTOR_FEATURES,
};
