//! Error types shared across the environment bridge and its transport.
//!
//! Trace and configuration errors live with the crates that raise them
//! (`fcdgym-trace`, `fcdgym-engine`); only the errors that cross the
//! bridge contract are defined here.

use std::error::Error;
use std::fmt;

use crate::id::TickId;

/// Errors returned by [`EnvironmentBridge::execute_actions`].
///
/// [`EnvironmentBridge::execute_actions`]: crate::traits::EnvironmentBridge::execute_actions
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BridgeError {
    /// An action arrived after the episode reached its terminal state or
    /// exhausted its step budget. The action is discarded and the tick
    /// counter is left unchanged.
    ActionAfterTerminal {
        /// The tick at which the action was rejected.
        tick: TickId,
    },
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActionAfterTerminal { tick } => {
                write!(f, "action rejected at tick {tick}: episode is terminal")
            }
        }
    }
}

impl Error for BridgeError {}

/// Errors from the agent transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportError {
    /// The remote agent went away without ending the session.
    Disconnected,
    /// The remote agent sent something the transport cannot interpret.
    Protocol {
        /// Description of the violation.
        reason: String,
    },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "agent disconnected"),
            Self::Protocol { reason } => write!(f, "transport protocol error: {reason}"),
        }
    }
}

impl Error for TransportError {}
