//! Error types for trace loading.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors that make a trace unusable as a replay source.
///
/// Both variants are non-fatal for the environment: the caller falls back
/// to procedural mobility. A failed load is never retried.
#[derive(Debug)]
pub enum TraceError {
    /// The trace resource could not be opened or read.
    Unavailable {
        /// Path of the resource, when loading from the filesystem.
        path: Option<PathBuf>,
        /// The underlying I/O error.
        source: io::Error,
    },
    /// The trace parsed but yielded no vehicles or no non-empty frame.
    Empty {
        /// Well-formed vehicle records seen.
        vehicle_records: usize,
        /// Records skipped as malformed.
        skipped_records: usize,
    },
    /// More distinct vehicle ids than an actor index can address.
    RegistryFull {
        /// Number of ids registered when the limit was hit.
        registered: usize,
    },
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable {
                path: Some(path),
                source,
            } => write!(f, "trace {} unavailable: {source}", path.display()),
            Self::Unavailable { path: None, source } => {
                write!(f, "trace unavailable: {source}")
            }
            Self::Empty {
                vehicle_records,
                skipped_records,
            } => write!(
                f,
                "trace is empty ({vehicle_records} vehicle records, {skipped_records} skipped)"
            ),
            Self::RegistryFull { registered } => {
                write!(f, "vehicle id registry full after {registered} ids")
            }
        }
    }
}

impl std::error::Error for TraceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unavailable { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for TraceError {
    fn from(e: io::Error) -> Self {
        Self::Unavailable {
            path: None,
            source: e,
        }
    }
}

/// Why a single trace record was skipped.
///
/// Never aborts a load; surfaced through logging and
/// [`LoadStats`](crate::LoadStats) counters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordError {
    /// A required attribute is absent or empty.
    MissingAttribute {
        /// Attribute name.
        name: &'static str,
    },
    /// An attribute is present but is not a usable number.
    InvalidNumber {
        /// Attribute name.
        name: &'static str,
        /// The raw attribute text.
        value: String,
    },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAttribute { name } => write!(f, "missing attribute '{name}'"),
            Self::InvalidNumber { name, value } => {
                write!(f, "attribute '{name}' is not a valid number: {value:?}")
            }
        }
    }
}

impl std::error::Error for RecordError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn unavailable_exposes_io_source() {
        let err = TraceError::Unavailable {
            path: Some(PathBuf::from("/missing/fcd.xml")),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.source().is_some());
        assert!(format!("{err}").contains("/missing/fcd.xml"));
    }

    #[test]
    fn record_error_display() {
        let err = RecordError::InvalidNumber {
            name: "x",
            value: "abc".into(),
        };
        assert_eq!(
            format!("{err}"),
            "attribute 'x' is not a valid number: \"abc\""
        );
    }
}
