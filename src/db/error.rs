use crate::model::error::Error as ModelError;
use thiserror::Error;

/// Failures raised while building a [`MoleculeLibrary`](super::MoleculeLibrary).
///
/// Every variant names the data source and the 1-based line of the offending record; a library
/// that fails to load is never partially usable.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{source_name}:{line}: {details}")]
    Parse {
        source_name: String,
        line: usize,
        details: String,
    },

    #[error("{source_name}:{line}: rejected record: {reason}")]
    MalformedRecord {
        source_name: String,
        line: usize,
        reason: String,
    },

    #[error("{source_name}:{line}: duplicate molecule name '{name}'")]
    DuplicateName {
        source_name: String,
        line: usize,
        name: String,
    },

    #[error("{source_name}:{line}: invalid structure")]
    Structure {
        source_name: String,
        line: usize,
        #[source]
        source: ModelError,
    },
}

impl Error {
    pub fn parse(source_name: impl Into<String>, line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            line,
            details: details.into(),
        }
    }

    pub fn malformed(source_name: impl Into<String>, line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            source_name: source_name.into(),
            line,
            reason: reason.into(),
        }
    }

    pub fn structure(source_name: impl Into<String>, line: usize, source: ModelError) -> Self {
        Self::Structure {
            source_name: source_name.into(),
            line,
            source,
        }
    }
}
