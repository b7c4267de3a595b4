//! Unified error system for the allocation oracle
//!
//! Every failure the oracle can report is a variant of [`OracleError`]. All of
//! them are local and recoverable: they abort only the offending submission or
//! the offending period's aggregation, never the process.

use serde::{Deserialize, Serialize};

/// Unified error type for all oracle operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum OracleError {
    /// Submission arrived outside the window that accepts it
    #[error("Invalid phase: {message}")]
    InvalidPhase {
        /// Which window was expected and at what height the submission arrived
        message: String,
    },

    /// Cellar id is not known to the registry
    #[error("Unknown cellar: {cellar_id}")]
    UnknownCellar {
        /// The unregistered cellar id
        cellar_id: String,
    },

    /// A precommit for this validator and cellar already exists this period
    #[error("Duplicate precommit: validator {validator} already precommitted for cellar {cellar_id}")]
    DuplicatePrecommit {
        /// Submitting validator (hex)
        validator: String,
        /// Target cellar
        cellar_id: String,
    },

    /// A commit for this validator and cellar already exists this period
    #[error("Duplicate commit: validator {validator} already committed for cellar {cellar_id}")]
    DuplicateCommit {
        /// Submitting validator (hex)
        validator: String,
        /// Target cellar
        cellar_id: String,
    },

    /// Reveal without a matching precommit in the current period
    #[error("No precommit: validator {validator} has no precommit for cellar {cellar_id}")]
    NoPrecommit {
        /// Submitting validator (hex)
        validator: String,
        /// Target cellar
        cellar_id: String,
    },

    /// Revealed allocation does not hash to the precommitted digest
    #[error("Hash mismatch for cellar {cellar_id}: expected {expected}, got {actual}")]
    HashMismatch {
        /// Target cellar
        cellar_id: String,
        /// Precommitted digest (hex)
        expected: String,
        /// Digest of the revealed allocation (hex)
        actual: String,
    },

    /// Committed voting power did not reach the threshold
    #[error("Quorum not reached for cellar {cellar_id}: {committed} of {total} voting power")]
    QuorumNotReached {
        /// Cellar whose aggregation failed
        cellar_id: String,
        /// Voting power behind the commits
        committed: u64,
        /// Total voting power of the validator set
        total: u64,
    },

    /// Message failed stateless validation
    #[error("Invalid message: {message}")]
    InvalidMessage {
        /// What was wrong with the message
        message: String,
    },

    /// Parameters or genesis state failed validation
    #[error("Invalid params: {message}")]
    InvalidParams {
        /// What was wrong with the configuration
        message: String,
    },

    /// Encoding or decoding of a stored value failed
    #[error("Codec error: {message}")]
    Codec {
        /// Error message describing the codec failure
        message: String,
    },

    /// Storage operation failed
    #[error("Storage error: {message}")]
    Store {
        /// Error message describing the storage failure
        message: String,
    },
}

impl OracleError {
    /// Create an invalid phase error
    pub fn invalid_phase(message: impl Into<String>) -> Self {
        Self::InvalidPhase {
            message: message.into(),
        }
    }

    /// Create an unknown cellar error
    pub fn unknown_cellar(cellar_id: impl Into<String>) -> Self {
        Self::UnknownCellar {
            cellar_id: cellar_id.into(),
        }
    }

    /// Create an invalid message error
    pub fn invalid_message(message: impl Into<String>) -> Self {
        Self::InvalidMessage {
            message: message.into(),
        }
    }

    /// Create an invalid params error
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    /// Create a codec error
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            OracleError::InvalidPhase { .. } => "oracle_invalid_phase",
            OracleError::UnknownCellar { .. } => "oracle_unknown_cellar",
            OracleError::DuplicatePrecommit { .. } => "oracle_duplicate_precommit",
            OracleError::DuplicateCommit { .. } => "oracle_duplicate_commit",
            OracleError::NoPrecommit { .. } => "oracle_no_precommit",
            OracleError::HashMismatch { .. } => "oracle_hash_mismatch",
            OracleError::QuorumNotReached { .. } => "oracle_quorum_not_reached",
            OracleError::InvalidMessage { .. } => "oracle_invalid_message",
            OracleError::InvalidParams { .. } => "oracle_invalid_params",
            OracleError::Codec { .. } => "oracle_codec",
            OracleError::Store { .. } => "oracle_store",
        }
    }

    /// Numeric result code reported to the message-processing layer.
    ///
    /// Zero is reserved for success.
    pub fn abci_code(&self) -> u32 {
        match self {
            OracleError::InvalidPhase { .. } => 2,
            OracleError::UnknownCellar { .. } => 3,
            OracleError::DuplicatePrecommit { .. } => 4,
            OracleError::DuplicateCommit { .. } => 5,
            OracleError::NoPrecommit { .. } => 6,
            OracleError::HashMismatch { .. } => 7,
            OracleError::QuorumNotReached { .. } => 8,
            OracleError::InvalidMessage { .. } => 9,
            OracleError::InvalidParams { .. } => 10,
            OracleError::Codec { .. } => 11,
            OracleError::Store { .. } => 12,
        }
    }
}

/// Standard Result type for oracle operations
pub type Result<T> = std::result::Result<T, OracleError>;

impl From<serde_json::Error> for OracleError {
    fn from(err: serde_json::Error) -> Self {
        Self::codec(err.to_string())
    }
}

impl From<toml::de::Error> for OracleError {
    fn from(err: toml::de::Error) -> Self {
        Self::invalid_params(err.to_string())
    }
}

impl From<std::io::Error> for OracleError {
    fn from(err: std::io::Error) -> Self {
        Self::store(err.to_string())
    }
}
