//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VrlError {
    /// The observation has the wrong kind for the value representation,
    /// e.g. a continuous vector given to a Q table.
    #[error("Invalid state type: expected {expected} observation")]
    InvalidStateType {
        /// Kind of observation that was required.
        expected: &'static str,
    },

    /// A discrete state index is outside of the table.
    #[error("State {state} is out of range (n_states = {n_states})")]
    StateOutOfRange {
        /// The given state index.
        state: usize,
        /// Number of states of the table.
        n_states: usize,
    },

    /// An action index is outside of the action space.
    #[error("Action {action} is out of range (n_actions = {n_actions})")]
    ActionOutOfRange {
        /// The given action index.
        action: usize,
        /// Number of actions.
        n_actions: usize,
    },

    /// A continuous observation has the wrong number of dimensions.
    #[error("Observation dimension mismatch: expected {expected}, got {actual}")]
    ObsDimMismatch {
        /// Expected number of dimensions.
        expected: usize,
        /// Actual number of dimensions.
        actual: usize,
    },

    /// A continuous observation contains NaN or infinity.
    #[error("Observation contains a non-finite value")]
    NonFiniteObservation,

    /// A configuration value failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// More samples were requested than stored.
    #[error("Insufficient data: requested {requested}, available {available}")]
    InsufficientData {
        /// Requested number of items.
        requested: usize,
        /// Number of stored items.
        available: usize,
    },

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}

/// Returns [`VrlError::InvalidConfig`] with the given message unless `cond` holds.
pub fn ensure_config(cond: bool, msg: impl Into<String>) -> Result<(), VrlError> {
    if cond {
        Ok(())
    } else {
        Err(VrlError::InvalidConfig(msg.into()))
    }
}
