//! Error types for the call-signaling coordination layer
//!
//! Nothing in this crate is fatal: every error is either surfaced to the
//! caller as a `ClientError` or contained at the dispatch boundary so the
//! dispatcher can keep accepting events.

use thiserror::Error;

/// Result type used throughout the crate
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors produced by event classification, lifecycle handlers, and
/// capability calls
///
/// # Examples
///
/// ```rust
/// use tone_client_core::ClientError;
///
/// let error = ClientError::UnhandledEvent { name: "bogus".to_string() };
/// assert!(error.to_string().contains("bogus"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The signaling layer raised an event whose name is not in the
    /// classification table
    #[error("Unhandled signaling event: {name}")]
    UnhandledEvent {
        /// The unrecognized event name as received on the wire
        name: String,
    },

    /// A classified event was missing payload data its handler requires
    #[error("Invalid payload for {event} event: {reason}")]
    InvalidEventPayload {
        /// Event name the payload belonged to
        event: String,
        /// What was missing or malformed
        reason: String,
    },

    /// A native call-UI instruction was refused by the platform capability
    #[error("Native call UI instruction failed: {reason}")]
    CallUiFailed {
        /// Platform-provided failure description
        reason: String,
    },

    /// The signaling capability refused an operation (e.g. answering a
    /// session that no longer exists)
    #[error("Signaling operation failed: {reason}")]
    SignalingFailed {
        /// Failure description from the signaling layer
        reason: String,
    },

    /// The history sink could not record a finished call
    #[error("History sink failed: {reason}")]
    HistorySinkFailed {
        /// Failure description from the sink
        reason: String,
    },

    /// Internal error with custom message
    #[error("Internal error: {message}")]
    InternalError {
        /// Description of the internal error
        message: String,
    },
}

impl ClientError {
    /// Create an internal error with a custom message
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError { message: message.into() }
    }

    /// Whether the error indicates a capability refused an instruction,
    /// as opposed to a malformed or unknown event
    pub fn is_capability_failure(&self) -> bool {
        matches!(
            self,
            Self::CallUiFailed { .. } | Self::SignalingFailed { .. } | Self::HistorySinkFailed { .. }
        )
    }
}
