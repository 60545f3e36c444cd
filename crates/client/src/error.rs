//! Error types for the client crate.

use envelope::EnvelopeError;
use thiserror::Error;

use crate::client::Phase;

/// Failure reported by a [`Transport`](crate::Transport) implementation.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Client error: either an envelope failure at a known phase of the cycle,
/// or a transport failure.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The envelope pipeline failed; `phase` is the terminal state of the
    /// cycle.
    #[error("{phase} failed: {source}")]
    Envelope {
        /// Phase the cycle failed in.
        phase: Phase,
        /// The underlying envelope error.
        #[source]
        source: EnvelopeError,
    },

    /// The transport collaborator failed to complete the exchange.
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),
}

impl ClientError {
    /// The underlying envelope error, when the failure was not transport.
    pub fn envelope_error(&self) -> Option<&EnvelopeError> {
        match self {
            ClientError::Envelope { source, .. } => Some(source),
            ClientError::Transport(_) => None,
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
