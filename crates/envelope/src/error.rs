//! Error types for the envelope crate.

use thiserror::Error;

use crate::command::{Command, Dialect};

/// Envelope error type covering all failure modes of the build and
/// interpretation pipeline.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    // Catalog errors
    /// The command is not defined for the requested dialect.
    #[error("unsupported command: {command} is not defined for dialect {dialect}")]
    UnsupportedCommand {
        /// The requested command.
        command: Command,
        /// The dialect the command was requested for.
        dialect: Dialect,
    },

    // Assembly errors
    /// A required parameter is absent (or blank) in the parameter set.
    #[error("missing parameter: {name}")]
    MissingParameter {
        /// Name of the absent field.
        name: String,
    },

    // Cryptographic binding errors
    /// A signature or encryption target could not be resolved in the envelope.
    #[error("reference not found: {reference}")]
    ReferenceNotFound {
        /// The unresolved reference (an `#id` fragment or element name).
        reference: String,
    },

    /// The private key could not produce a signature.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Payload encryption or key wrapping failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    // Response errors
    /// A cipher block could not be decrypted.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// A signature block did not verify against the referenced subtree.
    #[error("signature verification failed: {0}")]
    SignatureVerification(String),

    /// The response is malformed or structurally invalid.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for envelope operations.
pub type Result<T> = std::result::Result<T, EnvelopeError>;

impl From<xmltree::ParseError> for EnvelopeError {
    fn from(err: xmltree::ParseError) -> Self {
        EnvelopeError::InvalidResponse(err.to_string())
    }
}
