//! The build-and-send cycle.
//!
//! One [`Client::send`] call drives a full cycle:
//!
//! ```text
//! Idle → TemplateSelected → Assembled → Signed → [Encrypted]
//!      → Sent → ResponseReceived → Interpreted → Done
//! ```
//!
//! Any failure terminates the cycle; the failing [`Phase`] is carried on
//! the error. No retries happen here — retry policy belongs to the
//! transport collaborator.

use std::fmt;

use envelope::{
    Command, Dialect, DecryptionKey, Envelope, EnvelopeBuilder, EnvelopeError, InterpretOptions,
    InterpretedResponse, ParameterSet, RecipientCertificate, SigningKey,
};
use openssl::x509::X509;

use crate::error::{ClientError, Result};
use crate::transport::Transport;

/// Phase of one build-and-send cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing done yet.
    Idle,
    /// Catalog template selected.
    TemplateSelected,
    /// Unsigned envelope assembled.
    Assembled,
    /// Signature block embedded.
    Signed,
    /// Sensitive payload encrypted.
    Encrypted,
    /// Envelope handed to the transport.
    Sent,
    /// Raw response received.
    ResponseReceived,
    /// Response verified/decrypted and unpacked.
    Interpreted,
    /// Cycle finished.
    Done,
}

impl Phase {
    fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::TemplateSelected => "template_selected",
            Phase::Assembled => "assembled",
            Phase::Signed => "signed",
            Phase::Encrypted => "encrypted",
            Phase::Sent => "sent",
            Phase::ResponseReceived => "response_received",
            Phase::Interpreted => "interpreted",
            Phase::Done => "done",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key material borrowed from the caller for one cycle.
///
/// Everything is optional; which pieces are needed depends on the command's
/// template (file-exchange commands need a signing key, certificate
/// issuance needs the bank's recipient certificate).
#[derive(Clone, Copy, Default)]
pub struct CryptoMaterial<'a> {
    /// Private key and certificate for signing requests.
    pub signing_key: Option<&'a SigningKey>,
    /// Bank certificate for wrapping issuance payloads.
    pub recipient_certificate: Option<&'a RecipientCertificate>,
    /// Private key for decrypting encrypted response payloads.
    pub decryption_key: Option<&'a DecryptionKey>,
    /// Certificate for verifying response signatures; the embedded
    /// certificate is used when absent.
    pub verification_certificate: Option<&'a X509>,
}

/// Builds and sends one request per call.
///
/// The client holds no key material and no connection state; both arrive
/// as borrowed capabilities per call, so independent cycles need no
/// coordination.
#[derive(Debug, Clone)]
pub struct Client {
    command: Command,
    dialect: Dialect,
    params: ParameterSet,
}

impl Client {
    /// Creates a client for one command/dialect pair.
    pub fn new(command: Command, dialect: Dialect, params: ParameterSet) -> Self {
        Self {
            command,
            dialect,
            params,
        }
    }

    /// The command this client builds.
    pub fn command(&self) -> Command {
        self.command
    }

    /// The dialect this client builds for.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The request parameters.
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Builds the finished (signed and, where required, encrypted)
    /// envelope without sending it.
    pub fn build(&self, material: &CryptoMaterial<'_>) -> Result<Envelope> {
        let builder = EnvelopeBuilder::new(self.command, self.dialect)
            .map_err(|e| fail(Phase::TemplateSelected, e))?;
        tracing::debug!(command = %self.command, dialect = %self.dialect, phase = %Phase::TemplateSelected, "template selected");

        let mut envelope = builder
            .build(&self.params)
            .map_err(|e| fail(Phase::Assembled, e))?;

        if let Some(reference) = builder.template().signature_reference {
            let key = material.signing_key.ok_or_else(|| {
                fail(
                    Phase::Signed,
                    EnvelopeError::Signing("no signing key supplied".to_string()),
                )
            })?;
            envelope
                .sign(reference, key)
                .map_err(|e| fail(Phase::Signed, e))?;
            tracing::debug!(phase = %Phase::Signed, reference, "request signed");
        }

        if let Some(target) = builder.template().encrypted_element {
            let recipient = material.recipient_certificate.ok_or_else(|| {
                fail(
                    Phase::Encrypted,
                    EnvelopeError::Encryption("no recipient certificate supplied".to_string()),
                )
            })?;
            envelope
                .encrypt(target, recipient)
                .map_err(|e| fail(Phase::Encrypted, e))?;
            tracing::debug!(phase = %Phase::Encrypted, subtree = target, "payload encrypted");
        }

        Ok(envelope)
    }

    /// Runs one full cycle: build, hand to the transport, interpret the
    /// response.
    pub fn send(
        &self,
        material: &CryptoMaterial<'_>,
        transport: &dyn Transport,
    ) -> Result<InterpretedResponse> {
        let envelope = self.build(material)?;
        let request = envelope.to_xml();

        tracing::debug!(phase = %Phase::Sent, bytes = request.len(), "envelope handed to transport");
        let raw = transport.exchange(self.dialect, &request)?;
        tracing::debug!(phase = %Phase::ResponseReceived, bytes = raw.len(), "response received");

        let options = InterpretOptions {
            verification_certificate: material.verification_certificate,
            decryption_key: material.decryption_key,
        };
        let response = envelope::interpret(&raw, self.command, self.dialect, &options)
            .map_err(|e| fail(Phase::Interpreted, e))?;

        tracing::info!(
            command = %self.command,
            phase = %Phase::Done,
            accepted = response.is_accepted(),
            "request cycle complete"
        );
        Ok(response)
    }
}

fn fail(phase: Phase, source: EnvelopeError) -> ClientError {
    tracing::warn!(%phase, error = %source, "request cycle failed");
    ClientError::Envelope { phase, source }
}
