//! Key material supplied by the caller.
//!
//! The engine never touches the filesystem: private keys and certificates
//! arrive as PEM bytes from the caller's loading collaborator, are borrowed
//! for the duration of one build or interpretation call, and are not
//! retained or cached beyond it.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use openssl::pkey::{PKey, PKeyRef, Private};
use openssl::rsa::Rsa;
use openssl::x509::X509;

use crate::error::{EnvelopeError, Result};

/// An RSA private signing key and its paired X.509 certificate.
pub struct SigningKey {
    key: PKey<Private>,
    certificate: X509,
}

impl SigningKey {
    /// Loads a signing key from PEM-encoded private key and certificate
    /// bytes.
    pub fn from_pem(private_key_pem: &[u8], certificate_pem: &[u8]) -> Result<Self> {
        let key = PKey::private_key_from_pem(private_key_pem)
            .map_err(|e| EnvelopeError::Signing(format!("invalid private key: {e}")))?;
        let certificate = X509::from_pem(certificate_pem)
            .map_err(|e| EnvelopeError::Signing(format!("invalid certificate: {e}")))?;
        Ok(Self { key, certificate })
    }

    pub(crate) fn pkey(&self) -> &PKeyRef<Private> {
        &self.key
    }

    /// The paired certificate.
    pub fn certificate(&self) -> &X509 {
        &self.certificate
    }

    /// The certificate as base64-encoded DER, the form embedded in
    /// signature blocks.
    pub fn certificate_base64(&self) -> Result<String> {
        let der = self
            .certificate
            .to_der()
            .map_err(|e| EnvelopeError::Signing(format!("certificate DER encoding: {e}")))?;
        Ok(BASE64.encode(der))
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("key", &"[REDACTED]")
            .field("certificate", &self.certificate.subject_name())
            .finish()
    }
}

/// The recipient's X.509 certificate used to wrap symmetric keys in
/// encryption flows.
#[derive(Clone)]
pub struct RecipientCertificate {
    certificate: X509,
}

impl RecipientCertificate {
    /// Loads a recipient certificate from PEM bytes.
    pub fn from_pem(certificate_pem: &[u8]) -> Result<Self> {
        let certificate = X509::from_pem(certificate_pem)
            .map_err(|e| EnvelopeError::Encryption(format!("invalid certificate: {e}")))?;
        Ok(Self { certificate })
    }

    /// The certificate itself.
    pub fn certificate(&self) -> &X509 {
        &self.certificate
    }

    /// The certificate as base64-encoded DER.
    pub fn certificate_base64(&self) -> Result<String> {
        let der = self
            .certificate
            .to_der()
            .map_err(|e| EnvelopeError::Encryption(format!("certificate DER encoding: {e}")))?;
        Ok(BASE64.encode(der))
    }

    /// The RSA public key extracted from the certificate.
    pub(crate) fn rsa_public(&self) -> Result<Rsa<openssl::pkey::Public>> {
        self.certificate
            .public_key()
            .and_then(|k| k.rsa())
            .map_err(|e| EnvelopeError::Encryption(format!("certificate has no RSA key: {e}")))
    }
}

impl fmt::Debug for RecipientCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecipientCertificate")
            .field("subject", &self.certificate.subject_name())
            .finish()
    }
}

/// An RSA private key used to unwrap symmetric keys when interpreting
/// encrypted responses.
pub struct DecryptionKey {
    key: PKey<Private>,
}

impl DecryptionKey {
    /// Loads a decryption key from PEM bytes.
    pub fn from_pem(private_key_pem: &[u8]) -> Result<Self> {
        let key = PKey::private_key_from_pem(private_key_pem)
            .map_err(|e| EnvelopeError::Decryption(format!("invalid private key: {e}")))?;
        Ok(Self { key })
    }

    pub(crate) fn rsa_private(&self) -> Result<Rsa<Private>> {
        self.key
            .rsa()
            .map_err(|e| EnvelopeError::Decryption(format!("key has no RSA component: {e}")))
    }
}

impl fmt::Debug for DecryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptionKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit;

    #[test]
    fn test_signing_key_from_pem() {
        let material = testkit::generate_key_material();
        let key = SigningKey::from_pem(&material.private_key_pem, &material.certificate_pem);
        assert!(key.is_ok());
    }

    #[test]
    fn test_invalid_private_key_is_rejected() {
        let material = testkit::generate_key_material();
        let err =
            SigningKey::from_pem(b"not a key", &material.certificate_pem).unwrap_err();
        assert!(matches!(err, EnvelopeError::Signing(_)));
    }

    #[test]
    fn test_invalid_certificate_is_rejected() {
        let material = testkit::generate_key_material();
        let err = SigningKey::from_pem(&material.private_key_pem, b"not a cert").unwrap_err();
        assert!(matches!(err, EnvelopeError::Signing(_)));
    }

    #[test]
    fn test_certificate_base64_matches_pem_body() {
        let material = testkit::generate_key_material();
        let key =
            SigningKey::from_pem(&material.private_key_pem, &material.certificate_pem).unwrap();

        let parsed = pem::parse(&material.certificate_pem).unwrap();
        assert_eq!(
            key.certificate_base64().unwrap(),
            BASE64.encode(parsed.contents())
        );
    }

    #[test]
    fn test_debug_redacts_private_keys() {
        let material = testkit::generate_key_material();
        let key =
            SigningKey::from_pem(&material.private_key_pem, &material.certificate_pem).unwrap();
        assert!(format!("{key:?}").contains("REDACTED"));

        let dec = DecryptionKey::from_pem(&material.private_key_pem).unwrap();
        assert!(format!("{dec:?}").contains("REDACTED"));
    }

    #[test]
    fn test_recipient_certificate_exposes_rsa_key() {
        let material = testkit::generate_key_material();
        let recipient = RecipientCertificate::from_pem(&material.certificate_pem).unwrap();
        assert!(recipient.rsa_public().is_ok());
    }
}
