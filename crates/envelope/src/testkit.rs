//! Throwaway RSA key material for tests and examples.
//!
//! Generates a fresh 2048-bit RSA key with a matching self-signed
//! certificate, PEM-encoded the way the key-loading collaborator would
//! supply them. Panics on OpenSSL failures; not intended for production
//! key handling.

use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, MsbOption};
use openssl::hash::MessageDigest;
use openssl::pkey::PKey;
use openssl::rsa::Rsa;
use openssl::x509::{X509, X509NameBuilder};

/// A generated private key and self-signed certificate, PEM-encoded.
pub struct TestKeyMaterial {
    /// PKCS#8 PEM private key.
    pub private_key_pem: Vec<u8>,
    /// PEM certificate matching the private key.
    pub certificate_pem: Vec<u8>,
}

/// Generates a fresh keypair and self-signed certificate.
pub fn generate_key_material() -> TestKeyMaterial {
    let rsa = Rsa::generate(2048).expect("RSA key generation");
    let pkey = PKey::from_rsa(rsa).expect("PKey wrapping");

    let mut name = X509NameBuilder::new().expect("name builder");
    name.append_entry_by_text("CN", "banklink test")
        .expect("subject CN");
    let name = name.build();

    let serial = {
        let mut bn = BigNum::new().expect("BigNum");
        bn.rand(64, MsbOption::MAYBE_ZERO, false).expect("serial");
        bn.to_asn1_integer().expect("ASN.1 serial")
    };

    let mut builder = X509::builder().expect("certificate builder");
    builder.set_version(2).expect("version");
    builder.set_serial_number(&serial).expect("serial number");
    builder.set_subject_name(&name).expect("subject");
    builder.set_issuer_name(&name).expect("issuer");
    builder.set_pubkey(&pkey).expect("public key");
    builder
        .set_not_before(&Asn1Time::days_from_now(0).expect("not before"))
        .expect("not before");
    builder
        .set_not_after(&Asn1Time::days_from_now(365).expect("not after"))
        .expect("not after");
    builder
        .sign(&pkey, MessageDigest::sha256())
        .expect("certificate signing");
    let certificate = builder.build();

    TestKeyMaterial {
        private_key_pem: pkey
            .private_key_to_pem_pkcs8()
            .expect("private key PEM"),
        certificate_pem: certificate.to_pem().expect("certificate PEM"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_material_is_pem() {
        let material = generate_key_material();
        let key = String::from_utf8(material.private_key_pem).unwrap();
        let cert = String::from_utf8(material.certificate_pem).unwrap();
        assert!(key.contains("BEGIN PRIVATE KEY"));
        assert!(cert.contains("BEGIN CERTIFICATE"));
    }

    #[test]
    fn test_generated_material_is_unique() {
        let a = generate_key_material();
        let b = generate_key_material();
        assert_ne!(a.private_key_pem, b.private_key_pem);
    }
}
