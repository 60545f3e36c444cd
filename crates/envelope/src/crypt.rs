//! Hybrid encryption for certificate-issuance payloads.
//!
//! A fresh 3DES key and IV are drawn from OS randomness per call, the
//! serialized plaintext subtree is encrypted with DES-EDE3-CBC (IV prefixed
//! to the ciphertext), and the symmetric key is wrapped under the
//! recipient's RSA public key with PKCS#1 v1.5 padding. The resulting
//! cipher block replaces the plaintext subtree entirely: wrapped key first,
//! encrypted payload second, inside the XML-Encryption structure. 3DES is
//! what the receiving bank's interface accepts; it is kept for wire
//! compatibility.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use openssl::rsa::Padding;
use openssl::symm::{decrypt, encrypt, Cipher};
use rand::rngs::OsRng;
use rand::RngCore;
use xmltree::Element;

use crate::error::{EnvelopeError, Result};
use crate::keys::{DecryptionKey, RecipientCertificate};
use crate::ns::{self, alg, attr, node};
use crate::xml;

/// DES-EDE3 key length in bytes.
pub const SYMMETRIC_KEY_LEN: usize = 24;

/// DES block / IV length in bytes.
pub const IV_LEN: usize = 8;

/// Encrypts the first subtree with the given local name, replacing it with
/// a cipher block wrapped for the recipient.
pub fn encrypt_subtree(
    root: &mut Element,
    target_local: &str,
    recipient: &RecipientCertificate,
) -> Result<()> {
    let plaintext = xml::descendant(root, target_local)
        .map(|el| xml::write_document(el).into_bytes())
        .ok_or_else(|| EnvelopeError::ReferenceNotFound {
            reference: target_local.to_string(),
        })?;

    let mut key = [0u8; SYMMETRIC_KEY_LEN];
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut key);
    OsRng.fill_bytes(&mut iv);

    let ciphertext = encrypt(Cipher::des_ede3_cbc(), &key, Some(&iv), &plaintext)
        .map_err(|e| EnvelopeError::Encryption(format!("payload cipher: {e}")))?;
    let mut combined = Vec::with_capacity(IV_LEN + ciphertext.len());
    combined.extend_from_slice(&iv);
    combined.extend_from_slice(&ciphertext);

    let rsa = recipient.rsa_public()?;
    let mut wrapped = vec![0u8; rsa.size() as usize];
    let written = rsa
        .public_encrypt(&key, &mut wrapped, Padding::PKCS1)
        .map_err(|e| EnvelopeError::Encryption(format!("key wrap: {e}")))?;
    wrapped.truncate(written);

    let block = cipher_block(
        &BASE64.encode(&wrapped),
        &BASE64.encode(&combined),
        &recipient.certificate_base64()?,
    );
    xml::replace_descendant(root, target_local, block).ok_or_else(|| {
        EnvelopeError::ReferenceNotFound {
            reference: target_local.to_string(),
        }
    })?;

    tracing::debug!(subtree = target_local, "payload encrypted for recipient");
    Ok(())
}

/// Decrypts the cipher block found under `el`, returning the recovered
/// plaintext subtree.
pub fn decrypt_block(el: &Element, key: &DecryptionKey) -> Result<Element> {
    let encrypted_data = xml::descendant(el, node::ENCRYPTED_DATA).ok_or_else(|| {
        EnvelopeError::InvalidResponse("no encrypted data block present".to_string())
    })?;

    let mut cipher_values = Vec::new();
    xml::collect_descendants(encrypted_data, node::CIPHER_VALUE, &mut cipher_values);
    if cipher_values.len() < 2 {
        return Err(EnvelopeError::InvalidResponse(format!(
            "expected wrapped key and payload cipher values, found {}",
            cipher_values.len()
        )));
    }

    let wrapped = BASE64
        .decode(xml::compact_text(cipher_values[0]))
        .map_err(|e| EnvelopeError::Decryption(format!("wrapped key base64: {e}")))?;
    let rsa = key.rsa_private()?;
    let mut symmetric = vec![0u8; rsa.size() as usize];
    let written = rsa
        .private_decrypt(&wrapped, &mut symmetric, Padding::PKCS1)
        .map_err(|e| EnvelopeError::Decryption(format!("key unwrap: {e}")))?;
    symmetric.truncate(written);
    if symmetric.len() != SYMMETRIC_KEY_LEN {
        return Err(EnvelopeError::Decryption(format!(
            "unexpected symmetric key length {}",
            symmetric.len()
        )));
    }

    let combined = BASE64
        .decode(xml::compact_text(cipher_values[1]))
        .map_err(|e| EnvelopeError::Decryption(format!("payload base64: {e}")))?;
    if combined.len() < IV_LEN {
        return Err(EnvelopeError::Decryption(
            "cipher text shorter than its IV".to_string(),
        ));
    }
    let (iv, ciphertext) = combined.split_at(IV_LEN);

    let plaintext = decrypt(Cipher::des_ede3_cbc(), &symmetric, Some(iv), ciphertext)
        .map_err(|e| EnvelopeError::Decryption(format!("payload cipher: {e}")))?;

    Element::parse(&plaintext[..])
        .map_err(|e| EnvelopeError::Decryption(format!("plaintext is not well-formed XML: {e}")))
}

fn cipher_block(wrapped_key_b64: &str, payload_b64: &str, certificate_b64: &str) -> Element {
    let x = ns::prefix::XENC;
    let d = ns::prefix::DSIG;

    let mut encrypted_data = xml::qualified(x, node::ENCRYPTED_DATA);
    xml::set_attr(&mut encrypted_data, "xmlns:xenc", ns::XENC);
    xml::set_attr(&mut encrypted_data, attr::TYPE, ns::ENC_TYPE_ELEMENT);

    let mut data_method = xml::qualified(x, node::ENCRYPTION_METHOD);
    xml::set_attr(&mut data_method, attr::ALGORITHM, alg::TRIPLEDES_CBC);
    xml::push(&mut encrypted_data, data_method);

    let mut encrypted_key = xml::qualified(x, node::ENCRYPTED_KEY);
    let mut key_method = xml::qualified(x, node::ENCRYPTION_METHOD);
    xml::set_attr(&mut key_method, attr::ALGORITHM, alg::RSA_1_5);
    xml::push(&mut encrypted_key, key_method);

    let mut x509_data = xml::qualified(d, node::X509_DATA);
    xml::push(
        &mut x509_data,
        xml::qualified_text(d, node::X509_CERTIFICATE, certificate_b64),
    );
    let mut recipient_info = xml::qualified(d, node::KEY_INFO);
    xml::set_attr(&mut recipient_info, "xmlns:dsig", ns::DSIG);
    xml::push(&mut recipient_info, x509_data);
    xml::push(&mut encrypted_key, recipient_info);

    let mut key_data = xml::qualified(x, node::CIPHER_DATA);
    xml::push(
        &mut key_data,
        xml::qualified_text(x, node::CIPHER_VALUE, wrapped_key_b64),
    );
    xml::push(&mut encrypted_key, key_data);

    let mut key_info = xml::qualified(d, node::KEY_INFO);
    xml::set_attr(&mut key_info, "xmlns:dsig", ns::DSIG);
    xml::push(&mut key_info, encrypted_key);
    xml::push(&mut encrypted_data, key_info);

    let mut payload_data = xml::qualified(x, node::CIPHER_DATA);
    xml::push(
        &mut payload_data,
        xml::qualified_text(x, node::CIPHER_VALUE, payload_b64),
    );
    xml::push(&mut encrypted_data, payload_data);

    encrypted_data
}
