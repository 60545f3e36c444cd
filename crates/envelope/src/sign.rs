//! Digest computation and XML signature binding.
//!
//! Signing canonicalizes the referenced subtree ([`crate::c14n`]), digests
//! it with SHA-1, signs the canonicalized `SignedInfo` with RSA-SHA1, and
//! inserts the resulting `dsig:Signature` block into the envelope's
//! `wsse:Security` header. The algorithms are those of the wire protocol
//! and are not negotiable. Verification reverses the steps and is used by
//! the response interpreter.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use openssl::hash::{hash, MessageDigest};
use openssl::sign::{Signer, Verifier};
use openssl::x509::{X509, X509Ref};
use xmltree::Element;

use crate::c14n;
use crate::error::{EnvelopeError, Result};
use crate::keys::SigningKey;
use crate::ns::{self, alg, attr, node};
use crate::xml;

/// Signs the subtree identified by `reference_id` and embeds the signature
/// block in the document's security header.
pub fn sign_document(root: &mut Element, reference_id: &str, key: &SigningKey) -> Result<()> {
    let digest_b64 = {
        let target =
            xml::find_by_id(root, reference_id).ok_or_else(|| EnvelopeError::ReferenceNotFound {
                reference: format!("#{reference_id}"),
            })?;
        let canonical = c14n::canonicalize(target);
        let digest = hash(MessageDigest::sha1(), &canonical)
            .map_err(|e| EnvelopeError::Signing(format!("digest: {e}")))?;
        BASE64.encode(&*digest)
    };

    let signed_info = build_signed_info(reference_id, &digest_b64);
    let canonical_signed_info = c14n::canonicalize(&signed_info);

    let mut signer = Signer::new(MessageDigest::sha1(), key.pkey())
        .map_err(|e| EnvelopeError::Signing(e.to_string()))?;
    signer
        .update(&canonical_signed_info)
        .map_err(|e| EnvelopeError::Signing(e.to_string()))?;
    let signature_bytes = signer
        .sign_to_vec()
        .map_err(|e| EnvelopeError::Signing(e.to_string()))?;

    let d = ns::prefix::DSIG;
    let mut signature = xml::qualified(d, node::SIGNATURE);
    xml::set_attr(&mut signature, "xmlns:dsig", ns::DSIG);
    xml::push(&mut signature, signed_info);
    xml::push(
        &mut signature,
        xml::qualified_text(d, node::SIGNATURE_VALUE, BASE64.encode(&signature_bytes)),
    );

    let mut x509_data = xml::qualified(d, node::X509_DATA);
    xml::push(
        &mut x509_data,
        xml::qualified_text(d, node::X509_CERTIFICATE, key.certificate_base64()?),
    );
    let mut key_info = xml::qualified(d, node::KEY_INFO);
    xml::push(&mut key_info, x509_data);
    xml::push(&mut signature, key_info);

    let security =
        xml::descendant_mut(root, node::SECURITY).ok_or_else(|| EnvelopeError::ReferenceNotFound {
            reference: node::SECURITY.to_string(),
        })?;
    xml::push(security, signature);

    tracing::debug!(reference = reference_id, "signature block embedded");
    Ok(())
}

/// Verifies the document's signature block against the referenced subtree.
///
/// The certificate is taken from `supplied` when given, otherwise from the
/// signature's embedded `X509Certificate`.
pub fn verify_signature(root: &Element, supplied: Option<&X509Ref>) -> Result<()> {
    let signature = xml::descendant(root, node::SIGNATURE).ok_or_else(|| {
        EnvelopeError::SignatureVerification("no signature block present".to_string())
    })?;
    let signed_info = xml::child(signature, node::SIGNED_INFO).ok_or_else(|| {
        EnvelopeError::SignatureVerification("signature has no SignedInfo".to_string())
    })?;
    let reference = xml::descendant(signed_info, node::REFERENCE).ok_or_else(|| {
        EnvelopeError::SignatureVerification("SignedInfo has no Reference".to_string())
    })?;
    let uri = reference
        .attributes
        .get(attr::URI)
        .cloned()
        .unwrap_or_default();

    let id = uri.strip_prefix('#').unwrap_or(&uri);
    let target = xml::find_by_id(root, id).ok_or_else(|| EnvelopeError::ReferenceNotFound {
        reference: uri.clone(),
    })?;

    let canonical = c14n::canonicalize(target);
    let digest = hash(MessageDigest::sha1(), &canonical)
        .map_err(|e| EnvelopeError::SignatureVerification(format!("digest: {e}")))?;
    let expected = xml::descendant(signed_info, node::DIGEST_VALUE)
        .map(xml::compact_text)
        .unwrap_or_default();
    if BASE64.encode(&*digest) != expected {
        tracing::warn!(reference = %uri, "digest mismatch");
        return Err(EnvelopeError::SignatureVerification(format!(
            "digest mismatch for reference {uri}"
        )));
    }

    let certificate = match supplied {
        Some(cert) => cert.to_owned(),
        None => embedded_certificate(signature)?,
    };
    let public_key = certificate
        .public_key()
        .map_err(|e| EnvelopeError::SignatureVerification(format!("certificate key: {e}")))?;

    let signature_value = xml::descendant(signature, node::SIGNATURE_VALUE)
        .map(xml::compact_text)
        .ok_or_else(|| {
            EnvelopeError::SignatureVerification("signature has no SignatureValue".to_string())
        })?;
    let signature_bytes = BASE64
        .decode(signature_value)
        .map_err(|e| EnvelopeError::SignatureVerification(format!("signature base64: {e}")))?;

    let mut verifier = Verifier::new(MessageDigest::sha1(), &public_key)
        .map_err(|e| EnvelopeError::SignatureVerification(e.to_string()))?;
    verifier
        .update(&c14n::canonicalize(signed_info))
        .map_err(|e| EnvelopeError::SignatureVerification(e.to_string()))?;
    match verifier.verify(&signature_bytes) {
        Ok(true) => Ok(()),
        Ok(false) => Err(EnvelopeError::SignatureVerification(
            "signature value does not match signed info".to_string(),
        )),
        Err(e) => Err(EnvelopeError::SignatureVerification(e.to_string())),
    }
}

/// The certificate embedded in a signature block.
pub fn embedded_certificate(signature: &Element) -> Result<X509> {
    let text = xml::descendant(signature, node::X509_CERTIFICATE)
        .map(xml::compact_text)
        .ok_or_else(|| {
            EnvelopeError::SignatureVerification("signature embeds no certificate".to_string())
        })?;
    let der = BASE64
        .decode(text)
        .map_err(|e| EnvelopeError::SignatureVerification(format!("certificate base64: {e}")))?;
    X509::from_der(&der)
        .map_err(|e| EnvelopeError::SignatureVerification(format!("embedded certificate: {e}")))
}

fn build_signed_info(reference_id: &str, digest_b64: &str) -> Element {
    let d = ns::prefix::DSIG;
    let mut signed_info = xml::qualified(d, node::SIGNED_INFO);
    xml::set_attr(&mut signed_info, "xmlns:dsig", ns::DSIG);

    let mut c14n_method = xml::qualified(d, node::CANONICALIZATION_METHOD);
    xml::set_attr(&mut c14n_method, attr::ALGORITHM, alg::EXC_C14N);
    xml::push(&mut signed_info, c14n_method);

    let mut signature_method = xml::qualified(d, node::SIGNATURE_METHOD);
    xml::set_attr(&mut signature_method, attr::ALGORITHM, alg::RSA_SHA1);
    xml::push(&mut signed_info, signature_method);

    let mut reference = xml::qualified(d, node::REFERENCE);
    xml::set_attr(&mut reference, attr::URI, &format!("#{reference_id}"));

    let mut transforms = xml::qualified(d, node::TRANSFORMS);
    let mut transform = xml::qualified(d, node::TRANSFORM);
    xml::set_attr(&mut transform, attr::ALGORITHM, alg::EXC_C14N);
    xml::push(&mut transforms, transform);
    xml::push(&mut reference, transforms);

    let mut digest_method = xml::qualified(d, node::DIGEST_METHOD);
    xml::set_attr(&mut digest_method, attr::ALGORITHM, alg::SHA1);
    xml::push(&mut reference, digest_method);
    xml::push(
        &mut reference,
        xml::qualified_text(d, node::DIGEST_VALUE, digest_b64),
    );
    xml::push(&mut signed_info, reference);

    signed_info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::EnvelopeBuilder;
    use crate::catalog;
    use crate::command::{Command, Dialect};
    use crate::params::{field, ParameterSet};
    use crate::testkit;
    use crate::xml::{descendant, text_of};
    use xmltree::XMLNode;

    fn signed_document() -> (Element, SigningKey, testkit::TestKeyMaterial) {
        let material = testkit::generate_key_material();
        let key =
            SigningKey::from_pem(&material.private_key_pem, &material.certificate_pem).unwrap();
        let params = ParameterSet::new()
            .with(field::CUSTOMER_ID, "11111111")
            .with(field::ENVIRONMENT, "TEST");
        let envelope = EnvelopeBuilder::new(Command::GetUserInfo, Dialect::FileService)
            .unwrap()
            .build(&params)
            .unwrap();
        let mut root = envelope.root().clone();
        sign_document(&mut root, catalog::BODY_ID, &key).unwrap();
        (root, key, material)
    }

    #[test]
    fn test_signature_block_structure() {
        let (root, _, _) = signed_document();
        let security = descendant(&root, "Security").unwrap();
        let signature = descendant(security, "Signature").unwrap();

        for name in [
            "SignedInfo",
            "SignatureValue",
            "CanonicalizationMethod",
            "SignatureMethod",
            "Reference",
            "DigestValue",
            "X509Certificate",
        ] {
            assert!(descendant(signature, name).is_some(), "missing {name}");
        }

        let reference = descendant(signature, "Reference").unwrap();
        assert_eq!(
            reference.attributes.get("URI").map(String::as_str),
            Some("#request-body")
        );

        let method = descendant(signature, "SignatureMethod").unwrap();
        assert_eq!(
            method.attributes.get("Algorithm").map(String::as_str),
            Some(alg::RSA_SHA1)
        );
    }

    #[test]
    fn test_exactly_one_signature_per_reference() {
        let (root, _, _) = signed_document();
        let mut signatures = Vec::new();
        xml::collect_descendants(&root, "Signature", &mut signatures);
        assert_eq!(signatures.len(), 1);
    }

    #[test]
    fn test_digest_matches_canonical_body() {
        let (root, _, _) = signed_document();
        let body = xml::find_by_id(&root, catalog::BODY_ID).unwrap();
        let digest = hash(MessageDigest::sha1(), &c14n::canonicalize(body)).unwrap();

        let embedded = descendant(&root, "DigestValue").unwrap();
        assert_eq!(xml::compact_text(embedded), BASE64.encode(&*digest));
    }

    #[test]
    fn test_embedded_certificate_matches_pem_body() {
        let (root, _, material) = signed_document();
        let embedded = xml::compact_text(descendant(&root, "X509Certificate").unwrap());

        let pem_text = String::from_utf8(material.certificate_pem).unwrap();
        let body: String = pem_text
            .lines()
            .filter(|line| !line.starts_with("-----"))
            .collect();
        assert_eq!(embedded, body);
    }

    #[test]
    fn test_sign_and_verify_round_trip() {
        let (root, _, _) = signed_document();
        let xml_text = xml::write_document(&root);
        let reparsed = Element::parse(xml_text.as_bytes()).unwrap();
        verify_signature(&reparsed, None).unwrap();
    }

    #[test]
    fn test_verify_with_supplied_certificate() {
        let (root, key, _) = signed_document();
        verify_signature(&root, Some(key.certificate())).unwrap();
    }

    #[test]
    fn test_tampered_body_fails_verification() {
        let (root, _, _) = signed_document();
        let xml_text = xml::write_document(&root);
        let mut reparsed = Element::parse(xml_text.as_bytes()).unwrap();

        let environment = crate::xml::descendant_mut(&mut reparsed, "Environment").unwrap();
        environment.children.clear();
        environment
            .children
            .push(XMLNode::Text("PRODUCTION".to_string()));

        let err = verify_signature(&reparsed, None).unwrap_err();
        assert!(matches!(err, EnvelopeError::SignatureVerification(_)));
    }

    #[test]
    fn test_verify_with_wrong_certificate_fails() {
        let (root, _, _) = signed_document();
        let other = testkit::generate_key_material();
        let other_cert = X509::from_pem(&other.certificate_pem).unwrap();

        let err = verify_signature(&root, Some(&other_cert)).unwrap_err();
        assert!(matches!(err, EnvelopeError::SignatureVerification(_)));
    }

    #[test]
    fn test_unresolvable_reference() {
        let material = testkit::generate_key_material();
        let key =
            SigningKey::from_pem(&material.private_key_pem, &material.certificate_pem).unwrap();
        let mut root = Element::parse("<a><b>t</b></a>".as_bytes()).unwrap();

        let err = sign_document(&mut root, "nowhere", &key).unwrap_err();
        match err {
            EnvelopeError::ReferenceNotFound { reference } => assert_eq!(reference, "#nowhere"),
            other => panic!("expected ReferenceNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_signature_value_text_is_valid_base64() {
        let (root, _, _) = signed_document();
        let value = xml::compact_text(descendant(&root, "SignatureValue").unwrap());
        assert!(BASE64.decode(value).is_ok());
    }
}
