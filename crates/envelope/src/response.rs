//! Response interpretation.
//!
//! Parses a returned envelope, locates the operation's response element,
//! verifies the signature block when one is present, and decrypts the
//! cipher block when one is present and a key was supplied. Bank-level
//! rejection (a non-zero return code) is surfaced as data on the result so
//! callers can tell it apart from a response that failed cryptographic
//! validation. The input is never mutated.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use openssl::x509::X509;
use serde::Serialize;
use xmltree::Element;

use crate::catalog;
use crate::command::{Command, Dialect};
use crate::crypt;
use crate::error::{EnvelopeError, Result};
use crate::keys::DecryptionKey;
use crate::ns::node;
use crate::sign;
use crate::xml;

/// Optional material for verifying and decrypting a response.
#[derive(Debug, Default, Clone, Copy)]
pub struct InterpretOptions<'a> {
    /// Certificate to verify the signature against; when absent the
    /// signature's embedded certificate is used.
    pub verification_certificate: Option<&'a X509>,
    /// Private key for decrypting an encrypted payload section.
    pub decryption_key: Option<&'a DecryptionKey>,
}

/// Structured result of interpreting one response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct InterpretedResponse {
    /// Bank return code (`00` means accepted).
    pub return_code: Option<String>,
    /// Human-readable return text accompanying the code.
    pub return_text: Option<String>,
    /// Decoded `Content` payload, when the response carries one.
    pub content: Option<Vec<u8>>,
    /// Decrypted payload subtree, when a cipher block was decrypted.
    #[serde(skip)]
    pub decrypted: Option<Element>,
}

impl InterpretedResponse {
    /// Whether the bank accepted the request. Responses without a return
    /// code (certificate-service flows) count as accepted; rejection there
    /// is reported through a SOAP fault instead.
    pub fn is_accepted(&self) -> bool {
        matches!(self.return_code.as_deref(), Some("00") | None)
    }
}

/// Interprets a raw response envelope for the given command.
pub fn interpret(
    raw: &str,
    expected: Command,
    dialect: Dialect,
    options: &InterpretOptions<'_>,
) -> Result<InterpretedResponse> {
    let root = Element::parse(raw.as_bytes())?;
    if root.name != node::ENVELOPE {
        return Err(EnvelopeError::InvalidResponse(format!(
            "unexpected document element {}",
            root.name
        )));
    }
    let body = xml::descendant(&root, node::BODY)
        .ok_or_else(|| EnvelopeError::InvalidResponse("envelope has no body".to_string()))?;

    if let Some(fault) = xml::descendant(body, node::FAULT) {
        let text = xml::descendant(fault, "faultstring")
            .map(xml::text_of)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "unspecified".to_string());
        return Err(EnvelopeError::InvalidResponse(format!("SOAP fault: {text}")));
    }

    let template = catalog::lookup(expected, dialect)?;
    let op = xml::descendant(body, template.response_element).ok_or_else(|| {
        EnvelopeError::InvalidResponse(format!(
            "response carries no {} element",
            template.response_element
        ))
    })?;

    if xml::descendant(&root, node::SIGNATURE).is_some() {
        sign::verify_signature(&root, options.verification_certificate.map(|c| &**c))?;
        tracing::debug!(command = %expected, "response signature verified");
    }

    let return_code = xml::descendant(op, "ReturnCode").map(xml::text_of);
    let return_text = xml::descendant(op, "ReturnText").map(xml::text_of);

    let content = match xml::descendant(op, "Content") {
        Some(el) => Some(
            BASE64
                .decode(xml::compact_text(el))
                .map_err(|e| EnvelopeError::InvalidResponse(format!("content base64: {e}")))?,
        ),
        None => None,
    };

    let decrypted = match (
        xml::descendant(op, node::ENCRYPTED_DATA),
        options.decryption_key,
    ) {
        (Some(block), Some(key)) => Some(crypt::decrypt_block(block, key)?),
        (Some(_), None) => {
            tracing::warn!(command = %expected, "encrypted payload present but no key supplied");
            None
        }
        (None, _) => None,
    };

    tracing::debug!(command = %expected, code = ?return_code, "response interpreted");
    Ok(InterpretedResponse {
        return_code,
        return_text,
        content,
        decrypted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{RecipientCertificate, SigningKey};
    use crate::ns;
    use crate::testkit;
    use crate::xml::{descendant, text_of};

    fn file_service_response(op_children: &str) -> String {
        format!(
            "<SOAP-ENV:Envelope xmlns:SOAP-ENV=\"{soap}\">\
             <SOAP-ENV:Header></SOAP-ENV:Header>\
             <SOAP-ENV:Body>\
             <cor:downloadFileout xmlns:cor=\"{cor}\">{op_children}</cor:downloadFileout>\
             </SOAP-ENV:Body></SOAP-ENV:Envelope>",
            soap = ns::SOAP_ENV,
            cor = ns::CORPORATE_FILE_SERVICE,
        )
    }

    #[test]
    fn test_interprets_accepted_response() {
        let content = BASE64.encode(b"account statement");
        let raw = file_service_response(&format!(
            "<cor:ReturnCode>00</cor:ReturnCode>\
             <cor:ReturnText>OK</cor:ReturnText>\
             <cor:Content>{content}</cor:Content>"
        ));

        let result = interpret(
            &raw,
            Command::DownloadFile,
            Dialect::FileService,
            &InterpretOptions::default(),
        )
        .unwrap();

        assert!(result.is_accepted());
        assert_eq!(result.return_code.as_deref(), Some("00"));
        assert_eq!(result.return_text.as_deref(), Some("OK"));
        assert_eq!(result.content.as_deref(), Some(&b"account statement"[..]));
        assert!(result.decrypted.is_none());
    }

    #[test]
    fn test_bank_rejection_is_data_not_error() {
        let raw = file_service_response(
            "<cor:ReturnCode>12</cor:ReturnCode><cor:ReturnText>Schema validation failed</cor:ReturnText>",
        );
        let result = interpret(
            &raw,
            Command::DownloadFile,
            Dialect::FileService,
            &InterpretOptions::default(),
        )
        .unwrap();

        assert!(!result.is_accepted());
        assert_eq!(result.return_code.as_deref(), Some("12"));
    }

    #[test]
    fn test_malformed_xml() {
        let err = interpret(
            "<not-even-close",
            Command::DownloadFile,
            Dialect::FileService,
            &InterpretOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidResponse(_)));
    }

    #[test]
    fn test_wrong_document_element() {
        let err = interpret(
            "<Receipt>thanks</Receipt>",
            Command::DownloadFile,
            Dialect::FileService,
            &InterpretOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidResponse(_)));
    }

    #[test]
    fn test_missing_operation_element() {
        let raw = file_service_response("<cor:ReturnCode>00</cor:ReturnCode>");
        let err = interpret(
            &raw,
            Command::UploadFile,
            Dialect::FileService,
            &InterpretOptions::default(),
        )
        .unwrap_err();
        match err {
            EnvelopeError::InvalidResponse(msg) => assert!(msg.contains("uploadFileout")),
            other => panic!("expected InvalidResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_soap_fault() {
        let raw = format!(
            "<SOAP-ENV:Envelope xmlns:SOAP-ENV=\"{soap}\"><SOAP-ENV:Body>\
             <SOAP-ENV:Fault><faultcode>SOAP-ENV:Client</faultcode>\
             <faultstring>Request rejected</faultstring></SOAP-ENV:Fault>\
             </SOAP-ENV:Body></SOAP-ENV:Envelope>",
            soap = ns::SOAP_ENV,
        );
        let err = interpret(
            &raw,
            Command::DownloadFile,
            Dialect::FileService,
            &InterpretOptions::default(),
        )
        .unwrap_err();
        match err {
            EnvelopeError::InvalidResponse(msg) => assert!(msg.contains("Request rejected")),
            other => panic!("expected InvalidResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_pair_is_rejected_before_parsing_details() {
        let raw = file_service_response("<cor:ReturnCode>00</cor:ReturnCode>");
        let err = interpret(
            &raw,
            Command::DownloadFile,
            Dialect::CertService,
            &InterpretOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EnvelopeError::UnsupportedCommand { .. }));
    }

    fn signed_response() -> (String, SigningKey) {
        let material = testkit::generate_key_material();
        let key =
            SigningKey::from_pem(&material.private_key_pem, &material.certificate_pem).unwrap();

        let mut security = xml::qualified(ns::prefix::WSSE, node::SECURITY);
        xml::set_attr(&mut security, "xmlns:wsse", ns::WSSE);
        let mut header = xml::qualified(ns::prefix::SOAP_ENV, node::HEADER);
        xml::push(&mut header, security);

        let mut op = xml::qualified("cor", "downloadFileout");
        xml::set_attr(&mut op, "xmlns:cor", ns::CORPORATE_FILE_SERVICE);
        xml::push(&mut op, xml::qualified_text("cor", "ReturnCode", "00"));
        xml::push(&mut op, xml::qualified_text("cor", "ReturnText", "OK"));
        let mut body = xml::qualified(ns::prefix::SOAP_ENV, node::BODY);
        xml::set_attr(&mut body, "xmlns:SOAP-ENV", ns::SOAP_ENV);
        xml::set_attr(&mut body, "Id", "response-body");
        xml::push(&mut body, op);

        let mut root = xml::qualified(ns::prefix::SOAP_ENV, node::ENVELOPE);
        xml::set_attr(&mut root, "xmlns:SOAP-ENV", ns::SOAP_ENV);
        xml::push(&mut root, header);
        xml::push(&mut root, body);

        sign::sign_document(&mut root, "response-body", &key).unwrap();
        (xml::write_document(&root), key)
    }

    #[test]
    fn test_signed_response_verifies_with_embedded_certificate() {
        let (raw, _) = signed_response();
        let result = interpret(
            &raw,
            Command::DownloadFile,
            Dialect::FileService,
            &InterpretOptions::default(),
        )
        .unwrap();
        assert!(result.is_accepted());
    }

    #[test]
    fn test_signed_response_verifies_with_supplied_certificate() {
        let (raw, key) = signed_response();
        let options = InterpretOptions {
            verification_certificate: Some(key.certificate()),
            decryption_key: None,
        };
        interpret(&raw, Command::DownloadFile, Dialect::FileService, &options).unwrap();
    }

    #[test]
    fn test_tampered_signed_response_fails() {
        let (raw, _) = signed_response();
        let tampered = raw.replace(
            "<cor:ReturnCode>00</cor:ReturnCode>",
            "<cor:ReturnCode>05</cor:ReturnCode>",
        );
        let err = interpret(
            &tampered,
            Command::DownloadFile,
            Dialect::FileService,
            &InterpretOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EnvelopeError::SignatureVerification(_)));
    }

    fn encrypted_response() -> (String, DecryptionKey) {
        let material = testkit::generate_key_material();
        let recipient = RecipientCertificate::from_pem(&material.certificate_pem).unwrap();
        let decryption_key = DecryptionKey::from_pem(&material.private_key_pem).unwrap();

        let mut payload = xml::qualified("pkif", "CertificateBundle");
        xml::set_attr(&mut payload, "xmlns:pkif", ns::PKI_FACTORY_SERVICE);
        xml::push(
            &mut payload,
            xml::qualified_text("pkif", "Certificate", "TUlJQg=="),
        );
        let mut op = xml::qualified("pkif", "CreateCertificateOut");
        xml::set_attr(&mut op, "xmlns:pkif", ns::PKI_FACTORY_SERVICE);
        xml::push(&mut op, payload);

        let mut body = xml::qualified(ns::prefix::SOAP_ENV, node::BODY);
        xml::set_attr(&mut body, "xmlns:SOAP-ENV", ns::SOAP_ENV);
        xml::push(&mut body, op);
        let mut root = xml::qualified(ns::prefix::SOAP_ENV, node::ENVELOPE);
        xml::set_attr(&mut root, "xmlns:SOAP-ENV", ns::SOAP_ENV);
        xml::push(&mut root, xml::qualified(ns::prefix::SOAP_ENV, node::HEADER));
        xml::push(&mut root, body);

        crypt::encrypt_subtree(&mut root, "CertificateBundle", &recipient).unwrap();
        (xml::write_document(&root), decryption_key)
    }

    #[test]
    fn test_encrypted_response_is_decrypted_when_key_supplied() {
        let (raw, key) = encrypted_response();
        let options = InterpretOptions {
            verification_certificate: None,
            decryption_key: Some(&key),
        };
        let result = interpret(
            &raw,
            Command::CreateCertificate,
            Dialect::CertService,
            &options,
        )
        .unwrap();

        let decrypted = result.decrypted.expect("decrypted payload");
        let certificate = descendant(&decrypted, "Certificate").unwrap();
        assert_eq!(text_of(certificate), "TUlJQg==");
    }

    #[test]
    fn test_encrypted_response_without_key_is_left_encrypted() {
        let (raw, _) = encrypted_response();
        let result = interpret(
            &raw,
            Command::CreateCertificate,
            Dialect::CertService,
            &InterpretOptions::default(),
        )
        .unwrap();
        assert!(result.decrypted.is_none());
    }

    #[test]
    fn test_decryption_with_wrong_key_fails() {
        let (raw, _) = encrypted_response();
        let other = testkit::generate_key_material();
        let wrong = DecryptionKey::from_pem(&other.private_key_pem).unwrap();
        let options = InterpretOptions {
            verification_certificate: None,
            decryption_key: Some(&wrong),
        };
        let err = interpret(
            &raw,
            Command::CreateCertificate,
            Dialect::CertService,
            &options,
        )
        .unwrap_err();
        assert!(matches!(err, EnvelopeError::Decryption(_)));
    }
}
