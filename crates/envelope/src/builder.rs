//! Canonical XML assembly.
//!
//! [`EnvelopeBuilder`] instantiates a catalog skeleton into an [`Envelope`]:
//! a namespace-correct SOAP document with the header identifiers populated
//! (sender, generated request id and timestamp, interface version) and the
//! body filled from the validated parameter set. The builder performs no
//! I/O; a fresh request id and timestamp are generated on every build and
//! never reused.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Local;
use rand::rngs::OsRng;
use rand::RngCore;
use xmltree::Element;

use crate::catalog::{self, CommandTemplate};
use crate::command::{Command, Dialect};
use crate::error::Result;
use crate::ns;
use crate::params::{field, ParameterSet};
use crate::xml;

/// Timestamp layout: offset-aware local time, e.g. `2026-08-07T10:15:00+0300`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// A SOAP document under construction.
///
/// Mutated in place by the builder, the signature pass, and the encryption
/// pass, in that order; serialized once with [`Envelope::to_xml`] when it is
/// handed to the transport collaborator.
#[derive(Debug, Clone)]
pub struct Envelope {
    root: Element,
    command: Command,
    dialect: Dialect,
}

impl Envelope {
    /// The command this envelope was built for.
    pub fn command(&self) -> Command {
        self.command
    }

    /// The dialect governing the envelope's namespaces.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The document root (`SOAP-ENV:Envelope`).
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Serializes the envelope as a standalone XML document.
    pub fn to_xml(&self) -> String {
        xml::write_document(&self.root)
    }

    /// Signs the subtree identified by `reference_id`, embedding the
    /// signature block in the security header. See
    /// [`sign_document`](crate::sign::sign_document).
    pub fn sign(&mut self, reference_id: &str, key: &crate::keys::SigningKey) -> Result<()> {
        crate::sign::sign_document(&mut self.root, reference_id, key)
    }

    /// Encrypts the subtree with the given local name, replacing it with a
    /// cipher block for the recipient. See
    /// [`encrypt_subtree`](crate::crypt::encrypt_subtree).
    pub fn encrypt(
        &mut self,
        target_local: &str,
        recipient: &crate::keys::RecipientCertificate,
    ) -> Result<()> {
        crate::crypt::encrypt_subtree(&mut self.root, target_local, recipient)
    }
}

/// Builds envelopes for one (command, dialect) pair.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeBuilder {
    template: &'static CommandTemplate,
}

impl EnvelopeBuilder {
    /// Selects the template for the pair, failing with
    /// [`EnvelopeError::UnsupportedCommand`](crate::EnvelopeError::UnsupportedCommand)
    /// when the catalog does not define it.
    pub fn new(command: Command, dialect: Dialect) -> Result<Self> {
        Ok(Self {
            template: catalog::lookup(command, dialect)?,
        })
    }

    /// The selected template.
    pub fn template(&self) -> &'static CommandTemplate {
        self.template
    }

    /// Assembles the unsigned envelope from the parameter set.
    ///
    /// Fails with [`EnvelopeError::MissingParameter`](crate::EnvelopeError::MissingParameter)
    /// naming the first absent required field.
    pub fn build(&self, params: &ParameterSet) -> Result<Envelope> {
        let t = self.template;
        for name in t.required {
            params.require(name)?;
        }

        let request_id = generate_request_id();
        let timestamp = generate_timestamp();
        tracing::debug!(
            command = %t.command,
            dialect = %t.dialect,
            request_id = %request_id,
            "assembling envelope"
        );

        let root = match t.dialect {
            Dialect::FileService => self.file_service_document(params, &request_id, &timestamp)?,
            Dialect::CertService => self.cert_service_document(params, &request_id, &timestamp)?,
        };

        Ok(Envelope {
            root,
            command: t.command,
            dialect: t.dialect,
        })
    }

    fn file_service_document(
        &self,
        params: &ParameterSet,
        request_id: &str,
        timestamp: &str,
    ) -> Result<Element> {
        let t = self.template;
        let p = t.prefix;
        let customer_id = params.require(field::CUSTOMER_ID)?;

        let mut header = xml::qualified(ns::prefix::SOAP_ENV, ns::node::HEADER);
        let mut security = xml::qualified(ns::prefix::WSSE, ns::node::SECURITY);
        xml::set_attr(&mut security, "xmlns:wsse", ns::WSSE);
        xml::set_attr(&mut security, "SOAP-ENV:mustUnderstand", "1");
        xml::push(&mut header, security);

        let mut request_header = xml::qualified(p, "RequestHeader");
        xml::push(
            &mut request_header,
            xml::qualified_text(p, "SenderId", customer_id),
        );
        xml::push(
            &mut request_header,
            xml::qualified_text(p, "RequestId", request_id),
        );
        xml::push(
            &mut request_header,
            xml::qualified_text(p, "Timestamp", timestamp),
        );
        if let Some(language) = params.get(field::LANGUAGE) {
            xml::push(
                &mut request_header,
                xml::qualified_text(p, "Language", language),
            );
        }
        xml::push(
            &mut request_header,
            xml::qualified_text(p, "UserAgent", catalog::USER_AGENT),
        );

        let mut op = xml::qualified(p, t.request_element);
        xml::set_attr(&mut op, &format!("xmlns:{p}"), t.namespace);
        xml::push(&mut op, request_header);
        xml::push(
            &mut op,
            xml::qualified_text(p, "Environment", params.require(field::ENVIRONMENT)?),
        );

        match t.command {
            Command::GetUserInfo => {}
            Command::DownloadFileList => {
                xml::push(
                    &mut op,
                    xml::qualified_text(p, "Status", params.require(field::STATUS)?),
                );
                xml::push(
                    &mut op,
                    xml::qualified_text(p, "TargetId", params.require(field::TARGET_ID)?),
                );
                xml::push(
                    &mut op,
                    xml::qualified_text(p, "FileType", params.require(field::FILE_TYPE)?),
                );
            }
            Command::DownloadFile => {
                xml::push(
                    &mut op,
                    xml::qualified_text(p, "FileReference", params.require(field::TARGET_ID)?),
                );
                xml::push(
                    &mut op,
                    xml::qualified_text(p, "FileType", params.require(field::FILE_TYPE)?),
                );
            }
            Command::UploadFile => {
                let content = BASE64.encode(params.require(field::CONTENT)?.as_bytes());
                xml::push(&mut op, xml::qualified_text(p, "Content", content));
                xml::push(
                    &mut op,
                    xml::qualified_text(p, "TargetId", params.require(field::TARGET_ID)?),
                );
                xml::push(
                    &mut op,
                    xml::qualified_text(p, "FileType", params.require(field::FILE_TYPE)?),
                );
            }
            Command::GetCertificate | Command::CreateCertificate => {
                unreachable!("certificate commands are not file-service operations")
            }
        }

        let mut body = xml::qualified(ns::prefix::SOAP_ENV, ns::node::BODY);
        xml::set_attr(&mut body, "xmlns:SOAP-ENV", ns::SOAP_ENV);
        xml::set_attr(&mut body, ns::attr::ID, catalog::BODY_ID);
        xml::push(&mut body, op);

        Ok(self.envelope_root(header, body))
    }

    fn cert_service_document(
        &self,
        params: &ParameterSet,
        request_id: &str,
        timestamp: &str,
    ) -> Result<Element> {
        let t = self.template;
        let p = t.prefix;
        let customer_id = params.require(field::CUSTOMER_ID)?;
        let environment = params.require(field::ENVIRONMENT)?;

        let mut request_header = xml::qualified(p, "RequestHeader");
        xml::set_attr(&mut request_header, &format!("xmlns:{p}"), t.namespace);
        xml::push(
            &mut request_header,
            xml::qualified_text(p, "SenderId", customer_id),
        );
        xml::push(
            &mut request_header,
            xml::qualified_text(p, "CustomerId", customer_id),
        );
        xml::push(
            &mut request_header,
            xml::qualified_text(p, "RequestId", request_id),
        );
        xml::push(
            &mut request_header,
            xml::qualified_text(p, "Timestamp", timestamp),
        );
        xml::push(
            &mut request_header,
            xml::qualified_text(p, "InterfaceVersion", catalog::INTERFACE_VERSION),
        );
        xml::push(
            &mut request_header,
            xml::qualified_text(p, "Environment", environment),
        );

        let mut header = xml::qualified(ns::prefix::SOAP_ENV, ns::node::HEADER);
        xml::push(&mut header, request_header);

        let mut op = xml::qualified(p, t.request_element);
        xml::set_attr(&mut op, &format!("xmlns:{p}"), t.namespace);

        match t.command {
            Command::GetCertificate => {
                xml::push(&mut op, xml::qualified_text(p, "CustomerId", customer_id));
                xml::push(&mut op, xml::qualified_text(p, "Environment", environment));
                xml::push(
                    &mut op,
                    xml::qualified_text(
                        p,
                        "SigningCertPKCS10",
                        params.require(field::SIGNING_CSR)?,
                    ),
                );
            }
            Command::CreateCertificate => {
                let mut request = xml::qualified(p, "CreateCertificateRequest");
                xml::set_attr(&mut request, &format!("xmlns:{p}"), t.namespace);
                xml::push(&mut request, xml::qualified_text(p, "CustomerId", customer_id));
                xml::push(
                    &mut request,
                    xml::qualified_text(p, "KeyGeneratorType", "software"),
                );
                xml::push(
                    &mut request,
                    xml::qualified_text(
                        p,
                        "EncryptionCertPKCS10",
                        params.require(field::ENCRYPTION_CSR)?,
                    ),
                );
                xml::push(
                    &mut request,
                    xml::qualified_text(
                        p,
                        "SigningCertPKCS10",
                        params.require(field::SIGNING_CSR)?,
                    ),
                );
                xml::push(
                    &mut request,
                    xml::qualified_text(p, "PIN", params.require(field::PIN)?),
                );
                xml::push(&mut op, request);
            }
            _ => unreachable!("file-exchange commands are not certificate operations"),
        }

        let mut body = xml::qualified(ns::prefix::SOAP_ENV, ns::node::BODY);
        xml::set_attr(&mut body, "xmlns:SOAP-ENV", ns::SOAP_ENV);
        xml::push(&mut body, op);

        Ok(self.envelope_root(header, body))
    }

    fn envelope_root(&self, header: Element, body: Element) -> Element {
        let mut root = xml::qualified(ns::prefix::SOAP_ENV, ns::node::ENVELOPE);
        xml::set_attr(&mut root, "xmlns:SOAP-ENV", ns::SOAP_ENV);
        xml::push(&mut root, header);
        xml::push(&mut root, body);
        root
    }
}

/// Generates a fresh 10-character uppercase hexadecimal request id.
fn generate_request_id() -> String {
    let mut bytes = [0u8; 5];
    OsRng.fill_bytes(&mut bytes);
    hex::encode_upper(bytes)
}

/// Generates the build timestamp in the protocol's offset-aware layout.
fn generate_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
