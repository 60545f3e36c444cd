//! Command template catalog.
//!
//! Per-dialect, per-operation envelope skeleton data: namespaces, operation
//! element names, required parameters, and the markers telling the build
//! pipeline which subtree to sign and which to encrypt. The catalog is
//! process-wide constant data; templates are selected once at build start.

use crate::command::{Command, Dialect};
use crate::error::{EnvelopeError, Result};
use crate::ns;
use crate::params::field;

/// Interface version literal required by the certificate dialect.
pub const INTERFACE_VERSION: &str = "1";

/// `Id` anchor placed on the SOAP Body of signed requests.
pub const BODY_ID: &str = "request-body";

/// UserAgent literal sent in file-service request headers.
pub const USER_AGENT: &str = concat!("banklink/", env!("CARGO_PKG_VERSION"));

/// Envelope skeleton for one (command, dialect) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTemplate {
    /// The operation this template builds.
    pub command: Command,
    /// The dialect governing namespaces and header layout.
    pub dialect: Dialect,
    /// Dialect namespace URI for the operation element.
    pub namespace: &'static str,
    /// Preferred prefix for the dialect namespace.
    pub prefix: &'static str,
    /// Local name of the request operation element.
    pub request_element: &'static str,
    /// Local name of the response operation element.
    pub response_element: &'static str,
    /// Parameters that must be present before assembly.
    pub required: &'static [&'static str],
    /// `Id` of the subtree to sign, when the operation is signed.
    pub signature_reference: Option<&'static str>,
    /// Local name of the subtree to encrypt, when the operation carries
    /// sensitive payload.
    pub encrypted_element: Option<&'static str>,
}

const TEMPLATES: &[CommandTemplate] = &[
    CommandTemplate {
        command: Command::GetUserInfo,
        dialect: Dialect::FileService,
        namespace: ns::CORPORATE_FILE_SERVICE,
        prefix: ns::prefix::COR,
        request_element: "getUserInfoin",
        response_element: "getUserInfoout",
        required: &[field::CUSTOMER_ID, field::ENVIRONMENT],
        signature_reference: Some(BODY_ID),
        encrypted_element: None,
    },
    CommandTemplate {
        command: Command::DownloadFileList,
        dialect: Dialect::FileService,
        namespace: ns::CORPORATE_FILE_SERVICE,
        prefix: ns::prefix::COR,
        request_element: "downloadFileListin",
        response_element: "downloadFileListout",
        required: &[
            field::CUSTOMER_ID,
            field::ENVIRONMENT,
            field::STATUS,
            field::TARGET_ID,
            field::FILE_TYPE,
        ],
        signature_reference: Some(BODY_ID),
        encrypted_element: None,
    },
    CommandTemplate {
        command: Command::DownloadFile,
        dialect: Dialect::FileService,
        namespace: ns::CORPORATE_FILE_SERVICE,
        prefix: ns::prefix::COR,
        request_element: "downloadFilein",
        response_element: "downloadFileout",
        required: &[
            field::CUSTOMER_ID,
            field::ENVIRONMENT,
            field::TARGET_ID,
            field::FILE_TYPE,
        ],
        signature_reference: Some(BODY_ID),
        encrypted_element: None,
    },
    CommandTemplate {
        command: Command::UploadFile,
        dialect: Dialect::FileService,
        namespace: ns::CORPORATE_FILE_SERVICE,
        prefix: ns::prefix::COR,
        request_element: "uploadFilein",
        response_element: "uploadFileout",
        required: &[
            field::CUSTOMER_ID,
            field::ENVIRONMENT,
            field::CONTENT,
            field::TARGET_ID,
            field::FILE_TYPE,
        ],
        signature_reference: Some(BODY_ID),
        encrypted_element: None,
    },
    CommandTemplate {
        command: Command::GetCertificate,
        dialect: Dialect::CertService,
        namespace: ns::PKI_FACTORY_SERVICE,
        prefix: ns::prefix::PKIF,
        request_element: "GetCertificateIn",
        response_element: "GetCertificateOut",
        required: &[field::CUSTOMER_ID, field::ENVIRONMENT, field::SIGNING_CSR],
        signature_reference: None,
        encrypted_element: None,
    },
    CommandTemplate {
        command: Command::CreateCertificate,
        dialect: Dialect::CertService,
        namespace: ns::PKI_FACTORY_SERVICE,
        prefix: ns::prefix::PKIF,
        request_element: "CreateCertificateIn",
        response_element: "CreateCertificateOut",
        required: &[
            field::CUSTOMER_ID,
            field::ENVIRONMENT,
            field::SIGNING_CSR,
            field::ENCRYPTION_CSR,
            field::PIN,
        ],
        signature_reference: None,
        encrypted_element: Some("CreateCertificateRequest"),
    },
];

/// Looks up the template for a (command, dialect) pair.
///
/// Fails with [`EnvelopeError::UnsupportedCommand`] when the command is not
/// defined for the dialect.
pub fn lookup(command: Command, dialect: Dialect) -> Result<&'static CommandTemplate> {
    TEMPLATES
        .iter()
        .find(|t| t.command == command && t.dialect == dialect)
        .ok_or(EnvelopeError::UnsupportedCommand { command, dialect })
}

/// Commands defined for a dialect, in catalog order.
pub fn commands(dialect: Dialect) -> impl Iterator<Item = Command> {
    TEMPLATES
        .iter()
        .filter(move |t| t.dialect == dialect)
        .map(|t| t.command)
}
