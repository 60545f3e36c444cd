//! Commands and protocol dialects.
//!
//! Both enums are closed sets: a [`Command`] is only meaningful in the
//! [`Dialect`]s the catalog defines it for, and the pairing is checked once at
//! build start rather than branched on repeatedly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An operation against the bank's web service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Retrieve contract/user information for the customer.
    GetUserInfo,
    /// List files waiting at the bank.
    DownloadFileList,
    /// Download a single file.
    DownloadFile,
    /// Upload a payment or material file.
    UploadFile,
    /// Request a certificate with a pre-generated PKCS#10.
    GetCertificate,
    /// Issue a new certificate pair (PIN-authorized, encrypted request).
    CreateCertificate,
}

impl Command {
    /// Stable snake_case name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Command::GetUserInfo => "get_user_info",
            Command::DownloadFileList => "download_file_list",
            Command::DownloadFile => "download_file",
            Command::UploadFile => "upload_file",
            Command::GetCertificate => "get_certificate",
            Command::CreateCertificate => "create_certificate",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bank protocol variant with its own namespaces and templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Generic multi-bank corporate file exchange.
    FileService,
    /// Bank certificate authority (PKI factory).
    CertService,
}

impl Dialect {
    /// Stable snake_case name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::FileService => "file_service",
            Dialect::CertService => "cert_service",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
