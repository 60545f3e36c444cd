//! # BankLink Envelope Library
//!
//! This crate builds and validates SOAP request/response envelopes for
//! corporate banking file-exchange protocols, where every request is
//! cryptographically bound: signed against a per-bank schema and, for
//! certificate-issuance flows, partially encrypted for the bank's
//! certificate authority.
//!
//! ## Overview
//!
//! The crate is the core of BankLink's protocol layer, providing:
//!
//! - **Command Catalog**: per-dialect envelope skeletons with signing and
//!   encryption markers
//! - **Canonical Assembly**: namespace-correct SOAP documents with fresh
//!   request identifiers and timestamps
//! - **Cryptographic Binding**: XML-Signature blocks (exclusive C14N,
//!   RSA-SHA1) and XML-Encryption cipher blocks (3DES-CBC payload under an
//!   RSA-wrapped key, as the certificate authority's interface requires)
//! - **Response Interpretation**: signature verification, payload
//!   decryption, and structured bank return codes
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Response Interpretation          │  verify / decrypt / extract
//! ├─────────────────────────────────────────┤
//! │      Signature & Cipher Binding         │  XML-DSig, XML-Enc
//! ├─────────────────────────────────────────┤
//! │          Canonical Assembly             │  skeleton + parameters
//! ├─────────────────────────────────────────┤
//! │          Command Catalog                │  dialects, templates
//! └─────────────────────────────────────────┘
//! ```
//!
//! One build is synchronous and stateless: a parameter set goes in, a
//! finished envelope comes out, and nothing is retained between calls. Key
//! material is borrowed from the caller for the duration of the call only.
//! Transport and key loading belong to external collaborators.
//!
//! ## Example Usage
//!
//! ```rust
//! use envelope::params::field;
//! use envelope::{Command, Dialect, EnvelopeBuilder, ParameterSet};
//!
//! let params = ParameterSet::new()
//!     .with(field::CUSTOMER_ID, "11111111")
//!     .with(field::ENVIRONMENT, "TEST");
//!
//! let builder = EnvelopeBuilder::new(Command::GetUserInfo, Dialect::FileService).unwrap();
//! let envelope = builder.build(&params).unwrap();
//! assert!(envelope.to_xml().contains("getUserInfoin"));
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: command templates per dialect
//! - [`builder`]: envelope assembly
//! - [`sign`]: digest computation and signature binding
//! - [`crypt`]: hybrid encryption for sensitive payloads
//! - [`response`]: response interpretation
//! - [`keys`]: caller-supplied key material
//! - [`params`]: request parameters
//! - [`xml`] / [`c14n`]: document handling and canonicalization
//! - [`error`]: error types

pub mod builder;
pub mod c14n;
pub mod catalog;
pub mod command;
pub mod crypt;
pub mod error;
pub mod keys;
pub mod ns;
pub mod params;
pub mod response;
pub mod sign;
pub mod testkit;
pub mod xml;

pub use builder::{Envelope, EnvelopeBuilder};
pub use command::{Command, Dialect};
pub use error::{EnvelopeError, Result};
pub use keys::{DecryptionKey, RecipientCertificate, SigningKey};
pub use params::ParameterSet;
pub use response::{interpret, InterpretOptions, InterpretedResponse};
