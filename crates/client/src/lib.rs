//! # BankLink Client Library
//!
//! Thin orchestration over the [`envelope`] crate: one [`Client`] drives a
//! complete build-and-send cycle — template selection, assembly, signing,
//! encryption, transport exchange, and response interpretation — against a
//! caller-supplied [`Transport`] capability.
//!
//! The transport is an explicit argument rather than process-wide
//! registration: tests and applications pass whatever implementation they
//! need, and nothing in the cycle touches global state.
//!
//! ## Example Usage
//!
//! ```rust
//! use client::{Client, CryptoMaterial};
//! use envelope::params::field;
//! use envelope::{testkit, Command, Dialect, ParameterSet, SigningKey};
//!
//! let material = testkit::generate_key_material();
//! let signing_key =
//!     SigningKey::from_pem(&material.private_key_pem, &material.certificate_pem).unwrap();
//!
//! let params = ParameterSet::new()
//!     .with(field::CUSTOMER_ID, "11111111")
//!     .with(field::ENVIRONMENT, "TEST");
//! let client = Client::new(Command::GetUserInfo, Dialect::FileService, params);
//!
//! let material = CryptoMaterial {
//!     signing_key: Some(&signing_key),
//!     ..Default::default()
//! };
//! let envelope = client.build(&material).unwrap();
//! assert!(envelope.to_xml().contains("Signature"));
//! ```
//!
//! ## Modules
//!
//! - [`client`]: the cycle driver and its [`Phase`] machine
//! - [`transport`]: the transport capability trait
//! - [`error`]: error types

pub mod client;
pub mod error;
pub mod transport;

pub use client::{Client, CryptoMaterial, Phase};
pub use error::{ClientError, Result, TransportError};
pub use transport::Transport;
