//! The transport capability.
//!
//! The client never opens connections itself; the caller passes an
//! implementation of [`Transport`] into [`Client::send`](crate::Client::send).
//! Retry and timeout policy belong to the implementation, not to the
//! envelope pipeline.

use envelope::Dialect;

use crate::error::TransportError;

/// Carries a finished request envelope to the bank and returns the raw
/// response document.
pub trait Transport {
    /// Performs one request/response exchange for the given dialect.
    fn exchange(&self, dialect: Dialect, request: &str) -> Result<String, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn exchange(&self, dialect: Dialect, request: &str) -> Result<String, TransportError> {
        (**self).exchange(dialect, request)
    }
}
