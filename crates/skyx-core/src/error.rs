//! Error types for the TheSkyX client.
//!
//! `SkyxError` is the single error type returned by the transport, the reply
//! parsers and the device wrappers. The host application has no structured
//! error channel, so most variants are produced by inspecting reply text.
//!
//! ## Error Categories
//!
//! 1. **Transport** - `ConnectionFailure`, `ResponseUnterminated`
//!    - The socket could not be opened, written or read, or the reply was cut
//!      off by the bounded read.
//!    - Never retried internally.
//!
//! 2. **Host replies** - `TargetNotFound`, `UnexpectedValue`, `SetValueRejected`
//!    - The host answered, but not with what the call expected.
//!
//! 3. **Caller input** - `InvalidConfiguration`
//!    - Rejected before any network round trip.

use thiserror::Error;

/// Convenience alias for results using the client error type.
pub type AppResult<T> = std::result::Result<T, SkyxError>;

/// Primary error type for TheSkyX communication.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkyxError {
    /// Socket-level failure: refused, reset, DNS, or a connect/read/write timeout.
    ///
    /// `endpoint` is the `host:port` that was in effect for the failed call.
    #[error("Connection to {endpoint} failed: {cause}")]
    ConnectionFailure {
        /// Endpoint in effect when the call failed
        endpoint: String,
        /// Underlying system error text
        cause: String,
    },

    /// The host application could not resolve a named object.
    #[error("Object not found: {0}")]
    TargetNotFound(String),

    /// A reply did not match the literal or type the call expected.
    #[error("Unexpected value for {context}: {value:?}")]
    UnexpectedValue {
        /// What was being read (property name, status check, ...)
        context: String,
        /// Raw text that failed to match
        value: String,
    },

    /// A property set was read back with a different value.
    ///
    /// The host clamps or ignores out-of-range values silently, so the
    /// read-back comparison is the only way to notice.
    #[error("Setting {property} to {requested} was rejected, host reports {observed}")]
    SetValueRejected {
        /// Property being written
        property: String,
        /// Value the caller asked for
        requested: String,
        /// Value the host reported after the write
        observed: String,
    },

    /// Caller supplied a value outside the accepted set; no request was sent.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The reply carried no `|` terminator.
    ///
    /// Replies are read with a single bounded read. A missing terminator means
    /// the reply was truncated or the host answered in an unknown format.
    #[error("Reply of {bytes} bytes has no terminator (read limit {limit} bytes)")]
    ResponseUnterminated {
        /// Bytes actually received
        bytes: usize,
        /// Configured read bound
        limit: usize,
    },
}

impl SkyxError {
    /// Build an [`SkyxError::UnexpectedValue`].
    pub fn unexpected(context: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnexpectedValue {
            context: context.into(),
            value: value.into(),
        }
    }

    /// Build an [`SkyxError::SetValueRejected`].
    pub fn rejected(
        property: impl Into<String>,
        requested: impl ToString,
        observed: impl ToString,
    ) -> Self {
        Self::SetValueRejected {
            property: property.into(),
            requested: requested.to_string(),
            observed: observed.to_string(),
        }
    }

    /// Whether the error came from the socket rather than from reply content.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailure { .. } | Self::ResponseUnterminated { .. }
        )
    }
}
