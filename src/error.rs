//! Failure taxonomy for registration, dispatch, and the transport boundary.
//!
//! Three families with different propagation rules:
//!
//! - [`ApiError`] - recognized request-time failures. Recovered inside
//!   `Dispatcher::process_request` and turned into a `{"details": ...}` body;
//!   the connection stays open.
//! - [`RegistrationError`] - configuration mistakes surfaced while the route
//!   table is being built. Expected to abort startup.
//! - [`DecodeError`] - a payload the transport adapter could not turn into a
//!   request. Connection-fatal.
//!
//! [`DispatchError`] is the return channel for handlers and middleware: its
//! `Api` variant joins the recoverable taxonomy, its `Internal` variant
//! escapes the dispatcher and terminates the connection.

use std::fmt;

/// Recognized API-level failure raised while a single request is dispatched.
///
/// Every variant is recoverable at the dispatcher boundary: it is logged,
/// serialized as `{"details": <message>}` through the default JSON serializer,
/// and returned to the client as a normal response payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The inbound envelope carried no `url` field (or a blank one).
    UrlNotSpecified,
    /// The URL matched no registered route.
    HandlerNotFound {
        /// The normalized URL that failed to resolve.
        url: String,
    },
    /// Authentication or authorization failure raised by a middleware.
    Unauthorized { detail: String },
    /// Argument or payload validation failure.
    Validation { detail: String },
    /// Response content could not be serialized in the negotiated format.
    Serialization { detail: String },
    /// Recognized failure reported by a handler's business logic.
    Handler { detail: String },
}

impl ApiError {
    /// Human-readable message used as the `details` field of error bodies.
    #[must_use]
    pub fn detail(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::UrlNotSpecified => {
                write!(f, "url is not specified for the request")
            }
            ApiError::HandlerNotFound { url } => {
                write!(f, "handler not found for url `{url}`")
            }
            ApiError::Unauthorized { detail } => write!(f, "unauthorized: {detail}"),
            ApiError::Validation { detail } => write!(f, "validation failed: {detail}"),
            ApiError::Serialization { detail } => write!(f, "serialization failed: {detail}"),
            ApiError::Handler { detail } => write!(f, "{detail}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Configuration mistake caught while registering routes.
///
/// Registration never partially applies: when any variant is returned the
/// router is exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The endpoint name is already taken by another route.
    DuplicateName {
        name: String,
        /// Pattern of the route that already owns the name.
        pattern: String,
    },
    /// The allowed-method set was empty.
    EmptyMethods,
    /// A method token could not be parsed (e.g. embedded whitespace).
    InvalidMethod { token: String },
    /// The path template did not compile into a matchable pattern.
    InvalidPattern { pattern: String, reason: String },
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::DuplicateName { name, pattern } => {
                write!(
                    f,
                    "duplicate endpoint name `{name}`, already handled by `{pattern}`"
                )
            }
            RegistrationError::EmptyMethods => {
                write!(f, "endpoint requires at least one allowed method")
            }
            RegistrationError::InvalidMethod { token } => {
                write!(f, "invalid method token `{token}`")
            }
            RegistrationError::InvalidPattern { pattern, reason } => {
                write!(f, "invalid route pattern `{pattern}`: {reason}")
            }
        }
    }
}

impl std::error::Error for RegistrationError {}

/// A raw payload the transport adapter could not decode into a request.
///
/// Decoding failures happen before the dispatcher is involved, so there is no
/// request to answer; the connection is terminated instead.
#[derive(Debug)]
pub enum DecodeError {
    /// The binary flag was set but the payload was not valid base64.
    Base64(base64::DecodeError),
    /// The payload was not a valid UTF-8 JSON envelope.
    Json(serde_json::Error),
    /// The envelope's method field was not a valid method token.
    Method { token: String },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Base64(err) => write!(f, "invalid base64 payload: {err}"),
            DecodeError::Json(err) => write!(f, "invalid request envelope: {err}"),
            DecodeError::Method { token } => write!(f, "invalid method token `{token}`"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Base64(err) => Some(err),
            DecodeError::Json(err) => Some(err),
            DecodeError::Method { .. } => None,
        }
    }
}

impl From<base64::DecodeError> for DecodeError {
    fn from(err: base64::DecodeError) -> Self {
        DecodeError::Base64(err)
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Json(err)
    }
}

/// Failure channel for handlers and middleware.
///
/// `Api` failures are recovered by the dispatcher into an error body.
/// `Internal` failures are unexpected conditions outside the recognized
/// taxonomy; they propagate out of `process_request` and the enclosing
/// connection layer decides what to do (in practice: log and terminate).
#[derive(Debug)]
pub enum DispatchError {
    /// Recognized, recoverable API failure.
    Api(ApiError),
    /// Unexpected failure; propagates to the transport adapter.
    Internal(anyhow::Error),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Api(err) => write!(f, "{err}"),
            DispatchError::Internal(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Api(err) => Some(err),
            DispatchError::Internal(err) => Some(err.as_ref()),
        }
    }
}

impl From<ApiError> for DispatchError {
    fn from(err: ApiError) -> Self {
        DispatchError::Api(err)
    }
}

impl From<anyhow::Error> for DispatchError {
    fn from(err: anyhow::Error) -> Self {
        DispatchError::Internal(err)
    }
}
