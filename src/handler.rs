//! The dispatch target contract.

use std::sync::Arc;

use serde_json::Value;

use crate::dispatcher::Request;
use crate::error::DispatchError;
use crate::router::PathArgs;
use crate::serializer::{negotiate, Serializer};

/// A dispatch target bound to one or more routes.
///
/// Path arguments are positional: values captured by `{name}` segments arrive
/// in declaration order, without their names. Handlers that care about a
/// parameter rely on its position in the pattern.
pub trait Handler: Send + Sync {
    /// Produce the response content for one request.
    ///
    /// Return [`DispatchError::Api`] for recognized failures (they become a
    /// `{"details": ...}` body and the connection stays open) and
    /// [`DispatchError::Internal`] for anything unexpected (it terminates the
    /// connection).
    fn dispatch(&self, request: &Request, args: &PathArgs) -> Result<Value, DispatchError>;

    /// Choose a serializer for the response given the request's format hint.
    ///
    /// The default negotiates from the hint alone; override to pin a format or
    /// to vary it by path arguments.
    fn serializer(&self, format: Option<&str>, _args: &PathArgs) -> Arc<dyn Serializer> {
        negotiate(format)
    }
}

struct FnHandler<F>(F);

impl<F> Handler for FnHandler<F>
where
    F: Fn(&Request, &PathArgs) -> Result<Value, DispatchError> + Send + Sync,
{
    fn dispatch(&self, request: &Request, args: &PathArgs) -> Result<Value, DispatchError> {
        (self.0)(request, args)
    }
}

/// Adapt a closure into a [`Handler`] with default serializer negotiation.
pub fn handler_fn<F>(f: F) -> Arc<dyn Handler>
where
    F: Fn(&Request, &PathArgs) -> Result<Value, DispatchError> + Send + Sync + 'static,
{
    Arc::new(FnHandler(f))
}
