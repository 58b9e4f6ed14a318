use crate::dispatcher::Request;
use crate::error::ApiError;

/// A pre-dispatch request transform.
pub trait Middleware: Send + Sync {
    /// Transform the inbound request, returning the instance the next
    /// middleware (and ultimately the handler) will see.
    ///
    /// Errors join the recoverable taxonomy: the dispatcher converts them to
    /// an error body and the connection stays open.
    fn process_request(&self, request: Request) -> Result<Request, ApiError>;
}
