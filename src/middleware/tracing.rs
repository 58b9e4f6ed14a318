use tracing::debug;

use super::Middleware;
use crate::dispatcher::Request;
use crate::error::ApiError;

/// Logs every request entering the middleware chain, passes it through
/// unchanged.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn process_request(&self, request: Request) -> Result<Request, ApiError> {
        debug!(
            method = ?request.method(),
            url = ?request.url(),
            "Request entering middleware chain"
        );
        Ok(request)
    }
}
