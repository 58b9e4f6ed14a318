use serde_json::Value;

use super::Middleware;
use crate::dispatcher::Request;
use crate::error::ApiError;

/// Shared-token authentication.
///
/// Compares the request's `token` argument against the configured secret. On
/// success the request is substituted with one carrying an
/// `authenticated: true` argument for downstream handlers; on failure the
/// request is rejected with an unauthorized error body.
pub struct AuthMiddleware {
    token: String,
}

impl AuthMiddleware {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl Middleware for AuthMiddleware {
    fn process_request(&self, mut request: Request) -> Result<Request, ApiError> {
        let supplied = request
            .get_argument("token")
            .and_then(Value::as_str)
            .map(str::to_string);
        match supplied.as_deref() {
            Some(token) if token == self.token => {
                request.set_argument("authenticated", Value::Bool(true));
                Ok(request)
            }
            Some(_) => Err(ApiError::Unauthorized {
                detail: "invalid token".to_string(),
            }),
            None => Err(ApiError::Unauthorized {
                detail: "token argument is required".to_string(),
            }),
        }
    }
}
