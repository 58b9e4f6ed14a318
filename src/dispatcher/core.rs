use std::sync::Arc;

use http::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, error, info};

use crate::error::{ApiError, DispatchError};
use crate::middleware::Middleware;
use crate::router::Router;
use crate::serializer::{JsonSerializer, Serializer};

/// Structured request decoded from one inbound envelope.
///
/// Constructed fresh per payload by the transport adapter, threaded by value
/// through the middleware chain (each middleware may return the same instance
/// or a substitute), and dropped once the response is produced.
#[derive(Debug, Clone, Default)]
pub struct Request {
    url: Option<String>,
    method: Option<Method>,
    args: Map<String, Value>,
}

impl Request {
    /// Build a request for the given URL with no method and no arguments.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Request {
            url: Some(url.into()),
            method: None,
            args: Map::new(),
        }
    }

    /// Assemble a request from already-decoded envelope fields.
    #[must_use]
    pub fn from_parts(
        url: Option<String>,
        method: Option<Method>,
        args: Map<String, Value>,
    ) -> Self {
        Request { url, method, args }
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    #[must_use]
    pub fn with_arg(mut self, name: impl Into<String>, value: Value) -> Self {
        self.args.insert(name.into(), value);
        self
    }

    /// Raw URL as supplied by the caller, if any.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    #[must_use]
    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    /// Query/body arguments supplied by the caller.
    #[must_use]
    pub fn args(&self) -> &Map<String, Value> {
        &self.args
    }

    /// Look up a single argument by name.
    #[must_use]
    pub fn get_argument(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }

    /// Insert or replace an argument. Middleware uses this to attach context
    /// (e.g. an authentication marker) before the handler runs.
    pub fn set_argument(&mut self, name: impl Into<String>, value: Value) {
        self.args.insert(name.into(), value);
    }

    /// The caller's response-format hint, from the `format` argument.
    #[must_use]
    pub fn format_hint(&self) -> Option<String> {
        self.get_argument("format")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

/// Transient per-dispatch response envelope: the handler's content plus the
/// originating request, for serializers that need request context.
#[derive(Debug, Default)]
pub struct Response {
    /// Handler result, `Null` until a handler has run.
    pub content: Value,
    request: Option<Request>,
}

impl Response {
    #[must_use]
    pub fn new() -> Self {
        Response::default()
    }

    /// Associate the originating request with this response.
    pub fn attach_request(&mut self, request: Request) {
        self.request = Some(request);
    }

    #[must_use]
    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }
}

/// Orchestrates extraction, matching, middleware, handler invocation,
/// serializer selection, and error mapping for one request at a time.
///
/// Holds the route table immutably, so a single dispatcher is shared across
/// all connections once traffic begins.
pub struct Dispatcher {
    router: Router,
    middlewares: Vec<Arc<dyn Middleware>>,
    default_serializer: Arc<dyn Serializer>,
}

impl Dispatcher {
    /// Create a dispatcher over a finished route table.
    #[must_use]
    pub fn new(router: Router) -> Self {
        Dispatcher {
            router,
            middlewares: Vec::new(),
            default_serializer: Arc::new(JsonSerializer),
        }
    }

    /// Append a middleware to the chain. Middleware runs in the order it was
    /// added, each seeing the request exactly as the previous one returned it.
    pub fn add_middleware(&mut self, middleware: Arc<dyn Middleware>) {
        self.middlewares.push(middleware);
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Handle one request to completion, producing the serialized response
    /// payload.
    ///
    /// Recognized API failures never surface as `Err`: they are logged,
    /// converted to a `{"details": <message>}` body, and serialized through
    /// the default JSON serializer - never the handler's - so a broken
    /// serializer cannot cascade on an already-failing path. Anything outside
    /// the recognized taxonomy is returned as `Err` and is the connection
    /// layer's problem.
    pub fn process_request(&self, request: Request) -> anyhow::Result<Vec<u8>> {
        info!(
            method = ?request.method(),
            url = ?request.url(),
            args = ?request.args(),
            "Inbound request"
        );

        let mut response = Response::new();
        match self.run(request, &mut response) {
            Ok(serializer) => match serializer.serialize(&response.content) {
                Ok(payload) => Ok(payload),
                Err(err) => self.error_payload(&err),
            },
            Err(DispatchError::Api(err)) => self.error_payload(&err),
            Err(DispatchError::Internal(err)) => Err(err),
        }
    }

    /// The fallible stretch of a dispatch cycle. Returns the negotiated
    /// serializer on success; `response` carries the content.
    fn run(
        &self,
        mut request: Request,
        response: &mut Response,
    ) -> Result<Arc<dyn Serializer>, DispatchError> {
        let url = self.router.extract_url(&request)?;
        let matched = self.router.resolve(&url);

        // The chain runs whether or not a route matched; a middleware may
        // substitute the request wholesale.
        for middleware in &self.middlewares {
            request = middleware.process_request(request)?;
        }

        let Some(matched) = matched else {
            return Err(ApiError::HandlerNotFound { url }.into());
        };

        let format = request.format_hint();
        let handler = matched.route.handler();
        let serializer = handler.serializer(format.as_deref(), &matched.path_args);
        debug!(
            pattern = %matched.route.pattern(),
            format = serializer.format(),
            "Serializer negotiated"
        );

        response.content = handler.dispatch(&request, &matched.path_args)?;
        response.attach_request(request);
        Ok(serializer)
    }

    fn error_payload(&self, err: &ApiError) -> anyhow::Result<Vec<u8>> {
        error!(error = %err, "Request failed, recovered into error body");
        let body = json!({ "details": err.detail() });
        self.default_serializer
            .serialize(&body)
            .map_err(|err| anyhow::anyhow!("default serializer failed on error body: {err}"))
    }
}
