use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use crate::dispatcher::Request;
use crate::error::{ApiError, RegistrationError};
use crate::handler::Handler;

/// Maximum number of captured path arguments before heap allocation.
/// Most REST-style patterns have well under 8 parameter segments.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Positional path arguments captured by a matched pattern, in declaration
/// order. Stack-allocated for patterns with up to [`MAX_INLINE_PARAMS`]
/// parameters.
pub type PathArgs = SmallVec<[String; MAX_INLINE_PARAMS]>;

/// One compiled URL pattern bound to a handler, an allowed-method set, and an
/// optional name.
///
/// The stored pattern is always normalized (trimmed, trailing-slash
/// terminated) and matching is performed only against normalized URLs.
pub struct Route {
    pattern: String,
    regex: Regex,
    param_names: Vec<String>,
    handler: Arc<dyn Handler>,
    methods: Vec<Method>,
    name: Option<String>,
}

impl Route {
    fn compile(
        pattern: String,
        handler: Arc<dyn Handler>,
        methods: Vec<Method>,
        name: Option<String>,
    ) -> Result<Self, RegistrationError> {
        let (regex, param_names) = pattern_to_regex(&pattern)?;
        Ok(Route {
            pattern,
            regex,
            param_names,
            handler,
            methods,
            name,
        })
    }

    /// Normalized path template this route was registered under.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Endpoint name, if one was given at registration.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Methods the endpoint accepts. Resolution itself is structural on the
    /// URL; the allowed-method set is carried for the handler's use.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Parameter names in declaration order. Diagnostic only: argument
    /// binding is positional.
    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    #[must_use]
    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// Structural match against a normalized URL: equal segment count, literal
    /// segments equal, parameter segments capture. Returns the captured values
    /// in declaration order.
    fn matches(&self, url: &str) -> Option<PathArgs> {
        let caps = self.regex.captures(url)?;
        let mut args = PathArgs::new();
        for i in 1..caps.len() {
            if let Some(m) = caps.get(i) {
                args.push(m.as_str().to_string());
            }
        }
        Some(args)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("methods", &self.methods)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Result of successfully resolving a URL against the route table.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route (shared with the table, cheap to clone).
    pub route: Arc<Route>,
    /// Captured path arguments in declaration order.
    pub path_args: PathArgs,
}

/// Descriptor bundling everything a registration call needs. Produced by
/// [`Endpoint`] implementations for `register_endpoint`.
pub struct EndpointSpec {
    pub path: String,
    pub handler: Arc<dyn Handler>,
    pub methods: Vec<Method>,
    pub name: Option<String>,
}

/// A self-describing endpoint that can hand the router its own registration
/// arguments.
pub trait Endpoint {
    fn endpoint(&self) -> EndpointSpec;
}

/// Conversion from the method-argument forms accepted by [`Router::register`]:
/// a single token, a list of tokens, or already-parsed [`Method`]s.
pub trait MethodSet {
    fn into_methods(self) -> Result<Vec<Method>, RegistrationError>;
}

fn parse_method(token: &str) -> Result<Method, RegistrationError> {
    let token = token.trim();
    Method::from_bytes(token.to_ascii_uppercase().as_bytes()).map_err(|_| {
        RegistrationError::InvalidMethod {
            token: token.to_string(),
        }
    })
}

impl MethodSet for &str {
    fn into_methods(self) -> Result<Vec<Method>, RegistrationError> {
        Ok(vec![parse_method(self)?])
    }
}

impl MethodSet for Method {
    fn into_methods(self) -> Result<Vec<Method>, RegistrationError> {
        Ok(vec![self])
    }
}

impl MethodSet for &[&str] {
    fn into_methods(self) -> Result<Vec<Method>, RegistrationError> {
        if self.is_empty() {
            return Err(RegistrationError::EmptyMethods);
        }
        self.iter().map(|token| parse_method(token)).collect()
    }
}

impl<const N: usize> MethodSet for [&str; N] {
    fn into_methods(self) -> Result<Vec<Method>, RegistrationError> {
        self.as_slice().into_methods()
    }
}

impl MethodSet for Vec<Method> {
    fn into_methods(self) -> Result<Vec<Method>, RegistrationError> {
        if self.is_empty() {
            return Err(RegistrationError::EmptyMethods);
        }
        Ok(self)
    }
}

/// Ordered route table with a unique-name index.
///
/// Built before traffic begins (`register` and `include` take `&mut self`),
/// then held immutably by the dispatcher for the lifetime of the service -
/// resolution takes `&self`, so a frozen table is safe to share across
/// connections.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Arc<Route>>,
    named: HashMap<String, Arc<Route>>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Router::default()
    }

    /// Add a new endpoint to the route table.
    ///
    /// The path is normalized (trimmed, trailing slash enforced) and compiled;
    /// `methods` accepts a single token (`"GET"`), a list of tokens
    /// (`["GET", "PUT"]`), or parsed [`Method`]s. A duplicate `name` is
    /// rejected without touching the table - there is no partial insert and
    /// no overwrite.
    pub fn register<M: MethodSet>(
        &mut self,
        path: &str,
        handler: Arc<dyn Handler>,
        methods: M,
        name: Option<&str>,
    ) -> Result<(), RegistrationError> {
        let pattern = normalize_path(path);
        let methods = methods.into_methods()?;
        let route = Route::compile(pattern, handler, methods, name.map(str::to_string))?;
        self.insert(Arc::new(route))
    }

    /// Add an endpoint from a self-describing descriptor.
    pub fn register_endpoint(&mut self, endpoint: &dyn Endpoint) -> Result<(), RegistrationError> {
        let EndpointSpec {
            path,
            handler,
            methods,
            name,
        } = endpoint.endpoint();
        self.register(&path, handler, methods, name.as_deref())
    }

    fn insert(&mut self, route: Arc<Route>) -> Result<(), RegistrationError> {
        if let Some(name) = route.name() {
            if let Some(existing) = self.named.get(name) {
                return Err(RegistrationError::DuplicateName {
                    name: name.to_string(),
                    pattern: existing.pattern().to_string(),
                });
            }
            self.named.insert(name.to_string(), route.clone());
        }
        info!(
            pattern = %route.pattern(),
            methods = ?route.methods(),
            name = ?route.name(),
            "Route registered"
        );
        self.routes.push(route);
        Ok(())
    }

    /// Append all of `other`'s routes behind this table's and merge its name
    /// index.
    ///
    /// `other`'s routes keep their relative order but are evaluated only after
    /// every pre-existing route. Name collisions during a merge are
    /// last-write-wins (the incoming route takes the name), unlike direct
    /// registration, which is first-write-wins.
    pub fn include(&mut self, other: Router) {
        for (name, route) in other.named {
            self.named.insert(name, route);
        }
        self.routes.extend(other.routes);
    }

    /// Resolve a normalized URL to the first structurally matching route.
    ///
    /// Routes are tested in registration order; the first match wins
    /// regardless of specificity. Returns `None` when the table is exhausted.
    #[must_use]
    pub fn resolve(&self, url: &str) -> Option<RouteMatch> {
        for route in &self.routes {
            if let Some(path_args) = route.matches(url) {
                debug!(
                    url = %url,
                    pattern = %route.pattern(),
                    path_args = ?path_args,
                    "Route matched"
                );
                return Some(RouteMatch {
                    route: route.clone(),
                    path_args,
                });
            }
        }
        warn!(url = %url, "No route matched");
        None
    }

    /// Pull the URL out of a request and normalize it.
    pub fn extract_url(&self, request: &Request) -> Result<String, ApiError> {
        match request.url() {
            Some(url) if !url.trim().is_empty() => Ok(normalize_path(url)),
            _ => Err(ApiError::UrlNotSpecified),
        }
    }

    /// Look up a route by its registered name.
    #[must_use]
    pub fn route_named(&self, name: &str) -> Option<&Arc<Route>> {
        self.named.get(name)
    }

    /// Number of registered routes (named and unnamed).
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Convert a path to its normalized form: surrounding whitespace trimmed and
/// a trailing `/` enforced. An empty path normalizes to `/`.
pub(crate) fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// Compile a normalized path template into an anchored regex plus the
/// parameter names in declaration order.
///
/// Literal segments are escaped verbatim; `{name}` segments become `([^/]+)`
/// capture groups. Segment structure is preserved exactly, so a pattern and a
/// URL only match with equal segment counts.
pub(crate) fn pattern_to_regex(
    pattern: &str,
) -> Result<(Regex, Vec<String>), RegistrationError> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    let mut param_names = Vec::new();

    for (i, segment) in pattern.split('/').enumerate() {
        if i > 0 {
            expr.push('/');
        }
        if segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}') {
            param_names.push(segment[1..segment.len() - 1].to_string());
            expr.push_str("([^/]+)");
        } else {
            expr.push_str(&regex::escape(segment));
        }
    }
    expr.push('$');

    let regex = Regex::new(&expr).map_err(|err| RegistrationError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: err.to_string(),
    })?;
    Ok((regex, param_names))
}
