//! # restwire
//!
//! **restwire** is a REST-style routing and dispatch engine multiplexed over a single
//! persistent bidirectional connection, built on the `may` coroutine runtime.
//!
//! ## Overview
//!
//! Instead of opening one HTTP connection per request, clients keep a single channel
//! open and send JSON-encoded (optionally base64-wrapped) envelopes carrying a URL, an
//! HTTP-like method, and an argument mapping. restwire resolves the URL against a
//! registered route table, invokes the matching handler, and returns the serialized
//! response through the same channel — one reply per request, in order.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`router`]** - URL pattern compilation, route registration, and first-match resolution
//! - **[`dispatcher`]** - Request extraction, middleware application, handler invocation,
//!   serializer negotiation, and error-to-response mapping
//! - **[`middleware`]** - Pre-dispatch request transforms applied in registration order
//! - **[`handler`]** - The dispatch target contract and a closure adapter
//! - **[`serializer`]** - Response content encoding (compact JSON by default)
//! - **[`server`]** - The transport boundary: envelope codec, message channel contract,
//!   per-connection serve loop, and a framed TCP server
//! - **[`error`]** - The failure taxonomy: recoverable API errors, setup-time
//!   registration errors, and transport decode errors
//!
//! ## Request Handling Flow
//!
//! 1. The transport channel delivers a discrete payload (optionally base64-wrapped)
//! 2. The envelope codec parses it into a [`dispatcher::Request`]
//! 3. The router resolves the normalized URL to a route, capturing path arguments
//! 4. Every middleware's `process_request` runs in registration order
//! 5. The handler negotiates a serializer and produces the response content
//! 6. Recognized API failures become a `{"details": ...}` body through the default
//!    JSON serializer; anything else terminates the connection
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use restwire::{Dispatcher, Router, handler_fn};
//! use restwire::server::WireServer;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut router = Router::new();
//! router.register(
//!     "user/profile/{user_name}",
//!     handler_fn(|_req, args| Ok(serde_json::json!({ "user": args[0] }))),
//!     ["GET"],
//!     Some("user-profile"),
//! )?;
//!
//! let dispatcher = Dispatcher::new(router);
//! let handle = WireServer::new(Arc::new(dispatcher)).start("0.0.0.0:9565")?;
//! # let _ = handle;
//! # Ok(())
//! # }
//! ```
//!
//! ## Runtime Considerations
//!
//! restwire uses the `may` coroutine runtime, not tokio or async-std. Each accepted
//! connection is served by one coroutine that handles one message at a time; a slow
//! handler blocks only its own connection. The route table is built before traffic
//! begins and is immutable while serving, so it is shared freely across connections.
//! Coroutine stack size is configurable via the `RESTWIRE_STACK_SIZE` environment
//! variable.

pub mod dispatcher;
pub mod echo;
pub mod error;
pub mod handler;
pub mod ids;
pub mod middleware;
pub mod router;
pub mod runtime_config;
pub mod serializer;
pub mod server;

pub use dispatcher::{Dispatcher, Request, Response};
pub use error::{ApiError, DecodeError, DispatchError, RegistrationError};
pub use handler::{handler_fn, Handler};
pub use middleware::Middleware;
pub use router::{Endpoint, EndpointSpec, PathArgs, Route, RouteMatch, Router};
pub use serializer::{JsonSerializer, Serializer};
