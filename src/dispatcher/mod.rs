//! # Dispatcher Module
//!
//! Orchestrates one dispatch cycle: request extraction, route resolution,
//! middleware application, handler invocation, serializer negotiation, and
//! error-to-response mapping.
//!
//! ## Request Flow
//!
//! 1. The inbound request is logged (method, url, args)
//! 2. The URL is extracted and normalized; absence is a recoverable error
//! 3. The router resolves the URL to a route, capturing path arguments
//! 4. Middleware runs in registration order, threading the request through
//! 5. The handler negotiates a serializer and produces the response content
//! 6. Recognized API failures become `{"details": ...}` through the default
//!    serializer; anything else propagates to the connection layer
//!
//! `process_request` never fails for recoverable reasons - it always returns
//! a serialized payload for those. An `Err` from it means the connection
//! should be treated as broken.

mod core;

pub use core::{Dispatcher, Request, Response};
