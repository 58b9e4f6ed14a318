//! # Router Module
//!
//! Path matching and route resolution. URL templates (e.g.
//! `user/profile/{user_name}`) are compiled into anchored regex patterns at
//! registration time; incoming URLs are tested against the compiled patterns
//! in registration order until one matches.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Normalizing and compiling path templates into matchable patterns
//! - Enforcing endpoint-name uniqueness at registration time
//! - Resolving inbound URLs to routes, capturing path arguments
//! - Merging route tables (`include`) while preserving match priority
//!
//! Registration order is authority: there is no specificity ranking, the first
//! structurally matching route wins. Register more specific patterns first.

mod core;

pub use core::{
    Endpoint, EndpointSpec, MethodSet, PathArgs, Route, RouteMatch, Router, MAX_INLINE_PARAMS,
};
