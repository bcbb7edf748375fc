//! Core abstractions shared by storefront workloads.
//!
//! This crate provides the fundamental request types:
//! - `RequestId` - Unique request identifier for log correlation
//! - `RequestContext` - Typed request parameters (method, path, query, headers, cookies, body)

mod context;

pub use context::*;
pub use http::Method;
