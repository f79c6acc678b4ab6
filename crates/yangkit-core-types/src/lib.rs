//! Core types shared across yangkit facilities
//!
//! This crate provides foundational types used by the error, logging and
//! RPC layers:
//!
//! - **Correlation types**: RequestId, RequestContext
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId};
