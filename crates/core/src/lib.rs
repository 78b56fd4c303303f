//! Core types for the cinder client protocol.
//!
//! This crate holds everything the protocol layers agree on without depending
//! on each other:
//! - [`Value`] / [`JsonValue`]: decoded domain values stored in regions
//! - [`ErrorCode`] / [`ErrorResponse`]: the wire-stable failure classification
//! - [`Cache`], [`Region`], [`Locator`]: the backing resources a request runs against

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod error;
pub mod json;
pub mod value;

pub use cache::{Cache, Locator, Region, ServerLocation};
pub use error::{
    ErrorCode, ErrorResponse, InvalidExecutionContext, OperationResult, RegionError,
};
pub use json::JsonValue;
pub use value::Value;
