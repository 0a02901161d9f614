//! Settee Core - Fundamental types
//!
//! This crate provides the types used throughout settee:
//! - `ShellError`: recoverable, user-facing failures
//! - `JsonValue`: wrapper over a parsed JSON value
//! - `Response`: one HTTP response record
//! - `RingBuffer`: the fixed-capacity response history
//! - `Value`: runtime values produced by shell variables

mod error;
mod json;
mod response;
mod ring;
mod value;

pub use error::ShellError;
pub use json::{looks_like_json_doc, JsonValue};
pub use response::Response;
pub use ring::{RingBuffer, UninitializedAccess};
pub use value::Value;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{JsonValue, Response, RingBuffer, ShellError, Value};
}
