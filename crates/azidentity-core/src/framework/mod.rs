//! Host protocol types
//!
//! Diagnostics, attribute schemas and the contracts ephemeral resources and functions
//! implement. Configuration and results travel as `serde_json::Value` objects keyed by
//! attribute name.

mod diagnostics;
mod schema;
mod resource;
mod function;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use schema::{Attribute, AttributeKind, AttributeMode, Schema};
pub use resource::{decode_config, encode_result, EphemeralResource, OpenResponse};
pub use function::{Function, FunctionDefinition, FunctionError, FunctionResult, Parameter};
