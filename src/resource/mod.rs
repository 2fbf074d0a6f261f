//! AWS resources declared by the stack
//!
//! Each type renders one template entry through `stackkit::Resource`:
//! - Function (compute unit) and its ServiceRole / DefaultPolicy
//! - FunctionUrl (invocation endpoint) and its public invoke permission
//! - Table (record store)

use serde_json::{Map, Value};

pub mod function;
pub mod function_url;
pub mod iam;
pub mod table;

pub use function::{Code, Function, Runtime};
pub use function_url::{AuthType, FunctionUrl};
pub use iam::{DefaultPolicy, PolicyStatement, ServiceRole};
pub use table::{Attribute, AttributeType, Table};

/// Unwrap a `json!({...})` literal into a properties map
pub(crate) fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
