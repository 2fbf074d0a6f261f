//! Resource trait for provisioning plans
//!
//! A Resource is one entry in the rendered template: a type, a logical id,
//! and the properties the provider needs to create it.

use crate::assets::AssetSource;
use crate::context::RenderContext;
use crate::error::Result;
use crate::id::LogicalId;
use crate::types::RemovalPolicy;
use serde_json::{Map, Value};
use std::fmt;

/// Core trait for declared resources
///
/// # Example
///
/// ```ignore
/// use stackkit::{LogicalId, RenderContext, Resource};
/// use serde_json::{Map, Value, json};
///
/// #[derive(Debug)]
/// struct Topic { id: LogicalId, name: String }
///
/// impl Resource for Topic {
///     fn logical_id(&self) -> &LogicalId { &self.id }
///     fn resource_type(&self) -> &'static str { "AWS::SNS::Topic" }
///     fn description(&self) -> String { format!("Topic {}", self.name) }
///
///     fn properties(&self, _ctx: &RenderContext) -> stackkit::Result<Map<String, Value>> {
///         let mut props = Map::new();
///         props.insert("TopicName".into(), json!(self.name));
///         Ok(props)
///     }
/// }
/// ```
pub trait Resource: Send + Sync + fmt::Debug {
    /// Template key for this resource
    fn logical_id(&self) -> &LogicalId;

    /// Provider type name, e.g. "AWS::DynamoDB::Table"
    fn resource_type(&self) -> &'static str;

    /// Human-readable description for listings
    fn description(&self) -> String;

    /// Render the `Properties` block
    ///
    /// Fails only when the render context lacks something the resource
    /// needs, such as a staged asset.
    fn properties(&self, ctx: &RenderContext) -> Result<Map<String, Value>>;

    /// Deletion behavior on stack teardown; provider default when `None`
    fn removal_policy(&self) -> Option<RemovalPolicy> {
        None
    }

    /// Resources that must exist before this one is created
    fn depends_on(&self) -> Vec<LogicalId> {
        Vec::new()
    }

    /// Local artifacts that must be staged before rendering
    fn assets(&self) -> Vec<&AssetSource> {
        Vec::new()
    }
}

/// A boxed resource for type-erased storage
pub type BoxedResource = Box<dyn Resource>;
