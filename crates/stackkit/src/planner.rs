//! Provisioning plan - the declared resources and outputs of one stack

use crate::assets::AssetSource;
use crate::context::RenderContext;
use crate::error::{Error, Result};
use crate::id::{ConstructPath, LogicalId};
use crate::resource::{BoxedResource, Resource};
use crate::template::{Template, TemplateOutput, TemplateResource};
use serde_json::Value;
use std::collections::BTreeSet;

/// A named stack output
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedOutput {
    /// Template key, derived from the name
    pub id: LogicalId,
    /// Name as declared, e.g. "Lambda URL"
    pub name: String,
    /// Value, usually an intrinsic
    pub value: Value,
    pub description: Option<String>,
}

/// Resources and outputs submitted together as one provisioning unit
#[derive(Debug, Default)]
pub struct ProvisioningPlan {
    /// Template description
    pub description: Option<String>,
    resources: Vec<BoxedResource>,
    outputs: Vec<PlannedOutput>,
}

impl ProvisioningPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the template description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a resource, rejecting a logical id that is already taken
    pub fn add_resource(&mut self, resource: BoxedResource) -> Result<()> {
        if self.get(resource.logical_id()).is_some() {
            return Err(Error::DuplicateLogicalId(resource.logical_id().to_string()));
        }
        log::debug!(
            "Declared {} ({})",
            resource.logical_id(),
            resource.resource_type()
        );
        self.resources.push(resource);
        Ok(())
    }

    /// Add a named output
    ///
    /// The template key is derived from the name; names that collapse to the
    /// same key are rejected.
    pub fn add_output(&mut self, name: &str, value: impl Into<Value>) -> Result<LogicalId> {
        let id = ConstructPath::root(name).logical_id();
        if self.outputs.iter().any(|o| o.id == id) {
            return Err(Error::DuplicateLogicalId(id.to_string()));
        }
        self.outputs.push(PlannedOutput {
            id: id.clone(),
            name: name.to_string(),
            value: value.into(),
            description: None,
        });
        Ok(id)
    }

    /// Declared resources in declaration order
    pub fn resources(&self) -> &[BoxedResource] {
        &self.resources
    }

    /// Declared outputs in declaration order
    pub fn outputs(&self) -> &[PlannedOutput] {
        &self.outputs
    }

    /// Find a resource by logical id
    pub fn get(&self, id: &LogicalId) -> Option<&dyn Resource> {
        self.resources
            .iter()
            .find(|r| r.logical_id() == id)
            .map(|r| r.as_ref())
    }

    /// Number of resources of a given provider type
    pub fn count_of_type(&self, resource_type: &str) -> usize {
        self.resources
            .iter()
            .filter(|r| r.resource_type() == resource_type)
            .count()
    }

    /// Distinct assets referenced by the plan
    pub fn assets(&self) -> Vec<&AssetSource> {
        let unique: BTreeSet<&AssetSource> =
            self.resources.iter().flat_map(|r| r.assets()).collect();
        unique.into_iter().collect()
    }

    /// Filter plan to only include resources matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&dyn Resource) -> bool,
    {
        Self {
            description: self.description,
            resources: self
                .resources
                .into_iter()
                .filter(|r| predicate(r.as_ref()))
                .collect(),
            outputs: self.outputs,
        }
    }

    /// Filter plan to only include resources matching a target pattern
    ///
    /// Target format: "type" or "type.name"
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (resource_type, name) = parse_target(t);
                self.filter(|r| matches_filter(r, resource_type.as_deref(), name.as_deref()))
            }
        }
    }

    /// Total number of resources in the plan
    pub fn total_resources(&self) -> usize {
        self.resources.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Render the plan into a template
    pub fn render(&self, ctx: &RenderContext) -> Result<Template> {
        let mut template = Template {
            description: self.description.clone(),
            ..Default::default()
        };

        for resource in &self.resources {
            let policy = resource
                .removal_policy()
                .map(|p| p.policy_value().to_string());
            let mut depends_on: Vec<String> = resource
                .depends_on()
                .iter()
                .map(ToString::to_string)
                .collect();
            depends_on.sort();
            depends_on.dedup();

            template.resources.insert(
                resource.logical_id().to_string(),
                TemplateResource {
                    resource_type: resource.resource_type().to_string(),
                    properties: resource.properties(ctx)?,
                    depends_on,
                    deletion_policy: policy.clone(),
                    update_replace_policy: policy,
                },
            );
        }

        for output in &self.outputs {
            template.outputs.insert(
                output.id.to_string(),
                TemplateOutput {
                    value: output.value.clone(),
                    description: output.description.clone(),
                },
            );
        }

        Ok(template)
    }
}

/// Parse a target string like "type.name" into (type, name)
fn parse_target(target: &str) -> (Option<String>, Option<String>) {
    let parts: Vec<&str> = target.split('.').collect();
    match parts.len() {
        1 => (Some(parts[0].to_string()), None),
        2 => (Some(parts[0].to_string()), Some(parts[1].to_string())),
        _ => (None, Some(target.to_string())),
    }
}

/// Check if a resource matches the filter criteria
fn matches_filter(
    resource: &dyn Resource,
    resource_type: Option<&str>,
    name: Option<&str>,
) -> bool {
    if let Some(rt) = resource_type {
        let actual = resource.resource_type();
        // Allow common aliases
        let matches_type = match rt {
            "functions" => actual == "AWS::Lambda::Function",
            "urls" => actual == "AWS::Lambda::Url",
            "tables" => actual == "AWS::DynamoDB::Table",
            "iam" => actual.starts_with("AWS::IAM::"),
            "lambda" => actual.starts_with("AWS::Lambda::"),
            _ => actual.eq_ignore_ascii_case(rt),
        };
        if !matches_type {
            return false;
        }
    }

    if let Some(n) = name
        && !resource.logical_id().as_str().contains(n)
    {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetManifest;
    use crate::context::StackContext;
    use crate::types::{Intrinsic, RemovalPolicy};
    use serde_json::{Map, json};

    #[derive(Debug)]
    struct Fake {
        id: LogicalId,
        resource_type: &'static str,
        depends_on: Vec<LogicalId>,
        removal: Option<RemovalPolicy>,
    }

    impl Fake {
        fn boxed(id: &str, resource_type: &'static str) -> BoxedResource {
            Box::new(Self {
                id: LogicalId::new(id).unwrap(),
                resource_type,
                depends_on: Vec::new(),
                removal: None,
            })
        }
    }

    impl Resource for Fake {
        fn logical_id(&self) -> &LogicalId {
            &self.id
        }
        fn resource_type(&self) -> &'static str {
            self.resource_type
        }
        fn description(&self) -> String {
            format!("Fake {}", self.id)
        }
        fn properties(&self, _ctx: &RenderContext) -> Result<Map<String, Value>> {
            let mut props = Map::new();
            props.insert("Name".to_string(), json!(self.id.as_str()));
            Ok(props)
        }
        fn removal_policy(&self) -> Option<RemovalPolicy> {
            self.removal
        }
        fn depends_on(&self) -> Vec<LogicalId> {
            self.depends_on.clone()
        }
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("tables"), (Some("tables".to_string()), None));
        assert_eq!(
            parse_target("tables.Emails"),
            (Some("tables".to_string()), Some("Emails".to_string()))
        );
        assert_eq!(parse_target("a.b.c"), (None, Some("a.b.c".to_string())));
    }

    #[test]
    fn test_duplicate_resource_rejected() {
        let mut plan = ProvisioningPlan::new();
        plan.add_resource(Fake::boxed("Table", "AWS::DynamoDB::Table"))
            .unwrap();
        let err = plan
            .add_resource(Fake::boxed("Table", "AWS::DynamoDB::Table"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateLogicalId(id) if id == "Table"));
    }

    #[test]
    fn test_duplicate_output_rejected() {
        let mut plan = ProvisioningPlan::new();
        let id = plan.add_output("Lambda URL", json!("x")).unwrap();
        assert_eq!(id.as_str(), "LambdaURL");
        assert!(plan.add_output("Lambda-URL", json!("y")).is_err());
    }

    #[test]
    fn test_filter_by_alias() {
        let mut plan = ProvisioningPlan::new();
        plan.add_resource(Fake::boxed("EmailsTable", "AWS::DynamoDB::Table"))
            .unwrap();
        plan.add_resource(Fake::boxed("Handler", "AWS::Lambda::Function"))
            .unwrap();
        plan.add_resource(Fake::boxed("HandlerRole", "AWS::IAM::Role"))
            .unwrap();

        let tables = plan.filter_by_target(Some("tables"));
        assert_eq!(tables.total_resources(), 1);
        assert_eq!(tables.resources()[0].logical_id().as_str(), "EmailsTable");
    }

    #[test]
    fn test_filter_by_type_name() {
        let mut plan = ProvisioningPlan::new();
        plan.add_resource(Fake::boxed("HandlerRole", "AWS::IAM::Role"))
            .unwrap();
        plan.add_resource(Fake::boxed("OtherRole", "AWS::IAM::Role"))
            .unwrap();

        let filtered = plan.filter_by_target(Some("iam.Handler"));
        assert_eq!(filtered.total_resources(), 1);
    }

    #[test]
    fn test_render_policies_and_dependencies() {
        let table = LogicalId::new("Table").unwrap();
        let mut plan = ProvisioningPlan::new().with_description("test stack");
        plan.add_resource(Box::new(Fake {
            id: table.clone(),
            resource_type: "AWS::DynamoDB::Table",
            depends_on: Vec::new(),
            removal: Some(RemovalPolicy::Destroy),
        }))
        .unwrap();
        plan.add_resource(Box::new(Fake {
            id: LogicalId::new("Handler").unwrap(),
            resource_type: "AWS::Lambda::Function",
            depends_on: vec![table.clone(), table.clone()],
            removal: None,
        }))
        .unwrap();
        plan.add_output("TableArn", Intrinsic::get_att(&table, "Arn"))
            .unwrap();

        let stack = StackContext::new("Test");
        let assets = AssetManifest::new();
        let template = plan.render(&RenderContext::new(&stack, &assets)).unwrap();

        assert_eq!(template.description.as_deref(), Some("test stack"));
        let rendered_table = &template.resources["Table"];
        assert_eq!(rendered_table.deletion_policy.as_deref(), Some("Delete"));
        assert_eq!(rendered_table.update_replace_policy.as_deref(), Some("Delete"));
        let handler = &template.resources["Handler"];
        assert_eq!(handler.depends_on, vec!["Table".to_string()]);
        assert!(handler.deletion_policy.is_none());
        assert_eq!(
            template.outputs["TableArn"].value,
            json!({ "Fn::GetAtt": ["Table", "Arn"] })
        );
    }

    #[test]
    fn test_count_of_type() {
        let mut plan = ProvisioningPlan::new();
        plan.add_resource(Fake::boxed("A", "AWS::IAM::Role")).unwrap();
        plan.add_resource(Fake::boxed("B", "AWS::IAM::Role")).unwrap();
        assert_eq!(plan.count_of_type("AWS::IAM::Role"), 2);
        assert_eq!(plan.count_of_type("AWS::IAM::Policy"), 0);
        assert!(plan.assets().is_empty());
    }
}
