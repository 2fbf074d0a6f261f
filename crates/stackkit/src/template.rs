//! Rendered provisioning template

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A rendered template, ordered by logical id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub resources: BTreeMap<String, TemplateResource>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, TemplateOutput>,
}

/// One entry of the `Resources` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateResource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<String>,
}

/// One entry of the `Outputs` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateOutput {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Template {
    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a template from JSON
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a template file written by an earlier synthesis
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&content)
    }

    /// Resources of a given provider type
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a TemplateResource)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, r)| r.resource_type == resource_type)
    }

    /// Number of resources of a given provider type
    pub fn count_of_type(&self, resource_type: &str) -> usize {
        self.resources_of_type(resource_type).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Template {
        let mut template = Template::default();
        let mut properties = Map::new();
        properties.insert("TableName".to_string(), json!("Emails"));
        template.resources.insert(
            "EmailsTable".to_string(),
            TemplateResource {
                resource_type: "AWS::DynamoDB::Table".to_string(),
                properties,
                depends_on: Vec::new(),
                deletion_policy: Some("Delete".to_string()),
                update_replace_policy: Some("Delete".to_string()),
            },
        );
        template.outputs.insert(
            "TableName".to_string(),
            TemplateOutput {
                value: json!({ "Ref": "EmailsTable" }),
                description: None,
            },
        );
        template
    }

    #[test]
    fn test_serialized_keys() {
        let value = serde_json::to_value(sample()).unwrap();
        let table = &value["Resources"]["EmailsTable"];
        assert_eq!(table["Type"], "AWS::DynamoDB::Table");
        assert_eq!(table["Properties"]["TableName"], "Emails");
        assert_eq!(table["DeletionPolicy"], "Delete");
        assert_eq!(table["UpdateReplacePolicy"], "Delete");
        assert!(table.get("DependsOn").is_none());
        assert_eq!(value["Outputs"]["TableName"]["Value"], json!({ "Ref": "EmailsTable" }));
        assert!(value.get("Description").is_none());
    }

    #[test]
    fn test_parse_written_template() {
        let template = sample();
        let parsed = Template::from_json(&template.to_json().unwrap()).unwrap();
        assert_eq!(parsed, template);
    }

    #[test]
    fn test_count_of_type() {
        let template = sample();
        assert_eq!(template.count_of_type("AWS::DynamoDB::Table"), 1);
        assert_eq!(template.count_of_type("AWS::Lambda::Function"), 0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Template::load(Path::new("/nonexistent/template.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
