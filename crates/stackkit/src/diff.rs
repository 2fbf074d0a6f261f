//! Diff computation between two rendered templates

use crate::template::{Template, TemplateResource};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How a template entry changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Added,
    Removed,
    /// Same type, different properties or policies
    Modified,
    /// Provider type changed; the resource is recreated
    Replaced,
}

/// A diff between the old and new version of one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDiff {
    /// Logical id of the resource
    pub resource_id: String,
    /// Type in the new template, or the old one for removals
    pub resource_type: String,
    pub change: ChangeKind,
    /// Top-level properties and attributes that differ
    pub changed_properties: Vec<String>,
}

impl ResourceDiff {
    /// Check if this diff represents an addition
    pub fn is_addition(&self) -> bool {
        self.change == ChangeKind::Added
    }

    /// Check if this diff represents a removal
    pub fn is_removal(&self) -> bool {
        self.change == ChangeKind::Removed
    }

    /// Check if this diff represents a modification
    pub fn is_modification(&self) -> bool {
        matches!(self.change, ChangeKind::Modified | ChangeKind::Replaced)
    }
}

/// A changed stack output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDiff {
    pub output_id: String,
    pub change: ChangeKind,
}

/// All differences between two templates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDiff {
    pub resources: Vec<ResourceDiff>,
    pub outputs: Vec<OutputDiff>,
}

impl TemplateDiff {
    /// Check if the templates are identical
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.outputs.is_empty()
    }
}

/// Compare an old template against a new one
pub fn compute_diffs(old: &Template, new: &Template) -> TemplateDiff {
    let mut diff = TemplateDiff::default();

    let ids: BTreeSet<&String> = old.resources.keys().chain(new.resources.keys()).collect();
    for id in ids {
        let entry = match (old.resources.get(id), new.resources.get(id)) {
            (None, Some(added)) => Some(ResourceDiff {
                resource_id: id.clone(),
                resource_type: added.resource_type.clone(),
                change: ChangeKind::Added,
                changed_properties: Vec::new(),
            }),
            (Some(removed), None) => Some(ResourceDiff {
                resource_id: id.clone(),
                resource_type: removed.resource_type.clone(),
                change: ChangeKind::Removed,
                changed_properties: Vec::new(),
            }),
            (Some(before), Some(after)) => compare_resource(id, before, after),
            (None, None) => None,
        };
        diff.resources.extend(entry);
    }

    let outputs: BTreeSet<&String> = old.outputs.keys().chain(new.outputs.keys()).collect();
    for id in outputs {
        let change = match (old.outputs.get(id), new.outputs.get(id)) {
            (None, Some(_)) => Some(ChangeKind::Added),
            (Some(_), None) => Some(ChangeKind::Removed),
            (Some(before), Some(after)) if before != after => Some(ChangeKind::Modified),
            _ => None,
        };
        if let Some(change) = change {
            diff.outputs.push(OutputDiff {
                output_id: id.clone(),
                change,
            });
        }
    }

    diff
}

fn compare_resource(
    id: &str,
    before: &TemplateResource,
    after: &TemplateResource,
) -> Option<ResourceDiff> {
    if before.resource_type != after.resource_type {
        return Some(ResourceDiff {
            resource_id: id.to_string(),
            resource_type: after.resource_type.clone(),
            change: ChangeKind::Replaced,
            changed_properties: Vec::new(),
        });
    }

    let keys: BTreeSet<&String> = before
        .properties
        .keys()
        .chain(after.properties.keys())
        .collect();
    let mut changed: Vec<String> = keys
        .into_iter()
        .filter(|k| before.properties.get(*k) != after.properties.get(*k))
        .cloned()
        .collect();

    if before.depends_on != after.depends_on {
        changed.push("DependsOn".to_string());
    }
    if before.deletion_policy != after.deletion_policy {
        changed.push("DeletionPolicy".to_string());
    }
    if before.update_replace_policy != after.update_replace_policy {
        changed.push("UpdateReplacePolicy".to_string());
    }

    if changed.is_empty() {
        return None;
    }
    Some(ResourceDiff {
        resource_id: id.to_string(),
        resource_type: after.resource_type.clone(),
        change: ChangeKind::Modified,
        changed_properties: changed,
    })
}

/// Diff summary statistics
#[derive(Debug, Clone, Default)]
pub struct DiffSummary {
    /// Number of resources to add
    pub additions: usize,
    /// Number of resources to remove
    pub removals: usize,
    /// Number of resources to modify in place
    pub modifications: usize,
    /// Number of resources to recreate
    pub replacements: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diffs
    pub fn from_diffs(diffs: &[ResourceDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            match diff.change {
                ChangeKind::Added => summary.additions += 1,
                ChangeKind::Removed => summary.removals += 1,
                ChangeKind::Modified => summary.modifications += 1,
                ChangeKind::Replaced => summary.replacements += 1,
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.removals + self.modifications + self.replacements
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

/// Group diffs by resource type
pub fn group_by_type(diffs: &[ResourceDiff]) -> BTreeMap<String, Vec<&ResourceDiff>> {
    let mut groups: BTreeMap<String, Vec<&ResourceDiff>> = BTreeMap::new();
    for diff in diffs {
        groups
            .entry(diff.resource_type.clone())
            .or_default()
            .push(diff);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateOutput;
    use serde_json::{Map, json};

    fn table(name: &str, policy: &str) -> TemplateResource {
        let mut properties = Map::new();
        properties.insert("TableName".to_string(), json!(name));
        TemplateResource {
            resource_type: "AWS::DynamoDB::Table".to_string(),
            properties,
            depends_on: Vec::new(),
            deletion_policy: Some(policy.to_string()),
            update_replace_policy: Some(policy.to_string()),
        }
    }

    fn template_with(resources: Vec<(&str, TemplateResource)>) -> Template {
        let mut template = Template::default();
        for (id, resource) in resources {
            template.resources.insert(id.to_string(), resource);
        }
        template
    }

    #[test]
    fn test_identical_templates() {
        let t = template_with(vec![("Table", table("Emails", "Delete"))]);
        let diff = compute_diffs(&t, &t.clone());
        assert!(diff.is_empty());
    }

    #[test]
    fn test_added_and_removed() {
        let old = template_with(vec![("Old", table("A", "Delete"))]);
        let new = template_with(vec![("New", table("B", "Delete"))]);
        let diff = compute_diffs(&old, &new);

        assert_eq!(diff.resources.len(), 2);
        assert!(diff.resources.iter().any(|d| d.resource_id == "New" && d.is_addition()));
        assert!(diff.resources.iter().any(|d| d.resource_id == "Old" && d.is_removal()));
    }

    #[test]
    fn test_modified_properties_and_policy() {
        let old = template_with(vec![("Table", table("Emails", "Delete"))]);
        let new = template_with(vec![("Table", table("Subscribers", "Retain"))]);
        let diff = compute_diffs(&old, &new);

        assert_eq!(diff.resources.len(), 1);
        let change = &diff.resources[0];
        assert!(change.is_modification());
        assert_eq!(
            change.changed_properties,
            vec![
                "TableName".to_string(),
                "DeletionPolicy".to_string(),
                "UpdateReplacePolicy".to_string()
            ]
        );
    }

    #[test]
    fn test_type_change_is_replacement() {
        let old = template_with(vec![("Thing", table("Emails", "Delete"))]);
        let mut replaced = table("Emails", "Delete");
        replaced.resource_type = "AWS::S3::Bucket".to_string();
        let new = template_with(vec![("Thing", replaced)]);

        let diff = compute_diffs(&old, &new);
        assert_eq!(diff.resources[0].change, ChangeKind::Replaced);
    }

    #[test]
    fn test_output_changes() {
        let mut old = Template::default();
        old.outputs.insert(
            "LambdaURL".to_string(),
            TemplateOutput {
                value: json!({ "Fn::GetAtt": ["A", "FunctionUrl"] }),
                description: None,
            },
        );
        let mut new = old.clone();
        new.outputs.get_mut("LambdaURL").unwrap().value =
            json!({ "Fn::GetAtt": ["B", "FunctionUrl"] });

        let diff = compute_diffs(&old, &new);
        assert_eq!(
            diff.outputs,
            vec![OutputDiff {
                output_id: "LambdaURL".to_string(),
                change: ChangeKind::Modified
            }]
        );
    }

    #[test]
    fn test_summary_and_grouping() {
        let old = template_with(vec![("Table", table("Emails", "Delete"))]);
        let new = template_with(vec![
            ("Table", table("Emails2", "Delete")),
            ("Other", table("Other", "Delete")),
        ]);
        let diff = compute_diffs(&old, &new);

        let summary = DiffSummary::from_diffs(&diff.resources);
        assert_eq!(summary.additions, 1);
        assert_eq!(summary.modifications, 1);
        assert!(summary.has_changes());

        let groups = group_by_type(&diff.resources);
        assert_eq!(groups["AWS::DynamoDB::Table"].len(), 2);
    }
}
