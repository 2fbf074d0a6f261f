//! Structural validation of rendered templates
//!
//! Catches dangling references before a request reaches the provider.
//! Names, quotas and collisions are left to the provider.

use crate::error::{Error, Result};
use crate::template::Template;
use crate::types::PseudoParameter;
use serde_json::Value;
use std::collections::BTreeSet;

/// Check that every reference and dependency names a declared resource
pub fn validate(template: &Template) -> Result<()> {
    let known: BTreeSet<&str> = template.resources.keys().map(String::as_str).collect();

    for (id, resource) in &template.resources {
        for dependency in &resource.depends_on {
            if !known.contains(dependency.as_str()) {
                return Err(Error::UnknownDependency {
                    from: id.clone(),
                    target: dependency.clone(),
                });
            }
        }

        let mut targets = Vec::new();
        for value in resource.properties.values() {
            collect_references(value, &mut targets);
        }
        check_targets(id, &targets, &known)?;
    }

    for (id, output) in &template.outputs {
        let mut targets = Vec::new();
        collect_references(&output.value, &mut targets);
        check_targets(id, &targets, &known)?;
    }

    Ok(())
}

fn check_targets(from: &str, targets: &[String], known: &BTreeSet<&str>) -> Result<()> {
    match targets.iter().find(|t| !known.contains(t.as_str())) {
        Some(target) => Err(Error::UnknownReference {
            from: from.to_string(),
            target: target.clone(),
        }),
        None => Ok(()),
    }
}

/// Collect resource names referenced through `Ref`, `Fn::GetAtt` and `Fn::Sub`
pub fn collect_references(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if map.len() == 1 {
                if let Some(Value::String(name)) = map.get("Ref") {
                    if !PseudoParameter::is_pseudo(name) {
                        out.push(name.clone());
                    }
                    return;
                }
                match map.get("Fn::GetAtt") {
                    Some(Value::Array(parts)) => {
                        if let Some(Value::String(name)) = parts.first() {
                            out.push(name.clone());
                        }
                        return;
                    }
                    Some(Value::String(dotted)) => {
                        if let Some((name, _)) = dotted.split_once('.') {
                            out.push(name.to_string());
                        }
                        return;
                    }
                    _ => {}
                }
                if let Some(Value::String(template)) = map.get("Fn::Sub") {
                    out.extend(sub_references(template));
                    return;
                }
            }
            for child in map.values() {
                collect_references(child, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_references(item, out);
            }
        }
        _ => {}
    }
}

/// Resource names inside `${...}` placeholders of an `Fn::Sub` string
fn sub_references(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        let name = &after[..end];
        rest = &after[end + 1..];

        // `${!Literal}` escapes a placeholder
        if name.starts_with('!') || PseudoParameter::is_pseudo(name) {
            continue;
        }
        let resource = name.split_once('.').map_or(name, |(r, _)| r);
        names.push(resource.to_string());
    }
    names
}
