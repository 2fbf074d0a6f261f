//! Core types for provisioning plans

use crate::id::LogicalId;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// What happens to a resource's data when the stack is torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalPolicy {
    /// Delete the resource and its data
    Destroy,
    /// Keep the resource after teardown
    Retain,
    /// Take a final snapshot, then delete
    Snapshot,
}

impl RemovalPolicy {
    /// Value used for both `DeletionPolicy` and `UpdateReplacePolicy`
    pub fn policy_value(&self) -> &'static str {
        match self {
            Self::Destroy => "Delete",
            Self::Retain => "Retain",
            Self::Snapshot => "Snapshot",
        }
    }
}

impl fmt::Display for RemovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Destroy => write!(f, "destroy"),
            Self::Retain => write!(f, "retain"),
            Self::Snapshot => write!(f, "snapshot"),
        }
    }
}

/// Values the provider supplies for every stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoParameter {
    Partition,
    Region,
    AccountId,
    UrlSuffix,
    StackName,
}

impl PseudoParameter {
    /// Name used inside `Ref` and `Fn::Sub`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Partition => "AWS::Partition",
            Self::Region => "AWS::Region",
            Self::AccountId => "AWS::AccountId",
            Self::UrlSuffix => "AWS::URLSuffix",
            Self::StackName => "AWS::StackName",
        }
    }

    /// Whether a `Ref` target names a pseudo parameter rather than a resource
    pub fn is_pseudo(name: &str) -> bool {
        name.starts_with("AWS::")
    }
}

/// A value resolved by the provider at deploy time
#[derive(Debug, Clone, PartialEq)]
pub enum Intrinsic {
    /// `{"Ref": name}` - a resource's primary identifier or a pseudo parameter
    Ref(String),
    /// `{"Fn::GetAtt": [id, attribute]}`
    GetAtt { id: LogicalId, attribute: String },
    /// `{"Fn::Join": [delimiter, parts]}`
    Join { delimiter: String, parts: Vec<Value> },
    /// `{"Fn::Sub": template}`
    Sub(String),
}

impl Intrinsic {
    /// Reference a declared resource
    pub fn reference(id: &LogicalId) -> Self {
        Self::Ref(id.to_string())
    }

    /// Reference a pseudo parameter
    pub fn pseudo(param: PseudoParameter) -> Self {
        Self::Ref(param.as_str().to_string())
    }

    /// Read an attribute of a declared resource
    pub fn get_att(id: &LogicalId, attribute: impl Into<String>) -> Self {
        Self::GetAtt {
            id: id.clone(),
            attribute: attribute.into(),
        }
    }

    /// Join parts with a delimiter
    pub fn join(delimiter: impl Into<String>, parts: Vec<Value>) -> Self {
        Self::Join {
            delimiter: delimiter.into(),
            parts,
        }
    }

    /// Render as template JSON
    pub fn to_value(&self) -> Value {
        match self {
            Self::Ref(name) => json!({ "Ref": name }),
            Self::GetAtt { id, attribute } => json!({ "Fn::GetAtt": [id.as_str(), attribute] }),
            Self::Join { delimiter, parts } => json!({ "Fn::Join": [delimiter, parts] }),
            Self::Sub(template) => json!({ "Fn::Sub": template }),
        }
    }
}

impl From<Intrinsic> for Value {
    fn from(intrinsic: Intrinsic) -> Self {
        intrinsic.to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_policy_values() {
        assert_eq!(RemovalPolicy::Destroy.policy_value(), "Delete");
        assert_eq!(RemovalPolicy::Retain.policy_value(), "Retain");
        assert_eq!(RemovalPolicy::Snapshot.policy_value(), "Snapshot");
    }

    #[test]
    fn test_intrinsic_rendering() {
        let id = LogicalId::new("EmailsTable").unwrap();
        assert_eq!(
            Intrinsic::reference(&id).to_value(),
            json!({ "Ref": "EmailsTable" })
        );
        assert_eq!(
            Intrinsic::get_att(&id, "Arn").to_value(),
            json!({ "Fn::GetAtt": ["EmailsTable", "Arn"] })
        );
        assert_eq!(
            Intrinsic::pseudo(PseudoParameter::Partition).to_value(),
            json!({ "Ref": "AWS::Partition" })
        );
    }

    #[test]
    fn test_join_rendering() {
        let join = Intrinsic::join(
            "",
            vec![json!("arn:"), Intrinsic::pseudo(PseudoParameter::Partition).into()],
        );
        assert_eq!(
            join.to_value(),
            json!({ "Fn::Join": ["", ["arn:", { "Ref": "AWS::Partition" }]] })
        );
    }

    #[test]
    fn test_is_pseudo() {
        assert!(PseudoParameter::is_pseudo("AWS::Region"));
        assert!(!PseudoParameter::is_pseudo("EmailsTable"));
    }
}
