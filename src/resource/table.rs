//! DynamoDB table resource - the record store

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use stackkit::{ConstructPath, Intrinsic, LogicalId, RemovalPolicy, RenderContext, Resource};
use std::fmt;

use super::object;

pub const RESOURCE_TYPE: &str = "AWS::DynamoDB::Table";

/// Throughput applied when no capacity mode is declared
const DEFAULT_READ_CAPACITY: u32 = 5;
const DEFAULT_WRITE_CAPACITY: u32 = 5;

/// Scalar type of a key attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Number,
    Binary,
}

impl AttributeType {
    /// Provider code: `S`, `N` or `B`
    pub fn code(&self) -> &'static str {
        match self {
            Self::String => "S",
            Self::Number => "N",
            Self::Binary => "B",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Binary => write!(f, "binary"),
        }
    }
}

/// A key attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AttributeType,
}

impl Attribute {
    pub fn new(name: impl Into<String>, kind: AttributeType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A table keyed by a single partition key
///
/// No sort key, indexes or billing mode are modeled.
#[derive(Debug, Clone)]
pub struct Table {
    id: LogicalId,
    /// Physical name; must be unique within the account and region
    pub table_name: String,
    pub partition_key: Attribute,
    pub removal_policy: RemovalPolicy,
}

impl Table {
    pub fn new(
        scope: &ConstructPath,
        table_name: impl Into<String>,
        partition_key: Attribute,
        removal_policy: RemovalPolicy,
    ) -> Self {
        Self {
            id: scope.child("Resource").logical_id(),
            table_name: table_name.into(),
            partition_key,
            removal_policy,
        }
    }

    /// ARN of the table
    pub fn arn(&self) -> Intrinsic {
        Intrinsic::get_att(&self.id, "Arn")
    }
}

impl Resource for Table {
    fn logical_id(&self) -> &LogicalId {
        &self.id
    }

    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn description(&self) -> String {
        format!(
            "Table {} (key {}: {}, {})",
            self.table_name, self.partition_key.name, self.partition_key.kind, self.removal_policy
        )
    }

    fn properties(&self, _ctx: &RenderContext) -> stackkit::Result<Map<String, Value>> {
        Ok(object(json!({
            "AttributeDefinitions": [{
                "AttributeName": self.partition_key.name,
                "AttributeType": self.partition_key.kind.code(),
            }],
            "KeySchema": [{
                "AttributeName": self.partition_key.name,
                "KeyType": "HASH",
            }],
            "ProvisionedThroughput": {
                "ReadCapacityUnits": DEFAULT_READ_CAPACITY,
                "WriteCapacityUnits": DEFAULT_WRITE_CAPACITY,
            },
            "TableName": self.table_name,
        })))
    }

    fn removal_policy(&self) -> Option<RemovalPolicy> {
        Some(self.removal_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackkit::{AssetManifest, StackContext};

    fn table() -> Table {
        Table::new(
            &ConstructPath::root("EmailsTable"),
            "Emails",
            Attribute::new("Id", AttributeType::String),
            RemovalPolicy::Destroy,
        )
    }

    #[test]
    fn test_properties() {
        let stack = StackContext::new("S");
        let assets = AssetManifest::new();
        let props = table()
            .properties(&RenderContext::new(&stack, &assets))
            .unwrap();

        assert_eq!(props["TableName"], "Emails");
        assert_eq!(
            props["KeySchema"],
            json!([{ "AttributeName": "Id", "KeyType": "HASH" }])
        );
        assert_eq!(
            props["AttributeDefinitions"],
            json!([{ "AttributeName": "Id", "AttributeType": "S" }])
        );
        assert_eq!(props["ProvisionedThroughput"]["ReadCapacityUnits"], 5);
        assert!(props.get("GlobalSecondaryIndexes").is_none());
        assert!(props.get("BillingMode").is_none());
    }

    #[test]
    fn test_removal_policy() {
        assert_eq!(table().removal_policy(), Some(RemovalPolicy::Destroy));
    }

    #[test]
    fn test_attribute_codes() {
        assert_eq!(AttributeType::String.code(), "S");
        assert_eq!(AttributeType::Number.code(), "N");
        assert_eq!(AttributeType::Binary.code(), "B");
    }

    #[test]
    fn test_logical_id_from_construct() {
        let t = table();
        assert!(t.logical_id().as_str().starts_with("EmailsTable"));
        assert_eq!(
            t.arn().to_value(),
            json!({ "Fn::GetAtt": [t.logical_id().as_str(), "Arn"] })
        );
    }
}
