//! IAM resources - the function's execution identity and its grants

use serde_json::{Map, Value, json};
use stackkit::{ConstructPath, Intrinsic, LogicalId, PseudoParameter, RenderContext, Resource};

use super::object;

pub const ROLE_TYPE: &str = "AWS::IAM::Role";
pub const POLICY_TYPE: &str = "AWS::IAM::Policy";

const POLICY_VERSION: &str = "2012-10-17";
const BASIC_EXECUTION_POLICY: &str = "service-role/AWSLambdaBasicExecutionRole";

/// One permission grant: actions allowed on a resource scope
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyStatement {
    pub actions: Vec<String>,
    /// ARNs, intrinsics, or `"*"`
    pub resources: Vec<Value>,
}

impl PolicyStatement {
    pub fn allow(actions: &[&str], resources: Vec<Value>) -> Self {
        Self {
            actions: actions.iter().map(ToString::to_string).collect(),
            resources,
        }
    }

    fn to_value(&self) -> Value {
        json!({
            "Action": single_or_list(self.actions.iter().map(|a| json!(a)).collect()),
            "Effect": "Allow",
            "Resource": single_or_list(self.resources.clone()),
        })
    }
}

/// Render one-element lists as the bare element
fn single_or_list(mut values: Vec<Value>) -> Value {
    if values.len() == 1 {
        values.remove(0)
    } else {
        Value::Array(values)
    }
}

/// The role a function executes as
#[derive(Debug, Clone)]
pub struct ServiceRole {
    id: LogicalId,
    /// Service principal allowed to assume the role
    pub service: String,
    /// AWS managed policies, relative to `arn:<partition>:iam::aws:policy/`
    pub managed_policies: Vec<String>,
}

impl ServiceRole {
    /// Role for a Lambda function declared under `scope`
    pub fn for_lambda(scope: &ConstructPath) -> Self {
        Self {
            id: scope.child("ServiceRole").child("Resource").logical_id(),
            service: "lambda.amazonaws.com".to_string(),
            managed_policies: vec![BASIC_EXECUTION_POLICY.to_string()],
        }
    }
}

impl Resource for ServiceRole {
    fn logical_id(&self) -> &LogicalId {
        &self.id
    }

    fn resource_type(&self) -> &'static str {
        ROLE_TYPE
    }

    fn description(&self) -> String {
        format!("Execution role assumable by {}", self.service)
    }

    fn properties(&self, _ctx: &RenderContext) -> stackkit::Result<Map<String, Value>> {
        let managed: Vec<Value> = self
            .managed_policies
            .iter()
            .map(|policy| {
                Intrinsic::join(
                    "",
                    vec![
                        json!("arn:"),
                        Intrinsic::pseudo(PseudoParameter::Partition).to_value(),
                        json!(format!(":iam::aws:policy/{policy}")),
                    ],
                )
                .to_value()
            })
            .collect();

        Ok(object(json!({
            "AssumeRolePolicyDocument": {
                "Statement": [{
                    "Action": "sts:AssumeRole",
                    "Effect": "Allow",
                    "Principal": { "Service": self.service },
                }],
                "Version": POLICY_VERSION,
            },
            "ManagedPolicyArns": managed,
        })))
    }
}

/// Inline policy holding the grants attached to a role
///
/// Grants are only ever added; removing one means redefining the stack.
#[derive(Debug, Clone)]
pub struct DefaultPolicy {
    id: LogicalId,
    pub role: LogicalId,
    statements: Vec<PolicyStatement>,
}

impl DefaultPolicy {
    pub fn for_role(scope: &ConstructPath, role: &LogicalId) -> Self {
        Self {
            id: scope
                .child("ServiceRole")
                .child("DefaultPolicy")
                .child("Resource")
                .logical_id(),
            role: role.clone(),
            statements: Vec::new(),
        }
    }

    pub fn add_statement(&mut self, statement: PolicyStatement) {
        self.statements.push(statement);
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }
}

impl Resource for DefaultPolicy {
    fn logical_id(&self) -> &LogicalId {
        &self.id
    }

    fn resource_type(&self) -> &'static str {
        POLICY_TYPE
    }

    fn description(&self) -> String {
        let actions: Vec<&str> = self
            .statements()
            .iter()
            .flat_map(|s| s.actions.iter().map(String::as_str))
            .collect();
        format!("Grants {} on {}", actions.join(", "), self.role)
    }

    fn properties(&self, _ctx: &RenderContext) -> stackkit::Result<Map<String, Value>> {
        let statements: Vec<Value> = self
            .statements
            .iter()
            .map(PolicyStatement::to_value)
            .collect();
        Ok(object(json!({
            "PolicyDocument": {
                "Statement": statements,
                "Version": POLICY_VERSION,
            },
            "PolicyName": self.id.as_str(),
            "Roles": [Intrinsic::reference(&self.role).to_value()],
        })))
    }
}
