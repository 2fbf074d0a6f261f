//! Function URL resource - the invocation endpoint

use serde_json::{Map, Value, json};
use stackkit::{ConstructPath, Intrinsic, LogicalId, RenderContext, Resource};
use std::fmt;

use super::object;

pub const URL_TYPE: &str = "AWS::Lambda::Url";
pub const PERMISSION_TYPE: &str = "AWS::Lambda::Permission";

/// Who may call the URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    /// Public, unauthenticated
    None,
    /// Callers must sign requests with IAM credentials
    #[allow(dead_code)]
    AwsIam,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::AwsIam => "AWS_IAM",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A URL bound to one function
#[derive(Debug, Clone)]
pub struct FunctionUrl {
    id: LogicalId,
    pub auth_type: AuthType,
    /// Function the URL invokes
    pub target: LogicalId,
}

impl FunctionUrl {
    /// Declare the URL of the function declared under `scope`
    pub fn new(scope: &ConstructPath, target: &LogicalId, auth_type: AuthType) -> Self {
        Self {
            id: scope.child("FunctionUrl").child("Resource").logical_id(),
            auth_type,
            target: target.clone(),
        }
    }

    /// The URL, known once the endpoint exists
    pub fn url(&self) -> Intrinsic {
        Intrinsic::get_att(&self.id, "FunctionUrl")
    }

    /// Permission letting anyone invoke the URL
    ///
    /// Only public URLs need one; IAM-authenticated URLs rely on the
    /// caller's own policy.
    pub fn public_invoke_permission(&self, scope: &ConstructPath) -> Option<InvokeUrlPermission> {
        match self.auth_type {
            AuthType::None => Some(InvokeUrlPermission::new(scope, &self.target)),
            AuthType::AwsIam => None,
        }
    }
}

impl Resource for FunctionUrl {
    fn logical_id(&self) -> &LogicalId {
        &self.id
    }

    fn resource_type(&self) -> &'static str {
        URL_TYPE
    }

    fn description(&self) -> String {
        format!("URL for {} (auth {})", self.target, self.auth_type)
    }

    fn properties(&self, _ctx: &RenderContext) -> stackkit::Result<Map<String, Value>> {
        Ok(object(json!({
            "AuthType": self.auth_type.as_str(),
            "TargetFunctionArn": Intrinsic::get_att(&self.target, "Arn").to_value(),
        })))
    }
}

/// `lambda:InvokeFunctionUrl` for any principal
#[derive(Debug, Clone)]
pub struct InvokeUrlPermission {
    id: LogicalId,
    pub function: LogicalId,
}

impl InvokeUrlPermission {
    fn new(scope: &ConstructPath, function: &LogicalId) -> Self {
        Self {
            id: scope.child("invoke-function-url").logical_id(),
            function: function.clone(),
        }
    }
}

impl Resource for InvokeUrlPermission {
    fn logical_id(&self) -> &LogicalId {
        &self.id
    }

    fn resource_type(&self) -> &'static str {
        PERMISSION_TYPE
    }

    fn description(&self) -> String {
        format!("Public invoke permission for {}", self.function)
    }

    fn properties(&self, _ctx: &RenderContext) -> stackkit::Result<Map<String, Value>> {
        Ok(object(json!({
            "Action": "lambda:InvokeFunctionUrl",
            "FunctionName": Intrinsic::get_att(&self.function, "Arn").to_value(),
            "FunctionUrlAuthType": AuthType::None.as_str(),
            "Principal": "*",
        })))
    }
}
