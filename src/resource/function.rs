//! Lambda function resource - the compute unit

use serde_json::{Map, Value, json};
use stackkit::{AssetSource, ConstructPath, Intrinsic, LogicalId, RenderContext, Resource};
use std::fmt;
use std::path::Path;

use super::object;

pub const RESOURCE_TYPE: &str = "AWS::Lambda::Function";

/// Execution runtime of a function
///
/// Unknown identifiers are kept verbatim; the provider rejects them, not us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Runtime {
    ProvidedAl2023,
    ProvidedAl2,
    Custom(String),
}

impl Runtime {
    pub fn parse(id: &str) -> Self {
        match id {
            "provided.al2023" => Self::ProvidedAl2023,
            "provided.al2" => Self::ProvidedAl2,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ProvidedAl2023 => "provided.al2023",
            Self::ProvidedAl2 => "provided.al2",
            Self::Custom(id) => id,
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the function code comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Code {
    /// A prebuilt artifact on the local filesystem, staged at synthesis
    Asset(AssetSource),
}

impl Code {
    pub fn from_asset(path: impl AsRef<Path>) -> Self {
        Self::Asset(AssetSource::new(path.as_ref()))
    }
}

/// A Lambda function
#[derive(Debug, Clone)]
pub struct Function {
    id: LogicalId,
    pub code: Code,
    pub runtime: Runtime,
    /// Entry point, interpreted only by the runtime
    pub handler: String,
    /// Execution role
    pub role: LogicalId,
    depends_on: Vec<LogicalId>,
}

impl Function {
    /// Declare a function under `scope`, executing as `role`
    pub fn new(
        scope: &ConstructPath,
        code: Code,
        runtime: Runtime,
        handler: impl Into<String>,
        role: &LogicalId,
    ) -> Self {
        Self {
            id: scope.child("Resource").logical_id(),
            code,
            runtime,
            handler: handler.into(),
            role: role.clone(),
            depends_on: vec![role.clone()],
        }
    }

    /// Require another resource to exist before this function is created
    pub fn add_dependency(&mut self, id: &LogicalId) {
        if !self.depends_on.contains(id) {
            self.depends_on.push(id.clone());
        }
    }

    /// Local path of the deployment artifact
    pub fn artifact(&self) -> &Path {
        match &self.code {
            Code::Asset(source) => &source.path,
        }
    }
}

impl Resource for Function {
    fn logical_id(&self) -> &LogicalId {
        &self.id
    }

    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn description(&self) -> String {
        format!(
            "Function {} ({}, handler {})",
            self.artifact().display(),
            self.runtime,
            self.handler
        )
    }

    fn properties(&self, ctx: &RenderContext) -> stackkit::Result<Map<String, Value>> {
        let code = match &self.code {
            Code::Asset(source) => {
                let staged = ctx.assets.require(source)?;
                json!({
                    "S3Bucket": ctx.stack.asset_bucket_value(),
                    "S3Key": staged.object_key,
                })
            }
        };

        Ok(object(json!({
            "Code": code,
            "Handler": self.handler,
            "Role": Intrinsic::get_att(&self.role, "Arn").to_value(),
            "Runtime": self.runtime.as_str(),
        })))
    }

    fn depends_on(&self) -> Vec<LogicalId> {
        self.depends_on.clone()
    }

    fn assets(&self) -> Vec<&AssetSource> {
        match &self.code {
            Code::Asset(source) => vec![source],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackkit::{AssetManifest, StackContext, StagedAsset};

    fn function() -> Function {
        let role = LogicalId::new("Role").unwrap();
        Function::new(
            &ConstructPath::root("RustLambdaFunction"),
            Code::from_asset("target/lambda/fn"),
            Runtime::ProvidedAl2023,
            "whatev",
            &role,
        )
    }

    fn staged_manifest() -> AssetManifest {
        let mut manifest = AssetManifest::new();
        manifest.insert(StagedAsset {
            source: "target/lambda/fn".into(),
            hash: "abc123".to_string(),
            file_name: "asset.abc123.zip".to_string(),
            bucket: "bucket".to_string(),
            object_key: "abc123.zip".to_string(),
        });
        manifest
    }

    #[test]
    fn test_runtime_parse() {
        assert_eq!(Runtime::parse("provided.al2023"), Runtime::ProvidedAl2023);
        assert_eq!(Runtime::parse("provided.al2"), Runtime::ProvidedAl2);
        assert_eq!(
            Runtime::parse("python3.12"),
            Runtime::Custom("python3.12".to_string())
        );
        assert_eq!(Runtime::parse("python3.12").as_str(), "python3.12");
    }

    #[test]
    fn test_properties() {
        let stack = StackContext::new("S")
            .with_env(Some("123456789012".into()), Some("eu-west-2".into()));
        let assets = staged_manifest();
        let props = function()
            .properties(&RenderContext::new(&stack, &assets))
            .unwrap();

        assert_eq!(props["Runtime"], "provided.al2023");
        assert_eq!(props["Handler"], "whatev");
        assert_eq!(props["Code"]["S3Key"], "abc123.zip");
        assert_eq!(
            props["Code"]["S3Bucket"],
            "stackkit-assets-123456789012-eu-west-2"
        );
        assert_eq!(props["Role"], json!({ "Fn::GetAtt": ["Role", "Arn"] }));
    }

    #[test]
    fn test_unstaged_asset_fails() {
        let stack = StackContext::new("S");
        let assets = AssetManifest::new();
        let err = function()
            .properties(&RenderContext::new(&stack, &assets))
            .unwrap_err();
        assert!(matches!(err, stackkit::Error::AssetNotStaged(_)));
    }

    #[test]
    fn test_handler_not_validated() {
        let mut f = function();
        f.handler = "does::not::exist".to_string();
        assert!(f.description().contains("does::not::exist"));
    }

    #[test]
    fn test_depends_on_role() {
        let mut f = function();
        let role = LogicalId::new("Role").unwrap();
        let policy = LogicalId::new("Policy").unwrap();
        f.add_dependency(&policy);
        f.add_dependency(&role);
        assert_eq!(f.depends_on(), vec![role, policy]);
        assert_eq!(f.assets().len(), 1);
    }
}
