//! Cloud assembly - the built-in engine that writes the request to disk
//!
//! The assembly directory holds the template, the staged assets and a
//! manifest tying them to a target environment. A deployment tool picks it
//! up from there; output values stay unresolved until that happens.

use crate::assets::StagedAsset;
use crate::context::ProvisioningEngine;
use crate::error::{Error, Result};
use crate::executor::{OutputValue, ProvisioningRequest, SubmitReceipt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest file name inside the assembly directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Format version written to the manifest
pub const MANIFEST_VERSION: u32 = 1;

/// Contents of `manifest.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyManifest {
    pub version: u32,
    pub stack_name: String,
    /// `aws://account/region`
    pub environment: String,
    /// Template file name relative to the assembly directory
    pub template_file: String,
    #[serde(default)]
    pub assets: Vec<StagedAsset>,
}

impl AssemblyManifest {
    /// Load the manifest from an assembly directory
    pub fn load(out_dir: &Path) -> Result<Self> {
        let path = out_dir.join(MANIFEST_FILE);
        let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Path of a stack's template inside an assembly directory
pub fn template_path(out_dir: &Path, stack_name: &str) -> PathBuf {
    out_dir.join(template_file_name(stack_name))
}

fn template_file_name(stack_name: &str) -> String {
    format!("{stack_name}.template.json")
}

/// Engine that writes a cloud assembly directory
pub struct CloudAssembly;

impl ProvisioningEngine for CloudAssembly {
    fn name(&self) -> &'static str {
        "cloud-assembly"
    }

    fn submit(&self, request: &ProvisioningRequest) -> Result<SubmitReceipt> {
        let out_dir = &request.out_dir;
        fs::create_dir_all(out_dir).map_err(|e| Error::io(out_dir, e))?;

        let stack_name = &request.stack.stack_name;
        let template_file = template_file_name(stack_name);
        let template_path = out_dir.join(&template_file);
        fs::write(&template_path, request.template.to_json()?)
            .map_err(|e| Error::io(&template_path, e))?;

        let manifest = AssemblyManifest {
            version: MANIFEST_VERSION,
            stack_name: stack_name.clone(),
            environment: request.stack.environment(),
            template_file,
            assets: request.assets.iter().cloned().collect(),
        };
        let manifest_path = out_dir.join(MANIFEST_FILE);
        fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
            .map_err(|e| Error::io(&manifest_path, e))?;

        log::info!("Wrote cloud assembly to {}", out_dir.display());

        let mut artifacts = vec![template_path, manifest_path];
        artifacts.extend(request.assets.iter().map(|a| out_dir.join(&a.file_name)));

        Ok(SubmitReceipt {
            stack_name: stack_name.clone(),
            engine: self.name().to_string(),
            outputs: request
                .template
                .outputs
                .iter()
                .map(|(id, output)| (id.clone(), OutputValue::Unresolved(output.value.clone())))
                .collect(),
            artifacts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetManifest;
    use crate::context::StackContext;
    use crate::template::{Template, TemplateOutput};
    use serde_json::json;
    use tempfile::TempDir;

    fn request(out_dir: &Path) -> ProvisioningRequest {
        let mut template = Template::default();
        template.outputs.insert(
            "LambdaURL".to_string(),
            TemplateOutput {
                value: json!({ "Fn::GetAtt": ["Url", "FunctionUrl"] }),
                description: None,
            },
        );
        let mut assets = AssetManifest::new();
        assets.insert(StagedAsset {
            source: PathBuf::from("target/lambda/fn"),
            hash: "abc".to_string(),
            file_name: "asset.abc.zip".to_string(),
            bucket: "bucket".to_string(),
            object_key: "abc.zip".to_string(),
        });
        ProvisioningRequest {
            stack: StackContext::new("DeploymentStack")
                .with_env(Some("123456789012".into()), Some("eu-west-2".into())),
            template,
            assets,
            out_dir: out_dir.to_path_buf(),
        }
    }

    #[test]
    fn test_writes_template_and_manifest() {
        let out = TempDir::new().unwrap();
        let receipt = CloudAssembly.submit(&request(out.path())).unwrap();

        let written = Template::load(&template_path(out.path(), "DeploymentStack")).unwrap();
        assert!(written.outputs.contains_key("LambdaURL"));

        let manifest = AssemblyManifest::load(out.path()).unwrap();
        assert_eq!(manifest.version, MANIFEST_VERSION);
        assert_eq!(manifest.template_file, "DeploymentStack.template.json");
        assert_eq!(manifest.environment, "aws://123456789012/eu-west-2");
        assert_eq!(manifest.assets.len(), 1);

        assert_eq!(receipt.engine, "cloud-assembly");
        assert_eq!(receipt.artifacts.len(), 3);
        assert!(matches!(
            receipt.output("LambdaURL"),
            Some(OutputValue::Unresolved(_))
        ));
    }

    #[test]
    fn test_creates_missing_directory() {
        let base = TempDir::new().unwrap();
        let out = base.path().join("nested").join("cdk.out");
        CloudAssembly.submit(&request(&out)).unwrap();
        assert!(out.join(MANIFEST_FILE).exists());
    }
}
