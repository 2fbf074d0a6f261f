//! Stack context and provider traits
//!
//! The deployment scope (stack name, account, region) is passed explicitly
//! to everything that renders resources. The provisioning engine and the
//! progress observer are traits so the crate carries no dependency on a
//! particular provider client or terminal UI.

use crate::assets::{AssetManifest, StagedAsset};
use crate::error::Result;
use crate::executor::{ProvisioningRequest, SubmitReceipt};
use crate::types::PseudoParameter;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Prefix of the default asset bucket name
pub const DEFAULT_ASSET_BUCKET_PREFIX: &str = "stackkit-assets";

/// Target environment of a stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackContext {
    /// Name of the stack in the provider
    pub stack_name: String,
    /// Target account, if known at synthesis time
    pub account: Option<String>,
    /// Target region, if known at synthesis time
    pub region: Option<String>,
    /// Bucket holding staged assets; derived from the environment when unset
    pub asset_bucket: Option<String>,
}

impl StackContext {
    /// Create an environment-agnostic context
    pub fn new(stack_name: impl Into<String>) -> Self {
        Self {
            stack_name: stack_name.into(),
            account: None,
            region: None,
            asset_bucket: None,
        }
    }

    /// Pin the context to an account and region
    pub fn with_env(mut self, account: Option<String>, region: Option<String>) -> Self {
        self.account = account;
        self.region = region;
        self
    }

    /// Use an explicit asset bucket
    pub fn with_asset_bucket(mut self, bucket: Option<String>) -> Self {
        self.asset_bucket = bucket;
        self
    }

    /// Whether account or region is left to the provider
    pub fn is_env_agnostic(&self) -> bool {
        self.account.is_none() || self.region.is_none()
    }

    /// Environment string in `aws://account/region` form
    pub fn environment(&self) -> String {
        format!(
            "aws://{}/{}",
            self.account.as_deref().unwrap_or("unknown-account"),
            self.region.as_deref().unwrap_or("unknown-region")
        )
    }

    /// Asset bucket name, possibly containing `${AWS::...}` placeholders
    pub fn asset_bucket_name(&self) -> String {
        if let Some(bucket) = &self.asset_bucket {
            return bucket.clone();
        }
        match (&self.account, &self.region) {
            (Some(account), Some(region)) => {
                format!("{DEFAULT_ASSET_BUCKET_PREFIX}-{account}-{region}")
            }
            _ => format!(
                "{DEFAULT_ASSET_BUCKET_PREFIX}-${{{}}}-${{{}}}",
                PseudoParameter::AccountId.as_str(),
                PseudoParameter::Region.as_str()
            ),
        }
    }

    /// Asset bucket as a template value
    ///
    /// Literal when the name is fully known, `Fn::Sub` otherwise.
    pub fn asset_bucket_value(&self) -> Value {
        let name = self.asset_bucket_name();
        if name.contains("${") {
            json!({ "Fn::Sub": name })
        } else {
            json!(name)
        }
    }
}

/// Everything a resource needs to render its properties
pub struct RenderContext<'a> {
    /// Target environment
    pub stack: &'a StackContext,
    /// Staged assets, keyed by source
    pub assets: &'a AssetManifest,
}

impl<'a> RenderContext<'a> {
    /// Create a render context
    pub fn new(stack: &'a StackContext, assets: &'a AssetManifest) -> Self {
        Self { stack, assets }
    }
}

/// The component that executes a provisioning request
///
/// Implement this trait to hand the rendered request to a provider. The
/// engine owns rollback, idempotent re-submission and conflict reporting.
pub trait ProvisioningEngine {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Execute the request and report the stack outputs
    fn submit(&self, request: &ProvisioningRequest) -> Result<SubmitReceipt>;
}

/// Progress callback for submission
pub trait SubmitObserver {
    /// Called after an asset has been hashed and packaged
    fn on_asset_staged(&mut self, asset: &StagedAsset);

    /// Called once the rendered template passed validation
    fn on_validated(&mut self, resources: usize, outputs: usize);

    /// Called after the engine accepted the request
    fn on_submitted(&mut self, receipt: &SubmitReceipt);
}

/// No-op progress callback
pub struct NoProgress;

impl SubmitObserver for NoProgress {
    fn on_asset_staged(&mut self, _asset: &StagedAsset) {}
    fn on_validated(&mut self, _resources: usize, _outputs: usize) {}
    fn on_submitted(&mut self, _receipt: &SubmitReceipt) {}
}
