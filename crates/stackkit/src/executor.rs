//! Submission - stages assets, renders, validates and hands off to an engine

use crate::assets::{AssetManifest, locate_asset, stage_asset};
use crate::context::{ProvisioningEngine, RenderContext, StackContext, SubmitObserver};
use crate::error::Result;
use crate::planner::ProvisioningPlan;
use crate::template::Template;
use crate::validate::validate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Everything an engine needs to provision one stack
#[derive(Debug, Clone)]
pub struct ProvisioningRequest {
    /// Target environment
    pub stack: StackContext,
    /// Rendered and validated template
    pub template: Template,
    /// Staged assets referenced by the template
    pub assets: AssetManifest,
    /// Directory holding the staged assets
    pub out_dir: PathBuf,
}

/// Value of a stack output as reported by an engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum OutputValue {
    /// Concrete value known after provisioning
    Resolved(String),
    /// Expression the provider resolves during provisioning
    Unresolved(Value),
}

impl fmt::Display for OutputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(value) => f.write_str(value),
            Self::Unresolved(expression) => write!(f, "<resolved at deploy: {expression}>"),
        }
    }
}

/// What an engine reports after accepting a request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub stack_name: String,
    /// Engine that handled the request
    pub engine: String,
    /// Named outputs keyed by logical id
    pub outputs: BTreeMap<String, OutputValue>,
    /// Files the engine wrote, if any
    pub artifacts: Vec<PathBuf>,
}

impl SubmitReceipt {
    /// Look up an output by logical id
    pub fn output(&self, id: &str) -> Option<&OutputValue> {
        self.outputs.get(id)
    }
}

/// Stage assets, render and validate a plan without submitting it
pub fn synthesize<O: SubmitObserver>(
    plan: &ProvisioningPlan,
    ctx: &StackContext,
    out_dir: &Path,
    observer: &mut O,
) -> Result<ProvisioningRequest> {
    let bucket = ctx.asset_bucket_name();
    let mut assets = AssetManifest::new();
    for source in plan.assets() {
        let staged = stage_asset(source, out_dir, &bucket)?;
        observer.on_asset_staged(&staged);
        assets.insert(staged);
    }

    let template = plan.render(&RenderContext::new(ctx, &assets))?;
    validate(&template)?;
    observer.on_validated(template.resources.len(), template.outputs.len());
    log::debug!(
        "Rendered {} with {} resources, {} outputs",
        ctx.stack_name,
        template.resources.len(),
        template.outputs.len()
    );

    Ok(ProvisioningRequest {
        stack: ctx.clone(),
        template,
        assets,
        out_dir: out_dir.to_path_buf(),
    })
}

/// Render and validate a plan without packaging assets
///
/// Object keys are computed from artifact contents, so the template matches
/// what [`synthesize`] produces while nothing is written to disk.
pub fn preview(plan: &ProvisioningPlan, ctx: &StackContext) -> Result<Template> {
    let bucket = ctx.asset_bucket_name();
    let mut assets = AssetManifest::new();
    for source in plan.assets() {
        assets.insert(locate_asset(source, &bucket)?);
    }

    let template = plan.render(&RenderContext::new(ctx, &assets))?;
    validate(&template)?;
    Ok(template)
}

/// Synthesize a plan and submit it to an engine
///
/// No retries: any failure from staging, validation or the engine is
/// returned as-is.
pub fn submit<E, O>(
    plan: &ProvisioningPlan,
    ctx: &StackContext,
    out_dir: &Path,
    engine: &E,
    observer: &mut O,
) -> Result<SubmitReceipt>
where
    E: ProvisioningEngine + ?Sized,
    O: SubmitObserver,
{
    let request = synthesize(plan, ctx, out_dir, observer)?;
    log::info!(
        "Submitting {} to {} ({})",
        ctx.stack_name,
        engine.name(),
        ctx.environment()
    );
    let receipt = engine.submit(&request)?;
    observer.on_submitted(&receipt);
    Ok(receipt)
}
