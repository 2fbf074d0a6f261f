//! # stackkit
//!
//! Declarative provisioning plans for a single cloud stack.
//!
//! This crate provides the toolkit side of infrastructure-as-code: resources
//! are declared into a plan, the plan is rendered into a template, local
//! artifacts are staged, and the validated request is handed to a
//! provisioning engine.
//!
//! ## Core Concepts
//!
//! - **Resource**: one template entry with a type, a logical id and properties
//! - **ProvisioningPlan**: resources and outputs submitted as one unit
//! - **StackContext**: the target environment, passed explicitly
//! - **ProvisioningEngine**: executes a rendered request
//!
//! ## Example
//!
//! ```ignore
//! use stackkit::{
//!     CloudAssembly, ConstructPath, Intrinsic, NoProgress, ProvisioningPlan, StackContext,
//!     submit,
//! };
//!
//! let mut plan = ProvisioningPlan::new();
//! let table = my_table(ConstructPath::root("EmailsTable"));
//! let table_id = table.logical_id().clone();
//! plan.add_resource(Box::new(table))?;
//! plan.add_output("Table Arn", Intrinsic::get_att(&table_id, "Arn"))?;
//!
//! let ctx = StackContext::new("DeploymentStack");
//! let receipt = submit(&plan, &ctx, "cdk.out".as_ref(), &CloudAssembly, &mut NoProgress)?;
//! ```

pub mod assembly;
pub mod assets;
pub mod context;
pub mod diff;
pub mod error;
pub mod executor;
pub mod id;
pub mod planner;
pub mod resource;
pub mod template;
pub mod types;
pub mod validate;

// Re-export main types at crate root
pub use assembly::{AssemblyManifest, CloudAssembly, MANIFEST_FILE, template_path};
pub use assets::{
    AssetManifest, AssetSource, StagedAsset, hash_asset, locate_asset, stage_asset,
};
pub use context::{NoProgress, ProvisioningEngine, RenderContext, StackContext, SubmitObserver};
pub use diff::{
    ChangeKind, DiffSummary, OutputDiff, ResourceDiff, TemplateDiff, compute_diffs, group_by_type,
};
pub use error::{Error, ErrorCategory, Result};
pub use executor::{
    OutputValue, ProvisioningRequest, SubmitReceipt, preview, submit, synthesize,
};
pub use id::{ConstructPath, LogicalId};
pub use planner::{PlannedOutput, ProvisioningPlan};
pub use resource::{BoxedResource, Resource};
pub use template::{Template, TemplateOutput, TemplateResource};
pub use types::{Intrinsic, PseudoParameter, RemovalPolicy};
pub use validate::validate;
