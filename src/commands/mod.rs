pub mod config;
pub mod diff;
pub mod list;
pub mod synth;

use anyhow::{Context as AnyhowContext, Result};
use stackkit::{ProvisioningPlan, StackContext};

use crate::Context;
use crate::stack;

/// Declare the stack from the effective configuration
fn declare(ctx: &Context) -> Result<(StackContext, ProvisioningPlan)> {
    let stack = stack::context(&ctx.config);
    let plan = stack::define(&stack, &ctx.config).context("Failed to declare stack")?;
    Ok((stack, plan))
}
