//! `mailstack list` - show declared resources

use anyhow::Result;
use colored::Colorize;

use crate::Context;
use crate::ui;

pub fn run(ctx: &Context, target: Option<&str>) -> Result<()> {
    let (stack, plan) = super::declare(ctx)?;
    let plan = plan.filter_by_target(target);

    if plan.is_empty() {
        match target {
            Some(t) => ui::warn(&format!("No resources match '{t}'")),
            None => ui::warn("No resources declared"),
        }
        return Ok(());
    }

    ui::header(&format!("{} ({})", stack.stack_name, stack.environment()));
    for resource in plan.resources() {
        println!(
            "  {} {}",
            resource.logical_id().as_str().bold(),
            resource.resource_type().dimmed()
        );
        if !ctx.quiet {
            ui::dim(&format!("  {}", resource.description()));
        }
    }

    if target.is_none() && !plan.outputs().is_empty() {
        ui::section("Outputs");
        for output in plan.outputs() {
            ui::kv(output.id.as_str(), &output.name);
        }
    }

    println!();
    ui::dim(&format!("{} resources", plan.total_resources()));
    Ok(())
}
