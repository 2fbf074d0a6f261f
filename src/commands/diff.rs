//! `mailstack diff` - compare the definition against a synthesized template

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use stackkit::{
    ChangeKind, DiffSummary, Template, compute_diffs, group_by_type, preview, template_path,
};
use std::path::PathBuf;

use crate::Context;
use crate::cli::DiffArgs;
use crate::ui;

pub fn run(ctx: &Context, args: DiffArgs) -> Result<()> {
    let out_dir = ctx.config.output_dir();
    let (stack, plan) = super::declare(ctx)?;

    let previous_path: PathBuf = args
        .template
        .unwrap_or_else(|| template_path(&out_dir, &stack.stack_name));
    let previous = Template::load(&previous_path)
        .with_context(|| format!("Could not load template {}", previous_path.display()))?;

    let current = preview(&plan, &stack)?;
    let diff = compute_diffs(&previous, &current);

    ui::header("Stack Diff");
    ui::kv("Against", &previous_path.display().to_string());

    if diff.is_empty() {
        println!();
        ui::success("No changes - template matches the current definition");
        return Ok(());
    }

    for (resource_type, diffs) in group_by_type(&diff.resources) {
        ui::section(&resource_type);
        for d in diffs {
            let line = format!("{} {}", symbol(d.change), d.resource_id);
            println!("  {}", colorize(d.change, &line));
            if !d.changed_properties.is_empty() {
                ui::dim(&format!("    {}", d.changed_properties.join(", ")));
            }
        }
    }

    if !diff.outputs.is_empty() {
        ui::section("Outputs");
        for o in &diff.outputs {
            let line = format!("{} {}", symbol(o.change), o.output_id);
            println!("  {}", colorize(o.change, &line));
        }
    }

    let summary = DiffSummary::from_diffs(&diff.resources);
    println!();
    ui::info(&format!(
        "{} to add, {} to change, {} to replace, {} to remove",
        summary.additions, summary.modifications, summary.replacements, summary.removals
    ));

    Ok(())
}

fn symbol(change: ChangeKind) -> &'static str {
    match change {
        ChangeKind::Added => "+",
        ChangeKind::Removed => "-",
        ChangeKind::Modified => "~",
        ChangeKind::Replaced => "±",
    }
}

fn colorize(change: ChangeKind, line: &str) -> String {
    match change {
        ChangeKind::Added => line.green().to_string(),
        ChangeKind::Removed => line.red().to_string(),
        ChangeKind::Modified => line.yellow().to_string(),
        ChangeKind::Replaced => line.magenta().to_string(),
    }
}
