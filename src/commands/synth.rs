//! `mailstack synth` - stage the artifact and write the cloud assembly

use anyhow::Result;
use colored::Colorize;
use stackkit::{
    CloudAssembly, NoProgress, StagedAsset, SubmitObserver, SubmitReceipt, submit, synthesize,
};

use crate::Context;
use crate::cli::SynthArgs;
use crate::ui;

pub fn run(ctx: &Context, args: SynthArgs) -> Result<()> {
    let out_dir = args.out.unwrap_or_else(|| ctx.config.output_dir());
    let (stack, plan) = super::declare(ctx)?;

    if args.stdout {
        let request = synthesize(&plan, &stack, &out_dir, &mut NoProgress)?;
        println!("{}", request.template.to_json()?);
        return Ok(());
    }

    if !ctx.quiet {
        ui::header(&format!("Synthesizing {}", stack.stack_name));
        ui::kv("Environment", &stack.environment());
        ui::kv("Output", &out_dir.display().to_string());
        println!();
    }

    let mut progress = Progress { quiet: ctx.quiet };
    let receipt = submit(&plan, &stack, &out_dir, &CloudAssembly, &mut progress)?;

    if ctx.quiet {
        return Ok(());
    }

    if !receipt.outputs.is_empty() {
        ui::section("Outputs");
        for (id, value) in &receipt.outputs {
            ui::kv(id, &value.to_string());
        }
    }

    if ctx.verbose > 0 {
        ui::section("Artifacts");
        for artifact in &receipt.artifacts {
            ui::dim(&artifact.display().to_string());
        }
    }

    Ok(())
}

/// Prints submission progress
struct Progress {
    quiet: bool,
}

impl SubmitObserver for Progress {
    fn on_asset_staged(&mut self, asset: &StagedAsset) {
        if !self.quiet {
            ui::success(&format!(
                "Staged {} {}",
                asset.source.display(),
                format!("({})", asset.file_name).dimmed()
            ));
        }
    }

    fn on_validated(&mut self, resources: usize, outputs: usize) {
        if !self.quiet {
            ui::success(&format!("Validated {resources} resources, {outputs} outputs"));
        }
    }

    fn on_submitted(&mut self, receipt: &SubmitReceipt) {
        if !self.quiet {
            ui::success(&format!(
                "Wrote {} via {}",
                receipt.stack_name.bold(),
                receipt.engine
            ));
        }
    }
}
