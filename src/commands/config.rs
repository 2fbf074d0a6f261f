use anyhow::{Result, bail};

use crate::Context;
use crate::cli::ConfigCommand;
use crate::config::StackConfig;
use crate::ui;

pub fn run(ctx: &Context, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => show(ctx),
        ConfigCommand::Path => path(ctx),
        ConfigCommand::Init { force } => init(ctx, force),
    }
}

fn show(ctx: &Context) -> Result<()> {
    print!("{}", ctx.config.to_toml()?);
    Ok(())
}

fn path(ctx: &Context) -> Result<()> {
    println!("{}", ctx.config_path.display());
    if !ctx.config_path.exists() && !ctx.quiet {
        ui::dim("Not found, using defaults");
    }
    Ok(())
}

fn init(ctx: &Context, force: bool) -> Result<()> {
    if ctx.config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            ctx.config_path.display()
        );
    }
    StackConfig::default().save(&ctx.config_path)?;
    ui::success(&format!("Wrote {}", ctx.config_path.display()));
    Ok(())
}
