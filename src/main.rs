mod cli;
mod commands;
mod config;
mod resource;
mod stack;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::StackConfig;
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    /// Effective configuration, overrides applied
    pub config: StackConfig,
    /// Where the configuration was looked up
    pub config_path: PathBuf,
}

fn main() {
    if let Err(err) = run() {
        ui::error(&format!("{err:#}"));
        if let Some(e) = err.downcast_ref::<stackkit::Error>() {
            ui::dim(e.category().advice());
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if let Command::Completions { shell } = cli.command {
        generate(shell, &mut Cli::command(), "mailstack", &mut io::stdout());
        return Ok(());
    }

    let config_path = config::config_path(cli.config.as_deref())?;
    let mut config = StackConfig::load_from(&config_path)?;
    config.apply(cli.stack.into());

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config,
        config_path,
    };

    match cli.command {
        Command::Synth(args) => commands::synth::run(&ctx, args),
        Command::List(args) => commands::list::run(&ctx, args.target.as_deref()),
        Command::Diff(args) => commands::diff::run(&ctx, args),
        Command::Config(cmd) => commands::config::run(&ctx, cmd),
        Command::Completions { .. } => Ok(()),
    }
}
