use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::Overrides;

#[derive(Parser)]
#[command(name = "mailstack")]
#[command(version)]
#[command(about = "Synthesize the email Lambda stack", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ~/.config/mailstack/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub stack: StackArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Overrides for values otherwise taken from the config file
#[derive(Args, Debug, Default)]
pub struct StackArgs {
    /// Stack name
    #[arg(long, global = true)]
    pub stack_name: Option<String>,

    /// Target account
    #[arg(long, env = "AWS_ACCOUNT_ID", global = true)]
    pub account: Option<String>,

    /// Target region
    #[arg(long, env = "AWS_REGION", global = true)]
    pub region: Option<String>,

    /// Prebuilt function artifact (file or directory)
    #[arg(long, global = true)]
    pub artifact: Option<String>,

    /// Function runtime (e.g., provided.al2023)
    #[arg(long, global = true)]
    pub runtime: Option<String>,

    /// Function handler
    #[arg(long, global = true)]
    pub handler: Option<String>,
}

impl From<StackArgs> for Overrides {
    fn from(args: StackArgs) -> Self {
        Self {
            stack_name: args.stack_name,
            account: args.account,
            region: args.region,
            artifact: args.artifact,
            runtime: args.runtime,
            handler: args.handler,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Stage the artifact and write the cloud assembly
    Synth(SynthArgs),

    /// List declared resources
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Compare the current definition against a synthesized template
    ///
    /// Artifacts are hashed but not packaged; nothing is written.
    Diff(DiffArgs),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Args)]
pub struct SynthArgs {
    /// Output directory (default from config: cdk.out)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Print the template to stdout instead of a summary
    #[arg(long)]
    pub stdout: bool,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Target filter: type or type.name (e.g., "functions", "iam.Policy")
    pub target: Option<String>,
}

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Previously synthesized template (default: <out>/<stack>.template.json)
    pub template: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Print the config file location
    Path,

    /// Write a config file with the default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_synth_args() {
        let cli = Cli::try_parse_from(["mailstack", "synth", "--out", "build", "--stdout"]).unwrap();
        match cli.command {
            Command::Synth(args) => {
                assert_eq!(args.out, Some(PathBuf::from("build")));
                assert!(args.stdout);
            }
            _ => panic!("expected synth"),
        }
    }

    #[test]
    fn test_global_overrides_after_subcommand() {
        let cli = Cli::try_parse_from([
            "mailstack",
            "list",
            "functions",
            "--handler",
            "bootstrap",
            "--runtime",
            "provided.al2",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.stack.handler.as_deref(), Some("bootstrap"));
        assert_eq!(cli.stack.runtime.as_deref(), Some("provided.al2"));
        match cli.command {
            Command::List(args) => assert_eq!(args.target.as_deref(), Some("functions")),
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_overrides_conversion() {
        let cli = Cli::try_parse_from(["mailstack", "--stack-name", "Mail", "config", "show"])
            .unwrap();
        let overrides = Overrides::from(cli.stack);
        assert_eq!(overrides.stack_name.as_deref(), Some("Mail"));
        assert!(overrides.artifact.is_none());
    }
}
