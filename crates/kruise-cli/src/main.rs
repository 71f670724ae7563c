//! kruise - deploy bundles of helm charts, secrets and manifests by name

use clap::{Args, Parser, Subcommand};

mod commands;
mod display;
mod error;
mod exit_codes;
mod logging;
mod prompt;

use commands::RunFlags;
use error::Result;

#[derive(Parser)]
#[command(name = "kruise")]
#[command(version)]
#[command(about = "Deploy helm charts, secrets and manifests to Kubernetes by name", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy deployments and profiles
    #[command(visible_alias = "dep")]
    Deploy {
        /// Deployment names, aliases or profiles
        #[arg(required = true)]
        args: Vec<String>,

        #[command(flatten)]
        flags: Flags,
    },

    /// Delete deployments and profiles
    #[command(visible_alias = "del")]
    Delete {
        /// Deployment names, aliases or profiles
        #[arg(required = true)]
        args: Vec<String>,

        #[command(flatten)]
        flags: Flags,
    },

    /// List deployments and profiles in the manifest
    List,
}

#[derive(Args, Debug)]
struct Flags {
    /// Print the commands instead of running them
    #[arg(short, long)]
    dry_run: bool,

    /// Run units of equal priority together, lowest priority first
    #[arg(short, long)]
    concurrent: bool,

    /// Run every unit at once, ignoring priorities
    #[arg(short, long)]
    parallel: bool,

    /// Include repositories and secrets
    #[arg(short, long)]
    init: bool,
}

impl From<Flags> for RunFlags {
    fn from(flags: Flags) -> Self {
        RunFlags {
            dry_run: flags.dry_run,
            concurrent: flags.concurrent,
            parallel: flags.parallel,
            init: flags.init,
        }
    }
}

#[tokio::main]
async fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Deploy { args, flags } => {
            commands::deploy::run(&args, &flags.into(), cli.debug).await
        }
        Commands::Delete { args, flags } => {
            commands::delete::run(&args, &flags.into(), cli.debug).await
        }
        Commands::List => commands::list::run(cli.debug).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_deploy_flags() {
        let cli = Cli::try_parse_from(["kruise", "dep", "-d", "-c", "-i", "observability", "mongo"]).unwrap();
        match cli.command {
            Commands::Deploy { args, flags } => {
                assert_eq!(args, vec!["observability", "mongo"]);
                let flags = RunFlags::from(flags);
                assert!(flags.dry_run && flags.concurrent && flags.init);
                assert!(!flags.parallel);
            }
            _ => panic!("expected deploy"),
        }
    }

    #[test]
    fn test_delete_requires_args() {
        assert!(Cli::try_parse_from(["kruise", "delete"]).is_err());
        assert!(Cli::try_parse_from(["kruise", "del", "--parallel", "kafka"]).is_ok());
    }
}
