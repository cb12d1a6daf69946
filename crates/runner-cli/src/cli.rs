use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use runner_types::Transition;

#[derive(Parser)]
#[command(
    name = "runner",
    about = "Runner: change detection and operation planning for remote commands",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Engine configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the payload digest of local files
    Hash(HashArgs),
    /// Check every payload entry of a specification
    Validate(ValidateArgs),
    /// Show the merged operation a transition would run
    Plan(PlanArgs),
    /// Compare a specification with the stored state of a resource
    Diff(DiffArgs),
    /// Inspect stored resource state
    State(StateArgs),
}

#[derive(Args)]
pub struct HashArgs {
    #[arg(required = true)]
    pub paths: Vec<String>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Resource specification (JSON)
    #[arg(long)]
    pub spec: PathBuf,
}

#[derive(Args)]
pub struct PlanArgs {
    #[arg(long)]
    pub spec: PathBuf,
    #[arg(long, value_enum)]
    pub transition: TransitionArg,
}

#[derive(Args)]
pub struct DiffArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub spec: PathBuf,
}

#[derive(Args)]
pub struct StateArgs {
    #[command(subcommand)]
    pub action: StateAction,
}

#[derive(Subcommand)]
pub enum StateAction {
    /// Print the stored state of one resource
    Show { name: String },
    /// List stored resources
    List,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum TransitionArg {
    Create,
    Update,
    Delete,
}

impl From<TransitionArg> for Transition {
    fn from(arg: TransitionArg) -> Self {
        match arg {
            TransitionArg::Create => Transition::Create,
            TransitionArg::Update => Transition::Update,
            TransitionArg::Delete => Transition::Delete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plan_with_globals() {
        let cli = Cli::try_parse_from([
            "runner",
            "plan",
            "--spec",
            "web.json",
            "--transition",
            "delete",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Command::Plan(args) => {
                assert_eq!(Transition::from(args.transition), Transition::Delete);
                assert_eq!(args.spec, PathBuf::from("web.json"));
            }
            _ => panic!("expected plan"),
        }
    }

    #[test]
    fn hash_requires_a_path() {
        assert!(Cli::try_parse_from(["runner", "hash"]).is_err());
    }

    #[test]
    fn state_subcommands() {
        let cli = Cli::try_parse_from(["runner", "-v", "state", "show", "web"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Command::State(StateArgs { action: StateAction::Show { ref name } }) if name == "web"
        ));
    }
}
