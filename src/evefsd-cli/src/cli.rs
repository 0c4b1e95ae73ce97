//! CLI argument definitions for evefsd

use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "evefsd")]
#[command(about = "Extract EVE Frontier client data into JSON", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Steps to run, comma separated
    #[arg(long, value_enum, value_delimiter = ',', default_value = "all")]
    pub steps: Vec<Step>,

    /// Skip installation setup even when it is selected
    #[arg(long)]
    pub skip_setup: bool,

    /// Redo conversions whose output already exists
    #[arg(long)]
    pub force: bool,

    /// Also export the tables of every SQLite database found
    #[arg(long)]
    pub deep: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Working tree root
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Game installation (shared cache) directory
    #[arg(long, env = "EVEFSD_GAME_PATH")]
    pub game_path: Option<PathBuf>,

    /// Server directory inside the installation (default stillness)
    #[arg(long)]
    pub server: Option<String>,
}

/// Pipeline steps, declared in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Step {
    Setup,
    Index,
    Fsdbinary,
    Types,
    Blueprints,
    Stellar,
    Cleanup,
    All,
}

impl Step {
    /// Steps `all` stands for
    const ALL: [Step; 6] = [
        Step::Setup,
        Step::Index,
        Step::Fsdbinary,
        Step::Types,
        Step::Blueprints,
        Step::Stellar,
    ];

    /// Expand `all`, drop duplicates, and sort into execution order
    pub fn resolve(selected: &[Step]) -> Vec<Step> {
        let mut steps: Vec<Step> = selected
            .iter()
            .flat_map(|step| match step {
                Step::All => Self::ALL.to_vec(),
                other => vec![*other],
            })
            .collect();
        steps.sort();
        steps.dedup();
        steps
    }

    pub fn name(self) -> &'static str {
        match self {
            Step::Setup => "setup",
            Step::Index => "index",
            Step::Fsdbinary => "fsdbinary",
            Step::Types => "types",
            Step::Blueprints => "blueprints",
            Step::Stellar => "stellar",
            Step::Cleanup => "cleanup",
            Step::All => "all",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_all() {
        let cli = Cli::try_parse_from(["evefsd"]).unwrap();
        assert_eq!(cli.steps, vec![Step::All]);
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(!cli.force);
    }

    #[test]
    fn test_parse_step_list() {
        let cli = Cli::try_parse_from(["evefsd", "--steps", "types,blueprints", "--deep", "-v"]).unwrap();
        assert_eq!(cli.steps, vec![Step::Types, Step::Blueprints]);
        assert!(cli.deep);
        assert!(cli.verbose);
    }

    #[test]
    fn test_parse_rejects_unknown_step() {
        assert!(Cli::try_parse_from(["evefsd", "--steps", "types,bogus"]).is_err());
    }

    #[test]
    fn test_resolve_orders_and_dedups() {
        let steps = Step::resolve(&[Step::Stellar, Step::Types, Step::Stellar, Step::Index]);
        assert_eq!(steps, vec![Step::Index, Step::Types, Step::Stellar]);
    }

    #[test]
    fn test_resolve_all_excludes_cleanup() {
        let steps = Step::resolve(&[Step::All]);
        assert_eq!(steps.len(), 6);
        assert!(!steps.contains(&Step::Cleanup));
        assert!(!steps.contains(&Step::All));

        let with_cleanup = Step::resolve(&[Step::Cleanup, Step::All]);
        assert_eq!(with_cleanup.last(), Some(&Step::Cleanup));
    }
}
