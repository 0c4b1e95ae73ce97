//! Run-time state shared by every step

use crate::cli::Cli;
use crate::config::Config;
use anyhow::{Context as _, Result};
use evefsd::{Installation, RouteOptions, Workspace};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub skip_setup: bool,
    pub force: bool,
    pub deep: bool,
}

impl Options {
    pub fn route(&self) -> RouteOptions {
        RouteOptions {
            force: self.force,
            deep: self.deep,
        }
    }
}

/// Built once in `main` and passed to every step
#[derive(Debug)]
pub struct Context {
    pub workspace: Workspace,
    pub config: Config,
    pub options: Options,
    game_path: Option<PathBuf>,
    server: Option<String>,
}

impl Context {
    pub fn new(cli: &Cli) -> Result<Self> {
        let config = Config::load(&cli.root)?;

        Ok(Context {
            workspace: Workspace::new(&cli.root),
            config,
            options: Options {
                skip_setup: cli.skip_setup,
                force: cli.force,
                deep: cli.deep,
            },
            game_path: cli.game_path.clone(),
            server: cli.server.clone(),
        })
    }

    /// Server chosen on the command line, else the configured one
    pub fn server(&self) -> &str {
        self.server.as_deref().unwrap_or_else(|| self.config.server())
    }

    /// Validate the installation named on the command line or in config.json
    pub fn installation(&self) -> Result<Installation> {
        let path = self
            .game_path
            .as_ref()
            .or(self.config.install_path.as_ref())
            .context("No game installation configured; pass --game-path or set EVEFSD_GAME_PATH")?;

        Installation::resolve(path, self.server())
            .with_context(|| format!("Invalid game installation at {}", path.display()))
    }

    pub fn save_config(&self) -> Result<()> {
        self.config.save(self.workspace.root())
    }
}
