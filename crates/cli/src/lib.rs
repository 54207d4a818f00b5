//! # Squads Connect CLI
//!
//! Inspect a Squads v4 multisig and propose SOL transfers out of its vault
//! from the command line.

/// Configuration.
pub mod config;

/// Utils for wallet.
pub mod wallet;

/// Commands.
pub mod commands;

use std::{ops::Deref, path::PathBuf};

use clap::Parser;
use commands::{Command, CommandClient, Commands, Context};
use config::Config;
use eyre::OptionExt;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

const ENV_PREFIX: &str = "SQUADS_CONNECT_";
const CONFIG_DIR: &str = "squads-connect";

/// We use `__` in the name of environment variable as an alias of `.`.
///
/// See [`Env`] for more infomation.
const DOT_ALIAS: &str = "__";

/// Command-line interface for Squads Connect.
#[derive(Debug)]
pub struct Cli(Inner);

impl Cli {
    /// Creates from the command line arguments.
    pub fn init() -> eyre::Result<Self> {
        let cli = Inner::parse();

        let config_path = cli.find_config()?;
        let Inner {
            config, command, ..
        } = cli;

        let config = Figment::new()
            .merge(Toml::file(config_path.clone()))
            .merge(Env::prefixed(ENV_PREFIX).split(DOT_ALIAS))
            .merge(Serialized::defaults(config))
            .extract()?;

        Ok(Self(Inner {
            config_path: Some(config_path),
            config,
            command,
        }))
    }
}

impl Deref for Cli {
    type Target = Inner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Command-line interface for Squads Connect.
#[derive(Debug, Parser)]
#[command(name = "squads-connect", version, about)]
pub struct Inner {
    /// Path to the config file.
    #[clap(long = "config", short)]
    config_path: Option<PathBuf>,
    /// Config.
    #[command(flatten)]
    config: Config,
    /// Commands.
    #[command(subcommand)]
    command: Commands,
}

impl Inner {
    fn find_config(&self) -> eyre::Result<PathBuf> {
        use etcetera::{choose_base_strategy, BaseStrategy};

        match self.config_path.as_ref() {
            Some(path) => Ok(path.clone()),
            None => {
                let strategy = choose_base_strategy()?;
                Ok(strategy.config_dir().join(CONFIG_DIR).join("config.toml"))
            }
        }
    }

    /// Execute command.
    pub async fn execute(&self) -> eyre::Result<()> {
        let config_path = self
            .config_path
            .as_ref()
            .ok_or_eyre("config path is not set")?;
        let client = if self.command.is_client_required() {
            Some(CommandClient::new(&self.config)?)
        } else {
            None
        };
        self.command
            .execute(Context::new(config_path, &self.config, client.as_ref()))
            .await
    }
}
