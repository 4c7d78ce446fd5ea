//! Command-line interface for staybook.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

/// Staybook - hotel booking backend
#[derive(Parser, Debug)]
#[command(name = "staybook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to load instead of the default search path
    #[arg(long, global = true, env = "STAYBOOK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API (default)
    Serve,

    /// Create an administrator account
    CreateAdmin {
        #[arg(long)]
        email: String,

        #[arg(long)]
        username: String,

        /// Read from STAYBOOK_ADMIN_PASSWORD when omitted
        #[arg(long, env = "STAYBOOK_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Add a bookable hotel room
    AddRoom {
        #[arg(long)]
        title: String,

        #[arg(long)]
        hotel_name: String,

        #[arg(long)]
        location: String,

        /// Nightly price, e.g. `149.99`
        #[arg(long)]
        price: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// Load and validate configuration, then exit
    CheckConfig,
}

impl Cli {
    /// Loads the config file named on the command line, or searches the
    /// default locations. Environment overrides are applied either way.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => {
                let mut config = Config::load_from_path(path)?;
                config.apply_env_overrides();
                Ok(config)
            }
            None => Config::load(),
        }
    }
}

pub use commands::*;
