//! Command-line front end for smcli.
//!
//! # Commands
//!
//! - `wallet` - Create, restore, read and list encrypted wallet files
//! - `multisig` - Compute multisig account addresses

use crate::config::{Config, Network};
use crate::logging::{init_logging, LogFormat, LoggingConfig};
use clap::{Parser, Subcommand};

pub mod commands;
pub mod utils;

/// Spacemesh wallet CLI
#[derive(Parser)]
#[command(name = "smcli")]
#[command(version)]
#[command(about = "Spacemesh wallet key management", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Network whose address prefix to use (mainnet, testnet)
    #[arg(short, long, global = true)]
    pub network: Option<String>,

    /// Address prefix (overrides --network)
    #[arg(long, global = true)]
    pub hrp: Option<String>,

    /// Log output format (text, json, compact)
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Don't prompt for confirmations (auto-approve)
    #[arg(long, global = true)]
    pub no_prompt: bool,
}

impl Cli {
    /// Effective configuration: environment defaults overridden by flags.
    pub fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(network) = &self.network {
            config.hrp = Network::parse(network).hrp().to_string();
        }
        if let Some(hrp) = &self.hrp {
            config.hrp = hrp.clone();
        }
        config
    }

    fn logging_config(&self) -> LoggingConfig {
        let mut config = LoggingConfig::from_env().with_quiet(true);
        if let Some(format) = self.log_format {
            config.format = format;
        }
        if self.debug {
            config.debug = true;
        }
        config
    }
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Wallet operations (create, read, list)
    #[command(alias = "w")]
    Wallet(commands::wallet::WalletCommand),

    /// Multisig operations
    #[command(alias = "ms")]
    Multisig(commands::multisig::MultisigCommand),
}

/// Run the CLI application
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.logging_config());

    let config = cli.config();
    tracing::debug!(hrp = %config.hrp, wallet_dir = %config.wallet_dir.display(), "resolved configuration");

    match &cli.command {
        Commands::Wallet(cmd) => commands::wallet::execute(cmd.clone(), &cli, &config),
        Commands::Multisig(cmd) => commands::multisig::execute(cmd.clone(), &config),
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
    fn test_hrp_flag_overrides_network() {
        let cli = Cli::parse_from([
            "smcli",
            "--network",
            "testnet",
            "--hrp",
            "custom",
            "multisig",
            "address",
            "--threshold",
            "1",
            "--pubkey",
            &"01".repeat(32),
            "--pubkey",
            &"02".repeat(32),
        ]);
        assert_eq!(cli.config().hrp, "custom");
    }

    #[test]
    fn test_network_flag() {
        let cli = Cli::parse_from(["smcli", "--network", "testnet", "wallet", "list"]);
        assert_eq!(cli.config().hrp, "stest");
    }

    #[test]
    fn test_log_format_flag() {
        let cli = Cli::parse_from(["smcli", "--log-format", "json", "wallet", "list"]);
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert_eq!(cli.logging_config().format, LogFormat::Json);
    }
}
