//! Configuration and network settings for the wallet tool.
//!
//! Holds the protocol constants used by key derivation and address
//! computation, the network-prefix registry, and env-driven defaults for
//! the CLI.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Upper bound on the number of accounts a single wallet may derive.
pub const MAX_ACCOUNTS_PER_WALLET: usize = 100;

/// Accounts derived when the caller doesn't ask for a specific number.
pub const DEFAULT_ACCOUNTS: usize = 1;

/// BIP44 purpose field.
pub const BIP44_PURPOSE: u32 = 44;

/// SLIP-0044 registered coin type for Spacemesh.
pub const BIP44_COIN_TYPE: u32 = 540;

/// BIP44 account field of the master path.
pub const BIP44_ACCOUNT: u32 = 0;

/// BIP44 change field of the master path.
pub const BIP44_CHANGE: u32 = 0;

/// Display name given to freshly created wallets.
pub const DEFAULT_DISPLAY_NAME: &str = "Main Wallet";

/// Mainnet human-readable address prefix.
pub const MAINNET_HRP: &str = "sm";

/// Testnet human-readable address prefix.
pub const TESTNET_HRP: &str = "stest";

/// Default network prefix
pub const DEFAULT_HRP: &str = MAINNET_HRP;

/// Directory under the home directory where wallet files are kept.
const WALLET_DIR_NAME: &str = ".spacemesh";

/// Network enum for type-safe prefix selection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Custom(String),
}

impl Network {
    /// The bech32 human-readable prefix for addresses on this network.
    pub fn hrp(&self) -> &str {
        match self {
            Network::Mainnet => MAINNET_HRP,
            Network::Testnet => TESTNET_HRP,
            Network::Custom(hrp) => hrp,
        }
    }

    /// Parse a network name; unknown names are taken as a literal prefix.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "mainnet" | "sm" => Network::Mainnet,
            "testnet" | "stest" => Network::Testnet,
            _ => Network::Custom(s.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Custom(hrp) => hrp,
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Default location for wallet files (`~/.spacemesh`).
pub fn default_wallet_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(WALLET_DIR_NAME)
}

/// Wallet tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address prefix used when displaying addresses
    pub hrp: String,
    /// Genesis identifier recorded in new wallet metadata
    pub genesis_id: String,
    /// Where wallet files are written by default
    pub wallet_dir: PathBuf,
    /// Display name given to new wallets
    pub display_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hrp: DEFAULT_HRP.to_string(),
            genesis_id: String::new(),
            wallet_dir: default_wallet_dir(),
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config for a specific network
    pub fn for_network(network: &Network) -> Self {
        Self {
            hrp: network.hrp().to_string(),
            ..Default::default()
        }
    }

    pub fn with_hrp(mut self, hrp: &str) -> Self {
        self.hrp = hrp.to_string();
        self
    }

    pub fn with_genesis_id(mut self, genesis_id: &str) -> Self {
        self.genesis_id = genesis_id.to_string();
        self
    }

    pub fn with_wallet_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.wallet_dir = dir.into();
        self
    }

    /// Load config from environment variables
    ///
    /// - `SMCLI_HRP`: address prefix (or a network name: mainnet, testnet)
    /// - `SMCLI_GENESIS_ID`: genesis id for new wallets
    /// - `SMCLI_WALLET_DIR`: wallet directory
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(hrp) = env::var("SMCLI_HRP") {
            config.hrp = Network::parse(&hrp).hrp().to_string();
        }

        if let Ok(genesis_id) = env::var("SMCLI_GENESIS_ID") {
            config.genesis_id = genesis_id;
        }

        if let Ok(dir) = env::var("SMCLI_WALLET_DIR") {
            config.wallet_dir = PathBuf::from(dir);
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert_eq!(config.hrp, "sm");
        assert_eq!(config.display_name, "Main Wallet");
        assert!(config.genesis_id.is_empty());
    }

    #[test]
    fn test_network_hrp() {
        assert_eq!(Network::Mainnet.hrp(), "sm");
        assert_eq!(Network::Testnet.hrp(), "stest");
        assert_eq!(Network::parse("TESTNET"), Network::Testnet);
        assert_eq!(Network::parse("foo").hrp(), "foo");
    }

    #[test]
    fn test_builder_pattern() {
        let config = Config::for_network(&Network::Testnet)
            .with_genesis_id("abcd")
            .with_wallet_dir("/tmp/wallets");

        assert_eq!(config.hrp, "stest");
        assert_eq!(config.genesis_id, "abcd");
        assert_eq!(config.wallet_dir, PathBuf::from("/tmp/wallets"));
    }

    #[test]
    fn test_account_bound() {
        assert!(DEFAULT_ACCOUNTS <= MAX_ACCOUNTS_PER_WALLET);
    }
}
