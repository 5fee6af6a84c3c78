//! # smcli
//!
//! Key management for Spacemesh wallets: BIP39 recovery phrases,
//! hierarchical ed25519 accounts (seed- or hardware-backed), principal
//! addresses, multisig spawn parameters and encrypted wallet files.
//!
//! ```
//! use smcli::wallet::{public_key_to_address, Wallet};
//!
//! let wallet = Wallet::from_random_mnemonic(1).unwrap();
//! let account = &wallet.accounts()[0];
//! let address = public_key_to_address(account.public_key(), "sm").unwrap();
//! assert!(address.starts_with("sm1"));
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod utils;
pub mod wallet;

pub use config::{Config, Network, MAX_ACCOUNTS_PER_WALLET};
pub use error::{Error, Result};

pub use logging::{
    init_default_logging, init_logging, is_initialized, CompactFormatter, LogFormat,
    LoggingConfig, SmcliFormatter,
};

pub use wallet::{
    public_key_to_address, spawn_multisig, Address, EncryptedWalletFile, EncryptionParams,
    HardwareSigner, KeyPair, Mnemonic, MultisigSpawn, PublicKey, Wallet,
};
