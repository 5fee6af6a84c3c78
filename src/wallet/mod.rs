//! Wallet key management for Spacemesh.
//!
//! This module provides:
//!
//! - **Recovery phrases** (BIP39, strict canonical spacing)
//! - **HD accounts** (SLIP-0010 ed25519 under `m/44'/540'/0'/0'`)
//! - **Hardware signers** (keys that never leave the device)
//! - **Principal addresses** (template hash, bech32 with an explicit prefix)
//! - **Multisig spawn parameters**
//! - **Encrypted wallet files** (Argon2id + XSalsa20-Poly1305 by default)
//!
//! ## Quick Start
//!
//! ### Create and encrypt a wallet
//!
//! ```no_run
//! use smcli::wallet::{EncryptionParams, Wallet};
//!
//! let wallet = Wallet::from_random_mnemonic(1).unwrap();
//! println!("Save this: {}", wallet.mnemonic().unwrap().phrase());
//!
//! let file = wallet.encrypt("passphrase", &EncryptionParams::default()).unwrap();
//! let restored = file.decrypt("passphrase").unwrap();
//! assert_eq!(restored.accounts().len(), 1);
//! ```
//!
//! ### Addresses
//!
//! ```
//! use smcli::wallet::Wallet;
//!
//! let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
//! let wallet = Wallet::from_mnemonic(phrase, 2).unwrap();
//! for address in wallet.addresses("stest").unwrap() {
//!     assert!(address.starts_with("stest1"));
//! }
//! ```
//!
//! ## Security Notes
//!
//! - Seeds and private keys live in [`SecretBytes`], which is wiped on drop.
//!   Recovery phrases are wiped the same way.
//! - Decryption failures never return partial plaintext.
//! - Wallet files are written with mode 0600 on Unix.

pub mod address;
pub mod hd;
pub mod keypair;
pub mod keystore;
pub mod mnemonic;
pub mod multisig;
pub mod secret;
pub mod signer;
pub mod store;
#[allow(clippy::module_inception)]
pub mod wallet;

pub use address::{
    compute_principal, public_key_to_address, wallet_principal, Address, AddressError,
    WalletSpawnArguments, ADDRESS_LENGTH, MULTISIG_TEMPLATE, WALLET_TEMPLATE,
};
pub use hd::{
    derive_accounts, derive_child, master_from_hardware, master_from_seed, DerivationError,
    HdPath, KeySource,
};
pub use keypair::{KeyPair, KeypairError, PublicKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
pub use keystore::{
    Cipher, EncryptedSecrets, EncryptedWalletFile, EncryptionParams, Kdf, KeystoreError,
    Pbkdf2Hash,
};
pub use mnemonic::{Mnemonic, MnemonicError};
pub use multisig::{spawn_multisig, MultisigError, MultisigSpawn, MultisigSpawnArguments};
pub use secret::{SecretBytes, Seed};
pub use signer::{HardwareSigner, SignerError};
pub use store::{
    default_file_name, default_wallet_path, list_wallet_files, read_wallet_file,
    write_wallet_file, StoreError,
};
pub use wallet::{Wallet, WalletError, WalletMetadata, WalletSecrets, HARDWARE_MNEMONIC};
