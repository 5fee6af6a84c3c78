//! The wallet aggregate.
//!
//! A [`Wallet`] pairs plaintext metadata with its secrets: the recovery
//! phrase (absent for hardware wallets), the master keypair and the ordered
//! account keypairs derived from it.
//!
//! ```text
//! mnemonic ──► seed ──► master m/44'/540'/0'/0'
//!                          ├── account 0  m/44'/540'/0'/0'/0'
//!                          ├── account 1  m/44'/540'/0'/0'/1'
//!                          └── ...
//! ```
//!
//! The seed only lives for the duration of construction.

use crate::config::{DEFAULT_DISPLAY_NAME, MAX_ACCOUNTS_PER_WALLET};
use crate::utils::now_time_string;
use crate::wallet::address::{public_key_to_address, AddressError};
use crate::wallet::hd::{
    derive_accounts, master_from_hardware, master_from_seed, DerivationError, KeySource,
};
use crate::wallet::keypair::KeyPair;
use crate::wallet::keystore::{EncryptedWalletFile, EncryptionParams, KeystoreError};
use crate::wallet::mnemonic::{Mnemonic, MnemonicError};
use crate::wallet::signer::HardwareSigner;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use zeroize::Zeroize;

/// Stored in place of the recovery phrase for hardware wallets.
pub const HARDWARE_MNEMONIC: &str = "(none)";

/// Errors that can occur while building or using a wallet.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("mnemonic error: {0}")]
    Mnemonic(#[from] MnemonicError),

    #[error("derivation error: {0}")]
    Derivation(#[from] DerivationError),

    #[error("keystore error: {0}")]
    Keystore(#[from] KeystoreError),

    #[error("address error: {0}")]
    Address(#[from] AddressError),
}

/// Plaintext wallet metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletMetadata {
    pub display_name: String,
    pub created: String,
    #[serde(rename = "genesisID")]
    pub genesis_id: String,
}

impl Default for WalletMetadata {
    fn default() -> Self {
        Self {
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            created: now_time_string(),
            genesis_id: String::new(),
        }
    }
}

/// The encrypted part of a wallet.
#[derive(Debug, Clone)]
pub struct WalletSecrets {
    mnemonic: Option<Mnemonic>,
    master_keypair: KeyPair,
    accounts: Vec<KeyPair>,
}

impl WalletSecrets {
    /// `None` for hardware wallets.
    pub fn mnemonic(&self) -> Option<&Mnemonic> {
        self.mnemonic.as_ref()
    }

    pub fn master_keypair(&self) -> &KeyPair {
        &self.master_keypair
    }

    /// Accounts in derivation order.
    pub fn accounts(&self) -> &[KeyPair] {
        &self.accounts
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SecretsRef<'a> {
    mnemonic: &'a str,
    master_keypair: &'a KeyPair,
    accounts: &'a [KeyPair],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretsOwned {
    mnemonic: String,
    master_keypair: KeyPair,
    accounts: Vec<KeyPair>,
}

impl Serialize for WalletSecrets {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SecretsRef {
            mnemonic: self
                .mnemonic
                .as_ref()
                .map_or(HARDWARE_MNEMONIC, |m| m.phrase()),
            master_keypair: &self.master_keypair,
            accounts: &self.accounts,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WalletSecrets {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error as _;

        let SecretsOwned {
            mut mnemonic,
            master_keypair,
            accounts,
        } = SecretsOwned::deserialize(deserializer)?;

        if accounts.len() > MAX_ACCOUNTS_PER_WALLET {
            mnemonic.zeroize();
            return Err(D::Error::custom(format!(
                "wallet holds {} accounts (maximum {})",
                accounts.len(),
                MAX_ACCOUNTS_PER_WALLET
            )));
        }

        let parsed = if mnemonic == HARDWARE_MNEMONIC {
            None
        } else {
            Some(Mnemonic::from_phrase(&mnemonic))
        };
        mnemonic.zeroize();
        let mnemonic = parsed.transpose().map_err(D::Error::custom)?;

        // The phrase and the key provenance have to agree
        if mnemonic.is_none() != master_keypair.is_hardware() {
            return Err(D::Error::custom(
                "recovery phrase does not match master keypair provenance",
            ));
        }
        if accounts
            .iter()
            .any(|account| account.is_hardware() != master_keypair.is_hardware())
        {
            return Err(D::Error::custom(
                "account keypair provenance differs from master keypair",
            ));
        }

        Ok(Self {
            mnemonic,
            master_keypair,
            accounts,
        })
    }
}

/// A wallet: metadata plus secrets.
#[derive(Clone)]
pub struct Wallet {
    meta: WalletMetadata,
    secrets: WalletSecrets,
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("meta", &self.meta)
            .field("hardware", &self.is_hardware())
            .field("accounts", &self.secrets.accounts.len())
            .finish()
    }
}

impl Wallet {
    /// Create a wallet from a fresh 24-word recovery phrase with `accounts`
    /// derived accounts.
    ///
    /// # Example
    /// ```
    /// use smcli::wallet::Wallet;
    /// let wallet = Wallet::from_random_mnemonic(2).unwrap();
    /// assert_eq!(wallet.accounts().len(), 2);
    /// assert_eq!(wallet.mnemonic().unwrap().word_count(), 24);
    /// ```
    pub fn from_random_mnemonic(accounts: usize) -> Result<Self, WalletError> {
        let mnemonic = Mnemonic::generate()?;
        Self::from_validated_mnemonic(mnemonic, accounts)
    }

    /// Restore a wallet from a user-supplied phrase.
    ///
    /// The phrase must be in canonical form (single spaces, no padding).
    pub fn from_mnemonic(phrase: &str, accounts: usize) -> Result<Self, WalletError> {
        let mnemonic = Mnemonic::from_phrase(phrase)?;
        Self::from_validated_mnemonic(mnemonic, accounts)
    }

    fn from_validated_mnemonic(mnemonic: Mnemonic, accounts: usize) -> Result<Self, WalletError> {
        let seed = mnemonic.to_seed("");
        let master = master_from_seed(&seed)?;
        let accounts = derive_accounts(&master, KeySource::Seed(&seed), accounts)?;
        drop(seed);

        tracing::info!(accounts = accounts.len(), "created wallet from mnemonic");
        Ok(Self {
            meta: WalletMetadata::default(),
            secrets: WalletSecrets {
                mnemonic: Some(mnemonic),
                master_keypair: master,
                accounts,
            },
        })
    }

    /// Create a wallet whose keys live on a hardware signer.
    ///
    /// No recovery phrase or private key is ever held locally.
    pub fn from_hardware(signer: &dyn HardwareSigner, accounts: usize) -> Result<Self, WalletError> {
        let master = master_from_hardware(signer)?;
        let accounts = derive_accounts(&master, KeySource::Hardware(signer), accounts)?;

        tracing::info!(accounts = accounts.len(), "created hardware wallet");
        Ok(Self {
            meta: WalletMetadata::default(),
            secrets: WalletSecrets {
                mnemonic: None,
                master_keypair: master,
                accounts,
            },
        })
    }

    pub(crate) fn from_parts(meta: WalletMetadata, secrets: WalletSecrets) -> Self {
        Self { meta, secrets }
    }

    pub fn metadata(&self) -> &WalletMetadata {
        &self.meta
    }

    pub fn secrets(&self) -> &WalletSecrets {
        &self.secrets
    }

    pub fn mnemonic(&self) -> Option<&Mnemonic> {
        self.secrets.mnemonic()
    }

    pub fn master_keypair(&self) -> &KeyPair {
        self.secrets.master_keypair()
    }

    pub fn accounts(&self) -> &[KeyPair] {
        self.secrets.accounts()
    }

    pub fn is_hardware(&self) -> bool {
        self.secrets.mnemonic.is_none()
    }

    pub fn display_name(&self) -> &str {
        &self.meta.display_name
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) {
        self.meta.display_name = name.into();
    }

    pub fn genesis_id(&self) -> &str {
        &self.meta.genesis_id
    }

    pub fn set_genesis_id(&mut self, genesis_id: impl Into<String>) {
        self.meta.genesis_id = genesis_id.into();
    }

    /// Bech32 addresses of all accounts under the network prefix `hrp`.
    pub fn addresses(&self, hrp: &str) -> Result<Vec<String>, WalletError> {
        self.accounts()
            .iter()
            .map(|account| Ok(public_key_to_address(account.public_key(), hrp)?))
            .collect()
    }

    /// Encrypt the secrets under `passphrase`.
    pub fn encrypt(
        &self,
        passphrase: &str,
        params: &EncryptionParams,
    ) -> Result<EncryptedWalletFile, WalletError> {
        Ok(EncryptedWalletFile::encrypt(self, passphrase, params)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::keystore::{Cipher, EncryptedSecrets, Kdf};

    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn light_params() -> EncryptionParams {
        EncryptionParams::new(
            Kdf::Argon2id {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
            Cipher::XSalsa20Poly1305,
        )
    }

    #[test]
    fn test_defaults() {
        let wallet = Wallet::from_mnemonic(ABANDON, 1).unwrap();
        assert_eq!(wallet.display_name(), "Main Wallet");
        assert_eq!(wallet.genesis_id(), "");
        assert!(!wallet.is_hardware());
        assert_eq!(wallet.accounts().len(), 1);
    }

    #[test]
    fn test_restore_is_deterministic() {
        let a = Wallet::from_mnemonic(ABANDON, 3).unwrap();
        let b = Wallet::from_mnemonic(ABANDON, 3).unwrap();
        assert_eq!(a.master_keypair().public_key(), b.master_keypair().public_key());
        for (x, y) in a.accounts().iter().zip(b.accounts()) {
            assert_eq!(x.public_key(), y.public_key());
            assert_eq!(x.path(), y.path());
        }
    }

    #[test]
    fn test_account_paths_in_order() {
        let wallet = Wallet::from_mnemonic(ABANDON, 3).unwrap();
        for (i, account) in wallet.accounts().iter().enumerate() {
            assert_eq!(account.path().to_string(), format!("m/44'/540'/0'/0'/{}'", i));
        }
    }

    #[test]
    fn test_rejects_bad_phrase() {
        assert!(matches!(
            Wallet::from_mnemonic(&format!(" {}", ABANDON), 1),
            Err(WalletError::Mnemonic(MnemonicError::WhitespaceViolation))
        ));
        assert!(matches!(
            Wallet::from_mnemonic("abandon abandon abandon", 1),
            Err(WalletError::Mnemonic(MnemonicError::InvalidMnemonic(_)))
        ));
    }

    #[test]
    fn test_account_bounds() {
        assert!(Wallet::from_mnemonic(ABANDON, 0).unwrap().accounts().is_empty());
        assert!(matches!(
            Wallet::from_mnemonic(ABANDON, MAX_ACCOUNTS_PER_WALLET + 1),
            Err(WalletError::Derivation(DerivationError::InvalidAccountCount { .. }))
        ));
    }

    #[test]
    fn test_addresses() {
        let wallet = Wallet::from_mnemonic(ABANDON, 2).unwrap();
        let addresses = wallet.addresses("sm").unwrap();
        assert_eq!(addresses.len(), 2);
        assert_ne!(addresses[0], addresses[1]);
        assert!(addresses.iter().all(|a| a.starts_with("sm1")));
    }

    #[test]
    fn test_secrets_json_layout() {
        let wallet = Wallet::from_mnemonic(ABANDON, 1).unwrap();
        let json = serde_json::to_value(wallet.secrets()).unwrap();
        assert_eq!(json["mnemonic"], ABANDON);
        assert!(json["masterKeypair"]["secretKey"].is_string());
        assert_eq!(json["accounts"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_metadata_json_layout() {
        let mut wallet = Wallet::from_mnemonic(ABANDON, 0).unwrap();
        wallet.set_genesis_id("abcdef");
        wallet.set_display_name("Savings");
        let json = serde_json::to_value(wallet.metadata()).unwrap();
        assert_eq!(json["displayName"], "Savings");
        assert_eq!(json["genesisID"], "abcdef");
        assert!(json["created"].is_string());
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let mut wallet = Wallet::from_mnemonic(ABANDON, 2).unwrap();
        wallet.set_display_name("Round Trip");
        let file = wallet.encrypt("pw", &light_params()).unwrap();
        assert_eq!(file.meta.display_name, "Round Trip");

        let restored = file.decrypt("pw").unwrap();
        assert_eq!(
            serde_json::to_vec(restored.secrets()).unwrap(),
            serde_json::to_vec(wallet.secrets()).unwrap()
        );
        assert_eq!(restored.metadata(), wallet.metadata());
        assert_eq!(restored.mnemonic().unwrap().phrase(), ABANDON);
    }

    #[test]
    fn test_decrypt_rejects_too_many_accounts() {
        let wallet = Wallet::from_mnemonic(ABANDON, 1).unwrap();
        let mut json = serde_json::to_value(wallet.secrets()).unwrap();
        let account = json["accounts"][0].clone();
        json["accounts"] = serde_json::Value::Array(vec![account; MAX_ACCOUNTS_PER_WALLET + 1]);
        let plaintext = serde_json::to_vec(&json).unwrap();

        let file = EncryptedWalletFile {
            meta: wallet.metadata().clone(),
            crypto: EncryptedSecrets::seal(&plaintext, "pw", &light_params()).unwrap(),
        };
        assert!(matches!(
            file.decrypt("pw"),
            Err(KeystoreError::InvalidSecrets(_))
        ));
    }

    #[test]
    fn test_secrets_provenance_checked() {
        let wallet = Wallet::from_mnemonic(ABANDON, 0).unwrap();
        let mut json = serde_json::to_value(wallet.secrets()).unwrap();
        json["mnemonic"] = serde_json::Value::String(HARDWARE_MNEMONIC.to_string());
        assert!(serde_json::from_value::<WalletSecrets>(json).is_err());
    }
}
