//! Hardware signer tests
//!
//! Uses an in-process signer double that derives keys the same way a device
//! would and can be told to fail after a number of calls.

use smcli::wallet::hd::derive_secret;
use smcli::wallet::{
    derive_child, master_from_hardware, master_from_seed, DerivationError, HardwareSigner, HdPath,
    KeyPair, KeySource, KeypairError, Mnemonic, PublicKey, Seed, SignerError, Wallet,
    WalletError, HARDWARE_MNEMONIC, SIGNATURE_LENGTH,
};
use smcli::wallet::{Cipher, EncryptionParams, Kdf};
use std::cell::Cell;

const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

struct DeviceDouble {
    seed: Seed,
    calls: Cell<usize>,
    fail_after: Option<(usize, SignerError)>,
}

impl DeviceDouble {
    fn new() -> Self {
        Self {
            seed: Mnemonic::from_phrase(ABANDON).unwrap().to_seed(""),
            calls: Cell::new(0),
            fail_after: None,
        }
    }

    fn failing_after(calls: usize, error: SignerError) -> Self {
        Self {
            fail_after: Some((calls, error)),
            ..Self::new()
        }
    }

    fn keypair(&self, path: &HdPath) -> Result<KeyPair, SignerError> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        if let Some((limit, error)) = &self.fail_after {
            if call >= *limit {
                return Err(error.clone());
            }
        }
        let secret = derive_secret(&self.seed, path).unwrap();
        Ok(KeyPair::from_secret_seed(secret, path.clone()).unwrap())
    }
}

impl HardwareSigner for DeviceDouble {
    fn public_key(&self, path: &HdPath) -> Result<PublicKey, SignerError> {
        Ok(*self.keypair(path)?.public_key())
    }

    fn sign(&self, path: &HdPath, message: &[u8]) -> Result<[u8; SIGNATURE_LENGTH], SignerError> {
        Ok(self.keypair(path)?.sign(message).unwrap())
    }
}

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
fn test_hardware_master_has_no_private_key() {
    let device = DeviceDouble::new();
    let master = master_from_hardware(&device).unwrap();
    assert!(master.is_hardware());
    assert!(master.secret_key().is_none());
    assert_eq!(master.path(), &HdPath::master());
    assert!(matches!(
        master.sign(b"msg"),
        Err(KeypairError::RequiresSigner)
    ));
}

#[test]
fn test_hardware_keys_match_seed_derivation() {
    let device = DeviceDouble::new();
    let hardware = Wallet::from_hardware(&device, 3).unwrap();
    let software = Wallet::from_mnemonic(ABANDON, 3).unwrap();

    assert_eq!(
        hardware.master_keypair().public_key(),
        software.master_keypair().public_key()
    );
    for (hw, sw) in hardware.accounts().iter().zip(software.accounts()) {
        assert_eq!(hw.public_key(), sw.public_key());
        assert!(hw.is_hardware());
    }
    assert_eq!(
        hardware.addresses("sm").unwrap(),
        software.addresses("sm").unwrap()
    );
}

#[test]
fn test_signing_is_delegated() {
    let device = DeviceDouble::new();
    let wallet = Wallet::from_hardware(&device, 1).unwrap();
    let account = &wallet.accounts()[0];

    let signature = account.sign_with(&device, b"spawn").unwrap();
    assert!(account.verify(b"spawn", &signature));
    assert!(!account.verify(b"other", &signature));
}

#[test]
fn test_signer_failure_discards_partial_results() {
    // master succeeds, then the device drops off during account 1
    let device = DeviceDouble::failing_after(2, SignerError::Disconnected);
    let result = Wallet::from_hardware(&device, 3);
    assert!(matches!(
        result,
        Err(WalletError::Derivation(DerivationError::Signer(
            SignerError::Disconnected
        )))
    ));
    assert_eq!(device.calls.get(), 3);
}

#[test]
fn test_signer_timeout_on_master() {
    let device = DeviceDouble::failing_after(0, SignerError::Timeout);
    assert!(matches!(
        master_from_hardware(&device),
        Err(DerivationError::Signer(SignerError::Timeout))
    ));
}

#[test]
fn test_signer_failure_during_sign() {
    let device = DeviceDouble::new();
    let wallet = Wallet::from_hardware(&device, 1).unwrap();
    let cancelled = DeviceDouble::failing_after(0, SignerError::Cancelled);
    assert!(matches!(
        wallet.accounts()[0].sign_with(&cancelled, b"msg"),
        Err(KeypairError::Signer(SignerError::Cancelled))
    ));
}

#[test]
fn test_provenance_mismatch() {
    let device = DeviceDouble::new();
    let seed = Mnemonic::from_phrase(ABANDON).unwrap().to_seed("");

    let hardware_master = master_from_hardware(&device).unwrap();
    assert!(matches!(
        derive_child(&hardware_master, KeySource::Seed(&seed), 0),
        Err(DerivationError::ProvenanceMismatch)
    ));

    let seed_master = master_from_seed(&seed).unwrap();
    assert!(matches!(
        derive_child(&seed_master, KeySource::Hardware(&device), 0),
        Err(DerivationError::ProvenanceMismatch)
    ));
}

#[test]
fn test_hardware_wallet_file_roundtrip() {
    let device = DeviceDouble::new();
    let wallet = Wallet::from_hardware(&device, 2).unwrap();
    assert!(wallet.is_hardware());
    assert!(wallet.mnemonic().is_none());

    let plaintext = serde_json::to_value(wallet.secrets()).unwrap();
    assert_eq!(plaintext["mnemonic"], HARDWARE_MNEMONIC);
    assert!(plaintext["masterKeypair"].get("secretKey").is_none());

    let file = wallet.encrypt("pw", &light_params()).unwrap();
    let restored = file.decrypt("pw").unwrap();
    assert!(restored.is_hardware());
    assert!(restored.mnemonic().is_none());
    assert_eq!(
        restored.master_keypair().public_key(),
        wallet.master_keypair().public_key()
    );
    assert_eq!(restored.accounts().len(), 2);
    assert!(restored.accounts().iter().all(|a| a.secret_key().is_none()));
}
