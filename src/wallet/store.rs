//! Reading and writing encrypted wallet files.
//!
//! Files are written atomically: the JSON goes to a uniquely named temporary
//! sibling that is synced and then linked (new files) or renamed
//! (overwrites) into place. On Unix the temporary file is created with mode
//! 0600 so the wallet is never world-readable, not even briefly.

use crate::wallet::keystore::{EncryptedWalletFile, KeystoreError};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while persisting wallet files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("wallet file not found: {0}")]
    NotFound(PathBuf),

    #[error("wallet file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid wallet file: {0}")]
    Format(#[from] KeystoreError),
}

/// Default file name for a wallet created at `created`.
pub fn default_file_name(created: &str) -> String {
    format!("wallet_{}.json", created)
}

/// Default location of `file` inside the wallet directory `dir`.
pub fn default_wallet_path(dir: &Path, file: &EncryptedWalletFile) -> PathBuf {
    dir.join(default_file_name(&file.meta.created))
}

/// Write `file` to `path`.
///
/// Fails with [`StoreError::AlreadyExists`] if `path` exists and `overwrite`
/// is false; the check and the publish are a single `link` call, so a file
/// appearing in between is never replaced. Parent directories are created
/// as needed.
pub fn write_wallet_file(
    path: &Path,
    file: &EncryptedWalletFile,
    overwrite: bool,
) -> Result<(), StoreError> {
    if path.exists() && !overwrite {
        return Err(StoreError::AlreadyExists(path.to_path_buf()));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = file.to_json()?;

    // unique per call so concurrent writers never share a temp file
    let temp_path = path.with_extension(format!("json.{:016x}.tmp", rand::random::<u64>()));
    let result =
        write_temp(&temp_path, &content).and_then(|()| publish(&temp_path, path, overwrite));
    if result.is_err() || !overwrite {
        let _ = fs::remove_file(&temp_path);
    }
    result?;

    tracing::info!(path = %path.display(), "wrote wallet file");
    Ok(())
}

fn write_temp(temp_path: &Path, content: &[u8]) -> Result<(), StoreError> {
    #[cfg(unix)]
    let mut handle = {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(temp_path)?
    };
    #[cfg(not(unix))]
    let mut handle = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(temp_path)?;

    handle.write_all(content)?;
    handle.sync_all()?;
    Ok(())
}

/// Move the finished temp file into place.
fn publish(temp_path: &Path, path: &Path, overwrite: bool) -> Result<(), StoreError> {
    if overwrite {
        fs::rename(temp_path, path)?;
        return Ok(());
    }
    fs::hard_link(temp_path, path).map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => StoreError::AlreadyExists(path.to_path_buf()),
        _ => StoreError::Io(e),
    })
}

/// Read and parse the wallet file at `path`. Nothing is decrypted.
pub fn read_wallet_file(path: &Path) -> Result<EncryptedWalletFile, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }
    let data = fs::read(path)?;
    let file = EncryptedWalletFile::from_json(&data)?;
    tracing::debug!(path = %path.display(), "read wallet file");
    Ok(file)
}

/// Wallet files (`*.json`) in `dir`, sorted by name.
pub fn list_wallet_files(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::keystore::{Cipher, EncryptionParams, Kdf};
    use crate::wallet::wallet::Wallet;
    use tempfile::tempdir;

    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn encrypted() -> EncryptedWalletFile {
        let params = EncryptionParams::new(
            Kdf::Argon2id {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
            Cipher::XSalsa20Poly1305,
        );
        Wallet::from_mnemonic(ABANDON, 1)
            .unwrap()
            .encrypt("pw", &params)
            .unwrap()
    }

    #[test]
    fn test_write_read_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("wallet.json");
        let file = encrypted();

        write_wallet_file(&path, &file, false).unwrap();
        let loaded = read_wallet_file(&path).unwrap();
        assert_eq!(loaded, file);
        assert_eq!(fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }

    #[test]
    fn test_no_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        let file = encrypted();

        write_wallet_file(&path, &file, false).unwrap();
        assert!(matches!(
            write_wallet_file(&path, &file, false),
            Err(StoreError::AlreadyExists(_))
        ));
        write_wallet_file(&path, &file, true).unwrap();
    }

    #[test]
    fn test_no_overwrite_keeps_existing_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        fs::write(&path, b"existing").unwrap();

        // the link step refuses as well, not only the early check
        let err = publish_after_race(&path);
        assert!(matches!(err, StoreError::AlreadyExists(_)));
        assert_eq!(fs::read(&path).unwrap(), b"existing");

        assert!(matches!(
            write_wallet_file(&path, &encrypted(), false),
            Err(StoreError::AlreadyExists(_))
        ));
        assert_eq!(fs::read(&path).unwrap(), b"existing");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    fn publish_after_race(path: &Path) -> StoreError {
        let temp = path.with_extension("json.race.tmp");
        write_temp(&temp, b"new").unwrap();
        let err = publish(&temp, path, false).unwrap_err();
        fs::remove_file(&temp).unwrap();
        err
    }

    #[test]
    fn test_concurrent_writers_single_winner() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        let file = encrypted();

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| write_wallet_file(&path, &file, false)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, StoreError::AlreadyExists(_))));
        assert_eq!(read_wallet_file(&path).unwrap(), file);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_not_found() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            read_wallet_file(&dir.path().join("missing.json")),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_garbage_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, b"not json").unwrap();
        assert!(matches!(
            read_wallet_file(&path),
            Err(StoreError::Format(KeystoreError::Json(_)))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        write_wallet_file(&path, &encrypted(), false).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_list_and_default_name() {
        let dir = tempdir().unwrap();
        let file = encrypted();
        let name = default_file_name(&file.meta.created);
        assert!(name.starts_with("wallet_") && name.ends_with(".json"));
        assert!(!name.contains(':'));

        let path = default_wallet_path(dir.path(), &file);
        assert_eq!(path, dir.path().join(&name));
        write_wallet_file(&path, &file, false).unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        assert_eq!(
            list_wallet_files(dir.path()).unwrap(),
            vec![dir.path().join(&name)]
        );
        assert!(list_wallet_files(&dir.path().join("none")).unwrap().is_empty());
    }
}
