use std::{fs, io, path::Path};

use pem::{Pem, PemError};
use sigchat_core::crypto::{NewKeyError, SecretKey};
use thiserror::Error;

const SECRET_PEM_TAG: &str = "PRIVATE KEY";

#[derive(Error, Debug)]
pub enum KeyFilesError {
    #[error("io error: {0}")]
    IOError(#[from] io::Error),
    #[error("pem error: {0}")]
    PemError(#[from] PemError),
    #[error("key error: {0}")]
    KeyError(#[from] NewKeyError),
}

pub fn load_secret_key(path: &Path) -> Result<SecretKey, KeyFilesError> {
    let pem_string = fs::read_to_string(path)?;
    let pem = pem::parse(pem_string)?;

    Ok(SecretKey::new_from_pkcs8_der(pem.contents())?)
}

/// Generates a fresh identity and writes it as a PKCS#8 PEM file,
/// creating parent directories as needed.
pub fn init_secret_key(path: &Path) -> Result<SecretKey, KeyFilesError> {
    let secret_key = SecretKey::generate()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(
        path,
        pem::encode(&Pem::new(SECRET_PEM_TAG, secret_key.to_pkcs8_der())),
    )?;

    Ok(secret_key)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn init_then_load_round_trip() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("store/secret.pem");

        let written = init_secret_key(&path)?;
        let loaded = load_secret_key(&path)?;

        assert_eq!(written.public_key(), loaded.public_key());

        Ok(())
    }

    #[test]
    fn load_missing_file_is_an_io_error() {
        assert!(matches!(
            load_secret_key(Path::new("/definitely/not/here.pem")),
            Err(KeyFilesError::IOError(_))
        ));
    }

    #[test]
    fn load_garbage_is_a_pem_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("secret.pem");
        fs::write(&path, "this is not a pem file")?;

        assert!(matches!(
            load_secret_key(&path),
            Err(KeyFilesError::PemError(_))
        ));

        Ok(())
    }
}
