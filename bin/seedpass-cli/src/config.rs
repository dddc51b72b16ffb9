//! CLI configuration file.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

/// Where the CLI finds its seed phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Config {
    /// File holding the mnemonic words. Relative paths are resolved against the directory of
    /// the config file.
    pub(crate) mnemonic_file: PathBuf,

    /// Environment variable holding the BIP-39 passphrase, if one is used.
    ///
    /// Only hierarchical keys take the passphrase.
    #[serde(default)]
    pub(crate) passphrase_env: Option<String>,
}

impl Config {
    /// Reads and parses the config at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: Config = toml::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;

        if config.mnemonic_file.is_relative() {
            if let Some(dir) = path.parent() {
                config.mnemonic_file = dir.join(&config.mnemonic_file);
            }
        }
        debug!(
            config = %path.display(),
            mnemonic_file = %config.mnemonic_file.display(),
            "loaded config"
        );

        Ok(config)
    }

    /// Reads the mnemonic words.
    pub(crate) fn read_mnemonic(&self) -> Result<Zeroizing<String>> {
        let words = fs::read_to_string(&self.mnemonic_file)
            .map(Zeroizing::new)
            .with_context(|| {
                format!(
                    "failed to read mnemonic file {}",
                    self.mnemonic_file.display()
                )
            })?;
        Ok(words)
    }

    /// Reads the passphrase from the configured environment variable.
    ///
    /// A configured but unset variable is an error, so keys are never silently derived without
    /// the intended passphrase.
    pub(crate) fn read_passphrase(&self) -> Result<Option<Zeroizing<String>>> {
        let Some(var) = &self.passphrase_env else {
            return Ok(None);
        };
        match env::var(var) {
            Ok(value) => Ok(Some(Zeroizing::new(value))),
            Err(env::VarError::NotPresent) => bail!("passphrase variable {var} is not set"),
            Err(e) => Err(e).with_context(|| format!("passphrase variable {var}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_mnemonic_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seedpass.toml");
        fs::write(&path, "mnemonic_file = \"words.txt\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.mnemonic_file, dir.path().join("words.txt"));
        assert_eq!(config.passphrase_env, None);
        assert!(config.read_passphrase().unwrap().is_none());
    }

    #[test]
    fn keeps_absolute_mnemonic_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seedpass.toml");
        fs::write(
            &path,
            "mnemonic_file = \"/var/lib/seedpass/words\"\npassphrase_env = \"SEEDPASS_PASS\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.mnemonic_file, PathBuf::from("/var/lib/seedpass/words"));
        assert_eq!(config.passphrase_env.as_deref(), Some("SEEDPASS_PASS"));
    }

    #[test]
    fn missing_inputs_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(&dir.path().join("absent.toml")).is_err());

        let config = Config {
            mnemonic_file: dir.path().join("absent.txt"),
            passphrase_env: Some("SEEDPASS_TEST_UNSET_PASSPHRASE".to_string()),
        };
        assert!(config.read_mnemonic().is_err());
        assert!(config.read_passphrase().is_err());
    }
}
