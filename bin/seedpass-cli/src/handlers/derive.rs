use std::path::Path;

use anyhow::Result;
use seedpass_key_deriv::{derive_hierarchical_key, encode_hierarchical, DerivationPath, MainSecret};
use tracing::info;

use super::render;
use crate::{cli::DeriveArgs, config::Config};

/// Handles the derive command.
pub(crate) fn handle_derive(config_path: &Path, args: DeriveArgs) -> Result<String> {
    let path: DerivationPath = args.path.parse()?;

    let config = Config::load(config_path)?;
    let mnemonic = config.read_mnemonic()?;
    let passphrase = config.read_passphrase()?;

    let secret = MainSecret::from_mnemonic(&mnemonic, passphrase.as_deref().map(String::as_str))?;
    let key = derive_hierarchical_key(&secret, &path, args.curve)?;
    let record = encode_hierarchical(&key, &path)?;

    info!(key_id = %record.id(), curve = %args.curve, "derived hierarchical key");
    render(&record, args.jwk)
}

#[cfg(test)]
mod tests {
    use seedpass_key_deriv::{Curve, DerivationError};
    use serde_json::Value;

    use super::*;
    use crate::handlers::test_utils::write_config;

    fn args(path: &str, curve: Curve) -> DeriveArgs {
        DeriveArgs {
            path: path.to_string(),
            curve,
            jwk: false,
        }
    }

    fn derive(config: &Path, path: &str, curve: Curve) -> Value {
        serde_json::from_str(&handle_derive(config, args(path, curve)).unwrap()).unwrap()
    }

    #[test]
    fn prints_secp256k1_record() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(&dir, None);

        let out = derive(&config, "m/44'/0'/0'/0/0", Curve::Secp256k1);
        assert_eq!(out["id"], "secp256k1-m/44'/0'/0'/0/0");
        assert_eq!(
            out["public_key"],
            "03aaeb52dd7494c361049de67cc680e83ebcbbbdbeb13637d92cd845f70308af5e"
        );

        let sibling = derive(&config, "m/44'/0'/0'/0/1", Curve::Secp256k1);
        assert_ne!(sibling["public_key"], out["public_key"]);
    }

    #[test]
    fn passphrase_comes_from_env() {
        const VAR: &str = "SEEDPASS_CLI_TEST_PASSPHRASE";
        std::env::set_var(VAR, "TREZOR");

        let plain_dir = tempfile::tempdir().unwrap();
        let plain = write_config(&plain_dir, None);
        let salted_dir = tempfile::tempdir().unwrap();
        let salted = write_config(&salted_dir, Some(VAR));

        let a = derive(&plain, "m/44'/501'/0'", Curve::Ed25519);
        let b = derive(&salted, "m/44'/501'/0'", Curve::Ed25519);
        assert_eq!(a["id"], b["id"]);
        assert_ne!(a["public_key"], b["public_key"]);
    }

    #[test]
    fn rejects_unservable_requests() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(&dir, None);

        let err = handle_derive(&config, args("m/0'", Curve::P256)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DerivationError>(),
            Some(DerivationError::UnsupportedCurve { .. })
        ));

        let err = handle_derive(&config, args("m/0'/1", Curve::X25519)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DerivationError>(),
            Some(DerivationError::InvalidDerivationPath { .. })
        ));

        let err = handle_derive(&config, args("m/0h", Curve::Secp256k1)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DerivationError>(),
            Some(DerivationError::InvalidDerivationPath { .. })
        ));
    }
}
