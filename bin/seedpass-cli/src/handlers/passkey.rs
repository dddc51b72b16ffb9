use std::path::Path;

use anyhow::Result;
use seedpass_key_deriv::{derive_domain_key, encode_domain, DomainContext, MainSecret};
use tracing::info;

use super::render;
use crate::{cli::PasskeyArgs, config::Config};

/// Handles the passkey command.
pub(crate) fn handle_passkey(config_path: &Path, args: PasskeyArgs) -> Result<String> {
    let config = Config::load(config_path)?;
    let mnemonic = config.read_mnemonic()?;

    // Passkeys ignore the passphrase.
    let secret = MainSecret::from_mnemonic(&mnemonic, None)?;
    let ctx = DomainContext::new(args.origin, args.user_handle, args.counter)?;
    let key = derive_domain_key(&secret, &ctx)?;
    let record = encode_domain(&key, &ctx)?;

    info!(key_id = %record.id(), "derived passkey");
    render(&record, args.jwk)
}
