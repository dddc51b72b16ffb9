use std::path::PathBuf;

use clap::{Parser, Subcommand};
use seedpass_key_deriv::Curve;

#[derive(Parser, Debug)]
#[command(
    name = "seedpass-cli",
    about = "Derive passkeys and hierarchical keys from a BIP-39 seed phrase",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long,
        short = 'c',
        global = true,
        env = "SEEDPASS_CONFIG",
        default_value = "seedpass.toml",
        help = "the TOML file naming the mnemonic file"
    )]
    pub(crate) config: PathBuf,

    #[arg(
        long,
        global = true,
        help = "annotate log lines with their source file and line"
    )]
    pub(crate) log_source_location: bool,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Commands {
    Passkey(PasskeyArgs),

    Derive(DeriveArgs),

    CheckPath(CheckPathArgs),
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Print the P-256 passkey for a relying party and user")]
pub(crate) struct PasskeyArgs {
    #[arg(long, help = "relying-party origin, e.g. https://example.com")]
    pub(crate) origin: String,

    #[arg(long, help = "user handle within the relying party")]
    pub(crate) user_handle: String,

    #[arg(long, default_value_t = 0, help = "key counter")]
    pub(crate) counter: u32,

    #[arg(long, help = "print a JSON Web Key instead of the key record")]
    pub(crate) jwk: bool,
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Print the key at a derivation path")]
pub(crate) struct DeriveArgs {
    #[arg(long, help = "derivation path, e.g. m/44'/0'/0'/0/0")]
    pub(crate) path: String,

    #[arg(long, help = "curve to derive on: secp256k1, ed25519 or x25519")]
    pub(crate) curve: Curve,

    #[arg(long, help = "print a JSON Web Key instead of the key record")]
    pub(crate) jwk: bool,
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Parse a derivation path and print its canonical form")]
pub(crate) struct CheckPathArgs {
    pub(crate) path: String,
}
