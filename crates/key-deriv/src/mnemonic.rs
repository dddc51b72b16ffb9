//! Mnemonic expansion into the main secret all keys are derived from.
//!
//! The phrase is validated against the BIP-39 English wordlist (word count,
//! word membership and checksum) before expansion. Expansion is the standard
//! BIP-39 seed function, PBKDF2-HMAC-SHA512 with 2048 rounds and the salt
//! `"mnemonic" || passphrase`, giving a 64-byte secret.

use std::fmt;

use bip39::{Language, Mnemonic};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::DerivationError;

/// Length of a BIP-39 seed.
pub const MAIN_SECRET_LEN: usize = 64;

/// Smallest raw seed accepted by BIP-32.
const MIN_SEED_LEN: usize = 16;

/// Root secret of every derived key.
///
/// Lives only for the duration of a derivation call. The bytes are wiped on
/// drop and never shown by [`Debug`](fmt::Debug).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MainSecret(Vec<u8>);

impl MainSecret {
    /// Validates `mnemonic` and expands it with the optional BIP-39
    /// `passphrase`.
    pub fn from_mnemonic(
        mnemonic: &str,
        passphrase: Option<&str>,
    ) -> Result<Self, DerivationError> {
        let words = mnemonic.split_whitespace().collect::<Vec<_>>();
        let normalized = Zeroizing::new(words.join(" "));
        let parsed = Mnemonic::parse_in(Language::English, normalized.as_str())?;
        let seed = Zeroizing::new(parsed.to_seed(passphrase.unwrap_or("")));
        Ok(Self(seed.to_vec()))
    }

    /// Wraps raw seed bytes, for hosts that already hold a BIP-32 seed.
    pub fn from_seed_bytes(seed: &[u8]) -> Result<Self, DerivationError> {
        if !(MIN_SEED_LEN..=MAIN_SECRET_LEN).contains(&seed.len()) {
            return Err(DerivationError::InvalidSeedLength(seed.len()));
        }
        Ok(Self(seed.to_vec()))
    }

    /// The raw secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for MainSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainSecret")
            .field("len", &self.0.len())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
