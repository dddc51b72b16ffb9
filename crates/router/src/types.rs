//! Request and response types shared by the router and the backends it wraps.

use std::fmt;

use seedpass_key_deriv::{Curve, DerivationContext, PublicKeyRecord};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Kinds of key a [`KeyManager`](crate::KeyManager) can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    /// P-256 signing key. Passkeys are always derived.
    P256,
    /// secp256k1 signing key.
    Secp256k1,
    /// Ed25519 signing key.
    Ed25519,
    /// X25519 key agreement key.
    X25519,
    /// AES-256-GCM symmetric key.
    Aes256Gcm,
    /// ChaCha20-Poly1305 symmetric key.
    ChaCha20Poly1305,
}

impl KeyType {
    /// Canonical lowercase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            KeyType::P256 => "p256",
            KeyType::Secp256k1 => "secp256k1",
            KeyType::Ed25519 => "ed25519",
            KeyType::X25519 => "x25519",
            KeyType::Aes256Gcm => "aes256gcm",
            KeyType::ChaCha20Poly1305 => "chacha20poly1305",
        }
    }

    /// Curve of an asymmetric key type. `None` for symmetric keys.
    pub const fn curve(&self) -> Option<Curve> {
        match self {
            KeyType::P256 => Some(Curve::P256),
            KeyType::Secp256k1 => Some(Curve::Secp256k1),
            KeyType::Ed25519 => Some(Curve::Ed25519),
            KeyType::X25519 => Some(Curve::X25519),
            KeyType::Aes256Gcm | KeyType::ChaCha20Poly1305 => None,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Curve> for KeyType {
    fn from(curve: Curve) -> Self {
        match curve {
            Curve::P256 => KeyType::P256,
            Curve::Secp256k1 => KeyType::Secp256k1,
            Curve::Ed25519 => KeyType::Ed25519,
            Curve::X25519 => KeyType::X25519,
        }
    }
}

/// Request to create a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateKeyRequest {
    /// Kind of key to create.
    pub key_type: KeyType,

    /// Derivation context. Without one the request is served by the backend.
    #[serde(default)]
    pub context: Option<DerivationContext>,
}

impl CreateKeyRequest {
    /// Request for a backend-generated key.
    pub const fn generated(key_type: KeyType) -> Self {
        Self {
            key_type,
            context: None,
        }
    }

    /// Request for a key derived under `context`.
    pub fn derived(key_type: KeyType, context: impl Into<DerivationContext>) -> Self {
        Self {
            key_type,
            context: Some(context.into()),
        }
    }
}

/// Description of a created key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    /// Identifier the key is stored under.
    pub id: String,

    /// Kind of key.
    pub key_type: KeyType,

    /// Public key, for asymmetric keys.
    pub public_key: Option<PublicKeyRecord>,
}

/// Mnemonic handed out by a [`MnemonicSource`](crate::MnemonicSource).
///
/// Both strings are wiped on drop and hidden from `Debug`.
pub struct SeedPhrase {
    mnemonic: Zeroizing<String>,
    passphrase: Option<Zeroizing<String>>,
}

impl SeedPhrase {
    /// Wraps a mnemonic and an optional BIP-39 passphrase.
    pub fn new(mnemonic: impl Into<String>, passphrase: Option<String>) -> Self {
        Self {
            mnemonic: Zeroizing::new(mnemonic.into()),
            passphrase: passphrase.map(Zeroizing::new),
        }
    }

    /// The mnemonic words.
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// The BIP-39 passphrase, if any.
    pub fn passphrase(&self) -> Option<&str> {
        self.passphrase.as_deref().map(String::as_str)
    }
}

impl fmt::Debug for SeedPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedPhrase")
            .field("mnemonic", &"[REDACTED]")
            .field("has_passphrase", &self.passphrase.is_some())
            .finish()
    }
}
