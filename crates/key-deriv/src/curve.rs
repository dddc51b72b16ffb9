//! Named curves served by the derivation pipelines.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::DerivationError;

/// Elliptic curves a derived key can live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Curve {
    /// NIST P-256 (secp256r1), used for WebAuthn passkeys.
    P256,
    /// Ed25519 signing keys.
    Ed25519,
    /// X25519 key agreement keys.
    X25519,
    /// secp256k1, the Bitcoin curve.
    Secp256k1,
}

impl Curve {
    /// Canonical lowercase name, also used as the identifier prefix.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Curve::P256 => "p256",
            Curve::Ed25519 => "ed25519",
            Curve::X25519 => "x25519",
            Curve::Secp256k1 => "secp256k1",
        }
    }

    /// Length in bytes of the public key encoding carried in a
    /// [`PublicKeyRecord`](crate::PublicKeyRecord).
    pub const fn public_key_len(&self) -> usize {
        match self {
            Curve::P256 => 64,
            Curve::Ed25519 | Curve::X25519 => 32,
            Curve::Secp256k1 => 33,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Curve {
    type Err = DerivationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "p256" | "p-256" | "secp256r1" => Ok(Curve::P256),
            "ed25519" => Ok(Curve::Ed25519),
            "x25519" => Ok(Curve::X25519),
            "secp256k1" => Ok(Curve::Secp256k1),
            _ => Err(DerivationError::UnknownCurve(s.to_owned())),
        }
    }
}
