//! Public key records and their canonical identifiers.

use std::borrow::Cow;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    Curve, DerivationError, DerivationPath, DomainContext, HierarchicalKeyPair, P256KeyPair,
};

/// Public half of a derived key, tagged with the identifier it is stored
/// under.
///
/// The point is checked against its curve whenever a record is built or
/// deserialized, so a record in hand always holds a valid public key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRecord")]
pub struct PublicKeyRecord {
    id: String,
    curve: Curve,
    #[serde(with = "hex::serde")]
    public_key: Vec<u8>,
}

#[derive(Deserialize)]
struct RawRecord {
    id: String,
    curve: Curve,
    #[serde(with = "hex::serde")]
    public_key: Vec<u8>,
}

impl TryFrom<RawRecord> for PublicKeyRecord {
    type Error = DerivationError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        PublicKeyRecord::new(raw.id, raw.curve, raw.public_key)
    }
}

impl PublicKeyRecord {
    fn new(id: String, curve: Curve, public_key: Vec<u8>) -> Result<Self, DerivationError> {
        validate_point(curve, &public_key)?;
        Ok(Self {
            id,
            curve,
            public_key,
        })
    }

    /// Canonical identifier of the key.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Curve the key lives on.
    pub const fn curve(&self) -> Curve {
        self.curve
    }

    /// Public key bytes: `x || y` for P-256, SEC1 compressed for secp256k1,
    /// 32 raw bytes for Ed25519 and X25519.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// The affine `(x, y)` halves of a P-256 point. `None` on other curves.
    pub fn coordinates(&self) -> Option<(&[u8], &[u8])> {
        match self.curve {
            Curve::P256 => Some(self.public_key.split_at(32)),
            _ => None,
        }
    }

    /// Renders the key as an RFC 7517 JSON Web Key with `kid` set to the
    /// identifier.
    pub fn to_jwk(&self) -> Result<Value, DerivationError> {
        let b64 = |bytes: &[u8]| URL_SAFE_NO_PAD.encode(bytes);
        let jwk = match self.curve {
            Curve::P256 => {
                let (x, y) = self.public_key.split_at(32);
                json!({ "kty": "EC", "crv": "P-256", "x": b64(x), "y": b64(y), "kid": self.id })
            }
            Curve::Secp256k1 => {
                let point = secp256k1::PublicKey::from_slice(&self.public_key)
                    .map_err(|_| DerivationError::MalformedPoint { curve: self.curve })?
                    .serialize_uncompressed();
                let (x, y) = point[1..].split_at(32);
                json!({ "kty": "EC", "crv": "secp256k1", "x": b64(x), "y": b64(y), "kid": self.id })
            }
            Curve::Ed25519 => {
                json!({ "kty": "OKP", "crv": "Ed25519", "x": b64(&self.public_key), "kid": self.id })
            }
            Curve::X25519 => {
                json!({ "kty": "OKP", "crv": "X25519", "x": b64(&self.public_key), "kid": self.id })
            }
        };
        Ok(jwk)
    }
}

/// Encodes a passkey under its domain identifier.
pub fn encode_domain(
    key: &P256KeyPair,
    ctx: &DomainContext,
) -> Result<PublicKeyRecord, DerivationError> {
    PublicKeyRecord::new(domain_key_id(ctx), Curve::P256, key.public_point().to_vec())
}

/// Encodes a hierarchical key under its path identifier.
pub fn encode_hierarchical(
    key: &HierarchicalKeyPair,
    path: &DerivationPath,
) -> Result<PublicKeyRecord, DerivationError> {
    PublicKeyRecord::new(
        hierarchical_key_id(key.curve(), path),
        key.curve(),
        key.public_key().to_vec(),
    )
}

/// Identifier of the passkey selected by `ctx`:
/// `p256-<origin>-<user_handle>-<counter>`.
///
/// `%` and `-` inside the origin and user handle are percent-escaped, so
/// distinct contexts never share an identifier.
pub fn domain_key_id(ctx: &DomainContext) -> String {
    format!(
        "p256-{}-{}-{}",
        escape_component(ctx.origin()),
        escape_component(ctx.user_handle()),
        ctx.counter()
    )
}

/// Identifier of the key at `path` on `curve`: `<curve>-<path>`.
pub fn hierarchical_key_id(curve: Curve, path: &DerivationPath) -> String {
    format!("{curve}-{path}")
}

fn escape_component(s: &str) -> Cow<'_, str> {
    if !s.contains(['%', '-']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            '-' => out.push_str("%2D"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn validate_point(curve: Curve, bytes: &[u8]) -> Result<(), DerivationError> {
    let malformed = || DerivationError::MalformedPoint { curve };
    if bytes.len() != curve.public_key_len() {
        return Err(malformed());
    }

    match curve {
        Curve::P256 => {
            let mut sec1 = [0u8; 65];
            sec1[0] = 0x04;
            sec1[1..].copy_from_slice(bytes);
            p256::PublicKey::from_sec1_bytes(&sec1).map_err(|_| malformed())?;
        }
        Curve::Secp256k1 => {
            secp256k1::PublicKey::from_slice(bytes).map_err(|_| malformed())?;
        }
        Curve::Ed25519 => {
            let arr: [u8; 32] = bytes.try_into().map_err(|_| malformed())?;
            ed25519_dalek::VerifyingKey::from_bytes(&arr).map_err(|_| malformed())?;
        }
        // Any 32 bytes are a Montgomery u-coordinate.
        Curve::X25519 => {}
    }
    Ok(())
}
