//! Hierarchical deterministic keys (SLIP-10, which is BIP-32 on secp256k1).
//!
//! ```text
//! master            I = HMAC-SHA512(curve label, seed)
//! hardened child    I = HMAC-SHA512(c_par, 0x00 || k_par || ser32(i + 2^31))
//! normal child      I = HMAC-SHA512(c_par, serP(K_par) || ser32(i))
//! ```
//!
//! `IL` becomes the child key (added to the parent key mod n on secp256k1) and
//! `IR` the child chain code. Ed25519 and X25519 only define hardened
//! children.
//!
//! On secp256k1 an `IL` not below the group order, or a zero child key, makes
//! the index unusable; derivation then moves on to the next index exactly as
//! BIP-32 prescribes. That retry is part of the key tree's shape, so it is
//! never reported to the caller.

use std::fmt;

use bitcoin::bip32::ChildNumber;
use hmac::{Hmac, Mac};
use secp256k1::{PublicKey, Scalar, SecretKey, SECP256K1};
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::{path::HARDENED_OFFSET, Curve, DerivationError, DerivationPath, MainSecret};

type HmacSha512 = Hmac<Sha512>;

/// SLIP-10 master key label for secp256k1.
const SECP256K1_LABEL: &[u8] = b"Bitcoin seed";

/// SLIP-10 master key label for Ed25519.
const ED25519_LABEL: &[u8] = b"ed25519 seed";

/// SLIP-10 master key label for Curve25519 key agreement.
const CURVE25519_LABEL: &[u8] = b"curve25519 seed";

/// A key derived from the hierarchical key tree.
///
/// The private key is handed to the host's import path; it is wiped when this
/// value is dropped.
pub struct HierarchicalKeyPair {
    curve: Curve,
    private_key: Zeroizing<[u8; 32]>,
    public_key: Vec<u8>,
}

impl HierarchicalKeyPair {
    /// Curve of the key.
    pub const fn curve(&self) -> Curve {
        self.curve
    }

    /// Raw 32-byte private key.
    pub fn private_key(&self) -> &[u8; 32] {
        &self.private_key
    }

    /// Public key: SEC1 compressed on secp256k1, 32 raw bytes on Ed25519 and
    /// X25519.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }
}

impl fmt::Debug for HierarchicalKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HierarchicalKeyPair")
            .field("curve", &self.curve)
            .field("public_key", &hex::encode(&self.public_key))
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Derives the key at `path` on `curve` from `secret`.
pub fn derive_hierarchical_key(
    secret: &MainSecret,
    path: &DerivationPath,
    curve: Curve,
) -> Result<HierarchicalKeyPair, DerivationError> {
    match curve {
        Curve::Secp256k1 => derive_secp256k1(secret, path),
        Curve::Ed25519 | Curve::X25519 => derive_hardened_only(secret, path, curve),
        Curve::P256 => Err(DerivationError::UnsupportedCurve {
            curve,
            pipeline: "hierarchical",
        }),
    }
}

// -----------------------------------------------------------------------------
// secp256k1
// -----------------------------------------------------------------------------

/// Private node of the secp256k1 tree.
struct Secp256k1Node {
    key: SecretKey,
    chain_code: Zeroizing<[u8; 32]>,
}

// `SecretKey` has no zeroizing drop of its own.
impl Drop for Secp256k1Node {
    fn drop(&mut self) {
        // NOTE: `non_secure_erase` overwrites the key with `1`s.
        self.key.non_secure_erase();
    }
}

fn derive_secp256k1(
    secret: &MainSecret,
    path: &DerivationPath,
) -> Result<HierarchicalKeyPair, DerivationError> {
    let i = hmac_sha512(SECP256K1_LABEL, &[secret.as_bytes()]);
    let (il, ir) = split(&i);
    let key =
        SecretKey::from_slice(il.as_slice()).map_err(|_| DerivationError::InvalidMasterKey)?;
    let mut node = Secp256k1Node {
        key,
        chain_code: ir,
    };

    for child in path.as_ref() {
        node = secp256k1_child(&node, *child, path, hmac_sha512)?;
    }

    Ok(HierarchicalKeyPair {
        curve: Curve::Secp256k1,
        private_key: Zeroizing::new(node.key.secret_bytes()),
        public_key: PublicKey::from_secret_key(SECP256K1, &node.key)
            .serialize()
            .to_vec(),
    })
}

/// Derives one child, advancing the index past unusable values.
///
/// `mac` is the HMAC-SHA512 used for the step.
fn secp256k1_child<F>(
    parent: &Secp256k1Node,
    child: ChildNumber,
    path: &DerivationPath,
    mac: F,
) -> Result<Secp256k1Node, DerivationError>
where
    F: Fn(&[u8], &[&[u8]]) -> Zeroizing<[u8; 64]>,
{
    let (mut index, hardened) = match child {
        ChildNumber::Normal { index } => (index, false),
        ChildNumber::Hardened { index } => (index, true),
    };

    loop {
        let i = if hardened {
            let key = Zeroizing::new(parent.key.secret_bytes());
            let ser = (index | HARDENED_OFFSET).to_be_bytes();
            mac(
                parent.chain_code.as_slice(),
                &[&[0x00][..], key.as_slice(), &ser[..]],
            )
        } else {
            let point = PublicKey::from_secret_key(SECP256K1, &parent.key).serialize();
            let ser = index.to_be_bytes();
            mac(parent.chain_code.as_slice(), &[&point[..], &ser[..]])
        };
        let (il, ir) = split(&i);

        let tweaked = Scalar::from_be_bytes(*il)
            .ok()
            .and_then(|tweak| parent.key.add_tweak(&tweak).ok());
        if let Some(key) = tweaked {
            return Ok(Secp256k1Node { key, chain_code: ir });
        }

        index = index
            .checked_add(1)
            .filter(|next| *next < HARDENED_OFFSET)
            .ok_or_else(|| {
                DerivationError::invalid_path(path.to_string(), "child index space exhausted")
            })?;
    }
}

// -----------------------------------------------------------------------------
// Ed25519 / X25519
// -----------------------------------------------------------------------------

fn derive_hardened_only(
    secret: &MainSecret,
    path: &DerivationPath,
    curve: Curve,
) -> Result<HierarchicalKeyPair, DerivationError> {
    if !path.is_fully_hardened() {
        return Err(DerivationError::invalid_path(
            path.to_string(),
            format!("{curve} only supports hardened segments"),
        ));
    }

    let label = if curve == Curve::Ed25519 {
        ED25519_LABEL
    } else {
        CURVE25519_LABEL
    };
    let i = hmac_sha512(label, &[secret.as_bytes()]);
    let (mut key, mut chain_code) = split(&i);

    for child in path.as_ref() {
        let ser = (u32::from(*child) | HARDENED_OFFSET).to_be_bytes();
        let i = hmac_sha512(
            chain_code.as_slice(),
            &[&[0x00][..], key.as_slice(), &ser[..]],
        );
        (key, chain_code) = split(&i);
    }

    let public_key = if curve == Curve::Ed25519 {
        ed25519_dalek::SigningKey::from_bytes(&key)
            .verifying_key()
            .to_bytes()
    } else {
        let secret = x25519_dalek::StaticSecret::from(*key);
        x25519_dalek::PublicKey::from(&secret).to_bytes()
    };

    Ok(HierarchicalKeyPair {
        curve,
        private_key: key,
        public_key: public_key.to_vec(),
    })
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Zeroizing<[u8; 64]> {
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC takes keys of any length");
    for part in parts {
        mac.update(part);
    }
    let mut out = Zeroizing::new([0u8; 64]);
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

/// Splits `I` into `IL` and `IR`.
fn split(i: &[u8; 64]) -> (Zeroizing<[u8; 32]>, Zeroizing<[u8; 32]>) {
    let mut il = Zeroizing::new([0u8; 32]);
    let mut ir = Zeroizing::new([0u8; 32]);
    il.copy_from_slice(&i[..32]);
    ir.copy_from_slice(&i[32..]);
    (il, ir)
}
