//! P-256 passkeys bound to a relying-party origin and user handle.
//!
//! The scalar is drawn from HKDF-SHA256 keyed by the main secret:
//!
//! ```text
//! salt = "seedpass/p256-passkey/v1"
//! info = be32(len(origin)) || origin || be32(len(user_handle)) || user_handle
//!        || be32(counter) || attempt
//! ```
//!
//! The 32 output bytes are read as a big-endian scalar. Zero or values not
//! below the group order are rejected and the next `attempt` is tried, so the
//! result is uniform over the scalar field and stays deterministic.

use std::fmt;

use hkdf::Hkdf;
use p256::{elliptic_curve::sec1::ToEncodedPoint, PublicKey, SecretKey};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::{DerivationError, DomainContext, MainSecret};

/// HKDF salt separating passkey scalars from any other use of the main secret.
pub const PASSKEY_SALT: &[u8] = b"seedpass/p256-passkey/v1";

/// Shortest main secret a passkey is derived from.
pub const MIN_PASSKEY_SECRET_LEN: usize = 32;

/// A derived P-256 passkey.
///
/// The secret scalar stays inside this crate; callers only see the public
/// point. [`SecretKey`] wipes itself on drop.
pub struct P256KeyPair {
    // Only read by tests; the scalar never leaves the pair.
    #[cfg_attr(not(test), allow(dead_code))]
    secret: SecretKey,
    public: PublicKey,
}

impl P256KeyPair {
    fn from_secret(secret: SecretKey) -> Self {
        let public = secret.public_key();
        Self { secret, public }
    }

    /// The public key.
    pub const fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// The public point as `x || y`, 32 bytes each.
    pub fn public_point(&self) -> [u8; 64] {
        let encoded = self.public.to_encoded_point(false);
        let mut out = [0u8; 64];
        // Uncompressed SEC1: 0x04 || x || y.
        out.copy_from_slice(&encoded.as_bytes()[1..]);
        out
    }
}

impl fmt::Debug for P256KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("P256KeyPair")
            .field("public", &hex::encode(self.public_point()))
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Derives the passkey for `ctx` from `secret`.
///
/// Main secrets shorter than [`MIN_PASSKEY_SECRET_LEN`] bytes are rejected
/// with [`DerivationError::InvalidSeedLength`].
pub fn derive_domain_key(
    secret: &MainSecret,
    ctx: &DomainContext,
) -> Result<P256KeyPair, DerivationError> {
    if secret.as_bytes().len() < MIN_PASSKEY_SECRET_LEN {
        return Err(DerivationError::InvalidSeedLength(secret.as_bytes().len()));
    }
    ctx.validate()?;
    let info = domain_info(ctx)?;
    let hk = Hkdf::<Sha256>::new(Some(PASSKEY_SALT), secret.as_bytes());

    for attempt in 0..=u8::MAX {
        let mut okm = Zeroizing::new([0u8; 32]);
        hk.expand_multi_info(&[info.as_slice(), &[attempt]], okm.as_mut_slice())
            .expect("32 is a valid length for Sha256 to output");
        if let Ok(sk) = SecretKey::from_slice(okm.as_slice()) {
            return Ok(P256KeyPair::from_secret(sk));
        }
    }

    // Needs 256 consecutive out-of-range draws.
    Err(DerivationError::InvalidMasterKey)
}

/// Canonical, length-prefixed encoding of the context.
fn domain_info(ctx: &DomainContext) -> Result<Vec<u8>, DerivationError> {
    let origin = ctx.origin().as_bytes();
    let user = ctx.user_handle().as_bytes();

    let mut info = Vec::with_capacity(origin.len() + user.len() + 12);
    info.extend_from_slice(&len_prefix("origin", origin)?);
    info.extend_from_slice(origin);
    info.extend_from_slice(&len_prefix("user_handle", user)?);
    info.extend_from_slice(user);
    info.extend_from_slice(&ctx.counter().get().to_be_bytes());
    Ok(info)
}

fn len_prefix(field: &'static str, bytes: &[u8]) -> Result<[u8; 4], DerivationError> {
    u32::try_from(bytes.len())
        .map(u32::to_be_bytes)
        .map_err(|_| DerivationError::InvalidArgument {
            field,
            reason: format!("{} bytes does not fit a 32-bit length", bytes.len()),
        })
}
