//! Deterministic key derivation from a BIP-39 mnemonic.
//!
//! Two pipelines share one root secret:
//!
//! - **domain**: a P-256 passkey bound to a relying-party origin, a user handle and a counter;
//! - **hierarchical**: a SLIP-10 / BIP-32 key at a derivation path on Ed25519, X25519 or
//!   secp256k1.
//!
//! Identical inputs always yield identical keys, so nothing but the mnemonic has to be kept.
//!
//! # Usage
//!
//! ```rust,ignore
//! use seedpass_key_deriv::{
//!     derive_domain_key, derive_hierarchical_key, encode_domain, encode_hierarchical, Curve,
//!     DerivationPath, DomainContext, MainSecret,
//! };
//!
//! let mnemonic = "abandon abandon abandon abandon abandon abandon \
//!                 abandon abandon abandon abandon abandon about";
//!
//! // Passkeys always use the empty passphrase.
//! let secret = MainSecret::from_mnemonic(mnemonic, None)?;
//! let ctx = DomainContext::new("https://example.com", "user123", 0)?;
//! let passkey = derive_domain_key(&secret, &ctx)?;
//! let record = encode_domain(&passkey, &ctx)?;
//! assert_eq!(record.id(), "p256-https://example.com-user123-0");
//!
//! let path: DerivationPath = "m/44'/0'/0'/0/0".parse()?;
//! let key = derive_hierarchical_key(&secret, &path, Curve::Secp256k1)?;
//! let record = encode_hierarchical(&key, &path)?;
//! assert_eq!(record.id(), "secp256k1-m/44'/0'/0'/0/0");
//! ```
//!
//! Private material ([`MainSecret`], chain codes, private scalars) is wiped on drop and never
//! printed by `Debug`.

mod context;
mod curve;
mod domain;
mod encode;
mod error;
mod hierarchical;
mod mnemonic;
mod path;

pub use context::{Counter, DerivationContext, DomainContext, MAX_USER_HANDLE_LEN};
pub use curve::Curve;
pub use domain::{derive_domain_key, P256KeyPair, MIN_PASSKEY_SECRET_LEN, PASSKEY_SALT};
pub use encode::{
    domain_key_id, encode_domain, encode_hierarchical, hierarchical_key_id, PublicKeyRecord,
};
pub use error::DerivationError;
pub use hierarchical::{derive_hierarchical_key, HierarchicalKeyPair};
pub use mnemonic::{MainSecret, MAIN_SECRET_LEN};
pub use path::DerivationPath;

/// Child number type used by [`DerivationPath`].
pub use bitcoin::bip32::ChildNumber;
