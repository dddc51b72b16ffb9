//! Routes key creation between seed derivation and a host key management backend.
//!
//! A [`KeyRouter`] wraps any [`KeyManager`] and exposes the same interface. Requests that carry a
//! [`DerivationContext`](seedpass_key_deriv::DerivationContext) are served from the seed phrase
//! held by a [`MnemonicSource`]; everything else goes to the backend untouched.

mod config;
mod errors;
mod router;
mod traits;
mod types;

pub use config::RouterConfig;
pub use errors::{HostError, RouterError};
pub use router::KeyRouter;
pub use traits::{KeyManager, MnemonicSource, PrivateKeyImporter};
pub use types::{CreateKeyRequest, KeyInfo, KeyType, SeedPhrase};
