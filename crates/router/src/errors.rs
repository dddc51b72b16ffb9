//! Errors returned by the key router.

use seedpass_key_deriv::DerivationError;
use thiserror::Error;

use crate::KeyType;

/// Opaque error raised by a host collaborator.
pub type HostError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for [`KeyRouter`](crate::KeyRouter) operations.
///
/// No key material is returned alongside an error.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The key type is only ever derived, and the request carried no context.
    #[error("{0} keys require a derivation context")]
    MissingDerivationContext(KeyType),

    /// The key type cannot be served by the pipeline the context selects.
    #[error("{key_type} keys are not supported by the {pipeline} pipeline")]
    UnsupportedCurve {
        /// The requested key type.
        key_type: KeyType,
        /// The pipeline the context selected.
        pipeline: &'static str,
    },

    /// Derivation failed.
    #[error("derivation failed: {0}")]
    Derivation(#[from] DerivationError),

    /// The mnemonic source could not produce a seed phrase.
    #[error("mnemonic source failed: {0}")]
    MnemonicSource(#[source] HostError),

    /// The host rejected the derived private key.
    #[error("private key import failed: {0}")]
    Import(#[source] HostError),

    /// The wrapped backend failed.
    #[error("backend failed: {0}")]
    Backend(#[source] HostError),
}

impl RouterError {
    pub(crate) fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        RouterError::Backend(Box::new(err))
    }
}
