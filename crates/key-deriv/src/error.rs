//! Error type for the derivation pipelines.

use thiserror::Error;

use crate::Curve;

/// Error type for key derivation operations.
///
/// Errors never carry secret material: mnemonic failures report the `bip39`
/// reason (word count, word position, checksum), never the words.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DerivationError {
    /// The mnemonic failed BIP-39 validation.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(#[from] bip39::Error),

    /// Raw seed bytes are outside the 16..=64 byte range accepted by BIP-32.
    #[error("invalid seed length: {0} bytes")]
    InvalidSeedLength(usize),

    /// A domain-context input was rejected.
    #[error("invalid {field}: {reason}")]
    InvalidArgument {
        /// Name of the rejected input.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// A hierarchical derivation path is malformed or cannot be served.
    #[error("invalid derivation path {path:?}: {reason}")]
    InvalidDerivationPath {
        /// The offending path, as given.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The curve is known but the pipeline does not serve it.
    #[error("curve {curve} is not supported by the {pipeline} pipeline")]
    UnsupportedCurve {
        /// The requested curve.
        curve: Curve,
        /// The pipeline that rejected it.
        pipeline: &'static str,
    },

    /// The curve name is not recognized at all.
    #[error("unknown curve {0:?}")]
    UnknownCurve(String),

    /// The seed produced an unusable BIP-32 master key.
    #[error("seed yields an invalid master key")]
    InvalidMasterKey,

    /// A derived public key is not a valid point on its curve.
    #[error("malformed {curve} public point")]
    MalformedPoint {
        /// Curve the point was expected on.
        curve: Curve,
    },
}

impl DerivationError {
    /// Returns `true` when the error was caused by caller input rather than an
    /// internal invariant violation.
    pub const fn is_input_error(&self) -> bool {
        match self {
            DerivationError::InvalidMnemonic(_)
            | DerivationError::InvalidSeedLength(_)
            | DerivationError::InvalidArgument { .. }
            | DerivationError::InvalidDerivationPath { .. }
            | DerivationError::UnsupportedCurve { .. }
            | DerivationError::UnknownCurve(_) => true,
            DerivationError::InvalidMasterKey | DerivationError::MalformedPoint { .. } => false,
        }
    }

    pub(crate) fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        DerivationError::InvalidDerivationPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
