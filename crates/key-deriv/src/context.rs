//! Derivation contexts: what, besides the main secret, selects a key.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{DerivationError, DerivationPath};

/// Longest user handle WebAuthn allows, in bytes.
pub const MAX_USER_HANDLE_LEN: usize = 64;

/// Key counter for a given origin and user handle.
///
/// Distinct counters mint independent keys for the same pair. The range is
/// `0..=u32::MAX`; conversions from wider or signed integers reject anything
/// outside it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "u32")]
pub struct Counter(u32);

impl Counter {
    /// Creates a counter.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// The counter value.
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl From<u32> for Counter {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Counter> for u32 {
    fn from(value: Counter) -> Self {
        value.0
    }
}

impl TryFrom<i64> for Counter {
    type Error = DerivationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value).map(Self).map_err(|_| counter_out_of_range(value))
    }
}

impl TryFrom<u64> for Counter {
    type Error = DerivationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        u32::try_from(value).map(Self).map_err(|_| counter_out_of_range(value))
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn counter_out_of_range(value: impl fmt::Display) -> DerivationError {
    DerivationError::InvalidArgument {
        field: "counter",
        reason: format!("{value} is outside 0..={}", u32::MAX),
    }
}

/// Relying-party binding of a passkey.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainContext {
    origin: String,
    user_handle: String,
    #[serde(default)]
    counter: Counter,
}

impl DomainContext {
    /// Creates a domain context.
    ///
    /// Empty origins and user handles are accepted as-is. A user handle longer
    /// than [`MAX_USER_HANDLE_LEN`] bytes is rejected.
    pub fn new(
        origin: impl Into<String>,
        user_handle: impl Into<String>,
        counter: u32,
    ) -> Result<Self, DerivationError> {
        let ctx = Self {
            origin: origin.into(),
            user_handle: user_handle.into(),
            counter: Counter::new(counter),
        };
        ctx.validate()?;
        Ok(ctx)
    }

    /// Checks the invariants [`DomainContext::new`] enforces. Contexts built
    /// through deserialization must be validated before use.
    pub fn validate(&self) -> Result<(), DerivationError> {
        if self.user_handle.len() > MAX_USER_HANDLE_LEN {
            return Err(DerivationError::InvalidArgument {
                field: "user_handle",
                reason: format!(
                    "{} bytes exceeds the {MAX_USER_HANDLE_LEN} byte limit",
                    self.user_handle.len()
                ),
            });
        }
        Ok(())
    }

    /// Relying-party origin.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// User handle within the relying party.
    pub fn user_handle(&self) -> &str {
        &self.user_handle
    }

    /// Key counter.
    pub const fn counter(&self) -> Counter {
        self.counter
    }
}

/// Context selecting which key a derivation produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DerivationContext {
    /// Passkey bound to an origin and user handle.
    Domain(DomainContext),
    /// Key at a position in the hierarchical key tree.
    Hierarchical {
        /// Path from the root.
        path: DerivationPath,
    },
}

impl DerivationContext {
    /// Short name of the pipeline this context selects.
    pub const fn pipeline(&self) -> &'static str {
        match self {
            DerivationContext::Domain(_) => "domain",
            DerivationContext::Hierarchical { .. } => "hierarchical",
        }
    }
}

impl From<DomainContext> for DerivationContext {
    fn from(ctx: DomainContext) -> Self {
        DerivationContext::Domain(ctx)
    }
}

impl From<DerivationPath> for DerivationContext {
    fn from(path: DerivationPath) -> Self {
        DerivationContext::Hierarchical { path }
    }
}
