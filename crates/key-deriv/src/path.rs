//! Hierarchical derivation paths.
//!
//! The textual grammar is strict so that parsing and printing are inverse:
//!
//! ```text
//! path    = "m" *( "/" segment )
//! segment = index [ "'" ]
//! index   = "0" / ( %x31-39 *DIGIT )     ; below 2^31, no leading zeros
//! ```
//!
//! `h`/`H` hardened markers, whitespace, empty segments and trailing slashes
//! are all rejected.

use std::{fmt, str::FromStr};

use bitcoin::bip32::{self, ChildNumber};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::DerivationError;

/// Offset applied to hardened indices on the wire.
pub(crate) const HARDENED_OFFSET: u32 = 1 << 31;

/// Ordered route from the root of the key tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<ChildNumber>);

impl DerivationPath {
    /// The root path, `m`.
    pub const fn master() -> Self {
        Self(Vec::new())
    }

    /// Builds a path from child numbers.
    pub fn from_children(children: impl IntoIterator<Item = ChildNumber>) -> Self {
        Self(children.into_iter().collect())
    }

    /// Returns a copy of this path extended by `child`.
    pub fn child(&self, child: ChildNumber) -> Self {
        let mut children = self.0.clone();
        children.push(child);
        Self(children)
    }

    /// Number of segments below the root.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when every segment is hardened. The root path is
    /// trivially fully hardened.
    pub fn is_fully_hardened(&self) -> bool {
        self.0.iter().all(ChildNumber::is_hardened)
    }
}

impl AsRef<[ChildNumber]> for DerivationPath {
    fn as_ref(&self) -> &[ChildNumber] {
        &self.0
    }
}

impl From<DerivationPath> for bip32::DerivationPath {
    fn from(path: DerivationPath) -> Self {
        path.0.into()
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for child in &self.0 {
            match child {
                ChildNumber::Normal { index } => write!(f, "/{index}")?,
                ChildNumber::Hardened { index } => write!(f, "/{index}'")?,
            }
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = DerivationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        if parts.next() != Some("m") {
            return Err(DerivationError::invalid_path(s, "must start with \"m\""));
        }

        let children = parts
            .map(|segment| parse_segment(s, segment))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(children))
    }
}

fn parse_segment(path: &str, segment: &str) -> Result<ChildNumber, DerivationError> {
    let (digits, hardened) = match segment.strip_suffix('\'') {
        Some(digits) => (digits, true),
        None => (segment, false),
    };

    if digits.is_empty() {
        return Err(DerivationError::invalid_path(path, "empty segment"));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DerivationError::invalid_path(
            path,
            format!("segment {segment:?} is not a decimal index"),
        ));
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(DerivationError::invalid_path(
            path,
            format!("segment {segment:?} has a leading zero"),
        ));
    }

    let index: u32 = digits.parse().map_err(|_| {
        DerivationError::invalid_path(path, format!("segment {segment:?} is out of range"))
    })?;
    let child = if hardened {
        ChildNumber::from_hardened_idx(index)
    } else {
        ChildNumber::from_normal_idx(index)
    };
    child.map_err(|_| {
        DerivationError::invalid_path(
            path,
            format!("index {index} must be below {HARDENED_OFFSET}"),
        )
    })
}

impl Serialize for DerivationPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DerivationPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
