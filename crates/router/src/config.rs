//! Router configuration.

use serde::{Deserialize, Serialize};

/// Settings of a [`KeyRouter`](crate::KeyRouter).
///
/// Usually embedded as a `[router]` table in a host's TOML config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Name the router reports. Defaults to `"<backend name>+seed"`.
    #[serde(default)]
    pub name: Option<String>,
}

impl RouterConfig {
    /// Resolves the reported name for a router wrapping `backend_name`.
    pub fn resolve_name(&self, backend_name: &str) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{backend_name}+seed"))
    }
}
