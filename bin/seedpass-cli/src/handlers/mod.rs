//! Command handlers. Each returns the text to print on stdout.

pub(crate) mod check_path;
pub(crate) mod derive;
pub(crate) mod passkey;

use anyhow::Result;
use seedpass_key_deriv::PublicKeyRecord;

/// Renders a key record, or its JWK form, as pretty JSON.
fn render(record: &PublicKeyRecord, jwk: bool) -> Result<String> {
    let value = if jwk {
        record.to_jwk()?
    } else {
        serde_json::to_value(record)?
    };
    Ok(serde_json::to_string_pretty(&value)?)
}
