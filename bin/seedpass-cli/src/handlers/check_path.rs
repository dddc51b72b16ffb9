use anyhow::Result;
use seedpass_key_deriv::DerivationPath;

use crate::cli::CheckPathArgs;

/// Handles the check-path command.
pub(crate) fn handle_check_path(args: CheckPathArgs) -> Result<String> {
    let path: DerivationPath = args.path.parse()?;
    Ok(path.to_string())
}
