//! Host platform utility functions

use std::path::PathBuf;

/// Name of the environment variable pointing at the root of the software
/// checkout (the directory holding `params/` and `sessions/`).
pub const SW_ROOT_ENV_VAR: &str = "SCARA_SW_ROOT";

/// Get the root directory of the software.
///
/// Returns an error if the `SCARA_SW_ROOT` environment variable is not set.
pub fn get_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
