//! Configuration file resolution
//!
//! Drip services load their settings from a per-module TOML file under the
//! platform configuration directory, overridable per service via CLI
//! argument or environment variable. This module only locates the file;
//! each service parses its own schema.

use std::path::PathBuf;

/// Locate the configuration file for a module (e.g. `"mm"` →
/// `drip/mm.toml`).
///
/// Resolution order:
/// 1. `~/.config/drip/<module>.toml` (user config dir on the platform)
/// 2. `/etc/drip/<module>.toml` (Linux only, system-wide)
///
/// Returns `None` when no file exists at either location; callers fall
/// back to compiled defaults in that case.
pub fn resolve_config_file(module: &str) -> Option<PathBuf> {
    let file_name = format!("{module}.toml");

    if let Some(dir) = dirs::config_dir() {
        let user_config = dir.join("drip").join(&file_name);
        if user_config.exists() {
            return Some(user_config);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/drip").join(&file_name);
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
