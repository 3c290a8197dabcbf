//! Global constants used throughout the formlink codebase.
//!
//! Configuration file locations and identifier limits live here so the
//! values are discoverable in one place instead of being scattered as
//! magic literals.

/// Environment variable that overrides the global policy config path.
pub const CONFIG_PATH_ENV: &str = "FORMLINK_CONFIG_PATH";

/// Directory under the platform config dir holding the global config file.
pub const CONFIG_DIR_NAME: &str = "formlink";

/// File name of the global policy configuration.
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";

/// File name of the per-project policy configuration.
pub const PROJECT_CONFIG_FILE: &str = "formlink.toml";

/// Longest digit run that can still normalize to a 64-bit integer id.
///
/// `i64::MAX` is 19 digits; anything longer is kept as an opaque text id
/// without attempting a parse.
pub const MAX_CANONICAL_ID_DIGITS: usize = 19;
