//! Environment loading
//!
//! Settings come from the command line or the process environment. A `.env`
//! file is loaded first so that `ACCESS_TOKEN` and friends can live there:
//!
//! 1. `.env` in the working directory (or any parent)
//! 2. `<config dir>/ymexport/.env`, e.g. `~/.config/ymexport/.env` on Linux
//!
//! Variables already set in the environment always win.

use std::path::PathBuf;

/// Name of the variable holding the OAuth token
pub const TOKEN_VAR: &str = "ACCESS_TOKEN";

/// Name of the variable overriding the API endpoint
pub const API_URL_VAR: &str = "YANDEX_MUSIC_API_URL";

/// Load the first `.env` file found; returns its path
pub fn load_env() -> Result<PathBuf, dotenv::Error> {
    match dotenv::dotenv() {
        Ok(path) => Ok(path),
        Err(local_err) => match user_env_file() {
            Some(path) if path.exists() => dotenv::from_path(&path).map(|_| path),
            _ => Err(local_err),
        },
    }
}

/// Per-user `.env` location
pub fn user_env_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ymexport").join(".env"))
}
