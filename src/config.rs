use std::path::{Path, PathBuf};

use log::debug;

use crate::clients::errors::Result;

/// Per-user `.env` location, e.g. `~/.config/lastfm-dupes/.env` on Linux.
pub fn user_env_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(env!("CARGO_PKG_NAME")).join(".env"))
}

/// Load the environment, then start logging so `RUST_LOG` from a `.env` applies.
pub fn init() -> Result<()> {
    load_env()?;
    env_logger::init();
    debug!("Environment loaded");
    Ok(())
}

/// Load `.env` from the working directory, then the per-user one.
///
/// Variables that are already set keep their value, so the working directory
/// wins over the user file and the real environment wins over both. A missing
/// file is skipped; one that exists but cannot be read or parsed is an error.
pub fn load_env() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(e) if e.not_found() => {}
        Err(e) => return Err(e.into()),
    }

    if let Some(path) = user_env_file().filter(|path| path.exists()) {
        load_env_file(&path)?;
    }
    Ok(())
}

pub fn load_env_file(path: &Path) -> Result<()> {
    dotenvy::from_path(path)?;
    debug!("Loaded environment from {path:?}");
    Ok(())
}
