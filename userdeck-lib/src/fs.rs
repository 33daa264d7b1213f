use std::{fs::create_dir_all, path::PathBuf};

use xdg::BaseDirectories;

use crate::{Error, Result};

/// Returns the path to the userdeck configuration directory. If it doesn't exist when this
/// function is called, it will be created.
pub fn config_dir() -> Result<PathBuf> {
    let path = xdg_prefix()
        .get_config_home()
        .ok_or(Error::MissingDir("config"))?;

    create_dir_all(&path)?;

    Ok(path)
}

/// Returns the path to the userdeck state directory. If it doesn't exist when this function is
/// called, it will be created.
pub fn state_dir() -> Result<PathBuf> {
    let path = xdg_prefix()
        .get_state_home()
        .ok_or(Error::MissingDir("state"))?;

    create_dir_all(&path)?;

    Ok(path)
}

fn xdg_prefix() -> BaseDirectories {
    BaseDirectories::with_prefix("userdeck")
}
