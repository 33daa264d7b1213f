use thiserror::Error;

use crate::{directory::DirectoryError, profile::Field};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("User directory error: {0}")]
    Directory(#[from] DirectoryError),
    #[error("Session error: {0}")]
    Session(String),
    #[error("No user is signed in")]
    NotSignedIn,
    #[error("The {0} field is read-only")]
    ReadOnlyField(Field),
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("Could not locate {0} directory; is $HOME set?")]
    MissingDir(&'static str),
    #[error("I/O error {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("Failed to write TOML {0}")]
    TomlSer(#[from] toml::ser::Error),
}
