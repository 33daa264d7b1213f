//! The signed-in user.
//!
//! Authentication itself happens elsewhere; an [`IdentityProvider`] only reports who is signed
//! in, what profile was cached at sign-in, and ends the session.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use derive_more::{Display, From};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, Result, fs::state_dir, profile::UserRecord};

const FILE_NAME: &str = "session.toml";

/// Opaque identifier of a user in the directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A signed-in user as known locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    /// Sent verbatim as the `Cookie` header on directory requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,
    /// Profile cached when the session was established
    #[serde(default)]
    pub profile: UserRecord,
}

impl SessionUser {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            cookie: None,
            profile: UserRecord::default(),
        }
    }

    pub fn with_profile(mut self, profile: UserRecord) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }
}

pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, if any
    fn current_user(&self) -> Option<SessionUser>;

    /// Terminate the local session
    fn logout(&self) -> Result<()>;
}

/// File backed [`IdentityProvider`] living in the userdeck state directory.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    current: RwLock<Option<SessionUser>>,
}

impl SessionStore {
    pub fn open() -> Result<Self> {
        Self::open_at(state_dir()?.join(FILE_NAME))
    }

    pub fn open_at(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let current = read_session(&path)?;

        Ok(Self {
            path,
            current: RwLock::new(current),
        })
    }

    /// Record `user` as signed in, replacing any previous session.
    pub fn login(&self, user: SessionUser) -> Result<()> {
        let contents = toml::to_string_pretty(&user)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, contents)?;

        info!(user = %user.id, "Signed in");
        *self.current.write() = Some(user);

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdentityProvider for SessionStore {
    fn current_user(&self) -> Option<SessionUser> {
        self.current.read().clone()
    }

    fn logout(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        if let Some(user) = self.current.write().take() {
            info!(user = %user.id, "Signed out");
        }

        Ok(())
    }
}

fn read_session(path: &Path) -> Result<Option<SessionUser>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No session file");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };

    toml::from_str(&contents)
        .map(Some)
        .map_err(|err| Error::Session(format!("corrupt session file {}: {err}", path.display())))
}
