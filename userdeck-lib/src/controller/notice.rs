use std::fmt::{self, Display, Formatter};

use crate::directory::DirectoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A message for the user about the last action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    /// A failed write, quoting the server when it explained itself
    pub(crate) fn failure(err: &DirectoryError) -> Self {
        Self::error(format!("An error occurred: {}", err.user_message()))
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Where the host should take the user after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    ProfileView,
    SignedOut,
}

impl Navigation {
    pub fn route(&self) -> &'static str {
        match self {
            Navigation::ProfileView => "/profile",
            Navigation::SignedOut => "/login",
        }
    }
}
