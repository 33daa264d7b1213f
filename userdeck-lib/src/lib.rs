//! Profile editing against a remote user directory.
//!
//! The [`ProfileFormController`] owns an editable [`ProfileDraft`], loads it from the
//! [`UserDirectory`], validates it and submits or deactivates the account. The signed-in
//! user comes from an injected [`IdentityProvider`].

pub mod config;
pub mod controller;
pub mod directory;
pub mod error;
pub mod fs;
pub mod identity;
pub mod profile;

pub use controller::{Confirm, Navigation, Notice, Outcome, Phase, ProfileFormController};
pub use directory::{DirectoryError, HttpUserDirectory, UserDirectory};
pub use error::{Error, Result};
pub use identity::{IdentityProvider, SessionStore, SessionUser, UserId};
pub use profile::{Field, ProfileDraft, UserRecord};
