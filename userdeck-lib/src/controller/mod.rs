//! The profile form.
//!
//! [`ProfileFormController`] owns the [`ProfileDraft`] and drives the three user actions:
//! loading the profile, submitting edits and deactivating the account. Each action walks the
//! [`Phase`] state machine and finishes in an [`Outcome`]; failures of the directory are
//! outcomes, not errors, so the caller can show them and let the user retry.

use std::{future::Future, sync::Arc, time::Duration};

use chrono::{Local, NaiveDate};
use getset::{CopyGetters, Getters};
use tracing::{debug, error, info, warn};

use crate::{
    Error, Result,
    directory::{DirectoryError, UserDirectory},
    identity::IdentityProvider,
    profile::{Field, ProfileDraft, UserRecord, ValidationReport, build_update, validate},
};

mod notice;

pub use notice::{Navigation, Notice, NoticeKind};

pub const LOAD_FAILED: &str = "Failed to load user data. Please try again.";
pub const FIX_ERRORS: &str = "Please fix the errors in the form before submitting.";
pub const PROFILE_UPDATED: &str = "Profile updated successfully!";
pub const PROFILE_DEACTIVATED: &str = "Profile deactivated successfully.";
pub const CONFIRM_DEACTIVATION: &str =
    "Are you sure you want to deactivate your profile? This action cannot be undone.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    LoadFailed,
    Validating,
    ValidForSubmit,
    ValidationFailed,
    Submitting,
    Submitted,
    SubmitFailed,
    ConfirmingDeactivation,
    Deactivating,
    Deactivated,
    DeactivateFailed,
    Cancelled,
}

impl Phase {
    fn returns_to_idle(&self) -> bool {
        matches!(
            self,
            Phase::LoadFailed
                | Phase::ValidationFailed
                | Phase::SubmitFailed
                | Phase::DeactivateFailed
                | Phase::Cancelled
        )
    }
}

/// How a user action ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nobody is signed in, so there is nothing to load
    NoSession,
    Loaded,
    /// The draft was filled from the identity provider's cached profile instead
    LoadFailed(DirectoryError),
    ValidationFailed(ValidationReport),
    Submitted(Navigation),
    SubmitFailed(DirectoryError),
    Deactivated(Navigation),
    DeactivateFailed(DirectoryError),
    Cancelled,
}

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&self, question: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, question: &str) -> bool {
        self(question)
    }
}

#[derive(Getters, CopyGetters)]
pub struct ProfileFormController {
    directory: Arc<dyn UserDirectory>,
    identity: Arc<dyn IdentityProvider>,
    #[getset(get = "pub")]
    draft: ProfileDraft,
    /// Field errors from the last submit attempt, minus fields edited since
    #[getset(get = "pub")]
    errors: ValidationReport,
    #[getset(get_copy = "pub")]
    phase: Phase,
    /// Latest message for the user
    #[getset(get = "pub")]
    notice: Option<Notice>,
    /// Set while the draft shows cached data because the directory could not be reached
    #[getset(get = "pub")]
    load_error: Option<String>,
    /// Last record known to be on the server, used to fill cleared fields on submit
    baseline: Option<UserRecord>,
    timeout: Duration,
    today: fn() -> NaiveDate,
}

impl ProfileFormController {
    /// Every directory call is abandoned after `timeout`.
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        identity: Arc<dyn IdentityProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            directory,
            identity,
            draft: ProfileDraft::default(),
            errors: ValidationReport::default(),
            phase: Phase::Idle,
            notice: None,
            load_error: None,
            baseline: None,
            timeout,
            today: || Local::now().date_naive(),
        }
    }

    /// Replace the source of "today" used to validate birthdays
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Fetch the signed-in user's profile into the draft.
    ///
    /// If the directory can't be reached the draft is filled from the identity provider's
    /// cached profile and [`Self::load_error`] is set. This is not retried.
    pub async fn load(&mut self) -> Result<Outcome> {
        let Some(user) = self.identity.current_user() else {
            debug!("No signed-in user, skipping load");
            return Ok(Outcome::NoSession);
        };

        self.transition(Phase::Loading);

        match bounded(self.timeout, self.directory.fetch(&user.id)).await {
            Ok(record) => {
                self.draft = ProfileDraft::from_record(&record);
                self.baseline = Some(record);
                self.errors = ValidationReport::default();
                self.load_error = None;
                self.notice = None;
                self.transition(Phase::Loaded);
                Ok(Outcome::Loaded)
            }
            Err(err) => {
                warn!(user = %user.id, error = %err, "Failed to load profile, using cached copy");
                self.draft = ProfileDraft::from_record(&user.profile);
                self.baseline = Some(user.profile);
                self.load_error = Some(LOAD_FAILED.into());
                self.notice = Some(Notice::error(LOAD_FAILED));
                self.transition(Phase::LoadFailed);
                Ok(Outcome::LoadFailed(err))
            }
        }
    }

    /// Apply user input to one field. Only that field's error is cleared; nothing is
    /// re-validated.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> Result<()> {
        if !field.is_editable() {
            return Err(Error::ReadOnlyField(field));
        }

        self.draft.set(field, value);
        self.errors.clear(field);

        Ok(())
    }

    /// Validate the draft and, if it is clean, replace the server's record with it.
    pub async fn submit(&mut self) -> Result<Outcome> {
        let user = self.identity.current_user().ok_or(Error::NotSignedIn)?;

        self.transition(Phase::Validating);

        let report = validate(&self.draft, (self.today)());
        self.errors = report.clone();

        if !report.is_valid() {
            debug!(errors = report.len(), "Draft failed validation");
            self.notice = Some(Notice::error(FIX_ERRORS));
            self.transition(Phase::ValidationFailed);
            return Ok(Outcome::ValidationFailed(report));
        }

        self.transition(Phase::ValidForSubmit);

        let fallbacks: Vec<&UserRecord> = self
            .baseline
            .iter()
            .chain(std::iter::once(&user.profile))
            .collect();
        let payload = build_update(&self.draft, &fallbacks);

        self.transition(Phase::Submitting);

        match bounded(self.timeout, self.directory.replace(&user.id, &payload)).await {
            Ok(()) => {
                info!(user = %user.id, "Profile updated");
                self.baseline = Some(payload.to_record());
                self.notice = Some(Notice::info(PROFILE_UPDATED));
                self.transition(Phase::Submitted);
                Ok(Outcome::Submitted(Navigation::ProfileView))
            }
            Err(err) => {
                error!(user = %user.id, error = %err, "Failed to update profile");
                self.notice = Some(Notice::failure(&err));
                self.transition(Phase::SubmitFailed);
                Ok(Outcome::SubmitFailed(err))
            }
        }
    }

    /// Delete the account after `confirm` agrees, then end the local session.
    ///
    /// A refusal returns [`Outcome::Cancelled`] without touching the network or any form
    /// state.
    pub async fn deactivate(&mut self, confirm: &impl Confirm) -> Result<Outcome> {
        let user = self.identity.current_user().ok_or(Error::NotSignedIn)?;
        let previous = self.phase;

        self.transition(Phase::ConfirmingDeactivation);

        if !confirm.confirm(CONFIRM_DEACTIVATION) {
            self.transition(Phase::Cancelled);
            self.phase = previous;
            return Ok(Outcome::Cancelled);
        }

        self.transition(Phase::Deactivating);

        match bounded(self.timeout, self.directory.remove(&user.id)).await {
            Ok(()) => {
                info!(user = %user.id, "Profile deactivated");
                self.notice = Some(Notice::info(PROFILE_DEACTIVATED));

                // The account is gone either way, so a stuck session is only reported
                if let Err(err) = self.identity.logout() {
                    error!(error = %err, "Failed to end session after deactivation");
                    self.notice = Some(Notice::error(format!(
                        "{PROFILE_DEACTIVATED} Signing out failed: {err}"
                    )));
                }

                self.transition(Phase::Deactivated);
                Ok(Outcome::Deactivated(Navigation::SignedOut))
            }
            Err(err) => {
                error!(user = %user.id, error = %err, "Failed to deactivate profile");
                self.notice = Some(Notice::failure(&err));
                self.transition(Phase::DeactivateFailed);
                Ok(Outcome::DeactivateFailed(err))
            }
        }
    }

    /// Forget the current notice once it has been shown
    pub fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Move to `next`. Failure states hand control straight back to [`Phase::Idle`].
    fn transition(&mut self, next: Phase) {
        debug!(from = ?self.phase, to = ?next, "Form phase changed");
        self.phase = next;

        if next.returns_to_idle() {
            debug!(from = ?next, to = ?Phase::Idle, "Form phase changed");
            self.phase = Phase::Idle;
        }
    }
}

/// Run a directory call, giving up after `timeout`. Dropping the returned future abandons
/// the request.
async fn bounded<T, F>(timeout: Duration, call: F) -> std::result::Result<T, DirectoryError>
where
    F: Future<Output = std::result::Result<T, DirectoryError>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or(Err(DirectoryError::Timeout(timeout)))
}
