use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    directory::{DirectoryError, UserDirectory},
    identity::UserId,
    profile::{UpdatePayload, UserRecord},
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Fetch(UserId),
    Replace(UserId, UpdatePayload),
    Remove(UserId),
}

/// In-memory [`UserDirectory`] that records every call.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockDirectory {
    record: Arc<Mutex<Option<UserRecord>>>,
    failure: Arc<Mutex<Option<DirectoryError>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl MockDirectory {
    pub fn with_record(self, record: UserRecord) -> Self {
        *self.record.lock() = Some(record);
        self
    }

    /// Make every request fail with `err`
    pub fn with_failure(self, err: DirectoryError) -> Self {
        *self.failure.lock() = Some(err);
        self
    }

    pub fn succeed(&self) {
        *self.failure.lock() = None;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn record(&self) -> Option<UserRecord> {
        self.record.lock().clone()
    }

    fn check(&self) -> Result<(), DirectoryError> {
        match self.failure.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UserDirectory for MockDirectory {
    async fn fetch(&self, id: &UserId) -> Result<UserRecord, DirectoryError> {
        self.calls.lock().push(Call::Fetch(id.clone()));
        self.check()?;
        self.record.lock().clone().ok_or(DirectoryError::Status {
            status: 404,
            message: Some("User not found".into()),
        })
    }

    async fn replace(&self, id: &UserId, payload: &UpdatePayload) -> Result<(), DirectoryError> {
        self.calls
            .lock()
            .push(Call::Replace(id.clone(), payload.clone()));
        self.check()?;
        *self.record.lock() = Some(payload.to_record());
        Ok(())
    }

    async fn remove(&self, id: &UserId) -> Result<(), DirectoryError> {
        self.calls.lock().push(Call::Remove(id.clone()));
        self.check()?;
        *self.record.lock() = None;
        Ok(())
    }
}
