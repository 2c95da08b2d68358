//! Thread-safe owner of a focus controller.
//!
//! Operations run entirely under one mutex, so `switch_to` and
//! `mark_complete` from different threads never interleave. Readers get a
//! copied [`FocusSnapshot`], never a live reference.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::controller::FocusSessionController;
use super::snapshot::FocusSnapshot;
use crate::error::FocusError;
use crate::repository::TaskRepository;

pub struct FocusHandle<R>(Arc<Mutex<FocusSessionController<R>>>);

impl<R> Clone for FocusHandle<R> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<R: TaskRepository> FocusHandle<R> {
    pub fn new(controller: FocusSessionController<R>) -> Self {
        Self(Arc::new(Mutex::new(controller)))
    }

    /// Run one operation with exclusive access to the controller.
    pub fn with<T>(
        &self,
        f: impl FnOnce(&mut FocusSessionController<R>) -> T,
    ) -> Result<T, FocusError> {
        let mut controller = self.0.lock().map_err(|_| FocusError::LockPoisoned)?;
        Ok(f(&mut controller))
    }

    /// Consistent copy of the session for display refreshes.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Result<FocusSnapshot, FocusError> {
        let controller = self.0.lock().map_err(|_| FocusError::LockPoisoned)?;
        Ok(controller.snapshot(now))
    }
}
