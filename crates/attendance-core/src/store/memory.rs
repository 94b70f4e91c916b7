use super::{AttendanceStore, StoreError};
use crate::roster::Roster;
use std::sync::Mutex;

/// Process-local store, handy for tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    roster: Mutex<Roster>,
}

impl InMemoryStore {
    pub fn new(roster: Roster) -> Self {
        Self {
            roster: Mutex::new(roster),
        }
    }
}

impl AttendanceStore for InMemoryStore {
    fn load(&self) -> Result<Roster, StoreError> {
        let guard = self
            .roster
            .lock()
            .map_err(|_| StoreError::Unavailable("roster mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, roster: &Roster) -> Result<(), StoreError> {
        let mut guard = self
            .roster
            .lock()
            .map_err(|_| StoreError::Unavailable("roster mutex poisoned".to_string()))?;
        *guard = roster.clone();
        Ok(())
    }
}
