//! Fixed-size table of EventSource session slots.
//!
//! The panel serves a bounded number of concurrent event streams. A
//! [`SessionGuard`] owns one slot and frees it when dropped, which happens
//! when the streaming response for that session is torn down.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::PanelError;

/// Slot index of a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(usize);

impl SessionId {
    /// Returns the slot index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Concurrent session slot table.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    slots: Arc<Mutex<Vec<bool>>>,
}

impl SessionRegistry {
    /// Creates a registry with `max_sessions` free slots.
    #[must_use]
    pub fn new(max_sessions: usize) -> Self {
        Self {
            slots: Arc::new(Mutex::new(vec![false; max_sessions])),
        }
    }

    /// Takes the lowest free slot.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::SessionLimitReached`] when every slot is taken.
    pub fn acquire(&self) -> Result<SessionGuard, PanelError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let capacity = slots.len();
        let Some((index, slot)) = slots.iter_mut().enumerate().find(|(_, used)| !**used) else {
            return Err(PanelError::SessionLimitReached(capacity));
        };
        *slot = true;
        drop(slots);

        let id = SessionId(index);
        tracing::info!(session = %id, "opened session");
        Ok(SessionGuard {
            id,
            slots: Arc::clone(&self.slots),
        })
    }

    /// Returns the number of sessions currently open.
    #[must_use]
    pub fn active(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|used| **used)
            .count()
    }

    /// Returns the total number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Ownership of one session slot; releases the slot on drop.
#[derive(Debug)]
pub struct SessionGuard {
    id: SessionId,
    slots: Arc<Mutex<Vec<bool>>>,
}

impl SessionGuard {
    /// Returns the id of the held slot.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = slots.get_mut(self.id.0) {
            *slot = false;
        }
        tracing::info!(session = %self.id, "closed session");
    }
}
