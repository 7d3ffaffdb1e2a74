//! State manager for thread-safe snapshot access.
//!
//! The [`StateManager`] provides synchronized access to the session's
//! [`Snapshot`]. The runtime thread is the only writer; hosts read.

use std::sync::{Arc, PoisonError, RwLock};

use super::model::Snapshot;

/// Thread-safe handle to the live snapshot.
#[derive(Clone)]
pub struct StateManager {
    state: Arc<RwLock<Snapshot>>,
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StateManager {
    /// Create a state manager holding an empty snapshot.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(Snapshot::new())),
        }
    }

    /// Read the snapshot with a closure.
    ///
    /// Multiple readers can hold the lock simultaneously.
    pub fn with_state_read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Snapshot) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Mutate the snapshot with a closure under an exclusive lock.
    pub fn with_state_write<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Snapshot) -> R,
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Get a clone of the current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.with_state_read(|s| s.clone())
    }

    /// Drop everything known about the remote.
    pub fn reset(&self) {
        self.with_state_write(|s| {
            let version = s.version;
            *s = Snapshot::new();
            s.version = version.wrapping_add(1);
        });
    }

    pub fn is_playing(&self) -> bool {
        self.with_state_read(|s| s.transport.is_playing)
    }

    pub fn is_connected(&self) -> bool {
        self.with_state_read(|s| s.connection.is_connected)
    }

    /// Get the snapshot version.
    pub fn version(&self) -> u64 {
        self.with_state_read(|s| s.version)
    }
}

impl std::fmt::Debug for StateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateManager")
            .field("version", &self.version())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_manager_write() {
        let manager = StateManager::new();
        manager.with_state_write(|s| {
            s.transport.is_playing = true;
            s.bump_version();
        });
        assert!(manager.is_playing());
        assert_eq!(manager.version(), 1);
    }

    #[test]
    fn test_reset_clears_but_keeps_counting() {
        let manager = StateManager::new();
        manager.with_state_write(|s| {
            s.setlist.songs = vec!["A".into()];
            s.setlist.active_song_index = 0;
            s.bump_version();
        });
        manager.reset();
        let snapshot = manager.snapshot();
        assert!(snapshot.setlist.songs.is_empty());
        assert_eq!(snapshot.setlist.active_song_index, -1);
        assert_eq!(snapshot.version, 2);
    }

    #[test]
    fn test_clones_share_state() {
        let manager = StateManager::new();
        let reader = manager.clone();
        manager.with_state_write(|s| s.connection.is_connected = true);
        assert!(reader.is_connected());
    }
}
