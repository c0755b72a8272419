// TourBox Profile Handle
// Atomically swappable profile snapshot shared between the run loop and reloaders

use std::sync::Arc;

use parking_lot::RwLock;

use super::profile::{Profile, ProfileError};

/// Shared, swappable profile.
///
/// Readers take an `Arc` snapshot and keep using it for the whole dispatch;
/// a reload replaces the pointer and never touches a snapshot in use.
#[derive(Debug, Clone)]
pub struct ProfileHandle {
    current: Arc<RwLock<Arc<Profile>>>,
}

/// Result of a reload request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// New snapshot installed
    Reloaded,
    /// Profile has no source file (built-in); nothing to do
    NoSource,
}

impl ProfileHandle {
    pub fn new(profile: Profile) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(profile))),
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<Profile> {
        self.current.read().clone()
    }

    /// Install a new profile, returning the previous snapshot
    pub fn replace(&self, profile: Profile) -> Arc<Profile> {
        std::mem::replace(&mut *self.current.write(), Arc::new(profile))
    }

    /// Re-read the current profile's source file.
    ///
    /// On error the current snapshot stays in place.
    pub fn reload(&self) -> Result<ReloadOutcome, ProfileError> {
        let snapshot = self.snapshot();
        let Some(path) = snapshot.source() else {
            return Ok(ReloadOutcome::NoSource);
        };
        let fresh = Profile::from_path(path)?;
        self.replace(fresh);
        Ok(ReloadOutcome::Reloaded)
    }
}
