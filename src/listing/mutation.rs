//! Building blocks for row-level mutations: in-flight guards, optimistic
//! updates with a saved pre-image, and the like/unlike toggle state.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use thiserror::Error;

/// Failures of a row-level mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MutationError {
    /// Destructive action attempted without explicit confirmation.
    #[error("action requires confirmation")]
    NotConfirmed,
    /// The same row already has an action in flight.
    #[error("another action is already in progress for this row")]
    InFlight,
    /// The row is not part of the current list.
    #[error("row not found")]
    UnknownRow,
    /// The remote call failed; carries the message shown to the user.
    #[error("{0}")]
    Remote(String),
}

/// Set of row keys with an action in flight.
///
/// Shared by reference; entries are removed when the returned guard drops,
/// whichever way the action ends.
#[derive(Debug)]
pub struct PendingMutations<K> {
    keys: Mutex<HashSet<K>>,
}

impl<K> Default for PendingMutations<K> {
    fn default() -> Self {
        Self {
            keys: Mutex::new(HashSet::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> PendingMutations<K> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<K>> {
        self.keys.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Marks `key` as in flight, or returns `None` when it already is.
    pub fn try_begin(&self, key: K) -> Option<PendingGuard<'_, K>> {
        if !self.lock().insert(key.clone()) {
            return None;
        }
        Some(PendingGuard { owner: self, key })
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Releases its key from [`PendingMutations`] on drop.
#[derive(Debug)]
pub struct PendingGuard<'a, K: Eq + Hash + Clone> {
    owner: &'a PendingMutations<K>,
    key: K,
}

impl<K: Eq + Hash + Clone> PendingGuard<'_, K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

impl<K: Eq + Hash + Clone> Drop for PendingGuard<'_, K> {
    fn drop(&mut self) {
        self.owner.lock().remove(&self.key);
    }
}

/// Stage of an optimistic update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimisticState {
    Applied,
    Confirmed,
    RolledBack,
}

/// An optimistic change together with the value it replaced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Optimistic<T> {
    pre_image: T,
    state: OptimisticState,
}

impl<T: Clone> Optimistic<T> {
    /// Saves the current value of `target` and applies `change` to it.
    pub fn apply(target: &mut T, change: impl FnOnce(&T) -> T) -> Self {
        let pre_image = target.clone();
        *target = change(&pre_image);
        Self {
            pre_image,
            state: OptimisticState::Applied,
        }
    }

    pub fn pre_image(&self) -> &T {
        &self.pre_image
    }

    pub fn state(&self) -> OptimisticState {
        self.state
    }

    /// Replaces the optimistic guess with the authoritative value.
    pub fn confirm(mut self, target: &mut T, authoritative: T) -> Self {
        *target = authoritative;
        self.state = OptimisticState::Confirmed;
        self
    }

    /// Restores the saved pre-image.
    pub fn roll_back(mut self, target: &mut T) -> Self {
        *target = self.pre_image.clone();
        self.state = OptimisticState::RolledBack;
        self
    }
}

/// Like flag and counter of a likeable row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LikeState {
    pub is_liked: bool,
    pub likes: u64,
}

impl LikeState {
    pub fn new(is_liked: bool, likes: u64) -> Self {
        Self { is_liked, likes }
    }

    /// The state after one like/unlike click.
    pub fn toggled(self) -> Self {
        if self.is_liked {
            Self::new(false, self.likes.saturating_sub(1))
        } else {
            Self::new(true, self.likes + 1)
        }
    }
}

/// Rows exposing a like toggle.
pub trait Likeable {
    fn like_state(&self) -> LikeState;
    fn set_like_state(&mut self, state: LikeState);
}

/// Server answer to a mutation whose effect is reconciled locally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Acknowledgement<T> {
    /// The server returned the authoritative value.
    Confirmed(T),
    /// The call succeeded but its response could not be interpreted.
    Ambiguous,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_guard_blocks_duplicates_until_dropped() {
        let pending = PendingMutations::new();
        let guard = pending.try_begin(7).expect("first action starts");
        assert!(pending.is_pending(&7));
        assert!(pending.try_begin(7).is_none());
        assert!(pending.try_begin(8).is_some());

        drop(guard);
        assert!(!pending.is_pending(&7));
        assert!(pending.try_begin(7).is_some());
        assert!(pending.is_empty());
    }

    #[test]
    fn optimistic_roll_back_restores_pre_image() {
        let mut state = LikeState::new(false, 10);
        let update = Optimistic::apply(&mut state, |s| s.toggled());
        assert_eq!(state, LikeState::new(true, 11));
        assert_eq!(update.state(), OptimisticState::Applied);

        let update = update.roll_back(&mut state);
        assert_eq!(state, LikeState::new(false, 10));
        assert_eq!(update.state(), OptimisticState::RolledBack);
    }

    #[test]
    fn optimistic_confirm_takes_server_value() {
        let mut state = LikeState::new(false, 10);
        let update = Optimistic::apply(&mut state, |s| s.toggled());
        let update = update.confirm(&mut state, LikeState::new(true, 14));
        assert_eq!(state, LikeState::new(true, 14));
        assert_eq!(update.state(), OptimisticState::Confirmed);
        assert_eq!(update.pre_image(), &LikeState::new(false, 10));
    }

    #[test]
    fn unlike_never_underflows() {
        assert_eq!(LikeState::new(true, 0).toggled(), LikeState::new(false, 0));
    }
}
