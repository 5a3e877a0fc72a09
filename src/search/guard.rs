//! Freshness tokens for overlapping fetch cycles
//!
//! Every fetch cycle takes a token. Only the holder of the highest issued
//! token may commit into visible state; older responses complete normally
//! and are then discarded. Nothing is cancelled at the transport level.

use serde::Serialize;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// Strictly increasing fetch-cycle identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FetchToken(u64);

impl FetchToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FetchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues tokens and serializes commits against the latest one
///
/// Issuing and committing take the same lock, so a commit can never
/// interleave with the issue of a newer token.
#[derive(Debug, Default)]
pub struct SequenceGuard {
    latest: Mutex<u64>,
}

impl SequenceGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next token; never reused
    pub fn issue(&self) -> FetchToken {
        let mut latest = self.lock();
        *latest += 1;
        FetchToken(*latest)
    }

    /// Highest token issued so far (`#0` before the first fetch)
    pub fn latest(&self) -> FetchToken {
        FetchToken(*self.lock())
    }

    pub fn is_current(&self, token: FetchToken) -> bool {
        *self.lock() == token.0
    }

    /// Run `commit` only if `token` is still the latest
    ///
    /// Returns `None` without calling `commit` for a superseded token.
    pub fn commit_if_current<T>(&self, token: FetchToken, commit: impl FnOnce() -> T) -> Option<T> {
        let latest = self.lock();
        if *latest != token.0 {
            return None;
        }
        let out = commit();
        drop(latest);
        Some(out)
    }

    fn lock(&self) -> MutexGuard<'_, u64> {
        // The counter stays consistent even if a commit closure panicked
        self.latest.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
