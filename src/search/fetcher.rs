//! Two-phase fetch (ID search, then hydration) committed through the guard
//!
//! ```text
//! execute(query)
//!   │ issue token
//!   ├──▶ GET /dogs/search ──▶ ordered ids + total
//!   │        │ ids empty? ── yes ──▶ no hydration, empty records
//!   │        ▼
//!   ├──▶ POST /dogs ──▶ records, re-ordered to match ids
//!   ▼
//! guard.commit_if_current(token) ──▶ total + records swapped in together
//! ```

use crate::core::error::{AdoptError, AdoptResult, ErrorSummary};
use crate::core::events::{EventBus, SearchEvent};
use crate::core::model::{Dog, SearchResult};
use crate::core::query::CanonicalQuery;
use crate::core::service::DogApi;
use crate::search::guard::{FetchToken, SequenceGuard};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Last committed search state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibleResults {
    /// Token of the cycle that produced `result` and `records`
    pub committed: Option<FetchToken>,
    pub result: SearchResult,
    /// Hydrated records in `result.result_ids` order
    pub records: Vec<Dog>,
    /// Set by a failed current cycle, cleared by the next commit
    pub error: Option<ErrorSummary>,
    /// Latest cycle that settled, committed or failed
    pub settled: Option<FetchToken>,
}

/// What happened to one fetch cycle
#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    /// Results are now visible
    Committed {
        token: FetchToken,
        total: u64,
        records: usize,
    },

    /// A newer cycle was issued meanwhile; nothing changed
    Stale { token: FetchToken },

    /// The current cycle failed; previous results stay visible
    Failed {
        token: FetchToken,
        error: AdoptError,
    },

    /// No fetch was needed
    Unchanged,
}

impl FetchStatus {
    pub fn is_committed(&self) -> bool {
        matches!(self, FetchStatus::Committed { .. })
    }
}

/// Executes fetch cycles and owns the visible result state
pub struct ResultFetcher {
    api: Arc<dyn DogApi>,
    guard: SequenceGuard,
    visible: RwLock<VisibleResults>,
    events: EventBus,
}

impl ResultFetcher {
    pub fn new(api: Arc<dyn DogApi>, events: EventBus) -> Self {
        Self {
            api,
            guard: SequenceGuard::new(),
            visible: RwLock::new(VisibleResults::default()),
            events,
        }
    }

    /// Snapshot of the committed state
    pub fn visible(&self) -> VisibleResults {
        self.read().clone()
    }

    /// Total of the last committed result
    pub fn total(&self) -> u64 {
        self.read().result.total
    }

    /// Whether a cycle newer than the last settled one is in flight
    pub fn is_loading(&self) -> bool {
        let latest = self.guard.latest();
        latest.value() > 0 && self.read().settled.is_none_or(|settled| settled < latest)
    }

    pub fn guard(&self) -> &SequenceGuard {
        &self.guard
    }

    /// Run a full cycle for `query`
    pub async fn execute(&self, query: &CanonicalQuery) -> FetchStatus {
        let token = self.guard.issue();
        tracing::debug!(token = %token, query = %query, "fetch cycle started");

        match self.fetch(query).await {
            Ok((result, records)) => self.commit(token, result, records),
            Err(error) => self.fail(token, error),
        }
    }

    /// Commit an empty result without any request
    ///
    /// Used when a location selection resolved to no ZIP code at all: the
    /// query cannot express "match nothing", so it is never sent.
    pub fn commit_no_match(&self) -> FetchStatus {
        let token = self.guard.issue();
        tracing::debug!(token = %token, "location filter matched no ZIP code");
        self.commit(token, SearchResult::empty(), Vec::new())
    }

    /// Record a failure that happened before the query could be built
    pub fn fail_cycle(&self, error: AdoptError) -> FetchStatus {
        let token = self.guard.issue();
        self.fail(token, error)
    }

    /// Raise the error flag for a failure outside any fetch cycle
    ///
    /// No token is issued, so an in-flight search still commits.
    pub fn flag_error(&self, error: &AdoptError) {
        self.write().error = Some(error.to_summary());
    }

    async fn fetch(&self, query: &CanonicalQuery) -> AdoptResult<(SearchResult, Vec<Dog>)> {
        let result = self.api.search(query).await?;

        if result.result_ids.is_empty() {
            return Ok((result, Vec::new()));
        }

        let hydrated = self.api.dogs(&result.result_ids).await?;
        let records = order_by_ids(&result.result_ids, hydrated);
        Ok((result, records))
    }

    fn commit(&self, token: FetchToken, result: SearchResult, records: Vec<Dog>) -> FetchStatus {
        let total = result.total;
        let count = records.len();

        let committed = self.guard.commit_if_current(token, || {
            let mut visible = self.write();
            *visible = VisibleResults {
                committed: Some(token),
                result,
                records,
                error: None,
                settled: Some(token),
            };
        });

        match committed {
            Some(()) => {
                tracing::info!(token = %token, total, records = count, "results committed");
                self.events.publish(SearchEvent::ResultsCommitted {
                    token: token.value(),
                    total,
                    records: count,
                });
                FetchStatus::Committed {
                    token,
                    total,
                    records: count,
                }
            }
            None => self.stale(token),
        }
    }

    fn fail(&self, token: FetchToken, error: AdoptError) -> FetchStatus {
        let summary = error.to_summary();

        let recorded = self.guard.commit_if_current(token, || {
            let mut visible = self.write();
            visible.error = Some(summary.clone());
            visible.settled = Some(token);
        });

        match recorded {
            Some(()) => {
                tracing::warn!(token = %token, error = %error, "fetch cycle failed, keeping previous results");
                self.events.publish(SearchEvent::FetchFailed {
                    token: token.value(),
                    error: summary,
                });
                FetchStatus::Failed { token, error }
            }
            None => self.stale(token),
        }
    }

    fn stale(&self, token: FetchToken) -> FetchStatus {
        let current = self.guard.latest();
        tracing::debug!(token = %token, current = %current, "stale response discarded");
        self.events.publish(SearchEvent::StaleDiscarded {
            token: token.value(),
            current: current.value(),
        });
        FetchStatus::Stale { token }
    }

    fn read(&self) -> RwLockReadGuard<'_, VisibleResults> {
        self.visible.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, VisibleResults> {
        self.visible.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Arrange hydrated records in search order
///
/// Hydration is a lookup, not a sort. IDs the backend did not return are
/// skipped.
pub fn order_by_ids(ids: &[String], hydrated: Vec<Dog>) -> Vec<Dog> {
    let mut by_id: HashMap<String, Dog> = hydrated
        .into_iter()
        .map(|dog| (dog.id.clone(), dog))
        .collect();

    ids.iter()
        .filter_map(|id| {
            let dog = by_id.remove(id);
            if dog.is_none() {
                tracing::debug!(id = %id, "search id missing from hydration response");
            }
            dog
        })
        .collect()
}
