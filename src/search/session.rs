//! The orchestration core
//!
//! A [`SearchSession`] owns the filter criteria, page window and location
//! selection. Presentation calls its intent methods; each one mutates state,
//! then runs exactly one explicit fetch cycle. Nothing re-fetches implicitly.
//!
//! ```rust,ignore
//! let api = Arc::new(HttpDogApi::new(&config)?);
//! let session = SearchSession::new(api, config, EventBus::default());
//!
//! session.load_breeds().await?;
//! session.set_breeds(["Beagle"]).await;
//! session.set_age_range(Some(2), Some(8)).await?;
//! session
//!     .apply_location_filter(LocationSelection::new().with_states(["CA"]))
//!     .await?;
//!
//! let view = session.snapshot();
//! println!("{} ({} pages)", view.range, view.page.total_pages);
//! ```

use crate::config::SearchConfig;
use crate::core::criteria::{CriteriaStore, FilterCriteria, SortField, SortOrder};
use crate::core::error::{AdoptResult, ErrorSummary};
use crate::core::events::{EventBus, EventEnvelope, SearchEvent};
use crate::core::model::{Dog, Location};
use crate::core::overlay::{DisplayRange, NameOverlayFilter};
use crate::core::pagination::{PageState, PaginationController};
use crate::core::query::{CanonicalQuery, QueryBuilder};
use crate::core::service::DogApi;
use crate::search::fetcher::{FetchStatus, ResultFetcher};
use crate::search::guard::SequenceGuard;
use crate::search::location::{LocationOptions, LocationResolver, LocationSelection};
use crate::search::matching::MatchMaker;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

/// Everything presentation needs to render the result grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayState {
    /// Records after the name overlay, in server order
    pub records: Vec<Dog>,
    /// Hydrated records on the page before the overlay
    pub page_records: usize,
    /// Server total of the last committed search
    pub total: u64,
    pub page: PageState,
    pub range: DisplayRange,
    pub criteria: FilterCriteria,
    pub location: LocationSelection,
    pub error: Option<ErrorSummary>,
    pub loading: bool,
}

/// Applied location filter
#[derive(Debug, Clone, Default)]
struct LocationFilter {
    /// Normalized selection
    selection: LocationSelection,
    /// A non-empty selection resolved to no ZIP code at all
    matches_nothing: bool,
}

/// Stateful search pipeline over an injected catalog API
pub struct SearchSession {
    api: Arc<dyn DogApi>,
    events: EventBus,
    store: RwLock<CriteriaStore>,
    location: RwLock<LocationFilter>,
    /// Orders location applies and clears; a resolution that finishes after
    /// a newer one started is dropped
    location_guard: SequenceGuard,
    breeds: RwLock<Vec<String>>,
    resolver: LocationResolver,
    fetcher: ResultFetcher,
    matcher: MatchMaker,
}

impl SearchSession {
    pub fn new(api: Arc<dyn DogApi>, config: SearchConfig, events: EventBus) -> Self {
        Self {
            store: RwLock::new(CriteriaStore::new(
                u64::from(config.page_size),
                config.default_sort,
            )),
            location: RwLock::new(LocationFilter::default()),
            location_guard: SequenceGuard::new(),
            breeds: RwLock::new(Vec::new()),
            resolver: LocationResolver::new(api.clone(), config.location_lookup_size),
            fetcher: ResultFetcher::new(api.clone(), events.clone()),
            matcher: MatchMaker::new(api.clone()),
            api,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.events.subscribe()
    }

    // =========================================================================
    // Vocabulary
    // =========================================================================

    /// Fetch the breed list
    ///
    /// On failure the previous list is kept and the error flag is raised.
    pub async fn load_breeds(&self) -> AdoptResult<Vec<String>> {
        match self.api.breeds().await {
            Ok(breeds) => {
                *write(&self.breeds) = breeds.clone();
                self.events
                    .publish(SearchEvent::BreedsLoaded { count: breeds.len() });
                Ok(breeds)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load breeds");
                self.fetcher.flag_error(&e);
                Err(e)
            }
        }
    }

    pub fn breeds(&self) -> Vec<String> {
        read(&self.breeds).clone()
    }

    pub async fn location_options(&self) -> AdoptResult<LocationOptions> {
        self.resolver.load_options().await
    }

    // =========================================================================
    // Filter intents
    // =========================================================================

    pub async fn set_breeds<I, S>(&self, breeds: I) -> FetchStatus
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        write(&self.store).set_breeds(breeds);
        self.refresh().await
    }

    /// Set the age bounds; an inverted range is rejected before any fetch
    pub async fn set_age_range(
        &self,
        age_min: Option<u32>,
        age_max: Option<u32>,
    ) -> AdoptResult<FetchStatus> {
        write(&self.store).set_age_range(age_min, age_max)?;
        Ok(self.refresh().await)
    }

    /// Resolve `selection` into ZIP codes and search with them
    ///
    /// Partial resolution still searches, with the smaller ZIP set. When
    /// every lookup failed, the error flag is raised and the previous
    /// filters and results stay as they were. A selection with only blank
    /// entries clears the location dimension.
    ///
    /// If another apply or clear starts while the lookups are in flight,
    /// this resolution is dropped and [`FetchStatus::Stale`] is returned
    /// with the location token.
    pub async fn apply_location_filter(
        &self,
        selection: LocationSelection,
    ) -> AdoptResult<FetchStatus> {
        let selection = selection.normalized()?;
        let token = self.location_guard.issue();

        let resolution = match self.resolver.resolve(&selection).await {
            Ok(resolution) => resolution,
            Err(e) if !self.location_guard.is_current(token) => {
                tracing::debug!(token = %token, error = %e, "superseded location resolution failed");
                return Ok(FetchStatus::Stale { token });
            }
            Err(e) if e.is_transient() => return Ok(self.fetcher.fail_cycle(e)),
            Err(e) => return Err(e),
        };

        let matches_nothing = resolution.matches_nothing();
        let applied = self.location_guard.commit_if_current(token, || {
            *write(&self.location) = LocationFilter {
                selection,
                matches_nothing,
            };
            write(&self.store).set_zip_codes(resolution.zips.iter().cloned());
        });
        if applied.is_none() {
            tracing::debug!(token = %token, "superseded location resolution discarded");
            return Ok(FetchStatus::Stale { token });
        }

        if resolution.is_partial() {
            let failed: Vec<String> = resolution.failed.iter().map(|e| e.to_string()).collect();
            tracing::warn!(
                failed = failed.len(),
                resolved = resolution.zips.len(),
                "location filter applied with partial ZIP resolution"
            );
            self.events.publish(SearchEvent::LocationPartial {
                failed,
                resolved_zips: resolution.zips.len(),
            });
        }

        Ok(self.refresh().await)
    }

    pub async fn clear_location_filter(&self) -> FetchStatus {
        self.reset_location();
        write(&self.store).set_zip_codes(Vec::new());
        self.refresh().await
    }

    pub async fn set_sort(&self, sort: SortOrder) -> FetchStatus {
        write(&self.store).set_sort(sort);
        self.refresh().await
    }

    pub async fn set_sort_field(&self, field: SortField) -> FetchStatus {
        write(&self.store).set_sort_field(field);
        self.refresh().await
    }

    pub async fn toggle_sort_direction(&self) -> FetchStatus {
        write(&self.store).toggle_sort_direction();
        self.refresh().await
    }

    /// Change the client-side name overlay
    ///
    /// The overlay is not part of the query, so a fetch only happens when
    /// resetting the offset moved the session off the first page.
    pub async fn set_name_query(&self, query: impl Into<String>) -> FetchStatus {
        let moved = {
            let mut store = write(&self.store);
            let was = store.window().offset;
            store.set_name_query(query);
            was != 0
        };

        if moved {
            self.refresh().await
        } else {
            FetchStatus::Unchanged
        }
    }

    /// Drop every filter, including the location selection
    pub async fn clear_filters(&self) -> FetchStatus {
        self.reset_location();
        write(&self.store).clear_filters();
        self.refresh().await
    }

    // =========================================================================
    // Page navigation
    // =========================================================================

    pub async fn next_page(&self) -> FetchStatus {
        PaginationController::next_page(&mut write(&self.store));
        self.refresh().await
    }

    pub async fn prev_page(&self) -> FetchStatus {
        PaginationController::prev_page(&mut write(&self.store));
        self.refresh().await
    }

    /// Jump to a 1-based page, clamped against the last committed total
    pub async fn jump_to(&self, page: u64) -> FetchStatus {
        let total = self.fetcher.total();
        PaginationController::jump_to(&mut write(&self.store), total, page);
        self.refresh().await
    }

    // =========================================================================
    // Fetch cycle
    // =========================================================================

    /// Query that the next fetch cycle would send
    pub fn current_query(&self) -> CanonicalQuery {
        let store = read(&self.store);
        QueryBuilder::build(store.criteria(), &store.window())
    }

    /// Run one fetch cycle with the current criteria
    ///
    /// Also the manual recovery path after a failure; nothing retries
    /// automatically.
    pub async fn refresh(&self) -> FetchStatus {
        if read(&self.location).matches_nothing {
            return self.fetcher.commit_no_match();
        }

        let query = self.current_query();
        self.fetcher.execute(&query).await
    }

    /// Drop the location filter and supersede any in-flight resolution
    fn reset_location(&self) {
        self.location_guard.issue();
        *write(&self.location) = LocationFilter::default();
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn snapshot(&self) -> DisplayState {
        let visible = self.fetcher.visible();
        let (criteria, window) = {
            let store = read(&self.store);
            (store.criteria().clone(), store.window())
        };

        let overlay_active = NameOverlayFilter::is_active(&criteria.name_query);
        let records = NameOverlayFilter::apply(&visible.records, &criteria.name_query);
        let total = visible.result.total;

        DisplayState {
            page_records: visible.records.len(),
            total,
            page: PageState::new(window, total),
            range: DisplayRange::compute(window, total, records.len(), overlay_active),
            records,
            criteria,
            location: read(&self.location).selection.clone(),
            error: visible.error,
            loading: self.fetcher.is_loading(),
        }
    }

    /// Location details for the ZIP codes of the visible records
    pub async fn locations_for_visible(&self) -> AdoptResult<HashMap<String, Location>> {
        let mut zips: Vec<String> = self
            .fetcher
            .visible()
            .records
            .into_iter()
            .map(|dog| dog.zip_code)
            .collect();
        zips.sort();
        zips.dedup();

        if zips.is_empty() {
            return Ok(HashMap::new());
        }

        Ok(self
            .api
            .locations(&zips)
            .await?
            .into_iter()
            .map(|loc| (loc.zip_code.clone(), loc))
            .collect())
    }

    /// Pick one dog among `favorite_ids`
    pub async fn generate_match(&self, favorite_ids: &[String]) -> AdoptResult<Dog> {
        self.matcher.generate(favorite_ids).await
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
