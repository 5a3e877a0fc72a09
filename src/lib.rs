//! # Adopt-RS
//!
//! Search orchestration core for browsing a remote catalog of adoptable dogs.
//!
//! ## Features
//!
//! - **Canonical Queries**: Filter state renders to one deterministic query string
//! - **Two-Phase Fetch**: ID search then hydration, re-ordered to search order
//! - **Freshness Guard**: Only the latest fetch cycle may commit visible results
//! - **Location Resolution**: States, cities and counties collapse into a ZIP set
//! - **Name Overlay**: Client-side narrowing of the current page
//! - **Event Bus**: Commits, stale drops and failures are broadcast to subscribers
//! - **Pluggable Backend**: HTTP client or in-memory catalog behind one trait
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use adopt::prelude::*;
//! use std::sync::Arc;
//!
//! let config = SearchConfig::from_yaml_file("adopt.yaml")?.with_env_overrides()?;
//! let api = Arc::new(HttpDogApi::new(&config)?);
//! let session = SearchSession::new(api, config.clone(), EventBus::new(config.event_capacity));
//!
//! session.load_breeds().await?;
//! session.set_breeds(["Beagle"]).await;
//! session.set_age_range(Some(2), Some(8)).await?;
//!
//! let view = session.snapshot();
//! for dog in &view.records {
//!     println!("{} ({}, {})", dog.name, dog.breed, dog.age);
//! }
//! println!("{}", view.range);
//! ```

pub mod client;
pub mod config;
pub mod core;
pub mod logging;
pub mod search;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        criteria::{CriteriaStore, FilterCriteria, PageWindow, SortDirection, SortField, SortOrder},
        error::{AdoptError, AdoptResult, ErrorSummary},
        events::{EventBus, EventEnvelope, SearchEvent},
        model::{Dog, Location, SearchResult},
        overlay::{DisplayRange, NameOverlayFilter},
        pagination::{PageState, PaginationController},
        query::{CanonicalQuery, QueryBuilder},
        service::DogApi,
    };

    // === Search ===
    pub use crate::search::{
        DisplayState, FetchStatus, FetchToken, LocationSelection, MatchMaker, SearchSession,
    };

    // === Clients ===
    pub use crate::client::{HttpDogApi, InMemoryDogApi};

    // === Config ===
    pub use crate::config::SearchConfig;
    pub use crate::logging::init_tracing;

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
}
