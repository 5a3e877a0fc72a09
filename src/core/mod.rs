//! Core types of the search pipeline: criteria, query, pagination, overlay

pub mod criteria;
pub mod error;
pub mod events;
pub mod model;
pub mod overlay;
pub mod pagination;
pub mod query;
pub mod service;

pub use criteria::{CriteriaStore, FilterCriteria, PageWindow, SortDirection, SortField, SortOrder};
pub use error::{AdoptError, AdoptResult};
pub use events::{EventBus, EventEnvelope, SearchEvent};
pub use model::{Dog, Location, SearchResult};
pub use overlay::{DisplayRange, NameOverlayFilter};
pub use pagination::{PageState, PaginationController};
pub use query::{CanonicalQuery, QueryBuilder};
pub use service::DogApi;
