//! Service trait for the remote adoption catalog

use crate::core::error::AdoptResult;
use crate::core::model::{Dog, Location, LocationSearchRequest, LocationSearchResponse, SearchResult};
use crate::core::query::CanonicalQuery;
use async_trait::async_trait;

/// The catalog endpoints the search core consumes
///
/// Implementations provide the wire calls; the core is agnostic to the
/// transport. See [`crate::client::HttpDogApi`] and
/// [`crate::client::InMemoryDogApi`].
#[async_trait]
pub trait DogApi: Send + Sync {
    /// `GET /dogs/breeds`
    async fn breeds(&self) -> AdoptResult<Vec<String>>;

    /// `GET /dogs/search`
    async fn search(&self, query: &CanonicalQuery) -> AdoptResult<SearchResult>;

    /// `POST /dogs`
    ///
    /// The response order is not guaranteed to match `ids`.
    async fn dogs(&self, ids: &[String]) -> AdoptResult<Vec<Dog>>;

    /// `POST /dogs/match`, returns the matched dog ID
    async fn match_dogs(&self, ids: &[String]) -> AdoptResult<String>;

    /// `POST /locations`
    async fn locations(&self, zip_codes: &[String]) -> AdoptResult<Vec<Location>>;

    /// `POST /locations/search`
    async fn search_locations(
        &self,
        request: &LocationSearchRequest,
    ) -> AdoptResult<LocationSearchResponse>;
}
