//! In-memory implementation of [`DogApi`] for testing and development
//!
//! Mirrors the remote contract closely enough to drive a full session:
//! filtering, sorting and paging on search, unordered hydration, location
//! lookups. Endpoints and individual location values can be made to fail.

use crate::core::criteria::{SortDirection, SortField, SortOrder};
use crate::core::error::{AdoptError, AdoptResult, FetchError, ValidationError};
use crate::core::model::{Dog, Location, LocationSearchRequest, LocationSearchResponse, SearchResult};
use crate::core::query::CanonicalQuery;
use crate::core::service::DogApi;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// In-memory catalog
///
/// Uses `RwLock` for thread-safe access; clones share the same data.
#[derive(Clone, Default)]
pub struct InMemoryDogApi {
    dogs: Arc<RwLock<Vec<Dog>>>,
    locations: Arc<RwLock<Vec<Location>>>,
    failing_endpoints: Arc<RwLock<HashSet<String>>>,
    failing_lookups: Arc<RwLock<HashSet<String>>>,
    calls: Arc<RwLock<HashMap<String, usize>>>,
    reverse_hydration: bool,
}

impl InMemoryDogApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrate in reverse input order, like a backend that does not keep order
    pub fn with_reversed_hydration(mut self) -> Self {
        self.reverse_hydration = true;
        self
    }

    pub fn add_dog(&self, dog: Dog) {
        if let Ok(mut dogs) = self.dogs.write() {
            dogs.push(dog);
        }
    }

    pub fn add_location(&self, location: Location) {
        if let Ok(mut locations) = self.locations.write() {
            locations.push(location);
        }
    }

    /// Make every call to `endpoint` (e.g. `"/dogs/search"`) fail with a 503
    pub fn fail_endpoint(&self, endpoint: &str) {
        if let Ok(mut failing) = self.failing_endpoints.write() {
            failing.insert(endpoint.to_string());
        }
    }

    pub fn restore_endpoint(&self, endpoint: &str) {
        if let Ok(mut failing) = self.failing_endpoints.write() {
            failing.remove(endpoint);
        }
    }

    /// Make location lookups naming `value` as city, county or state fail
    pub fn fail_lookup(&self, value: &str) {
        if let Ok(mut failing) = self.failing_lookups.write() {
            failing.insert(value.to_string());
        }
    }

    /// Number of calls made to `endpoint`
    pub fn call_count(&self, endpoint: &str) -> usize {
        self.calls
            .read()
            .map(|calls| calls.get(endpoint).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    fn enter(&self, endpoint: &str) -> AdoptResult<()> {
        let mut calls = self
            .calls
            .write()
            .map_err(|e| AdoptError::Internal(format!("Failed to acquire write lock: {}", e)))?;
        *calls.entry(endpoint.to_string()).or_insert(0) += 1;

        let failing = self
            .failing_endpoints
            .read()
            .map_err(|e| AdoptError::Internal(format!("Failed to acquire read lock: {}", e)))?;
        if failing.contains(endpoint) {
            return Err(unavailable(endpoint));
        }
        Ok(())
    }

    fn read_dogs(&self) -> AdoptResult<Vec<Dog>> {
        self.dogs
            .read()
            .map(|dogs| dogs.clone())
            .map_err(|e| AdoptError::Internal(format!("Failed to acquire read lock: {}", e)))
    }

    fn read_locations(&self) -> AdoptResult<Vec<Location>> {
        self.locations
            .read()
            .map(|locations| locations.clone())
            .map_err(|e| AdoptError::Internal(format!("Failed to acquire read lock: {}", e)))
    }

    fn lookup_fails(&self, request: &LocationSearchRequest) -> bool {
        let Ok(failing) = self.failing_lookups.read() else {
            return false;
        };
        request.city.as_ref().is_some_and(|c| failing.contains(c))
            || request.county.as_ref().is_some_and(|c| failing.contains(c))
            || request
                .states
                .as_ref()
                .is_some_and(|states| states.iter().any(|s| failing.contains(s)))
    }
}

fn unavailable(endpoint: &str) -> AdoptError {
    AdoptError::Fetch(FetchError::Status {
        endpoint: endpoint.to_string(),
        status: 503,
        message: "Service Unavailable".to_string(),
    })
}

fn sort_dogs(dogs: &mut [Dog], sort: SortOrder) {
    dogs.sort_by(|a, b| {
        let ordering = match sort.field {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Breed => a.breed.cmp(&b.breed),
            SortField::Age => a.age.cmp(&b.age),
        }
        .then_with(|| a.id.cmp(&b.id));

        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn page_link(query: &CanonicalQuery, from: u64) -> String {
    let moved = CanonicalQuery {
        from,
        ..query.clone()
    };
    format!("/dogs/search?{}", moved)
}

#[async_trait]
impl DogApi for InMemoryDogApi {
    async fn breeds(&self) -> AdoptResult<Vec<String>> {
        self.enter("/dogs/breeds")?;
        let breeds: BTreeSet<String> = self.read_dogs()?.into_iter().map(|d| d.breed).collect();
        Ok(breeds.into_iter().collect())
    }

    async fn search(&self, query: &CanonicalQuery) -> AdoptResult<SearchResult> {
        self.enter("/dogs/search")?;

        let sort: SortOrder = query.sort.parse().map_err(AdoptError::Validation)?;
        let mut matches: Vec<Dog> = self
            .read_dogs()?
            .into_iter()
            .filter(|dog| query.breeds.as_ref().is_none_or(|b| b.contains(&dog.breed)))
            .filter(|dog| {
                query
                    .zip_codes
                    .as_ref()
                    .is_none_or(|z| z.contains(&dog.zip_code))
            })
            .filter(|dog| query.age_min.is_none_or(|min| dog.age >= min))
            .filter(|dog| query.age_max.is_none_or(|max| dog.age <= max))
            .collect();
        sort_dogs(&mut matches, sort);

        let total = matches.len() as u64;
        let size = query.size.max(1);
        let result_ids = matches
            .into_iter()
            .skip(query.from as usize)
            .take(size as usize)
            .map(|d| d.id)
            .collect();

        Ok(SearchResult {
            result_ids,
            total,
            next: (query.from + size < total).then(|| page_link(query, query.from + size)),
            prev: (query.from > 0).then(|| page_link(query, query.from.saturating_sub(size))),
        })
    }

    async fn dogs(&self, ids: &[String]) -> AdoptResult<Vec<Dog>> {
        self.enter("/dogs")?;
        let catalog = self.read_dogs()?;

        let mut found: Vec<Dog> = ids
            .iter()
            .filter_map(|id| catalog.iter().find(|d| &d.id == id).cloned())
            .collect();
        if self.reverse_hydration {
            found.reverse();
        }
        Ok(found)
    }

    async fn match_dogs(&self, ids: &[String]) -> AdoptResult<String> {
        self.enter("/dogs/match")?;
        let catalog = self.read_dogs()?;

        ids.iter()
            .find(|id| catalog.iter().any(|d| &d.id == *id))
            .cloned()
            .ok_or(AdoptError::Validation(ValidationError::EmptyFavorites))
    }

    async fn locations(&self, zip_codes: &[String]) -> AdoptResult<Vec<Location>> {
        self.enter("/locations")?;
        let all = self.read_locations()?;

        Ok(zip_codes
            .iter()
            .filter_map(|zip| all.iter().find(|l| &l.zip_code == zip).cloned())
            .collect())
    }

    async fn search_locations(
        &self,
        request: &LocationSearchRequest,
    ) -> AdoptResult<LocationSearchResponse> {
        self.enter("/locations/search")?;
        if self.lookup_fails(request) {
            return Err(unavailable("/locations/search"));
        }

        let matches: Vec<Location> = self
            .read_locations()?
            .into_iter()
            .filter(|l| {
                request
                    .city
                    .as_ref()
                    .is_none_or(|c| l.city.eq_ignore_ascii_case(c))
            })
            .filter(|l| {
                request
                    .county
                    .as_ref()
                    .is_none_or(|c| l.county.eq_ignore_ascii_case(c))
            })
            .filter(|l| request.states.as_ref().is_none_or(|s| s.contains(&l.state)))
            .collect();

        let total = matches.len() as u64;
        let from = request.from.unwrap_or(0) as usize;
        let size = request.size.unwrap_or(25) as usize;
        let results = matches.into_iter().skip(from).take(size).collect();

        Ok(LocationSearchResponse { results, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::criteria::CriteriaStore;
    use crate::core::query::QueryBuilder;

    fn dog(id: &str, name: &str, breed: &str, age: u32, zip: &str) -> Dog {
        Dog {
            id: id.to_string(),
            img: format!("https://img/{}.jpg", id),
            name: name.to_string(),
            age,
            zip_code: zip.to_string(),
            breed: breed.to_string(),
        }
    }

    fn location(zip: &str, city: &str, state: &str, county: &str) -> Location {
        Location {
            zip_code: zip.to_string(),
            latitude: 0.0,
            longitude: 0.0,
            city: city.to_string(),
            state: state.to_string(),
            county: county.to_string(),
        }
    }

    fn catalog() -> InMemoryDogApi {
        let api = InMemoryDogApi::new();
        api.add_dog(dog("d1", "Rex", "Beagle", 2, "10001"));
        api.add_dog(dog("d2", "Bella", "Beagle", 8, "94105"));
        api.add_dog(dog("d3", "Max", "Pug", 5, "10001"));
        api.add_dog(dog("d4", "Luna", "Beagle", 11, "10001"));
        api.add_location(location("10001", "New York", "NY", "New York"));
        api.add_location(location("94105", "San Francisco", "CA", "San Francisco"));
        api.add_location(location("90001", "Los Angeles", "CA", "Los Angeles"));
        api
    }

    #[tokio::test]
    async fn test_breeds_sorted_unique() {
        assert_eq!(catalog().breeds().await.unwrap(), vec!["Beagle", "Pug"]);
    }

    #[tokio::test]
    async fn test_search_filters_sorts_and_pages() {
        let api = catalog();
        let mut store = CriteriaStore::new(1, "age:desc".parse().unwrap());
        store.set_breeds(["Beagle"]);
        store.set_age_range(Some(2), Some(8)).unwrap();

        let first = api
            .search(&QueryBuilder::build(store.criteria(), &store.window()))
            .await
            .unwrap();
        assert_eq!(first.result_ids, vec!["d2"]);
        assert_eq!(first.total, 2);
        assert!(first.next.is_some());
        assert!(first.prev.is_none());

        store.set_offset(1);
        let second = api
            .search(&QueryBuilder::build(store.criteria(), &store.window()))
            .await
            .unwrap();
        assert_eq!(second.result_ids, vec!["d1"]);
        assert!(second.next.is_none());
    }

    #[tokio::test]
    async fn test_reversed_hydration() {
        let api = catalog().with_reversed_hydration();
        let ids = vec!["d1".to_string(), "d2".to_string()];
        let dogs = api.dogs(&ids).await.unwrap();
        assert_eq!(dogs[0].id, "d2");
        assert_eq!(dogs[1].id, "d1");
    }

    #[tokio::test]
    async fn test_location_search_by_state() {
        let api = catalog();
        let response = api
            .search_locations(&LocationSearchRequest::states(vec!["CA".to_string()], 100))
            .await
            .unwrap();
        let zips: Vec<&str> = response.zip_codes().collect();
        assert_eq!(zips, vec!["94105", "90001"]);
        assert_eq!(response.total, 2);
    }

    #[tokio::test]
    async fn test_failures_and_call_counts() {
        let api = catalog();
        api.fail_endpoint("/dogs/breeds");
        assert!(api.breeds().await.is_err());
        api.restore_endpoint("/dogs/breeds");
        assert!(api.breeds().await.is_ok());
        assert_eq!(api.call_count("/dogs/breeds"), 2);

        api.fail_lookup("New York");
        let err = api
            .search_locations(&LocationSearchRequest::city("New York", 10))
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_match_picks_known_dog() {
        let api = catalog();
        let matched = api
            .match_dogs(&["nope".to_string(), "d3".to_string()])
            .await
            .unwrap();
        assert_eq!(matched, "d3");
    }
}
