//! Collapse state/city/county/ZIP selections into one ZIP-code set
//!
//! The dog search endpoint only understands ZIP codes. A selection is
//! resolved by concurrent `/locations/search` lookups (one batched request
//! for all states, one per city, one per county) whose ZIP codes are unioned
//! with the manually entered ones.

use crate::core::error::{AdoptError, AdoptResult, LocationError, ValidationError};
use crate::core::model::LocationSearchRequest;
use crate::core::service::DogApi;
use futures::future::join_all;
use indexmap::IndexSet;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

/// Two-letter codes of the 50 US states
pub const US_STATES: [&str; 50] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY",
];

fn zip_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{5}$").expect("static ZIP pattern is valid"))
}

/// Pre-resolution location input, as picked in the filter UI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationSelection {
    pub states: IndexSet<String>,
    pub cities: IndexSet<String>,
    pub counties: IndexSet<String>,
    pub manual_zips: IndexSet<String>,
}

impl LocationSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states.extend(states.into_iter().map(Into::into));
        self
    }

    pub fn with_cities<I, S>(mut self, cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cities.extend(cities.into_iter().map(Into::into));
        self
    }

    pub fn with_counties<I, S>(mut self, counties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.counties.extend(counties.into_iter().map(Into::into));
        self
    }

    pub fn with_manual_zips<I, S>(mut self, zips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manual_zips.extend(zips.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
            && self.cities.is_empty()
            && self.counties.is_empty()
            && self.manual_zips.is_empty()
    }

    /// Trimmed copy with blank entries dropped and manual ZIPs validated
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        let clean = |set: &IndexSet<String>| -> IndexSet<String> {
            set.iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect()
        };

        let manual_zips = clean(&self.manual_zips);
        if let Some(bad) = manual_zips.iter().find(|z| !zip_pattern().is_match(z)) {
            return Err(ValidationError::InvalidZipCode { value: bad.clone() });
        }

        Ok(Self {
            states: clean(&self.states)
                .into_iter()
                .map(|s| s.to_ascii_uppercase())
                .collect(),
            cities: clean(&self.cities),
            counties: clean(&self.counties),
            manual_zips,
        })
    }
}

/// Outcome of resolving a [`LocationSelection`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationResolution {
    /// Deduplicated ZIP union: lookup results first, then manual entries
    pub zips: IndexSet<String>,
    /// Lookups that failed; non-empty means the union may be incomplete
    pub failed: Vec<LocationError>,
    /// Whether the resolved selection had no criterion at all
    pub selection_empty: bool,
}

impl LocationResolution {
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }

    /// A non-empty selection that yielded no ZIP code cannot match any dog
    pub fn matches_nothing(&self) -> bool {
        !self.selection_empty && self.zips.is_empty()
    }
}

/// Sorted, deduplicated option lists for the location pickers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationOptions {
    pub cities: Vec<String>,
    pub counties: Vec<String>,
    pub zips: Vec<String>,
}

struct Lookup {
    dimension: &'static str,
    value: String,
    request: LocationSearchRequest,
}

/// Turns location selections into ZIP sets
pub struct LocationResolver {
    api: Arc<dyn DogApi>,
    lookup_size: u32,
}

impl LocationResolver {
    pub fn new(api: Arc<dyn DogApi>, lookup_size: u32) -> Self {
        Self {
            api,
            lookup_size: lookup_size.max(1),
        }
    }

    /// Resolve `selection` into a ZIP union
    ///
    /// A failing lookup does not abort the others; it is logged and listed
    /// in [`LocationResolution::failed`]. Only when every lookup failed and
    /// there is no manual ZIP to fall back on is the resolution an error.
    pub async fn resolve(&self, selection: &LocationSelection) -> AdoptResult<LocationResolution> {
        let selection = selection.normalized()?;
        if selection.is_empty() {
            return Ok(LocationResolution {
                selection_empty: true,
                ..Default::default()
            });
        }

        let lookups = self.plan(&selection);
        let attempted = lookups.len();
        let responses = join_all(
            lookups
                .iter()
                .map(|lookup| self.api.search_locations(&lookup.request)),
        )
        .await;

        let mut zips = IndexSet::new();
        let mut failed = Vec::new();
        for (lookup, response) in lookups.into_iter().zip(responses) {
            match response {
                Ok(response) => {
                    tracing::debug!(
                        dimension = lookup.dimension,
                        value = %lookup.value,
                        returned = response.results.len(),
                        total = response.total,
                        "location lookup resolved"
                    );
                    zips.extend(response.zip_codes().map(str::to_string));
                }
                Err(e) => {
                    tracing::warn!(
                        dimension = lookup.dimension,
                        value = %lookup.value,
                        error = %e,
                        "location lookup failed, continuing with partial ZIP set"
                    );
                    failed.push(LocationError::LookupFailed {
                        dimension: lookup.dimension.to_string(),
                        value: lookup.value,
                        message: e.to_string(),
                    });
                }
            }
        }

        if attempted > 0 && failed.len() == attempted && selection.manual_zips.is_empty() {
            return Err(AdoptError::Location(LocationError::AllLookupsFailed { attempted }));
        }

        zips.extend(selection.manual_zips);
        Ok(LocationResolution {
            zips,
            failed,
            selection_empty: false,
        })
    }

    /// Load every city, county and ZIP known to the backend
    pub async fn load_options(&self) -> AdoptResult<LocationOptions> {
        let response = self
            .api
            .search_locations(&LocationSearchRequest::all(self.lookup_size))
            .await?;

        let mut cities = BTreeSet::new();
        let mut counties = BTreeSet::new();
        let mut zips = BTreeSet::new();
        for location in response.results {
            if !location.city.is_empty() {
                cities.insert(location.city);
            }
            if !location.county.is_empty() {
                counties.insert(location.county);
            }
            if !location.zip_code.is_empty() {
                zips.insert(location.zip_code);
            }
        }

        Ok(LocationOptions {
            cities: cities.into_iter().collect(),
            counties: counties.into_iter().collect(),
            zips: zips.into_iter().collect(),
        })
    }

    fn plan(&self, selection: &LocationSelection) -> Vec<Lookup> {
        let mut lookups = Vec::new();

        if !selection.states.is_empty() {
            let states: Vec<String> = selection.states.iter().cloned().collect();
            lookups.push(Lookup {
                dimension: "states",
                value: states.join(","),
                request: LocationSearchRequest::states(states, self.lookup_size),
            });
        }
        for city in &selection.cities {
            lookups.push(Lookup {
                dimension: "city",
                value: city.clone(),
                request: LocationSearchRequest::city(city.clone(), self.lookup_size),
            });
        }
        for county in &selection.counties {
            lookups.push(Lookup {
                dimension: "county",
                value: county.clone(),
                request: LocationSearchRequest::county(county.clone(), self.lookup_size),
            });
        }

        lookups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InMemoryDogApi;
    use crate::core::model::Location;

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

    fn api() -> Arc<InMemoryDogApi> {
        let api = InMemoryDogApi::new();
        api.add_location(location("94105", "San Francisco", "CA", "San Francisco"));
        api.add_location(location("90001", "Los Angeles", "CA", "Los Angeles"));
        api.add_location(location("10001", "New York", "NY", "New York"));
        api.add_location(location("73301", "Austin", "TX", "Travis"));
        api.add_location(location("78701", "Austin", "TX", "Travis"));
        Arc::new(api)
    }

    #[tokio::test]
    async fn test_empty_selection_resolves_to_nothing_without_requests() {
        let api = api();
        let resolver = LocationResolver::new(api.clone(), 10_000);

        let resolution = resolver.resolve(&LocationSelection::new()).await.unwrap();
        assert!(resolution.zips.is_empty());
        assert!(resolution.selection_empty);
        assert!(!resolution.matches_nothing());
        assert_eq!(api.call_count("/locations/search"), 0);
    }

    #[tokio::test]
    async fn test_union_with_manual_zips_has_no_duplicates() {
        let api = api();
        let resolver = LocationResolver::new(api.clone(), 10_000);

        let selection = LocationSelection::new()
            .with_states(["CA"])
            .with_manual_zips(["10001", "94105"]);
        let resolution = resolver.resolve(&selection).await.unwrap();

        let zips: Vec<&str> = resolution.zips.iter().map(String::as_str).collect();
        assert_eq!(zips, vec!["94105", "90001", "10001"]);
        assert!(!resolution.is_partial());
    }

    #[tokio::test]
    async fn test_states_batched_cities_and_counties_individual() {
        let api = api();
        let resolver = LocationResolver::new(api.clone(), 10_000);

        let selection = LocationSelection::new()
            .with_states(["CA", "NY"])
            .with_cities(["Austin"])
            .with_counties(["Travis", "New York"]);
        let resolution = resolver.resolve(&selection).await.unwrap();

        assert_eq!(api.call_count("/locations/search"), 4);
        assert_eq!(resolution.zips.len(), 5);
    }

    #[tokio::test]
    async fn test_partial_failure_degrades() {
        let api = api();
        api.fail_lookup("Austin");
        let resolver = LocationResolver::new(api.clone(), 10_000);

        let selection = LocationSelection::new()
            .with_states(["NY"])
            .with_cities(["Austin"]);
        let resolution = resolver.resolve(&selection).await.unwrap();

        assert!(resolution.is_partial());
        assert_eq!(resolution.zips.len(), 1);
        assert!(matches!(
            &resolution.failed[0],
            LocationError::LookupFailed { dimension, value, .. } if dimension == "city" && value == "Austin"
        ));
    }

    #[tokio::test]
    async fn test_all_lookups_failed() {
        let api = api();
        api.fail_endpoint("/locations/search");
        let resolver = LocationResolver::new(api.clone(), 10_000);

        let err = resolver
            .resolve(&LocationSelection::new().with_cities(["Austin", "New York"]))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AdoptError::Location(LocationError::AllLookupsFailed { attempted: 2 })
        );

        let fallback = resolver
            .resolve(
                &LocationSelection::new()
                    .with_cities(["Austin"])
                    .with_manual_zips(["12345"]),
            )
            .await
            .unwrap();
        assert!(fallback.is_partial());
        assert!(fallback.zips.contains("12345"));
    }

    #[tokio::test]
    async fn test_unknown_city_matches_nothing() {
        let resolver = LocationResolver::new(api(), 10_000);
        let resolution = resolver
            .resolve(&LocationSelection::new().with_cities(["Atlantis"]))
            .await
            .unwrap();
        assert!(resolution.matches_nothing());
    }

    #[test]
    fn test_normalization() {
        let selection = LocationSelection::new()
            .with_states([" ca ", ""])
            .with_manual_zips([" 10001 ", ""]);
        let normalized = selection.normalized().unwrap();
        assert!(normalized.states.contains("CA"));
        assert_eq!(normalized.states.len(), 1);
        assert!(normalized.manual_zips.contains("10001"));

        let bad = LocationSelection::new().with_manual_zips(["1000A"]);
        assert_eq!(
            bad.normalized().unwrap_err(),
            ValidationError::InvalidZipCode {
                value: "1000A".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_load_options_sorted_unique() {
        let resolver = LocationResolver::new(api(), 10_000);
        let options = resolver.load_options().await.unwrap();
        assert_eq!(
            options.cities,
            vec!["Austin", "Los Angeles", "New York", "San Francisco"]
        );
        assert_eq!(options.counties.len(), 4);
        assert_eq!(options.zips.first().map(String::as_str), Some("10001"));
    }

    #[test]
    fn test_us_states() {
        assert_eq!(US_STATES.len(), 50);
        assert!(US_STATES.contains(&"WY"));
    }
}
