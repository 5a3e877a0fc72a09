//! Wire models shared by the catalog API and the search core

use serde::{Deserialize, Serialize};

/// A hydrated adoptable dog
///
/// Immutable once fetched; identity is `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dog {
    pub id: String,
    /// Image URL
    pub img: String,
    pub name: String,
    pub age: u32,
    pub zip_code: String,
    pub breed: String,
}

/// A US location as returned by `/locations` and `/locations/search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub zip_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub state: String,
    pub county: String,
}

/// Response of `GET /dogs/search`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// IDs in the order the server ranked them
    pub result_ids: Vec<String>,

    /// Total number of matches across all pages
    pub total: u64,

    /// Relative URL of the next page, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,

    /// Relative URL of the previous page, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

impl SearchResult {
    /// An empty result set
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Body of `POST /locations/search`
///
/// Absent fields are omitted from the JSON body entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationSearchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub states: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<u32>,
}

impl LocationSearchRequest {
    /// Lookup of every ZIP in the given states
    pub fn states(states: Vec<String>, size: u32) -> Self {
        Self {
            states: Some(states),
            size: Some(size),
            ..Default::default()
        }
    }

    /// Lookup of every ZIP in a city
    pub fn city(city: impl Into<String>, size: u32) -> Self {
        Self {
            city: Some(city.into()),
            size: Some(size),
            ..Default::default()
        }
    }

    /// Lookup of every ZIP in a county
    pub fn county(county: impl Into<String>, size: u32) -> Self {
        Self {
            county: Some(county.into()),
            size: Some(size),
            ..Default::default()
        }
    }

    /// Unfiltered lookup, used to build option lists
    pub fn all(size: u32) -> Self {
        Self {
            size: Some(size),
            ..Default::default()
        }
    }
}

/// Response of `POST /locations/search`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationSearchResponse {
    pub results: Vec<Location>,
    pub total: u64,
}

impl LocationSearchResponse {
    /// ZIP codes of every returned location, in response order
    pub fn zip_codes(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|loc| loc.zip_code.as_str())
    }
}

/// Response of `POST /dogs/match`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResponse {
    /// ID of the matched dog
    #[serde(rename = "match")]
    pub matched: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_result_wire_names() {
        let result: SearchResult = serde_json::from_value(json!({
            "resultIds": ["a", "b"],
            "total": 42,
            "next": "/dogs/search?size=25&from=25"
        }))
        .unwrap();

        assert_eq!(result.result_ids, vec!["a", "b"]);
        assert_eq!(result.total, 42);
        assert!(result.next.is_some());
        assert!(result.prev.is_none());
    }

    #[test]
    fn test_location_search_request_omits_absent_fields() {
        let body = serde_json::to_value(LocationSearchRequest::city("Austin", 10_000)).unwrap();
        assert_eq!(body, json!({"city": "Austin", "size": 10000}));

        let body = serde_json::to_value(LocationSearchRequest::states(
            vec!["CA".to_string(), "NV".to_string()],
            500,
        ))
        .unwrap();
        assert_eq!(body, json!({"states": ["CA", "NV"], "size": 500}));
    }

    #[test]
    fn test_match_response_field_name() {
        let parsed: MatchResponse = serde_json::from_value(json!({"match": "dog-7"})).unwrap();
        assert_eq!(parsed.matched, "dog-7");
    }

    #[test]
    fn test_dog_uses_snake_case_zip() {
        let dog: Dog = serde_json::from_value(json!({
            "id": "d1",
            "img": "https://img/d1.jpg",
            "name": "Rex",
            "age": 3,
            "zip_code": "10001",
            "breed": "Beagle"
        }))
        .unwrap();
        assert_eq!(dog.zip_code, "10001");
    }
}
