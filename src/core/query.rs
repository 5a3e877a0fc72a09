//! Canonical search query and the builder that projects criteria into it

use crate::core::criteria::{FilterCriteria, PageWindow};
use serde::Serialize;
use std::fmt;

/// Normalized request for `GET /dogs/search`
///
/// Built only through [`QueryBuilder::build`]. Empty selections are `None`
/// and never rendered: the remote contract treats an absent parameter and an
/// empty list differently.
///
/// # Example
/// ```text
/// GET /dogs/search?breeds=Beagle&breeds=Pug&ageMin=2&sort=age:asc&size=25&from=0
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breeds: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_codes: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_min: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_max: Option<u32>,

    /// Single `field:direction` token
    pub sort: String,

    pub size: u64,

    pub from: u64,
}

impl CanonicalQuery {
    /// Render as ordered query pairs, repeating the key for list values
    ///
    /// Order: breeds, zipCodes, ageMin, ageMax, sort, size, from.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(breeds) = &self.breeds {
            pairs.extend(breeds.iter().map(|b| ("breeds", b.clone())));
        }
        if let Some(zips) = &self.zip_codes {
            pairs.extend(zips.iter().map(|z| ("zipCodes", z.clone())));
        }
        if let Some(min) = self.age_min {
            pairs.push(("ageMin", min.to_string()));
        }
        if let Some(max) = self.age_max {
            pairs.push(("ageMax", max.to_string()));
        }
        pairs.push(("sort", self.sort.clone()));
        pairs.push(("size", self.size.to_string()));
        pairs.push(("from", self.from.to_string()));

        pairs
    }
}

/// Unencoded `key=value&...` form, used in logs and tests
impl fmt::Display for CanonicalQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .to_query_pairs()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        write!(f, "{}", rendered.join("&"))
    }
}

/// Pure projection of filter state into a [`CanonicalQuery`]
pub struct QueryBuilder;

impl QueryBuilder {
    /// Build the query for the given criteria and page window
    ///
    /// `criteria.zip_codes` is expected to already hold the resolved ZIP
    /// union. The name overlay is client-side and never part of the query.
    pub fn build(criteria: &FilterCriteria, window: &PageWindow) -> CanonicalQuery {
        let non_empty = |set: &indexmap::IndexSet<String>| {
            (!set.is_empty()).then(|| set.iter().cloned().collect::<Vec<_>>())
        };

        CanonicalQuery {
            breeds: non_empty(&criteria.breeds),
            zip_codes: non_empty(&criteria.zip_codes),
            age_min: criteria.age_min,
            age_max: criteria.age_max,
            sort: criteria.sort.to_string(),
            size: window.size,
            from: window.offset,
        }
    }
}
