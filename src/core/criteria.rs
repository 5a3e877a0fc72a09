//! Filter criteria and the store that owns them
//!
//! Every mutation except a raw page move resets the page offset to zero.

use crate::core::error::ValidationError;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Field the server sorts by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Name,
    Breed,
    Age,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Breed => "breed",
            SortField::Age => "age",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// A single-field sort, rendered as `field:direction`
///
/// # Example
/// ```
/// use adopt::core::criteria::{SortDirection, SortField, SortOrder};
///
/// let sort: SortOrder = "age:desc".parse().unwrap();
/// assert_eq!(sort.field, SortField::Age);
/// assert_eq!(sort.direction, SortDirection::Desc);
/// assert_eq!(sort.to_string(), "age:desc");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::new(SortField::Breed, SortDirection::Asc)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field.as_str(), self.direction.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    /// Parse `field:asc` / `field:desc`; a bare `field` means ascending
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidSort {
            value: s.to_string(),
        };

        let (field, direction) = match s.trim().split_once(':') {
            Some((field, direction)) => (field, direction),
            None => (s.trim(), "asc"),
        };

        let field = match field.to_ascii_lowercase().as_str() {
            "name" => SortField::Name,
            "breed" => SortField::Breed,
            "age" => SortField::Age,
            _ => return Err(invalid()),
        };
        let direction = match direction.to_ascii_lowercase().as_str() {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return Err(invalid()),
        };

        Ok(Self { field, direction })
    }
}

impl TryFrom<String> for SortOrder {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortOrder> for String {
    fn from(sort: SortOrder) -> Self {
        sort.to_string()
    }
}

/// Current value of every filter dimension
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Selected breeds, insertion-ordered and deduplicated
    pub breeds: IndexSet<String>,
    pub age_min: Option<u32>,
    pub age_max: Option<u32>,
    /// Resolved ZIP union; always flat and deduplicated
    pub zip_codes: IndexSet<String>,
    pub sort: SortOrder,
    /// Client-side name overlay, never sent to the server
    pub name_query: String,
}

/// Offset/size pair sent as `from`/`size`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub offset: u64,
    pub size: u64,
}

impl PageWindow {
    /// A window at offset zero; a zero size is bumped to one
    pub fn new(size: u64) -> Self {
        Self {
            offset: 0,
            size: size.max(1),
        }
    }
}

/// Owner of the filter criteria and page window
///
/// Mutators other than [`CriteriaStore::set_offset`] reset the offset, so a
/// filter change always starts again from the first page.
#[derive(Debug, Clone)]
pub struct CriteriaStore {
    criteria: FilterCriteria,
    window: PageWindow,
}

impl CriteriaStore {
    pub fn new(page_size: u64, sort: SortOrder) -> Self {
        Self {
            criteria: FilterCriteria {
                sort,
                ..Default::default()
            },
            window: PageWindow::new(page_size),
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn window(&self) -> PageWindow {
        self.window
    }

    /// Replace the breed selection; blank entries are dropped
    pub fn set_breeds<I, S>(&mut self, breeds: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.criteria.breeds = breeds
            .into_iter()
            .map(|b| b.as_ref().trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();
        self.reset_offset();
    }

    /// Set the age bounds; an inverted range is rejected and nothing changes
    pub fn set_age_range(
        &mut self,
        age_min: Option<u32>,
        age_max: Option<u32>,
    ) -> Result<(), ValidationError> {
        if let (Some(min), Some(max)) = (age_min, age_max) {
            if min > max {
                return Err(ValidationError::InvalidAgeRange { min, max });
            }
        }

        self.criteria.age_min = age_min;
        self.criteria.age_max = age_max;
        self.reset_offset();
        Ok(())
    }

    /// Replace the resolved ZIP union
    pub fn set_zip_codes<I>(&mut self, zips: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.criteria.zip_codes = zips.into_iter().collect();
        self.reset_offset();
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.criteria.sort = sort;
        self.reset_offset();
    }

    /// Change the sort field, keeping the direction
    pub fn set_sort_field(&mut self, field: SortField) {
        self.criteria.sort.field = field;
        self.reset_offset();
    }

    pub fn toggle_sort_direction(&mut self) {
        self.criteria.sort.direction = self.criteria.sort.direction.toggled();
        self.reset_offset();
    }

    pub fn set_name_query(&mut self, query: impl Into<String>) {
        self.criteria.name_query = query.into();
        self.reset_offset();
    }

    /// Drop every filter, keeping the sort order
    pub fn clear_filters(&mut self) {
        let sort = self.criteria.sort;
        self.criteria = FilterCriteria {
            sort,
            ..Default::default()
        };
        self.reset_offset();
    }

    /// Raw page move; the only mutation that does not reset the offset
    pub fn set_offset(&mut self, offset: u64) {
        self.window.offset = offset;
    }

    fn reset_offset(&mut self) {
        self.window.offset = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_on_page_three() -> CriteriaStore {
        let mut store = CriteriaStore::new(25, SortOrder::default());
        store.set_offset(50);
        store
    }

    #[test]
    fn test_sort_order_parse_and_display() {
        assert_eq!(
            "breed:asc".parse::<SortOrder>().unwrap(),
            SortOrder::new(SortField::Breed, SortDirection::Asc)
        );
        assert_eq!(
            "name".parse::<SortOrder>().unwrap(),
            SortOrder::new(SortField::Name, SortDirection::Asc)
        );
        assert_eq!(
            SortOrder::new(SortField::Age, SortDirection::Desc).to_string(),
            "age:desc"
        );
        assert!("zip:asc".parse::<SortOrder>().is_err());
        assert!("age:sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_sort_order_serde_as_token() {
        let sort = SortOrder::new(SortField::Name, SortDirection::Desc);
        assert_eq!(serde_json::to_value(sort).unwrap(), "name:desc");
        let back: SortOrder = serde_json::from_value(serde_json::json!("name:desc")).unwrap();
        assert_eq!(back, sort);
    }

    #[test]
    fn test_every_filter_mutation_resets_offset() {
        let mutations: Vec<(&str, Box<dyn Fn(&mut CriteriaStore)>)> = vec![
            ("breeds", Box::new(|s: &mut CriteriaStore| s.set_breeds(["Beagle"]))),
            (
                "age",
                Box::new(|s: &mut CriteriaStore| s.set_age_range(Some(1), Some(4)).unwrap()),
            ),
            (
                "zips",
                Box::new(|s: &mut CriteriaStore| s.set_zip_codes(vec!["10001".to_string()])),
            ),
            (
                "sort",
                Box::new(|s: &mut CriteriaStore| s.set_sort(SortOrder::new(SortField::Age, SortDirection::Desc))),
            ),
            ("sort_field", Box::new(|s: &mut CriteriaStore| s.set_sort_field(SortField::Name))),
            ("toggle", Box::new(|s: &mut CriteriaStore| s.toggle_sort_direction())),
            ("name", Box::new(|s: &mut CriteriaStore| s.set_name_query("rex"))),
            ("clear", Box::new(|s: &mut CriteriaStore| s.clear_filters())),
        ];

        for (name, mutate) in mutations {
            let mut store = store_on_page_three();
            mutate(&mut store);
            assert_eq!(store.window().offset, 0, "{} did not reset offset", name);
        }
    }

    #[test]
    fn test_set_offset_keeps_filters() {
        let mut store = CriteriaStore::new(10, SortOrder::default());
        store.set_breeds(["Pug"]);
        store.set_offset(30);
        assert_eq!(store.window().offset, 30);
        assert!(store.criteria().breeds.contains("Pug"));
    }

    #[test]
    fn test_inverted_age_range_rejected_without_side_effects() {
        let mut store = store_on_page_three();
        store.set_age_range(Some(2), Some(8)).unwrap();
        store.set_offset(50);

        let err = store.set_age_range(Some(9), Some(3)).unwrap_err();
        assert_eq!(err, ValidationError::InvalidAgeRange { min: 9, max: 3 });
        assert_eq!(store.criteria().age_min, Some(2));
        assert_eq!(store.criteria().age_max, Some(8));
        assert_eq!(store.window().offset, 50);
    }

    #[test]
    fn test_breeds_deduplicated_and_trimmed() {
        let mut store = CriteriaStore::new(10, SortOrder::default());
        store.set_breeds(["Beagle", " Beagle ", "", "Pug"]);
        let breeds: Vec<&str> = store.criteria().breeds.iter().map(String::as_str).collect();
        assert_eq!(breeds, vec!["Beagle", "Pug"]);
    }

    #[test]
    fn test_toggle_direction_keeps_field() {
        let mut store = CriteriaStore::new(10, SortOrder::default());
        store.set_sort_field(SortField::Age);
        store.toggle_sort_direction();
        assert_eq!(
            store.criteria().sort,
            SortOrder::new(SortField::Age, SortDirection::Desc)
        );
    }

    #[test]
    fn test_clear_filters_keeps_sort() {
        let mut store = CriteriaStore::new(10, SortOrder::new(SortField::Name, SortDirection::Desc));
        store.set_breeds(["Pug"]);
        store.set_name_query("max");
        store.clear_filters();
        assert!(store.criteria().breeds.is_empty());
        assert!(store.criteria().name_query.is_empty());
        assert_eq!(store.criteria().sort.field, SortField::Name);
    }

    #[test]
    fn test_zero_page_size_bumped() {
        let store = CriteriaStore::new(0, SortOrder::default());
        assert_eq!(store.window().size, 1);
    }
}
