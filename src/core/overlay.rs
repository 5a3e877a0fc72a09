//! Client-side name overlay and the "showing A–B of N" accounting

use crate::core::criteria::PageWindow;
use crate::core::model::Dog;
use serde::Serialize;
use std::fmt;

/// Case-insensitive substring filter over already hydrated records
///
/// The overlay narrows the current page only; it never issues a query.
pub struct NameOverlayFilter;

impl NameOverlayFilter {
    /// Records whose name contains `query`, ignoring case
    ///
    /// An empty query returns the list unchanged.
    pub fn apply(records: &[Dog], query: &str) -> Vec<Dog> {
        if query.is_empty() {
            return records.to_vec();
        }

        let needle = query.to_lowercase();
        records
            .iter()
            .filter(|dog| dog.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    pub fn is_active(query: &str) -> bool {
        !query.is_empty()
    }
}

/// The "showing `from`–`to` of `of`" triple reported to presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayRange {
    pub from: u64,
    pub to: u64,
    pub of: u64,
}

impl DisplayRange {
    /// Accounting for the current page
    ///
    /// Without an overlay the range follows the server window and total.
    /// With an active overlay it is `1–len of len`, ignoring the offset.
    pub fn compute(window: PageWindow, total: u64, overlay_len: usize, overlay_active: bool) -> Self {
        if overlay_active {
            let len = overlay_len as u64;
            return Self {
                from: len.min(1),
                to: len,
                of: len,
            };
        }

        if total == 0 || window.offset >= total {
            return Self {
                from: 0,
                to: 0,
                of: total,
            };
        }

        Self {
            from: window.offset + 1,
            to: (window.offset + window.size).min(total),
            of: total,
        }
    }
}

impl fmt::Display for DisplayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Showing {} - {} of {}", self.from, self.to, self.of)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dog(id: &str, name: &str) -> Dog {
        Dog {
            id: id.to_string(),
            img: format!("https://img/{}.jpg", id),
            name: name.to_string(),
            age: 3,
            zip_code: "10001".to_string(),
            breed: "Beagle".to_string(),
        }
    }

    fn pack() -> Vec<Dog> {
        vec![
            dog("d1", "Rex"),
            dog("d2", "Rexy"),
            dog("d3", "Bella"),
            dog("d4", "T-REX"),
        ]
    }

    #[test]
    fn test_empty_query_is_identity() {
        assert_eq!(NameOverlayFilter::apply(&pack(), ""), pack());
    }

    #[test]
    fn test_case_insensitive_substring() {
        let ids: Vec<String> = NameOverlayFilter::apply(&pack(), "rEx")
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["d1", "d2", "d4"]);
    }

    #[test]
    fn test_idempotent() {
        let once = NameOverlayFilter::apply(&pack(), "ell");
        let twice = NameOverlayFilter::apply(&once, "ell");
        assert_eq!(once, twice);
        assert_eq!(once.len(), 1);
    }

    #[test]
    fn test_range_without_overlay_follows_server() {
        let window = PageWindow {
            offset: 25,
            size: 25,
        };
        let range = DisplayRange::compute(window, 60, 25, false);
        assert_eq!(range, DisplayRange { from: 26, to: 50, of: 60 });

        let last = PageWindow {
            offset: 50,
            size: 25,
        };
        let range = DisplayRange::compute(last, 60, 10, false);
        assert_eq!(range, DisplayRange { from: 51, to: 60, of: 60 });
    }

    #[test]
    fn test_range_with_overlay_ignores_offset() {
        let window = PageWindow {
            offset: 50,
            size: 25,
        };
        let range = DisplayRange::compute(window, 400, 3, true);
        assert_eq!(range, DisplayRange { from: 1, to: 3, of: 3 });
        assert_eq!(range.to_string(), "Showing 1 - 3 of 3");

        let none = DisplayRange::compute(window, 400, 0, true);
        assert_eq!(none, DisplayRange { from: 0, to: 0, of: 0 });
    }

    #[test]
    fn test_range_with_no_results() {
        let range = DisplayRange::compute(PageWindow::new(25), 0, 0, false);
        assert_eq!(range, DisplayRange { from: 0, to: 0, of: 0 });
    }
}
