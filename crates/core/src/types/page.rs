//! Collection responses from list endpoints.
//!
//! Some backend list endpoints return a bare JSON array, others wrap the
//! items in a paginated `{ "count": .., "next": .., "results": [...] }`
//! object. Which endpoint uses which shape is not documented, so every
//! list call accepts both.

use serde::{Deserialize, Serialize};

/// A list endpoint response in either of the two shapes the backend uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    /// `[ ... ]`
    Bare(Vec<T>),
    /// `{ "results": [ ... ], ... }`
    Paged {
        /// Items on this page.
        results: Vec<T>,
        /// Total number of items across all pages, when reported.
        #[serde(default)]
        count: Option<u64>,
        /// URL of the next page, when there is one.
        #[serde(default)]
        next: Option<String>,
        /// URL of the previous page, when there is one.
        #[serde(default)]
        previous: Option<String>,
    },
}

impl<T> ListResponse<T> {
    /// The items, whichever shape they arrived in.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Paged { results: items, .. } => items,
        }
    }

    /// Number of items in this response.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Bare(items) | Self::Paged { results: items, .. } => items.len(),
        }
    }

    /// Whether this response holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// URL of the page after this one, if the backend reported one.
    #[must_use]
    pub fn next_page(&self) -> Option<&str> {
        match self {
            Self::Paged { next, .. } => next.as_deref(),
            Self::Bare(_) => None,
        }
    }

    /// Total count reported by the backend, falling back to the item count.
    #[must_use]
    pub fn total(&self) -> u64 {
        match self {
            Self::Paged {
                count: Some(count), ..
            } => *count,
            _ => self.len() as u64,
        }
    }
}

impl<T> From<ListResponse<T>> for Vec<T> {
    fn from(response: ListResponse<T>) -> Self {
        response.into_items()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_array() {
        let list: ListResponse<u32> = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(list.total(), 3);
        assert_eq!(list.into_items(), vec![1, 2, 3]);
    }

    #[test]
    fn test_paged_wrapper() {
        let json = r#"{"count": 41, "next": "http://x/api/bills/?page=2", "previous": null, "results": [5, 6]}"#;
        let list: ListResponse<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.total(), 41);
        assert_eq!(list.into_items(), vec![5, 6]);
    }

    #[test]
    fn test_results_only_wrapper() {
        let list: ListResponse<u32> = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.total(), 0);
    }

    #[test]
    fn test_other_shapes_are_rejected() {
        assert!(serde_json::from_str::<ListResponse<u32>>(r#"{"items": [1]}"#).is_err());
        assert!(serde_json::from_str::<ListResponse<u32>>("42").is_err());
    }

    #[test]
    fn test_next_page() {
        let list: ListResponse<u32> = serde_json::from_str(
            r#"{"count": 40, "next": "http://localhost:8000/api/bills/?page=2", "previous": null, "results": [1]}"#,
        )
        .unwrap();
        assert_eq!(list.next_page(), Some("http://localhost:8000/api/bills/?page=2"));
        assert_eq!(list.total(), 40);

        let bare: ListResponse<u32> = serde_json::from_str("[1]").unwrap();
        assert_eq!(bare.next_page(), None);
    }
}
