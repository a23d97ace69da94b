//! Filter codec: `page` / `collection_sort` query parameters.
//!
//! A collection page is sliced by two filters, the page token and the sort
//! order. Both always have a value once decoded, so the canonical record is
//! [`Filters`] and the raw, possibly-absent view is [`QueryParams`].
//!
//! `page` stays a string token end to end. Only the paging rules parse it
//! (see [`Filters::page_number`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use url::form_urlencoded;

/// Page used when the query carries none.
pub const DEFAULT_PAGE: &str = "1";

/// Query key for the page token.
pub const PAGE_KEY: &str = "page";
/// Query key for the sort order.
pub const SORT_KEY: &str = "collection_sort";
/// Query key used by the create page to preselect an add-on.
pub const INCLUDE_ADDON_KEY: &str = "include_addon_id";

// ---------------------------------------------------------------------------
// SortKey
// ---------------------------------------------------------------------------

/// Sort orders accepted by the collection add-ons endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortKey {
    #[serde(rename = "added")]
    DateAddedAscending,
    #[default]
    #[serde(rename = "-added")]
    DateAddedDescending,
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "-name")]
    NameDescending,
    #[serde(rename = "popularity")]
    Popularity,
    #[serde(rename = "-popularity")]
    PopularityDescending,
}

impl SortKey {
    pub const ALL: [Self; 6] = [
        Self::DateAddedAscending,
        Self::DateAddedDescending,
        Self::Name,
        Self::NameDescending,
        Self::Popularity,
        Self::PopularityDescending,
    ];

    /// Wire value used in query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DateAddedAscending => "added",
            Self::DateAddedDescending => "-added",
            Self::Name => "name",
            Self::NameDescending => "-name",
            Self::Popularity => "popularity",
            Self::PopularityDescending => "-popularity",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a sort value is not one of [`SortKey::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown collection sort '{0}'")]
pub struct UnknownSortKey(pub String);

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownSortKey(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Canonical filter record. Both fields are always populated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    pub page: String,
    pub collection_sort: SortKey,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE.to_string(),
            collection_sort: SortKey::default(),
        }
    }
}

impl Filters {
    #[must_use]
    pub fn new(page: impl Into<String>, collection_sort: SortKey) -> Self {
        Self {
            page: page.into(),
            collection_sort,
        }
    }

    /// Same filters with the page token replaced.
    #[must_use]
    pub fn with_page(&self, page: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            collection_sort: self.collection_sort,
        }
    }

    /// The page as a positive integer, or `None` when the token is not one.
    #[must_use]
    pub fn page_number(&self) -> Option<u64> {
        if self.page.is_empty() || !self.page.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.page.parse::<u64>().ok().filter(|page| *page > 0)
    }
}

// ---------------------------------------------------------------------------
// QueryParams
// ---------------------------------------------------------------------------

/// Raw query parameters as they appeared in a location.
///
/// Absent stays absent here; [`QueryParams::filters`] applies defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    pub page: Option<String>,
    pub collection_sort: Option<SortKey>,
    pub include_addon_id: Option<String>,
}

impl QueryParams {
    /// Parse a query string, with or without the leading `?`.
    ///
    /// The first occurrence of a key wins. Empty values count as absent.
    /// Unknown keys are ignored, and so is a sort value that is not a
    /// known [`SortKey`].
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                PAGE_KEY if params.page.is_none() => {
                    params.page = Some(value.into_owned());
                }
                SORT_KEY if params.collection_sort.is_none() => match value.parse::<SortKey>() {
                    Ok(sort) => params.collection_sort = Some(sort),
                    Err(err) => debug!(%err, "ignoring collection sort"),
                },
                INCLUDE_ADDON_KEY if params.include_addon_id.is_none() => {
                    params.include_addon_id = Some(value.into_owned());
                }
                _ => {}
            }
        }

        params
    }

    /// Canonical filters, filling in defaults.
    #[must_use]
    pub fn filters(&self) -> Filters {
        Filters {
            page: self
                .page
                .clone()
                .unwrap_or_else(|| DEFAULT_PAGE.to_string()),
            collection_sort: self.collection_sort.unwrap_or_default(),
        }
    }
}

/// Decode a query string into canonical filters.
#[must_use]
pub fn decode(query: &str) -> Filters {
    QueryParams::parse(query).filters()
}

/// Encode filters as a query string (no leading `?`), page first.
#[must_use]
pub fn encode(filters: &Filters) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair(PAGE_KEY, &filters.page)
        .append_pair(SORT_KEY, filters.collection_sort.as_str())
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_decodes_to_defaults() {
        let filters = decode("");
        assert_eq!(filters.page, "1");
        assert_eq!(filters.collection_sort, SortKey::DateAddedDescending);
        assert_eq!(filters, Filters::default());
    }

    #[test]
    fn decodes_page_and_sort() {
        let filters = decode("?page=123&collection_sort=name");
        assert_eq!(filters, Filters::new("123", SortKey::Name));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let filters = decode("utm_source=feed&page=2&x=y");
        assert_eq!(filters, Filters::new("2", SortKey::DateAddedDescending));
    }

    #[test]
    fn unknown_sort_falls_back_to_default() {
        let params = QueryParams::parse("collection_sort=shuffle");
        assert_eq!(params.collection_sort, None);
        assert_eq!(params.filters().collection_sort, SortKey::DateAddedDescending);
    }

    #[test]
    fn malformed_page_passes_through() {
        let filters = decode("page=abc");
        assert_eq!(filters.page, "abc");
        assert_eq!(filters.page_number(), None);
    }

    #[test]
    fn first_occurrence_wins() {
        let params = QueryParams::parse("page=4&page=9");
        assert_eq!(params.page.as_deref(), Some("4"));
    }

    #[test]
    fn empty_value_counts_as_absent() {
        let params = QueryParams::parse("page=&collection_sort=");
        assert_eq!(params, QueryParams::default());
    }

    #[test]
    fn encode_emits_page_then_sort() {
        let query = encode(&Filters::new("1", SortKey::Name));
        assert_eq!(query, "page=1&collection_sort=name");
    }

    #[test]
    fn encode_escapes_page_token() {
        let filters = Filters::new("a b&c", SortKey::NameDescending);
        let query = encode(&filters);
        assert_eq!(query, "page=a+b%26c&collection_sort=-name");
        assert_eq!(decode(&query), filters);
    }

    #[test]
    fn page_number_rejects_zero_and_signs() {
        assert_eq!(Filters::default().with_page("0").page_number(), None);
        assert_eq!(Filters::default().with_page("-1").page_number(), None);
        assert_eq!(Filters::default().with_page("+2").page_number(), None);
        assert_eq!(Filters::default().with_page("07").page_number(), Some(7));
    }

    #[test]
    fn sort_key_round_trips_through_str_and_serde() {
        for key in SortKey::ALL {
            assert_eq!(key.as_str().parse::<SortKey>(), Ok(key));
            let json = serde_json::to_string(&key).expect("serialize");
            assert_eq!(json, format!("\"{}\"", key.as_str()));
        }
    }

    #[test]
    fn filters_serialize_camel_case() {
        let json = serde_json::to_value(Filters::default()).expect("serialize");
        assert_eq!(json, serde_json::json!({"page": "1", "collectionSort": "-added"}));
    }

    #[test]
    fn include_addon_id_is_captured() {
        let params = QueryParams::parse("include_addon_id=42");
        assert_eq!(params.include_addon_id.as_deref(), Some("42"));
    }
}
