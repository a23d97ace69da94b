//! Page arithmetic: reconciliation after a removal, pagination links and
//! loading placeholders.
//!
//! These are the only places that read `page` as a number. Everything else
//! treats it as an opaque token.

use serde::Serialize;
use tracing::debug;

use crate::collection::CollectionSummary;
use crate::filters::{self, Filters};

/// Outcome of removing one add-on from the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The page still has add-ons (or is the first page); stay.
    Unchanged,
    /// The page became empty; move to `filters` (one page back).
    StepBack { filters: Filters },
}

impl Reconciliation {
    /// Filters that should accompany the removal.
    #[must_use]
    pub fn filters_or<'a>(&'a self, current: &'a Filters) -> &'a Filters {
        match self {
            Self::Unchanged => current,
            Self::StepBack { filters } => filters,
        }
    }
}

/// Add-ons on page `page` of a collection holding `item_count` add-ons.
///
/// Zero when the page is past the end or the page size is zero.
#[must_use]
pub const fn items_on_page(page: u64, item_count: u64, page_size: u64) -> u64 {
    if page == 0 || page_size == 0 {
        return 0;
    }
    let before = (page - 1).saturating_mul(page_size);
    let remaining = item_count.saturating_sub(before);
    if remaining < page_size {
        remaining
    } else {
        page_size
    }
}

/// Decide whether removing one add-on from the current page empties it.
///
/// `item_count` is the collection size before the removal. Only a page past
/// the first that held exactly one add-on steps back.
#[must_use]
pub fn reconcile_removal(current: &Filters, item_count: u64, page_size: u64) -> Reconciliation {
    let Some(page) = current.page_number() else {
        debug!(page = %current.page, "page is not a positive integer; leaving it");
        return Reconciliation::Unchanged;
    };

    let on_page = items_on_page(page, item_count, page_size);
    if on_page == 1 && page > 1 {
        let previous = (page - 1).to_string();
        debug!(from = page, to = %previous, "current page emptied by removal");
        return Reconciliation::StepBack {
            filters: current.with_page(previous),
        };
    }

    if on_page == 0 {
        debug!(page, item_count, page_size, "removal from a page with no add-ons");
    }
    Reconciliation::Unchanged
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Page position plus the neighbouring filter sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub previous: Option<Filters>,
    pub next: Option<Filters>,
}

impl Pagination {
    #[must_use]
    pub fn previous_href(&self, pathname: &str) -> Option<String> {
        self.previous.as_ref().map(|f| href(pathname, f))
    }

    #[must_use]
    pub fn next_href(&self, pathname: &str) -> Option<String> {
        self.next.as_ref().map(|f| href(pathname, f))
    }
}

fn href(pathname: &str, filters: &Filters) -> String {
    format!("{pathname}?{}", filters::encode(filters))
}

/// Total pages for `item_count` add-ons, rounding up.
#[must_use]
pub const fn total_pages(item_count: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    item_count.div_ceil(page_size)
}

/// Pagination for the current filters, or `None` for an empty collection.
///
/// A page token that is not a number is shown as page 1.
#[must_use]
pub fn paginate(current: &Filters, item_count: u64, page_size: u64) -> Option<Pagination> {
    let total = total_pages(item_count, page_size);
    if total == 0 {
        return None;
    }
    let page = current.page_number().unwrap_or(1);

    Some(Pagination {
        current_page: page,
        total_pages: total,
        previous: (page > 1).then(|| current.with_page((page - 1).to_string())),
        next: (page < total).then(|| current.with_page((page + 1).to_string())),
    })
}

/// Placeholders to reserve while a collection or page is loading.
///
/// Mirrors the size of the last loaded page so the layout does not jump;
/// falls back to `default` when nothing (or an empty page) was loaded.
#[must_use]
pub fn placeholder_count(previous: Option<&CollectionSummary>, default: usize) -> usize {
    previous
        .map(|summary| summary.page_results)
        .filter(|count| *count > 0)
        .and_then(|count| usize::try_from(count).ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::SortKey;

    fn page(p: &str) -> Filters {
        Filters::new(p, SortKey::DateAddedDescending)
    }

    #[test]
    fn items_on_page_handles_partial_and_past_end() {
        assert_eq!(items_on_page(1, 10, 5), 5);
        assert_eq!(items_on_page(2, 10, 5), 5);
        assert_eq!(items_on_page(3, 11, 5), 1);
        assert_eq!(items_on_page(4, 11, 5), 0);
        assert_eq!(items_on_page(1, 0, 5), 0);
        assert_eq!(items_on_page(1, 3, 0), 0);
    }

    #[test]
    fn last_item_on_second_page_steps_back() {
        let outcome = reconcile_removal(&page("2"), 2, 1);
        assert_eq!(outcome, Reconciliation::StepBack { filters: page("1") });
    }

    #[test]
    fn full_page_stays() {
        assert_eq!(reconcile_removal(&page("2"), 10, 5), Reconciliation::Unchanged);
    }

    #[test]
    fn first_page_never_steps_back() {
        assert_eq!(reconcile_removal(&page("1"), 1, 5), Reconciliation::Unchanged);
        assert_eq!(reconcile_removal(&page("1"), 10, 5), Reconciliation::Unchanged);
    }

    #[test]
    fn step_back_keeps_sort() {
        let current = Filters::new("3", SortKey::Name);
        let outcome = reconcile_removal(&current, 11, 5);
        assert_eq!(
            outcome,
            Reconciliation::StepBack {
                filters: Filters::new("2", SortKey::Name)
            }
        );
        assert_eq!(outcome.filters_or(&current).page, "2");
    }

    #[test]
    fn unparseable_or_out_of_range_page_stays() {
        assert_eq!(reconcile_removal(&page("abc"), 2, 1), Reconciliation::Unchanged);
        assert_eq!(reconcile_removal(&page("0"), 2, 1), Reconciliation::Unchanged);
        assert_eq!(reconcile_removal(&page("9"), 2, 1), Reconciliation::Unchanged);
    }

    #[test]
    fn paginate_second_of_two() {
        let current = Filters::new("2", SortKey::Name);
        let pagination = paginate(&current, 10, 5).expect("pagination");
        assert_eq!(pagination.current_page, 2);
        assert_eq!(pagination.total_pages, 2);
        assert_eq!(pagination.next, None);
        assert_eq!(
            pagination.previous_href("/en-US/firefox/collections/123/slug/").as_deref(),
            Some("/en-US/firefox/collections/123/slug/?page=1&collection_sort=name")
        );
    }

    #[test]
    fn paginate_first_page_has_next_only() {
        let pagination = paginate(&page("1"), 10, 5).expect("pagination");
        assert_eq!(pagination.previous, None);
        assert_eq!(pagination.next, Some(page("2")));
        assert_eq!(
            pagination.next_href("/p/").as_deref(),
            Some("/p/?page=2&collection_sort=-added")
        );
    }

    #[test]
    fn empty_collection_has_no_pagination() {
        assert_eq!(paginate(&page("1"), 0, 5), None);
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(11, 5), 3);
    }

    #[test]
    fn placeholders_follow_previous_page() {
        let summary = CollectionSummary {
            author_id: 1,
            author_username: None,
            slug: "a".into(),
            item_count: 10,
            page_size: 5,
            page_results: 1,
        };
        assert_eq!(placeholder_count(Some(&summary), 3), 1);
        assert_eq!(placeholder_count(None, 3), 3);

        let empty = CollectionSummary {
            page_results: 0,
            ..summary
        };
        assert_eq!(placeholder_count(Some(&empty), 3), 3);
    }
}
