//! Canonical collection URLs.
//!
//! A collection can be reached by `/{username}/{slug}` or with a slug in the
//! wrong case. Once the collection is loaded the page issues one permanent
//! redirect to `/{authorId}/{canonical slug}`.

use tracing::info;

use crate::collection::{CollectionSummary, numeric_user_id};
use crate::command::{PERMANENT_REDIRECT, Redirect};
use crate::route::{CollectionRoute, RouteParams, collection_pathname};

/// The corrected path segments, when any correction is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalIdentity {
    pub author_id: u64,
    pub slug: String,
}

/// Compare route segments against the loaded collection.
///
/// Returns `None` when the route already uses the numeric author id and the
/// exact slug. A slug that differs by more than case is left alone; that is
/// a different collection, not a misspelling of this one.
#[must_use]
pub fn resolve_identity(
    params: &RouteParams,
    summary: &CollectionSummary,
) -> Option<CanonicalIdentity> {
    let user_needs_fix = numeric_user_id(&params.user_id) != Some(summary.author_id);
    let slug_needs_fix =
        params.slug != summary.slug && params.slug.to_lowercase() == summary.slug.to_lowercase();

    if !user_needs_fix && !slug_needs_fix {
        return None;
    }

    Some(CanonicalIdentity {
        author_id: summary.author_id,
        slug: if slug_needs_fix {
            summary.slug.clone()
        } else {
            params.slug.clone()
        },
    })
}

/// Build the 301 for `route`, keeping its mode and query string.
#[must_use]
pub fn canonical_redirect(route: &CollectionRoute, summary: &CollectionSummary) -> Option<Redirect> {
    let identity = resolve_identity(&route.params, summary)?;

    let mut url = collection_pathname(
        &route.lang,
        &route.client_app,
        &identity.author_id.to_string(),
        &identity.slug,
        route.mode,
    );
    if let Some(query) = route.query_string() {
        url.push('?');
        url.push_str(&query);
    }

    info!(
        from = %route.href(),
        to = %url,
        "redirecting to canonical collection url"
    );

    Some(Redirect {
        status: PERMANENT_REDIRECT,
        url,
    })
}
