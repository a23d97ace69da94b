//! Loaded collection data and the viewer looking at it.

use serde::{Deserialize, Serialize};

use crate::route::RouteParams;

/// What the page knows about a collection after a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub author_id: u64,
    #[serde(default)]
    pub author_username: Option<String>,
    pub slug: String,
    /// Add-ons in the whole collection.
    pub item_count: u64,
    pub page_size: u64,
    /// Add-ons returned for the page that was loaded.
    #[serde(default)]
    pub page_results: u64,
}

impl CollectionSummary {
    /// Whether this summary is the collection a route points at.
    ///
    /// Slugs compare case-insensitively. The user segment matches either the
    /// numeric author id or, case-insensitively, the author's username.
    #[must_use]
    pub fn matches_route(&self, params: &RouteParams) -> bool {
        if !eq_ignore_case(&self.slug, &params.slug) {
            return false;
        }
        if numeric_user_id(&params.user_id) == Some(self.author_id) {
            return true;
        }
        self.author_username
            .as_deref()
            .is_some_and(|username| eq_ignore_case(username, &params.user_id))
    }

    /// Whether this summary can be the response to a request for `params`.
    ///
    /// Looser than [`Self::matches_route`]: a username segment is accepted
    /// when the summary carries no username, since the server resolved it.
    /// A numeric segment must still equal the author id.
    #[must_use]
    pub fn answers_request(&self, params: &RouteParams) -> bool {
        if !eq_ignore_case(&self.slug, &params.slug) {
            return false;
        }
        match numeric_user_id(&params.user_id) {
            Some(id) => id == self.author_id,
            None => self
                .author_username
                .as_deref()
                .is_none_or(|username| eq_ignore_case(username, &params.user_id)),
        }
    }

    #[must_use]
    pub const fn is_author(&self, viewer: Viewer) -> bool {
        matches!(viewer, Viewer::SignedIn { user_id } if user_id == self.author_id)
    }
}

/// Parse a user segment that is a plain decimal id.
///
/// Usernames, signed values and empty strings return `None`.
#[must_use]
pub fn numeric_user_id(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Who is looking at the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Viewer {
    #[default]
    Anonymous,
    SignedIn {
        user_id: u64,
    },
}

impl Viewer {
    #[must_use]
    pub const fn is_signed_in(self) -> bool {
        matches!(self, Self::SignedIn { .. })
    }

    #[must_use]
    pub const fn user_id(self) -> Option<u64> {
        match self {
            Self::Anonymous => None,
            Self::SignedIn { user_id } => Some(user_id),
        }
    }
}
