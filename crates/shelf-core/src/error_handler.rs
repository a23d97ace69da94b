//! Error handler ids and the registry of failed requests.
//!
//! Every fetch or mutation is tagged with an [`ErrorHandlerId`]. When the
//! data layer reports a failure it is recorded against that id, and the
//! fetch engine refuses to issue another request for the same id until the
//! failure is cleared by an explicit retry.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::route::RouteParams;

/// Namespace used when the configuration does not override it.
pub const DEFAULT_NAMESPACE: &str = "collection-page";

/// Deterministic `{namespace}-{key}` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErrorHandlerId {
    namespace: String,
    key: String,
}

impl ErrorHandlerId {
    /// Handler id for one page of a collection: key `{userId}/{slug}/{page}`.
    ///
    /// The raw query page is used, so a location without `page` yields an
    /// empty trailing segment rather than `1`.
    #[must_use]
    pub fn for_page(namespace: &str, params: &RouteParams) -> Self {
        Self {
            namespace: namespace.to_string(),
            key: page_key(params),
        }
    }

    /// Handler id for the notes editor of one add-on.
    #[must_use]
    pub fn for_addon_notes(namespace: &str, addon_id: u64) -> Self {
        Self {
            namespace: namespace.to_string(),
            key: format!("addon-notes/{addon_id}"),
        }
    }

    /// The id without its namespace.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl fmt::Display for ErrorHandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.namespace, self.key)
    }
}

impl Serialize for ErrorHandlerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `{userId}/{slug}/{page}` with an empty page when none was given.
#[must_use]
pub fn page_key(params: &RouteParams) -> String {
    format!(
        "{}/{}/{}",
        params.user_id,
        params.slug,
        params.page.as_deref().unwrap_or_default()
    )
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// What the data layer reported for a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl RequestFailure {
    #[must_use]
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ErrorHandlerRegistry {
    failures: BTreeMap<ErrorHandlerId, RequestFailure>,
}

impl ErrorHandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure, replacing any earlier one for the same id.
    pub fn record(&mut self, id: ErrorHandlerId, failure: RequestFailure) {
        self.failures.insert(id, failure);
    }

    /// Forget the failure for `id`; returns it if there was one.
    pub fn clear(&mut self, id: &ErrorHandlerId) -> Option<RequestFailure> {
        self.failures.remove(id)
    }

    #[must_use]
    pub fn failure(&self, id: &ErrorHandlerId) -> Option<&RequestFailure> {
        self.failures.get(id)
    }

    #[must_use]
    pub fn has_failed(&self, id: &ErrorHandlerId) -> bool {
        self.failures.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}
