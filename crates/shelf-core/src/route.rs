//! Collection page locations.
//!
//! Two shapes are recognised:
//!
//! - `/{lang}/{app}/collections/{userId}/{slug}/[edit/][?query]`
//! - `/{lang}/{app}/collections/add/[?include_addon_id=N]`
//!
//! Path segments are kept as they appear in the location (no case folding,
//! no percent-decoding) so that canonical-identity checks see exactly what
//! the visitor typed.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ErrorCode;
use crate::filters::{self, Filters, QueryParams, SortKey};

const PARSE_BASE: &str = "http://shelf.invalid/";
const COLLECTIONS_SEGMENT: &str = "collections";
const ADD_SEGMENT: &str = "add";
const EDIT_SEGMENT: &str = "edit";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("location must be an absolute path: '{0}'")]
    NotAbsolute(String),

    #[error("malformed location '{location}': {source}")]
    Malformed {
        location: String,
        #[source]
        source: url::ParseError,
    },

    #[error("not a collection page: '{0}'")]
    NotCollectionPage(String),
}

impl RouteError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotAbsolute(_) | Self::Malformed { .. } => ErrorCode::InvalidLocation,
            Self::NotCollectionPage(_) => ErrorCode::UnknownRoute,
        }
    }
}

// ---------------------------------------------------------------------------
// RouteParams / Scope
// ---------------------------------------------------------------------------

/// Parameters of one navigation to a collection.
///
/// `user_id` is either a numeric id or a username; nothing here decides
/// which (see [`crate::identity`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteParams {
    pub user_id: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortKey>,
}

impl RouteParams {
    #[must_use]
    pub fn new(user_id: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            slug: slug.into(),
            page: None,
            sort: None,
        }
    }

    #[must_use]
    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    #[must_use]
    pub const fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: &QueryParams) -> Self {
        self.page.clone_from(&query.page);
        self.sort = query.collection_sort;
        self
    }

    /// Canonical filters for this navigation.
    #[must_use]
    pub fn filters(&self) -> Filters {
        Filters {
            page: self
                .page
                .clone()
                .unwrap_or_else(|| filters::DEFAULT_PAGE.to_string()),
            collection_sort: self.sort.unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn scope(&self) -> Scope {
        Scope {
            user_id: self.user_id.clone(),
            slug: self.slug.clone(),
        }
    }

    /// Same filters, different collection.
    #[must_use]
    pub fn rescoped(&self, scope: &Scope) -> Self {
        Self {
            user_id: scope.user_id.clone(),
            slug: scope.slug.clone(),
            page: self.page.clone(),
            sort: self.sort,
        }
    }
}

/// The `(userId, slug)` pair that owns a fetch/load lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub user_id: String,
    pub slug: String,
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageMode {
    #[default]
    View,
    Edit,
}

/// A collection detail or edit page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRoute {
    pub lang: String,
    pub client_app: String,
    pub params: RouteParams,
    pub mode: PageMode,
}

impl CollectionRoute {
    #[must_use]
    pub fn new(
        lang: impl Into<String>,
        client_app: impl Into<String>,
        params: RouteParams,
        mode: PageMode,
    ) -> Self {
        Self {
            lang: lang.into(),
            client_app: client_app.into(),
            params,
            mode,
        }
    }

    /// Path without query, trailing slash included.
    #[must_use]
    pub fn pathname(&self) -> String {
        collection_pathname(
            &self.lang,
            &self.client_app,
            &self.params.user_id,
            &self.params.slug,
            self.mode,
        )
    }

    /// Raw query parameters carried by this route, re-encoded.
    ///
    /// Only parameters that were present are emitted; `None` when there are
    /// none.
    #[must_use]
    pub fn query_string(&self) -> Option<String> {
        if self.params.page.is_none() && self.params.sort.is_none() {
            return None;
        }
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if let Some(page) = &self.params.page {
            serializer.append_pair(filters::PAGE_KEY, page);
        }
        if let Some(sort) = self.params.sort {
            serializer.append_pair(filters::SORT_KEY, sort.as_str());
        }
        Some(serializer.finish())
    }

    /// Full location, path plus query.
    #[must_use]
    pub fn href(&self) -> String {
        match self.query_string() {
            Some(query) => format!("{}?{query}", self.pathname()),
            None => self.pathname(),
        }
    }
}

/// The "create a collection" page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoute {
    pub lang: String,
    pub client_app: String,
    pub include_addon_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Route {
    Collection(CollectionRoute),
    Create(CreateRoute),
}

impl Route {
    /// Parse an absolute location (path plus optional query and fragment).
    pub fn parse(location: &str) -> Result<Self, RouteError> {
        if !location.starts_with('/') || location.starts_with("//") {
            return Err(RouteError::NotAbsolute(location.to_string()));
        }

        let url = Url::parse(PARSE_BASE)
            .and_then(|base| base.join(location))
            .map_err(|source| RouteError::Malformed {
                location: location.to_string(),
                source,
            })?;

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        let query = QueryParams::parse(url.query().unwrap_or_default());

        let not_collection = || RouteError::NotCollectionPage(location.to_string());

        let [lang, client_app, COLLECTIONS_SEGMENT, rest @ ..] = segments.as_slice() else {
            return Err(not_collection());
        };

        match rest {
            [ADD_SEGMENT] => Ok(Self::Create(CreateRoute {
                lang: (*lang).to_string(),
                client_app: (*client_app).to_string(),
                include_addon_id: query.include_addon_id,
            })),
            [user_id, slug] => Ok(Self::Collection(CollectionRoute::new(
                *lang,
                *client_app,
                RouteParams::new(*user_id, *slug).with_query(&query),
                PageMode::View,
            ))),
            [user_id, slug, EDIT_SEGMENT] => Ok(Self::Collection(CollectionRoute::new(
                *lang,
                *client_app,
                RouteParams::new(*user_id, *slug).with_query(&query),
                PageMode::Edit,
            ))),
            _ => Err(not_collection()),
        }
    }

    #[must_use]
    pub fn lang(&self) -> &str {
        match self {
            Self::Collection(route) => &route.lang,
            Self::Create(route) => &route.lang,
        }
    }

    #[must_use]
    pub fn client_app(&self) -> &str {
        match self {
            Self::Collection(route) => &route.client_app,
            Self::Create(route) => &route.client_app,
        }
    }

    #[must_use]
    pub const fn as_collection(&self) -> Option<&CollectionRoute> {
        match self {
            Self::Collection(route) => Some(route),
            Self::Create(_) => None,
        }
    }
}

/// `/{lang}/{app}/collections/{user}/{slug}/` with `edit/` in edit mode.
#[must_use]
pub fn collection_pathname(
    lang: &str,
    client_app: &str,
    user_id: &str,
    slug: &str,
    mode: PageMode,
) -> String {
    let edit = match mode {
        PageMode::View => "",
        PageMode::Edit => "edit/",
    };
    format!("/{lang}/{client_app}/{COLLECTIONS_SEGMENT}/{user_id}/{slug}/{edit}")
}
