//! Commands emitted by the decision rules.
//!
//! Nothing in this crate performs the side effects. Callers hand each
//! [`Command`] to whatever owns the data layer or router.

use serde::Serialize;
use std::fmt;

use crate::error_handler::ErrorHandlerId;
use crate::filters::{self, Filters};

/// Status code for canonical-URL redirects.
pub const PERMANENT_REDIRECT: u16 = 301;

/// A load request for one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    pub user_id: String,
    pub slug: String,
    pub filters: Filters,
    pub error_handler_id: ErrorHandlerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub status: u16,
    pub url: String,
}

/// Client-side navigation to another page of the same collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub pathname: String,
    pub query: Filters,
}

impl Navigation {
    #[must_use]
    pub fn href(&self) -> String {
        format!("{}?{}", self.pathname, filters::encode(&self.query))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveAddon {
    pub addon_id: u64,
    pub user_id: String,
    pub slug: String,
    pub filters: Filters,
    pub error_handler_id: ErrorHandlerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCollection {
    pub user_id: String,
    pub slug: String,
    pub error_handler_id: ErrorHandlerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAddonNotes {
    pub addon_id: u64,
    pub user_id: String,
    pub slug: String,
    pub notes: String,
    pub lang: String,
    pub filters: Filters,
    pub error_handler_id: ErrorHandlerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAddonNotes {
    pub addon_id: u64,
    pub user_id: String,
    pub slug: String,
    pub lang: String,
    pub filters: Filters,
    pub error_handler_id: ErrorHandlerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    FetchCollection(FetchRequest),
    FetchCollectionPage(FetchRequest),
    Redirect(Redirect),
    Navigate(Navigation),
    RemoveAddon(RemoveAddon),
    DeleteCollection(DeleteCollection),
    UpdateAddonNotes(UpdateAddonNotes),
    DeleteAddonNotes(DeleteAddonNotes),
}

impl Command {
    /// Stable snake_case name, matching the serialized `type` tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::FetchCollection(_) => "fetch_collection",
            Self::FetchCollectionPage(_) => "fetch_collection_page",
            Self::Redirect(_) => "redirect",
            Self::Navigate(_) => "navigate",
            Self::RemoveAddon(_) => "remove_addon",
            Self::DeleteCollection(_) => "delete_collection",
            Self::UpdateAddonNotes(_) => "update_addon_notes",
            Self::DeleteAddonNotes(_) => "delete_addon_notes",
        }
    }

    #[must_use]
    pub const fn is_fetch(&self) -> bool {
        matches!(self, Self::FetchCollection(_) | Self::FetchCollectionPage(_))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchCollection(req) | Self::FetchCollectionPage(req) => write!(
                f,
                "{} {}/{} ?{} [{}]",
                self.kind(),
                req.user_id,
                req.slug,
                filters::encode(&req.filters),
                req.error_handler_id
            ),
            Self::Redirect(redirect) => write!(f, "redirect {} {}", redirect.status, redirect.url),
            Self::Navigate(nav) => write!(f, "navigate {}", nav.href()),
            Self::RemoveAddon(cmd) => write!(
                f,
                "remove_addon {} from {}/{} ?{} [{}]",
                cmd.addon_id,
                cmd.user_id,
                cmd.slug,
                filters::encode(&cmd.filters),
                cmd.error_handler_id
            ),
            Self::DeleteCollection(cmd) => write!(
                f,
                "delete_collection {}/{} [{}]",
                cmd.user_id, cmd.slug, cmd.error_handler_id
            ),
            Self::UpdateAddonNotes(cmd) => write!(
                f,
                "update_addon_notes {} in {}/{} ({}) [{}]",
                cmd.addon_id, cmd.user_id, cmd.slug, cmd.lang, cmd.error_handler_id
            ),
            Self::DeleteAddonNotes(cmd) => write!(
                f,
                "delete_addon_notes {} in {}/{} ({}) [{}]",
                cmd.addon_id, cmd.user_id, cmd.slug, cmd.lang, cmd.error_handler_id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handler::DEFAULT_NAMESPACE;
    use crate::filters::SortKey;
    use crate::route::RouteParams;

    fn request() -> FetchRequest {
        let params = RouteParams::new("123", "slug").with_page("2");
        FetchRequest {
            user_id: params.user_id.clone(),
            slug: params.slug.clone(),
            filters: params.filters(),
            error_handler_id: ErrorHandlerId::for_page(DEFAULT_NAMESPACE, &params),
        }
    }

    #[test]
    fn serialized_tag_matches_kind() {
        let command = Command::FetchCollectionPage(request());
        let json = serde_json::to_value(&command).expect("serialize");
        assert_eq!(json["type"], command.kind());
        assert_eq!(json["userId"], "123");
        assert_eq!(json["filters"]["page"], "2");
        assert_eq!(json["errorHandlerId"], "collection-page-123/slug/2");
    }

    #[test]
    fn navigation_href_encodes_filters() {
        let nav = Navigation {
            pathname: "/en-US/firefox/collections/1/a/edit/".into(),
            query: Filters::new("1", SortKey::DateAddedDescending),
        };
        assert_eq!(
            nav.href(),
            "/en-US/firefox/collections/1/a/edit/?page=1&collection_sort=-added"
        );
    }

    #[test]
    fn display_is_one_line() {
        let text = Command::FetchCollection(request()).to_string();
        assert_eq!(
            text,
            "fetch_collection 123/slug ?page=2&collection_sort=-added [collection-page-123/slug/2]"
        );
        assert!(Command::FetchCollection(request()).is_fetch());
    }
}
