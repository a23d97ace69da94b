//! Fetch decision engine.
//!
//! Decides, for one navigation or load-state transition, whether the page
//! must load the whole collection, load one page of it, or do nothing.
//!
//! # Rules (first match wins)
//!
//! 1. A request is in flight, or the last one for this handler id failed:
//!    do nothing.
//! 2. Loaded, same scope, page or sort differ: fetch that page.
//! 3. Loaded, same scope, same filters: do nothing.
//! 4. Scope changed, or nothing loaded yet: fetch the whole collection.
//!
//! The engine never retries on its own. A failed id stays failed until the
//! caller clears it from the registry.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::command::{Command, FetchRequest};
use crate::error_handler::{DEFAULT_NAMESPACE, ErrorHandlerId};
use crate::route::RouteParams;

/// Load lifecycle of the collection in the current scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    LoadingPage,
    Loaded,
    Errored,
}

impl LoadState {
    /// States in which no new fetch may be issued.
    #[must_use]
    pub const fn blocks_fetch(self) -> bool {
        matches!(self, Self::Loading | Self::LoadingPage | Self::Errored)
    }

    #[must_use]
    pub const fn is_loading(self) -> bool {
        matches!(self, Self::Loading | Self::LoadingPage)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::LoadingPage => "loading_page",
            Self::Loaded => "loaded",
            Self::Errored => "errored",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchDecision {
    FetchCollection(FetchRequest),
    FetchCollectionPage(FetchRequest),
    NoAction,
}

impl FetchDecision {
    #[must_use]
    pub fn into_command(self) -> Option<Command> {
        match self {
            Self::FetchCollection(req) => Some(Command::FetchCollection(req)),
            Self::FetchCollectionPage(req) => Some(Command::FetchCollectionPage(req)),
            Self::NoAction => None,
        }
    }

    #[must_use]
    pub const fn is_no_action(&self) -> bool {
        matches!(self, Self::NoAction)
    }
}

#[derive(Debug, Clone)]
pub struct FetchDecisionEngine {
    namespace: String,
}

impl Default for FetchDecisionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl FetchDecisionEngine {
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Handler id the engine attaches to requests for `params`.
    #[must_use]
    pub fn error_handler_id(&self, params: &RouteParams) -> ErrorHandlerId {
        ErrorHandlerId::for_page(&self.namespace, params)
    }

    /// Apply the rules to one event.
    ///
    /// `previous` is `None` on first mount. `state` is the load state of the
    /// scope `current` points at.
    #[must_use]
    pub fn decide(
        &self,
        previous: Option<&RouteParams>,
        current: &RouteParams,
        state: LoadState,
    ) -> FetchDecision {
        if state.blocks_fetch() {
            debug!(?state, user_id = %current.user_id, slug = %current.slug, "fetch blocked");
            return FetchDecision::NoAction;
        }

        let same_scope = previous.is_some_and(|prev| prev.scope() == current.scope());

        if state == LoadState::Loaded && same_scope {
            let filters_changed = previous.is_some_and(|prev| prev.filters() != current.filters());
            if filters_changed {
                return FetchDecision::FetchCollectionPage(self.request(current));
            }
            debug!(user_id = %current.user_id, slug = %current.slug, "collection already loaded");
            return FetchDecision::NoAction;
        }

        FetchDecision::FetchCollection(self.request(current))
    }

    fn request(&self, params: &RouteParams) -> FetchRequest {
        FetchRequest {
            user_id: params.user_id.clone(),
            slug: params.slug.clone(),
            filters: params.filters(),
            error_handler_id: self.error_handler_id(params),
        }
    }
}
