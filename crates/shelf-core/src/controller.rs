//! Per-page state machine.
//!
//! [`CollectionPage`] owns what one open collection page knows (the current
//! route, the in-flight request, the last loaded collection, failed handler
//! ids and the viewer) and runs the decision rules on each [`PageEvent`].
//! Event handlers take `&mut self` and return the commands for that event,
//! so two events can never interleave.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::collection::{CollectionSummary, Viewer};
use crate::command::{
    Command, DeleteAddonNotes, DeleteCollection, Navigation, RemoveAddon, UpdateAddonNotes,
};
use crate::config::ShelfConfig;
use crate::error::ErrorCode;
use crate::error_handler::{ErrorHandlerId, ErrorHandlerRegistry, RequestFailure};
use crate::fetch::{FetchDecision, FetchDecisionEngine, LoadState};
use crate::identity;
use crate::paging::{self, Pagination, Reconciliation};
use crate::route::{CollectionRoute, Route, RouteError, RouteParams};
use crate::view::{self, PageView, ViewInputs};

/// Inputs the page reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PageEvent {
    /// The router moved to `location`.
    Navigate { location: String },
    /// A request was started outside this page (e.g. during server render).
    FetchStarted {
        user_id: String,
        slug: String,
        #[serde(default)]
        page: Option<String>,
        #[serde(default)]
        page_only: bool,
    },
    CollectionLoaded { summary: CollectionSummary },
    FetchFailed {
        #[serde(default)]
        status: Option<u16>,
        message: String,
    },
    /// Explicit retry of the failed request for the current location.
    Retry,
    SignIn { user_id: u64 },
    SignOut,
    RemoveAddon { addon_id: u64 },
    DeleteCollection,
    UpdateAddonNotes { addon_id: u64, notes: String },
    DeleteAddonNotes { addon_id: u64 },
}

impl PageEvent {
    /// Wire name of the event, as used in scripts.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Navigate { .. } => "navigate",
            Self::FetchStarted { .. } => "fetch_started",
            Self::CollectionLoaded { .. } => "collection_loaded",
            Self::FetchFailed { .. } => "fetch_failed",
            Self::Retry => "retry",
            Self::SignIn { .. } => "sign_in",
            Self::SignOut => "sign_out",
            Self::RemoveAddon { .. } => "remove_addon",
            Self::DeleteCollection => "delete_collection",
            Self::UpdateAddonNotes { .. } => "update_addon_notes",
            Self::DeleteAddonNotes { .. } => "delete_addon_notes",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("no collection is open on this page")]
    NoCollection,

    #[error("collection {user_id}/{slug} is not loaded")]
    NotLoaded { user_id: String, slug: String },

    #[error("sign in to change collection {slug}")]
    SignInRequired { slug: String },

    #[error("user {viewer} does not own collection {slug} (author {author_id})")]
    NotOwner {
        viewer: u64,
        author_id: u64,
        slug: String,
    },
}

impl PageError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Route(err) => err.code(),
            Self::NoCollection => ErrorCode::CreateModeMutation,
            Self::NotLoaded { .. } => ErrorCode::CollectionNotLoaded,
            Self::SignInRequired { .. } => ErrorCode::SignInRequired,
            Self::NotOwner { .. } => ErrorCode::NotCollectionOwner,
        }
    }
}

/// Knobs taken from [`ShelfConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSettings {
    pub namespace: String,
    pub placeholder_count: usize,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self::from(&ShelfConfig::default())
    }
}

impl From<&ShelfConfig> for PageSettings {
    fn from(config: &ShelfConfig) -> Self {
        Self {
            namespace: config.errors.namespace.clone(),
            placeholder_count: config.page.placeholder_count,
        }
    }
}

#[derive(Debug, Clone)]
struct InFlight {
    params: RouteParams,
    page_only: bool,
}

#[derive(Debug, Clone)]
struct Loaded {
    /// What the data was fetched for; `None` when it arrived unrequested.
    params: Option<RouteParams>,
    summary: CollectionSummary,
}

#[derive(Debug, Clone)]
pub struct CollectionPage {
    engine: FetchDecisionEngine,
    settings: PageSettings,
    route: Option<Route>,
    previous: Option<RouteParams>,
    in_flight: Option<InFlight>,
    loaded: Option<Loaded>,
    registry: ErrorHandlerRegistry,
    viewer: Viewer,
}

impl Default for CollectionPage {
    fn default() -> Self {
        Self::new(PageSettings::default())
    }
}

impl CollectionPage {
    #[must_use]
    pub fn new(settings: PageSettings) -> Self {
        Self {
            engine: FetchDecisionEngine::new(settings.namespace.clone()),
            settings,
            route: None,
            previous: None,
            in_flight: None,
            loaded: None,
            registry: ErrorHandlerRegistry::new(),
            viewer: Viewer::Anonymous,
        }
    }

    #[must_use]
    pub const fn with_viewer(mut self, viewer: Viewer) -> Self {
        self.viewer = viewer;
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[must_use]
    pub const fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    #[must_use]
    pub fn collection_route(&self) -> Option<&CollectionRoute> {
        self.route.as_ref().and_then(Route::as_collection)
    }

    #[must_use]
    pub fn summary(&self) -> Option<&CollectionSummary> {
        self.loaded.as_ref().map(|loaded| &loaded.summary)
    }

    #[must_use]
    pub const fn registry(&self) -> &ErrorHandlerRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn viewer(&self) -> Viewer {
        self.viewer
    }

    /// Handler id for the current location, if it is a collection.
    #[must_use]
    pub fn error_handler_id(&self) -> Option<ErrorHandlerId> {
        self.collection_route()
            .map(|route| self.engine.error_handler_id(&route.params))
    }

    /// Load state of the collection the current route points at.
    #[must_use]
    pub fn load_state(&self) -> LoadState {
        self.collection_route()
            .map_or(LoadState::Idle, |route| self.load_state_for(&route.params))
    }

    #[must_use]
    pub fn pagination(&self) -> Option<Pagination> {
        let route = self.collection_route()?;
        let summary = self.matching_summary(&route.params)?;
        paging::paginate(&route.params.filters(), summary.item_count, summary.page_size)
    }

    #[must_use]
    pub fn view(&self) -> Option<PageView> {
        let route = self.route.as_ref()?;
        let failure = self
            .error_handler_id()
            .and_then(|id| self.registry.failure(&id));
        Some(view::resolve_view(ViewInputs {
            route,
            state: self.load_state(),
            summary: self.summary(),
            failure,
            viewer: self.viewer,
            default_placeholders: self.settings.placeholder_count,
        }))
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn handle(&mut self, event: PageEvent) -> Result<Vec<Command>, PageError> {
        match event {
            PageEvent::Navigate { location } => self.navigate(&location),
            PageEvent::FetchStarted {
                user_id,
                slug,
                page,
                page_only,
            } => {
                let mut params = RouteParams::new(user_id, slug);
                params.page = page;
                self.fetch_started(params, page_only);
                Ok(Vec::new())
            }
            PageEvent::CollectionLoaded { summary } => Ok(self.collection_loaded(summary)),
            PageEvent::FetchFailed { status, message } => {
                self.fetch_failed(RequestFailure::new(status, message));
                Ok(Vec::new())
            }
            PageEvent::Retry => Ok(self.retry()),
            PageEvent::SignIn { user_id } => {
                self.viewer = Viewer::SignedIn { user_id };
                Ok(Vec::new())
            }
            PageEvent::SignOut => {
                self.viewer = Viewer::Anonymous;
                Ok(Vec::new())
            }
            PageEvent::RemoveAddon { addon_id } => self.remove_addon(addon_id),
            PageEvent::DeleteCollection => self.delete_collection(),
            PageEvent::UpdateAddonNotes { addon_id, notes } => {
                self.update_addon_notes(addon_id, notes)
            }
            PageEvent::DeleteAddonNotes { addon_id } => self.delete_addon_notes(addon_id),
        }
    }

    /// Move to a new location and decide what it needs.
    pub fn navigate(&mut self, location: &str) -> Result<Vec<Command>, PageError> {
        let route = Route::parse(location)?;
        debug!(%location, "navigate");

        self.previous = self.collection_route().map(|route| route.params.clone());
        self.route = Some(route);
        Ok(self.evaluate())
    }

    /// Record a request that something else issued.
    pub fn fetch_started(&mut self, params: RouteParams, page_only: bool) {
        debug!(user_id = %params.user_id, slug = %params.slug, page_only, "fetch started externally");
        self.in_flight = Some(InFlight { params, page_only });
    }

    /// Accept a loaded collection and re-run the rules.
    ///
    /// While a request is in flight, a summary that cannot answer it is a
    /// stale response and is dropped. A username the server resolved is
    /// recorded on the summary so later routes using it still match.
    pub fn collection_loaded(&mut self, mut summary: CollectionSummary) -> Vec<Command> {
        let params = match self.in_flight.take() {
            Some(in_flight) if summary.answers_request(&in_flight.params) => {
                if !summary.matches_route(&in_flight.params) {
                    debug!(
                        username = %in_flight.params.user_id,
                        author_id = summary.author_id,
                        "resolved username from response"
                    );
                    summary.author_username = Some(in_flight.params.user_id.clone());
                }
                Some(in_flight.params)
            }
            Some(in_flight) => {
                warn!(
                    requested = %format!("{}/{}", in_flight.params.user_id, in_flight.params.slug),
                    received = %format!("{}/{}", summary.author_id, summary.slug),
                    "dropping stale collection response"
                );
                self.in_flight = Some(in_flight);
                return Vec::new();
            }
            None => None,
        };

        if let Some(params) = &params {
            self.registry.clear(&self.engine.error_handler_id(params));
        }
        info!(
            author_id = summary.author_id,
            slug = %summary.slug,
            item_count = summary.item_count,
            "collection loaded"
        );
        self.loaded = Some(Loaded { params, summary });
        self.evaluate()
    }

    /// Record a failed request against its handler id.
    pub fn fetch_failed(&mut self, failure: RequestFailure) {
        let params = match self.in_flight.take() {
            Some(in_flight) => in_flight.params,
            None => match self.collection_route() {
                Some(route) => route.params.clone(),
                None => {
                    warn!(message = %failure.message, "fetch failure with no collection open");
                    return;
                }
            },
        };
        let id = self.engine.error_handler_id(&params);
        warn!(%id, status = ?failure.status, message = %failure.message, "fetch failed");
        self.registry.record(id, failure);
    }

    /// Clear the failure for the current location and re-run the rules.
    pub fn retry(&mut self) -> Vec<Command> {
        let Some(id) = self.error_handler_id() else {
            return Vec::new();
        };
        if self.registry.clear(&id).is_some() {
            info!(%id, "retrying failed request");
        }
        self.evaluate()
    }

    pub const fn set_viewer(&mut self, viewer: Viewer) {
        self.viewer = viewer;
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Remove an add-on, stepping back a page when the current one empties.
    pub fn remove_addon(&self, addon_id: u64) -> Result<Vec<Command>, PageError> {
        let (route, summary) = self.owned_collection()?;
        let current = route.params.filters();
        let outcome = paging::reconcile_removal(&current, summary.item_count, summary.page_size);

        let mut commands = vec![Command::RemoveAddon(RemoveAddon {
            addon_id,
            user_id: route.params.user_id.clone(),
            slug: route.params.slug.clone(),
            filters: outcome.filters_or(&current).clone(),
            error_handler_id: self.engine.error_handler_id(&route.params),
        })];

        if let Reconciliation::StepBack { filters } = outcome {
            let navigation = Navigation {
                pathname: route.pathname(),
                query: filters,
            };
            info!(to = %navigation.href(), "current page emptied; stepping back");
            commands.push(Command::Navigate(navigation));
        }

        Ok(commands)
    }

    pub fn delete_collection(&self) -> Result<Vec<Command>, PageError> {
        let (route, _) = self.owned_collection()?;
        info!(user_id = %route.params.user_id, slug = %route.params.slug, "deleting collection");
        Ok(vec![Command::DeleteCollection(DeleteCollection {
            user_id: route.params.user_id.clone(),
            slug: route.params.slug.clone(),
            error_handler_id: self.engine.error_handler_id(&route.params),
        })])
    }

    pub fn update_addon_notes(
        &self,
        addon_id: u64,
        notes: String,
    ) -> Result<Vec<Command>, PageError> {
        let (route, _) = self.owned_collection()?;
        Ok(vec![Command::UpdateAddonNotes(UpdateAddonNotes {
            addon_id,
            user_id: route.params.user_id.clone(),
            slug: route.params.slug.clone(),
            notes,
            lang: route.lang.clone(),
            filters: route.params.filters(),
            error_handler_id: self.notes_handler_id(addon_id),
        })])
    }

    pub fn delete_addon_notes(&self, addon_id: u64) -> Result<Vec<Command>, PageError> {
        let (route, _) = self.owned_collection()?;
        Ok(vec![Command::DeleteAddonNotes(DeleteAddonNotes {
            addon_id,
            user_id: route.params.user_id.clone(),
            slug: route.params.slug.clone(),
            lang: route.lang.clone(),
            filters: route.params.filters(),
            error_handler_id: self.notes_handler_id(addon_id),
        })])
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn notes_handler_id(&self, addon_id: u64) -> ErrorHandlerId {
        ErrorHandlerId::for_addon_notes(&self.settings.namespace, addon_id)
    }

    fn matching_summary(&self, params: &RouteParams) -> Option<&CollectionSummary> {
        self.summary().filter(|summary| summary.matches_route(params))
    }

    fn load_state_for(&self, params: &RouteParams) -> LoadState {
        if self.registry.has_failed(&self.engine.error_handler_id(params)) {
            return LoadState::Errored;
        }
        if let Some(in_flight) = &self.in_flight {
            if in_flight.params.scope() == params.scope() {
                return if in_flight.page_only {
                    LoadState::LoadingPage
                } else {
                    LoadState::Loading
                };
            }
        }
        if self.matching_summary(params).is_some() {
            return LoadState::Loaded;
        }
        LoadState::Idle
    }

    /// Parameters the engine compares against.
    ///
    /// For a loaded collection that is what the data was fetched with, moved
    /// onto the current scope so that `/john/x` and `/19/x` count as the same
    /// collection. Unrequested data is assumed to match the current filters.
    fn previous_for(&self, params: &RouteParams) -> Option<RouteParams> {
        if let Some(loaded) = &self.loaded {
            if loaded.summary.matches_route(params) {
                let fetched = loaded.params.as_ref().unwrap_or(params);
                return Some(fetched.rescoped(&params.scope()));
            }
        }
        self.previous.clone()
    }

    fn evaluate(&mut self) -> Vec<Command> {
        let Some(route) = self.collection_route().cloned() else {
            return Vec::new();
        };
        let params = &route.params;
        let state = self.load_state_for(params);
        let previous = self.previous_for(params);

        let mut commands = Vec::new();
        match self.engine.decide(previous.as_ref(), params, state) {
            FetchDecision::FetchCollection(req) => {
                info!(user_id = %req.user_id, slug = %req.slug, page = %req.filters.page, "fetching collection");
                self.in_flight = Some(InFlight {
                    params: params.clone(),
                    page_only: false,
                });
                commands.push(Command::FetchCollection(req));
            }
            FetchDecision::FetchCollectionPage(req) => {
                info!(user_id = %req.user_id, slug = %req.slug, page = %req.filters.page, "fetching collection page");
                self.in_flight = Some(InFlight {
                    params: params.clone(),
                    page_only: true,
                });
                commands.push(Command::FetchCollectionPage(req));
            }
            FetchDecision::NoAction => {}
        }

        if state == LoadState::Loaded {
            if let Some(redirect) = self
                .matching_summary(params)
                .and_then(|summary| identity::canonical_redirect(&route, summary))
            {
                commands.push(Command::Redirect(redirect));
            }
        }

        commands
    }

    fn owned_collection(&self) -> Result<(&CollectionRoute, &CollectionSummary), PageError> {
        let route = self.collection_route().ok_or(PageError::NoCollection)?;
        let summary = self
            .matching_summary(&route.params)
            .ok_or_else(|| PageError::NotLoaded {
                user_id: route.params.user_id.clone(),
                slug: route.params.slug.clone(),
            })?;

        let result = match self.viewer {
            Viewer::Anonymous => Err(PageError::SignInRequired {
                slug: route.params.slug.clone(),
            }),
            Viewer::SignedIn { user_id } if user_id != summary.author_id => {
                Err(PageError::NotOwner {
                    viewer: user_id,
                    author_id: summary.author_id,
                    slug: route.params.slug.clone(),
                })
            }
            Viewer::SignedIn { .. } => Ok((route, summary)),
        };
        if let Err(err) = &result {
            warn!(code = %err.code(), %err, "collection change rejected");
        }
        result
    }
}
