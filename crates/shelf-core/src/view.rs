//! Which content state the page is in. No rendering happens here.

use serde::Serialize;

use crate::collection::{CollectionSummary, Viewer};
use crate::error_handler::RequestFailure;
use crate::fetch::LoadState;
use crate::paging::{self, Pagination};
use crate::route::{PageMode, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignInReason {
    Create,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum PageView {
    Creator {
        include_addon_id: Option<String>,
    },
    SignInRequired {
        reason: SignInReason,
    },
    NotFound,
    Failed {
        message: String,
    },
    Loading {
        placeholders: usize,
        /// A page of an already-shown collection is loading; its details stay.
        keeps_details: bool,
    },
    Collection {
        editing: bool,
        manageable: bool,
        pagination: Option<Pagination>,
    },
}

/// Everything [`resolve_view`] looks at.
#[derive(Debug, Clone, Copy)]
pub struct ViewInputs<'a> {
    pub route: &'a Route,
    pub state: LoadState,
    /// Most recently loaded summary, whichever collection it belongs to.
    pub summary: Option<&'a CollectionSummary>,
    pub failure: Option<&'a RequestFailure>,
    pub viewer: Viewer,
    pub default_placeholders: usize,
}

#[must_use]
pub fn resolve_view(inputs: ViewInputs<'_>) -> PageView {
    let route = match inputs.route {
        Route::Create(create) => {
            return if inputs.viewer.is_signed_in() {
                PageView::Creator {
                    include_addon_id: create.include_addon_id.clone(),
                }
            } else {
                PageView::SignInRequired {
                    reason: SignInReason::Create,
                }
            };
        }
        Route::Collection(route) => route,
    };

    if let Some(failure) = inputs.failure {
        return if failure.is_not_found() {
            PageView::NotFound
        } else {
            PageView::Failed {
                message: failure.message.clone(),
            }
        };
    }

    let editing = route.mode == PageMode::Edit;
    if editing && !inputs.viewer.is_signed_in() {
        return PageView::SignInRequired {
            reason: SignInReason::Edit,
        };
    }

    let loaded = inputs
        .summary
        .filter(|summary| summary.matches_route(&route.params));

    match (inputs.state, loaded) {
        (LoadState::Loaded, Some(summary)) => PageView::Collection {
            editing,
            manageable: summary.is_author(inputs.viewer),
            pagination: paging::paginate(
                &route.params.filters(),
                summary.item_count,
                summary.page_size,
            ),
        },
        (state, _) => PageView::Loading {
            placeholders: paging::placeholder_count(inputs.summary, inputs.default_placeholders),
            keeps_details: state == LoadState::LoadingPage && loaded.is_some(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{CollectionRoute, CreateRoute, RouteParams};

    fn collection_route(mode: PageMode) -> Route {
        Route::Collection(CollectionRoute::new(
            "en-US",
            "firefox",
            RouteParams::new("123", "slug"),
            mode,
        ))
    }

    fn summary() -> CollectionSummary {
        CollectionSummary {
            author_id: 123,
            author_username: None,
            slug: "slug".into(),
            item_count: 10,
            page_size: 5,
            page_results: 5,
        }
    }

    fn inputs(route: &Route) -> ViewInputs<'_> {
        ViewInputs {
            route,
            state: LoadState::Idle,
            summary: None,
            failure: None,
            viewer: Viewer::Anonymous,
            default_placeholders: 3,
        }
    }

    #[test]
    fn create_needs_sign_in() {
        let route = Route::Create(CreateRoute {
            lang: "en-US".into(),
            client_app: "firefox".into(),
            include_addon_id: None,
        });
        assert_eq!(
            resolve_view(inputs(&route)),
            PageView::SignInRequired {
                reason: SignInReason::Create
            }
        );

        let signed_in = ViewInputs {
            viewer: Viewer::SignedIn { user_id: 1 },
            ..inputs(&route)
        };
        assert_eq!(
            resolve_view(signed_in),
            PageView::Creator {
                include_addon_id: None
            }
        );
    }

    #[test]
    fn not_found_failure_wins() {
        let route = collection_route(PageMode::View);
        let failure = RequestFailure::new(Some(404), "gone");
        let view = resolve_view(ViewInputs {
            state: LoadState::Errored,
            failure: Some(&failure),
            ..inputs(&route)
        });
        assert_eq!(view, PageView::NotFound);
    }

    #[test]
    fn other_failures_carry_message() {
        let route = collection_route(PageMode::View);
        let failure = RequestFailure::new(Some(500), "Some error message");
        let view = resolve_view(ViewInputs {
            state: LoadState::Errored,
            failure: Some(&failure),
            ..inputs(&route)
        });
        assert_eq!(
            view,
            PageView::Failed {
                message: "Some error message".into()
            }
        );
    }

    #[test]
    fn edit_mode_needs_sign_in() {
        let route = collection_route(PageMode::Edit);
        let summary = summary();
        let view = resolve_view(ViewInputs {
            state: LoadState::Loaded,
            summary: Some(&summary),
            ..inputs(&route)
        });
        assert_eq!(
            view,
            PageView::SignInRequired {
                reason: SignInReason::Edit
            }
        );
    }

    #[test]
    fn loaded_collection_for_author_is_manageable() {
        let route = collection_route(PageMode::View);
        let summary = summary();
        let view = resolve_view(ViewInputs {
            state: LoadState::Loaded,
            summary: Some(&summary),
            viewer: Viewer::SignedIn { user_id: 123 },
            ..inputs(&route)
        });
        let PageView::Collection {
            editing,
            manageable,
            pagination,
        } = view
        else {
            panic!("expected collection view, got {view:?}");
        };
        assert!(!editing);
        assert!(manageable);
        assert_eq!(pagination.map(|p| p.total_pages), Some(2));
    }

    #[test]
    fn other_viewer_cannot_manage() {
        let route = collection_route(PageMode::View);
        let summary = summary();
        let view = resolve_view(ViewInputs {
            state: LoadState::Loaded,
            summary: Some(&summary),
            viewer: Viewer::SignedIn { user_id: 124 },
            ..inputs(&route)
        });
        assert!(matches!(view, PageView::Collection { manageable: false, .. }));
    }

    #[test]
    fn loading_uses_default_placeholders_without_history() {
        let route = collection_route(PageMode::View);
        let view = resolve_view(ViewInputs {
            state: LoadState::Loading,
            ..inputs(&route)
        });
        assert_eq!(
            view,
            PageView::Loading {
                placeholders: 3,
                keeps_details: false
            }
        );
    }

    #[test]
    fn loading_page_keeps_details_and_sizes_placeholders() {
        let route = collection_route(PageMode::View);
        let summary = summary();
        let view = resolve_view(ViewInputs {
            state: LoadState::LoadingPage,
            summary: Some(&summary),
            ..inputs(&route)
        });
        assert_eq!(
            view,
            PageView::Loading {
                placeholders: 5,
                keeps_details: true
            }
        );
    }
}
