use proptest::prelude::*;
use shelf_core::fetch::{FetchDecisionEngine, LoadState};
use shelf_core::filters::{self, Filters};
use shelf_core::paging::{self, Reconciliation};
use shelf_core::route::{CollectionRoute, PageMode, Route};

#[path = "generators.rs"]
mod generators;
use generators::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(2000))]

    #[test]
    fn encoded_filters_decode_to_themselves(f in arb_filters()) {
        prop_assert_eq!(filters::decode(&filters::encode(&f)), f);
    }

    #[test]
    fn unrelated_keys_decode_to_defaults(key in "[a-z_]{1,10}", value in "[a-z0-9]{0,6}") {
        prop_assume!(key != "page" && key != "collection_sort");
        let query = format!("{key}={value}");
        prop_assert_eq!(filters::decode(&query), Filters::default());
    }

    #[test]
    fn busy_states_never_fetch(
        previous in proptest::option::of(arb_params()),
        current in arb_params(),
        state in proptest::sample::select(vec![
            LoadState::Loading,
            LoadState::LoadingPage,
            LoadState::Errored,
        ]),
    ) {
        let engine = FetchDecisionEngine::default();
        prop_assert!(engine.decide(previous.as_ref(), &current, state).is_no_action());
    }

    #[test]
    fn unloaded_collection_is_always_fetched(
        previous in proptest::option::of(arb_params()),
        current in arb_params(),
    ) {
        let engine = FetchDecisionEngine::default();
        let decision = engine.decide(previous.as_ref(), &current, LoadState::Idle);
        prop_assert!(matches!(decision, shelf_core::FetchDecision::FetchCollection(_)));
    }

    #[test]
    fn reconciliation_steps_back_by_one_page(
        page in 1u64..200,
        item_count in 0u64..5_000,
        page_size in 1u64..100,
        sort in arb_sort(),
    ) {
        let current = Filters::new(page.to_string(), sort);
        let empties_page = paging::items_on_page(page, item_count, page_size) == 1 && page > 1;
        match paging::reconcile_removal(&current, item_count, page_size) {
            Reconciliation::Unchanged => prop_assert!(!empties_page),
            Reconciliation::StepBack { filters } => {
                prop_assert!(empties_page);
                prop_assert_eq!(filters.page_number(), Some(page - 1));
                prop_assert_eq!(filters.collection_sort, sort);
            }
        }
    }

    #[test]
    fn last_item_past_first_page_always_steps_back(
        page in 2u64..200,
        page_size in 1u64..100,
        sort in arb_sort(),
    ) {
        // Exactly one add-on left on `page`.
        let item_count = (page - 1) * page_size + 1;
        let current = Filters::new(page.to_string(), sort);
        prop_assert_eq!(
            paging::reconcile_removal(&current, item_count, page_size),
            Reconciliation::StepBack { filters: current.with_page((page - 1).to_string()) }
        );
    }

    #[test]
    fn collection_href_parses_back(params in arb_params(), edit in any::<bool>()) {
        let mode = if edit { PageMode::Edit } else { PageMode::View };
        let route = CollectionRoute::new("en-US", "firefox", params, mode);
        let parsed = Route::parse(&route.href()).expect("parse");
        prop_assert_eq!(parsed, Route::Collection(route));
    }
}
