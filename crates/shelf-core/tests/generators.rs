use proptest::prelude::*;
use shelf_core::filters::{Filters, SortKey};
use shelf_core::route::RouteParams;

pub fn arb_sort() -> impl Strategy<Value = SortKey> + Clone {
    proptest::sample::select(SortKey::ALL.to_vec())
}

/// Page tokens, including ones that are not numbers or need escaping.
pub fn arb_page() -> impl Strategy<Value = String> + Clone {
    prop_oneof![
        (1u64..10_000).prop_map(|n| n.to_string()),
        "[a-zA-Z0-9 &=%+?#-]{1,8}",
    ]
}

pub fn arb_filters() -> impl Strategy<Value = Filters> + Clone {
    (arb_page(), arb_sort()).prop_map(|(page, sort)| Filters::new(page, sort))
}

pub fn arb_params() -> impl Strategy<Value = RouteParams> + Clone {
    (
        prop_oneof![(1u64..1_000).prop_map(|n| n.to_string()), "[a-z]{1,6}"],
        "[a-z][a-z0-9-]{0,10}",
        proptest::option::of((1u64..50).prop_map(|n| n.to_string())),
        proptest::option::of(arb_sort()),
    )
        .prop_map(|(user_id, slug, page, sort)| RouteParams {
            user_id,
            slug,
            page,
            sort,
        })
}
