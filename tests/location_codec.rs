use std::collections::BTreeMap;

use proptest::prelude::*;
use router_sync::location::{deserialize, serialize};
use router_sync::{Location, SearchValue};

fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 %/?&=#+é~._-]{1,8}"
}

fn search_value() -> impl Strategy<Value = Option<SearchValue>> {
    prop_oneof![
        "[a-zA-Z0-9 %&=+ü-]{0,8}".prop_map(|text| Some(SearchValue::Text(text))),
        prop::collection::vec("[a-z0-9 &]{0,5}", 1..4).prop_map(|items| Some(SearchValue::List(items))),
    ]
}

fn location() -> impl Strategy<Value = Location> {
    (
        prop::collection::vec(segment(), 0..4),
        prop::collection::btree_map("[a-z_\\[\\]]{1,6}", search_value(), 0..4),
    )
        .prop_map(|(pathname, search)| Location {
            pathname,
            search,
            ..Default::default()
        })
}

proptest! {
    #[test]
    fn test_text_locations_survive_the_codec(location in location()) {
        let serialized = serialize(&location, &Location::default());
        prop_assert_eq!(deserialize(&serialized), location);
    }
}

#[test]
fn test_merge_with_previous_location() {
    let previous = deserialize("/a?keep=1&drop=2&over=3");
    let mut next = Location::new();
    next.pathname = vec!["b".to_string()];
    next.clear_search("drop");
    next.set_search("over", 4);
    next.set_search("tags", SearchValue::List(vec!["x".into(), "y z".into()]));

    assert_eq!(
        serialize(&next, &previous),
        "/b?keep=1&over=4&tags[]=x&tags[]=y%20z"
    );
}

#[test]
fn test_flag_and_plus_decoding() {
    let mut location = Location::new();
    location.set_search("beta", SearchValue::Flag);
    assert_eq!(serialize(&location, &Location::default()), "/?beta=true");

    let parsed = deserialize("/?q=hello+world&bare");
    let expected: BTreeMap<String, Option<SearchValue>> = BTreeMap::from([
        ("bare".to_string(), Some(SearchValue::Text(String::new()))),
        ("q".to_string(), Some(SearchValue::Text("hello world".to_string()))),
    ]);
    assert_eq!(parsed.search, expected);
}
