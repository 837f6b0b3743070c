//! Property tests for routing, enum resolution, list extraction and JSON round trips.

use proptest::prelude::*;
use serde_json::{json, Value};

use val_api::record::{alert, location, TypedRecord};
use val_engine::catalog;
use val_engine::extract;
use val_engine::resolver::resolve;
use val_engine::{Router, SinkKind, TopicPattern};

fn segment() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,8}"
}

fn topic() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(segment(), 1..6)
}

const BINDINGS: &[(&str, &str)] = &[
    ("val/amoc/**", "alerts"),
    ("**", "alerts"),
    ("val/amoc/*/location", "location"),
    ("val/amoc/**/location", "location"),
    ("val/amoc/**/value", "measurement_value"),
    ("val/*/vessels", "vessels"),
    ("val/amoc/exercise_state", "exercise_state"),
];

const TOPICS: &[&str] = &[
    "val/amoc/1/location",
    "val/amoc/location",
    "val/amoc/1/engine/value",
    "val/amoc/vessels",
    "val/amoc/exercise_state",
    "other/topic",
];

fn router_from(bindings: &[(&str, &str)]) -> Router {
    let mut router = Router::new();
    for (pattern, schema) in bindings {
        let schema = catalog::by_name(schema).unwrap();
        router.register(pattern, schema, SinkKind::Log).unwrap();
        router
            .register(pattern, schema, SinkKind::Compose { field: None })
            .unwrap();
    }
    router
}

fn matched(router: &Router, topic: &str) -> Vec<(String, &'static str, String)> {
    let mut out: Vec<_> = router
        .route(topic)
        .iter()
        .map(|b| (b.pattern.as_str().to_string(), b.schema.name, b.sink.to_string()))
        .collect();
    out.sort();
    out
}

type BindingList = Vec<(&'static str, &'static str)>;

fn bindings_and_permutation() -> impl Strategy<Value = (BindingList, BindingList)> {
    prop::sample::subsequence(BINDINGS.to_vec(), 0..=BINDINGS.len())
        .prop_flat_map(|picked| (Just(picked.clone()), Just(picked).prop_shuffle()))
}

proptest! {
    #[test]
    fn prop_literal_pattern_matches_only_itself(a in topic(), b in topic()) {
        let pattern = TopicPattern::parse(&a.join("/")).unwrap();
        prop_assert!(pattern.matches(&a.join("/")));
        prop_assert_eq!(pattern.matches(&b.join("/")), a == b);
    }

    #[test]
    fn prop_trailing_multi_matches_every_extension(prefix in topic(), rest in prop::collection::vec(segment(), 0..5)) {
        let pattern = TopicPattern::parse(&format!("{}/**", prefix.join("/"))).unwrap();
        let mut full = prefix.clone();
        full.extend(rest);
        prop_assert!(pattern.matches(&full.join("/")));
    }

    #[test]
    fn prop_single_wildcard_matches_one_segment(t in topic(), idx in any::<prop::sample::Index>()) {
        let i = idx.index(t.len());
        let mut parts: Vec<&str> = t.iter().map(String::as_str).collect();
        parts[i] = "*";
        let pattern = TopicPattern::parse(&parts.join("/")).unwrap();
        prop_assert!(pattern.matches(&t.join("/")));

        let mut longer = t.clone();
        longer.insert(i, "extra".to_string());
        prop_assert!(!pattern.matches(&longer.join("/")));
    }

    #[test]
    fn prop_resolve_is_case_insensitive_and_total(raw in "[A-Za-z_]{0,16}") {
        let upper = resolve(&alert::PRIORITY, Some(&json!(raw.to_uppercase())));
        let lower = resolve(&alert::PRIORITY, Some(&json!(raw.to_lowercase())));
        prop_assert_eq!(upper, lower);
        prop_assert!(alert::PRIORITY.contains(upper));
    }

    #[test]
    fn prop_alert_elements_are_kept_or_reported(kinds in prop::collection::vec(0u8..3, 0..20)) {
        // 0 = valid alert, 1 = non-object, 2 = object with a mistyped field
        let elements: Vec<Value> = kinds
            .iter()
            .enumerate()
            .map(|(i, k)| match k {
                0 => json!({"id": format!("a{i}"), "priority": "warning"}),
                1 => json!(i),
                _ => json!({"id": format!("a{i}"), "acknowledged": "nope"}),
            })
            .collect();
        let tree = json!({"mmsi": 1, "alerts": elements});

        let out = extract(&tree, &catalog::ALERTS).unwrap();
        let TypedRecord::Alerts(rec) = out.record else {
            return Err(TestCaseError::fail("wrong record kind"));
        };

        let valid = kinds.iter().filter(|k| **k == 0).count();
        prop_assert_eq!(rec.alerts.len(), valid);
        prop_assert_eq!(out.element_errors.len(), kinds.len() - valid);

        // Survivors keep their relative order.
        let expected: Vec<String> = kinds
            .iter()
            .enumerate()
            .filter(|(_, k)| **k == 0)
            .map(|(i, _)| format!("a{i}"))
            .collect();
        let got: Vec<String> = rec.alerts.iter().map(|a| a.id.clone()).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_extract_is_deterministic(lat in -90.0f64..90.0, quality in "[a-z_]{0,10}") {
        let tree = json!({"mmsi": 3, "location": {"latitude": lat, "quality": quality}});
        let a = extract(&tree, &catalog::LOCATION).unwrap();
        let b = extract(&tree, &catalog::LOCATION).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_route_ignores_registration_order(
        (original, shuffled) in bindings_and_permutation(),
        topic in prop::sample::select(TOPICS),
    ) {
        let a = router_from(&original);
        let b = router_from(&shuffled);
        prop_assert_eq!(matched(&a, topic), matched(&b, topic));
    }

    #[test]
    fn prop_measurement_fields_survive_json_round_trip(
        mmsi in 1u32..,
        name in "[a-z_]{1,12}",
        value in -1.0e6f64..1.0e6,
        unit in "[a-zA-Z/%]{0,4}",
    ) {
        let tree = json!({"mmsi": mmsi, "measurement": {"name": name, "value": value, "unit": unit}});
        let out = extract(&tree, &catalog::MEASUREMENT_VALUE).unwrap();
        let back = out.record.to_json().unwrap();
        prop_assert_eq!(&back["mmsi"], &tree["mmsi"]);
        prop_assert_eq!(&back["measurement"], &tree["measurement"]);
    }

    #[test]
    fn prop_location_fields_survive_json_round_trip(
        mmsi in 1u32..,
        lat in -90.0f64..90.0,
        lon in -180.0f64..180.0,
    ) {
        let tree = json!({"mmsi": mmsi, "location": {"latitude": lat, "longitude": lon, "quality": "gps"}});
        let out = extract(&tree, &catalog::LOCATION).unwrap();
        let back = out.record.to_json().unwrap();
        prop_assert_eq!(&back["mmsi"], &tree["mmsi"]);
        prop_assert_eq!(&back["location"]["latitude"], &tree["location"]["latitude"]);
        prop_assert_eq!(&back["location"]["longitude"], &tree["location"]["longitude"]);
        prop_assert_eq!(back["location"]["quality"].as_i64(), Some(i64::from(location::Quality::Gps as i32)));
    }
}
