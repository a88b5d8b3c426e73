use json_path_assert as jpa;
use json_path_assert::{any_order, Checks, Expected};
use proptest::prelude::*;
use serde_json::json;

fn one(path: &str, expected: impl Into<Expected>) -> Checks {
    let mut checks = Checks::new();
    checks.insert(path.to_string(), expected.into());
    checks
}

proptest! {
    #[test]
    fn any_order_ignores_permutation(values in prop::collection::vec(-5i64..5, 0..12), seed in any::<u64>()) {
        let doc = json!({ "v": values }).to_string();
        let mut shuffled = values.clone();
        // deterministic rotation + reversal keeps the multiset intact
        if !shuffled.is_empty() {
            let k = (seed as usize) % shuffled.len();
            shuffled.rotate_left(k);
        }
        if seed % 2 == 0 {
            shuffled.reverse();
        }
        prop_assert!(jpa::test_json(doc.as_bytes(), &one("v", any_order(values.clone()))).is_ok());
        prop_assert!(jpa::test_json(doc.as_bytes(), &one("v", any_order(shuffled))).is_ok());
    }

    #[test]
    fn any_order_detects_multiplicity(values in prop::collection::vec(0i64..4, 1..10), extra in 0i64..4) {
        let doc = json!({ "v": values }).to_string();
        let mut more = values.clone();
        more.push(extra);
        prop_assert!(jpa::test_json(doc.as_bytes(), &one("v", any_order(more))).is_err());
    }

    #[test]
    fn len_counts_array_elements(values in prop::collection::vec(any::<bool>(), 0..20)) {
        let doc = json!({ "v": values }).to_string();
        let n = values.len() as i64;
        prop_assert!(jpa::test_json(doc.as_bytes(), &one("v|len()", n)).is_ok());
        prop_assert!(jpa::test_json(doc.as_bytes(), &one("v.#", n)).is_ok());
    }

    #[test]
    fn integers_round_trip(n in any::<i64>()) {
        let doc = json!({ "n": n }).to_string();
        prop_assert!(jpa::test_json(doc.as_bytes(), &one("n", n)).is_ok());
        prop_assert!(jpa::test_json(doc.as_bytes(), &one("n", n.to_string())).is_ok());
    }
}
