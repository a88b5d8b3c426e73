use json_path_assert as jpa;
use json_path_assert::{any_order, Checks, Expected};

fn departments() -> &'static [u8] {
    br#"{
        "departments": [
            {
                "name": "Engineering",
                "team": [
                    { "name": "Alice Johnson", "info": { "age": 29, "remote": true } },
                    { "name": "Bob Smith", "info": { "age": 34, "remote": false } }
                ]
            },
            {
                "name": "Operations",
                "team": [
                    { "name": "Carol Lee", "info": { "age": 41, "remote": true } },
                    { "name": "David Kim", "info": { "age": 27, "remote": true } }
                ]
            }
        ]
    }"#
}

fn one(path: &str, expected: impl Into<Expected>) -> Checks {
    let mut checks = Checks::new();
    checks.insert(path.to_string(), expected.into());
    checks
}

#[test]
fn test_map_over_collects_in_order() {
    let set = one("departments.[].name", vec!["Engineering", "Operations"]);
    assert!(jpa::test_json(departments(), &set).is_ok());
}

#[test]
fn test_nested_map_over_flattens() {
    let set = one(
        "departments.[].team.[].name",
        any_order(["David Kim", "Alice Johnson", "Carol Lee", "Bob Smith"]),
    );
    assert!(jpa::test_json(departments(), &set).is_ok());

    let set = one("departments.[].team.[].info.age", vec![29, 34, 41, 27]);
    assert!(jpa::test_json(departments(), &set).is_ok());

    let set = one("departments.[].team.[].info.remote", any_order([true, true, true, false]));
    assert!(jpa::test_json(departments(), &set).is_ok());
}

#[test]
fn test_nested_leaf_multiset() {
    let doc = br#"{"top":[{"mid":[{"leaf":1},{"leaf":2}]},{"mid":[{"leaf":3}]}]}"#;
    assert!(jpa::test_json(doc, &one("top.[].mid.[].leaf", any_order([3, 1, 2]))).is_ok());
    assert!(jpa::test_json(doc, &one("top.[].mid.[].leaf", any_order([1, 2]))).is_err());
}

#[test]
fn test_map_over_then_pipe() {
    let set = one("departments.[].team|len()", 2);
    assert!(jpa::test_json(departments(), &set).is_ok());
    let set = one("departments.[].team.[].name|len()", 4);
    assert!(jpa::test_json(departments(), &set).is_ok());
}

#[test]
fn test_map_over_missing_element_field() {
    let doc = br#"{"items":[{"id":1},{"name":"no id"}]}"#;
    let err = jpa::test_json(doc, &one("items.[].id", vec![1])).unwrap_err();
    assert!(err.to_string().contains("element 1"), "{err}");
}
