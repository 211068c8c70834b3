use derived_context_extraction as dcx;
use dcx::eager::EagerContexts;
use dcx::lazy::LazyContexts;
use dcx::Navigate;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const KEY: &str = "contexts_com_acme_deep_1";

/// One target fragment with a deep field next to `bulk` sibling entries,
/// followed by `bulk` sibling occurrences of the same family.
fn payload(bulk: usize) -> String {
    let filler: Vec<Value> = (0..bulk).map(|i| json!({"i": i, "s": "x".repeat(16)})).collect();
    let mut fragments = vec![json!({
        "schema": "iglu:com.acme/deep/jsonschema/1-0-0",
        "data": {"bulk": filler, "a": {"b": {"c": "leaf"}}}
    })];
    for _ in 0..bulk {
        fragments.push(json!({
            "schema": "iglu:com.acme/deep/jsonschema/1-0-0",
            "data": {"bulk": filler}
        }));
    }
    Value::Array(fragments).to_string()
}

#[test]
fn eager_work_grows_with_siblings_lazy_work_does_not() {
    let path: dcx::Path = "$.a.b.c".parse().unwrap();
    let mut eager_nodes = Vec::new();
    let mut lazy_visits = Vec::new();
    for bulk in [1, 10, 100] {
        let raw = payload(bulk);
        let eager = dcx::get_derived_context_map(KEY, &raw).unwrap();
        assert_eq!(eager.family(KEY).path(&path).string(), "leaf");
        eager_nodes.push(eager.decoded_nodes());

        let lazy = dcx::get_derived_context_map2(KEY, &raw).unwrap();
        let (leaf, visits) = lazy.family(KEY).at(0).path_visits(&path);
        assert_eq!(leaf.raw(), Some(r#""leaf""#));
        assert_eq!(leaf.string(), "leaf");
        lazy_visits.push(visits);
    }
    assert!(eager_nodes[0] < eager_nodes[1] && eager_nodes[1] < eager_nodes[2]);
    // `a` and `bulk` at the root, then one entry each for `b` and `c`
    assert_eq!(lazy_visits, vec![4, 4, 4]);
    assert!(eager_nodes[2] > 100 * lazy_visits[2]);
}

#[test]
fn lazy_never_decodes_siblings() {
    // `bulk` and the second occurrence are not valid JSON values, but their
    // brackets and strings balance, so the lazy path can step over them.
    let raw = r#"[
        {"schema":"iglu:com.acme/deep/jsonschema/1-0-0","data":{"bulk":[tru, 0x1F, "\q"],"a":{"b":{"c":"leaf"}}}},
        {"schema":"iglu:com.acme/deep/jsonschema/1-0-0","data":{"junk":[nul]}}
    ]"#;

    let lazy = LazyContexts::all(raw).unwrap();
    assert_eq!(lazy.family(KEY).len(), 2);
    assert_eq!(lazy.family(KEY).get("a").get("b").get("c").string(), "leaf");
    assert!(lazy.diagnostics().is_empty());

    let eager = EagerContexts::decode_all(raw).unwrap();
    assert!(eager.family(KEY).is_empty());
    assert_eq!(eager.diagnostics().len(), 2);
}
