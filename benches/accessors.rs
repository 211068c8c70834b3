//! Eager vs lazy extraction of one deep field as sibling payloads grow.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};

use derived_context_extraction::{get_derived_context_map, get_derived_context_map2, Navigate};

const KEY: &str = "contexts_com_acme_deep_1";

fn payload(bulk: usize) -> String {
    let filler: Vec<Value> = (0..bulk)
        .map(|i| json!({"i": i, "name": format!("entry-{i}"), "tags": ["a", "b", "c"]}))
        .collect();
    let mut fragments = vec![json!({
        "schema": "iglu:com.acme/deep/jsonschema/1-0-0",
        "data": {"a": {"b": {"c": "leaf"}}, "bulk": filler}
    })];
    for _ in 0..4 {
        fragments.push(json!({
            "schema": "iglu:com.acme/deep/jsonschema/1-0-0",
            "data": {"bulk": filler}
        }));
    }
    Value::Array(fragments).to_string()
}

fn bench_single_deep_field(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_deep_field");
    for bulk in [10usize, 100, 1000] {
        let raw = payload(bulk);
        group.bench_with_input(BenchmarkId::new("eager", bulk), &raw, |b, raw| {
            b.iter(|| {
                let out = get_derived_context_map(KEY, black_box(raw)).unwrap();
                black_box(out.family(KEY).get("a").get("b").get("c").string())
            })
        });
        group.bench_with_input(BenchmarkId::new("lazy", bulk), &raw, |b, raw| {
            b.iter(|| {
                let out = get_derived_context_map2(KEY, black_box(raw)).unwrap();
                black_box(out.family(KEY).get("a").get("b").get("c").string())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_deep_field);
criterion_main!(benches);
