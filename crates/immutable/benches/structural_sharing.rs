use criterion::{black_box, criterion_group, criterion_main, Criterion};
use immutable::{from, path, Value};
use serde_json::json;

fn wide_record(width: usize) -> Value {
    let properties: serde_json::Map<_, _> = (0..width)
        .map(|i| (format!("key{i}"), json!({"index": i, "tags": ["a", "b"]})))
        .collect();

    from(properties).unwrap()
}

fn freeze(c: &mut Criterion) {
    let input = json!({
        "users": (0..100).map(|i| json!({"id": i, "name": format!("user {i}")})).collect::<Vec<_>>(),
    });

    c.bench_function("freeze 100 records", |b| {
        b.iter(|| from(black_box(input.clone())))
    });
}

fn set_in(c: &mut Criterion) {
    let record = wide_record(1000);
    let path = path!["key500", "index"];

    c.bench_function("set_in on a wide record", |b| {
        b.iter(|| black_box(&record).set_in(&path, 0))
    });
}

criterion_group!(benches, freeze, set_in);
criterion_main!(benches);
