use criterion::{black_box, criterion_group, criterion_main, Criterion};
use url::Url;

fn simple(c: &mut Criterion) {
    let url = "https://user:pw@example.com:8080/foo/bar?baz=1#top";

    c.bench_function(url, |b| b.iter(|| black_box(url).parse::<Url>()));
}

fn parsed_query(c: &mut Criterion) {
    let url = "/search?q=persistent+data&page=2&tag=a&tag=b";

    c.bench_function("parse query string", |b| {
        b.iter(|| url::parse(black_box(url), true, false))
    });
}

fn resolve(c: &mut Criterion) {
    let base: Url = "http://example.com/a/b/c/d".parse().unwrap();

    c.bench_function("resolve dot segments", |b| {
        b.iter(|| base.resolve(black_box("../../e/./f/../g?h")))
    });
}

criterion_group!(benches, simple, parsed_query, resolve);
criterion_main!(benches);
