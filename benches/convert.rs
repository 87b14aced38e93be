//! Benchmarks for index construction and query conversion.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sieve::prelude::*;
use sieve::FieldMethodIndex;

#[derive(Query, Default, Clone)]
struct ListingQuery {
    status: Option<String>,
    #[sieve(like)]
    title_like: Option<String>,
    #[sieve(gte = "price")]
    min_price: Option<i64>,
    #[sieve(lte = "price")]
    max_price: Option<i64>,
    #[sieve(in)]
    category: Option<Vec<String>>,
    #[sieve(is_not_null)]
    published_at: Option<bool>,
    #[sieve(except)]
    page: Option<i64>,
}

#[derive(Debug, Default)]
struct ListingCriteria {
    clauses: Vec<(&'static str, FilterValue)>,
}

#[criteria]
impl ListingCriteria {
    pub fn and_status_equal_to(&mut self, status: String) {
        self.clauses.push(("status", status.into()));
    }

    pub fn and_title_like(&mut self, pattern: String) {
        self.clauses.push(("title", pattern.into()));
    }

    pub fn and_price_greater_than_or_equal_to(&mut self, price: i64) {
        self.clauses.push(("price >=", price.into()));
    }

    pub fn and_price_less_than_or_equal_to(&mut self, price: i64) {
        self.clauses.push(("price <=", price.into()));
    }

    pub fn and_category_in(&mut self, categories: Vec<String>) {
        self.clauses.push(("category", categories.into()));
    }

    pub fn and_published_at_is_not_null(&mut self, flag: bool) {
        self.clauses.push(("published_at", flag.into()));
    }
}

fn full_query() -> ListingQuery {
    ListingQuery {
        status: Some("OPEN".into()),
        title_like: Some("bike".into()),
        min_price: Some(100),
        max_price: Some(900),
        category: Some(vec!["sports".into(), "outdoor".into()]),
        published_at: Some(true),
        page: Some(4),
    }
}

fn bench_index_build(c: &mut Criterion) {
    c.bench_function("index_build", |b| {
        b.iter(|| black_box(FieldMethodIndex::<ListingCriteria>::build::<ListingQuery>().unwrap()))
    });
}

fn bench_convert(c: &mut Criterion) {
    let converter = Converter::<ListingQuery, ListingCriteria>::new().unwrap();
    let mut group = c.benchmark_group("convert");

    let queries = [
        ("empty", ListingQuery::default()),
        (
            "single",
            ListingQuery {
                status: Some("OPEN".into()),
                ..Default::default()
            },
        ),
        ("full", full_query()),
    ];

    for (name, query) in &queries {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(name), query, |b, query| {
            b.iter(|| black_box(converter.convert(black_box(query)).unwrap()))
        });
    }

    group.finish();
}

fn bench_populate_reuse(c: &mut Criterion) {
    let converter = Converter::<ListingQuery, ListingCriteria>::new().unwrap();
    let query = full_query();

    c.bench_function("populate_existing", |b| {
        let mut criteria = ListingCriteria::default();
        b.iter(|| {
            criteria.clauses.clear();
            black_box(converter.populate(black_box(&query), &mut criteria).unwrap())
        })
    });
}

criterion_group!(benches, bench_index_build, bench_convert, bench_populate_reuse);

criterion_main!(benches);
