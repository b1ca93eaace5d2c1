//! Benchmarks for the CSV codec and row aggregation.
//!
//! Benchmark targets:
//! - Encoding 1k people: <5ms
//! - Decoding and folding 1k people: <10ms

// Criterion macros generate items without docs - this is expected for benchmarks
#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;

use roster::io::aggregate::{explode, fold};
use roster::io::formats::{self, Format, csv};
use roster::models::{Anniversary, Person};

/// Builds `count` people with three anniversaries each.
fn sample_people(count: usize) -> Vec<Person> {
    let base = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    (0..count)
        .map(|i| {
            let anniversaries = (0..3u64)
                .map(|k| {
                    Anniversary::new(
                        base + chrono::Days::new(k * 365 + i as u64),
                        format!("Milestone {k}"),
                    )
                    .with_type("work", "")
                    .with_description("Team \"platform\", floor 3")
                })
                .collect();
            Person::new(format!("id{i:05}"), format!("Surname {i}, Given"))
                .with_email(format!("person{i}@example.com"))
                .with_role("Engineer")
                .with_label("eng")
                .with_anniversaries(anniversaries)
        })
        .collect()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("csv_encode");
    group.measurement_time(Duration::from_secs(5));

    for count in [10usize, 100, 1000] {
        let people = sample_people(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &people, |b, people| {
            b.iter(|| formats::encode(black_box(people), Format::Csv));
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("csv_decode");
    group.measurement_time(Duration::from_secs(5));

    for count in [10usize, 100, 1000] {
        let text = formats::encode(&sample_people(count), Format::Csv).unwrap();
        group.throughput(Throughput::Bytes(text.len() as u64));

        group.bench_with_input(BenchmarkId::new("rows", count), &text, |b, text| {
            b.iter(|| csv::decode_rows(black_box(text)));
        });
        group.bench_with_input(BenchmarkId::new("rows_and_fold", count), &text, |b, text| {
            b.iter(|| formats::decode(black_box(text), Format::Csv));
        });
    }

    group.finish();
}

fn bench_fold(c: &mut Criterion) {
    let rows = explode(&sample_people(1000));
    c.bench_function("fold_1000_people", |b| {
        b.iter(|| fold(black_box(rows.clone())));
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_fold);
criterion_main!(benches);
