//! Benchmarks for parsing and serializing substitution fixtures.
//!
//! Run with: cargo bench
//! Results are saved to target/criterion/

use blueprint_substitutions_parser::{
    parse_substitution_values, serialize_substitutions, ParseOptions, SourcePosition,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use glob::glob;
use std::fs;

/// Load all fixture files, trying paths for both the crate and workspace root.
fn load_fixtures() -> Vec<(String, String)> {
    let mut fixtures = Vec::new();
    let patterns = ["tests/fixtures/*.subs", "crates/parser/tests/fixtures/*.subs"];

    for pattern in patterns {
        for path in glob(pattern).expect("Failed to read glob pattern").flatten() {
            if let Ok(content) = fs::read_to_string(&path) {
                let name = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("unknown")
                    .to_string();
                if !fixtures.iter().any(|(n, _)| n == &name) {
                    fixtures.push((name, content));
                }
            }
        }
    }

    fixtures.sort_by(|a, b| a.0.cmp(&b.0));
    fixtures
}

fn bench_parse_all(c: &mut Criterion) {
    let fixtures = load_fixtures();
    if fixtures.is_empty() {
        eprintln!("Warning: No fixture files found.");
        return;
    }

    let total_bytes: usize = fixtures.iter().map(|(_, content)| content.len()).sum();
    let plain = ParseOptions::default();
    let with_positions = ParseOptions::default()
        .with_parent_position(SourcePosition::new(1, 1))
        .with_line_info(true);

    let mut group = c.benchmark_group("parse_all_fixtures");
    group.throughput(Throughput::Bytes(total_bytes as u64));

    group.bench_function("parse", |b| {
        b.iter(|| {
            for (_, content) in &fixtures {
                let _ = black_box(parse_substitution_values(content, &plain));
            }
        });
    });

    group.bench_function("parse_with_line_info", |b| {
        b.iter(|| {
            for (_, content) in &fixtures {
                let _ = black_box(parse_substitution_values(content, &with_positions));
            }
        });
    });

    group.bench_function("parse_and_serialize", |b| {
        b.iter(|| {
            for (_, content) in &fixtures {
                if let Ok(parsed) = parse_substitution_values(content, &plain) {
                    let _ = black_box(serialize_substitutions(&parsed, None));
                }
            }
        });
    });

    group.finish();
}

fn bench_individual_fixtures(c: &mut Criterion) {
    let fixtures = load_fixtures();
    let options = ParseOptions::default();

    let mut group = c.benchmark_group("parse_individual");
    for (name, content) in &fixtures {
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse", name), content, |b, content| {
            b.iter(|| black_box(parse_substitution_values(content, &options)));
        });
    }
    group.finish();
}

/// Many substitutions in one value, as produced by large templated strings.
fn bench_long_interpolation(c: &mut Criterion) {
    let value: String = (0..200)
        .map(|i| format!("part{}-${{resources.table{}.spec.names[{}]}}/", i, i, i))
        .collect();
    let options = ParseOptions::default();

    let mut group = c.benchmark_group("long_interpolation");
    group.throughput(Throughput::Bytes(value.len() as u64));
    group.bench_function("parse_200_substitutions", |b| {
        b.iter(|| black_box(parse_substitution_values(&value, &options)));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_parse_all,
    bench_individual_fixtures,
    bench_long_interpolation
);
criterion_main!(benches);
