//! Benchmarks for packing throughput.
//!
//! Measures end-to-end packing across file counts, tree depth and filtering.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::cast_possible_truncation
)]

use chrono::FixedOffset;
use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use distpack_core::PackConfig;
use distpack_core::PatternFilter;
use distpack_core::filter::AcceptAll;
use distpack_core::walker::FilteredWalker;
use distpack_core::writer::ZipSink;
use std::fs;
use std::hint::black_box;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

/// Creates a flat directory of 1 KB files.
fn create_flat_tree(temp: &TempDir, file_count: usize) -> PathBuf {
    let dir = temp.path().join("dist");
    fs::create_dir_all(&dir).unwrap();

    let content = "x".repeat(1024);
    for i in 0..file_count {
        fs::write(dir.join(format!("chunk-{i:05}.js")), &content).unwrap();
    }
    dir
}

/// Creates a chain of nested directories with a few files per level.
fn create_nested_tree(temp: &TempDir, depth: usize, files_per_level: usize) -> PathBuf {
    let root = temp.path().join("dist");
    let mut level = root.clone();
    for d in 0..depth {
        fs::create_dir_all(&level).unwrap();
        for i in 0..files_per_level {
            fs::write(level.join(format!("file_{i}.css")), "body{}\n").unwrap();
            fs::write(level.join(format!("file_{i}.css.map")), "{}\n").unwrap();
        }
        level = level.join(format!("level_{}", d + 1));
    }
    root
}

fn config_for(temp: &TempDir, input: &Path) -> PackConfig {
    PackConfig::default()
        .with_input_dir(input)
        .with_output_dir(temp.path().join("dist-zip"))
        .with_logging(false)
        .with_utc_offset(FixedOffset::east_opt(0))
}

fn benchmark_file_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_counts");

    for file_count in [10, 100, 1000] {
        let temp = TempDir::new().unwrap();
        let input = create_flat_tree(&temp, file_count);
        let config = config_for(&temp, &input);

        group.throughput(Throughput::Bytes((file_count * 1024) as u64));
        group.bench_with_input(BenchmarkId::new("pack", file_count), &config, |b, config| {
            b.iter(|| black_box(distpack_core::pack(config.clone()).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_nested_directories(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_directories");

    for depth in [5, 20, 50] {
        let temp = TempDir::new().unwrap();
        let input = create_nested_tree(&temp, depth, 5);
        let config = config_for(&temp, &input);

        group.bench_with_input(BenchmarkId::new("depth", depth), &config, |b, config| {
            b.iter(|| black_box(distpack_core::pack(config.clone()).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_filtering(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    let input = create_nested_tree(&temp, 20, 10);
    let mut group = c.benchmark_group("filtering");

    group.bench_function("accept_all", |b| {
        b.iter(|| {
            let mut sink = ZipSink::new(None);
            let walker = FilteredWalker::new(&input, &AcceptAll);
            black_box(walker.pack_into(&mut sink, None, None).unwrap());
            black_box(sink.finish().unwrap())
        });
    });

    let filter = PatternFilter::new(["*.map"]);
    group.bench_function("exclude_maps", |b| {
        b.iter(|| {
            let mut sink = ZipSink::new(None);
            let walker = FilteredWalker::new(&input, &filter);
            black_box(walker.pack_into(&mut sink, None, None).unwrap());
            black_box(sink.finish().unwrap())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_file_counts,
    benchmark_nested_directories,
    benchmark_filtering
);
criterion_main!(benches);
