//! Parsing and validation benchmarks for crxtract.
//!
//! Measures the hot pre-extraction paths:
//! - Container header parsing
//! - Path resolution against allowed roots
//! - Display-name sanitization
//!
//! These run once per entry or per container; none of them may become a
//! bottleneck during extraction of large archives.

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use crxtract_core::PathGuard;
use crxtract_core::header;
use crxtract_core::security::sanitize_name;
use std::hint::black_box;
use std::path::Path;
use std::path::PathBuf;

fn v3_container(header_size: u32, payload_len: usize) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(b"Cr24");
    data.extend_from_slice(&3u32.to_le_bytes());
    data.extend_from_slice(&header_size.to_le_bytes());
    data.extend_from_slice(&vec![0u8; header_size as usize]);
    data.extend_from_slice(&vec![0u8; payload_len]);
    data
}

/// Header parsing benchmarks.
fn benchmark_header_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("header_parsing");

    // Typical small protobuf header
    group.bench_function("v3_small_header", |b| {
        let data = v3_container(593, 4096);
        b.iter(|| header::parse(black_box(&data)));
    });

    // Large signed header
    group.bench_function("v3_large_header", |b| {
        let data = v3_container(65_536, 4096);
        b.iter(|| header::parse(black_box(&data)));
    });

    // Wrong magic (should fail fast)
    group.bench_function("bad_magic_reject", |b| {
        let mut data = v3_container(593, 4096);
        data[0] = b'X';
        b.iter(|| header::parse(black_box(&data)));
    });

    group.finish();
}

/// Path resolution benchmarks.
fn benchmark_path_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_resolution");

    let guard = PathGuard::new(&[PathBuf::from(".")], PathBuf::from("/srv/extensions"));

    // Simple entry path (most common case)
    group.bench_function("simple_entry", |b| {
        let path = Path::new("images/icons/icon128.png");
        b.iter(|| guard.resolve(black_box(path), None));
    });

    // Path with dot components (requires normalization work)
    group.bench_function("with_dot_components", |b| {
        let path = Path::new("./js/./lib/./vendor.js");
        b.iter(|| guard.resolve(black_box(path), None));
    });

    // Traversal attempt (should fail fast)
    group.bench_function("traversal_reject", |b| {
        let path = Path::new("../../etc/passwd");
        b.iter(|| guard.resolve(black_box(path), None));
    });

    group.finish();
}

/// Name sanitization benchmarks.
fn benchmark_sanitize_name(c: &mut Criterion) {
    let mut group = c.benchmark_group("sanitize_name");

    // Already clean (common case for store identifiers)
    group.bench_function("clean_identifier", |b| {
        b.iter(|| sanitize_name(black_box("cfhdojbkjhnklbpkdaibdccddilifddb")));
    });

    // Heavy cleanup
    group.bench_function("hostile_name", |b| {
        b.iter(|| sanitize_name(black_box("../../<evil>:name\\with|every*bad?char\0.....txt")));
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_header_parsing,
    benchmark_path_resolution,
    benchmark_sanitize_name,
);
criterion_main!(benches);
