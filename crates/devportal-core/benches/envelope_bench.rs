//! Criterion benchmarks for response interpretation and sweep enumeration.
//!
//! Run with:
//! ```bash
//! cargo bench --package devportal-core --bench envelope_bench
//! ```

use std::net::Ipv4Addr;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use devportal_core::{disambiguate, logs_from_body, sweep_hosts, SWEEP_BATCH_SIZE};
use serde_json::{json, Value};

// ── Body fixtures ─────────────────────────────────────────────────────────────

fn make_home_page() -> Value {
    let results: Vec<Value> = (0..30)
        .map(|i| json!({"id": {"value": format!("video-{i}")}, "name": format!("Video {i}"), "duration": 600}))
        .collect();
    json!({"results": results, "hasMore": true})
}

fn make_log_listing() -> Value {
    let logs: Vec<Value> = (0..200)
        .map(|i| json!({"id": i, "devId": "dev", "type": "LOG", "log": format!("line {i}")}))
        .collect();
    Value::Array(logs)
}

fn bench_disambiguate(c: &mut Criterion) {
    let mut group = c.benchmark_group("disambiguate");

    let enveloped = json!({"success": true, "result": make_home_page()});
    group.bench_function("enveloped", |b| {
        b.iter(|| disambiguate(black_box(enveloped.clone())))
    });

    let bare = make_home_page();
    group.bench_function("bare", |b| b.iter(|| disambiguate(black_box(bare.clone()))));

    let error = json!({"error": "ScriptException: boom", "result": Value::Null});
    group.bench_function("error", |b| b.iter(|| disambiguate(black_box(error.clone()))));

    group.finish();
}

fn bench_logs(c: &mut Criterion) {
    let listing = make_log_listing();
    c.bench_function("logs_from_body_200", |b| {
        b.iter(|| logs_from_body(black_box(listing.clone())))
    });
}

fn bench_sweep_plan(c: &mut Criterion) {
    c.bench_function("sweep_hosts_batched", |b| {
        b.iter(|| {
            let hosts = sweep_hosts(black_box(Ipv4Addr::new(192, 168, 1, 42)));
            hosts.chunks(SWEEP_BATCH_SIZE).count()
        })
    });
}

criterion_group!(benches, bench_disambiguate, bench_logs, bench_sweep_plan);
criterion_main!(benches);
