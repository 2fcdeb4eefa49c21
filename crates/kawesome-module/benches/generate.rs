//! Criterion benchmarks for the kawesome generator

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};

use kawesome_common::workload::ServiceWorkload;
use kawesome_common::{GeneratorRequest, GenericConfig, ModuleGenerator, Workload};
use kawesome_module::{KawesomeGenerator, ModuleConfig};

// =============================================================================
// Test Fixtures
// =============================================================================

fn object(value: Value) -> GenericConfig {
    value.as_object().cloned().unwrap()
}

fn baseline_request() -> GeneratorRequest {
    GeneratorRequest {
        project: "kawesome-example".to_string(),
        stack: "dev".to_string(),
        app: "kawesome".to_string(),
        workload: Some(Workload::Service(ServiceWorkload::default())),
        dev_config: Some(object(json!({
            "service": {"port": 80, "targetPort": 8080, "protocol": "TCP"},
            "randomPassword": {"length": 10},
        }))),
        platform_config: None,
    }
}

fn labeled_request(num_labels: usize) -> GeneratorRequest {
    let labels: serde_json::Map<String, Value> = (0..num_labels)
        .map(|i| (format!("example.com/label-{}", i), json!(format!("value-{}", i))))
        .collect();

    let mut request = baseline_request();
    request.platform_config = Some(object(json!({
        "service": {"labels": labels.clone(), "annotations": labels},
    })));
    request
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_baseline(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_baseline");
    let generator = KawesomeGenerator::new();
    let request = baseline_request();

    group.bench_function("minimal", |b| {
        b.iter(|| black_box(generator.generate(black_box(&request)).unwrap()));
    });

    group.finish();
}

fn bench_labels(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_labels");
    let generator = KawesomeGenerator::new();

    for num_labels in [1, 10, 100] {
        let request = labeled_request(num_labels);
        group.bench_with_input(
            BenchmarkId::new("count", num_labels),
            &request,
            |b, request| {
                b.iter(|| black_box(generator.generate(request).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_complete(c: &mut Criterion) {
    let mut group = c.benchmark_group("config_complete");
    let request = labeled_request(10);

    group.bench_function("dev_and_platform", |b| {
        b.iter(|| {
            let mut cfg = ModuleConfig::default();
            cfg.complete(request.dev_config.as_ref(), request.platform_config.as_ref())
                .unwrap();
            black_box(cfg)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_baseline, bench_labels, bench_complete);
criterion_main!(benches);
