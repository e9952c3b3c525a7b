use std::hint::black_box;

use btoon::{decode, encode, DecodeOptions, EncodeOptions, Value};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

// ============================================================================
// Helper functions для создания тестовых данных
// ============================================================================

fn create_string_value(size: usize) -> Value {
    Value::from("a".repeat(size))
}

/// Массив однородных записей, который кодируется таблицей.
fn create_records(rows: usize) -> Value {
    Value::array((0..rows).map(|i| {
        Value::map([
            ("id", Value::from(i as u64)),
            ("name", Value::from(format!("user_{i}"))),
            ("active", Value::from(i % 2 == 0)),
            ("score", Value::from(i as f64 * 0.5)),
        ])
    }))
}

fn create_nested(levels: usize) -> Value {
    (0..levels).fold(Value::from(1), |inner, i| {
        Value::map([("level", Value::from(i as u64)), ("child", inner)])
    })
}

// ============================================================================
// Бенчмарки
// ============================================================================

fn bench_primitives(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_decode/primitives");
    let opts = EncodeOptions::default();
    let dopts = DecodeOptions::default();

    for size in [16usize, 1024, 64 * 1024].iter() {
        let value = create_string_value(*size);
        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_with_input(BenchmarkId::new("string/encode", size), &value, |b, v| {
            b.iter(|| black_box(encode(black_box(v), &opts).unwrap()))
        });

        let encoded = encode(&value, &opts).unwrap();
        group.bench_with_input(
            BenchmarkId::new("string/decode", size),
            &encoded,
            |b, data| b.iter(|| black_box(decode(black_box(data), &dopts).unwrap())),
        );
    }

    for n in [5i64, 300, -70_000, i64::MIN] {
        let value = Value::Int(n);
        group.bench_with_input(BenchmarkId::new("int/encode", n), &value, |b, v| {
            b.iter(|| black_box(encode(black_box(v), &opts).unwrap()))
        });
    }

    group.bench_function("float/encode", |b| {
        let v = Value::Float(std::f64::consts::PI);
        b.iter(|| black_box(encode(black_box(&v), &opts).unwrap()))
    });
    group.finish();
}

/// Сравнение табличной формы с обычным массивом map.
fn bench_tabular_vs_plain(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_decode/tabular");
    group.sample_size(50);
    let tabular = EncodeOptions::default();
    let plain = EncodeOptions::default().with_auto_tabular(false);
    let dopts = DecodeOptions::default();

    for rows in [10usize, 1_000, 10_000].iter() {
        let value = create_records(*rows);
        group.throughput(Throughput::Elements(*rows as u64));

        group.bench_with_input(BenchmarkId::new("tabular/encode", rows), &value, |b, v| {
            b.iter(|| black_box(encode(black_box(v), &tabular).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("plain/encode", rows), &value, |b, v| {
            b.iter(|| black_box(encode(black_box(v), &plain).unwrap()))
        });

        let encoded = encode(&value, &tabular).unwrap();
        group.bench_with_input(
            BenchmarkId::new("tabular/decode", rows),
            &encoded,
            |b, data| b.iter(|| black_box(decode(black_box(data), &dopts).unwrap())),
        );
        let encoded = encode(&value, &plain).unwrap();
        group.bench_with_input(
            BenchmarkId::new("plain/decode", rows),
            &encoded,
            |b, data| b.iter(|| black_box(decode(black_box(data), &dopts).unwrap())),
        );
    }
    group.finish();
}

fn bench_compression(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_decode/compression");
    group.sample_size(20);
    let value = create_records(5_000);
    let dopts = DecodeOptions::default().with_decompress(true);

    for level in [1u32, 6, 9] {
        let opts = EncodeOptions::default()
            .with_compress(true)
            .with_compression_level(level);
        group.bench_with_input(BenchmarkId::new("encode", level), &value, |b, v| {
            b.iter(|| black_box(encode(black_box(v), &opts).unwrap()))
        });
        let encoded = encode(&value, &opts).unwrap();
        group.bench_with_input(BenchmarkId::new("decode", level), &encoded, |b, data| {
            b.iter(|| black_box(decode(black_box(data), &dopts).unwrap()))
        });
    }
    group.finish();
}

fn bench_nested(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_decode/nested");
    let value = create_nested(100);
    let encoded = encode(&value, &EncodeOptions::default()).unwrap();
    group.bench_function("encode", |b| {
        b.iter(|| black_box(encode(black_box(&value), &EncodeOptions::default()).unwrap()))
    });
    group.bench_function("decode", |b| {
        b.iter(|| black_box(decode(black_box(&encoded), &DecodeOptions::default()).unwrap()))
    });
    group.finish();
}

/// Кодирование значения, пришедшего из JSON.
fn bench_from_json(c: &mut Criterion) {
    let json: serde_json::Value = serde_json::json!({
        "users": (0..200).map(|i| serde_json::json!({"id": i, "name": format!("u{i}")})).collect::<Vec<_>>(),
        "total": 200,
    });
    c.bench_function("from_json/encode", |b| {
        b.iter(|| {
            let v = Value::from(black_box(json.clone()));
            black_box(encode(&v, &EncodeOptions::default()).unwrap())
        })
    });
}

criterion_group!(
    benches,
    bench_primitives,
    bench_tabular_vs_plain,
    bench_compression,
    bench_nested,
    bench_from_json
);
criterion_main!(benches);
