//! Criterion benchmarks for the SmartLink encoder and CRC-8 primitive.
//!
//! One registration attempt encodes once but broadcasts thousands of
//! datagrams, so encoding is far from the hot path; these benches exist to
//! catch accidental algorithmic regressions, not to chase microseconds.
//!
//! Run with:
//! ```bash
//! cargo bench --package smartlink-core --bench encoder_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use smartlink_core::{crc8, data_schedule, encode, wake_schedule, ProvisioningRequest};

fn reference_request() -> ProvisioningRequest {
    ProvisioningRequest {
        region: "AZ".to_string(),
        token: "ABCDEFGH".to_string(),
        secret: "WXYZ".to_string(),
        ssid: "HOME-C168".to_string(),
        wifi_password: "795F48E494285B6A".to_string(),
        device_count: 1,
    }
}

fn bench_crc8(c: &mut Criterion) {
    let all_bytes: Vec<u8> = (0u8..=255).collect();

    c.bench_function("crc8_256_bytes", |b| {
        b.iter(|| crc8(black_box(&all_bytes)))
    });
}

fn bench_encode(c: &mut Criterion) {
    let request = reference_request();

    c.bench_function("encode_reference_request", |b| {
        b.iter(|| encode(black_box(&request)).expect("encode must succeed"))
    });
}

fn bench_schedules(c: &mut Criterion) {
    let stream = encode(&reference_request()).expect("encode must succeed");

    c.bench_function("wake_schedule_collect", |b| {
        b.iter(|| wake_schedule().count())
    });

    c.bench_function("data_schedule_collect", |b| {
        b.iter(|| data_schedule(black_box(&stream)).count())
    });
}

criterion_group!(benches, bench_crc8, bench_encode, bench_schedules);
criterion_main!(benches);
