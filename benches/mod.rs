use criterion::{criterion_group, criterion_main};

mod publish;

criterion_group!(
    benches,
    publish::bench_encode_envelope,
    publish::bench_publish_envelope,
    publish::bench_drain_lines
);
criterion_main!(benches);
