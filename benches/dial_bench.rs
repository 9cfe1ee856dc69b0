use criterion::{black_box, criterion_group, criterion_main, Criterion};
use url::Url;
use wsnet::ws::{authority, handshake::accept_key, Config};

fn benchmark_authority(c: &mut Criterion) {
    let plain = Url::parse("ws://example.com/chat").unwrap();
    let explicit = Url::parse("wss://example.com:8443/feed?x=1").unwrap();

    c.bench_function("authority_default_port", |b| b.iter(|| authority(black_box(&plain))));
    c.bench_function("authority_explicit_port", |b| b.iter(|| authority(black_box(&explicit))));
}

fn benchmark_config_new(c: &mut Criterion) {
    c.bench_function("config_new", |b| {
        b.iter(|| {
            Config::new(
                black_box("wss://stream.example.com:9443/ws/market?depth=20"),
                black_box("https://app.example.com/"),
            )
        })
    });
}

fn benchmark_accept_key(c: &mut Criterion) {
    c.bench_function("accept_key", |b| {
        b.iter(|| accept_key(black_box("dGhlIHNhbXBsZSBub25jZQ==")))
    });
}

criterion_group!(benches, benchmark_authority, benchmark_config_new, benchmark_accept_key);
criterion_main!(benches);
