use std::hint::black_box;

use bytes::BytesMut;
use criterion::{criterion_group, criterion_main, Criterion};
use micro_handshake::codec::{ByteCursor, FilterChain};
use tokio_util::codec::Decoder;

const HANDSHAKE: &[u8] = b"GET /chat HTTP/1.1\r\nHost: localhost\r\nUpgrade: websocket\r\nConnection: Upgrade\r\n\r\n";

fn bench_contiguous_handshake(c: &mut Criterion) {
    c.bench_function("decode_contiguous_handshake", |b| {
        b.iter(|| {
            let mut chain = FilterChain::new();
            let mut bytes = BytesMut::from(HANDSHAKE);
            black_box(chain.decode(&mut bytes).unwrap());
        });
    });
}

fn bench_segmented_handshake(c: &mut Criterion) {
    let segments: Vec<&[u8]> = HANDSHAKE.chunks(16).collect();

    c.bench_function("decode_segmented_handshake", |b| {
        b.iter(|| {
            let mut chain = FilterChain::new();
            let mut cursor = ByteCursor::new(segments.iter().copied());
            black_box(chain.filter(&mut cursor).unwrap());
        });
    });
}

fn bench_incomplete_retry(c: &mut Criterion) {
    let partial = &HANDSHAKE[..HANDSHAKE.len() - 1];

    c.bench_function("retry_incomplete_handshake", |b| {
        let mut chain = FilterChain::new();
        let mut bytes = BytesMut::from(partial);
        b.iter(|| {
            black_box(chain.decode(&mut bytes).unwrap());
        });
    });
}

criterion_group!(benches, bench_contiguous_handshake, bench_segmented_handshake, bench_incomplete_retry);
criterion_main!(benches);
