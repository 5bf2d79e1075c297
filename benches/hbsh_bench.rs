use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hbsh::{Adiantum, HPolyC, HPolyNHC, NhPoly1305, Primitive, StreamCipher, XChaCha};
use std::hint::black_box;

/// Generate test data of the specified size
fn generate_test_data(size: usize) -> (Vec<u8>, [u8; 32], [u8; 16]) {
    let block = vec![0x42u8; size];
    let key = [0x01u8; 32];
    let tweak = [0x02u8; 16];
    (block, key, tweak)
}

/// Benchmark wide-block encryption for every construction at 12 rounds
fn bench_encrypt_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("encrypt_throughput");

    // Disk sector and page sizes
    let sizes = [512, 4096];

    let adiantum = Adiantum::with_rounds(12).unwrap();
    let hpolyc = HPolyC::with_rounds(12).unwrap();
    let hpolynhc = HPolyNHC::with_rounds(12).unwrap();

    for size in sizes {
        let (block, key, tweak) = generate_test_data(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("adiantum", size), &size, |b, _| {
            b.iter(|| {
                let result =
                    adiantum.encrypt(black_box(&block), black_box(&key), black_box(&tweak));
                black_box(result).unwrap()
            });
        });
        group.bench_with_input(BenchmarkId::new("hpolyc", size), &size, |b, _| {
            b.iter(|| {
                let result = hpolyc.encrypt(black_box(&block), black_box(&key), black_box(&tweak));
                black_box(result).unwrap()
            });
        });
        group.bench_with_input(BenchmarkId::new("hpolynhc", size), &size, |b, _| {
            b.iter(|| {
                let result =
                    hpolynhc.encrypt(black_box(&block), black_box(&key), black_box(&tweak));
                black_box(result).unwrap()
            });
        });
    }
    group.finish();
}

/// Benchmark decryption, which mirrors encryption step for step
fn bench_decrypt_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("decrypt_throughput");
    let adiantum = Adiantum::with_rounds(12).unwrap();

    for size in [512, 4096] {
        let (block, key, tweak) = generate_test_data(size);
        let ciphertext = adiantum.encrypt(&block, &key, &tweak).unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("adiantum", size), &size, |b, _| {
            b.iter(|| {
                let result =
                    adiantum.decrypt(black_box(&ciphertext), black_box(&key), black_box(&tweak));
                black_box(result).unwrap()
            });
        });
    }
    group.finish();
}

/// Benchmark the building blocks in isolation
fn bench_primitives(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitives");
    let size = 4096;
    let (data, key, _) = generate_test_data(size);
    group.throughput(Throughput::Bytes(size as u64));

    for rounds in [8, 12, 20] {
        let xchacha = XChaCha::with_rounds_keylen(rounds, 32).unwrap();
        let nonce = [0x03u8; 24];
        group.bench_with_input(BenchmarkId::new("xchacha", rounds), &rounds, |b, _| {
            b.iter(|| {
                let result =
                    xchacha.encrypt(black_box(&data), black_box(&key), black_box(&nonce), 0);
                black_box(result).unwrap()
            });
        });
    }

    let nhpoly = NhPoly1305::default();
    let nhpoly_key = vec![0x04u8; nhpoly.variant().key];
    group.bench_function("nhpoly1305", |b| {
        b.iter(|| {
            let result = nhpoly.hash(black_box(&nhpoly_key), black_box(&data));
            black_box(result).unwrap()
        });
    });

    group.finish();
}

/// Benchmark per-call key derivation on the smallest block
fn bench_setup_overhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("setup_overhead");
    let (block, key, tweak) = generate_test_data(32);

    let adiantum = Adiantum::with_rounds(12).unwrap();
    group.bench_function("adiantum_32_bytes", |b| {
        b.iter(|| {
            let result = adiantum.encrypt(black_box(&block), black_box(&key), black_box(&tweak));
            black_box(result).unwrap()
        });
    });
    let hpolyc = HPolyC::with_rounds(12).unwrap();
    group.bench_function("hpolyc_32_bytes", |b| {
        b.iter(|| {
            let result = hpolyc.encrypt(black_box(&block), black_box(&key), black_box(&tweak));
            black_box(result).unwrap()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_encrypt_sizes,
    bench_decrypt_sizes,
    bench_primitives,
    bench_setup_overhead
);
criterion_main!(benches);
