use criterion::{criterion_group, criterion_main, Criterion};
use phantom::mpbase;

fn bench_powm(c: &mut Criterion) {
    let mut group = c.benchmark_group("powm");

    for &n in &[4usize, 16, 64] {
        let m: Vec<u64> = (0..n)
            .map(|i| (i as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15) | 1)
            .collect();
        let b: Vec<u64> = (0..n)
            .map(|i| (i as u64).wrapping_mul(0x2545_f491_4f6c_dd1d) | 3)
            .collect();
        let e: Vec<u64> = (0..n).map(|i| !(i as u64)).collect();

        group.bench_function(format!("{}limbs", n), |bench| {
            let mut r = vec![0u64; n];
            let mut tp = vec![0u64; mpbase::binvert_powm_scratch_size(n).max(2 * n) + 2];
            bench.iter(|| {
                mpbase::powm(
                    &mut r,
                    std::hint::black_box(&b),
                    n,
                    std::hint::black_box(&e),
                    n,
                    &m,
                    n,
                    &mut tp,
                );
                r[0]
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_powm);
criterion_main!(benches);
