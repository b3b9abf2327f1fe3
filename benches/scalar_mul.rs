use criterion::{criterion_group, criterion_main, Criterion};
use phantom::ecc::weierstrass_prime::WeierstrassPrimeJacobian;
use phantom::ecc::CurvePoint;
use phantom::{Ecc, Mpz, NamedCurve, Reduction, ScalarCoding};

fn secret_bytes(k: &Mpz<u64>, width: usize) -> Vec<u8> {
    let mut le = k.to_bytes_be(width);
    le.reverse();
    le
}

fn bench_scalar_mul(c: &mut Criterion) {
    let k = Mpz::<u64>::from_str_radix("49A44BA44226A50185AFCC10A4C1462DD5E46824", 16).unwrap();
    let secret = secret_bytes(&k, 24);

    let mut group = c.benchmark_group("secp192r1");

    for (name, coding) in [
        ("binary", ScalarCoding::Binary),
        ("naf4", ScalarCoding::Naf(4)),
        ("pre4", ScalarCoding::PreComputed(4)),
    ] {
        group.bench_function(name, |bench| {
            let cfg = NamedCurve::Secp192r1.make_config::<u64>(Reduction::Montgomery);
            let (gx, gy) = NamedCurve::Secp192r1.base_point::<u64>();
            let base = WeierstrassPrimeJacobian::from_affine(&cfg, &gx, &gy);

            let mut ec: Ecc<u64, WeierstrassPrimeJacobian<u64>> = Ecc::new(cfg, coding, true);
            ec.setup(&base).unwrap();

            bench.iter(|| {
                ec.scalar_point_mul(std::hint::black_box(&secret)).unwrap();
                let (mut x, mut y) = (Mpz::new(), Mpz::new());
                ec.get(&mut x, &mut y).unwrap();
                x
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scalar_mul);
criterion_main!(benches);
