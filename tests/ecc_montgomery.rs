use phantom::ecc::montgomery::{MontgomeryPrimeAffine, MontgomeryPrimeProjective};
use phantom::ecc::CurvePoint;
use phantom::{Ecc, Mpz, NamedCurve, Reduction, ScalarCoding};

type Z = Mpz<u64>;

fn secret_bytes(k: &Z, width: usize) -> Vec<u8> {
    let mut le = k.to_bytes_be(width);
    le.reverse();
    le
}

fn ladder_x25519(reduction: Reduction, k: &Z) -> (Z, Z) {
    let cfg = NamedCurve::Curve25519.make_config::<u64>(reduction);
    let (gx, gy) = NamedCurve::Curve25519.base_point::<u64>();
    let base = MontgomeryPrimeProjective::from_affine(&cfg, &gx, &gy);

    let mut ec: Ecc<u64, MontgomeryPrimeProjective<u64>> =
        Ecc::new(cfg, ScalarCoding::MontLadder, false);
    ec.setup(&base).unwrap();
    ec.scalar_point_mul(&secret_bytes(k, 32)).unwrap();

    let (mut x, mut y) = (Z::new(), Z::new());
    ec.get(&mut x, &mut y).unwrap();
    (x, y)
}

fn affine_x25519(k: &Z) -> (Z, Z) {
    let cfg = NamedCurve::Curve25519.make_config::<u64>(Reduction::Barrett);
    let (gx, gy) = NamedCurve::Curve25519.base_point::<u64>();
    let base = MontgomeryPrimeAffine::from_affine(&cfg, &gx, &gy);

    let mut ec: Ecc<u64, MontgomeryPrimeAffine<u64>> =
        Ecc::new(cfg, ScalarCoding::Binary, true);
    ec.setup(&base).unwrap();
    ec.scalar_point_mul(&secret_bytes(k, 32)).unwrap();

    let (mut x, mut y) = (Z::new(), Z::new());
    ec.get(&mut x, &mut y).unwrap();
    (x, y)
}

#[test]
fn curve25519_ladder_k10_vector() {
    let expect_x =
        Z::from_str_radix("41eda655b159060471fb4ce5d7cb3fe43ee51843d2080e0383ce42892c3a9c7b", 16)
            .unwrap();

    let (x, _) = ladder_x25519(Reduction::Barrett, &Z::from_u32(10));
    assert_eq!(x, expect_x);

    // The Montgomery-domain configuration lands on the same point
    let (x, _) = ladder_x25519(Reduction::Montgomery, &Z::from_u32(10));
    assert_eq!(x, expect_x);
}

#[test]
fn ladder_agrees_with_double_and_add() {
    for k in [2u64, 3, 10, 77, 123_456_789, 0xffff_ffff_ffff] {
        let k = Z::from_u64(k);
        let (lx, ly) = ladder_x25519(Reduction::Barrett, &k);
        let (ax, ay) = affine_x25519(&k);
        assert_eq!((lx, ly), (ax, ay), "k = {k}");
    }
}

#[test]
fn ladder_y_recovery_is_on_curve() {
    // B*y^2 = x^3 + A*x^2 + x with B = 1
    let cfg = NamedCurve::Curve25519.make_config::<u64>(Reduction::Barrett);
    let p = &cfg.modulus.modulus;
    let a = Z::from_str_radix("76D06", 16).unwrap();

    let (x, y) = ladder_x25519(Reduction::Barrett, &Z::from_u32(10));
    let lhs = (&y * &y).mod_positive(p);
    let rhs = (&(&(&(&x * &x) * &x) + &(&(&a * &x) * &x)) + &x).mod_positive(p);
    assert_eq!(lhs, rhs);
}

#[test]
fn curve448_ladder_runs() {
    let cfg = NamedCurve::Curve448.make_config::<u64>(Reduction::Barrett);
    let p = cfg.modulus.modulus.clone();
    let (gx, gy) = NamedCurve::Curve448.base_point::<u64>();
    let base = MontgomeryPrimeProjective::from_affine(&cfg, &gx, &gy);

    let mut ec: Ecc<u64, MontgomeryPrimeProjective<u64>> =
        Ecc::new(cfg, ScalarCoding::MontLadder, false);
    ec.setup(&base).unwrap();
    ec.scalar_point_mul(&secret_bytes(&Z::from_u32(1000), 56))
        .unwrap();

    let (mut x, mut y) = (Z::new(), Z::new());
    ec.get(&mut x, &mut y).unwrap();

    // On-curve check with A = 0x262a6, B = 1
    let a = Z::from_str_radix("262a6", 16).unwrap();
    let lhs = (&y * &y).mod_positive(&p);
    let rhs = (&(&(&(&x * &x) * &x) + &(&(&a * &x) * &x)) + &x).mod_positive(&p);
    assert_eq!(lhs, rhs);
}
