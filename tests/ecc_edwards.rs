use phantom::ecc::edwards::{EdwardsPrimeAffine, EdwardsPrimeProjective};
use phantom::ecc::CurvePoint;
use phantom::{Ecc, Mpz, NamedCurve, Reduction, ScalarCoding};

type Z = Mpz<u64>;

fn secret_bytes(k: &Z, width: usize) -> Vec<u8> {
    let mut le = k.to_bytes_be(width);
    le.reverse();
    le
}

fn mul_edwards<P: CurvePoint<u64>>(
    curve: NamedCurve,
    reduction: Reduction,
    coding: ScalarCoding,
    k: &Z,
) -> (Z, Z) {
    let cfg = curve.make_config::<u64>(reduction);
    let (gx, gy) = curve.base_point::<u64>();
    let base = P::from_affine(&cfg, &gx, &gy);
    let width = curve.params().num_bytes;

    let mut ec: Ecc<u64, P> = Ecc::new(cfg, coding, true);
    ec.setup(&base).unwrap();
    ec.scalar_point_mul(&secret_bytes(k, width)).unwrap();

    let (mut x, mut y) = (Z::new(), Z::new());
    ec.get(&mut x, &mut y).unwrap();
    (x, y)
}

#[test]
fn edwards448_spec_vector() {
    let k = Z::from_str_radix("315879992934921009807084090", 10).unwrap();
    let expect_x = Z::from_str_radix(
        "c1ed0c5162d9465f43f22b73801fef0d858f1458706fda34958bc15987317f420a78927e2860414c35f93fcc3a797472c28734c7f68a5363",
        16,
    )
    .unwrap();
    let expect_y = Z::from_str_radix(
        "158f2d5aac19a3680075adcd14be18266d5c3b7a02b2968bb2efd07e718ff019c2890f7e376467e459a288a36558e0cdf8eb4dde33122620",
        16,
    )
    .unwrap();

    let got = mul_edwards::<EdwardsPrimeAffine<u64>>(
        NamedCurve::Edwards448,
        Reduction::Barrett,
        ScalarCoding::Binary,
        &k,
    );
    assert_eq!(got, (expect_x.clone(), expect_y.clone()));

    let got = mul_edwards::<EdwardsPrimeProjective<u64>>(
        NamedCurve::Edwards448,
        Reduction::Barrett,
        ScalarCoding::Binary,
        &k,
    );
    assert_eq!(got, (expect_x, expect_y));
}

#[test]
fn edwards25519_coordinate_systems_agree() {
    for k in [2u64, 7, 1000, 0xdead_beef] {
        let k = Z::from_u64(k);
        let affine = mul_edwards::<EdwardsPrimeAffine<u64>>(
            NamedCurve::Edwards25519,
            Reduction::Montgomery,
            ScalarCoding::Binary,
            &k,
        );
        let proj = mul_edwards::<EdwardsPrimeProjective<u64>>(
            NamedCurve::Edwards25519,
            Reduction::Montgomery,
            ScalarCoding::Binary,
            &k,
        );
        assert_eq!(affine, proj, "k = {k}");
    }
}

#[test]
fn edwards25519_point_is_on_curve() {
    // -x^2 + y^2 = 1 + d*x^2*y^2
    let cfg = NamedCurve::Edwards25519.make_config::<u64>(Reduction::Barrett);
    let p = &cfg.modulus.modulus;
    let d = Z::from_str_radix(
        "52036cee2b6ffe738cc740797779e89800700a4d4141d8ab75eb4dca135978a3",
        16,
    )
    .unwrap();

    let (x, y) = mul_edwards::<EdwardsPrimeProjective<u64>>(
        NamedCurve::Edwards25519,
        Reduction::Barrett,
        ScalarCoding::Binary,
        &Z::from_u32(31337),
    );

    let xx = (&x * &x).mod_positive(p);
    let yy = (&y * &y).mod_positive(p);
    let lhs = (&yy - &xx).mod_positive(p);
    let rhs = (&(&Z::from_u32(1) + &(&(&d * &xx) * &yy))).mod_positive(p);
    assert_eq!(lhs, rhs);
}

#[test]
fn negation_reflects_x() {
    let cfg = NamedCurve::Edwards25519.make_config::<u64>(Reduction::Barrett);
    let (gx, gy) = NamedCurve::Edwards25519.base_point::<u64>();
    let mut point = EdwardsPrimeAffine::from_affine(&cfg, &gx, &gy);
    point.negate(&cfg);

    let (mut x, mut y) = (Z::new(), Z::new());
    point.convert_from(&cfg, &mut x, &mut y).unwrap();
    assert_eq!(y, gy);
    assert_eq!((&x + &gx).mod_positive(&cfg.modulus.modulus), Z::new());
}

#[test]
fn windowed_codings_agree_on_edwards() {
    let k = Z::from_str_radix("3ee51843d2080e0383ce4289", 16).unwrap();
    let reference = mul_edwards::<EdwardsPrimeProjective<u64>>(
        NamedCurve::Edwards25519,
        Reduction::Barrett,
        ScalarCoding::Binary,
        &k,
    );
    for w in [2u32, 4, 6] {
        let got = mul_edwards::<EdwardsPrimeProjective<u64>>(
            NamedCurve::Edwards25519,
            Reduction::Barrett,
            ScalarCoding::PreComputed(w),
            &k,
        );
        assert_eq!(got, reference, "w = {w}");
        let got = mul_edwards::<EdwardsPrimeProjective<u64>>(
            NamedCurve::Edwards25519,
            Reduction::Barrett,
            ScalarCoding::Naf(w),
            &k,
        );
        assert_eq!(got, reference, "NAF w = {w}");
    }
}
