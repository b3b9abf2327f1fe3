use phantom::ecc::weierstrass_binary::{
    WeierstrassBinaryAffine, WeierstrassBinaryJacobian, WeierstrassBinaryProjective,
};
use phantom::ecc::CurvePoint;
use phantom::{Ecc, Gf2n, Mpz, NamedCurve, Reduction, ScalarCoding};

type Z = Mpz<u64>;

fn secret_bytes(k: &Z, width: usize) -> Vec<u8> {
    let mut le = k.to_bytes_be(width);
    le.reverse();
    le
}

fn mul_binary<P: CurvePoint<u64>>(curve: NamedCurve, coding: ScalarCoding, k: &Z) -> (Z, Z) {
    let cfg = curve.make_config::<u64>(Reduction::Naive);
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
fn sect163r2_spec_vector_k16() {
    let expect_x = Z::from_str_radix("041FBD3ADBAB2C4349F5518C8BC4BD531F079DC92B", 16).unwrap();
    let expect_y = Z::from_str_radix("0611E336597E3A9C3AB428144731DC459A5500F1E", 16).unwrap();
    let k = Z::from_u32(16);

    let got = mul_binary::<WeierstrassBinaryAffine<u64>>(
        NamedCurve::Sect163r2,
        ScalarCoding::Binary,
        &k,
    );
    assert_eq!(got, (expect_x, expect_y));
}

#[test]
fn binary_coordinate_systems_agree() {
    for k in [2u64, 5, 16, 20, 1023, 0xdead] {
        let k = Z::from_u64(k);
        let affine = mul_binary::<WeierstrassBinaryAffine<u64>>(
            NamedCurve::Sect163r2,
            ScalarCoding::Binary,
            &k,
        );
        let proj = mul_binary::<WeierstrassBinaryProjective<u64>>(
            NamedCurve::Sect163r2,
            ScalarCoding::Binary,
            &k,
        );
        let ld = mul_binary::<WeierstrassBinaryJacobian<u64>>(
            NamedCurve::Sect163r2,
            ScalarCoding::Binary,
            &k,
        );
        assert_eq!(affine, proj, "projective k={k}");
        assert_eq!(affine, ld, "lopez-dahab k={k}");
    }
}

#[test]
fn koblitz_curves_stay_on_curve() {
    // y^2 + xy = x^3 + ax^2 + b over GF(2^m)
    for curve in [
        NamedCurve::Sect163k1,
        NamedCurve::Sect233k1,
        NamedCurve::Sect233r1,
    ] {
        let k = Z::from_u32(12345);
        let (x, y) = mul_binary::<WeierstrassBinaryAffine<u64>>(curve, ScalarCoding::Binary, &k);

        let cfg = curve.make_config::<u64>(Reduction::Naive);
        let poly = Gf2n::from_mpz(&cfg.modulus.modulus);
        let xf = Gf2n::from_mpz(&x);
        let yf = Gf2n::from_mpz(&y);
        let af = Gf2n::from_mpz(&cfg.a);
        let bf = Gf2n::from_mpz(&cfg.b);

        // lhs = y^2 + x*y
        let mut lhs = yf.sqr(&poly);
        lhs.add_assign(&xf.mul(&yf, &poly));

        // rhs = x^3 + a*x^2 + b
        let xx = xf.sqr(&poly);
        let mut rhs = xx.mul(&xf, &poly);
        rhs.add_assign(&af.mul(&xx, &poly));
        rhs.add_assign(&bf);

        assert_eq!(lhs, rhs, "{}", curve.params().name);
    }
}

#[test]
fn negation_round_trip() {
    let cfg = NamedCurve::Sect163r2.make_config::<u64>(Reduction::Naive);
    let (gx, gy) = NamedCurve::Sect163r2.base_point::<u64>();

    // P + (-P) lands on the identity, whose conversion fails
    let mut p = WeierstrassBinaryAffine::from_affine(&cfg, &gx, &gy);
    let mut neg = p.clone();
    neg.negate(&cfg);
    p.addition(&cfg, &neg).unwrap();

    let (mut x, mut y) = (Z::new(), Z::new());
    assert_eq!(
        p.convert_from(&cfg, &mut x, &mut y),
        Err(phantom::EccError::PointAtInfinity)
    );
}

#[test]
fn naf_coding_matches_binary_on_sect163() {
    let k = Z::from_str_radix("449A44BA44226A50185AFCC10A4C1462", 16).unwrap();
    let reference = mul_binary::<WeierstrassBinaryJacobian<u64>>(
        NamedCurve::Sect163r2,
        ScalarCoding::Binary,
        &k,
    );
    for w in [2u32, 3, 5] {
        let got = mul_binary::<WeierstrassBinaryJacobian<u64>>(
            NamedCurve::Sect163r2,
            ScalarCoding::Naf(w),
            &k,
        );
        assert_eq!(got, reference, "NAF w={w}");
    }
}

#[test]
fn large_binary_field_multiplication_runs() {
    let k = Z::from_u32(3);
    let (x, y) = mul_binary::<WeierstrassBinaryProjective<u64>>(
        NamedCurve::Sect571r1,
        ScalarCoding::Binary,
        &k,
    );
    assert!(!x.is_zero() && !y.is_zero());
}
