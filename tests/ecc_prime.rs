use phantom::ecc::weierstrass_prime::{
    WeierstrassPrimeAffine, WeierstrassPrimeJacobian, WeierstrassPrimeProjective,
};
use phantom::ecc::CurvePoint;
use phantom::{Ecc, Mpz, NamedCurve, Reduction, ScalarCoding};

type Z = Mpz<u64>;

fn secret_bytes(k: &Z, width: usize) -> Vec<u8> {
    let mut le = k.to_bytes_be(width);
    le.reverse();
    le
}

fn k2_expected() -> (Z, Z) {
    (
        Z::from_str_radix("DAFEBF5828783F2AD35534631588A3F629A70FB16982A888", 16).unwrap(),
        Z::from_str_radix("DD6BDA0D993DA0FA46B27BBC141B868F59331AFA5C7E93AB", 16).unwrap(),
    )
}

fn order_minus_1_expected() -> (Z, Z) {
    (
        Z::from_str_radix("188DA80EB03090F67CBF20EB43A18800F4FF0AFD82FF1012", 16).unwrap(),
        Z::from_str_radix("F8E6D46A003725879CEFEE1294DB32298C06885EE186B7EE", 16).unwrap(),
    )
}

fn mul_p192<P: CurvePoint<u64>>(
    reduction: Reduction,
    coding: ScalarCoding,
    masking: bool,
    k: &Z,
) -> (Z, Z) {
    let cfg = NamedCurve::Secp192r1.make_config::<u64>(reduction);
    let (gx, gy) = NamedCurve::Secp192r1.base_point::<u64>();
    let base = P::from_affine(&cfg, &gx, &gy);

    let mut ec: Ecc<u64, P> = Ecc::new(cfg, coding, masking);
    ec.setup(&base).unwrap();
    ec.scalar_point_mul(&secret_bytes(k, 24)).unwrap();

    let (mut x, mut y) = (Z::new(), Z::new());
    ec.get(&mut x, &mut y).unwrap();
    (x, y)
}

#[test]
fn secp192r1_doubles_the_base() {
    let k = Z::from_u32(2);
    let expect = k2_expected();

    let got = mul_p192::<WeierstrassPrimeAffine<u64>>(
        Reduction::Barrett,
        ScalarCoding::Binary,
        true,
        &k,
    );
    assert_eq!(got, expect);
}

#[test]
fn secp192r1_order_minus_one_negates_the_base() {
    let k = Z::from_str_radix(
        "6277101735386680763835789423176059013767194773182842284080",
        10,
    )
    .unwrap();
    let expect = order_minus_1_expected();

    let got = mul_p192::<WeierstrassPrimeJacobian<u64>>(
        Reduction::Barrett,
        ScalarCoding::Binary,
        true,
        &k,
    );
    assert_eq!(got, expect);

    // (order-1)*G keeps the base x and negates y
    let (gx, _) = NamedCurve::Secp192r1.base_point::<u64>();
    assert_eq!(got.0, gx);
}

#[test]
fn coordinate_systems_agree() {
    for k in [2u32, 3, 5, 10, 113, 65537] {
        let k = Z::from_u32(k);
        let affine = mul_p192::<WeierstrassPrimeAffine<u64>>(
            Reduction::Barrett,
            ScalarCoding::Binary,
            true,
            &k,
        );
        let proj = mul_p192::<WeierstrassPrimeProjective<u64>>(
            Reduction::Barrett,
            ScalarCoding::Binary,
            true,
            &k,
        );
        let jac = mul_p192::<WeierstrassPrimeJacobian<u64>>(
            Reduction::Barrett,
            ScalarCoding::Binary,
            true,
            &k,
        );
        assert_eq!(affine, proj, "projective k={k}");
        assert_eq!(affine, jac, "jacobian k={k}");
    }
}

#[test]
fn reduction_strategies_agree() {
    let k = Z::from_u32(78901);
    let barrett = mul_p192::<WeierstrassPrimeJacobian<u64>>(
        Reduction::Barrett,
        ScalarCoding::Binary,
        true,
        &k,
    );
    let naive =
        mul_p192::<WeierstrassPrimeJacobian<u64>>(Reduction::Naive, ScalarCoding::Binary, true, &k);
    let mont = mul_p192::<WeierstrassPrimeJacobian<u64>>(
        Reduction::Montgomery,
        ScalarCoding::Binary,
        true,
        &k,
    );
    let solinas = mul_p192::<WeierstrassPrimeJacobian<u64>>(
        Reduction::Solinas,
        ScalarCoding::Binary,
        true,
        &k,
    );
    assert_eq!(barrett, naive);
    assert_eq!(barrett, mont);
    assert_eq!(barrett, solinas);
}

#[test]
fn codings_agree() {
    let k = Z::from_str_radix("49A44BA44226A50185AFCC10A4C1462D", 16).unwrap();
    let reference = mul_p192::<WeierstrassPrimeJacobian<u64>>(
        Reduction::Barrett,
        ScalarCoding::Binary,
        true,
        &k,
    );

    for w in 2..=7u32 {
        let got = mul_p192::<WeierstrassPrimeJacobian<u64>>(
            Reduction::Barrett,
            ScalarCoding::Naf(w),
            false,
            &k,
        );
        assert_eq!(got, reference, "NAF w={w}");
    }

    for w in 2..=8u32 {
        let got = mul_p192::<WeierstrassPrimeJacobian<u64>>(
            Reduction::Barrett,
            ScalarCoding::PreComputed(w),
            false,
            &k,
        );
        assert_eq!(got, reference, "PRE w={w}");
    }

    // Masked and unmasked double-and-add match
    let unmasked = mul_p192::<WeierstrassPrimeJacobian<u64>>(
        Reduction::Barrett,
        ScalarCoding::Binary,
        false,
        &k,
    );
    assert_eq!(unmasked, reference);
}

#[test]
fn doubling_equals_self_addition() {
    let cfg = NamedCurve::Secp192r1.make_config::<u64>(Reduction::Barrett);
    let (gx, gy) = NamedCurve::Secp192r1.base_point::<u64>();

    let mut doubled = WeierstrassPrimeJacobian::from_affine(&cfg, &gx, &gy);
    doubled.doubling(&cfg, 1).unwrap();

    let base = WeierstrassPrimeJacobian::from_affine(&cfg, &gx, &gy);
    let mut added = base.clone();
    added.addition(&cfg, &base).unwrap();

    let (mut x1, mut y1) = (Z::new(), Z::new());
    let (mut x2, mut y2) = (Z::new(), Z::new());
    doubled.convert_from(&cfg, &mut x1, &mut y1).unwrap();
    added.convert_from(&cfg, &mut x2, &mut y2).unwrap();
    assert_eq!((x1, y1), (x2, y2));
}

#[test]
fn failure_modes() {
    let cfg = NamedCurve::Secp192r1.make_config::<u64>(Reduction::Barrett);
    let (gx, gy) = NamedCurve::Secp192r1.base_point::<u64>();
    let base = WeierstrassPrimeAffine::from_affine(&cfg, &gx, &gy);

    let mut ec: Ecc<u64, WeierstrassPrimeAffine<u64>> =
        Ecc::new(cfg, ScalarCoding::Binary, true);
    ec.setup(&base).unwrap();

    // Empty and zero secrets fail before any point work
    assert_eq!(
        ec.scalar_point_mul(&[]),
        Err(phantom::EccError::SecretIsZero)
    );
    assert_eq!(
        ec.scalar_point_mul(&[0, 0, 0]),
        Err(phantom::EccError::SecretIsZero)
    );

    // Reading a result before success reports the stale state and
    // leaves the outputs alone
    let mut x = Z::from_u32(7);
    let mut y = Z::from_u32(9);
    assert_eq!(ec.get(&mut x, &mut y), Err(phantom::EccError::ScalarMulError));
    assert_eq!(x, Z::from_u32(7));
    assert_eq!(y, Z::from_u32(9));
}

#[test]
fn other_prime_curves_produce_valid_points() {
    // k*G must satisfy the curve equation y^2 = x^3 + ax + b (mod p)
    for curve in [
        NamedCurve::Secp224r1,
        NamedCurve::Secp256r1,
        NamedCurve::Secp384r1,
        NamedCurve::Secp521r1,
    ] {
        let cfg = curve.make_config::<u64>(Reduction::Barrett);
        let (gx, gy) = curve.base_point::<u64>();
        let base = WeierstrassPrimeJacobian::from_affine(&cfg, &gx, &gy);
        let width = curve.params().num_bytes;

        let mut ec: Ecc<u64, WeierstrassPrimeJacobian<u64>> =
            Ecc::new(cfg, ScalarCoding::Binary, true);
        ec.setup(&base).unwrap();
        ec.scalar_point_mul(&secret_bytes(&Z::from_u32(1234567), width))
            .unwrap();

        let (mut x, mut y) = (Z::new(), Z::new());
        ec.get(&mut x, &mut y).unwrap();

        let p = &ec.config().modulus.modulus;
        let a = (&(p - &Mpz::from_u32(3))).mod_positive(p);
        let params = curve.params();
        let b = Z::from_str_radix(params.b_or_d, 16).unwrap();

        let lhs = (&y * &y).mod_positive(p);
        let rhs = (&(&(&(&x * &x) * &x) + &(&a * &x)) + &b).mod_positive(p);
        assert_eq!(lhs, rhs, "{}", params.name);
    }
}

#[test]
fn dual_base_joint_multiplication() {
    // k1*G + k2*H against separate multiplications, H = 5*G
    let curve = NamedCurve::Secp192r1;
    let cfg = curve.make_config::<u64>(Reduction::Barrett);
    let (gx, gy) = curve.base_point::<u64>();
    let g = WeierstrassPrimeJacobian::from_affine(&cfg, &gx, &gy);

    let mut h = g.clone();
    h.doubling(&cfg, 2).unwrap();
    h.addition(&cfg, &g).unwrap(); // 5G

    let k1 = Z::from_u32(1000003);
    let k2 = Z::from_u32(999983);

    let mut ec: Ecc<u64, WeierstrassPrimeJacobian<u64>> =
        Ecc::new(cfg, ScalarCoding::BinaryDual, true);
    ec.setup_dual(&g, &h).unwrap();

    let mut secret = secret_bytes(&k1, 24);
    secret.extend_from_slice(&secret_bytes(&k2, 24));
    ec.scalar_point_mul(&secret).unwrap();

    let (mut x, mut y) = (Z::new(), Z::new());
    ec.get(&mut x, &mut y).unwrap();

    // Reference: k1*G plus k2*H
    let r1 = mul_p192::<WeierstrassPrimeJacobian<u64>>(
        Reduction::Barrett,
        ScalarCoding::Binary,
        true,
        &k1,
    );
    let k2x5 = &k2 * &Z::from_u32(5);
    let r2 = mul_p192::<WeierstrassPrimeJacobian<u64>>(
        Reduction::Barrett,
        ScalarCoding::Binary,
        true,
        &k2x5,
    );

    let cfg = curve.make_config::<u64>(Reduction::Barrett);
    let mut sum = WeierstrassPrimeJacobian::from_affine(&cfg, &r1.0, &r1.1);
    let other = WeierstrassPrimeJacobian::from_affine(&cfg, &r2.0, &r2.1);
    sum.addition(&cfg, &other).unwrap();
    let (mut ex, mut ey) = (Z::new(), Z::new());
    sum.convert_from(&cfg, &mut ex, &mut ey).unwrap();

    assert_eq!((x, y), (ex, ey));
}
