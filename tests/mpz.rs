use num_bigint::BigUint;
use phantom::Mpz;
use proptest::prelude::*;

type Z = Mpz<u64>;

fn to_ref(v: &Z) -> BigUint {
    BigUint::parse_bytes(v.to_hex().trim_start_matches('-').as_bytes(), 16)
        .unwrap_or_else(num_traits::Zero::zero)
}

#[test]
fn hex_and_decimal_agree() {
    let h = Z::from_str_radix("FFFFFFFFFFFFFFFFFFFFFFFF99DEF836146BC9B1B4D22831", 16).unwrap();
    let d = Z::from_str_radix(
        "6277101735386680763835789423176059013767194773182842284081",
        10,
    )
    .unwrap();
    assert_eq!(h, d);
}

#[test]
fn fixed_width_serialisation() {
    let v = Z::from_str_radix("188DA80EB03090F67CBF20EB43A18800F4FF0AFD82FF1012", 16).unwrap();
    let bytes = v.to_bytes_be(24);
    assert_eq!(bytes.len(), 24);
    assert_eq!(bytes[0], 0x18);
    assert_eq!(bytes[23], 0x12);
    assert_eq!(Z::from_bytes_be(&bytes), v);

    // Left padding for short values
    let nine = Z::from_u32(9);
    let padded = nine.to_bytes_be(32);
    assert!(padded[..31].iter().all(|&b| b == 0));
    assert_eq!(padded[31], 9);
}

proptest! {
    #[test]
    fn arithmetic_matches_reference(a in proptest::collection::vec(any::<u64>(), 1..8),
                                    b in proptest::collection::vec(any::<u64>(), 1..8)) {
        let za = Z::from_limbs(a.clone());
        let zb = Z::from_limbs(b.clone());
        let ra = to_ref(&za);
        let rb = to_ref(&zb);

        prop_assert_eq!(to_ref(&(&za + &zb)), &ra + &rb);
        prop_assert_eq!(to_ref(&(&za * &zb)), &ra * &rb);

        if !zb.is_zero() {
            let (q, r) = Z::tdiv_qr_ref(&za, &zb);
            prop_assert_eq!(to_ref(&q), &ra / &rb);
            prop_assert_eq!(to_ref(&r), &ra % &rb);
        }
    }

    #[test]
    fn gcdext_is_bezout(a in 1u64.., b in 1u64..) {
        let za = Z::from_u64(a);
        let zb = Z::from_u64(b);
        let (mut g, mut s, mut t) = (Z::new(), Z::new(), Z::new());
        Z::gcdext(&mut g, &mut s, &mut t, &za, &zb);

        let chk = &(&s * &za) + &(&t * &zb);
        prop_assert_eq!(chk, g);
    }

    #[test]
    fn invert_round_trips(a in 1u64..) {
        let m = Z::from_str_radix(
            "FFFFFFFFFFFFFFFFFFFFFFFF99DEF836146BC9B1B4D22831", 16).unwrap();
        let za = Z::from_u64(a);
        // The modulus is prime, so any non-multiple inverts
        if let Some(inv) = za.invert(&m) {
            let prod = (&za * &inv).mod_positive(&m);
            prop_assert!(prod.is_one());
        }
    }

    #[test]
    fn shifts_are_inverse(v in proptest::collection::vec(any::<u64>(), 1..6),
                          bits in 1usize..200) {
        let z = Z::from_limbs(v);
        let back = z.shl_bits(bits).shr_bits(bits);
        prop_assert_eq!(back, z);
    }
}

#[test]
fn signed_division_truncates() {
    let n = Z::from_str_radix("-7", 10).unwrap();
    let d = Z::from_u32(2);
    let (q, r) = Z::tdiv_qr_ref(&n, &d);
    assert_eq!(q.to_string(), "-3");
    assert_eq!(r.to_string(), "-1");

    // Euclidean residue stays positive
    assert_eq!(n.mod_positive(&d).to_string(), "1");
}

#[test]
fn sizeinbase_matches_bit_length() {
    let mut v = Z::new();
    v.setbit(254);
    assert_eq!(v.sizeinbase(2), 255);
    assert_eq!(v.sizeinbase(16), 64);
    assert_eq!(Z::new().sizeinbase(2), 0);
}

#[test]
fn jacobi_wrapper() {
    // (1001/9907) = -1, a classic worked example
    let a = Z::from_u32(1001);
    let b = Z::from_u32(9907);
    assert_eq!(a.jacobi(&b), -1);
}
