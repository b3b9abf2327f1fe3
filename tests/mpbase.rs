use num_bigint::BigUint;
use phantom::mpbase;
use proptest::prelude::*;

fn to_biguint(limbs: &[u64]) -> BigUint {
    let mut bytes = Vec::with_capacity(limbs.len() * 8);
    for &l in limbs {
        bytes.extend_from_slice(&l.to_le_bytes());
    }
    BigUint::from_bytes_le(&bytes)
}

fn from_biguint(v: &BigUint, n: usize) -> Vec<u64> {
    let mut bytes = v.to_bytes_le();
    bytes.resize(n * 8, 0);
    bytes
        .chunks(8)
        .map(|c| u64::from_le_bytes(c.try_into().unwrap()))
        .collect()
}

#[test]
fn normalized_size_bounds() {
    let a = [0u64, 5, 0, 0];
    let n = mpbase::normalized_size(&a, 4);
    assert!(n <= 4);
    assert_eq!(n, 2);
    assert_ne!(a[n - 1], 0);
    assert_eq!(mpbase::normalized_size(&[0u64; 3], 3), 0);
}

proptest! {
    #[test]
    fn tdiv_identity(n in proptest::collection::vec(any::<u64>(), 3..12),
                     d in proptest::collection::vec(any::<u64>(), 1..6)) {
        let nn = mpbase::normalized_size(&n, n.len());
        let dn = mpbase::normalized_size(&d, d.len());
        prop_assume!(dn > 0 && nn >= dn);

        let mut q = vec![0u64; nn - dn + 1];
        let mut r = vec![0u64; dn];
        mpbase::tdiv_qr(&mut q, &mut r, &n, nn, &d, dn);

        let nb = to_biguint(&n[..nn]);
        let db = to_biguint(&d[..dn]);
        prop_assert_eq!(to_biguint(&q), &nb / &db);
        prop_assert_eq!(to_biguint(&r), &nb % &db);
    }

    #[test]
    fn mul_matches_reference(a in proptest::collection::vec(any::<u64>(), 1..40),
                             b in proptest::collection::vec(any::<u64>(), 1..40)) {
        let an = mpbase::normalized_size(&a, a.len());
        let bn = mpbase::normalized_size(&b, b.len());
        prop_assume!(an > 0 && bn > 0);

        let mut r = vec![0u64; an + bn];
        if an >= bn {
            mpbase::mul(&mut r, &a, an, &b, bn);
        } else {
            mpbase::mul(&mut r, &b, bn, &a, an);
        }
        prop_assert_eq!(to_biguint(&r), to_biguint(&a[..an]) * to_biguint(&b[..bn]));
    }

    #[test]
    fn powm_matches_reference(b in 2u64..,
                              e in 2u64..,
                              m in any::<u64>()) {
        let m = m | 1;
        prop_assume!(m > 3);

        let mut r = [0u64];
        let mut tp = vec![0u64; mpbase::binvert_powm_scratch_size(1).max(2) + 2];
        mpbase::powm(&mut r, &[b], 1, &[e], 1, &[m], 1, &mut tp);

        let expect = BigUint::from(b).modpow(&BigUint::from(e), &BigUint::from(m));
        prop_assert_eq!(to_biguint(&r), expect);
    }

    #[test]
    fn binvert_inverts(u in proptest::collection::vec(any::<u64>(), 1..6)) {
        let mut u = u;
        u[0] |= 1;
        let n = u.len();

        let mut inv = vec![0u64; n];
        let mut scratch = vec![0u64; mpbase::binvert_powm_scratch_size(n).max(2 * n) + 2];
        mpbase::binvert(&mut inv, &u, n, &mut scratch);

        let mut prod = vec![0u64; 2 * n];
        mpbase::mul_n(&mut prod, &inv, &u, n);
        prop_assert_eq!(prod[0], 1);
        prop_assert!(prod[1..n].iter().all(|&x| x == 0));
    }

    #[test]
    fn jacobi_in_range(a in proptest::collection::vec(any::<u64>(), 2..5),
                       b in proptest::collection::vec(any::<u64>(), 2..5)) {
        prop_assume!(a.len() == b.len());
        let mut b = b;
        b[0] |= 1;
        let n = a.len();
        prop_assume!(a[n - 1] != 0 || b[n - 1] != 0);
        let mut aa = a.clone();
        let mut bb = b.clone();

        let bits = mpbase::jacobi_init(aa[0], bb[0], 0);
        let s = mpbase::jacobi_n(&mut aa, &mut bb, n, bits);
        prop_assert!(s == -1 || s == 0 || s == 1);
    }
}

// The Jacobi symbol against a straightforward binary-reciprocity
// reference on word-sized operands
#[test]
fn jacobi_matches_naive_reference() {
    fn jacobi_ref(mut a: u128, mut b: u128) -> i32 {
        let mut result = 1i32;
        a %= b;
        while a != 0 {
            while a & 1 == 0 {
                a >>= 1;
                if b % 8 == 3 || b % 8 == 5 {
                    result = -result;
                }
            }
            std::mem::swap(&mut a, &mut b);
            if a % 4 == 3 && b % 4 == 3 {
                result = -result;
            }
            a %= b;
        }
        if b == 1 {
            result
        } else {
            0
        }
    }

    let mut x = 0x0123_4567_89ab_cdefu128;
    let mut y = 0x7fff_ffff_ffff_ffffu128 | 1;
    for _ in 0..200 {
        let a = x % y;
        let mut al = [a as u64, (a >> 64) as u64];
        let mut bl = [y as u64, (y >> 64) as u64];
        let bits = phantom::mpbase::jacobi_init(al[0], bl[0], 0);
        let got = phantom::mpbase::jacobi_n(&mut al, &mut bl, 2, bits);
        assert_eq!(got, jacobi_ref(a, y), "({a}/{y})");

        x = x.wrapping_mul(0x9e37_79b9_7f4a_7c15).wrapping_add(0x1234_5678);
        y = (y.wrapping_mul(0x2545_f491_4f6c_dd1d).wrapping_add(77)) | 1;
        if y < 5 {
            y = 0xffff_ffff_0000_0001 | 1;
        }
    }
}

// The dispatch thresholds are behavioural contract: every path must
// agree with the reference product
#[test]
fn multiplication_paths_agree() {
    for &n in &[8usize, 35, 60, 128, 400, 1050] {
        let a: Vec<u64> = (0..n)
            .map(|i| (i as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15) | 1)
            .collect();
        let b: Vec<u64> = (0..n)
            .map(|i| (i as u64).wrapping_mul(0x2545_f491_4f6c_dd1d) ^ 0xffff)
            .collect();
        let mut r = vec![0u64; 2 * n];
        mpbase::mul_n(&mut r, &a, &b, n);
        assert_eq!(
            to_biguint(&r),
            to_biguint(&a) * to_biguint(&b),
            "length {n}"
        );

        let mut s = vec![0u64; 2 * n];
        mpbase::sqr(&mut s, &a, n);
        assert_eq!(to_biguint(&s), to_biguint(&a) * to_biguint(&a));
    }
}

// The same kernels run at every limb width; spot-check a narrow one
#[test]
fn narrow_limb_widths() {
    // 16-bit limbs: (2^16 + 1)^2 = 2^32 + 2^17 + 1
    let a: [u16; 2] = [1, 1];
    let mut r = [0u16; 4];
    mpbase::mul_n(&mut r, &a, &a, 2);
    assert_eq!(r, [1, 2, 1, 0]);

    // 8-bit limbs: division identity
    let n: [u8; 4] = [0x12, 0x34, 0x56, 0x78];
    let d: [u8; 2] = [0x03, 0x01];
    let mut q = [0u8; 3];
    let mut rem = [0u8; 2];
    mpbase::tdiv_qr(&mut q, &mut rem, &n, 4, &d, 2);

    let nv = 0x7856_3412u64;
    let dv = 0x0103u64;
    assert_eq!(q[0] as u64 | (q[1] as u64) << 8 | (q[2] as u64) << 16, nv / dv);
    assert_eq!(rem[0] as u64 | (rem[1] as u64) << 8, nv % dv);

    // 32-bit limbs: powm sanity
    let mut r32 = [0u32];
    let mut tp = vec![0u32; mpbase::binvert_powm_scratch_size(1).max(2) + 2];
    mpbase::powm(&mut r32, &[3u32], 1, &[7u32], 1, &[1009u32], 1, &mut tp);
    assert_eq!(r32[0], 3u64.pow(7) as u32 % 1009);
}

#[test]
fn powm_p192_spec_values() {
    // m = 2^192 - 2^64 - 1
    let m = [
        0xffff_ffff_ffff_ffffu64,
        0xffff_ffff_ffff_fffe,
        0xffff_ffff_ffff_ffff,
    ];
    let mut tp = vec![0u64; mpbase::binvert_powm_scratch_size(3).max(6) + 2];

    let mut r = [0u64; 3];
    mpbase::powm(&mut r, &[2], 1, &[64], 1, &m, 3, &mut tp);
    assert_eq!(r, [0, 1, 0]); // 0x10000000000000000

    let mut r = [0u64; 3];
    mpbase::powm(&mut r, &[2], 1, &[256], 1, &m, 3, &mut tp);
    assert_eq!(r, [0, 1, 1]); // 0x100000000000000010000000000000000
}

proptest! {
    #[test]
    fn from_biguint_round_trip(v in proptest::collection::vec(any::<u64>(), 1..8)) {
        let b = to_biguint(&v);
        let back = from_biguint(&b, v.len());
        prop_assert_eq!(back, v);
    }
}
