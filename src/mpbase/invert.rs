//! Hensel inversion, exact single-limb modular reduction, and wrapped
//! multiplication modulo `B^n - 1`.
//!
//! [`binvert_limb`] seeds from a 128-entry table and lifts by Newton's
//! iteration; [`binvert`] extends the lift to an n-limb inverse modulo
//! `B^n` through Hensel division and wrapped products.

use super::bdiv::{basecase_bdiv_q, general_bdiv_q};
use super::{
    add, add_1_assign, add_n, mul, mul_low_n, mul_n, negate_assign, sub_1, sub_n, Limb,
    BDIV_Q_THRESHOLD, BINV_NEWTON_THRESHOLD, MULMOD_BNM1_THRESHOLD,
};

/// Seed table for [`binvert_limb`]: the inverse of every odd byte
/// modulo 256, indexed by `(n >> 1) & 0x7f`.
const BINVERT_LIMB_LUT: [u8; 128] = [
    0x01, 0xAB, 0xCD, 0xB7, 0x39, 0xA3, 0xC5, 0xEF, 0xF1, 0x1B, 0x3D, 0xA7, 0x29, 0x13, 0x35,
    0xDF, 0xE1, 0x8B, 0xAD, 0x97, 0x19, 0x83, 0xA5, 0xCF, 0xD1, 0xFB, 0x1D, 0x87, 0x09, 0xF3,
    0x15, 0xBF, 0xC1, 0x6B, 0x8D, 0x77, 0xF9, 0x63, 0x85, 0xAF, 0xB1, 0xDB, 0xFD, 0x67, 0xE9,
    0xD3, 0xF5, 0x9F, 0xA1, 0x4B, 0x6D, 0x57, 0xD9, 0x43, 0x65, 0x8F, 0x91, 0xBB, 0xDD, 0x47,
    0xC9, 0xB3, 0xD5, 0x7F, 0x81, 0x2B, 0x4D, 0x37, 0xB9, 0x23, 0x45, 0x6F, 0x71, 0x9B, 0xBD,
    0x27, 0xA9, 0x93, 0xB5, 0x5F, 0x61, 0x0B, 0x2D, 0x17, 0x99, 0x03, 0x25, 0x4F, 0x51, 0x7B,
    0x9D, 0x07, 0x89, 0x73, 0x95, 0x3F, 0x41, 0xEB, 0x0D, 0xF7, 0x79, 0xE3, 0x05, 0x2F, 0x31,
    0x5B, 0x7D, 0xE7, 0x69, 0x53, 0x75, 0x1F, 0x21, 0xCB, 0xED, 0xD7, 0x59, 0xC3, 0xE5, 0x0F,
    0x11, 0x3B, 0x5D, 0xC7, 0x49, 0x33, 0x55, 0xFF,
];

/// Multiplicative inverse of an odd limb modulo `B`:
/// `n * binvert_limb(n) ≡ 1 (mod B)`.
pub fn binvert_limb<W: Limb>(n: W) -> W {
    debug_assert!(n & W::ONE == W::ONE);

    let mut inv = W::from_u8(BINVERT_LIMB_LUT[(n >> 1).as_usize() & 0x7f]);
    // Each Newton step doubles the valid precision: 8 -> 16 -> 32 -> 64
    if W::BITS > 8 {
        inv = two_minus(inv, n);
    }
    if W::BITS > 16 {
        inv = two_minus(inv, n);
    }
    if W::BITS > 32 {
        inv = two_minus(inv, n);
    }

    debug_assert!(inv.wrapping_mul(n) == W::ONE);
    inv
}

// One Newton step: inv <- 2*inv - inv*inv*n
#[inline(always)]
fn two_minus<W: Limb>(inv: W, n: W) -> W {
    inv.wrapping_add(inv)
        .wrapping_sub(inv.wrapping_mul(inv).wrapping_mul(n))
}

/// Scratch limbs required by a wrapped product of `an`- and `bn`-limb
/// operands into an `rn`-limb residue.
pub fn mulmod_bnm1_size(rn: usize, an: usize, bn: usize) -> usize {
    let n = rn >> 1;
    rn + 4 + if an > n { if bn > n { rn } else { n } } else { 0 }
}

/// Next usable residue length for the wrapped product at or above `n`.
pub fn mulmod_bnm1_next_size(n: usize) -> usize {
    if n < MULMOD_BNM1_THRESHOLD {
        return n;
    }
    if n < 4 * (MULMOD_BNM1_THRESHOLD - 1) + 1 {
        return (n + 1) & 2usize.wrapping_neg();
    }
    if n < 8 * (MULMOD_BNM1_THRESHOLD - 1) + 1 {
        return (n + 3) & 4usize.wrapping_neg();
    }
    (n + 7) & 8usize.wrapping_neg()
}

/// Scratch limbs required by [`super::powm`] for an `n`-limb modulus.
pub fn binvert_powm_scratch_size(n: usize) -> usize {
    let itch_local = mulmod_bnm1_next_size(n);
    let itch_out = mulmod_bnm1_size(itch_local, n, (n + 1) >> 1);
    itch_local + itch_out
}

/// Basecase wrapped product: `r = a * b mod B^n - 1`.
pub fn basecase_mulmod_bnm1<W: Limb>(
    r_limbs: &mut [W],
    a_limbs: &[W],
    b_limbs: &[W],
    n: usize,
    scratch: &mut [W],
) {
    debug_assert!(n > 0);
    mul_n(scratch, a_limbs, b_limbs, n);
    let (lo, hi) = scratch.split_at(n);
    let cy = add_n(r_limbs, lo, &hi[..n], n);
    // If cy == 1 the result is at most B^n - 2, so no second carry
    add_1_assign(r_limbs, n, cy);
}

/// Basecase wrapped product: `r = a * b mod B^n + 1`, operands of
/// `n + 1` limbs.
pub fn bc_mulmod_bnp1<W: Limb>(
    r_limbs: &mut [W],
    a_limbs: &[W],
    b_limbs: &[W],
    n: usize,
    scratch: &mut [W],
) {
    debug_assert!(n > 0);
    mul_n(scratch, a_limbs, b_limbs, n + 1);
    debug_assert!(scratch[2 * n + 1] == W::ZERO);
    debug_assert!(scratch[2 * n] < W::MAX);
    let (lo, hi) = scratch.split_at(n);
    let cy = hi[n].wrapping_add(sub_n(r_limbs, lo, &hi[..n], n));
    r_limbs[n] = W::ZERO;
    add_1_assign(r_limbs, n + 1, cy);
}

/// Wrapped product `r = a * b mod B^rn - 1` for `bn <= an <= rn`.
pub fn mulmod_bnm1<W: Limb>(
    r_limbs: &mut [W],
    rn: usize,
    a_limbs: &[W],
    an: usize,
    b_limbs: &[W],
    bn: usize,
    scratch: &mut [W],
) {
    debug_assert!(0 < bn);
    debug_assert!(bn <= an);
    debug_assert!(an <= rn);

    if bn < rn {
        if an + bn <= rn {
            mul(r_limbs, a_limbs, an, b_limbs, bn);
        } else {
            mul(scratch, a_limbs, an, b_limbs, bn);
            let (lo, hi) = scratch.split_at(rn);
            let cy = add(r_limbs, lo, rn, &hi[..an + bn - rn], an + bn - rn);
            add_1_assign(r_limbs, rn, cy);
        }
    } else {
        basecase_mulmod_bnm1(r_limbs, a_limbs, b_limbs, rn, scratch);
    }
}

/// Multiplicative inverse modulo `B^n`: `r * u ≡ 1 (mod B^n)` for odd
/// `u`, by Hensel lifting with Newton iteration above the recursion
/// threshold. `scratch` needs [`binvert_powm_scratch_size`] limbs.
pub fn binvert<W: Limb>(r_limbs: &mut [W], u_limbs: &[W], n: usize, scratch: &mut [W]) {
    // Precision ladder from the target down to the basecase
    let mut sizes = Vec::new();
    let mut rn = n;
    while rn >= BINV_NEWTON_THRESHOLD {
        sizes.push(rn);
        rn = (rn + 1) >> 1;
    }

    // Basecase value of rn limbs via Hensel division of 1
    {
        let xp = &mut scratch[..rn];
        xp.fill(W::ZERO);
        xp[0] = W::ONE;
    }
    let di = binvert_limb(u_limbs[0]);
    if rn < BDIV_Q_THRESHOLD {
        basecase_bdiv_q(r_limbs, scratch, rn, u_limbs, rn, di.wrapping_neg());
    } else {
        general_bdiv_q(r_limbs, scratch, rn, u_limbs, rn, di.wrapping_neg());
    }
    negate_assign(r_limbs, rn);

    // Newton iterations up the ladder
    while rn < n {
        let newrn = sizes.pop().expect("precision ladder exhausted");

        // X <- U * R mod B^m - 1
        let m = mulmod_bnm1_next_size(newrn);
        {
            let (xp, tp) = scratch.split_at_mut(m);
            mulmod_bnm1(xp, m, u_limbs, newrn, &r_limbs[..rn], rn, tp);
        }
        // Recover the high limbs of the true product from the wrap
        {
            let len = rn - (m - newrn);
            let (lo, hi) = scratch.split_at_mut(m);
            sub_1(&mut hi[..len], &lo[..len], len, W::ONE);
        }

        // R <- R(X / B^rn)
        {
            let (lo, hi) = r_limbs.split_at_mut(rn);
            mul_low_n(hi, &lo[..newrn - rn], &scratch[rn..rn + (newrn - rn)], newrn - rn);
            negate_assign(hi, newrn - rn);
        }
        rn = newrn;
    }
}

/// Exact single-limb modular reduction: returns `h` such that
/// `h·B^k + a ≡ 0 (mod d)` cancellation holds, with `0 <= h <= d`.
/// Requires `d` odd; linear in `n`.
pub fn modexact_1_odd<W: Limb>(a: &[W], n: usize, d: W) -> W {
    debug_assert!(n >= 1);
    debug_assert!(d & W::ONE == W::ONE);

    let inverse = binvert_limb(d);

    let mut c = W::ZERO;
    let mut h = W::ZERO;

    for i in 0..n {
        let s = a[i];
        let x = s.wrapping_sub(c);
        let c1 = W::from_bool(x > s);
        let y = x.wrapping_sub(h);
        let c2 = W::from_bool(y > x);
        c = c1.wrapping_add(c2);

        let y = y.wrapping_mul(inverse);
        let (hh, _) = y.umul(d);
        h = hh;
    }

    h.wrapping_add(c)
}

/// Single-limb modulus of an `n`-limb numerator.
pub fn mod_1<W: Limb>(n_limbs: &[W], n: usize, d_limb: W) -> W {
    if n == 0 {
        return W::ZERO;
    }

    let norm = d_limb.leading_zeros();
    if norm != 0 {
        let d = d_limb << norm;

        let mut n1 = n_limbs[n - 1];
        let mut r = n1 >> (W::BITS - norm);

        for i in (0..n - 1).rev() {
            let n0 = n_limbs[i];
            let (_, rem) =
                W::udiv_qrnnd(r, (n1 << norm) | (n0 >> (W::BITS - norm)), d);
            r = rem;
            n1 = n0;
        }
        let (_, rem) = W::udiv_qrnnd(r, n1 << norm, d);
        return rem >> norm;
    }

    let mut i = n as isize - 1;
    let mut r = n_limbs[i as usize];

    if r >= d_limb {
        r = W::ZERO;
    } else {
        i -= 1;
    }

    while i >= 0 {
        let n0 = n_limbs[i as usize];
        let (_, rem) = W::udiv_qrnnd(r, n0, d_limb);
        r = rem;
        i -= 1;
    }

    r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binvert_limb_is_inverse() {
        for n in [1u64, 3, 5, 7, 0xdead_beef_0000_0001, u64::MAX] {
            assert_eq!(binvert_limb(n).wrapping_mul(n), 1);
        }
        for n in [1u8, 3, 0x7f, 0xff] {
            assert_eq!(binvert_limb(n).wrapping_mul(n), 1);
        }
    }

    #[test]
    fn binvert_vector_is_inverse() {
        let u = [0x1234_5678_9abc_def1u64, 0x0fed_cba9_8765_4321, 0x5555];
        let n = 3;
        let mut inv = vec![0u64; n];
        let mut scratch = vec![0u64; binvert_powm_scratch_size(n).max(2 * n)];
        binvert(&mut inv, &u, n, &mut scratch);

        let mut prod = vec![0u64; 2 * n];
        mul_n(&mut prod, &inv, &u, n);
        assert_eq!(&prod[..n], &[1, 0, 0]);
    }

    #[test]
    fn mod_1_agrees_with_division() {
        let n = [0xffff_ffff_ffff_fff0u64, 0x1234, 0x9999_9999];
        for d in [3u64, 10, 0x8000_0000_0000_0000, 0xffff_fff1] {
            let r = mod_1(&n, 3, d);
            let mut q = vec![0u64; 3];
            let r2 = super::super::div_qr_1(Some(&mut q), &n, 3, d);
            assert_eq!(r, r2);
        }
    }

    #[test]
    fn mulmod_wraps() {
        // (B^2 - 2) * 2 mod B^2 - 1 == B^2 - 3
        let a = [u64::MAX - 1, u64::MAX];
        let b = [2u64, 0];
        let mut r = [0u64; 2];
        let mut scratch = vec![0u64; mulmod_bnm1_size(2, 2, 2) + 4];
        basecase_mulmod_bnm1(&mut r, &a, &b, 2, &mut scratch);
        assert_eq!(r, [u64::MAX - 2, u64::MAX]);
    }
}
