//! Montgomery reduction (REDC).
//!
//! [`redc_1`] clears one limb per iteration with a single `addmul_1` of
//! `(u[0]·invm mod B) · m`; after `n` iterations the low half is zero and
//! the sum of the halves is `u / B^n mod m`, one conditional subtract away
//! from the canonical range. [`redc_2`] clears two limbs per step with a
//! two-word inverse; [`redc_n`] reduces in a single wrapped product and is
//! preferred above `REDC_1_TO_REDC_N_THRESHOLD`.

use super::div::div_qr;
use super::invert::{mulmod_bnm1, mulmod_bnm1_next_size, mulmod_bnm1_size};
use super::mul::{addmul_1, addmul_2};
use super::{add_n, add_n_assign, mul_low_n, sub_1_assign, sub_n, sub_n_assign, Limb};
use crate::word;

/// Converts `u` into Montgomery form: `r = u · B^n mod m`.
pub fn redcify<W: Limb>(r_limbs: &mut [W], u_limbs: &[W], un: usize, m_limbs: &[W], n: usize) {
    let mut scratch = vec![W::ZERO; un + n];
    let mut q_limbs = vec![W::ZERO; un + 1];

    scratch[n..n + un].copy_from_slice(&u_limbs[..un]);
    div_qr(Some(&mut q_limbs), &mut scratch, un + n, m_limbs, n);
    r_limbs[..n].copy_from_slice(&scratch[..n]);
}

/// Montgomery reduction with a single-word inverse `invm = -m⁻¹ mod B`.
/// `u` holds `2n` limbs and is destroyed. Returns the carry that a final
/// conditional subtraction must account for.
pub fn redc_1<W: Limb>(r_limbs: &mut [W], u_limbs: &mut [W], m_limbs: &[W], n: usize, invm: W) -> W {
    debug_assert!(n > 0);

    for j in 0..n {
        let q = u_limbs[j].wrapping_mul(invm);
        let cy = addmul_1(&mut u_limbs[j..], m_limbs, n, q);
        debug_assert!(u_limbs[j] == W::ZERO);
        u_limbs[j] = cy;
    }

    let (lo, hi) = u_limbs.split_at(n);
    add_n(r_limbs, &hi[..n], lo, n)
}

/// [`redc_1`] followed by the conditional subtraction into `[0, m)`.
pub fn redc_1_fix<W: Limb>(r_limbs: &mut [W], u_limbs: &mut [W], m_limbs: &[W], n: usize, invm: W) {
    let cy = redc_1(r_limbs, u_limbs, m_limbs, n, invm);
    if cy != W::ZERO {
        sub_n_assign(r_limbs, m_limbs, n);
    }
}

/// Montgomery reduction with a two-word inverse, clearing two limbs per
/// `addmul_2`.
pub fn redc_2<W: Limb>(
    r_limbs: &mut [W],
    u_limbs: &mut [W],
    m_limbs: &[W],
    n: usize,
    i_limbs: &[W],
) -> W {
    debug_assert!(n > 0);

    let mut ub = 0usize;

    if n & 1 != 0 {
        let q = u_limbs[0].wrapping_mul(i_limbs[0]);
        let cy = addmul_1(u_limbs, m_limbs, n, q);
        u_limbs[0] = cy;
        ub += 1;
    }

    let mut j = n as isize - 2;
    while j >= 0 {
        let q = word::umul2_lo(
            i_limbs[1],
            i_limbs[0],
            u_limbs[ub + 1],
            u_limbs[ub],
        );
        let q = [q.1, q.0];
        let upn = u_limbs[ub + n]; // addmul_2 overwrites this
        let cy = addmul_2(&mut u_limbs[ub..], m_limbs, n, &q);
        u_limbs[ub + 1] = cy;
        u_limbs[ub] = u_limbs[ub + n];
        u_limbs[ub + n] = upn;
        ub += 2;
        j -= 2;
    }

    let (lo, hi) = u_limbs.split_at(ub);
    add_n(r_limbs, &hi[..n], &lo[ub - n..], n)
}

/// Full-precision Montgomery reduction with an `n`-word inverse of the
/// modulus, used above the REDC threshold.
pub fn redc_n<W: Limb>(r_limbs: &mut [W], u_limbs: &[W], m_limbs: &[W], n: usize, i_limbs: &[W]) {
    debug_assert!(n > 8);

    let rn = mulmod_bnm1_next_size(n);

    let mut scratch = vec![W::ZERO; n + rn + mulmod_bnm1_size(rn, n, n) + 2 * n];

    // Low half of U * I
    {
        let (xp, _) = scratch.split_at_mut(n);
        mul_low_n(xp, u_limbs, i_limbs, n);
    }

    // Wrapped product with the modulus
    {
        let (xp, rest) = scratch.split_at_mut(n);
        let (yp, tp) = rest.split_at_mut(rn + (2 * n - rn));
        mulmod_bnm1(yp, rn, xp, n, m_limbs, n, tp);
    }

    debug_assert!(2 * n > rn);

    // Correct the wrap-around
    {
        let yp = &mut scratch[n..];
        let cy;
        {
            let (lo, hi) = yp.split_at_mut(rn);
            cy = sub_n(&mut hi[..2 * n - rn], &lo[..2 * n - rn], &u_limbs[..2 * n - rn], 2 * n - rn);
        }
        sub_1_assign(&mut yp[2 * n - rn..], rn, cy);
    }

    let yp = &scratch[n..];
    let cy = sub_n(r_limbs, &u_limbs[n..], &yp[n..2 * n], n);
    if cy != W::ZERO {
        add_n_assign(r_limbs, m_limbs, n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpbase::{binvert_limb, mul_n};

    #[test]
    fn redc_1_round_trip() {
        // m odd, u = a * B^n mod m: redc_1 recovers a
        let m = [0xffff_ffff_ffff_ff43u64, 0x7fff_ffff_ffff_ffff];
        let n = 2;
        let a = [0x1234_5678u64, 0x9abc];
        let invm = binvert_limb(m[0]).wrapping_neg();

        let mut mont = vec![0u64; n];
        redcify(&mut mont, &a, n, &m, n);

        // u = mont * 1 (pad to 2n), then reduce back out of Montgomery form
        let mut u = vec![0u64; 2 * n];
        u[..n].copy_from_slice(&mont);
        let mut r = vec![0u64; n];
        redc_1_fix(&mut r, &mut u, &m, n, invm);
        assert_eq!(r, a);
    }

    #[test]
    fn redc_1_matches_mont_multiply() {
        let m = [0x1_0000_0001u64 | 1, 0x8000_0000_0000_0001];
        let n = 2;
        let invm = binvert_limb(m[0]).wrapping_neg();

        let a = [5u64, 0];
        let b = [7u64, 0];
        let mut am = vec![0u64; n];
        let mut bm = vec![0u64; n];
        redcify(&mut am, &a, n, &m, n);
        redcify(&mut bm, &b, n, &m, n);

        // Montgomery product then conversion out equals 35
        let mut t = vec![0u64; 2 * n];
        mul_n(&mut t, &am, &bm, n);
        let mut abm = vec![0u64; n];
        redc_1_fix(&mut abm, &mut t, &m, n, invm);

        let mut u = vec![0u64; 2 * n];
        u[..n].copy_from_slice(&abm);
        let mut ab = vec![0u64; n];
        redc_1_fix(&mut ab, &mut u, &m, n, invm);
        assert_eq!(ab, [35, 0]);
    }
}
