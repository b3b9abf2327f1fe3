//! Modular exponentiation with a windowed sliding reduction.
//!
//! `r = b^e mod m` for odd `m` and `e > 1`. The base is taken into
//! Montgomery form, odd powers up to the window width are tabulated, and
//! a left-to-right sliding window walks the exponent: squarings between
//! windows, one table multiply per non-zero window. The multiply, square
//! and reduce steps are chosen once from the operand size before the
//! loop and dispatched through a small kernel enum.

use super::invert::{binvert, binvert_limb};
use super::mul::{mul_gradeschool, mul_low_n, mul_n, sqr, sqr_low_n};
use super::redc::{redc_1_fix, redc_n, redcify};
use super::{cmp, getbits, sub_n_assign, Limb, MUL_TOOM22_THRESHOLD, REDC_1_TO_REDC_N_THRESHOLD};

/// Bit length of a normalised limb vector (base-2 size).
fn sizeinbase_2<W: Limb>(a: &[W], n: usize) -> usize {
    debug_assert!(n > 0);
    debug_assert!(a[n - 1] != W::ZERO);
    n * W::BITS as usize - a[n - 1].leading_zeros() as usize
}

/// Window width for an exponent of `eb` bits; grows roughly as
/// log2 of the exponent length.
fn win_size(eb: usize) -> u32 {
    const X: [usize; 11] = [1, 7, 25, 81, 241, 673, 1793, 4609, 11521, 28161, usize::MAX];
    debug_assert!(eb > 1);
    let mut k = 1;
    while eb > X[k] {
        k += 1;
    }
    k as u32
}

#[inline]
fn getbit<W: Limb>(p: &[W], bi: usize) -> u32 {
    ((p[(bi - 1) / W::BITS as usize] >> ((bi - 1) as u32 % W::BITS)) & W::ONE).as_u8() as u32
}

/// Multiply/square/reduce kernel selection, fixed before the inner loop.
#[derive(Clone, Copy, PartialEq, Eq)]
enum RedcKernel {
    /// Single-limb operands: wide word ops and a one-step reduction.
    Word,
    /// Schoolbook multiply with single-word REDC.
    Gradeschool,
    /// Full multiply dispatch with single-word REDC.
    Full1,
    /// Full multiply dispatch with n-word REDC.
    FullN,
}

impl RedcKernel {
    fn select(n: usize) -> Self {
        if n == 1 {
            RedcKernel::Word
        } else if n < MUL_TOOM22_THRESHOLD {
            RedcKernel::Gradeschool
        } else if n < REDC_1_TO_REDC_N_THRESHOLD {
            RedcKernel::Full1
        } else {
            RedcKernel::FullN
        }
    }

    fn mul<W: Limb>(self, r: &mut [W], a: &[W], b: &[W], n: usize) {
        match self {
            RedcKernel::Word => {
                let (h, l) = a[0].umul(b[0]);
                r[0] = l;
                r[1] = h;
            }
            RedcKernel::Gradeschool => {
                mul_gradeschool(r, a, n, b, n);
            }
            _ => mul_n(r, a, b, n),
        }
    }

    fn sqr<W: Limb>(self, r: &mut [W], a: &[W], n: usize) {
        match self {
            RedcKernel::Word => {
                let (h, l) = a[0].umul(a[0]);
                r[0] = l;
                r[1] = h;
            }
            _ => sqr(r, a, n),
        }
    }

    fn reduce<W: Limb>(self, r: &mut [W], t: &mut [W], m: &[W], n: usize, inv: &[W]) {
        match self {
            RedcKernel::Word => {
                r[0] = redc_word(t, m[0], inv[0]);
            }
            RedcKernel::Gradeschool | RedcKernel::Full1 => redc_1_fix(r, t, m, n, inv[0]),
            RedcKernel::FullN => redc_n(r, t, m, n, inv),
        }
    }
}

/// One-word Montgomery reduction of a two-word product.
fn redc_word<W: Limb>(t: &[W], m: W, invm: W) -> W {
    let u0 = t[0];
    let (mut p1, _p0) = m.umul(u0.wrapping_mul(invm));
    p1 = p1.wrapping_add(W::from_bool(u0 != W::ZERO));
    let mut r0 = t[1].wrapping_add(p1);
    if p1 > r0 {
        r0 = r0.wrapping_sub(m);
    }
    r0
}

/// Modular exponentiation, `r = b^e mod m`.
///
/// `m` must be odd and `e > 1`. `tp` provides scratch of at least
/// `max(binvert_powm_scratch_size(n), 2n)` limbs.
pub fn powm<W: Limb>(
    r_limbs: &mut [W],
    b_limbs: &[W],
    bn: usize,
    ep: &[W],
    en: usize,
    mp: &[W],
    n: usize,
    tp: &mut [W],
) {
    debug_assert!(en > 1 || (en == 1 && ep[0] > W::ONE));
    debug_assert!(n >= 1 && mp[0] & W::ONE != W::ZERO);

    let mut ebi = sizeinbase_2(ep, en);
    let windowsize = win_size(ebi);
    let kernel = RedcKernel::select(n);

    // Montgomery inverse of the modulus
    let mip: Vec<W> = if n < REDC_1_TO_REDC_N_THRESHOLD {
        vec![binvert_limb(mp[0]).wrapping_neg()]
    } else {
        let mut v = vec![W::ZERO; n];
        binvert(&mut v, mp, n, tp);
        v
    };

    // Table of odd powers in Montgomery form
    let table = 1usize << (windowsize - 1);
    let mut pp = vec![W::ZERO; n * table];

    redcify(&mut pp, b_limbs, bn, mp, n);

    // b^2 in Montgomery form, kept in r_limbs during table fill
    kernel.sqr(tp, &pp[..n], n);
    kernel.reduce(r_limbs, tp, mp, n, &mip);

    for i in 1..table {
        let (prev, this) = pp.split_at_mut(i * n);
        let prev = &prev[(i - 1) * n..];
        kernel.mul(tp, prev, &r_limbs[..n], n);
        kernel.reduce(&mut this[..n], tp, mp, n, &mip);
    }

    // First window: guaranteed to have its low bit set
    let mut expbits = getbits(ep, ebi as u32, windowsize).as_usize();
    if ebi < windowsize as usize {
        ebi = 0;
    } else {
        ebi -= windowsize as usize;
    }

    let cnt = expbits.trailing_zeros() as usize;
    ebi += cnt;
    expbits >>= cnt;

    r_limbs[..n].copy_from_slice(&pp[n * (expbits >> 1)..n * (expbits >> 1) + n]);

    // Sliding-window loop: square between windows, multiply per window
    'outer: while ebi != 0 {
        while getbit(ep, ebi) == 0 {
            kernel.sqr(tp, &r_limbs[..n], n);
            kernel.reduce(r_limbs, tp, mp, n, &mip);
            ebi -= 1;
            if ebi == 0 {
                break 'outer;
            }
        }

        // Extract the largest odd window of at most windowsize bits
        expbits = getbits(ep, ebi as u32, windowsize).as_usize();
        let mut this_windowsize = windowsize as usize;
        if ebi < windowsize as usize {
            this_windowsize -= windowsize as usize - ebi;
            ebi = 0;
        } else {
            ebi -= windowsize as usize;
        }

        let cnt = expbits.trailing_zeros() as usize;
        this_windowsize -= cnt;
        ebi += cnt;
        expbits >>= cnt;

        for _ in 0..this_windowsize {
            kernel.sqr(tp, &r_limbs[..n], n);
            kernel.reduce(r_limbs, tp, mp, n, &mip);
        }

        kernel.mul(tp, &r_limbs[..n], &pp[n * (expbits >> 1)..n * (expbits >> 1) + n], n);
        kernel.reduce(r_limbs, tp, mp, n, &mip);
    }

    // Out of Montgomery form and into [0, m)
    tp[..n].copy_from_slice(&r_limbs[..n]);
    tp[n..2 * n].fill(W::ZERO);
    if n < REDC_1_TO_REDC_N_THRESHOLD {
        redc_1_fix(r_limbs, tp, mp, n, mip[0]);
    } else {
        let t = tp[..2 * n].to_vec();
        redc_n(r_limbs, &t, mp, n, &mip);
    }

    if cmp(r_limbs, mp, n) >= 0 {
        sub_n_assign(r_limbs, mp, n);
    }
}

/// Exponentiation retaining only the least significant `n` limbs; no
/// modular reduction beyond the implicit `mod B^n`.
///
/// `tmp` provides `n` limbs of scratch.
pub fn pow_low<W: Limb>(
    out: &mut [W],
    base: &[W],
    exp: &[W],
    exp_n: usize,
    n: usize,
    tmp: &mut [W],
) {
    debug_assert!(exp_n > 1 || (exp_n == 1 && exp[0] > W::ONE));

    let mut ebi = sizeinbase_2(exp, exp_n);
    let windowsize = win_size(ebi);
    debug_assert!((windowsize as usize) < ebi);

    let table = 1usize << (windowsize - 1);
    let mut pp = vec![W::ZERO; n * table];

    pp[..n].copy_from_slice(&base[..n]);

    // base^2 in tmp
    sqr_low_n(tmp, base, n);

    for i in 1..table {
        let (prev, this) = pp.split_at_mut(i * n);
        let prev = &prev[(i - 1) * n..];
        mul_low_n(&mut this[..n], prev, &tmp[..n], n);
    }

    let mut expbits = getbits(exp, ebi as u32, windowsize).as_usize();
    let cnt = expbits.trailing_zeros() as usize;
    ebi -= windowsize as usize;
    ebi += cnt;
    expbits >>= cnt;

    out[..n].copy_from_slice(&pp[n * (expbits >> 1)..n * (expbits >> 1) + n]);

    'outer: while ebi != 0 {
        while getbit(exp, ebi) == 0 {
            sqr_low_n(tmp, &out[..n], n);
            out[..n].copy_from_slice(&tmp[..n]);
            ebi -= 1;
            if ebi == 0 {
                break 'outer;
            }
        }

        expbits = getbits(exp, ebi as u32, windowsize).as_usize();
        let mut this_windowsize = windowsize as usize;
        if ebi < windowsize as usize {
            this_windowsize -= windowsize as usize - ebi;
            ebi = 0;
        } else {
            ebi -= windowsize as usize;
        }

        let cnt = expbits.trailing_zeros() as usize;
        this_windowsize -= cnt;
        ebi += cnt;
        expbits >>= cnt;

        // Pairs of squarings
        while this_windowsize > 1 {
            sqr_low_n(tmp, &out[..n], n);
            sqr_low_n(out, &tmp[..n], n);
            this_windowsize -= 2;
        }

        if this_windowsize != 0 {
            sqr_low_n(tmp, &out[..n], n);
        } else {
            tmp[..n].copy_from_slice(&out[..n]);
        }

        mul_low_n(out, &tmp[..n], &pp[n * (expbits >> 1)..n * (expbits >> 1) + n], n);
    }
}

#[cfg(test)]
mod tests {
    use super::super::binvert_powm_scratch_size;
    use super::*;

    fn powm_u64(b: &[u64], e: &[u64], m: &[u64]) -> Vec<u64> {
        let n = m.len();
        let mut r = vec![0u64; n];
        let mut tp = vec![0u64; binvert_powm_scratch_size(n).max(2 * n) + 2];
        powm(&mut r, b, b.len(), e, e.len(), m, n, &mut tp);
        r
    }

    #[test]
    fn small_powers() {
        // 3^5 mod 257 = 243
        assert_eq!(powm_u64(&[3], &[5], &[257]), [243]);
        // 2^10 mod 1000003 = 1024
        assert_eq!(powm_u64(&[2], &[10], &[1000003]), [1024]);
    }

    #[test]
    fn p192_spec_vectors() {
        // m = 2^192 - 2^64 - 1
        let m = [
            0xffff_ffff_ffff_ffffu64,
            0xffff_ffff_ffff_fffe,
            0xffff_ffff_ffff_ffff,
        ];
        // 2^64 mod m = 0x10000000000000000
        let r = powm_u64(&[2], &[64], &m);
        assert_eq!(r, [0, 1, 0]);
        // 2^192 = m + 2^64 + 1, so 2^192 mod m = 0x10000000000000001
        let r = powm_u64(&[2], &[192], &m);
        assert_eq!(r, [1, 1, 0]);
        // 2^256 mod m = 0x100000000000000010000000000000000
        let r = powm_u64(&[2], &[256], &m);
        assert_eq!(r, [0, 1, 1]);
    }

    #[test]
    fn fermat_little() {
        // a^(p-1) = 1 mod p for prime p = 2^61 - 1
        let p = [(1u64 << 61) - 1];
        let e = [(1u64 << 61) - 2];
        for a in [2u64, 3, 0x1234_5678] {
            assert_eq!(powm_u64(&[a], &e, &p), [1]);
        }
    }
}
