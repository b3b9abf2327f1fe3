//! Schoolbook multiplication kernels and the size dispatcher.
//!
//! `mul_1`/`addmul_1`/`submul_1` are the inner loops everything else is
//! built from; `mul`, `mul_n` and `sqr` dispatch on operand length to the
//! schoolbook, Toom-Cook or FFT routines.

use super::{
    fft, toom, Limb, MUL_FFT_THRESHOLD, MUL_TOOM22_THRESHOLD, MUL_TOOM33_THRESHOLD,
    SQR_FFT_THRESHOLD, SQR_TOOM2_THRESHOLD, SQR_TOOM3_THRESHOLD,
};

/// Multiplies `a` by the single word `v`, writing the low `n` product
/// limbs to `r`. Returns the high carry word.
pub fn mul_1<W: Limb>(r: &mut [W], a: &[W], n: usize, v: W) -> W {
    let mut cc = W::ZERO;
    for i in 0..n {
        let (h, mut l) = a[i].umul(v);
        l = l.wrapping_add(cc);
        cc = h.wrapping_add(W::from_bool(l < cc));
        r[i] = l;
    }
    cc
}

/// In-place variant of [`mul_1`], `r = r * v` limb-wise.
pub fn mul_1_assign<W: Limb>(r: &mut [W], n: usize, v: W) -> W {
    let mut cc = W::ZERO;
    for i in 0..n {
        let (h, mut l) = r[i].umul(v);
        l = l.wrapping_add(cc);
        cc = h.wrapping_add(W::from_bool(l < cc));
        r[i] = l;
    }
    cc
}

/// Multiply-accumulate: `acc += a * v` over `n` limbs.
/// Returns the high carry word.
pub fn addmul_1<W: Limb>(acc: &mut [W], a: &[W], n: usize, v: W) -> W {
    let mut cc = W::ZERO;
    for i in 0..n {
        let (h, mut l) = a[i].umul(v);
        l = l.wrapping_add(cc);
        cc = h.wrapping_add(W::from_bool(l < cc));
        let t = acc[i].wrapping_add(l);
        cc = cc.wrapping_add(W::from_bool(t < acc[i]));
        acc[i] = t;
    }
    cc
}

/// Multiply-accumulate by a two-word multiplier.
/// `acc[n]` receives the first row's carry; returns the second row's.
pub fn addmul_2<W: Limb>(acc: &mut [W], a: &[W], n: usize, v: &[W; 2]) -> W {
    acc[n] = addmul_1(acc, a, n, v[0]);
    addmul_1(&mut acc[1..], a, n, v[1])
}

/// Multiply-subtract: `acc -= a * v` over `n` limbs.
/// Returns the high borrow word.
pub fn submul_1<W: Limb>(acc: &mut [W], a: &[W], n: usize, v: W) -> W {
    let mut cc = W::ZERO;
    for i in 0..n {
        let (h, mut l) = a[i].umul(v);
        l = l.wrapping_add(cc);
        cc = h.wrapping_add(W::from_bool(l < cc));
        let t = acc[i].wrapping_sub(l);
        cc = cc.wrapping_add(W::from_bool(t > acc[i]));
        acc[i] = t;
    }
    cc
}

/// Schoolbook multiplication of `a` (`n1` limbs) by `b` (`n2` limbs)
/// into `r` (`n1 + n2` limbs). Returns the most significant limb.
pub fn mul_gradeschool<W: Limb>(r: &mut [W], a: &[W], n1: usize, b: &[W], n2: usize) -> W {
    r[n1] = mul_1(r, a, n1, b[0]);
    for j in 1..n2 {
        r[n1 + j] = addmul_1(&mut r[j..], a, n1, b[j]);
    }
    r[n1 + n2 - 1]
}

/// Schoolbook squaring of `a` (`n` limbs) into `r` (`2n` limbs).
pub fn sqr_gradeschool<W: Limb>(r: &mut [W], a: &[W], n: usize) {
    if n == 1 {
        let (h, l) = a[0].umul(a[0]);
        r[0] = l;
        r[1] = h;
    } else {
        mul_gradeschool(r, a, n, a, n);
    }
}

/// Squares `a` (`n` limbs) into `r` (`2n` limbs), dispatching on length.
pub fn sqr<W: Limb>(r: &mut [W], a: &[W], n: usize) {
    if n < SQR_TOOM2_THRESHOLD {
        sqr_gradeschool(r, a, n);
    } else if n < SQR_TOOM3_THRESHOLD {
        let mut scratch = vec![W::ZERO; toom::get_toom22_scratch_size::<W>(2 * n)];
        toom::sqr_toom2(r, a, n, &mut scratch);
    } else if n < SQR_FFT_THRESHOLD {
        let mut scratch = vec![W::ZERO; toom::get_toom33_scratch_size::<W>(2 * n)];
        toom::sqr_toom3(r, a, n, &mut scratch);
    } else {
        fft::mul_fft(r, a, n, a, n);
    }
}

/// Multiplies `a` (`n1` limbs) by `b` (`n2` limbs) into `r`
/// (`n1 + n2` limbs), dispatching on the shorter length. Heavily
/// unbalanced operands are reduced to near-balanced block products,
/// since the Toom splits require the shorter operand to reach past the
/// longer one's split point.
///
/// Precondition: `n1 >= n2 > 0`.
pub fn mul<W: Limb>(r: &mut [W], a: &[W], n1: usize, b: &[W], n2: usize) -> W {
    debug_assert!(n1 >= n2);

    if n1 == n2 {
        mul_n(r, a, b, n1);
        return r[2 * n1 - 1];
    }
    if n2 < MUL_TOOM22_THRESHOLD {
        return mul_gradeschool(r, a, n1, b, n2);
    }

    if 4 * n1 < 5 * n2 {
        // Near-balanced
        if n2 < MUL_TOOM33_THRESHOLD {
            let mut scratch = vec![W::ZERO; toom::get_toom22_scratch_size::<W>(n1 + n2)];
            toom::mul_toom22(r, a, n1, b, n2, &mut scratch);
        } else if n2 < MUL_FFT_THRESHOLD {
            let mut scratch = vec![W::ZERO; toom::get_toom33_scratch_size::<W>(n1 + n2)];
            toom::mul_toom33(r, a, n1, b, n2, &mut scratch);
        } else {
            fft::mul_fft(r, a, n1, b, n2);
        }
    } else if n2 + 2 <= n1 && n1 + 6 <= 3 * n2 {
        let mut scratch = vec![W::ZERO; toom::get_toom33_scratch_size::<W>(n1 + n2)];
        toom::mul_toom32(r, a, n1, b, n2, &mut scratch);
    } else {
        // Accumulate b against a in shorter-operand-sized blocks
        let mut tmp = vec![W::ZERO; 2 * n2];
        mul_n(&mut tmp, &a[..n2], b, n2);
        r[..2 * n2].copy_from_slice(&tmp);

        let mut ofs = n2;
        while ofs < n1 {
            let chunk = (n1 - ofs).min(n2);
            let mut t2 = vec![W::ZERO; chunk + n2];
            if chunk >= n2 {
                mul(&mut t2, &a[ofs..], chunk, b, n2);
            } else {
                mul(&mut t2, b, n2, &a[ofs..], chunk);
            }

            // The low n2 limbs overlap the previous block's high half
            let cy = super::add_n_assign(&mut r[ofs..], &t2[..n2], n2);
            r[ofs + n2..ofs + chunk + n2].copy_from_slice(&t2[n2..]);
            super::add_1_assign(&mut r[ofs + n2..], chunk, cy);

            ofs += chunk;
        }
    }

    r[n1 + n2 - 1]
}

/// Multiplies two equal-length operands into `r` (`2n` limbs).
pub fn mul_n<W: Limb>(r: &mut [W], a: &[W], b: &[W], n: usize) {
    debug_assert!(n >= 1);

    if n < MUL_TOOM22_THRESHOLD {
        mul_gradeschool(r, a, n, b, n);
    } else if n < MUL_TOOM33_THRESHOLD {
        let mut scratch = vec![W::ZERO; toom::get_toom22_scratch_size::<W>(2 * n)];
        toom::mul_toom22(r, a, n, b, n, &mut scratch);
    } else if n < MUL_FFT_THRESHOLD {
        let mut scratch = vec![W::ZERO; toom::get_toom33_scratch_size::<W>(2 * n)];
        toom::mul_toom33(r, a, n, b, n, &mut scratch);
    } else {
        fft::mul_fft(r, a, n, b, n);
    }
}

/// Multiplies two equal-length operands, keeping only the low `n` limbs.
pub fn mul_low_n<W: Limb>(r: &mut [W], a: &[W], b: &[W], n: usize) {
    let mut tmp = vec![W::ZERO; 2 * n];
    mul(&mut tmp, a, n, b, n);
    r[..n].copy_from_slice(&tmp[..n]);
}

/// Squares an operand, keeping only the low `n` limbs.
pub fn sqr_low_n<W: Limb>(r: &mut [W], a: &[W], n: usize) {
    let mut tmp = vec![W::ZERO; 2 * n];
    sqr(&mut tmp, a, n);
    r[..n].copy_from_slice(&tmp[..n]);
}

/// Squares `a` when it is known that `a == b`, otherwise multiplies.
/// Mirrors the self-multiplication fast path of the dispatcher.
pub fn mul_maybe_sqr<W: Limb>(r: &mut [W], a: &[W], b: &[W], n: usize, same: bool) -> W {
    if same {
        sqr(r, a, n);
    } else {
        mul_n(r, a, b, n);
    }
    r[2 * n - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradeschool_known_product() {
        // (B + 1) * (B + 1) = B^2 + 2B + 1
        let a = [1u64, 1];
        let mut r = [0u64; 4];
        mul_gradeschool(&mut r, &a, 2, &a, 2);
        assert_eq!(r, [1, 2, 1, 0]);
    }

    #[test]
    fn addmul_submul_inverse() {
        let a = [0x1234_5678_9abc_def0u64, 0x0fed_cba9_8765_4321];
        let mut acc = [7u64, 7, 7];
        let up = addmul_1(&mut acc, &a, 2, 0xdead_beef);
        let down = submul_1(&mut acc, &a, 2, 0xdead_beef);
        assert_eq!(up, down);
        assert_eq!(acc, [7, 7, 7]);
    }

    #[test]
    fn sqr_matches_mul() {
        let a: Vec<u64> = (1..=40).map(|i| (i as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15)).collect();
        let mut r1 = vec![0u64; 80];
        let mut r2 = vec![0u64; 80];
        sqr(&mut r1, &a, 40);
        mul_n(&mut r2, &a, &a, 40);
        assert_eq!(r1, r2);
    }

    #[test]
    fn toom_path_matches_gradeschool() {
        let a: Vec<u64> = (0..64).map(|i| 0xabcd_ef01_2345_6789u64 ^ (i as u64) << 3).collect();
        let b: Vec<u64> = (0..64).map(|i| 0x1111_2222_3333_4444u64.wrapping_mul(i as u64 + 1)).collect();
        let mut r1 = vec![0u64; 128];
        let mut r2 = vec![0u64; 128];
        mul_n(&mut r1, &a, &b, 64);
        mul_gradeschool(&mut r2, &a, 64, &b, 64);
        assert_eq!(r1, r2);
    }
}
