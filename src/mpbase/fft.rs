//! Schönhage–Strassen multiplication.
//!
//! The product is assembled from two negacyclic convolutions, one modulo
//! `2^(2N) + 1` and one modulo `2^(3N) + 1`, whose lengths are chosen so
//! consecutive intervals overlap. Each convolution decomposes its operands
//! into `2^k` parts, runs a forward FFT in the ring `Z/(B^n + 1)`, multiplies
//! pointwise (recursing into another FFT above the modular thresholds),
//! and interpolates with the inverse transform. Ring arithmetic is carried
//! by `add_modf`/`sub_modf`/`mul_2exp_modf`.
//!
//! The `best_k` table is anchored at fixed multiples of the Toom-3
//! thresholds; changing it changes the recursion shape and with it the
//! exact intermediate sizes, so it is part of the behavioural contract.

use super::mul::{mul_gradeschool, sqr_gradeschool};
use super::{
    add_1, add_1_assign, add_n, add_n_assign, cmp, decr_u, incr_u, lshift, lshiftc, mul_n,
    ones_complement, rshift_assign, sqr, sub, sub_1_assign, sub_n, sub_n_assign, sub_n_from,
    Limb, MUL_TOOM22_THRESHOLD, MUL_TOOM33_THRESHOLD, SQR_TOOM2_THRESHOLD, SQR_TOOM3_THRESHOLD,
};

/// Threshold for the recursive modular FFT product (multiplication).
const MUL_FFT_MODF_THRESHOLD: usize = MUL_TOOM33_THRESHOLD * 3;

/// Threshold for the recursive modular FFT product (squaring).
const SQR_FFT_MODF_THRESHOLD: usize = SQR_TOOM3_THRESHOLD * 3;

/// First k used for an FFT multiply: k=4 runs in log(16)/log(8) and
/// beats Toom-3.
const FFT_FIRST_K: usize = 4;

/// Best-k decision table, `[mul, sqr]` rows, thresholds for k = 5 .. 10.
const FFT_TABLE: [[usize; 7]; 2] = [
    [
        MUL_TOOM33_THRESHOLD * 4,
        MUL_TOOM33_THRESHOLD * 8,
        MUL_TOOM33_THRESHOLD * 16,
        MUL_TOOM33_THRESHOLD * 32,
        MUL_TOOM33_THRESHOLD * 96,
        MUL_TOOM33_THRESHOLD * 288,
        0,
    ],
    [
        SQR_TOOM3_THRESHOLD * 4,
        SQR_TOOM3_THRESHOLD * 8,
        SQR_TOOM3_THRESHOLD * 16,
        SQR_TOOM3_THRESHOLD * 32,
        SQR_TOOM3_THRESHOLD * 96,
        SQR_TOOM3_THRESHOLD * 288,
        0,
    ],
];

/// Optimal k for a transform over `n` limbs.
fn best_k(n: usize, sqr: bool) -> usize {
    let table = &FFT_TABLE[sqr as usize];
    let mut i = 0;
    while table[i] != 0 {
        if n < table[i] {
            return i + FFT_FIRST_K;
        }
        i += 1;
    }
    if i == 0 || n < 4 * table[i - 1] {
        i + FFT_FIRST_K
    } else {
        i + FFT_FIRST_K + 1
    }
}

/// Smallest multiple of `2^k` at or above `pl`.
fn next_size(pl: usize, k: usize) -> usize {
    (1 + ((pl - 1) >> k)) << k
}

/// lcm(a, 2^k).
fn lcm(mut a: usize, mut k: usize) -> usize {
    let l = k;
    while a & 1 == 0 && k > 0 {
        a >>= 1;
        k -= 1;
    }
    a << l
}

/// Bit-reverse twiddle tables for levels `0..=k`.
fn build_tables(k: usize) -> Vec<Vec<usize>> {
    let mut l: Vec<Vec<usize>> = (0..=k).map(|i| vec![0usize; 1 << i]).collect();
    for i in 1..=k {
        let half = 1 << (i - 1);
        for j in 0..half {
            l[i][j] = 2 * l[i - 1][j];
            l[i][half + j] = 1 + l[i][j];
        }
    }
    l
}

/// Reduces an `n + 1` limb value with `a[n] <= 1` into canonical form
/// modulo `B^n + 1`.
fn normalize<W: Limb>(ap: &mut [W], n: usize) {
    if ap[n] != W::ZERO {
        decr_u(ap, W::ONE);
        if ap[n] == W::ZERO {
            ap[..n].fill(W::ZERO);
            ap[n] = W::ONE;
        } else {
            ap[n] = W::ZERO;
        }
    }
}

/// In-place `r = r + b mod B^n + 1`; both operands span `n + 1` limbs
/// with their top limb at most one.
fn add_modf<W: Limb>(r: &mut [W], b: &[W], n: usize) {
    let mut c = r[n].wrapping_add(b[n]).wrapping_add(add_n_assign(r, b, n));
    // 0 <= c <= 3
    let x = c.wrapping_sub(W::ONE) & W::mask_from_bool(c != W::ZERO);
    c = c.wrapping_sub(x);
    r[n] = c;
    decr_u(r, x);
}

/// `out = a - b mod B^n + 1` over `n + 1` limb operands.
fn sub_modf<W: Limb>(out: &mut [W], a: &[W], b: &[W], n: usize) {
    let c = a[n].wrapping_sub(b[n]).wrapping_sub(sub_n(out, a, b, n));
    // -2 <= c <= 1
    let x = c.wrapping_neg() & W::mask_from_bool(c & W::HIGH_BIT != W::ZERO);
    out[n] = x.wrapping_add(c);
    incr_u(out, x);
}

/// `r = a * 2^d mod B^n + 1` with `a` of `n + 1` limbs, `a[n] <= 1`,
/// `r` and `a` distinct.
fn mul_2exp_modf<W: Limb>(r: &mut [W], a: &[W], d: usize, n: usize) {
    let bits = (d as u32) & (W::BITS - 1);
    let mut m = d >> W::BITS.trailing_zeros();

    if m >= n {
        // r[0..m-1]  <-  lshift(a[n-m]..a[n-1])
        // r[m..n-1]  <- -lshift(a[0]..a[n-m-1])
        m -= n;

        let mut cc;
        let rd;
        if bits != 0 {
            lshift(r, &a[n - m..], m + 1, bits);
            rd = r[m];
            cc = lshiftc(&mut r[m..], a, n - m, bits);
        } else {
            r[..m].copy_from_slice(&a[n - m..n]);
            rd = a[n];
            ones_complement(&mut r[m..], a, n - m);
            cc = W::ZERO;
        }

        r[n] = W::ZERO;

        // Add carry + 1 to r[0]; no overflow possible here
        cc = cc.wrapping_add(W::ONE);
        incr_u(r, cc);

        // Add rd + 1 at r[m]; rd itself may overflow
        let rd = rd.wrapping_add(W::ONE);
        let cc = if rd == W::ZERO { W::ONE } else { rd };
        let off = m + usize::from(rd == W::ZERO);
        incr_u(&mut r[off..], cc);
    } else {
        // r[0..m-1]  <- -lshift(a[n-m]..a[n-1])
        // r[m..n-1]  <-  lshift(a[0]..a[n-m-1])
        let mut cc;
        let rd;
        if bits != 0 {
            lshiftc(r, &a[n - m..], m + 1, bits);
            rd = !r[m];
            cc = lshift(&mut r[m..], a, n - m, bits);
        } else {
            ones_complement(r, &a[n - m..], m + 1);
            rd = a[n];
            r[m..n].copy_from_slice(&a[..n - m]);
            cc = W::ZERO;
        }

        // Complement {r, m}: subtract cc from r[0] and rd from r[m]
        if m != 0 {
            // Add 1 to r[0] and subtract 1 from r[m]
            if cc == W::ZERO {
                cc = add_1_assign(r, n, W::ONE);
            } else {
                cc = cc.wrapping_sub(W::ONE);
            }
            cc = sub_1_assign(r, m, cc);

            // rd wants incrementing but may overflow; both are subtracted
            // from r[m..n] so add 1 to cc instead
            cc = cc.wrapping_add(W::ONE);
        }

        // Subtract cc and rd from r[m..n], compensating if r[n] goes
        // negative
        let b1 = sub_1_assign(&mut r[m..], n - m, cc);
        let b2 = sub_1_assign(&mut r[m..], n - m, rd);
        r[n] = b1.wrapping_neg().wrapping_sub(b2);
        if r[n] & W::HIGH_BIT != W::ZERO {
            r[n] = add_1_assign(r, n, W::ONE);
        }
    }
}

/// `out = a / 2^k mod B^n + 1`, normalised.
fn div_2exp_modf<W: Limb>(out: &mut [W], a: &[W], k: usize, n: usize) {
    // Division by 2^k is multiplication by 2^(2nB - k)
    let i = 2 * n * W::BITS as usize - k;
    mul_2exp_modf(out, a, i, n);
    normalize(out, n);
}

/// Normalisation of an `in_n`-limb value into `out_n` limbs modulo
/// `B^out_n + 1`. Returns the carry limb.
fn norm_modf<W: Limb>(out: &mut [W], out_n: usize, inp: &[W], in_n: usize) -> W {
    debug_assert!(out_n <= in_n && in_n <= 3 * out_n);

    let m = in_n as isize - 2 * out_n as isize;
    let l;
    let mut rpn: i64;

    if m > 0 {
        let m = m as usize;
        l = out_n;
        let cc = add_n(out, inp, &inp[2 * out_n..], m);
        rpn = add_1(&mut out[m..], &inp[m..], out_n - m, cc).as_u64() as i64;
    } else {
        l = in_n - out_n;
        out[..out_n].copy_from_slice(&inp[..out_n]);
        rpn = 0;
    }

    let cc = if l > 0 {
        sub_n_assign(&mut out[..l], &inp[out_n..out_n + l], l)
    } else {
        W::ZERO
    };
    rpn -= sub_1_assign(&mut out[l..], out_n - l, cc).as_u64() as i64;
    if rpn < 0 {
        rpn = add_1_assign(out, out_n, W::ONE).as_u64() as i64;
    }
    W::from_u64(rpn as u64)
}

// Mutable views of two distinct transform elements.
fn two_elems<W: Limb>(buf: &mut [W], np1: usize, i: usize, j: usize) -> (&mut [W], &mut [W]) {
    debug_assert!(i < j);
    let (lo, hi) = buf.split_at_mut(j * np1);
    (&mut lo[i * np1..(i + 1) * np1], &mut hi[..np1])
}

// Radix-2 butterfly shared by the forward and inverse transforms.
fn butterfly<W: Limb>(e0: &mut [W], e1: &mut [W], n: usize, scratch: &mut [W]) {
    let np1 = n + 1;
    scratch[..np1].copy_from_slice(e0);
    add_n_assign(e0, e1, np1);
    let cy = sub_n_from(e1, &scratch[..np1], np1);
    if e0[n] > W::ONE {
        let v = e0[n].wrapping_sub(W::ONE);
        e0[n] = W::ONE.wrapping_sub(sub_1_assign(e0, n, v));
    }
    if cy != W::ZERO {
        let v = e1[n].wrapping_neg();
        e1[n] = add_1_assign(e1, n, v);
    }
}

/// Forward FFT over `k_elems` elements with stride `inc`, in place.
#[allow(clippy::too_many_arguments)]
fn fft<W: Limb>(
    buf: &mut [W],
    np1: usize,
    base: usize,
    k_elems: usize,
    tables: &[Vec<usize>],
    level: usize,
    omega: usize,
    n: usize,
    inc: usize,
    scratch: &mut [W],
) {
    if k_elems == 2 {
        let (e0, e1) = two_elems(buf, np1, base, base + inc);
        butterfly(e0, e1, n, scratch);
    } else {
        let k2 = k_elems >> 1;

        fft(buf, np1, base, k2, tables, level - 1, 2 * omega, n, inc * 2, scratch);
        fft(buf, np1, base + inc, k2, tables, level - 1, 2 * omega, n, inc * 2, scratch);

        for j in 0..k2 {
            let tw = tables[level][2 * j] * omega;
            let e0 = base + 2 * inc * j;
            let e1 = e0 + inc;

            {
                let (t, stage) = scratch.split_at_mut(np1);
                stage[..np1].copy_from_slice(&buf[e1 * np1..e1 * np1 + np1]);
                mul_2exp_modf(t, &stage[..np1], tw, n);
            }
            let (p0, p1) = two_elems(buf, np1, e0, e1);
            sub_modf(p1, p0, &scratch[..np1], n);
            add_modf(p0, &scratch[..np1], n);
        }
    }
}

/// Inverse FFT over contiguous elements, in place.
fn fftinv<W: Limb>(
    buf: &mut [W],
    np1: usize,
    base: usize,
    k_elems: usize,
    omega: usize,
    n: usize,
    scratch: &mut [W],
) {
    if k_elems == 2 {
        let (e0, e1) = two_elems(buf, np1, base, base + 1);
        butterfly(e0, e1, n, scratch);
    } else {
        let k2 = k_elems >> 1;

        fftinv(buf, np1, base, k2, 2 * omega, n, scratch);
        fftinv(buf, np1, base + k2, k2, 2 * omega, n, scratch);

        for j in 0..k2 {
            let e0 = base + j;
            let e1 = e0 + k2;

            {
                let (t, stage) = scratch.split_at_mut(np1);
                stage[..np1].copy_from_slice(&buf[e1 * np1..e1 * np1 + np1]);
                mul_2exp_modf(t, &stage[..np1], j * omega, n);
            }
            let (p0, p1) = two_elems(buf, np1, e0, e1);
            sub_modf(p1, p0, &scratch[..np1], n);
            add_modf(p0, &scratch[..np1], n);
        }
    }
}

/// Pointwise products `a[i] = a[i] * b[i] mod B^n + 1` for `k_elems`
/// elements; squares when no second operand is given.
fn mul_modf_k<W: Limb>(a_buf: &mut [W], b_buf: Option<&mut [W]>, n: usize, k_elems: usize) {
    let sqr_case = b_buf.is_none();
    let np1 = n + 1;

    let modf_threshold = if sqr_case {
        SQR_FFT_MODF_THRESHOLD
    } else {
        MUL_FFT_MODF_THRESHOLD
    };

    if n >= modf_threshold {
        // Recurse into a nested transform for each pointwise product
        let k = best_k(n, sqr_case);
        let k2 = 1usize << k;
        debug_assert!(n & (k2 - 1) == 0);
        let max_lk = k2.max(W::BITS as usize);
        let m2 = (n * W::BITS as usize) >> k;
        let l = n >> k;

        let nprime_bits = ((2 * m2 + k + 2 + max_lk) / max_lk) * max_lk;
        let mut np2 = nprime_bits >> W::BITS.trailing_zeros();

        if np2 >= modf_threshold {
            loop {
                let k3 = 1usize << best_k(np2, sqr_case);
                if np2 & (k3 - 1) == 0 {
                    break;
                }
                np2 = (np2 + k3 - 1) & k3.wrapping_neg();
            }
        }
        debug_assert!(np2 < n);

        let mp2 = (np2 * W::BITS as usize) >> k;
        let tables = build_tables(k);

        let mut a2 = vec![W::ZERO; (np2 + 1) << k];
        let mut b2 = vec![W::ZERO; (np2 + 1) << k];
        let mut scratch = vec![W::ZERO; 2 * (np2 + 1)];

        let mut b_buf = b_buf;
        for i in 0..k_elems {
            {
                let elem = &mut a_buf[i * np1..(i + 1) * np1];
                normalize(elem, n);
                decompose(&mut a2, k2, np2, elem, (l << k) + 1, l, mp2, &mut scratch);
            }
            let b_arg = match b_buf.as_deref_mut() {
                Some(bb) => {
                    let belem = &mut bb[i * np1..(i + 1) * np1];
                    normalize(belem, n);
                    decompose(&mut b2, k2, np2, belem, (l << k) + 1, l, mp2, &mut scratch);
                    Some(&mut b2[..])
                }
                None => None,
            };
            let cy = mul_internal(
                &mut a_buf[i * np1..(i + 1) * np1],
                n,
                k,
                &mut a2,
                b_arg,
                np2,
                l,
                mp2,
                &tables,
                &mut scratch,
            );
            a_buf[i * np1 + n] = cy;
        }
    } else {
        let mut temp = vec![W::ZERO; 2 * n];
        let mut b_buf = b_buf;
        for i in 0..k_elems {
            match b_buf.as_deref_mut() {
                None => {
                    let a = &mut a_buf[i * np1..(i + 1) * np1];
                    if n < SQR_TOOM2_THRESHOLD {
                        sqr_gradeschool(&mut temp, a, n);
                    } else {
                        sqr(&mut temp, a, n);
                    }
                    pointwise_fixup(a, None, &mut temp, n);
                }
                Some(bb) => {
                    let a = &mut a_buf[i * np1..(i + 1) * np1];
                    let b = &bb[i * np1..(i + 1) * np1];
                    if n < MUL_TOOM22_THRESHOLD {
                        mul_gradeschool(&mut temp, b, n, a, n);
                    } else {
                        mul_n(&mut temp, b, a, n);
                    }
                    pointwise_fixup(a, Some(b), &mut temp, n);
                }
            }
        }
    }
}

// Fold the top-limb contributions of the operands into the double-length
// product, then reduce modulo B^n + 1 into a.
fn pointwise_fixup<W: Limb>(a: &mut [W], b: Option<&[W]>, temp: &mut [W], n: usize) {
    let n2 = 2 * n;
    let mut cc = W::ZERO;

    match b {
        Some(b) => {
            if a[n] != W::ZERO {
                cc = add_n_assign(&mut temp[n..], &b[..n], n);
            }
            if b[n] != W::ZERO {
                cc = cc
                    .wrapping_add(add_n_assign(&mut temp[n..], &a[..n], n))
                    .wrapping_add(a[n]);
            }
        }
        None => {
            // Squaring: both top limbs are a[n]
            if a[n] != W::ZERO {
                cc = add_n_assign(&mut temp[n..], &a[..n], n);
                cc = cc
                    .wrapping_add(add_n_assign(&mut temp[n..], &a[..n], n))
                    .wrapping_add(a[n]);
            }
        }
    }

    if cc != W::ZERO {
        let c2 = add_1_assign(temp, n2, cc);
        temp[0] = temp[0].wrapping_add(c2);
    }

    let (lo, hi) = temp.split_at(n);
    let borrow = sub_n(a, lo, &hi[..n], n);
    a[n] = if borrow != W::ZERO {
        add_1_assign(a, n, W::ONE)
    } else {
        W::ZERO
    };
}

/// Decomposition of an operand into `k_elems` transform elements, each
/// pre-rotated by its twiddle offset.
#[allow(clippy::too_many_arguments)]
fn decompose<W: Limb>(
    a_buf: &mut [W],
    k_elems: usize,
    nprime: usize,
    n: &[W],
    mut nl: usize,
    l: usize,
    mp: usize,
    scratch: &mut [W],
) {
    let np1 = nprime + 1;
    let kl = k_elems * l;

    let mut tmp: Vec<W> = Vec::new();
    let reduced;
    if nl > kl {
        // Normalise {n, nl} modulo 2^(kl·B) + 1
        let mut dif = nl - kl;
        tmp = vec![W::ZERO; kl + 1];
        let mut cy: i64;

        if dif > kl {
            let mut subp = false;
            let mut nb = 0usize;

            cy = sub_n(&mut tmp, n, &n[kl..], kl).as_u64() as i64;
            nb += 2 * kl;
            dif -= kl;

            while dif > kl {
                if subp {
                    cy += sub_n_assign(&mut tmp, &n[nb..], kl).as_u64() as i64;
                } else {
                    cy -= add_n_assign(&mut tmp, &n[nb..], kl).as_u64() as i64;
                }
                subp = !subp;
                nb += kl;
                dif -= kl;
            }

            if subp {
                cy += super::sub_assign(&mut tmp, kl, &n[nb..nb + dif], dif).as_u64() as i64;
            } else {
                cy -= super::add_assign(&mut tmp, kl, &n[nb..nb + dif], dif).as_u64() as i64;
            }

            if cy >= 0 {
                cy = add_1_assign(&mut tmp, kl, W::from_u64(cy as u64)).as_u64() as i64;
            } else {
                cy = sub_1_assign(&mut tmp, kl, W::from_u64((-cy) as u64)).as_u64() as i64;
            }
        } else {
            // dif <= kl, i.e. nl <= 2 * kl
            let c = sub(&mut tmp, n, kl, &n[kl..], dif);
            cy = add_1_assign(&mut tmp, kl, c).as_u64() as i64;
        }

        tmp[kl] = W::from_u64(cy as u64);
        nl = kl + 1;
        reduced = true;
    } else {
        reduced = false;
    }
    let src: &[W] = if reduced { &tmp } else { n };

    let mut remaining = nl;
    let mut sb = 0usize;
    for i in 0..k_elems {
        let elem = &mut a_buf[i * np1..(i + 1) * np1];

        if remaining > 0 {
            let j = if l <= remaining && i < k_elems - 1 {
                l
            } else {
                remaining
            };
            remaining -= j;
            scratch[..j].copy_from_slice(&src[sb..sb + j]);
            scratch[j..np1].fill(W::ZERO);
            sb += l;
            mul_2exp_modf(elem, &scratch[..np1], i * mp, nprime);
        } else {
            elem.fill(W::ZERO);
        }
    }
    debug_assert!(remaining == 0);
}

/// The latter stages of an FFT product: forward transforms, pointwise
/// multiplication, inverse transform, untwiddle, recombination.
#[allow(clippy::too_many_arguments)]
fn mul_internal<W: Limb>(
    out: &mut [W],
    pl: usize,
    k: usize,
    a_buf: &mut [W],
    mut b_buf: Option<&mut [W]>,
    nprime: usize,
    l: usize,
    mp: usize,
    tables: &[Vec<usize>],
    scratch: &mut [W],
) -> W {
    let k_elems = 1usize << k;
    let np1 = nprime + 1;

    // Evaluate
    fft(a_buf, np1, 0, k_elems, tables, k, 2 * mp, nprime, 1, scratch);
    if let Some(b) = b_buf.as_deref_mut() {
        fft(b, np1, 0, k_elems, tables, k, 2 * mp, nprime, 1, scratch);
    }

    // Pointwise multiply
    mul_modf_k(a_buf, b_buf, nprime, k_elems);

    // Interpolate
    fftinv(a_buf, np1, 0, k_elems, 2 * mp, nprime, scratch);

    // Untwiddle: divide element i by 2^(k + (K - i) * Mp)
    let mut res = vec![W::ZERO; k_elems * np1];
    for i in 0..k_elems {
        let exp = if i == 0 { k } else { k + (k_elems - i) * mp };
        div_2exp_modf(
            &mut res[i * np1..(i + 1) * np1],
            &a_buf[i * np1..(i + 1) * np1],
            exp,
            nprime,
        );
    }

    // Recombine with signed carry tracking
    let pla = l * (k_elems - 1) + np1;
    let mut p = vec![W::ZERO; pla];
    let mut cmp_buf = vec![W::ZERO; np1];
    let mut cc: i64 = 0;

    let two_l = 2 * l;
    for i in (0..k_elems).rev() {
        let sh = l * i;
        let lo = sh + nprime;
        let j = (k_elems - i) & (k_elems - 1);

        let cy = add_n_assign(&mut p[sh..], &res[j * np1..j * np1 + np1], np1);
        if cy != W::ZERO && pla > sh + np1 {
            cc += add_1_assign(&mut p[sh + np1..], pla - sh - np1, W::ONE).as_u64() as i64;
        }

        cmp_buf[two_l] = W::from_usize(i + 1);
        if cmp(&res[j * np1..], &cmp_buf, np1) > 0 {
            cc -= sub_1_assign(&mut p[sh..], pla - sh, W::ONE).as_u64() as i64;
            cc -= sub_1_assign(&mut p[lo..], pla - lo, W::ONE).as_u64() as i64;
        }
        cmp_buf[two_l] = W::ZERO;
    }

    // Carry propagation across the block boundary
    if cc == -1 {
        let c = add_1_assign(&mut p[pla - pl..], pl, W::ONE);
        if c != W::ZERO {
            sub_1_assign(&mut p[pla - pl - 1..], pl + 1, W::ONE);
            sub_1_assign(&mut p[pla - 1..], 1, W::ONE);
        }
    } else if cc == 1 {
        let mut c = W::ONE;
        if pla >= 2 * pl {
            while c != W::ZERO {
                c = add_1_assign(&mut p[pla - 2 * pl..], 2 * pl, c);
            }
        } else {
            c = sub_1_assign(&mut p[pla - pl..], pl, c);
            debug_assert!(c == W::ZERO);
        }
    } else {
        debug_assert!(cc == 0);
    }

    norm_modf(out, pl, &p, pla)
}

/// One FFT product modulo `B^out_n + 1` with window `k`.
fn fft_mul_mod<W: Limb>(
    out: &mut [W],
    out_n: usize,
    in1: &[W],
    in1_n: usize,
    in2: Option<(&[W], usize)>,
    k: usize,
) -> W {
    let k_elems = 1usize << k;
    let max_lk = lcm(W::BITS as usize, k);
    let n_bits = out_n * W::BITS as usize;
    let m = n_bits >> k;
    let l = 1 + ((m - 1) >> W::BITS.trailing_zeros());
    let sqr_case = in2.is_none();

    let nprime_bits = (1 + (2 * m + k + 2) / max_lk) * max_lk;
    let mut nprime = nprime_bits >> W::BITS.trailing_zeros();

    debug_assert!(next_size(out_n, k) == out_n);

    let tables = build_tables(k);

    let modf_threshold = if sqr_case {
        SQR_FFT_MODF_THRESHOLD
    } else {
        MUL_FFT_MODF_THRESHOLD
    };
    if nprime >= modf_threshold {
        loop {
            let k2 = 1usize << best_k(nprime, sqr_case);
            if nprime & (k2 - 1) == 0 {
                break;
            }
            nprime = (nprime + k2 - 1) & k2.wrapping_neg();
        }
    }
    debug_assert!(nprime < out_n);

    let np1 = nprime + 1;
    let mp = (nprime * W::BITS as usize) >> k;

    let mut scratch = vec![W::ZERO; 2 * np1];
    let mut a_buf = vec![W::ZERO; k_elems * np1];
    decompose(&mut a_buf, k_elems, nprime, in1, in1_n, l, mp, &mut scratch);

    if let Some((b, bn)) = in2 {
        let mut b_buf = vec![W::ZERO; k_elems * np1];
        decompose(&mut b_buf, k_elems, nprime, b, bn, l, mp, &mut scratch);
        mul_internal(
            out,
            out_n,
            k,
            &mut a_buf,
            Some(&mut b_buf),
            nprime,
            l,
            mp,
            &tables,
            &mut scratch,
        )
    } else {
        mul_internal(
            out, out_n, k, &mut a_buf, None, nprime, l, mp, &tables, &mut scratch,
        )
    }
}

/// FFT-based multiplication of two limb vectors into their full
/// `n1 + n2` limb product.
pub fn mul_fft<W: Limb>(out: &mut [W], in1: &[W], n1: usize, in2: &[W], n2: usize) {
    let sqr_case = std::ptr::eq(in1.as_ptr(), in2.as_ptr()) && n1 == n2;

    let pl = n1 + n2;

    // Choose pl2 and pl3 = 3/2·pl2 so both are multiples of their 2^k
    // window sizes; consecutive intervals must overlap, which holds for
    // pl >= 6 · 2^FFT_FIRST_K
    let mut pl2 = (2 * pl - 1) / 5;
    let (pl3, k2, k3);
    loop {
        pl2 += 1;
        let kk2 = best_k(pl2, sqr_case);
        pl2 = next_size(pl2, kk2);
        let p3 = 3 * pl2 / 2;
        let kk3 = best_k(p3, sqr_case);
        if next_size(p3, kk3) == p3 {
            pl3 = p3;
            k2 = kk2;
            k3 = kk3;
            break;
        }
    }

    debug_assert!(pl3 <= pl);

    let l = pl3 - pl2;

    // mu: product mod 2^(3N)+1 into out; lambda: mod 2^(2N)+1 into scratch
    let in2_arg = if sqr_case { None } else { Some((in2, n2)) };
    let cc0 = fft_mul_mod(out, pl3, in1, n1, in2_arg, k3);
    debug_assert!(cc0 == W::ZERO);

    let mut scratch = vec![W::ZERO; pl2];
    let in2_arg = if sqr_case { None } else { Some((in2, n2)) };
    let cc1 = fft_mul_mod(&mut scratch, pl2, in1, n1, in2_arg, k2);

    // lambda - LOW(mu)
    let mut cc: i64 = -(cc1.as_u64() as i64)
        + sub_n_assign(&mut scratch, &out[..pl2], pl2).as_u64() as i64;
    debug_assert!((0..=1).contains(&cc));

    // lambda + HIGH(mu) + carry
    let c2 = add_n_assign(&mut scratch, &out[pl2..pl2 + l], l);
    cc = add_1_assign(&mut scratch[l..], l, c2).as_u64() as i64 - cc;
    debug_assert!((-1..=1).contains(&cc));
    if cc < 0 {
        cc = add_1_assign(&mut scratch, pl2, W::from_u64((-cc) as u64)).as_u64() as i64;
    }
    debug_assert!((0..=1).contains(&cc));

    // LOW(scratch) -= HIGH(scratch), HIGH(scratch) += LOW(scratch)
    let oldcc = cc;
    {
        let tmp = scratch[..l].to_vec();
        let (lo, hi) = scratch.split_at_mut(l);
        let c2a = sub_n_assign(lo, &hi[..l], l);
        cc += add_n_assign(&mut hi[..l], &tmp, l).as_u64() as i64;
        let c2b = c2a.as_u64() as i64 + oldcc;

        // Normalise {scratch, pl2} then divide by 2
        cc -= sub_1_assign(&mut hi[..l], l, W::from_u64(c2b as u64)).as_u64() as i64;
    }
    if cc > 0 {
        cc = -(sub_1_assign(&mut scratch, pl2, W::from_u64(cc as u64)).as_u64() as i64);
    }
    if cc < 0 {
        cc = add_1_assign(&mut scratch, pl2, W::from_u64((-cc) as u64)).as_u64() as i64;
    }

    // If odd, add 2^(pl2·B) + 1 to the normalised value before halving
    if scratch[0] & W::ONE != W::ZERO {
        cc += 1 + add_1_assign(&mut scratch, pl2, W::ONE).as_u64() as i64;
    }
    rshift_assign(&mut scratch, pl2, 1);
    if cc != 0 {
        scratch[pl2 - 1] = scratch[pl2 - 1] | W::HIGH_BIT;
    }

    // out += (lambda - mu) / (1 - 2^(l·B)) and copy the remaining limbs
    let c2 = add_n_assign(&mut out[..pl2], &scratch, pl2);
    out[pl3..pl].copy_from_slice(&scratch[..pl - pl3]);
    add_1_assign(&mut out[pl2..], pl - pl2, c2);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_2exp_rotates() {
        // 1 * 2^(n*B) mod 2^(n*B)+1 == -1
        let n = 4usize;
        let a = {
            let mut v = vec![0u64; n + 1];
            v[0] = 1;
            v
        };
        let mut r = vec![0u64; n + 1];
        mul_2exp_modf(&mut r, &a, n * 64, n);
        normalize(&mut r, n);
        let mut expect = vec![0u64; n + 1];
        expect[n] = 1;
        let mut alt = vec![u64::MAX; n + 1];
        alt[n] = 0;
        assert!(r == expect || r == alt);
    }

    #[test]
    fn fft_matches_toom() {
        let n = 1100usize;
        let a: Vec<u64> = (0..n)
            .map(|i| (i as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15) | 1)
            .collect();
        let b: Vec<u64> = (0..n)
            .map(|i| (i as u64).wrapping_mul(0x2545_f491_4f6c_dd1d) ^ 0xff)
            .collect();

        let mut r1 = vec![0u64; 2 * n];
        mul_fft(&mut r1, &a, n, &b, n);

        let mut r2 = vec![0u64; 2 * n];
        let mut scratch = vec![0u64; super::super::get_toom33_scratch_size::<u64>(2 * n)];
        super::super::toom::mul_toom33(&mut r2, &a, n, &b, n, &mut scratch);

        assert_eq!(r1, r2);
    }

    #[test]
    fn fft_squares() {
        let n = 1100usize;
        let a: Vec<u64> = (0..n)
            .map(|i| (i as u64).wrapping_mul(0x6c62_272e_07bb_0142) | 3)
            .collect();

        let mut r1 = vec![0u64; 2 * n];
        mul_fft(&mut r1, &a, n, &a, n);

        let mut r2 = vec![0u64; 2 * n];
        let mut scratch = vec![0u64; super::super::get_toom33_scratch_size::<u64>(2 * n)];
        super::super::toom::sqr_toom3(&mut r2, &a, n, &mut scratch);

        assert_eq!(r1, r2);
    }
}
