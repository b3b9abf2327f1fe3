//! The division family.
//!
//! Entry point is [`tdiv_qr`], truncated division with quotient and
//! remainder. It dispatches on divisor size: single-limb and two-limb
//! divisors use the pre-inverted word kernels; mid-size divisors use
//! schoolbook division with a 3/2 reciprocal of the top divisor limbs;
//! larger quotients use divide-and-conquer recursion; very large
//! operands use Mulders–Hanrot–Zimmermann block division driven by an
//! approximate reciprocal from Newton iteration.
//!
//! Division control flow is secret-dependent by construction; these
//! routines are used on public data only (moduli, curve orders, string
//! conversion), never on secret scalars.

use super::{
    add_1_assign, add_n_assign, cmp, decr_u, incr_u, lshift, mul, mul_n, normalized_size, rshift,
    sub_1_assign, sub_n, sub_n_assign, ModMeta, DIVAPPR_Q_THRESHOLD, DIV_QR_THRESHOLD,
    INV_MULMOD_BNM1_THRESHOLD, INV_NEWTON_THRESHOLD, MU_DEN_DIV_QR_THRESHOLD,
    MU_DIV_QR_SKEW_THRESHOLD, MU_DIV_QR_THRESHOLD,
};
use super::invert::{mod_1, mulmod_bnm1, mulmod_bnm1_next_size, mulmod_bnm1_size};
use super::mul::submul_1;
use crate::word::{self, Limb};

/// Scratch limbs needed by [`invertappr`] for a divisor of `n` limbs.
pub const fn invertappr_scratch_size(n: usize) -> usize {
    3 * n + 2
}

/// Division by a single pre-inverted limb. Writes quotient limbs in
/// descending order when a quotient buffer is supplied and returns the
/// remainder.
pub fn div_qr_1_preinv<W: Limb>(
    mut q_limbs: Option<&mut [W]>,
    n_limbs: &[W],
    n: usize,
    meta: &ModMeta<W>,
) -> W {
    let mut rem = W::ZERO;

    // Normalise the numerator by the divisor's shift
    let shifted;
    let ns: &[W] = if meta.norm > 0 {
        let mut t = vec![W::ZERO; n];
        rem = lshift(&mut t, n_limbs, n, meta.norm);
        shifted = t;
        &shifted
    } else {
        n_limbs
    };

    let d = meta.m << meta.norm;
    for i in (0..n).rev() {
        let (quo, r) = word::udiv_qrnnd_preinv(rem, ns[i], d, meta.m_inv);
        rem = r;
        if let Some(q) = q_limbs.as_deref_mut() {
            q[i] = quo;
        }
    }

    rem >> meta.norm
}

/// Division by a two-limb divisor with its 3/2 reciprocal. The two
/// remainder limbs are written to `r_limbs`.
pub fn div_qr_2_preinv<W: Limb>(
    mut q_limbs: Option<&mut [W]>,
    r_limbs: &mut [W],
    n_limbs: &[W],
    n: usize,
    meta: &ModMeta<W>,
) {
    let mut r1 = W::ZERO;

    let shifted;
    let ns: &[W] = if meta.norm > 0 {
        let mut t = vec![W::ZERO; n];
        r1 = lshift(&mut t, n_limbs, n, meta.norm);
        shifted = t;
        &shifted
    } else {
        n_limbs
    };

    let mut r0 = ns[n - 1];

    for i in (0..n - 1).rev() {
        let (quo, nr1, nr0) =
            word::udiv_qrnnndd_preinv(r1, r0, ns[i], meta.m, meta.m_low, meta.m_inv);
        r1 = nr1;
        r0 = nr0;
        if let Some(q) = q_limbs.as_deref_mut() {
            q[i] = quo;
        }
    }

    if meta.norm > 0 {
        r0 = (r0 >> meta.norm) | (r1 << meta.b_norm);
        r1 = r1 >> meta.norm;
    }

    r_limbs[1] = r1;
    r_limbs[0] = r0;
}

/// Division by an arbitrary single limb; powers of two short-circuit to
/// a shift. Returns the remainder.
pub fn div_qr_1<W: Limb>(q_limbs: Option<&mut [W]>, n_limbs: &[W], n: usize, d: W) -> W {
    if d > W::ONE && d & d.wrapping_sub(W::ONE) == W::ZERO {
        let r = n_limbs[0] & d.wrapping_sub(W::ONE);
        let shift = d.trailing_zeros();
        if let Some(q) = q_limbs {
            rshift(q, n_limbs, n, shift);
        }
        r
    } else {
        let meta = ModMeta::init(d);
        div_qr_1_preinv(q_limbs, n_limbs, n, &meta)
    }
}

/// Schoolbook division with a pre-inverted 3/2 reciprocal for a divisor
/// of three or more limbs. The numerator is reduced in place to the
/// remainder.
pub fn div_qr_general_preinv<W: Limb>(
    mut q_limbs: Option<&mut [W]>,
    n_limbs: &mut [W],
    n: usize,
    d_limbs: &[W],
    dn: usize,
    meta: &ModMeta<W>,
) {
    let inv = meta.m_inv;
    let d1 = d_limbs[dn - 1];
    let d0 = d_limbs[dn - 2];
    let mut n1 = W::ZERO;

    if meta.norm > 0 {
        n1 = super::lshift_assign(n_limbs, n, meta.norm);
    }

    for i in (0..=n - dn).rev() {
        let mut q;
        let n0 = n_limbs[dn - 1 + i];
        if n1 == d1 && n0 == d0 {
            q = W::MAX;
            submul_1(&mut n_limbs[i..], d_limbs, dn, q);
            n1 = n_limbs[dn - 1 + i];
        } else {
            let (qq, mut nn1, mut n0b) =
                word::udiv_qrnnndd_preinv(n1, n0, n_limbs[dn - 2 + i], d1, d0, inv);
            q = qq;
            let c = submul_1(&mut n_limbs[i..], d_limbs, dn - 2, q);

            let c2 = W::from_bool(n0b < c);
            n0b = n0b.wrapping_sub(c);
            n_limbs[dn - 2 + i] = n0b;

            let c = W::from_bool(nn1 < c2);
            nn1 = nn1.wrapping_sub(c2);

            if c != W::ZERO {
                nn1 = nn1
                    .wrapping_add(d1)
                    .wrapping_add(add_n_assign(&mut n_limbs[i..], d_limbs, dn - 1));
                q = q.wrapping_sub(W::ONE);
            }
            n1 = nn1;
        }

        if let Some(qs) = q_limbs.as_deref_mut() {
            qs[i] = q;
        }
    }

    n_limbs[dn - 1] = n1;

    if meta.norm > 0 {
        super::rshift_assign(n_limbs, dn, meta.norm);
    }
}

/// Pre-inverted division dispatch on divisor length.
pub fn div_qr_preinv<W: Limb>(
    q_limbs: Option<&mut [W]>,
    n_limbs: &mut [W],
    n: usize,
    d_limbs: &[W],
    dn: usize,
    meta: &ModMeta<W>,
) {
    if dn == 1 {
        n_limbs[0] = div_qr_1_preinv(q_limbs, n_limbs, n, meta);
    } else if dn == 2 {
        let t = n_limbs[..n].to_vec();
        div_qr_2_preinv(q_limbs, n_limbs, &t, n, meta);
    } else {
        div_qr_general_preinv(q_limbs, n_limbs, n, d_limbs, dn, meta);
    }
}

/// General quotient-and-remainder division. The numerator is overwritten;
/// the remainder is left in its low `dn` limbs.
pub fn div_qr<W: Limb>(
    q_limbs: Option<&mut [W]>,
    n_limbs: &mut [W],
    n: usize,
    d_limbs: &[W],
    dn: usize,
) {
    let meta = if dn == 1 {
        ModMeta::init(d_limbs[0])
    } else if dn == 2 {
        ModMeta::init_2(d_limbs[1], d_limbs[0])
    } else {
        ModMeta::init_3(d_limbs[dn - 1], d_limbs[dn - 2], d_limbs[dn - 3])
    };

    if dn > 2 && meta.norm > 0 {
        let mut temp = vec![W::ZERO; dn];
        lshift(&mut temp, d_limbs, dn, meta.norm);
        div_qr_preinv(q_limbs, n_limbs, n, &temp, dn, &meta);
    } else {
        div_qr_preinv(q_limbs, n_limbs, n, d_limbs, dn, &meta);
    }
}

/// Division by a normalised two-limb divisor with the numerator
/// overwritten by the remainder. `q_offset` prepends zero-extension
/// quotient limbs. Returns the most significant quotient limb.
pub fn divrem_2<W: Limb>(
    q_limbs: &mut [W],
    q_offset: usize,
    n_limbs: &mut [W],
    n: usize,
    d_limbs: &[W],
) -> W {
    debug_assert!(n >= 2);
    debug_assert!(d_limbs[1] & W::HIGH_BIT != W::ZERO);

    let mut np = n - 2;
    let d1 = d_limbs[1];
    let d0 = d_limbs[0];
    let mut r1 = n_limbs[np + 1];
    let mut r0 = n_limbs[np];

    let mut most_significant_q_limb = W::ZERO;
    if r1 >= d1 && (r1 > d1 || r0 >= d0) {
        let (h, l) = word::usub(r1, r0, d1, d0);
        r1 = h;
        r0 = l;
        most_significant_q_limb = W::ONE;
    }

    let meta = ModMeta::init_2(d1, d0);

    let mut i = n as isize - 2 - 1;
    while i >= 0 {
        np -= 1;
        let n0 = n_limbs[np];
        let (q, nr1, nr0) = word::udiv_qrnnndd_preinv(r1, r0, n0, d1, d0, meta.m_inv);
        r1 = nr1;
        r0 = nr0;
        q_limbs[q_offset + i as usize] = q;
        i -= 1;
    }

    if q_offset != 0 {
        for i in (0..q_offset).rev() {
            let (q, nr1, nr0) = word::udiv_qrnnndd_preinv(r1, r0, W::ZERO, d1, d0, meta.m_inv);
            r1 = nr1;
            r0 = nr0;
            q_limbs[i] = q;
        }
    }

    n_limbs[np + 1] = r1;
    n_limbs[np] = r0;

    most_significant_q_limb
}

/// Division wrapper that preserves the numerator and hands back the
/// remainder separately.
pub fn div_quorem<W: Limb>(
    q_limbs: Option<&mut [W]>,
    r_limbs: Option<&mut [W]>,
    n_limbs: &[W],
    nn: usize,
    d_limbs: &[W],
    dn: usize,
) {
    debug_assert!(nn >= dn);
    debug_assert!(dn > 0);
    debug_assert!(d_limbs[dn - 1] != W::ZERO);

    let mut tp = n_limbs[..nn].to_vec();
    div_qr(q_limbs, &mut tp, nn, d_limbs, dn);
    if let Some(r) = r_limbs {
        r[..dn].copy_from_slice(&tp[..dn]);
    }
}

/// Length of the approximate inverse used by MHZ division for a
/// quotient of `qn` limbs against a divisor of `dn` limbs.
pub fn mu_div_qr_inverse_size(qn: usize, dn: usize) -> usize {
    //  (a) dn < qn:         in = ceil(qn / ceil(qn/dn))
    //  (b) dn/3 < qn <= dn: in = ceil(qn / 2)
    //  (c) qn < dn/3:       in = qn
    let b = if qn > dn {
        (qn - 1) / dn + 1
    } else if 3 * qn > dn {
        2
    } else {
        1
    };
    (qn - 1) / b + 1
}

/// Scratch limbs required by [`mu_div_qr`].
pub fn mu_div_qr_scratch_size(nn: usize, dn: usize) -> usize {
    let itch_local = mulmod_bnm1_next_size(dn + 1);
    let inv_n = mu_div_qr_inverse_size(nn - dn, dn);
    let itch_out = mulmod_bnm1_size(itch_local, dn, inv_n);
    inv_n + itch_local + itch_out
}

/// Mulders–Hanrot–Zimmermann division with an approximate reciprocal.
/// Returns the high quotient limb.
pub fn mu_div_qr<W: Limb>(
    q_limbs: &mut [W],
    r_limbs: &mut [W],
    n_limbs: &[W],
    nn: usize,
    d_limbs: &[W],
    dn: usize,
    scratch: &mut [W],
) -> W {
    let qn = nn - dn;
    if qn + MU_DIV_QR_SKEW_THRESHOLD < dn {
        // Divide the most significant operand limbs first
        let mut qh = mu_div_qr_internal(
            q_limbs,
            &mut r_limbs[nn - (2 * qn + 1)..],
            &n_limbs[nn - (2 * qn + 1)..],
            2 * qn + 1,
            &d_limbs[dn - (qn + 1)..],
            qn + 1,
            scratch,
        );

        // Multiply the quotient by the remaining divisor limbs
        if dn - (qn + 1) > qn {
            mul(scratch, d_limbs, dn - (qn + 1), q_limbs, qn);
        } else {
            mul(scratch, q_limbs, qn, d_limbs, dn - (qn + 1));
        }

        let mut cy = W::ZERO;
        if qh != W::ZERO {
            cy = add_n_assign(&mut scratch[qn..], d_limbs, dn - (qn + 1));
        }
        scratch[dn - 1] = cy;

        cy = sub_n(r_limbs, n_limbs, scratch, nn - (2 * qn + 1));
        {
            let off = nn - (2 * qn + 1);
            let c1 = sub_n_assign(&mut r_limbs[off..], &scratch[off..], qn + 1);
            let c2 = sub_1_assign(&mut r_limbs[off..], qn + 1, cy);
            cy = c1.wrapping_add(c2);
        }
        if cy != W::ZERO {
            qh = qh.wrapping_sub(sub_1_assign(q_limbs, qn, W::ONE));
            add_n_assign(r_limbs, d_limbs, dn);
        }

        qh
    } else {
        mu_div_qr_internal(q_limbs, r_limbs, n_limbs, nn, d_limbs, dn, scratch)
    }
}

/// MHZ division once the quotient/divisor skew is acceptable.
pub fn mu_div_qr_internal<W: Limb>(
    q_limbs: &mut [W],
    r_limbs: &mut [W],
    n_limbs: &[W],
    nn: usize,
    d_limbs: &[W],
    dn: usize,
    scratch: &mut [W],
) -> W {
    debug_assert!(dn > 1);

    let qn = nn - dn;

    // Approximate inverse on in+1 limbs
    let inv_n = mu_div_qr_inverse_size(qn, dn);
    debug_assert!(inv_n <= dn);

    {
        let (i_limbs, tp) = scratch.split_at_mut(inv_n + 1);
        if dn == inv_n {
            tp[1..inv_n + 1].copy_from_slice(&d_limbs[..inv_n]);
            tp[0] = W::ONE;
            let mut inv_scratch = vec![W::ZERO; invertappr_scratch_size(inv_n + 1)];
            invertappr(i_limbs, &tp[..inv_n + 1], inv_n + 1, &mut inv_scratch);
            for i in 0..inv_n {
                i_limbs[i] = i_limbs[i + 1];
            }
        } else {
            let cy = super::add_1(tp, &d_limbs[dn - (inv_n + 1)..], inv_n + 1, W::ONE);
            if cy != W::ZERO {
                i_limbs[..inv_n].fill(W::ZERO);
            } else {
                let mut inv_scratch = vec![W::ZERO; invertappr_scratch_size(inv_n + 1)];
                invertappr(i_limbs, &tp[..inv_n + 1], inv_n + 1, &mut inv_scratch);
                for i in 0..inv_n {
                    i_limbs[i] = i_limbs[i + 1];
                }
            }
        }
    }

    let (i_limbs, rest) = scratch.split_at_mut(inv_n);
    preinv_mu_div_qr(q_limbs, r_limbs, n_limbs, nn, d_limbs, dn, i_limbs, inv_n, rest)
}

/// Block-iterated division with a pre-inverted approximate reciprocal.
pub fn preinv_mu_div_qr<W: Limb>(
    q_limbs: &mut [W],
    r_limbs: &mut [W],
    n_limbs: &[W],
    nn: usize,
    d_limbs: &[W],
    dn: usize,
    i_limbs: &[W],
    mut inv_n: usize,
    scratch: &mut [W],
) -> W {
    let mut qn = nn - dn;

    let mut nb = qn; // base of the unconsumed numerator limbs
    let mut qb = qn; // base of the next quotient block
    let mut ib = 0; // base into the inverse

    debug_assert!(nn >= dn);

    // Initialise the remainder with the top divisor-length limbs
    let qh = W::from_bool(cmp(&n_limbs[nb..], d_limbs, dn) >= 0);
    if qh != W::ZERO {
        sub_n(r_limbs, &n_limbs[nb..], d_limbs, dn);
    } else {
        r_limbs[..dn].copy_from_slice(&n_limbs[nb..nb + dn]);
    }

    if qn == 0 {
        return qh;
    }

    while qn > 0 {
        if qn < inv_n {
            ib += inv_n - qn;
            inv_n = qn;
        }
        nb -= inv_n;
        qb -= inv_n;

        // Next quotient block: inverse times the top of the remainder
        mul_n(scratch, &r_limbs[dn - inv_n..], &i_limbs[ib..], inv_n);
        super::add_n(
            &mut q_limbs[qb..],
            &scratch[inv_n..2 * inv_n],
            &r_limbs[dn - inv_n..dn],
            inv_n,
        );

        qn -= inv_n;

        // Product of the quotient block and the divisor
        if inv_n < INV_MULMOD_BNM1_THRESHOLD / 2 {
            mul(scratch, d_limbs, dn, &q_limbs[qb..], inv_n);
        } else {
            let tn = mulmod_bnm1_next_size(dn + 1);
            {
                let (s_lo, s_hi) = scratch.split_at_mut(tn);
                mulmod_bnm1(s_lo, tn, d_limbs, dn, &q_limbs[qb..], inv_n, s_hi);
            }
            let wn = (dn + inv_n) as isize - tn as isize; // wrapped limbs
            if wn > 0 {
                let wn = wn as usize;
                let mut c = sub_n_assign(scratch, &r_limbs[dn - wn..dn], wn);
                c = sub_1_assign(&mut scratch[wn..], tn - wn, c);
                let cx = W::from_bool(cmp(&r_limbs[dn - inv_n..], &scratch[dn..], tn - dn) < 0);
                incr_u(scratch, cx.wrapping_sub(c));
            }
        }

        let mut r = r_limbs[dn - inv_n].wrapping_sub(scratch[dn]);

        // Subtract the product from the remainder extended with new
        // numerator limbs
        if dn != inv_n {
            // scratch[0..in] = next numerator limbs - product low
            let c = super::sub_n_from(&mut scratch[..inv_n], &n_limbs[nb..nb + inv_n], inv_n);
            // scratch[in..dn] = old remainder low - product high, borrow in
            let c2;
            {
                let hi = &mut scratch[inv_n..dn];
                let c_rev = super::sub_n_from(hi, &r_limbs[..dn - inv_n], dn - inv_n);
                c2 = c_rev.wrapping_add(sub_1_assign(hi, dn - inv_n, c));
            }
            r_limbs[..dn].copy_from_slice(&scratch[..dn]);
            r = r.wrapping_sub(c2);
        } else {
            let c = sub_n(r_limbs, &n_limbs[nb..], &scratch[..inv_n], inv_n);
            r = r.wrapping_sub(c);
        }

        // Adjust the quotient
        while r != W::ZERO {
            incr_u(&mut q_limbs[qb..], W::ONE);
            let c = sub_n_assign(r_limbs, d_limbs, dn);
            r = r.wrapping_sub(c);
        }
        if cmp(r_limbs, d_limbs, dn) >= 0 {
            incr_u(&mut q_limbs[qb..], W::ONE);
            sub_n_assign(r_limbs, d_limbs, dn);
        }
    }

    qh
}

/// Approximate schoolbook division: the quotient may exceed the true
/// quotient only in its lowest limbs. Used inside [`basecase_invertappr`].
pub fn divappr_qr_1<W: Limb>(
    q_limbs: &mut [W],
    n_limbs: &mut [W],
    nn: usize,
    d_limbs: &[W],
    dn_in: usize,
    dinv: W,
) -> W {
    debug_assert!(dn_in > 2);
    debug_assert!(nn >= dn_in);
    debug_assert!(d_limbs[dn_in - 1] & W::HIGH_BIT != W::ZERO);

    let mut np = nn;
    let qn = nn - dn_in;

    let mut doff = 0usize;
    let mut dn = dn_in;
    if qn + 1 < dn {
        doff = dn - (qn + 1);
        dn = qn + 1;
    }

    let mut qh = W::from_bool(cmp(&n_limbs[np - dn..], &d_limbs[doff..], dn) >= 0);
    if qh != W::ZERO {
        sub_n_assign(&mut n_limbs[np - dn..], &d_limbs[doff..], dn);
    }

    let mut qp = qn;

    dn -= 2; // offset dn for the main loops, saving two submul_1 limbs
    let d1 = d_limbs[doff + dn + 1];
    let d0 = d_limbs[doff + dn];

    np -= 2;

    let mut n1 = n_limbs[np + 1];

    let mut i = qn as isize - (dn as isize + 2);
    while i >= 0 {
        np -= 1;
        let mut q;
        if n1 == d1 && n_limbs[np + 1] == d0 {
            q = W::MAX;
            submul_1(&mut n_limbs[np - dn..], &d_limbs[doff..], dn + 2, q);
            n1 = n_limbs[np + 1];
        } else {
            let (qq, nn1, mut n0) =
                word::udiv_qrnnndd_preinv(n1, n_limbs[np + 1], n_limbs[np], d1, d0, dinv);
            q = qq;
            n1 = nn1;

            let cy = submul_1(&mut n_limbs[np - dn..], &d_limbs[doff..], dn, q);

            let cy1 = W::from_bool(n0 < cy);
            n0 = n0.wrapping_sub(cy);
            let cy = W::from_bool(n1 < cy1);
            n1 = n1.wrapping_sub(cy1);
            n_limbs[np] = n0;

            if cy != W::ZERO {
                n1 = n1
                    .wrapping_add(d1)
                    .wrapping_add(add_n_assign(&mut n_limbs[np - dn..], &d_limbs[doff..], dn + 1));
                q = q.wrapping_sub(W::ONE);
            }
        }

        qp -= 1;
        q_limbs[qp] = q;
        i -= 1;
    }

    let mut flag = W::MAX;

    for _ in 0..dn {
        np -= 1;
        let mut q;
        if n1 >= (d1 & flag) {
            q = W::MAX;
            let cy = submul_1(&mut n_limbs[np - dn..], &d_limbs[doff..], dn + 2, q);

            if n1 != cy {
                if n1 < (cy & flag) {
                    q = q.wrapping_sub(W::ONE);
                    add_n_assign(&mut n_limbs[np - dn..], &d_limbs[doff..], dn + 2);
                } else {
                    flag = W::ZERO;
                }
            }
            n1 = n_limbs[np + 1];
        } else {
            let (qq, nn1, mut n0) =
                word::udiv_qrnnndd_preinv(n1, n_limbs[np + 1], n_limbs[np], d1, d0, dinv);
            q = qq;
            n1 = nn1;

            let cy = submul_1(&mut n_limbs[np - dn..], &d_limbs[doff..], dn, q);

            let cy1 = W::from_bool(n0 < cy);
            n0 = n0.wrapping_sub(cy);
            let cy = W::from_bool(n1 < cy1);
            n1 = n1.wrapping_sub(cy1);
            n_limbs[np] = n0;

            if cy != W::ZERO {
                n1 = n1
                    .wrapping_add(d1)
                    .wrapping_add(add_n_assign(&mut n_limbs[np - dn..], &d_limbs[doff..], dn + 1));
                q = q.wrapping_sub(W::ONE);
            }
        }

        qp -= 1;
        q_limbs[qp] = q;

        // Truncate the operands
        dn -= 1;
        doff += 1;
    }

    {
        np -= 1;
        let mut q;
        if n1 >= (d1 & flag) {
            q = W::MAX;
            let cy = submul_1(&mut n_limbs[np..], &d_limbs[doff..], 2, q);

            if n1 != cy {
                if n1 < (cy & flag) {
                    q = q.wrapping_sub(W::ONE);
                    let (h, l) = word::uadd(
                        n_limbs[np + 1],
                        n_limbs[np],
                        d_limbs[doff + 1],
                        d_limbs[doff],
                    );
                    n_limbs[np + 1] = h;
                    n_limbs[np] = l;
                } else {
                    flag = W::ZERO;
                }
            }
            let _ = flag;
        } else {
            let (qq, nn1, n0) =
                word::udiv_qrnnndd_preinv(n1, n_limbs[np + 1], n_limbs[np], d1, d0, dinv);
            q = qq;
            n_limbs[np + 1] = nn1;
            n_limbs[np] = n0;
        }

        qp -= 1;
        q_limbs[qp] = q;
    }

    debug_assert!(qp == 0);
    qh
}

/// Approximate divide-and-conquer division with equal-length numerator
/// halves.
pub fn divappr_qr_2_n<W: Limb>(
    q_limbs: &mut [W],
    n_limbs: &mut [W],
    d_limbs: &[W],
    n: usize,
    dinv: W,
    scratch: &mut [W],
) -> W {
    let lo = n >> 1;
    let hi = n - lo;

    let mut qh = if hi < DIV_QR_THRESHOLD {
        basecase_div_qr(
            &mut q_limbs[lo..],
            &mut n_limbs[2 * lo..],
            2 * hi,
            &d_limbs[lo..],
            hi,
            dinv,
        )
    } else {
        general_div_qr_n(
            &mut q_limbs[lo..],
            &mut n_limbs[2 * lo..],
            &d_limbs[lo..],
            hi,
            dinv,
            scratch,
        )
    };

    mul(scratch, &q_limbs[lo..lo + hi], hi, &d_limbs[..lo], lo);

    let mut cy = sub_n_assign(&mut n_limbs[lo..], &scratch[..n], n);
    if qh != W::ZERO {
        cy = cy.wrapping_add(sub_n_assign(&mut n_limbs[n..], &d_limbs[..lo], lo));
    }

    while cy != W::ZERO {
        qh = qh.wrapping_sub(sub_1_assign(&mut q_limbs[lo..], hi, W::ONE));
        cy = cy.wrapping_sub(add_n_assign(&mut n_limbs[lo..], d_limbs, n));
    }

    let ql = if lo < DIVAPPR_Q_THRESHOLD {
        divappr_qr_1(q_limbs, &mut n_limbs[hi..], 2 * lo, &d_limbs[hi..], lo, dinv)
    } else {
        divappr_qr_2_n(q_limbs, &mut n_limbs[hi..], &d_limbs[hi..], lo, dinv, scratch)
    };

    if ql != W::ZERO {
        q_limbs[..lo].fill(W::MAX);
    }

    qh
}

/// Approximate division for larger divisors, reducing the quotient in
/// divisor-sized blocks.
pub fn divappr_qr_2<W: Limb>(
    q_limbs: &mut [W],
    n_limbs: &mut [W],
    nn: usize,
    d_limbs: &[W],
    dn: usize,
    dinv: W,
) -> W {
    debug_assert!(dn >= 6);
    debug_assert!(nn > dn);
    debug_assert!(d_limbs[dn - 1] & W::HIGH_BIT != W::ZERO);

    let mut qn = nn - dn;
    let mut qb = qn; // quotient base offset
    let mut nb = nn; // numerator base offset
    let db = dn; // divisor base offset (d_limbs += dn)

    let mut qh;

    if qn >= dn {
        // An extra limb so that dn-1 = qn quotient limbs remain
        qn += 1;

        // Reduce qn mod dn
        while qn > dn {
            qn -= dn;
        }

        qb -= qn;
        nb -= qn;

        let mut tp = vec![W::ZERO; dn];

        if qn == 1 {
            qh = W::from_bool(cmp(&n_limbs[nb - dn + 1..], &d_limbs[db - dn..], dn) >= 0);
            if qh != W::ZERO {
                sub_n_assign(&mut n_limbs[nb - dn + 1..], &d_limbs[db - dn..], dn);
            }

            let n2 = n_limbs[nb];
            let mut n1 = n_limbs[nb - 1];
            let n0 = n_limbs[nb - 2];
            let d1 = d_limbs[db - 1];
            let d0 = d_limbs[db - 2];

            debug_assert!(n2 < d1 || (n2 == d1 && n1 <= d0));

            let q;
            if n2 == d1 && n1 == d0 {
                q = W::MAX;
                let cy = submul_1(&mut n_limbs[nb - dn..], &d_limbs[db - dn..], dn, q);
                debug_assert!(cy == n2);
            } else {
                let (mut qq, nn1, mut n0b) = word::udiv_qrnnndd_preinv(n2, n1, n0, d1, d0, dinv);
                n1 = nn1;

                if dn > 2 {
                    let cy = submul_1(&mut n_limbs[nb - dn..], &d_limbs[db - dn..], dn - 2, qq);

                    let cy1 = W::from_bool(n0b < cy);
                    n0b = n0b.wrapping_sub(cy);
                    let cy = W::from_bool(n1 < cy1);
                    n1 = n1.wrapping_sub(cy1);
                    n_limbs[nb - 2] = n0b;

                    if cy != W::ZERO {
                        n1 = n1.wrapping_add(d1).wrapping_add(add_n_assign(
                            &mut n_limbs[nb - dn..],
                            &d_limbs[db - dn..],
                            dn - 1,
                        ));
                        qh = qh.wrapping_sub(W::from_bool(qq == W::ZERO));
                        qq = qq.wrapping_sub(W::ONE);
                    }
                } else {
                    n_limbs[nb - 2] = n0b;
                }

                n_limbs[nb - 1] = n1;
                q = qq;
            }
            q_limbs[qb] = q;
        } else {
            if qn == 2 {
                qh = divrem_2(&mut q_limbs[qb..], 0, &mut n_limbs[nb - 2..], 4, &d_limbs[db - 2..]);
            } else if qn < DIV_QR_THRESHOLD {
                qh = basecase_div_qr(
                    &mut q_limbs[qb..],
                    &mut n_limbs[nb - qn..],
                    2 * qn,
                    &d_limbs[db - qn..],
                    qn,
                    dinv,
                );
            } else {
                qh = general_div_qr_n(
                    &mut q_limbs[qb..],
                    &mut n_limbs[nb - qn..],
                    &d_limbs[db - qn..],
                    qn,
                    dinv,
                    &mut tp,
                );
            }

            if qn != dn {
                if qn > dn - qn {
                    mul(&mut tp, &q_limbs[qb..qb + qn], qn, &d_limbs[db - dn..], dn - qn);
                } else {
                    mul(&mut tp, &d_limbs[db - dn..db - qn], dn - qn, &q_limbs[qb..], qn);
                }

                let mut cy = sub_n_assign(&mut n_limbs[nb - dn..], &tp, dn);
                if qh != W::ZERO {
                    cy = cy.wrapping_add(sub_n_assign(
                        &mut n_limbs[nb - dn + qn..],
                        &d_limbs[db - dn..],
                        dn - qn,
                    ));
                }

                while cy != W::ZERO {
                    qh = qh.wrapping_sub(sub_1_assign(&mut q_limbs[qb..], qn, W::ONE));
                    cy = cy.wrapping_sub(add_n_assign(
                        &mut n_limbs[nb - dn..],
                        &d_limbs[db - dn..],
                        dn,
                    ));
                }
            }
        }

        let mut qn_left = nn - dn - qn + 1;
        while qn_left > dn {
            qb -= dn;
            nb -= dn;
            general_div_qr_n(
                &mut q_limbs[qb..],
                &mut n_limbs[nb - dn..],
                &d_limbs[db - dn..],
                dn,
                dinv,
                &mut tp,
            );
            qn_left -= dn;
        }

        // Remove the extra quotient limb and correct
        qn_left -= 1;
        qb -= qn_left;
        nb -= dn;
        let qsave = q_limbs[qb + qn_left];
        divappr_qr_2_n(
            &mut q_limbs[qb..],
            &mut n_limbs[nb - dn..],
            &d_limbs[db - dn..],
            dn,
            dinv,
            &mut tp,
        );
        for i in 0..qn_left {
            q_limbs[qb + i] = q_limbs[qb + i + 1];
        }
        q_limbs[qb + qn_left] = qsave;
    } else {
        qb -= qn;
        nb -= qn;

        let mut q2p = vec![W::ZERO; qn + 1];

        if qn < DIVAPPR_Q_THRESHOLD {
            qh = divappr_qr_1(
                &mut q2p,
                &mut n_limbs[nb - qn - 2..],
                2 * (qn + 1),
                &d_limbs[db - (qn + 1)..],
                qn + 1,
                dinv,
            );
        } else {
            let mut tp = vec![W::ZERO; qn + 1];
            qh = divappr_qr_2_n(
                &mut q2p,
                &mut n_limbs[nb - qn - 2..],
                &d_limbs[db - (qn + 1)..],
                qn + 1,
                dinv,
                &mut tp,
            );
        }
        q_limbs[qb..qb + qn].copy_from_slice(&q2p[1..qn + 1]);
    }

    qh
}

/// Basecase approximate inversion to the top `n` limbs.
pub fn basecase_invertappr<W: Limb>(
    i_limbs: &mut [W],
    d_limbs: &[W],
    n: usize,
    scratch: &mut [W],
) -> W {
    debug_assert!(n > 0);
    debug_assert!(d_limbs[n - 1] & W::HIGH_BIT != W::ZERO);

    if n == 1 {
        let meta = ModMeta::init(d_limbs[0]);
        i_limbs[0] = meta.m_inv;
    } else {
        // scratch holds B^2n - d·B^n - 1
        scratch[..n].fill(W::MAX);
        super::ones_complement(&mut scratch[n..], d_limbs, n);

        if n == 2 {
            divrem_2(i_limbs, 0, scratch, 4, d_limbs);
        } else {
            let meta = ModMeta::init_2(d_limbs[n - 1], d_limbs[n - 2]);
            if n < DIVAPPR_Q_THRESHOLD {
                divappr_qr_1(i_limbs, scratch, 2 * n, d_limbs, n, meta.m_inv);
            } else {
                divappr_qr_2(i_limbs, scratch, 2 * n, d_limbs, n, meta.m_inv);
            }
            sub_1_assign(i_limbs, n, W::ONE);
            return W::ONE;
        }
    }
    W::ZERO
}

/// Newton iteration for approximate inversion, doubling the valid
/// precision each step down a precomputed size ladder.
pub fn newton_invertappr<W: Limb>(
    i_limbs: &mut [W],
    d_limbs: &[W],
    n_in: usize,
    scratch: &mut [W],
) -> W {
    debug_assert!(n_in > 2);
    debug_assert!(d_limbs[n_in - 1] & W::HIGH_BIT != W::ZERO);

    // Compute the precision ladder from highest to lowest
    let mut sizes = Vec::new();
    let mut rn = n_in;
    loop {
        sizes.push(rn);
        rn = (rn >> 1) + 1;
        if rn < INV_NEWTON_THRESHOLD {
            break;
        }
    }

    // The inverse of 0.{d,n} computed as 1.{i,n}; work against the top
    let dp = n_in; // virtual d pointer offset
    let ip = n_in; // virtual i pointer offset

    basecase_invertappr(
        &mut i_limbs[ip - rn..],
        &d_limbs[dp - rn..],
        rn,
        scratch,
    );

    let mut wrap_tp: Vec<W> = Vec::new();
    let mut mn = 0usize;
    if n_in >= INV_MULMOD_BNM1_THRESHOLD {
        mn = mulmod_bnm1_next_size(n_in + 1);
        wrap_tp = vec![W::ZERO; mulmod_bnm1_size(mn, n_in, (n_in >> 1) + 1)];
    }

    let mut cy = W::ZERO;
    let mut idx = sizes.len();
    loop {
        idx -= 1;
        let n = sizes[idx];

        // xp in the upper scratch area, n + rn limbs
        let method;
        {
            let (_, xp_area) = scratch.split_at_mut(n_in + 3);
            let xp = xp_area;

            let use_plain = n < INV_MULMOD_BNM1_THRESHOLD || {
                mn = mulmod_bnm1_next_size(n + 1);
                mn > n + rn
            };

            if use_plain {
                // Truncated product
                method = true;
                mul(xp, &d_limbs[dp - n..], n, &i_limbs[ip - rn..], rn);
                add_n_assign(&mut xp[rn..], &d_limbs[dp - n..], n - rn + 1);
            } else {
                // Wrapped product mod B^mn - 1
                method = false;
                mulmod_bnm1(
                    xp,
                    mn,
                    &d_limbs[dp - n..],
                    n,
                    &i_limbs[ip - rn..],
                    rn,
                    &mut wrap_tp,
                );

                debug_assert!(n >= mn - rn);
                xp[mn] = W::ONE.wrapping_add(add_n_assign(&mut xp[rn..], &d_limbs[dp - n..], mn - rn));
                let c = add_n_assign(xp, &d_limbs[dp - (n - (mn - rn))..], n - (mn - rn));
                add_1_assign(&mut xp[n - (mn - rn)..], mn + 1 - n + (mn - rn), c);
                debug_assert!(n + rn >= mn);

                sub_1_assign(&mut xp[rn + n - mn..], 2 * mn + 1 - rn - n, W::ONE);
                if xp[mn] != W::ZERO {
                    let v = xp[mn].wrapping_sub(W::ONE);
                    add_1_assign(xp, mn, v);
                } else {
                    sub_1_assign(xp, mn, W::ONE);
                }
            }

            if xp[n] < W::from_u8(2) {
                // Positive residue class
                let mut c = W::ONE;
                while xp[n] != W::ZERO || cmp(xp, &d_limbs[dp - n..], n) > 0 {
                    let b = sub_n_assign(xp, &d_limbs[dp - n..], n);
                    xp[n] = xp[n].wrapping_sub(b);
                    c = c.wrapping_add(W::ONE);
                }
                sub_1_assign(&mut i_limbs[ip - rn..], rn, c);
                debug_assert!(c <= W::from_u8(4));
                super::sub_n_from(xp, &d_limbs[dp - n..], n);
                debug_assert!(xp[n] == W::ZERO);
            } else {
                // Negative residue class
                super::ones_complement_assign(xp, n + 1);
                add_1_assign(xp, n + 1, W::from_bool(method));
                debug_assert!(xp[n] <= W::ONE);
                if xp[n] != W::ZERO {
                    add_1_assign(&mut i_limbs[ip - rn..], rn, W::ONE);
                    sub_n_assign(xp, &d_limbs[dp - n..], n);
                }
            }
        }

        // scratch = top of the residual times the current inverse
        {
            let (mul_area, xp_area) = scratch.split_at_mut(n_in + 3);
            mul_n(
                mul_area,
                &xp_area[n - rn..n],
                &i_limbs[ip - rn..ip],
                rn,
            );
            let c1 = add_n_assign(&mut mul_area[rn..], &xp_area[n - rn..n - rn + (2 * rn - n)], 2 * rn - n);
            cy = super::add_nc(
                &mut i_limbs[ip - n..],
                &mul_area[3 * rn - n..3 * rn - n + (n - rn)],
                &xp_area[rn..rn + (n - rn)],
                n - rn,
                c1,
            );
        }
        add_1_assign(&mut i_limbs[ip - rn..], rn, cy);

        if idx == 0 {
            cy = W::from_bool(scratch[3 * rn - n - 1] > W::MAX.wrapping_sub(W::from_u8(7)));
            break;
        }
        rn = n;
    }

    cy
}

/// Approximate reciprocal good to the top `n` limbs with at most 1 ulp
/// error; dispatches between the basecase and Newton iteration.
pub fn invertappr<W: Limb>(i_limbs: &mut [W], d_limbs: &[W], n: usize, scratch: &mut [W]) -> W {
    debug_assert!(n > 0);
    debug_assert!(d_limbs[n - 1] & W::HIGH_BIT != W::ZERO);

    if n < INV_NEWTON_THRESHOLD {
        basecase_invertappr(i_limbs, d_limbs, n, scratch)
    } else {
        newton_invertappr(i_limbs, d_limbs, n, scratch)
    }
}

/// Schoolbook division against a normalised divisor of more than two
/// limbs. The numerator is overwritten with the remainder. Returns the
/// high quotient limb.
pub fn basecase_div_qr<W: Limb>(
    q_limbs: &mut [W],
    n_limbs: &mut [W],
    nn: usize,
    d_limbs: &[W],
    dn_in: usize,
    dinv: W,
) -> W {
    debug_assert!(dn_in > 2);
    debug_assert!(nn >= dn_in);
    debug_assert!(d_limbs[dn_in - 1] & W::HIGH_BIT != W::ZERO);

    let mut np = nn;

    let qh = W::from_bool(cmp(&n_limbs[np - dn_in..], d_limbs, dn_in) >= 0);
    if qh != W::ZERO {
        sub_n_assign(&mut n_limbs[np - dn_in..], d_limbs, dn_in);
    }

    let mut qp = nn - dn_in;

    let dn = dn_in - 2; // saves two iterations in submul_1
    let d1 = d_limbs[dn + 1];
    let d0 = d_limbs[dn];

    np -= 2;

    let mut n1 = n_limbs[np + 1];

    for _ in 0..nn - dn_in {
        np -= 1;
        let mut q;
        if n1 == d1 && n_limbs[np + 1] == d0 {
            q = W::MAX;
            submul_1(&mut n_limbs[np - dn..], d_limbs, dn + 2, q);
            n1 = n_limbs[np + 1]; // the cached value is now stale
        } else {
            let (qq, nn1, mut n0) =
                word::udiv_qrnnndd_preinv(n1, n_limbs[np + 1], n_limbs[np], d1, d0, dinv);
            q = qq;
            n1 = nn1;

            let cy = submul_1(&mut n_limbs[np - dn..], d_limbs, dn, q);
            let cy1 = W::from_bool(n0 < cy);

            n0 = n0.wrapping_sub(cy);
            let cy = W::from_bool(n1 < cy1);
            n1 = n1.wrapping_sub(cy1);
            n_limbs[np] = n0;

            if cy != W::ZERO {
                n1 = n1
                    .wrapping_add(d1)
                    .wrapping_add(add_n_assign(&mut n_limbs[np - dn..], d_limbs, dn + 1));
                q = q.wrapping_sub(W::ONE);
            }
        }

        qp -= 1;
        q_limbs[qp] = q;
    }
    n_limbs[np + 1] = n1;

    qh
}

/// Divide-and-conquer division with equal-length halves.
pub fn general_div_qr_n<W: Limb>(
    q_limbs: &mut [W],
    n_limbs: &mut [W],
    d_limbs: &[W],
    n: usize,
    dinv: W,
    scratch: &mut [W],
) -> W {
    let lo = n >> 1;
    let hi = n - lo;

    let mut qh = if hi < DIV_QR_THRESHOLD {
        basecase_div_qr(
            &mut q_limbs[lo..],
            &mut n_limbs[2 * lo..],
            2 * hi,
            &d_limbs[lo..],
            hi,
            dinv,
        )
    } else {
        general_div_qr_n(
            &mut q_limbs[lo..],
            &mut n_limbs[2 * lo..],
            &d_limbs[lo..],
            hi,
            dinv,
            scratch,
        )
    };

    mul(scratch, &q_limbs[lo..lo + hi], hi, &d_limbs[..lo], lo);

    let mut cy = sub_n_assign(&mut n_limbs[lo..], &scratch[..n], n);
    if qh != W::ZERO {
        cy = cy.wrapping_add(sub_n_assign(&mut n_limbs[n..], &d_limbs[..lo], lo));
    }

    while cy != W::ZERO {
        qh = qh.wrapping_sub(sub_1_assign(&mut q_limbs[lo..], hi, W::ONE));
        cy = cy.wrapping_sub(add_n_assign(&mut n_limbs[lo..], d_limbs, n));
    }

    let ql = if lo < DIV_QR_THRESHOLD {
        basecase_div_qr(
            q_limbs,
            &mut n_limbs[hi..],
            2 * lo,
            &d_limbs[hi..],
            lo,
            dinv,
        )
    } else {
        general_div_qr_n(q_limbs, &mut n_limbs[hi..], &d_limbs[hi..], lo, dinv, scratch)
    };

    mul(scratch, &d_limbs[..hi], hi, &q_limbs[..lo], lo);

    let mut cy = sub_n_assign(n_limbs, &scratch[..n], n);
    if ql != W::ZERO {
        cy = cy.wrapping_add(sub_n_assign(&mut n_limbs[lo..], &d_limbs[..hi], hi));
    }

    while cy != W::ZERO {
        sub_1_assign(q_limbs, lo, W::ONE);
        cy = cy.wrapping_sub(add_n_assign(n_limbs, d_limbs, n));
    }

    qh
}

/// Divide-and-conquer division for arbitrary lengths; the quotient is
/// computed in divisor-sized blocks from the top.
pub fn general_div_qr<W: Limb>(
    q_limbs: &mut [W],
    n_limbs: &mut [W],
    nn: usize,
    d_limbs: &[W],
    dn: usize,
    dinv: W,
) -> W {
    debug_assert!(dn >= 6);
    debug_assert!(nn - dn >= 3);
    debug_assert!(d_limbs[dn - 1] & W::HIGH_BIT != W::ZERO);

    let mut tp = vec![W::ZERO; dn];

    let mut qn = nn - dn;
    let mut qb = qn;
    let mut nb = nn;
    let db = dn;

    let mut qh;

    if qn > dn {
        // Reduce qn mod dn without division
        while qn > dn {
            qn -= dn;
        }

        qb -= qn;
        nb -= qn;

        if qn == 1 {
            qh = W::from_bool(cmp(&n_limbs[nb - dn + 1..], &d_limbs[db - dn..], dn) >= 0);
            if qh != W::ZERO {
                sub_n_assign(&mut n_limbs[nb - dn + 1..], &d_limbs[db - dn..], dn);
            }

            let n2 = n_limbs[nb];
            let mut n1 = n_limbs[nb - 1];
            let n0 = n_limbs[nb - 2];
            let d1 = d_limbs[db - 1];
            let d0 = d_limbs[db - 2];

            debug_assert!(n2 < d1 || (n2 == d1 && n1 <= d0));

            let q;
            if n2 == d1 && n1 == d0 {
                q = W::MAX;
                let cy = submul_1(&mut n_limbs[nb - dn..], &d_limbs[db - dn..], dn, q);
                debug_assert!(cy == n2);
            } else {
                let (mut qq, nn1, mut n0b) = word::udiv_qrnnndd_preinv(n2, n1, n0, d1, d0, dinv);
                n1 = nn1;

                if dn > 2 {
                    let cy = submul_1(&mut n_limbs[nb - dn..], &d_limbs[db - dn..], dn - 2, qq);

                    let cy1 = W::from_bool(n0b < cy);
                    n0b = n0b.wrapping_sub(cy);
                    let cy = W::from_bool(n1 < cy1);
                    n1 = n1.wrapping_sub(cy1);
                    n_limbs[nb - 2] = n0b;

                    if cy != W::ZERO {
                        n1 = n1.wrapping_add(d1).wrapping_add(add_n_assign(
                            &mut n_limbs[nb - dn..],
                            &d_limbs[db - dn..],
                            dn - 1,
                        ));
                        qh = qh.wrapping_sub(W::from_bool(qq == W::ZERO));
                        qq = qq.wrapping_sub(W::ONE);
                    }
                } else {
                    n_limbs[nb - 2] = n0b;
                }

                n_limbs[nb - 1] = n1;
                q = qq;
            }
            q_limbs[qb] = q;
        } else {
            if qn == 2 {
                qh = divrem_2(&mut q_limbs[qb..], 0, &mut n_limbs[nb - 2..], 4, &d_limbs[db - 2..]);
            } else if qn < DIV_QR_THRESHOLD {
                qh = basecase_div_qr(
                    &mut q_limbs[qb..],
                    &mut n_limbs[nb - qn..],
                    2 * qn,
                    &d_limbs[db - qn..],
                    qn,
                    dinv,
                );
            } else {
                qh = general_div_qr_n(
                    &mut q_limbs[qb..],
                    &mut n_limbs[nb - qn..],
                    &d_limbs[db - qn..],
                    qn,
                    dinv,
                    &mut tp,
                );
            }

            if qn != dn {
                if qn > dn - qn {
                    mul(&mut tp, &q_limbs[qb..qb + qn], qn, &d_limbs[db - dn..], dn - qn);
                } else {
                    mul(&mut tp, &d_limbs[db - dn..db - qn], dn - qn, &q_limbs[qb..], qn);
                }

                let mut cy = sub_n_assign(&mut n_limbs[nb - dn..], &tp, dn);
                if qh != W::ZERO {
                    cy = cy.wrapping_add(sub_n_assign(
                        &mut n_limbs[nb - dn + qn..],
                        &d_limbs[db - dn..],
                        dn - qn,
                    ));
                }

                while cy != W::ZERO {
                    qh = qh.wrapping_sub(sub_1_assign(&mut q_limbs[qb..], qn, W::ONE));
                    cy = cy.wrapping_sub(add_n_assign(
                        &mut n_limbs[nb - dn..],
                        &d_limbs[db - dn..],
                        dn,
                    ));
                }
            }
        }

        let mut qn_left = (nn - dn - qn) as isize;
        loop {
            qb -= dn;
            nb -= dn;
            general_div_qr_n(
                &mut q_limbs[qb..],
                &mut n_limbs[nb - dn..],
                &d_limbs[db - dn..],
                dn,
                dinv,
                &mut tp,
            );
            qn_left -= dn as isize;
            if qn_left <= 0 {
                break;
            }
        }
    } else {
        qb -= qn;
        nb -= qn;

        if qn < DIV_QR_THRESHOLD {
            qh = basecase_div_qr(
                &mut q_limbs[qb..],
                &mut n_limbs[nb - qn..],
                2 * qn,
                &d_limbs[db - qn..],
                qn,
                dinv,
            );
        } else {
            qh = general_div_qr_n(
                &mut q_limbs[qb..],
                &mut n_limbs[nb - qn..],
                &d_limbs[db - qn..],
                qn,
                dinv,
                &mut tp,
            );
        }

        if qn != dn {
            if qn > dn - qn {
                mul(&mut tp, &q_limbs[qb..qb + qn], qn, &d_limbs[db - dn..], dn - qn);
            } else {
                mul(&mut tp, &d_limbs[db - dn..db - qn], dn - qn, &q_limbs[qb..], qn);
            }

            let mut cy = sub_n_assign(&mut n_limbs[nb - dn..], &tp, dn);
            if qh != W::ZERO {
                cy = cy.wrapping_add(sub_n_assign(
                    &mut n_limbs[nb - dn + qn..],
                    &d_limbs[db - dn..],
                    dn - qn,
                ));
            }

            while cy != W::ZERO {
                qh = qh.wrapping_sub(sub_1_assign(&mut q_limbs[qb..], qn, W::ONE));
                cy = cy.wrapping_sub(add_n_assign(&mut n_limbs[nb - dn..], &d_limbs[db - dn..], dn));
            }
        }
    }

    qh
}

/// Truncated division: the public quotient-and-remainder entry point.
///
/// `q_limbs` receives `nn - dn + 1` quotient limbs, `r_limbs` the `dn`
/// remainder limbs. The numerator and divisor are preserved.
///
/// Panics when the divisor is zero.
pub fn tdiv_qr<W: Limb>(
    q_limbs: &mut [W],
    r_limbs: &mut [W],
    n_limbs: &[W],
    nn: usize,
    d_limbs: &[W],
    dn: usize,
) {
    assert!(dn > 0, "division by zero");
    debug_assert!(dn == 0 || d_limbs[dn - 1] != W::ZERO);
    debug_assert!(nn >= dn);

    match dn {
        1 => {
            r_limbs[0] = div_qr_1(Some(q_limbs), n_limbs, nn, d_limbs[0]);
        }

        2 => {
            let mut n2p = vec![W::ZERO; nn + 1];
            if d_limbs[1] & W::HIGH_BIT == W::ZERO {
                let cnt = d_limbs[1].leading_zeros();
                let d2p = [
                    d_limbs[0] << cnt,
                    (d_limbs[1] << cnt) | (d_limbs[0] >> (W::BITS - cnt)),
                ];
                let cy = lshift(&mut n2p, n_limbs, nn, cnt);
                n2p[nn] = cy;
                let extra = usize::from(cy != W::ZERO);
                let qhl = divrem_2(q_limbs, 0, &mut n2p, nn + extra, &d2p);
                if cy == W::ZERO {
                    q_limbs[nn - 2] = qhl; // nn-2+1 quotient limbs are always stored
                }
                r_limbs[0] = (n2p[0] >> cnt) | (n2p[1] << (W::BITS - cnt));
                r_limbs[1] = n2p[1] >> cnt;
            } else {
                n2p[..nn].copy_from_slice(&n_limbs[..nn]);
                let qhl = divrem_2(q_limbs, 0, &mut n2p, nn, d_limbs);
                q_limbs[nn - 2] = qhl;
                r_limbs[0] = n2p[0];
                r_limbs[1] = n2p[1];
            }
        }

        _ => {
            let adjust = usize::from(n_limbs[nn - 1] >= d_limbs[dn - 1]);
            if nn + adjust >= 2 * dn {
                // The quotient is at least half the numerator length
                q_limbs[nn - dn] = W::ZERO;

                let mut cnt = 0u32;
                let mut d2pvec: Vec<W> = Vec::new();
                let mut n2p = vec![W::ZERO; nn + 1];
                let d2p: &[W] = if d_limbs[dn - 1] & W::HIGH_BIT == W::ZERO {
                    cnt = d_limbs[dn - 1].leading_zeros();
                    d2pvec = vec![W::ZERO; dn];
                    lshift(&mut d2pvec, d_limbs, dn, cnt);
                    let cy = lshift(&mut n2p, n_limbs, nn, cnt);
                    n2p[nn] = cy;
                    &d2pvec
                } else {
                    n2p[..nn].copy_from_slice(&n_limbs[..nn]);
                    n2p[nn] = W::ZERO;
                    d_limbs
                };
                let nn_adj = nn + adjust;

                let meta = ModMeta::init_2(d2p[dn - 1], d2p[dn - 2]);
                let dinv = meta.m_inv;

                if dn < DIV_QR_THRESHOLD {
                    basecase_div_qr(q_limbs, &mut n2p, nn_adj, d2p, dn, dinv);
                } else if dn < MU_DEN_DIV_QR_THRESHOLD
                    || nn_adj < 2 * MU_DIV_QR_THRESHOLD
                    || ((2 * (MU_DIV_QR_THRESHOLD - MU_DEN_DIV_QR_THRESHOLD)) as f64) * dn as f64
                        + (MU_DEN_DIV_QR_THRESHOLD as f64) * nn_adj as f64
                        > dn as f64 * nn_adj as f64
                {
                    general_div_qr(q_limbs, &mut n2p, nn_adj, d2p, dn, dinv);
                } else {
                    let itch = mu_div_qr_scratch_size(nn_adj, dn);
                    let mut scratch = vec![W::ZERO; itch];
                    let mut r2p = vec![W::ZERO; dn];
                    mu_div_qr(q_limbs, &mut r2p, &n2p, nn_adj, d2p, dn, &mut scratch);
                    n2p[..dn].copy_from_slice(&r2p);
                }

                if cnt != 0 {
                    rshift(r_limbs, &n2p, dn, cnt);
                } else {
                    r_limbs[..dn].copy_from_slice(&n2p[..dn]);
                }
                return;
            }

            // The numerator is less than twice the denominator: divide the
            // two top quotient-length blocks and fix up against the ignored
            // divisor limbs.
            let mut qn = nn - dn;
            q_limbs[qn] = W::ZERO;
            qn += adjust;

            if qn == 0 {
                r_limbs[..dn].copy_from_slice(&n_limbs[..dn]);
                return;
            }

            let mut in_ = dn - qn; // ignored divisor limbs
            let mut n2pvec = vec![W::ZERO; 2 * qn + 1];
            let mut n2b = 0usize; // base offset into n2pvec
            let mut d2pvec: Vec<W> = Vec::new();

            let cnt;
            let d2p: &[W] = if d_limbs[dn - 1] & W::HIGH_BIT == W::ZERO {
                cnt = d_limbs[dn - 1].leading_zeros();

                d2pvec = vec![W::ZERO; qn];
                lshift(&mut d2pvec, &d_limbs[in_..], qn, cnt);
                d2pvec[0] = d2pvec[0] | (d_limbs[in_ - 1] >> (W::BITS - cnt));

                let cy = lshift(&mut n2pvec, &n_limbs[nn - 2 * qn..], 2 * qn, cnt);
                if adjust != 0 {
                    n2pvec[2 * qn] = cy;
                    n2b += 1;
                } else {
                    n2pvec[0] = n2pvec[0] | (n_limbs[nn - 2 * qn - 1] >> (W::BITS - cnt));
                }
                &d2pvec
            } else {
                cnt = 0;
                n2pvec[..2 * qn].copy_from_slice(&n_limbs[nn - 2 * qn..nn]);
                if adjust != 0 {
                    n2pvec[2 * qn] = W::ZERO;
                    n2b += 1;
                }
                &d_limbs[in_..]
            };

            // Approximate quotient from the extracted operands
            if qn == 1 {
                let (q0, r0) = W::udiv_qrnnd(n2pvec[n2b + 1], n2pvec[n2b], d2p[0]);
                n2pvec[n2b] = r0;
                q_limbs[0] = q0;
            } else if qn == 2 {
                divrem_2(q_limbs, 0, &mut n2pvec[n2b..], 4, d2p);
            } else {
                let meta = ModMeta::init_2(d2p[qn - 1], d2p[qn - 2]);
                let dinv = meta.m_inv;
                if qn < DIV_QR_THRESHOLD {
                    basecase_div_qr(q_limbs, &mut n2pvec[n2b..], 2 * qn, d2p, qn, dinv);
                } else if qn < MU_DIV_QR_THRESHOLD {
                    general_div_qr(q_limbs, &mut n2pvec[n2b..], 2 * qn, d2p, qn, dinv);
                } else {
                    let itch = mu_div_qr_scratch_size(2 * qn, qn);
                    let mut scratch = vec![W::ZERO; itch];
                    let mut r2p = vec![W::ZERO; qn];
                    mu_div_qr(q_limbs, &mut r2p, &n2pvec[n2b..], 2 * qn, d2p, qn, &mut scratch);
                    n2pvec[n2b..n2b + qn].copy_from_slice(&r2p);
                }
            }

            let mut rn = qn;

            // If the product of the first ignored divisor limb and the top
            // quotient limb exceeds the top partial remainder limb, the
            // quotient estimate is one too large.
            {
                let dl = if in_ < 2 { W::ZERO } else { d_limbs[in_ - 2] };
                let mask = W::BITS - 1;
                let x = (d_limbs[in_ - 1] << cnt)
                    | ((dl >> 1) >> ((!cnt) & mask));
                let (h, _) = x.umul(q_limbs[qn - 1]);

                if n2pvec[n2b + qn - 1] < h {
                    decr_u(q_limbs, W::ONE);
                    let cy = add_n_assign(&mut n2pvec[n2b..], d2p, qn);
                    if cy != W::ZERO {
                        // The partial remainder is safely large
                        n2pvec[n2b + qn] = cy;
                        rn += 1;
                    }
                }
            }

            let mut quotient_too_large = W::ZERO;
            if cnt != 0 {
                // Append the partially used numerator limb to the partial
                // remainder and update it with the partially used divisor limb
                let cy1 = lshift_assign_at(&mut n2pvec, n2b, rn, W::BITS - cnt);
                n2pvec[n2b] = n2pvec[n2b] | (n_limbs[in_ - 1] & (W::MAX >> cnt));

                let cy2 = submul_1(
                    &mut n2pvec[n2b..],
                    &q_limbs[..qn],
                    qn,
                    d_limbs[in_ - 1] & (W::MAX >> cnt),
                );
                if qn != rn {
                    n2pvec[n2b + qn] = n2pvec[n2b + qn].wrapping_sub(cy2);
                } else {
                    n2pvec[n2b + qn] = cy1.wrapping_sub(cy2);
                    quotient_too_large = W::from_bool(cy1 < cy2);
                    rn += 1;
                }
                in_ -= 1;
            }

            // Recover the remainder into a working buffer one limb longer
            // than the divisor so borrow propagation cannot run off the end
            let mut rw = vec![W::ZERO; dn + 2];
            let mut tp = vec![W::ZERO; dn];
            let mut finished = false;
            if in_ < qn && in_ == 0 {
                rw[..rn].copy_from_slice(&n2pvec[n2b..n2b + rn]);
                finished = true;
            } else if in_ < qn {
                mul(&mut tp, &q_limbs[..qn], qn, &d_limbs[..in_], in_);
            } else {
                mul(&mut tp, &d_limbs[..in_], in_, &q_limbs[..qn], qn);
            }

            if !finished {
                let cy = super::sub_assign(&mut n2pvec[n2b..], rn, &tp[in_..in_ + qn], qn);
                rw[in_..in_ + (dn - in_)].copy_from_slice(&n2pvec[n2b..n2b + dn - in_]);
                quotient_too_large = quotient_too_large | cy;
                let cy = sub_n(&mut rw, n_limbs, &tp, in_);
                let cy = sub_1_assign(&mut rw[in_..], rn, cy);
                quotient_too_large = quotient_too_large | cy;
            }

            if quotient_too_large != W::ZERO {
                decr_u(q_limbs, W::ONE);
                add_n_assign(&mut rw, d_limbs, dn);
            }

            r_limbs[..dn].copy_from_slice(&rw[..dn]);
        }
    }
}

// In-place left shift of buf[base .. base+n]
fn lshift_assign_at<W: Limb>(buf: &mut [W], base: usize, n: usize, count: u32) -> W {
    super::lshift_assign(&mut buf[base..], n, count)
}

/// Returns true iff the numerator is an exact multiple of the divisor.
pub fn divisible_p<W: Limb>(a_limbs: &[W], an_in: usize, d_limbs: &[W], dn_in: usize) -> bool {
    debug_assert!(dn_in >= 1);
    debug_assert!(d_limbs[dn_in - 1] != W::ZERO);

    let mut an = an_in;
    let mut dn = dn_in;
    let mut ab = 0usize;
    let mut db = 0usize;

    // When a < d only a == 0 is divisible
    if an < dn {
        return an == 0;
    }

    // Strip common least significant zero limbs
    let (alow, dlow) = loop {
        let alow = a_limbs[ab];
        let dlow = d_limbs[db];

        if dlow != W::ZERO {
            break (alow, dlow);
        }
        if alow != W::ZERO {
            return false; // a has fewer low zero limbs than d
        }

        an -= 1;
        dn -= 1;
        ab += 1;
        db += 1;
        debug_assert!(an >= 1 && dn >= 1);
    };

    // a must have at least as many low zero bits as d
    let dmask = (dlow & dlow.wrapping_neg()).wrapping_sub(W::ONE);
    if alow & dmask != W::ZERO {
        return false;
    }

    if dn == 1 {
        return mod_1(&a_limbs[ab..], an, dlow) == W::ZERO;
    }

    if dn == 2 {
        let dsecond = d_limbs[db + 1];
        if dsecond <= dmask {
            let twos = dlow.trailing_zeros();
            let dlow = (dlow >> twos) | (dsecond << (W::BITS - twos));
            debug_assert!(dlow != W::ZERO);
            return mod_1(&a_limbs[ab..], an, dlow) == W::ZERO;
        }
    }

    let mut r_limbs = vec![W::ZERO; an + 1];
    let mut q_limbs = vec![W::ZERO; an - dn + 1];

    // Normalise away trailing zero bits of the divisor
    let twos = d_limbs[db].trailing_zeros();
    let mut d_norm: Vec<W> = Vec::new();
    let d_use: &[W] = if twos != 0 {
        d_norm = vec![W::ZERO; dn];
        rshift(&mut d_norm, &d_limbs[db..], dn, twos);
        rshift(&mut r_limbs, &a_limbs[ab..], an, twos);
        &d_norm
    } else {
        r_limbs[..an].copy_from_slice(&a_limbs[ab..ab + an]);
        &d_limbs[db..db + dn]
    };

    let mut an = an;
    if r_limbs[an - 1] >= d_use[dn - 1] {
        r_limbs[an] = W::ZERO;
        an += 1;
    } else if an == dn {
        return false;
    }

    debug_assert!(an > dn);

    div_qr(Some(&mut q_limbs), &mut r_limbs, an, d_use, dn);

    r_limbs[an - dn..an].iter().all(|&x| x == W::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_division(n: &[u64], d: &[u64]) {
        let nn = n.len();
        let dn = d.len();
        let mut q = vec![0u64; nn - dn + 1];
        let mut r = vec![0u64; dn];
        tdiv_qr(&mut q, &mut r, n, nn, d, dn);

        // n == q*d + r and r < d
        assert!(cmp(&r, d, dn) < 0, "remainder not reduced");
        let mut chk = vec![0u64; nn + dn + 1];
        if nn - dn + 1 >= dn {
            mul(&mut chk, &q, nn - dn + 1, d, dn);
        } else {
            mul(&mut chk, d, dn, &q, nn - dn + 1);
        }
        let cy = super::super::add_assign(&mut chk, nn + 1, &r, dn);
        assert_eq!(cy, 0);
        assert_eq!(&chk[..nn], n, "q*d + r != n");
        assert!(chk[nn..].iter().all(|&x| x == 0));
    }

    #[test]
    fn single_limb_divisor() {
        let n = [0x1234_5678_9abc_def0u64, 0xfedc_ba98_7654_3210, 5];
        check_division(&n, &[3]);
        check_division(&n, &[1u64 << 63]);
        check_division(&n, &[0xffff_ffff_ffff_ffff]);
    }

    #[test]
    fn two_limb_divisor() {
        let n = [1u64, 2, 3, 4, 5];
        check_division(&n, &[7, 9]);
        check_division(&n, &[0, 1u64 << 63]);
    }

    #[test]
    fn schoolbook_divisor() {
        let n: Vec<u64> = (1..=20).map(|i| i * 0x0123_4567_89ab_cdef).collect();
        let d: Vec<u64> = (1..=5).map(|i| i * 0x1111_1111_1111_1111 + 1).collect();
        check_division(&n, &d);
    }

    #[test]
    fn large_divide_and_conquer() {
        let n: Vec<u64> = (0..400)
            .map(|i| (i as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15) | 1)
            .collect();
        let d: Vec<u64> = (0..130)
            .map(|i| (i as u64).wrapping_mul(0x2545_f491_4f6c_dd1d) | 1)
            .collect();
        check_division(&n, &d);
    }

    #[test]
    fn numerator_just_over_denominator() {
        let n: Vec<u64> = (0..130).map(|i| (i as u64).wrapping_mul(0xdead_beef_cafe_f00d) | 1).collect();
        let d: Vec<u64> = (0..120).map(|i| (i as u64).wrapping_mul(0x0bad_c0de_0bad_c0de) | 1).collect();
        check_division(&n, &d);
    }

    #[test]
    fn divisible_detects_multiples() {
        // d * q for a small q
        let d = [0x1234_5678_9abc_def1u64, 0xfff];
        let q = [3u64, 7];
        let mut n = vec![0u64; 4];
        mul(&mut n, &d, 2, &q, 2);
        let nn = normalized_size(&n, 4);
        assert!(divisible_p(&n[..nn], nn, &d, 2));

        incr_u(&mut n, 1);
        let nn = normalized_size(&n, 4);
        assert!(!divisible_p(&n[..nn], nn, &d, 2));
    }

    #[test]
    fn invertappr_error_bound() {
        // X = B^2n / d - B^n approximated to 1 ulp
        let d = [0x8000_0000_0000_0003u64, 0xdead_beef_0000_0001 | (1 << 63)];
        let n = 2;
        let mut inv = vec![0u64; n];
        let mut scratch = vec![0u64; invertappr_scratch_size(n)];
        basecase_invertappr(&mut inv, &d, n, &mut scratch);

        // Check d * (B^n + inv) <= B^2n - 1 < d * (B^n + inv + 2)
        let mut prod = vec![0u64; 2 * n + 1];
        let one_ext = [inv[0], inv[1], 1u64];
        mul(&mut prod, &one_ext, n + 1, &d, n);
        // prod <= B^2n - 1 means top limb (index 2n) must be zero
        assert_eq!(prod[2 * n], 0);
    }
}
