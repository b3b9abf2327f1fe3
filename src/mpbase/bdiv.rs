//! Hensel (binary) division.
//!
//! Computes `q ≡ -n · d⁻¹ mod B^qn` for an odd divisor, working from the
//! least significant limb upward. The dual of Euclidean division: instead
//! of cancelling high limbs with quotient estimates, each step clears the
//! lowest remaining limb with one multiply by `dinv = -d⁻¹ mod B`.
//! The numerator is destroyed.

use super::additive::{add_assign, add_n_assign};
use super::mul::addmul_1;
use super::{add_1_assign, incr_u, mul, mul_low_n, BASECASE_BDIV_QR_THRESHOLD, BDIV_Q_THRESHOLD};
use crate::word::Limb;

/// Basecase Hensel division, quotient only.
///
/// Requires `d` odd and `dinv = -d⁻¹ mod B`.
pub fn basecase_bdiv_q<W: Limb>(
    q_limbs: &mut [W],
    n_limbs: &mut [W],
    nn: usize,
    d_limbs: &[W],
    dn: usize,
    dinv: W,
) {
    debug_assert!(dn > 0);
    debug_assert!(nn >= dn);
    debug_assert!(d_limbs[0] & W::ONE != W::ZERO);
    debug_assert!(d_limbs[0].wrapping_mul(dinv).wrapping_neg() == W::ONE);

    let mut np = 0usize;
    let mut qp = 0usize;

    if nn > dn {
        let mut cy = W::ZERO;
        for _ in 0..nn - dn - 1 {
            let q = dinv.wrapping_mul(n_limbs[np]);
            let mut hi = addmul_1(&mut n_limbs[np..], d_limbs, dn, q);
            debug_assert!(n_limbs[np] == W::ZERO);
            q_limbs[qp] = q;
            qp += 1;

            hi = hi.wrapping_add(cy);
            cy = W::from_bool(hi < cy);
            hi = hi.wrapping_add(n_limbs[np + dn]);
            cy = cy.wrapping_add(W::from_bool(hi < n_limbs[np + dn]));
            n_limbs[np + dn] = hi;
            np += 1;
        }
        let q = dinv.wrapping_mul(n_limbs[np]);
        let hi = cy.wrapping_add(addmul_1(&mut n_limbs[np..], d_limbs, dn, q));
        debug_assert!(n_limbs[np] == W::ZERO);
        q_limbs[qp] = q;
        qp += 1;
        n_limbs[np + dn] = n_limbs[np + dn].wrapping_add(hi);
        np += 1;
    }

    for i in (2..=dn).rev() {
        let q = dinv.wrapping_mul(n_limbs[np]);
        addmul_1(&mut n_limbs[np..], d_limbs, i, q);
        debug_assert!(n_limbs[np] == W::ZERO);
        q_limbs[qp] = q;
        qp += 1;
        np += 1;
    }

    q_limbs[qp] = dinv.wrapping_mul(n_limbs[np]);
}

/// Basecase Hensel division with remainder: the remainder is returned in
/// the high `dn` limbs of the numerator. Returns the carry from the
/// `n + q·d` accumulation.
pub fn basecase_bdiv_qr<W: Limb>(
    q_limbs: &mut [W],
    n_limbs: &mut [W],
    nn: usize,
    d_limbs: &[W],
    dn: usize,
    dinv: W,
) -> W {
    debug_assert!(dn > 0);
    debug_assert!(nn > dn);
    debug_assert!(d_limbs[0] & W::ONE != W::ZERO);
    debug_assert!(d_limbs[0].wrapping_mul(dinv).wrapping_neg() == W::ONE);

    let mut np = 0usize;
    let mut cy = W::ZERO;

    for i in 0..nn - dn {
        let q = dinv.wrapping_mul(n_limbs[np]);
        let mut hi = addmul_1(&mut n_limbs[np..], d_limbs, dn, q);
        q_limbs[i] = q;

        hi = hi.wrapping_add(cy);
        cy = W::from_bool(hi < cy);
        hi = hi.wrapping_add(n_limbs[np + dn]);
        cy = cy.wrapping_add(W::from_bool(hi < n_limbs[np + dn]));
        n_limbs[np + dn] = hi;
        np += 1;
    }

    cy
}

/// Divide-and-conquer Hensel division of equal-length operands with
/// remainder.
pub fn general_bdiv_qr_n<W: Limb>(
    q_limbs: &mut [W],
    n_limbs: &mut [W],
    d_limbs: &[W],
    n: usize,
    dinv: W,
    scratch: &mut [W],
) -> W {
    let lo = n >> 1;
    let hi = n - lo;

    let mut cy = if lo < BASECASE_BDIV_QR_THRESHOLD {
        basecase_bdiv_qr(q_limbs, n_limbs, 2 * lo, d_limbs, lo, dinv)
    } else {
        general_bdiv_qr_n(q_limbs, n_limbs, d_limbs, lo, dinv, scratch)
    };

    mul(scratch, &d_limbs[lo..lo + hi], hi, &q_limbs[..lo], lo);

    incr_u(&mut scratch[lo..], cy);
    let mut rh = add_assign(&mut n_limbs[lo..], n + hi, &scratch[..n], n);

    cy = if hi < BASECASE_BDIV_QR_THRESHOLD {
        basecase_bdiv_qr(&mut q_limbs[lo..], &mut n_limbs[lo..], 2 * hi, d_limbs, hi, dinv)
    } else {
        general_bdiv_qr_n(&mut q_limbs[lo..], &mut n_limbs[lo..], d_limbs, hi, dinv, scratch)
    };

    mul(scratch, &q_limbs[lo..lo + hi], hi, &d_limbs[hi..hi + lo], lo);

    incr_u(&mut scratch[hi..], cy);
    rh = rh.wrapping_add(add_n_assign(&mut n_limbs[n..], &scratch[..n], n));

    rh
}

/// Divide-and-conquer Hensel division with remainder for different
/// operand lengths.
pub fn general_bdiv_qr<W: Limb>(
    q_limbs: &mut [W],
    n_limbs: &mut [W],
    nn: usize,
    d_limbs: &[W],
    dn: usize,
    dinv: W,
) -> W {
    debug_assert!(dn >= 2);
    debug_assert!(nn >= dn + 1);
    debug_assert!(d_limbs[0] & W::ONE != W::ZERO);

    let mut tp = vec![W::ZERO; dn];
    let mut qn = nn - dn;

    if qn > dn {
        // Reduce qn mod dn
        while qn > dn {
            qn -= dn;
        }

        let mut cy = if qn < BASECASE_BDIV_QR_THRESHOLD {
            basecase_bdiv_qr(q_limbs, n_limbs, 2 * qn, d_limbs, qn, dinv)
        } else {
            general_bdiv_qr_n(q_limbs, n_limbs, d_limbs, qn, dinv, &mut tp)
        };

        let mut rr = W::ZERO;
        if qn != dn {
            if qn > dn - qn {
                mul(&mut tp, &q_limbs[..qn], qn, &d_limbs[qn..], dn - qn);
            } else {
                mul(&mut tp, &d_limbs[qn..], dn - qn, &q_limbs[..qn], qn);
            }
            incr_u(&mut tp[qn..], cy);

            rr = add_assign(&mut n_limbs[qn..], nn - qn, &tp, dn);
            cy = W::ZERO;
        }

        let mut qb = qn;
        let mut nb = qn;
        let mut qn_left = (nn - dn - qn) as isize;
        loop {
            rr = rr.wrapping_add(add_1_assign(
                &mut n_limbs[nb + dn..],
                qn_left as usize,
                cy,
            ));
            cy = general_bdiv_qr_n(
                &mut q_limbs[qb..],
                &mut n_limbs[nb..],
                d_limbs,
                dn,
                dinv,
                &mut tp,
            );
            qb += dn;
            nb += dn;
            qn_left -= dn as isize;
            if qn_left <= 0 {
                break;
            }
        }
        return rr.wrapping_add(cy);
    }

    let cy = if qn < BASECASE_BDIV_QR_THRESHOLD {
        basecase_bdiv_qr(q_limbs, n_limbs, 2 * qn, d_limbs, qn, dinv)
    } else {
        general_bdiv_qr_n(q_limbs, n_limbs, d_limbs, qn, dinv, &mut tp)
    };

    let mut rr = W::ZERO;
    let mut cy = cy;
    if qn != dn {
        if qn > dn - qn {
            mul(&mut tp, &q_limbs[..qn], qn, &d_limbs[qn..], dn - qn);
        } else {
            mul(&mut tp, &d_limbs[qn..], dn - qn, &q_limbs[..qn], qn);
        }
        incr_u(&mut tp[qn..], cy);

        rr = add_assign(&mut n_limbs[qn..], nn - qn, &tp, dn);
        cy = W::ZERO;
    }

    rr.wrapping_add(cy)
}

/// Divide-and-conquer Hensel division of equal-length operands, quotient
/// only. `scratch` needs `floor(n/2)` limbs.
pub fn general_bdiv_q_n<W: Limb>(
    q_limbs: &mut [W],
    n_limbs: &mut [W],
    d_limbs: &[W],
    n: usize,
    dinv: W,
    scratch: &mut [W],
) {
    let mut qb = 0usize;
    let mut nb = 0usize;
    let mut n = n;

    while n >= BDIV_Q_THRESHOLD {
        let lo = n >> 1; // floor(n/2)
        let hi = n - lo; // ceil(n/2)

        let cy = general_bdiv_qr_n(
            &mut q_limbs[qb..],
            &mut n_limbs[nb..],
            d_limbs,
            lo,
            dinv,
            scratch,
        );

        mul_low_n(scratch, &q_limbs[qb..qb + lo], &d_limbs[hi..hi + lo], lo);
        add_n_assign(&mut n_limbs[nb + hi..], &scratch[..lo], lo);

        if lo < hi {
            let cy2 = cy.wrapping_add(addmul_1(
                &mut n_limbs[nb + lo..],
                &q_limbs[qb..],
                lo,
                d_limbs[lo],
            ));
            n_limbs[nb + n - 1] = n_limbs[nb + n - 1].wrapping_add(cy2);
        }
        qb += lo;
        nb += lo;
        n -= lo;
    }
    basecase_bdiv_q(&mut q_limbs[qb..], &mut n_limbs[nb..], n, d_limbs, n, dinv);
}

/// Hensel division for different operand lengths, quotient only.
pub fn general_bdiv_q<W: Limb>(
    q_limbs: &mut [W],
    n_limbs: &mut [W],
    nn: usize,
    d_limbs: &[W],
    dn: usize,
    dinv: W,
) {
    debug_assert!(dn >= 2);
    debug_assert!(nn >= dn);
    debug_assert!(d_limbs[0] & W::ONE != W::ZERO);

    let mut tp = vec![W::ZERO; dn];
    let mut qn = nn;

    if qn > dn {
        // Reduce qn mod dn
        while qn > dn {
            qn -= dn;
        }

        // The typically smaller block first
        let mut cy = if qn < BASECASE_BDIV_QR_THRESHOLD {
            basecase_bdiv_qr(q_limbs, n_limbs, 2 * qn, d_limbs, qn, dinv)
        } else {
            general_bdiv_qr_n(q_limbs, n_limbs, d_limbs, qn, dinv, &mut tp)
        };

        if qn != dn {
            if qn > dn - qn {
                mul(&mut tp, &q_limbs[..qn], qn, &d_limbs[qn..], dn - qn);
            } else {
                mul(&mut tp, &d_limbs[qn..], dn - qn, &q_limbs[..qn], qn);
            }
            incr_u(&mut tp[qn..], cy);

            add_assign(&mut n_limbs[qn..], nn - qn, &tp, dn);
            cy = W::ZERO;
        }

        let mut qb = qn;
        let mut nb = qn;

        let mut qn_left = nn - qn;
        while qn_left > dn {
            add_1_assign(&mut n_limbs[nb + dn..], qn_left - dn, cy);
            cy = general_bdiv_qr_n(
                &mut q_limbs[qb..],
                &mut n_limbs[nb..],
                d_limbs,
                dn,
                dinv,
                &mut tp,
            );
            qb += dn;
            nb += dn;
            qn_left -= dn;
        }
        general_bdiv_q_n(&mut q_limbs[qb..], &mut n_limbs[nb..], d_limbs, dn, dinv, &mut tp);
    } else if qn < BDIV_Q_THRESHOLD {
        basecase_bdiv_q(q_limbs, n_limbs, qn, d_limbs, qn, dinv);
    } else {
        general_bdiv_q_n(q_limbs, n_limbs, d_limbs, qn, dinv, &mut tp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpbase::{binvert_limb, mul as mp_mul, normalized_size};

    #[test]
    fn bdiv_q_reconstructs_product() {
        // n = q0 * d with d odd: the Hensel quotient of -n must satisfy
        // -q * d = n (mod B^nn)
        let d = [0x1234_5679u64, 0x1];
        let q0 = [0xdead_beefu64, 0x77];
        let mut n = vec![0u64; 4];
        mp_mul(&mut n, &q0, 2, &d, 2);
        let nn = normalized_size(&n, 4);

        let dinv = binvert_limb(d[0]).wrapping_neg();
        let mut q = vec![0u64; nn];
        let mut n_work = n.clone();
        basecase_bdiv_q(&mut q, &mut n_work, nn, &d, 2, dinv);

        // q = -n/d mod B^nn, so -q mod B^nn equals q0 (zero padded)
        let mut neg_q = vec![0u64; nn];
        crate::mpbase::negate(&mut neg_q, &q, nn);
        assert_eq!(&neg_q[..2], &q0);
    }

    #[test]
    fn bdiv_qr_leaves_shifted_remainder() {
        // With n = q0*d + r*B^qn the bdiv quotient clears the low limbs
        let d = [0x0bad_c0de_0000_0001u64, 0xffff_ffff];
        let n: Vec<u64> = vec![
            0x1111_1111_1111_1111,
            0x2222_2222_2222_2222,
            0x3333_3333_3333_3333,
            0x4444_4444_4444_4444,
        ];
        let nn = 4;
        let dn = 2;
        let dinv = binvert_limb(d[0]).wrapping_neg();

        let mut q = vec![0u64; nn - dn];
        let mut n_work = n.clone();
        let _cy = basecase_bdiv_qr(&mut q, &mut n_work, nn, &d, dn, dinv);

        // Verify n + q*d == r*B^qn (mod B^nn), i.e. low qn limbs cancel
        let mut chk = n.clone();
        chk.push(0);
        for (i, &qi) in q.iter().enumerate() {
            let c = addmul_1(&mut chk[i..], &d, dn, qi);
            crate::mpbase::incr_u(&mut chk[i + dn..], c);
        }
        assert!(chk[..nn - dn].iter().all(|&x| x == 0));
    }
}
