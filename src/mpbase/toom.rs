//! Toom-Cook multiplication and squaring.
//!
//! Toom-22 evaluates at {0, −1, ∞}; Toom-32 and Toom-33 add the points
//! {+1, +2}. The five-point interpolation recombines with one exact
//! division by 3 and one halving. The sign of the odd evaluation point is
//! tracked as a boolean and folded in during recombination.
//!
//! Operands are split against the output buffer itself; the evaluation
//! areas and product areas overlap exactly as the recombination consumes
//! them, so the order of operations below is load-bearing.

use super::{
    add, add_1, add_1_assign, add_assign, add_n, add_n_assign, cmp, decr_u, incr_u, is_zero,
    lshift_assign, mul, mul_gradeschool, mul_n, rshift_assign, sub, sub_1_assign, sub_assign,
    sub_n, sub_n_assign, sub_n_from, sub_nc, Limb, MUL_TOOM22_THRESHOLD, MUL_TOOM33_THRESHOLD,
    SQR_TOOM2_THRESHOLD, SQR_TOOM3_THRESHOLD,
};
use super::mul::{addmul_1, sqr_gradeschool};

/// Scratch limbs required by the Toom-22 routines for a product of
/// length `n`.
pub fn get_toom22_scratch_size<W: Limb>(n: usize) -> usize {
    2 * (n + W::BITS as usize)
}

/// Scratch limbs required by the Toom-33 routines for a product of
/// length `n`.
pub fn get_toom33_scratch_size<W: Limb>(n: usize) -> usize {
    3 * (n + W::BITS as usize)
}

/// Exact in-place division of an `n`-limb vector by 3.
/// Returns the remainder class (zero for exact inputs).
fn divexact_by_3<W: Limb>(r: &mut [W], n: usize) -> W {
    // bd = floor((B - 1) / 3)
    let bd = W::udiv_qrnnd(W::ZERO, W::MAX, W::from_u8(3)).0;
    let mut rem = W::ZERO;

    for i in 0..n {
        let (p1, p0) = r[i].umul(bd);
        let cy = W::from_bool(rem < p0);
        rem = rem.wrapping_sub(p0);
        r[i] = rem;
        rem = rem.wrapping_sub(p1).wrapping_add(cy.wrapping_neg());
    }

    rem & W::from_u8(3)
}

mod recursion {
    use super::*;

    pub fn mul_toom22_n<W: Limb>(out: &mut [W], a: &[W], b: &[W], n: usize, scratch: &mut [W]) {
        if n < MUL_TOOM22_THRESHOLD {
            mul_gradeschool(out, a, n, b, n);
        } else {
            super::mul_toom22(out, a, n, b, n, scratch);
        }
    }

    pub fn mul_toom22_unbalanced<W: Limb>(
        out: &mut [W],
        a: &[W],
        n1: usize,
        b: &[W],
        n2: usize,
        scratch: &mut [W],
    ) {
        if n2 < MUL_TOOM22_THRESHOLD {
            mul_gradeschool(out, a, n1, b, n2);
        } else if 4 * n1 < 5 * n2 {
            super::mul_toom22(out, a, n1, b, n2, scratch);
        } else {
            super::mul_toom32(out, a, n1, b, n2, scratch);
        }
    }

    pub fn mul_toom33_n<W: Limb>(out: &mut [W], a: &[W], b: &[W], n: usize, scratch: &mut [W]) {
        if n < MUL_TOOM22_THRESHOLD {
            mul_gradeschool(out, a, n, b, n);
        } else if n < MUL_TOOM33_THRESHOLD {
            super::mul_toom22(out, a, n, b, n, scratch);
        } else {
            super::mul_toom33(out, a, n, b, n, scratch);
        }
    }

    pub fn sqr_toom2_r<W: Limb>(out: &mut [W], a: &[W], n: usize, scratch: &mut [W]) {
        if n < SQR_TOOM2_THRESHOLD {
            sqr_gradeschool(out, a, n);
        } else {
            super::sqr_toom2(out, a, n, scratch);
        }
    }

    pub fn sqr_toom3_r<W: Limb>(out: &mut [W], a: &[W], n: usize, scratch: &mut [W]) {
        if n < SQR_TOOM2_THRESHOLD {
            sqr_gradeschool(out, a, n);
        } else if n < SQR_TOOM3_THRESHOLD {
            super::sqr_toom2(out, a, n, scratch);
        } else {
            super::sqr_toom3(out, a, n, scratch);
        }
    }
}

/// Toom-2 multiplication (km = 2, kn = 2): evaluates at {0, −1, ∞}.
///
/// `out` receives the `n1 + n2` limb product; `scratch` must provide
/// [`get_toom22_scratch_size`] limbs. Requires `n1 >= n2` and
/// `n2 > n1 / 2` (balanced operands).
pub fn mul_toom22<W: Limb>(
    out: &mut [W],
    in1: &[W],
    n1: usize,
    in2: &[W],
    n2: usize,
    scratch: &mut [W],
) {
    debug_assert!(n1 >= n2);

    let mut vm1_is_neg = false;

    let s = n1 >> 1; // floor(n1/2)
    let n = n1 - s; // ceil(n1/2)
    let t = n2 - n; // upper half length of in2
    debug_assert!(0 < s && s <= n && s + 1 >= n);
    debug_assert!(0 < t && t <= s);

    let (in1_0, in1_1) = (&in1[..n], &in1[n..n1]);
    let (in2_0, in2_1) = (&in2[..n], &in2[n..n2]);

    // diff1 = |in1_0 - in1_1| into out[0..n]
    if s == n {
        if cmp(in1_0, in1_1, n) < 0 {
            sub_n(out, in1_1, in1_0, n);
            vm1_is_neg = true;
        } else {
            sub_n(out, in1_0, in1_1, n);
        }
    } else {
        // n - s == 1
        if in1_0[s] == W::ZERO && cmp(in1_0, in1_1, s) < 0 {
            sub_n(out, in1_1, in1_0, s);
            out[s] = W::ZERO;
            vm1_is_neg = true;
        } else {
            let borrow = sub_n(out, in1_0, in1_1, s);
            out[s] = in1_0[s].wrapping_sub(borrow);
        }
    }

    // diff2 = |in2_0 - in2_1| into out[n..2n]
    {
        let d2 = &mut out[n..];
        if t == n {
            if cmp(in2_0, in2_1, n) < 0 {
                sub_n(d2, in2_1, in2_0, n);
                vm1_is_neg = !vm1_is_neg;
            } else {
                sub_n(d2, in2_0, in2_1, n);
            }
        } else if is_zero(&in2_0[t..], n - t) && cmp(in2_0, in2_1, t) < 0 {
            sub_n(d2, in2_1, in2_0, t);
            d2[t..n].fill(W::ZERO);
            vm1_is_neg = !vm1_is_neg;
        } else {
            sub(d2, in2_0, n, in2_1, t);
        }
    }

    // vm1 point, 2n limbs, into scratch
    {
        let (vm1, rest) = scratch.split_at_mut(2 * n);
        recursion::mul_toom22_n(vm1, &out[..n], &out[n..2 * n], n, rest);
    }

    // vinf point, s + t limbs
    {
        let (_, rest) = scratch.split_at_mut(2 * n);
        if s > t {
            recursion::mul_toom22_unbalanced(&mut out[2 * n..], in1_1, s, in2_1, t, rest);
        } else {
            recursion::mul_toom22_n(&mut out[2 * n..], in1_1, in2_1, s, rest);
        }
    }

    // v0 point, 2n limbs
    {
        let (_, rest) = scratch.split_at_mut(2 * n);
        recursion::mul_toom22_n(out, in1_0, in2_0, n, rest);
    }

    // H(v0) + L(vinf)
    let mut cy;
    {
        let (lo, hi) = out.split_at_mut(2 * n);
        cy = add_n_assign(hi, &lo[n..], n);
    }

    // L(v0) + H(v0)
    let cy2;
    {
        let (lo, hi) = out.split_at_mut(2 * n);
        let (l0, l1) = lo.split_at_mut(n);
        cy2 = cy.wrapping_add(add_n(l1, &hi[..n], l0, n));
    }

    // L(vinf) + H(vinf)
    {
        let (mid, top) = out.split_at_mut(3 * n);
        cy = cy.wrapping_add(add_assign(&mut mid[2 * n..], n, top, s + t - n));
    }

    if vm1_is_neg {
        cy = cy.wrapping_add(add_n_assign(&mut out[n..], &scratch[..2 * n], 2 * n));
    } else {
        cy = cy.wrapping_sub(sub_n_assign(&mut out[n..], &scratch[..2 * n], 2 * n));
        if cy.wrapping_add(W::ONE) == W::ZERO {
            // cy is -1: cancel against the middle carry
            debug_assert!(cy2 == W::ONE);
            let c = add_1_assign(&mut out[2 * n..], n, cy2);
            cy = cy.wrapping_add(c);
            debug_assert!(cy == W::ZERO);
            return;
        }
    }

    incr_u(&mut out[2 * n..], cy2);
    incr_u(&mut out[3 * n..], cy);
}

/// Toom-2 squaring (k = 2): evaluates at {0, −1, ∞}.
pub fn sqr_toom2<W: Limb>(out: &mut [W], in1: &[W], n1: usize, scratch: &mut [W]) {
    let s = n1 >> 1;
    let n = n1 - s;
    debug_assert!(0 < s && s <= n && s + 1 >= n);

    let (in1_0, in1_1) = (&in1[..n], &in1[n..n1]);

    // diff1 = |in1_0 - in1_1| into out[0..n]; the sign is irrelevant when
    // squaring
    if s == n {
        if cmp(in1_0, in1_1, n) < 0 {
            sub_n(out, in1_1, in1_0, n);
        } else {
            sub_n(out, in1_0, in1_1, n);
        }
    } else if in1_0[s] == W::ZERO && cmp(in1_0, in1_1, s) < 0 {
        sub_n(out, in1_1, in1_0, s);
        out[s] = W::ZERO;
    } else {
        let borrow = sub_n(out, in1_0, in1_1, s);
        out[s] = in1_0[s].wrapping_sub(borrow);
    }

    // vm1 (2n limbs), vinf (2s limbs), v0 (2n limbs)
    {
        let (vm1, rest) = scratch.split_at_mut(2 * n);
        recursion::sqr_toom2_r(vm1, &out[..n], n, rest);
    }
    {
        let (_, rest) = scratch.split_at_mut(2 * n);
        recursion::sqr_toom2_r(&mut out[2 * n..], in1_1, s, rest);
    }
    {
        let (_, rest) = scratch.split_at_mut(2 * n);
        recursion::sqr_toom2_r(out, in1_0, n, rest);
    }

    let mut cy;
    {
        let (lo, hi) = out.split_at_mut(2 * n);
        cy = add_n_assign(hi, &lo[n..], n);
    }
    let cy2;
    {
        let (lo, hi) = out.split_at_mut(2 * n);
        let (l0, l1) = lo.split_at_mut(n);
        cy2 = cy.wrapping_add(add_n(l1, &hi[..n], l0, n));
    }
    {
        let (mid, top) = out.split_at_mut(3 * n);
        cy = cy.wrapping_add(add_assign(&mut mid[2 * n..], n, top, s + s - n));
    }
    cy = cy.wrapping_sub(sub_n_assign(&mut out[n..], &scratch[..2 * n], 2 * n));

    if cy.wrapping_add(W::ONE) != W::ZERO {
        incr_u(&mut out[2 * n..], cy2);
        incr_u(&mut out[3 * n..], cy);
    } else {
        debug_assert!(cy2 == W::ONE);
        let c = add_1_assign(&mut out[2 * n..], n, cy2);
        debug_assert!(cy.wrapping_add(c) == W::ZERO);
    }
}

/// Toom-2.5 multiplication (km = 3, kn = 2): evaluates at
/// {0, +1, −1, ∞}. Used for unbalanced operands where
/// `n2 + 2 <= n1` and `n1 + 6 <= 3·n2`.
pub fn mul_toom32<W: Limb>(
    out: &mut [W],
    in1: &[W],
    n1: usize,
    in2: &[W],
    n2: usize,
    scratch: &mut [W],
) {
    debug_assert!(n2 + 2 <= n1 && n1 + 6 <= 3 * n2);

    let n = 1 + if 2 * n1 >= 3 * n2 {
        (n1 - 1) / 3
    } else {
        (n2 - 1) >> 1
    };
    let s = n1 - 2 * n;
    let t = n2 - n;

    debug_assert!(0 < s && s <= n);
    debug_assert!(0 < t && t <= n);
    debug_assert!(s + t >= n);

    let (in1_0, in1_1, in1_2) = (&in1[..n], &in1[n..2 * n], &in1[2 * n..n1]);
    let (in2_0, in2_1) = (&in2[..n], &in2[n..n2]);

    let mut vm1_neg;
    let mut hi: i64;
    let mut cy: W;

    // in11 = in1_0 + in1_1 + in1_2 into out[0..n],
    // am1 = |in1_0 - in1_1 + in1_2| into out[2n..3n]
    let mut in11_hi = add(out, in1_0, n, in1_2, s);
    if in11_hi == W::ZERO && cmp(out, in1_1, n) < 0 {
        let (lo, hi_part) = out.split_at_mut(2 * n);
        sub_n(hi_part, in1_1, &lo[..n], n);
        hi = 0;
        vm1_neg = true;
    } else {
        let (lo, hi_part) = out.split_at_mut(2 * n);
        let borrow = sub_n(hi_part, &lo[..n], in1_1, n);
        hi = in11_hi.as_u64() as i64 - borrow.as_u64() as i64;
        vm1_neg = false;
    }
    in11_hi = in11_hi.wrapping_add(add_n_assign(out, in1_1, n));

    // in21 = in2_0 + in2_1 into out[n..2n], bm1 = |in2_0 - in2_1| into
    // out[3n..4n]
    let in21_hi;
    {
        let (lo, hi_part) = out.split_at_mut(3 * n);
        let in21 = &mut lo[n..2 * n];
        if t == n {
            in21_hi = add_n(in21, in2_0, in2_1, n);
            if cmp(in2_0, in2_1, n) < 0 {
                sub_n(hi_part, in2_1, in2_0, n);
                vm1_neg = !vm1_neg;
            } else {
                sub_n(hi_part, in2_0, in2_1, n);
            }
        } else {
            in21_hi = add(in21, in2_0, n, in2_1, t);
            if is_zero(&in2_0[t..], n - t) && cmp(in2_0, in2_1, t) < 0 {
                sub_n(hi_part, in2_1, in2_0, t);
                hi_part[t..n].fill(W::ZERO);
                vm1_neg = !vm1_neg;
            } else {
                sub(hi_part, in2_0, n, in2_1, t);
            }
        }
    }

    // v1 = in11 * in21 into scratch[0..2n+1]
    mul_n(scratch, &out[..n], &out[n..2 * n], n);
    if in11_hi == W::ONE {
        cy = in21_hi.wrapping_add(add_n_assign(&mut scratch[n..], &out[n..2 * n], n));
    } else if in11_hi == W::from_u8(2) {
        cy = in21_hi
            .wrapping_add(in21_hi)
            .wrapping_add(addmul_1(&mut scratch[n..], &out[n..2 * n], n, W::from_u8(2)));
    } else {
        cy = W::ZERO;
    }
    if in21_hi != W::ZERO {
        cy = cy.wrapping_add(add_n_assign(&mut scratch[n..], &out[..n], n));
    }
    scratch[2 * n] = cy;

    // vm1 = am1 * bm1 into out[0..2n+1]
    {
        let (lo, hi_part) = out.split_at_mut(2 * n);
        mul_n(lo, &hi_part[..n], &hi_part[n..2 * n], n);
        if hi != 0 {
            hi = add_n_assign(&mut lo[n..], &hi_part[n..2 * n], n).as_u64() as i64;
        }
    }
    out[2 * n] = W::from_u64(hi as u64);

    // v1 <- (v1 -/+ vm1) / 2
    if vm1_neg {
        sub_n_assign(scratch, &out[..2 * n + 1], 2 * n + 1);
    } else {
        add_n_assign(scratch, &out[..2 * n + 1], 2 * n + 1);
    }
    rshift_assign(scratch, 2 * n + 1, 1);

    // y = (x0 + x2) * B + (x0 + x2) - vm1
    hi = out[2 * n].as_u64() as i64;
    {
        let (v1a, v1b) = scratch.split_at_mut(n);
        cy = add_n(&mut out[2 * n..], v1a, &v1b[..n], n);
    }
    let amount = cy.wrapping_add(scratch[2 * n]);
    incr_u(&mut scratch[n..], amount);

    if vm1_neg {
        cy = add_n_assign(scratch, &out[..n], n);
        {
            let (lo, hi_part) = out.split_at_mut(2 * n);
            let c = add_n_assign(&mut hi_part[..n], &lo[n..2 * n], n);
            let c = c.wrapping_add(add_1_assign(&mut hi_part[..n], n, cy));
            hi += c.as_u64() as i64;
        }
        incr_u(&mut scratch[n..], W::from_u64(hi as u64));
    } else {
        cy = sub_n_assign(scratch, &out[..n], n);
        {
            let (lo, hi_part) = out.split_at_mut(2 * n);
            let c = sub_n_assign(&mut hi_part[..n], &lo[n..2 * n], n);
            let c = c.wrapping_add(sub_1_assign(&mut hi_part[..n], n, cy));
            hi += c.as_u64() as i64;
        }
        decr_u(&mut scratch[n..], W::from_u64(hi as u64));
    }

    // v0 and vinf products
    mul_n(out, in1_0, in2_0, n);
    if s > t {
        mul(&mut out[3 * n..], in1_2, s, in2_1, t);
    } else {
        mul(&mut out[3 * n..], in2_1, t, in1_2, s);
    }

    // Recombination
    {
        let (lo, hi_part) = out.split_at_mut(3 * n);
        cy = sub_n_assign(&mut lo[n..2 * n], &hi_part[..n], n);
    }
    let mut hi2: i64 = scratch[2 * n].as_u64() as i64 + cy.as_u64() as i64;

    {
        let (lo, hi_part) = out.split_at_mut(2 * n);
        let c = sub_n_assign(&mut hi_part[..n], &lo[..n], n);
        cy = c.wrapping_add(sub_1_assign(&mut hi_part[..n], n, cy));
    }
    {
        let (lo, hi_part) = out.split_at_mut(3 * n);
        let borrow = sub_nc(&mut hi_part[..n], &scratch[n..2 * n], &lo[n..2 * n], n, cy);
        hi2 -= borrow.as_u64() as i64;
    }
    hi2 += add_assign(&mut out[n..], 3 * n, &scratch[..n], n).as_u64() as i64;

    if s + t > n {
        let (lo, hi_part) = out.split_at_mut(4 * n);
        let borrow = sub_assign(&mut lo[2 * n..], 2 * n, &hi_part[..s + t - n], s + t - n);
        hi2 -= borrow.as_u64() as i64;

        if hi2 < 0 {
            decr_u(&mut out[4 * n..], W::from_u64((-hi2) as u64));
        } else {
            incr_u(&mut out[4 * n..], W::from_u64(hi2 as u64));
        }
    } else {
        debug_assert!(hi2 == 0);
    }
}

/// Five-point Toom interpolation and recombination.
///
/// On entry `c` holds `|vinf|v1|v0|` and `scratch` holds `|v2|vm1|`
/// (vm1 at offset 0, v2 at offset `2n + 1`). `sign` is the sign of the
/// vm1 point, `vinf0` the saved least significant limb of vinf.
fn interpolate_recombine_5<W: Limb>(
    c: &mut [W],
    scratch: &mut [W],
    n: usize,
    s: usize,
    t: usize,
    sign: bool,
    vinf0: W,
) {
    let twon = n + n;
    let twos = s + t;
    let kk1 = twon + 1;

    let mut cy;

    // v2 = (v2 - vm1) / 3
    {
        let (vm1, v2) = scratch.split_at_mut(kk1);
        if sign {
            add_n_assign(v2, vm1, kk1);
        } else {
            sub_n_assign(v2, vm1, kk1);
        }
        divexact_by_3(v2, kk1);
    }

    // vm1 = (v1 - vm1) / 2
    {
        let vm1 = &mut scratch[..kk1];
        if sign {
            add_n_assign(vm1, &c[twon..twon + kk1], kk1);
        } else {
            sub_n_from(vm1, &c[twon..twon + kk1], kk1);
        }
        rshift_assign(vm1, kk1, 1);
    }

    // v1 = v1 - v0
    {
        let (lo, hi) = c.split_at_mut(twon);
        let borrow = sub_n_assign(&mut hi[..twon], lo, twon);
        hi[twon] = hi[twon].wrapping_sub(borrow);
    }

    // v2 = (v2 - v1) / 2
    {
        let v2 = &mut scratch[kk1..];
        sub_n_assign(v2, &c[twon..twon + kk1], kk1);
        rshift_assign(v2, kk1, 1);
    }

    // v1 = v1 - vm1
    sub_n_assign(&mut c[twon..], &scratch[..kk1], kk1);

    // Fold vm1 into c1, propagating the carry into c3
    cy = add_n_assign(&mut c[n..], &scratch[..kk1], kk1);
    incr_u(&mut c[3 * n + 1..], cy);

    // Save vinf[0], substitute the input value
    let saved = c[4 * n];
    c[4 * n] = vinf0;

    // v2 = v2 - 2*vinf, using the vm1 area as scratch
    {
        let (vm1, v2) = scratch.split_at_mut(kk1);
        cy = W::ZERO;
        let mut prev = W::ZERO;
        for i in 0..twos {
            let v = c[4 * n + i];
            vm1[i] = (v << 1) | prev;
            prev = v >> (W::BITS - 1);
        }
        cy = cy.wrapping_add(prev);
        cy = cy.wrapping_add(sub_n_assign(v2, &vm1[..twos], twos));
        decr_u(&mut v2[twos..], cy);
    }

    // Add the high half of v2 into vinf
    if twos > n + 1 {
        let v2 = &scratch[kk1..];
        cy = add_n_assign(&mut c[4 * n..], &v2[n..n + n + 1], n + 1);
        incr_u(&mut c[3 * n + kk1..], cy);
    } else {
        let v2 = &scratch[kk1..];
        add_n_assign(&mut c[4 * n..], &v2[n..n + twos], twos);
    }

    // Subtract vinf from v1 (this also subtracts the high half of v2)
    {
        let borrow;
        {
            let (lo, hi) = c.split_at_mut(4 * n);
            borrow = sub_n_assign(&mut lo[twon..twon + twos], &hi[..twos], twos);
        }
        decr_u(&mut c[twon + twos..], borrow);
    }

    // Restore vinf[0]
    let vinf0 = c[4 * n];
    c[4 * n] = saved;

    // Subtract the low half of v2 from c1
    cy = sub_n_assign(&mut c[n..2 * n], &scratch[kk1..kk1 + n], n);
    decr_u(&mut c[twon..], cy);

    // Add the low half of v2 into c3, propagating into vinf
    cy = add_n_assign(&mut c[3 * n..4 * n], &scratch[kk1..kk1 + n], n);
    c[4 * n] = c[4 * n].wrapping_add(cy);
    debug_assert!(c[4 * n] >= cy);
    incr_u(&mut c[4 * n..], vinf0);
}

/// Toom-3 multiplication (km = 3, kn = 3): evaluates at
/// {0, +1, −1, +2, ∞}.
///
/// `scratch` must provide [`get_toom33_scratch_size`] limbs.
pub fn mul_toom33<W: Limb>(
    out: &mut [W],
    in1: &[W],
    n1: usize,
    in2: &[W],
    n2: usize,
    scratch: &mut [W],
) {
    debug_assert!(n1 >= n2);

    let mut vm1_neg = false;

    let n = (n1 + 2) / 3;
    let s = n1 - 2 * n;
    let t = n2 - 2 * n;

    debug_assert!(0 < s && s <= n);
    debug_assert!(0 < t && t <= n);

    let (in1_0, in1_1, in1_2) = (&in1[..n], &in1[n..2 * n], &in1[2 * n..n1]);
    let (in2_0, in2_1, in2_2) = (&in2[..n], &in2[n..2 * n], &in2[2 * n..n2]);

    // Evaluation areas:
    //   gp   scratch[0 .. n+1]
    //   asm1 scratch[2n+2 .. 3n+3]
    //   bsm1 scratch[3n+3 .. 4n+4]
    //   as1  scratch[4n+4 .. 5n+5]
    //   bs1  out[0 .. n+1]
    //   as2  out[n+1 .. 2n+2]
    //   bs2  out[2n+2 .. 3n+3]

    // as1 and asm1
    let mut cy = add(scratch, in1_0, n, in1_2, s);
    {
        let (gp, rest) = scratch.split_at_mut(2 * n + 2);
        let (asm1, tail) = rest.split_at_mut(2 * n + 2);
        let as1 = &mut tail[..n + 1];
        as1[n] = cy.wrapping_add(add_n(as1, &gp[..n], in1_1, n));
        if cy == W::ZERO && cmp(gp, in1_1, n) < 0 {
            sub_n(asm1, in1_1, &gp[..n], n);
            asm1[n] = W::ZERO;
            vm1_neg = true;
        } else {
            let borrow = sub_n(asm1, &gp[..n], in1_1, n);
            asm1[n] = cy.wrapping_sub(borrow);
        }
    }

    // as2 into out[n+1 .. 2n+2]
    {
        let as1 = &scratch[4 * n + 4..5 * n + 5];
        let as2 = &mut out[n + 1..2 * n + 2];
        cy = add_n(as2, in1_2, &as1[..s], s);
        if s != n {
            cy = add_1(&mut as2[s..], &as1[s..n], n - s, cy);
        }
        cy = cy.wrapping_add(as1[n]);
        cy = cy << 1;
        cy = cy.wrapping_add(lshift_assign(as2, n, 1));
        cy = cy.wrapping_sub(sub_n_assign(as2, in1_0, n));
        as2[n] = cy;
    }

    // bs1 and bsm1
    cy = add(scratch, in2_0, n, in2_2, t);
    {
        let (gp, rest) = scratch.split_at_mut(3 * n + 3);
        let bsm1 = &mut rest[..n + 1];
        let bs1 = &mut out[..n + 1];
        bs1[n] = cy.wrapping_add(add_n(bs1, &gp[..n], in2_1, n));
        if cy == W::ZERO && cmp(gp, in2_1, n) < 0 {
            sub_n(bsm1, in2_1, &gp[..n], n);
            bsm1[n] = W::ZERO;
            vm1_neg = !vm1_neg;
        } else {
            let borrow = sub_n(bsm1, &gp[..n], in2_1, n);
            bsm1[n] = cy.wrapping_sub(borrow);
        }
    }

    // bs2 into out[2n+2 .. 3n+3]
    {
        let (bs1_area, rest) = out.split_at_mut(2 * n + 2);
        let bs2 = &mut rest[..n + 1];
        cy = add_n(bs2, &bs1_area[..t], in2_2, t);
        if t != n {
            cy = add_1(&mut bs2[t..], &bs1_area[t..n], n - t, cy);
        }
        cy = cy.wrapping_add(bs1_area[n]);
        cy = cy << 1;
        cy = cy.wrapping_add(lshift_assign(bs2, n, 1));
        cy = cy.wrapping_sub(sub_n_assign(bs2, in2_0, n));
        bs2[n] = cy;
    }

    debug_assert!(scratch[5 * n + 4] <= W::from_u8(2)); // as1[n]
    debug_assert!(out[n] <= W::from_u8(2)); // bs1[n]
    debug_assert!(scratch[3 * n + 2] <= W::ONE); // asm1[n]
    debug_assert!(scratch[4 * n + 3] <= W::ONE); // bsm1[n]
    debug_assert!(out[2 * n + 1] <= W::from_u8(6)); // as2[n]
    debug_assert!(out[3 * n + 2] <= W::from_u8(6)); // bs2[n]

    // vm1, 2n+2 limbs, into scratch[0..]
    {
        let (vm1, rest) = scratch.split_at_mut(2 * n + 2);
        let (operands, tail) = rest.split_at_mut(3 * n + 3);
        recursion::mul_toom33_n(
            vm1,
            &operands[..n + 1],
            &operands[n + 1..2 * n + 2],
            n + 1,
            tail,
        );
    }

    // v2, 2n+2 limbs, into scratch[2n+1..4n+3]
    {
        let (_, rest) = scratch.split_at_mut(2 * n + 1);
        let (v2, tail) = rest.split_at_mut(2 * n + 2);
        recursion::mul_toom33_n(
            v2,
            &out[n + 1..2 * n + 2],
            &out[2 * n + 2..3 * n + 3],
            n + 1,
            &mut tail[n + 2..],
        );
    }

    // vinf, s + t limbs, into out[4n..]
    {
        let so = &mut scratch[5 * n + 5..];
        if s > t {
            mul(&mut out[4 * n..], in1_2, s, in2_2, t);
        } else {
            recursion::mul_toom33_n(&mut out[4 * n..], in1_2, in2_2, s, so);
        }
    }

    let vinf0 = out[4 * n]; // v1 overlaps with this
    let vinf1 = out[4 * n + 1];

    // v1, 2n+2 limbs, into out[2n..4n+2]
    {
        let (lo, hi) = out.split_at_mut(2 * n);
        let (as1_area, so) = scratch.split_at_mut(5 * n + 5);
        recursion::mul_toom33_n(
            &mut hi[..2 * n + 2],
            &as1_area[4 * n + 4..5 * n + 5],
            &lo[..n + 1],
            n + 1,
            so,
        );
    }
    out[4 * n + 1] = vinf1;

    // v0, 2n limbs, into out[0..2n]
    {
        let so = &mut scratch[5 * n + 5..];
        recursion::mul_toom33_n(out, in1_0, in2_0, n, so);
    }

    interpolate_recombine_5(out, scratch, n, s, t, vm1_neg, vinf0);
}

/// Toom-3 squaring (k = 3): evaluates at {0, +1, −1, +2, ∞}.
pub fn sqr_toom3<W: Limb>(out: &mut [W], in1: &[W], n1: usize, scratch: &mut [W]) {
    let n = (n1 + 2) / 3;
    let s = n1 - 2 * n;
    debug_assert!(0 < s && s <= n);

    let (in1_0, in1_1, in1_2) = (&in1[..n], &in1[n..2 * n], &in1[2 * n..n1]);

    // as1 and diff1 (the |a0 - a1 + a2| point, sign irrelevant)
    let mut cy = add(scratch, in1_0, n, in1_2, s);
    {
        let (gp, rest) = scratch.split_at_mut(2 * n + 2);
        let (diff1, tail) = rest.split_at_mut(2 * n + 2);
        let as1 = &mut tail[..n + 1];
        as1[n] = cy.wrapping_add(add_n(as1, &gp[..n], in1_1, n));
        if cy == W::ZERO && cmp(gp, in1_1, n) < 0 {
            sub_n(diff1, in1_1, &gp[..n], n);
            diff1[n] = W::ZERO;
        } else {
            let borrow = sub_n(diff1, &gp[..n], in1_1, n);
            diff1[n] = cy.wrapping_sub(borrow);
        }
    }

    // as2 into out[n+1 .. 2n+2]
    {
        let as1 = &scratch[4 * n + 4..5 * n + 5];
        let as2 = &mut out[n + 1..2 * n + 2];
        cy = add_n(as2, in1_2, &as1[..s], s);
        if s != n {
            cy = add_1(&mut as2[s..], &as1[s..n], n - s, cy);
        }
        cy = cy.wrapping_add(as1[n]);
        cy = cy << 1;
        cy = cy.wrapping_add(lshift_assign(as2, n, 1));
        cy = cy.wrapping_sub(sub_n_assign(as2, in1_0, n));
        as2[n] = cy;
    }

    // vm1, v2, vinf, v1, v0
    {
        let (vm1, rest) = scratch.split_at_mut(2 * n + 2);
        let (operands, tail) = rest.split_at_mut(3 * n + 3);
        recursion::sqr_toom3_r(vm1, &operands[..n + 1], n + 1, tail);
    }
    {
        let (_, rest) = scratch.split_at_mut(2 * n + 1);
        let (v2, tail) = rest.split_at_mut(2 * n + 2);
        recursion::sqr_toom3_r(v2, &out[n + 1..2 * n + 2], n + 1, &mut tail[n + 2..]);
    }
    {
        let so = &mut scratch[5 * n + 5..];
        recursion::sqr_toom3_r(&mut out[4 * n..], in1_2, s, so);
    }

    let vinf0 = out[4 * n];
    let vinf1 = out[4 * n + 1];

    {
        let (_, hi) = out.split_at_mut(2 * n);
        let (as1_area, so) = scratch.split_at_mut(5 * n + 5);
        recursion::sqr_toom3_r(
            &mut hi[..2 * n + 2],
            &as1_area[4 * n + 4..5 * n + 5],
            n + 1,
            so,
        );
    }
    out[4 * n + 1] = vinf1;

    {
        let so = &mut scratch[5 * n + 5..];
        recursion::sqr_toom3_r(out, in1_0, n, so);
    }

    interpolate_recombine_5(out, scratch, n, s, s, false, vinf0);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_mul(a: &[u64], b: &[u64]) -> Vec<u64> {
        let mut r = vec![0u64; a.len() + b.len()];
        mul_gradeschool(&mut r, a, a.len(), b, b.len());
        r
    }

    #[test]
    fn toom22_balanced() {
        let a: Vec<u64> = (0..40).map(|i| 0x0123_4567_89ab_cdefu64.rotate_left(i)).collect();
        let b: Vec<u64> = (0..40).map(|i| 0xfedc_ba98_7654_3210u64.rotate_right(i)).collect();
        let mut out = vec![0u64; 80];
        let mut scratch = vec![0u64; get_toom22_scratch_size::<u64>(80)];
        mul_toom22(&mut out, &a, 40, &b, 40, &mut scratch);
        assert_eq!(out, reference_mul(&a, &b));
    }

    #[test]
    fn toom22_unbalanced() {
        let a: Vec<u64> = (0..45).map(|i| (i as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15) | 1).collect();
        let b: Vec<u64> = (0..38).map(|i| (i as u64).wrapping_mul(0xc2b2_ae3d_27d4_eb4f) | 1).collect();
        let mut out = vec![0u64; 83];
        let mut scratch = vec![0u64; get_toom22_scratch_size::<u64>(83)];
        mul_toom22(&mut out, &a, 45, &b, 38, &mut scratch);
        assert_eq!(out, reference_mul(&a, &b));
    }

    #[test]
    fn toom32_skewed() {
        let a: Vec<u64> = (0..60).map(|i| (i as u64 + 7).wrapping_mul(0x2545_f491_4f6c_dd1d)).collect();
        let b: Vec<u64> = (0..33).map(|i| (i as u64 + 3).wrapping_mul(0x9e37_79b9_7f4a_7c15)).collect();
        let mut out = vec![0u64; 93];
        let mut scratch = vec![0u64; get_toom33_scratch_size::<u64>(93)];
        mul_toom32(&mut out, &a, 60, &b, 33, &mut scratch);
        assert_eq!(out, reference_mul(&a, &b));
    }

    #[test]
    fn toom33_balanced() {
        let a: Vec<u64> = (0..120).map(|i| (i as u64).wrapping_mul(0x6c62_272e_07bb_0142) ^ 0xff).collect();
        let b: Vec<u64> = (0..111).map(|i| (i as u64).wrapping_mul(0x1000_0000_01b3) | 3).collect();
        let mut out = vec![0u64; 231];
        let mut scratch = vec![0u64; get_toom33_scratch_size::<u64>(231)];
        mul_toom33(&mut out, &a, 120, &b, 111, &mut scratch);
        assert_eq!(out, reference_mul(&a, &b));
    }

    #[test]
    fn sqr_toom_variants() {
        let a: Vec<u64> = (0..130).map(|i| (i as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15) | 1).collect();
        let mut r1 = vec![0u64; 260];
        let mut scratch = vec![0u64; get_toom33_scratch_size::<u64>(260)];
        sqr_toom3(&mut r1, &a, 130, &mut scratch);
        assert_eq!(r1, reference_mul(&a, &a));

        let mut r2 = vec![0u64; 260];
        let mut scratch = vec![0u64; get_toom22_scratch_size::<u64>(260)];
        sqr_toom2(&mut r2, &a, 130, &mut scratch);
        assert_eq!(r2, reference_mul(&a, &a));
    }

    #[test]
    fn divexact_by_3_small() {
        let mut v = [15u64, 0];
        assert_eq!(divexact_by_3(&mut v, 2), 0);
        assert_eq!(v, [5, 0]);

        // 3 * (2^64 + 7) expressed over two limbs
        let mut v = [21u64, 3];
        assert_eq!(divexact_by_3(&mut v, 2), 0);
        assert_eq!(v, [7, 1]);
    }
}
