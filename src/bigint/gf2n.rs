//! Polynomial arithmetic over GF(2) modulo a fixed irreducible.
//!
//! Limb vectors are read as polynomial coefficients, least significant
//! bit first. Addition is XOR, multiplication is carry-less shift-and-add
//! followed by reduction against the field polynomial (the trinomials
//! and pentanomials of the standard binary curves), and inversion runs
//! the polynomial extended Euclidean algorithm.

use super::Mpz;
use crate::word::Limb;

/// A GF(2^m) element; the reduction polynomial is supplied per
/// operation by the owning field configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Gf2n<W: Limb> {
    limbs: Vec<W>,
}

/// Degree of the polynomial in `a`, or -1 for the zero polynomial.
fn degree<W: Limb>(a: &[W]) -> isize {
    for i in (0..a.len()).rev() {
        if a[i] != W::ZERO {
            return (i * W::BITS as usize + (W::BITS - 1 - a[i].leading_zeros()) as usize) as isize;
        }
    }
    -1
}

// r ^= a << bits
fn xor_shifted<W: Limb>(r: &mut Vec<W>, a: &[W], bits: usize) {
    let limbs = bits / W::BITS as usize;
    let shift = (bits % W::BITS as usize) as u32;

    let need = a.len() + limbs + 1;
    if r.len() < need {
        r.resize(need, W::ZERO);
    }

    if shift == 0 {
        for (i, &x) in a.iter().enumerate() {
            r[limbs + i] = r[limbs + i] ^ x;
        }
    } else {
        let mut prev = W::ZERO;
        for (i, &x) in a.iter().enumerate() {
            r[limbs + i] = r[limbs + i] ^ ((x << shift) | prev);
            prev = x >> (W::BITS - shift);
        }
        r[limbs + a.len()] = r[limbs + a.len()] ^ prev;
    }
}

/// Carry-less product of two coefficient vectors.
fn clmul<W: Limb>(a: &[W], b: &[W]) -> Vec<W> {
    let mut r = vec![W::ZERO; a.len() + b.len() + 1];
    for (i, &bw) in b.iter().enumerate() {
        for bit in 0..W::BITS {
            if (bw >> bit) & W::ONE == W::ONE {
                xor_shifted(&mut r, a, i * W::BITS as usize + bit as usize);
            }
        }
    }
    r
}

/// Reduces `r` modulo the field polynomial in place.
fn reduce<W: Limb>(r: &mut Vec<W>, poly: &[W]) {
    let m = degree(poly);
    debug_assert!(m >= 0);
    loop {
        let d = degree(r);
        if d < m {
            break;
        }
        xor_shifted(r, poly, (d - m) as usize);
    }
    normalize(r);
}

fn normalize<W: Limb>(r: &mut Vec<W>) {
    while let Some(&top) = r.last() {
        if top != W::ZERO {
            break;
        }
        r.pop();
    }
}

impl<W: Limb> Gf2n<W> {
    /// The zero polynomial.
    pub fn new() -> Self {
        Gf2n { limbs: Vec::new() }
    }

    /// Takes the bit pattern of an integer as coefficients.
    pub fn from_mpz(v: &Mpz<W>) -> Self {
        Gf2n {
            limbs: v.limbs().to_vec(),
        }
    }

    /// Hexadecimal coefficient string.
    pub fn from_hex(s: &str) -> Self {
        Self::from_mpz(&Mpz::from_str_radix(s, 16).expect("invalid polynomial literal"))
    }

    /// Returns the coefficients as an integer bit pattern.
    pub fn to_mpz(&self) -> Mpz<W> {
        Mpz::from_limbs(self.limbs.clone())
    }

    pub fn is_zero(&self) -> bool {
        self.limbs.is_empty()
    }

    pub fn is_one(&self) -> bool {
        self.limbs.len() == 1 && self.limbs[0] == W::ONE
    }

    /// Polynomial degree, -1 for zero.
    pub fn degree(&self) -> isize {
        degree(&self.limbs)
    }

    /// Field addition (XOR), in place.
    pub fn add_assign(&mut self, other: &Self) {
        if self.limbs.len() < other.limbs.len() {
            self.limbs.resize(other.limbs.len(), W::ZERO);
        }
        for (i, &x) in other.limbs.iter().enumerate() {
            self.limbs[i] = self.limbs[i] ^ x;
        }
        normalize(&mut self.limbs);
    }

    /// Field multiplication modulo `poly`.
    pub fn mul(&self, other: &Self, poly: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Gf2n::new();
        }
        let mut r = clmul(&self.limbs, &other.limbs);
        reduce(&mut r, &poly.limbs);
        Gf2n { limbs: r }
    }

    /// Field squaring modulo `poly`: carry-less self-product by bit
    /// interleave.
    pub fn sqr(&self, poly: &Self) -> Self {
        if self.is_zero() {
            return Gf2n::new();
        }

        // Squaring over GF(2) spreads each coefficient to the even
        // positions
        let mut r = vec![W::ZERO; 2 * self.limbs.len() + 1];
        for (i, &limb) in self.limbs.iter().enumerate() {
            for bit in 0..W::BITS {
                if (limb >> bit) & W::ONE == W::ONE {
                    let pos = 2 * (i * W::BITS as usize + bit as usize);
                    r[pos / W::BITS as usize] =
                        r[pos / W::BITS as usize] | (W::ONE << (pos as u32 % W::BITS));
                }
            }
        }
        reduce(&mut r, &poly.limbs);
        Gf2n { limbs: r }
    }

    /// Field inversion modulo `poly` by the fixed square-and-multiply
    /// chain `a^(2^m - 2)`.
    ///
    /// The schedule depends only on the public field degree `m`, never
    /// on the operand, so this is the inversion used on secret-derived
    /// coordinates. `None` for the zero element.
    pub fn inv_fermat(&self, poly: &Self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }

        let m = poly.degree();
        debug_assert!(m >= 2);

        // t = a^(2^(m-1) - 1): each step squares and multiplies once
        let mut t = self.clone();
        for _ in 0..m - 2 {
            t = t.sqr(poly).mul(self, poly);
        }
        Some(t.sqr(poly))
    }

    /// Field inversion modulo `poly` by the polynomial extended
    /// Euclidean algorithm. `None` for the zero element.
    ///
    /// The degree-comparison loop branches on operand values; public
    /// data only. Secret operands go through [`Gf2n::inv_fermat`].
    pub fn inv(&self, poly: &Self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }

        let mut u = self.limbs.clone();
        let mut v = poly.limbs.clone();
        let mut g1: Vec<W> = vec![W::ONE];
        let mut g2: Vec<W> = Vec::new();

        loop {
            let du = degree(&u);
            if du == 0 {
                // u == 1
                break;
            }
            let dv = degree(&v);
            let mut j = du - dv;
            if j < 0 {
                std::mem::swap(&mut u, &mut v);
                std::mem::swap(&mut g1, &mut g2);
                j = -j;
            }
            let vc = v.clone();
            xor_shifted(&mut u, &vc, j as usize);
            let g2c = g2.clone();
            xor_shifted(&mut g1, &g2c, j as usize);
            normalize(&mut u);
            if u.is_empty() {
                // gcd(u, poly) != 1; only possible for invalid input
                return None;
            }
        }

        reduce(&mut g1, &poly.limbs);
        Some(Gf2n { limbs: g1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type F = Gf2n<u64>;

    // x^163 + x^7 + x^6 + x^3 + 1, the sect163 field polynomial
    fn poly163() -> F {
        F::from_hex("800000000000000000000000000000000000000c9")
    }

    #[test]
    fn addition_is_xor() {
        let mut a = F::from_hex("f0f0");
        let b = F::from_hex("0ff0");
        a.add_assign(&b);
        assert_eq!(a, F::from_hex("ff00"));
    }

    #[test]
    fn small_carry_less_product() {
        // (x + 1)(x^2 + x + 1) = x^3 + 2x^2 + 2x + 1 -> x^3 + 1 over GF(2)
        let a = F::from_hex("3");
        let b = F::from_hex("7");
        let big = poly163();
        assert_eq!(a.mul(&b, &big), F::from_hex("9"));
    }

    #[test]
    fn square_matches_self_multiplication() {
        let p = poly163();
        let a = F::from_hex("3f0eba16286a2d57ea0991168d4994637e8343e36");
        assert_eq!(a.sqr(&p), a.mul(&a, &p));
    }

    #[test]
    fn inverse_round_trip() {
        let p = poly163();
        let a = F::from_hex("d51fbc6c71a0094fa2cdd545b11c5c0c797324f1");
        let inv = a.inv(&p).unwrap();
        assert!(a.mul(&inv, &p).is_one());
    }

    #[test]
    fn fermat_chain_agrees_with_euclidean() {
        let p = poly163();
        for hex in ["1", "2", "3f0eba16286a2d57ea0991168d4994637e8343e36", "deadbeef"] {
            let a = F::from_hex(hex);
            assert_eq!(a.inv_fermat(&p), a.inv(&p), "{hex}");
        }
        assert_eq!(F::new().inv_fermat(&p), None);
    }

    #[test]
    fn reduction_stays_below_degree() {
        let p = poly163();
        let a = F::from_hex("3f0eba16286a2d57ea0991168d4994637e8343e36");
        let sq = a.sqr(&p);
        assert!(sq.degree() < p.degree());
    }
}
