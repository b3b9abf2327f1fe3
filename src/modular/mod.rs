//! Per-modulus reduction configuration.
//!
//! A [`ModConfig`] carries everything the curve layer needs to reduce
//! against one modulus: the modulus itself, its bit and limb sizes, the
//! selected reduction strategy, the Barrett reciprocal, the Montgomery
//! constants, and — for Solinas primes — a custom reducer dispatched
//! through the [`SolinasReducer`] trait.
//!
//! When the Montgomery strategy is selected every field element handled
//! through this configuration is expected to be in Montgomery form
//! (pre-multiplied by `R = B^k mod m`); the conversion helpers live
//! here so the curve layer never touches REDC internals directly.
//!
//! Two inversion paths exist: the extended Euclidean [`ModConfig::inv_mod`]
//! for public data, and the Fermat power ladder
//! [`ModConfig::inv_mod_fermat`] whose schedule depends only on the
//! public modulus — the one the point formulas use on secret-derived
//! elements.

use crate::bigint::Mpz;
use crate::mpbase;
use crate::word::Limb;

/// Modular reduction strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reduction {
    /// Plain division.
    Naive,
    /// Barrett reduction with the precomputed `floor(B^2k / m)`.
    Barrett,
    /// Montgomery (REDC); elements live in Montgomery form.
    Montgomery,
    /// Curve-specific Solinas reduction.
    Solinas,
}

/// A custom reducer for a Solinas prime.
pub trait SolinasReducer<W: Limb>: Send + Sync {
    /// Reduces `x` (up to `2k` limbs) into `[0, m)`.
    fn reduce(&self, x: &Mpz<W>, cfg: &ModConfig<W>) -> Mpz<W>;
}

/// Immutable modulus metadata shared by all field arithmetic against a
/// single modulus.
pub struct ModConfig<W: Limb> {
    /// The modulus m.
    pub modulus: Mpz<W>,
    /// Bit length of m.
    pub mod_bits: usize,
    /// Limbs in m.
    pub k: usize,
    /// Selected reduction strategy.
    pub reduction: Reduction,
    /// Barrett reciprocal `floor(B^2k / m)`.
    pub mod_inv: Mpz<W>,
    /// `R^2 mod m` where `R = B^k`.
    pub mont_r2: Mpz<W>,
    /// `-m^{-1} mod B`, the single-limb Montgomery constant.
    pub mont_inv: W,
    /// Optional custom Solinas reducer.
    pub cst: Option<Box<dyn SolinasReducer<W>>>,
}

impl<W: Limb> ModConfig<W> {
    /// Builds the configuration for an odd (or binary-polynomial)
    /// modulus, precomputing the Barrett and Montgomery constants.
    pub fn new(modulus: Mpz<W>, mod_bits: usize, reduction: Reduction) -> Self {
        let k = modulus.limb_len();

        // floor(B^2k / m) and B^2k mod m fall out of one division
        let mut b2k = Mpz::new();
        b2k.setbit(2 * k * W::BITS as usize);
        let (mod_inv, mont_r2) = Mpz::tdiv_qr_ref(&b2k, &modulus);

        let mont_inv = if modulus.is_odd() {
            mpbase::binvert_limb(modulus.limb(0)).wrapping_neg()
        } else {
            W::ZERO
        };

        ModConfig {
            modulus,
            mod_bits,
            k,
            reduction,
            mod_inv,
            mont_r2,
            mont_inv,
            cst: None,
        }
    }

    /// Attaches a custom Solinas reducer and selects the Solinas
    /// strategy.
    pub fn with_solinas(mut self, cst: Box<dyn SolinasReducer<W>>) -> Self {
        self.reduction = Reduction::Solinas;
        self.cst = Some(cst);
        self
    }

    /// Full reduction of an arbitrary (public) value into `[0, m)`.
    pub fn reduce(&self, x: &Mpz<W>) -> Mpz<W> {
        match self.reduction {
            Reduction::Naive | Reduction::Montgomery => x.mod_positive(&self.modulus),
            Reduction::Barrett => self.reduce_barrett(x),
            Reduction::Solinas => match &self.cst {
                Some(cst) => cst.reduce(x, self),
                None => x.mod_positive(&self.modulus),
            },
        }
    }

    // Barrett: q = floor(x * mu / B^2k), r = x - q*m, then at most two
    // corrective subtractions for x < m^2
    fn reduce_barrett(&self, x: &Mpz<W>) -> Mpz<W> {
        if x.is_negative() {
            return x.mod_positive(&self.modulus);
        }
        if x.cmp_abs(&self.modulus) == std::cmp::Ordering::Less {
            return x.clone();
        }
        if x.sizeinbase(2) > 2 * self.k * W::BITS as usize {
            return x.mod_positive(&self.modulus);
        }

        let q = (&(x * &self.mod_inv)).shr_bits(2 * self.k * W::BITS as usize);
        let mut r = x - &(&q * &self.modulus);
        while r.cmp_abs(&self.modulus) != std::cmp::Ordering::Less || r.is_negative() {
            if r.is_negative() {
                r = &r + &self.modulus;
            } else {
                r = &r - &self.modulus;
            }
        }
        r
    }

    /// Modular addition of reduced operands.
    pub fn add_mod(&self, a: &Mpz<W>, b: &Mpz<W>) -> Mpz<W> {
        let mut r = a + b;
        if r.cmp_abs(&self.modulus) != std::cmp::Ordering::Less {
            r = &r - &self.modulus;
        }
        r
    }

    /// Modular subtraction of reduced operands.
    pub fn sub_mod(&self, a: &Mpz<W>, b: &Mpz<W>) -> Mpz<W> {
        let mut r = a - b;
        if r.is_negative() {
            r = &r + &self.modulus;
        }
        r
    }

    /// Modular doubling.
    pub fn dbl_mod(&self, a: &Mpz<W>) -> Mpz<W> {
        self.add_mod(a, a)
    }

    /// Modular product; REDC for Montgomery-form operands, reduce
    /// otherwise.
    pub fn mul_mod(&self, a: &Mpz<W>, b: &Mpz<W>) -> Mpz<W> {
        if self.reduction == Reduction::Montgomery {
            let mut r = a.clone();
            r.mul_mont(b, self);
            r
        } else {
            self.reduce(&(a * b))
        }
    }

    /// Modular square.
    pub fn sqr_mod(&self, a: &Mpz<W>) -> Mpz<W> {
        self.mul_mod(a, a)
    }

    /// Enters Montgomery form: `x · R mod m`.
    pub fn to_mont(&self, x: &Mpz<W>) -> Mpz<W> {
        let mut r = x.clone();
        r.mul_mont(&self.mont_r2, self);
        r
    }

    /// Leaves Montgomery form: `x · R^{-1} mod m`.
    pub fn from_mont(&self, x: &Mpz<W>) -> Mpz<W> {
        let one = Mpz::from_limb(W::ONE);
        let mut r = x.clone();
        r.mul_mont(&one, self);
        r
    }

    /// Modular inverse of a field element in the configured
    /// representation, by the extended Euclidean algorithm. `None` when
    /// the element is not invertible.
    ///
    /// The Euclidean loop branches on operand values, so this path is
    /// for public data only; secret operands go through
    /// [`ModConfig::inv_mod_fermat`].
    pub fn inv_mod(&self, a: &Mpz<W>) -> Option<Mpz<W>> {
        if self.reduction == Reduction::Montgomery {
            let plain = self.from_mont(a);
            let inv = plain.invert(&self.modulus)?;
            Some(self.to_mont(&inv))
        } else {
            a.invert(&self.modulus)
        }
    }

    /// Modular inverse by the Fermat power ladder, `a^(m-2) mod m`.
    ///
    /// The exponent `m - 2` is public, so the multiplication schedule
    /// is independent of the operand; this is the inversion used on
    /// secret-derived field elements. Requires a prime modulus.
    /// `None` for zero.
    pub fn inv_mod_fermat(&self, a: &Mpz<W>) -> Option<Mpz<W>> {
        if a.is_zero() {
            return None;
        }

        let e = &self.modulus - &Mpz::from_u32(2);
        let plain = self.to_plain(a);
        let inv = plain.powm(&e, &self.modulus);
        if inv.is_zero() {
            return None;
        }
        Some(self.from_plain(&inv))
    }

    /// Canonical representation of a reduced element, out of Montgomery
    /// form where applicable.
    pub fn to_plain(&self, a: &Mpz<W>) -> Mpz<W> {
        if self.reduction == Reduction::Montgomery {
            self.from_mont(a)
        } else {
            a.clone()
        }
    }

    /// Field representation of a plain reduced value.
    pub fn from_plain(&self, a: &Mpz<W>) -> Mpz<W> {
        let reduced = a.mod_positive(&self.modulus);
        if self.reduction == Reduction::Montgomery {
            self.to_mont(&reduced)
        } else {
            reduced
        }
    }
}

/// Solinas reduction for the NIST P-192 prime `2^192 - 2^64 - 1`.
///
/// The 384-bit input splits into six 64-bit words `c5..c0`; the residue
/// is `s1 + s2 + s3 + s4` with
/// `s1 = (c2, c1, c0)`, `s2 = (0, c3, c3)`, `s3 = (c4, c4, 0)`,
/// `s4 = (c5, c5, c5)`, followed by at most three subtractions of p.
pub struct SolinasSecp192r1;

impl<W: Limb> SolinasReducer<W> for SolinasSecp192r1 {
    fn reduce(&self, x: &Mpz<W>, cfg: &ModConfig<W>) -> Mpz<W> {
        if x.is_negative() {
            return x.mod_positive(&cfg.modulus);
        }
        if x.sizeinbase(2) > 384 {
            return x.mod_positive(&cfg.modulus);
        }

        // Split into 64-bit groups
        let g = (64 / W::BITS) as usize;
        let mut c = [
            Mpz::<W>::new(),
            Mpz::new(),
            Mpz::new(),
            Mpz::new(),
            Mpz::new(),
            Mpz::new(),
        ];
        for (i, slot) in c.iter_mut().enumerate() {
            let mut v = Mpz::new();
            for j in 0..g {
                v = &v + &Mpz::from_limb(x.limb(i * g + j)).shl_bits(j * W::BITS as usize);
            }
            *slot = v;
        }

        let w64 = 64usize;
        let s1 = &(&c[0] + &c[1].shl_bits(w64)) + &c[2].shl_bits(2 * w64);
        let s2 = &c[3] + &c[3].shl_bits(w64);
        let s3 = &c[4].shl_bits(w64) + &c[4].shl_bits(2 * w64);
        let s4 = &(&c[5] + &c[5].shl_bits(w64)) + &c[5].shl_bits(2 * w64);

        let mut r = &(&s1 + &s2) + &(&s3 + &s4);
        while r.cmp_abs(&cfg.modulus) != std::cmp::Ordering::Less {
            r = &r - &cfg.modulus;
        }
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Z = Mpz<u64>;

    fn p192() -> Z {
        Z::from_str_radix("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFFFFFFFFFFFF", 16).unwrap()
    }

    #[test]
    fn barrett_matches_division() {
        let cfg = ModConfig::new(p192(), 192, Reduction::Barrett);
        let x = Z::from_str_radix(
            "123456789abcdef00fedcba987654321aaaabbbbccccdddd1111222233334444",
            16,
        )
        .unwrap();
        assert_eq!(cfg.reduce(&x), x.mod_positive(&p192()));
    }

    #[test]
    fn solinas_matches_division() {
        let cfg =
            ModConfig::new(p192(), 192, Reduction::Barrett).with_solinas(Box::new(SolinasSecp192r1));
        let a = Z::from_str_radix("188DA80EB03090F67CBF20EB43A18800F4FF0AFD82FF1012", 16).unwrap();
        let x = &a * &a;
        assert_eq!(cfg.reduce(&x), x.mod_positive(&p192()));
    }

    #[test]
    fn montgomery_round_trip() {
        let cfg = ModConfig::new(p192(), 192, Reduction::Montgomery);
        let a = Z::from_u32(123456);
        let am = cfg.to_mont(&a);
        assert_eq!(cfg.from_mont(&am), a);

        let b = Z::from_u32(654321);
        let bm = cfg.to_mont(&b);
        let abm = cfg.mul_mod(&am, &bm);
        assert_eq!(cfg.from_mont(&abm), (&a * &b).mod_positive(&p192()));
    }

    #[test]
    fn mont_inv_constant() {
        let cfg = ModConfig::new(p192(), 192, Reduction::Montgomery);
        // -m^{-1} * m = -1 mod B
        assert_eq!(
            cfg.mont_inv.wrapping_mul(cfg.modulus.limb(0)),
            u64::MAX,
        );
    }

    #[test]
    fn inverse_in_montgomery_domain() {
        let cfg = ModConfig::new(p192(), 192, Reduction::Montgomery);
        let a = cfg.from_plain(&Z::from_u32(7));
        let inv = cfg.inv_mod(&a).unwrap();
        let prod = cfg.mul_mod(&a, &inv);
        assert!(cfg.to_plain(&prod).is_one());
    }

    #[test]
    fn fermat_inverse_agrees_with_euclidean() {
        for reduction in [Reduction::Barrett, Reduction::Montgomery] {
            let cfg = ModConfig::new(p192(), 192, reduction);
            for v in [2u32, 7, 123456, 0xdead_beef] {
                let a = cfg.from_plain(&Z::from_u32(v));
                let e = cfg.inv_mod(&a).unwrap();
                let f = cfg.inv_mod_fermat(&a).unwrap();
                assert_eq!(e, f, "v = {v}");
            }
            assert_eq!(cfg.inv_mod_fermat(&Z::new()), None);
        }
    }
}
