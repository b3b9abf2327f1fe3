//! Shared curve configuration.

use crate::bigint::Mpz;
use crate::modular::{ModConfig, Reduction};
use crate::word::Limb;

/// Everything the point formulas need about one curve: the field
/// configuration and the curve constants, stored in the same
/// representation (Montgomery or plain) as field elements, plus the
/// fast-path flags the specialised formulas dispatch on.
pub struct EccConfig<W: Limb> {
    /// Field modulus configuration (prime, or the field polynomial for
    /// binary curves).
    pub modulus: ModConfig<W>,
    /// Group order.
    pub order_m: Mpz<W>,
    /// Curve coefficient a.
    pub a: Mpz<W>,
    /// Curve coefficient b (Weierstrass) or the Edwards d.
    pub b: Mpz<W>,
    /// Auxiliary constant: `(A + 2) / 4` for Montgomery ladders, or the
    /// Edwards d.
    pub d: Mpz<W>,
    /// a = -3 fast path (prime Weierstrass).
    pub a_is_minus_3: bool,
    /// a = -1 fast path (twisted Edwards).
    pub a_is_minus_1: bool,
    /// a = 0 fast path (binary Koblitz).
    pub a_is_zero: bool,
    /// a = 1 fast path (binary curves).
    pub a_is_1: bool,
    /// b = 1 fast path (binary Koblitz, Montgomery B).
    pub b_is_1: bool,
    /// d = 1 fast path (the Montgomery ladder constant).
    pub d_is_1: bool,
}

impl<W: Limb> EccConfig<W> {
    /// Assembles a configuration, converting the curve constants into
    /// the field representation the reduction strategy mandates.
    pub fn new(
        modulus: ModConfig<W>,
        order_m: Mpz<W>,
        a: &Mpz<W>,
        b: &Mpz<W>,
        d: &Mpz<W>,
    ) -> Self {
        let a_is_minus_3 = {
            let m3 = &modulus.modulus - &Mpz::from_u32(3);
            *a == m3 || (a.is_negative() && a.abs() == Mpz::from_u32(3))
        };
        let a_is_minus_1 = {
            let m1 = &modulus.modulus - &Mpz::from_u32(1);
            *a == m1 || (a.is_negative() && a.abs() == Mpz::from_u32(1))
        };
        let a_is_zero = a.is_zero();
        let a_is_1 = a.is_one();
        let b_is_1 = b.is_one();
        let d_is_1 = d.is_one();

        let reduce_in = |v: &Mpz<W>| -> Mpz<W> {
            let plain = if v.is_negative() {
                v.mod_positive(&modulus.modulus)
            } else {
                v.clone()
            };
            if modulus.reduction == Reduction::Montgomery {
                modulus.from_plain(&plain)
            } else {
                plain
            }
        };

        let a = reduce_in(a);
        let b = reduce_in(b);
        let d = reduce_in(d);

        EccConfig {
            modulus,
            order_m,
            a,
            b,
            d,
            a_is_minus_3,
            a_is_minus_1,
            a_is_zero,
            a_is_1,
            b_is_1,
            d_is_1,
        }
    }
}
