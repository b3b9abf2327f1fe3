//! Montgomery-form points over prime fields, `B·y² = x³ + A·x² + x`.
//!
//! The affine type carries full double-and-add arithmetic. The
//! projective type is XZ-only: it exists for the ladder, where each
//! step is one joint doubling-and-differential-addition, and the
//! y-coordinate is reconstructed afterwards with the Okeya–Sakurai
//! recovery from the two final ladder registers and the affine base.
//! The ladder constant `(A + 2)/4` comes precomputed in the
//! configuration's `d` slot; the `b_is_1`/`d_is_1` flags skip the
//! corresponding constant multiplications, matching the fast-path
//! dispatch of the other point families. Affine steps invert through
//! the Fermat power ladder, never the Euclidean path, so the schedule
//! stays independent of the secret coordinates.

use super::{CurvePoint, EccConfig, EccError};
use crate::bigint::Mpz;
use crate::word::Limb;

// B*t with the B = 1 shortcut of curve25519/curve448
fn mul_by_b<W: Limb>(cfg: &EccConfig<W>, t: &Mpz<W>) -> Mpz<W> {
    if cfg.b_is_1 {
        t.clone()
    } else {
        cfg.modulus.mul_mod(&cfg.b, t)
    }
}

// a24*t, the ladder constant (A + 2)/4 kept in cfg.d
fn mul_by_a24<W: Limb>(cfg: &EccConfig<W>, t: &Mpz<W>) -> Mpz<W> {
    if cfg.d_is_1 {
        t.clone()
    } else {
        cfg.modulus.mul_mod(&cfg.d, t)
    }
}

/// Affine Montgomery point with an infinity flag.
#[derive(Clone, Debug)]
pub struct MontgomeryPrimeAffine<W: Limb> {
    pub x: Mpz<W>,
    pub y: Mpz<W>,
    infinity: bool,
}

impl<W: Limb> MontgomeryPrimeAffine<W> {
    fn double_in_place(&mut self, cfg: &EccConfig<W>) -> Result<(), EccError> {
        if self.infinity {
            return Ok(());
        }
        let f = &cfg.modulus;
        if self.y.is_zero() {
            *self = Self::identity(cfg);
            return Ok(());
        }

        // lambda = (3x^2 + 2Ax + 1) / (2By)
        let xx = f.sqr_mod(&self.x);
        let one = f.from_plain(&Mpz::from_limb(W::ONE));
        let num = f.add_mod(
            &f.add_mod(&f.add_mod(&f.dbl_mod(&xx), &xx), &f.dbl_mod(&f.mul_mod(&cfg.a, &self.x))),
            &one,
        );
        let den = f.dbl_mod(&mul_by_b(cfg, &self.y));
        let lambda = f.mul_mod(&num, &f.inv_mod_fermat(&den).ok_or(EccError::PointError)?);

        // x3 = B*lambda^2 - A - 2x
        let x3 = f.sub_mod(
            &f.sub_mod(&mul_by_b(cfg, &f.sqr_mod(&lambda)), &cfg.a),
            &f.dbl_mod(&self.x),
        );
        let y3 = f.sub_mod(&f.mul_mod(&lambda, &f.sub_mod(&self.x, &x3)), &self.y);

        self.x = x3;
        self.y = y3;
        Ok(())
    }
}

impl<W: Limb> CurvePoint<W> for MontgomeryPrimeAffine<W> {
    fn identity(_cfg: &EccConfig<W>) -> Self {
        MontgomeryPrimeAffine {
            x: Mpz::new(),
            y: Mpz::new(),
            infinity: true,
        }
    }

    fn from_affine(cfg: &EccConfig<W>, x: &Mpz<W>, y: &Mpz<W>) -> Self {
        let f = &cfg.modulus;
        MontgomeryPrimeAffine {
            x: f.from_plain(x),
            y: f.from_plain(y),
            infinity: false,
        }
    }

    fn doubling(&mut self, cfg: &EccConfig<W>, w: usize) -> Result<(), EccError> {
        for _ in 0..w {
            self.double_in_place(cfg)?;
        }
        Ok(())
    }

    fn addition(&mut self, cfg: &EccConfig<W>, other: &Self) -> Result<(), EccError> {
        if other.infinity {
            return Ok(());
        }
        if self.infinity {
            self.copy_from(other);
            return Ok(());
        }

        let f = &cfg.modulus;
        if self.x == other.x {
            if self.y == other.y && !self.y.is_zero() {
                return self.double_in_place(cfg);
            }
            *self = Self::identity(cfg);
            return Ok(());
        }

        // lambda = (y2 - y1) / (x2 - x1)
        let num = f.sub_mod(&other.y, &self.y);
        let den = f.sub_mod(&other.x, &self.x);
        let lambda = f.mul_mod(&num, &f.inv_mod_fermat(&den).ok_or(EccError::PointError)?);

        // x3 = B*lambda^2 - A - x1 - x2
        let x3 = f.sub_mod(
            &f.sub_mod(
                &f.sub_mod(&mul_by_b(cfg, &f.sqr_mod(&lambda)), &cfg.a),
                &self.x,
            ),
            &other.x,
        );
        let y3 = f.sub_mod(&f.mul_mod(&lambda, &f.sub_mod(&self.x, &x3)), &self.y);

        self.x = x3;
        self.y = y3;
        Ok(())
    }

    fn negate(&mut self, cfg: &EccConfig<W>) {
        if !self.infinity {
            let f = &cfg.modulus;
            self.y = f.sub_mod(&Mpz::new(), &self.y);
        }
    }

    fn convert_from(
        &self,
        cfg: &EccConfig<W>,
        x: &mut Mpz<W>,
        y: &mut Mpz<W>,
    ) -> Result<(), EccError> {
        if self.infinity {
            return Err(EccError::PointAtInfinity);
        }
        let f = &cfg.modulus;
        *x = f.to_plain(&self.x);
        *y = f.to_plain(&self.y);
        Ok(())
    }

    fn convert_to_mixed(&mut self, _cfg: &EccConfig<W>) -> Result<(), EccError> {
        Ok(())
    }

    fn copy_from(&mut self, other: &Self) {
        self.x = other.x.clone();
        self.y = other.y.clone();
        self.infinity = other.infinity;
    }

    fn cond_swap(&mut self, other: &mut Self, condition: u32, cfg: &EccConfig<W>) {
        let k = cfg.modulus.k;
        Mpz::cond_swap(&mut self.x, &mut other.x, condition, k);
        Mpz::cond_swap(&mut self.y, &mut other.y, condition, k);
        let mask = (condition & 1) != 0;
        let (a, b) = (self.infinity, other.infinity);
        self.infinity = (a & !mask) | (b & mask);
        other.infinity = (b & !mask) | (a & mask);
    }
}

/// XZ projective Montgomery point; `y` is only populated by
/// [`CurvePoint::y_recovery`] after a ladder run.
#[derive(Clone, Debug)]
pub struct MontgomeryPrimeProjective<W: Limb> {
    pub x: Mpz<W>,
    pub y: Mpz<W>,
    pub z: Mpz<W>,
}

impl<W: Limb> MontgomeryPrimeProjective<W> {
    fn double_xz(&mut self, cfg: &EccConfig<W>) {
        let f = &cfg.modulus;

        let a = f.add_mod(&self.x, &self.z);
        let aa = f.sqr_mod(&a);
        let b = f.sub_mod(&self.x, &self.z);
        let bb = f.sqr_mod(&b);
        let e = f.sub_mod(&aa, &bb);

        self.x = f.mul_mod(&aa, &bb);
        self.z = f.mul_mod(&e, &f.add_mod(&bb, &mul_by_a24(cfg, &e)));
    }
}

impl<W: Limb> CurvePoint<W> for MontgomeryPrimeProjective<W> {
    fn identity(cfg: &EccConfig<W>) -> Self {
        let f = &cfg.modulus;
        MontgomeryPrimeProjective {
            x: f.from_plain(&Mpz::from_limb(W::ONE)),
            y: Mpz::new(),
            z: Mpz::new(),
        }
    }

    fn from_affine(cfg: &EccConfig<W>, x: &Mpz<W>, y: &Mpz<W>) -> Self {
        let f = &cfg.modulus;
        MontgomeryPrimeProjective {
            x: f.from_plain(x),
            y: f.from_plain(y),
            z: f.from_plain(&Mpz::from_limb(W::ONE)),
        }
    }

    fn doubling(&mut self, cfg: &EccConfig<W>, w: usize) -> Result<(), EccError> {
        for _ in 0..w {
            self.double_xz(cfg);
        }
        Ok(())
    }

    fn addition(&mut self, _cfg: &EccConfig<W>, _other: &Self) -> Result<(), EccError> {
        // XZ coordinates carry no y; general addition is undefined here
        Err(EccError::PointError)
    }

    fn negate(&mut self, _cfg: &EccConfig<W>) {}

    fn ladder_step(
        &mut self,
        cfg: &EccConfig<W>,
        other: &mut Self,
        base: &Self,
    ) -> Result<(), EccError> {
        let f = &cfg.modulus;

        let a = f.add_mod(&self.x, &self.z);
        let aa = f.sqr_mod(&a);
        let b = f.sub_mod(&self.x, &self.z);
        let bb = f.sqr_mod(&b);
        let e = f.sub_mod(&aa, &bb);

        let c = f.add_mod(&other.x, &other.z);
        let d = f.sub_mod(&other.x, &other.z);
        let da = f.mul_mod(&d, &a);
        let cb = f.mul_mod(&c, &b);

        // Differential addition against the base, Z_base assumed 1
        other.x = f.mul_mod(&base.z, &f.sqr_mod(&f.add_mod(&da, &cb)));
        other.z = f.mul_mod(&base.x, &f.sqr_mod(&f.sub_mod(&da, &cb)));

        // Doubling of self
        self.x = f.mul_mod(&aa, &bb);
        self.z = f.mul_mod(&e, &f.add_mod(&bb, &mul_by_a24(cfg, &e)));

        Ok(())
    }

    fn y_recovery(
        &mut self,
        cfg: &EccConfig<W>,
        base: &Self,
        p1: &Self,
    ) -> Result<(), EccError> {
        let f = &cfg.modulus;

        // Okeya-Sakurai: base affine (x, y), self = (X1 : Z1) = [k]P,
        // p1 = (X2 : Z2) = [k+1]P
        let x = &base.x;
        let y = &base.y;

        let mut v1 = f.mul_mod(x, &self.z);
        let mut v2 = f.add_mod(&self.x, &v1);
        let mut v3 = f.sub_mod(&self.x, &v1);
        v3 = f.sqr_mod(&v3);
        v3 = f.mul_mod(&v3, &p1.x);

        v1 = f.dbl_mod(&f.mul_mod(&cfg.a, &self.z));
        v2 = f.add_mod(&v2, &v1);

        let mut v4 = f.mul_mod(x, &self.x);
        v4 = f.add_mod(&v4, &self.z);
        v2 = f.mul_mod(&v2, &v4);

        v1 = f.mul_mod(&v1, &self.z);
        v2 = f.sub_mod(&v2, &v1);
        v2 = f.mul_mod(&v2, &p1.z);

        let y_out = f.sub_mod(&v2, &v3);

        let mut v1 = f.dbl_mod(&mul_by_b(cfg, y));
        v1 = f.mul_mod(&v1, &self.z);
        v1 = f.mul_mod(&v1, &p1.z);

        let x_out = f.mul_mod(&v1, &self.x);
        let z_out = f.mul_mod(&v1, &self.z);

        self.x = x_out;
        self.y = y_out;
        self.z = z_out;
        Ok(())
    }

    fn convert_from(
        &self,
        cfg: &EccConfig<W>,
        x: &mut Mpz<W>,
        y: &mut Mpz<W>,
    ) -> Result<(), EccError> {
        if self.z.is_zero() {
            return Err(EccError::PointAtInfinity);
        }
        let f = &cfg.modulus;
        let zi = f.inv_mod_fermat(&self.z).ok_or(EccError::PointError)?;
        *x = f.to_plain(&f.mul_mod(&self.x, &zi));
        *y = f.to_plain(&f.mul_mod(&self.y, &zi));
        Ok(())
    }

    fn convert_to_mixed(&mut self, cfg: &EccConfig<W>) -> Result<(), EccError> {
        if self.z.is_zero() {
            return Err(EccError::PointAtInfinity);
        }
        let f = &cfg.modulus;
        let zi = f.inv_mod_fermat(&self.z).ok_or(EccError::PointError)?;
        self.x = f.mul_mod(&self.x, &zi);
        self.y = f.mul_mod(&self.y, &zi);
        self.z = f.from_plain(&Mpz::from_limb(W::ONE));
        Ok(())
    }

    fn copy_from(&mut self, other: &Self) {
        self.x = other.x.clone();
        self.y = other.y.clone();
        self.z = other.z.clone();
    }

    fn cond_swap(&mut self, other: &mut Self, condition: u32, cfg: &EccConfig<W>) {
        let k = cfg.modulus.k;
        Mpz::cond_swap(&mut self.x, &mut other.x, condition, k);
        Mpz::cond_swap(&mut self.y, &mut other.y, condition, k);
        Mpz::cond_swap(&mut self.z, &mut other.z, condition, k);
    }
}
