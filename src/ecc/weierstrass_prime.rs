//! Short Weierstrass points over prime fields, `y² = x³ + ax + b`.
//!
//! Three coordinate systems share the same contract: affine with an
//! explicit infinity flag, homogeneous projective `(X : Y : Z)` with
//! `x = X/Z`, and Jacobian `(X : Y : Z)` with `x = X/Z²`, `y = Y/Z³`.
//! Doubling uses the a = −3 shortcut when the configuration flags it;
//! all field arithmetic respects the configured representation, so the
//! same formulas serve plain, Barrett, Solinas and Montgomery domains.
//! Every inversion in these formulas — the affine step divisions and
//! the projective scale at conversion — runs the Fermat power ladder,
//! whose schedule depends only on the public modulus.

use super::{CurvePoint, EccConfig, EccError};
use crate::bigint::Mpz;
use crate::word::Limb;

/// Affine point with an implicit point-at-infinity flag.
#[derive(Clone, Debug)]
pub struct WeierstrassPrimeAffine<W: Limb> {
    pub x: Mpz<W>,
    pub y: Mpz<W>,
    infinity: bool,
}

impl<W: Limb> WeierstrassPrimeAffine<W> {
    fn double_in_place(&mut self, cfg: &EccConfig<W>) -> Result<(), EccError> {
        if self.infinity {
            return Ok(());
        }
        let f = &cfg.modulus;
        if self.y.is_zero() {
            *self = Self::identity(cfg);
            return Ok(());
        }

        // lambda = (3x^2 + a) / 2y
        let xx = f.sqr_mod(&self.x);
        let num = f.add_mod(&f.add_mod(&xx, &xx), &f.add_mod(&xx, &cfg.a));
        let den = f.dbl_mod(&self.y);
        let lambda = f.mul_mod(&num, &f.inv_mod_fermat(&den).ok_or(EccError::PointError)?);

        let x3 = f.sub_mod(&f.sqr_mod(&lambda), &f.dbl_mod(&self.x));
        let y3 = f.sub_mod(&f.mul_mod(&lambda, &f.sub_mod(&self.x, &x3)), &self.y);

        self.x = x3;
        self.y = y3;
        Ok(())
    }
}

impl<W: Limb> CurvePoint<W> for WeierstrassPrimeAffine<W> {
    fn identity(_cfg: &EccConfig<W>) -> Self {
        WeierstrassPrimeAffine {
            x: Mpz::new(),
            y: Mpz::new(),
            infinity: true,
        }
    }

    fn from_affine(cfg: &EccConfig<W>, x: &Mpz<W>, y: &Mpz<W>) -> Self {
        let f = &cfg.modulus;
        WeierstrassPrimeAffine {
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

        let x3 = f.sub_mod(&f.sub_mod(&f.sqr_mod(&lambda), &self.x), &other.x);
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

/// Homogeneous projective point, `x = X/Z`, `y = Y/Z`; `Z = 0` is the
/// identity.
#[derive(Clone, Debug)]
pub struct WeierstrassPrimeProjective<W: Limb> {
    pub x: Mpz<W>,
    pub y: Mpz<W>,
    pub z: Mpz<W>,
}

impl<W: Limb> WeierstrassPrimeProjective<W> {
    fn is_identity(&self) -> bool {
        self.z.is_zero()
    }

    fn double_in_place(&mut self, cfg: &EccConfig<W>) -> Result<(), EccError> {
        if self.is_identity() {
            return Ok(());
        }
        let f = &cfg.modulus;
        if self.y.is_zero() {
            *self = Self::identity(cfg);
            return Ok(());
        }

        let xx = f.sqr_mod(&self.x);
        let zz = f.sqr_mod(&self.z);

        // w = a*ZZ + 3*XX, with the a = -3 shortcut w = 3*(XX - ZZ)
        let w = if cfg.a_is_minus_3 {
            let t = f.sub_mod(&xx, &zz);
            f.add_mod(&f.dbl_mod(&t), &t)
        } else {
            let t = f.add_mod(&f.dbl_mod(&xx), &xx);
            f.add_mod(&f.mul_mod(&cfg.a, &zz), &t)
        };

        let s = f.dbl_mod(&f.mul_mod(&self.y, &self.z));
        let ss = f.sqr_mod(&s);
        let sss = f.mul_mod(&s, &ss);
        let r = f.mul_mod(&self.y, &s);
        let rr = f.sqr_mod(&r);

        // B = (X + R)^2 - XX - RR
        let b = f.sub_mod(&f.sub_mod(&f.sqr_mod(&f.add_mod(&self.x, &r)), &xx), &rr);

        let h = f.sub_mod(&f.sqr_mod(&w), &f.dbl_mod(&b));

        self.x = f.mul_mod(&h, &s);
        self.y = f.sub_mod(&f.mul_mod(&w, &f.sub_mod(&b, &h)), &f.dbl_mod(&rr));
        self.z = sss;
        Ok(())
    }
}

impl<W: Limb> CurvePoint<W> for WeierstrassPrimeProjective<W> {
    fn identity(cfg: &EccConfig<W>) -> Self {
        let f = &cfg.modulus;
        WeierstrassPrimeProjective {
            x: Mpz::new(),
            y: f.from_plain(&Mpz::from_limb(W::ONE)),
            z: Mpz::new(),
        }
    }

    fn from_affine(cfg: &EccConfig<W>, x: &Mpz<W>, y: &Mpz<W>) -> Self {
        let f = &cfg.modulus;
        WeierstrassPrimeProjective {
            x: f.from_plain(x),
            y: f.from_plain(y),
            z: f.from_plain(&Mpz::from_limb(W::ONE)),
        }
    }

    fn doubling(&mut self, cfg: &EccConfig<W>, w: usize) -> Result<(), EccError> {
        for _ in 0..w {
            self.double_in_place(cfg)?;
        }
        Ok(())
    }

    fn addition(&mut self, cfg: &EccConfig<W>, other: &Self) -> Result<(), EccError> {
        if other.is_identity() {
            return Ok(());
        }
        if self.is_identity() {
            self.copy_from(other);
            return Ok(());
        }

        let f = &cfg.modulus;

        let y1z2 = f.mul_mod(&self.y, &other.z);
        let x1z2 = f.mul_mod(&self.x, &other.z);
        let z1z2 = f.mul_mod(&self.z, &other.z);

        let u = f.sub_mod(&f.mul_mod(&other.y, &self.z), &y1z2);
        let v = f.sub_mod(&f.mul_mod(&other.x, &self.z), &x1z2);

        if v.is_zero() {
            if u.is_zero() {
                return self.double_in_place(cfg);
            }
            *self = Self::identity(cfg);
            return Ok(());
        }

        let uu = f.sqr_mod(&u);
        let vv = f.sqr_mod(&v);
        let vvv = f.mul_mod(&v, &vv);
        let r = f.mul_mod(&vv, &x1z2);

        // A = uu*Z1Z2 - vvv - 2R
        let a = f.sub_mod(
            &f.sub_mod(&f.mul_mod(&uu, &z1z2), &vvv),
            &f.dbl_mod(&r),
        );

        self.x = f.mul_mod(&v, &a);
        self.y = f.sub_mod(
            &f.mul_mod(&u, &f.sub_mod(&r, &a)),
            &f.mul_mod(&vvv, &y1z2),
        );
        self.z = f.mul_mod(&vvv, &z1z2);
        Ok(())
    }

    fn negate(&mut self, cfg: &EccConfig<W>) {
        let f = &cfg.modulus;
        self.y = f.sub_mod(&Mpz::new(), &self.y);
    }

    fn convert_from(
        &self,
        cfg: &EccConfig<W>,
        x: &mut Mpz<W>,
        y: &mut Mpz<W>,
    ) -> Result<(), EccError> {
        if self.is_identity() {
            return Err(EccError::PointAtInfinity);
        }
        let f = &cfg.modulus;
        let zi = f.inv_mod_fermat(&self.z).ok_or(EccError::PointError)?;
        *x = f.to_plain(&f.mul_mod(&self.x, &zi));
        *y = f.to_plain(&f.mul_mod(&self.y, &zi));
        Ok(())
    }

    fn convert_to_mixed(&mut self, cfg: &EccConfig<W>) -> Result<(), EccError> {
        if self.is_identity() {
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

/// Jacobian point, `x = X/Z²`, `y = Y/Z³`; `Z = 0` is the identity.
#[derive(Clone, Debug)]
pub struct WeierstrassPrimeJacobian<W: Limb> {
    pub x: Mpz<W>,
    pub y: Mpz<W>,
    pub z: Mpz<W>,
}

impl<W: Limb> WeierstrassPrimeJacobian<W> {
    fn is_identity(&self) -> bool {
        self.z.is_zero()
    }

    fn double_in_place(&mut self, cfg: &EccConfig<W>) -> Result<(), EccError> {
        if self.is_identity() {
            return Ok(());
        }
        let f = &cfg.modulus;
        if self.y.is_zero() {
            *self = Self::identity(cfg);
            return Ok(());
        }

        let xx = f.sqr_mod(&self.x);
        let yy = f.sqr_mod(&self.y);
        let yyyy = f.sqr_mod(&yy);
        let zz = f.sqr_mod(&self.z);

        // S = 2*((X + YY)^2 - XX - YYYY)
        let s = f.dbl_mod(&f.sub_mod(
            &f.sub_mod(&f.sqr_mod(&f.add_mod(&self.x, &yy)), &xx),
            &yyyy,
        ));

        // M = 3*XX + a*ZZ^2, with the a = -3 shortcut
        let m = if cfg.a_is_minus_3 {
            let t = f.mul_mod(&f.sub_mod(&self.x, &zz), &f.add_mod(&self.x, &zz));
            f.add_mod(&f.dbl_mod(&t), &t)
        } else {
            let t = f.add_mod(&f.dbl_mod(&xx), &xx);
            f.add_mod(&t, &f.mul_mod(&cfg.a, &f.sqr_mod(&zz)))
        };

        let t = f.sub_mod(&f.sqr_mod(&m), &f.dbl_mod(&s));

        let y3 = f.sub_mod(
            &f.mul_mod(&m, &f.sub_mod(&s, &t)),
            &f.dbl_mod(&f.dbl_mod(&f.dbl_mod(&yyyy))),
        );
        let z3 = f.sub_mod(&f.sub_mod(&f.sqr_mod(&f.add_mod(&self.y, &self.z)), &yy), &zz);

        self.x = t;
        self.y = y3;
        self.z = z3;
        Ok(())
    }
}

impl<W: Limb> CurvePoint<W> for WeierstrassPrimeJacobian<W> {
    fn identity(cfg: &EccConfig<W>) -> Self {
        let f = &cfg.modulus;
        let one = f.from_plain(&Mpz::from_limb(W::ONE));
        WeierstrassPrimeJacobian {
            x: one.clone(),
            y: one,
            z: Mpz::new(),
        }
    }

    fn from_affine(cfg: &EccConfig<W>, x: &Mpz<W>, y: &Mpz<W>) -> Self {
        let f = &cfg.modulus;
        WeierstrassPrimeJacobian {
            x: f.from_plain(x),
            y: f.from_plain(y),
            z: f.from_plain(&Mpz::from_limb(W::ONE)),
        }
    }

    fn doubling(&mut self, cfg: &EccConfig<W>, w: usize) -> Result<(), EccError> {
        for _ in 0..w {
            self.double_in_place(cfg)?;
        }
        Ok(())
    }

    fn addition(&mut self, cfg: &EccConfig<W>, other: &Self) -> Result<(), EccError> {
        if other.is_identity() {
            return Ok(());
        }
        if self.is_identity() {
            self.copy_from(other);
            return Ok(());
        }

        let f = &cfg.modulus;

        let z1z1 = f.sqr_mod(&self.z);
        let z2z2 = f.sqr_mod(&other.z);

        let u1 = f.mul_mod(&self.x, &z2z2);
        let u2 = f.mul_mod(&other.x, &z1z1);
        let s1 = f.mul_mod(&f.mul_mod(&self.y, &other.z), &z2z2);
        let s2 = f.mul_mod(&f.mul_mod(&other.y, &self.z), &z1z1);

        let h = f.sub_mod(&u2, &u1);
        let r = f.dbl_mod(&f.sub_mod(&s2, &s1));

        if h.is_zero() {
            if r.is_zero() {
                return self.double_in_place(cfg);
            }
            *self = Self::identity(cfg);
            return Ok(());
        }

        let i = f.sqr_mod(&f.dbl_mod(&h));
        let j = f.mul_mod(&h, &i);
        let v = f.mul_mod(&u1, &i);

        let x3 = f.sub_mod(&f.sub_mod(&f.sqr_mod(&r), &j), &f.dbl_mod(&v));
        let y3 = f.sub_mod(
            &f.mul_mod(&r, &f.sub_mod(&v, &x3)),
            &f.dbl_mod(&f.mul_mod(&s1, &j)),
        );
        let z3 = f.mul_mod(
            &f.sub_mod(
                &f.sub_mod(&f.sqr_mod(&f.add_mod(&self.z, &other.z)), &z1z1),
                &z2z2,
            ),
            &h,
        );

        self.x = x3;
        self.y = y3;
        self.z = z3;
        Ok(())
    }

    fn negate(&mut self, cfg: &EccConfig<W>) {
        let f = &cfg.modulus;
        self.y = f.sub_mod(&Mpz::new(), &self.y);
    }

    fn convert_from(
        &self,
        cfg: &EccConfig<W>,
        x: &mut Mpz<W>,
        y: &mut Mpz<W>,
    ) -> Result<(), EccError> {
        if self.is_identity() {
            return Err(EccError::PointAtInfinity);
        }
        let f = &cfg.modulus;
        let zi = f.inv_mod_fermat(&self.z).ok_or(EccError::PointError)?;
        let zi2 = f.sqr_mod(&zi);
        let zi3 = f.mul_mod(&zi2, &zi);
        *x = f.to_plain(&f.mul_mod(&self.x, &zi2));
        *y = f.to_plain(&f.mul_mod(&self.y, &zi3));
        Ok(())
    }

    fn convert_to_mixed(&mut self, cfg: &EccConfig<W>) -> Result<(), EccError> {
        if self.is_identity() {
            return Err(EccError::PointAtInfinity);
        }
        let f = &cfg.modulus;
        let zi = f.inv_mod_fermat(&self.z).ok_or(EccError::PointError)?;
        let zi2 = f.sqr_mod(&zi);
        let zi3 = f.mul_mod(&zi2, &zi);
        self.x = f.mul_mod(&self.x, &zi2);
        self.y = f.mul_mod(&self.y, &zi3);
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
