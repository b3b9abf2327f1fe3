//! Short Weierstrass points over binary fields,
//! `y² + xy = x³ + ax² + b`.
//!
//! Coordinates are GF(2^m) polynomials carried as integer bit patterns;
//! the field polynomial lives in the configuration's modulus slot.
//! Three coordinate systems: affine with an infinity flag, homogeneous
//! projective `(X : Y : Z)` with `x = X/Z`, `y = Y/Z`, and López–Dahab
//! `(X : Y : Z)` with `x = X/Z`, `y = Y/Z²` (the Jacobian slot of the
//! engine). The `a_is_1`, `a_is_zero` and `b_is_1` flags skip the
//! corresponding constant multiplications, and field inversion runs
//! the fixed `a^(2^m - 2)` square-and-multiply chain rather than the
//! polynomial Euclidean loop.

use super::{CurvePoint, EccConfig, EccError};
use crate::bigint::{Gf2n, Mpz};
use crate::word::Limb;

fn fadd<W: Limb>(a: &Mpz<W>, b: &Mpz<W>) -> Mpz<W> {
    let mut r = Gf2n::from_mpz(a);
    r.add_assign(&Gf2n::from_mpz(b));
    r.to_mpz()
}

fn fmul<W: Limb>(cfg: &EccConfig<W>, a: &Mpz<W>, b: &Mpz<W>) -> Mpz<W> {
    let poly = Gf2n::from_mpz(&cfg.modulus.modulus);
    Gf2n::from_mpz(a).mul(&Gf2n::from_mpz(b), &poly).to_mpz()
}

fn fsqr<W: Limb>(cfg: &EccConfig<W>, a: &Mpz<W>) -> Mpz<W> {
    let poly = Gf2n::from_mpz(&cfg.modulus.modulus);
    Gf2n::from_mpz(a).sqr(&poly).to_mpz()
}

// Inversion by the fixed Fermat chain: the schedule depends only on
// the public field degree, so secret coordinates are safe here
fn finv<W: Limb>(cfg: &EccConfig<W>, a: &Mpz<W>) -> Result<Mpz<W>, EccError> {
    let poly = Gf2n::from_mpz(&cfg.modulus.modulus);
    Gf2n::from_mpz(a)
        .inv_fermat(&poly)
        .map(|g| g.to_mpz())
        .ok_or(EccError::PointError)
}

// a*t honouring the fast-path flags
fn mul_by_a<W: Limb>(cfg: &EccConfig<W>, t: &Mpz<W>) -> Mpz<W> {
    if cfg.a_is_zero {
        Mpz::new()
    } else if cfg.a_is_1 {
        t.clone()
    } else {
        fmul(cfg, &cfg.a, t)
    }
}

fn mul_by_b<W: Limb>(cfg: &EccConfig<W>, t: &Mpz<W>) -> Mpz<W> {
    if cfg.b_is_1 {
        t.clone()
    } else {
        fmul(cfg, &cfg.b, t)
    }
}

/// Affine binary-field point with an infinity flag.
#[derive(Clone, Debug)]
pub struct WeierstrassBinaryAffine<W: Limb> {
    pub x: Mpz<W>,
    pub y: Mpz<W>,
    infinity: bool,
}

impl<W: Limb> WeierstrassBinaryAffine<W> {
    fn double_in_place(&mut self, cfg: &EccConfig<W>) -> Result<(), EccError> {
        if self.infinity {
            return Ok(());
        }
        if self.x.is_zero() {
            // P == -P
            *self = Self::identity(cfg);
            return Ok(());
        }

        // lambda = x + y/x
        let lambda = fadd(&self.x, &fmul(cfg, &self.y, &finv(cfg, &self.x)?));

        // x3 = lambda^2 + lambda + a
        let x3 = fadd(&fadd(&fsqr(cfg, &lambda), &lambda), &cfg.a);

        // y3 = x^2 + (lambda + 1)*x3
        let lp1 = fadd(&lambda, &Mpz::from_limb(W::ONE));
        let y3 = fadd(&fsqr(cfg, &self.x), &fmul(cfg, &lp1, &x3));

        self.x = x3;
        self.y = y3;
        Ok(())
    }
}

impl<W: Limb> CurvePoint<W> for WeierstrassBinaryAffine<W> {
    fn identity(_cfg: &EccConfig<W>) -> Self {
        WeierstrassBinaryAffine {
            x: Mpz::new(),
            y: Mpz::new(),
            infinity: true,
        }
    }

    fn from_affine(_cfg: &EccConfig<W>, x: &Mpz<W>, y: &Mpz<W>) -> Self {
        WeierstrassBinaryAffine {
            x: x.clone(),
            y: y.clone(),
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

        if self.x == other.x {
            if self.y == other.y && !self.x.is_zero() {
                return self.double_in_place(cfg);
            }
            *self = Self::identity(cfg);
            return Ok(());
        }

        // lambda = (y1 + y2) / (x1 + x2)
        let den = fadd(&self.x, &other.x);
        let lambda = fmul(cfg, &fadd(&self.y, &other.y), &finv(cfg, &den)?);

        // x3 = lambda^2 + lambda + x1 + x2 + a
        let x3 = fadd(
            &fadd(&fadd(&fsqr(cfg, &lambda), &lambda), &den),
            &cfg.a,
        );

        // y3 = lambda*(x1 + x3) + x3 + y1
        let y3 = fadd(
            &fadd(&fmul(cfg, &lambda, &fadd(&self.x, &x3)), &x3),
            &self.y,
        );

        self.x = x3;
        self.y = y3;
        Ok(())
    }

    fn negate(&mut self, _cfg: &EccConfig<W>) {
        if !self.infinity {
            // -P = (x, x + y)
            self.y = fadd(&self.x, &self.y);
        }
    }

    fn convert_from(
        &self,
        _cfg: &EccConfig<W>,
        x: &mut Mpz<W>,
        y: &mut Mpz<W>,
    ) -> Result<(), EccError> {
        if self.infinity {
            return Err(EccError::PointAtInfinity);
        }
        *x = self.x.clone();
        *y = self.y.clone();
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

/// Homogeneous projective binary-field point, `x = X/Z`, `y = Y/Z`;
/// the identity is `(0 : 1 : 0)`.
#[derive(Clone, Debug)]
pub struct WeierstrassBinaryProjective<W: Limb> {
    pub x: Mpz<W>,
    pub y: Mpz<W>,
    pub z: Mpz<W>,
}

impl<W: Limb> WeierstrassBinaryProjective<W> {
    fn is_identity(&self) -> bool {
        self.z.is_zero()
    }

    fn double_in_place(&mut self, cfg: &EccConfig<W>) -> Result<(), EccError> {
        if self.is_identity() {
            return Ok(());
        }

        // U = X^2 + Y*Z, V = X*Z
        let u = fadd(&fsqr(cfg, &self.x), &fmul(cfg, &self.y, &self.z));
        let v = fmul(cfg, &self.x, &self.z);

        if v.is_zero() {
            // X = 0 is the 2-torsion point
            *self = Self::identity(cfg);
            return Ok(());
        }

        // W = U^2 + U*V + a*V^2
        let vv = fsqr(cfg, &v);
        let w = fadd(
            &fadd(&fsqr(cfg, &u), &fmul(cfg, &u, &v)),
            &mul_by_a(cfg, &vv),
        );

        // X3 = V*W, Z3 = V^3, Y3 = X^4*V + (U + V)*W
        let x4 = fsqr(cfg, &fsqr(cfg, &self.x));
        let y3 = fadd(&fmul(cfg, &x4, &v), &fmul(cfg, &fadd(&u, &v), &w));

        self.x = fmul(cfg, &v, &w);
        self.z = fmul(cfg, &vv, &v);
        self.y = y3;
        Ok(())
    }
}

impl<W: Limb> CurvePoint<W> for WeierstrassBinaryProjective<W> {
    fn identity(_cfg: &EccConfig<W>) -> Self {
        WeierstrassBinaryProjective {
            x: Mpz::new(),
            y: Mpz::from_limb(W::ONE),
            z: Mpz::new(),
        }
    }

    fn from_affine(_cfg: &EccConfig<W>, x: &Mpz<W>, y: &Mpz<W>) -> Self {
        WeierstrassBinaryProjective {
            x: x.clone(),
            y: y.clone(),
            z: Mpz::from_limb(W::ONE),
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

        // U = Y1*Z2 + Y2*Z1, V = X1*Z2 + X2*Z1, T = Z1*Z2
        let u = fadd(
            &fmul(cfg, &self.y, &other.z),
            &fmul(cfg, &other.y, &self.z),
        );
        let v = fadd(
            &fmul(cfg, &self.x, &other.z),
            &fmul(cfg, &other.x, &self.z),
        );

        if v.is_zero() {
            if u.is_zero() {
                return self.double_in_place(cfg);
            }
            *self = Self::identity(cfg);
            return Ok(());
        }

        let t = fmul(cfg, &self.z, &other.z);
        let vv = fsqr(cfg, &v);
        let vvv = fmul(cfg, &vv, &v);

        // W = (U^2 + U*V + a*V^2)*T + V^3
        let w = fadd(
            &fmul(
                cfg,
                &fadd(&fadd(&fsqr(cfg, &u), &fmul(cfg, &u, &v)), &mul_by_a(cfg, &vv)),
                &t,
            ),
            &vvv,
        );

        // Y3 = V^2*Z2*(U*X1 + V*Y1) + W*(U + V)
        let y3 = fadd(
            &fmul(
                cfg,
                &fmul(cfg, &vv, &other.z),
                &fadd(&fmul(cfg, &u, &self.x), &fmul(cfg, &v, &self.y)),
            ),
            &fmul(cfg, &w, &fadd(&u, &v)),
        );

        self.x = fmul(cfg, &v, &w);
        self.y = y3;
        self.z = fmul(cfg, &vvv, &t);
        Ok(())
    }

    fn negate(&mut self, _cfg: &EccConfig<W>) {
        if !self.is_identity() {
            // -(X : Y : Z) = (X : X + Y : Z)
            self.y = fadd(&self.x, &self.y);
        }
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
        let zi = finv(cfg, &self.z)?;
        *x = fmul(cfg, &self.x, &zi);
        *y = fmul(cfg, &self.y, &zi);
        Ok(())
    }

    fn convert_to_mixed(&mut self, cfg: &EccConfig<W>) -> Result<(), EccError> {
        if self.is_identity() {
            return Err(EccError::PointAtInfinity);
        }
        let zi = finv(cfg, &self.z)?;
        self.x = fmul(cfg, &self.x, &zi);
        self.y = fmul(cfg, &self.y, &zi);
        self.z = Mpz::from_limb(W::ONE);
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

/// López–Dahab point, `x = X/Z`, `y = Y/Z²`; `Z = 0` is the identity.
#[derive(Clone, Debug)]
pub struct WeierstrassBinaryJacobian<W: Limb> {
    pub x: Mpz<W>,
    pub y: Mpz<W>,
    pub z: Mpz<W>,
}

impl<W: Limb> WeierstrassBinaryJacobian<W> {
    fn is_identity(&self) -> bool {
        self.z.is_zero()
    }

    fn double_in_place(&mut self, cfg: &EccConfig<W>) -> Result<(), EccError> {
        if self.is_identity() {
            return Ok(());
        }
        if self.x.is_zero() {
            *self = Self::identity(cfg);
            return Ok(());
        }

        // López–Dahab doubling
        let a = fsqr(cfg, &self.x);
        let c = fsqr(cfg, &self.z);
        let d = fsqr(cfg, &c);
        let e = mul_by_b(cfg, &d);

        let z3 = fmul(cfg, &a, &c);
        let x3 = fadd(&fsqr(cfg, &a), &e);

        // Y3 = E*Z3 + X3*(a*Z3 + Y^2 + E)
        let inner = fadd(&fadd(&mul_by_a(cfg, &z3), &fsqr(cfg, &self.y)), &e);
        let y3 = fadd(&fmul(cfg, &e, &z3), &fmul(cfg, &x3, &inner));

        self.x = x3;
        self.y = y3;
        self.z = z3;
        Ok(())
    }

    // Mixed addition with an affine second operand (z2 == 1)
    fn madd(&mut self, cfg: &EccConfig<W>, x2: &Mpz<W>, y2: &Mpz<W>) -> Result<(), EccError> {
        if self.is_identity() {
            self.x = x2.clone();
            self.y = y2.clone();
            self.z = Mpz::from_limb(W::ONE);
            return Ok(());
        }

        let zz = fsqr(cfg, &self.z);

        // A = y2*Z1^2 + Y1, B = x2*Z1 + X1
        let a = fadd(&fmul(cfg, y2, &zz), &self.y);
        let b = fadd(&fmul(cfg, x2, &self.z), &self.x);

        if b.is_zero() {
            if a.is_zero() {
                return self.double_in_place(cfg);
            }
            *self = Self::identity(cfg);
            return Ok(());
        }

        // C = B*Z1, Z3 = C^2
        let c = fmul(cfg, &b, &self.z);
        let z3 = fsqr(cfg, &c);

        // X3 = A^2 + A*C + a*C^2 + B^2*C
        let bb = fsqr(cfg, &b);
        let x3 = fadd(
            &fadd(
                &fadd(&fsqr(cfg, &a), &fmul(cfg, &a, &c)),
                &mul_by_a(cfg, &z3),
            ),
            &fmul(cfg, &bb, &c),
        );

        // Y3 = A*C*(x2*Z3 + X3) + Z3*(X3 + y2*Z3)
        let y3 = fadd(
            &fmul(
                cfg,
                &fmul(cfg, &a, &c),
                &fadd(&fmul(cfg, x2, &z3), &x3),
            ),
            &fmul(cfg, &z3, &fadd(&x3, &fmul(cfg, y2, &z3))),
        );

        self.x = x3;
        self.y = y3;
        self.z = z3;
        Ok(())
    }
}

impl<W: Limb> CurvePoint<W> for WeierstrassBinaryJacobian<W> {
    fn identity(_cfg: &EccConfig<W>) -> Self {
        WeierstrassBinaryJacobian {
            x: Mpz::from_limb(W::ONE),
            y: Mpz::new(),
            z: Mpz::new(),
        }
    }

    fn from_affine(_cfg: &EccConfig<W>, x: &Mpz<W>, y: &Mpz<W>) -> Self {
        WeierstrassBinaryJacobian {
            x: x.clone(),
            y: y.clone(),
            z: Mpz::from_limb(W::ONE),
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

        // Mixed addition once the operand is affine-scaled; normalise a
        // local copy when it is not
        if other.z.is_one() {
            return self.madd(cfg, &other.x, &other.y);
        }
        let mut tmp = other.clone();
        tmp.convert_to_mixed(cfg)?;
        self.madd(cfg, &tmp.x, &tmp.y)
    }

    fn negate(&mut self, cfg: &EccConfig<W>) {
        if !self.is_identity() {
            // Affine y -> x + y lifts to Y -> X*Z + Y in Lopez-Dahab form
            let xz = fmul(cfg, &self.x, &self.z);
            self.y = fadd(&self.y, &xz);
        }
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
        let zi = finv(cfg, &self.z)?;
        *x = fmul(cfg, &self.x, &zi);
        *y = fmul(cfg, &self.y, &fsqr(cfg, &zi));
        Ok(())
    }

    fn convert_to_mixed(&mut self, cfg: &EccConfig<W>) -> Result<(), EccError> {
        if self.is_identity() {
            return Err(EccError::PointAtInfinity);
        }
        let zi = finv(cfg, &self.z)?;
        self.x = fmul(cfg, &self.x, &zi);
        self.y = fmul(cfg, &self.y, &fsqr(cfg, &zi));
        self.z = Mpz::from_limb(W::ONE);
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

