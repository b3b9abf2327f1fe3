//! Twisted Edwards points over prime fields, `a·x² + y² = 1 + d·x²·y²`.
//!
//! The affine type uses the unified rational addition law; the
//! projective type uses extended coordinates `(X : Y : Z : T)` with
//! `T = XY/Z` and the unified Hisil–Wong–Carter–Dawson formulas, which
//! add and double without exceptional cases. The identity is `(0, 1)`.
//! Inversions go through the Fermat power ladder so the affine law's
//! divisions carry no operand-dependent control flow.

use super::{CurvePoint, EccConfig, EccError};
use crate::bigint::Mpz;
use crate::word::Limb;

// a*t with the a = -1 shortcut
fn mul_by_a<W: Limb>(cfg: &EccConfig<W>, t: &Mpz<W>) -> Mpz<W> {
    let f = &cfg.modulus;
    if cfg.a_is_minus_1 {
        f.sub_mod(&Mpz::new(), t)
    } else {
        f.mul_mod(&cfg.a, t)
    }
}

/// Affine twisted Edwards point. The identity is representable, so no
/// infinity flag is needed.
#[derive(Clone, Debug)]
pub struct EdwardsPrimeAffine<W: Limb> {
    pub x: Mpz<W>,
    pub y: Mpz<W>,
}

impl<W: Limb> EdwardsPrimeAffine<W> {
    fn unified_add(&mut self, cfg: &EccConfig<W>, other: &Self) -> Result<(), EccError> {
        let f = &cfg.modulus;
        let one = f.from_plain(&Mpz::from_limb(W::ONE));

        let x1x2 = f.mul_mod(&self.x, &other.x);
        let y1y2 = f.mul_mod(&self.y, &other.y);
        let x1y2 = f.mul_mod(&self.x, &other.y);
        let y1x2 = f.mul_mod(&self.y, &other.x);

        let dxy = f.mul_mod(&cfg.d, &f.mul_mod(&x1x2, &y1y2));

        let den_x = f.add_mod(&one, &dxy);
        let den_y = f.sub_mod(&one, &dxy);

        let num_x = f.add_mod(&x1y2, &y1x2);
        let num_y = f.sub_mod(&y1y2, &mul_by_a(cfg, &x1x2));

        let x3 = f.mul_mod(&num_x, &f.inv_mod_fermat(&den_x).ok_or(EccError::PointError)?);
        let y3 = f.mul_mod(&num_y, &f.inv_mod_fermat(&den_y).ok_or(EccError::PointError)?);

        self.x = x3;
        self.y = y3;
        Ok(())
    }
}

impl<W: Limb> CurvePoint<W> for EdwardsPrimeAffine<W> {
    fn identity(cfg: &EccConfig<W>) -> Self {
        let f = &cfg.modulus;
        EdwardsPrimeAffine {
            x: Mpz::new(),
            y: f.from_plain(&Mpz::from_limb(W::ONE)),
        }
    }

    fn from_affine(cfg: &EccConfig<W>, x: &Mpz<W>, y: &Mpz<W>) -> Self {
        let f = &cfg.modulus;
        EdwardsPrimeAffine {
            x: f.from_plain(x),
            y: f.from_plain(y),
        }
    }

    fn doubling(&mut self, cfg: &EccConfig<W>, w: usize) -> Result<(), EccError> {
        for _ in 0..w {
            let other = self.clone();
            self.unified_add(cfg, &other)?;
        }
        Ok(())
    }

    fn addition(&mut self, cfg: &EccConfig<W>, other: &Self) -> Result<(), EccError> {
        self.unified_add(cfg, other)
    }

    fn negate(&mut self, cfg: &EccConfig<W>) {
        let f = &cfg.modulus;
        self.x = f.sub_mod(&Mpz::new(), &self.x);
    }

    fn convert_from(
        &self,
        cfg: &EccConfig<W>,
        x: &mut Mpz<W>,
        y: &mut Mpz<W>,
    ) -> Result<(), EccError> {
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
    }

    fn cond_swap(&mut self, other: &mut Self, condition: u32, cfg: &EccConfig<W>) {
        let k = cfg.modulus.k;
        Mpz::cond_swap(&mut self.x, &mut other.x, condition, k);
        Mpz::cond_swap(&mut self.y, &mut other.y, condition, k);
    }
}

/// Extended projective twisted Edwards point, `T = XY/Z`.
#[derive(Clone, Debug)]
pub struct EdwardsPrimeProjective<W: Limb> {
    pub x: Mpz<W>,
    pub y: Mpz<W>,
    pub z: Mpz<W>,
    pub t: Mpz<W>,
}

impl<W: Limb> EdwardsPrimeProjective<W> {
    fn double_in_place(&mut self, cfg: &EccConfig<W>) {
        let f = &cfg.modulus;

        let a = f.sqr_mod(&self.x);
        let b = f.sqr_mod(&self.y);
        let c = f.dbl_mod(&f.sqr_mod(&self.z));
        let d = mul_by_a(cfg, &a);

        let e = f.sub_mod(
            &f.sub_mod(&f.sqr_mod(&f.add_mod(&self.x, &self.y)), &a),
            &b,
        );
        let g = f.add_mod(&d, &b);
        let ff = f.sub_mod(&g, &c);
        let h = f.sub_mod(&d, &b);

        self.x = f.mul_mod(&e, &ff);
        self.y = f.mul_mod(&g, &h);
        self.t = f.mul_mod(&e, &h);
        self.z = f.mul_mod(&ff, &g);
    }
}

impl<W: Limb> CurvePoint<W> for EdwardsPrimeProjective<W> {
    fn identity(cfg: &EccConfig<W>) -> Self {
        let f = &cfg.modulus;
        let one = f.from_plain(&Mpz::from_limb(W::ONE));
        EdwardsPrimeProjective {
            x: Mpz::new(),
            y: one.clone(),
            z: one,
            t: Mpz::new(),
        }
    }

    fn from_affine(cfg: &EccConfig<W>, x: &Mpz<W>, y: &Mpz<W>) -> Self {
        let f = &cfg.modulus;
        let xf = f.from_plain(x);
        let yf = f.from_plain(y);
        let t = f.mul_mod(&xf, &yf);
        EdwardsPrimeProjective {
            x: xf,
            y: yf,
            z: f.from_plain(&Mpz::from_limb(W::ONE)),
            t,
        }
    }

    fn doubling(&mut self, cfg: &EccConfig<W>, w: usize) -> Result<(), EccError> {
        for _ in 0..w {
            self.double_in_place(cfg);
        }
        Ok(())
    }

    fn addition(&mut self, cfg: &EccConfig<W>, other: &Self) -> Result<(), EccError> {
        let f = &cfg.modulus;

        let a = f.mul_mod(&self.x, &other.x);
        let b = f.mul_mod(&self.y, &other.y);
        let c = f.mul_mod(&cfg.d, &f.mul_mod(&self.t, &other.t));
        let d = f.mul_mod(&self.z, &other.z);

        let e = f.sub_mod(
            &f.sub_mod(
                &f.mul_mod(
                    &f.add_mod(&self.x, &self.y),
                    &f.add_mod(&other.x, &other.y),
                ),
                &a,
            ),
            &b,
        );
        let ff = f.sub_mod(&d, &c);
        let g = f.add_mod(&d, &c);
        let h = f.sub_mod(&b, &mul_by_a(cfg, &a));

        self.x = f.mul_mod(&e, &ff);
        self.y = f.mul_mod(&g, &h);
        self.t = f.mul_mod(&e, &h);
        self.z = f.mul_mod(&ff, &g);
        Ok(())
    }

    fn negate(&mut self, cfg: &EccConfig<W>) {
        let f = &cfg.modulus;
        self.x = f.sub_mod(&Mpz::new(), &self.x);
        self.t = f.sub_mod(&Mpz::new(), &self.t);
    }

    fn convert_from(
        &self,
        cfg: &EccConfig<W>,
        x: &mut Mpz<W>,
        y: &mut Mpz<W>,
    ) -> Result<(), EccError> {
        let f = &cfg.modulus;
        let zi = f.inv_mod_fermat(&self.z).ok_or(EccError::PointError)?;
        *x = f.to_plain(&f.mul_mod(&self.x, &zi));
        *y = f.to_plain(&f.mul_mod(&self.y, &zi));
        Ok(())
    }

    fn convert_to_mixed(&mut self, cfg: &EccConfig<W>) -> Result<(), EccError> {
        let f = &cfg.modulus;
        let zi = f.inv_mod_fermat(&self.z).ok_or(EccError::PointError)?;
        self.x = f.mul_mod(&self.x, &zi);
        self.y = f.mul_mod(&self.y, &zi);
        self.z = f.from_plain(&Mpz::from_limb(W::ONE));
        self.t = f.mul_mod(&self.x, &self.y);
        Ok(())
    }

    fn copy_from(&mut self, other: &Self) {
        self.x = other.x.clone();
        self.y = other.y.clone();
        self.z = other.z.clone();
        self.t = other.t.clone();
    }

    fn cond_swap(&mut self, other: &mut Self, condition: u32, cfg: &EccConfig<W>) {
        let k = cfg.modulus.k;
        Mpz::cond_swap(&mut self.x, &mut other.x, condition, k);
        Mpz::cond_swap(&mut self.y, &mut other.y, condition, k);
        Mpz::cond_swap(&mut self.z, &mut other.z, condition, k);
        Mpz::cond_swap(&mut self.t, &mut other.t, condition, k);
    }
}
