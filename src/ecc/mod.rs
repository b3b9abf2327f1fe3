//! Elliptic curve points and the scalar-multiplication engine.
//!
//! One point type per (field, coordinate-system) pair, all implementing
//! the same [`CurvePoint`] contract; the [`engine::Ecc`] driver is
//! generic over the point type and runs one of three algorithms —
//! unmasked double-and-add, masked double-and-add, or the Montgomery
//! ladder — over symbols produced by the [`scalar::ScalarParser`].
//!
//! ## Constant-time discipline
//!
//! Point formulas branch only on public data (coordinate system, curve
//! flags); the engine selects table entries and addition targets through
//! branch-free index arithmetic, and the ladder swaps registers with
//! limb-masked exchanges. Point equality is never tested on secret data,
//! and every field inversion on the point paths uses a Fermat power
//! ladder with a public exponent — the Euclidean inverses stay on
//! public data only.

pub mod config;
pub mod curves;
pub mod edwards;
pub mod engine;
pub mod montgomery;
pub mod scalar;
pub mod weierstrass_binary;
pub mod weierstrass_prime;

pub use config::EccConfig;
pub use curves::{CurveParams, NamedCurve};
pub use engine::Ecc;
pub use scalar::{ScalarCoding, ScalarParser};

use crate::bigint::Mpz;
use crate::word::Limb;
use thiserror::Error;

/// Field type of a curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    /// Short Weierstrass over a prime field.
    WeierstrassPrime,
    /// Short Weierstrass over a binary field.
    WeierstrassBinary,
    /// Montgomery form over a prime field.
    MontgomeryPrime,
    /// Twisted Edwards over a prime field.
    EdwardsPrime,
}

/// Failures surfaced by point operations and the scalar-multiplication
/// driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EccError {
    /// Structural failure in a point operation.
    #[error("point operation failed")]
    PointError,
    /// The identity point cannot be converted to affine coordinates.
    #[error("point at infinity")]
    PointAtInfinity,
    /// The scalar recoded to no symbols.
    #[error("secret is zero")]
    SecretIsZero,
    /// Recoding violated the leading-non-zero invariant.
    #[error("scalar recoding error")]
    RecodingError,
    /// A result was read before a successful scalar multiplication.
    #[error("no valid scalar multiplication result")]
    ScalarMulError,
}

/// The common contract of every point implementation.
///
/// Operations mutate the point in place and report failure through
/// [`EccError`]; the configuration is borrowed, never owned, so many
/// points can share one curve.
pub trait CurvePoint<W: Limb>: Clone {
    /// The identity element in this coordinate system.
    fn identity(cfg: &EccConfig<W>) -> Self;

    /// A point from affine coordinates, converted into the field
    /// representation the configuration mandates.
    fn from_affine(cfg: &EccConfig<W>, x: &Mpz<W>, y: &Mpz<W>) -> Self;

    /// In-place doubling, repeated `w` times.
    fn doubling(&mut self, cfg: &EccConfig<W>, w: usize) -> Result<(), EccError>;

    /// In-place addition `self <- self + other`.
    fn addition(&mut self, cfg: &EccConfig<W>, other: &Self) -> Result<(), EccError>;

    /// In-place negation.
    fn negate(&mut self, cfg: &EccConfig<W>);

    /// Montgomery ladder joint step: `(self, other) <- (2·self,
    /// self + other)` given `other - self = base`. Only meaningful for
    /// XZ coordinates.
    fn ladder_step(
        &mut self,
        cfg: &EccConfig<W>,
        other: &mut Self,
        base: &Self,
    ) -> Result<(), EccError> {
        let _ = (cfg, other, base);
        Err(EccError::PointError)
    }

    /// Recovers the affine y-coordinate after a Montgomery ladder from
    /// the two final registers and the affine base.
    fn y_recovery(
        &mut self,
        cfg: &EccConfig<W>,
        base: &Self,
        p1: &Self,
    ) -> Result<(), EccError> {
        let _ = (cfg, base, p1);
        Err(EccError::PointError)
    }

    /// Writes the affine coordinates, inverting the projective scale
    /// where present. Fails with [`EccError::PointAtInfinity`] for the
    /// identity.
    fn convert_from(
        &self,
        cfg: &EccConfig<W>,
        x: &mut Mpz<W>,
        y: &mut Mpz<W>,
    ) -> Result<(), EccError>;

    /// Normalises the projective scale to one for use as a table entry.
    fn convert_to_mixed(&mut self, cfg: &EccConfig<W>) -> Result<(), EccError>;

    /// Deep coordinate assignment.
    fn copy_from(&mut self, other: &Self);

    /// Branch-free conditional swap with another point.
    fn cond_swap(&mut self, other: &mut Self, condition: u32, cfg: &EccConfig<W>);
}
