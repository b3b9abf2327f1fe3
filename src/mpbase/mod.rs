//! Limb-vector arithmetic.
//!
//! Stateless routines over flat arrays of limbs, least significant limb
//! first. This is the performance-critical engine of the crate: everything
//! above it (the big-integer facade, modular machinery and the elliptic
//! curve layer) is written in terms of these kernels.
//!
//! ## Conventions
//!
//! - A length `n` always refers to the first `n` limbs of a slice; the
//!   slice may be longer.
//! - A *normalised* vector has a non-zero most significant limb (or is
//!   empty, representing zero). Routines that require normalisation say
//!   so; the rest accept arbitrary input.
//! - A *normalised* divisor has the most significant bit of its top limb
//!   set; the pre-inverted division family requires it.
//! - Functions named `*_assign` operate in place on their first argument.
//!   Three-address variants require non-overlapping slices, which the
//!   borrow checker enforces; callers partition shared buffers with
//!   `split_at_mut`.
//! - Scratch space for the hot paths (Toom, FFT, MHZ division, REDC) is
//!   caller-provided and sized by the `get_*_scratch_size` /
//!   `*_scratch_size` query functions.
//!
//! ## Algorithm selection
//!
//! Multiplication and squaring dispatch on operand length using fixed
//! thresholds, as does the division family. The thresholds are part of
//! the crate's behavioural contract and must not be retuned casually:
//! the FFT best-k table and the divide-and-conquer recursion shapes are
//! derived from them.

pub mod additive;
pub mod bdiv;
pub mod div;
pub mod fft;
pub mod invert;
pub mod jacobi;
pub mod mul;
pub mod powm;
pub mod redc;
pub mod toom;

pub use additive::*;
pub use bdiv::*;
pub use div::*;
pub use fft::mul_fft;
pub use invert::*;
pub use jacobi::{basecase_jacobi, jacobi_2, jacobi_init, jacobi_n};
pub use mul::*;
pub use powm::{pow_low, powm};
pub use redc::*;
pub use toom::{get_toom22_scratch_size, get_toom33_scratch_size};

use crate::word::{self, Limb};

/// Toom-Cook-2 multiplication threshold.
pub const MUL_TOOM22_THRESHOLD: usize = 30;

/// Toom-Cook-3 multiplication threshold.
pub const MUL_TOOM33_THRESHOLD: usize = 100;

/// Toom-Cook-2 squaring threshold.
pub const SQR_TOOM2_THRESHOLD: usize = 50;

/// Toom-Cook-3 squaring threshold.
pub const SQR_TOOM3_THRESHOLD: usize = 120;

/// FFT multiplication threshold.
pub const MUL_FFT_THRESHOLD: usize = 1000;

/// FFT squaring threshold.
pub const SQR_FFT_THRESHOLD: usize = 750;

/// Basecase division threshold for quotient-and-remainder division.
pub const DIV_QR_THRESHOLD: usize = 50;

/// Threshold above which MHZ division with an approximate inverse wins.
pub const MU_DIV_QR_THRESHOLD: usize = 2000;

/// Denominator threshold for MHZ division.
pub const MU_DEN_DIV_QR_THRESHOLD: usize = 200;

/// Quotient/denominator skew below which MHZ divides the top limbs only.
pub const MU_DIV_QR_SKEW_THRESHOLD: usize = 100;

/// Newton iteration threshold for approximate inversion.
pub const INV_NEWTON_THRESHOLD: usize = 200;

/// Newton iteration threshold for the Hensel multiplicative inverse.
pub const BINV_NEWTON_THRESHOLD: usize = 300;

/// Basecase threshold for Hensel binary division (quotient only).
pub const BDIV_Q_THRESHOLD: usize = 180;

/// Basecase threshold for Hensel binary division (quotient and remainder).
pub const BASECASE_BDIV_QR_THRESHOLD: usize = 50;

/// Threshold for approximate division being optimal with small divisors.
pub const DIVAPPR_Q_THRESHOLD: usize = 200;

/// Base threshold for wrapped multiplication modulo `B^n - 1`.
pub const MULMOD_BNM1_THRESHOLD: usize = 16;

/// Threshold at which Newton inversion switches to wrapped products.
pub const INV_MULMOD_BNM1_THRESHOLD: usize = 4 * MULMOD_BNM1_THRESHOLD;

/// Threshold separating single-word from full-precision REDC.
pub const REDC_1_TO_REDC_N_THRESHOLD: usize = 50;

/// Pre-inverted divisor metadata for the division kernels.
///
/// Normalises a 1-, 2- or 3-limb divisor prefix and carries the matching
/// 2/1 or 3/2 fixed-point reciprocal.
#[derive(Clone, Copy, Debug, Default)]
pub struct ModMeta<W: Limb> {
    /// Normalised top divisor limb.
    pub m: W,
    /// Normalised second divisor limb (2- and 3-limb forms).
    pub m_low: W,
    /// Pre-inverted reciprocal of the normalised divisor prefix.
    pub m_inv: W,
    /// Normalisation shift applied to the divisor.
    pub norm: u32,
    /// `BITS - norm`.
    pub b_norm: u32,
}

impl<W: Limb> ModMeta<W> {
    /// Metadata for a single-limb divisor.
    pub fn init(modulus: W) -> Self {
        let norm = modulus.leading_zeros();
        ModMeta {
            m: modulus,
            m_low: W::ZERO,
            m_inv: word::uinverse(modulus),
            norm,
            b_norm: W::BITS - norm,
        }
    }

    /// Metadata for a two-limb divisor `mh·B + ml`.
    pub fn init_2(mut mh: W, mut ml: W) -> Self {
        let norm = mh.leading_zeros();
        let b_norm = W::BITS - norm;
        if norm != 0 {
            mh = (mh << norm) | (ml >> b_norm);
            ml = ml << norm;
        }
        ModMeta {
            m: mh,
            m_low: ml,
            m_inv: word::uinverse_3by2(mh, ml),
            norm,
            b_norm,
        }
    }

    /// Metadata from the top three limbs of a longer divisor.
    pub fn init_3(mut d2: W, mut d1: W, d0: W) -> Self {
        let norm = d2.leading_zeros();
        let b_norm = W::BITS - norm;
        if norm != 0 {
            d2 = (d2 << norm) | (d1 >> b_norm);
            d1 = (d1 << norm) | (d0 >> b_norm);
        }
        ModMeta {
            m: d2,
            m_low: d1,
            m_inv: word::uinverse_3by2(d2, d1),
            norm,
            b_norm,
        }
    }
}
