//! The scalar-multiplication engine.
//!
//! [`Ecc`] owns the curve configuration, a working point, and a
//! pre-computation table, all generic over the point implementation.
//! One of three algorithms runs per call:
//!
//! 1. *Unmasked double-and-add* — point addition skipped on zero digits.
//! 2. *Masked double-and-add* (the default) — zero digits add into a
//!    dummy point instead, so the operation sequence is independent of
//!    the secret's Hamming weight; the table entry and the addition
//!    target are both selected with branch-free index arithmetic.
//! 3. *Montgomery ladder* — two XZ registers with a limb-masked
//!    conditional swap per bit, followed by y-recovery.

use super::scalar::{ScalarParser, SCALAR_IS_LOW, SCALAR_IS_SUBTRACT};
use super::{CurvePoint, EccConfig, EccError, ScalarCoding};
use crate::bigint::Mpz;
use crate::logging::{log_level, LogLevel};
use crate::word::Limb;

/// Scalar-multiplication driver over one curve and point type.
pub struct Ecc<W: Limb, P: CurvePoint<W>> {
    cfg: EccConfig<W>,
    coding: ScalarCoding,
    masking: bool,
    result_valid: bool,
    point: P,
    table: Vec<P>,
}

impl<W: Limb, P: CurvePoint<W>> Ecc<W, P> {
    /// Creates an engine for the given coding; `masking` selects the
    /// dummy-addition variant of double-and-add.
    pub fn new(cfg: EccConfig<W>, coding: ScalarCoding, masking: bool) -> Self {
        let point = P::identity(&cfg);
        let table = vec![P::identity(&cfg); coding.table_size()];
        Ecc {
            cfg,
            coding,
            masking,
            result_valid: false,
            point,
            table,
        }
    }

    /// Borrow the curve configuration.
    pub fn config(&self) -> &EccConfig<W> {
        &self.cfg
    }

    /// True after a successful scalar multiplication.
    pub fn is_valid(&self) -> bool {
        self.result_valid
    }

    /// Fills the pre-computation table from the base point.
    pub fn setup(&mut self, base: &P) -> Result<(), EccError> {
        self.table[0].copy_from(base);

        match self.coding {
            ScalarCoding::Binary | ScalarCoding::MontLadder => {}

            ScalarCoding::BinaryDual => {
                // Table: P, Q, P + Q; Q was stored by setup_dual
                let q = self.table[1].clone();
                self.table[2].copy_from(base);
                self.table[2].addition(&self.cfg, &q)?;
            }

            ScalarCoding::Naf(w) => {
                let r = (1usize << (w - 1)) - 1;

                // Multiples P, 2P, .., rP
                for i in 1..r {
                    let prev = self.table[i - 1].clone();
                    self.table[i].copy_from(&prev);
                    self.table[i].addition(&self.cfg, base)?;
                }

                // Negated half
                for i in r..2 * r {
                    let pos = self.table[i - r].clone();
                    self.table[i].copy_from(&pos);
                    self.table[i].negate(&self.cfg);
                }
            }

            ScalarCoding::PreComputed(w) => {
                let r = 1usize << w;

                self.table[1].copy_from(base);
                self.table[1].doubling(&self.cfg, 1)?;

                for i in 2..r - 1 {
                    let prev = self.table[i - 1].clone();
                    self.table[i].copy_from(&prev);
                    self.table[i].addition(&self.cfg, base)?;
                }

                // Affine-like table entries speed up the window additions
                for entry in self.table.iter_mut() {
                    entry.convert_to_mixed(&self.cfg)?;
                }
            }
        }

        Ok(())
    }

    /// Setup for Shamir's-trick dual-base multiplication: stores the
    /// second base before the standard table fill.
    pub fn setup_dual(&mut self, base: &P, base2: &P) -> Result<(), EccError> {
        debug_assert!(self.coding == ScalarCoding::BinaryDual);
        self.table[1].copy_from(base2);
        self.setup(base)
    }

    /// Multiplies the configured base by the little-endian secret.
    pub fn scalar_point_mul(&mut self, secret: &[u8]) -> Result<(), EccError> {
        self.result_valid = false;

        let mut parser = ScalarParser::new(self.coding, secret);
        let num_symbols = parser.num_symbols();
        if num_symbols == 0 {
            if log_level() == LogLevel::Debug {
                log::debug!("scalar recoding produced no symbols");
            }
            return Err(EccError::SecretIsZero);
        }

        // The first symbol must be a positive non-zero digit
        let first = parser.pull();
        if first == SCALAR_IS_LOW || first & SCALAR_IS_SUBTRACT != 0 {
            if log_level() == LogLevel::Debug {
                log::debug!("scalar recoding violated the leading-digit invariant");
            }
            return Err(EccError::RecodingError);
        }

        let remaining = num_symbols - 1;

        let result = if self.coding == ScalarCoding::MontLadder {
            self.montgomery_ladder(&mut parser, remaining)
        } else {
            self.double_and_add(&mut parser, remaining, first)
        };

        if let Err(e) = result {
            if log_level() == LogLevel::Debug {
                log::debug!("scalar multiplication failed: {e}");
            }
            return Err(e);
        }

        self.result_valid = true;
        Ok(())
    }

    // Shared driver for the masked and unmasked double-and-add variants
    fn double_and_add(
        &mut self,
        parser: &mut ScalarParser,
        remaining: usize,
        first: u32,
    ) -> Result<(), EccError> {
        let w = self.coding.doublings_per_symbol();
        let sub_offset = self.coding.sub_offset();

        // The accumulator pair: slot 0 is the real accumulator, slot 1
        // the dummy target for masked zero digits
        let mut acc = [
            self.table[(first as usize & 0xff) - 1].clone(),
            P::identity(&self.cfg),
        ];

        for _ in 0..remaining {
            acc[0].doubling(&self.cfg, w)?;

            let sym = parser.pull();
            let subtract = (sym & SCALAR_IS_SUBTRACT) != 0;
            let is_zero = sym == SCALAR_IS_LOW;
            let value = (sym & 0xff) as usize;

            // Branch-free table index: zero digits read entry 0,
            // subtractions land on the negated half
            let sub_mask = (subtract as usize).wrapping_neg();
            let zero_mask = (is_zero as usize).wrapping_neg();
            let pre_idx = value.wrapping_sub(1) & !sub_mask & !zero_mask;
            let sub_idx = (value.wrapping_add(sub_offset)) & sub_mask & !zero_mask;
            let idx = pre_idx | sub_idx;

            if self.masking {
                // The addition always happens; zero digits write the
                // dummy slot
                let target = is_zero as usize;
                let entry = self.table[idx].clone();
                acc[target].addition(&self.cfg, &entry)?;
            } else if !is_zero {
                let entry = self.table[idx].clone();
                acc[0].addition(&self.cfg, &entry)?;
            }
        }

        self.point = acc.into_iter().next().expect("accumulator pair");
        Ok(())
    }

    // Montgomery ladder over XZ registers with limb-masked swaps
    fn montgomery_ladder(
        &mut self,
        parser: &mut ScalarParser,
        remaining: usize,
    ) -> Result<(), EccError> {
        let base = self.table[0].clone();

        // The consumed leading 1-bit leaves (R0, R1) = (P, 2P)
        let mut r0 = base.clone();
        let mut r1 = base.clone();
        r1.doubling(&self.cfg, 1)?;

        // role tracks which register holds the lower multiple
        let mut role = 0u32;
        for _ in 0..remaining {
            let sym = parser.pull();
            let bit = u32::from(sym != SCALAR_IS_LOW);

            // Physically swap so that r0 is the register to double
            r0.cond_swap(&mut r1, role ^ bit, &self.cfg);
            role = bit;

            r0.ladder_step(&self.cfg, &mut r1, &base)?;
        }

        // Align (R0, R1) = ([k]P, [k+1]P)
        r0.cond_swap(&mut r1, role, &self.cfg);

        self.point.copy_from(&r0);
        self.point.y_recovery(&self.cfg, &base, &r1)
    }

    /// Affine coordinates of the result. Leaves the outputs untouched
    /// on failure.
    pub fn get(&self, x: &mut Mpz<W>, y: &mut Mpz<W>) -> Result<(), EccError> {
        if !self.result_valid {
            return Err(EccError::ScalarMulError);
        }
        self.point.convert_from(&self.cfg, x, y)
    }

    /// The working point in its native coordinate system.
    pub fn get_result_point(&self) -> &P {
        &self.point
    }

    /// The result as fixed-width big-endian bytes, `x` concatenated
    /// with `y`, each left-padded to `width` bytes.
    pub fn get_bytes(&self, width: usize) -> Result<Vec<u8>, EccError> {
        let (mut x, mut y) = (Mpz::new(), Mpz::new());
        self.get(&mut x, &mut y)?;
        let mut out = x.to_bytes_be(width);
        out.extend_from_slice(&y.to_bytes_be(width));
        Ok(out)
    }
}
