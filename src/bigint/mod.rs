//! Arbitrary-precision integer facade.
//!
//! [`Mpz`] owns a normalised limb vector plus a sign and exposes
//! arithmetic, comparison and conversion on top of the `mpbase` kernels.
//! [`gf2n`] interprets limb vectors as polynomials over GF(2) modulo a
//! fixed irreducible.

pub mod gf2n;
pub mod mpz;

pub use gf2n::Gf2n;
pub use mpz::Mpz;
