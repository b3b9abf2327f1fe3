//! Phantom core: arbitrary-precision arithmetic and elliptic-curve
//! scalar multiplication.
//!
//! This crate is the hard core of a cryptographic library. Every
//! higher-level scheme — key exchange, signatures, identity-based
//! encryption — is a thin client of the two engines implemented here:
//!
//! - the **multi-precision arithmetic engine**: word primitives,
//!   limb-vector kernels (schoolbook/Toom/FFT multiplication, the full
//!   division family, Montgomery reduction, windowed modular
//!   exponentiation, Jacobi symbols) and the signed big-integer facade;
//! - the **elliptic-curve engine**: point arithmetic in four coordinate
//!   systems over three field types, constant-time scalar
//!   multiplication with multiple recodings, and pre-computation
//!   tables.
//!
//! # Module overview
//!
//! - `word`
//!   Machine-word primitives: wide multiply, pre-inverted 2/1 and 3/2
//!   division, reciprocals, the single-word GCD family.
//!
//! - `mpbase`
//!   Stateless limb-vector arithmetic. The performance-critical layer:
//!   everything above it is written in terms of these kernels.
//!
//! - `bigint`
//!   The owned facades: signed arbitrary-precision integers and GF(2)
//!   polynomials.
//!
//! - `modular`
//!   Per-modulus reduction configuration: naive, Barrett, Montgomery
//!   and Solinas strategies behind one dispatch point.
//!
//! - `ecc`
//!   Curve configurations, the named parameter sets, eight point
//!   implementations, scalar recoding and the three-algorithm
//!   multiplication engine.
//!
//! - `recovery`
//!   Shamir secret sharing over bitsliced GF(256): the worked example
//!   of consuming the arithmetic surface.
//!
//! - `rng`
//!   The CSPRNG contract — entropy enters through an injected
//!   callback; the core never constructs its own generator.
//!
//! - `logging`
//!   The process-wide log level, one atomic word.
//!
//! # Design goals
//!
//! - **Auditability**: explicit, low-level arithmetic with the
//!   algorithms visible, not hidden behind abstraction.
//! - **Constant-time discipline** on every secret path: masked
//!   selection, dummy-operation masking, uniform per-limb kernels.
//! - **Caller-owned memory** for the hot paths: scratch is sized by
//!   query functions and passed in.

pub mod bigint;
pub mod ecc;
pub mod logging;
pub mod modular;
pub mod mpbase;
pub mod recovery;
pub mod rng;
pub mod word;

pub use bigint::{Gf2n, Mpz};
pub use ecc::{CurvePoint, Ecc, EccConfig, EccError, NamedCurve, ScalarCoding};
pub use logging::{log_level, set_log_level, LogLevel};
pub use modular::{ModConfig, Reduction};
pub use rng::Csprng;
pub use word::Limb;
