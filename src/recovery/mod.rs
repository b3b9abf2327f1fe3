//! Secret recovery and survivability mechanisms.
//!
//! This module provides the crate's worked example of consuming the
//! arithmetic surface: **Shamir secret sharing** over GF(256).
//!
//! A 32-byte secret is split into `n` shares such that:
//!
//! - Any subset of at least `k` shares can reconstruct the secret.
//! - Any subset of fewer than `k` shares reveals no information
//!   about it.
//!
//! Each byte of the secret is protected by its own random polynomial of
//! degree `k - 1`; evaluation and Lagrange interpolation both run on
//! the bitsliced, branch-free [`gf256`] kernels, 32 field elements per
//! instruction.
//!
//! This module is intentionally minimal and does not include:
//! - authentication or MACs for shares
//! - serialization or networking logic
//! - access control or recovery policies
//!
//! Those concerns belong to higher layers.

pub mod gf256;
pub mod shamir;

pub use shamir::{combine, create, SharingError, KEY_BYTES, SHARD_LENGTH};
