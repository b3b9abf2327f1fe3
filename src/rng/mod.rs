//! Random number generation.
//!
//! The core does not construct its own generator: it consumes entropy
//! through the [`Csprng`] contract, a pooled reader over an injected
//! entropy callback. The default callback draws from the operating
//! system.

pub mod csprng;

pub use csprng::{Csprng, EntropyCallback};
