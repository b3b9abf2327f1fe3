//! Shamir secret sharing over GF(256).
//!
//! Split: the 32-byte secret forms the constant term of a polynomial of
//! degree `k - 1` with uniformly random coefficients; every user `i`
//! in `1..=n` receives the evaluation `p(i)` as a 33-byte shard — one
//! identity byte followed by the 32 payload bytes. Combine: with at
//! least `k` shards the constant term returns through Lagrange basis
//! interpolation at zero.
//!
//! All arithmetic is bitsliced: each polynomial coefficient is a block
//! of eight 32-bit planes, so one pass evaluates all 32 secret bytes
//! at once with no data-dependent branches.

use super::gf256;
use crate::rng::Csprng;
use thiserror::Error;

/// Secret length in bytes.
pub const KEY_BYTES: usize = 32;

/// Serialised shard length: identity byte plus payload.
pub const SHARD_LENGTH: usize = KEY_BYTES + 1;

/// Failures of the sharing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SharingError {
    /// `n` or `k` is zero, or `k` exceeds `n`.
    #[error("invalid quorum parameters")]
    InvalidQuorum,
    /// The share container does not match the requested user count, or
    /// a shard has the wrong length.
    #[error("malformed shares")]
    MalformedShares,
    /// Fewer than `k` shares were supplied to combine.
    #[error("not enough shares")]
    NotEnoughShares,
}

/// Splits a 32-byte secret into `n` shards, any `k` of which
/// reconstruct it.
///
/// Polynomial coefficients above the constant term are drawn from the
/// supplied generator.
pub fn create(
    prng: &mut Csprng,
    key: &[u8; KEY_BYTES],
    n: usize,
    k: usize,
) -> Result<Vec<Vec<u8>>, SharingError> {
    if n == 0 || k == 0 || k > n || n > 255 {
        return Err(SharingError::InvalidQuorum);
    }

    // k bitsliced polynomial coefficient blocks, constant term first
    let mut poly = vec![[0u32; 8]; k];
    gf256::bitslice(&mut poly[0], key);
    for block in poly.iter_mut().skip(1) {
        let mut coeff = [0u8; KEY_BYTES];
        prng.get_mem(&mut coeff);
        gf256::bitslice(block, &coeff);
    }

    let mut shares = Vec::with_capacity(n);
    for i in 0..n {
        let id = (i + 1) as u8;

        let mut x = [0u32; 8];
        gf256::bitslice_single(&mut x, id);

        // y = poly[0] + poly[1]*x + poly[2]*x^2 + ...
        let mut y = [0u32; 8];
        let mut xpow = [0u32; 8];
        xpow.fill(!0);
        gf256::add(&mut y, &poly[0]);
        for block in poly.iter().skip(1) {
            let t = xpow;
            gf256::mul(&mut xpow, &t, &x);
            let mut term = [0u32; 8];
            gf256::mul(&mut term, &xpow, block);
            gf256::add(&mut y, &term);
        }

        let mut shard = vec![0u8; SHARD_LENGTH];
        shard[0] = id;
        let mut payload = [0u8; KEY_BYTES];
        gf256::unbitslice(&mut payload, &y);
        shard[1..].copy_from_slice(&payload);
        shares.push(shard);
    }

    Ok(shares)
}

/// Reconstructs the secret from at least `k` shards via Lagrange
/// interpolation at zero.
pub fn combine(shares: &[Vec<u8>], k: usize) -> Result<[u8; KEY_BYTES], SharingError> {
    if k == 0 {
        return Err(SharingError::InvalidQuorum);
    }
    if shares.len() < k {
        return Err(SharingError::NotEnoughShares);
    }
    if shares.iter().take(k).any(|s| s.len() != SHARD_LENGTH) {
        return Err(SharingError::MalformedShares);
    }

    // Collect the (x, y) pairs in bitsliced form
    let mut xs = vec![[0u32; 8]; k];
    let mut ys = vec![[0u32; 8]; k];
    for i in 0..k {
        gf256::bitslice_single(&mut xs[i], shares[i][0]);
        let mut payload = [0u8; KEY_BYTES];
        payload.copy_from_slice(&shares[i][1..]);
        gf256::bitslice(&mut ys[i], &payload);
    }

    let mut secret = [0u32; 8];
    for i in 0..k {
        // Lagrange basis at zero: prod_j x_j / prod_j (x_i + x_j)
        let mut num = [0u32; 8];
        let mut denom = [0u32; 8];
        num.fill(!0);
        denom.fill(!0);

        for j in 0..k {
            if i == j {
                continue;
            }
            let t = num;
            gf256::mul(&mut num, &t, &xs[j]);

            let mut diff = xs[i];
            gf256::add(&mut diff, &xs[j]);
            let t = denom;
            gf256::mul(&mut denom, &t, &diff);
        }

        let mut dinv = [0u32; 8];
        gf256::inv(&mut dinv, &denom);
        let t = num;
        gf256::mul(&mut num, &t, &dinv);
        let t = num;
        gf256::mul(&mut num, &t, &ys[i]);
        gf256::add(&mut secret, &num);
    }

    let mut key = [0u8; KEY_BYTES];
    gf256::unbitslice(&mut key, &secret);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_rng() -> Csprng {
        Csprng::from_seed_for_tests(0x5eed_1234_dead_beef)
    }

    #[test]
    fn round_trip_any_quorum() {
        let mut rng = test_rng();
        let secret = *b"0123456789abcdefFEDCBA9876543210";
        let shares = create(&mut rng, &secret, 5, 3).unwrap();
        assert_eq!(shares.len(), 5);

        // Any three of five reconstruct
        let pick = [shares[4].clone(), shares[1].clone(), shares[2].clone()];
        assert_eq!(combine(&pick, 3).unwrap(), secret);
    }

    #[test]
    fn too_few_shares_differ() {
        let mut rng = test_rng();
        let secret = [0x42u8; 32];
        let shares = create(&mut rng, &secret, 5, 3).unwrap();
        let two = [shares[0].clone(), shares[1].clone()];
        // Two shares fail the quorum check
        assert_eq!(combine(&two, 3), Err(SharingError::NotEnoughShares));
        // Interpolating with k = 2 yields garbage, not the secret
        assert_ne!(combine(&two, 2).unwrap(), secret);
    }

    #[test]
    fn quorum_validation() {
        let mut rng = test_rng();
        let secret = [1u8; 32];
        assert_eq!(
            create(&mut rng, &secret, 0, 0),
            Err(SharingError::InvalidQuorum)
        );
        assert_eq!(
            create(&mut rng, &secret, 3, 5),
            Err(SharingError::InvalidQuorum)
        );
    }

    #[test]
    fn shard_format() {
        let mut rng = test_rng();
        let secret = [7u8; 32];
        let shares = create(&mut rng, &secret, 4, 2).unwrap();
        for (i, s) in shares.iter().enumerate() {
            assert_eq!(s.len(), SHARD_LENGTH);
            assert_eq!(s[0], (i + 1) as u8);
        }
    }
}
