use phantom::recovery::{combine, create, SharingError};
use phantom::Csprng;

fn rng() -> Csprng {
    Csprng::from_seed_for_tests(0x0123_4567_89ab_cdef)
}

#[test]
fn any_three_of_five_reconstruct() {
    let mut prng = rng();
    let secret = *b"a 256-bit secret for the quorum!";
    let shares = create(&mut prng, &secret, 5, 3).unwrap();

    for picks in [[0, 1, 2], [0, 2, 4], [4, 3, 1], [2, 4, 0]] {
        let subset: Vec<Vec<u8>> = picks.iter().map(|&i| shares[i].clone()).collect();
        assert_eq!(combine(&subset, 3).unwrap(), secret, "{picks:?}");
    }
}

#[test]
fn order_of_shares_does_not_matter() {
    let mut prng = rng();
    let secret = [0xa5u8; 32];
    let shares = create(&mut prng, &secret, 7, 4).unwrap();

    let forwards: Vec<Vec<u8>> = shares[..4].to_vec();
    let backwards: Vec<Vec<u8>> = shares[..4].iter().rev().cloned().collect();
    assert_eq!(combine(&forwards, 4).unwrap(), secret);
    assert_eq!(combine(&backwards, 4).unwrap(), secret);
}

#[test]
fn two_shares_miss_the_secret() {
    let mut prng = rng();
    let secret = *b"under-threshold subsets learn 0!";
    let shares = create(&mut prng, &secret, 5, 3).unwrap();

    // Interpolating below the threshold produces a different value
    let two = shares[..2].to_vec();
    assert_ne!(combine(&two, 2).unwrap(), secret);
}

#[test]
fn parameter_validation() {
    let mut prng = rng();
    let secret = [1u8; 32];

    assert_eq!(create(&mut prng, &secret, 0, 1), Err(SharingError::InvalidQuorum));
    assert_eq!(create(&mut prng, &secret, 5, 0), Err(SharingError::InvalidQuorum));
    assert_eq!(create(&mut prng, &secret, 3, 4), Err(SharingError::InvalidQuorum));

    let shares = create(&mut prng, &secret, 5, 3).unwrap();
    assert_eq!(combine(&shares[..2], 3), Err(SharingError::NotEnoughShares));

    let mut bad = shares.clone();
    bad[0].pop();
    assert_eq!(combine(&bad[..3], 3), Err(SharingError::MalformedShares));
}

#[test]
fn shards_are_serialised_with_identity_prefix() {
    let mut prng = rng();
    let secret = [9u8; 32];
    let shares = create(&mut prng, &secret, 5, 2).unwrap();
    for (i, s) in shares.iter().enumerate() {
        assert_eq!(s.len(), phantom::recovery::SHARD_LENGTH);
        assert_eq!(s[0] as usize, i + 1);
    }
}

#[test]
fn threshold_one_reveals_to_everyone() {
    let mut prng = rng();
    let secret = [0x3cu8; 32];
    let shares = create(&mut prng, &secret, 4, 1).unwrap();
    for s in &shares {
        assert_eq!(combine(&[s.clone()], 1).unwrap(), secret);
    }
}
