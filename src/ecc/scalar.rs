//! Scalar recoding.
//!
//! [`ScalarParser`] turns a little-endian secret byte vector into a
//! stream of signed window symbols consumed most significant first.
//! Each symbol packs a small table value with two flag bits: `LOW`
//! marks a zero digit, `SUBTRACT` marks a negated table entry. The
//! first symbol pulled is guaranteed non-zero and non-negative; the
//! driver fails the multiplication if either invariant breaks.

/// Symbol flag: the digit is zero.
pub const SCALAR_IS_LOW: u32 = 1 << 8;

/// Symbol flag: the digit selects a negated table entry.
pub const SCALAR_IS_SUBTRACT: u32 = 1 << 9;

/// Scalar recoding selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarCoding {
    /// One bit per symbol.
    Binary,
    /// Joint coding of two scalars for Shamir's trick.
    BinaryDual,
    /// Width-w non-adjacent form, `2 <= w <= 7`.
    Naf(u32),
    /// Fixed windows over a pre-computed table, `2 <= w <= 8`.
    PreComputed(u32),
    /// One bit per symbol, in ladder order.
    MontLadder,
}

impl ScalarCoding {
    /// Window width in bits.
    pub fn window(&self) -> usize {
        match self {
            ScalarCoding::Binary | ScalarCoding::MontLadder | ScalarCoding::BinaryDual => 1,
            ScalarCoding::Naf(w) => *w as usize,
            ScalarCoding::PreComputed(w) => *w as usize,
        }
    }

    /// Doublings per symbol in the double-and-add drivers.
    pub fn doublings_per_symbol(&self) -> usize {
        match self {
            ScalarCoding::PreComputed(w) => *w as usize,
            _ => 1,
        }
    }

    /// Number of pre-computation table entries.
    pub fn table_size(&self) -> usize {
        match self {
            ScalarCoding::Binary | ScalarCoding::MontLadder => 1,
            ScalarCoding::BinaryDual => 3,
            ScalarCoding::Naf(w) => 2 * ((1usize << (w - 1)) - 1),
            ScalarCoding::PreComputed(w) => (1usize << w) - 1,
        }
    }

    /// Offset of the negated table half for NAF codings.
    pub fn sub_offset(&self) -> usize {
        match self {
            ScalarCoding::Naf(w) => (1usize << (w - 1)) - 2,
            _ => 0,
        }
    }
}

/// Recoded symbol stream over a secret scalar.
pub struct ScalarParser {
    symbols: Vec<u32>,
    pos: usize,
}

impl ScalarParser {
    /// Recodes a little-endian secret byte vector under the chosen
    /// coding.
    pub fn new(coding: ScalarCoding, secret: &[u8]) -> Self {
        let bits = collect_bits(secret);
        let symbols = match coding {
            ScalarCoding::Binary | ScalarCoding::MontLadder => bits
                .iter()
                .map(|&b| if b == 0 { SCALAR_IS_LOW } else { 1 })
                .collect(),
            ScalarCoding::BinaryDual => recode_dual(secret),
            ScalarCoding::Naf(w) => recode_naf(&bits, w),
            ScalarCoding::PreComputed(w) => recode_windows(&bits, w),
        };

        ScalarParser { symbols, pos: 0 }
    }

    /// Number of symbols the multiplication loop will consume.
    pub fn num_symbols(&self) -> usize {
        self.symbols.len()
    }

    /// Pulls the next symbol, most significant first.
    pub fn pull(&mut self) -> u32 {
        let s = self.symbols.get(self.pos).copied().unwrap_or(SCALAR_IS_LOW);
        self.pos += 1;
        s
    }
}

// MSB-first bit vector of a little-endian byte string with leading
// zeros stripped
fn collect_bits(secret: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(secret.len() * 8);
    let mut seen_one = false;
    for &byte in secret.iter().rev() {
        for i in (0..8).rev() {
            let b = (byte >> i) & 1;
            if b == 1 {
                seen_one = true;
            }
            if seen_one {
                bits.push(b);
            }
        }
    }
    bits
}

// Width-w non-adjacent form, emitted most significant digit first.
// Digits are odd in [-(2^(w-1)-1), 2^(w-1)-1]; a symbol carries the
// digit magnitude, so the driver's `value - 1` lands on the multiple
// table and `value + sub_offset` on its negated half.
fn recode_naf(bits: &[u8], w: u32) -> Vec<u32> {
    if bits.is_empty() {
        return Vec::new();
    }

    // Little-endian value as u64 windows over the bit string
    let n = bits.len();
    let bit = |i: usize| -> u32 {
        if i < n {
            bits[n - 1 - i] as u32
        } else {
            0
        }
    };

    // Standard wNAF: scan from the least significant end, keeping a
    // borrow that models the running subtraction
    let mut digits: Vec<i32> = Vec::new();
    let mut carry = 0u32;
    let mut i = 0usize;
    let width = w as usize;
    let half = 1i32 << (w - 1);

    while i < n || carry != 0 {
        let cur = bit(i) + carry;
        if cur & 1 == 0 {
            digits.push(0);
            carry = cur >> 1;
            i += 1;
            continue;
        }

        // Gather w bits
        let mut window = carry as i32;
        for j in 0..width {
            window += (bit(i + j) as i32) << j;
        }
        let mut d = window & ((1 << width) - 1);
        carry = 0;
        if d >= half {
            d -= 1 << width;
            carry = 1;
        }
        digits.push(d);
        for _ in 0..width - 1 {
            digits.push(0);
        }
        i += width;
    }

    // Drop high zero padding, then emit MSB first
    while let Some(&0) = digits.last() {
        digits.pop();
    }

    digits
        .iter()
        .rev()
        .map(|&d| {
            if d == 0 {
                SCALAR_IS_LOW
            } else if d > 0 {
                d as u32
            } else {
                (-d) as u32 | SCALAR_IS_SUBTRACT
            }
        })
        .collect()
}

// Fixed windows of w bits, most significant window first; the leading
// window is sized to the scalar so the first symbol is non-zero
fn recode_windows(bits: &[u8], w: u32) -> Vec<u32> {
    if bits.is_empty() {
        return Vec::new();
    }

    let width = w as usize;
    let total = bits.len().div_ceil(width);
    let mut symbols = Vec::with_capacity(total);

    let mut idx = 0usize;
    let first = bits.len() - (total - 1) * width;
    for s in 0..total {
        let take = if s == 0 { first } else { width };
        let mut v = 0u32;
        for _ in 0..take {
            v = (v << 1) | bits[idx] as u32;
            idx += 1;
        }
        symbols.push(if v == 0 { SCALAR_IS_LOW } else { v });
    }

    symbols
}

// Joint 2-bit coding of k1 || k2 (equal-width halves, little endian)
// for the [P, Q, P+Q] table
fn recode_dual(secret: &[u8]) -> Vec<u32> {
    let half = secret.len() / 2;
    let (k1, k2) = secret.split_at(half);

    let bit_of = |bytes: &[u8], i: usize| -> u32 {
        let byte = i / 8;
        let bit = i % 8;
        if byte < bytes.len() {
            ((bytes[byte] >> bit) & 1) as u32
        } else {
            0
        }
    };

    let bits = half * 8;
    let mut symbols = Vec::with_capacity(bits);
    let mut seen = false;
    for i in (0..bits).rev() {
        let v = bit_of(k1, i) | (bit_of(k2, i) << 1);
        if v != 0 {
            seen = true;
        }
        if seen {
            symbols.push(if v == 0 { SCALAR_IS_LOW } else { v });
        }
    }
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_msb_first() {
        // 0b1010 = 10, little-endian bytes
        let mut p = ScalarParser::new(ScalarCoding::Binary, &[10]);
        assert_eq!(p.num_symbols(), 4);
        assert_eq!(p.pull(), 1);
        assert_eq!(p.pull(), SCALAR_IS_LOW);
        assert_eq!(p.pull(), 1);
        assert_eq!(p.pull(), SCALAR_IS_LOW);
    }

    #[test]
    fn zero_scalar_has_no_symbols() {
        let p = ScalarParser::new(ScalarCoding::Binary, &[0, 0, 0]);
        assert_eq!(p.num_symbols(), 0);
    }

    fn naf_value(symbols: &[u32], _w: u32) -> i64 {
        // Reconstruct the scalar from the emitted digit stream
        let mut v = 0i64;
        for &s in symbols {
            v *= 2;
            if s == SCALAR_IS_LOW {
                continue;
            }
            let d = (s & 0xff) as i64;
            if s & SCALAR_IS_SUBTRACT != 0 {
                v -= d;
            } else {
                v += d;
            }
        }
        v
    }

    #[test]
    fn naf_reconstructs_value() {
        for k in [1u64, 2, 3, 7, 10, 127, 255, 1000, 0xdead, 0xbeef_cafe] {
            for w in 2..=7u32 {
                let bytes = k.to_le_bytes();
                let p = ScalarParser::new(ScalarCoding::Naf(w), &bytes);
                assert_eq!(
                    naf_value(&p.symbols, w),
                    k as i64,
                    "k={k} w={w} digits={:?}",
                    p.symbols
                );
            }
        }
    }

    #[test]
    fn naf_nonzero_digits_are_sparse() {
        let bytes = 0xffff_ffff_u32.to_le_bytes();
        for w in 2..=7u32 {
            let p = ScalarParser::new(ScalarCoding::Naf(w), &bytes);
            let mut last_nonzero: isize = -(w as isize);
            for (i, &s) in p.symbols.iter().enumerate() {
                if s != SCALAR_IS_LOW {
                    assert!(i as isize - last_nonzero >= w as isize || last_nonzero < 0);
                    last_nonzero = i as isize;
                }
            }
        }
    }

    #[test]
    fn windows_reconstruct_value() {
        for k in [1u64, 5, 16, 255, 4097, 0xfeed_f00d] {
            for w in 2..=8u32 {
                let bytes = k.to_le_bytes();
                let p = ScalarParser::new(ScalarCoding::PreComputed(w), &bytes);
                let mut v = 0u64;
                for &s in &p.symbols {
                    v <<= w;
                    if s != SCALAR_IS_LOW {
                        v += (s & 0xff) as u64;
                    }
                }
                assert_eq!(v, k, "k={k} w={w}");
            }
        }
    }

    #[test]
    fn first_symbol_is_positive_nonzero() {
        for k in [1u64, 3, 9, 100, 0xffff] {
            let bytes = k.to_le_bytes();
            for coding in [
                ScalarCoding::Binary,
                ScalarCoding::Naf(4),
                ScalarCoding::PreComputed(4),
                ScalarCoding::MontLadder,
            ] {
                let mut p = ScalarParser::new(coding, &bytes);
                let first = p.pull();
                assert_ne!(first, SCALAR_IS_LOW);
                assert_eq!(first & SCALAR_IS_SUBTRACT, 0);
            }
        }
    }

    #[test]
    fn dual_coding_joins_two_scalars() {
        // k1 = 5 (101), k2 = 3 (011) in 1-byte halves
        let mut p = ScalarParser::new(ScalarCoding::BinaryDual, &[5, 3]);
        // bit 2: k1=1,k2=0 -> 1; bit 1: k1=0,k2=1 -> 2; bit 0: k1=1,k2=1 -> 3
        assert_eq!(p.num_symbols(), 3);
        assert_eq!(p.pull(), 1);
        assert_eq!(p.pull(), 2);
        assert_eq!(p.pull(), 3);
    }
}
