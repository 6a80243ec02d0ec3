//! Order-preserving value generators.
//!
//! Each SQL column type maps to a pure function from a row index to a value,
//! with the guarantee that for any `i1 < i2` within capacity,
//! `value(i1) < value(i2)` under the type's natural ordering:
//!
//! * `INT` — the index itself.
//! * `REAL` — `index + r` with `r` drawn uniformly from `[0, 1)`; ordering
//!   holds because `i + r < i + 1 <= (i + 1) + r'`.
//! * `TEXT(n)` — the index rendered in base 62 with the alphabet
//!   `0-9A-Za-z`, whose character order equals its sort order. No padding:
//!   padded strings would compare wrongly across length boundaries, so the
//!   declared length is only a capacity bound, never a formatting width.
//!
//! The `REAL` draw consumes the seeded source passed by the caller, so value
//! generation is reproducible as long as call order is fixed (see
//! `crate::dataset` for the documented consumption order).

use crate::error::GenError;
use crate::schema::ColumnType;
use rand::Rng;

/// Base-62 alphabet in ascending ASCII order.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// A generated SQL value, rendered into statements and dataset lines.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    /// Render as a SQL literal. Text is double-quoted (the dialect under
    /// test accepts `"..."` string literals); generated text is base-62
    /// alphanumeric, so no escaping is required.
    pub fn render(&self) -> String {
        match self {
            SqlValue::Int(n) => n.to_string(),
            SqlValue::Real(x) => x.to_string(),
            SqlValue::Text(s) => format!("\"{}\"", s),
        }
    }
}

/// Type-directed value generator. One variant per column type, holding
/// whatever the deterministic value function needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueGen {
    Int,
    Real,
    Text { max_len: u32 },
}

impl ValueGen {
    pub fn for_type(ty: ColumnType) -> Self {
        match ty {
            ColumnType::Int => ValueGen::Int,
            ColumnType::Real => ValueGen::Real,
            ColumnType::Text(max_len) => ValueGen::Text { max_len },
        }
    }

    /// Value at `index`. `REAL` consumes one uniform draw from `rng`.
    pub fn value<R: Rng>(&self, index: u64, rng: &mut R) -> Result<SqlValue, GenError> {
        match *self {
            ValueGen::Int => Ok(SqlValue::Int(index as i64)),
            ValueGen::Real => Ok(SqlValue::Real(index as f64 + rng.random::<f64>())),
            ValueGen::Text { max_len } => {
                if let Some(capacity) = text_capacity(max_len) {
                    if index >= capacity {
                        return Err(GenError::ValueCapacityExceeded { index, max_len });
                    }
                }
                Ok(SqlValue::Text(encode_base62(index)))
            }
        }
    }
}

/// Number of distinct values a `TEXT(max_len)` column can hold, or `None`
/// when `62^max_len` exceeds `u64` (every representable index fits).
pub fn text_capacity(max_len: u32) -> Option<u64> {
    62u64.checked_pow(max_len)
}

/// Render `index` in base 62, most significant digit first, unpadded.
pub fn encode_base62(index: u64) -> String {
    if index == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    let mut rest = index;
    while rest > 0 {
        digits.push(ALPHABET[(rest % 62) as usize]);
        rest /= 62;
    }
    digits.reverse();
    // Digits come straight from ALPHABET, always valid UTF-8.
    String::from_utf8(digits).unwrap_or_default()
}

/// Inverse of [`encode_base62`]. Returns `None` for the empty string or any
/// character outside the alphabet.
pub fn decode_base62(s: &str) -> Option<u64> {
    if s.is_empty() {
        return None;
    }
    let mut value: u64 = 0;
    for b in s.bytes() {
        let digit = ALPHABET.iter().position(|&c| c == b)? as u64;
        value = value.checked_mul(62)?.checked_add(digit)?;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn int_values_are_strictly_increasing() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let gen = ValueGen::Int;
        for i in 0..1000u64 {
            let a = gen.value(i, &mut rng).unwrap();
            let b = gen.value(i + 1, &mut rng).unwrap();
            match (a, b) {
                (SqlValue::Int(a), SqlValue::Int(b)) => assert!(a < b),
                _ => panic!("expected int values"),
            }
        }
    }

    #[test]
    fn real_values_are_strictly_increasing() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let gen = ValueGen::Real;
        let mut prev = f64::NEG_INFINITY;
        for i in 0..1000u64 {
            match gen.value(i, &mut rng).unwrap() {
                SqlValue::Real(x) => {
                    assert!(x > prev, "value at {} not increasing", i);
                    assert!(x >= i as f64 && x < (i + 1) as f64);
                    prev = x;
                }
                _ => panic!("expected real value"),
            }
        }
    }

    #[test]
    fn text_values_sort_like_their_indices() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let gen = ValueGen::Text { max_len: 8 };
        let mut prev = String::new();
        for i in 0..5000u64 {
            match gen.value(i, &mut rng).unwrap() {
                SqlValue::Text(s) => {
                    if i > 0 {
                        assert!(prev < s, "{:?} !< {:?} at index {}", prev, s, i);
                    }
                    prev = s;
                }
                _ => panic!("expected text value"),
            }
        }
    }

    #[test]
    fn base62_encoding_is_unpadded() {
        assert_eq!(encode_base62(0), "0");
        assert_eq!(encode_base62(9), "9");
        assert_eq!(encode_base62(10), "A");
        assert_eq!(encode_base62(35), "Z");
        assert_eq!(encode_base62(36), "a");
        assert_eq!(encode_base62(61), "z");
        assert_eq!(encode_base62(62), "10");
        assert_eq!(encode_base62(62 * 62), "100");
    }

    #[test]
    fn base62_round_trips() {
        for i in (0..100_000u64).step_by(37) {
            assert_eq!(decode_base62(&encode_base62(i)), Some(i));
        }
        assert_eq!(decode_base62(&encode_base62(u64::MAX)), Some(u64::MAX));
        assert_eq!(decode_base62(""), None);
        assert_eq!(decode_base62("a b"), None);
    }

    #[test]
    fn text_capacity_is_enforced() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let gen = ValueGen::Text { max_len: 2 };
        // 62^2 - 1 is the last representable index.
        assert!(gen.value(62 * 62 - 1, &mut rng).is_ok());
        match gen.value(62 * 62, &mut rng) {
            Err(GenError::ValueCapacityExceeded { index, max_len }) => {
                assert_eq!(index, 62 * 62);
                assert_eq!(max_len, 2);
            }
            other => panic!("expected capacity error, got {:?}", other),
        }
    }

    #[test]
    fn text_capacity_saturates_above_u64() {
        assert_eq!(text_capacity(2), Some(62 * 62));
        // 62^11 overflows u64, so any u64 index is representable.
        assert_eq!(text_capacity(11), None);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let gen = ValueGen::Text { max_len: 11 };
        assert!(gen.value(u64::MAX, &mut rng).is_ok());
    }

    #[test]
    fn real_draws_are_reproducible_in_call_order() {
        let gen = ValueGen::Real;
        let mut rng1 = ChaCha8Rng::seed_from_u64(42);
        let mut rng2 = ChaCha8Rng::seed_from_u64(42);
        for i in 0..100u64 {
            assert_eq!(
                gen.value(i, &mut rng1).unwrap(),
                gen.value(i, &mut rng2).unwrap()
            );
        }
    }

    #[test]
    fn render_quotes_text_only() {
        assert_eq!(SqlValue::Int(7).render(), "7");
        assert_eq!(SqlValue::Text("7".into()).render(), "\"7\"");
        assert_eq!(SqlValue::Real(1.5).render(), "1.5");
    }
}
