//! Helpers for felt-like values (addresses, token ids, hashes).
//!
//! Ledger payloads carry numbers as strings in either hex (`0x...`) or
//! decimal form, with arbitrary zero padding and letter case. Everything is
//! normalized to lowercase, unpadded hex so values from different event
//! shapes can be compared directly.
use std::str::FromStr;

use alloy::primitives::U256;

/// Canonical form of the sentinel zero address.
pub const ZERO_FELT: &str = "0x0";

/// Normalizes a felt-like value to canonical lowercase hex.
///
/// Values that cannot be parsed are returned in their raw string form; a
/// malformed field never aborts decoding.
pub fn normalize_felt(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return raw.to_string();
    }

    match U256::from_str(trimmed) {
        Ok(value) => format!("0x{value:x}"),
        Err(_) => raw.to_string(),
    }
}

/// Returns `true` when the value is the sentinel zero address.
pub fn is_zero_address(value: &str) -> bool {
    normalize_felt(value) == ZERO_FELT
}

/// Case-insensitive, padding-insensitive address comparison.
pub fn addresses_match(left: &str, right: &str) -> bool {
    normalize_felt(left).eq_ignore_ascii_case(&normalize_felt(right))
}

/// Shortens an address for human-readable text, e.g. `0x1234...cdef`.
pub fn shorten_address(address: &str) -> String {
    if address.len() <= 12 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_padding_and_case() {
        assert_eq!(normalize_felt("0x000ABC"), "0xabc");
        assert_eq!(normalize_felt("0x7"), "0x7");
    }

    #[test]
    fn test_normalize_decimal_input() {
        assert_eq!(normalize_felt("255"), "0xff");
        assert_eq!(normalize_felt("0"), "0x0");
    }

    #[test]
    fn test_normalize_falls_back_to_raw() {
        assert_eq!(normalize_felt("not-a-felt"), "not-a-felt");
        assert_eq!(normalize_felt(""), "");
    }

    #[test]
    fn test_zero_address_detection() {
        assert!(is_zero_address("0x0"));
        assert!(is_zero_address("0x0000000000000000000000000000000000000000"));
        assert!(!is_zero_address("0x1"));
        assert!(!is_zero_address(""));
    }

    #[test]
    fn test_addresses_match_ignores_case_and_padding() {
        assert!(addresses_match("0x00ABC", "0xabc"));
        assert!(addresses_match("0xUSER", "0xuser"));
        assert!(!addresses_match("0xabc", "0xabd"));
    }

    #[test]
    fn test_shorten_address() {
        assert_eq!(shorten_address("0x7"), "0x7");
        assert_eq!(
            shorten_address("0x049d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7"),
            "0x049d...4dc7"
        );
    }
}
