//! Conversion between decimal SOL amounts and base units (lamports).
//!
//! Parsing is exact decimal arithmetic. Digits past the ninth fractional
//! place are truncated toward zero, so `"0.0000000019"` is 1 lamport.

use thiserror::Error;

/// Base units per whole coin.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Fractional digits representable in base units.
const DECIMALS: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a decimal number")]
    Malformed(String),

    #[error("'{0}' is too large")]
    Overflow(String),
}

/// Parse a decimal SOL amount such as `"1.5"` into lamports.
pub fn parse_sol(input: &str) -> Result<u64, AmountError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
        return Err(AmountError::Malformed(s.to_string()));
    }

    let overflow = || AmountError::Overflow(s.to_string());

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };

    // Truncate, then right-pad to exactly nine digits.
    let frac = &frac[..frac.len().min(DECIMALS)];
    let frac: u64 = format!("{:0<width$}", frac, width = DECIMALS)
        .parse()
        .map_err(|_| AmountError::Malformed(s.to_string()))?;

    whole
        .checked_mul(LAMPORTS_PER_SOL)
        .and_then(|l| l.checked_add(frac))
        .ok_or_else(overflow)
}

/// Render lamports as a decimal SOL string without trailing zeros.
pub fn format_sol(lamports: u64) -> String {
    let whole = lamports / LAMPORTS_PER_SOL;
    let frac = lamports % LAMPORTS_PER_SOL;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:09}", frac);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_and_fractional() {
        assert_eq!(parse_sol("1").unwrap(), 1_000_000_000);
        assert_eq!(parse_sol("1.5").unwrap(), 1_500_000_000);
        assert_eq!(parse_sol("0.1").unwrap(), 100_000_000);
        assert_eq!(parse_sol(".25").unwrap(), 250_000_000);
        assert_eq!(parse_sol("2.").unwrap(), 2_000_000_000);
        assert_eq!(parse_sol(" 0.000000001 ").unwrap(), 1);
    }

    #[test]
    fn test_parse_truncates_extra_digits() {
        assert_eq!(parse_sol("0.0000000019").unwrap(), 1);
        assert_eq!(parse_sol("0.0000000009").unwrap(), 0);
        assert_eq!(parse_sol("1.1234567899999").unwrap(), 1_123_456_789);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_sol("").unwrap_err(), AmountError::Empty);
        for bad in [".", "-1", "+1", "1e9", "abc", "1.2.3", "1,5"] {
            assert!(matches!(parse_sol(bad), Err(AmountError::Malformed(_))), "{bad}");
        }
    }

    #[test]
    fn test_parse_overflow() {
        assert!(parse_sol("18446744073.709551615").is_ok());
        assert!(matches!(parse_sol("18446744073.709551616"), Err(AmountError::Overflow(_))));
        assert!(matches!(parse_sol("99999999999999999999999"), Err(AmountError::Overflow(_))));
    }

    #[test]
    fn test_format_sol() {
        assert_eq!(format_sol(0), "0");
        assert_eq!(format_sol(1_500_000_000), "1.5");
        assert_eq!(format_sol(1), "0.000000001");
        assert_eq!(format_sol(42 * LAMPORTS_PER_SOL), "42");
    }
}
