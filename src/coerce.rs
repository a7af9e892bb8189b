//! String-to-scalar coercion shared by every leaf type.
//!
//! Integers follow general literal rules: an optional sign, then a base
//! prefix (`0x` hex, `0o` octal, `0b` binary, bare leading `0` octal) or
//! plain decimal digits. Surrounding whitespace is ignored.
//!
//! Booleans are `false` only for the negation literals `0`, `00`, `n`, `no`,
//! `f` and `false` (case-insensitive, after trimming). Any other text,
//! including the empty string, is `true`.

/// Parse an integer literal, honoring base prefixes.
pub fn parse_int(raw: &str) -> Result<i64, String> {
    let s = raw.trim();
    let (sign, unsigned) = match s.as_bytes().first() {
        Some(b'-') => ("-", &s[1..]),
        Some(b'+') => ("", &s[1..]),
        _ => ("", s),
    };

    let (radix, digits) = split_radix(unsigned);
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(format!("invalid integer literal {raw:?}"));
    }

    i64::from_str_radix(&format!("{sign}{digits}"), radix)
        .map_err(|e| format!("invalid integer literal {raw:?}: {e}"))
}

fn split_radix(s: &str) -> (u32, &str) {
    let lower = s.get(..2).map(str::to_ascii_lowercase);
    match lower.as_deref() {
        Some("0x") => (16, &s[2..]),
        Some("0o") => (8, &s[2..]),
        Some("0b") => (2, &s[2..]),
        _ if s.len() > 1 && s.starts_with('0') => (8, &s[1..]),
        _ => (10, s),
    }
}

/// Whether `raw` is one of the boolean negation literals.
pub fn is_false_literal(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "0" | "00" | "n" | "no" | "f" | "false"
    )
}

/// Coerce free text into a boolean.
pub fn parse_bool(raw: &str) -> bool {
    !is_false_literal(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal() {
        assert_eq!(parse_int("42"), Ok(42));
        assert_eq!(parse_int("-17"), Ok(-17));
        assert_eq!(parse_int("+5"), Ok(5));
        assert_eq!(parse_int("0"), Ok(0));
    }

    #[test]
    fn whitespace_trimmed() {
        assert_eq!(parse_int("  8080\n"), Ok(8080));
    }

    #[test]
    fn leading_zero_is_octal() {
        assert_eq!(parse_int("007"), Ok(7));
        assert_eq!(parse_int("010"), Ok(8));
        assert!(parse_int("08").is_err());
    }

    #[test]
    fn base_prefixes() {
        assert_eq!(parse_int("0x1F"), Ok(31));
        assert_eq!(parse_int("0XfF"), Ok(255));
        assert_eq!(parse_int("0o17"), Ok(15));
        assert_eq!(parse_int("0b101"), Ok(5));
        assert_eq!(parse_int("-0x10"), Ok(-16));
    }

    #[test]
    fn extremes() {
        assert_eq!(parse_int("-9223372036854775808"), Ok(i64::MIN));
        assert!(parse_int("9223372036854775808").is_err());
    }

    #[test]
    fn garbage_rejected() {
        assert!(parse_int("").is_err());
        assert!(parse_int("   ").is_err());
        assert!(parse_int("0x").is_err());
        assert!(parse_int("-").is_err());
        assert!(parse_int("--1").is_err());
        assert!(parse_int("-+1").is_err());
        assert!(parse_int("12abc").is_err());
        assert!(parse_int("1_000").is_err());
    }

    #[test]
    fn negation_literals_are_false() {
        for s in ["0", "00", "n", "no", "f", "false", "FALSE", "No", " F ", "N"] {
            assert!(!parse_bool(s), "{s:?} should be false");
        }
    }

    #[test]
    fn everything_else_is_true() {
        for s in ["1", "yes", "true", "TRUE", "anything-else", "000", "nope", ""] {
            assert!(parse_bool(s), "{s:?} should be true");
        }
    }
}
