//! Conversion of human-readable duration text into microseconds

/// The substring identifying a millisecond unit token
const MILLI: &str = "milli";

/// Parse a fragment like `"120 milliseconds"` into a microsecond count
///
/// The first run of ASCII digits is taken as the value and the next
/// whitespace-delimited token as its unit. Units containing `milli` are
/// scaled by 1000, anything else is assumed to already be in microseconds.
/// Text with no parsable integer yields `0`.
pub fn parse_micros(text: &str) -> u64 {
    let start = match text.find(|c: char| c.is_ascii_digit()) {
        Some(i) => i,
        None => return 0,
    };
    let rest = &text[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or_else(|| rest.len());

    let value: u64 = match rest[..end].parse() {
        Ok(v) => v,
        Err(_) => return 0,
    };

    let unit = rest[end..].split_whitespace().next().unwrap_or("");
    if unit.contains(MILLI) {
        value.saturating_mul(1000)
    } else {
        value
    }
}

#[cfg(test)]
mod test {
    use super::parse_micros;

    #[test]
    fn milliseconds_are_scaled() {
        assert_eq!(parse_micros("took 5 milliseconds"), 5000);
        assert_eq!(parse_micros("120 milliseconds."), 120_000);
    }

    #[test]
    fn microseconds_pass_through() {
        assert_eq!(parse_micros("took 5 microseconds"), 5);
        assert_eq!(parse_micros("850 microseconds"), 850);
    }

    #[test]
    fn unit_match_is_case_sensitive() {
        assert_eq!(parse_micros("7 Milliseconds"), 7);
    }

    #[test]
    fn unit_is_the_next_token_only() {
        // "milli" appearing later in the line must not count
        assert_eq!(parse_micros("3 us (not milliseconds)"), 3);
        assert_eq!(parse_micros("4ms"), 4);
    }

    #[test]
    fn missing_integer_is_zero() {
        assert_eq!(parse_micros(""), 0);
        assert_eq!(parse_micros("no digits here"), 0);
    }

    #[test]
    fn overflowing_integer_is_zero() {
        assert_eq!(parse_micros("99999999999999999999999 microseconds"), 0);
    }

    #[test]
    fn scaling_saturates() {
        assert_eq!(
            parse_micros(&format!("{} milliseconds", u64::MAX)),
            u64::MAX
        );
    }
}
