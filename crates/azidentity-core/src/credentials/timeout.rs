//! Timeout attribute parsing
//!
//! Timeouts are written in Go duration syntax (`300ms`, `1.5h`, `2h45m`) because that
//! is what existing configurations for this provider already contain.

use std::time::Duration;

use thiserror::Error;

use crate::logging::Logger;

/// Timeout used when the attribute is absent, malformed, or negative
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from [`parse_go_duration`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    #[error("time: invalid duration {0:?}")]
    Invalid(String),

    #[error("time: missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("time: unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },
}

fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(1_000_000_000),
        "m" => Some(60 * 1_000_000_000),
        "h" => Some(3_600 * 1_000_000_000),
        _ => None,
    }
}

fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

/// Parse a Go duration string into signed nanoseconds
///
/// Accepts an optional sign followed by one or more `<number><unit>` terms, where the
/// number may carry a fraction. A bare `0` is the only unitless value allowed.
pub fn parse_go_duration(input: &str) -> Result<i64, DurationError> {
    let invalid = || DurationError::Invalid(input.to_string());

    let mut s = input;
    let mut negative = false;
    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }

    if s == "0" {
        return Ok(0);
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    while !s.is_empty() {
        let int_len = leading_digits(s);
        let (int_digits, rest) = s.split_at(int_len);
        s = rest;

        let mut frac_digits = "";
        if let Some(rest) = s.strip_prefix('.') {
            let frac_len = leading_digits(rest);
            frac_digits = &rest[..frac_len];
            s = &rest[frac_len..];
            if int_digits.is_empty() && frac_digits.is_empty() {
                return Err(invalid());
            }
        } else if int_digits.is_empty() {
            return Err(invalid());
        }

        let unit_len = s
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(s.len());
        if unit_len == 0 {
            return Err(DurationError::MissingUnit(input.to_string()));
        }
        let (unit, rest) = s.split_at(unit_len);
        s = rest;

        let scale = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        let whole: u64 = if int_digits.is_empty() {
            0
        } else {
            int_digits.parse().map_err(|_| invalid())?
        };
        let mut term = whole.checked_mul(scale).ok_or_else(invalid)?;

        if !frac_digits.is_empty() {
            // Digits past nanosecond precision cannot change the result.
            let kept = &frac_digits[..frac_digits.len().min(18)];
            let numerator: u128 = kept.parse().map_err(|_| invalid())?;
            let denominator = 10u128.pow(kept.len() as u32);
            let fraction = (numerator * scale as u128) / denominator;
            term = term.checked_add(fraction as u64).ok_or_else(invalid)?;
        }

        total = total.checked_add(term).ok_or_else(invalid)?;
    }

    if negative {
        if total > i64::MAX as u64 + 1 {
            return Err(invalid());
        }
        Ok((-(total as i128)) as i64)
    } else {
        i64::try_from(total).map_err(|_| invalid())
    }
}

/// Resolve the `timeout` attribute into a duration
///
/// Absent values use [`DEFAULT_TIMEOUT`]. Malformed and negative values also fall back
/// to it, with a warning, instead of failing the request.
pub fn parse_timeout(input: Option<&str>, logger: &dyn Logger) -> Duration {
    let Some(raw) = input else {
        return DEFAULT_TIMEOUT;
    };

    match parse_go_duration(raw) {
        Ok(nanos) if nanos < 0 => {
            crate::log_warn!(logger,
                "Duration {:?} is negative. Defaulting to {:?}",
                raw, DEFAULT_TIMEOUT
            );
            DEFAULT_TIMEOUT
        }
        Ok(nanos) => Duration::from_nanos(nanos as u64),
        Err(err) => {
            crate::log_warn!(logger,
                "Error parsing duration {:?} into a duration. Defaulting to {:?}, error: {}",
                raw, DEFAULT_TIMEOUT, err
            );
            DEFAULT_TIMEOUT
        }
    }
}
