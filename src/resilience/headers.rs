//! Parsing of the `x-ratelimit-*` response headers.

use super::RateLimitable;

/// Requests allowed per window.
pub const RATE_LIMIT_LIMIT_HEADER: &str = "x-ratelimit-limit";
/// Requests left in the current window.
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";
/// Unix timestamp, in seconds, at which the window resets.
pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// A raw header value as presented by a response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeaderValue<'a> {
    /// Textual value, parsed leniently as an integer.
    Text(&'a str),
    /// Already numeric value.
    Number(i64),
}

impl HeaderValue<'_> {
    /// Interprets the value as an integer, `None` if it is not one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            HeaderValue::Text(s) => parse_leading_integer(s),
            HeaderValue::Number(n) => Some(*n),
        }
    }
}

/// Rate limit metadata extracted from a response.
///
/// Each field is parsed on its own; a malformed value leaves only that
/// field empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitHeaders {
    /// Value of `x-ratelimit-limit`.
    pub limit: Option<i64>,
    /// Value of `x-ratelimit-remaining`.
    pub remaining: Option<i64>,
    /// Value of `x-ratelimit-reset`, Unix seconds.
    pub reset: Option<i64>,
}

impl RateLimitHeaders {
    /// Extracts the rate limit headers from a response.
    pub fn from_response(response: &dyn RateLimitable) -> Self {
        let field = |name| response.header(name).and_then(|v| v.as_integer());

        Self {
            limit: field(RATE_LIMIT_LIMIT_HEADER),
            remaining: field(RATE_LIMIT_REMAINING_HEADER),
            reset: field(RATE_LIMIT_RESET_HEADER),
        }
    }

    /// True when the server reported no requests left in the window.
    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_some_and(|remaining| remaining < 1)
    }

    /// True if no header was present.
    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.remaining.is_none() && self.reset.is_none()
    }
}

/// Parses the integer prefix of `value`.
///
/// Leading whitespace and a sign are accepted and anything after the
/// digits is ignored, so `"42"`, `" 42"` and `"42.7"` all give 42.
fn parse_leading_integer(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let (negative, rest) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
