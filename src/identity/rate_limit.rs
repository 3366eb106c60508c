//! Throttling decisions derived from login-attempt counters.

use serde::{Deserialize, Serialize};
use std::fmt;

const BLOCKED_ATTEMPTS: u32 = 100;
const CAPTCHA_ATTEMPTS: u32 = 50;
const WARNING_ATTEMPTS: u32 = 10;

/// Throttling decision, ordered by severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitDecision {
    Ok,
    Warning,
    CaptchaRequired,
    Blocked,
}

impl RateLimitDecision {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::CaptchaRequired => "captcha_required",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for RateLimitDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map an attempt counter to a throttling decision.
///
/// Pure and total. Boundaries are strict: a counter sitting exactly on a
/// threshold falls into the lower tier.
#[must_use]
pub fn decide(login_attempts: u32) -> RateLimitDecision {
    if login_attempts > BLOCKED_ATTEMPTS {
        RateLimitDecision::Blocked
    } else if login_attempts > CAPTCHA_ATTEMPTS {
        RateLimitDecision::CaptchaRequired
    } else if login_attempts > WARNING_ATTEMPTS {
        RateLimitDecision::Warning
    } else {
        RateLimitDecision::Ok
    }
}
