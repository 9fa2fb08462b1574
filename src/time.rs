// Time utility functions

use crate::error::{self, ProxyError};
use crate::Error;
use crate::Result;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::time::Duration;

enum Time {
    Second,
    Minute,
    Hour,
}

impl Time {
    fn to_seconds(&self) -> u64 {
        match self {
            Time::Second => 1,
            Time::Minute => 60,
            Time::Hour => 3600,
        }
    }
}

impl TryFrom<char> for Time {
    type Error = Error;

    fn try_from(time: char) -> std::result::Result<Self, Self::Error> {
        match time {
            's' => Ok(Time::Second),
            'm' => Ok(Time::Minute),
            'h' => Ok(Time::Hour),
            _ => Err(error::gen(format!(
                "Unknown char time format: {time} - valid types are s, m, h"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Seconds(u64);

impl Seconds {
    pub fn new(seconds: u64) -> Self {
        Seconds(seconds)
    }
}

impl Deref for Seconds {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for Seconds {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl From<Seconds> for Duration {
    fn from(seconds: Seconds) -> Self {
        Duration::from_secs(seconds.0)
    }
}

/// Convert a string with time format to seconds. Accepts `30`, `30s`,
/// `30 seconds`, `2m`, `1h`. A bare number is taken as seconds. Processing
/// stops at the first non-digit, non-whitespace character.
fn string_to_seconds(str_fmt: &str) -> Result<Seconds> {
    let mut seconds: u64 = 0;
    let mut digits = 0;
    for c in str_fmt.chars() {
        if let Some(digit) = c.to_digit(10) {
            seconds = seconds
                .checked_mul(10)
                .and_then(|seconds| seconds.checked_add(digit as u64))
                .ok_or_else(|| error::gen(format!("{str_fmt} is too large")))?;
            digits += 1;
        } else {
            if c.is_whitespace() {
                continue;
            }
            seconds = seconds
                .checked_mul(Time::try_from(c)?.to_seconds())
                .ok_or_else(|| error::gen(format!("{str_fmt} is too large")))?;
            break;
        }
    }
    if digits == 0 {
        return Err(error::gen(format!("No digits found in {str_fmt}")));
    }
    Ok(Seconds(seconds))
}

impl TryFrom<&str> for Seconds {
    type Error = ProxyError;

    fn try_from(str_fmt: &str) -> std::result::Result<Self, Self::Error> {
        string_to_seconds(str_fmt).map_err(|err| {
            ProxyError::TimeConversionError(format!(
                "Could not convert {str_fmt} to time format: {err}"
            ))
        })
    }
}
