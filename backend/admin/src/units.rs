//! Time and currency unit conversion for settings updates.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::utils::{format_units, parse_units, ParseUnits};
use alloy_primitives::U256;
use serde::{de, Deserialize, Deserializer, Serializer};
use serde_json::Value;

use crate::errors::{AdminError, Result};

/// Decimal places of the chain's native currency (wei per ether = 10^18).
pub const NATIVE_DECIMALS: u8 = 18;

/// Unit a delay value is entered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    pub fn seconds_per_unit(self) -> u64 {
        match self {
            Self::Seconds => 1,
            Self::Minutes => 60,
            Self::Hours => 60 * 60,
            Self::Days => 24 * 60 * 60,
        }
    }

    /// Canonical seconds for `value` of this unit. Overflow is an input error.
    pub fn to_seconds(self, value: u64) -> Result<u64> {
        value.checked_mul(self.seconds_per_unit()).ok_or_else(|| {
            AdminError::Input(format!("delay of {value} {self} does not fit in 64 bits"))
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Seconds => "Seconds",
            Self::Minutes => "Minutes",
            Self::Hours => "Hours",
            Self::Days => "Days",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = AdminError;

    /// Accepts the selector labels ("Minutes") in any letter case.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "seconds" => Ok(Self::Seconds),
            "minutes" => Ok(Self::Minutes),
            "hours" => Ok(Self::Hours),
            "days" => Ok(Self::Days),
            _ => Err(AdminError::Config(format!("unknown time unit '{s}'"))),
        }
    }
}

/// Convert a major-unit amount ("1.5") into wei, exactly.
///
/// More than 18 fractional digits cannot be represented in wei and is
/// refused instead of truncated.
pub fn parse_native(amount: &str) -> Result<U256> {
    let amount = amount.trim();
    if let Some((_, frac)) = amount.split_once('.') {
        if frac.len() > usize::from(NATIVE_DECIMALS) {
            return Err(AdminError::Input(format!(
                "amount '{amount}' has more than {NATIVE_DECIMALS} decimal places"
            )));
        }
    }
    match parse_units(amount, NATIVE_DECIMALS) {
        Ok(ParseUnits::U256(wei)) => Ok(wei),
        Ok(ParseUnits::I256(_)) => Err(AdminError::Input(format!(
            "amount '{amount}' must not be negative"
        ))),
        Err(e) => Err(AdminError::Input(format!("invalid amount '{amount}': {e}"))),
    }
}

/// Largest exponent accepted in a JSON number literal.
const MAX_EXPONENT: i64 = 96;

/// Rewrite a JSON number literal ("1.5e-7") as a plain decimal
/// ("0.00000015") without going through floating point.
fn expand_exponent(literal: &str) -> Result<String> {
    let Some((mantissa, exp)) = literal.split_once(['e', 'E']) else {
        return Ok(literal.to_string());
    };
    let exp: i64 = exp
        .parse()
        .ok()
        .filter(|e: &i64| e.abs() <= MAX_EXPONENT)
        .ok_or_else(|| AdminError::Input(format!("unsupported amount '{literal}'")))?;

    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let (whole, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{whole}{frac}");
    let point = whole.len() as i64 + exp;

    let plain = if point <= 0 {
        format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    } else if point as usize >= digits.len() {
        format!("{digits}{}", "0".repeat(point as usize - digits.len()))
    } else {
        let (head, tail) = digits.split_at(point as usize);
        format!("{head}.{tail}")
    };
    Ok(format!("{sign}{plain}"))
}

/// Accepts a non-negative integer as a JSON number or a numeric string.
/// Form inputs post their values as text.
pub fn deserialize_integer<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<u64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| de::Error::custom(format!("expected a non-negative integer, got {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("expected a non-negative integer, got '{s}'"))),
        other => Err(de::Error::custom(format!(
            "expected a non-negative integer, got {other}"
        ))),
    }
}

/// Render wei as a major-unit decimal string, trailing zeros trimmed.
pub fn format_native(wei: U256) -> Result<String> {
    let full = format_units(wei, NATIVE_DECIMALS)
        .map_err(|e| AdminError::Input(format!("cannot format {wei} wei: {e}")))?;
    Ok(match full.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                whole.to_string()
            } else {
                format!("{whole}.{frac}")
            }
        }
        None => full,
    })
}

/// Serialise a wei amount as a decimal string, the way the admin UI reads it.
pub fn serialize_decimal<S: Serializer>(
    value: &U256,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// An amount in major units, accepted either as a JSON string or number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeAmount(pub String);

impl NativeAmount {
    pub fn to_wei(&self) -> Result<U256> {
        parse_native(&self.0)
    }
}

impl<'de> Deserialize<'de> for NativeAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // Numbers keep their literal digits (serde_json `arbitrary_precision`).
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(NativeAmount(s)),
            Value::Number(n) => expand_exponent(&n.to_string())
                .map(NativeAmount)
                .map_err(de::Error::custom),
            other => Err(de::Error::custom(format!(
                "expected an amount as a string or number, got {other}"
            ))),
        }
    }
}

impl From<&str> for NativeAmount {
    fn from(s: &str) -> Self {
        NativeAmount(s.to_string())
    }
}
