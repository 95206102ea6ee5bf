//! Core value types for Blurt transactions.
//!
//! [`Asset`] is the monetary amount the wire format knows about: an integer
//! count of the smallest unit, a precision, and a short symbol. There is no
//! floating point anywhere on the path from text to bytes. `"1.000 BLURT"`
//! becomes 1000 units at precision 3 by digit manipulation, not by
//! multiplying a double by a power of ten.
//!
//! [`Operation`] is the `[name, payload]` pair operations travel as.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::config::{ASSET_SYMBOL_WIDTH, MAX_ASSET_PRECISION, NATIVE_ASSETS};
use crate::serializer::ErrorKind;

/// Most significant digits accepted in an amount. Keeps the mantissa and
/// any rescaling comfortably inside `i128`.
const MAX_AMOUNT_DIGITS: usize = 36;

// ---------------------------------------------------------------------------
// AssetError
// ---------------------------------------------------------------------------

/// Errors from parsing or constructing an [`Asset`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("expected \"<amount> <SYMBOL>\", got {0:?}")]
    InvalidFormat(String),

    #[error("amount {0:?} is not a decimal number")]
    InvalidAmount(String),

    #[error("symbol {0:?} must be 1 to 7 ASCII characters without whitespace")]
    InvalidSymbol(String),

    #[error("precision {0} exceeds the maximum of 18")]
    PrecisionTooLarge(u64),

    #[error("{symbol} amounts carry precision {expected}, got {found}")]
    PrecisionMismatch {
        symbol: String,
        expected: u8,
        found: u8,
    },

    #[error("amount {0} does not fit in a signed 64-bit integer")]
    Overflow(String),
}

impl From<AssetError> for ErrorKind {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::Overflow(value) => ErrorKind::Range {
                value,
                target: "i64 asset amount",
            },
            other => ErrorKind::decode("asset", other),
        }
    }
}

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// A monetary amount: `units / 10^precision` of `symbol`.
///
/// # Examples
///
/// ```
/// use blurt_protocol::transaction::types::Asset;
///
/// let fee: Asset = "0.100 BLURT".parse().unwrap();
/// assert_eq!(fee.units(), 100);
/// assert_eq!(fee.precision(), 3);
/// assert_eq!(fee.to_string(), "0.100 BLURT");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Asset {
    units: i64,
    precision: u8,
    symbol: String,
}

impl Asset {
    /// Builds an asset from an already-scaled unit count.
    pub fn new(units: i64, precision: u8, symbol: impl Into<String>) -> Result<Self, AssetError> {
        if precision > MAX_ASSET_PRECISION {
            return Err(AssetError::PrecisionTooLarge(precision.into()));
        }
        let symbol = symbol.into();
        validate_symbol(&symbol)?;
        if let Some(&(_, expected)) = NATIVE_ASSETS.iter().find(|(s, _)| *s == symbol) {
            if precision != expected {
                return Err(AssetError::PrecisionMismatch {
                    symbol,
                    expected,
                    found: precision,
                });
            }
        }
        Ok(Self {
            units,
            precision,
            symbol,
        })
    }

    /// Amount in the smallest unit. This is what goes on the wire.
    pub fn units(&self) -> i64 {
        self.units
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Parses either the text form (`"1.000 BLURT"`) or the object form
    /// (`{"amount": "1.5", "precision": 3, "symbol": "BLURT"}`).
    ///
    /// In the object form the amount is rescaled to the stated precision.
    /// Extra fractional digits are rounded half away from zero.
    pub fn from_value(value: &Value) -> Result<Self, AssetError> {
        match value {
            Value::String(s) => s.parse(),
            Value::Object(map) => {
                let amount = match map.get("amount") {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    _ => return Err(AssetError::InvalidFormat(value.to_string())),
                };
                let precision = map
                    .get("precision")
                    .and_then(Value::as_u64)
                    .ok_or_else(|| AssetError::InvalidFormat(value.to_string()))?;
                if precision > u64::from(MAX_ASSET_PRECISION) {
                    return Err(AssetError::PrecisionTooLarge(precision));
                }
                let symbol = map
                    .get("symbol")
                    .and_then(Value::as_str)
                    .ok_or_else(|| AssetError::InvalidFormat(value.to_string()))?;

                let (mantissa, scale) = parse_decimal(&amount, true)?;
                let units = rescale(mantissa, scale, precision as u32, &amount)?;
                Self::new(units, precision as u8, symbol)
            }
            other => Err(AssetError::InvalidFormat(other.to_string())),
        }
    }
}

fn validate_symbol(symbol: &str) -> Result<(), AssetError> {
    let ok = !symbol.is_empty()
        && symbol.len() <= ASSET_SYMBOL_WIDTH
        && symbol.bytes().all(|b| b.is_ascii_graphic());
    if ok {
        Ok(())
    } else {
        Err(AssetError::InvalidSymbol(symbol.to_string()))
    }
}

/// Splits a decimal string into an integer mantissa and the number of
/// fractional digits it carries: `"-12.50"` → `(-1250, 2)`. Exponents
/// (`1e-3`) are only accepted when `allow_exponent` is set, for amounts that
/// came from JSON numbers.
fn parse_decimal(text: &str, allow_exponent: bool) -> Result<(i128, u32), AssetError> {
    let invalid = || AssetError::InvalidAmount(text.to_string());
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (number, exponent) = match unsigned.find(['e', 'E']) {
        Some(i) if allow_exponent => {
            let exp: i32 = unsigned[i + 1..].parse().map_err(|_| invalid())?;
            (&unsigned[..i], exp)
        }
        Some(_) => return Err(invalid()),
        None => (unsigned, 0),
    };

    let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
    let digits_ok = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !digits_ok(int_part) || !digits_ok(frac_part)
    {
        return Err(invalid());
    }
    if int_part.len() + frac_part.len() > MAX_AMOUNT_DIGITS {
        return Err(AssetError::Overflow(text.to_string()));
    }

    let mut mantissa: i128 = 0;
    for b in int_part.bytes().chain(frac_part.bytes()) {
        mantissa = mantissa * 10 + i128::from(b - b'0');
    }
    if negative {
        mantissa = -mantissa;
    }

    let mut scale = frac_part.len() as i64 - i64::from(exponent);
    if mantissa == 0 {
        scale = scale.max(0);
    }
    while scale < 0 {
        mantissa = mantissa
            .checked_mul(10)
            .ok_or_else(|| AssetError::Overflow(text.to_string()))?;
        scale += 1;
    }
    let scale = u32::try_from(scale).map_err(|_| invalid())?;
    Ok((mantissa, scale))
}

/// Converts `mantissa / 10^scale` into units at `precision`.
fn rescale(mantissa: i128, scale: u32, precision: u32, text: &str) -> Result<i64, AssetError> {
    let overflow = || AssetError::Overflow(text.to_string());
    let units = if scale <= precision {
        10i128
            .checked_pow(precision - scale)
            .and_then(|factor| mantissa.checked_mul(factor))
            .ok_or_else(overflow)?
    } else {
        let divisor = match 10i128.checked_pow(scale - precision) {
            Some(d) => d,
            // Dividing by more than 10^38 leaves nothing.
            None => return Ok(0),
        };
        let quotient = mantissa / divisor;
        let remainder = (mantissa % divisor).abs();
        if remainder * 2 >= divisor {
            quotient + mantissa.signum()
        } else {
            quotient
        }
    };
    i64::try_from(units).map_err(|_| overflow())
}

impl FromStr for Asset {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (amount, symbol) = match (parts.next(), parts.next(), parts.next()) {
            (Some(amount), Some(symbol), None) => (amount, symbol),
            _ => return Err(AssetError::InvalidFormat(s.to_string())),
        };

        let (mantissa, precision) = parse_decimal(amount, false)?;
        if precision > u32::from(MAX_ASSET_PRECISION) {
            return Err(AssetError::PrecisionTooLarge(precision.into()));
        }
        let units = i64::try_from(mantissa).map_err(|_| AssetError::Overflow(amount.to_string()))?;
        Self::new(units, precision as u8, symbol)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = i128::from(self.units);
        let sign = if units < 0 { "-" } else { "" };
        let magnitude = units.unsigned_abs();
        if self.precision == 0 {
            return write!(f, "{sign}{magnitude} {}", self.symbol);
        }
        let divisor = 10u128.pow(u32::from(self.precision));
        write!(
            f,
            "{sign}{}.{:0width$} {}",
            magnitude / divisor,
            magnitude % divisor,
            self.symbol,
            width = usize::from(self.precision)
        )
    }
}

impl Serialize for Asset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Asset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// An operation as it travels in JSON: `["transfer", {...}]`.
///
/// The payload stays an untyped value tree. Its layout is dictated by the
/// registry entry for `name`, and checked only when the operation is encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation(pub String, pub Value);

impl Operation {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self(name.into(), payload)
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn payload(&self) -> &Value {
        &self.1
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
