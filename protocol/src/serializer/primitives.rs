//! Primitive value extraction and encoding.
//!
//! Integers arrive either as JSON numbers or as decimal strings (64-bit
//! values travel as strings in the chain's JSON API because JavaScript
//! clients can't hold them in a double). Both forms are accepted; either way
//! the value must fit the target width or the encode fails with
//! [`ErrorKind::Range`]. No silent wraparound.

use serde_json::Value;

use super::error::ErrorKind;
use super::sink::ByteSink;

/// Fixed-width integer targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntWidth {
    pub fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
        }
    }

    /// Encoded size in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 => 4,
            Self::I64 | Self::U64 => 8,
        }
    }

    fn bounds(self) -> (i128, i128) {
        match self {
            Self::I8 => (i8::MIN.into(), i8::MAX.into()),
            Self::I16 => (i16::MIN.into(), i16::MAX.into()),
            Self::I32 => (i32::MIN.into(), i32::MAX.into()),
            Self::I64 => (i64::MIN.into(), i64::MAX.into()),
            Self::U8 => (0, u8::MAX.into()),
            Self::U16 => (0, u16::MAX.into()),
            Self::U32 => (0, u32::MAX.into()),
            Self::U64 => (0, u64::MAX.into()),
        }
    }

    /// Range-checks `value` and appends it, little-endian.
    pub fn write(self, sink: &mut ByteSink, value: i128) -> Result<(), ErrorKind> {
        let (min, max) = self.bounds();
        if value < min || value > max {
            return Err(ErrorKind::range(value, self.name()));
        }
        // The bounds check above makes every cast below lossless.
        match self {
            Self::I8 => sink.write_i8(value as i8),
            Self::I16 => sink.write_i16(value as i16),
            Self::I32 => sink.write_i32(value as i32),
            Self::I64 => sink.write_i64(value as i64),
            Self::U8 => sink.write_u8(value as u8),
            Self::U16 => sink.write_u16(value as u16),
            Self::U32 => sink.write_u32(value as u32),
            Self::U64 => sink.write_u64(value as u64),
        }
        Ok(())
    }
}

/// Short description of a JSON value's shape, for error messages.
pub fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn mismatch(expected: &str, found: &Value) -> ErrorKind {
    ErrorKind::schema(format!("expected {expected}, found {}", describe(found)))
}

/// 2^53. Above this a JSON float may already have been rounded by the parser.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Reads an integer from a JSON number or a decimal string.
pub fn integer(value: &Value) -> Result<i128, ErrorKind> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i.into())
            } else if let Some(u) = n.as_u64() {
                Ok(u.into())
            } else {
                // Floats: accept only whole numbers below 2^53, where every
                // integer is exactly representable.
                let f = n.as_f64().unwrap_or(f64::NAN);
                if f.is_finite() && f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT {
                    Ok(f as i128)
                } else {
                    Err(ErrorKind::range(n, "integer"))
                }
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i128>()
            .map_err(|e| ErrorKind::decode("integer", format!("{s:?}: {e}"))),
        other => Err(mismatch("integer", other)),
    }
}

pub fn write_int(sink: &mut ByteSink, width: IntWidth, value: &Value) -> Result<(), ErrorKind> {
    width.write(sink, integer(value)?)
}

pub fn write_bool(sink: &mut ByteSink, value: &Value) -> Result<(), ErrorKind> {
    match value {
        Value::Bool(b) => {
            sink.write_bool(*b);
            Ok(())
        }
        other => Err(mismatch("boolean", other)),
    }
}

pub fn write_string(sink: &mut ByteSink, value: &Value) -> Result<(), ErrorKind> {
    match value {
        Value::String(s) => write_str(sink, s),
        other => Err(mismatch("string", other)),
    }
}

pub fn write_str(sink: &mut ByteSink, s: &str) -> Result<(), ErrorKind> {
    length_prefix(sink, s.len())?;
    sink.append(s.as_bytes());
    Ok(())
}

/// Writes a collection length as a varint32, rejecting anything that does
/// not fit.
pub fn length_prefix(sink: &mut ByteSink, len: usize) -> Result<(), ErrorKind> {
    let len = u32::try_from(len).map_err(|_| ErrorKind::range(len, "varint32"))?;
    sink.write_varint32(len);
    Ok(())
}

/// Reads a varint32 from JSON (a tag or id) and writes it.
pub fn write_varint(sink: &mut ByteSink, value: &Value) -> Result<(), ErrorKind> {
    let raw = integer(value)?;
    let v = u32::try_from(raw).map_err(|_| ErrorKind::range(raw, "varint32"))?;
    sink.write_varint32(v);
    Ok(())
}
