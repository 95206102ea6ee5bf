//! Encoding errors with a breadcrumb path.
//!
//! An [`EncodeError`] is an [`ErrorKind`] plus the list of field and
//! operation names that were being encoded when it happened. The path is
//! built outside-in as the error propagates: the innermost encoder creates
//! the error with an empty path, and each enclosing object, operation or
//! transaction prepends its own segment via [`EncodeError::within`].
//!
//! Rendered, the result reads like `transfer: amount: value 1e20 out of range
//! for i64`, which is usually enough to find the offending value without a
//! debugger.

use std::fmt;

use thiserror::Error;

/// What went wrong, stripped of where.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// The value does not fit the schema: unknown operation, variant index
    /// out of range, a value routed through the void placeholder, a missing
    /// required field, or a JSON value of the wrong shape.
    #[error("{reason}")]
    Schema { reason: String },

    /// A fixed-length binary field received the wrong number of bytes.
    #[error("Unable to serialize binary. Expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A numeric value does not fit the target width.
    #[error("value {value} out of range for {target}")]
    Range { value: String, target: &'static str },

    /// A parser (key, hex, asset, date) rejected its input.
    #[error("invalid {what}: {reason}")]
    Decode { what: &'static str, reason: String },
}

impl ErrorKind {
    pub fn schema(reason: impl Into<String>) -> Self {
        Self::Schema {
            reason: reason.into(),
        }
    }

    pub fn range(value: impl fmt::Display, target: &'static str) -> Self {
        Self::Range {
            value: value.to_string(),
            target,
        }
    }

    pub fn decode(what: &'static str, reason: impl fmt::Display) -> Self {
        Self::Decode {
            what,
            reason: reason.to_string(),
        }
    }
}

/// An encoding failure and the path of names that led to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{}", render_path(.path), .kind)]
pub struct EncodeError {
    path: Vec<String>,
    kind: ErrorKind,
}

fn render_path(path: &[String]) -> String {
    path.iter().map(|segment| format!("{segment}: ")).collect()
}

impl EncodeError {
    /// Outermost segment first.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    /// Returns the same error one level further out: `segment` becomes the
    /// new outermost path entry.
    pub fn within(self, segment: impl Into<String>) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.push(segment.into());
        path.extend(self.path);
        Self {
            path,
            kind: self.kind,
        }
    }

    /// The dotted form of the path (`owner.weight_threshold`).
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }
}

impl From<ErrorKind> for EncodeError {
    fn from(kind: ErrorKind) -> Self {
        Self {
            path: Vec::new(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_error_has_no_prefix() {
        let err = EncodeError::from(ErrorKind::schema("Void can not be serialized"));
        assert_eq!(err.to_string(), "Void can not be serialized");
        assert!(err.path().is_empty());
    }

    #[test]
    fn within_prepends_outermost_segment() {
        let err = EncodeError::from(ErrorKind::range(70_000, "u16"))
            .within("weight_threshold")
            .within("owner")
            .within("account_create");

        assert_eq!(err.path(), ["account_create", "owner", "weight_threshold"]);
        assert_eq!(
            err.to_string(),
            "account_create: owner: weight_threshold: value 70000 out of range for u16"
        );
        assert_eq!(err.dotted_path(), "account_create.owner.weight_threshold");
    }

    #[test]
    fn size_mismatch_names_both_lengths() {
        let kind = ErrorKind::SizeMismatch {
            expected: 20,
            actual: 3,
        };
        assert_eq!(
            kind.to_string(),
            "Unable to serialize binary. Expected 20 bytes, got 3"
        );
    }

    #[test]
    fn within_leaves_kind_untouched() {
        let original = ErrorKind::decode("date", "premature end of input");
        let err = EncodeError::from(original.clone()).within("expiration");
        assert_eq!(err.kind(), &original);
        assert_eq!(err.into_kind(), original);
    }
}
