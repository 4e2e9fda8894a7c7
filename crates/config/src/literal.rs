// RegMap - AXI4-Lite Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Numeric literal normalization.
//!
//! Register maps allow numbers either as plain JSON integers or as strings with a
//! `0x` (hexadecimal) or `0b` (binary) prefix. Everything else is rejected.

use serde_json::Value;
use std::num::IntErrorKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("invalid numeric string '{0}': must start with 0x or 0b")]
    MissingPrefix(String),
    #[error("invalid digits in numeric string '{0}'")]
    InvalidDigits(String),
    #[error("numeric literal '{0}' does not fit in 64 bits")]
    Overflow(String),
    #[error("negative value {0} is not allowed")]
    Negative(i64),
    #[error("expected an integer or a 0x/0b string, found {0}")]
    WrongType(&'static str),
}

/// Converts an integer or prefixed string literal into its unsigned value.
pub fn parse_literal(value: &Value) -> Result<u64, LiteralError> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                Ok(v)
            } else if let Some(v) = n.as_i64() {
                Err(LiteralError::Negative(v))
            } else {
                Err(LiteralError::WrongType("float"))
            }
        }
        Value::String(s) => parse_prefixed(s),
        other => Err(LiteralError::WrongType(json_type_name(other))),
    }
}

/// Parses a `0x`/`0b` prefixed string.
pub fn parse_prefixed(s: &str) -> Result<u64, LiteralError> {
    let (digits, radix) = if let Some(hex) = s.strip_prefix("0x") {
        (hex, 16)
    } else if let Some(bin) = s.strip_prefix("0b") {
        (bin, 2)
    } else {
        return Err(LiteralError::MissingPrefix(s.to_string()));
    };

    u64::from_str_radix(digits, radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => LiteralError::Overflow(s.to_string()),
        _ => LiteralError::InvalidDigits(s.to_string()),
    })
}

/// Short human name of a JSON value's type, used in diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
