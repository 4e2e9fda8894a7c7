// RegMap - AXI4-Lite Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Bit layout of a register value.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitsError {
    #[error("register has no field named '{0}'")]
    NotFound(String),
}

/// One named slice of a register value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub field_name: String,
    pub num_bits: u32,
    pub default_value: u64,
    pub description: String,
}

/// The three accepted shapes of a register's `bits` entry.
///
/// Serializes back to the exact JSON shape it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BitsSpec {
    /// Plain width, default value zero.
    Width(u32),
    /// A single unnamed value with its own default.
    Single { num_bits: u32, default_value: u64 },
    /// Named fields, most significant first.
    Fields(Vec<FieldSpec>),
}

impl BitsSpec {
    /// Total number of bits the register occupies.
    pub fn count_bits(&self) -> u64 {
        match self {
            BitsSpec::Width(n) => u64::from(*n),
            BitsSpec::Single { num_bits, .. } => u64::from(*num_bits),
            BitsSpec::Fields(fields) => fields.iter().map(|f| u64::from(f.num_bits)).sum(),
        }
    }

    /// Offset of `field_name` counted from bit 0.
    ///
    /// The last declared field sits at the bottom, so the list is walked from the end and
    /// widths accumulate until the name matches. Unstructured registers report offset 0 for
    /// any name.
    pub fn get_offset(&self, field_name: &str) -> Result<u64, BitsError> {
        match self {
            BitsSpec::Width(_) | BitsSpec::Single { .. } => Ok(0),
            BitsSpec::Fields(fields) => {
                let mut offset = 0u64;
                for field in fields.iter().rev() {
                    if field.field_name == field_name {
                        return Ok(offset);
                    }
                    offset += u64::from(field.num_bits);
                }
                Err(BitsError::NotFound(field_name.to_string()))
            }
        }
    }

    /// Reset value as `count_bits()` binary digits, MSB first.
    pub fn default_bit_string(&self) -> String {
        match self {
            BitsSpec::Width(n) => "0".repeat(*n as usize),
            BitsSpec::Single {
                num_bits,
                default_value,
            } => format!("{:0width$b}", default_value, width = *num_bits as usize),
            BitsSpec::Fields(fields) => fields
                .iter()
                .map(|f| format!("{:0width$b}", f.default_value, width = f.num_bits as usize))
                .collect(),
        }
    }

    /// Named fields; empty for the unstructured shapes.
    pub fn fields(&self) -> &[FieldSpec] {
        match self {
            BitsSpec::Fields(fields) => fields,
            _ => &[],
        }
    }
}

/// Number of low address bits covered by one bus word: `ceil(log2(data_size / 8))`.
pub fn addr_bits_from_data(data_size_bits: u32) -> u32 {
    let bytes = (data_size_bits / 8).max(1);
    u32::BITS - (bytes - 1).leading_zeros()
}
