//! Coercion helpers from `serde_json::Value` into the typed fields of a
//! compartment set document.
//!
//! Integer fields are strict: a numeric value that is negative, non-finite,
//! out of range or has a fractional part is rejected, never rounded.

use serde_json::Value;

use crate::compartment_error::CompartmentError;
use crate::location::CompartmentLocation;

/// `2^64` as an `f64`; every integral value below it fits in a `u64`.
const U64_BOUND: f64 = 18_446_744_073_709_551_616.0;

/// Decode a JSON number into a `u64`.
///
/// # Errors
/// `Format` if `value` is not a number, is negative, has a fractional part or
/// does not fit in 64 bits.
pub fn as_u64_strict(value: &Value) -> Result<u64, CompartmentError> {
    let Value::Number(num) = value else {
        return Err(CompartmentError::format(format!(
            "expected unsigned integer, got {value}"
        )));
    };
    if let Some(v) = num.as_u64() {
        return Ok(v);
    }
    if let Some(v) = num.as_i64() {
        return Err(CompartmentError::format(format!(
            "expected unsigned integer, got negative value {v}"
        )));
    }
    let v = num.as_f64().ok_or_else(|| {
        CompartmentError::format(format!("expected unsigned integer, got {num}"))
    })?;
    if !v.is_finite() {
        return Err(CompartmentError::format(format!(
            "expected unsigned integer, got {v}"
        )));
    }
    if v < 0.0 {
        return Err(CompartmentError::format(format!(
            "expected unsigned integer, got negative value {v}"
        )));
    }
    if v.fract() != 0.0 {
        return Err(CompartmentError::format(format!(
            "expected unsigned integer, got float {v}"
        )));
    }
    if v >= U64_BOUND {
        return Err(CompartmentError::format(format!(
            "value {v} out of uint64 bounds"
        )));
    }
    Ok(v as u64)
}

/// Decode an offset: any JSON number within `[0, 1]`.
pub fn as_offset(value: &Value) -> Result<f64, CompartmentError> {
    let offset = value
        .as_f64()
        .ok_or_else(|| CompartmentError::format("Offset (third element) must be a number"))?;
    if !(0.0..=1.0).contains(&offset) {
        return Err(CompartmentError::format(format!(
            "Offset must be between 0 and 1 inclusive, got {offset}"
        )));
    }
    Ok(offset)
}

/// Decode one `[node_id, section_id, offset]` array.
pub fn parse_location(value: &Value) -> Result<CompartmentLocation, CompartmentError> {
    let items = match value.as_array() {
        Some(items) if items.len() == 3 => items,
        _ => {
            return Err(CompartmentError::format(
                "CompartmentLocation must be an array of exactly 3 elements: \
                 [node_id, section_index, offset]",
            ));
        }
    };
    let node_id = as_u64_strict(&items[0])?;
    let section_id = as_u64_strict(&items[1])?;
    let offset = as_offset(&items[2])?;
    Ok(CompartmentLocation::new(node_id, section_id, offset))
}
