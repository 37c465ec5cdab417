//! Built-in type domains and value checking.
//!
//! Each literal type code has a value domain; `convert_value` is the single
//! gate through which typed literals are constructed, whichever codec or
//! API produced the raw value.

use super::TypeError;
use crate::ari::{AriType, TimeVal, Value};

/// Integer domain of a built-in integer type.
const fn int_domain(type_id: AriType) -> Option<(i128, i128)> {
    match type_id {
        AriType::Byte => Some((0, u8::MAX as i128)),
        AriType::Int => Some((i32::MIN as i128, i32::MAX as i128)),
        AriType::Uint => Some((0, u32::MAX as i128)),
        AriType::Vast => Some((i64::MIN as i128, i64::MAX as i128)),
        AriType::Uvast => Some((0, u64::MAX as i128)),
        _ => None,
    }
}

/// Check and coerce a raw value into the domain of a declared type.
///
/// Follows the convert rules: integers widen within range, integers (and
/// numeric seconds) promote to reals and time values, but reals never
/// become integers and nothing is truncated.
///
/// # Errors
///
/// [`TypeError`] when the value cannot represent the declared type.
pub fn convert_value(type_id: AriType, value: Value) -> Result<Value, TypeError> {
    if type_id.is_object() {
        return Err(TypeError::NotLiteralType(type_id));
    }
    if matches!(value, Value::Undefined) {
        return Err(TypeError::UndefinedTyped);
    }

    if let Some((min, max)) = int_domain(type_id) {
        return match value {
            Value::Int(n) if n >= min && n <= max => Ok(Value::Int(n)),
            Value::Int(_) => Err(TypeError::OutOfRange { type_id }),
            _ => Err(TypeError::Mismatch { type_id }),
        };
    }

    match type_id {
        AriType::Null => match value {
            Value::Null => Ok(Value::Null),
            _ => Err(TypeError::Mismatch { type_id }),
        },
        AriType::Bool => match value {
            Value::Bool(b) => Ok(Value::Bool(b)),
            _ => Err(TypeError::Mismatch { type_id }),
        },
        AriType::Real32 => {
            let v = as_real(value).ok_or(TypeError::Mismatch { type_id })?;
            if v.is_finite() && v.abs() > f64::from(f32::MAX) {
                return Err(TypeError::OutOfRange { type_id });
            }
            Ok(Value::Real(v))
        }
        AriType::Real64 => {
            let v = as_real(value).ok_or(TypeError::Mismatch { type_id })?;
            Ok(Value::Real(v))
        }
        AriType::Textstr => match value {
            Value::Text(s) => Ok(Value::Text(s)),
            _ => Err(TypeError::Mismatch { type_id }),
        },
        AriType::Bytestr | AriType::Cbor => match value {
            Value::Bytes(b) => Ok(Value::Bytes(b)),
            _ => Err(TypeError::Mismatch { type_id }),
        },
        AriType::Label => match value {
            Value::Text(s) => Ok(Value::Text(s)),
            Value::Int(n) => Ok(Value::Int(n)),
            _ => Err(TypeError::Mismatch { type_id }),
        },
        AriType::Aritype => match value {
            Value::TypeRef(t) => Ok(Value::TypeRef(t)),
            Value::Int(n) => i64::try_from(n)
                .ok()
                .and_then(AriType::from_code)
                .map(Value::TypeRef)
                .ok_or(TypeError::OutOfRange { type_id }),
            Value::Text(s) => AriType::from_name(&s)
                .map(Value::TypeRef)
                .ok_or(TypeError::Mismatch { type_id }),
            _ => Err(TypeError::Mismatch { type_id }),
        },
        AriType::Tp => as_timeval(value, type_id).map(Value::Tp),
        AriType::Td => as_timeval(value, type_id).map(Value::Td),
        AriType::Ac => match value {
            Value::List(items) => Ok(Value::List(items)),
            _ => Err(TypeError::Mismatch { type_id }),
        },
        AriType::Am => match value {
            Value::Map(map) => Ok(Value::Map(map)),
            _ => Err(TypeError::Mismatch { type_id }),
        },
        AriType::Tbl => match value {
            Value::Table(table) => Ok(Value::Table(table)),
            _ => Err(TypeError::Mismatch { type_id }),
        },
        AriType::Execset => match value {
            Value::ExecSet(es) => Ok(Value::ExecSet(es)),
            _ => Err(TypeError::Mismatch { type_id }),
        },
        AriType::Rptset => match value {
            Value::RptSet(rs) => Ok(Value::RptSet(rs)),
            _ => Err(TypeError::Mismatch { type_id }),
        },
        // integer domains handled above; object kinds rejected above
        _ => Err(TypeError::Mismatch { type_id }),
    }
}

/// Non-coercing check that a value already inhabits a type's domain.
#[must_use]
pub fn check_value(type_id: AriType, value: &Value) -> bool {
    match (type_id, value) {
        (AriType::Tp, Value::Tp(_)) | (AriType::Td, Value::Td(_)) => true,
        (AriType::Tp | AriType::Td, _) => false,
        (AriType::Real32 | AriType::Real64, Value::Real(_)) => {
            convert_value(type_id, value.clone()).is_ok()
        }
        (AriType::Real32 | AriType::Real64, _) => false,
        _ => convert_value(type_id, value.clone()).is_ok(),
    }
}

/// Numeric widening to a real value.
fn as_real(value: Value) -> Option<f64> {
    match value {
        Value::Real(v) => Some(v),
        #[allow(clippy::cast_precision_loss)]
        Value::Int(n) => Some(n as f64),
        _ => None,
    }
}

/// Coerce numeric seconds (or a prepared time value) into a time scalar.
fn as_timeval(value: Value, type_id: AriType) -> Result<TimeVal, TypeError> {
    match value {
        Value::Tp(tv) | Value::Td(tv) => Ok(tv),
        Value::Int(n) => i64::try_from(n)
            .ok()
            .and_then(TimeVal::from_secs)
            .ok_or(TypeError::OutOfRange { type_id }),
        Value::Real(v) => TimeVal::from_secs_f64(v).ok_or(TypeError::OutOfRange { type_id }),
        _ => Err(TypeError::Mismatch { type_id }),
    }
}
