//! Value segment interpreters.
//!
//! A decoded value segment is matched against a sequence of shapes; the
//! first matching shape parses it. The untyped order is fixed so that, for
//! example, `10` is an integer and `1.0` a real, while anything
//! identifier-shaped falls through to bare text.

use super::escape::{self, EscapeError};
use crate::ari::{AriType, IdSegment, TimeBase, TimeVal, Value};
use chrono::{TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;

fn float_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:[+-]?(?:(?:\d+|\d*\.\d*)[eE][+-]?\d+|\d*\.\d+|\d+\.\d*|Infinity)|NaN)$")
            .expect("float pattern")
    })
}

fn int_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?(?:0[bB][01]+|0[xX][0-9a-fA-F]+|\d+)$").expect("int pattern"))
}

fn hexfloat_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([+-])?0fx((?:[0-9a-fA-F]{4}){1,4})$").expect("hexfloat pattern")
    })
}

fn identity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_.\-]*$").expect("identity pattern"))
}

fn timepoint_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^(\d{4})-?(\d{2})-?(\d{2})T(\d{2}):?(\d{2}):?(\d{2})(?:\.(\d{1,6}))?Z$",
        )
        .expect("timepoint pattern")
    })
}

fn timeperiod_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^([+-])?P(?:(\d+)D)?T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(?:\.(\d{1,6}))?S)?$")
            .expect("timeperiod pattern")
    })
}

/// Check whether text matches the bare identifier shape.
#[must_use]
pub fn is_identity(text: &str) -> bool {
    identity_re().is_match(text)
}

/// Parse an integer segment (decimal, `0x`, or `0b`, signed).
///
/// The accepted domain is the union of the 64-bit signed and unsigned
/// ranges.
#[must_use]
pub fn parse_int(seg: &str) -> Option<i128> {
    if !int_re().is_match(seg) {
        return None;
    }
    let (neg, rest) = match seg.as_bytes()[0] {
        b'+' => (false, &seg[1..]),
        b'-' => (true, &seg[1..]),
        _ => (false, seg),
    };
    let mag = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        i128::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = rest.strip_prefix("0b").or_else(|| rest.strip_prefix("0B")) {
        i128::from_str_radix(bin, 2).ok()?
    } else {
        rest.parse::<i128>().ok()?
    };
    let value = if neg { -mag } else { mag };
    if (i128::from(i64::MIN)..=i128::from(u64::MAX)).contains(&value) {
        Some(value)
    } else {
        None
    }
}

/// Parse a real segment: decimal or exponent notation, `Infinity`, `NaN`,
/// or the raw-hex form `0fx…`.
#[must_use]
pub fn parse_float(seg: &str) -> Option<f64> {
    if let Some(caps) = hexfloat_re().captures(seg) {
        let payload = escape::decode_hex(&caps[2]).ok()?;
        let value = match payload.len() {
            2 => f64::from(crate::cbor::f16_to_f32(u16::from_be_bytes([payload[0], payload[1]]))),
            4 => f64::from(f32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]])),
            8 => f64::from_be_bytes(payload.try_into().ok()?),
            _ => return None,
        };
        let neg = caps.get(1).is_some_and(|m| m.as_str() == "-");
        return Some(if neg { -value } else { value });
    }
    if !float_re().is_match(seg) {
        return None;
    }
    match seg.trim_start_matches(['+', '-']) {
        "Infinity" => {
            let pos = !seg.starts_with('-');
            Some(if pos { f64::INFINITY } else { f64::NEG_INFINITY })
        }
        "NaN" => Some(f64::NAN),
        _ => seg.parse::<f64>().ok(),
    }
}

/// Parse a quoted text string segment.
#[must_use]
pub fn parse_tstr(seg: &str) -> Option<Result<String, EscapeError>> {
    let body = seg.strip_prefix('"')?.strip_suffix('"')?;
    Some(escape::unescape(body))
}

/// Parse a byte string segment: `'raw'`, `h'hex'`, `b32'…'`, or `b64'…'`.
#[must_use]
pub fn parse_bstr(seg: &str) -> Option<Result<Vec<u8>, EscapeError>> {
    let (enc, rest) = if let Some(rest) = seg.strip_prefix("h'") {
        ("h", rest)
    } else if let Some(rest) = seg.strip_prefix("b32'") {
        ("b32", rest)
    } else if let Some(rest) = seg.strip_prefix("h32'") {
        ("h32", rest)
    } else if let Some(rest) = seg.strip_prefix("b64'") {
        ("b64", rest)
    } else if let Some(rest) = seg.strip_prefix('\'') {
        ("", rest)
    } else {
        return None;
    };
    let body = rest.strip_suffix('\'')?;
    let decoded = match enc {
        "h" => escape::decode_hex(body),
        "b32" => escape::decode_base32(body),
        "b64" => escape::decode_base64(body),
        "h32" => Err(EscapeError::BadByteString),
        _ => escape::unescape(body).map(String::into_bytes),
    };
    Some(decoded)
}

/// Parse a timepoint segment against the epoch.
#[must_use]
pub fn parse_timepoint(seg: &str, base: &TimeBase) -> Option<TimeVal> {
    let caps = timepoint_re().captures(seg)?;
    let num = |ix: usize| caps.get(ix).and_then(|m| m.as_str().parse::<u32>().ok());
    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let at = Utc
        .with_ymd_and_hms(year, num(2)?, num(3)?, num(4)?, num(5)?, num(6)?)
        .single()?;
    let usec = caps.get(7).map_or(0, |m| subsec_usec(m.as_str()));
    let mut tv = base.timeval(at);
    tv = TimeVal::from_usec(tv.usec().checked_add(i64::from(usec))?);
    Some(tv)
}

/// Parse a timeperiod segment (ISO-8601 duration subset).
#[must_use]
pub fn parse_timeperiod(seg: &str) -> Option<TimeVal> {
    let caps = timeperiod_re().captures(seg)?;
    // bare sign or "P" alone never reach here; "PT" yields zero
    let num = |ix: usize| -> Option<i64> {
        match caps.get(ix) {
            Some(m) => m.as_str().parse::<i64>().ok(),
            None => Some(0),
        }
    };
    let days = num(2)?;
    let hours = num(3)?;
    let minutes = num(4)?;
    let seconds = num(5)?;
    let usec = caps.get(6).map_or(0, |m| i64::from(subsec_usec(m.as_str())));
    let total_secs = days
        .checked_mul(86_400)?
        .checked_add(hours.checked_mul(3_600)?)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)?;
    let mut total = total_secs.checked_mul(1_000_000)?.checked_add(usec)?;
    if caps.get(1).is_some_and(|m| m.as_str() == "-") {
        total = -total;
    }
    Some(TimeVal::from_usec(total))
}

/// Scale a fractional-second digit run to microseconds.
fn subsec_usec(digits: &str) -> u32 {
    let val: u32 = digits.parse().unwrap_or(0);
    let scale = 10u32.pow(6 - digits.len() as u32);
    val * scale
}

/// Parse an identifier segment: numeric enum or (optionally `!`-prefixed)
/// symbolic name. A `!` followed by digits forces the numeric reading.
#[must_use]
pub fn parse_idsegment(seg: &str) -> Option<IdSegment> {
    if let Some(num) = parse_int(seg) {
        return i64::try_from(num).ok().map(IdSegment::Num);
    }
    if let Some(rest) = seg.strip_prefix('!') {
        if let Some(num) = parse_int(rest) {
            return i64::try_from(num).ok().map(IdSegment::Num);
        }
        return is_identity(rest).then(|| IdSegment::Name(seg.to_string()));
    }
    is_identity(seg).then(|| IdSegment::Name(seg.to_string()))
}

/// Parse a type segment: a type name or integer code.
#[must_use]
pub fn parse_type(seg: &str) -> Option<AriType> {
    if let Some(num) = parse_int(seg) {
        return i64::try_from(num).ok().and_then(AriType::from_code);
    }
    AriType::from_name(seg)
}

/// Parse an untyped primitive segment.
///
/// Match order: `undefined`, `null`, booleans, real, integer, quoted text,
/// byte string, bare identifier text.
#[must_use]
pub fn parse_primitive(seg: &str) -> Option<Result<Value, EscapeError>> {
    match seg {
        "undefined" => return Some(Ok(Value::Undefined)),
        "null" => return Some(Ok(Value::Null)),
        "true" => return Some(Ok(Value::Bool(true))),
        "false" => return Some(Ok(Value::Bool(false))),
        _ => {}
    }
    if let Some(v) = parse_float(seg) {
        return Some(Ok(Value::Real(v)));
    }
    if let Some(n) = parse_int(seg) {
        return Some(Ok(Value::Int(n)));
    }
    if let Some(res) = parse_tstr(seg) {
        return Some(res.map(Value::Text));
    }
    if let Some(res) = parse_bstr(seg) {
        return Some(res.map(Value::Bytes));
    }
    if is_identity(seg) {
        return Some(Ok(Value::Text(seg.to_string())));
    }
    None
}

/// Check whether text would re-parse as something other than bare text.
///
/// Used by the formatter: only text that is identifier-shaped and not
/// claimed by an earlier primitive shape may be emitted unquoted.
#[must_use]
pub fn is_plain_text(text: &str) -> bool {
    if !is_identity(text) {
        return false;
    }
    matches!(parse_primitive(text), Some(Ok(Value::Text(_))))
}

/// Parse a typed literal value segment for a scalar type.
///
/// Container types never reach here; their bodies are token-structured.
#[must_use]
pub fn parse_typed_value(type_id: AriType, seg: &str, base: &TimeBase) -> Option<Value> {
    match type_id {
        AriType::Null => (seg == "null").then_some(Value::Null),
        AriType::Bool => match seg {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        AriType::Byte | AriType::Int | AriType::Uint | AriType::Vast | AriType::Uvast => {
            parse_int(seg).map(Value::Int)
        }
        AriType::Real32 | AriType::Real64 => parse_float(seg).map(Value::Real),
        AriType::Textstr => {
            if let Some(res) = parse_tstr(seg) {
                return res.ok().map(Value::Text);
            }
            is_identity(seg).then(|| Value::Text(seg.to_string()))
        }
        AriType::Bytestr | AriType::Cbor => parse_bstr(seg).and_then(Result::ok).map(Value::Bytes),
        AriType::Label => {
            if let Some(num) = parse_int(seg) {
                return Some(Value::Int(num));
            }
            is_identity(seg).then(|| Value::Text(seg.to_string()))
        }
        AriType::Aritype => {
            if let Some(typ) = parse_type(seg) {
                return Some(Value::TypeRef(typ));
            }
            None
        }
        AriType::Tp => parse_timepoint(seg, base)
            .map(Value::Tp)
            .or_else(|| parse_numeric_time(seg).map(Value::Tp)),
        AriType::Td => parse_timeperiod(seg)
            .map(Value::Td)
            .or_else(|| parse_numeric_time(seg).map(Value::Td)),
        _ => None,
    }
}

/// Numeric seconds fallback for time segments.
fn parse_numeric_time(seg: &str) -> Option<TimeVal> {
    if let Some(n) = parse_int(seg) {
        return i64::try_from(n).ok().and_then(TimeVal::from_secs);
    }
    if float_re().is_match(seg) {
        return seg.parse::<f64>().ok().and_then(TimeVal::from_secs_f64);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_radixes() {
        assert_eq!(parse_int("10"), Some(10));
        assert_eq!(parse_int("-100"), Some(-100));
        assert_eq!(parse_int("0x10"), Some(16));
        assert_eq!(parse_int("-0xa"), Some(-10));
        assert_eq!(parse_int("0b100"), Some(4));
        assert_eq!(parse_int("18446744073709551615"), Some(u64::MAX as i128));
        assert_eq!(parse_int("18446744073709551616"), None);
        assert_eq!(parse_int("1.5"), None);
    }

    #[test]
    fn test_float_shapes() {
        assert_eq!(parse_float("0.0"), Some(0.0));
        assert_eq!(parse_float("1e3"), Some(1000.0));
        assert_eq!(parse_float("1.25e2"), Some(125.0));
        assert_eq!(parse_float("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_float("-Infinity"), Some(f64::NEG_INFINITY));
        assert!(parse_float("NaN").unwrap().is_nan());
        assert_eq!(parse_float("10"), None);
    }

    #[test]
    fn test_hexfloat() {
        assert_eq!(parse_float("0fx63d0"), Some(1000.0));
        assert_eq!(parse_float("+0fx63d0"), Some(1000.0));
        assert_eq!(parse_float("-0fx63d0"), Some(-1000.0));
        assert_eq!(parse_float("0fx447a0000"), Some(1000.0));
        assert_eq!(parse_float("0fx408f400000000000"), Some(1000.0));
    }

    #[test]
    fn test_primitive_order() {
        assert_eq!(parse_primitive("true"), Some(Ok(Value::Bool(true))));
        assert_eq!(parse_primitive("10"), Some(Ok(Value::Int(10))));
        assert_eq!(parse_primitive("1e3"), Some(Ok(Value::Real(1000.0))));
        assert_eq!(parse_primitive("hi"), Some(Ok(Value::Text("hi".into()))));
        assert_eq!(parse_primitive("\"hi there\""), Some(Ok(Value::Text("hi there".into()))));
        assert_eq!(parse_primitive("'hi'"), Some(Ok(Value::Bytes(b"hi".to_vec()))));
        assert_eq!(parse_primitive("@nope"), None);
    }

    #[test]
    fn test_plain_text_excludes_singletons() {
        assert!(is_plain_text("hi"));
        assert!(!is_plain_text("null"));
        assert!(!is_plain_text("true"));
        assert!(!is_plain_text("NaN"));
        assert!(!is_plain_text("Infinity"));
        assert!(!is_plain_text("hi there"));
    }

    #[test]
    fn test_timepoint_forms() {
        let base = TimeBase::default();
        let a = parse_timepoint("20230102T030405Z", &base).unwrap();
        let b = parse_timepoint("2023-01-02T03:04:05Z", &base).unwrap();
        assert_eq!(a, b);
        let c = parse_timepoint("20230102T030405.250000Z", &base).unwrap();
        assert_eq!(c.usec() - a.usec(), 250_000);
    }

    #[test]
    fn test_timeperiod_forms() {
        assert_eq!(parse_timeperiod("PT3H").unwrap(), TimeVal::from_secs(3 * 3600).unwrap());
        assert_eq!(parse_timeperiod("+PT3H"), parse_timeperiod("PT3H"));
        assert_eq!(
            parse_timeperiod("-PT3H").unwrap(),
            TimeVal::from_secs(-3 * 3600).unwrap()
        );
        assert_eq!(parse_timeperiod("PT10.25S").unwrap(), TimeVal::from_usec(10_250_000));
        assert_eq!(
            parse_timeperiod("P1DT10.25S").unwrap(),
            TimeVal::from_usec((86_400 + 10) * 1_000_000 + 250_000)
        );
        assert_eq!(parse_timeperiod("PT").unwrap(), TimeVal::from_usec(0));
        assert_eq!(parse_timeperiod("P"), None);
    }

    #[test]
    fn test_idsegment() {
        assert_eq!(parse_idsegment("hello"), Some(IdSegment::Name("hello".into())));
        assert_eq!(parse_idsegment("!example"), Some(IdSegment::Name("!example".into())));
        assert_eq!(parse_idsegment("65536"), Some(IdSegment::Num(65536)));
        assert_eq!(parse_idsegment("!12"), Some(IdSegment::Num(12)));
        assert_eq!(parse_idsegment("@x"), None);
    }

    #[test]
    fn test_type_segment() {
        assert_eq!(parse_type("CTRL"), Some(AriType::Ctrl));
        assert_eq!(parse_type("ctrl"), Some(AriType::Ctrl));
        assert_eq!(parse_type("1"), Some(AriType::Bool));
        assert_eq!(parse_type("-3"), Some(AriType::Ctrl));
        assert_eq!(parse_type("99"), None);
    }
}
