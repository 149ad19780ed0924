//! Built-in conversion of `OData` primitive literals.
//!
//! This is the last stage of [`super::DefaultLiteralParser`]: it only knows the
//! `Edm.*` primitives and reports every other target as not applicable.

use base64::Engine;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta};
use std::str::FromStr;
use uuid::Uuid;

use super::{LiteralParser, LiteralParsingError};
use crate::types::{EdmPrimitiveKind, TypeRef};
use crate::value::LiteralValue;

const NULL_LITERAL: &str = "null";
const MAX_FRACTION_DIGITS: usize = 9;

/// Converts literals of `Edm.*` primitive types.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLiteralParser;

impl LiteralParser for BuiltinLiteralParser {
    fn parse(&self, text: &str, target: &TypeRef) -> Result<Option<LiteralValue>, LiteralParsingError> {
        let Some(kind) = target.primitive_kind() else {
            return Ok(None);
        };

        if text == NULL_LITERAL {
            if target.is_nullable() {
                return Ok(Some(LiteralValue::Null));
            }
            return Err(LiteralParsingError::for_type(
                text,
                target,
                "null is not allowed for a non-nullable type",
            ));
        }

        convert(text, kind)
            .map(Some)
            .map_err(|reason| LiteralParsingError::for_type(text, target, reason))
    }
}

fn convert(text: &str, kind: EdmPrimitiveKind) -> Result<LiteralValue, String> {
    match kind {
        EdmPrimitiveKind::Boolean => parse_bool(text).map(LiteralValue::Boolean),
        EdmPrimitiveKind::Byte => parse_integer(text).map(LiteralValue::Byte),
        EdmPrimitiveKind::SByte => parse_integer(text).map(LiteralValue::SByte),
        EdmPrimitiveKind::Int16 => parse_integer(text).map(LiteralValue::Int16),
        EdmPrimitiveKind::Int32 => parse_integer(text).map(LiteralValue::Int32),
        EdmPrimitiveKind::Int64 => {
            parse_integer(text.strip_suffix(['L', 'l']).unwrap_or(text)).map(LiteralValue::Int64)
        }
        EdmPrimitiveKind::Single => parse_floating(
            text,
            ['f', 'F'],
            [f32::INFINITY, f32::NEG_INFINITY, f32::NAN],
        )
        .map(LiteralValue::Single),
        EdmPrimitiveKind::Double => parse_floating(
            text,
            ['d', 'D'],
            [f64::INFINITY, f64::NEG_INFINITY, f64::NAN],
        )
        .map(LiteralValue::Double),
        EdmPrimitiveKind::Decimal => parse_decimal(text).map(LiteralValue::Decimal),
        EdmPrimitiveKind::String => unquote(text).map(LiteralValue::String),
        EdmPrimitiveKind::Guid => parse_guid(text).map(LiteralValue::Guid),
        EdmPrimitiveKind::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(LiteralValue::Date)
            .map_err(|e| e.to_string()),
        EdmPrimitiveKind::TimeOfDay => NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
            .map(LiteralValue::TimeOfDay)
            .map_err(|e| e.to_string()),
        EdmPrimitiveKind::DateTimeOffset => DateTime::parse_from_rfc3339(text)
            .map(LiteralValue::DateTimeOffset)
            .map_err(|e| e.to_string()),
        EdmPrimitiveKind::Duration => {
            let iso = typed_body(text, "duration").unwrap_or(text);
            parse_duration(iso).map(LiteralValue::Duration)
        }
        EdmPrimitiveKind::Binary => parse_binary(text).map(LiteralValue::Binary),
    }
}

fn parse_bool(text: &str) -> Result<bool, String> {
    if text.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if text.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err("expected true or false".to_owned())
    }
}

fn parse_integer<T>(text: &str) -> Result<T, String>
where
    T: FromStr<Err = std::num::ParseIntError>,
{
    text.parse::<T>().map_err(|e| e.to_string())
}

fn is_numeric_text(text: &str) -> bool {
    !text.is_empty()
        && text.chars().any(|c| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
}

/// `specials` holds the values of `INF`, `-INF` and `NaN`, in that order.
fn parse_floating<T: FromStr>(text: &str, suffixes: [char; 2], specials: [T; 3]) -> Result<T, String> {
    let [inf, neg_inf, nan] = specials;
    let body = text.strip_suffix(suffixes).unwrap_or(text);
    match body {
        "INF" => return Ok(inf),
        "-INF" => return Ok(neg_inf),
        "NaN" => return Ok(nan),
        _ => {}
    }
    if !is_numeric_text(body) {
        return Err("expected a decimal or exponent number, INF, -INF or NaN".to_owned());
    }
    body.parse::<T>().map_err(|_| "invalid floating-point number".to_owned())
}

fn parse_decimal(text: &str) -> Result<BigDecimal, String> {
    let body = text.strip_suffix(['m', 'M']).unwrap_or(text);
    if !is_numeric_text(body) {
        return Err("expected a decimal number".to_owned());
    }
    BigDecimal::from_str(body).map_err(|e| e.to_string())
}

/// `'it''s'` → `it's`.
fn unquote(text: &str) -> Result<String, String> {
    let inner = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .ok_or_else(|| "string literals must be enclosed in single quotes".to_owned())?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\'' && chars.next() != Some('\'') {
            return Err("embedded single quotes must be doubled".to_owned());
        }
        out.push(c);
    }
    Ok(out)
}

fn parse_guid(text: &str) -> Result<Uuid, String> {
    // Only the hyphenated 8-4-4-4-12 form is an OData literal.
    if text.len() != 36 {
        return Err("expected 8-4-4-4-12 hexadecimal digits".to_owned());
    }
    Uuid::parse_str(text).map_err(|e| e.to_string())
}

/// Body of `prefix'body'`, prefix matched ignoring ASCII case.
fn typed_body<'t>(text: &'t str, prefix: &str) -> Option<&'t str> {
    let head = text.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    text[prefix.len()..].strip_prefix('\'')?.strip_suffix('\'')
}

fn parse_binary(text: &str) -> Result<Vec<u8>, String> {
    if let Some(body) = typed_body(text, "binary") {
        let unpadded = body.trim_end_matches('=');
        let engine = if unpadded.contains(['+', '/']) {
            &base64::engine::general_purpose::STANDARD_NO_PAD
        } else {
            &base64::engine::general_purpose::URL_SAFE_NO_PAD
        };
        return engine.decode(unpadded).map_err(|e| e.to_string());
    }
    if let Some(body) = typed_body(text, "X") {
        return hex::decode(body).map_err(|e| e.to_string());
    }
    Err("expected binary'<base64>' or X'<hex>'".to_owned())
}

/// ISO 8601 day-time duration: `[-]P[nD][T[nH][nM][n[.f]S]]`.
fn parse_duration(text: &str) -> Result<TimeDelta, String> {
    let overflow = || "duration out of range".to_owned();

    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let body = unsigned
        .strip_prefix(['P', 'p'])
        .ok_or_else(|| "durations start with 'P'".to_owned())?;
    let (days, time) = match body.split_once(['T', 't']) {
        Some((days, time)) => (days, Some(time)),
        None => (body, None),
    };

    let mut total = TimeDelta::zero();
    let mut has_component = false;

    if !days.is_empty() {
        let count = days
            .strip_suffix(['D', 'd'])
            .ok_or_else(|| "only days may precede 'T'".to_owned())?;
        let count: i64 = count.parse().map_err(|_| format!("invalid day count `{count}`"))?;
        total = TimeDelta::try_days(count).ok_or_else(overflow)?;
        has_component = true;
    }

    if let Some(time) = time {
        let part = parse_time_part(time)?;
        total = total.checked_add(&part).ok_or_else(overflow)?;
        has_component = true;
    }

    if !has_component {
        return Err("duration has no components".to_owned());
    }
    Ok(if negative { -total } else { total })
}

/// `[nH][nM][n[.f]S]`, at least one component.
fn parse_time_part(time: &str) -> Result<TimeDelta, String> {
    if time.is_empty() {
        return Err("'T' must be followed by hours, minutes or seconds".to_owned());
    }

    let mut total = TimeDelta::zero();
    let mut rest = time;
    let mut next_unit = 0;
    while !rest.is_empty() {
        let end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| "missing unit designator".to_owned())?;
        let (number, tail) = rest.split_at(end);
        let mut tail_chars = tail.chars();
        let designator = tail_chars.next().map(|c| c.to_ascii_uppercase());
        rest = tail_chars.as_str();

        let (unit, part) = match designator {
            Some('H') => (0, whole_units(number, TimeDelta::try_hours)?),
            Some('M') => (1, whole_units(number, TimeDelta::try_minutes)?),
            Some('S') => (2, seconds(number)?),
            _ => return Err(format!("unknown unit designator in `{tail}`")),
        };
        if unit < next_unit {
            return Err("units must appear as hours, minutes, seconds".to_owned());
        }
        next_unit = unit + 1;
        total = total
            .checked_add(&part)
            .ok_or_else(|| "duration out of range".to_owned())?;
    }
    Ok(total)
}

fn whole_units(number: &str, unit: fn(i64) -> Option<TimeDelta>) -> Result<TimeDelta, String> {
    let count: i64 = number.parse().map_err(|_| format!("invalid count `{number}`"))?;
    unit(count).ok_or_else(|| "duration out of range".to_owned())
}

fn seconds(number: &str) -> Result<TimeDelta, String> {
    let invalid = || format!("invalid seconds `{number}`");
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    let whole: i64 = whole.parse().map_err(|_| invalid())?;
    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    // Digits past nanosecond precision are truncated.
    let digits = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
    let nanos: i64 = if digits.is_empty() {
        0
    } else {
        format!("{digits:0<width$}", width = MAX_FRACTION_DIGITS)
            .parse()
            .map_err(|_| invalid())?
    };

    TimeDelta::try_seconds(whole)
        .and_then(|secs| secs.checked_add(&TimeDelta::nanoseconds(nanos)))
        .ok_or_else(|| "duration out of range".to_owned())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn parse(text: &str, kind: EdmPrimitiveKind) -> Result<Option<LiteralValue>, LiteralParsingError> {
        BuiltinLiteralParser.parse(text, &TypeRef::primitive(kind, false))
    }

    fn value(text: &str, kind: EdmPrimitiveKind) -> LiteralValue {
        parse(text, kind).unwrap().unwrap()
    }

    #[test]
    fn test_non_primitive_is_not_applicable() {
        let ty = TypeRef::new("NS.Money", false);
        assert_eq!(BuiltinLiteralParser.parse("12", &ty), Ok(None));
    }

    #[test]
    fn test_null_depends_on_nullability() {
        let nullable = TypeRef::primitive(EdmPrimitiveKind::Int32, true);
        assert_eq!(BuiltinLiteralParser.parse("null", &nullable), Ok(Some(LiteralValue::Null)));
        assert!(parse("null", EdmPrimitiveKind::Int32).is_err());
    }

    #[test]
    fn test_booleans() {
        assert_eq!(value("true", EdmPrimitiveKind::Boolean), LiteralValue::Boolean(true));
        assert_eq!(value("FALSE", EdmPrimitiveKind::Boolean), LiteralValue::Boolean(false));
        assert!(parse("yes", EdmPrimitiveKind::Boolean).is_err());
    }

    #[test]
    fn test_integers_and_ranges() {
        assert_eq!(value("255", EdmPrimitiveKind::Byte), LiteralValue::Byte(255));
        assert!(parse("256", EdmPrimitiveKind::Byte).is_err());
        assert_eq!(value("-128", EdmPrimitiveKind::SByte), LiteralValue::SByte(-128));
        assert!(parse("40000", EdmPrimitiveKind::Int16).is_err());
        assert_eq!(value("+42", EdmPrimitiveKind::Int32), LiteralValue::Int32(42));
        assert!(parse("1.5", EdmPrimitiveKind::Int32).is_err());
        assert_eq!(
            value("9223372036854775807L", EdmPrimitiveKind::Int64),
            LiteralValue::Int64(i64::MAX)
        );
    }

    #[test]
    fn test_floating_point() {
        assert_eq!(value("1.5", EdmPrimitiveKind::Double), LiteralValue::Double(1.5));
        assert_eq!(value("2.5e3d", EdmPrimitiveKind::Double), LiteralValue::Double(2500.0));
        assert_eq!(value("-INF", EdmPrimitiveKind::Double), LiteralValue::Double(f64::NEG_INFINITY));
        assert_eq!(value("NaN", EdmPrimitiveKind::Single), LiteralValue::Single(f32::NAN));
        assert_eq!(value("0.5f", EdmPrimitiveKind::Single), LiteralValue::Single(0.5));
        assert!(parse("inf", EdmPrimitiveKind::Double).is_err());
        assert!(parse("abc", EdmPrimitiveKind::Double).is_err());
    }

    #[test]
    fn test_decimal() {
        assert_eq!(
            value("12.50m", EdmPrimitiveKind::Decimal),
            LiteralValue::Decimal(BigDecimal::from_str("12.50").unwrap())
        );
        assert!(parse("12,50", EdmPrimitiveKind::Decimal).is_err());
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            value("'O''Neil'", EdmPrimitiveKind::String),
            LiteralValue::String("O'Neil".to_owned())
        );
        assert_eq!(value("''", EdmPrimitiveKind::String), LiteralValue::String(String::new()));
        assert!(parse("O'Neil", EdmPrimitiveKind::String).is_err());
        assert!(parse("'O'Neil'", EdmPrimitiveKind::String).is_err());
        assert!(parse("'", EdmPrimitiveKind::String).is_err());
    }

    #[test]
    fn test_guid() {
        let text = "01234567-89ab-cdef-0123-456789abcdef";
        assert_eq!(
            value(text, EdmPrimitiveKind::Guid),
            LiteralValue::Guid(Uuid::parse_str(text).unwrap())
        );
        assert!(parse("0123456789abcdef0123456789abcdef", EdmPrimitiveKind::Guid).is_err());
    }

    #[test]
    fn test_temporal() {
        assert_eq!(
            value("2024-02-29", EdmPrimitiveKind::Date),
            LiteralValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert!(parse("2023-02-29", EdmPrimitiveKind::Date).is_err());
        assert_eq!(
            value("07:30", EdmPrimitiveKind::TimeOfDay),
            LiteralValue::TimeOfDay(NaiveTime::from_hms_opt(7, 30, 0).unwrap())
        );
        assert_eq!(
            value("07:30:15.25", EdmPrimitiveKind::TimeOfDay),
            LiteralValue::TimeOfDay(NaiveTime::from_hms_milli_opt(7, 30, 15, 250).unwrap())
        );
        let LiteralValue::DateTimeOffset(dto) = value("2012-12-03T07:16:23+02:00", EdmPrimitiveKind::DateTimeOffset)
        else {
            panic!("expected a DateTimeOffset");
        };
        assert_eq!(dto.offset().local_minus_utc(), 7200);
    }

    #[test]
    fn test_durations() {
        let expected = TimeDelta::days(1) + TimeDelta::hours(2) + TimeDelta::milliseconds(3500);
        assert_eq!(
            value("duration'P1DT2H3.5S'", EdmPrimitiveKind::Duration),
            LiteralValue::Duration(expected)
        );
        assert_eq!(
            value("-PT90M", EdmPrimitiveKind::Duration),
            LiteralValue::Duration(-TimeDelta::minutes(90))
        );
        assert!(parse("P", EdmPrimitiveKind::Duration).is_err());
        assert!(parse("PT", EdmPrimitiveKind::Duration).is_err());
        assert!(parse("PT1S2M", EdmPrimitiveKind::Duration).is_err());
        assert!(parse("P1Y", EdmPrimitiveKind::Duration).is_err());
        assert!(parse("PT1.5H", EdmPrimitiveKind::Duration).is_err());
    }

    #[test]
    fn test_binary() {
        assert_eq!(
            value("binary'T0RhdGE'", EdmPrimitiveKind::Binary),
            LiteralValue::Binary(b"OData".to_vec())
        );
        assert_eq!(
            value("binary'T0RhdGE='", EdmPrimitiveKind::Binary),
            LiteralValue::Binary(b"OData".to_vec())
        );
        assert_eq!(
            value("X'0aFF'", EdmPrimitiveKind::Binary),
            LiteralValue::Binary(vec![0x0a, 0xff])
        );
        assert!(parse("T0RhdGE", EdmPrimitiveKind::Binary).is_err());
    }

    #[test]
    fn test_error_names_target_type() {
        let err = parse("abc", EdmPrimitiveKind::Int32).unwrap_err();
        assert_eq!(err.type_name, "Edm.Int32");
        assert_eq!(err.text, "abc");
    }
}
