//! Culture-invariant text-to-value conversion.
//!
//! Route constraints use the eight typed tokens (`bool`, `datetime`,
//! `decimal`, `double`, `float`, `guid`, `int`, `long`). Query-string
//! binding resolves converters by [`TargetType`] instead, which adds
//! `string`, `date`, `time` and nullable variants of every type.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

use crate::value::RouteValue;

/// The kind of value a converter produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    Guid,
    DateTime,
    Date,
    Time,
    String,
}

impl ValueKind {
    /// Parse a type name such as `int` or `datetime`, ignoring ASCII case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bool" => Some(Self::Bool),
            "int" => Some(Self::Int),
            "long" => Some(Self::Long),
            "float" => Some(Self::Float),
            "double" => Some(Self::Double),
            "decimal" => Some(Self::Decimal),
            "guid" => Some(Self::Guid),
            "datetime" => Some(Self::DateTime),
            "date" => Some(Self::Date),
            "time" => Some(Self::Time),
            "string" => Some(Self::String),
            _ => None,
        }
    }

    /// The lowercase type name, e.g. `int`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::Guid => "guid",
            Self::DateTime => "datetime",
            Self::Date => "date",
            Self::Time => "time",
            Self::String => "string",
        }
    }
}

/// A destination type for a supplied value, e.g. `int` or `int?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetType {
    pub kind: ValueKind,
    /// Whether an empty input produces `Null` instead of a parse failure.
    pub nullable: bool,
}

impl TargetType {
    /// A non-nullable target of `kind`.
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    /// A nullable target of `kind`: empty text converts to `Null`.
    pub fn nullable(kind: ValueKind) -> Self {
        Self {
            kind,
            nullable: true,
        }
    }

    /// Parse `int`, `int?`, `DateTime?` and so on.
    pub fn parse(s: &str) -> Option<Self> {
        match s.strip_suffix('?') {
            Some(base) => ValueKind::parse(base).map(Self::nullable),
            None => ValueKind::parse(s).map(Self::new),
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.name())?;
        if self.nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}

/// A decimal number kept in canonical text form.
///
/// Accepts an optional sign, digits and an optional fractional part. The
/// canonical form drops a leading `+`, redundant leading zeros and trailing
/// fractional zeros.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Decimal(String);

impl Decimal {
    /// Parse and canonicalize decimal text.
    pub fn parse(s: &str) -> Option<Self> {
        let (negative, unsigned) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((i, f)) => (i, f),
            None => (unsigned, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let int_part = int_part.trim_start_matches('0');
        let frac_part = frac_part.trim_end_matches('0');
        let mut canonical = String::with_capacity(s.len() + 1);
        if negative && !(int_part.is_empty() && frac_part.is_empty()) {
            canonical.push('-');
        }
        canonical.push_str(if int_part.is_empty() { "0" } else { int_part });
        if !frac_part.is_empty() {
            canonical.push('.');
            canonical.push_str(frac_part);
        }
        Some(Self(canonical))
    }

    /// The canonical text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strip the leading and trailing white space invariant number parsing
/// allows: tab through carriage return, and space.
fn trim_white(text: &str) -> &str {
    text.trim_matches(|c| matches!(c, '\t'..='\r' | ' '))
}

/// Trimmed text with `,` group separators removed from the integer digits,
/// so `1,000.5` reads as `1000.5`. A separator in the fraction or exponent,
/// or one directly after the sign, is rejected.
fn ungrouped(text: &str) -> Option<Cow<'_, str>> {
    let text = trim_white(text);
    if !text.contains(',') {
        return Some(Cow::Borrowed(text));
    }
    let unsigned = text.trim_start_matches(['+', '-']);
    let int_end = unsigned.find(['.', 'e', 'E']).unwrap_or(unsigned.len());
    if unsigned.starts_with(',') || unsigned[int_end..].contains(',') {
        return None;
    }
    Some(Cow::Owned(text.replace(',', "")))
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|f| NaiveTime::parse_from_str(s, f).ok())
}

/// Converts text into a typed [`RouteValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueConverter {
    target: TargetType,
}

impl ValueConverter {
    /// Resolve one of the typed route constraint tokens.
    pub fn for_token(token: &str) -> Option<Self> {
        let kind = match token.to_ascii_lowercase().as_str() {
            "bool" => ValueKind::Bool,
            "datetime" => ValueKind::DateTime,
            "decimal" => ValueKind::Decimal,
            "double" => ValueKind::Double,
            "float" => ValueKind::Float,
            "guid" => ValueKind::Guid,
            "int" => ValueKind::Int,
            "long" => ValueKind::Long,
            _ => return None,
        };
        Some(Self::for_type(TargetType::new(kind)))
    }

    /// Resolve a converter for a declared destination type.
    pub fn for_type(target: TargetType) -> Self {
        Self { target }
    }

    /// The type this converter produces.
    pub fn target(&self) -> TargetType {
        self.target
    }

    /// Convert one value. Returns `None` when the text does not parse.
    ///
    /// For nullable targets an empty input yields `Some(RouteValue::Null)`.
    pub fn parse(&self, text: &str) -> Option<RouteValue> {
        if self.target.nullable && text.is_empty() {
            return Some(RouteValue::Null);
        }
        match self.target.kind {
            ValueKind::Bool => {
                if text.eq_ignore_ascii_case("true") {
                    Some(RouteValue::Bool(true))
                } else if text.eq_ignore_ascii_case("false") {
                    Some(RouteValue::Bool(false))
                } else {
                    None
                }
            }
            ValueKind::Int => trim_white(text).parse().ok().map(RouteValue::Int),
            ValueKind::Long => trim_white(text).parse().ok().map(RouteValue::Long),
            ValueKind::Float => ungrouped(text)?.parse().ok().map(RouteValue::Float),
            ValueKind::Double => ungrouped(text)?.parse().ok().map(RouteValue::Double),
            ValueKind::Decimal => Decimal::parse(&ungrouped(text)?).map(RouteValue::Decimal),
            ValueKind::Guid => Uuid::parse_str(text).ok().map(RouteValue::Guid),
            ValueKind::DateTime => parse_datetime(text).map(RouteValue::DateTime),
            ValueKind::Date => parse_date(text).map(RouteValue::Date),
            ValueKind::Time => parse_time(text).map(RouteValue::Time),
            ValueKind::String => Some(RouteValue::String(text.to_string())),
        }
    }

    /// Convert every item for an array destination. Fails as a whole if any
    /// single item fails.
    pub fn parse_multiple<S: AsRef<str>>(&self, items: &[S]) -> Option<RouteValue> {
        items
            .iter()
            .map(|item| self.parse(item.as_ref()))
            .collect::<Option<Vec<_>>>()
            .map(RouteValue::List)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_tokens_resolve() {
        for token in ["bool", "datetime", "decimal", "double", "float", "guid", "int", "long"] {
            assert!(ValueConverter::for_token(token).is_some(), "{}", token);
        }
        assert!(ValueConverter::for_token("INT").is_some());
        assert!(ValueConverter::for_token("string").is_none());
        assert!(ValueConverter::for_token("date").is_none());
    }

    #[test]
    fn int_conversion() {
        let c = ValueConverter::for_token("int").unwrap();
        assert_eq!(c.parse("5"), Some(RouteValue::Int(5)));
        assert_eq!(c.parse("-12"), Some(RouteValue::Int(-12)));
        assert_eq!(c.parse("abc"), None);
        assert_eq!(c.parse("4294967296"), None);
        assert_eq!(c.parse(""), None);
        assert_eq!(c.parse(" 42\t"), Some(RouteValue::Int(42)));
        assert_eq!(c.parse("1,000"), None);
    }

    #[test]
    fn long_accepts_values_beyond_int() {
        let c = ValueConverter::for_token("long").unwrap();
        assert_eq!(c.parse("4294967296"), Some(RouteValue::Long(4_294_967_296)));
    }

    #[test]
    fn bool_is_case_insensitive() {
        let c = ValueConverter::for_token("bool").unwrap();
        assert_eq!(c.parse("True"), Some(RouteValue::Bool(true)));
        assert_eq!(c.parse("FALSE"), Some(RouteValue::Bool(false)));
        assert_eq!(c.parse("1"), None);
    }

    #[test]
    fn floating_point_is_culture_invariant() {
        let c = ValueConverter::for_token("double").unwrap();
        assert_eq!(c.parse("1.5"), Some(RouteValue::Double(1.5)));
        assert_eq!(c.parse("1,000"), Some(RouteValue::Double(1000.0)));
        assert_eq!(c.parse("-1,234.5e1"), Some(RouteValue::Double(-12345.0)));
        assert_eq!(c.parse(" 2.5 "), Some(RouteValue::Double(2.5)));
        assert_eq!(c.parse(",5"), None);
        assert_eq!(c.parse("1.2,5"), None);

        let c = ValueConverter::for_token("float").unwrap();
        assert_eq!(c.parse("0.25"), Some(RouteValue::Float(0.25)));
    }

    #[test]
    fn decimal_converter_accepts_group_separators() {
        let c = ValueConverter::for_token("decimal").unwrap();
        let expected = Decimal::parse("1250.5").map(RouteValue::Decimal);
        assert_eq!(c.parse(" 1,250.50"), expected);
        assert_eq!(c.parse("1.250,5"), None);
    }

    #[test]
    fn decimal_canonical_form() {
        assert_eq!(Decimal::parse("+001.500").unwrap().as_str(), "1.5");
        assert_eq!(Decimal::parse("-0.0").unwrap().as_str(), "0");
        assert_eq!(Decimal::parse(".5").unwrap().as_str(), "0.5");
        assert_eq!(Decimal::parse("12.").unwrap().as_str(), "12");
        assert!(Decimal::parse("1e5").is_none());
        assert!(Decimal::parse(".").is_none());
        assert!(Decimal::parse("-").is_none());
    }

    #[test]
    fn guid_conversion() {
        let c = ValueConverter::for_token("guid").unwrap();
        let value = c.parse("12345678-1234-1234-1234-123456789012").unwrap();
        assert!(matches!(value, RouteValue::Guid(_)));
        assert_eq!(c.parse("not-a-guid"), None);
    }

    #[test]
    fn datetime_conversion() {
        let c = ValueConverter::for_token("datetime").unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(
            c.parse("2024-03-01T10:30:00"),
            Some(RouteValue::DateTime(expected))
        );
        assert_eq!(
            c.parse("2024-03-01T12:30:00+02:00"),
            Some(RouteValue::DateTime(expected))
        );
        assert!(matches!(c.parse("2024-03-01"), Some(RouteValue::DateTime(_))));
        assert_eq!(c.parse("yesterday"), None);
    }

    #[test]
    fn date_and_time_by_type() {
        let date = ValueConverter::for_type(TargetType::new(ValueKind::Date));
        assert_eq!(
            date.parse("2024-02-29"),
            Some(RouteValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()))
        );
        assert_eq!(date.parse("2023-02-29"), None);

        let time = ValueConverter::for_type(TargetType::new(ValueKind::Time));
        assert_eq!(
            time.parse("08:15"),
            Some(RouteValue::Time(NaiveTime::from_hms_opt(8, 15, 0).unwrap()))
        );
    }

    #[test]
    fn nullable_empty_input_is_null() {
        let c = ValueConverter::for_type(TargetType::nullable(ValueKind::Int));
        assert_eq!(c.parse(""), Some(RouteValue::Null));
        assert_eq!(c.parse("7"), Some(RouteValue::Int(7)));
        assert_eq!(c.parse("x"), None);

        let c = ValueConverter::for_type(TargetType::new(ValueKind::Int));
        assert_eq!(c.parse(""), None);
    }

    #[test]
    fn string_target_accepts_anything() {
        let c = ValueConverter::for_type(TargetType::new(ValueKind::String));
        assert_eq!(c.parse(""), Some(RouteValue::String(String::new())));
        assert_eq!(c.parse("hello"), Some(RouteValue::from("hello")));
    }

    #[test]
    fn parse_multiple_fails_as_a_whole() {
        let c = ValueConverter::for_token("int").unwrap();
        assert_eq!(
            c.parse_multiple(&["1", "2"]),
            Some(RouteValue::List(vec![RouteValue::Int(1), RouteValue::Int(2)]))
        );
        assert_eq!(c.parse_multiple(&["1", "two"]), None);
        assert_eq!(
            c.parse_multiple::<&str>(&[]),
            Some(RouteValue::List(Vec::new()))
        );
    }

    #[test]
    fn target_type_parse_and_display() {
        let t = TargetType::parse("int?").unwrap();
        assert_eq!(t, TargetType::nullable(ValueKind::Int));
        assert_eq!(t.to_string(), "int?");
        assert_eq!(
            TargetType::parse("DateTime"),
            Some(TargetType::new(ValueKind::DateTime))
        );
        assert_eq!(TargetType::parse("uint"), None);
    }
}
