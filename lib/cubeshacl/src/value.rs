//! Value comparison and lexical checks on RDF terms.

use crate::error::ShaclParseError;
use oxrdf::vocab::{rdf, xsd};
use oxrdf::{Literal, NamedNodeRef, Term};
use oxsdatatypes::{
    Boolean, Date, DateTime, Decimal, Double, Duration, Float, GYear, GYearMonth, Time,
};
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;
use std::str::FromStr;

/// Maximal size of a compiled `sh:pattern`.
const REGEX_SIZE_LIMIT: usize = 1_000_000;

/// Compiles a `sh:pattern` with its `sh:flags`.
pub fn compile_pattern(pattern: &str, flags: Option<&str>) -> Result<Regex, ShaclParseError> {
    let flags = flags.unwrap_or_default();
    let mut builder = if flags.contains('q') {
        RegexBuilder::new(&regex::escape(pattern))
    } else {
        RegexBuilder::new(pattern)
    };
    builder.size_limit(REGEX_SIZE_LIMIT);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            'q' => &mut builder,
            _ => {
                return Err(ShaclParseError::invalid_regex(
                    pattern,
                    format!("unsupported flag '{flag}'"),
                ));
            }
        };
    }
    builder
        .build()
        .map_err(|e| ShaclParseError::invalid_regex(pattern, e.to_string()))
}

/// The string a `sh:pattern` or length constraint applies to. Blank nodes have none.
pub fn lexical_form(term: &Term) -> Option<&str> {
    match term {
        Term::NamedNode(n) => Some(n.as_str()),
        Term::Literal(l) => Some(l.value()),
        _ => None,
    }
}

/// Basic filtering of [RFC 4647](https://www.rfc-editor.org/rfc/rfc4647#section-3.3.1), as SPARQL `langMatches`.
pub fn lang_matches(tag: &str, range: &str) -> bool {
    if range == "*" {
        return !tag.is_empty();
    }
    let (tag, range) = (tag.to_ascii_lowercase(), range.to_ascii_lowercase());
    tag == range
        || tag
            .strip_prefix(&range)
            .is_some_and(|rest| rest.starts_with('-'))
}

/// Compares two terms the way `sh:minInclusive` and the property pair constraints do.
///
/// Returns [`None`] when the terms are not comparable.
pub fn compare(a: &Term, b: &Term) -> Option<Ordering> {
    let (Term::Literal(a), Term::Literal(b)) = (a, b) else {
        return None;
    };
    if let (Some(a), Some(b)) = (Numeric::parse(a), Numeric::parse(b)) {
        return a.partial_cmp(&b);
    }
    let datatype = a.datatype();
    if datatype != b.datatype() {
        return None;
    }
    match datatype {
        d if d == xsd::STRING => Some(a.value().cmp(b.value())),
        d if d == xsd::BOOLEAN => parse::<Boolean>(a)?.partial_cmp(&parse::<Boolean>(b)?),
        d if d == xsd::DATE_TIME => parse::<DateTime>(a)?.partial_cmp(&parse::<DateTime>(b)?),
        d if d == xsd::DATE => parse::<Date>(a)?.partial_cmp(&parse::<Date>(b)?),
        d if d == xsd::TIME => parse::<Time>(a)?.partial_cmp(&parse::<Time>(b)?),
        d if d == xsd::G_YEAR => parse::<GYear>(a)?.partial_cmp(&parse::<GYear>(b)?),
        d if d == xsd::G_YEAR_MONTH => parse::<GYearMonth>(a)?.partial_cmp(&parse::<GYearMonth>(b)?),
        d if d == xsd::DURATION => parse::<Duration>(a)?.partial_cmp(&parse::<Duration>(b)?),
        _ => None,
    }
}

/// Whether the literal lexical form is valid for its datatype.
///
/// Unknown datatypes are always considered valid.
pub fn is_well_formed(literal: &Literal) -> bool {
    let datatype = literal.datatype();
    let value = literal.value();
    if let Some((min, max)) = integer_range(datatype) {
        return is_integer_lexical(value) && integer_in_range(value, min, max);
    }
    match datatype {
        d if d == xsd::INTEGER => is_integer_lexical(value),
        d if d == xsd::DECIMAL => is_decimal_lexical(value),
        d if d == xsd::DOUBLE => Double::from_str(value).is_ok(),
        d if d == xsd::FLOAT => Float::from_str(value).is_ok(),
        d if d == xsd::BOOLEAN => Boolean::from_str(value).is_ok(),
        d if d == xsd::DATE_TIME => DateTime::from_str(value).is_ok(),
        d if d == xsd::DATE_TIME_STAMP => {
            DateTime::from_str(value).is_ok_and(|v| v.timezone_offset().is_some())
        }
        d if d == xsd::DATE => Date::from_str(value).is_ok(),
        d if d == xsd::TIME => Time::from_str(value).is_ok(),
        d if d == xsd::G_YEAR => GYear::from_str(value).is_ok(),
        d if d == xsd::G_YEAR_MONTH => GYearMonth::from_str(value).is_ok(),
        d if d == xsd::DURATION => Duration::from_str(value).is_ok(),
        d if d == rdf::LANG_STRING => literal.language().is_some(),
        _ => true,
    }
}

fn parse<T: FromStr>(literal: &Literal) -> Option<T> {
    T::from_str(literal.value()).ok()
}

/// Inclusive bounds of the integer types derived from `xsd:integer`.
fn integer_range(datatype: NamedNodeRef<'_>) -> Option<(Option<i128>, Option<i128>)> {
    Some(match datatype {
        d if d == xsd::LONG => (Some(i64::MIN.into()), Some(i64::MAX.into())),
        d if d == xsd::INT => (Some(i32::MIN.into()), Some(i32::MAX.into())),
        d if d == xsd::SHORT => (Some(i16::MIN.into()), Some(i16::MAX.into())),
        d if d == xsd::BYTE => (Some(i8::MIN.into()), Some(i8::MAX.into())),
        d if d == xsd::UNSIGNED_LONG => (Some(0), Some(u64::MAX.into())),
        d if d == xsd::UNSIGNED_INT => (Some(0), Some(u32::MAX.into())),
        d if d == xsd::UNSIGNED_SHORT => (Some(0), Some(u16::MAX.into())),
        d if d == xsd::UNSIGNED_BYTE => (Some(0), Some(u8::MAX.into())),
        d if d == xsd::NON_NEGATIVE_INTEGER => (Some(0), None),
        d if d == xsd::POSITIVE_INTEGER => (Some(1), None),
        d if d == xsd::NON_POSITIVE_INTEGER => (None, Some(0)),
        d if d == xsd::NEGATIVE_INTEGER => (None, Some(-1)),
        _ => return None,
    })
}

/// Checks an integer lexical form against inclusive bounds.
///
/// Values too large for `i128` only satisfy the bound missing on their side.
fn integer_in_range(value: &str, min: Option<i128>, max: Option<i128>) -> bool {
    match value.parse::<i128>() {
        Ok(v) => min.is_none_or(|min| min <= v) && max.is_none_or(|max| v <= max),
        Err(_) if value.starts_with('-') => min.is_none(),
        Err(_) => max.is_none(),
    }
}

fn is_decimal_lexical(value: &str) -> bool {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    let (integer, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    !(integer.is_empty() && fraction.is_empty())
        && integer.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit())
}

fn is_integer_lexical(value: &str) -> bool {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// A numeric literal, kept exact unless one side is a floating point number.
#[derive(Clone, Copy)]
enum Numeric {
    Decimal(Decimal),
    Double(Double),
}

impl Numeric {
    fn parse(literal: &Literal) -> Option<Self> {
        let datatype = literal.datatype();
        if datatype == xsd::DOUBLE || datatype == xsd::FLOAT {
            return parse(literal).map(Self::Double);
        }
        if datatype == xsd::DECIMAL
            || datatype == xsd::INTEGER
            || integer_range(datatype).is_some()
        {
            if let Some(value) = parse(literal) {
                return Some(Self::Decimal(value));
            }
            // Out of the exact range: compare as a double
            if is_decimal_lexical(literal.value()) {
                return parse(literal).map(Self::Double);
            }
        }
        None
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Numeric {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (*self, *other) {
            (Self::Decimal(a), Self::Decimal(b)) => Some(a.cmp(&b)),
            (Self::Decimal(a), Self::Double(b)) => Double::from(a).partial_cmp(&b),
            (Self::Double(a), Self::Decimal(b)) => a.partial_cmp(&Double::from(b)),
            (Self::Double(a), Self::Double(b)) => a.partial_cmp(&b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::NamedNode;

    fn typed(value: &str, datatype: NamedNodeRef<'_>) -> Literal {
        Literal::new_typed_literal(value, datatype)
    }

    fn cmp(a: Literal, b: Literal) -> Option<Ordering> {
        compare(&a.into(), &b.into())
    }

    #[test]
    fn numeric_comparison_across_types() {
        assert_eq!(
            cmp(typed("10", xsd::INTEGER), typed("9.5", xsd::DECIMAL)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            cmp(typed("1", xsd::UNSIGNED_BYTE), typed("1.0e0", xsd::DOUBLE)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            cmp(typed("NaN", xsd::DOUBLE), typed("1", xsd::INTEGER)),
            None
        );
        assert_eq!(cmp(typed("ten", xsd::INTEGER), typed("1", xsd::INTEGER)), None);
    }

    #[test]
    fn temporal_and_string_comparison() {
        assert_eq!(
            cmp(typed("2020-01-01", xsd::DATE), typed("2021-06-30", xsd::DATE)),
            Some(Ordering::Less)
        );
        assert_eq!(
            cmp(typed("2020", xsd::G_YEAR), typed("2020-01-01", xsd::DATE)),
            None
        );
        assert_eq!(
            cmp(Literal::new_simple_literal("b"), Literal::new_simple_literal("a")),
            Some(Ordering::Greater)
        );
        assert_eq!(
            cmp(Literal::new_simple_literal("1"), typed("1", xsd::INTEGER)),
            None
        );
        assert_eq!(
            compare(
                &NamedNode::new_unchecked("http://example.com/a").into(),
                &NamedNode::new_unchecked("http://example.com/b").into()
            ),
            None
        );
    }

    #[test]
    fn well_formedness() {
        assert!(is_well_formed(&typed("42", xsd::INTEGER)));
        assert!(!is_well_formed(&typed("4.2", xsd::INTEGER)));
        assert!(is_well_formed(&typed("255", xsd::UNSIGNED_BYTE)));
        assert!(!is_well_formed(&typed("256", xsd::UNSIGNED_BYTE)));
        assert!(!is_well_formed(&typed("0", xsd::POSITIVE_INTEGER)));
        assert!(!is_well_formed(&typed("1_000", xsd::LONG)));
        assert!(is_well_formed(&typed("2021-02-28", xsd::DATE)));
        assert!(!is_well_formed(&typed("2021-13-01", xsd::DATE)));
        assert!(is_well_formed(&typed("2021-02-28T12:00:00", xsd::DATE_TIME)));
        assert!(!is_well_formed(&typed("2021-02-28T12:00:00", xsd::DATE_TIME_STAMP)));
        assert!(is_well_formed(&typed("2021", xsd::G_YEAR)));
        assert!(!is_well_formed(&typed("yes", xsd::BOOLEAN)));
        assert!(is_well_formed(&typed("anything", xsd::ANY_URI)));
    }

    #[test]
    fn integers_beyond_machine_range() {
        let huge = "12345678901234567890123456789012345678901";
        assert!(is_well_formed(&typed(huge, xsd::INTEGER)));
        assert!(is_well_formed(&typed(huge, xsd::NON_NEGATIVE_INTEGER)));
        assert!(!is_well_formed(&typed(huge, xsd::NON_POSITIVE_INTEGER)));
        assert!(!is_well_formed(&typed(huge, xsd::LONG)));
        assert!(is_well_formed(&typed(&format!("-{huge}"), xsd::NEGATIVE_INTEGER)));
        assert!(is_well_formed(&typed(&format!("{huge}.5"), xsd::DECIMAL)));
        assert!(!is_well_formed(&typed("1.2.3", xsd::DECIMAL)));
        assert_eq!(
            cmp(typed(huge, xsd::INTEGER), typed("0", xsd::INTEGER)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            cmp(typed(&format!("-{huge}"), xsd::INTEGER), typed("0", xsd::INTEGER)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn language_ranges() {
        assert!(lang_matches("de-CH", "de"));
        assert!(lang_matches("DE", "de"));
        assert!(!lang_matches("deu", "de"));
        assert!(lang_matches("fr", "*"));
        assert!(!lang_matches("fr", "de"));
    }

    #[test]
    fn pattern_flags() -> Result<(), ShaclParseError> {
        assert!(compile_pattern("^abc$", Some("i"))?.is_match("ABC"));
        assert!(!compile_pattern("^abc$", None)?.is_match("ABC"));
        assert!(compile_pattern("a.c", Some("q"))?.is_match("xa.cx"));
        assert!(!compile_pattern("a.c", Some("q"))?.is_match("abc"));
        assert!(compile_pattern("a", Some("z")).is_err());
        Ok(())
    }
}
