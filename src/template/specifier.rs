//! Numeric and date format specifiers
//!
//! Format arguments arrive as text. A specifier is honoured when the text
//! reads back as an integer, a finite float or an RFC 3339 timestamp; any
//! other text passes through unchanged. Output is culture-invariant.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};

use super::types::{FormatError, FormatResult};

const CURRENCY_SYMBOL: char = '¤';

/// Longest run of `f`/`F` a date pattern may contain
const MAX_FRACTION_DIGITS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    fn is_negative(self) -> bool {
        match self {
            Number::Int(v) => v < 0,
            Number::Float(v) => v < 0.0,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Number::Int(v) => v == 0,
            Number::Float(v) => v == 0.0,
        }
    }

    fn scaled(self, factor: i64) -> Number {
        match self {
            Number::Int(v) => v
                .checked_mul(factor)
                .map_or(Number::Float(v as f64 * factor as f64), Number::Int),
            Number::Float(v) => Number::Float(v * factor as f64),
        }
    }
}

enum Reinterpreted {
    Number(Number),
    Timestamp(DateTime<FixedOffset>),
    Text,
}

fn reinterpret(text: &str) -> Reinterpreted {
    if let Ok(v) = text.parse::<i64>() {
        return Reinterpreted::Number(Number::Int(v));
    }
    // Rules out "inf", "NaN" and friends
    if !text.bytes().any(|b| b.is_ascii_digit()) {
        return Reinterpreted::Text;
    }
    if let Some(v) = text.parse::<f64>().ok().filter(|v| v.is_finite()) {
        return Reinterpreted::Number(Number::Float(v));
    }
    match DateTime::parse_from_rfc3339(text) {
        Ok(t) => Reinterpreted::Timestamp(t),
        Err(_) => Reinterpreted::Text,
    }
}

/// Apply `spec` to a text argument
pub fn apply_specifier(text: &str, spec: &str) -> FormatResult<String> {
    match reinterpret(text) {
        Reinterpreted::Number(n) => format_number(n, spec),
        Reinterpreted::Timestamp(t) => format_timestamp(&t, spec),
        Reinterpreted::Text => Ok(text.to_string()),
    }
}

fn format_number(n: Number, spec: &str) -> FormatResult<String> {
    match parse_standard(spec) {
        Some((letter, precision)) => standard_number(n, letter, precision)
            .ok_or_else(|| FormatError::InvalidSpecifier(spec.to_string())),
        None => Ok(custom_number(n, spec)),
    }
}

/// A standard specifier is one letter plus an optional precision (0-99)
fn parse_standard(spec: &str) -> Option<(char, Option<usize>)> {
    let mut chars = spec.chars();
    let letter = chars.next().filter(char::is_ascii_alphabetic)?;
    let digits = chars.as_str();

    if digits.is_empty() {
        return Some((letter, None));
    }
    if digits.len() <= 2 && digits.bytes().all(|b| b.is_ascii_digit()) {
        return digits.parse().ok().map(|p| (letter, Some(p)));
    }
    None
}

fn standard_number(n: Number, letter: char, precision: Option<usize>) -> Option<String> {
    let formatted = match letter {
        'D' | 'd' => {
            let Number::Int(v) = n else { return None };
            let digits = format!("{:0width$}", v.unsigned_abs(), width = precision.unwrap_or(0));
            with_sign(n, digits)
        }
        'X' | 'x' => {
            let Number::Int(v) = n else { return None };
            let width = precision.unwrap_or(0);
            if letter == 'X' {
                format!("{:0width$X}", v)
            } else {
                format!("{:0width$x}", v)
            }
        }
        'F' | 'f' => with_sign(n, fixed(n, precision.unwrap_or(2), false)),
        'N' | 'n' => with_sign(n, fixed(n, precision.unwrap_or(2), true)),
        'P' | 'p' => {
            let scaled = n.scaled(100);
            format!("{} %", with_sign(scaled, fixed(scaled, precision.unwrap_or(2), true)))
        }
        'C' | 'c' => {
            let body = fixed(n, precision.unwrap_or(2), true);
            if n.is_negative() {
                format!("({}{})", CURRENCY_SYMBOL, body)
            } else {
                format!("{}{}", CURRENCY_SYMBOL, body)
            }
        }
        'E' | 'e' => with_sign(
            n,
            exponential(n.as_f64().abs(), precision.unwrap_or(6), letter == 'E', 3),
        ),
        'G' | 'g' => general(n, precision, letter == 'G'),
        'R' | 'r' => match n {
            Number::Int(v) => v.to_string(),
            Number::Float(v) => v.to_string(),
        },
        _ => return None,
    };
    Some(formatted)
}

fn with_sign(n: Number, body: String) -> String {
    if n.is_negative() {
        format!("-{}", body)
    } else {
        body
    }
}

/// Absolute value split into integer and fraction digits
fn split_fixed(n: Number, decimals: usize) -> (String, String) {
    match n {
        Number::Int(v) => (v.unsigned_abs().to_string(), "0".repeat(decimals)),
        Number::Float(v) => {
            let s = format!("{:.*}", decimals, v.abs());
            match s.split_once('.') {
                Some((int, frac)) => (int.to_string(), frac.to_string()),
                None => (s, String::new()),
            }
        }
    }
}

fn fixed(n: Number, decimals: usize, grouped: bool) -> String {
    let (int, frac) = split_fixed(n, decimals);
    let int = if grouped { group_thousands(&int) } else { int };
    if frac.is_empty() {
        int
    } else {
        format!("{}.{}", int, frac)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn exponential(abs: f64, precision: usize, upper: bool, exponent_digits: usize) -> String {
    let sci = format!("{:.*e}", precision, abs);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    format!(
        "{}{}{}{:0width$}",
        mantissa,
        if upper { 'E' } else { 'e' },
        if exponent < 0 { '-' } else { '+' },
        exponent.unsigned_abs(),
        width = exponent_digits
    )
}

/// Most compact of fixed-point and scientific for the given significant digits
fn general(n: Number, precision: Option<usize>, upper: bool) -> String {
    let Some(precision) = precision.filter(|p| *p > 0) else {
        return match n {
            Number::Int(v) => v.to_string(),
            Number::Float(v) => v.to_string(),
        };
    };

    let abs = n.as_f64().abs();
    if abs == 0.0 {
        return "0".to_string();
    }

    let sci = format!("{:.*e}", precision - 1, abs);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    let body = if exponent > -5 && exponent < precision as i32 {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, abs))
    } else {
        format!(
            "{}{}{}{:02}",
            trim_fraction(mantissa),
            if upper { 'E' } else { 'e' },
            if exponent < 0 { '-' } else { '+' },
            exponent.unsigned_abs()
        )
    };
    with_sign(n, body)
}

fn trim_fraction(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Digit(char),
    Point,
    Comma,
    Percent,
    Literal(String),
}

/// Split a custom pattern on unquoted `;` into at most three sections
fn split_sections(pattern: &str) -> Vec<&str> {
    let mut sections = Vec::with_capacity(3);
    let mut start = 0;
    let mut quote = None;
    let mut escaped = false;

    for (i, c) in pattern.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '\\') => escaped = true,
            (None, ';') if sections.len() < 2 => {
                sections.push(&pattern[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    sections.push(&pattern[start..]);
    sections
}

fn tokenize_custom(section: &str) -> Vec<Part> {
    let mut parts = Vec::new();
    let mut chars = section.chars();
    let mut seen_point = false;

    while let Some(c) = chars.next() {
        match c {
            '0' | '#' => parts.push(Part::Digit(c)),
            '.' if !seen_point => {
                seen_point = true;
                parts.push(Part::Point);
            }
            // Only the first decimal point counts
            '.' => {}
            ',' => parts.push(Part::Comma),
            '%' => parts.push(Part::Percent),
            '\'' | '"' => {
                let literal: String = chars.by_ref().take_while(|&x| x != c).collect();
                parts.push(Part::Literal(literal));
            }
            '\\' => {
                if let Some(next) = chars.next() {
                    parts.push(Part::Literal(next.to_string()));
                }
            }
            _ => parts.push(Part::Literal(c.to_string())),
        }
    }
    parts
}

/// Custom numeric patterns: `0`, `#`, `.`, `,`, `%`, quoted literals and
/// up to three `;` sections (positive; negative; zero)
fn custom_number(n: Number, pattern: &str) -> String {
    let sections = split_sections(pattern);
    let (section, signed) = match sections.as_slice() {
        [_, negative, ..] if n.is_negative() && !negative.is_empty() => (*negative, false),
        [_, _, zero] if n.is_zero() && !zero.is_empty() => (*zero, false),
        [first, ..] => (*first, n.is_negative()),
        [] => (pattern, n.is_negative()),
    };

    let parts = tokenize_custom(section);
    let point = parts.iter().position(|p| *p == Part::Point).unwrap_or(parts.len());
    let (int_parts, frac_parts) = parts.split_at(point);

    let int_digits: Vec<char> = int_parts
        .iter()
        .filter_map(|p| match p {
            Part::Digit(c) => Some(*c),
            _ => None,
        })
        .collect();
    let frac_digits: Vec<char> = frac_parts
        .iter()
        .filter_map(|p| match p {
            Part::Digit(c) => Some(*c),
            _ => None,
        })
        .collect();

    let min_int = int_digits
        .iter()
        .position(|c| *c == '0')
        .map_or(0, |i| int_digits.len() - i);
    let max_frac = frac_digits.len();
    let min_frac = frac_digits.iter().rposition(|c| *c == '0').map_or(0, |i| i + 1);

    // A comma between integer placeholders groups; trailing commas divide by 1000
    let last_int_digit = int_parts.iter().rposition(|p| matches!(p, Part::Digit(_)));
    let first_int_digit = int_parts.iter().position(|p| matches!(p, Part::Digit(_)));
    let mut grouped = false;
    let mut thousands_scale = 0;
    for (i, part) in int_parts.iter().enumerate() {
        if *part != Part::Comma {
            continue;
        }
        match (first_int_digit, last_int_digit) {
            (Some(first), Some(last)) if i > first && i < last => grouped = true,
            (Some(first), _) if i > first => thousands_scale += 1,
            _ => {}
        }
    }

    let percents = parts.iter().filter(|p| **p == Part::Percent).count();
    let mut value = n;
    for _ in 0..percents {
        value = value.scaled(100);
    }
    if thousands_scale > 0 {
        value = Number::Float(value.as_f64() / 1000f64.powi(thousands_scale));
    }

    let (mut int, mut frac) = split_fixed(value, max_frac);
    while frac.len() > min_frac && frac.ends_with('0') {
        frac.pop();
    }
    if int == "0" && min_int == 0 {
        int.clear();
    }
    if int.len() < min_int {
        int = format!("{}{}", "0".repeat(min_int - int.len()), int);
    }
    if grouped && !int.is_empty() {
        int = group_thousands(&int);
    }

    let nonzero = int.bytes().chain(frac.bytes()).any(|b| b.is_ascii_digit() && b != b'0');
    let mut out = String::new();
    if signed && nonzero {
        out.push('-');
    }

    let mut int_written = false;
    let mut frac_written = false;
    for (i, part) in parts.iter().enumerate() {
        match part {
            Part::Digit(_) if i < point => {
                if !int_written {
                    out.push_str(&int);
                    int_written = true;
                }
            }
            Part::Digit(_) => {
                if !frac_written {
                    out.push_str(&frac);
                    frac_written = true;
                }
            }
            Part::Point => {
                if !int_written {
                    out.push_str(&int);
                    int_written = true;
                }
                if !frac.is_empty() {
                    out.push('.');
                }
            }
            Part::Comma => {}
            Part::Percent => out.push('%'),
            Part::Literal(s) => out.push_str(s),
        }
    }
    out
}

fn format_timestamp(t: &DateTime<FixedOffset>, spec: &str) -> FormatResult<String> {
    let invalid = || FormatError::InvalidSpecifier(spec.to_string());
    let mut chars = spec.chars();

    match (chars.next(), chars.next()) {
        (Some(c), None) => {
            let (pattern, utc) = standard_date_pattern(c).ok_or_else(invalid)?;
            let t: DateTime<FixedOffset> = if utc { t.with_timezone(&Utc).into() } else { *t };
            custom_timestamp(&t, pattern).ok_or_else(invalid)
        }
        _ => custom_timestamp(t, spec).ok_or_else(invalid),
    }
}

/// Invariant-culture expansion of single-letter date specifiers; the flag
/// marks patterns rendered in UTC
fn standard_date_pattern(c: char) -> Option<(&'static str, bool)> {
    let pattern = match c {
        'd' => ("MM/dd/yyyy", false),
        'D' => ("dddd, dd MMMM yyyy", false),
        't' => ("HH:mm", false),
        'T' => ("HH:mm:ss", false),
        'f' => ("dddd, dd MMMM yyyy HH:mm", false),
        'F' => ("dddd, dd MMMM yyyy HH:mm:ss", false),
        'g' => ("MM/dd/yyyy HH:mm", false),
        'G' => ("MM/dd/yyyy HH:mm:ss", false),
        'M' | 'm' => ("MMMM dd", false),
        'Y' | 'y' => ("yyyy MMMM", false),
        'o' | 'O' => ("yyyy'-'MM'-'dd'T'HH':'mm':'ss'.'fffffffzzz", false),
        's' => ("yyyy'-'MM'-'dd'T'HH':'mm':'ss", false),
        'u' => ("yyyy'-'MM'-'dd HH':'mm':'ss'Z'", true),
        'R' | 'r' => ("ddd, dd MMM yyyy HH':'mm':'ss 'GMT'", true),
        _ => return None,
    };
    Some(pattern)
}

/// Render a custom date pattern; `None` if it asks for too many fraction digits
fn custom_timestamp(t: &DateTime<FixedOffset>, pattern: &str) -> Option<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let run = chars[i..].iter().take_while(|&&x| x == c).count();

        match c {
            'y' | 'M' | 'd' | 'H' | 'h' | 'm' | 's' | 'f' | 'F' | 't' | 'z' | 'K' => {
                push_date_field(&mut out, t, c, run)?;
                i += run;
            }
            '\'' | '"' => {
                let literal = &chars[i + 1..];
                match literal.iter().position(|&x| x == c) {
                    Some(len) => {
                        out.extend(&literal[..len]);
                        i += len + 2;
                    }
                    None => {
                        out.extend(literal);
                        i = chars.len();
                    }
                }
            }
            '\\' => {
                if let Some(&next) = chars.get(i + 1) {
                    out.push(next);
                }
                i += 2;
            }
            // "%d" selects the single-letter custom form
            '%' => i += 1,
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    Some(out)
}

fn push_date_field(out: &mut String, t: &DateTime<FixedOffset>, c: char, run: usize) -> Option<()> {
    let field = match (c, run) {
        ('y', 1) => t.year().rem_euclid(100).to_string(),
        ('y', 2) => format!("{:02}", t.year().rem_euclid(100)),
        ('y', n) => format!("{:0width$}", t.year(), width = n),
        ('M', 1) => t.month().to_string(),
        ('M', 2) => format!("{:02}", t.month()),
        ('M', 3) => t.format("%b").to_string(),
        ('M', _) => t.format("%B").to_string(),
        ('d', 1) => t.day().to_string(),
        ('d', 2) => format!("{:02}", t.day()),
        ('d', 3) => t.format("%a").to_string(),
        ('d', _) => t.format("%A").to_string(),
        ('H', 1) => t.hour().to_string(),
        ('H', _) => format!("{:02}", t.hour()),
        ('h', 1) => t.hour12().1.to_string(),
        ('h', _) => format!("{:02}", t.hour12().1),
        ('m', 1) => t.minute().to_string(),
        ('m', _) => format!("{:02}", t.minute()),
        ('s', 1) => t.second().to_string(),
        ('s', _) => format!("{:02}", t.second()),
        ('f' | 'F', n) if n > MAX_FRACTION_DIGITS => return None,
        ('f' | 'F', n) => {
            // Leap seconds carry nanoseconds past 1e9
            let nanos = format!("{:09}", t.nanosecond() % 1_000_000_000);
            let digits = &nanos[..n];
            if c == 'F' {
                digits.trim_end_matches('0').to_string()
            } else {
                digits.to_string()
            }
        }
        ('t', n) => {
            let marker = if t.hour() < 12 { "AM" } else { "PM" };
            if n == 1 {
                marker[..1].to_string()
            } else {
                marker.to_string()
            }
        }
        ('z', n) => {
            let seconds = t.offset().local_minus_utc();
            let sign = if seconds < 0 { '-' } else { '+' };
            let (hours, minutes) = (seconds.abs() / 3600, seconds.abs() % 3600 / 60);
            match n {
                1 => format!("{}{}", sign, hours),
                2 => format!("{}{:02}", sign, hours),
                _ => format!("{}{:02}:{:02}", sign, hours, minutes),
            }
        }
        ('K', _) => t.format("%:z").to_string(),
        _ => String::new(),
    };
    out.push_str(&field);
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(text: &str, spec: &str) -> String {
        apply_specifier(text, spec).unwrap()
    }

    #[test]
    fn test_integer_specifiers() {
        assert_eq!(fmt("42", "D5"), "00042");
        assert_eq!(fmt("-42", "D5"), "-00042");
        assert_eq!(fmt("42", "D"), "42");
        assert_eq!(fmt("255", "X"), "FF");
        assert_eq!(fmt("255", "x4"), "00ff");
    }

    #[test]
    fn test_fixed_and_grouped() {
        assert_eq!(fmt("3.14159", "F2"), "3.14");
        assert_eq!(fmt("42", "F"), "42.00");
        assert_eq!(fmt("-1.5", "F0"), "-2");
        assert_eq!(fmt("1234567.891", "N"), "1,234,567.89");
        assert_eq!(fmt("1234", "N0"), "1,234");
        assert_eq!(fmt("999", "N0"), "999");
    }

    #[test]
    fn test_percent_currency_exponent() {
        assert_eq!(fmt("0.125", "P"), "12.50 %");
        assert_eq!(fmt("0.5", "P0"), "50 %");
        assert_eq!(fmt("1234.5", "C"), "¤1,234.50");
        assert_eq!(fmt("-5", "C"), "(¤5.00)");
        assert_eq!(fmt("12345.678", "E"), "1.234568E+004");
        assert_eq!(fmt("12345.678", "e2"), "1.23e+004");
    }

    #[test]
    fn test_general() {
        assert_eq!(fmt("42", "G"), "42");
        assert_eq!(fmt("2.5", "G"), "2.5");
        assert_eq!(fmt("3.14159", "G3"), "3.14");
        assert_eq!(fmt("12345", "G3"), "1.23E+04");
        assert_eq!(fmt("12345", "g3"), "1.23e+04");
    }

    #[test]
    fn test_invalid_standard_specifiers() {
        assert_eq!(
            apply_specifier("1.5", "D3"),
            Err(FormatError::InvalidSpecifier("D3".to_string()))
        );
        assert!(apply_specifier("1.5", "X").is_err());
        assert!(apply_specifier("42", "Q").is_err());
    }

    #[test]
    fn test_custom_numeric_patterns() {
        assert_eq!(fmt("1234.5", "#,##0.00"), "1,234.50");
        assert_eq!(fmt("3.1", "0.##"), "3.1");
        assert_eq!(fmt("3", "0.##"), "3");
        assert_eq!(fmt("7", "000"), "007");
        assert_eq!(fmt("0.5", ".00"), ".50");
        assert_eq!(fmt("12.5", ".00"), "12.50");
        assert_eq!(fmt("0.25", "0%"), "25%");
        assert_eq!(fmt("3", "0 'items'"), "3 items");
        assert_eq!(fmt("1500000", "#,##0,,"), "2");
        assert_eq!(fmt("-1234", "#,##0"), "-1,234");
        assert_eq!(fmt("42", "Q12x"), "Q12x");
    }

    #[test]
    fn test_custom_sections() {
        assert_eq!(fmt("5", "0;(0);zero"), "5");
        assert_eq!(fmt("-5", "0;(0);zero"), "(5)");
        assert_eq!(fmt("0", "0;(0);zero"), "zero");
        assert_eq!(fmt("-5", "0;;zero"), "-5");
    }

    #[test]
    fn test_text_passes_through() {
        assert_eq!(fmt("abc", "D5"), "abc");
        assert_eq!(fmt("NaN", "F2"), "NaN");
        assert_eq!(fmt("v1.2.3", "N"), "v1.2.3");
    }

    #[test]
    fn test_standard_date_specifiers() {
        let t = "2024-05-01T14:05:09.1234567+02:00";

        assert_eq!(fmt(t, "o"), "2024-05-01T14:05:09.1234567+02:00");
        assert_eq!(fmt(t, "s"), "2024-05-01T14:05:09");
        assert_eq!(fmt(t, "u"), "2024-05-01 12:05:09Z");
        assert_eq!(fmt(t, "d"), "05/01/2024");
        assert_eq!(fmt(t, "D"), "Wednesday, 01 May 2024");
        assert_eq!(fmt(t, "t"), "14:05");
        assert_eq!(fmt(t, "R"), "Wed, 01 May 2024 12:05:09 GMT");
        assert!(apply_specifier(t, "q").is_err());
    }

    #[test]
    fn test_custom_date_patterns() {
        let t = "2024-05-01T14:05:09.1234567+02:00";

        assert_eq!(fmt(t, "yyyy-MM-dd HH:mm"), "2024-05-01 14:05");
        assert_eq!(fmt(t, "dddd, d MMMM"), "Wednesday, 1 May");
        assert_eq!(fmt(t, "hh:mm tt"), "02:05 PM");
        assert_eq!(fmt(t, "h:m:s t"), "2:5:9 P");
        assert_eq!(fmt(t, "'Day' d"), "Day 1");
        assert_eq!(fmt(t, "\\d\\a\\y d"), "day 1");
        assert_eq!(fmt(t, "zzz|zz|z"), "+02:00|+02|+2");
        assert_eq!(fmt(t, "fff"), "123");
        assert_eq!(fmt(t, "FFFFFFF"), "1234567");
        assert_eq!(fmt("2024-05-01T14:05:09.5Z", "ss.FFF"), "09.5");
        assert_eq!(fmt(t, "yy MMM ddd"), "24 May Wed");
        assert!(apply_specifier(t, "ffffffff").is_err());
    }
}
