//! Positional format engine
//!
//! Format items take the form `{index[,alignment][:specifier]}`; `{{` and
//! `}}` produce literal braces. Arguments are text; specifiers are applied
//! by re-reading the text as a number or timestamp (see `specifier`).

use std::iter::Peekable;
use std::str::CharIndices;

use super::specifier::apply_specifier;
use super::types::{FormatError, FormatResult};

/// Widest padding an alignment may request
const MAX_ALIGNMENT: i64 = 1_000_000;

/// Parsed `{...}` format item
struct FormatItem<'a> {
    index: usize,
    alignment: i64,
    specifier: Option<&'a str>,
}

/// Apply a positional format string to the given arguments
pub fn format_positional(format: &str, args: &[&str]) -> FormatResult<String> {
    let mut out = String::with_capacity(format.len());
    let mut chars = format.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if chars.next_if(|&(_, c)| c == '{').is_some() {
                    out.push('{');
                    continue;
                }

                let item = parse_item(format, pos, &mut chars)?;
                let arg = args.get(item.index).ok_or(FormatError::IndexOutOfRange {
                    index: item.index,
                    count: args.len(),
                })?;

                let formatted = match item.specifier {
                    Some(spec) => apply_specifier(arg, spec)?,
                    None => (*arg).to_string(),
                };
                push_aligned(&mut out, &formatted, item.alignment);
            }
            '}' => {
                if chars.next_if(|&(_, c)| c == '}').is_none() {
                    return Err(FormatError::UnexpectedClosingBrace(pos));
                }
                out.push('}');
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn parse_item<'a>(
    format: &'a str,
    open: usize,
    chars: &mut Peekable<CharIndices<'a>>,
) -> FormatResult<FormatItem<'a>> {
    let index_start = open + 1;
    let index_digits = take_digits(chars);
    if index_digits == 0 {
        return Err(FormatError::InvalidIndex(index_start));
    }
    let index = format[index_start..index_start + index_digits]
        .parse::<usize>()
        .map_err(|_| FormatError::InvalidIndex(index_start))?;
    skip_spaces(chars);

    let mut alignment = 0;
    if let Some((comma, _)) = chars.next_if(|&(_, c)| c == ',') {
        skip_spaces(chars);
        let negative = chars.next_if(|&(_, c)| c == '-').is_some();
        let digits_start = chars.peek().map_or(format.len(), |&(i, _)| i);
        let digits = take_digits(chars);
        if digits == 0 {
            return Err(FormatError::InvalidAlignment(comma));
        }
        let width = format[digits_start..digits_start + digits]
            .parse::<i64>()
            .ok()
            .filter(|w| *w <= MAX_ALIGNMENT)
            .ok_or(FormatError::InvalidAlignment(comma))?;
        alignment = if negative { -width } else { width };
        skip_spaces(chars);
    }

    let mut specifier = None;
    if let Some((colon, _)) = chars.next_if(|&(_, c)| c == ':') {
        let spec_start = colon + 1;
        loop {
            match chars.peek() {
                Some(&(end, '}')) => {
                    if end > spec_start {
                        specifier = Some(&format[spec_start..end]);
                    }
                    break;
                }
                Some(&(pos, '{')) => return Err(FormatError::BraceInSpecifier(pos)),
                Some(_) => {
                    chars.next();
                }
                None => return Err(FormatError::UnclosedItem(open)),
            }
        }
    }

    match chars.next() {
        Some((_, '}')) => Ok(FormatItem {
            index,
            alignment,
            specifier,
        }),
        Some((position, ch)) => Err(FormatError::UnexpectedCharacter { ch, position }),
        None => Err(FormatError::UnclosedItem(open)),
    }
}

/// Consume ASCII digits, returning how many were read
fn take_digits(chars: &mut Peekable<CharIndices<'_>>) -> usize {
    let mut count = 0;
    while chars.next_if(|&(_, c)| c.is_ascii_digit()).is_some() {
        count += 1;
    }
    count
}

fn skip_spaces(chars: &mut Peekable<CharIndices<'_>>) {
    while chars.next_if(|&(_, c)| c == ' ').is_some() {}
}

/// Positive alignment right-justifies, negative left-justifies
fn push_aligned(out: &mut String, text: &str, alignment: i64) {
    let width = usize::try_from(alignment.unsigned_abs()).unwrap_or(usize::MAX);
    let padding = width.saturating_sub(text.chars().count());

    if alignment < 0 {
        out.push_str(text);
        out.extend(std::iter::repeat(' ').take(padding));
    } else {
        out.extend(std::iter::repeat(' ').take(padding));
        out.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_and_escapes() {
        assert_eq!(format_positional("no items", &["x"]).unwrap(), "no items");
        assert_eq!(format_positional("{{0}} = {0}", &["x"]).unwrap(), "{0} = x");
        assert_eq!(format_positional("}}", &[]).unwrap(), "}");
    }

    #[test]
    fn test_repeated_argument() {
        assert_eq!(format_positional("{0}-{0}", &["ab"]).unwrap(), "ab-ab");
    }

    #[test]
    fn test_alignment() {
        assert_eq!(format_positional("[{0,5}]", &["ab"]).unwrap(), "[   ab]");
        assert_eq!(format_positional("[{0,-5}]", &["ab"]).unwrap(), "[ab   ]");
        assert_eq!(format_positional("[{0 , -5 }]", &["ab"]).unwrap(), "[ab   ]");
        assert_eq!(format_positional("[{0,1}]", &["abc"]).unwrap(), "[abc]");
    }

    #[test]
    fn test_specifier_applied() {
        assert_eq!(format_positional("{0:D5}", &["42"]).unwrap(), "00042");
        assert_eq!(format_positional("{0,8:F1}", &["3.14159"]).unwrap(), "     3.1");
        assert_eq!(format_positional("{0:}", &["42"]).unwrap(), "42");
    }

    #[test]
    fn test_index_out_of_range() {
        assert_eq!(
            format_positional("{5}", &["42"]),
            Err(FormatError::IndexOutOfRange { index: 5, count: 1 })
        );
    }

    #[test]
    fn test_malformed_items() {
        assert_eq!(format_positional("{", &["x"]), Err(FormatError::InvalidIndex(1)));
        assert_eq!(format_positional("{0", &["x"]), Err(FormatError::UnclosedItem(0)));
        assert_eq!(format_positional("{x}", &["x"]), Err(FormatError::InvalidIndex(1)));
        assert_eq!(format_positional("a}b", &["x"]), Err(FormatError::UnexpectedClosingBrace(1)));
        assert_eq!(format_positional("{0,}", &["x"]), Err(FormatError::InvalidAlignment(2)));
        assert_eq!(
            format_positional("{0,5000000}", &["x"]),
            Err(FormatError::InvalidAlignment(2))
        );
        assert_eq!(format_positional("{0:a{b}", &["x"]), Err(FormatError::BraceInSpecifier(4)));
        assert_eq!(format_positional("{0:abc", &["x"]), Err(FormatError::UnclosedItem(0)));
        assert_eq!(
            format_positional("{0;}", &["x"]),
            Err(FormatError::UnexpectedCharacter { ch: ';', position: 2 })
        );
    }
}
