//! Placeholder token scanner
//!
//! A token is `[`, a key of one or more non-bracket characters, an optional
//! `:` plus a format of one or more non-bracket characters, then `]`. Both
//! parts match lazily, so the key ends at the first `:` (after its first
//! character) that still leaves a non-empty format.

use super::types::Token;

/// Iterate over the placeholder tokens of a template, left to right
pub fn scan(template: &str) -> Tokens<'_> {
    Tokens { template, pos: 0 }
}

/// Iterator returned by [`scan`]
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    template: &'a str,
    pos: usize,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        while self.pos < self.template.len() {
            let start = self.pos + self.template[self.pos..].find('[')?;
            let body_start = start + 1;

            let Some(offset) = self.template[body_start..].find(['[', ']']) else {
                self.pos = self.template.len();
                return None;
            };
            let bracket = body_start + offset;

            // An empty body or a nested '[' restarts the scan at that bracket
            if offset == 0 || self.template.as_bytes()[bracket] == b'[' {
                self.pos = bracket;
                continue;
            }

            let end = bracket + 1;
            self.pos = end;
            let (key, format) = split_body(&self.template[body_start..bracket]);

            return Some(Token {
                text: &self.template[start..end],
                key,
                format,
                start,
                end,
            });
        }

        None
    }
}

fn split_body(body: &str) -> (&str, Option<&str>) {
    let first = body.chars().next().map_or(0, char::len_utf8);

    match body[first..].find(':') {
        Some(i) if first + i + 1 < body.len() => {
            let colon = first + i;
            (&body[..colon], Some(&body[colon + 1..]))
        }
        _ => (body, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(template: &str) -> Vec<(&str, Option<&str>)> {
        scan(template).map(|t| (t.key, t.format)).collect()
    }

    #[test]
    fn test_scan_simple_tokens() {
        assert_eq!(
            keys("[Level]: [RenderedMessage]"),
            vec![("Level", None), ("RenderedMessage", None)]
        );
    }

    #[test]
    fn test_scan_no_tokens() {
        assert!(keys("plain text").is_empty());
        assert!(keys("").is_empty());
        assert!(keys("[] and ]reversed[").is_empty());
    }

    #[test]
    fn test_scan_format_split() {
        assert_eq!(keys("[Count:{0:D5}]"), vec![("Count", Some("{0:D5}"))]);
        assert_eq!(keys("[a:b:c]"), vec![("a", Some("b:c"))]);
        assert_eq!(keys("[a::]"), vec![("a", Some(":"))]);
    }

    #[test]
    fn test_scan_colon_edge_cases() {
        // Trailing colon leaves no format, so it stays part of the key
        assert_eq!(keys("[a:]"), vec![("a:", None)]);
        // Key needs at least one character before the separator
        assert_eq!(keys("[:x]"), vec![(":x", None)]);
        assert_eq!(keys("[::x]"), vec![(":", Some("x"))]);
    }

    #[test]
    fn test_scan_nested_brackets() {
        assert_eq!(keys("[[Level]]"), vec![("Level", None)]);
        assert_eq!(keys("[a[b]"), vec![("b", None)]);
        assert_eq!(keys("[link]([BaseUrl]/x)"), vec![("link", None), ("BaseUrl", None)]);
    }

    #[test]
    fn test_scan_offsets() {
        let template = "id=[Id] ok";
        let token = scan(template).next().unwrap();

        assert_eq!(token.text, "[Id]");
        assert_eq!(&template[token.start..token.end], "[Id]");
    }

    #[test]
    fn test_scan_multibyte_key() {
        assert_eq!(keys("[é:x] [日本]"), vec![("é", Some("x")), ("日本", None)]);
    }
}
