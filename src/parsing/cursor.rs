//! Whitespace-tolerant token scanner over a single DBC statement.

use alloc::borrow::Cow;
use alloc::string::String;
use core::str::FromStr;

pub(crate) type ScanResult<T> = core::result::Result<T, &'static str>;

pub(crate) struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    #[inline]
    pub(crate) fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    pub(crate) fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// True when only whitespace and an optional `;` remain.
    pub(crate) fn at_end(&mut self) -> bool {
        self.skip_ws();
        matches!(self.rest().trim_end(), "" | ";")
    }

    pub(crate) fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.rest().chars().next()
    }

    /// Consume `c` if it is the next non-blank character.
    pub(crate) fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, c: char, reason: &'static str) -> ScanResult<()> {
        if self.eat(c) { Ok(()) } else { Err(reason) }
    }

    /// A C-style identifier.
    pub(crate) fn ident(&mut self) -> Option<&'a str> {
        self.skip_ws();
        let rest = self.rest();
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if end == 0 {
            return None;
        }
        self.pos += end;
        Some(&rest[..end])
    }

    /// Consume the identifier `word` if it comes next.
    pub(crate) fn keyword(&mut self, word: &str) -> bool {
        let saved = self.pos;
        if self.ident() == Some(word) {
            true
        } else {
            self.pos = saved;
            false
        }
    }

    /// Characters up to whitespace or one of `delims`.
    pub(crate) fn token(&mut self, delims: &[char]) -> Option<&'a str> {
        self.skip_ws();
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || delims.contains(&c))
            .unwrap_or(rest.len());
        if end == 0 {
            return None;
        }
        self.pos += end;
        Some(&rest[..end])
    }

    /// Parse the next token as `T`.
    pub(crate) fn parse<T: FromStr>(
        &mut self,
        delims: &[char],
        reason: &'static str,
    ) -> ScanResult<T> {
        self.token(delims)
            .and_then(|tok| tok.parse().ok())
            .ok_or(reason)
    }

    /// A decimal real, rejecting NaN and infinities.
    pub(crate) fn real(&mut self, delims: &[char], reason: &'static str) -> ScanResult<f64> {
        let value: f64 = self.parse(delims, reason)?;
        if value.is_finite() { Ok(value) } else { Err(reason) }
    }

    /// A double-quoted string. `\"` and `\\` escapes are resolved.
    pub(crate) fn quoted(&mut self) -> ScanResult<Cow<'a, str>> {
        if !self.eat('"') {
            return Err("expected '\"'");
        }
        let rest = self.rest();
        let mut escaped = false;
        let mut has_escapes = false;
        for (i, c) in rest.char_indices() {
            match c {
                _ if escaped => escaped = false,
                '\\' => {
                    escaped = true;
                    has_escapes = true;
                }
                '"' => {
                    self.pos += i + 1;
                    let body = &rest[..i];
                    return Ok(if has_escapes {
                        Cow::Owned(unescape(body))
                    } else {
                        Cow::Borrowed(body)
                    });
                }
                _ => {}
            }
        }
        Err("unterminated string")
    }
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next @ ('"' | '\\')) => out.push(next),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Number of unescaped `"` characters in `text`.
pub(crate) fn quote_count(text: &str) -> usize {
    let mut escaped = false;
    let mut count = 0;
    for c in text.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => count += 1,
            _ => {}
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_and_punctuation() {
        let mut cur = Cursor::new(" 12|8@1+ (0.5 , -40)");
        assert_eq!(cur.parse::<u16>(&['|'], "start"), Ok(12));
        assert!(cur.eat('|'));
        assert_eq!(cur.parse::<u16>(&['@'], "len"), Ok(8));
        assert!(cur.eat('@'));
        assert_eq!(cur.rest(), "1+ (0.5 , -40)");
        cur.pos += 2;
        cur.expect('(', "paren").unwrap();
        assert_eq!(cur.real(&[','], "scale"), Ok(0.5));
        cur.expect(',', "comma").unwrap();
        assert_eq!(cur.real(&[')'], "offset"), Ok(-40.0));
        cur.expect(')', "paren").unwrap();
        assert!(cur.at_end());
    }

    #[test]
    fn test_real_rejects_nan() {
        let mut cur = Cursor::new("NaN");
        assert_eq!(cur.real(&[], "bad"), Err("bad"));
        let mut cur = Cursor::new("1e-3");
        assert_eq!(cur.real(&[], "bad"), Ok(0.001));
    }

    #[test]
    fn test_keyword_does_not_match_prefix() {
        let mut cur = Cursor::new("BA_DEF_ \"x\"");
        assert!(!cur.keyword("BA_"));
        assert!(cur.keyword("BA_DEF_"));
    }

    #[test]
    fn test_quoted() {
        let mut cur = Cursor::new(r#" "km/h" ECU"#);
        assert_eq!(cur.quoted().unwrap(), "km/h");
        assert_eq!(cur.ident(), Some("ECU"));

        let mut cur = Cursor::new(r#""say \"hi\"";"#);
        assert_eq!(cur.quoted().unwrap(), "say \"hi\"");
        assert!(cur.at_end());

        let mut cur = Cursor::new(r#""open"#);
        assert!(cur.quoted().is_err());
    }

    #[test]
    fn test_quote_count() {
        assert_eq!(quote_count(r#"CM_ BO_ 1 "a"#), 1);
        assert_eq!(quote_count(r#"CM_ BO_ 1 "a \" b";"#), 2);
    }
}
