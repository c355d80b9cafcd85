//! Quoted-string escape codec shared by the scanner and the writer.
//!
//! A PO quoted segment is a double-quoted, C-escaped string on a single line.
//! Long or multi-line values are written as several consecutive segments,
//! each quoted on its own.

use crate::error::Error;

/// Decodes one quoted segment, e.g. `"Hello\n"`, into its raw text.
///
/// The segment must start with `"` and end with an unescaped `"`; only
/// whitespace may follow the closing quote.
pub fn decode(segment: &str) -> Result<String, Error> {
    let segment = segment.trim();
    let Some(body) = segment.strip_prefix('"') else {
        return Err(Error::MalformedCatalog(format!(
            "expected quoted string, found `{}`",
            segment
        )));
    };

    let bytes = body.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    let mut closed = false;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                if !body[i + 1..].trim().is_empty() {
                    return Err(Error::MalformedCatalog(format!(
                        "unexpected text after closing quote: `{}`",
                        &body[i + 1..]
                    )));
                }
                closed = true;
                break;
            }
            b'\\' => {
                i += 1;
                let Some(&c) = bytes.get(i) else {
                    return Err(Error::MalformedEscape(
                        "trailing backslash in quoted string".to_string(),
                    ));
                };
                match c {
                    b'n' => out.push(b'\n'),
                    b't' => out.push(b'\t'),
                    b'r' => out.push(b'\r'),
                    b'a' => out.push(0x07),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0c),
                    b'v' => out.push(0x0b),
                    b'\\' | b'"' | b'\'' | b'?' => out.push(c),
                    b'x' => {
                        let digits = take_digits(&bytes[i + 1..], 2, |b| b.is_ascii_hexdigit());
                        if digits.is_empty() {
                            return Err(Error::MalformedEscape(
                                "`\\x` without hex digits".to_string(),
                            ));
                        }
                        out.push(parse_radix(digits, 16)?);
                        i += digits.len();
                    }
                    b'0'..=b'7' => {
                        let digits = take_digits(&bytes[i..], 3, |b| (b'0'..=b'7').contains(&b));
                        out.push(parse_radix(digits, 8)?);
                        i += digits.len() - 1;
                    }
                    other => {
                        return Err(Error::MalformedEscape(format!(
                            "unknown escape `\\{}`",
                            other as char
                        )));
                    }
                }
            }
            b => out.push(b),
        }
        i += 1;
    }

    if !closed {
        return Err(Error::MalformedCatalog(format!(
            "unterminated quoted string `{}`",
            segment
        )));
    }

    String::from_utf8(out)
        .map_err(|_| Error::MalformedEscape("escaped bytes are not valid UTF-8".to_string()))
}

/// Encodes raw text as a single quoted segment.
///
/// Newlines are always escaped, so the result never spans lines.
pub fn encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\u{0b}' => out.push_str("\\v"),
            c if c.is_ascii_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn take_digits(bytes: &[u8], max: usize, accept: impl Fn(u8) -> bool) -> &[u8] {
    let len = bytes.iter().take(max).take_while(|&&b| accept(b)).count();
    &bytes[..len]
}

fn parse_radix(digits: &[u8], radix: u32) -> Result<u8, Error> {
    // Digits were pre-filtered, so only the range check can fail here.
    let text = std::str::from_utf8(digits).unwrap_or_default();
    u8::from_str_radix(text, radix)
        .map_err(|_| Error::MalformedEscape(format!("escape value `{}` out of range", text)))
}
