//! Line scanner for PO input.
//!
//! The scanner splits the input into message blocks (runs of non-blank
//! lines) and hands out the fields of the current block through ordered
//! accessors. Each accessor consumes only the lines matching its prefix at
//! the cursor, so callers must ask for fields in PO field order.

use std::io::BufRead;

use crate::{error::Error, escape};

/// Separator used to split `#:` and `#,` comment lines into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSep {
    Whitespace,
    Comma,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    number: usize,
    text: String,
}

pub struct Scanner<R> {
    reader: R,
    line_number: usize,
    lines: Vec<Line>,
    pos: usize,
    obsolete: bool,
}

impl<R: BufRead> Scanner<R> {
    pub fn new(reader: R) -> Self {
        Scanner {
            reader,
            line_number: 0,
            lines: Vec::new(),
            pos: 0,
            obsolete: false,
        }
    }

    /// Advances to the next message block. Returns `Ok(false)` at end of input.
    pub fn next_message(&mut self) -> Result<bool, Error> {
        self.lines.clear();
        self.pos = 0;
        self.obsolete = false;

        while let Some(line) = self.read_line()? {
            if line.text.trim().is_empty() {
                if self.lines.is_empty() {
                    continue;
                }
                break;
            }
            self.lines.push(line);
        }

        if self.lines.is_empty() {
            return Ok(false);
        }

        for line in &mut self.lines {
            if let Some(rest) = line.text.strip_prefix("#~") {
                // `#~|` carries a previous value of an obsolete entry.
                line.text = match rest.strip_prefix('|') {
                    Some(previous) => format!("#|{}", previous),
                    None => rest.strip_prefix(' ').unwrap_or(rest).to_string(),
                };
                self.obsolete = true;
            }
        }
        Ok(true)
    }

    /// Line number of the first line in the current block.
    pub fn block_start(&self) -> usize {
        self.lines.first().map(|l| l.number).unwrap_or(self.line_number)
    }

    /// Whether the current block was commented out with `#~`.
    pub fn is_obsolete(&self) -> bool {
        self.obsolete
    }

    /// Collects consecutive comment lines with `prefix`, stripping the prefix
    /// and one following space.
    ///
    /// A prefix ending in a space (the translator comment `"# "`) also
    /// matches a bare line without it, e.g. a lone `#`.
    pub fn comment_lines(&mut self, prefix: &str) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(rest) = self.peek().and_then(|text| strip_comment(text, prefix)) {
            out.push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
            self.pos += 1;
        }
        out
    }

    /// Collects consecutive comment lines with `prefix` and splits them into
    /// one flat token list.
    pub fn comment_tokens(&mut self, prefix: &str, sep: TokenSep) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(rest) = self.peek().and_then(|text| text.strip_prefix(prefix)) {
            match sep {
                TokenSep::Whitespace => out.extend(rest.split_whitespace().map(str::to_string)),
                TokenSep::Comma => out.extend(
                    rest.split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string),
                ),
            }
            self.pos += 1;
        }
        out
    }

    /// Reads an optional previous-value comment such as `#| msgid "..."`,
    /// including any `#| "..."` continuation lines. Empty if absent.
    pub fn previous(&mut self, prefix: &str) -> Result<String, Error> {
        let Some(first) = self.take_keyword(prefix) else {
            return Ok(String::new());
        };
        let mut value = self.decode_at(&first)?;
        while let Some(line) = self.peek_line() {
            let Some(rest) = line.text.strip_prefix("#|") else {
                break;
            };
            if !rest.trim_start().starts_with('"') {
                break;
            }
            value.push_str(&escape::decode(rest).map_err(|e| e.at_line(line.number))?);
            self.pos += 1;
        }
        Ok(value)
    }

    /// Reads `keyword "..."` plus bare `"..."` continuation lines.
    ///
    /// Returns `None` if the next line does not start with `keyword`.
    pub fn keyword(&mut self, keyword: &str) -> Result<Option<String>, Error> {
        let Some(first) = self.take_keyword(keyword) else {
            return Ok(None);
        };
        let mut value = self.decode_at(&first)?;
        value.push_str(&self.continuations()?);
        Ok(Some(value))
    }

    /// Reads the translations: a single `msgstr`, or `msgstr[0]`, `msgstr[1]`, …
    /// with contiguous indices.
    pub fn translations(&mut self) -> Result<Vec<String>, Error> {
        if let Some(value) = self.keyword("msgstr")? {
            return Ok(vec![value]);
        }

        let mut out = Vec::new();
        while let Some(line) = self.peek_line() {
            let Some(rest) = line.text.strip_prefix("msgstr[") else {
                break;
            };
            let number = line.number;
            let (index, quoted) = rest.split_once(']').ok_or_else(|| {
                Error::catalog_error(number, "unterminated `msgstr[` index")
            })?;
            let index: usize = index.trim().parse().map_err(|_| {
                Error::catalog_error(number, format!("invalid msgstr index `{}`", index))
            })?;
            if index != out.len() {
                return Err(Error::catalog_error(
                    number,
                    format!("expected msgstr[{}], found msgstr[{}]", out.len(), index),
                ));
            }
            let mut value = escape::decode(quoted).map_err(|e| e.at_line(number))?;
            self.pos += 1;
            value.push_str(&self.continuations()?);
            out.push(value);
        }

        if out.is_empty() {
            let line = self.peek_line().map(|l| l.number).unwrap_or(self.block_start());
            return Err(Error::catalog_error(line, "missing msgstr"));
        }
        Ok(out)
    }

    /// Fails if any line of the current block was not consumed.
    pub fn finish(&self) -> Result<(), Error> {
        match self.peek_line() {
            Some(line) => Err(Error::catalog_error(
                line.number,
                format!("unexpected line `{}`", line.text),
            )),
            None => Ok(()),
        }
    }

    fn continuations(&mut self) -> Result<String, Error> {
        let mut value = String::new();
        while let Some(line) = self.peek_line() {
            if !line.text.trim_start().starts_with('"') {
                break;
            }
            value.push_str(&escape::decode(&line.text).map_err(|e| e.at_line(line.number))?);
            self.pos += 1;
        }
        Ok(value)
    }

    /// Consumes the next line if it is `keyword` followed by whitespace, and
    /// returns it with the keyword removed.
    fn take_keyword(&mut self, keyword: &str) -> Option<Line> {
        let line = self.peek_line()?;
        let rest = line.text.strip_prefix(keyword)?;
        if !rest.starts_with([' ', '\t']) {
            return None;
        }
        let taken = Line {
            number: line.number,
            text: rest.to_string(),
        };
        self.pos += 1;
        Some(taken)
    }

    fn decode_at(&self, line: &Line) -> Result<String, Error> {
        escape::decode(&line.text).map_err(|e| e.at_line(line.number))
    }

    fn peek_line(&self) -> Option<&Line> {
        self.lines.get(self.pos)
    }

    fn peek(&self) -> Option<&str> {
        self.peek_line().map(|l| l.text.as_str())
    }

    fn read_line(&mut self) -> Result<Option<Line>, Error> {
        let mut text = String::new();
        if self.reader.read_line(&mut text)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        if text.ends_with('\n') {
            text.pop();
            if text.ends_with('\r') {
                text.pop();
            }
        }
        if self.line_number == 1 {
            if let Some(rest) = text.strip_prefix('\u{feff}') {
                text = rest.to_string();
            }
        }

        Ok(Some(Line {
            number: self.line_number,
            text,
        }))
    }
}

fn strip_comment<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if let Some(rest) = text.strip_prefix(prefix) {
        return Some(rest);
    }
    match prefix.strip_suffix(' ') {
        Some(bare) if text == bare => Some(""),
        _ => None,
    }
}
