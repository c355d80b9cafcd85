//! Support for gettext PO catalogs.
//!
//! Provides parsing into [`File`], header extraction, plural selector
//! resolution and serialization back to PO text.

use std::{
    collections::HashMap,
    fs,
    io::{BufRead, Cursor, Write},
    path::Path,
};

use encoding_rs::Encoding;
use lazy_static::lazy_static;
use regex::bytes::Regex;

use crate::{
    error::Error,
    header::Header,
    options::{ParseOptions, WriteOptions},
    plural_rules::PluralSelector,
    scanner::{Scanner, TokenSep},
    traits::Parser,
    types::{Comment, Message, compound_key},
    writer,
};

lazy_static! {
    static ref CHARSET_REGEX: Regex =
        Regex::new(r"(?i)Content-Type:[^\n]*?charset=([A-Za-z0-9_.:\-]+)").unwrap();
    static ref HEADER_MSGID_REGEX: Regex = Regex::new(r#"(?m)^msgid[ \t]+""[ \t]*\r?$"#).unwrap();
}

/// A parsed PO catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    /// Fields of the header message (`msgid ""`).
    pub header: Header,
    /// Comments attached to the header message, e.g. `#, fuzzy`.
    pub header_comment: Comment,
    /// Selector resolved from `Plural-Forms`, or from the language.
    pub pluralize: PluralSelector,

    messages: Vec<Message>,
    /// Compound key → position in `messages`.
    by_id: HashMap<String, usize>,
}

impl File {
    /// Builds a catalog from parts, indexing `messages` by compound key.
    pub fn new(
        header: Header,
        header_comment: Comment,
        messages: Vec<Message>,
        pluralize: PluralSelector,
    ) -> Self {
        // Later duplicates overwrite earlier ones.
        let by_id = messages
            .iter()
            .enumerate()
            .map(|(i, m)| (m.compound_key(), i))
            .collect();
        File {
            header,
            header_comment,
            pluralize,
            messages,
            by_id,
        }
    }

    /// Parses a catalog from a reader with explicit options.
    pub fn parse_with<R: BufRead>(reader: R, options: &ParseOptions) -> Result<Self, Error> {
        let mut messages = Vec::new();
        let mut scan = Scanner::new(reader);

        while scan.next_message()? {
            let start = scan.block_start();
            // NOTE: the order of these calls is the PO field order.
            let comment = Comment {
                translator_comments: scan.comment_lines("# "),
                extracted_comments: scan.comment_lines("#."),
                references: scan.comment_tokens("#:", TokenSep::Whitespace),
                flags: scan.comment_tokens("#,", TokenSep::Comma),
                prev_ctxt: scan.previous("#| msgctxt")?,
                prev_id: scan.previous("#| msgid")?,
                prev_id_plural: scan.previous("#| msgid_plural")?,
            };
            let ctxt = scan.keyword("msgctxt")?.unwrap_or_default();
            let id = scan
                .keyword("msgid")?
                .ok_or_else(|| Error::catalog_error(start, "message without msgid"))?;
            let id_plural = scan.keyword("msgid_plural")?.unwrap_or_default();
            let str = scan.translations()?;
            scan.finish()?;

            messages.push(Message {
                comment,
                ctxt,
                id,
                id_plural,
                str,
                obsolete: scan.is_obsolete(),
            });
        }

        if messages.is_empty() {
            return Err(Error::MalformedCatalog(
                "catalog contains no messages".to_string(),
            ));
        }

        let mut header = Header::new();
        let mut header_comment = Comment::default();
        let first = &messages[0];
        if first.id.is_empty() && first.str.len() == 1 && !first.obsolete {
            let message = messages.remove(0);
            header = Header::parse(&message.str[0])?;
            header_comment = message.comment;
            tracing::debug!(fields = header.len(), "extracted catalog header");
        }

        let pluralize = resolve_plural_selector(&header, options)?;
        check_plural_counts(&messages, &pluralize, options.strict)?;

        tracing::debug!(
            messages = messages.len(),
            nplurals = pluralize.nplurals(),
            "parsed catalog"
        );
        Ok(File::new(header, header_comment, messages, pluralize))
    }

    /// Serializes the catalog with explicit options.
    pub fn write_with<W: Write>(&self, writer: W, options: &WriteOptions) -> Result<(), Error> {
        writer::write_file(self, writer, options)
    }

    /// All real messages in catalog order; the header message is not included.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Takes the messages out of the catalog, e.g. to edit them and build a
    /// new [`File`].
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    /// Looks up a message by `msgid` and optional `msgid_plural`.
    pub fn find(&self, id: &str, id_plural: &str) -> Option<&Message> {
        self.by_id
            .get(&compound_key(id, id_plural))
            .and_then(|&i| self.messages.get(i))
    }

    /// Language declared in the header, if any.
    pub fn language(&self) -> Option<&str> {
        self.header.get("Language").filter(|l| !l.is_empty())
    }
}

impl Parser for File {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        File::parse_with(reader, &ParseOptions::default())
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        self.write_with(writer, &WriteOptions::default())
    }

    /// Decodes by byte order mark, else by the header's declared charset,
    /// else as UTF-8.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let encoding = Encoding::for_bom(bytes)
            .map(|(encoding, _)| encoding)
            .or_else(|| declared_charset(bytes))
            .unwrap_or(encoding_rs::UTF_8);
        let (text, used, had_errors) = encoding.decode(bytes);
        if had_errors {
            return Err(Error::MalformedCatalog(format!(
                "input is not valid {}",
                used.name()
            )));
        }
        Self::from_reader(Cursor::new(text.as_bytes()))
    }

    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let bytes = fs::read(path).map_err(Error::Io)?;
        Self::from_bytes(&bytes)
    }
}

/// Charset named in the header message. Only the first block is searched,
/// and only when it is the header (`msgid ""`).
fn declared_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let block = first_block(bytes);
    if !HEADER_MSGID_REGEX.is_match(block) {
        return None;
    }
    let caps = CHARSET_REGEX.captures(block)?;
    let encoding = Encoding::for_label(&caps[1]);
    if encoding.is_none() {
        tracing::warn!(
            charset = %String::from_utf8_lossy(&caps[1]),
            "unknown charset, decoding as UTF-8"
        );
    }
    encoding
}

/// Bytes up to the first blank line that follows content.
fn first_block(bytes: &[u8]) -> &[u8] {
    let mut seen_content = false;
    let mut offset = 0;
    for line in bytes.split_inclusive(|&b| b == b'\n') {
        let blank = line.iter().all(u8::is_ascii_whitespace);
        if blank && seen_content {
            break;
        }
        seen_content |= !blank;
        offset += line.len();
    }
    &bytes[..offset]
}

fn resolve_plural_selector(header: &Header, options: &ParseOptions) -> Result<PluralSelector, Error> {
    if let Some(forms) = header.get("Plural-Forms").filter(|f| !f.trim().is_empty()) {
        let selector = PluralSelector::compile(forms).map_err(|e| Error::UnrecognizedPluralForm {
            value: forms.to_string(),
            source: Box::new(e),
        })?;
        tracing::debug!(plural_forms = forms, "using header plural selector");
        return Ok(selector);
    }

    let language = header
        .get("Language")
        .filter(|l| !l.trim().is_empty())
        .or(options.language_hint.as_deref())
        .unwrap_or_default();
    tracing::debug!(language, "using language plural selector");
    Ok(PluralSelector::for_language(language))
}

fn check_plural_counts(
    messages: &[Message],
    pluralize: &PluralSelector,
    strict: bool,
) -> Result<(), Error> {
    let expected = pluralize.nplurals();
    for message in messages.iter().filter(|m| m.is_plural() && !m.obsolete) {
        if message.str.len() == expected {
            continue;
        }
        if strict {
            return Err(Error::validation_error(format!(
                "message `{}` has {} plural translations, catalog expects {}",
                message.id,
                message.str.len(),
                expected
            )));
        }
        tracing::warn!(
            msgid = %message.id,
            found = message.str.len(),
            expected,
            "plural translation count does not match nplurals"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_parse_basic_catalog_with_header() {
        let content = indoc! {r#"
            # Translation of demo.
            #, fuzzy
            msgid ""
            msgstr ""
            "Plural-Forms: nplurals=2; plural=(n != 1);\n"
            "Language: en\n"

            #. greeting shown at startup
            #: src/main.rs:10
            msgid "Hello"
            msgstr "Hi"
        "#};
        let file = File::from_str(content).unwrap();
        assert_eq!(file.messages().len(), 1);
        assert_eq!(file.header.len(), 2);
        assert_eq!(file.language(), Some("en"));
        assert_eq!(file.header_comment.translator_comments, vec!["Translation of demo."]);
        assert_eq!(file.header_comment.flags, vec!["fuzzy"]);

        let hello = &file.messages()[0];
        assert_eq!(hello.comment.extracted_comments, vec!["greeting shown at startup"]);
        assert_eq!(hello.comment.references, vec!["src/main.rs:10"]);
        assert_eq!(hello.str, vec!["Hi"]);
        assert_eq!(file.find("Hello", ""), Some(hello));
        assert_eq!(file.find("", ""), None);
    }

    #[test]
    fn test_catalog_without_header() {
        let file = File::from_str("msgid \"a\"\nmsgstr \"b\"\n").unwrap();
        assert!(file.header.is_empty());
        assert_eq!(file.messages().len(), 1);
        assert_eq!(file.pluralize, PluralSelector::english());
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(matches!(File::from_str(""), Err(Error::MalformedCatalog(_))));
        assert!(matches!(File::from_str("\n\n  \n"), Err(Error::MalformedCatalog(_))));
    }

    #[test]
    fn test_header_only_catalog() {
        let file = File::from_str("msgid \"\"\nmsgstr \"Language: pl\\n\"\n").unwrap();
        assert!(file.messages().is_empty());
        assert_eq!(file.pluralize.nplurals(), 3);
    }

    #[test]
    fn test_bad_plural_forms_header_is_fatal() {
        let err = File::from_str("msgid \"\"\nmsgstr \"Plural-Forms: nplurals=2; plural=n/0;\\n\"\n")
            .unwrap_err();
        assert!(matches!(err, Error::UnrecognizedPluralForm { .. }));
    }

    #[test]
    fn test_bad_header_line_is_fatal() {
        let err = File::from_str("msgid \"\"\nmsgstr \"not a header\\n\"\n").unwrap_err();
        assert!(matches!(err, Error::HeaderParse(_)));
    }

    #[test]
    fn test_language_hint_applies_without_header() {
        let options = ParseOptions::new().with_language_hint(Some("ja".to_string()));
        let file = File::parse_with(Cursor::new("msgid \"a\"\nmsgstr \"b\"\n"), &options).unwrap();
        assert_eq!(file.pluralize.nplurals(), 1);
    }

    #[test]
    fn test_header_language_beats_hint() {
        let options = ParseOptions::new().with_language_hint(Some("ja".to_string()));
        let input = "msgid \"\"\nmsgstr \"Language: ru\\n\"\n";
        let file = File::parse_with(Cursor::new(input), &options).unwrap();
        assert_eq!(file.pluralize.nplurals(), 3);
    }

    #[test]
    fn test_missing_msgid_is_rejected() {
        let err = File::from_str("# comment only\nmsgstr \"x\"\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_strict_mode_checks_plural_counts() {
        let input = indoc! {r#"
            msgid ""
            msgstr "Plural-Forms: nplurals=3; plural=(n==1 ? 0 : n==2 ? 1 : 2);\n"

            msgid "file"
            msgid_plural "files"
            msgstr[0] "a"
            msgstr[1] "b"
        "#};
        assert!(File::from_str(input).is_ok());
        let strict = ParseOptions::new().with_strict(true);
        assert!(matches!(
            File::parse_with(Cursor::new(input), &strict),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_obsolete_messages_are_kept() {
        let input = indoc! {r#"
            msgid "live"
            msgstr "lebendig"

            #~ msgid "gone"
            #~ msgstr "weg"
        "#};
        let file = File::from_str(input).unwrap();
        assert_eq!(file.messages().len(), 2);
        assert!(file.messages()[1].obsolete);
        assert_eq!(file.messages()[1].str, vec!["weg"]);
    }

    #[test]
    fn test_edited_messages_are_reindexed() {
        let file = File::from_str("msgid \"a\"\nmsgstr \"b\"\n\nmsgid \"c\"\nmsgstr \"d\"\n").unwrap();
        let (header, header_comment, pluralize) =
            (file.header.clone(), file.header_comment.clone(), file.pluralize.clone());

        let mut messages = file.into_messages();
        messages.remove(0);
        let edited = File::new(header, header_comment, messages, pluralize);
        assert_eq!(edited.find("a", ""), None);
        assert_eq!(edited.get_text("a", &[]), "a");
        assert_eq!(edited.find("c", "").map(|m| m.str.clone()), Some(vec!["d".to_string()]));
    }

    #[test]
    fn test_obsolete_fuzzy_entry_with_previous_msgid() {
        let input = indoc! {r#"
            #, fuzzy
            #~| msgid "old"
            #~ msgid "new"
            #~ msgstr "neu"
        "#};
        let file = File::from_str(input).unwrap();
        let message = &file.messages()[0];
        assert!(message.obsolete);
        assert!(message.is_fuzzy());
        assert_eq!(message.comment.prev_id, "old");
        assert_eq!(message.id, "new");

        let written = String::from_utf8(file.to_bytes().unwrap()).unwrap();
        assert!(written.contains("#~| msgid \"old\"\n"));
        assert_eq!(File::from_str(&written).unwrap(), file);
    }

    #[test]
    fn test_from_bytes_uses_declared_charset() {
        let mut bytes = b"msgid \"\"\nmsgstr \"Content-Type: text/plain; charset=ISO-8859-1\\n\"\n\nmsgid \"cafe\"\nmsgstr \"caf".to_vec();
        bytes.push(0xe9);
        bytes.extend_from_slice(b"\"\n");
        let file = File::from_bytes(&bytes).unwrap();
        assert_eq!(file.messages()[0].str, vec!["café"]);
    }

    #[test]
    fn test_charset_outside_header_is_ignored() {
        let input = indoc! {r#"
            msgid "note"
            msgstr "Content-Type: text/plain; charset=ISO-8859-1"

            msgid "cafe"
            msgstr "café"
        "#};
        let file = File::from_bytes(input.as_bytes()).unwrap();
        assert_eq!(file.messages()[1].str, vec!["café"]);
    }

    #[test]
    fn test_first_block_stops_at_blank_line() {
        assert_eq!(first_block(b"\n\nmsgid \"\"\nmsgstr \"\"\n\nmsgid \"a\"\n"), b"\n\nmsgid \"\"\nmsgstr \"\"\n");
        assert_eq!(first_block(b"msgid \"a\""), b"msgid \"a\"");
        assert_eq!(first_block(b""), b"");
    }

    #[test]
    fn test_from_bytes_rejects_invalid_utf8() {
        let mut bytes = b"msgid \"x\"\nmsgstr \"".to_vec();
        bytes.push(0xff);
        bytes.extend_from_slice(b"\"\n");
        assert!(matches!(
            File::from_bytes(&bytes),
            Err(Error::MalformedCatalog(_))
        ));
    }
}
