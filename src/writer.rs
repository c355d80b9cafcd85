//! Serialization of catalogs back to PO syntax.

use std::io::Write;

use crate::{
    error::Error,
    escape,
    header::Header,
    options::WriteOptions,
    po::File,
    types::{Comment, Message},
};

/// Writes `file` to `writer`: the header message (if any), then every message,
/// each followed by a blank line.
pub fn write_file<W: Write>(file: &File, mut writer: W, options: &WriteOptions) -> Result<(), Error> {
    let mut out = RecordWriter::new(options);
    if needs_header_block(file) {
        out.header(&file.header, &file.header_comment);
        out.newline();
    }
    for message in file.messages() {
        out.message(message);
        out.newline();
    }
    writer.write_all(out.finish().as_bytes()).map_err(Error::Io)
}

/// The header block is written whenever dropping it would change what a
/// reader sees: header fields or comments exist, the catalog would otherwise
/// be empty, or the first message would be taken for the header.
fn needs_header_block(file: &File) -> bool {
    let first_looks_like_header = file
        .messages()
        .first()
        .is_some_and(|m| m.id.is_empty() && !m.is_plural() && !m.obsolete);
    !file.header.is_empty()
        || !file.header_comment.is_empty()
        || file.messages().is_empty()
        || first_looks_like_header
}

/// Accumulates PO text for records; the I/O happens once in [`write_file`].
pub(crate) struct RecordWriter {
    content: String,
    wrap_width: Option<usize>,
}

impl RecordWriter {
    pub(crate) fn new(options: &WriteOptions) -> Self {
        RecordWriter {
            content: String::new(),
            wrap_width: options.wrap_width,
        }
    }

    pub(crate) fn finish(self) -> String {
        self.content
    }

    pub(crate) fn newline(&mut self) {
        self.content.push('\n');
    }

    pub(crate) fn header(&mut self, header: &Header, comment: &Comment) {
        self.comment(comment, "#| ");
        self.quoted("", "msgid", "");
        self.quoted("", "msgstr", &header.render());
    }

    pub(crate) fn message(&mut self, message: &Message) {
        let (prefix, previous) = if message.obsolete {
            ("#~ ", "#~| ")
        } else {
            ("", "#| ")
        };
        self.comment(&message.comment, previous);

        if !message.ctxt.is_empty() {
            self.quoted(prefix, "msgctxt", &message.ctxt);
        }
        self.quoted(prefix, "msgid", &message.id);
        if message.is_plural() {
            self.quoted(prefix, "msgid_plural", &message.id_plural);
            if message.str.is_empty() {
                self.quoted(prefix, "msgstr[0]", "");
            }
            for (i, translation) in message.str.iter().enumerate() {
                self.quoted(prefix, &format!("msgstr[{}]", i), translation);
            }
        } else {
            let translation = message.str.first().map(String::as_str).unwrap_or_default();
            self.quoted(prefix, "msgstr", translation);
        }
    }

    /// Writes comment lines; `previous` prefixes the `#|` fields.
    pub(crate) fn comment(&mut self, comment: &Comment, previous: &str) {
        // Two spaces after `#` on translator comments; the reader strips one extra.
        for line in &comment.translator_comments {
            self.line(&format!("#  {}", line));
        }
        for line in &comment.extracted_comments {
            self.line(&format!("#. {}", line));
        }
        if !comment.references.is_empty() {
            self.line(&format!("#: {}", comment.references.join(" ")));
        }
        if !comment.flags.is_empty() {
            self.line(&format!("#, {}", comment.flags.join(", ")));
        }
        if !comment.prev_ctxt.is_empty() {
            self.quoted(previous, "msgctxt", &comment.prev_ctxt);
        }
        if !comment.prev_id.is_empty() {
            self.quoted(previous, "msgid", &comment.prev_id);
        }
        if !comment.prev_id_plural.is_empty() {
            self.quoted(previous, "msgid_plural", &comment.prev_id_plural);
        }
    }

    /// Writes `keyword "value"` on one line when it fits, otherwise as
    /// `keyword ""` followed by one quoted segment per line.
    fn quoted(&mut self, prefix: &str, keyword: &str, value: &str) {
        let single = format!("{}{} {}", prefix, keyword, escape::encode(value));
        let pieces: Vec<&str> = value.split_inclusive('\n').collect();
        if pieces.len() <= 1 && self.fits(&single) {
            self.line(&single);
            return;
        }

        self.line(&format!("{}{} \"\"", prefix, keyword));
        let budget = self.wrap_width.map(|w| w.saturating_sub(prefix.len() + 2));
        for piece in pieces {
            for chunk in wrap_segment(piece, budget) {
                self.line(&format!("{}{}", prefix, escape::encode(chunk)));
            }
        }
    }

    fn fits(&self, line: &str) -> bool {
        self.wrap_width
            .is_none_or(|width| line.chars().count() <= width)
    }

    fn line(&mut self, text: &str) {
        self.content.push_str(text);
        self.content.push('\n');
    }
}

/// Splits `piece` after spaces so each chunk's escaped form stays within
/// `budget` characters where possible. Words longer than the budget stay whole.
fn wrap_segment(piece: &str, budget: Option<usize>) -> Vec<&str> {
    let Some(budget) = budget.filter(|&b| b > 0) else {
        return vec![piece];
    };

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut width = 0;
    let mut offset = 0;
    for word in piece.split_inclusive(' ') {
        let word_width = escaped_width(word);
        if width > 0 && width + word_width > budget {
            chunks.push(&piece[start..offset]);
            start = offset;
            width = 0;
        }
        width += word_width;
        offset += word.len();
    }
    chunks.push(&piece[start..]);
    chunks
}

fn escaped_width(raw: &str) -> usize {
    escape::encode(raw).chars().count() - 2
}
