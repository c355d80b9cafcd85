//! Message records shared by the parser, the writer and the lookup helpers.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::{options::WriteOptions, writer::RecordWriter};

/// One translatable entry of a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Message {
    /// Comments and metadata preceding the entry.
    #[serde(default)]
    pub comment: Comment,

    /// `msgctxt`: disambiguating context, empty if absent.
    #[serde(skip_serializing_if = "String::is_empty")]
    #[serde(default)]
    pub ctxt: String,

    /// `msgid`: untranslated singular string.
    pub id: String,

    /// `msgid_plural`: untranslated plural string, empty for singular-only messages.
    #[serde(skip_serializing_if = "String::is_empty")]
    #[serde(default)]
    pub id_plural: String,

    /// `msgstr` or `msgstr[n]`: one entry per plural form, or exactly one
    /// for singular messages.
    pub str: Vec<String>,

    /// Entry was commented out with `#~`.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    #[serde(default)]
    pub obsolete: bool,
}

impl Message {
    /// Creates a singular message with one translation.
    pub fn singular(id: impl Into<String>, translation: impl Into<String>) -> Self {
        Message {
            id: id.into(),
            str: vec![translation.into()],
            ..Default::default()
        }
    }

    /// Creates a plural message with one translation per plural form.
    pub fn plural(
        id: impl Into<String>,
        id_plural: impl Into<String>,
        translations: impl IntoIterator<Item = String>,
    ) -> Self {
        Message {
            id: id.into(),
            id_plural: id_plural.into(),
            str: translations.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn is_plural(&self) -> bool {
        !self.id_plural.is_empty()
    }

    /// Whether the entry carries the `fuzzy` flag.
    pub fn is_fuzzy(&self) -> bool {
        self.comment.flags.iter().any(|f| f == "fuzzy")
    }

    /// Key under which the catalog indexes this message.
    pub fn compound_key(&self) -> String {
        compound_key(&self.id, &self.id_plural)
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = RecordWriter::new(&WriteOptions::default());
        out.message(self);
        f.write_str(&out.finish())
    }
}

/// Metadata attached to a message.
///
/// Absence is always an empty list or string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Comment {
    /// `# ` lines written by translators.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub translator_comments: Vec<String>,

    /// `#.` lines extracted from the source code.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub extracted_comments: Vec<String>,

    /// `#:` source references, one token each (e.g. `src/main.c:42`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub references: Vec<String>,

    /// `#,` flags such as `fuzzy` or `c-format`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub flags: Vec<String>,

    /// `#| msgctxt`: context before the last catalog update.
    #[serde(skip_serializing_if = "String::is_empty")]
    #[serde(default)]
    pub prev_ctxt: String,

    /// `#| msgid`: singular id before the last catalog update.
    #[serde(skip_serializing_if = "String::is_empty")]
    #[serde(default)]
    pub prev_id: String,

    /// `#| msgid_plural`: plural id before the last catalog update.
    #[serde(skip_serializing_if = "String::is_empty")]
    #[serde(default)]
    pub prev_id_plural: String,
}

impl Comment {
    pub fn is_empty(&self) -> bool {
        *self == Comment::default()
    }
}

impl Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = RecordWriter::new(&WriteOptions::default());
        out.comment(self, "#| ");
        f.write_str(&out.finish())
    }
}

/// Joins `msgid` and `msgid_plural` with `|`, trimming `|` from both ends so
/// a singular message is keyed by its id alone.
pub fn compound_key(id: &str, id_plural: &str) -> String {
    format!("{}|{}", id, id_plural).trim_matches('|').to_string()
}
