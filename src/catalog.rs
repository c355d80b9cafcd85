//! Translation lookup over a parsed catalog.
//!
//! Lookups never fail: when a catalog has no usable translation the source
//! string is used instead, so partially translated catalogs still render.

use std::fmt::{Display, Write};

use crate::po::File;

impl File {
    /// Translates `id`, substituting `args` into its placeholders.
    ///
    /// Falls back to `id` itself when there is no entry or the translation is
    /// empty.
    pub fn get_text(&self, id: &str, args: &[&dyn Display]) -> String {
        let template = self
            .find(id, "")
            .and_then(|m| m.str.first())
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .unwrap_or(id);
        format_message(template, args)
    }

    /// Translates the plural message `id`/`id_plural` for the count `n`.
    ///
    /// The form is chosen by the catalog's plural selector. Without a usable
    /// translation, form 0 falls back to `id` and any other form to `id_plural`.
    pub fn nget_text(&self, id: &str, id_plural: &str, n: u64, args: &[&dyn Display]) -> String {
        let index = self.pluralize.select(n);
        let fallback = if index == 0 { id } else { id_plural };
        let template = self
            .find(id, id_plural)
            .and_then(|m| m.str.get(index))
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .unwrap_or(fallback);
        format_message(template, args)
    }
}

/// Substitutes printf-style placeholders with `args`.
///
/// Supports `%s`, `%d`, `%v` (any argument, formatted with `Display`),
/// positional `%1$s` and `%%`. Placeholders without a matching argument are
/// kept verbatim.
pub fn format_message(template: &str, args: &[&dyn Display]) -> String {
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len());
    let mut next_arg = 0;
    let mut i = 0;
    let mut literal_start = 0;

    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        out.push_str(&template[literal_start..i]);

        // Escaped percent
        if bytes.get(i + 1) == Some(&b'%') {
            out.push('%');
            i += 2;
            literal_start = i;
            continue;
        }

        // Optional positional index: digits followed by '$'
        let mut j = i + 1;
        let digits_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        let mut position = None;
        if j > digits_start && bytes.get(j) == Some(&b'$') {
            position = template[digits_start..j].parse::<usize>().ok();
            j += 1;
        } else {
            j = digits_start;
        }

        match bytes.get(j) {
            Some(b's' | b'd' | b'v') => {
                let slot = match position {
                    Some(p) => p.checked_sub(1),
                    None => {
                        next_arg += 1;
                        Some(next_arg - 1)
                    }
                };
                match slot.and_then(|s| args.get(s)) {
                    Some(arg) => {
                        let _ = write!(out, "{}", arg);
                    }
                    None => out.push_str(&template[i..=j]),
                }
                i = j + 1;
            }
            // Not a recognized placeholder; keep the '%' as text
            _ => {
                out.push('%');
                i += 1;
            }
        }
        literal_start = i;
    }

    out.push_str(&template[literal_start..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Parser;
    use indoc::indoc;

    fn catalog() -> File {
        File::from_str(indoc! {r#"
            msgid ""
            msgstr ""
            "Language: de\n"

            msgid "Hello, %s!"
            msgstr "Hallo, %s!"

            msgid "untranslated"
            msgstr ""

            msgid "%d file"
            msgid_plural "%d files"
            msgstr[0] "%d Datei"
            msgstr[1] "%d Dateien"

            msgid "%d folder"
            msgid_plural "%d folders"
            msgstr[0] "%d Ordner"
            msgstr[1] ""
        "#})
        .unwrap()
    }

    #[test]
    fn test_get_text_translates_and_formats() {
        assert_eq!(catalog().get_text("Hello, %s!", &[&"Welt"]), "Hallo, Welt!");
    }

    #[test]
    fn test_get_text_falls_back_to_id() {
        let file = catalog();
        assert_eq!(file.get_text("missing.key", &[]), "missing.key");
        assert_eq!(file.get_text("untranslated", &[]), "untranslated");
        assert_eq!(file.get_text("Hi %s", &[&"Bob"]), "Hi Bob");
    }

    #[test]
    fn test_nget_text_selects_form() {
        let file = catalog();
        assert_eq!(file.nget_text("%d file", "%d files", 1, &[&1]), "1 Datei");
        assert_eq!(file.nget_text("%d file", "%d files", 3, &[&3]), "3 Dateien");
    }

    #[test]
    fn test_nget_text_fallbacks() {
        let file = catalog();
        // Empty translation for form 1
        assert_eq!(file.nget_text("%d folder", "%d folders", 1, &[&1]), "1 Ordner");
        assert_eq!(file.nget_text("%d folder", "%d folders", 2, &[&2]), "2 folders");
        // No entry at all
        assert_eq!(file.nget_text("%d cat", "%d cats", 1, &[&1]), "1 cat");
        assert_eq!(file.nget_text("%d cat", "%d cats", 0, &[&0]), "0 cats");
    }

    #[test]
    fn test_format_message_placeholders() {
        assert_eq!(format_message("100%% sure", &[]), "100% sure");
        assert_eq!(
            format_message("%2$s before %1$s", &[&"a", &"b"]),
            "b before a"
        );
        assert_eq!(format_message("%s and %s", &[&"one"]), "one and %s");
        assert_eq!(format_message("%0$s", &[&"x"]), "%0$s");
        assert_eq!(format_message("50% off, %q", &[]), "50% off, %q");
        assert_eq!(format_message("trailing %", &[]), "trailing %");
        assert_eq!(format_message("naïve %s ✓", &[&"café"]), "naïve café ✓");
    }
}
