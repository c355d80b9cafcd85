use pocodec::{Error, File, Message, ParseOptions, Parser, WriteOptions};
use std::path::{Path, PathBuf};

fn corpus_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

fn read_corpus(name: &str) -> File {
    File::read_from(corpus_root().join(name))
        .unwrap_or_else(|e| panic!("failed to parse {}: {}", name, e))
}

fn find<'a>(file: &'a File, id: &str, id_plural: &str) -> &'a Message {
    file.find(id, id_plural)
        .unwrap_or_else(|| panic!("missing message `{}`", id))
}

#[test]
fn german_catalog_parses_every_field() {
    let file = read_corpus("de.po");

    assert_eq!(file.language(), Some("de"));
    assert_eq!(file.header.get("project-id-version"), Some("demo 1.0"));
    assert_eq!(
        file.header_comment.translator_comments,
        vec!["German translation for demo.", "Copyright (C) 2024 Demo Project", ""]
    );
    assert_eq!(file.header_comment.flags, vec!["fuzzy"]);
    assert_eq!(file.messages().len(), 7);

    let welcome = find(&file, "Welcome", "");
    assert_eq!(welcome.comment.extracted_comments, vec!["Shown on the start screen"]);
    assert_eq!(welcome.comment.references, vec!["src/main.c:12"]);
    assert_eq!(welcome.str, vec!["Willkommen"]);

    let open = find(&file, "Open %s", "");
    assert_eq!(open.ctxt, "menu");
    assert_eq!(open.comment.translator_comments, vec!["Keep it short"]);
    assert_eq!(open.comment.references, vec!["src/menu.c:40", "src/menu.c:52"]);
    assert_eq!(open.comment.flags, vec!["c-format"]);

    let files = find(&file, "%d file", "%d files");
    assert_eq!(files.str, vec!["%d Datei", "%d Dateien"]);

    let save = find(&file, "Save the current document", "");
    assert!(save.is_fuzzy());
    assert_eq!(save.comment.prev_id, "Save the document");

    let long = &file.messages()[4];
    assert_eq!(
        long.id,
        "A long message that has been split over several lines.\nIt also has an embedded newline."
    );

    let escapes = &file.messages()[5];
    assert_eq!(escapes.id, "Tab\there \"quoted\" and back\\slash");
    assert_eq!(escapes.str, vec!["Tab\thier \"zitiert\" und Rück\\strich"]);

    let obsolete = &file.messages()[6];
    assert!(obsolete.obsolete);
    assert_eq!(obsolete.id, "Obsolete entry");
}

#[test]
fn german_catalog_lookups() {
    let file = read_corpus("de.po");
    assert_eq!(file.get_text("Welcome", &[]), "Willkommen");
    assert_eq!(file.get_text("Open %s", &[&"Datei.txt"]), "Datei.txt öffnen");
    assert_eq!(file.nget_text("%d file", "%d files", 1, &[&1]), "1 Datei");
    assert_eq!(file.nget_text("%d file", "%d files", 5, &[&5]), "5 Dateien");
    assert_eq!(file.get_text("missing.key", &[]), "missing.key");
}

#[test]
fn russian_catalog_uses_language_fallback() {
    let file = read_corpus("ru.po");
    assert_eq!(file.pluralize.nplurals(), 3);
    let forms: Vec<String> = [1, 3, 5, 21, 111]
        .iter()
        .map(|&n| file.nget_text("%d day", "%d days", n, &[&n]))
        .collect();
    assert_eq!(forms, vec!["1 день", "3 дня", "5 дней", "21 день", "111 дней"]);
}

#[test]
fn crlf_catalog_parses() {
    let file = read_corpus("ja_crlf.po");
    assert_eq!(file.pluralize.nplurals(), 1);
    assert_eq!(file.get_text("Cancel", &[]), "キャンセル");
}

#[test]
fn corpus_files_survive_write_and_reparse() {
    for name in ["de.po", "ru.po", "ja_crlf.po"] {
        let original = read_corpus(name);

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(name);
        original.write_to(&path).unwrap();
        let reparsed = File::read_from(&path).unwrap();

        assert_eq!(original.header, reparsed.header, "{}", name);
        assert_eq!(original.header_comment, reparsed.header_comment, "{}", name);
        assert_eq!(original.messages(), reparsed.messages(), "{}", name);
        assert_eq!(original.pluralize, reparsed.pluralize, "{}", name);
    }
}

#[test]
fn wrapped_output_reparses_to_same_messages() {
    let original = read_corpus("de.po");
    let mut out = Vec::new();
    original
        .write_with(&mut out, &WriteOptions::new().with_wrap_width(Some(30)))
        .unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.lines().filter(|l| l.starts_with('"')).count() > 8);

    let reparsed = File::from_str(&text).unwrap();
    assert_eq!(original.messages(), reparsed.messages());
}

#[test]
fn strict_mode_accepts_consistent_corpus() {
    let strict = ParseOptions::new().with_strict(true);
    for name in ["de.po", "ru.po"] {
        let bytes = std::fs::read(corpus_root().join(name)).unwrap();
        File::parse_with(bytes.as_slice(), &strict).unwrap();
    }
}

#[test]
fn plural_index_gap_is_malformed() {
    let input = "msgid \"file\"\nmsgid_plural \"files\"\nmsgstr[0] \"a\"\nmsgstr[2] \"c\"\n";
    assert!(matches!(
        File::from_str(input),
        Err(Error::MalformedCatalog(_))
    ));
}

#[test]
fn missing_file_is_io_error() {
    let err = File::read_from(corpus_root().join("does-not-exist.po")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
