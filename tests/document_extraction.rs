use narrateur::document::extract;
use narrateur::NarrateurError;
use std::io::Write;
use std::path::Path;

fn write_docx(path: &Path, paragraphs: &[&str]) {
    let body: String = paragraphs
        .iter()
        .map(|p| format!(r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, p))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr/></w:body></w:document>"#,
        body
    );

    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(b"<Types/>").unwrap();
    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap();
}

#[test]
fn test_docx_paragraphs_are_cleaned_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lecture.docx");
    write_docx(
        &path,
        &[
            "1) Bonjour, je m&apos;appelle [Marie].",
            "   ",
            "2) *#@",
            "Oui/Non ? Peut-être…",
            "Fin &amp; merci!",
        ],
    );

    let paragraphs = extract(&path).unwrap();
    assert_eq!(
        paragraphs,
        vec![
            "Bonjour, je m'appelle Marie.",
            "Oui, Non ? Peut-être…",
            "Fin & merci!",
        ]
    );
}

#[test]
fn test_text_file_one_paragraph_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "\u{feff}3) Première ligne.\n\n[*]\nDeuxième/troisième.\n").unwrap();

    let paragraphs = extract(&path).unwrap();
    assert_eq!(paragraphs, vec!["Première ligne.", "Deuxième, troisième."]);
}

#[test]
fn test_unrecognised_extension_fails_before_reading() {
    // the file does not even exist: the extension alone decides
    let err = extract(Path::new("/nonexistent/livre.odt")).unwrap_err();
    assert!(matches!(err, NarrateurError::UnsupportedFormat(_)));
}

#[test]
fn test_docx_without_body_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vide.docx");
    let file = std::fs::File::create(&path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("other.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    zip.write_all(b"<x/>").unwrap();
    zip.finish().unwrap();

    let err = extract(&path).unwrap_err();
    assert!(matches!(err, NarrateurError::Document(_)));
}
