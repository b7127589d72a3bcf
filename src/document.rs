//! Paragraph extraction from `.docx` and `.txt` files.

use crate::error::{NarrateurError, Result};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::fs::File;
use std::io::Read;
use std::path::Path;

lazy_static! {
    // "12)" style enumeration markers
    static ref ENUMERATION_MARKER: Regex =
        Regex::new(r"\d+\)").expect("valid enumeration marker pattern");
    static ref MARKUP_SYMBOLS: Regex = Regex::new(r"[*#@]").expect("valid markup pattern");

    static ref DOCX_PARAGRAPH: Regex =
        Regex::new(r"(?s)<w:p(?:\s[^>]*)?>(.*?)</w:p>").expect("valid paragraph pattern");
    static ref DOCX_PARAGRAPH_PROPS: Regex =
        Regex::new(r"(?s)<w:pPr>.*?</w:pPr>").expect("valid paragraph properties pattern");
    static ref DOCX_RUN_CONTENT: Regex = Regex::new(
        r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>|<w:(tab|br|cr)(?:\s[^>]*)?/>"
    )
    .expect("valid run content pattern");
    static ref XML_ENTITY: Regex =
        Regex::new(r"&(lt|gt|amp|quot|apos|#[0-9]+|#x[0-9a-fA-F]+);").expect("valid entity pattern");
}

/// Recognised input formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Docx,
    PlainText,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("docx") => Ok(DocumentFormat::Docx),
            Some("txt") => Ok(DocumentFormat::PlainText),
            _ => Err(NarrateurError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Reads `path` and returns its cleaned, non-empty paragraphs in document order.
pub fn extract(path: &Path) -> Result<Vec<String>> {
    let raw = match DocumentFormat::from_path(path)? {
        DocumentFormat::Docx => docx_paragraphs(path)?,
        DocumentFormat::PlainText => text_paragraphs(path)?,
    };

    let paragraphs: Vec<String> = raw
        .iter()
        .map(|p| clean_paragraph(p))
        .filter(|p| !p.is_empty())
        .collect();
    log::info!(
        "Extracted {} paragraphs from {}",
        paragraphs.len(),
        path.display()
    );
    Ok(paragraphs)
}

/// Drops enumeration markers, brackets and markup symbols, and reads a slash
/// as a spoken comma.
pub fn clean_paragraph(raw: &str) -> String {
    let text = ENUMERATION_MARKER.replace_all(raw, "");
    let text = text.trim().replace(['[', ']'], "");
    let text = MARKUP_SYMBOLS.replace_all(&text, "");
    text.replace('/', ", ").trim().to_string()
}

fn text_paragraphs(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .trim_start_matches('\u{feff}')
        .lines()
        .map(str::to_string)
        .collect())
}

fn docx_paragraphs(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| NarrateurError::Document(format!("word/document.xml: {}", e)))?
        .read_to_string(&mut xml)?;
    Ok(paragraphs_from_document_xml(&xml))
}

/// Plain text of every `<w:p>` element, the way a word processor would show it.
pub fn paragraphs_from_document_xml(xml: &str) -> Vec<String> {
    DOCX_PARAGRAPH
        .captures_iter(xml)
        .map(|para| {
            let body = DOCX_PARAGRAPH_PROPS.replace_all(&para[1], "");
            let mut text = String::new();
            for run in DOCX_RUN_CONTENT.captures_iter(&body) {
                if let Some(t) = run.get(1) {
                    text.push_str(&unescape_xml(t.as_str()));
                } else {
                    match run.get(2).map(|m| m.as_str()) {
                        Some("tab") => text.push('\t'),
                        _ => text.push('\n'),
                    }
                }
            }
            text
        })
        .collect()
}

fn unescape_xml(text: &str) -> String {
    XML_ENTITY
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            match entity {
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "amp" => "&".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                _ => {
                    let code = match entity.strip_prefix("#x") {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => entity[1..].parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                        .map(String::from)
                        .unwrap_or_else(|| caps[0].to_string())
                }
            }
        })
        .into_owned()
}
