//! Text extraction from solicitation documents

use crate::error::{Result, RfpAlignerError};
use crate::input::file_detector::DocumentFormat;
use docx_rs::{
    DocumentChild, Insert, InsertChild, Paragraph, ParagraphChild, Run, RunChild, StructuredDataTag,
    StructuredDataTagChild, Table, TableCellContent,
};
use log::debug;

/// An uploaded file: its name selects the decoder, its bytes are decoded.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn format(&self) -> Result<DocumentFormat> {
        DocumentFormat::from_file_name(&self.name)
    }
}

pub trait TextExtractor {
    fn extract(&self, bytes: &[u8]) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Decode a file into normalized plain text, dispatching on its extension.
pub async fn extract_text(file: &SourceFile) -> Result<String> {
    let format = file.format()?;
    debug!("Extracting {} text from '{}' ({} bytes)", format, file.name, file.bytes.len());

    match format {
        DocumentFormat::Text => PlainTextExtractor.extract(&file.bytes).await,
        DocumentFormat::Docx => DocxExtractor.extract(&file.bytes).await,
        DocumentFormat::Pdf => PdfExtractor.extract(&file.bytes).await,
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String> {
        let text = String::from_utf8_lossy(bytes);
        Ok(text.strip_prefix('\u{FEFF}').unwrap_or(&text).to_string())
    }
}

pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String> {
        let package = docx_rs::read_docx(bytes)
            .map_err(|e| RfpAlignerError::parse_failure("DOCX", e))?;

        let mut paragraphs = Vec::new();
        for child in &package.document.children {
            match child {
                DocumentChild::Paragraph(paragraph) => paragraphs.push(paragraph_text(paragraph)),
                DocumentChild::Table(table) => collect_table_text(table, &mut paragraphs),
                DocumentChild::StructuredDataTag(tag) => collect_tag_text(tag, &mut paragraphs),
                _ => {}
            }
        }

        let text = paragraphs
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        Ok(text.trim().to_string())
    }
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut buffer = String::new();
    for child in &paragraph.children {
        append_paragraph_child(child, &mut buffer);
    }
    buffer
}

fn append_paragraph_child(child: &ParagraphChild, buffer: &mut String) {
    match child {
        ParagraphChild::Run(run) => append_run_text(run, buffer),
        ParagraphChild::Insert(insert) => append_insert_text(insert, buffer),
        ParagraphChild::Hyperlink(link) => {
            for inner in &link.children {
                append_paragraph_child(inner, buffer);
            }
        }
        ParagraphChild::StructuredDataTag(tag) => append_inline_tag_text(tag, buffer),
        _ => {}
    }
}

// Tracked insertions are part of the current text; deletions are not.
fn append_insert_text(insert: &Insert, buffer: &mut String) {
    for child in &insert.children {
        if let InsertChild::Run(run) = child {
            append_run_text(run, buffer);
        }
    }
}

fn append_inline_tag_text(tag: &StructuredDataTag, buffer: &mut String) {
    for child in &tag.children {
        match child {
            StructuredDataTagChild::Run(run) => append_run_text(run, buffer),
            StructuredDataTagChild::Paragraph(paragraph) => buffer.push_str(&paragraph_text(paragraph)),
            StructuredDataTagChild::StructuredDataTag(inner) => append_inline_tag_text(inner, buffer),
            _ => {}
        }
    }
}

/// Content controls at block level: each inner paragraph stays a paragraph.
fn collect_tag_text(tag: &StructuredDataTag, paragraphs: &mut Vec<String>) {
    for child in &tag.children {
        match child {
            StructuredDataTagChild::Paragraph(paragraph) => paragraphs.push(paragraph_text(paragraph)),
            StructuredDataTagChild::Table(table) => collect_table_text(table, paragraphs),
            StructuredDataTagChild::Run(run) => {
                let mut buffer = String::new();
                append_run_text(run, &mut buffer);
                paragraphs.push(buffer);
            }
            StructuredDataTagChild::StructuredDataTag(inner) => collect_tag_text(inner, paragraphs),
            _ => {}
        }
    }
}

fn append_run_text(run: &Run, buffer: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(text) => buffer.push_str(&text.text),
            RunChild::Tab(_) => buffer.push('\t'),
            RunChild::Break(_) => buffer.push('\n'),
            _ => {}
        }
    }
}

#[allow(unreachable_patterns, irrefutable_let_patterns)]
fn collect_table_text(table: &Table, paragraphs: &mut Vec<String>) {
    for row in &table.rows {
        let docx_rs::TableChild::TableRow(row) = row else {
            continue;
        };
        for cell in &row.cells {
            let docx_rs::TableRowChild::TableCell(cell) = cell else {
                continue;
            };
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(paragraph) => paragraphs.push(paragraph_text(paragraph)),
                    TableCellContent::Table(inner) => collect_table_text(inner, paragraphs),
                    TableCellContent::StructuredDataTag(tag) => collect_tag_text(tag, paragraphs),
                    _ => {}
                }
            }
        }
    }
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String> {
        let owned = bytes.to_vec();

        // pdf-extract is CPU bound and may panic on malformed input
        let pages = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem_by_pages(&owned))
            .await
            .map_err(|e| RfpAlignerError::parse_failure("PDF", format!("decoder aborted: {}", e)))?
            .map_err(|e| RfpAlignerError::parse_failure("PDF", e))?;

        debug!("Decoded {} PDF pages", pages.len());
        Ok(join_pages(&pages))
    }
}

/// Join decoded pages in order: items within a page separated by one space,
/// pages separated by one newline.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .map(|page| page.as_ref().split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
