//! Plain-text extraction from uploaded documents.

use lopdf::Document;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors raised when an uploaded document cannot be turned into text.
#[derive(Debug, Error)]
pub enum DocumentFormatError {
    /// The bytes could not be parsed as a PDF.
    #[error("document could not be parsed: {0}")]
    Unreadable(String),
    /// Text extraction failed for a single page.
    #[error("failed to extract text from page {page}: {message}")]
    PageText {
        /// One-based page number.
        page: u32,
        /// Error reported by the PDF library.
        message: String,
    },
}

/// Converts a paginated document into a single plain-text string.
pub trait TextExtractor: Send + Sync {
    /// Extract the text of every page, in page order.
    fn extract(&self, document: &[u8]) -> Result<String, DocumentFormatError>;
}

/// PDF extractor backed by `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Construct a new extractor.
    pub const fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, document: &[u8]) -> Result<String, DocumentFormatError> {
        let pdf = Document::load_mem(document)
            .map_err(|error| DocumentFormatError::Unreadable(error.to_string()))?;

        // A page-less document yields empty text. Page texts are appended back to back; callers
        // must not expect a page delimiter.
        let pages = pdf.get_pages();
        let mut text = String::new();
        for page in pages.keys().copied() {
            let page_text = pdf
                .extract_text(&[page])
                .map_err(|error| DocumentFormatError::PageText {
                    page,
                    message: error.to_string(),
                })?;
            text.push_str(&page_text);
        }

        tracing::debug!(
            pages = pages.len(),
            chars = text.len(),
            "Extracted document text"
        );
        Ok(text)
    }
}

/// Hex-encoded SHA-256 of the uploaded bytes, used to correlate log lines for one document.
pub fn document_fingerprint(document: &[u8]) -> String {
    hex::encode(Sha256::digest(document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream, dictionary};

    fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("encode content"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("save pdf");
        bytes
    }

    #[test]
    fn extracts_pages_in_order() {
        let pdf = build_pdf(&["Alpha page", "Beta page", "Gamma page"]);
        let text = PdfTextExtractor::new().extract(&pdf).expect("extract");

        let alpha = text.find("Alpha").expect("first page text");
        let beta = text.find("Beta").expect("second page text");
        let gamma = text.find("Gamma").expect("third page text");
        assert!(alpha < beta && beta < gamma, "unexpected order: {text:?}");
    }

    #[test]
    fn joins_pages_without_separator() {
        let extractor = PdfTextExtractor::new();
        let pages = ["Alpha page", "Beta page", "Gamma page"];
        let per_page: String = pages
            .iter()
            .map(|page| extractor.extract(&build_pdf(&[*page])).expect("single page"))
            .collect();

        let whole = extractor.extract(&build_pdf(&pages)).expect("extract");

        assert_eq!(whole, per_page);
    }

    #[test]
    fn pageless_document_yields_empty_text() {
        let pdf = build_pdf(&[]);
        let text = PdfTextExtractor::new().extract(&pdf).expect("empty page tree");
        assert_eq!(text, "");
    }

    #[test]
    fn rejects_non_pdf_bytes() {
        let error = PdfTextExtractor::new()
            .extract(b"definitely not a pdf")
            .expect_err("garbage input");
        assert!(matches!(error, DocumentFormatError::Unreadable(_)));
    }

    #[test]
    fn fingerprint_is_stable_hex() {
        let first = document_fingerprint(b"same bytes");
        let second = document_fingerprint(b"same bytes");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert_ne!(first, document_fingerprint(b"other bytes"));
    }
}
