// src/pdf/mod.rs
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use lopdf::Document;

use crate::utils::error::ExtractionFailure;

/// Anything that exposes an ordered page sequence with per-page text.
pub trait PageSource {
    /// Page numbers in document order.
    fn page_numbers(&self) -> Vec<u32>;

    /// Extracted text for one page. Pages without text (e.g. scanned images) yield "".
    fn page_text(&self, page: u32) -> Result<String, ExtractionFailure>;
}

/// Plain text of a whole document, pages concatenated in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentText {
    pub text: String,
    pub page_count: usize,
}

/// Concatenates every page's text. Fails on the first page that cannot be read,
/// so callers never see a partially read document.
pub fn concatenate_pages<S: PageSource + ?Sized>(
    source: &S,
) -> Result<DocumentText, ExtractionFailure> {
    let pages = source.page_numbers();
    let mut text = String::new();

    for &page in &pages {
        let page_text = source.page_text(page)?;
        tracing::trace!("Page {} yielded {} bytes of text", page, page_text.len());
        text.push_str(&page_text);
    }

    Ok(DocumentText { text, page_count: pages.len() })
}

// --- lopdf-backed reader ---

/// A parsed PDF held in memory.
pub struct PdfReader {
    document: Document,
}

impl PdfReader {
    /// Parses a PDF from any byte stream. `path` is only used for error messages.
    pub fn from_reader<R: Read>(source: R, path: &Path) -> Result<Self, ExtractionFailure> {
        let document = Document::load_from(source).map_err(|e| ExtractionFailure::Pdf {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self { document })
    }

    /// Opens and parses the file at `path`. The file handle is released before returning.
    pub fn open(path: &Path) -> Result<Self, ExtractionFailure> {
        let file = File::open(path).map_err(|source| ExtractionFailure::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), path)
    }
}

impl PageSource for PdfReader {
    fn page_numbers(&self) -> Vec<u32> {
        self.document.get_pages().into_keys().collect()
    }

    fn page_text(&self, page: u32) -> Result<String, ExtractionFailure> {
        self.document
            .extract_text(&[page])
            .map_err(|e| ExtractionFailure::PageText { page, message: e.to_string() })
    }
}

/// Reads the PDF at `path` into Document Text.
pub fn load_document_text(path: &Path) -> Result<DocumentText, ExtractionFailure> {
    tracing::info!("Reading PDF: {}", path.display());
    let reader = PdfReader::open(path)?;
    let document = concatenate_pages(&reader)?;
    tracing::info!(
        "Extracted {} chars from {} pages",
        document.text.chars().count(),
        document.page_count
    );
    Ok(document)
}

/// Writes a minimal PDF with one Courier text line per page.
#[cfg(test)]
pub(crate) fn write_sample_pdf(path: &Path, page_texts: &[&str]) {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

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
    for text in page_texts {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(page_texts.len() as i64),
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    // In-memory page source; a page mapped to `None` fails extraction.
    struct FakePages(BTreeMap<u32, Option<&'static str>>);

    impl PageSource for FakePages {
        fn page_numbers(&self) -> Vec<u32> {
            self.0.keys().copied().collect()
        }

        fn page_text(&self, page: u32) -> Result<String, ExtractionFailure> {
            match self.0.get(&page).copied().flatten() {
                Some(text) => Ok(text.to_string()),
                None => Err(ExtractionFailure::PageText { page, message: "unreadable".into() }),
            }
        }
    }

    #[test]
    fn pages_are_concatenated_in_order() {
        let pages = FakePages(BTreeMap::from([
            (2, Some("Introduction ")),
            (1, Some("Abstract text ")),
            (3, Some("")),
        ]));
        let document = concatenate_pages(&pages).unwrap();
        assert_eq!(document.text, "Abstract text Introduction ");
        assert_eq!(document.page_count, 3);
    }

    #[test]
    fn empty_page_source_gives_empty_text() {
        let document = concatenate_pages(&FakePages(BTreeMap::new())).unwrap();
        assert_eq!(document, DocumentText::default());
    }

    #[test]
    fn unreadable_page_fails_the_whole_document() {
        let pages = FakePages(BTreeMap::from([(1, Some("Abstract ok")), (2, None)]));
        let err = concatenate_pages(&pages).unwrap_err();
        assert!(matches!(err, ExtractionFailure::PageText { page: 2, .. }));
    }

    #[test]
    fn reads_pages_of_a_real_pdf_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two-pages.pdf");
        write_sample_pdf(&path, &["Abstract XYZ Introduction", "Key Findings: up. Discussion"]);

        let reader = PdfReader::open(&path).unwrap();
        assert_eq!(reader.page_numbers(), vec![1, 2]);
        assert!(reader.page_text(2).unwrap().contains("Key Findings: up."));

        let document = load_document_text(&path).unwrap();
        assert_eq!(document.page_count, 2);
        assert_eq!(
            document.text.trim_end(),
            "Abstract XYZ Introduction\nKey Findings: up. Discussion"
        );
    }

    #[test]
    fn missing_file_is_an_io_failure_naming_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.pdf");
        let err = load_document_text(&path).unwrap_err();
        assert!(matches!(err, ExtractionFailure::Io { .. }));
        assert!(err.to_string().contains("does-not-exist.pdf"));
    }

    #[test]
    fn malformed_bytes_are_a_pdf_failure() {
        let path = Path::new("garbage.pdf");
        let result = PdfReader::from_reader(&b"this is not a pdf document"[..], path);
        match result {
            Err(ExtractionFailure::Pdf { path, .. }) => assert_eq!(path, Path::new("garbage.pdf")),
            Err(other) => panic!("unexpected failure: {}", other),
            Ok(_) => panic!("garbage parsed as a PDF"),
        }
    }
}
