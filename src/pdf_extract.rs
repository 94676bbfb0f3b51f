// src/pdf_extract.rs

use lopdf::Document;
use std::path::Path;
use tracing::{info, warn};

/// Result of reading the embedded text layer of a PDF.
#[derive(Debug)]
pub enum PdfContent {
    /// The PDF carries a text layer (possibly short).
    Text(String),
    /// The PDF appears to be scanned / image-only and needs OCR.
    ScannedImage,
    /// Something went wrong during extraction.
    Error(String),
}

impl PdfContent {
    /// The text yield, with scanned and failed documents counting as empty.
    pub fn into_text(self) -> String {
        match self {
            PdfContent::Text(text) => text,
            PdfContent::ScannedImage | PdfContent::Error(_) => String::new(),
        }
    }
}

/// Reads a PDF's text layer. Seam for the acquisition orchestrator.
pub trait DigitalText: Send + Sync {
    fn extract(&self, path: &Path) -> PdfContent;
}

/// lopdf structural check followed by `pdf-extract`.
pub struct TextLayer;

impl DigitalText for TextLayer {
    fn extract(&self, path: &Path) -> PdfContent {
        match std::fs::read(path) {
            Ok(bytes) => extract_text_from_pdf(&bytes),
            Err(e) => PdfContent::Error(format!("Failed to read {}: {e}", path.display())),
        }
    }
}

/// Main entry point: takes raw PDF bytes and returns `PdfContent`.
pub fn extract_text_from_pdf(pdf_bytes: &[u8]) -> PdfContent {
    // --- Phase 1: structural check with lopdf ---
    let doc = match Document::load_mem(pdf_bytes) {
        Ok(d) => d,
        Err(e) => return PdfContent::Error(format!("Failed to parse PDF: {e}")),
    };

    if looks_like_scanned(&doc) {
        info!("PDF structural check: likely scanned / image-only");
        return PdfContent::ScannedImage;
    }

    // --- Phase 2: text layer. pdf-extract panics on some malformed fonts ---
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(pdf_bytes)) {
        Ok(Ok(text)) => {
            info!(chars = text.len(), "Text layer extracted");
            PdfContent::Text(text)
        }
        Ok(Err(e)) => {
            warn!(error = %e, "pdf-extract failed — may be scanned or corrupted");
            PdfContent::Error(e.to_string())
        }
        Err(_) => {
            warn!("pdf-extract panicked — treating as empty text layer");
            PdfContent::Error("pdf-extract panicked".to_string())
        }
    }
}

/// Heuristic: inspect the PDF object tree for signs that every page
/// is just a single image with no text operators.
///
/// A page with XObject images but **no** Font resources is almost
/// certainly a scanned page.
fn looks_like_scanned(doc: &Document) -> bool {
    let pages = doc.get_pages();
    if pages.is_empty() {
        return false;
    }

    let mut image_only_pages = 0;

    for object_id in pages.values() {
        let Ok(page_dict) = doc.get_dictionary(*object_id) else {
            continue;
        };

        let resources = page_dict
            .get(b"Resources")
            .ok()
            .and_then(|r| doc.dereference(r).ok())
            .and_then(|(_, resolved)| resolved.as_dict().ok());

        let non_empty_entry = |key: &[u8]| {
            resources
                .and_then(|res| res.get(key).ok())
                .and_then(|v| doc.dereference(v).ok())
                .and_then(|(_, resolved)| resolved.as_dict().ok())
                .is_some_and(|dict| !dict.is_empty())
        };

        if non_empty_entry(b"XObject") && !non_empty_entry(b"Font") {
            image_only_pages += 1;
        }
    }

    let total = pages.len();
    let ratio = image_only_pages as f64 / total as f64;
    info!(
        total_pages = total,
        image_only = image_only_pages,
        ratio = format!("{ratio:.2}"),
        "Scanned-page analysis"
    );

    ratio >= 0.8
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Object, Stream, dictionary};

    /// One-page PDF whose page resources are built by `resources`.
    fn one_page_pdf(resources: impl FnOnce(&mut Document) -> lopdf::Dictionary) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let resources = resources(&mut doc);
        let content_id = doc.add_object(Stream::new(dictionary! {}, b"q Q".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_garbage_bytes() {
        let result = extract_text_from_pdf(b"this is not a pdf");
        assert!(matches!(result, PdfContent::Error(_)));
        assert_eq!(extract_text_from_pdf(b"junk").into_text(), "");
    }

    #[test]
    fn image_only_page_is_scanned() {
        let bytes = one_page_pdf(|doc| {
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 1,
                    "Height" => 1,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                vec![0u8],
            ));
            dictionary! { "XObject" => dictionary! { "Im1" => image_id } }
        });

        assert!(matches!(extract_text_from_pdf(&bytes), PdfContent::ScannedImage));
    }

    #[test]
    fn page_with_fonts_is_not_scanned() {
        let bytes = one_page_pdf(|_| {
            dictionary! {
                "Font" => dictionary! {
                    "F1" => dictionary! {
                        "Type" => "Font",
                        "Subtype" => "Type1",
                        "BaseFont" => "Courier",
                    },
                },
            }
        });
        let doc = Document::load_mem(&bytes).unwrap();
        assert!(!looks_like_scanned(&doc));
    }

    #[test]
    fn unreadable_path_is_error() {
        let result = TextLayer.extract(Path::new("/nonexistent/order.pdf"));
        assert!(matches!(result, PdfContent::Error(_)));
    }
}
