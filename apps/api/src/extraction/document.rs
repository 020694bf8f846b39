//! Document-to-text: uploaded curriculum files become plain text.
//!
//! Fast path: UTF-8 text is taken as-is; PDFs go through `pdf-extract` on the
//! blocking pool. When a PDF has no text layer, pages are rasterised and run
//! through an `OcrEngine`. Callers only ever see "bytes in, text out".

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::ExtractionError;

/// Uploads above this size are rejected before any parsing.
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

const PDF_MAGIC: &[u8] = b"%PDF";
const UTF8_BOM: &str = "\u{feff}";
const OCR_DPI: u32 = 300;

/// Image-based text recognition for PDFs without a usable text layer.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize_pdf(&self, pdf: &[u8]) -> Result<String, ExtractionError>;
}

#[derive(Clone)]
pub struct DocumentExtractor {
    ocr: Option<Arc<dyn OcrEngine>>,
}

impl DocumentExtractor {
    pub fn new(ocr: Option<Arc<dyn OcrEngine>>) -> Self {
        Self { ocr }
    }

    pub async fn extract(
        &self,
        bytes: &[u8],
        filename: Option<&str>,
    ) -> Result<String, ExtractionError> {
        if bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(ExtractionError::TooLarge {
                size: bytes.len(),
                limit: MAX_DOCUMENT_BYTES,
            });
        }

        if bytes.starts_with(PDF_MAGIC) {
            return self.extract_pdf(bytes).await;
        }

        match std::str::from_utf8(bytes) {
            Ok(text) => {
                let text = text.trim_start_matches(UTF8_BOM).trim();
                if text.is_empty() {
                    return Err(ExtractionError::NoText);
                }
                Ok(text.to_string())
            }
            Err(_) => Err(ExtractionError::UnsupportedFormat(
                filename.unwrap_or("binary upload").to_string(),
            )),
        }
    }

    async fn extract_pdf(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let owned = bytes.to_vec();
        // pdf-extract can panic on malformed input; a panicked task is just a failed fast path.
        let fast = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&owned)).await;

        match fast {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                debug!("PDF text layer extracted ({} chars)", text.chars().count());
                return Ok(text.trim().to_string());
            }
            Ok(Ok(_)) => info!("PDF has no text layer, trying OCR fallback"),
            Ok(Err(e)) => warn!("PDF text extraction failed: {e:?}"),
            Err(e) => warn!("PDF text extraction task aborted: {e}"),
        }

        let Some(ocr) = &self.ocr else {
            return Err(ExtractionError::NoText);
        };

        let text = ocr.recognize_pdf(bytes).await?;
        if text.trim().is_empty() {
            return Err(ExtractionError::NoText);
        }
        Ok(text.trim().to_string())
    }
}

/// OCR via the `pdftoppm` (poppler) and `tesseract` command-line tools.
pub struct TesseractOcr {
    languages: String,
}

impl TesseractOcr {
    pub fn new(languages: impl Into<String>) -> Self {
        Self {
            languages: languages.into(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize_pdf(&self, pdf: &[u8]) -> Result<String, ExtractionError> {
        let workdir = tempfile::tempdir().map_err(ocr_io)?;
        let input = workdir.path().join("input.pdf");
        tokio::fs::write(&input, pdf).await.map_err(ocr_io)?;

        let output = Command::new("pdftoppm")
            .arg("-r")
            .arg(OCR_DPI.to_string())
            .arg("-png")
            .arg(&input)
            .arg(workdir.path().join("page"))
            .output()
            .await
            .map_err(ocr_io)?;
        if !output.status.success() {
            return Err(ExtractionError::Ocr(format!(
                "pdftoppm exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let pages = collect_page_images(workdir.path())?;
        info!("Running OCR over {} rendered pages", pages.len());

        let mut texts = Vec::with_capacity(pages.len());
        for page in &pages {
            let output = Command::new("tesseract")
                .arg(page)
                .arg("stdout")
                .arg("-l")
                .arg(&self.languages)
                .output()
                .await
                .map_err(ocr_io)?;
            if !output.status.success() {
                return Err(ExtractionError::Ocr(format!(
                    "tesseract exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                )));
            }
            texts.push(String::from_utf8_lossy(&output.stdout).trim().to_string());
        }

        Ok(texts.join("\n\n"))
    }
}

/// Rendered pages in page order. pdftoppm zero-pads page numbers, so name order is page order.
fn collect_page_images(dir: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
    let mut pages: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(ocr_io)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "png")
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("page"))
        })
        .collect();
    pages.sort();

    if pages.is_empty() {
        return Err(ExtractionError::Ocr("no pages were rendered".to_string()));
    }
    Ok(pages)
}

fn ocr_io(e: std::io::Error) -> ExtractionError {
    ExtractionError::Ocr(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedOcr(&'static str);

    #[async_trait]
    impl OcrEngine for FixedOcr {
        async fn recognize_pdf(&self, _pdf: &[u8]) -> Result<String, ExtractionError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingOcr;

    #[async_trait]
    impl OcrEngine for FailingOcr {
        async fn recognize_pdf(&self, _pdf: &[u8]) -> Result<String, ExtractionError> {
            Err(ExtractionError::Ocr("tesseract not installed".to_string()))
        }
    }

    const BROKEN_PDF: &[u8] = b"%PDF-1.4\nthis is not a real pdf body";

    #[tokio::test]
    async fn test_plain_text_passes_through() {
        let extractor = DocumentExtractor::new(None);
        let text = extractor
            .extract("\u{feff}  数据结构\n操作系统  ".as_bytes(), Some("courses.txt"))
            .await
            .unwrap();
        assert_eq!(text, "数据结构\n操作系统");
    }

    #[tokio::test]
    async fn test_blank_text_is_no_text() {
        let extractor = DocumentExtractor::new(None);
        let err = extractor.extract(b"   \n ", None).await.unwrap_err();
        assert!(matches!(err, ExtractionError::NoText));
    }

    #[tokio::test]
    async fn test_binary_upload_is_unsupported() {
        let extractor = DocumentExtractor::new(None);
        let err = extractor
            .extract(&[0xff, 0xd8, 0xff, 0xe0, 0x00], Some("photo.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat(ref name) if name == "photo.jpg"));
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected() {
        let extractor = DocumentExtractor::new(None);
        let bytes = vec![b'a'; MAX_DOCUMENT_BYTES + 1];
        let err = extractor.extract(&bytes, None).await.unwrap_err();
        assert!(matches!(err, ExtractionError::TooLarge { .. }));
    }

    #[tokio::test]
    async fn test_unreadable_pdf_without_ocr_is_no_text() {
        let extractor = DocumentExtractor::new(None);
        let err = extractor.extract(BROKEN_PDF, Some("plan.pdf")).await.unwrap_err();
        assert!(matches!(err, ExtractionError::NoText));
    }

    #[tokio::test]
    async fn test_unreadable_pdf_falls_back_to_ocr() {
        let extractor = DocumentExtractor::new(Some(Arc::new(FixedOcr("高等数学\n线性代数"))));
        let text = extractor.extract(BROKEN_PDF, Some("scan.pdf")).await.unwrap();
        assert_eq!(text, "高等数学\n线性代数");
    }

    #[tokio::test]
    async fn test_both_paths_failing_surfaces_ocr_error() {
        let extractor = DocumentExtractor::new(Some(Arc::new(FailingOcr)));
        let err = extractor.extract(BROKEN_PDF, None).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Ocr(_)));
    }

    #[tokio::test]
    async fn test_blank_ocr_output_is_no_text() {
        let extractor = DocumentExtractor::new(Some(Arc::new(FixedOcr("  \n"))));
        let err = extractor.extract(BROKEN_PDF, None).await.unwrap_err();
        assert!(matches!(err, ExtractionError::NoText));
    }

    #[test]
    fn test_page_images_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-10.png", "page-02.png", "page-01.png", "input.pdf", "notes.png"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let pages = collect_page_images(dir.path()).unwrap();
        let names: Vec<_> = pages
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["page-01.png", "page-02.png", "page-10.png"]);
    }

    #[test]
    fn test_no_rendered_pages_is_ocr_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            collect_page_images(dir.path()),
            Err(ExtractionError::Ocr(_))
        ));
    }
}
