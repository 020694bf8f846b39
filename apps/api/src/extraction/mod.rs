//! Text extraction boundaries: uploaded documents → plain text, and
//! model sub-reports → ordered item lists.

use thiserror::Error;

pub mod document;

pub use document::{DocumentExtractor, OcrEngine, TesseractOcr};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Document is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("No text could be extracted from the document")]
    NoText,

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("No items extracted under heading '{heading}'")]
    NoItems { heading: String },
}

impl ExtractionError {
    /// Actionable message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            ExtractionError::UnsupportedFormat(_) => {
                "暂不支持该文件格式，请上传 PDF 或纯文本文件。".to_string()
            }
            ExtractionError::TooLarge { limit, .. } => {
                format!("文件过大，请上传不超过 {} MB 的文件。", limit / (1024 * 1024))
            }
            ExtractionError::NoText | ExtractionError::Ocr(_) => {
                "无法从文件中识别出文字，请确认文件清晰可读，或直接粘贴课程文本。".to_string()
            }
            ExtractionError::NoItems { heading } => format!(
                "未能从上一阶段的分析中提取到“{heading}”列表（no items extracted），请返回菜单重新开始本模式。"
            ),
        }
    }
}

/// Parses the bulleted list that follows `heading` in a model reply.
///
/// The heading may carry markdown decoration (`###`, `**…**`) and a trailing colon.
/// Blank lines between bullets are skipped; the list ends at the first non-bullet line.
pub fn extract_items(text: &str, heading: &str) -> Result<Vec<String>, ExtractionError> {
    let no_items = || ExtractionError::NoItems {
        heading: heading.to_string(),
    };

    let mut lines = text.lines();
    lines
        .by_ref()
        .find(|line| normalize_heading(line) == heading)
        .ok_or_else(no_items)?;

    let mut items = Vec::new();
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match strip_bullet(trimmed) {
            Some(item) => items.push(item.to_string()),
            None => break,
        }
    }

    if items.is_empty() {
        return Err(no_items());
    }
    Ok(items)
}

fn normalize_heading(line: &str) -> &str {
    let line = line.trim().trim_start_matches('#').trim();
    // The colon may sit inside or outside the bold markers.
    let line = line.trim_end_matches([':', '：']).trim_end();
    let line = line
        .strip_prefix("**")
        .and_then(|l| l.strip_suffix("**"))
        .unwrap_or(line)
        .trim();
    line.trim_end_matches([':', '：']).trim()
}

/// Returns the item text if `line` is a bullet (`-`, `*`, `•`) or numbered (`1.`, `1、`, `1)`) entry.
fn strip_bullet(line: &str) -> Option<&str> {
    let rest = if let Some(rest) = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix('•'))
    {
        rest
    } else {
        let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 || digits > 3 {
            return None;
        }
        let after = &line[digits..];
        let mut chars = after.chars();
        match chars.next() {
            Some('.' | '、' | ')' | '）') => chars.as_str(),
            _ => return None,
        }
    };

    let item = rest.trim();
    let item = item
        .strip_prefix("**")
        .and_then(|i| i.strip_suffix("**"))
        .unwrap_or(item)
        .trim();
    (!item.is_empty()).then_some(item)
}
