use bytes::Bytes;

use crate::errors::AppError;

/// Upper bound for an uploaded CV.
pub const MAX_CV_BYTES: usize = 10 * 1024 * 1024;

const PDF_MAGIC: &[u8] = b"%PDF-";

pub fn is_pdf(data: &[u8]) -> bool {
    data.starts_with(PDF_MAGIC)
}

/// Extracts plain text from a PDF on the blocking pool.
pub async fn extract_pdf_text(data: Bytes) -> Result<String, AppError> {
    if data.len() > MAX_CV_BYTES {
        return Err(AppError::Validation(format!(
            "CV file is larger than {} MB",
            MAX_CV_BYTES / (1024 * 1024)
        )));
    }
    if !is_pdf(&data) {
        return Err(AppError::Validation(
            "CV file must be a PDF document".to_string(),
        ));
    }

    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF extraction: {e}")))?
        .map_err(|e| AppError::Validation(format!("Could not read the PDF: {e}")))?;

    let text = normalize_whitespace(&text);
    if text.is_empty() {
        return Err(AppError::Validation(
            "The PDF contains no extractable text".to_string(),
        ));
    }
    Ok(text)
}

/// Collapses runs of blank lines and trims trailing spaces left by PDF layout.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}
