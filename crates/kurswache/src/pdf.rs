#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("failed to extract text from PDF: {0}")]
    Extract(#[from] pdf_extract::OutputError),
}

/// Pulls the plain text out of a catalog PDF export. The layout is irregular
/// across exports, so callers segment this text positionally by course id
/// instead of reading table cells.
pub fn extract_text(bytes: &[u8]) -> Result<String, PdfError> {
    Ok(pdf_extract::extract_text_from_mem(bytes)?)
}
