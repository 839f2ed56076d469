use lopdf::Document;

/// Extract the text of every page, in page order, joined with newlines.
pub(super) fn extract_text(bytes: &[u8]) -> Result<String, String> {
    let document = Document::load_mem(bytes).map_err(|error| error.to_string())?;

    let mut pages = Vec::new();
    for page_number in document.get_pages().into_keys() {
        let text = document
            .extract_text(&[page_number])
            .map_err(|error| format!("page {page_number}: {error}"))?;
        // lopdf terminates each page with its own newline.
        pages.push(text.trim_end().to_string());
    }

    tracing::debug!(pages = pages.len(), "Extracted PDF pages");
    Ok(pages.join("\n").trim().to_string())
}
