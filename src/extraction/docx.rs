use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::{Cursor, Read};

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract the text of every paragraph in the main document part, joined with newlines.
pub(super) fn extract_text(bytes: &[u8]) -> Result<String, String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| format!("Failed to open DOCX: {e}"))?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| format!("Missing {DOCUMENT_PART}: {e}"))?
        .read_to_string(&mut xml)
        .map_err(|e| format!("Failed to read {DOCUMENT_PART}: {e}"))?;

    let paragraphs = paragraphs(&xml)?;
    tracing::debug!(paragraphs = paragraphs.len(), "Extracted DOCX paragraphs");
    Ok(paragraphs.join("\n").trim().to_string())
}

/// Collect `w:p` paragraphs; runs are concatenated, tabs and breaks become whitespace.
fn paragraphs(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    // Text boxes nest whole paragraphs inside a run; each level keeps its own buffer.
    let mut open: Vec<String> = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => match element.name().as_ref() {
                b"w:p" => open.push(String::new()),
                b"w:t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(element)) => match element.name().as_ref() {
                b"w:p" => paragraphs.push(String::new()),
                b"w:tab" => push_text(&mut open, "\t"),
                b"w:br" | b"w:cr" => push_text(&mut open, "\n"),
                _ => {}
            },
            Ok(Event::End(element)) => match element.name().as_ref() {
                b"w:p" => paragraphs.extend(open.pop()),
                b"w:t" => in_text = false,
                _ => {}
            },
            Ok(Event::Text(text)) if in_text => {
                let text = text
                    .unescape()
                    .map_err(|e| format!("Invalid text at byte {}: {e}", reader.buffer_position()))?;
                push_text(&mut open, &text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "Malformed {DOCUMENT_PART} at byte {}: {e}",
                    reader.buffer_position()
                ));
            }
            Ok(_) => {}
        }
    }

    Ok(paragraphs)
}

fn push_text(open: &mut [String], text: &str) {
    if let Some(paragraph) = open.last_mut() {
        paragraph.push_str(text);
    }
}
