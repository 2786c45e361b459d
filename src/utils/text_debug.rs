// src/utils/text_debug.rs
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::extractors::section::SectionSpan;
use crate::utils::error::AppError;

/// Renders the document text with `[[key ...]]` / `[[/key]]` around each located excerpt
/// and `[[key marker @n]]` where its start marker was found.
/// Spans may overlap; tags are inserted in byte order.
pub fn annotate_text(text: &str, spans: &[SectionSpan]) -> String {
    let mut tags: Vec<(usize, u8, String)> = Vec::new();
    for span in spans {
        let key = span.key.as_str();
        tags.push((span.marker, 0, format!("[[{} marker @{}]]", key, span.marker)));
        tags.push((span.start, 1, format!("[[{} {}..{}]]", key, span.start, span.end)));
        tags.push((span.end, 2, format!("[[/{}]]", key)));
    }
    // Closing tags before opening ones at the same offset
    tags.sort_by_key(|(at, kind, _)| (*at, 2 - *kind));

    let mut annotated = String::with_capacity(text.len() + tags.len() * 24);
    let mut last_pos = 0;
    for (at, _, tag) in tags {
        if at > last_pos {
            annotated.push_str(&text[last_pos..at]);
            last_pos = at;
        }
        annotated.push_str(&tag);
    }
    annotated.push_str(&text[last_pos..]);
    annotated
}

/// Saves the annotated document text for debugging marker placement
pub fn save_debug_text(text: &str, spans: &[SectionSpan], filename: &Path) -> Result<(), AppError> {
    let mut file = File::create(filename)?;
    file.write_all(annotate_text(text, spans).as_bytes())?;

    tracing::info!("Saved debug text to {}", filename.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::section::SectionExtractor;

    #[test]
    fn annotates_located_sections() {
        let text = "Abstract XYZ Introduction";
        let spans = SectionExtractor::new().locate(text);
        let annotated = annotate_text(text, &spans);
        assert_eq!(
            annotated,
            "[[abstract marker @0]]Abstract [[abstract 9..13]]XYZ [[/abstract]]Introduction"
        );
    }

    #[test]
    fn text_without_spans_is_unchanged() {
        assert_eq!(annotate_text("plain text", &[]), "plain text");
    }

    #[test]
    fn writes_annotated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.txt");
        let text = "Key Findings: up. Discussion";
        let spans = SectionExtractor::new().locate(text);

        save_debug_text(text, &spans, &path).unwrap();

        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(saved.contains(
            "[[keyFindings marker @0]]Key Findings: [[keyFindings 14..18]]up. [[/keyFindings]]"
        ));
    }
}
