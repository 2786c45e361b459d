// src/extractors/section.rs

// --- Imports ---
use serde::Serialize;

// --- Constants ---
// Trigger words for the statistical-significance probe (checked case-insensitively).
// Only `STAT_SIG_MARKER` is actually located, so "significant" alone yields nothing.
const STAT_SIG_TRIGGERS: [&str; 2] = ["significant", "p-value"];
const STAT_SIG_MARKER: &str = "p-value";
const STAT_SIG_CHARS_BEFORE: usize = 100;
const STAT_SIG_CHARS_AFTER: usize = 200;

// Punctuation allowed between a heading and its body, e.g. "Abstract: ..." or "Abstract — ...".
// Only one run is dropped, so a body starting with "-12%" or "..." keeps its first chars.
const HEADING_SEPARATORS: [char; 5] = [':', '.', '-', '–', '—'];

// --- Section Probes ---
/// Fixed set of marker-delimited sections, in output order.
/// Alternatives in `start_markers` and `end_markers` are tried in order; the
/// first one found wins, not the leftmost one.
pub const SECTION_PROBES: [SectionProbe; 3] = [
    SectionProbe {
        key: SectionKey::Abstract,
        start_markers: &["Abstract"],
        end_markers: &["Introduction"],
        fallback_span: 800,
        max_chars: 500,
        heading_suffixes: &[],
    },
    SectionProbe {
        key: SectionKey::KeyFindings,
        start_markers: &["Key Findings"],
        end_markers: &["Implications", "Discussion"],
        fallback_span: 1000,
        max_chars: 800,
        heading_suffixes: &[],
    },
    SectionProbe {
        key: SectionKey::Methodology,
        start_markers: &["Methodology", "Method"],
        end_markers: &["Results", "Findings"],
        fallback_span: 800,
        max_chars: 600,
        heading_suffixes: &["s"],
    },
];

// --- Data Structures ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKey {
    Abstract,
    KeyFindings,
    Methodology,
    StatSig,
}

impl SectionKey {
    pub const ALL: [SectionKey; 4] = [
        SectionKey::Abstract,
        SectionKey::KeyFindings,
        SectionKey::Methodology,
        SectionKey::StatSig,
    ];

    /// Key used in the JSON record.
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKey::Abstract => "abstract",
            SectionKey::KeyFindings => "keyFindings",
            SectionKey::Methodology => "methodology",
            SectionKey::StatSig => "statSig",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SectionProbe {
    pub key: SectionKey,
    pub start_markers: &'static [&'static str],
    pub end_markers: &'static [&'static str],
    pub fallback_span: usize, // chars after the marker index when no end marker is found
    pub max_chars: usize,
    pub heading_suffixes: &'static [&'static str], // completes a heading word, e.g. "Method" + "s"
}

/// A located section. All offsets are byte offsets on char boundaries of the document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSpan {
    pub key: SectionKey,
    pub marker: usize, // where the start marker was found
    pub start: usize,  // first byte of the excerpt window
    pub end: usize,    // exclusive
    pub max_chars: usize,
}

/// Excerpts keyed by section. Absent sections are skipped on serialization,
/// and present keys always serialize in `SectionKey::ALL` order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InsightsRecord {
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(rename = "keyFindings", skip_serializing_if = "Option::is_none")]
    pub key_findings: Option<String>,
    #[serde(rename = "methodology", skip_serializing_if = "Option::is_none")]
    pub methodology: Option<String>,
    #[serde(rename = "statSig", skip_serializing_if = "Option::is_none")]
    pub stat_sig: Option<String>,
}

impl InsightsRecord {
    pub fn get(&self, key: SectionKey) -> Option<&str> {
        match key {
            SectionKey::Abstract => self.abstract_text.as_deref(),
            SectionKey::KeyFindings => self.key_findings.as_deref(),
            SectionKey::Methodology => self.methodology.as_deref(),
            SectionKey::StatSig => self.stat_sig.as_deref(),
        }
    }

    pub fn insert(&mut self, key: SectionKey, excerpt: String) {
        let slot = match key {
            SectionKey::Abstract => &mut self.abstract_text,
            SectionKey::KeyFindings => &mut self.key_findings,
            SectionKey::Methodology => &mut self.methodology,
            SectionKey::StatSig => &mut self.stat_sig,
        };
        *slot = Some(excerpt);
    }

    /// Keys present in the record, in output order.
    pub fn present_keys(&self) -> Vec<SectionKey> {
        SectionKey::ALL
            .into_iter()
            .filter(|key| self.get(*key).is_some())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present_keys().is_empty()
    }
}

// --- Main Extractor Structure ---
pub struct SectionExtractor;

impl SectionExtractor {
    pub fn new() -> Self { Self {} }

    /// Runs every probe against the full document text and collects the excerpts.
    /// Never fails: text without any markers yields an empty record.
    pub fn extract(&self, text: &str) -> InsightsRecord {
        self.excerpts(text, &self.locate(text))
    }

    /// Builds the record from spans previously located in `text`.
    pub fn excerpts(&self, text: &str, spans: &[SectionSpan]) -> InsightsRecord {
        let mut record = InsightsRecord::default();

        for span in spans {
            let excerpt = truncate_chars(text[span.start..span.end].trim(), span.max_chars);
            tracing::debug!(
                "Extracted {} ({} chars, window {}..{})",
                span.key.as_str(),
                excerpt.chars().count(),
                span.start,
                span.end
            );
            record.insert(span.key, excerpt.to_string());
        }

        record
    }

    /// Finds the excerpt window of every section present in `text`.
    /// Each probe searches the whole text independently of the others.
    pub fn locate(&self, text: &str) -> Vec<SectionSpan> {
        let mut spans: Vec<SectionSpan> = SECTION_PROBES
            .iter()
            .filter_map(|probe| locate_marked_section(text, probe))
            .collect();
        spans.extend(locate_stat_sig(text));
        spans
    }
}

impl Default for SectionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

// --- Probe Helpers ---

fn locate_marked_section(text: &str, probe: &SectionProbe) -> Option<SectionSpan> {
    let (marker, marker_at) = probe
        .start_markers
        .iter()
        .find_map(|m| text.find(m).map(|at| (*m, at)))?;
    tracing::trace!("Found start marker '{}' for {} at {}", marker, probe.key.as_str(), marker_at);

    let end = probe
        .end_markers
        .iter()
        .find_map(|m| find_from(text, m, marker_at))
        .unwrap_or_else(|| {
            tracing::debug!(
                "No end marker for {}, using fallback of {} chars",
                probe.key.as_str(),
                probe.fallback_span
            );
            advance_chars(text, marker_at, probe.fallback_span)
        });

    let start = skip_heading(text, marker_at + marker.len(), probe.heading_suffixes).min(end);

    Some(SectionSpan {
        key: probe.key,
        marker: marker_at,
        start,
        end,
        max_chars: probe.max_chars,
    })
}

fn locate_stat_sig(text: &str) -> Option<SectionSpan> {
    let lowered = text.to_lowercase();
    if !STAT_SIG_TRIGGERS.iter().any(|t| lowered.contains(t)) {
        return None;
    }

    let Some(marker_at) = find_ignore_ascii_case(text, STAT_SIG_MARKER) else {
        tracing::debug!("Significance wording present but no '{}' found", STAT_SIG_MARKER);
        return None;
    };

    Some(SectionSpan {
        key: SectionKey::StatSig,
        marker: marker_at,
        start: retreat_chars(text, marker_at, STAT_SIG_CHARS_BEFORE),
        end: advance_chars(text, marker_at, STAT_SIG_CHARS_AFTER),
        max_chars: STAT_SIG_CHARS_BEFORE + STAT_SIG_CHARS_AFTER,
    })
}

/// Byte offset where the body after a heading starts.
///
/// A listed suffix is skipped only when it ends the word (`Methods:` but not `Methodsology`).
/// One separator run is dropped if it touches the heading (`Abstract:`) or stands alone
/// between whitespace (`Abstract — `). Text glued to the heading is kept as body.
fn skip_heading(text: &str, from: usize, suffixes: &[&str]) -> usize {
    let mut rest = &text[from..];

    if let Some(after) = suffixes
        .iter()
        .find_map(move |suffix| rest.strip_prefix(*suffix))
        .filter(|after| !after.starts_with(char::is_alphanumeric))
    {
        rest = after;
    }

    let touching = rest.trim_start_matches(is_heading_separator);
    if touching.len() < rest.len() {
        rest = touching;
    } else {
        let spaced = rest.trim_start();
        let after_run = spaced.trim_start_matches(is_heading_separator);
        if after_run.len() < spaced.len()
            && (after_run.is_empty() || after_run.starts_with(char::is_whitespace))
        {
            rest = after_run;
        }
    }

    text.len() - rest.trim_start().len()
}

fn is_heading_separator(c: char) -> bool {
    HEADING_SEPARATORS.contains(&c)
}

// --- Char-Safe String Helpers ---

fn find_from(text: &str, needle: &str, from: usize) -> Option<usize> {
    text[from..].find(needle).map(|at| from + at)
}

// Byte-wise ASCII case folding keeps offsets valid in the original text.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

/// Byte offset `count` chars after `from`, clamped to the end of the text.
fn advance_chars(text: &str, from: usize, count: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(count)
        .map_or(text.len(), |(at, _)| from + at)
}

/// Byte offset `count` chars before `from`, clamped to the start of the text.
fn retreat_chars(text: &str, from: usize, count: usize) -> usize {
    text[..from]
        .char_indices()
        .rev()
        .take(count)
        .last()
        .map_or(from, |(at, _)| at)
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((at, _)) => &s[..at],
        None => s,
    }
}
