//! Text scanners used by the scoring engine.
//!
//! All functions are pure and deterministic. Phrase matching is done on the
//! lower-cased article, so marker lists are lower-cased before comparison.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::article::heading_level;

static SUCCESS_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}\s*[-–]\s*\d{1,3}\s*%").expect("valid regex"));

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*[^*]+\*\*").expect("valid regex"));

/// Pre-computed views of an article body shared by all checks.
pub(crate) struct TextView<'a> {
    pub raw: &'a str,
    pub lower: String,
    /// Prose paragraphs: blank-line separated blocks with heading and list
    /// lines removed, joined into one line each.
    pub paragraphs: Vec<String>,
}

impl<'a> TextView<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            lower: raw.to_lowercase(),
            paragraphs: prose_paragraphs(raw),
        }
    }
}

fn prose_paragraphs(raw: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    let mut flush = |block: &mut Vec<&str>| {
        let prose: Vec<&str> = block
            .iter()
            .map(|l| l.trim())
            .filter(|l| heading_level(l).is_none() && !is_list_item(l))
            .collect();
        if !prose.is_empty() {
            paragraphs.push(prose.join(" "));
        }
        block.clear();
    };

    for line in raw.lines() {
        if line.trim().is_empty() {
            flush(&mut block);
        } else {
            block.push(line);
        }
    }
    flush(&mut block);
    paragraphs
}

/// Returns `true` for bullet (`- `, `* `, `+ `) and numbered (`1. `) items.
pub(crate) fn is_list_item(line: &str) -> bool {
    let line = line.trim_start();
    let mut chars = line.chars();
    match chars.next() {
        Some('-' | '*' | '+') => chars.next().is_some_and(char::is_whitespace),
        Some(c) if c.is_ascii_digit() => {
            let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
            rest.starts_with(". ") || rest.starts_with(") ")
        }
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Phrase markers
// ---------------------------------------------------------------------------

/// Total non-overlapping occurrences of every needle in `lower`.
pub(crate) fn count_occurrences(lower: &str, needles: &[String]) -> usize {
    needles
        .iter()
        .map(|n| n.to_lowercase())
        .filter(|n| !n.is_empty())
        .map(|n| lower.matches(n.as_str()).count())
        .sum()
}

/// Builds a case-insensitive matcher for any of `words` as a whole word.
///
/// Returns `Ok(None)` when every entry is blank.
pub(crate) fn whole_words(words: &[String]) -> Result<Option<Regex>, regex::Error> {
    let alternatives: Vec<String> = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(regex::escape)
        .collect();
    if alternatives.is_empty() {
        return Ok(None);
    }
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|"))).map(Some)
}

pub(crate) fn contains_any(lower: &str, needles: &[String]) -> bool {
    count_occurrences(lower, needles) > 0
}

/// Number of configured pairs whose both terms appear.
pub(crate) fn contradiction_pairs(lower: &str, pairs: &[(String, String)]) -> u32 {
    let hits = pairs
        .iter()
        .filter(|(a, b)| lower.contains(&a.to_lowercase()) && lower.contains(&b.to_lowercase()))
        .count();
    u32::try_from(hits).unwrap_or(u32::MAX)
}

/// Returns `(explained, mentioned)` for the configured technical terms.
///
/// A term counts as explained when some occurrence is followed, later on the
/// same line, by a non-empty parenthesised text.
pub(crate) fn explained_terms(lower: &str, terms: &[String]) -> (usize, usize) {
    let mut explained = 0;
    let mut mentioned = 0;
    for term in terms.iter().map(|t| t.to_lowercase()).filter(|t| !t.is_empty()) {
        if !lower.contains(&term) {
            continue;
        }
        mentioned += 1;
        let has_explanation = lower.lines().any(|line| {
            line.match_indices(term.as_str())
                .any(|(idx, _)| has_parenthetical(&line[idx + term.len()..]))
        });
        if has_explanation {
            explained += 1;
        }
    }
    (explained, mentioned)
}

fn has_parenthetical(rest: &str) -> bool {
    rest.match_indices('(').any(|(open, _)| {
        let after = &rest[open + 1..];
        matches!(after.find(')'), Some(close) if close > 0)
    })
}

// ---------------------------------------------------------------------------
// Medical claims
// ---------------------------------------------------------------------------

/// Occurrences of success-rate ranges such as `75-85%`.
pub(crate) fn success_ranges(raw: &str) -> usize {
    SUCCESS_RANGE.find_iter(raw).count()
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

/// Splits prose into sentences on `.`, `!` and `?`.
pub(crate) fn sentences(paragraph: &str) -> impl Iterator<Item = &str> {
    paragraph
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn normalise(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Counts repeated paragraphs, plus repeated sentences inside paragraphs that
/// are not themselves repeats. Sentences under `min_words` words are ignored.
pub(crate) fn duplicate_count(paragraphs: &[String], min_words: usize) -> u32 {
    let mut seen_paragraphs = HashSet::new();
    let mut seen_sentences = HashSet::new();
    let mut duplicates = 0u32;

    for paragraph in paragraphs {
        if !seen_paragraphs.insert(normalise(paragraph)) {
            duplicates += 1;
            continue;
        }
        for sentence in sentences(paragraph) {
            if sentence.split_whitespace().count() < min_words {
                continue;
            }
            if !seen_sentences.insert(normalise(sentence)) {
                duplicates += 1;
            }
        }
    }
    duplicates
}

/// Paragraphs with fewer than `min` or more than `max` sentences.
pub(crate) fn paragraph_length_violations(paragraphs: &[String], min: usize, max: usize) -> u32 {
    let bad = paragraphs
        .iter()
        .filter(|p| {
            let n = sentences(p).count();
            n < min || n > max
        })
        .count();
    u32::try_from(bad).unwrap_or(u32::MAX)
}

/// Headings immediately followed by a non-blank line.
pub(crate) fn abrupt_transitions(raw: &str) -> u32 {
    let lines: Vec<&str> = raw.lines().collect();
    let abrupt = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| heading_level(line).is_some())
        .filter(|(i, _)| lines.get(i + 1).is_some_and(|next| !next.trim().is_empty()))
        .count();
    u32::try_from(abrupt).unwrap_or(u32::MAX)
}

/// Counts places where an expected section appears before one that should
/// precede it.
///
/// Each heading is matched to the first flow term it contains; a later
/// heading matching the same term replaces the earlier position.
pub(crate) fn flow_inversions<'h>(
    headings: impl Iterator<Item = &'h str>,
    flow: &[String],
) -> u32 {
    let flow: Vec<String> = flow.iter().map(|t| t.to_lowercase()).collect();
    let mut positions: Vec<Option<usize>> = vec![None; flow.len()];

    for (index, heading) in headings.enumerate() {
        let heading = heading.to_lowercase();
        if let Some(term) = flow.iter().position(|t| !t.is_empty() && heading.contains(t)) {
            positions[term] = Some(index);
        }
    }

    let mut inversions = 0;
    let mut previous: Option<usize> = None;
    for position in positions.into_iter().flatten() {
        if previous.is_some_and(|p| position < p) {
            inversions += 1;
        }
        previous = Some(position);
    }
    inversions
}

// ---------------------------------------------------------------------------
// Markdown
// ---------------------------------------------------------------------------

pub(crate) fn has_heading_level(raw: &str, level: u8) -> bool {
    raw.lines()
        .filter_map(heading_level)
        .any(|(l, _)| l == level)
}

pub(crate) fn has_bold(raw: &str) -> bool {
    BOLD.is_match(raw)
}

pub(crate) fn has_list(raw: &str) -> bool {
    raw.lines().any(is_list_item)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_prose_paragraphs_skip_headings_and_lists() {
        let raw = "# Τίτλος\n\nΠρώτη πρόταση. Δεύτερη.\n\n## Ενότητα\n- α\n- β\n\nΤελευταία\nγραμμή.";
        let view = TextView::new(raw);
        assert_eq!(
            view.paragraphs,
            vec!["Πρώτη πρόταση. Δεύτερη.", "Τελευταία γραμμή."]
        );
    }

    #[test]
    fn test_list_items() {
        assert!(is_list_item("- item"));
        assert!(is_list_item("  * item"));
        assert!(is_list_item("12. item"));
        assert!(!is_list_item("**bold**"));
        assert!(!is_list_item("-5 degrees"));
        assert!(!is_list_item("2024 was"));
    }

    #[test]
    fn test_count_occurrences_matches_substrings() {
        let lower = "η θεραπεία διαρκεί. η θεραπεία αποδίδει. μηνίσκου ρήξη";
        assert_eq!(count_occurrences(lower, &owned(&["η θεραπεία"])), 2);
        assert_eq!(count_occurrences(lower, &owned(&["μηνίσκος"])), 0);
    }

    #[test]
    fn test_whole_words_at_line_start_and_before_punctuation() {
        let matcher = whole_words(&owned(&["εγώ", "μου", "μας"])).unwrap().unwrap();
        let text = "Εγώ εξετάζω κάθε ασθενή.\nΗ ομάδα μου, επίσης. Στο ιατρείο μας.";
        assert_eq!(matcher.find_iter(text).count(), 3);
    }

    #[test]
    fn test_whole_words_ignore_longer_words() {
        let matcher = whole_words(&owned(&["μου", "μας"])).unwrap().unwrap();
        assert!(!matcher.is_match("η μουσική και τα μαστικά του μηνίσκου"));
    }

    #[test]
    fn test_whole_words_skip_blank_entries() {
        assert!(whole_words(&owned(&["", "  "])).unwrap().is_none());
    }

    #[test]
    fn test_explained_terms() {
        let lower = "ο χόνδρος (το προστατευτικό στρώμα) φθείρεται.\nη αρθρίτιδα επηρεάζει.";
        let terms = owned(&["χόνδρος", "αρθρίτιδα", "μηνίσκος"]);
        assert_eq!(explained_terms(lower, &terms), (1, 2));
        assert_eq!(explained_terms("ο χόνδρος ()", &owned(&["χόνδρος"])), (0, 1));
    }

    #[test]
    fn test_success_ranges() {
        assert_eq!(success_ranges("ποσοστά 75-85% και 60 – 70 %"), 2);
        assert_eq!(success_ranges("ποσοστό 80%"), 0);
    }

    #[test]
    fn test_duplicate_count() {
        let paragraphs = owned(&[
            "Η αρθροσκόπηση γίνεται με τοπική αναισθησία. Δεύτερη πρόταση εδώ μέσα.",
            "Η αρθροσκόπηση γίνεται με τοπική αναισθησία. Δεύτερη πρόταση εδώ μέσα.",
            "Νέα παράγραφος με νέο περιεχόμενο. Η αρθροσκόπηση γίνεται με τοπική αναισθησία.",
            "Σύντομη. Σύντομη.",
        ]);
        // one repeated paragraph + one repeated sentence; short sentences ignored
        assert_eq!(duplicate_count(&paragraphs, 4), 2);
    }

    #[test]
    fn test_paragraph_length_violations() {
        let paragraphs = owned(&["Μία.", "Μία. Δύο.", "α. β. γ. δ. ε. στ."]);
        assert_eq!(paragraph_length_violations(&paragraphs, 2, 5), 2);
    }

    #[test]
    fn test_abrupt_transitions() {
        let raw = "# T\n\n## A\nκείμενο\n\n## B\n\nκείμενο\n## C";
        assert_eq!(abrupt_transitions(raw), 1);
    }

    #[test]
    fn test_flow_inversions() {
        let flow = owned(&["ανατομία", "συμπτώματα", "θεραπεία"]);
        let ordered = ["Ανατομία", "Συμπτώματα", "Θεραπεία"];
        assert_eq!(flow_inversions(ordered.into_iter(), &flow), 0);

        let swapped = ["Θεραπεία", "Ανατομία", "Συμπτώματα"];
        assert_eq!(flow_inversions(swapped.into_iter(), &flow), 1);
    }

    #[test]
    fn test_markdown_elements() {
        let raw = "# T\n\n## A\n\n**έντονο** και\n- λίστα";
        assert!(has_heading_level(raw, 1));
        assert!(has_heading_level(raw, 2));
        assert!(!has_heading_level(raw, 3));
        assert!(has_bold(raw));
        assert!(has_list(raw));
        assert!(!has_bold("**"));
    }

    #[test]
    fn test_contradiction_pairs() {
        let pairs = vec![
            ("αυξάνει".to_string(), "μειώνει".to_string()),
            ("ασφαλής".to_string(), "επικίνδυνος".to_string()),
        ];
        assert_eq!(contradiction_pairs("αυξάνει και μειώνει", &pairs), 1);
        assert_eq!(contradiction_pairs("ασφαλής", &pairs), 0);
    }
}
