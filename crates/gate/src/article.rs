//! The generated article and its markdown structure.
//!
//! An [`Article`] is immutable once built: the workflow constructs one per
//! generation attempt and a retry produces a new value rather than editing the
//! previous one.

use serde::{Deserialize, Serialize};

use crate::{Keyword, TargetWordCount, WordCount};

/// Characters stripped before counting words (markdown emphasis, headings,
/// links, and code markers).
const MARKDOWN_SYNTAX: &[char] = &['#', '*', '_', '`', '[', ']', '(', ')'];

/// One section of an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Heading text without the leading `#` markers. `None` for the
    /// introduction (text before the first sub-heading).
    pub heading: Option<String>,
    /// Heading level (2 for `##`, 3 for `###`); 0 for the introduction.
    pub level: u8,
    /// Section body, excluding the heading line.
    pub body: String,
}

/// A generated article plus the metadata the gate scores it against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    markdown: String,
    title: Option<String>,
    sections: Vec<Section>,
    target_word_count: TargetWordCount,
    main_keyword: Option<Keyword>,
    attempt: u32,
}

impl Article {
    /// Parses markdown into an article aimed at `target_word_count` words.
    pub fn from_markdown(markdown: impl Into<String>, target_word_count: TargetWordCount) -> Self {
        let markdown = markdown.into();
        let (title, sections) = parse_sections(&markdown);
        Self {
            markdown,
            title,
            sections,
            target_word_count,
            main_keyword: None,
            attempt: 1,
        }
    }

    /// Sets the keyword the title and opening paragraph are checked for.
    #[must_use]
    pub fn with_main_keyword(mut self, keyword: Option<Keyword>) -> Self {
        self.main_keyword = keyword;
        self
    }

    /// Records which generation attempt produced this article (1-based).
    #[must_use]
    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self
    }

    /// Returns the raw markdown body.
    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    /// Returns the level-1 heading text, if the article has one.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the parsed sections in document order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Returns the headings of the level-2 sections in document order.
    pub fn section_headings(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .filter(|s| s.level == 2)
            .filter_map(|s| s.heading.as_deref())
    }

    pub fn target_word_count(&self) -> TargetWordCount {
        self.target_word_count
    }

    pub fn main_keyword(&self) -> Option<&Keyword> {
        self.main_keyword.as_ref()
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Counts the words of the body after stripping markdown syntax.
    pub fn word_count(&self) -> WordCount {
        count_words(&self.markdown)
    }

    /// Returns `true` if the body has no visible text.
    pub fn is_blank(&self) -> bool {
        self.markdown.trim().is_empty()
    }
}

/// Counts whitespace-separated words after removing markdown syntax
/// characters.
pub fn count_words(text: &str) -> WordCount {
    let stripped: String = text.chars().filter(|c| !MARKDOWN_SYNTAX.contains(c)).collect();
    let count = stripped.split_whitespace().count();
    WordCount::new(u32::try_from(count).unwrap_or(u32::MAX))
}

/// Returns the heading level and text if `line` is an ATX heading
/// (`#` to `######` followed by whitespace or end of line).
pub fn heading_level(line: &str) -> Option<(u8, &str)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        // `hashes` is at most 6, so the cast cannot truncate.
        Some((hashes as u8, rest.trim()))
    } else {
        None
    }
}

fn parse_sections(markdown: &str) -> (Option<String>, Vec<Section>) {
    let mut title = None;
    let mut sections = Vec::new();
    let mut current = Section {
        heading: None,
        level: 0,
        body: String::new(),
    };

    for line in markdown.lines() {
        match heading_level(line) {
            Some((1, text)) if title.is_none() => {
                title = Some(text.to_string());
            }
            Some((level, text)) if level >= 2 => {
                push_section(&mut sections, current);
                current = Section {
                    heading: Some(text.to_string()),
                    level,
                    body: String::new(),
                };
            }
            _ => {
                if !current.body.is_empty() {
                    current.body.push('\n');
                }
                current.body.push_str(line);
            }
        }
    }
    push_section(&mut sections, current);

    (title, sections)
}

fn push_section(sections: &mut Vec<Section>, mut section: Section) {
    section.body = section.body.trim().to_string();
    // An introduction with no text is not a section.
    if section.heading.is_none() && section.body.is_empty() {
        return;
    }
    sections.push(section);
}
