//! Quality processing for extracted text.
//!
//! A [`CleanupPipeline`] applies an ordered list of [`CleanupStep`]s. The
//! adapter runs the standard list when `quality_processing` is on.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// One normalization pass over the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupStep {
    /// Compose combining sequences (NFC)
    Nfc,
    /// Expand presentation-form ligatures such as `ﬁ`
    Ligatures,
    /// Drop private-use, replacement, zero-width and control characters
    StrayCharacters,
    /// Rejoin words split across a line break, e.g. `infor-\nmation`
    Hyphenation,
    /// Collapse blanks inside lines and trim every line
    Whitespace,
    /// Keep at most this many consecutive empty lines
    BlankLines(usize),
}

/// Ordered cleanup steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOptions {
    pub steps: Vec<CleanupStep>,
}

impl CleanupOptions {
    /// NFC and whitespace only.
    pub fn minimal() -> Self {
        Self {
            steps: vec![CleanupStep::Nfc, CleanupStep::Whitespace],
        }
    }

    /// Steps used by quality processing.
    pub fn standard() -> Self {
        Self {
            steps: vec![
                CleanupStep::Nfc,
                CleanupStep::Ligatures,
                CleanupStep::StrayCharacters,
                CleanupStep::Hyphenation,
                CleanupStep::Whitespace,
                CleanupStep::BlankLines(1),
            ],
        }
    }
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self::standard()
    }
}

fn hyphenation_regex() -> &'static Regex {
    static HYPHEN: OnceLock<Regex> = OnceLock::new();
    HYPHEN.get_or_init(|| Regex::new(r"(\p{L})-[ \t]*\n[ \t]*(\p{Ll})").unwrap())
}

fn blanks_regex() -> &'static Regex {
    static BLANKS: OnceLock<Regex> = OnceLock::new();
    BLANKS.get_or_init(|| Regex::new(r"[ \t\u{00A0}]+").unwrap())
}

fn ligature(c: char) -> Option<&'static str> {
    Some(match c {
        '\u{FB00}' => "ff",
        '\u{FB01}' => "fi",
        '\u{FB02}' => "fl",
        '\u{FB03}' => "ffi",
        '\u{FB04}' => "ffl",
        '\u{FB05}' | '\u{FB06}' => "st",
        _ => return None,
    })
}

fn is_stray(c: char) -> bool {
    matches!(c,
        '\u{E000}'..='\u{F8FF}'
        | '\u{F0000}'..='\u{FFFFD}'
        | '\u{100000}'..='\u{10FFFD}'
        | '\u{FFFD}'
        | '\u{200B}'..='\u{200D}'
        | '\u{FEFF}')
        || (c.is_control() && c != '\n' && c != '\t')
}

fn limit_blank_lines(text: &str, max: usize) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut blanks = 0;
    for line in text.lines() {
        if line.trim().is_empty() {
            blanks += 1;
            if blanks > max {
                continue;
            }
        } else {
            blanks = 0;
        }
        out.push(line);
    }
    out.join("\n")
}

/// Applies [`CleanupOptions`] to text.
#[derive(Debug, Clone, Default)]
pub struct CleanupPipeline {
    options: CleanupOptions,
}

impl CleanupPipeline {
    pub fn new(options: CleanupOptions) -> Self {
        Self { options }
    }

    /// Run every step in order and trim the result.
    pub fn process(&self, text: &str) -> String {
        let mut text = text.replace("\r\n", "\n");

        for step in &self.options.steps {
            text = match *step {
                CleanupStep::Nfc => text.nfc().collect(),
                CleanupStep::Ligatures => {
                    let mut out = String::with_capacity(text.len());
                    for c in text.chars() {
                        match ligature(c) {
                            Some(expanded) => out.push_str(expanded),
                            None => out.push(c),
                        }
                    }
                    out
                }
                CleanupStep::StrayCharacters => text.chars().filter(|c| !is_stray(*c)).collect(),
                CleanupStep::Hyphenation => {
                    hyphenation_regex().replace_all(&text, "$1$2").into_owned()
                }
                CleanupStep::Whitespace => text
                    .lines()
                    .map(|line| blanks_regex().replace_all(line, " ").trim().to_string())
                    .collect::<Vec<_>>()
                    .join("\n"),
                CleanupStep::BlankLines(max) => limit_blank_lines(&text, max),
            };
        }

        text.trim().to_string()
    }
}
