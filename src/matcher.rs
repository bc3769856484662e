//! Search capability consumed by the document
//!
//! Regex engines live outside the core. They plug in through [`TextMatcher`],
//! which only answers "does a match start here, and how long is it".

/// Match capability: length of the match starting at `position`, if any.
///
/// `text` is the whole document so that engines can look behind `position`
/// (word boundaries, anchors).
pub trait TextMatcher {
    fn match_at(&self, text: &[char], position: usize) -> Option<usize>;
}

/// Plain substring matcher, optionally restricted to whole words.
#[derive(Debug, Clone)]
pub struct LiteralMatcher {
    pattern: Vec<char>,
    whole_word: bool,
}

impl LiteralMatcher {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.chars().collect(),
            whole_word: false,
        }
    }

    /// Only match when not surrounded by identifier characters
    pub fn whole_word(pattern: &str) -> Self {
        Self {
            whole_word: true,
            ..Self::new(pattern)
        }
    }

    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }
}

impl TextMatcher for LiteralMatcher {
    fn match_at(&self, text: &[char], position: usize) -> Option<usize> {
        let end = position.checked_add(self.pattern.len())?;
        if self.pattern.is_empty() || end > text.len() {
            return None;
        }
        if text[position..end] != self.pattern[..] {
            return None;
        }
        if self.whole_word {
            use crate::util::is_identifier;
            let before = position > 0 && is_identifier(text[position - 1]);
            let after = end < text.len() && is_identifier(text[end]);
            if before || after {
                return None;
            }
        }
        Some(self.pattern.len())
    }
}

impl<F> TextMatcher for F
where
    F: Fn(&[char], usize) -> Option<usize>,
{
    fn match_at(&self, text: &[char], position: usize) -> Option<usize> {
        self(text, position)
    }
}
