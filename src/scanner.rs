use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::SectionResult;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]+").unwrap());

/// Counts produced by one pass over the text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterStats {
    pub chinese: usize,
    pub english: usize,
    pub words: usize,
    pub round: usize,
    pub square: usize,
    pub curly: usize,
    pub symmetric: bool,
}

fn is_chinese(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

fn closer_for(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    }
}

/// Count words as maximal runs of ASCII letters.
pub fn count_words(text: &str) -> usize {
    WORD_RE.find_iter(text).count()
}

/// Classify every code point, tally brackets, and check nesting on a single
/// stack shared by all three bracket families.
pub fn scan(text: &str) -> SectionResult<CharacterStats> {
    let mut stats = CharacterStats::default();
    let mut stack: Vec<char> = Vec::new();
    let mut mismatched = false;

    for c in text.chars() {
        if is_chinese(c) {
            stats.chinese += 1;
        } else if c.is_ascii_alphabetic() {
            stats.english += 1;
        }

        match c {
            '(' | ')' => stats.round += 1,
            '[' | ']' => stats.square += 1,
            '{' | '}' => stats.curly += 1,
            _ => {}
        }

        if closer_for(c).is_some() {
            stack.push(c);
        } else if matches!(c, ')' | ']' | '}') {
            // Keep scanning after a mismatch; the counts must cover the whole text.
            match stack.pop().and_then(closer_for) {
                Some(expected) if expected == c => {}
                _ => mismatched = true,
            }
        }
    }

    stats.words = count_words(text);
    stats.symmetric = !mismatched && stack.is_empty();
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chinese_takes_priority_and_letters_are_ascii_only() {
        let stats = scan("中文abc é 一").unwrap();
        assert_eq!(stats.chinese, 3);
        assert_eq!(stats.english, 3);
        assert_eq!(stats.words, 1);
    }

    #[test]
    fn words_split_on_non_letters() {
        assert_eq!(count_words("hello, world42foo bar_baz"), 5);
        assert_eq!(count_words("123 !!"), 0);
    }

    #[test]
    fn mismatch_does_not_stop_counting() {
        let stats = scan(")((").unwrap();
        assert!(!stats.symmetric);
        assert_eq!(stats.round, 3);
    }

    #[test]
    fn closing_on_empty_stack_is_asymmetric() {
        assert!(!scan("]").unwrap().symmetric);
    }

    #[test]
    fn no_brackets_is_symmetric() {
        assert!(scan("plain text").unwrap().symmetric);
    }
}
