//! Text statistics shared by quality scoring and reader support
//!
//! All counts are defined over whitespace-delimited words and
//! `.`/`!`/`?`-delimited sentences so that scores are reproducible for a
//! given story text.

use crate::AgeBand;

/// Number of whitespace-delimited words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Number of non-empty sentences, split on `.`, `!` and `?`
///
/// A trailing fragment without terminal punctuation counts as a sentence.
pub fn sentence_count(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
}

/// Average words per sentence; 0.0 for empty text
#[allow(clippy::cast_precision_loss)]
pub fn avg_words_per_sentence(text: &str) -> f64 {
    let sentences = sentence_count(text);
    if sentences == 0 {
        return 0.0;
    }
    word_count(text) as f64 / sentences as f64
}

/// Average letters per word, ignoring punctuation and digits; 0.0 for
/// text without any lettered words
#[allow(clippy::cast_precision_loss)]
pub fn avg_word_length(text: &str) -> f64 {
    let mut letters = 0usize;
    let mut words = 0usize;
    for word in text.split_whitespace() {
        let len = word.chars().filter(|c| c.is_alphabetic()).count();
        if len > 0 {
            letters += len;
            words += 1;
        }
    }
    if words == 0 {
        return 0.0;
    }
    letters as f64 / words as f64
}

/// Estimated reading time in seconds at 200 words per minute
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn reading_time_secs(words: usize) -> u32 {
    ((words as f32 / 200.0) * 60.0) as u32
}

/// Stretch words for the reader-support UI
///
/// Words longer than the band's expected word length, lowercased and
/// stripped to letters, deduplicated, longest first (ties alphabetical),
/// capped at ten.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn vocabulary_words(text: &str, band: AgeBand) -> Vec<String> {
    let threshold = band.expected_word_length() as usize;
    let mut words: Vec<String> = text
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphabetic())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|w| w.chars().count() > threshold)
        .collect();
    // Equal strings sort adjacently, so dedup after sort is complete.
    words.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    words.dedup();
    words.truncate(10);
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_words_and_sentences() {
        let text = "The fox ran. The owl watched! Did the moon rise?";
        assert_eq!(word_count(text), 10);
        assert_eq!(sentence_count(text), 3);
    }

    #[test]
    fn trailing_fragment_counts_as_sentence() {
        assert_eq!(sentence_count("One. And then"), 2);
    }

    #[test]
    fn average_words_per_sentence() {
        let text = "One two three. Four five six.";
        assert!((avg_words_per_sentence(text) - 3.0).abs() < f64::EPSILON);
        assert!(avg_words_per_sentence("").abs() < f64::EPSILON);
    }

    #[test]
    fn average_word_length_ignores_punctuation() {
        // "cat," and "dog!" both measure three letters
        let text = "cat, dog!";
        assert!((avg_word_length(text) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reading_time_uses_two_hundred_wpm() {
        assert_eq!(reading_time_secs(200), 60);
        assert_eq!(reading_time_secs(100), 30);
        assert_eq!(reading_time_secs(0), 0);
    }

    #[test]
    fn vocabulary_words_are_deduped_and_capped() {
        let text = "The magnificent, magnificent adventure of a curious firefly";
        let words = vocabulary_words(text, AgeBand::Preschool);
        assert_eq!(
            words,
            vec![
                "magnificent".to_owned(),
                "adventure".to_owned(),
                "curious".to_owned(),
                "firefly".to_owned(),
            ]
        );
    }

    #[test]
    fn vocabulary_threshold_follows_age_band() {
        let text = "wonder wonderously";
        assert_eq!(
            vocabulary_words(text, AgeBand::Preschool),
            vec!["wonderously".to_owned(), "wonder".to_owned()]
        );
        assert_eq!(
            vocabulary_words(text, AgeBand::MiddleGrade),
            vec!["wonderously".to_owned()]
        );
    }
}
