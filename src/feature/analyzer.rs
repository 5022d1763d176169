//! Text analysis for product feature blobs.
//!
//! A deliberately small pipeline: lowercase alphanumeric tokenization,
//! English stop-word removal, then unigram + bigram term generation over the
//! surviving tokens. Bigrams are formed after stop-word removal, so
//! "vitamin and c" yields the bigram "vitamin c".

use std::collections::HashSet;
use std::sync::LazyLock;

/// Default English stop words list.
///
/// Common English words that carry no signal in product feature text.
const DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

static STOP_WORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| DEFAULT_ENGLISH_STOP_WORDS.iter().copied().collect());

/// Whether a token is an English stop word.
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token)
}

/// Split text into lowercase tokens.
///
/// Tokens are maximal alphanumeric runs of at least two characters;
/// punctuation and single characters are dropped, stop words removed.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= 2)
        .filter(|token| !is_stop_word(token))
        .map(|token| token.to_string())
        .collect()
}

/// Generate terms from a token stream: unigrams plus adjacent bigrams.
///
/// `ngram_max` of 1 yields unigrams only; 2 adds space-joined bigrams in
/// stream order after the unigrams of the same document.
pub fn terms(tokens: &[String], ngram_max: usize) -> Vec<String> {
    let mut out: Vec<String> = tokens.to_vec();
    if ngram_max >= 2 {
        for window in tokens.windows(2) {
            out.push(format!("{} {}", window[0], window[1]));
        }
    }
    out
}

/// Tokenize and expand text into analysis terms in one step.
pub fn analyze(text: &str, ngram_max: usize) -> Vec<String> {
    let tokens = tokenize(text);
    terms(&tokens, ngram_max)
}
