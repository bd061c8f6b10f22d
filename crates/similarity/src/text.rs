//! Composite text and the analyzer that turns it into vocabulary terms.
//!
//! Analysis: lowercase, pick tokens of two or more word characters, drop
//! stop words, then emit every unigram followed by every bigram of the
//! remaining tokens.

use crate::stop_words::is_stopword;
use data_loader::MovieDocument;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(r"(?u)\b\w\w+\b").expect("valid regex");
}

/// Title, overview, genres and keywords joined by spaces; missing parts are empty
pub fn composite_text(movie: &MovieDocument) -> String {
    [
        movie.title.as_deref().unwrap_or(""),
        movie.overview.as_deref().unwrap_or(""),
        &movie.genres.join(" "),
        &movie.keywords.join(" "),
    ]
    .join(" ")
}

/// Lowercased, stop-word-free tokens in text order
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !is_stopword(token))
        .map(str::to_string)
        .collect()
}

/// Unigram and bigram terms of `text`, with repeats
pub fn analyze(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let mut terms = Vec::with_capacity(tokens.len() * 2);
    terms.extend(tokens.iter().cloned());
    for pair in tokens.windows(2) {
        terms.push(format!("{} {}", pair[0], pair[1]));
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_text_joins_all_fields() {
        let movie = MovieDocument::new(1, "Space War")
            .with_overview("Fleets collide")
            .with_genres(["Science Fiction", "Action"])
            .with_keywords(["laser"]);

        assert_eq!(
            composite_text(&movie),
            "Space War Fleets collide Science Fiction Action laser"
        );
    }

    #[test]
    fn test_composite_text_missing_fields() {
        let mut movie = MovieDocument::new(1, "Alone");
        movie.title = None;
        assert_eq!(composite_text(&movie).trim(), "");
    }

    #[test]
    fn test_tokenize_drops_short_tokens_and_stopwords() {
        let tokens = tokenize("A Romance in PARIS, 2 lovers!");
        assert_eq!(tokens, vec!["romance", "paris", "lovers"]);
    }

    #[test]
    fn test_analyze_builds_bigrams_after_stopword_removal() {
        let terms = analyze("Romance in Paris");
        assert_eq!(terms, vec!["romance", "paris", "romance paris"]);
    }
}
