//! Word n-gram generation for phrase matching.

/// Longest n-gram produced.
pub const MAX_NGRAM: usize = 5;

/// Produce word n-grams of length 1 through [`MAX_NGRAM`] from normalized text.
///
/// Output order is all unigrams, then bigrams, then trigrams, then 4- and
/// 5-word spans, each in left-to-right position order. No deduplication.
pub fn tokenize(normalized: &str) -> Vec<String> {
    let words: Vec<&str> = normalized.split_whitespace().collect();
    let n = words.len();
    let capacity: usize = (1..=MAX_NGRAM.min(n)).map(|len| n + 1 - len).sum();
    let mut tokens = Vec::with_capacity(capacity);

    for len in 1..=MAX_NGRAM.min(n) {
        tokens.extend(words.windows(len).map(|span| span.join(" ")));
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_order() {
        let tokens = tokenize("do not call me");
        assert_eq!(
            tokens,
            vec![
                "do", "not", "call", "me",
                "do not", "not call", "call me",
                "do not call", "not call me",
                "do not call me",
            ]
        );
    }

    #[test]
    fn test_count_formula() {
        for n in 5..12 {
            let text = (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
            let expected = n + (n - 1) + (n - 2) + (n - 3) + (n - 4);
            assert_eq!(tokenize(&text).len(), expected, "n = {}", n);
        }
    }

    #[test]
    fn test_short_inputs() {
        assert!(tokenize("").is_empty());
        assert_eq!(tokenize("no"), vec!["no"]);
        assert_eq!(tokenize("no thanks"), vec!["no", "thanks", "no thanks"]);
    }

    #[test]
    fn test_duplicates_kept() {
        let tokens = tokenize("no no");
        assert_eq!(tokens, vec!["no", "no", "no no"]);
    }

    proptest! {
        #[test]
        fn test_count_matches_window_formula(words in prop::collection::vec("[a-z']{1,8}", 0..16)) {
            let n = words.len();
            // Short inputs yield every span; longer ones lose 1 + 2 + 3 + 4 at the edges
            let expected = if n <= MAX_NGRAM { n * (n + 1) / 2 } else { 5 * n - 10 };
            prop_assert_eq!(tokenize(&words.join(" ")).len(), expected);
        }

        #[test]
        fn test_grouped_by_length_then_position(words in prop::collection::vec("[a-z']{1,8}", 0..16)) {
            let tokens = tokenize(&words.join(" "));
            let mut idx = 0;
            for len in 1..=MAX_NGRAM.min(words.len()) {
                for start in 0..=words.len() - len {
                    prop_assert_eq!(&tokens[idx], &words[start..start + len].join(" "));
                    idx += 1;
                }
            }
            prop_assert_eq!(idx, tokens.len());
        }
    }
}
