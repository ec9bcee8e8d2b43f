//! Text normalization shared by keywords and utterances.
//!
//! Both sides of a comparison go through the same transform, so a keyword
//! written as "Don't  Call" matches an utterance transcribed as "don't call".

use unicode_normalization::UnicodeNormalization;

/// Normalize text for matching.
///
/// Steps, in order: NFKD decomposition, every Unicode whitespace mapped to
/// ASCII space, trim + lowercase, contraction expansion on whole tokens, and
/// single-space joining. The function is total and idempotent.
pub fn normalize(text: &str) -> String {
    let decomposed: String = text
        .nfkd()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();

    let lowered = decomposed.trim().to_lowercase();

    let mut out = String::with_capacity(lowered.len());
    for word in lowered.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(expand_contraction(word).unwrap_or(word));
    }
    out
}

/// Fixed contraction table. Only exact, already-lowercased tokens match.
fn expand_contraction(word: &str) -> Option<&'static str> {
    let expanded = match word {
        "i'm" => "i am",
        "i've" => "i have",
        "i'll" => "i will",
        "i'd" => "i would",
        "can't" => "cannot",
        "won't" => "will not",
        "don't" => "do not",
        "doesn't" => "does not",
        "didn't" => "did not",
        "isn't" => "is not",
        "aren't" => "are not",
        "wasn't" => "was not",
        "weren't" => "were not",
        "hasn't" => "has not",
        "haven't" => "have not",
        "hadn't" => "had not",
        "wouldn't" => "would not",
        "shouldn't" => "should not",
        "couldn't" => "could not",
        "you're" => "you are",
        "you've" => "you have",
        "you'll" => "you will",
        "you'd" => "you would",
        "he's" => "he is",
        "she's" => "she is",
        "it's" => "it is",
        "that's" => "that is",
        "what's" => "what is",
        "where's" => "where is",
        "who's" => "who is",
        "there's" => "there is",
        "we're" => "we are",
        "we've" => "we have",
        "they're" => "they are",
        "they've" => "they have",
        _ => return None,
    };
    Some(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_whitespace_and_case() {
        assert_eq!(normalize("  Hello\t\tWORLD \n"), "hello world");
        assert_eq!(normalize("a\u{00A0}b\u{2003}c"), "a b c");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\n "), "");
    }

    #[test]
    fn test_contractions() {
        assert_eq!(normalize("I'm busy"), "i am busy");
        assert_eq!(normalize("please DON'T call"), "please do not call");
        assert_eq!(normalize("they've won't"), "they have will not");
        // Only whole tokens are expanded
        assert_eq!(normalize("don'tcall"), "don'tcall");
    }

    #[test]
    fn test_compatibility_decomposition() {
        // Full-width letters fold to ASCII under NFKD
        assert_eq!(normalize("ＣＡＬＬ"), "call");
        // Ligature expands
        assert_eq!(normalize("ﬁne"), "fine");
        // Accents decompose into base + combining mark
        assert_eq!(normalize("Café"), "cafe\u{301}");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Please DON'T call me again",
            "  I'm\u{00A0}not\u{2028}interested ",
            "ＷＨＯ'S this?",
            "Ça va très bien",
            "İstanbul",
            "ﬁne, it's ok",
            "",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    /// Characters that exercise decomposition, casing and whitespace folding.
    fn tricky_char() -> impl Strategy<Value = char> {
        prop::sample::select(vec![
            '\u{00A0}', '\u{2028}', '\u{2029}', '\u{3000}', '\t', '\n', ' ',
            '\u{0301}', '\u{0308}', '\u{0345}', '\u{00A8}',
            'Ａ', 'Ｚ', 'ｑ', '＇', '\'', '\u{2019}',
            'ﬁ', 'İ', 'Σ', 'ς', 'ẞ', 'Ǆ', 'ᾈ', 'Å', 'é',
        ])
    }

    fn utterance() -> impl Strategy<Value = String> {
        let ch = prop_oneof![
            3 => any::<char>(),
            3 => prop::char::range('a', 'z'),
            2 => tricky_char(),
        ];
        prop::collection::vec(ch, 0..48).prop_map(|chars| chars.into_iter().collect())
    }

    fn spoken_words() -> impl Strategy<Value = String> {
        let word = prop_oneof![
            prop::sample::select(vec![
                "DON'T", "I'm", "won't", "Can't", "THEY'VE", "who's", "no", "Café",
            ])
            .prop_map(str::to_string),
            "[a-zA-Z']{1,8}",
        ];
        let gap = prop::sample::select(vec![" ", "  ", "\t", "\u{00A0}", "\u{2028}"]);
        prop::collection::vec((word, gap), 0..10).prop_map(|parts| {
            parts
                .into_iter()
                .map(|(w, g)| format!("{}{}", w, g))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn test_idempotent_for_arbitrary_text(s in utterance()) {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn test_idempotent_for_spoken_words(s in spoken_words()) {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn test_output_is_single_spaced(s in utterance()) {
            let out = normalize(&s);
            prop_assert!(!out.starts_with(' ') && !out.ends_with(' '));
            prop_assert!(!out.contains("  "));
            prop_assert!(out.chars().all(|c| c == ' ' || !c.is_whitespace()));
        }
    }
}
