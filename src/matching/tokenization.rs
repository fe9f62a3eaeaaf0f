use serde::Deserialize;

/// Characters removed from phrases and recorded words before comparison.
pub const STRIPPED_PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`', '~',
    '(', ')',
];

/// Case handling applied to both sides of every token comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CasePolicy {
    #[default]
    Lowercase,
    Preserve,
}

impl CasePolicy {
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::Lowercase => text.to_lowercase(),
            Self::Preserve => text.to_string(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lowercase => "lowercase",
            Self::Preserve => "preserve",
        }
    }
}

/// Split a free-text phrase into comparison tokens.
pub fn tokenize_phrase(phrase: &str, case_policy: CasePolicy) -> Vec<String> {
    let stripped: String = phrase
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect();
    case_policy
        .apply(&stripped)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Comparison form of a single recorded word. May be empty, in which case the
/// word keeps its slot in the transcript but never matches.
///
/// A recorded word is one clip, so it always yields exactly one token:
/// whitespace inside it is removed rather than split on. A recognizer entry
/// such as "New York" becomes "newyork" and is only matched by a phrase that
/// spells it as one word.
pub fn normalize_word(word: &str, case_policy: CasePolicy) -> String {
    let stripped: String = word
        .trim()
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c) && !c.is_whitespace())
        .collect();
    case_policy.apply(&stripped)
}

/// ASCII-alphanumeric projection used for clip and output file names.
pub fn sanitize_file_stem(word: &str) -> String {
    word.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// File stem for the merged output of a phrase: sanitized tokens joined by `_`.
pub fn output_stem(tokens: &[String]) -> Option<String> {
    let parts: Vec<String> = tokens
        .iter()
        .map(|t| sanitize_file_stem(t))
        .filter(|t| !t.is_empty())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_phrase_has_no_tokens() {
        assert!(tokenize_phrase("", CasePolicy::Lowercase).is_empty());
        assert!(tokenize_phrase("   \t ", CasePolicy::Lowercase).is_empty());
    }

    #[test]
    fn punctuation_is_stripped_before_splitting() {
        let tokens = tokenize_phrase("What, are you doing? (well) today!", CasePolicy::Lowercase);
        assert_eq!(tokens, ["what", "are", "you", "doing?", "well", "today"]);
    }

    #[test]
    fn hyphen_joins_word_halves() {
        let tokens = tokenize_phrase("re-run it", CasePolicy::Lowercase);
        assert_eq!(tokens, ["rerun", "it"]);
    }

    #[test]
    fn preserve_policy_keeps_case() {
        let tokens = tokenize_phrase("Hello World", CasePolicy::Preserve);
        assert_eq!(tokens, ["Hello", "World"]);
        let tokens = tokenize_phrase("Hello World", CasePolicy::Lowercase);
        assert_eq!(tokens, ["hello", "world"]);
    }

    #[test]
    fn recorded_words_use_the_phrase_rule() {
        assert_eq!(normalize_word(" Today.", CasePolicy::Lowercase), "today");
        assert_eq!(normalize_word("...", CasePolicy::Lowercase), "");
        assert_eq!(
            normalize_word("Doing,", CasePolicy::Preserve),
            tokenize_phrase("Doing,", CasePolicy::Preserve)[0]
        );
    }

    #[test]
    fn multi_word_entry_collapses_to_one_token() {
        assert_eq!(normalize_word("New York", CasePolicy::Lowercase), "newyork");
        assert_eq!(normalize_word(" ice\tcream ", CasePolicy::Preserve), "icecream");
        assert_eq!(tokenize_phrase("new york", CasePolicy::Lowercase), ["new", "york"]);
        assert_eq!(tokenize_phrase("newyork", CasePolicy::Lowercase), ["newyork"]);
    }

    #[test]
    fn file_stems_keep_ascii_alphanumerics() {
        assert_eq!(sanitize_file_stem("don't"), "dont");
        assert_eq!(sanitize_file_stem("Hello"), "Hello");
        assert_eq!(
            output_stem(&["what".into(), "are".into(), "you?".into()]).as_deref(),
            Some("what_are_you")
        );
        assert_eq!(output_stem(&["?".into()]), None);
        assert_eq!(output_stem(&[]), None);
    }
}
