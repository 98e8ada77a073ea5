use itertools::Itertools;

use crate::lexicon::WordCategory;

/// Outcome of checking one typed response against the expected sequence.
///
/// Carries the normalized forms of both sides so callers can show exactly
/// what was compared.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub is_correct: bool,
    pub expected: String,
    pub response: String,
}

fn separator(category: WordCategory) -> &'static str {
    if category.is_sentences() {
        ";"
    } else {
        " "
    }
}

/// Split a raw response into recall tokens.
///
/// Sentences are separated by `;` and trimmed piecewise, keeping empty
/// pieces so a missing sentence still counts against the learner. Word
/// responses split on whitespace, dropping empty pieces.
pub fn tokenize(raw: &str, category: WordCategory) -> Vec<String> {
    if category.is_sentences() {
        raw.trim()
            .split(';')
            .map(|piece| piece.trim().to_string())
            .collect()
    } else {
        raw.split_whitespace().map(str::to_string).collect()
    }
}

fn normalize(tokens: &[String], category: WordCategory) -> String {
    tokens
        .iter()
        .map(|token| token.to_uppercase())
        .join(separator(category))
}

/// Compare a raw response against the expected sequence.
///
/// Both sides are uppercased and joined with the category separator; the
/// verdict is exact equality of the joined strings. Length, content, and
/// order mismatches all just read as not equal. There is no partial credit.
pub fn verify(expected: &[String], raw_response: &str, category: WordCategory) -> Verdict {
    let response_tokens = tokenize(raw_response, category);

    let expected_normalized = normalize(expected, category);
    let response_normalized = normalize(&response_tokens, category);

    Verdict {
        is_correct: expected_normalized == response_normalized,
        expected: expected_normalized,
        response: response_normalized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn exact_match_is_correct() {
        let verdict = verify(&expected(&["asac", "opot"]), "ASAC OPOT", WordCategory::Bisillabi);

        assert!(verdict.is_correct);
        assert_eq!(verdict.expected, "ASAC OPOT");
        assert_eq!(verdict.response, "ASAC OPOT");
    }

    #[test]
    fn comparison_ignores_case() {
        let verdict = verify(&expected(&["asac", "opot"]), "asac opot", WordCategory::Bisillabi);

        assert!(verdict.is_correct);
    }

    #[test]
    fn comparison_ignores_extra_whitespace() {
        let verdict = verify(
            &expected(&["asac", "opot"]),
            "  asac \t opot ",
            WordCategory::Bisillabi,
        );

        assert!(verdict.is_correct);
    }

    #[test]
    fn wrong_order_is_incorrect() {
        let verdict = verify(&expected(&["topo", "casa"]), "casa topo", WordCategory::Bisillabi);

        assert!(!verdict.is_correct);
        assert_eq!(verdict.expected, "TOPO CASA");
        assert_eq!(verdict.response, "CASA TOPO");
    }

    #[test]
    fn missing_word_is_incorrect() {
        let verdict = verify(&expected(&["casa", "topo"]), "casa", WordCategory::Bisillabi);

        assert!(!verdict.is_correct);
    }

    #[test]
    fn extra_word_is_incorrect() {
        let verdict = verify(
            &expected(&["casa", "topo"]),
            "casa topo mela",
            WordCategory::Bisillabi,
        );

        assert!(!verdict.is_correct);
    }

    #[test]
    fn empty_response_is_incorrect() {
        let verdict = verify(&expected(&["casa"]), "", WordCategory::Bisillabi);

        assert!(!verdict.is_correct);
        assert_eq!(verdict.response, "");
    }

    #[test]
    fn accented_words_uppercase_cleanly() {
        let verdict = verify(&expected(&["città", "però"]), "CITTÀ PERÒ", WordCategory::Bisillabi);

        assert!(verdict.is_correct);
    }

    #[test]
    fn sentences_split_on_semicolon_and_trim() {
        let verdict = verify(
            &expected(&["Il gatto dorme", "La luna brilla"]),
            "Il gatto dorme ; La luna brilla",
            WordCategory::Frasi,
        );

        assert!(verdict.is_correct);
        assert_eq!(verdict.expected, "IL GATTO DORME;LA LUNA BRILLA");
    }

    #[test]
    fn sentence_tokens_keep_internal_spacing() {
        let verdict = verify(
            &expected(&["Il gatto dorme", "La luna brilla"]),
            "Il  gatto dorme; La luna brilla",
            WordCategory::Frasi,
        );

        assert!(!verdict.is_correct);
    }

    #[test]
    fn empty_sentence_piece_counts() {
        let verdict = verify(
            &expected(&["Il gatto dorme", "La luna brilla"]),
            "Il gatto dorme;;La luna brilla",
            WordCategory::Frasi,
        );

        assert!(!verdict.is_correct);
        assert_eq!(verdict.response, "IL GATTO DORME;;LA LUNA BRILLA");
    }

    #[test]
    fn sentence_tokenizer_keeps_pieces() {
        let tokens = tokenize(" prima frase ; seconda frase ", WordCategory::Frasi);

        assert_eq!(tokens, vec!["prima frase".to_string(), "seconda frase".to_string()]);
    }

    #[test]
    fn word_tokenizer_drops_empty_pieces() {
        let tokens = tokenize("  casa   topo  ", WordCategory::Trisillabi);

        assert_eq!(tokens, vec!["casa".to_string(), "topo".to_string()]);
    }
}
