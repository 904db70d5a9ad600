//! Answer-key hints written inline in a pasted question.
//!
//! Questions copied from exam booklets often carry their own answer
//! ("Gabarito: B", "Resposta - c"). [`detect`] pulls that letter out so the
//! learner does not have to pick it again.

use regex::Regex;
use std::sync::LazyLock;

use crate::model::OptionLabel;

static ANSWER_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(resposta|gabarito|correta)\s*[:\-]?\s*([abcd])")
        .expect("valid answer key regex")
});

/// Returns the label named by the first answer-key hint in `text`, if any.
#[must_use]
pub fn detect(text: &str) -> Option<OptionLabel> {
    let caps = ANSWER_KEY_RE.captures(text)?;
    caps.get(2)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_gabarito() {
        assert_eq!(detect("Gabarito: B"), Some(OptionLabel::B));
    }

    #[test]
    fn no_hint_yields_none() {
        assert_eq!(detect("no hint here"), None);
    }

    #[test]
    fn keyword_and_letter_are_case_insensitive() {
        assert_eq!(detect("RESPOSTA: c"), Some(OptionLabel::C));
        assert_eq!(detect("a correta-D"), Some(OptionLabel::D));
        assert_eq!(detect("Resposta a"), Some(OptionLabel::A));
    }

    #[test]
    fn first_hint_wins() {
        assert_eq!(detect("gabarito: a ... resposta: d"), Some(OptionLabel::A));
    }

    #[test]
    fn letters_outside_a_to_d_are_ignored() {
        assert_eq!(detect("Gabarito: E"), None);
    }

    #[test]
    fn hint_may_appear_mid_text() {
        let text = "Qual é a capital do Brasil?\n(gabarito:c)";
        assert_eq!(detect(text), Some(OptionLabel::C));
    }
}
