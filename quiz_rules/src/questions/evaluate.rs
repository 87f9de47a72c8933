//! Answer evaluation - pure correctness rules for every challenge kind.

use super::{Challenge, Question, Submission};

/// Check a free-text or clicked answer against a canonical string.
///
/// Matching is case-insensitive after trimming. Canonical answers that
/// contain comma-separated parts are also accepted with the whitespace
/// after each comma removed, so `"kale, kılıç"` and `"kale,kılıç"` are
/// interchangeable.
pub fn answer_matches(canonical: &str, submitted: &str) -> bool {
    let submitted = submitted.trim().to_lowercase();
    let canonical = canonical.trim().to_lowercase();
    submitted == canonical || submitted == squeeze_comma_spaces(&canonical)
}

/// Remove whitespace that follows commas: `"a, b,  c"` becomes `"a,b,c"`.
fn squeeze_comma_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut after_comma = false;
    for ch in text.chars() {
        if after_comma && ch.is_whitespace() {
            continue;
        }
        after_comma = ch == ',';
        out.push(ch);
    }
    out
}

/// Split a comma-separated answer into trimmed, lowercased tokens.
fn comma_tokens(text: &str) -> Vec<String> {
    text.split(',')
        .map(|token| token.trim().to_lowercase())
        .collect()
}

/// Decide whether a submission answers a question correctly.
///
/// This is a pure function: no state is read or written, and calling it
/// repeatedly with the same inputs always yields the same verdict. A
/// submission whose shape does not fit the challenge kind (for example free
/// text handed to an ordering challenge) is simply incorrect.
pub fn evaluate(question: &Question, submission: &Submission) -> bool {
    match (&question.challenge, submission) {
        (Challenge::GrammarFix { answer }, Submission::Text(text))
        | (Challenge::Synonym { answer }, Submission::Text(text))
        | (Challenge::Dictation { answer, .. }, Submission::Text(text)) => {
            answer_matches(answer, text)
        }

        (Challenge::GapFill { answer, .. }, Submission::Choice(choice))
        | (Challenge::ListeningChoice { answer, .. }, Submission::Choice(choice))
        | (Challenge::IdiomFill { answer, .. }, Submission::Choice(choice)) => {
            answer_matches(answer, choice)
        }

        (Challenge::Ordering { answer, .. }, Submission::Ordering(order)) => {
            order.join(" ") == answer.join(" ")
        }

        (Challenge::MultiCorrection { answers }, Submission::Text(text)) => {
            let text = text.to_lowercase();
            answers
                .iter()
                .all(|sentence| text.contains(&sentence.to_lowercase()))
        }

        (Challenge::WordTranslation { answers }, Submission::Text(text)) => {
            let expected: Vec<String> = answers
                .iter()
                .map(|word| word.trim().to_lowercase())
                .collect();
            comma_tokens(text) == expected
        }

        (Challenge::CardMatch { pairs }, Submission::Matching { matched_cards }) => {
            *matched_cards == pairs.len() * 2
        }

        // Submission shape does not fit the challenge kind.
        _ => false,
    }
}
