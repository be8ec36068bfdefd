/// Characters a valid entry may not start with.
const FORBIDDEN_LEADING: [char; 10] = ['"', '\'', '-', '.', '(', '（', '）', ')', '?', '_'];

/// Shared validity check for headwords, root keys, inflection variants and
/// synonym-group members.
///
/// Rejects the empty string, anything starting with a quote, bracket or other
/// listed punctuation, anything starting with a digit, and anything without a
/// single alphabetic character.
pub fn is_valid_word(word: &str) -> bool {
    let first = match word.chars().next() {
        Some(c) => c,
        None => return false,
    };

    if FORBIDDEN_LEADING.contains(&first) || first.is_numeric() {
        return false;
    }

    word.chars().any(char::is_alphabetic)
}
