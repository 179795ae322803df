//! Text normalizer shared by every scoring path.

/// Canonicalizes free text into lowercase ASCII alphanumeric tokens separated
/// by single spaces.
///
/// Anything that is not an ASCII letter, digit or whitespace becomes a space,
/// then whitespace runs collapse and the ends are trimmed. Never fails.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
