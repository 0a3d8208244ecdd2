//! Display-name canonicalization for user-typed city names.

/// Canonicalize a user-typed city name for display.
///
/// Fully upper-case input gets only its first letter capitalized
/// ("NEW YORK" becomes "New york"), fully lower-case input is title-cased
/// per word, and anything mixed is preserved as typed.
#[must_use]
pub fn canonical_city_name(input: &str) -> String {
    let mut letters = input.chars().filter(|c| c.is_alphabetic()).peekable();
    if letters.peek().is_none() {
        return input.to_string();
    }

    if input
        .chars()
        .filter(|c| c.is_alphabetic())
        .all(char::is_uppercase)
    {
        capitalize_first(input)
    } else if input
        .chars()
        .filter(|c| c.is_alphabetic())
        .all(char::is_lowercase)
    {
        input
            .split_whitespace()
            .map(capitalize_first)
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        input.to_string()
    }
}

/// Upper-case the first character, lower-case the rest.
fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
    })
}
