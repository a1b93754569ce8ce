/// Longest username GitHub allows.
pub const MAX_USERNAME_LEN: usize = 39;

/// Parse a GitHub username out of free text.
///
/// Surrounding whitespace is trimmed; the rest must be 1..=39 ASCII letters,
/// digits or `-`.
pub fn parse_github_username(input: &str) -> Option<&str> {
    let username = input.trim();
    let valid = !username.is_empty()
        && username.len() <= MAX_USERNAME_LEN
        && username
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-');
    valid.then_some(username)
}
