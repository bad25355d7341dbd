/// Collapses a value to one line, replacing control characters (including
/// line breaks) with spaces. Used for anything that ends up in a header.
pub fn single_line(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Trims a free-text value and drops control characters other than line
/// breaks and tabs. Windows line endings become `\n`.
pub fn multiline(value: &str) -> String {
    value
        .trim()
        .replace("\r\n", "\n")
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect()
}

/// First whitespace separated word of a name, or the whole name.
pub fn first_name(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or(name)
}
