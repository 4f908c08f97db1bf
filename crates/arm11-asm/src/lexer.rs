pub const DELIMITERS: &[char] = &[' ', ',', '\n', '\t', '\r'];

/// Drops everything from the first `@` or `;` onwards.
pub fn strip_comment(line: &str) -> &str {
    line.find(|c| c == '@' || c == ';')
        .map_or(line, |i| &line[..i])
}

/// Splits `line` on any of `delimiters`, dropping empty fragments.
pub fn tokenize<'a>(line: &'a str, delimiters: &[char]) -> Vec<&'a str> {
    line.split(|c| delimiters.contains(&c))
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn tokenize_line(line: &str) -> Vec<&str> {
    tokenize(strip_comment(line), DELIMITERS)
}
