//! LIKE pattern helpers for name lookups

/// Escape LIKE metacharacters (`%`, `_`, `\`) so user input matches literally
///
/// Pair with `ESCAPE '\'` in the SQL.
///
/// ```
/// use tidewatch_server::utils::sql::escape_like_pattern;
///
/// assert_eq!(escape_like_pattern("Gadus_morhua"), "Gadus\\_morhua");
/// ```
pub fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Pattern matching values that start with `s`
pub fn prefix_pattern(s: &str) -> String {
    format!("{}%", escape_like_pattern(s))
}

/// Pattern matching values that contain `s`
pub fn contains_pattern(s: &str) -> String {
    format!("%{}%", escape_like_pattern(s))
}
