/// Strip trailing commas sitting immediately before a closing sequence
/// bracket — a known artifact of an earlier buggy writer that otherwise
/// makes the whole document unparseable.
///
/// Deliberately a narrow text substitution, not a lenient JSON parser:
/// widening it would mask other corruption classes that self-heal is
/// supposed to catch.
#[must_use]
pub fn strip_trailing_commas(text: &str) -> String {
    text.replace(",]", "]")
}
