//! Download filename composition

/// Replace every character outside `[A-Za-z0-9]` with `-` and lower-case
///
/// Accented letters are not transliterated: `Élise` becomes `-lise`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

/// Filename of the downloadable report, e.g. `astromatch-ana-leo.pdf`
///
/// Empty first names fall back to `person1` / `person2`.
pub fn pdf_filename(firstname1: &str, firstname2: &str) -> String {
    let name1 = if firstname1.is_empty() { "person1" } else { firstname1 };
    let name2 = if firstname2.is_empty() { "person2" } else { firstname2 };
    format!(
        "astromatch-{}-{}.pdf",
        sanitize_name(name1),
        sanitize_name(name2)
    )
}
