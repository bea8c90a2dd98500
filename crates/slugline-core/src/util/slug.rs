//! Slug normalization for human-readable record identifiers.
//!
//! ## Summary
//! Turns a display name into a URL-safe candidate slug. Candidates are
//! lowercase and restricted to `[a-z0-9-]`. German diacritics are
//! transliterated and spaces become hyphens; every other character is
//! dropped, so the result may be empty.

/// Substitutions applied in order after lower-casing.
///
/// The upper-case umlauts never match once the input is lower-cased, but the
/// table is kept complete so the order of application stays explicit.
const TRANSLITERATIONS: [(&str, &str); 8] = [
    ("Ä", "ae"),
    ("Ö", "oe"),
    ("Ü", "ue"),
    ("ä", "ae"),
    ("ö", "oe"),
    ("ü", "ue"),
    ("ß", "ss"),
    (" ", "-"),
];

/// Normalize a display name into a candidate slug.
///
/// Examples:
/// - "Simple Name" -> "simple-name"
/// - "bänösü" -> "baenoesue"
/// - "Foo,bar* \"" -> "foobar-"
#[must_use]
pub fn normalize(name: &str) -> String {
    let mut slug = name.to_lowercase();
    for (search, replace) in TRANSLITERATIONS {
        if slug.contains(search) {
            slug = slug.replace(search, replace);
        }
    }
    slug.retain(|c| matches!(c, 'a'..='z' | '0'..='9' | '-'));
    slug
}

/// Append a collision suffix to a candidate slug.
#[must_use]
pub fn with_suffix(candidate: &str, suffix: u32) -> String {
    format!("{candidate}{suffix}")
}
