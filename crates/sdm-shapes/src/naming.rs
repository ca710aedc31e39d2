//! Display-name derivation
//!
//! Pluralisation is regular morphology only; there is no irregular-noun
//! dictionary.

/// Pluralise an English label
///
/// - consonant + `y` → `ies`
/// - trailing `s`, `x`, `z`, `ch`, `sh` → add `es`
/// - otherwise add `s`
#[must_use]
pub fn pluralize(label: &str) -> String {
    if label.is_empty() {
        return String::new();
    }
    let lower = label.to_lowercase();

    if let Some(stem) = label.strip_suffix(['y', 'Y']) {
        let before = stem.chars().last();
        if before.is_some_and(|c| c.is_ascii_alphabetic() && !is_vowel(c)) {
            let suffix = if label.ends_with('Y') { "IES" } else { "ies" };
            return format!("{stem}{suffix}");
        }
    }

    let sibilant = ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|ending| lower.ends_with(ending));
    let upper = label.chars().last().is_some_and(char::is_uppercase);
    let suffix = match (sibilant, upper) {
        (true, false) => "es",
        (true, true) => "ES",
        (false, false) => "s",
        (false, true) => "S",
    };
    format!("{label}{suffix}")
}

/// URL-safe form of a label
///
/// Lower-cased; every run of non-alphanumerics becomes one hyphen; leading
/// and trailing hyphens are trimmed.
#[must_use]
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_hyphen = false;
    for c in label.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}
