//! Case-insensitive ordering and per-language values.

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A value with one entry per language code, e.g. `{"pt": "Comida", "en": "Food"}`.
pub type Translations = BTreeMap<String, String>;

/// Compare two display names ignoring case.
///
/// Names are folded with Unicode lowercasing before comparison, so the
/// ordering is total and names differing only in case compare equal.
pub fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Stable in-place sort by a case-folded key.
pub fn sort_by_name_ignore_case<T>(items: &mut [T], name: impl Fn(&T) -> &str) {
    items.sort_by_cached_key(|item| name(item).to_lowercase());
}

/// Resolve `values` to `lang`, falling back to `fallback` when absent.
pub fn translate<'a>(values: &'a Translations, lang: &str, fallback: &str) -> Option<&'a str> {
    values
        .get(lang)
        .filter(|v| !v.is_empty())
        .or_else(|| values.get(fallback))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translations(pairs: &[(&str, &str)]) -> Translations {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_compare_ignores_case() {
        assert_eq!(compare_ignore_case("braga", "Braga"), Ordering::Equal);
        assert_eq!(compare_ignore_case("aveiro", "Braga"), Ordering::Less);
        assert_eq!(compare_ignore_case("Zebra", "apple"), Ordering::Greater);
    }

    #[test]
    fn test_case_only_difference_matches_folded_order() {
        let pairs = [("Évora", "évora"), ("ABC", "abd"), ("Lisboa", "lisboa")];
        for (a, b) in pairs {
            assert_eq!(
                compare_ignore_case(a, b),
                a.to_lowercase().cmp(&b.to_lowercase())
            );
        }
    }

    #[test]
    fn test_sort_is_stable_and_case_insensitive() {
        let mut names = vec!["porto", "Aveiro", "Porto", "braga"];
        sort_by_name_ignore_case(&mut names, |s| s);
        assert_eq!(names, vec!["Aveiro", "braga", "porto", "Porto"]);
    }

    #[test]
    fn test_translate_current_language() {
        let values = translations(&[("pt", "Comida"), ("en", "Food")]);
        assert_eq!(translate(&values, "en", "pt"), Some("Food"));
    }

    #[test]
    fn test_translate_falls_back() {
        let values = translations(&[("pt", "Comida")]);
        assert_eq!(translate(&values, "en", "pt"), Some("Comida"));
    }

    #[test]
    fn test_translate_empty_value_falls_back() {
        let values = translations(&[("pt", "Comida"), ("en", "")]);
        assert_eq!(translate(&values, "en", "pt"), Some("Comida"));
    }

    #[test]
    fn test_translate_missing_everywhere() {
        let values = translations(&[("es", "Comida")]);
        assert_eq!(translate(&values, "en", "pt"), None);
    }
}
