//! Text normalization for title matching

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Fold case and strip diacritics so "Résumé" matches "resume"
pub fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_folding() {
        assert_eq!(normalize("Budget PLAN"), "budget plan");
    }

    #[test]
    fn test_diacritics_stripped() {
        assert_eq!(normalize("Résumé"), "resume");
        assert_eq!(normalize("Ångström"), "angstrom");
        assert_eq!(normalize("Crème Brûlée"), "creme brulee");
    }

    #[test]
    fn test_non_latin_kept() {
        assert_eq!(normalize("Привет"), "привет");
        assert_eq!(normalize("日本語"), "日本語");
    }
}
