use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Fold a string for accent- and case-insensitive comparison.
///
/// Decomposes (NFD), drops combining marks, lowercases and collapses runs of
/// whitespace, so `"  Événement "` and `"evenement"` compare equal.
pub fn fold(s: &str) -> String {
    let stripped: String = s
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_accents_and_case() {
        assert_eq!(fold("Événement"), "evenement");
        assert_eq!(fold("DATE DE DÉBUT"), "date de debut");
        assert_eq!(fold("Sur   place "), "sur place");
    }

    #[test]
    fn leaves_plain_ascii_alone() {
        assert_eq!(fold("service"), "service");
        assert_eq!(fold(""), "");
    }
}
