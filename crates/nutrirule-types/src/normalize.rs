//! Food-name normalisation.
//!
//! Avoid and recommend lists are compared case-insensitively and
//! diacritic-insensitively, so "Ba chỉ lợn", "ba chi lon" and
//! "BA  CHỈ LỢN" all normalise to the same key. Matching a food name
//! against a list entry works on whole words and respects tone marks when
//! both sides carry them.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalises a food name for comparison.
///
/// Decomposes to NFD, drops combining marks, folds `đ` to `d`, lowercases,
/// and collapses runs of whitespace to a single space.
///
/// # Examples
///
/// ```
/// use nutrirule_types::normalize_food_name;
///
/// assert_eq!(normalize_food_name("Ba chỉ lợn"), "ba chi lon");
/// assert_eq!(normalize_food_name("  Đậu   phụ "), "dau phu");
/// ```
pub fn normalize_food_name(name: &str) -> String {
    let folded: String = name
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            'đ' | 'Đ' => 'd',
            other => other,
        })
        .flat_map(char::to_lowercase)
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercases a food name and collapses whitespace, keeping diacritics.
///
/// The result is in NFC, so precomposed and decomposed input compare equal.
pub fn lowercase_food_name(name: &str) -> String {
    let lowered: String = name.chars().flat_map(char::to_lowercase).nfc().collect();
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns true if the words of `entry` appear as a contiguous run of the
/// words of `name`.
///
/// Both sides must already be in the same normalised form. An entry "ba chi
/// lon" matches "ba chi lon nuong", but "ga" does not match "gao". Empty
/// entries never match.
pub fn name_matches(name: &str, entry: &str) -> bool {
    let entry: Vec<&str> = entry.split_whitespace().collect();
    if entry.is_empty() {
        return false;
    }
    let name: Vec<&str> = name.split_whitespace().collect();
    name.windows(entry.len()).any(|run| run == entry.as_slice())
}

/// Returns true if a raw food name matches a raw list entry.
///
/// Words are compared with case and diacritics folded. Vietnamese tone marks
/// tell words apart, so when both sides are written with diacritics the
/// accented words must match as well: "cà chua" does not match "cá", while
/// the unaccented "ca chua" still does.
///
/// # Examples
///
/// ```
/// use nutrirule_types::food_name_matches;
///
/// assert!(food_name_matches("Ba chỉ lợn nướng", "ba chỉ lợn"));
/// assert!(food_name_matches("ba chi lon", "ba chỉ lợn"));
/// assert!(!food_name_matches("gạo lứt", "gà"));
/// assert!(!food_name_matches("cà chua", "cá"));
/// ```
pub fn food_name_matches(name: &str, entry: &str) -> bool {
    NameForms::new(name).matches(&NameForms::new(entry))
}

/// A food name in its folded and accented forms.
#[derive(Debug, Clone)]
pub(crate) struct NameForms {
    folded: String,
    accented: String,
}

impl NameForms {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            folded: normalize_food_name(name),
            accented: lowercase_food_name(name),
        }
    }

    pub(crate) fn folded(&self) -> &str {
        &self.folded
    }

    fn is_unaccented(&self) -> bool {
        self.folded == self.accented
    }

    /// Returns true if `entry` matches this name.
    pub(crate) fn matches(&self, entry: &NameForms) -> bool {
        name_matches(&self.folded, &entry.folded)
            && (self.is_unaccented()
                || entry.is_unaccented()
                || name_matches(&self.accented, &entry.accented))
    }

    /// Returns true if `other` names the same thing as a whole.
    pub(crate) fn same_as(&self, other: &NameForms) -> bool {
        self.folded == other.folded
            && (self.is_unaccented() || other.is_unaccented() || self.accented == other.accented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_vietnamese_diacritics() {
        assert_eq!(normalize_food_name("Phở bò"), "pho bo");
        assert_eq!(normalize_food_name("Bún bò Huế"), "bun bo hue");
        assert_eq!(normalize_food_name("Mỡ trong máu"), "mo trong mau");
        assert_eq!(normalize_food_name("ĐƯỜNG TRẮNG"), "duong trang");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize_food_name("\tcơm   tấm\n"), "com tam");
        assert_eq!(normalize_food_name("   "), "");
    }

    #[test]
    fn test_lowercase_keeps_diacritics() {
        assert_eq!(lowercase_food_name("  Gạo   LỨT "), "gạo lứt");
        // Decomposed input compares equal to precomposed.
        assert_eq!(lowercase_food_name("ca\u{0300}"), "cà");
    }

    #[test]
    fn test_name_matches_whole_words() {
        assert!(name_matches("ba chi lon", "ba chi lon"));
        assert!(name_matches("ba chi lon nuong", "ba chi lon"));
        assert!(name_matches("com ba chi lon", "ba chi lon"));
        assert!(!name_matches("ba chi", "ba chi lon"));
        assert!(!name_matches("gao lut", "ga"));
        assert!(!name_matches("ba chi lon", "chi ba"));
        assert!(!name_matches("com trang", ""));
        assert!(!name_matches("", "ga"));
    }

    #[test]
    fn test_tone_marks_separate_words() {
        assert!(!food_name_matches("gạo lứt", "gà"));
        assert!(!food_name_matches("cà chua", "cá"));
        assert!(!food_name_matches("rau cải", "cá"));

        assert!(food_name_matches("gà rán", "gà"));
        assert!(food_name_matches("cá kho tộ", "cá"));
        assert!(food_name_matches("Bún đậu MẮM TÔM", "mắm tôm"));
    }

    #[test]
    fn test_unaccented_side_matches_folded() {
        assert!(food_name_matches("ba chi lon nuong", "ba chỉ lợn"));
        assert!(food_name_matches("Ba chỉ lợn", "ba chi lon"));
        assert!(food_name_matches("ca chua", "cá"));
    }

    #[test]
    fn test_same_as_compares_whole_names() {
        let bun = NameForms::new("Bún");
        assert!(bun.same_as(&NameForms::new("bún")));
        assert!(bun.same_as(&NameForms::new("bun")));
        assert!(!bun.same_as(&NameForms::new("bùn")));
        assert!(!bun.same_as(&NameForms::new("bún bò")));
    }
}
