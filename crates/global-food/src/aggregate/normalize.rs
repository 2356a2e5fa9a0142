//! Name normalization for duplicate detection.
//!
//! Two providers rarely spell a venue the same way ("Joe's Pizza",
//! "JOE’S PIZZA", "Joes Pizza"). The key built here is what the merge step
//! compares:
//! - Unicode NFKD decomposition with combining marks removed
//! - Apostrophes dropped, other punctuation replaced with a space
//! - Lowercase
//! - Whitespace collapsed

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const APOSTROPHES: &[char] = &['\'', '\u{2018}', '\u{2019}', '\u{02BC}', '`', '\u{00B4}'];

/// Matching key for a venue name.
///
/// # Examples
///
/// ```
/// use global_food::aggregate::name_key;
///
/// assert_eq!(name_key("Joe's Pizza"), "joes pizza");
/// assert_eq!(name_key("  CAFÉ   Habana! "), "cafe habana");
/// ```
pub fn name_key(name: &str) -> String {
    let folded: String = name
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| !APOSTROPHES.contains(c))
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .flat_map(char::to_lowercase)
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apostrophe_variants_agree() {
        let expected = "joes pizza";
        for name in ["Joe's Pizza", "JOE’S PIZZA", "Joes Pizza", "joe`s  pizza"] {
            assert_eq!(name_key(name), expected, "for {:?}", name);
        }
    }

    #[test]
    fn test_diacritics_and_punctuation() {
        assert_eq!(name_key("Crème Brûlée & Co."), "creme brulee co");
        assert_eq!(name_key("Ippudo-NY"), "ippudo ny");
        assert_eq!(name_key("Ｐｉｚｚａ"), "pizza");
    }

    #[test]
    fn test_blank() {
        assert_eq!(name_key("  ...  "), "");
    }
}
