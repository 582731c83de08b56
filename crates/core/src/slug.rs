/// Slugify heading text the way github-slugger does.
///
/// 1. Lowercase
/// 2. Remove all non-alphanumeric, non-space characters (`-` and `_` stay)
/// 3. Replace only spaces with hyphens
/// 4. No trailing-hyphen trimming, no consecutive-hyphen collapsing
///
/// # Examples
///
/// ```
/// use sectmd_core::slug::slugify;
///
/// assert_eq!(slugify("Directories"), "directories");
/// assert_eq!(slugify("Files & Dirs"), "files--dirs");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            slug.push(ch.to_ascii_lowercase());
        } else if !ch.is_ascii() && ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if ch == ' ' {
            slug.push('-');
        }
        // Punctuation, tabs, newlines and the like are dropped
    }

    if slug.is_empty() {
        slug.push_str("section");
    }
    slug
}

/// Removes a leading section number such as `9.` or `9.1.` from a title.
///
/// ```
/// use sectmd_core::slug::strip_section_number;
///
/// assert_eq!(strip_section_number("9. Directories"), "Directories");
/// assert_eq!(strip_section_number("9.1. Getting and Setting"), "Getting and Setting");
/// assert_eq!(strip_section_number("Directories"), "Directories");
/// ```
pub fn strip_section_number(title: &str) -> &str {
    let trimmed = title.trim();
    let numbered = trimmed
        .split_once(char::is_whitespace)
        .filter(|(number, _)| {
            number.ends_with('.')
                && number
                    .split('.')
                    .filter(|part| !part.is_empty())
                    .all(|part| part.bytes().all(|b| b.is_ascii_digit()))
                && number.bytes().any(|b| b.is_ascii_digit())
        });
    match numbered {
        Some((_, rest)) => rest.trim_start(),
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn unicode_preserved() {
        assert_eq!(slugify("多言語 ガイド"), "多言語-ガイド");
    }

    #[test]
    fn spaces_become_hyphens_no_collapsing_or_trimming() {
        assert_eq!(slugify("  a---b  "), "--a---b--");
    }

    #[test]
    fn dots_removed() {
        assert_eq!(slugify("9. Directories"), "9-directories");
    }

    #[test]
    fn empty_falls_back() {
        assert_eq!(slugify("!!!"), "section");
    }

    #[test]
    fn section_number_needs_a_trailing_dot() {
        assert_eq!(strip_section_number("2024 Changes"), "2024 Changes");
        assert_eq!(strip_section_number("v1. Notes"), "v1. Notes");
        assert_eq!(strip_section_number("  10.  Subroutines "), "Subroutines");
    }
}
