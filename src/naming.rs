//! Centralized naming: URL slugs for blog posts and object-store keys for
//! uploads.
//!
//! ## Slugs
//!
//! Post pages live at `/blog/<slug>/`. The slug is the title lowercased, with
//! every run of non-alphanumeric characters collapsed to a single dash:
//! - `"10 Web Design Trends for 2024"` → `10-web-design-trends-for-2024`
//! - `"SEO: What's New?"` → `seo-what-s-new`
//!
//! Two posts with the same title get `-2`, `-3`, ... in display order, so
//! the newest post keeps the bare slug.
//!
//! ## Object keys
//!
//! Uploaded images are stored at `<folder>/<unix millis>-<suffix>.<ext>`,
//! where the suffix is 7 random lowercase alphanumerics. The millisecond
//! timestamp keeps keys roughly time-ordered; the suffix keeps two uploads in
//! the same millisecond apart.

use rand::Rng;
use rand::distr::Alphanumeric;
use std::collections::{HashMap, HashSet};

/// Length of the random part of an object key.
pub const SUFFIX_LEN: usize = 7;

pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "post".to_string()
    } else {
        slug
    }
}

/// Slugs for a list of titles, disambiguated in order. A numbered slug never
/// reuses one already handed out, even when another title slugifies to it.
pub fn unique_slugs<'a>(titles: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut next: HashMap<String, u32> = HashMap::new();
    titles
        .into_iter()
        .map(|title| {
            let base = slugify(title);
            let slug = if taken.contains(&base) {
                let n = next.entry(base.clone()).or_insert(2);
                loop {
                    let candidate = format!("{base}-{n}");
                    *n += 1;
                    if !taken.contains(&candidate) {
                        break candidate;
                    }
                }
            } else {
                base
            };
            taken.insert(slug.clone());
            slug
        })
        .collect()
}

/// Random lowercase alphanumeric suffix of [`SUFFIX_LEN`] characters.
pub fn random_suffix() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

pub fn object_key(folder: &str, millis: i64, suffix: &str, ext: &str) -> String {
    format!("{folder}/{millis}-{suffix}.{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Slugs
    // =========================================================================

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(
            slugify("10 Web Design Trends for 2024"),
            "10-web-design-trends-for-2024"
        );
        assert_eq!(slugify("SEO: What's New?"), "seo-what-s-new");
    }

    #[test]
    fn slugify_trims_leading_and_trailing_separators() {
        assert_eq!(slugify("  -- Hello --  "), "hello");
    }

    #[test]
    fn slugify_empty_title_falls_back() {
        assert_eq!(slugify("!!!"), "post");
        assert_eq!(slugify(""), "post");
    }

    #[test]
    fn unique_slugs_number_duplicates_in_order() {
        assert_eq!(
            unique_slugs(["Hello", "Other", "hello!", "HELLO"]),
            ["hello", "other", "hello-2", "hello-3"]
        );
    }

    #[test]
    fn unique_slugs_skip_numbers_taken_by_other_titles() {
        assert_eq!(
            unique_slugs(["Hello", "Hello", "Hello 2"]),
            ["hello", "hello-2", "hello-2-2"]
        );
        assert_eq!(
            unique_slugs(["Hello 2", "Hello", "Hello"]),
            ["hello-2", "hello", "hello-3"]
        );
    }

    // =========================================================================
    // Object keys
    // =========================================================================

    #[test]
    fn random_suffix_shape() {
        let suffix = random_suffix();
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn object_key_layout() {
        assert_eq!(
            object_key("banners", 1_700_000_000_123, "abc1234", "png"),
            "banners/1700000000123-abc1234.png"
        );
    }
}
