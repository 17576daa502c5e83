//! Slug derivation and the unique-suffix search used by the post store.

use std::collections::HashSet;

/// Derive a URL-safe base slug from a title: lowercase, non-alphanumeric runs
/// become single hyphens, leading/trailing hyphens are dropped. An empty result
/// falls back to `"untitled"`.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut prev_hyphen = true;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            prev_hyphen = false;
        } else if !prev_hyphen {
            out.push('-');
            prev_hyphen = true;
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Return `base` if it is not taken, otherwise the smallest `base-k` (k >= 2)
/// absent from `taken`. The search is unbounded; collision runs degrade
/// linearly, which is fine at this blog's scale.
pub fn next_unique_slug(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    let mut counter = 2u64;
    loop {
        let candidate = format!("{base}-{counter}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taken(slugs: &[&str]) -> HashSet<String> {
        slugs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Beach Day"), "beach-day");
        assert_eq!(slugify("Penn & Quinn's First Snow!"), "penn-quinn-s-first-snow");
        assert_eq!(slugify("  2017 :: Recap  "), "2017-recap");
    }

    #[test]
    fn slugify_empty_falls_back() {
        assert_eq!(slugify(""), "untitled");
        assert_eq!(slugify("!!!"), "untitled");
    }

    #[test]
    fn free_base_returned_unchanged() {
        assert_eq!(next_unique_slug("beach-day", &taken(&["other"])), "beach-day");
    }

    #[test]
    fn taken_base_gets_dash_two() {
        assert_eq!(
            next_unique_slug("beach-day", &taken(&["beach-day"])),
            "beach-day-2"
        );
    }

    #[test]
    fn search_skips_to_smallest_free_suffix() {
        assert_eq!(
            next_unique_slug("beach-day", &taken(&["beach-day", "beach-day-2", "beach-day-3"])),
            "beach-day-4"
        );
        assert_eq!(
            next_unique_slug("beach-day", &taken(&["beach-day", "beach-day-3"])),
            "beach-day-2"
        );
    }
}
