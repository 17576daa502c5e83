//! Legacy-content cleaning for imported WordPress HTML.
//!
//! The export this blog migrated from is full of page-builder shortcodes,
//! absolute media URLs pointing at dead hosts, and entity-encoded punctuation.
//! `Sanitizer::clean_content` runs the fixed cleanup pipeline; the steps are
//! ordered so a second pass over already-clean content is a no-op.

use once_cell::sync::Lazy;
use regex::Regex;

/// Shortcode families left behind by the old theme's page builder. Both the
/// opening `[vc_row ...]` and closing `[/vc_row]` forms are stripped, arguments
/// included.
static SHORTCODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[/?(?:vc_|nectar_|slidepress)[^\]]*\]").unwrap());

/// `<p></p>` with only whitespace between the tags.
static EMPTY_PARAGRAPH: Lazy<Regex> = Lazy::new(|| Regex::new(r"<p>\s*</p>").unwrap());

/// Runs of three or more newlines collapse to a single blank line.
static NEWLINE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

static IMG_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<img[^>]*\bsrc\s*=\s*["']([^"']+)["']"#).unwrap());

/// Named entities WordPress leaves in titles and body text. `&amp;` is decoded
/// last so decoded output does not decode again on a second pass.
const ENTITIES: &[(&str, &str)] = &[
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#039;", "'"),
    ("&rsquo;", "\u{2019}"),
    ("&lsquo;", "\u{2018}"),
    ("&rdquo;", "\u{201d}"),
    ("&ldquo;", "\u{201c}"),
    ("&hellip;", "\u{2026}"),
    ("&ndash;", "\u{2013}"),
    ("&mdash;", "\u{2014}"),
    ("&amp;", "&"),
];

/// Decode the fixed entity set. Applied to both content and titles.
pub fn decode_entities(text: &str) -> String {
    let mut out = text.to_string();
    for (entity, literal) in ENTITIES {
        if out.contains(entity) {
            out = out.replace(entity, literal);
        }
    }
    out
}

/// `src` of the first `<img>` tag in the given HTML, if any.
pub fn first_image_src(html: &str) -> Option<String> {
    IMG_SRC
        .captures(html)
        .map(|caps| caps[1].to_string())
}

/// Content cleaner configured with the legacy hosts whose upload URLs get
/// rewritten to the site-relative `/uploads/` path.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    /// Fully-expanded `<host>/wp-content/uploads/` prefixes.
    upload_prefixes: Vec<String>,
}

impl Sanitizer {
    pub fn new(legacy_hosts: &[String]) -> Self {
        let upload_prefixes = legacy_hosts
            .iter()
            .map(|host| format!("{}/wp-content/uploads/", host.trim_end_matches('/')))
            .collect();
        Self { upload_prefixes }
    }

    /// Clean a raw HTML body:
    /// 1. strip page-builder shortcodes;
    /// 2. rewrite legacy-host upload URLs to `/uploads/`;
    /// 3. drop empty paragraphs;
    /// 4. collapse newline runs to one blank line;
    /// 5. decode the fixed entity set;
    /// 6. trim.
    pub fn clean_content(&self, raw: &str) -> String {
        let mut out = SHORTCODE.replace_all(raw, "").into_owned();
        for prefix in &self.upload_prefixes {
            if out.contains(prefix.as_str()) {
                out = out.replace(prefix.as_str(), "/uploads/");
            }
        }
        out = EMPTY_PARAGRAPH.replace_all(&out, "").into_owned();
        out = NEWLINE_RUN.replace_all(&out, "\n\n").into_owned();
        out = decode_entities(&out);
        out.trim().to_string()
    }

    /// Titles get entity decoding and trimming only.
    pub fn clean_title(&self, raw: &str) -> String {
        decode_entities(raw).trim().to_string()
    }
}
