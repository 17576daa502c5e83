//! Import coordinator: WXR items in, persisted posts out.
//!
//! Filtering, normalization, and ordering happen here; `wxr` owns the XML
//! parsing and `db::repo` owns persistence. Only published posts survive the
//! filter — pages, attachments, revisions, and drafts are discarded outright.

pub mod wxr;

use crate::db::{self, Pool};
use crate::model::PostDraft;
use crate::sanitize::{self, Sanitizer};
use anyhow::Result;
use std::path::Path;
use tracing::info;
use wxr::{Taxonomy, WxrItem};

/// Counts reported after an import run. `skipped` rows already existed in the
/// store (id or slug collision); re-runs are expected to skip everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportReport {
    /// Items found in the export, before filtering.
    pub scanned: usize,
    /// Items that passed the type/status/year filter.
    pub matched: usize,
    pub inserted: u64,
    pub skipped: u64,
}

/// Hard filter: only published posts, optionally restricted to a publish year
/// (matched against the first four characters of the date).
fn item_matches(item: &WxrItem, year: Option<&str>) -> bool {
    if item.post_type != "post" || item.status != "publish" {
        return false;
    }
    match year {
        Some(y) => item.post_date.get(..4) == Some(y),
        None => true,
    }
}

/// Split taxonomy entries by domain: `category` entries (and bare entries with
/// no domain) become categories, `post_tag` entries become tags, anything else
/// is dropped. Source order and duplicates are preserved.
fn route_taxonomies(taxonomies: &[Taxonomy]) -> (Vec<String>, Vec<String>) {
    let mut categories = Vec::new();
    let mut tags = Vec::new();
    for t in taxonomies {
        match t.domain.as_deref() {
            None | Some("category") => categories.push(t.value.clone()),
            Some("post_tag") => tags.push(t.value.clone()),
            Some(_) => {}
        }
    }
    (categories, tags)
}

/// Normalize a raw WXR item into an insertable draft: clean the content and
/// title, infer the featured image from the first `<img>` in the cleaned body,
/// and fall back to `post-<id>` when the export carries no slug.
pub fn draft_from_item(item: &WxrItem, sanitizer: &Sanitizer) -> PostDraft {
    let content = sanitizer.clean_content(&item.content);
    let title = if item.title.trim().is_empty() {
        "Untitled".to_string()
    } else {
        sanitizer.clean_title(&item.title)
    };
    let slug = if item.post_name.trim().is_empty() {
        format!("post-{}", item.post_id)
    } else {
        item.post_name.clone()
    };
    let featured_image = sanitize::first_image_src(&content);
    let (categories, tags) = route_taxonomies(&item.taxonomies);

    PostDraft {
        id_hint: item.post_id,
        title,
        slug,
        date: item.post_date.clone(),
        content,
        excerpt: item.excerpt.clone(),
        status: item.status.clone(),
        post_type: item.post_type.clone(),
        categories,
        tags,
        featured_image,
        gallery_images: Vec::new(),
    }
}

/// Run a full import: parse the export, filter and normalize, then insert in
/// batches with insert-or-ignore semantics. Batches already flushed stay
/// persisted if a later step fails; the run as a whole is not atomic.
pub async fn run_import(
    pool: &Pool,
    path: impl AsRef<Path>,
    year: Option<&str>,
    sanitizer: &Sanitizer,
    batch_size: usize,
) -> Result<ImportReport> {
    let items = wxr::parse_file(path)?;
    let scanned = items.len();

    let mut drafts: Vec<PostDraft> = items
        .iter()
        .filter(|item| item_matches(item, year))
        .map(|item| draft_from_item(item, sanitizer))
        .collect();
    // Newest first. The sort is stable, so items sharing a date keep their
    // document order until the store's id tiebreak takes over.
    drafts.sort_by(|a, b| b.date.cmp(&a.date));
    let matched = drafts.len();

    let mut report = ImportReport {
        scanned,
        matched,
        ..Default::default()
    };
    for (idx, chunk) in drafts.chunks(batch_size.max(1)).enumerate() {
        let (inserted, skipped) = db::insert_draft_batch(pool, chunk).await?;
        report.inserted += inserted;
        report.skipped += skipped;
        info!(
            batch = idx + 1,
            rows = chunk.len(),
            inserted,
            skipped,
            "imported batch"
        );
    }
    Ok(report)
}
