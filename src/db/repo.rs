use crate::model::{Post, PostDraft, PostPatch};
use crate::slug;
use anyhow::Result;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::HashSet;
use tracing::instrument;

pub type Pool = SqlitePool;

pub async fn init_pool(database_url: &str) -> Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    let pool = SqlitePool::connect(&normalized).await?;
    // Enable WAL and stricter durability.
    sqlx::query("PRAGMA journal_mode=WAL;").execute(&pool).await?;
    sqlx::query("PRAGMA synchronous=FULL;").execute(&pool).await?;
    Ok(pool)
}

/// If using a file-backed SQLite URL, expand a leading `~/` and ensure the
/// parent directory exists. In-memory URLs and non-sqlite schemes pass through.
fn prepare_sqlite_url(url: &str) -> String {
    let Some(rest) = url.strip_prefix("sqlite:") else {
        return url.to_string();
    };
    if rest.starts_with(":memory") {
        return url.to_string();
    }
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let (path_part, query_part) = match rest.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (rest, None),
    };
    if path_part.is_empty() {
        return url.to_string();
    }

    let expanded = match (path_part.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(tail), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), tail),
        _ => path_part.to_string(),
    };
    if let Some(parent) = std::path::Path::new(&expanded).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    match query_part {
        Some(q) => format!("sqlite://{expanded}?{q}"),
        None => format!("sqlite://{expanded}"),
    }
}

pub async fn run_migrations(pool: &Pool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

const POST_COLUMNS: &str = "id, title, slug, date, content, excerpt, status, post_type, \
                            categories, tags, featured_image, gallery_images";

fn parse_list(json: &str) -> Vec<String> {
    serde_json::from_str(json).unwrap_or_default()
}

fn list_json(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

fn post_from_row(row: &SqliteRow) -> Post {
    let categories: String = row.get("categories");
    let tags: String = row.get("tags");
    let gallery: String = row.get("gallery_images");
    Post {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        date: row.get("date"),
        content: row.get("content"),
        excerpt: row.get("excerpt"),
        status: row.get("status"),
        post_type: row.get("post_type"),
        categories: parse_list(&categories),
        tags: parse_list(&tags),
        featured_image: row.try_get::<Option<String>, _>("featured_image").ok().flatten(),
        gallery_images: parse_list(&gallery),
    }
}

/// All posts, newest first. Equal dates fall back to id ascending so the feed
/// order is deterministic.
#[instrument(skip_all)]
pub async fn get_all(pool: &Pool) -> Result<Vec<Post>> {
    let rows = sqlx::query(&format!(
        "SELECT {POST_COLUMNS} FROM posts ORDER BY date DESC, id ASC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(post_from_row).collect())
}

#[instrument(skip_all)]
pub async fn get_by_id(pool: &Pool, id: i64) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(post_from_row))
}

#[instrument(skip_all)]
pub async fn get_by_slug(pool: &Pool, slug: &str) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE slug = ?"))
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(post_from_row))
}

/// Allocate a slug unique among all posts other than `exclude_id`.
///
/// Check-then-act: slugs sharing `base` as a byte-exact prefix are loaded and
/// the suffix search runs in Rust. The UNIQUE constraint on the column is the
/// backstop if a concurrent writer wins the race; the losing insert fails
/// rather than overwriting. SQLite `LIKE` is case-insensitive and `GLOB` has
/// metacharacters, hence the `substr` comparison.
#[instrument(skip_all)]
pub async fn allocate_slug(pool: &Pool, base: &str, exclude_id: Option<i64>) -> Result<String> {
    let rows: Vec<(i64, String)> =
        sqlx::query_as("SELECT id, slug FROM posts WHERE substr(slug, 1, length(?)) = ?")
            .bind(base)
            .bind(base)
            .fetch_all(pool)
            .await?;
    let taken: HashSet<String> = rows
        .into_iter()
        .filter(|(id, _)| Some(*id) != exclude_id)
        .map(|(_, s)| s)
        .collect();
    Ok(slug::next_unique_slug(base, &taken))
}

/// Persist a draft as a new post. The requested slug (or a slugified title when
/// the draft has none) is the allocation base; the store assigns the id.
#[instrument(skip_all)]
pub async fn create(pool: &Pool, draft: &PostDraft) -> Result<Post> {
    let base = if draft.slug.trim().is_empty() {
        slug::slugify(&draft.title)
    } else {
        draft.slug.clone()
    };
    let slug = allocate_slug(pool, &base, None).await?;
    let date = if draft.date.is_empty() {
        Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        draft.date.clone()
    };

    let row = sqlx::query(&format!(
        "INSERT INTO posts (title, slug, date, content, excerpt, status, post_type, \
                            categories, tags, featured_image, gallery_images) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {POST_COLUMNS}"
    ))
    .bind(&draft.title)
    .bind(&slug)
    .bind(&date)
    .bind(&draft.content)
    .bind(&draft.excerpt)
    .bind(&draft.status)
    .bind(&draft.post_type)
    .bind(list_json(&draft.categories))
    .bind(list_json(&draft.tags))
    .bind(&draft.featured_image)
    .bind(list_json(&draft.gallery_images))
    .fetch_one(pool)
    .await?;
    Ok(post_from_row(&row))
}

/// Merge `patch` into the post with the given id. Returns `None` when the id
/// does not exist. Slug re-allocation happens only when the patch carries a
/// slug, and excludes the post itself from the collision check.
#[instrument(skip_all)]
pub async fn update(pool: &Pool, id: i64, patch: &PostPatch) -> Result<Option<Post>> {
    let Some(existing) = get_by_id(pool, id).await? else {
        return Ok(None);
    };

    let slug = match &patch.slug {
        Some(requested) => {
            let base = if requested.trim().is_empty() {
                slug::slugify(patch.title.as_ref().unwrap_or(&existing.title))
            } else {
                requested.clone()
            };
            allocate_slug(pool, &base, Some(id)).await?
        }
        None => existing.slug.clone(),
    };

    let title = patch.title.clone().unwrap_or(existing.title);
    let date = patch.date.clone().unwrap_or(existing.date);
    let content = patch.content.clone().unwrap_or(existing.content);
    let excerpt = patch.excerpt.clone().unwrap_or(existing.excerpt);
    let status = patch.status.clone().unwrap_or(existing.status);
    let post_type = patch.post_type.clone().unwrap_or(existing.post_type);
    let categories = patch.categories.clone().unwrap_or(existing.categories);
    let tags = patch.tags.clone().unwrap_or(existing.tags);
    let featured_image = patch
        .featured_image
        .clone()
        .unwrap_or(existing.featured_image);
    let gallery_images = patch.gallery_images.clone().unwrap_or(existing.gallery_images);

    let row = sqlx::query(&format!(
        "UPDATE posts SET title = ?, slug = ?, date = ?, content = ?, excerpt = ?, \
                          status = ?, post_type = ?, categories = ?, tags = ?, \
                          featured_image = ?, gallery_images = ? \
         WHERE id = ? RETURNING {POST_COLUMNS}"
    ))
    .bind(&title)
    .bind(&slug)
    .bind(&date)
    .bind(&content)
    .bind(&excerpt)
    .bind(&status)
    .bind(&post_type)
    .bind(list_json(&categories))
    .bind(list_json(&tags))
    .bind(&featured_image)
    .bind(list_json(&gallery_images))
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(Some(post_from_row(&row)))
}

/// Permanently remove a post. Returns whether a row was actually deleted.
#[instrument(skip_all)]
pub async fn delete(pool: &Pool, id: i64) -> Result<bool> {
    let res = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}

/// Insert a batch of import drafts in one transaction, skipping any row whose
/// id or slug collides with an existing row. Returns `(inserted, skipped)`.
/// Re-running an import against a partially-populated store is therefore
/// idempotent: previously imported rows count as skips, not errors.
#[instrument(skip_all)]
pub async fn insert_draft_batch(pool: &Pool, drafts: &[PostDraft]) -> Result<(u64, u64)> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0u64;
    let mut skipped = 0u64;
    for draft in drafts {
        let id_hint = if draft.id_hint > 0 {
            Some(draft.id_hint)
        } else {
            None
        };
        let res = sqlx::query(
            "INSERT OR IGNORE INTO posts (id, title, slug, date, content, excerpt, status, \
                                          post_type, categories, tags, featured_image, \
                                          gallery_images) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id_hint)
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(&draft.date)
        .bind(&draft.content)
        .bind(&draft.excerpt)
        .bind(&draft.status)
        .bind(&draft.post_type)
        .bind(list_json(&draft.categories))
        .bind(list_json(&draft.tags))
        .bind(&draft.featured_image)
        .bind(list_json(&draft.gallery_images))
        .execute(&mut *tx)
        .await?;
        if res.rows_affected() > 0 {
            inserted += 1;
        } else {
            skipped += 1;
        }
    }
    tx.commit().await?;
    Ok((inserted, skipped))
}
