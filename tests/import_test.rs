//! End-to-end import tests: WXR file in, queryable post store out.

use pennquinn::db;
use pennquinn::importer;
use pennquinn::sanitize::Sanitizer;
use std::io::Write;
use tempfile::NamedTempFile;

const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"
     xmlns:content="http://purl.org/rss/1.0/modules/content/"
     xmlns:excerpt="http://wordpress.org/export/1.2/excerpt/"
     xmlns:wp="http://wordpress.org/export/1.2/">
<channel>
  <title>Penn &amp; Quinn</title>
  <item>
    <title>Beach Day</title>
    <wp:post_id>101</wp:post_id>
    <wp:post_date>2017-07-01 10:00:00</wp:post_date>
    <wp:post_name>beach-day</wp:post_name>
    <wp:status>publish</wp:status>
    <wp:post_type>post</wp:post_type>
    <category domain="category" nicename="2017"><![CDATA[2017]]></category>
    <category domain="post_tag" nicename="penn"><![CDATA[Penn]]></category>
    <category domain="post_tag" nicename="quinn"><![CDATA[Quinn]]></category>
    <content:encoded><![CDATA[[vc_row]<p></p><p>Sand everywhere.</p>
<img src="http://live-pennquinn.pantheonsite.io/wp-content/uploads/2017/photo.jpg">[/vc_row]]]></content:encoded>
    <excerpt:encoded><![CDATA[A day out.]]></excerpt:encoded>
  </item>
  <item>
    <title>First Snow &amp; Cocoa</title>
    <wp:post_id>90</wp:post_id>
    <wp:post_date>2016-12-10 09:00:00</wp:post_date>
    <wp:post_name>first-snow</wp:post_name>
    <wp:status>publish</wp:status>
    <wp:post_type>post</wp:post_type>
    <category domain="category" nicename="2016"><![CDATA[2016]]></category>
    <content:encoded><![CDATA[<p>Cold toes.</p>]]></content:encoded>
  </item>
  <item>
    <title>About Us</title>
    <wp:post_id>5</wp:post_id>
    <wp:post_date>2016-01-01 00:00:00</wp:post_date>
    <wp:post_name>about-us</wp:post_name>
    <wp:status>publish</wp:status>
    <wp:post_type>page</wp:post_type>
    <content:encoded><![CDATA[<p>Hi.</p>]]></content:encoded>
  </item>
  <item>
    <title>Unfinished Thought</title>
    <wp:post_id>120</wp:post_id>
    <wp:post_date>2017-08-01 00:00:00</wp:post_date>
    <wp:post_name>unfinished</wp:post_name>
    <wp:status>draft</wp:status>
    <wp:post_type>post</wp:post_type>
  </item>
</channel>
</rss>
"#;

async fn setup_pool() -> sqlx::SqlitePool {
    let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

fn export_file() -> NamedTempFile {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(EXPORT.as_bytes()).unwrap();
    tmp
}

fn sanitizer() -> Sanitizer {
    Sanitizer::new(&[
        "http://pennquinn.com".to_string(),
        "http://live-pennquinn.pantheonsite.io".to_string(),
    ])
}

#[tokio::test]
async fn import_filters_cleans_and_orders() {
    let pool = setup_pool().await;
    let file = export_file();

    let report = importer::run_import(&pool, file.path(), None, &sanitizer(), 50)
        .await
        .unwrap();
    assert_eq!(report.scanned, 4);
    // Page and draft are discarded by the hard filter.
    assert_eq!(report.matched, 2);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.skipped, 0);

    let posts = db::get_all(&pool).await.unwrap();
    assert_eq!(posts.len(), 2);
    // Newest first.
    assert_eq!(posts[0].slug, "beach-day");
    assert_eq!(posts[1].slug, "first-snow");

    let beach = &posts[0];
    // WordPress id carried through as the row id.
    assert_eq!(beach.id, 101);
    assert_eq!(beach.categories, vec!["2017"]);
    assert_eq!(beach.tags, vec!["Penn", "Quinn"]);
    assert_eq!(beach.excerpt, "A day out.");
    // Shortcodes and the empty paragraph are gone, the legacy URL is relative.
    assert_eq!(
        beach.content,
        "<p>Sand everywhere.</p>\n<img src=\"/uploads/2017/photo.jpg\">"
    );
    assert_eq!(beach.featured_image.as_deref(), Some("/uploads/2017/photo.jpg"));

    let snow = &posts[1];
    assert_eq!(snow.title, "First Snow & Cocoa");
    assert!(snow.featured_image.is_none());
}

#[tokio::test]
async fn year_filter_restricts_output() {
    let pool = setup_pool().await;
    let file = export_file();

    let report = importer::run_import(&pool, file.path(), Some("2016"), &sanitizer(), 50)
        .await
        .unwrap();
    assert_eq!(report.matched, 1);
    assert_eq!(report.inserted, 1);

    let posts = db::get_all(&pool).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert!(posts[0].date.starts_with("2016"));
}

#[tokio::test]
async fn reimport_is_idempotent() {
    let pool = setup_pool().await;
    let file = export_file();
    let s = sanitizer();

    let first = importer::run_import(&pool, file.path(), None, &s, 1).await.unwrap();
    assert_eq!(first.inserted, 2);

    let second = importer::run_import(&pool, file.path(), None, &s, 1).await.unwrap();
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped, 2);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn malformed_export_fails_the_run() {
    let pool = setup_pool().await;
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(b"<rss><channel><item><title>oops</channel></rss>")
        .unwrap();

    let res = importer::run_import(&pool, tmp.path(), None, &sanitizer(), 50).await;
    assert!(res.is_err());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}
