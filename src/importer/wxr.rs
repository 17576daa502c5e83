//! Streaming parser for WordPress eXtended RSS (WXR) exports.
//!
//! Walks the XML event stream and accumulates one `WxrItem` per `<item>`
//! element. Field and taxonomy extraction happens here; filtering and content
//! cleaning are the coordinator's job. Malformed XML fails the whole parse.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("XML attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
}

/// One taxonomy entry on an item. WXR tags entries with a `domain` attribute
/// (`category`, `post_tag`, ...); a bare `<category>` has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    pub domain: Option<String>,
    pub value: String,
}

/// Raw fields of a WXR `<item>`, before any filtering or cleaning.
#[derive(Debug, Clone, Default)]
pub struct WxrItem {
    /// WordPress post id; 0 when missing or unparseable.
    pub post_id: i64,
    pub title: String,
    /// WordPress `post_name`, the export's slug. May be empty.
    pub post_name: String,
    /// `YYYY-MM-DD HH:MM:SS`; empty when the export carries no date.
    pub post_date: String,
    pub status: String,
    pub post_type: String,
    pub content: String,
    pub excerpt: String,
    /// Source order preserved, duplicates included.
    pub taxonomies: Vec<Taxonomy>,
}

/// Elements whose text content is captured while inside an `<item>`.
const CAPTURED: &[&str] = &[
    "title",
    "wp:post_id",
    "wp:post_date",
    "wp:post_name",
    "wp:status",
    "wp:post_type",
    "content:encoded",
    "excerpt:encoded",
    "category",
];

/// Parse a WXR document from any buffered reader.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<Vec<WxrItem>, ImportError> {
    let mut xml = Reader::from_reader(reader);
    let mut buf = Vec::with_capacity(8192);
    let mut items = Vec::new();

    let mut current: Option<WxrItem> = None;
    let mut current_element: Option<String> = None;
    let mut pending_domain: Option<String> = None;
    let mut text_buf = String::new();

    loop {
        buf.clear();
        let event = xml.read_event_into(&mut buf)?;
        match event {
            Event::Start(ref e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "item" {
                    current = Some(WxrItem::default());
                } else if current.is_some() && CAPTURED.contains(&name.as_str()) {
                    if name == "category" {
                        pending_domain = e
                            .try_get_attribute("domain")?
                            .map(|attr| attr.unescape_value())
                            .transpose()?
                            .map(|v| v.into_owned());
                    }
                    current_element = Some(name);
                    text_buf.clear();
                }
            }
            Event::Text(ref e) => {
                if current_element.is_some() {
                    text_buf.push_str(&e.unescape()?);
                }
            }
            Event::CData(ref e) => {
                if current_element.is_some() {
                    text_buf.push_str(&String::from_utf8_lossy(e));
                }
            }
            Event::End(ref e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "item" {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                    current_element = None;
                    continue;
                }
                let Some(ref mut item) = current else {
                    continue;
                };
                if current_element.as_deref() != Some(name.as_str()) {
                    continue;
                }
                match name.as_str() {
                    "title" => item.title = text_buf.clone(),
                    "wp:post_id" => item.post_id = text_buf.trim().parse().unwrap_or(0),
                    "wp:post_date" => item.post_date = text_buf.trim().to_string(),
                    "wp:post_name" => item.post_name = text_buf.trim().to_string(),
                    "wp:status" => item.status = text_buf.trim().to_string(),
                    "wp:post_type" => item.post_type = text_buf.trim().to_string(),
                    "content:encoded" => item.content = text_buf.clone(),
                    "excerpt:encoded" => item.excerpt = text_buf.clone(),
                    "category" => item.taxonomies.push(Taxonomy {
                        domain: pending_domain.take(),
                        value: text_buf.clone(),
                    }),
                    _ => {}
                }
                current_element = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(items)
}

/// Parse a WXR document held in memory. Used by tests and small exports.
pub fn parse_str(xml: &str) -> Result<Vec<WxrItem>, ImportError> {
    parse_reader(xml.as_bytes())
}

/// Parse a WXR export file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<WxrItem>, ImportError> {
    let file = File::open(path.as_ref())?;
    parse_reader(BufReader::with_capacity(64 * 1024, file))
}
