//! RSS 2.0 rendering of stored items.
use crate::config::Feed;
use crate::model::Item;
use anyhow::{Context, Result};
use rss::{Channel, ChannelBuilder, GuidBuilder, ItemBuilder};

pub const CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";
pub const ERROR_DESCRIPTION: &str = "Error generating feed";

/// Characters allowed by the XML 1.0 `Char` production.
pub fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

/// Drops characters a feed reader's XML parser would reject.
fn xml_text(raw: &str) -> String {
    raw.chars().filter(|c| is_xml_char(*c)).collect()
}

fn entry(item: &Item) -> rss::Item {
    let url = xml_text(&item.url);
    ItemBuilder::default()
        .guid(Some(GuidBuilder::default().value(url.clone()).permalink(false).build()))
        .title(Some(xml_text(&item.title)))
        .link(Some(url))
        .description(Some(htmlescape::encode_minimal(&xml_text(&item.content))))
        .pub_date(Some(item.published_at.to_rfc2822()))
        .build()
}

fn channel(meta: &Feed, link: &str, description: &str, items: Vec<rss::Item>) -> Channel {
    ChannelBuilder::default()
        .title(xml_text(&meta.title))
        .link(xml_text(link))
        .description(xml_text(description))
        .language(Some(xml_text(&meta.language)))
        .items(items)
        .build()
}

fn write(channel: &Channel) -> Result<String> {
    let bytes = channel
        .write_to(Vec::new())
        .context("failed to serialize rss channel")?;
    String::from_utf8(bytes).context("rss output is not utf-8")
}

/// Serializes `items` in the given order under a channel linked to `link`.
pub fn render(meta: &Feed, link: &str, items: &[Item]) -> Result<String> {
    let entries = items.iter().map(entry).collect();
    write(&channel(meta, link, &meta.description, entries))
}

/// A valid document with no entries, served when rendering fails.
pub fn fallback(meta: &Feed, link: &str) -> String {
    channel(meta, link, ERROR_DESCRIPTION, Vec::new()).to_string()
}
