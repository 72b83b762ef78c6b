//! Legal news RSS feeds.
//!
//! Fetches the Indian legal-media feeds (Bar & Bench, LiveLaw, SCC Blog and
//! friends) one at a time with a flat delay in between, and normalizes each
//! entry into a [`NewsItem`] with a deterministic URL-derived id.

use crate::models::NewsItem;
use crate::normalize;
use crate::scrapers::{FetchError, get_bytes};
use crate::utils::{SUMMARY_MAX_LEN, clean_summary};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use rss::Channel;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

/// Cap on entries taken from a single news feed per run.
pub const NEWS_ITEM_CAP: usize = 20;

/// Flat delay between successive feed fetches.
const FEED_DELAY: Duration = Duration::from_secs(1);

/// A legal-news feed descriptor.
#[derive(Debug, Clone)]
pub struct NewsFeed {
    pub name: &'static str,
    pub url: &'static str,
    pub category: &'static str,
}

/// The configured news feeds, in processing order.
pub fn news_feeds() -> Vec<NewsFeed> {
    vec![
        NewsFeed {
            name: "Bar & Bench",
            url: "https://www.barandbench.com/feed",
            category: "General",
        },
        NewsFeed {
            name: "LiveLaw",
            url: "https://www.livelaw.in/rss.xml",
            category: "General",
        },
        NewsFeed {
            name: "LiveLaw Supreme Court",
            url: "https://www.livelaw.in/supreme-court/rss.xml",
            category: "Supreme Court",
        },
        NewsFeed {
            name: "LiveLaw High Court",
            url: "https://www.livelaw.in/high-court/rss.xml",
            category: "High Courts",
        },
        NewsFeed {
            name: "Legally India",
            url: "https://www.legallyindia.com/rss.xml",
            category: "General",
        },
        NewsFeed {
            name: "SCC Blog",
            url: "https://www.scconline.com/blog/feed/",
            category: "Analysis",
        },
        NewsFeed {
            name: "Indian Constitutional Law",
            url: "https://indconlawphil.wordpress.com/feed/",
            category: "Constitutional",
        },
        NewsFeed {
            name: "Law and Other Things",
            url: "https://lawandotherthings.com/feed/",
            category: "Academic",
        },
    ]
}

/// Fetch every configured news feed in order, one at a time, with the flat
/// inter-feed delay. Failed feeds contribute nothing; the rest proceed.
#[instrument(level = "info", skip_all)]
pub async fn fetch_all(http: &reqwest::Client) -> Vec<NewsItem> {
    let items: Vec<NewsItem> = stream::iter(news_feeds())
        .then(|feed| {
            let http = http.clone();
            async move {
                let items = fetch_news_feed(&http, &feed).await;
                sleep(FEED_DELAY).await;
                items
            }
        })
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .flatten()
        .collect();

    info!(count = items.len(), "Fetched all news feeds");
    items
}

/// Fetch one news feed. Any failure is logged and yields an empty batch.
#[instrument(level = "info", skip_all, fields(source = %feed.name))]
pub async fn fetch_news_feed(http: &reqwest::Client, feed: &NewsFeed) -> Vec<NewsItem> {
    let channel = match fetch_channel(http, feed.url).await {
        Ok(channel) => channel,
        Err(e) => {
            warn!(url = feed.url, error = %e, "News feed fetch failed; skipping source");
            return Vec::new();
        }
    };

    let items: Vec<NewsItem> = channel
        .items()
        .iter()
        .take(NEWS_ITEM_CAP)
        .filter_map(|item| normalize_item(feed, item))
        .collect();

    info!(count = items.len(), "Scraped news feed");
    items
}

async fn fetch_channel(http: &reqwest::Client, url: &str) -> Result<Channel, FetchError> {
    let body = get_bytes(http, url).await?;
    Ok(Channel::read_from(&body[..])?)
}

/// Map one feed entry onto the canonical news shape.
///
/// Entries without both a title and a link are dropped. The summary comes
/// from the first of description, full content, or the title itself, cleaned
/// and truncated.
fn normalize_item(feed: &NewsFeed, item: &rss::Item) -> Option<NewsItem> {
    let title = item.title()?.trim().to_string();
    let url = item.link()?.to_string();

    let summary = clean_summary(
        item.description()
            .or_else(|| item.content())
            .unwrap_or(&title),
        SUMMARY_MAX_LEN,
    );

    let published_date = item
        .pub_date()
        .and_then(normalize::parse_feed_date)
        .unwrap_or_else(|| normalize::to_iso(Utc::now()));

    let author = item
        .dublin_core_ext()
        .and_then(|dc| dc.creators().first().cloned())
        .or_else(|| item.author().map(str::to_string));

    let image_url = item
        .enclosure()
        .filter(|e| e.mime_type().starts_with("image/"))
        .map(|e| e.url().to_string());

    Some(NewsItem {
        id: normalize::news_id(&url),
        title,
        summary,
        url,
        source: feed.name.to_string(),
        published_date,
        category: Some(feed.category.to_string()),
        author,
        image_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn livelaw() -> NewsFeed {
        NewsFeed {
            name: "LiveLaw",
            url: "https://www.livelaw.in/rss.xml",
            category: "General",
        }
    }

    fn item(title: Option<&str>, link: Option<&str>) -> rss::Item {
        let mut item = rss::Item::default();
        item.set_title(title.map(str::to_string));
        item.set_link(link.map(str::to_string));
        item
    }

    #[test]
    fn test_normalize_item_basic() {
        let mut raw = item(Some("  SC stays demolition order  "), Some("https://x/1"));
        raw.set_description(Some(
            "<p>The   Supreme Court <b>stayed</b> the order.</p>".to_string(),
        ));
        raw.set_pub_date(Some("Mon, 01 Sep 2025 06:00:00 GMT".to_string()));

        let news = normalize_item(&livelaw(), &raw).unwrap();
        assert_eq!(news.title, "SC stays demolition order");
        assert_eq!(news.summary, "The Supreme Court stayed the order.");
        assert_eq!(news.published_date, "2025-09-01T06:00:00.000Z");
        assert_eq!(news.source, "LiveLaw");
        assert_eq!(news.category.as_deref(), Some("General"));
        assert_eq!(news.id, normalize::news_id("https://x/1"));
    }

    #[test]
    fn test_normalize_item_requires_title_and_link() {
        assert!(normalize_item(&livelaw(), &item(None, Some("https://x/1"))).is_none());
        assert!(normalize_item(&livelaw(), &item(Some("Title"), None)).is_none());
    }

    #[test]
    fn test_normalize_item_summary_falls_back_to_title() {
        let raw = item(Some("Bench issues notice"), Some("https://x/2"));
        let news = normalize_item(&livelaw(), &raw).unwrap();
        assert_eq!(news.summary, "Bench issues notice");
    }

    #[test]
    fn test_normalize_item_truncates_long_summary() {
        let mut raw = item(Some("Long story"), Some("https://x/3"));
        raw.set_description(Some(format!("<div>{}</div>", "word ".repeat(200))));
        let news = normalize_item(&livelaw(), &raw).unwrap();
        assert_eq!(news.summary.chars().count(), 300);
        assert!(news.summary.ends_with("..."));
    }

    #[test]
    fn test_normalize_item_image_only_from_image_enclosure() {
        let mut raw = item(Some("Story"), Some("https://x/4"));
        let mut enclosure = rss::Enclosure::default();
        enclosure.set_url("https://cdn/x.mp3".to_string());
        enclosure.set_mime_type("audio/mpeg".to_string());
        raw.set_enclosure(Some(enclosure));
        assert!(normalize_item(&livelaw(), &raw).unwrap().image_url.is_none());

        let mut enclosure = rss::Enclosure::default();
        enclosure.set_url("https://cdn/x.jpg".to_string());
        enclosure.set_mime_type("image/jpeg".to_string());
        raw.set_enclosure(Some(enclosure));
        assert_eq!(
            normalize_item(&livelaw(), &raw).unwrap().image_url.as_deref(),
            Some("https://cdn/x.jpg")
        );
    }

    #[test]
    fn test_news_feeds_cover_expected_sources() {
        let names: Vec<&str> = news_feeds().iter().map(|f| f.name).collect();
        assert_eq!(names.len(), 8);
        assert!(names.contains(&"Bar & Bench"));
        assert!(names.contains(&"SCC Blog"));
    }
}
