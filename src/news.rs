use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::Client;
use scraper::Html;
use serde::Serialize;
use std::collections::HashSet;

use crate::error::LookupError;
use crate::models::{NewsEnvelope, NewsItem};

pub const NEWS_ERROR_MESSAGE: &str = "Erro ao carregar notícias.";
const SUMMARY_MAX_CHARS: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsSource {
    G1,
    GNews,
}

impl NewsSource {
    fn name(&self) -> &'static str {
        match self {
            NewsSource::G1 => "g1",
            NewsSource::GNews => "gnews",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsFeed {
    pub items: Vec<NewsItem>,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewsClient {
    client: Client,
    origin: String,
}

impl NewsClient {
    pub fn new(client: Client, origin: &str) -> Self {
        Self {
            client,
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    pub async fn fetch_source(
        &self,
        source: NewsSource,
        query: &str,
    ) -> Result<Vec<NewsItem>, LookupError> {
        let url = format!("{}/api/news/{}", self.origin, source.name());
        let mut request = self.client.get(&url);
        if source == NewsSource::GNews {
            request = request.query(&[("q", query)]);
        }
        tracing::debug!(url = %url, "Fetching news");

        let response = request
            .send()
            .await
            .map_err(|source| LookupError::Http { url: url.clone(), source })?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status { url, status: status.as_u16() });
        }
        let body = response
            .text()
            .await
            .map_err(|source| LookupError::Http { url: url.clone(), source })?;
        let envelope: NewsEnvelope =
            serde_json::from_str(&body).map_err(|source| LookupError::Decode { url, source })?;
        Ok(envelope.data)
    }

    /// Fetches both sources concurrently; a failing source is logged and
    /// left out, the other one still counts.
    pub async fn fetch_feed(&self, query: &str) -> NewsFeed {
        let (g1, gnews) = futures::join!(
            self.fetch_source(NewsSource::G1, query),
            self.fetch_source(NewsSource::GNews, query),
        );

        let mut lists = Vec::new();
        let mut failed = false;
        for (source, result) in [(NewsSource::G1, g1), (NewsSource::GNews, gnews)] {
            match result {
                Ok(items) => {
                    tracing::debug!(source = source.name(), count = items.len(), "News source loaded");
                    lists.push(items);
                }
                Err(e) => {
                    tracing::warn!(source = source.name(), error = %e, "News source failed");
                    failed = true;
                }
            }
        }

        let items = merge_news(lists);
        tracing::info!(count = items.len(), failed, "News feed assembled");
        NewsFeed {
            items,
            error: failed.then(|| NEWS_ERROR_MESSAGE.to_string()),
        }
    }
}

/// Concatenates the lists, keeps the first item seen for each url (items
/// without one are dropped) and orders newest first. Dates that don't parse
/// sort last; ties keep their input order.
pub fn merge_news(lists: Vec<Vec<NewsItem>>) -> Vec<NewsItem> {
    let mut seen = HashSet::new();
    let mut merged: Vec<NewsItem> = lists
        .into_iter()
        .flatten()
        .filter(|item| !item.url.is_empty() && seen.insert(item.url.clone()))
        .collect();

    merged.sort_by_key(|item| std::cmp::Reverse(published_at(item)));
    merged
}

// Zoned timestamps first; bare dates and local timestamps are read as UTC
fn published_at(item: &NewsItem) -> Option<DateTime<Utc>> {
    let raw = item.published_at.as_deref()?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw).or_else(|_| DateTime::parse_from_rfc2822(raw)) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Text content of an HTML snippet, entities decoded and whitespace
/// collapsed. Adjacent elements are kept apart by a space.
pub fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cuts `text` to `max` characters, marking the cut with an ellipsis.
pub fn clamp_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}…", cut.trim_end())
}

impl NewsItem {
    /// Plain-text description, clamped for cards.
    pub fn summary(&self) -> String {
        self.description
            .as_deref()
            .map(|d| clamp_text(&strip_html(d), SUMMARY_MAX_CHARS))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(url: &str, title: &str, published_at: Option<&str>) -> NewsItem {
        NewsItem {
            url: url.into(),
            title: title.into(),
            description: None,
            image: None,
            source: "g1".into(),
            published_at: published_at.map(str::to_string),
        }
    }

    #[test]
    fn merge_dedups_by_url_and_sorts_newest_first() {
        let g1 = vec![
            item("https://a", "old", Some("2024-01-01T10:00:00Z")),
            item("https://b", "new", Some("2024-03-01T10:00:00Z")),
            item("", "no url", Some("2024-05-01T10:00:00Z")),
        ];
        let gnews = vec![
            item("https://b", "duplicate", Some("2025-01-01T10:00:00Z")),
            item("https://c", "undated", Some("not a date")),
            item("https://d", "rfc2822", Some("Thu, 01 Feb 2024 12:00:00 +0000")),
        ];

        let merged = merge_news(vec![g1, gnews]);
        let titles: Vec<&str> = merged.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "rfc2822", "old", "undated"]);
    }

    #[test]
    fn strips_tags_and_collapses_space() {
        assert_eq!(
            strip_html("<p>Novo  <b>SUV</b>\n chega</p>"),
            "Novo SUV chega"
        );
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(
            strip_html("<p>Fiat &amp; Jeep&nbsp;lan&ccedil;am SUV</p>"),
            "Fiat & Jeep lançam SUV"
        );
        assert_eq!(strip_html("sem tags"), "sem tags");
    }

    #[test]
    fn bare_dates_sort_with_zoned_ones() {
        let merged = merge_news(vec![vec![
            item("https://a", "date only", Some("2024-03-10")),
            item("https://b", "spaced", Some("2024-03-12 08:30:00")),
            item("https://c", "zoned", Some("2024-03-11T10:00:00-03:00")),
            item("https://d", "garbage", Some("ontem")),
        ]]);
        let titles: Vec<&str> = merged.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["spaced", "zoned", "date only", "garbage"]);
    }

    #[test]
    fn clamps_long_text() {
        assert_eq!(clamp_text("abc", 5), "abc");
        assert_eq!(clamp_text("carro novo", 6), "carro…");
        assert_eq!(clamp_text("", 3), "");
    }

    #[test]
    fn summary_of_html_description() {
        let mut news = item("https://a", "t", None);
        assert_eq!(news.summary(), "");
        news.description = Some("<div>Preço <i>caiu</i></div>".into());
        assert_eq!(news.summary(), "Preço caiu");
    }

    #[test]
    fn summary_is_clamped_for_cards() {
        let mut news = item("https://a", "t", None);
        news.description = Some(format!("<p>{}</p>", "a".repeat(400)));
        let summary = news.summary();
        assert_eq!(summary.chars().count(), 301);
        assert!(summary.ends_with("a…"));
    }
}
