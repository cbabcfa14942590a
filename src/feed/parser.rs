// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Episode extraction from the podcast RSS document.
//!
//! This is pattern extraction over the one feed format the show's host
//! produces, not a general XML parser. Tag bodies may be plain text or
//! wrapped in CDATA.

use super::FeedError;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// One podcast episode as served to the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub title: String,
    /// May contain HTML
    pub description: String,
    pub link: String,
    pub pub_date: String,
    /// `M:SS`, `H:MM:SS`, or whatever colon form the feed gave
    pub duration: String,
    /// Enclosure (audio) URL
    pub listen_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<String>,
}

/// Patterns for one tag: CDATA body first, plain body second.
struct TagPattern {
    cdata: Regex,
    plain: Regex,
}

impl TagPattern {
    fn new(tag: &str) -> Self {
        let tag = regex::escape(tag);
        Self {
            cdata: Regex::new(&format!(
                r"(?s)<{tag}\b[^>]*>\s*<!\[CDATA\[(.*?)\]\]>\s*</{tag}>"
            ))
            .unwrap(),
            plain: Regex::new(&format!(r"(?s)<{tag}\b[^>]*>(.*?)</{tag}>")).unwrap(),
        }
    }

    /// Trimmed tag body, or empty when the tag is absent.
    fn extract(&self, item: &str) -> String {
        self.cdata
            .captures(item)
            .or_else(|| self.plain.captures(item))
            .and_then(|caps| caps.get(1))
            .map(|body| body.as_str().trim().to_string())
            .unwrap_or_default()
    }
}

struct ItemPatterns {
    title: TagPattern,
    description: TagPattern,
    link: TagPattern,
    pub_date: TagPattern,
    duration: TagPattern,
    enclosure: Regex,
    any_url: Regex,
    episode: Regex,
}

static CHANNEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<channel\b").unwrap());

static ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<item\b[^>]*>(.*?)</item>").unwrap());

static PATTERNS: LazyLock<ItemPatterns> = LazyLock::new(|| ItemPatterns {
    title: TagPattern::new("title"),
    description: TagPattern::new("description"),
    link: TagPattern::new("link"),
    pub_date: TagPattern::new("pubDate"),
    duration: TagPattern::new("itunes:duration"),
    enclosure: Regex::new(r#"<enclosure\b[^>]*?\burl="([^"]+)""#).unwrap(),
    any_url: Regex::new(r#"url="([^"]+)""#).unwrap(),
    episode: Regex::new(r"<itunes:episode>\s*(\d+)\s*</itunes:episode>").unwrap(),
});

/// Extract every episode with both a title and a description.
pub fn parse_feed(xml: &str) -> Result<Vec<Episode>, FeedError> {
    if !CHANNEL.is_match(xml) {
        return Err(FeedError::NotRss);
    }

    let patterns = &*PATTERNS;
    let episodes = ITEM
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .filter_map(|item| parse_item(patterns, item.as_str()))
        .collect();

    Ok(episodes)
}

fn parse_item(patterns: &ItemPatterns, item: &str) -> Option<Episode> {
    let title = patterns.title.extract(item);
    let description = patterns.description.extract(item);
    if title.is_empty() || description.is_empty() {
        return None;
    }

    let listen_url = patterns
        .enclosure
        .captures(item)
        .or_else(|| patterns.any_url.captures(item))
        .and_then(|caps| caps.get(1))
        .map(|url| url.as_str().to_string())
        .unwrap_or_default();

    let episode_number = patterns
        .episode
        .captures(item)
        .and_then(|caps| caps.get(1))
        .map(|n| n.as_str().to_string());

    Some(Episode {
        title,
        description,
        link: patterns.link.extract(item),
        pub_date: patterns.pub_date.extract(item),
        duration: format_duration(&patterns.duration.extract(item)),
        listen_url,
        episode_number,
    })
}

/// Normalize an `itunes:duration` value.
///
/// Colon forms pass through untouched. A bare number of seconds becomes
/// `M:SS`, or `H:MM:SS` once it reaches an hour. Only the leading digits
/// count, so `"125.5"` reads as 125 seconds. No leading digits: dropped.
pub fn format_duration(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() || raw.contains(':') {
        return raw.to_string();
    }

    let digits = raw.strip_prefix('+').unwrap_or(raw);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let Ok(total) = digits[..end].parse::<u64>() else {
        return String::new();
    };

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
