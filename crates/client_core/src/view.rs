//! Externally observable result of one analysis session.

use shared::protocol::{MarketSummary, NewsItem};

pub const STATUS_CONNECTING: &str = "Connecting...";
pub const STATUS_CONNECTED: &str = "Connected, analyzing...";
pub const STATUS_COMPLETE: &str = "Analysis Complete";
pub const STATUS_PARSE_ERROR: &str = "Error parsing response";
pub const STATUS_CONNECTION_LOST: &str = "Connection lost";
pub const STATUS_ERROR_PREFIX: &str = "Error: ";

/// Snippets longer than this many characters qualify a news item as headline.
pub const HEADLINE_SNIPPET_THRESHOLD: usize = 100;

/// Accumulated view of a session. Replaced wholesale on every reduction, never edited in
/// place by the presentation layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub status: String,
    pub news_items: Vec<NewsItem>,
    pub market_summary: Option<MarketSummary>,
    pub report_markdown: String,
    pub is_connecting: bool,
    pub is_completed: bool,
}

impl ViewState {
    /// State published the moment a session starts, before any byte has arrived.
    pub fn connecting() -> Self {
        Self {
            status: STATUS_CONNECTING.to_string(),
            is_connecting: true,
            ..Self::default()
        }
    }

    pub fn headline(&self) -> Option<&NewsItem> {
        headline(&self.news_items)
    }
}

/// Picks the news item to feature: the first one with a substantial snippet, otherwise
/// the first one received.
pub fn headline(items: &[NewsItem]) -> Option<&NewsItem> {
    items
        .iter()
        .find(|item| item.snippet.chars().count() > HEADLINE_SNIPPET_THRESHOLD)
        .or_else(|| items.first())
}

/// Turns report markdown into display markup. Applied by the presentation layer only.
pub trait MarkdownRenderer {
    fn render(&self, markdown: &str) -> String;
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
