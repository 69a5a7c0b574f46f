//! Terminal presentation of the published view.

use std::fmt::Write as _;

use client_core::{MarkdownRenderer, ViewState};

pub const AWAITING: &str = "Awaiting results…";

/// Shows report markdown as-is, minus control characters that could drive the terminal.
pub struct TerminalMarkdown;

impl MarkdownRenderer for TerminalMarkdown {
    fn render(&self, markdown: &str) -> String {
        sanitize(markdown).trim_end().to_string()
    }
}

/// Drops control characters (escape sequences, bells) from server-supplied text, keeping
/// newlines and tabs.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Lines describing what changed between two successive snapshots.
pub fn progress_lines(previous: &ViewState, next: &ViewState) -> Vec<String> {
    let mut lines = Vec::new();
    if next.status != previous.status {
        lines.push(format!("» {}", sanitize(&next.status)));
    }
    if next.news_items.len() > previous.news_items.len() {
        for item in &next.news_items[previous.news_items.len()..] {
            lines.push(format!("  + news: {}", sanitize(&item.title)));
        }
    }
    if next.market_summary.is_some() && next.market_summary != previous.market_summary {
        lines.push("  + market data snapshot received".to_string());
    }
    if !next.report_markdown.is_empty() && next.report_markdown != previous.report_markdown {
        lines.push("  + analyst memo drafted".to_string());
    }
    lines
}

pub fn render_view(view: &ViewState, markdown: &dyn MarkdownRenderer) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}]", sanitize(&view.status));

    let _ = writeln!(out, "\n== News & Market Intelligence ==");
    match view.headline() {
        Some(item) => {
            let _ = writeln!(out, "{}", sanitize(&item.title));
            let _ = writeln!(out, "{}", sanitize(&item.snippet));
            if let Some(url) = item.url.as_deref().filter(|url| !url.is_empty()) {
                let _ = writeln!(out, "Source: {}", sanitize(url));
            }
        }
        None => {
            let _ = writeln!(out, "{AWAITING}");
        }
    }

    let _ = writeln!(out, "\n== Market Data Snapshot ==");
    match &view.market_summary {
        Some(summary) => {
            let pretty = serde_json::to_string_pretty(&summary.0)
                .unwrap_or_else(|_| summary.0.to_string());
            let _ = writeln!(out, "{pretty}");
        }
        None => {
            let _ = writeln!(out, "{AWAITING}");
        }
    }

    let _ = writeln!(out, "\n== Analyst Memo ==");
    if view.report_markdown.is_empty() {
        let _ = writeln!(out, "{AWAITING}");
    } else {
        let _ = writeln!(out, "{}", markdown.render(&view.report_markdown));
    }

    out
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
