//! Folds decoded envelopes into the next [`ViewState`].

use shared::protocol::EventEnvelope;

use crate::view::{ViewState, STATUS_COMPLETE, STATUS_ERROR_PREFIX};

/// How a session ends once the channel is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Completed,
    Failed,
}

/// Lifecycle consequence of an envelope, carried out by the session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Release(Terminal),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub state: ViewState,
    pub effect: Effect,
}

impl Reduction {
    fn keep(state: ViewState) -> Self {
        Self {
            state,
            effect: Effect::None,
        }
    }

    fn release(state: ViewState, terminal: Terminal) -> Self {
        Self {
            state,
            effect: Effect::Release(terminal),
        }
    }
}

pub fn reduce(state: &ViewState, envelope: &EventEnvelope) -> Reduction {
    let mut next = state.clone();
    match envelope {
        EventEnvelope::Status(payload) => {
            next.status = payload.message.clone();
            Reduction::keep(next)
        }
        EventEnvelope::News(item) => {
            next.news_items = state
                .news_items
                .iter()
                .cloned()
                .chain(std::iter::once(item.clone()))
                .collect();
            Reduction::keep(next)
        }
        EventEnvelope::DataSummary(summary) => {
            next.market_summary = Some(summary.clone());
            Reduction::keep(next)
        }
        EventEnvelope::Report(payload) => {
            next.report_markdown = payload.markdown.clone();
            Reduction::keep(next)
        }
        EventEnvelope::Error(payload) => {
            next.status = format!("{STATUS_ERROR_PREFIX}{}", payload.message);
            next.is_connecting = false;
            Reduction::release(next, Terminal::Failed)
        }
        EventEnvelope::Done(_) => {
            next.status = STATUS_COMPLETE.to_string();
            next.is_connecting = false;
            next.is_completed = true;
            Reduction::release(next, Terminal::Completed)
        }
        EventEnvelope::Unknown { .. } => Reduction::keep(next),
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
