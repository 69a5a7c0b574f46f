//! Client side of the streaming stock analysis service.
//!
//! [`session::SessionController`] owns the push channel of one analysis run and publishes
//! a [`view::ViewState`] built by the pure [`reducer::reduce`] function.

pub mod error;
pub mod health;
pub mod reducer;
pub mod session;
pub mod sse;
pub mod transport;
pub mod view;

pub use error::TransportError;
pub use health::check_health;
pub use reducer::{reduce, Effect, Reduction, Terminal};
pub use session::{Phase, Session, SessionController};
pub use transport::{
    parse_server_url, stream_url, ChannelEvent, ChannelHandle, ChannelSignal, PushTransport,
    SignalSender, SseTransport,
};
pub use view::{headline, MarkdownRenderer, ViewState};
