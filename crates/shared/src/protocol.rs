use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ProtocolError;

/// One `data:` frame of the analysis stream before its payload is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl RawEnvelope {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Fields the pipeline attaches beyond the ones rendered here; kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewsItem {
    pub fn new(title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
            ..Self::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Market data snapshot; its fields are whatever the pipeline chose to report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketSummary(pub Value);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub markdown: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DonePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
}

/// A decoded unit of the analysis event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum EventEnvelope {
    Status(StatusPayload),
    News(NewsItem),
    DataSummary(MarketSummary),
    Report(ReportPayload),
    Error(ErrorPayload),
    Done(DonePayload),
    /// An event kind this client does not know; carried so callers can log it.
    Unknown { kind: String },
}

impl EventEnvelope {
    pub const STATUS: &'static str = "status";
    pub const NEWS: &'static str = "news";
    pub const DATA_SUMMARY: &'static str = "data_summary";
    pub const REPORT: &'static str = "report";
    pub const ERROR: &'static str = "error";
    pub const DONE: &'static str = "done";

    /// Decodes one JSON message body of the form `{"event": kind, "data": {...}}`.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let envelope: RawEnvelope =
            serde_json::from_str(raw).map_err(ProtocolError::MalformedEnvelope)?;
        Self::from_raw(envelope)
    }

    pub fn from_raw(raw: RawEnvelope) -> Result<Self, ProtocolError> {
        let RawEnvelope { event, data } = raw;
        let data = match data {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        let kind = event.as_str();
        let envelope = match kind {
            Self::STATUS => Self::Status(payload(Self::STATUS, data)?),
            Self::NEWS => Self::News(payload(Self::NEWS, data)?),
            Self::DATA_SUMMARY => Self::DataSummary(MarketSummary(data)),
            Self::REPORT => Self::Report(payload(Self::REPORT, data)?),
            Self::ERROR => Self::Error(payload(Self::ERROR, data)?),
            Self::DONE => Self::Done(payload(Self::DONE, data)?),
            _ => Self::Unknown {
                kind: kind.to_string(),
            },
        };
        Ok(envelope)
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::Status(_) => Self::STATUS,
            Self::News(_) => Self::NEWS,
            Self::DataSummary(_) => Self::DATA_SUMMARY,
            Self::Report(_) => Self::REPORT,
            Self::Error(_) => Self::ERROR,
            Self::Done(_) => Self::DONE,
            Self::Unknown { kind } => kind,
        }
    }

    /// Re-encodes the envelope in its wire shape.
    pub fn to_raw(&self) -> Result<RawEnvelope, serde_json::Error> {
        let data = match self {
            Self::Status(p) => serde_json::to_value(p)?,
            Self::News(p) => serde_json::to_value(p)?,
            Self::DataSummary(p) => serde_json::to_value(p)?,
            Self::Report(p) => serde_json::to_value(p)?,
            Self::Error(p) => serde_json::to_value(p)?,
            Self::Done(p) => serde_json::to_value(p)?,
            Self::Unknown { .. } => Value::Object(Map::new()),
        };
        Ok(RawEnvelope::new(self.kind(), data))
    }
}

fn payload<T: serde::de::DeserializeOwned>(
    kind: &'static str,
    data: Value,
) -> Result<T, ProtocolError> {
    serde_json::from_value(data).map_err(|source| ProtocolError::MalformedPayload { kind, source })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
