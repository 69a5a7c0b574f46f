use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SubjectError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// Generation of one opened push channel; signals carrying an older token are stale.
id_newtype!(ChannelToken);

impl ChannelToken {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Identifier of the instrument an analysis run is about (e.g. `NVDA`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Subject(String);

impl Subject {
    pub fn new(raw: impl Into<String>) -> Result<Self, SubjectError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SubjectError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Catalog entry for this subject, if it is one of the built-in instruments.
    pub fn instrument(&self) -> Option<&'static Instrument> {
        INSTRUMENT_CATALOG
            .iter()
            .find(|instrument| instrument.symbol == self.0)
    }
}

impl TryFrom<String> for Subject {
    type Error = SubjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Subject> for String {
    fn from(value: Subject) -> Self {
        value.0
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instrument {
    pub symbol: &'static str,
    pub label: &'static str,
}

pub const DEFAULT_SUBJECT: &str = "NVDA";

pub const INSTRUMENT_CATALOG: &[Instrument] = &[
    Instrument {
        symbol: "NVDA",
        label: "NVIDIA Corp (NVDA)",
    },
    Instrument {
        symbol: "AAPL",
        label: "Apple Inc (AAPL)",
    },
    Instrument {
        symbol: "MSFT",
        label: "Microsoft Corp (MSFT)",
    },
    Instrument {
        symbol: "GOOGL",
        label: "Alphabet Inc (GOOGL)",
    },
    Instrument {
        symbol: "AMZN",
        label: "Amazon.com Inc (AMZN)",
    },
    Instrument {
        symbol: "TSLA",
        label: "Tesla Inc (TSLA)",
    },
    Instrument {
        symbol: "META",
        label: "Meta Platforms Inc (META)",
    },
    Instrument {
        symbol: "NFLX",
        label: "Netflix Inc (NFLX)",
    },
    Instrument {
        symbol: "AMD",
        label: "Advanced Micro Devices (AMD)",
    },
    Instrument {
        symbol: "CRM",
        label: "Salesforce Inc (CRM)",
    },
    Instrument {
        symbol: "ADBE",
        label: "Adobe Inc (ADBE)",
    },
    Instrument {
        symbol: "INTC",
        label: "Intel Corp (INTC)",
    },
];

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
