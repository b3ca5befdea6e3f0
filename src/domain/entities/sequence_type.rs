use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider payment sequencing: `first` establishes a mandate, `recurring`
/// charges an existing one. `oneoff` is an ordinary payment; this gateway
/// never requests it but must accept it on fetched payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceType {
    Oneoff,
    First,
    Recurring,
}

impl SequenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceType::Oneoff => "oneoff",
            SequenceType::First => "first",
            SequenceType::Recurring => "recurring",
        }
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SequenceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "oneoff" => Ok(SequenceType::Oneoff),
            "first" => Ok(SequenceType::First),
            "recurring" => Ok(SequenceType::Recurring),
            _ => Err(format!("Unknown sequence type: {}", s)),
        }
    }
}
