//! Shared enums

use serde::{Deserialize, Serialize};

/// Reporting window for the "top" aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "7day")]
    SevenDay,
    #[serde(rename = "1month")]
    OneMonth,
    #[serde(rename = "3month")]
    ThreeMonth,
    #[serde(rename = "6month")]
    SixMonth,
    #[serde(rename = "12month")]
    TwelveMonth,
    #[serde(rename = "overall")]
    Overall,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::SevenDay => "7day",
            Period::OneMonth => "1month",
            Period::ThreeMonth => "3month",
            Period::SixMonth => "6month",
            Period::TwelveMonth => "12month",
            Period::Overall => "overall",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "7day" => Some(Period::SevenDay),
            "1month" => Some(Period::OneMonth),
            "3month" => Some(Period::ThreeMonth),
            "6month" => Some(Period::SixMonth),
            "12month" => Some(Period::TwelveMonth),
            "overall" => Some(Period::Overall),
            _ => None,
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::Overall
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_roundtrip() {
        for s in ["7day", "1month", "3month", "6month", "12month", "overall"] {
            let period = Period::from_str(s).unwrap();
            assert_eq!(period.as_str(), s);
        }
    }

    #[test]
    fn test_period_rejects_unknown() {
        assert!(Period::from_str("2week").is_none());
        assert!(Period::from_str("").is_none());
    }

    #[test]
    fn test_period_default() {
        assert_eq!(Period::default(), Period::Overall);
    }
}
