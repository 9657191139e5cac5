use std::fmt;

use catalog::model::Prefecture;
use serde::{Deserialize, Serialize};

/// Qualitative stop density of the generated itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pace {
    Relaxed,
    Moderate,
    Packed,
}

impl Pace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pace::Relaxed => "relaxed",
            Pace::Moderate => "moderate",
            Pace::Packed => "packed",
        }
    }
}

impl fmt::Display for Pace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Either the whole region or one prefecture. On the wire this is the
/// string "all" or a prefecture name, matching the web client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefectureFilter {
    All,
    One(Prefecture),
}

impl PrefectureFilter {
    pub fn as_option(&self) -> Option<Prefecture> {
        match self {
            PrefectureFilter::All => None,
            PrefectureFilter::One(p) => Some(*p),
        }
    }
}

impl Serialize for PrefectureFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PrefectureFilter::All => serializer.serialize_str("all"),
            PrefectureFilter::One(p) => serializer.serialize_str(p.as_str()),
        }
    }
}

impl<'de> Deserialize<'de> for PrefectureFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == "all" {
            return Ok(PrefectureFilter::All);
        }
        Prefecture::ALL
            .into_iter()
            .find(|p| p.as_str() == raw)
            .map(PrefectureFilter::One)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown prefecture '{}'", raw)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryRequest {
    pub days: u32,
    pub interests: Vec<String>,
    pub pace: Pace,
    pub prefecture: PrefectureFilter,
    #[serde(rename = "spotId", default, skip_serializing_if = "Option::is_none")]
    pub spot_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryResult {
    pub title: String,
    pub overview: String,
    pub days: Vec<DayPlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: u32,
    pub title: String,
    pub spots: Vec<ItineraryStop>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryStop {
    pub name: String,
    pub description: String,
    pub time: String,
    pub tip: String,
}
