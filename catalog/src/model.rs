use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prefecture {
    Kumamoto,
    Oita,
    Miyazaki,
}

impl Prefecture {
    pub const ALL: [Prefecture; 3] = [Prefecture::Kumamoto, Prefecture::Oita, Prefecture::Miyazaki];

    pub fn as_str(&self) -> &'static str {
        match self {
            Prefecture::Kumamoto => "Kumamoto",
            Prefecture::Oita => "Oita",
            Prefecture::Miyazaki => "Miyazaki",
        }
    }
}

impl fmt::Display for Prefecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Nature,
    History,
    Onsen,
    Food,
    Activity,
    Spiritual,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Nature => "nature",
            Category::History => "history",
            Category::Onsen => "onsen",
            Category::Food => "food",
            Category::Activity => "activity",
            Category::Spiritual => "spiritual",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One curated travel spot. Loaded once at process start from the embedded
/// dataset; never created or mutated at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spot {
    pub id: String,
    pub name: String,
    pub prefecture: Prefecture,
    pub categories: Vec<Category>,
    pub description: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub image_url: String,
    pub tags: Vec<String>,
    pub is_premium: bool,
    pub highlights: Vec<String>,
    pub best_season: String,
    pub access: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
}
