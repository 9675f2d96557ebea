use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseEnumError;
use crate::lang::{Language, localized_title};

pub const WHEEL_OF_LIFE: &str = "WHEEL_OF_LIFE";
pub const WHEEL_OF_BUSINESS: &str = "WHEEL_OF_BUSINESS";
pub const WHEEL_OF_WORK: &str = "WHEEL_OF_WORK";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wheel {
    pub id: i64,
    pub wheel_key: String,
    #[serde(default)]
    pub name_nl: Option<String>,
    #[serde(default)]
    pub name_en: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifeDomain {
    pub id: i64,
    #[serde(default)]
    pub domain_key: Option<String>,
    #[serde(default)]
    pub title_nl: Option<String>,
    #[serde(default)]
    pub title_en: Option<String>,
    #[serde(default)]
    pub wheel_id: Option<i64>,
}

impl LifeDomain {
    pub fn title(&self, language: Language) -> Option<String> {
        localized_title(self.title_nl.as_deref(), self.title_en.as_deref(), language)
    }
}

/// The wheels that take part in WIP accounting. Domains on any other wheel
/// (or on none) have no wheel type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelType {
    Life,
    Business,
}

impl WheelType {
    pub const ALL: [WheelType; 2] = [WheelType::Life, WheelType::Business];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Life => "life",
            Self::Business => "business",
        }
    }

    pub fn from_wheel_key(wheel_key: &str) -> Option<Self> {
        match wheel_key {
            WHEEL_OF_LIFE => Some(Self::Life),
            WHEEL_OF_BUSINESS => Some(Self::Business),
            _ => None,
        }
    }

    pub fn wheel_key(&self) -> &'static str {
        match self {
            Self::Life => WHEEL_OF_LIFE,
            Self::Business => WHEEL_OF_BUSINESS,
        }
    }

    /// The wheel names are product names and stay English in both languages.
    pub fn label(&self, _language: Language) -> &'static str {
        match self {
            Self::Life => "Wheel of Life",
            Self::Business => "Wheel of Business",
        }
    }
}

impl fmt::Display for WheelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WheelType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "life" => Ok(Self::Life),
            "business" => Ok(Self::Business),
            _ => Err(ParseEnumError::new("wheel type", s)),
        }
    }
}
