//! Board filters.
//!
//! Filters apply in a fixed order: view mode, item type, life domain, then
//! wheel (explicit wheel type and the Goals-OKR context). The domain and
//! wheel steps are no-ops until resolution and wheel data exist, so a board
//! never goes blank just because titles are still loading.
//!
//! The column filter is not applied here: it only hides columns when
//! rendering. WIP counts and append positions always see every column.

use std::fmt;
use std::str::FromStr;

use okr_common::wheel::{WHEEL_OF_BUSINESS, WHEEL_OF_LIFE, WHEEL_OF_WORK};
use okr_common::{ItemType, KanbanColumn, KanbanItem, WheelType};
use serde::{Deserialize, Serialize};

use super::resolver::ResolvedTitles;
use super::wheels::WheelIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    All,
    Okrs,
    Initiatives,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Okrs => "okrs",
            Self::Initiatives => "initiatives",
        }
    }

    fn admits(&self, item_type: ItemType) -> bool {
        match self {
            Self::All => true,
            Self::Okrs => item_type.is_okr(),
            Self::Initiatives => item_type == ItemType::Initiative,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "okrs" | "okr" => Ok(Self::Okrs),
            "initiatives" | "initiative" => Ok(Self::Initiatives),
            _ => anyhow::bail!(
                "Invalid view mode '{}'. Valid values: all, okrs, initiatives",
                s
            ),
        }
    }
}

/// Which wheel(s) the board is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GoalsOkrContext {
    #[default]
    All,
    None,
    Life,
    Business,
    Work,
}

impl GoalsOkrContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::None => "NONE",
            Self::Life => "LIFE",
            Self::Business => "BUSINESS",
            Self::Work => "WORK",
        }
    }

    /// Wheel the context restricts to; `None` for `ALL` and `NONE`.
    pub fn wheel_key(&self) -> Option<&'static str> {
        match self {
            Self::Life => Some(WHEEL_OF_LIFE),
            Self::Business => Some(WHEEL_OF_BUSINESS),
            Self::Work => Some(WHEEL_OF_WORK),
            Self::All | Self::None => None,
        }
    }
}

impl fmt::Display for GoalsOkrContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalsOkrContext {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ALL" => Ok(Self::All),
            "NONE" => Ok(Self::None),
            "LIFE" => Ok(Self::Life),
            "BUSINESS" => Ok(Self::Business),
            "WORK" => Ok(Self::Work),
            _ => anyhow::bail!(
                "Invalid context '{}'. Valid values: ALL, NONE, LIFE, BUSINESS, WORK",
                s
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardFilters {
    pub view_mode: ViewMode,
    /// Ignored in `initiatives` view.
    pub item_type: Option<ItemType>,
    pub life_domain_id: Option<i64>,
    pub wheel: Option<WheelType>,
    pub context: GoalsOkrContext,
    /// Render-only; see module docs.
    pub column: Option<KanbanColumn>,
}

impl BoardFilters {
    /// Cards that pass every filter, in input order.
    pub fn apply<'a>(
        &self,
        items: &'a [KanbanItem],
        titles: &ResolvedTitles,
        wheels: &WheelIndex,
    ) -> Vec<&'a KanbanItem> {
        if self.context == GoalsOkrContext::None {
            return Vec::new();
        }

        let resolved = titles.has_life_domains();
        let wheel_ready = resolved && wheels.is_ready();
        let target_wheel_id = self
            .context
            .wheel_key()
            .and_then(|key| wheels.wheel_id_for_key(key));

        items
            .iter()
            .filter(|item| self.view_mode.admits(item.item_type))
            .filter(|item| match self.item_type {
                Some(t) if self.view_mode != ViewMode::Initiatives => item.item_type == t,
                _ => true,
            })
            .filter(|item| match self.life_domain_id {
                Some(domain) if resolved => titles.life_domain_id(&item.key()) == Some(domain),
                _ => true,
            })
            .filter(|item| match self.wheel {
                Some(wheel) if wheel_ready => titles
                    .life_domain_id(&item.key())
                    .and_then(|d| wheels.wheel_type_of_domain(d))
                    == Some(wheel),
                _ => true,
            })
            .filter(|item| match target_wheel_id {
                Some(target) if wheel_ready => titles
                    .life_domain_id(&item.key())
                    .and_then(|d| wheels.wheel_of_domain(d))
                    == Some(target),
                _ => true,
            })
            .collect()
    }

    /// Whether `column` is shown under the column filter.
    pub fn shows_column(&self, column: KanbanColumn) -> bool {
        self.column.is_none_or(|c| c == column)
    }
}
