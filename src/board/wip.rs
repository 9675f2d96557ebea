//! Per-wheel work-in-progress limits.
//!
//! `evaluate` is a pure function: given the target column, the moved card,
//! the wheel classification of the target column's cards and the limits, it
//! decides whether the drop may proceed. A denial is an ordinary value the
//! controller turns into a user-facing message.

use std::collections::BTreeMap;

use okr_common::{KanbanColumn, KanbanItem, Language, WheelType};
use serde::{Deserialize, Serialize};

/// `wheel → column → limit`. Absent entries mean "no limit".
///
/// Serialises as `{"life":{"IN_PROGRESS":2},"business":{"TODO":5}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WipLimits(BTreeMap<WheelType, BTreeMap<KanbanColumn, u32>>);

impl WipLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, wheel: WheelType, column: KanbanColumn) -> Option<u32> {
        self.0.get(&wheel)?.get(&column).copied()
    }

    pub fn set(&mut self, wheel: WheelType, column: KanbanColumn, limit: u32) {
        self.0.entry(wheel).or_default().insert(column, limit);
    }

    /// Remove one limit; returns the previous value.
    pub fn unset(&mut self, wheel: WheelType, column: KanbanColumn) -> Option<u32> {
        let columns = self.0.get_mut(&wheel)?;
        let previous = columns.remove(&column);
        if columns.is_empty() {
            self.0.remove(&wheel);
        }
        previous
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeMap::is_empty)
    }

    /// All configured limits in wheel then column order.
    pub fn iter(&self) -> impl Iterator<Item = (WheelType, KanbanColumn, u32)> + '_ {
        self.0.iter().flat_map(|(wheel, columns)| {
            columns.iter().map(move |(column, limit)| (*wheel, *column, *limit))
        })
    }

    /// True when any wheel's count in `column` has reached its limit.
    /// Done is never blocked.
    pub fn reached(&self, column: KanbanColumn, counts: &BTreeMap<WheelType, usize>) -> bool {
        if column == KanbanColumn::Done {
            return false;
        }
        WheelType::ALL.iter().any(|wheel| match self.get(*wheel, column) {
            Some(limit) => counts.get(wheel).copied().unwrap_or(0) >= limit as usize,
            None => false,
        })
    }
}

/// Why a drop was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WipDenial {
    pub wheel: WheelType,
    pub column: KanbanColumn,
    pub limit: u32,
    pub current: usize,
}

impl WipDenial {
    pub fn message(&self, language: Language) -> String {
        let wheel = self.wheel.label(language);
        let column = self.column.label();
        match language {
            Language::Nl => format!(
                "WIP limit bereikt voor {}! Maximum {} items in \"{}\". Verplaats eerst een item naar een andere kolom.",
                wheel, self.limit, column
            ),
            Language::En => format!(
                "WIP limit reached for {}! Maximum {} items in \"{}\". Please move an item to another column first.",
                wheel, self.limit, column
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WipDecision {
    Allowed,
    Denied(WipDenial),
}

impl WipDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Decide whether `item` may be dropped into `target`.
///
/// `target_wheels` yields the wheel type of every card currently in the
/// target column (as the board shows it); unclassified cards yield `None`
/// and never count.
pub fn evaluate<I>(
    target: KanbanColumn,
    item: &KanbanItem,
    item_wheel: Option<WheelType>,
    target_wheels: I,
    limits: &WipLimits,
) -> WipDecision
where
    I: IntoIterator<Item = Option<WheelType>>,
{
    if target == KanbanColumn::Done {
        return WipDecision::Allowed;
    }
    let Some(wheel) = item_wheel else {
        return WipDecision::Allowed;
    };
    if item.column_name == target {
        return WipDecision::Allowed;
    }
    let Some(limit) = limits.get(wheel, target) else {
        return WipDecision::Allowed;
    };

    let current = target_wheels
        .into_iter()
        .filter(|w| *w == Some(wheel))
        .count();
    if current >= limit as usize {
        WipDecision::Denied(WipDenial {
            wheel,
            column: target,
            limit,
            current,
        })
    } else {
        WipDecision::Allowed
    }
}
