use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseEnumError;
use crate::lang::Language;

/// What a kanban card points at. The card's `item_id` is always the id of
/// the user's *instance*, never the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    Goal,
    Objective,
    KeyResult,
    Initiative,
}

impl ItemType {
    pub const ALL: [ItemType; 4] = [
        ItemType::Goal,
        ItemType::Objective,
        ItemType::KeyResult,
        ItemType::Initiative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Goal => "GOAL",
            Self::Objective => "OBJECTIVE",
            Self::KeyResult => "KEY_RESULT",
            Self::Initiative => "INITIATIVE",
        }
    }

    /// Goal, Objective and Key Result are the OKR levels; initiatives are
    /// the disjoint "work" level.
    pub fn is_okr(&self) -> bool {
        !matches!(self, Self::Initiative)
    }

    pub fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (Self::Goal, Language::En) => "Goal",
            (Self::Goal, Language::Nl) => "Doel",
            (Self::Objective, Language::En) => "Objective",
            (Self::Objective, Language::Nl) => "Objectief",
            (Self::KeyResult, Language::En) => "Key Result",
            (Self::KeyResult, Language::Nl) => "Kernresultaat",
            (Self::Initiative, Language::En) => "Initiative",
            (Self::Initiative, Language::Nl) => "Initiatief",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "GOAL" => Ok(Self::Goal),
            "OBJECTIVE" => Ok(Self::Objective),
            "KEY_RESULT" => Ok(Self::KeyResult),
            "INITIATIVE" => Ok(Self::Initiative),
            _ => Err(ParseEnumError::new("item type", s)),
        }
    }
}

/// The four board columns, in board order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KanbanColumn {
    Todo,
    InProgress,
    InReview,
    Done,
}

impl KanbanColumn {
    pub const ALL: [KanbanColumn; 4] = [
        KanbanColumn::Todo,
        KanbanColumn::InProgress,
        KanbanColumn::InReview,
        KanbanColumn::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::InReview => "IN_REVIEW",
            Self::Done => "DONE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::InReview => "In Review",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for KanbanColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KanbanColumn {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "TODO" | "TO_DO" => Ok(Self::Todo),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "IN_REVIEW" => Ok(Self::InReview),
            "DONE" => Ok(Self::Done),
            _ => Err(ParseEnumError::new("column", s)),
        }
    }
}

/// Typed reference to the instance behind a card. One variant per item
/// type so callers dispatch by pattern instead of comparing type strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceRef {
    Goal { user_goal_instance_id: i64 },
    Objective { user_objective_instance_id: i64 },
    KeyResult { user_key_result_instance_id: i64 },
    Initiative { user_initiative_instance_id: i64 },
}

/// Key shared by every resolver map: `"{ITEM_TYPE}-{itemId}"`.
///
/// Card ids are unique, but two cards of different types may carry the same
/// `item_id`, so the type is part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    pub item_type: ItemType,
    pub item_id: i64,
}

impl ItemKey {
    pub fn new(item_type: ItemType, item_id: i64) -> Self {
        Self { item_type, item_id }
    }

    /// Title used whenever nothing better could be resolved.
    pub fn fallback_title(&self) -> String {
        format!("{} {}", self.item_type, self.item_id)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.item_type, self.item_id)
    }
}

/// A card on the progress board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanItem {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub item_type: ItemType,
    pub item_id: i64,
    pub column_name: KanbanColumn,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl KanbanItem {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.item_type, self.item_id)
    }

    pub fn instance_ref(&self) -> InstanceRef {
        match self.item_type {
            ItemType::Goal => InstanceRef::Goal {
                user_goal_instance_id: self.item_id,
            },
            ItemType::Objective => InstanceRef::Objective {
                user_objective_instance_id: self.item_id,
            },
            ItemType::KeyResult => InstanceRef::KeyResult {
                user_key_result_instance_id: self.item_id,
            },
            ItemType::Initiative => InstanceRef::Initiative {
                user_initiative_instance_id: self.item_id,
            },
        }
    }

    /// Notes trimmed to `max_chars`, with an ellipsis when shortened.
    /// Blank notes yield `None`.
    pub fn notes_preview(&self, max_chars: usize) -> Option<String> {
        let notes = self.notes.as_deref()?.trim();
        if notes.is_empty() {
            return None;
        }
        if notes.chars().count() > max_chars {
            let cut: String = notes.chars().take(max_chars).collect();
            Some(format!("{}...", cut))
        } else {
            Some(notes.to_string())
        }
    }
}

/// Body of `PUT /kanban-items/{id}/position`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePositionRequest {
    pub column_name: KanbanColumn,
    pub position: i32,
}

/// Body of `PUT /kanban-items/{id}/notes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateNotesRequest {
    pub notes: Option<String>,
}
