//! Shared domain types for the Goals-OKR progress board.
//!
//! | Module   | Contents                                                     |
//! |----------|--------------------------------------------------------------|
//! | `kanban` | `KanbanItem`, `ItemType`, `KanbanColumn`, `ItemKey`          |
//! | `okr`    | Goal / Objective / KeyResult / Initiative templates + instances |
//! | `wheel`  | `Wheel`, `LifeDomain`, `WheelType`                           |
//! | `lang`   | `Language` and the title preference helper                   |
//!
//! Every wire type deserializes from the camelCase JSON the Goals-OKR
//! service emits.

pub mod kanban;
pub mod lang;
pub mod okr;
pub mod wheel;

pub use kanban::{
    InstanceRef, ItemKey, ItemType, KanbanColumn, KanbanItem, UpdateNotesRequest,
    UpdatePositionRequest,
};
pub use lang::{Language, localized_title};
pub use okr::{
    BilingualTitle, Goal, InitiativeTemplate, KeyResult, Objective, UserGoalInstance,
    UserInitiative, UserInitiativeInstance, UserKeyResultInstance, UserObjectiveInstance,
    instance_number,
};
pub use wheel::{LifeDomain, Wheel, WheelType};

/// Error returned when parsing one of the board enums from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
