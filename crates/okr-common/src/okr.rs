//! OKR templates and the per-user instances that adopt them.
//!
//! Only the fields the progress board reads are modelled; unknown fields in
//! the service's JSON are ignored.

use serde::{Deserialize, Serialize};

use crate::lang::{Language, localized_title};

/// Template entities carry a Dutch and an English title.
pub trait BilingualTitle {
    fn title_nl(&self) -> Option<&str>;
    fn title_en(&self) -> Option<&str>;

    fn title(&self, language: Language) -> Option<String> {
        localized_title(self.title_nl(), self.title_en(), language)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: i64,
    #[serde(default)]
    pub life_domain_id: Option<i64>,
    #[serde(default)]
    pub title_nl: Option<String>,
    #[serde(default)]
    pub title_en: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub id: i64,
    #[serde(default)]
    pub goal_id: Option<i64>,
    /// Some service versions denormalise the goal's life domain onto the
    /// objective; when present it saves the goal lookup.
    #[serde(default)]
    pub life_domain_id: Option<i64>,
    #[serde(default)]
    pub title_nl: Option<String>,
    #[serde(default)]
    pub title_en: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyResult {
    pub id: i64,
    #[serde(default)]
    pub objective_id: Option<i64>,
    #[serde(default)]
    pub title_nl: Option<String>,
    #[serde(default)]
    pub title_en: Option<String>,
}

/// Library initiative attached to a key result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiativeTemplate {
    pub id: i64,
    pub key_result_id: i64,
    #[serde(default)]
    pub title_nl: Option<String>,
    #[serde(default)]
    pub title_en: Option<String>,
}

/// Initiative authored by a user; single-language title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInitiative {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_key_result_instance_id: Option<i64>,
    #[serde(default)]
    pub key_result_id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGoalInstance {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub goal_id: i64,
    #[serde(default)]
    pub number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserObjectiveInstance {
    pub id: i64,
    #[serde(default)]
    pub user_goal_instance_id: Option<i64>,
    pub objective_id: i64,
    #[serde(default)]
    pub number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserKeyResultInstance {
    pub id: i64,
    #[serde(default)]
    pub user_objective_instance_id: Option<i64>,
    pub key_result_id: i64,
    #[serde(default)]
    pub number: Option<String>,
}

/// `initiative_id` points either at a `UserInitiative` or at an
/// `InitiativeTemplate`; the record itself does not say which.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInitiativeInstance {
    pub id: i64,
    pub user_key_result_instance_id: i64,
    pub initiative_id: i64,
    #[serde(default)]
    pub number: Option<String>,
}

macro_rules! bilingual {
    ($($ty:ty),+) => {
        $(impl BilingualTitle for $ty {
            fn title_nl(&self) -> Option<&str> {
                self.title_nl.as_deref()
            }
            fn title_en(&self) -> Option<&str> {
                self.title_en.as_deref()
            }
        })+
    };
}

bilingual!(Goal, Objective, KeyResult, InitiativeTemplate);

/// Non-empty instance number, if any.
pub fn instance_number(number: Option<&str>) -> Option<String> {
    number.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string)
}
