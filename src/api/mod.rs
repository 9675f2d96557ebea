//! Goals-OKR REST collaborator.
//!
//! [`OkrApi`] is the seam between the board and the backend. Two
//! implementations ship with the crate:
//!
//! | Type            | Use                                             |
//! |-----------------|-------------------------------------------------|
//! | `HttpOkrApi`    | reqwest client against `/api/v2/goals-okr`      |
//! | `InMemoryOkrApi`| seeded in-process backend for tests and demos   |

pub mod http;
pub mod memory;

use async_trait::async_trait;
use okr_common::{
    Goal, InitiativeTemplate, KanbanColumn, KanbanItem, KeyResult, LifeDomain, Objective,
    UserGoalInstance, UserInitiative, UserInitiativeInstance, UserKeyResultInstance,
    UserObjectiveInstance, Wheel,
};

use crate::errors::ApiError;

pub use http::HttpOkrApi;
pub use memory::InMemoryOkrApi;

pub type ApiResult<T> = Result<T, ApiError>;

/// Every call the board makes against the Goals-OKR service.
///
/// Lookups by id return `ApiError::NotFound` for a missing entity so the
/// resolver can tell "does not exist" apart from transport failures.
#[async_trait]
pub trait OkrApi: Send + Sync {
    // Kanban items
    async fn list_kanban_items(&self, user_id: i64) -> ApiResult<Vec<KanbanItem>>;
    async fn list_team_kanban_items(&self, team_id: i64) -> ApiResult<Vec<KanbanItem>>;
    async fn update_position(
        &self,
        item_id: i64,
        column: KanbanColumn,
        position: i32,
    ) -> ApiResult<KanbanItem>;
    async fn update_notes(&self, item_id: i64, notes: Option<String>) -> ApiResult<KanbanItem>;
    async fn delete_kanban_item(&self, item_id: i64) -> ApiResult<()>;

    // Templates
    async fn get_goal(&self, id: i64) -> ApiResult<Goal>;
    async fn get_objective(&self, id: i64) -> ApiResult<Objective>;
    async fn get_key_result(&self, id: i64) -> ApiResult<KeyResult>;
    async fn list_initiatives_for_key_result(
        &self,
        key_result_id: i64,
    ) -> ApiResult<Vec<InitiativeTemplate>>;
    async fn get_user_initiative(&self, id: i64) -> ApiResult<UserInitiative>;

    // User instances
    async fn get_user_goal_instance(&self, id: i64) -> ApiResult<UserGoalInstance>;
    async fn get_user_objective_instance(&self, id: i64) -> ApiResult<UserObjectiveInstance>;
    async fn get_user_key_result_instance(&self, id: i64) -> ApiResult<UserKeyResultInstance>;
    async fn get_user_initiative_instance(&self, id: i64) -> ApiResult<UserInitiativeInstance>;
    async fn list_user_objective_instances(
        &self,
        user_id: i64,
    ) -> ApiResult<Vec<UserObjectiveInstance>>;

    // Wheels
    async fn list_wheels(&self) -> ApiResult<Vec<Wheel>>;
    async fn list_life_domains(&self) -> ApiResult<Vec<LifeDomain>>;
}
