use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use okr_common::{
    Goal, InitiativeTemplate, KanbanColumn, KanbanItem, KeyResult, LifeDomain, Objective,
    UserGoalInstance, UserInitiative, UserInitiativeInstance, UserKeyResultInstance,
    UserObjectiveInstance, Wheel,
};
use tokio::sync::{Mutex, Semaphore};

use super::{ApiResult, OkrApi};
use crate::errors::ApiError;

/// Backend contents for [`InMemoryOkrApi`].
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub kanban_items: Vec<KanbanItem>,
    pub team_items: HashMap<i64, Vec<KanbanItem>>,
    pub goals: Vec<Goal>,
    pub objectives: Vec<Objective>,
    pub key_results: Vec<KeyResult>,
    pub initiative_templates: Vec<InitiativeTemplate>,
    pub user_initiatives: Vec<UserInitiative>,
    pub user_goal_instances: Vec<UserGoalInstance>,
    pub user_objective_instances: Vec<UserObjectiveInstance>,
    pub user_key_result_instances: Vec<UserKeyResultInstance>,
    pub user_initiative_instances: Vec<UserInitiativeInstance>,
    pub wheels: Vec<Wheel>,
    pub life_domains: Vec<LifeDomain>,
}

#[derive(Debug, Default)]
struct State {
    data: SeedData,
    /// `(call, id)` → HTTP status to fail with. `id == None` fails every id.
    failures: HashMap<(&'static str, Option<i64>), u16>,
    calls: HashMap<&'static str, usize>,
}

/// In-process Goals-OKR backend.
///
/// Mutations change the seeded data the way the real service would. Tests
/// can inject failures per call and hold every call behind a gate to
/// observe in-flight behaviour.
#[derive(Debug, Default)]
pub struct InMemoryOkrApi {
    state: Mutex<State>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl InMemoryOkrApi {
    pub fn new(data: SeedData) -> Self {
        Self {
            state: Mutex::new(State {
                data,
                ..State::default()
            }),
            gate: Mutex::new(None),
        }
    }

    /// Make `call` fail with `status` (404 becomes `NotFound`). `id`
    /// restricts the failure to one entity.
    pub async fn fail(&self, call: &'static str, id: Option<i64>, status: u16) {
        self.state.lock().await.failures.insert((call, id), status);
    }

    pub async fn clear_failures(&self) {
        self.state.lock().await.failures.clear();
    }

    /// Number of times `call` was made.
    pub async fn calls(&self, call: &str) -> usize {
        self.state.lock().await.calls.get(call).copied().unwrap_or(0)
    }

    /// Every subsequent call consumes one permit before touching data.
    pub async fn set_gate(&self, gate: Option<Arc<Semaphore>>) {
        *self.gate.lock().await = gate;
    }

    /// Snapshot of the current kanban items.
    pub async fn kanban_items(&self) -> Vec<KanbanItem> {
        self.state.lock().await.data.kanban_items.clone()
    }

    pub async fn with_data<R>(&self, f: impl FnOnce(&mut SeedData) -> R) -> R {
        f(&mut self.state.lock().await.data)
    }

    /// Record the call, wait at the gate, then check injected failures.
    async fn enter(&self, call: &'static str, id: Option<i64>, resource: String) -> ApiResult<()> {
        {
            let mut state = self.state.lock().await;
            *state.calls.entry(call).or_insert(0) += 1;
        }

        let gate = self.gate.lock().await.clone();
        if let Some(gate) = gate {
            match gate.acquire().await {
                Ok(permit) => permit.forget(),
                Err(_) => {
                    return Err(ApiError::Status {
                        resource,
                        status: 503,
                        message: "backend closed".to_string(),
                    });
                }
            }
        }

        let state = self.state.lock().await;
        let status = id
            .and_then(|id| state.failures.get(&(call, Some(id))))
            .or_else(|| state.failures.get(&(call, None)))
            .copied();
        match status {
            Some(404) => Err(ApiError::not_found(resource)),
            Some(status) => Err(ApiError::Status {
                resource,
                status,
                message: "injected failure".to_string(),
            }),
            None => Ok(()),
        }
    }

    async fn find<T: Clone>(
        &self,
        call: &'static str,
        id: i64,
        resource: String,
        pick: impl FnOnce(&SeedData) -> Option<&T>,
    ) -> ApiResult<T> {
        self.enter(call, Some(id), resource.clone()).await?;
        let state = self.state.lock().await;
        pick(&state.data)
            .cloned()
            .ok_or_else(|| ApiError::not_found(resource))
    }
}

#[async_trait]
impl OkrApi for InMemoryOkrApi {
    async fn list_kanban_items(&self, user_id: i64) -> ApiResult<Vec<KanbanItem>> {
        self.enter("list_kanban_items", Some(user_id), format!("kanban items of user {}", user_id))
            .await?;
        let state = self.state.lock().await;
        Ok(state
            .data
            .kanban_items
            .iter()
            .filter(|item| item.user_id == Some(user_id))
            .cloned()
            .collect())
    }

    async fn list_team_kanban_items(&self, team_id: i64) -> ApiResult<Vec<KanbanItem>> {
        let resource = format!("kanban items of team {}", team_id);
        self.enter("list_team_kanban_items", Some(team_id), resource.clone())
            .await?;
        let state = self.state.lock().await;
        let items = state
            .data
            .team_items
            .get(&team_id)
            .ok_or_else(|| ApiError::not_found(resource))?;
        Ok(items
            .iter()
            .cloned()
            .map(|mut item| {
                item.read_only = true;
                item
            })
            .collect())
    }

    async fn update_position(
        &self,
        item_id: i64,
        column: KanbanColumn,
        position: i32,
    ) -> ApiResult<KanbanItem> {
        let resource = format!("kanban item {}", item_id);
        self.enter("update_position", Some(item_id), resource.clone())
            .await?;
        if position < 0 {
            return Err(ApiError::Status {
                resource,
                status: 400,
                message: "Position must be a non-negative integer".to_string(),
            });
        }
        let mut state = self.state.lock().await;
        let item = state
            .data
            .kanban_items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| ApiError::not_found(resource))?;
        item.column_name = column;
        item.position = position;
        Ok(item.clone())
    }

    async fn update_notes(&self, item_id: i64, notes: Option<String>) -> ApiResult<KanbanItem> {
        let resource = format!("kanban item {}", item_id);
        self.enter("update_notes", Some(item_id), resource.clone())
            .await?;
        let mut state = self.state.lock().await;
        let item = state
            .data
            .kanban_items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| ApiError::not_found(resource))?;
        item.notes = notes;
        Ok(item.clone())
    }

    async fn delete_kanban_item(&self, item_id: i64) -> ApiResult<()> {
        let resource = format!("kanban item {}", item_id);
        self.enter("delete_kanban_item", Some(item_id), resource.clone())
            .await?;
        let mut state = self.state.lock().await;
        let before = state.data.kanban_items.len();
        state.data.kanban_items.retain(|item| item.id != item_id);
        if state.data.kanban_items.len() == before {
            return Err(ApiError::not_found(resource));
        }
        Ok(())
    }

    async fn get_goal(&self, id: i64) -> ApiResult<Goal> {
        self.find("get_goal", id, format!("goal {}", id), |d| {
            d.goals.iter().find(|g| g.id == id)
        })
        .await
    }

    async fn get_objective(&self, id: i64) -> ApiResult<Objective> {
        self.find("get_objective", id, format!("objective {}", id), |d| {
            d.objectives.iter().find(|o| o.id == id)
        })
        .await
    }

    async fn get_key_result(&self, id: i64) -> ApiResult<KeyResult> {
        self.find("get_key_result", id, format!("key result {}", id), |d| {
            d.key_results.iter().find(|k| k.id == id)
        })
        .await
    }

    async fn list_initiatives_for_key_result(
        &self,
        key_result_id: i64,
    ) -> ApiResult<Vec<InitiativeTemplate>> {
        self.enter(
            "list_initiatives_for_key_result",
            Some(key_result_id),
            format!("initiatives of key result {}", key_result_id),
        )
        .await?;
        let state = self.state.lock().await;
        Ok(state
            .data
            .initiative_templates
            .iter()
            .filter(|t| t.key_result_id == key_result_id)
            .cloned()
            .collect())
    }

    async fn get_user_initiative(&self, id: i64) -> ApiResult<UserInitiative> {
        self.find("get_user_initiative", id, format!("user initiative {}", id), |d| {
            d.user_initiatives.iter().find(|i| i.id == id)
        })
        .await
    }

    async fn get_user_goal_instance(&self, id: i64) -> ApiResult<UserGoalInstance> {
        self.find(
            "get_user_goal_instance",
            id,
            format!("user goal instance {}", id),
            |d| d.user_goal_instances.iter().find(|i| i.id == id),
        )
        .await
    }

    async fn get_user_objective_instance(&self, id: i64) -> ApiResult<UserObjectiveInstance> {
        self.find(
            "get_user_objective_instance",
            id,
            format!("user objective instance {}", id),
            |d| d.user_objective_instances.iter().find(|i| i.id == id),
        )
        .await
    }

    async fn get_user_key_result_instance(&self, id: i64) -> ApiResult<UserKeyResultInstance> {
        self.find(
            "get_user_key_result_instance",
            id,
            format!("user key result instance {}", id),
            |d| d.user_key_result_instances.iter().find(|i| i.id == id),
        )
        .await
    }

    async fn get_user_initiative_instance(&self, id: i64) -> ApiResult<UserInitiativeInstance> {
        self.find(
            "get_user_initiative_instance",
            id,
            format!("user initiative instance {}", id),
            |d| d.user_initiative_instances.iter().find(|i| i.id == id),
        )
        .await
    }

    async fn list_user_objective_instances(
        &self,
        user_id: i64,
    ) -> ApiResult<Vec<UserObjectiveInstance>> {
        self.enter(
            "list_user_objective_instances",
            Some(user_id),
            format!("user objective instances of user {}", user_id),
        )
        .await?;
        // Instances carry no user id of their own; every seeded instance
        // belongs to the single seeded user.
        let state = self.state.lock().await;
        Ok(state.data.user_objective_instances.clone())
    }

    async fn list_wheels(&self) -> ApiResult<Vec<Wheel>> {
        self.enter("list_wheels", None, "wheels".to_string()).await?;
        Ok(self.state.lock().await.data.wheels.clone())
    }

    async fn list_life_domains(&self) -> ApiResult<Vec<LifeDomain>> {
        self.enter("list_life_domains", None, "life domains".to_string())
            .await?;
        Ok(self.state.lock().await.data.life_domains.clone())
    }
}
