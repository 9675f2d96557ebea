use std::time::Duration;

use async_trait::async_trait;
use okr_common::{
    Goal, InitiativeTemplate, KanbanColumn, KanbanItem, KeyResult, LifeDomain, Objective,
    UpdateNotesRequest, UpdatePositionRequest, UserGoalInstance, UserInitiative,
    UserInitiativeInstance, UserKeyResultInstance, UserObjectiveInstance, Wheel,
};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{ApiResult, OkrApi};
use crate::errors::ApiError;

const USER_AGENT: &str = concat!("okr-board/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed client for the Goals-OKR service.
///
/// `api_root` includes the `/api/v2/goals-okr` prefix, e.g.
/// `http://localhost:8080/api/v2/goals-okr`.
#[derive(Debug, Clone)]
pub struct HttpOkrApi {
    client: reqwest::Client,
    api_root: String,
    token: Option<String>,
}

impl HttpOkrApi {
    pub fn new(
        api_root: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| ApiError::Transport {
                resource: "HTTP client".to_string(),
                source,
            })?;
        Ok(Self {
            client,
            api_root: api_root.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.api_root, path);
        let builder = self
            .client
            .request(method, url)
            .header("Accept", "application/json");
        match self.token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        resource: &str,
    ) -> ApiResult<reqwest::Response> {
        tracing::debug!(resource, "goals-okr request");
        let resp = builder.send().await.map_err(|source| ApiError::Transport {
            resource: resource.to_string(),
            source,
        })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::not_found(resource));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                resource: resource.to_string(),
                status: status.as_u16(),
                message: error_message(&body, status),
            });
        }
        Ok(resp)
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response, resource: &str) -> ApiResult<T> {
        let bytes = resp.bytes().await.map_err(|source| ApiError::Transport {
            resource: resource.to_string(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode {
            resource: resource.to_string(),
            message: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, resource: &str) -> ApiResult<T> {
        let resp = self.send(self.request(Method::GET, path), resource).await?;
        Self::decode(resp, resource).await
    }

    async fn put_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        resource: &str,
    ) -> ApiResult<T> {
        let resp = self
            .send(self.request(Method::PUT, path).json(body), resource)
            .await?;
        Self::decode(resp, resource).await
    }
}

/// The service answers errors with `{"error": "..."}`; fall back to the raw
/// body, then to the status reason.
fn error_message(body: &str, status: StatusCode) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: Option<String>,
        message: Option<String>,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body)
        && let Some(message) = parsed.error.or(parsed.message)
    {
        return message;
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.chars().take(200).collect();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

#[async_trait]
impl OkrApi for HttpOkrApi {
    async fn list_kanban_items(&self, user_id: i64) -> ApiResult<Vec<KanbanItem>> {
        self.get_json(
            &format!("/users/{}/kanban-items", user_id),
            &format!("kanban items of user {}", user_id),
        )
        .await
    }

    async fn list_team_kanban_items(&self, team_id: i64) -> ApiResult<Vec<KanbanItem>> {
        self.get_json(
            &format!("/teams/{}/kanban-items", team_id),
            &format!("kanban items of team {}", team_id),
        )
        .await
    }

    async fn update_position(
        &self,
        item_id: i64,
        column: KanbanColumn,
        position: i32,
    ) -> ApiResult<KanbanItem> {
        let body = UpdatePositionRequest {
            column_name: column,
            position,
        };
        self.put_json(
            &format!("/kanban-items/{}/position", item_id),
            &body,
            &format!("kanban item {}", item_id),
        )
        .await
    }

    async fn update_notes(&self, item_id: i64, notes: Option<String>) -> ApiResult<KanbanItem> {
        let body = UpdateNotesRequest { notes };
        self.put_json(
            &format!("/kanban-items/{}/notes", item_id),
            &body,
            &format!("kanban item {}", item_id),
        )
        .await
    }

    async fn delete_kanban_item(&self, item_id: i64) -> ApiResult<()> {
        let resource = format!("kanban item {}", item_id);
        self.send(
            self.request(Method::DELETE, &format!("/kanban-items/{}", item_id)),
            &resource,
        )
        .await?;
        Ok(())
    }

    async fn get_goal(&self, id: i64) -> ApiResult<Goal> {
        self.get_json(&format!("/goals/{}", id), &format!("goal {}", id))
            .await
    }

    async fn get_objective(&self, id: i64) -> ApiResult<Objective> {
        self.get_json(&format!("/objectives/{}", id), &format!("objective {}", id))
            .await
    }

    async fn get_key_result(&self, id: i64) -> ApiResult<KeyResult> {
        self.get_json(&format!("/key-results/{}", id), &format!("key result {}", id))
            .await
    }

    async fn list_initiatives_for_key_result(
        &self,
        key_result_id: i64,
    ) -> ApiResult<Vec<InitiativeTemplate>> {
        self.get_json(
            &format!("/key-results/{}/initiatives", key_result_id),
            &format!("initiatives of key result {}", key_result_id),
        )
        .await
    }

    async fn get_user_initiative(&self, id: i64) -> ApiResult<UserInitiative> {
        self.get_json(&format!("/initiatives/{}", id), &format!("user initiative {}", id))
            .await
    }

    async fn get_user_goal_instance(&self, id: i64) -> ApiResult<UserGoalInstance> {
        self.get_json(
            &format!("/user-goal-instances/{}", id),
            &format!("user goal instance {}", id),
        )
        .await
    }

    async fn get_user_objective_instance(&self, id: i64) -> ApiResult<UserObjectiveInstance> {
        self.get_json(
            &format!("/user-objective-instances/{}", id),
            &format!("user objective instance {}", id),
        )
        .await
    }

    async fn get_user_key_result_instance(&self, id: i64) -> ApiResult<UserKeyResultInstance> {
        self.get_json(
            &format!("/user-key-result-instances/{}", id),
            &format!("user key result instance {}", id),
        )
        .await
    }

    async fn get_user_initiative_instance(&self, id: i64) -> ApiResult<UserInitiativeInstance> {
        self.get_json(
            &format!("/user-initiative-instances/{}", id),
            &format!("user initiative instance {}", id),
        )
        .await
    }

    async fn list_user_objective_instances(
        &self,
        user_id: i64,
    ) -> ApiResult<Vec<UserObjectiveInstance>> {
        self.get_json(
            &format!("/users/{}/user-objective-instances", user_id),
            &format!("user objective instances of user {}", user_id),
        )
        .await
    }

    async fn list_wheels(&self) -> ApiResult<Vec<Wheel>> {
        self.get_json("/wheels", "wheels").await
    }

    async fn list_life_domains(&self) -> ApiResult<Vec<LifeDomain>> {
        self.get_json("/life-domains", "life domains").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_error_field() {
        let msg = error_message(r#"{"error":"Position must be >= 0"}"#, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "Position must be >= 0");
    }

    #[test]
    fn test_error_message_falls_back_to_body_then_reason() {
        assert_eq!(error_message("upstream down", StatusCode::BAD_GATEWAY), "upstream down");
        assert_eq!(error_message("", StatusCode::INTERNAL_SERVER_ERROR), "Internal Server Error");
        assert_eq!(error_message("{}", StatusCode::FORBIDDEN), "{}");
    }

    #[test]
    fn test_api_root_trailing_slash_trimmed() {
        let api = HttpOkrApi::new(
            "http://localhost:8080/api/v2/goals-okr/",
            None,
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(api.api_root(), "http://localhost:8080/api/v2/goals-okr");
    }
}
