//! Polymorphic title resolution.
//!
//! A kanban card only knows `(item_type, item_id)`, where `item_id` is the id
//! of the user's *instance*. Turning that into something displayable means
//! walking the instance up to its template and, for the life domain, on up
//! the OKR tree:
//!
//! ```text
//! INITIATIVE → user initiative instance → (user initiative | template) → key result → objective → goal
//! KEY_RESULT → user key result instance → key result → objective → goal
//! OBJECTIVE  → user objective instance  → objective → goal
//! GOAL       → user goal instance       → goal
//! ```
//!
//! Passes run items one at a time. Every pass takes a new generation number
//! and re-checks it after each await; a superseded pass drops its partial
//! maps and never commits.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use okr_common::{
    BilingualTitle, InstanceRef, ItemKey, KanbanItem, KeyResult, Language, Objective,
    instance_number,
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::api::OkrApi;
use crate::errors::ApiError;

/// Immutable result of one resolution pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedTitles {
    pub language: Language,
    titles: HashMap<ItemKey, String>,
    numbers: HashMap<ItemKey, String>,
    life_domains: HashMap<ItemKey, i64>,
}

impl ResolvedTitles {
    pub fn title(&self, key: &ItemKey) -> Option<&str> {
        self.titles.get(key).map(String::as_str)
    }

    /// Resolved title, or `"{ITEM_TYPE} {itemId}"`.
    pub fn title_or_fallback(&self, key: &ItemKey) -> String {
        self.title(key)
            .map(str::to_string)
            .unwrap_or_else(|| key.fallback_title())
    }

    pub fn number(&self, key: &ItemKey) -> Option<&str> {
        self.numbers.get(key).map(String::as_str)
    }

    pub fn life_domain_id(&self, key: &ItemKey) -> Option<i64> {
        self.life_domains.get(key).copied()
    }

    /// True when at least one card has a life domain; domain and wheel
    /// filters stay inactive until then.
    pub fn has_life_domains(&self) -> bool {
        !self.life_domains.is_empty()
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

#[derive(Debug)]
struct Resolution {
    title: Option<String>,
    number: Option<String>,
    life_domain_id: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
enum StepError {
    #[error("superseded by a newer pass")]
    Superseded,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{0}")]
    Unresolvable(String),
}

/// Resolves card titles, instance numbers and life domains against an
/// [`OkrApi`], keeping the latest committed snapshot.
pub struct TitleResolver {
    api: Arc<dyn OkrApi>,
    generation: AtomicU64,
    snapshot: Mutex<Arc<ResolvedTitles>>,
}

impl TitleResolver {
    pub fn new(api: Arc<dyn OkrApi>) -> Self {
        Self {
            api,
            generation: AtomicU64::new(0),
            snapshot: Mutex::new(Arc::new(ResolvedTitles::default())),
        }
    }

    /// Latest committed snapshot.
    pub async fn snapshot(&self) -> Arc<ResolvedTitles> {
        self.snapshot.lock().await.clone()
    }

    /// Abandon any pass in flight.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Run a full pass over `items`. Returns the committed snapshot, or
    /// `None` if a newer pass (or `cancel`) superseded this one.
    pub async fn resolve(
        &self,
        items: &[KanbanItem],
        language: Language,
    ) -> Option<Arc<ResolvedTitles>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, items = items.len(), %language, "title resolution started");

        let mut resolved = ResolvedTitles {
            language,
            ..ResolvedTitles::default()
        };

        for item in items {
            if !self.is_current(generation) {
                debug!(generation, "title resolution superseded");
                return None;
            }
            let key = item.key();
            match self.resolve_item(generation, item, language).await {
                Ok(resolution) => {
                    let title = resolution
                        .title
                        .unwrap_or_else(|| key.fallback_title());
                    resolved.titles.insert(key, title);
                    if let Some(number) = resolution.number {
                        resolved.numbers.insert(key, number);
                    }
                    if let Some(domain) = resolution.life_domain_id {
                        resolved.life_domains.insert(key, domain);
                    }
                }
                Err(StepError::Superseded) => {
                    debug!(generation, "title resolution superseded");
                    return None;
                }
                Err(err) => {
                    warn!(
                        item = %key,
                        card = item.id,
                        error = %err,
                        "failed to resolve card; using fallback title"
                    );
                    resolved.titles.insert(key, key.fallback_title());
                }
            }
        }

        let mut slot = self.snapshot.lock().await;
        if !self.is_current(generation) {
            debug!(generation, "title resolution superseded before commit");
            return None;
        }
        let snapshot = Arc::new(resolved);
        *slot = snapshot.clone();
        debug!(generation, titles = snapshot.len(), "title resolution committed");
        Some(snapshot)
    }

    /// Await one lookup and re-check the generation.
    async fn step<T, F>(&self, generation: u64, lookup: F) -> Result<T, StepError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let result = lookup.await;
        if !self.is_current(generation) {
            return Err(StepError::Superseded);
        }
        Ok(result?)
    }

    async fn resolve_item(
        &self,
        generation: u64,
        item: &KanbanItem,
        language: Language,
    ) -> Result<Resolution, StepError> {
        let api = &self.api;
        match item.instance_ref() {
            InstanceRef::Goal {
                user_goal_instance_id,
            } => {
                let instance = self
                    .step(generation, api.get_user_goal_instance(user_goal_instance_id))
                    .await?;
                let goal = self.step(generation, api.get_goal(instance.goal_id)).await?;
                Ok(Resolution {
                    title: goal.title(language),
                    number: instance_number(instance.number.as_deref()),
                    life_domain_id: goal.life_domain_id,
                })
            }
            InstanceRef::Objective {
                user_objective_instance_id,
            } => {
                let instance = self
                    .step(
                        generation,
                        api.get_user_objective_instance(user_objective_instance_id),
                    )
                    .await?;
                let objective = self
                    .step(generation, api.get_objective(instance.objective_id))
                    .await?;
                Ok(Resolution {
                    title: objective.title(language),
                    number: instance_number(instance.number.as_deref()),
                    life_domain_id: self.objective_domain(generation, &objective).await?,
                })
            }
            InstanceRef::KeyResult {
                user_key_result_instance_id,
            } => {
                let instance = self
                    .step(
                        generation,
                        api.get_user_key_result_instance(user_key_result_instance_id),
                    )
                    .await?;
                let key_result = self
                    .step(generation, api.get_key_result(instance.key_result_id))
                    .await?;
                Ok(Resolution {
                    title: key_result.title(language),
                    number: instance_number(instance.number.as_deref()),
                    life_domain_id: self.key_result_domain(generation, &key_result).await?,
                })
            }
            InstanceRef::Initiative {
                user_initiative_instance_id,
            } => {
                self.resolve_initiative(generation, user_initiative_instance_id, language)
                    .await
            }
        }
    }

    async fn resolve_initiative(
        &self,
        generation: u64,
        user_initiative_instance_id: i64,
        language: Language,
    ) -> Result<Resolution, StepError> {
        let api = &self.api;
        let instance = self
            .step(
                generation,
                api.get_user_initiative_instance(user_initiative_instance_id),
            )
            .await?;
        let number = instance_number(instance.number.as_deref());

        // The instance's initiative_id may name a user-authored initiative or
        // a library template; try the former first.
        match self
            .step(generation, api.get_user_initiative(instance.initiative_id))
            .await
        {
            Ok(user_initiative) => {
                let key_result_id = match user_initiative.key_result_id {
                    Some(id) => id,
                    None => {
                        self.step(
                            generation,
                            api.get_user_key_result_instance(instance.user_key_result_instance_id),
                        )
                        .await?
                        .key_result_id
                    }
                };
                let key_result = self.step(generation, api.get_key_result(key_result_id)).await?;
                let title = Some(user_initiative.title.trim())
                    .filter(|t| !t.is_empty())
                    .map(str::to_string);
                return Ok(Resolution {
                    title,
                    number,
                    life_domain_id: self.key_result_domain(generation, &key_result).await?,
                });
            }
            Err(StepError::Api(err)) if err.is_not_found() => {
                debug!(
                    initiative_id = instance.initiative_id,
                    "not a user initiative; trying templates"
                );
            }
            Err(StepError::Api(err)) => {
                warn!(
                    initiative_id = instance.initiative_id,
                    error = %err,
                    "unexpected error loading user initiative; trying templates"
                );
            }
            Err(other) => return Err(other),
        }

        let kr_instance = self
            .step(
                generation,
                api.get_user_key_result_instance(instance.user_key_result_instance_id),
            )
            .await?;
        let key_result = self
            .step(generation, api.get_key_result(kr_instance.key_result_id))
            .await?;
        let templates = self
            .step(generation, api.list_initiatives_for_key_result(key_result.id))
            .await?;
        let template = templates
            .into_iter()
            .find(|t| t.id == instance.initiative_id)
            .ok_or_else(|| {
                StepError::Unresolvable(format!(
                    "template initiative {} not found for key result {}",
                    instance.initiative_id, key_result.id
                ))
            })?;

        Ok(Resolution {
            title: template.title(language),
            number,
            life_domain_id: self.key_result_domain(generation, &key_result).await?,
        })
    }

    async fn key_result_domain(
        &self,
        generation: u64,
        key_result: &KeyResult,
    ) -> Result<Option<i64>, StepError> {
        let Some(objective_id) = key_result.objective_id else {
            return Ok(None);
        };
        let objective = self
            .step(generation, self.api.get_objective(objective_id))
            .await?;
        self.objective_domain(generation, &objective).await
    }

    /// Objectives may carry the domain themselves; otherwise ask the goal.
    async fn objective_domain(
        &self,
        generation: u64,
        objective: &Objective,
    ) -> Result<Option<i64>, StepError> {
        if objective.life_domain_id.is_some() {
            return Ok(objective.life_domain_id);
        }
        let Some(goal_id) = objective.goal_id else {
            return Ok(None);
        };
        let goal = self.step(generation, self.api.get_goal(goal_id)).await?;
        Ok(goal.life_domain_id)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use okr_common::{ItemType, KanbanColumn};
    use tokio::sync::Semaphore;

    fn key(item_type: ItemType, item_id: i64) -> ItemKey {
        ItemKey::new(item_type, item_id)
    }

    #[tokio::test]
    async fn test_resolves_every_item_type() {
        let api = api();
        let resolver = TitleResolver::new(api.clone());
        let items = api.kanban_items().await;
        let snapshot = resolver.resolve(&items, Language::En).await.unwrap();

        assert_eq!(snapshot.title(&key(ItemType::Goal, 12)), Some("Health"));
        assert_eq!(snapshot.number(&key(ItemType::Goal, 12)), Some("G-1"));
        assert_eq!(snapshot.life_domain_id(&key(ItemType::Goal, 12)), Some(10));

        // Objective without its own domain goes through the goal.
        assert_eq!(snapshot.title(&key(ItemType::Objective, 22)), Some("Run more"));
        assert_eq!(snapshot.number(&key(ItemType::Objective, 22)), None);
        assert_eq!(snapshot.life_domain_id(&key(ItemType::Objective, 22)), Some(10));

        // Same item_id as the goal card, different type: no collision.
        assert_eq!(snapshot.title(&key(ItemType::KeyResult, 12)), Some("5k under 30 min"));
        assert_eq!(snapshot.number(&key(ItemType::KeyResult, 12)), Some("KR-3"));

        assert_eq!(snapshot.title(&key(ItemType::Initiative, 31)), Some("Learn Fajr prayer"));
        assert_eq!(snapshot.life_domain_id(&key(ItemType::Initiative, 31)), Some(20));
        assert_eq!(snapshot.number(&key(ItemType::Initiative, 31)), Some("I-7"));

        // User initiative without key_result_id takes it from its KR instance.
        assert_eq!(snapshot.title(&key(ItemType::Initiative, 32)), Some("Morning walk"));
        assert_eq!(snapshot.life_domain_id(&key(ItemType::Initiative, 32)), Some(10));

        assert_eq!(resolver.snapshot().await, snapshot);
    }

    #[tokio::test]
    async fn test_language_preference_with_fallback() {
        let api = api();
        let resolver = TitleResolver::new(api.clone());
        let items = api.kanban_items().await;
        let snapshot = resolver.resolve(&items, Language::Nl).await.unwrap();

        assert_eq!(snapshot.title(&key(ItemType::Goal, 12)), Some("Gezondheid"));
        assert_eq!(snapshot.title(&key(ItemType::Objective, 22)), Some("Run more"));
        assert_eq!(snapshot.language, Language::Nl);
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let api = api();
        let resolver = TitleResolver::new(api.clone());
        let items = api.kanban_items().await;
        let first = resolver.resolve(&items, Language::En).await.unwrap();
        let second = resolver.resolve(&items, Language::En).await.unwrap();
        assert_eq!(*first, *second);
    }

    #[tokio::test]
    async fn test_initiative_template_fallback_after_not_found() {
        // Instance 31 points at 77, which only exists as a template for KR 9.
        let api = api();
        let resolver = TitleResolver::new(api.clone());
        let items = vec![card(4, ItemType::Initiative, 31, KanbanColumn::Todo, 0)];
        let snapshot = resolver.resolve(&items, Language::En).await.unwrap();

        assert_eq!(snapshot.title(&key(ItemType::Initiative, 31)), Some("Learn Fajr prayer"));
        assert_eq!(api.calls("get_user_initiative").await, 1);
        assert_eq!(api.calls("list_initiatives_for_key_result").await, 1);
    }

    #[tokio::test]
    async fn test_initiative_unexpected_error_still_falls_back() {
        let api = api();
        api.fail("get_user_initiative", None, 500).await;
        let resolver = TitleResolver::new(api.clone());
        let items = vec![card(4, ItemType::Initiative, 31, KanbanColumn::Todo, 0)];
        let snapshot = resolver.resolve(&items, Language::En).await.unwrap();
        assert_eq!(snapshot.title(&key(ItemType::Initiative, 31)), Some("Learn Fajr prayer"));
    }

    #[tokio::test]
    async fn test_missing_template_yields_fallback_title() {
        let api = api();
        api.with_data(|d| d.initiative_templates.retain(|t| t.id != 77)).await;
        let resolver = TitleResolver::new(api.clone());
        let items = vec![card(4, ItemType::Initiative, 31, KanbanColumn::Todo, 0)];
        let snapshot = resolver.resolve(&items, Language::En).await.unwrap();

        let k = key(ItemType::Initiative, 31);
        assert_eq!(snapshot.title(&k), Some("INITIATIVE 31"));
        assert_eq!(snapshot.life_domain_id(&k), None);
        assert_eq!(snapshot.number(&k), None);
    }

    #[tokio::test]
    async fn test_one_failing_item_does_not_abort_the_pass() {
        let api = api();
        api.fail("get_goal", Some(100), 500).await;
        let resolver = TitleResolver::new(api.clone());
        let items = vec![
            card(1, ItemType::Goal, 12, KanbanColumn::Todo, 0),
            card(4, ItemType::Initiative, 31, KanbanColumn::Todo, 1),
        ];
        let snapshot = resolver.resolve(&items, Language::En).await.unwrap();

        assert_eq!(snapshot.title(&key(ItemType::Goal, 12)), Some("GOAL 12"));
        assert_eq!(snapshot.life_domain_id(&key(ItemType::Goal, 12)), None);
        assert_eq!(snapshot.title(&key(ItemType::Initiative, 31)), Some("Learn Fajr prayer"));
    }

    #[tokio::test]
    async fn test_missing_instance_yields_fallback_title() {
        let api = api();
        let resolver = TitleResolver::new(api.clone());
        let items = vec![card(9, ItemType::KeyResult, 999, KanbanColumn::Todo, 0)];
        let snapshot = resolver.resolve(&items, Language::En).await.unwrap();
        assert_eq!(snapshot.title_or_fallback(&key(ItemType::KeyResult, 999)), "KEY_RESULT 999");
        assert!(!snapshot.has_life_domains());
    }

    #[tokio::test]
    async fn test_superseded_pass_never_commits() {
        let api = api();
        let gate = Arc::new(Semaphore::new(0));
        api.set_gate(Some(gate.clone())).await;
        let resolver = Arc::new(TitleResolver::new(api.clone()));

        let first_items = vec![card(1, ItemType::Goal, 12, KanbanColumn::Todo, 0)];
        let second_items = vec![card(4, ItemType::Initiative, 31, KanbanColumn::Todo, 0)];

        let first = {
            let resolver = resolver.clone();
            tokio::spawn(async move { resolver.resolve(&first_items, Language::En).await })
        };
        // Let the first pass reach its first lookup and park at the gate.
        while api.calls("get_user_goal_instance").await == 0 {
            tokio::task::yield_now().await;
        }

        let second = {
            let resolver = resolver.clone();
            tokio::spawn(async move { resolver.resolve(&second_items, Language::En).await })
        };
        while api.calls("get_user_initiative_instance").await == 0 {
            tokio::task::yield_now().await;
        }

        gate.add_permits(100);
        let first = first.await.unwrap();
        let second = second.await.unwrap();

        assert!(first.is_none(), "older pass must abandon itself");
        let second = second.unwrap();
        assert_eq!(resolver.snapshot().await, second);
        assert!(second.title(&key(ItemType::Goal, 12)).is_none());
        assert_eq!(api.calls("get_goal").await, 0, "abandoned pass stops after its current lookup");
    }

    #[tokio::test]
    async fn test_cancel_discards_in_flight_pass() {
        let api = api();
        let gate = Arc::new(Semaphore::new(0));
        api.set_gate(Some(gate.clone())).await;
        let resolver = Arc::new(TitleResolver::new(api.clone()));
        let items = api.with_data(|d| d.kanban_items.clone()).await;

        let pass = {
            let resolver = resolver.clone();
            tokio::spawn(async move { resolver.resolve(&items, Language::En).await })
        };
        while api.calls("get_user_goal_instance").await == 0 {
            tokio::task::yield_now().await;
        }
        resolver.cancel();
        gate.add_permits(100);

        assert!(pass.await.unwrap().is_none());
        assert!(resolver.snapshot().await.is_empty());
    }
}
