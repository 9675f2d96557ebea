//! Board controller: loading, drag and drop, notes and deletion.
//!
//! The controller owns everything one board screen needs. That covers the
//! session (language, user, WIP limits), the query cache, the latest
//! resolution snapshot and the drag state machine:
//!
//! ```text
//! Idle ──begin_drag──▶ Dragging(id) ──drop_on──▶ Resolving(id) ──▶ Idle
//!                           │
//!                           └──cancel_drag / release over nothing──▶ Idle
//! ```
//!
//! Mutations are not optimistic: the call goes out, the affected cache keys
//! are invalidated and the board reloads and re-resolves. Once the mutation
//! call succeeds the operation succeeds; a failed reload only leaves the
//! board marked stale until the next successful load.

use std::sync::Arc;

use okr_common::{ItemType, KanbanColumn, KanbanItem, Language, LifeDomain};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::cache::{CachedValue, QueryCache, QueryKey};
use super::events::{self, BoardEvent, broadcast_event};
use super::filters::BoardFilters;
use super::resolver::{ResolvedTitles, TitleResolver};
use super::view::{BoardView, ViewInputs, group_by_column, wheel_of};
use super::wheels::WheelIndex;
use super::wip::{self, WipDecision, WipDenial, WipLimits};
use crate::api::OkrApi;
use crate::errors::{ApiError, BoardError};

/// Whose board is shown. Team boards are read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardSource {
    User(i64),
    Team(i64),
}

impl BoardSource {
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::Team(_))
    }
}

/// Per-screen context passed in explicitly.
#[derive(Debug, Clone, Default)]
pub struct BoardSession {
    pub language: Language,
    pub current_user: Option<i64>,
    pub wip_limits: WipLimits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { item_id: i64 },
    Resolving { item_id: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Column(KanbanColumn),
    /// Dropping on a card targets that card's column.
    Card(i64),
    /// Released outside any drop zone.
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    ReleasedOverNothing,
    SameColumn,
    UnknownTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    Moved {
        item_id: i64,
        from: KanbanColumn,
        to: KanbanColumn,
        position: i32,
    },
    NoOp(NoOpReason),
    Denied {
        denial: WipDenial,
        message: String,
    },
}

/// Proof that the user was asked before a delete. Only
/// [`BoardController::request_delete`] creates one.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteConfirmation {
    pub item_id: i64,
    pub item_type: ItemType,
    pub title: String,
    pub prompt: String,
    _private: (),
}

fn unresolved_title(language: Language) -> &'static str {
    match language {
        Language::En => "this item",
        Language::Nl => "dit item",
    }
}

fn delete_prompt(title: &str, language: Language) -> String {
    match language {
        Language::En => format!(
            "Are you sure you want to remove \"{}\" from your progress board?",
            title
        ),
        Language::Nl => format!(
            "Weet je zeker dat je \"{}\" wilt verwijderen van je progress board?",
            title
        ),
    }
}

pub struct BoardController {
    api: Arc<dyn OkrApi>,
    resolver: TitleResolver,
    session: BoardSession,
    source: BoardSource,
    filters: BoardFilters,
    cache: QueryCache,
    items: Arc<Vec<KanbanItem>>,
    titles: Arc<ResolvedTitles>,
    titles_pending: bool,
    stale: bool,
    wheels: WheelIndex,
    domains: Arc<Vec<LifeDomain>>,
    drag: DragState,
    events: broadcast::Sender<String>,
}

impl BoardController {
    pub fn new(api: Arc<dyn OkrApi>, session: BoardSession, source: BoardSource) -> Self {
        let (events, _) = events::channel();
        Self {
            resolver: TitleResolver::new(api.clone()),
            api,
            session,
            source,
            filters: BoardFilters::default(),
            cache: QueryCache::new(),
            items: Arc::new(Vec::new()),
            titles: Arc::new(ResolvedTitles::default()),
            titles_pending: true,
            stale: false,
            wheels: WheelIndex::default(),
            domains: Arc::new(Vec::new()),
            drag: DragState::Idle,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.events.subscribe()
    }

    pub fn session(&self) -> &BoardSession {
        &self.session
    }

    pub fn source(&self) -> BoardSource {
        self.source
    }

    pub fn is_read_only(&self) -> bool {
        self.source.is_read_only() || self.items.first().is_some_and(|i| i.read_only)
    }

    pub fn filters(&self) -> &BoardFilters {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: BoardFilters) {
        self.filters = filters;
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn titles(&self) -> &ResolvedTitles {
        &self.titles
    }

    /// True when a saved change could not be reloaded; the cards shown
    /// predate it.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Every loaded card, unfiltered.
    pub fn items(&self) -> &[KanbanItem] {
        &self.items
    }

    pub fn filtered_items(&self) -> Vec<&KanbanItem> {
        self.filters.apply(&self.items, &self.titles, &self.wheels)
    }

    pub fn view(&self) -> BoardView {
        let filtered = self.filtered_items();
        BoardView::build(ViewInputs {
            items: &filtered,
            titles: &self.titles,
            wheels: &self.wheels,
            domains: &self.domains,
            limits: &self.session.wip_limits,
            filters: &self.filters,
            language: self.session.language,
            read_only: self.is_read_only(),
            titles_pending: self.titles_pending,
        })
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Load wheels, domains and cards (through the cache), then resolve.
    pub async fn load(&mut self) -> Result<(), BoardError> {
        self.load_wheels().await;
        self.load_items().await?;
        self.stale = false;
        self.resolve_titles().await;
        Ok(())
    }

    /// Drop the cached card list and load again.
    pub async fn refresh(&mut self) -> Result<(), BoardError> {
        self.cache.invalidate(&QueryKey::KanbanItems(self.source));
        self.load().await
    }

    /// Switch language and re-resolve titles.
    pub async fn set_language(&mut self, language: Language) {
        if self.session.language == language {
            return;
        }
        self.session.language = language;
        self.titles_pending = true;
        self.resolve_titles().await;
    }

    /// Wheel data only gates filters and WIP accounting, so failures degrade
    /// instead of failing the board.
    async fn load_wheels(&mut self) {
        let wheels = match self.cache.wheels() {
            Some(wheels) => Some(wheels),
            None => match self.api.list_wheels().await {
                Ok(wheels) => {
                    let wheels = Arc::new(wheels);
                    self.cache.insert(QueryKey::Wheels, CachedValue::Wheels(wheels.clone()));
                    Some(wheels)
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        "failed to load wheels; wheel filters and WIP limits inactive"
                    );
                    None
                }
            },
        };
        let domains = match self.cache.life_domains() {
            Some(domains) => Some(domains),
            None => match self.api.list_life_domains().await {
                Ok(domains) => {
                    let domains = Arc::new(domains);
                    self.cache
                        .insert(QueryKey::LifeDomains, CachedValue::LifeDomains(domains.clone()));
                    Some(domains)
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        "failed to load life domains; wheel filters and WIP limits inactive"
                    );
                    None
                }
            },
        };

        let wheels = wheels.unwrap_or_default();
        let domains = domains.unwrap_or_default();
        self.wheels = WheelIndex::new(&wheels, &domains);
        self.domains = domains;
    }

    async fn load_items(&mut self) -> Result<(), BoardError> {
        if let Some(items) = self.cache.kanban_items(self.source) {
            self.set_items(items);
            return Ok(());
        }
        let fetched = match self.source {
            BoardSource::User(user_id) => self.api.list_kanban_items(user_id).await,
            BoardSource::Team(team_id) => self.api.list_team_kanban_items(team_id).await,
        }
        .map_err(BoardError::Load)?;
        debug!(source = ?self.source, count = fetched.len(), "kanban items loaded");

        let items = Arc::new(fetched);
        self.cache
            .insert(QueryKey::KanbanItems(self.source), CachedValue::KanbanItems(items.clone()));
        self.set_items(items);
        Ok(())
    }

    fn set_items(&mut self, items: Arc<Vec<KanbanItem>>) {
        if !Arc::ptr_eq(&self.items, &items) {
            self.titles_pending = true;
        }
        self.items = items;
    }

    /// Run a resolution pass over the current cards. A superseded pass
    /// leaves the previous snapshot in place.
    pub async fn resolve_titles(&mut self) {
        let items = self.items.clone();
        if let Some(snapshot) = self.resolver.resolve(&items, self.session.language).await {
            self.titles = snapshot;
            self.titles_pending = false;
            broadcast_event(
                &self.events,
                &BoardEvent::TitlesResolved {
                    count: self.titles.len(),
                },
            );
        }
    }

    // ── Drag and drop ────────────────────────────────────────────────

    fn ensure_writable(&self) -> Result<(), BoardError> {
        if self.is_read_only() {
            return Err(BoardError::ReadOnly);
        }
        Ok(())
    }

    /// Card by id among the cards currently shown.
    fn visible_item(&self, id: i64) -> Option<&KanbanItem> {
        self.filtered_items().into_iter().find(|i| i.id == id)
    }

    pub fn begin_drag(&mut self, item_id: i64) -> Result<(), BoardError> {
        self.ensure_writable()?;
        if self.visible_item(item_id).is_none() {
            return Err(BoardError::ItemNotFound { id: item_id });
        }
        self.drag = DragState::Dragging { item_id };
        Ok(())
    }

    pub fn cancel_drag(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Finish the gesture started by `begin_drag`. The state is `Idle`
    /// afterwards whatever the outcome.
    pub async fn drop_on(&mut self, target: DropTarget) -> Result<DropOutcome, BoardError> {
        let DragState::Dragging { item_id } = self.drag else {
            return Err(BoardError::NoActiveDrag);
        };
        self.drag = DragState::Resolving { item_id };
        let outcome = self.perform_drop(item_id, target).await;
        self.drag = DragState::Idle;
        outcome
    }

    /// `begin_drag` + `drop_on` in one call.
    pub async fn move_item(
        &mut self,
        item_id: i64,
        target: DropTarget,
    ) -> Result<DropOutcome, BoardError> {
        self.begin_drag(item_id)?;
        self.drop_on(target).await
    }

    async fn perform_drop(
        &mut self,
        item_id: i64,
        target: DropTarget,
    ) -> Result<DropOutcome, BoardError> {
        let (item, target_column, decision, position) = {
            let filtered = self.filtered_items();
            let Some(item) = filtered
                .iter()
                .find(|i| i.id == item_id)
                .map(|i| (*i).clone())
            else {
                return Err(BoardError::ItemNotFound { id: item_id });
            };

            let target_column = match target {
                DropTarget::Nothing => {
                    return Ok(DropOutcome::NoOp(NoOpReason::ReleasedOverNothing));
                }
                DropTarget::Column(column) => column,
                DropTarget::Card(card_id) => match filtered.iter().find(|i| i.id == card_id) {
                    Some(card) => card.column_name,
                    None => return Ok(DropOutcome::NoOp(NoOpReason::UnknownTarget)),
                },
            };
            if target_column == item.column_name {
                return Ok(DropOutcome::NoOp(NoOpReason::SameColumn));
            }

            let grouped = group_by_column(filtered.iter().copied());
            let target_cards = grouped
                .get(&target_column)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let decision = wip::evaluate(
                target_column,
                &item,
                wheel_of(&item, &self.titles, &self.wheels),
                target_cards
                    .iter()
                    .map(|card| wheel_of(card, &self.titles, &self.wheels)),
                &self.session.wip_limits,
            );
            let position = target_cards.len() as i32;
            (item, target_column, decision, position)
        };

        if let WipDecision::Denied(denial) = decision {
            let message = denial.message(self.session.language);
            info!(
                card = item.id,
                wheel = %denial.wheel,
                column = %denial.column,
                limit = denial.limit,
                "move denied by WIP limit"
            );
            broadcast_event(
                &self.events,
                &BoardEvent::MoveDenied {
                    item_id: item.id,
                    wheel: denial.wheel,
                    column: denial.column,
                    limit: denial.limit,
                    current: denial.current,
                    message: message.clone(),
                },
            );
            return Ok(DropOutcome::Denied { denial, message });
        }

        let updated = self
            .api
            .update_position(item.id, target_column, position)
            .await
            .map_err(|source| BoardError::Mutation {
                action: "move card",
                source,
            })?;
        info!(
            card = item.id,
            from = %item.column_name,
            to = %target_column,
            position,
            "card moved"
        );
        broadcast_event(
            &self.events,
            &BoardEvent::ItemMoved {
                item_id: item.id,
                from_column: item.column_name,
                to_column: target_column,
                position,
            },
        );
        self.after_mutation(updated.user_id.or(item.user_id), item.item_type).await;

        Ok(DropOutcome::Moved {
            item_id: item.id,
            from: item.column_name,
            to: target_column,
            position,
        })
    }

    // ── Notes and deletion ───────────────────────────────────────────

    /// Replace a card's notes. Blank text clears them.
    pub async fn update_notes(
        &mut self,
        item_id: i64,
        notes: Option<String>,
    ) -> Result<KanbanItem, BoardError> {
        self.ensure_writable()?;
        let item = self
            .items
            .iter()
            .find(|i| i.id == item_id)
            .cloned()
            .ok_or(BoardError::ItemNotFound { id: item_id })?;

        let notes = notes.filter(|n| !n.trim().is_empty());
        let cleared = notes.is_none();
        let updated = self
            .api
            .update_notes(item_id, notes)
            .await
            .map_err(|source| BoardError::Mutation {
                action: "update notes",
                source,
            })?;
        info!(card = item_id, cleared, "notes updated");
        broadcast_event(&self.events, &BoardEvent::NotesUpdated { item_id, cleared });
        self.after_mutation(item.user_id, item.item_type).await;
        Ok(updated)
    }

    /// First step of a delete: returns the confirmation to show the user.
    pub fn request_delete(&self, item_id: i64) -> Result<DeleteConfirmation, BoardError> {
        self.ensure_writable()?;
        let item = self
            .items
            .iter()
            .find(|i| i.id == item_id)
            .ok_or(BoardError::ItemNotFound { id: item_id })?;
        let language = self.session.language;
        let title = self
            .titles
            .title(&item.key())
            .map(str::to_string)
            .unwrap_or_else(|| unresolved_title(language).to_string());
        let prompt = delete_prompt(&title, language);
        Ok(DeleteConfirmation {
            item_id,
            item_type: item.item_type,
            title,
            prompt,
            _private: (),
        })
    }

    /// Second step: issue the destructive call.
    pub async fn confirm_delete(
        &mut self,
        confirmation: DeleteConfirmation,
    ) -> Result<(), BoardError> {
        self.ensure_writable()?;
        let user_id = self
            .items
            .iter()
            .find(|i| i.id == confirmation.item_id)
            .and_then(|i| i.user_id);
        self.api
            .delete_kanban_item(confirmation.item_id)
            .await
            .map_err(|source| BoardError::Mutation {
                action: "delete card",
                source,
            })?;
        info!(card = confirmation.item_id, title = %confirmation.title, "card deleted");
        broadcast_event(
            &self.events,
            &BoardEvent::ItemDeleted {
                item_id: confirmation.item_id,
                title: confirmation.title,
            },
        );
        self.after_mutation(user_id, confirmation.item_type).await;
        Ok(())
    }

    /// Invalidate what the mutation touched, then reload and re-resolve.
    /// The mutation already happened, so a reload failure is not an error.
    async fn after_mutation(&mut self, user_id: Option<i64>, item_type: ItemType) {
        let user_id = user_id.or(self.session.current_user);
        if let Some(user_id) = user_id {
            self.cache.invalidate(&QueryKey::KanbanItems(BoardSource::User(user_id)));
            if item_type == ItemType::Objective {
                self.cache
                    .invalidate(&QueryKey::UserObjectiveInstances { user_id });
            }
        }
        self.cache.invalidate(&QueryKey::KanbanItems(self.source));
        if let Err(e) = self.load().await {
            warn!(error = %e, "reload after a saved change failed; board is stale");
            self.stale = true;
        }
    }

    /// Cached list of the user's objective instances.
    pub async fn user_objective_instances(
        &mut self,
        user_id: i64,
    ) -> Result<Arc<Vec<okr_common::UserObjectiveInstance>>, ApiError> {
        if let Some(instances) = self.cache.user_objective_instances(user_id) {
            return Ok(instances);
        }
        let instances = Arc::new(self.api.list_user_objective_instances(user_id).await?);
        self.cache.insert(
            QueryKey::UserObjectiveInstances { user_id },
            CachedValue::UserObjectiveInstances(instances.clone()),
        );
        Ok(instances)
    }
}
