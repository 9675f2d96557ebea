//! Presentation model of the board: four columns of cards in render order,
//! with the per-wheel counts that drive the "WIP limit reached" badge.

use std::collections::{BTreeMap, HashMap};

use okr_common::{ItemKey, ItemType, KanbanColumn, KanbanItem, Language, LifeDomain, WheelType};

use super::filters::BoardFilters;
use super::resolver::ResolvedTitles;
use super::wheels::WheelIndex;
use super::wip::WipLimits;

/// Characters of notes shown on a card.
pub const NOTES_PREVIEW_CHARS: usize = 80;

/// Group cards by column, each column sorted by `position` with `id`
/// breaking ties. Every column is present, possibly empty.
pub fn group_by_column<'a>(
    items: impl IntoIterator<Item = &'a KanbanItem>,
) -> BTreeMap<KanbanColumn, Vec<&'a KanbanItem>> {
    let mut grouped: BTreeMap<KanbanColumn, Vec<&KanbanItem>> =
        KanbanColumn::ALL.iter().map(|c| (*c, Vec::new())).collect();
    for item in items {
        grouped.entry(item.column_name).or_default().push(item);
    }
    for cards in grouped.values_mut() {
        cards.sort_by_key(|item| (item.position, item.id));
    }
    grouped
}

/// Wheel type of a card, through its resolved life domain.
pub fn wheel_of(
    item: &KanbanItem,
    titles: &ResolvedTitles,
    wheels: &WheelIndex,
) -> Option<WheelType> {
    titles
        .life_domain_id(&item.key())
        .and_then(|domain| wheels.wheel_type_of_domain(domain))
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub id: i64,
    pub key: ItemKey,
    pub item_type: ItemType,
    pub type_label: &'static str,
    pub title: String,
    pub number: Option<String>,
    pub life_domain_id: Option<i64>,
    pub domain_title: Option<String>,
    pub wheel: Option<WheelType>,
    pub notes_preview: Option<String>,
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnView {
    pub column: KanbanColumn,
    pub label: &'static str,
    pub cards: Vec<CardView>,
    pub wheel_counts: BTreeMap<WheelType, usize>,
    pub wip_reached: bool,
    /// Hidden by the column filter; rendered empty.
    pub hidden: bool,
}

impl ColumnView {
    pub fn count(&self, wheel: WheelType) -> usize {
        self.wheel_counts.get(&wheel).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    pub columns: Vec<ColumnView>,
    pub language: Language,
    pub read_only: bool,
    /// True until the first resolution pass for the current items commits.
    pub titles_pending: bool,
}

impl BoardView {
    pub fn column(&self, column: KanbanColumn) -> Option<&ColumnView> {
        self.columns.iter().find(|c| c.column == column)
    }

    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|c| c.cards.len()).sum()
    }
}

/// Inputs for [`BoardView::build`].
pub struct ViewInputs<'a> {
    pub items: &'a [&'a KanbanItem],
    pub titles: &'a ResolvedTitles,
    pub wheels: &'a WheelIndex,
    pub domains: &'a [LifeDomain],
    pub limits: &'a WipLimits,
    pub filters: &'a BoardFilters,
    pub language: Language,
    pub read_only: bool,
    pub titles_pending: bool,
}

impl BoardView {
    /// `items` are the already-filtered cards.
    pub fn build(inputs: ViewInputs<'_>) -> Self {
        let domains: HashMap<i64, &LifeDomain> = inputs.domains.iter().map(|d| (d.id, d)).collect();
        let grouped = group_by_column(inputs.items.iter().copied());

        let columns = grouped
            .into_iter()
            .map(|(column, items)| {
                let mut wheel_counts = BTreeMap::new();
                for item in &items {
                    if let Some(wheel) = wheel_of(item, inputs.titles, inputs.wheels) {
                        *wheel_counts.entry(wheel).or_insert(0) += 1;
                    }
                }
                let wip_reached = inputs.limits.reached(column, &wheel_counts);
                let hidden = !inputs.filters.shows_column(column);
                let cards = if hidden {
                    Vec::new()
                } else {
                    items
                        .iter()
                        .map(|item| card_view(item, &inputs, &domains))
                        .collect()
                };
                ColumnView {
                    column,
                    label: column.label(),
                    cards,
                    wheel_counts,
                    wip_reached,
                    hidden,
                }
            })
            .collect();

        Self {
            columns,
            language: inputs.language,
            read_only: inputs.read_only,
            titles_pending: inputs.titles_pending,
        }
    }
}

fn card_view(
    item: &KanbanItem,
    inputs: &ViewInputs<'_>,
    domains: &HashMap<i64, &LifeDomain>,
) -> CardView {
    let key = item.key();
    let life_domain_id = inputs.titles.life_domain_id(&key);
    CardView {
        id: item.id,
        key,
        item_type: item.item_type,
        type_label: item.item_type.label(inputs.language),
        title: inputs.titles.title_or_fallback(&key),
        number: inputs
            .titles
            .number(&key)
            .map(str::to_string)
            .or_else(|| okr_common::instance_number(item.number.as_deref())),
        life_domain_id,
        domain_title: life_domain_id
            .and_then(|id| domains.get(&id))
            .and_then(|d| d.title(inputs.language)),
        wheel: wheel_of(item, inputs.titles, inputs.wheels),
        notes_preview: item.notes_preview(NOTES_PREVIEW_CHARS),
        position: item.position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::resolver::fixtures::card;
    use crate::board::wheels::fixtures::{wheel_index, wheels_and_domains};

    #[test]
    fn test_group_by_column_sorts_by_position_then_id() {
        let items = vec![
            card(7, ItemType::Goal, 1, KanbanColumn::Todo, 2),
            card(3, ItemType::Goal, 2, KanbanColumn::Todo, 0),
            card(9, ItemType::Goal, 3, KanbanColumn::Todo, 2),
            card(4, ItemType::Goal, 4, KanbanColumn::Done, 0),
        ];
        let grouped = group_by_column(&items);
        assert_eq!(grouped.len(), 4);
        let todo: Vec<i64> = grouped[&KanbanColumn::Todo].iter().map(|i| i.id).collect();
        assert_eq!(todo, vec![3, 7, 9]);
        assert!(grouped[&KanbanColumn::InReview].is_empty());

        // Same input, same order.
        let again = group_by_column(items.iter().rev());
        let todo_again: Vec<i64> = again[&KanbanColumn::Todo].iter().map(|i| i.id).collect();
        assert_eq!(todo, todo_again);
    }

    #[tokio::test]
    async fn test_build_counts_wheels_and_flags_reached_limits() {
        use crate::api::OkrApi;
        use crate::board::resolver::TitleResolver;
        use crate::board::resolver::fixtures::api;

        let api = api();
        let mut items = api.list_kanban_items(1).await.unwrap();
        items[1].notes = Some("n".repeat(90));
        let titles = TitleResolver::new(api).resolve(&items, Language::En).await.unwrap();
        let (_, domains) = wheels_and_domains();
        let mut limits = WipLimits::new();
        limits.set(WheelType::Life, KanbanColumn::InProgress, 2);
        limits.set(WheelType::Life, KanbanColumn::Done, 1);
        let filters = BoardFilters {
            column: Some(KanbanColumn::InProgress),
            ..Default::default()
        };
        let refs: Vec<&KanbanItem> = items.iter().collect();
        let index = wheel_index();

        let view = BoardView::build(ViewInputs {
            items: &refs,
            titles: &titles,
            wheels: &index,
            domains: &domains,
            limits: &limits,
            filters: &filters,
            language: Language::En,
            read_only: false,
            titles_pending: false,
        });

        let in_progress = view.column(KanbanColumn::InProgress).unwrap();
        assert_eq!(in_progress.count(WheelType::Life), 2);
        assert!(in_progress.wip_reached);
        assert_eq!(in_progress.cards[0].title, "Run more");
        assert_eq!(in_progress.cards[0].domain_title.as_deref(), Some("Health"));
        assert_eq!(in_progress.cards[0].type_label, "Objective");
        assert_eq!(in_progress.cards[0].notes_preview.as_ref().unwrap().len(), 83);
        assert_eq!(in_progress.cards[1].number.as_deref(), Some("KR-3"));

        let todo = view.column(KanbanColumn::Todo).unwrap();
        assert!(todo.hidden);
        assert!(todo.cards.is_empty());
        assert_eq!(todo.count(WheelType::Business), 1, "hidden columns still count");

        let done = view.column(KanbanColumn::Done).unwrap();
        assert!(!done.wip_reached, "Done never shows as blocked");
        assert_eq!(view.card_count(), 2);
    }
}
