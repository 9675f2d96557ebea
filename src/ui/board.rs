//! Terminal rendering of a [`BoardView`].
//!
//! Columns are stacked vertically, each with a header showing its card
//! count, per-wheel counts and the WIP badge. Card text is wrapped to the
//! terminal width.

use std::fmt::Write as _;
use std::time::Duration;

use console::{measure_text_width, style};
use indicatif::{ProgressBar, ProgressStyle};
use okr_common::{Language, WheelType};

use crate::board::view::{BoardView, CardView, ColumnView};
use crate::ui::icons::{BLOCKED, BUSINESS, CHECK, CROSS, LIFE, LOCK};

const DEFAULT_WIDTH: usize = 100;
const MIN_WIDTH: usize = 40;

/// Current terminal width, or a sensible default when not attached to one.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| w as usize)
        .unwrap_or(DEFAULT_WIDTH)
        .max(MIN_WIDTH)
}

fn wheel_icon(wheel: WheelType) -> String {
    match wheel {
        WheelType::Life => LIFE.to_string(),
        WheelType::Business => BUSINESS.to_string(),
    }
}

fn wip_badge(language: Language) -> &'static str {
    match language {
        Language::En => "WIP limit reached",
        Language::Nl => "WIP limiet bereikt",
    }
}

fn resolving_banner(language: Language) -> &'static str {
    match language {
        Language::En => "Resolving titles...",
        Language::Nl => "Titels laden...",
    }
}

fn read_only_banner(language: Language) -> &'static str {
    match language {
        Language::En => "Team board (read-only)",
        Language::Nl => "Teambord (alleen lezen)",
    }
}

fn empty_column(language: Language) -> &'static str {
    match language {
        Language::En => "(no items)",
        Language::Nl => "(geen items)",
    }
}

/// Render the whole board into a string.
pub fn render_board(view: &BoardView, width: usize) -> String {
    let width = width.max(MIN_WIDTH);
    let mut out = String::new();

    if view.read_only {
        let _ = writeln!(out, "{}{}", LOCK, style(read_only_banner(view.language)).yellow());
    }
    if view.titles_pending {
        let _ = writeln!(out, "{}", style(resolving_banner(view.language)).dim());
    }

    for column in &view.columns {
        render_column(&mut out, column, view.language, width);
    }
    out
}

/// Lay header segments out left to right, starting a new indented line
/// whenever the next segment would overflow `width`.
fn fit_segments(segments: &[String], width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for segment in segments {
        if current.is_empty() {
            current.push_str(segment);
        } else if measure_text_width(&current) + 2 + measure_text_width(segment) <= width {
            let _ = write!(current, "  {}", segment);
        } else {
            lines.push(std::mem::take(&mut current));
            let _ = write!(current, "  {}", segment);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn render_column(out: &mut String, column: &ColumnView, language: Language, width: usize) {
    let mut segments = vec![format!(
        "{} ({})",
        style(column.label).bold(),
        column.cards.len()
    )];
    for (wheel, count) in &column.wheel_counts {
        segments.push(format!("{}{}", wheel_icon(*wheel), count));
    }
    if column.wip_reached {
        segments.push(format!("{}{}", BLOCKED, style(wip_badge(language)).red()));
    }
    let _ = writeln!(out);
    for line in fit_segments(&segments, width) {
        let _ = writeln!(out, "{}", line);
    }
    let _ = writeln!(out, "{}", style("─".repeat(width.min(DEFAULT_WIDTH))).dim());

    if column.hidden {
        return;
    }
    if column.cards.is_empty() {
        let _ = writeln!(out, "  {}", style(empty_column(language)).dim());
        return;
    }
    for card in &column.cards {
        render_card(out, card, width);
    }
}

fn render_card(out: &mut String, card: &CardView, width: usize) {
    let mut line = format!("#{} [{}]", card.id, card.type_label);
    if let Some(number) = &card.number {
        let _ = write!(line, " {}", style(number).cyan());
    }
    let _ = write!(line, " {}", card.title);
    let head = textwrap::Options::new(width)
        .initial_indent("  ")
        .subsequent_indent("      ");
    for wrapped in textwrap::wrap(&line, head) {
        let _ = writeln!(out, "{}", wrapped);
    }

    let meta = match (&card.domain_title, card.wheel) {
        (Some(domain), Some(wheel)) => Some(format!("{}{}", wheel_icon(wheel), domain)),
        (Some(domain), None) => Some(domain.clone()),
        (None, Some(wheel)) => Some(wheel_icon(wheel)),
        (None, None) => None,
    };
    if let Some(meta) = meta {
        let indent = textwrap::Options::new(width)
            .initial_indent("      ")
            .subsequent_indent("      ");
        for wrapped in textwrap::wrap(&meta, indent) {
            let _ = writeln!(out, "{}", style(wrapped).dim());
        }
    }

    if let Some(notes) = &card.notes_preview {
        let body = textwrap::Options::new(width)
            .initial_indent("      ")
            .subsequent_indent("      ");
        for wrapped in textwrap::wrap(notes, body) {
            let _ = writeln!(out, "{}", style(wrapped).italic());
        }
    }
}

/// Spinner shown while the board loads.
pub struct LoadingSpinner {
    bar: ProgressBar,
}

impl LoadingSpinner {
    pub fn start(message: impl Into<String>) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .expect("progress bar template is a valid static string"),
        );
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.bar.set_message(message.into());
    }

    pub fn finish_ok(self, message: impl AsRef<str>) {
        self.bar
            .finish_with_message(format!("{}{}", CHECK, message.as_ref()));
    }

    pub fn finish_err(self, message: impl AsRef<str>) {
        self.bar
            .finish_with_message(format!("{}{}", CROSS, style(message.as_ref()).red()));
    }

    /// Remove the spinner line without leaving a message.
    pub fn clear(self) {
        self.bar.finish_and_clear();
    }
}

/// Print the board to stdout at the terminal's width.
pub fn print_board(view: &BoardView) {
    print!("{}", render_board(view, terminal_width()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use okr_common::{ItemKey, ItemType, KanbanColumn};
    use std::collections::BTreeMap;

    fn card(id: i64, title: &str) -> CardView {
        CardView {
            id,
            key: ItemKey::new(ItemType::Goal, id),
            item_type: ItemType::Goal,
            type_label: "Goal",
            title: title.to_string(),
            number: Some("G-1".into()),
            life_domain_id: Some(10),
            domain_title: Some("Health".into()),
            wheel: Some(WheelType::Life),
            notes_preview: Some("Keep going".into()),
            position: 0,
        }
    }

    fn column(
        column: KanbanColumn,
        cards: Vec<CardView>,
        wip_reached: bool,
        hidden: bool,
    ) -> ColumnView {
        let mut wheel_counts = BTreeMap::new();
        if !cards.is_empty() {
            wheel_counts.insert(WheelType::Life, cards.len());
        }
        ColumnView {
            column,
            label: column.label(),
            cards,
            wheel_counts,
            wip_reached,
            hidden,
        }
    }

    fn board(read_only: bool, titles_pending: bool) -> BoardView {
        BoardView {
            columns: vec![
                column(KanbanColumn::Todo, vec![card(1, "Health")], false, false),
                column(
                    KanbanColumn::InProgress,
                    vec![card(2, "Run more"), card(3, "Sleep")],
                    true,
                    false,
                ),
                column(KanbanColumn::InReview, Vec::new(), false, false),
                column(KanbanColumn::Done, Vec::new(), false, true),
            ],
            language: Language::En,
            read_only,
            titles_pending,
        }
    }

    #[test]
    fn test_render_board_lists_columns_and_cards() {
        let rendered =
            console::strip_ansi_codes(&render_board(&board(false, false), 80)).to_string();
        assert!(rendered.contains("To Do (1)"));
        assert!(rendered.contains("In Progress (2)"));
        assert!(rendered.contains("#2 [Goal] G-1 Run more"));
        assert!(rendered.contains("WIP limit reached"));
        assert!(rendered.contains("(no items)"));
        assert!(rendered.contains("Keep going"));
        assert!(!rendered.contains("read-only"));
        assert!(!rendered.contains("Resolving titles"));
    }

    #[test]
    fn test_render_board_banners() {
        let rendered = console::strip_ansi_codes(&render_board(&board(true, true), 80)).to_string();
        assert!(rendered.contains("Team board (read-only)"));
        assert!(rendered.contains("Resolving titles..."));
    }

    #[test]
    fn test_long_titles_wrap_to_width() {
        let long = "a very long title ".repeat(10);
        let mut view = board(false, false);
        view.columns[0].cards[0].title = long;
        let rendered = console::strip_ansi_codes(&render_board(&view, 40)).to_string();
        assert!(
            rendered
                .lines()
                .all(|l| console::measure_text_width(l) <= 40 || l.starts_with('─'))
        );
    }

    #[test]
    fn test_column_header_breaks_before_badge_on_narrow_width() {
        let view = board(false, false);
        let rendered = console::strip_ansi_codes(&render_board(&view, 40)).to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        let header = lines
            .iter()
            .position(|l| l.starts_with("In Progress (2)"))
            .unwrap();
        assert!(!lines[header].contains("WIP limit reached"));
        assert!(lines[header + 1].starts_with("  "));
        assert!(lines[header + 1].contains("WIP limit reached"));
        assert!(lines.iter().all(|l| console::measure_text_width(l) <= 40));

        let wide = console::strip_ansi_codes(&render_board(&view, 80)).to_string();
        assert!(
            wide.lines()
                .any(|l| l.starts_with("In Progress (2)") && l.contains("WIP limit reached"))
        );
    }

    #[test]
    fn test_fit_segments_wraps_on_overflow() {
        let segments = vec!["abcd".to_string(), "efgh".to_string(), "ijkl".to_string()];
        assert_eq!(fit_segments(&segments, 10), vec!["abcd  efgh", "  ijkl"]);
        assert_eq!(fit_segments(&segments, 80), vec!["abcd  efgh  ijkl"]);
    }
}
