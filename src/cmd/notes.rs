//! `okr-board notes`

use anyhow::{Context, Result, bail};
use okr_board::config::BoardConfig;
use okr_board::ui::icons::NOTE;

use super::{open_board, warn_if_stale};
use crate::BoardArgs;

pub async fn cmd_notes(
    config: &BoardConfig,
    board: &BoardArgs,
    card_id: i64,
    text: Option<&str>,
    clear: bool,
) -> Result<()> {
    let notes = match (text, clear) {
        (_, true) => None,
        (Some(text), false) => Some(text.to_string()),
        (None, false) => bail!("Provide the notes text or pass --clear"),
    };

    let mut controller = open_board(config, board).await?;
    let updated = controller
        .update_notes(card_id, notes)
        .await
        .with_context(|| format!("Failed to update notes of card {}", card_id))?;

    warn_if_stale(&controller);
    match updated.notes {
        Some(notes) => println!("{}Notes saved: {}", NOTE, notes),
        None => println!("{}Notes cleared", NOTE),
    }
    Ok(())
}
