//! `okr-board delete`

use anyhow::{Context, Result};
use console::style;
use dialoguer::Confirm;
use okr_board::config::BoardConfig;
use okr_board::ui::icons::TRASH;

use super::{open_board, warn_if_stale};
use crate::BoardArgs;

pub async fn cmd_delete(
    config: &BoardConfig,
    board: &BoardArgs,
    card_id: i64,
    yes: bool,
) -> Result<()> {
    let mut controller = open_board(config, board).await?;
    let confirmation = controller.request_delete(card_id)?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(confirmation.prompt.as_str())
            .default(false)
            .interact()
            .unwrap_or(false);
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let title = confirmation.title.clone();
    controller
        .confirm_delete(confirmation)
        .await
        .with_context(|| format!("Failed to delete card {}", card_id))?;
    println!("{}Removed {}", TRASH, style(title).bold());
    warn_if_stale(&controller);
    Ok(())
}
