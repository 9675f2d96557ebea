//! `okr-board move`: the drag-and-drop gesture as one command.

use anyhow::{Context, Result};
use console::style;
use okr_board::board::{DropOutcome, DropTarget, NoOpReason};
use okr_board::config::BoardConfig;
use okr_board::ui::icons::{BLOCKED, MOVED};

use super::{open_board, warn_if_stale};
use crate::{BoardArgs, MoveTarget};

pub async fn cmd_move(
    config: &BoardConfig,
    board: &BoardArgs,
    card_id: i64,
    target: &MoveTarget,
) -> Result<()> {
    let mut controller = open_board(config, board).await?;
    let target = match (target.column, target.onto) {
        (Some(column), _) => DropTarget::Column(column),
        (None, Some(card)) => DropTarget::Card(card),
        (None, None) => DropTarget::Nothing,
    };

    let outcome = controller
        .move_item(card_id, target)
        .await
        .with_context(|| format!("Failed to move card {}", card_id))?;

    warn_if_stale(&controller);
    match outcome {
        DropOutcome::Moved { to, position, .. } => {
            let title = controller.titles().title_or_fallback(
                &controller
                    .items()
                    .iter()
                    .find(|i| i.id == card_id)
                    .map(|i| i.key())
                    .context("Moved card missing after reload")?,
            );
            println!(
                "{}{} -> {} (position {})",
                MOVED,
                style(title).bold(),
                style(to.label()).cyan(),
                position
            );
        }
        DropOutcome::Denied { message, .. } => {
            println!("{}{}", BLOCKED, style(message).red());
        }
        DropOutcome::NoOp(NoOpReason::SameColumn) => {
            println!("Card {} is already in that column.", card_id);
        }
        DropOutcome::NoOp(NoOpReason::UnknownTarget) => {
            println!("Target card is not on the board; nothing moved.");
        }
        DropOutcome::NoOp(NoOpReason::ReleasedOverNothing) => {
            println!("Nothing moved.");
        }
    }
    Ok(())
}
