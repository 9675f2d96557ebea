//! `okr-board limits`: WIP limits per wheel and column.

use anyhow::{Context, Result};
use console::style;
use okr_board::config::BoardConfig;
use okr_common::KanbanColumn;
use okr_board::ui::icons::CHECK;

use super::super::LimitsCommands;
use super::wip_store;

pub fn cmd_limits(config: &BoardConfig, command: Option<LimitsCommands>) -> Result<()> {
    let store = wip_store(config);
    let mut limits = store.load();

    match command {
        None | Some(LimitsCommands::Show) => {
            if limits.is_empty() {
                println!("No WIP limits configured.");
                return Ok(());
            }
            println!("WIP limits ({}):", store.path().display());
            for (wheel, column, limit) in limits.iter() {
                println!(
                    "  {:<10} {:<12} {}",
                    wheel.as_str(),
                    column.as_str(),
                    style(limit).bold()
                );
            }
        }
        Some(LimitsCommands::Set { wheel, column, limit }) => {
            limits.set(wheel, column, limit);
            store.save(&limits).context("Failed to save WIP limits")?;
            println!("{}Limit for {} / {} set to {}", CHECK, wheel, column, limit);
            if column == KanbanColumn::Done {
                println!("  {}", style("Note: moves into Done are never blocked.").dim());
            }
        }
        Some(LimitsCommands::Unset { wheel, column }) => match limits.unset(wheel, column) {
            Some(previous) => {
                store.save(&limits).context("Failed to save WIP limits")?;
                println!("{}Removed limit {} for {} / {}", CHECK, previous, wheel, column);
            }
            None => println!("No limit set for {} / {}", wheel, column),
        },
        Some(LimitsCommands::Clear) => {
            store.clear().context("Failed to clear WIP limits")?;
            println!("{}All WIP limits cleared", CHECK);
        }
    }

    Ok(())
}
