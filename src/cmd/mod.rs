//! CLI command implementations.
//!
//! | Module      | Commands handled          |
//! |-------------|---------------------------|
//! | `show`      | `Show`                    |
//! | `move_item` | `Move`                    |
//! | `delete`    | `Delete`                  |
//! | `notes`     | `Notes`                   |
//! | `limits`    | `Limits`                  |
//! | `config`    | `Config`                  |

pub mod config;
pub mod delete;
pub mod limits;
pub mod move_item;
pub mod notes;
pub mod show;

use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use okr_board::api::HttpOkrApi;
use okr_board::board::{BoardController, BoardFilters, BoardSession, BoardSource};
use okr_board::config::BoardConfig;
use okr_board::storage::{LocalStore, WipLimitStore};
use okr_board::ui::LoadingSpinner;
use okr_board::ui::icons::WARN;

use super::BoardArgs;

pub use config::cmd_config;
pub use delete::cmd_delete;
pub use limits::cmd_limits;
pub use move_item::cmd_move;
pub use notes::cmd_notes;
pub use show::cmd_show;

pub(crate) fn wip_store(config: &BoardConfig) -> WipLimitStore {
    WipLimitStore::new(LocalStore::new(config.data_dir()))
}

pub(crate) fn filters_from(config: &BoardConfig, args: &BoardArgs) -> BoardFilters {
    BoardFilters {
        view_mode: args.view.unwrap_or(config.toml.board.view_mode),
        item_type: args.item_type,
        life_domain_id: args.domain,
        wheel: args.wheel,
        context: args.context.unwrap_or_default(),
        column: None,
    }
}

/// Connect, load and resolve the board selected by `args`.
pub(crate) async fn open_board(config: &BoardConfig, args: &BoardArgs) -> Result<BoardController> {
    let source = match args.team {
        Some(team_id) => BoardSource::Team(team_id),
        None => BoardSource::User(config.user_id().context(
            "No user id configured. Set [board] user_id in board.toml, OKR_BOARD_USER_ID or pass --user",
        )?),
    };

    let api = HttpOkrApi::new(
        config.api_root(),
        config.token().map(str::to_string),
        config.timeout(),
    )
    .context("Failed to create the Goals-OKR client")?;
    let session = BoardSession {
        language: config.language(),
        current_user: config.user_id(),
        wip_limits: wip_store(config).load(),
    };

    let mut controller = BoardController::new(Arc::new(api), session, source);
    controller.set_filters(filters_from(config, args));

    let spinner = LoadingSpinner::start("Loading board...");
    match controller.load().await {
        Ok(()) => spinner.clear(),
        Err(err) => {
            spinner.finish_err("Failed to load board");
            return Err(err).context("Failed to load the progress board");
        }
    }
    Ok(controller)
}

/// Tell the user when a saved change could not be shown.
pub(crate) fn warn_if_stale(controller: &BoardController) {
    if controller.is_stale() {
        eprintln!(
            "{}{}",
            WARN,
            style("Change saved, but the board could not be reloaded. Run `okr-board show` again.")
                .yellow()
        );
    }
}
