//! `okr-board show`

use anyhow::Result;
use okr_board::config::BoardConfig;
use okr_board::ui::print_board;

use super::open_board;
use crate::ShowArgs;

pub async fn cmd_show(config: &BoardConfig, args: &ShowArgs) -> Result<()> {
    let mut controller = open_board(config, &args.board).await?;
    let mut filters = controller.filters().clone();
    filters.column = args.column;
    controller.set_filters(filters);

    print_board(&controller.view());
    Ok(())
}
