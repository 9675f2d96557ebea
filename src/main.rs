use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use okr_common::{ItemType, KanbanColumn, Language, WheelType};
use std::path::PathBuf;

use okr_board::board::filters::{GoalsOkrContext, ViewMode};
use okr_board::config::BoardConfig;
use okr_board::logging::{self, LogOptions};

mod cmd;

#[derive(Parser)]
#[command(name = "okr-board")]
#[command(version, about = "Goals-OKR progress board in the terminal")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding board.toml (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Also write a daily log file under the data directory
    #[arg(long, global = true)]
    pub log_file: bool,

    /// Override the configured user id
    #[arg(long, global = true)]
    pub user: Option<i64>,

    /// Display language: en or nl
    #[arg(long, global = true)]
    pub lang: Option<Language>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the board
    Show(ShowArgs),
    /// Move a card to another column (appended at the end)
    Move {
        card_id: i64,
        #[command(flatten)]
        target: MoveTarget,
        #[command(flatten)]
        board: BoardArgs,
    },
    /// Delete a card after confirmation
    Delete {
        card_id: i64,
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
        #[command(flatten)]
        board: BoardArgs,
    },
    /// Set or clear a card's notes
    Notes {
        card_id: i64,
        /// New notes text
        text: Option<String>,
        /// Remove the notes
        #[arg(long, conflicts_with = "text")]
        clear: bool,
        #[command(flatten)]
        board: BoardArgs,
    },
    /// View or change WIP limits
    Limits {
        #[command(subcommand)]
        command: Option<LimitsCommands>,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

/// Filters shared by commands that look cards up on the board.
#[derive(Args, Clone, Debug, Default)]
pub struct BoardArgs {
    /// Show a team board (read-only)
    #[arg(long)]
    pub team: Option<i64>,

    /// all, okrs or initiatives
    #[arg(long)]
    pub view: Option<ViewMode>,

    /// GOAL, OBJECTIVE, KEY_RESULT or INITIATIVE
    #[arg(long = "type")]
    pub item_type: Option<ItemType>,

    /// Life domain id
    #[arg(long)]
    pub domain: Option<i64>,

    /// life or business
    #[arg(long)]
    pub wheel: Option<WheelType>,

    /// ALL, NONE, LIFE, BUSINESS or WORK
    #[arg(long)]
    pub context: Option<GoalsOkrContext>,
}

#[derive(Args, Clone, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub board: BoardArgs,

    /// Only render this column
    #[arg(long)]
    pub column: Option<KanbanColumn>,
}

#[derive(Args, Clone, Debug)]
#[group(required = true, multiple = false)]
pub struct MoveTarget {
    /// Target column
    #[arg(long)]
    pub column: Option<KanbanColumn>,

    /// Drop onto this card's column
    #[arg(long)]
    pub onto: Option<i64>,
}

#[derive(Subcommand, Clone)]
pub enum LimitsCommands {
    /// Show configured limits
    Show,
    /// Set a limit for one wheel and column
    Set {
        wheel: WheelType,
        column: KanbanColumn,
        limit: u32,
    },
    /// Remove one limit
    Unset { wheel: WheelType, column: KanbanColumn },
    /// Remove every limit
    Clear,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default board.toml file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = BoardConfig::load(cli.config_dir.clone())?;
    config.cli_language = cli.lang;
    config.cli_user_id = cli.user;

    let log_dir = config.log_dir();
    let _guard = logging::init(LogOptions {
        verbose: cli.verbose,
        json: cli.json_logs,
        log_dir: cli.log_file.then_some(log_dir.as_path()),
    });

    match &cli.command {
        Commands::Show(args) => cmd::cmd_show(&config, args).await?,
        Commands::Move {
            card_id,
            target,
            board,
        } => cmd::cmd_move(&config, board, *card_id, target).await?,
        Commands::Delete {
            card_id,
            yes,
            board,
        } => cmd::cmd_delete(&config, board, *card_id, *yes).await?,
        Commands::Notes {
            card_id,
            text,
            clear,
            board,
        } => cmd::cmd_notes(&config, board, *card_id, text.as_deref(), *clear).await?,
        Commands::Limits { command } => cmd::cmd_limits(&config, command.clone())?,
        Commands::Config { command } => cmd::cmd_config(&config, command.clone())?,
    }

    Ok(())
}
