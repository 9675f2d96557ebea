pub mod board;
pub mod icons;

pub use board::{LoadingSpinner, print_board, render_board, terminal_width};
