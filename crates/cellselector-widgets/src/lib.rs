//! Expandable cell selector widget built on cellselector-core.

pub mod cell_selector;
pub mod config;
pub mod error;
pub mod frame;

pub use cell_selector::{draw_grid, CellSelector, DrawnCell, ToggleTrigger};
pub use config::CellSelectorConfig;
pub use error::ConfigError;
pub use frame::FrameScheduler;
