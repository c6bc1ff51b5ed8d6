//! Grid Snake - deterministic game-state engine for a grid-based snake game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (world state, tick, food placement)
//! - `input`: Direction sources (keyboard, swipe, pointer drag)
//! - `session`: Scheduler that owns the world and drives ticks
//! - `highscore`: High score and its persistence boundary
//! - `settings`: Tunable input preferences

pub mod highscore;
pub mod input;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscore::{HighScore, HighScoreStore, StoreError};
pub use session::Session;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    use crate::sim::{Cell, Direction};

    /// Board is BOARD_SIZE x BOARD_SIZE cells
    pub const BOARD_SIZE: i32 = 30;
    /// Total number of cells on the board
    pub const BOARD_CELLS: usize = (BOARD_SIZE * BOARD_SIZE) as usize;

    /// Starting snake, head first
    pub const INITIAL_SNAKE: [Cell; 2] = [Cell::new(8, 10), Cell::new(7, 10)];
    pub const INITIAL_DIRECTION: Direction = Direction::Right;

    /// Score needed per level step
    pub const POINTS_PER_LEVEL: u32 = 3;
    pub const MAX_LEVEL: u32 = 15;

    /// Tick interval at level 1 (ms)
    pub const BASE_TICK_MS: u32 = 180;
    /// Interval reduction per level (ms)
    pub const TICK_STEP_MS: u32 = 10;
    /// Fastest tick interval (ms)
    pub const MIN_TICK_MS: u32 = 50;

    /// Random food samples before falling back to a board scan
    pub const MAX_FOOD_ATTEMPTS: u32 = 4 * BOARD_CELLS as u32;

    /// Minimum swipe displacement to count as a turn (px)
    pub const SWIPE_THRESHOLD: f32 = 20.0;
    /// Minimum pointer travel on the dominant axis to turn (px)
    pub const POINTER_TURN_THRESHOLD: f32 = 16.0;

    /// Fixed identifier for the durable high score
    pub const HIGH_SCORE_KEY: &str = "snake-highscore";

    /// Maximum ticks run by a single scheduler update
    pub const MAX_TICKS_PER_UPDATE: u32 = 8;
}
