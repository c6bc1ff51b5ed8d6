//! Game state and core simulation types
//!
//! Everything the presentation layer needs to draw a frame lives in
//! [`WorldState`]. Level and tick interval are derived from score and are only
//! ever written together with it.

use std::collections::HashSet;

use glam::IVec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::food::place_food_randomly;
use crate::consts::*;

/// A board coordinate. Valid cells satisfy `0 <= x, y < BOARD_SIZE`.
pub type Cell = IVec2;

/// Whether a cell lies on the board
#[inline]
pub fn in_bounds(cell: Cell) -> bool {
    (0..BOARD_SIZE).contains(&cell.x) && (0..BOARD_SIZE).contains(&cell.y)
}

/// Heading of the snake. Screen coordinates: y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }

    /// One-cell offset for this direction
    pub fn delta(self) -> Cell {
        match self {
            Direction::Up => Cell::NEG_Y,
            Direction::Down => Cell::Y,
            Direction::Left => Cell::NEG_X,
            Direction::Right => Cell::X,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
        }
    }
}

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Snake is moving
    Running,
    /// Run ended. Absorbing until an explicit restart.
    Terminated,
}

/// What a board cell shows, for renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Head,
    Body,
    Food,
    Empty,
}

/// RNG state wrapper for serialization
///
/// Every food placement draws from a fresh `Pcg32` on `stream`, then the stream
/// is bumped so the next placement sees new numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::new(self.seed, self.stream)
    }

    pub fn bump(&mut self) {
        self.stream = self.stream.wrapping_add(1);
    }
}

/// Level and tick interval (ms) for a score
///
/// `level = min(1 + score / 3, 15)`, `interval = max(180 - (level - 1) * 10, 50)`.
pub fn level_and_speed(score: u32) -> (u32, u32) {
    let level = (1 + score / POINTS_PER_LEVEL).min(MAX_LEVEL);
    let interval = BASE_TICK_MS
        .saturating_sub((level - 1) * TICK_STEP_MS)
        .max(MIN_TICK_MS);
    (level, interval)
}

/// Complete world snapshot (deterministic, serializable)
///
/// Fields are only written by the tick functions in this module tree, so a
/// terminated snapshot stays terminated until it is replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    /// Run seed for reproducibility
    pub(crate) seed: u64,
    /// RNG state for food placement
    pub(crate) rng_state: RngState,
    /// Snake cells, head first
    pub(crate) snake: Vec<Cell>,
    pub(crate) direction: Direction,
    pub(crate) food: Cell,
    score: u32,
    level: u32,
    tick_interval_ms: u32,
    pub(crate) phase: GamePhase,
    /// Successful moves this run
    pub(crate) ticks: u64,
}

impl WorldState {
    /// Create a fresh run with the given seed
    pub fn new(seed: u64) -> Self {
        let mut state = Self {
            seed,
            rng_state: RngState::new(seed),
            snake: INITIAL_SNAKE.to_vec(),
            direction: INITIAL_DIRECTION,
            food: Cell::ZERO,
            score: 0,
            level: 1,
            tick_interval_ms: BASE_TICK_MS,
            phase: GamePhase::Running,
            ticks: 0,
        };

        // The initial snake is two cells, so the board always has room
        if let Some(food) = state.place_food(&INITIAL_SNAKE) {
            state.food = food;
        }

        log::info!("New run (seed {}), food at {}", seed, state.food);
        state
    }

    /// Build a running state from an explicit snake, mostly for scenarios and tests
    ///
    /// # Panics
    ///
    /// Panics if `snake` is empty; every state needs a head.
    pub fn with_snake(seed: u64, snake: Vec<Cell>, direction: Direction, food: Cell) -> Self {
        assert!(!snake.is_empty(), "snake needs at least a head cell");
        Self {
            seed,
            rng_state: RngState::new(seed),
            snake,
            direction,
            food,
            score: 0,
            level: 1,
            tick_interval_ms: BASE_TICK_MS,
            phase: GamePhase::Running,
            ticks: 0,
        }
    }

    /// Same state with `score` (level and speed follow). A terminated state is
    /// returned unchanged.
    pub fn with_score(mut self, score: u32) -> Self {
        if !self.is_terminated() {
            self.set_score(score);
        }
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn rng_state(&self) -> &RngState {
        &self.rng_state
    }

    /// Snake cells, head first
    pub fn snake(&self) -> &[Cell] {
        &self.snake
    }

    pub fn head(&self) -> Cell {
        self.snake[0]
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn tick_interval_ms(&self) -> u32 {
        self.tick_interval_ms
    }

    pub fn is_terminated(&self) -> bool {
        self.phase == GamePhase::Terminated
    }

    /// Set score and recompute level and speed from it
    pub(crate) fn set_score(&mut self, score: u32) {
        let (level, interval) = level_and_speed(score);
        if level > self.level {
            log::info!("Level {} reached (tick {} ms)", level, interval);
        }
        self.score = score;
        self.level = level;
        self.tick_interval_ms = interval;
    }

    /// Restart is offered once a run scored or ended
    pub fn can_restart(&self) -> bool {
        self.is_terminated() || self.score > 0
    }

    pub fn occupies(&self, cell: Cell) -> bool {
        self.snake.contains(&cell)
    }

    /// Classify a board cell for drawing
    pub fn cell_kind(&self, cell: Cell) -> CellKind {
        if self.snake.first() == Some(&cell) {
            CellKind::Head
        } else if self.occupies(cell) {
            CellKind::Body
        } else if self.food == cell {
            CellKind::Food
        } else {
            CellKind::Empty
        }
    }

    /// Place food off `occupied`, advancing the RNG stream only when a cell was found
    pub(crate) fn place_food(&mut self, occupied: &[Cell]) -> Option<Cell> {
        let occupied: HashSet<Cell> = occupied.iter().copied().collect();
        let mut rng = self.rng_state.to_rng();
        let food = place_food_randomly(&occupied, &mut rng)?;
        self.rng_state.bump();
        Some(food)
    }
}
