//! Deterministic simulation module
//!
//! All gameplay rules live here. This module must be pure and deterministic:
//! - One tick moves the snake exactly one cell
//! - Seeded RNG only
//! - No timers, rendering or platform dependencies

pub mod food;
pub mod state;
pub mod tick;

pub use food::place_food_randomly;
pub use state::{
    Cell, CellKind, Direction, GamePhase, RngState, WorldState, in_bounds, level_and_speed,
};
pub use tick::{CollisionCause, GameEvent, advance, apply_direction, step};
