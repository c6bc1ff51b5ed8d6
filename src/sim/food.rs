//! Food placement

use std::collections::HashSet;

use rand::Rng;

use super::state::Cell;
use crate::consts::*;

/// Pick a free cell for food
///
/// Samples uniformly over the board up to `MAX_FOOD_ATTEMPTS` times. If every
/// sample lands on the snake, scans row-major for the first free cell instead.
/// Returns `None` only when the board is completely occupied.
pub fn place_food_randomly<R: Rng>(occupied: &HashSet<Cell>, rng: &mut R) -> Option<Cell> {
    if occupied.len() >= BOARD_CELLS {
        log::warn!("Board is full, no room for food");
        return None;
    }

    for _ in 0..MAX_FOOD_ATTEMPTS {
        let cell = Cell::new(
            rng.random_range(0..BOARD_SIZE),
            rng.random_range(0..BOARD_SIZE),
        );
        if !occupied.contains(&cell) {
            log::debug!("Food placed at {}", cell);
            return Some(cell);
        }
    }

    log::warn!(
        "Food sampling missed {} times ({} cells occupied), scanning",
        MAX_FOOD_ATTEMPTS,
        occupied.len()
    );
    first_free_cell(occupied)
}

/// First unoccupied cell in row-major order
fn first_free_cell(occupied: &HashSet<Cell>) -> Option<Cell> {
    (0..BOARD_SIZE)
        .flat_map(|y| (0..BOARD_SIZE).map(move |x| Cell::new(x, y)))
        .find(|cell| !occupied.contains(cell))
}
