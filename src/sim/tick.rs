//! Discrete simulation tick
//!
//! Both transitions take a snapshot and hand back a new one; the caller decides
//! whether to keep it.

use serde::{Deserialize, Serialize};

use super::state::{Direction, GamePhase, WorldState, in_bounds};

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionCause {
    /// Head left the board
    Wall,
    /// Head hit a cell of the pre-move body
    SelfHit,
    /// Snake covers the whole board, nowhere left to put food
    BoardFull,
}

/// What a single step did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Already terminated, nothing changed
    Idle,
    /// Moved one cell, length unchanged
    Moved,
    /// Moved onto food and grew
    Ate { score: u32 },
    /// Collided and terminated
    Collided { cause: CollisionCause },
}

/// Advance the world by one tick
pub fn advance(state: &WorldState) -> WorldState {
    step(state).0
}

/// Advance the world by one tick and report what happened
pub fn step(state: &WorldState) -> (WorldState, GameEvent) {
    let mut next = state.clone();
    let event = step_in_place(&mut next);
    (next, event)
}

fn step_in_place(state: &mut WorldState) -> GameEvent {
    // Terminal state absorbs every tick
    if state.is_terminated() {
        return GameEvent::Idle;
    }

    let new_head = state.head() + state.direction.delta();

    // Collide against the board as it was at the start of the tick; the tail
    // cell about to be vacated still counts.
    let cause = if !in_bounds(new_head) {
        Some(CollisionCause::Wall)
    } else if state.occupies(new_head) {
        Some(CollisionCause::SelfHit)
    } else {
        None
    };
    if let Some(cause) = cause {
        return terminate(state, cause);
    }

    if new_head != state.food {
        state.snake.insert(0, new_head);
        state.snake.pop();
        state.ticks += 1;
        return GameEvent::Moved;
    }

    // Eating: the next food has to fit beside the grown snake. If the board is
    // full the run ends on the pre-move board, like any other collision.
    let mut grown = Vec::with_capacity(state.snake.len() + 1);
    grown.push(new_head);
    grown.extend_from_slice(&state.snake);
    let Some(food) = state.place_food(&grown) else {
        return terminate(state, CollisionCause::BoardFull);
    };

    state.snake = grown;
    state.food = food;
    state.ticks += 1;
    let score = state.score() + 1;
    state.set_score(score);
    GameEvent::Ate { score }
}

fn terminate(state: &mut WorldState, cause: CollisionCause) -> GameEvent {
    state.phase = GamePhase::Terminated;
    log::info!(
        "Run over ({:?}) at {} with score {} after {} ticks",
        cause,
        state.head(),
        state.score(),
        state.ticks
    );
    GameEvent::Collided { cause }
}

/// Request a new heading
///
/// Reversals are ignored; any other direction replaces the current one. Only
/// the latest accepted direction matters for the next tick.
pub fn apply_direction(state: &WorldState, requested: Direction) -> WorldState {
    let mut next = state.clone();
    if next.is_terminated() {
        return next;
    }
    if requested.is_opposite(next.direction) {
        log::debug!(
            "Ignoring reversal {} -> {}",
            next.direction.as_str(),
            requested.as_str()
        );
        return next;
    }
    next.direction = requested;
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::Cell;

    fn snake_state(cells: &[(i32, i32)], direction: Direction, food: (i32, i32)) -> WorldState {
        WorldState::with_snake(
            1234,
            cells.iter().map(|&(x, y)| Cell::new(x, y)).collect(),
            direction,
            Cell::new(food.0, food.1),
        )
    }

    #[test]
    fn test_move_right_from_start() {
        let state = snake_state(&[(8, 10), (7, 10)], Direction::Right, (20, 20));
        let (next, event) = step(&state);
        assert_eq!(event, GameEvent::Moved);
        assert_eq!(next.snake, vec![Cell::new(9, 10), Cell::new(8, 10)]);
        assert_eq!(next.score(), 0);
        assert!(!next.is_terminated());
    }

    #[test]
    fn test_wall_collision() {
        let state = snake_state(&[(29, 10), (28, 10)], Direction::Right, (0, 0));
        let (next, event) = step(&state);
        assert_eq!(
            event,
            GameEvent::Collided {
                cause: CollisionCause::Wall
            }
        );
        assert!(next.is_terminated());
        assert_eq!(next.snake, state.snake);
        assert_eq!(next.food, state.food);
        assert_eq!(next.direction, state.direction);
    }

    #[test]
    fn test_walls_on_every_side() {
        let cases = [
            ((0, 5), Direction::Left),
            ((5, 0), Direction::Up),
            ((BOARD_SIZE - 1, 5), Direction::Right),
            ((5, BOARD_SIZE - 1), Direction::Down),
        ];
        for (head, dir) in cases {
            let state = snake_state(&[head], dir, (15, 15));
            assert!(advance(&state).is_terminated(), "{:?} {:?}", head, dir);
        }
    }

    #[test]
    fn test_turn_then_advance() {
        let state = snake_state(&[(5, 5), (4, 5), (3, 5)], Direction::Right, (20, 20));
        let state = apply_direction(&state, Direction::Up);
        let next = advance(&state);
        assert_eq!(next.head(), Cell::new(5, 4));
        assert_eq!(next.snake.len(), 3);
    }

    #[test]
    fn test_reversal_ignored() {
        for dir in Direction::ALL {
            let state = snake_state(&[(5, 5), (4, 5)], dir, (20, 20));
            let next = apply_direction(&state, dir.opposite());
            assert_eq!(next, state);
        }
    }

    #[test]
    fn test_eat_grows_and_scores() {
        let state = snake_state(&[(8, 10), (7, 10)], Direction::Right, (9, 10));
        let (next, event) = step(&state);
        assert_eq!(event, GameEvent::Ate { score: 1 });
        assert_eq!(
            next.snake,
            vec![Cell::new(9, 10), Cell::new(8, 10), Cell::new(7, 10)]
        );
        assert_eq!(next.score(), 1);
        assert!(!next.occupies(next.food));
        assert_ne!(next.rng_state.stream, state.rng_state.stream);
    }

    #[test]
    fn test_tail_cell_still_blocks() {
        // Head at (5,5) turning into the cell the tail is about to leave
        let state = snake_state(
            &[(5, 5), (5, 6), (4, 6), (4, 5)],
            Direction::Left,
            (20, 20),
        );
        let (next, event) = step(&state);
        assert_eq!(
            event,
            GameEvent::Collided {
                cause: CollisionCause::SelfHit
            }
        );
        assert_eq!(next.snake, state.snake);
    }

    /// Serpentine path through every board cell: even rows left to right,
    /// odd rows right to left
    fn serpentine() -> Vec<Cell> {
        (0..BOARD_SIZE)
            .flat_map(|y| {
                let row: Vec<Cell> = if y % 2 == 0 {
                    (0..BOARD_SIZE).map(|x| Cell::new(x, y)).collect()
                } else {
                    (0..BOARD_SIZE).rev().map(|x| Cell::new(x, y)).collect()
                };
                row
            })
            .collect()
    }

    #[test]
    fn test_eating_last_free_cell_ends_on_pre_move_board() {
        let path = serpentine();
        let last_free = path[path.len() - 1];
        let snake: Vec<Cell> = path[..path.len() - 1].iter().rev().copied().collect();
        assert_eq!(snake.len(), BOARD_CELLS - 1);
        assert_eq!(snake[0] + Direction::Left.delta(), last_free);

        let state = WorldState::with_snake(3, snake, Direction::Left, last_free).with_score(7);
        let (next, event) = step(&state);

        assert_eq!(
            event,
            GameEvent::Collided {
                cause: CollisionCause::BoardFull
            }
        );
        assert!(next.is_terminated());
        assert_eq!(next.snake(), state.snake());
        assert_eq!(next.score(), 7);
        assert_eq!(next.food(), last_free);
        assert!(!next.occupies(next.food()));
        assert_eq!(next.ticks(), state.ticks());
        assert_eq!(next.rng_state(), state.rng_state());
    }

    #[test]
    fn test_terminated_is_absorbing() {
        let state = snake_state(&[(29, 10), (28, 10)], Direction::Right, (0, 0));
        let dead = advance(&state);
        let (again, event) = step(&dead);
        assert_eq!(event, GameEvent::Idle);
        assert_eq!(again, dead);
        assert_eq!(apply_direction(&dead, Direction::Up), dead);
    }

    #[test]
    fn test_level_up_on_third_food() {
        let state = snake_state(&[(3, 3), (2, 3)], Direction::Right, (4, 3)).with_score(2);
        let next = advance(&state);
        assert_eq!(next.score(), 3);
        assert_eq!(next.level(), 2);
        assert_eq!(next.tick_interval_ms(), 170);
    }

    #[test]
    fn test_determinism() {
        let mut a = WorldState::new(99999);
        let mut b = WorldState::new(99999);
        let turns = [Direction::Down, Direction::Left, Direction::Up, Direction::Right];
        for (i, dir) in turns.iter().cycle().take(40).enumerate() {
            if i % 3 == 0 {
                a = apply_direction(&a, *dir);
                b = apply_direction(&b, *dir);
            }
            a = advance(&a);
            b = advance(&b);
        }
        assert_eq!(a, b);
    }
}
