//! Game session: the scheduler that owns the world
//!
//! The presentation layer holds one `Session`, feeds it elapsed time and
//! direction requests, and redraws from the snapshots it publishes. All world
//! mutation goes through this single owner.

use crate::consts::MAX_TICKS_PER_UPDATE;
use crate::highscore::{HighScore, HighScoreStore};
use crate::sim::{Direction, GameEvent, WorldState, apply_direction, step};

/// Callback invoked with every new snapshot
pub type Observer = Box<dyn FnMut(&WorldState)>;

pub struct Session<S: HighScoreStore> {
    state: WorldState,
    high_score: HighScore,
    store: S,
    /// Elapsed time not yet consumed by ticks (ms)
    accumulator_ms: u32,
    observers: Vec<Observer>,
}

impl<S: HighScoreStore> Session<S> {
    /// Start a session, reading the high score once
    pub fn new(seed: u64, store: S) -> Self {
        let high_score = match store.load() {
            Ok(high_score) => high_score,
            Err(err) => {
                log::warn!("Could not load high score: {}", err);
                HighScore::default()
            }
        };
        log::info!("Session starting, high score {}", high_score.get());

        Self {
            state: WorldState::new(seed),
            high_score,
            store,
            accumulator_ms: 0,
            observers: Vec::new(),
        }
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub fn high_score(&self) -> HighScore {
        self.high_score
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register an observer; it sees the current snapshot right away
    pub fn subscribe(&mut self, mut observer: impl FnMut(&WorldState) + 'static) {
        observer(&self.state);
        self.observers.push(Box::new(observer));
    }

    fn publish(&mut self) {
        for observer in &mut self.observers {
            observer(&self.state);
        }
    }

    /// Time until the next tick is due (ms)
    pub fn next_tick_in(&self) -> u32 {
        self.state
            .tick_interval_ms()
            .saturating_sub(self.accumulator_ms)
    }

    /// Request a heading. Returns true if the direction changed.
    pub fn steer(&mut self, requested: Direction) -> bool {
        let next = apply_direction(&self.state, requested);
        let changed = next.direction() != self.state.direction();
        if changed {
            self.state = next;
            self.publish();
        }
        changed
    }

    /// Run exactly one tick now
    pub fn tick(&mut self) -> GameEvent {
        let (next, event) = step(&self.state);
        self.state = next;

        if let GameEvent::Collided { .. } = event {
            self.finish_run();
        }
        if event != GameEvent::Idle {
            self.publish();
        }
        event
    }

    /// Persist the high score if the finished run beat it
    fn finish_run(&mut self) {
        let score = self.state.score();
        if !self.high_score.record(score) {
            return;
        }
        log::info!("New high score: {}", score);
        if let Err(err) = self.store.save(self.high_score) {
            log::warn!("Could not save high score: {}", err);
        }
    }

    /// Feed elapsed wall time and run every tick that came due
    ///
    /// The interval is re-read after each tick since it shrinks as the level
    /// rises. At most `MAX_TICKS_PER_UPDATE` ticks run per call; any backlog
    /// beyond that is dropped. Returns the number of ticks run.
    pub fn update(&mut self, elapsed_ms: u32) -> u32 {
        if self.state.is_terminated() {
            self.accumulator_ms = 0;
            return 0;
        }

        self.accumulator_ms = self.accumulator_ms.saturating_add(elapsed_ms);

        let mut ticks = 0;
        while ticks < MAX_TICKS_PER_UPDATE
            && self.accumulator_ms >= self.state.tick_interval_ms()
        {
            self.accumulator_ms -= self.state.tick_interval_ms();
            ticks += 1;
            self.tick();
            if self.state.is_terminated() {
                self.accumulator_ms = 0;
                break;
            }
        }

        if ticks == MAX_TICKS_PER_UPDATE {
            self.accumulator_ms = self.accumulator_ms.min(self.state.tick_interval_ms() - 1);
        }
        ticks
    }

    /// Discard the run and start a fresh one
    ///
    /// Ignored while the current run is still going with no score.
    pub fn restart(&mut self, seed: u64) -> bool {
        if !self.state.can_restart() {
            log::debug!("Restart ignored, run has not scored yet");
            return false;
        }
        self.state = WorldState::new(seed);
        self.accumulator_ms = 0;
        self.publish();
        true
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::highscore::MemoryStore;
    use crate::sim::Cell;

    fn session_with(state: WorldState, best: u32) -> Session<MemoryStore> {
        let store = MemoryStore {
            value: HighScore(best),
            writes: 0,
        };
        let mut session = Session::new(0, store);
        session.state = state;
        session
    }

    #[test]
    fn test_update_waits_for_interval() {
        let mut session = Session::new(5, MemoryStore::default());
        assert_eq!(session.update(100), 0);
        assert_eq!(session.next_tick_in(), 80);
        assert_eq!(session.update(80), 1);
        assert_eq!(session.state().ticks(), 1);
    }

    #[test]
    fn test_update_caps_ticks() {
        let state = WorldState::with_snake(
            0,
            vec![Cell::new(0, 0)],
            Direction::Down,
            Cell::new(29, 29),
        );
        let mut session = session_with(state, 0);
        assert_eq!(session.update(180 * 20), MAX_TICKS_PER_UPDATE);
        assert!(session.next_tick_in() > 0);
    }

    #[test]
    fn test_steer_rejects_reversal() {
        let mut session = Session::new(5, MemoryStore::default());
        assert!(!session.steer(Direction::Left));
        assert!(session.steer(Direction::Up));
        assert_eq!(session.state().direction(), Direction::Up);
    }

    #[test]
    fn test_high_score_saved_on_better_run() {
        let state = WorldState::with_snake(
            0,
            vec![Cell::new(29, 3), Cell::new(28, 3)],
            Direction::Right,
            Cell::new(0, 0),
        )
        .with_score(4);
        let mut session = session_with(state, 3);

        let event = session.tick();
        assert!(matches!(event, GameEvent::Collided { .. }));
        assert_eq!(session.high_score(), HighScore(4));
        assert_eq!(session.store().value, HighScore(4));
        assert_eq!(session.store().writes, 1);
    }

    #[test]
    fn test_high_score_kept_on_worse_run() {
        let state = WorldState::with_snake(
            0,
            vec![Cell::new(29, 3), Cell::new(28, 3)],
            Direction::Right,
            Cell::new(0, 0),
        );
        let mut session = session_with(state, 3);
        session.tick();
        assert!(session.state().is_terminated());
        assert_eq!(session.high_score(), HighScore(3));
        assert_eq!(session.store().writes, 0);
    }

    #[test]
    fn test_restart_rules() {
        let mut session = Session::new(1, MemoryStore::default());
        assert!(!session.restart(2));

        session.steer(Direction::Up);
        while !session.state().is_terminated() {
            session.tick();
        }
        assert!(session.restart(2));
        assert!(!session.state().is_terminated());
        assert_eq!(session.state().score(), 0);
        assert_eq!(session.state().snake().len(), 2);
    }

    #[test]
    fn test_observers_see_snapshots() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut session = Session::new(9, MemoryStore::default());
        let sink = Rc::clone(&seen);
        session.subscribe(move |state| sink.borrow_mut().push(state.head()));

        session.tick();
        session.steer(Direction::Down);
        session.tick();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[1], Cell::new(9, 10));
        assert_eq!(seen[3], Cell::new(9, 11));
    }

    #[test]
    fn test_terminated_update_is_noop() {
        let state = WorldState::with_snake(
            0,
            vec![Cell::new(29, 3)],
            Direction::Right,
            Cell::new(0, 0),
        );
        let mut session = session_with(state, 0);
        session.tick();
        let before = session.state().clone();
        assert_eq!(session.update(10_000), 0);
        assert_eq!(session.state(), &before);
    }
}
