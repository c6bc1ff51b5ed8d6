//! Grid Snake entry point
//!
//! Native: plays one headless run with a greedy autopilot and keeps the high
//! score in a JSON file. Web: wires DOM input into a session and draws the board
//! as text.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use grid_snake::consts::BOARD_SIZE;
use grid_snake::sim::{Cell, CellKind, WorldState};

/// Text picture of the board, one line per row
fn board_text(state: &WorldState) -> String {
    let mut out = String::with_capacity((BOARD_SIZE as usize + 1) * BOARD_SIZE as usize);
    for y in 0..BOARD_SIZE {
        for x in 0..BOARD_SIZE {
            out.push(match state.cell_kind(Cell::new(x, y)) {
                CellKind::Head if state.is_terminated() => 'X',
                CellKind::Head => '@',
                CellKind::Body => 'o',
                CellKind::Food => '*',
                CellKind::Empty => '.',
            });
        }
        out.push('\n');
    }
    out
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use grid_snake::highscore::FileStore;
    use grid_snake::input::DirectionSource;
    use grid_snake::sim::{Direction, WorldState, in_bounds};
    use grid_snake::Session;

    /// Give up on runs the autopilot keeps circling in
    const MAX_TICKS: u64 = 100_000;

    /// Steers toward the food, avoiding cells that would end the run
    #[derive(Debug, Default)]
    pub struct Autopilot;

    impl<'a> DirectionSource<&'a WorldState> for Autopilot {
        fn interpret(&mut self, state: &'a WorldState, current: Direction) -> Option<Direction> {
            Direction::ALL
                .into_iter()
                .filter(|dir| !dir.is_opposite(current))
                .filter(|dir| {
                    let next = state.head() + dir.delta();
                    in_bounds(next) && !state.occupies(next)
                })
                .min_by_key(|dir| {
                    let next = state.head() + dir.delta();
                    let dist = (state.food() - next).abs();
                    dist.x + dist.y
                })
        }
    }

    fn time_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }

    pub fn run() {
        let mut args = std::env::args().skip(1);
        let seed = args
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(time_seed);
        let store_path = args
            .next()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("snake-highscore.json"));

        let mut session = Session::new(seed, FileStore::new(store_path));
        session.subscribe(|state| {
            log::trace!(
                "tick {} head {} score {} level {}",
                state.ticks(),
                state.head(),
                state.score(),
                state.level()
            );
        });

        let mut pilot = Autopilot;
        let mut clock_ms: u64 = 0;
        while !session.state().is_terminated() && session.state().ticks() < MAX_TICKS {
            let current = session.state().direction();
            if let Some(dir) = pilot.interpret(session.state(), current) {
                session.steer(dir);
            }
            let wait = session.next_tick_in();
            clock_ms += u64::from(wait);
            session.update(wait);
        }

        let state = session.state();
        print!("{}", super::board_text(state));
        println!(
            "Run ended after {} ticks ({:.1}s simulated): score {}, level {}, high score {}",
            state.ticks(),
            clock_ms as f64 / 1000.0,
            state.score(),
            state.level(),
            session.high_score().get()
        );
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{KeyboardEvent, MouseEvent, TouchEvent};

    use grid_snake::highscore::LocalStorageStore;
    use grid_snake::input::{InputAdapters, PointerEvent, SwipeEvent};
    use grid_snake::sim::{Direction, WorldState};
    use grid_snake::{Session, Settings};

    /// Game instance holding the session and input adapters
    struct Game {
        session: Session<LocalStorageStore>,
        input: InputAdapters,
        last_time: f64,
    }

    impl Game {
        fn steer(&mut self, requested: Option<Direction>) {
            if let Some(dir) = requested {
                self.session.steer(dir);
            }
        }

        fn direction(&self) -> Direction {
            self.session.state().direction()
        }

        fn restart(&mut self) {
            let seed = random_seed();
            if self.session.restart(seed) {
                self.input = InputAdapters::from_settings(&Settings::load());
                log::info!("Game restarted with seed: {}", seed);
            }
        }
    }

    fn random_seed() -> u64 {
        let mut buf = [0u8; 8];
        match getrandom::fill(&mut buf) {
            Ok(()) => u64::from_le_bytes(buf),
            Err(_) => js_sys::Date::now() as u64,
        }
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            el.set_text_content(Some(text));
        }
    }

    fn draw(state: &WorldState) {
        set_text("board", &super::board_text(state));
        set_text("score", &state.score().to_string());
        set_text("level", &state.level().to_string());
        set_text("status", if state.is_terminated() { "Game Over!" } else { "" });
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Grid Snake starting...");

        let seed = random_seed();
        let settings = Settings::load();
        let mut session = Session::new(seed, LocalStorageStore);
        session.subscribe(draw);
        set_text("high-score", &session.high_score().get().to_string());

        let game = Rc::new(RefCell::new(Game {
            session,
            input: InputAdapters::from_settings(&settings),
            last_time: 0.0,
        }));

        setup_input_handlers(game.clone());
        setup_restart_button(game.clone());
        request_animation_frame(game);

        log::info!("Grid Snake running (seed {})", seed);
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                if g.input.keys.captures(&key) {
                    event.prevent_default();
                }
                if key == "Enter" {
                    g.restart();
                    return;
                }
                let current = g.direction();
                let requested = g.input.on_key(&key, current);
                g.steer(requested);
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch swipe
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    let pos = Vec2::new(touch.client_x() as f32, touch.client_y() as f32);
                    let mut g = game.borrow_mut();
                    let current = g.direction();
                    g.input.on_swipe(SwipeEvent::Start(pos), current);
                }
            });
            let _ = window
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.changed_touches().get(0) {
                    let pos = Vec2::new(touch.client_x() as f32, touch.client_y() as f32);
                    let mut g = game.borrow_mut();
                    let current = g.direction();
                    let requested = g.input.on_swipe(SwipeEvent::End(pos), current);
                    g.steer(requested);
                }
            });
            let _ = window
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer steering over the board
        let Some(board) = window
            .document()
            .and_then(|d| d.get_element_by_id("board"))
        else {
            log::warn!("No #board element, pointer steering disabled");
            return;
        };
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                let mut g = game.borrow_mut();
                let current = g.direction();
                let requested = g.input.on_pointer(PointerEvent::Move(pos), current);
                g.steer(requested);
            });
            let _ = board
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                let current = g.direction();
                g.input.on_pointer(PointerEvent::Leave, current);
            });
            let _ = board
                .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(btn) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("restart-btn"))
        else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            game.borrow_mut().restart();
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Clamp long stalls (background tab) to one second
            let dt_ms = if g.last_time > 0.0 {
                (time - g.last_time).clamp(0.0, 1000.0) as u32
            } else {
                0
            };
            g.last_time = time;

            let was_over = g.session.state().is_terminated();
            g.session.update(dt_ms);
            if !was_over && g.session.state().is_terminated() {
                set_text("high-score", &g.session.high_score().get().to_string());
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Grid Snake (native) starting...");
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
