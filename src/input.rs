//! Direction sources
//!
//! Raw input from keyboards, touch swipes and pointer movement is turned into a
//! requested [`Direction`] here. Sources never touch the world; whatever they
//! return still goes through [`crate::sim::apply_direction`].

use glam::Vec2;

use crate::consts::{POINTER_TURN_THRESHOLD, SWIPE_THRESHOLD};
use crate::settings::Settings;
use crate::sim::Direction;

/// Anything that can turn an input event into a direction request
pub trait DirectionSource<E> {
    /// Interpret `event` given the snake's current heading. Returns `None` when
    /// the event does not ask for a turn.
    fn interpret(&mut self, event: E, current: Direction) -> Option<Direction>;
}

/// Pick a direction from a displacement using its dominant axis
///
/// Screen coordinates: positive y points down. Ties go to the vertical axis.
fn dominant_direction(delta: Vec2, threshold: f32) -> Option<Direction> {
    if delta.x.abs() > delta.y.abs() {
        if delta.x > threshold {
            Some(Direction::Right)
        } else if delta.x < -threshold {
            Some(Direction::Left)
        } else {
            None
        }
    } else if delta.y > threshold {
        Some(Direction::Down)
    } else if delta.y < -threshold {
        Some(Direction::Up)
    } else {
        None
    }
}

/// Drop a candidate that would reverse the snake
fn unless_reversal(candidate: Option<Direction>, current: Direction) -> Option<Direction> {
    candidate.filter(|dir| !dir.is_opposite(current))
}

/// Arrow keys, plus WASD when enabled
#[derive(Debug, Clone)]
pub struct KeyInput {
    pub wasd: bool,
}

impl Default for KeyInput {
    fn default() -> Self {
        Self { wasd: true }
    }
}

impl KeyInput {
    pub fn new(wasd: bool) -> Self {
        Self { wasd }
    }

    /// Map a key name (DOM `KeyboardEvent.key` style) to a direction
    pub fn direction_for(&self, key: &str) -> Option<Direction> {
        match key {
            "ArrowUp" => Some(Direction::Up),
            "ArrowDown" => Some(Direction::Down),
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            _ if self.wasd => match key {
                "w" | "W" => Some(Direction::Up),
                "s" | "S" => Some(Direction::Down),
                "a" | "A" => Some(Direction::Left),
                "d" | "D" => Some(Direction::Right),
                _ => None,
            },
            _ => None,
        }
    }

    /// Whether the host should suppress the key's default action (page scroll)
    pub fn captures(&self, key: &str) -> bool {
        self.direction_for(key).is_some()
    }
}

impl<'a> DirectionSource<&'a str> for KeyInput {
    fn interpret(&mut self, key: &'a str, current: Direction) -> Option<Direction> {
        unless_reversal(self.direction_for(key), current)
    }
}

/// Touch swipe events
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwipeEvent {
    Start(Vec2),
    End(Vec2),
}

/// Swipe gestures: net displacement between touch start and end
#[derive(Debug, Clone)]
pub struct SwipeInput {
    pub threshold: f32,
    start: Option<Vec2>,
}

impl Default for SwipeInput {
    fn default() -> Self {
        Self::new(SWIPE_THRESHOLD)
    }
}

impl SwipeInput {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            start: None,
        }
    }
}

impl DirectionSource<SwipeEvent> for SwipeInput {
    fn interpret(&mut self, event: SwipeEvent, current: Direction) -> Option<Direction> {
        match event {
            SwipeEvent::Start(pos) => {
                self.start = Some(pos);
                None
            }
            SwipeEvent::End(pos) => {
                // A touch that ends without a recorded start counts from the origin
                let start = self.start.take().unwrap_or(Vec2::ZERO);
                unless_reversal(dominant_direction(pos - start, self.threshold), current)
            }
        }
    }
}

/// Pointer events over the board
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Move(Vec2),
    Leave,
}

/// Steering by moving the pointer, no button needed
///
/// Keeps a reference position; once the pointer travels past the threshold on
/// its dominant axis the snake turns that way and the reference moves to the
/// pointer. The same direction is not emitted twice in a row from one stroke.
#[derive(Debug, Clone)]
pub struct PointerInput {
    pub threshold: f32,
    anchor: Option<Vec2>,
    last_dir: Option<Direction>,
}

impl Default for PointerInput {
    fn default() -> Self {
        Self::new(POINTER_TURN_THRESHOLD)
    }
}

impl PointerInput {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            anchor: None,
            last_dir: None,
        }
    }

    fn reset(&mut self) {
        self.anchor = None;
        self.last_dir = None;
    }
}

impl DirectionSource<PointerEvent> for PointerInput {
    fn interpret(&mut self, event: PointerEvent, current: Direction) -> Option<Direction> {
        let pos = match event {
            PointerEvent::Leave => {
                self.reset();
                return None;
            }
            PointerEvent::Move(pos) => pos,
        };

        let Some(anchor) = self.anchor else {
            self.anchor = Some(pos);
            self.last_dir = None;
            return None;
        };

        let delta = pos - anchor;
        let past_threshold = delta.x.abs() > self.threshold || delta.y.abs() > self.threshold;
        let candidate = unless_reversal(dominant_direction(delta, self.threshold), current);

        match candidate {
            Some(dir) if dir != current && Some(dir) != self.last_dir => {
                self.last_dir = Some(dir);
                self.anchor = Some(pos);
                Some(dir)
            }
            _ => {
                if past_threshold {
                    // Passed the threshold without turning: start a new stroke here
                    self.anchor = Some(pos);
                    self.last_dir = None;
                }
                None
            }
        }
    }
}

/// All three sources configured from settings
#[derive(Debug, Clone)]
pub struct InputAdapters {
    pub keys: KeyInput,
    pub swipe: SwipeInput,
    pub pointer: PointerInput,
    pub pointer_steering: bool,
}

impl Default for InputAdapters {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl InputAdapters {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            keys: KeyInput::new(settings.wasd_keys),
            swipe: SwipeInput::new(settings.swipe_threshold),
            pointer: PointerInput::new(settings.pointer_threshold),
            pointer_steering: settings.pointer_steering,
        }
    }

    pub fn on_key(&mut self, key: &str, current: Direction) -> Option<Direction> {
        self.keys.interpret(key, current)
    }

    pub fn on_swipe(&mut self, event: SwipeEvent, current: Direction) -> Option<Direction> {
        self.swipe.interpret(event, current)
    }

    pub fn on_pointer(&mut self, event: PointerEvent, current: Direction) -> Option<Direction> {
        if !self.pointer_steering {
            return None;
        }
        self.pointer.interpret(event, current)
    }
}
