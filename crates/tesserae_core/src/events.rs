//! Input events and the geometry they carry

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A point in document coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in document coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether `point` lies inside the rectangle, edges included
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Mouse buttons
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// A pointer press delivered at document level
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    pub button: MouseButton,
}

impl PointerEvent {
    /// Left-button press at `(x, y)`
    pub fn down(x: f32, y: f32) -> Self {
        Self {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }
}

/// Keys the selector components react to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    ArrowUp,
    ArrowDown,
    Enter,
    Escape,
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyCode::ArrowUp => "up",
            KeyCode::ArrowDown => "down",
            KeyCode::Enter => "enter",
            KeyCode::Escape => "escape",
        };
        f.write_str(name)
    }
}

/// Error returned when a key name isn't recognized
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown key '{0}'")]
pub struct ParseKeyError(pub String);

impl FromStr for KeyCode {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" | "arrowup" => Ok(KeyCode::ArrowUp),
            "down" | "arrowdown" => Ok(KeyCode::ArrowDown),
            "enter" | "return" => Ok(KeyCode::Enter),
            "escape" | "esc" => Ok(KeyCode::Escape),
            _ => Err(ParseKeyError(s.to_string())),
        }
    }
}
