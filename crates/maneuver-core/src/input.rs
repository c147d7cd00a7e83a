//! Pointer, touch and keyboard events as the interaction controller sees them.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Track a key event that may change a modifier.
    pub fn apply_key(&mut self, event: &KeyEvent) {
        let (key, down) = match event {
            KeyEvent::Pressed(key) => (key, true),
            KeyEvent::Released(key) => (key, false),
        };
        match key {
            Key::Shift => self.shift = down,
            Key::Control => self.ctrl = down,
            Key::Alt => self.alt = down,
            Key::Meta => self.meta = down,
            Key::Delete | Key::Other(_) => {}
        }
    }
}

/// Unified mouse/touch pointer event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// `modifiers` is `None` for touch input, which carries no key state.
    Down {
        position: Point,
        modifiers: Option<Modifiers>,
    },
    Move {
        position: Point,
    },
    /// `position` is `None` when the platform reports no location (touch end).
    Up {
        position: Option<Point>,
    },
}

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// One active touch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Point,
}

impl PointerEvent {
    /// Convert a touch event into a pointer event using only the first touch.
    ///
    /// Start and move events without any touch point are dropped.
    pub fn from_touch(phase: TouchPhase, touches: &[TouchPoint]) -> Option<Self> {
        let first = touches.first().map(|touch| touch.position);
        match phase {
            TouchPhase::Start => first.map(|position| PointerEvent::Down {
                position,
                modifiers: None,
            }),
            TouchPhase::Move => first.map(|position| PointerEvent::Move { position }),
            TouchPhase::End | TouchPhase::Cancel => Some(PointerEvent::Up { position: first }),
        }
    }

    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Down { position, .. } | PointerEvent::Move { position } => Some(*position),
            PointerEvent::Up { position } => *position,
        }
    }
}

/// Keys the plotter reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Delete,
    Shift,
    Control,
    Alt,
    Meta,
    Other(String),
}

impl Key {
    /// Map a DOM/winit style key name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Delete" => Key::Delete,
            "Shift" => Key::Shift,
            "Control" => Key::Control,
            "Alt" => Key::Alt,
            "Meta" | "Super" => Key::Meta,
            other => Key::Other(other.to_string()),
        }
    }
}

/// Keyboard event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(Key),
    Released(Key),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_tracking() {
        let mut modifiers = Modifiers::default();

        modifiers.apply_key(&KeyEvent::Pressed(Key::Shift));
        assert!(modifiers.shift);

        modifiers.apply_key(&KeyEvent::Pressed(Key::Control));
        modifiers.apply_key(&KeyEvent::Released(Key::Shift));
        assert!(!modifiers.shift);
        assert!(modifiers.ctrl);

        modifiers.apply_key(&KeyEvent::Pressed(Key::Delete));
        assert_eq!(modifiers, Modifiers { ctrl: true, ..Default::default() });
    }

    #[test]
    fn test_touch_uses_first_point() {
        let touches = [
            TouchPoint { id: 7, position: Point::new(10.0, 20.0) },
            TouchPoint { id: 8, position: Point::new(99.0, 99.0) },
        ];

        let down = PointerEvent::from_touch(TouchPhase::Start, &touches).unwrap();
        assert_eq!(
            down,
            PointerEvent::Down {
                position: Point::new(10.0, 20.0),
                modifiers: None
            }
        );

        let moved = PointerEvent::from_touch(TouchPhase::Move, &touches[1..]).unwrap();
        assert_eq!(moved.position(), Some(Point::new(99.0, 99.0)));
    }

    #[test]
    fn test_touch_end_without_points() {
        let up = PointerEvent::from_touch(TouchPhase::End, &[]).unwrap();
        assert_eq!(up, PointerEvent::Up { position: None });
        assert!(PointerEvent::from_touch(TouchPhase::Start, &[]).is_none());
        assert!(PointerEvent::from_touch(TouchPhase::Move, &[]).is_none());
    }

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("Delete"), Key::Delete);
        assert_eq!(Key::from_name("Shift"), Key::Shift);
        assert_eq!(Key::from_name("Backspace"), Key::Other("Backspace".into()));
    }
}
