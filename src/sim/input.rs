//! Polled input for a single tick
//!
//! Device mapping happens outside the crate. The host fills one snapshot per
//! tick and clears the one-shot fields after processing.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// The four-direction alphabet shared by sequence and stepping games
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

    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    /// Inverse of `index`, wrapping
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
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

/// Digital button state for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    /// Went down this tick
    pub pressed: bool,
    /// Is down
    pub held: bool,
    /// Went up this tick
    pub released: bool,
}

impl ButtonState {
    pub fn press() -> Self {
        Self {
            pressed: true,
            held: true,
            released: false,
        }
    }

    pub fn hold() -> Self {
        Self {
            pressed: false,
            held: true,
            released: false,
        }
    }

    pub fn release() -> Self {
        Self {
            pressed: false,
            held: false,
            released: true,
        }
    }
}

/// A drag-and-drop gesture finished this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropAction {
    /// Index of the dragged item
    pub item: usize,
    /// Bin under the pointer, if any
    pub bin: Option<usize>,
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    /// Movement axis, each component in [-1, 1]
    pub axis: Vec2,
    /// Confirm / jump / fire button
    pub confirm: ButtonState,
    /// Any button went down this tick
    pub any_pressed: bool,
    /// Directional press this tick
    pub direction: Option<Direction>,
    /// Answer button chosen this tick
    pub choice: Option<usize>,
    /// Drag released this tick
    pub drop: Option<DropAction>,
    /// Pause toggle
    pub pause: bool,
}

impl InputSnapshot {
    /// A snapshot with only a directional press
    pub fn direction(direction: Direction) -> Self {
        Self {
            direction: Some(direction),
            any_pressed: true,
            ..Default::default()
        }
    }

    /// Horizontal axis clamped to [-1, 1]
    pub fn axis_x(&self) -> f32 {
        crate::finite_or_zero(self.axis.x).clamp(-1.0, 1.0)
    }

    /// Vertical axis clamped to [-1, 1]
    pub fn axis_y(&self) -> f32 {
        crate::finite_or_zero(self.axis.y).clamp(-1.0, 1.0)
    }

    /// Clear the one-shot fields after a tick consumed them
    pub fn clear_one_shots(&mut self) {
        self.confirm.pressed = false;
        self.confirm.released = false;
        self.any_pressed = false;
        self.direction = None;
        self.choice = None;
        self.drop = None;
        self.pause = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_index_roundtrip() {
        for dir in Direction::ALL {
            assert_eq!(Direction::from_index(dir.index()), dir);
        }
        assert_eq!(Direction::from_index(5), Direction::Down);
    }

    #[test]
    fn test_clear_one_shots_keeps_held() {
        let mut input = InputSnapshot {
            confirm: ButtonState::press(),
            direction: Some(Direction::Left),
            any_pressed: true,
            ..Default::default()
        };
        input.clear_one_shots();
        assert!(input.confirm.held);
        assert!(!input.confirm.pressed);
        assert!(input.direction.is_none());
        assert!(!input.any_pressed);
    }

    #[test]
    fn test_axis_is_clamped() {
        let input = InputSnapshot {
            axis: Vec2::new(3.0, f32::NAN),
            ..Default::default()
        };
        assert_eq!(input.axis_x(), 1.0);
        assert_eq!(input.axis_y(), 0.0);
    }
}
