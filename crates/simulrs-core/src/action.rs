use std::fmt;

/// Value of a key-change record.
///
/// From `evtest` output, the "magic numbers" for assignment to enums:
///   0 == 'released'
///   1 == 'pressed'
///   2 == 'repeated'
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Action {
    Release = 0,
    Press = 1,
    Repeat = 2,
}

impl Action {
    /// Returns true only if this is a PRESS event (not REPEAT)
    pub fn is_press(self) -> bool {
        matches!(self, Action::Press)
    }

    /// Returns true if this is a RELEASE event
    pub fn is_release(self) -> bool {
        matches!(self, Action::Release)
    }

    /// Returns true if this is a REPEAT event
    pub fn is_repeat(self) -> bool {
        matches!(self, Action::Repeat)
    }

    /// Create Action from the record value.
    ///
    /// Any other value is not a key transition and yields `None`.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Action::Release),
            1 => Some(Action::Press),
            2 => Some(Action::Repeat),
            _ => None,
        }
    }

    pub fn to_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Release => write!(f, "release"),
            Action::Press => write!(f, "press"),
            Action::Repeat => write!(f, "repeat"),
        }
    }
}
