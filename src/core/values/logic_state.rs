use serde::{Deserialize, Serialize};
use std::fmt;

/// One lane of a logic value.
///
/// The discriminants are the two-bit lane encoding. They are chosen so that
/// wired resolution is a plain bitwise OR of the encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum LogicState {
    #[default]
    Floating = 0b00,
    Zero = 0b01,
    One = 0b10,
    Error = 0b11,
}

impl LogicState {
    /// Decode the low two bits of `bits`
    pub fn from_bits(bits: u64) -> Self {
        match bits & 0b11 {
            0b00 => LogicState::Floating,
            0b01 => LogicState::Zero,
            0b10 => LogicState::One,
            _ => LogicState::Error,
        }
    }

    pub fn bits(self) -> u64 {
        self as u64
    }

    pub fn from_bool(value: bool) -> Self {
        if value {
            LogicState::One
        } else {
            LogicState::Zero
        }
    }

    /// `Some(bool)` for a driven lane, `None` for Floating or Error
    pub fn as_bool(self) -> Option<bool> {
        match self {
            LogicState::Zero => Some(false),
            LogicState::One => Some(true),
            LogicState::Floating | LogicState::Error => None,
        }
    }

    pub fn resolve(self, other: LogicState) -> LogicState {
        LogicState::from_bits(self.bits() | other.bits())
    }

    pub fn and(self, other: LogicState) -> LogicState {
        match (self.as_bool(), other.as_bool()) {
            (Some(a), Some(b)) => LogicState::from_bool(a && b),
            _ => LogicState::Error,
        }
    }

    pub fn or(self, other: LogicState) -> LogicState {
        if self == LogicState::One || other == LogicState::One {
            return LogicState::One;
        }
        match (self.as_bool(), other.as_bool()) {
            (Some(_), Some(_)) => LogicState::Zero,
            _ => LogicState::Error,
        }
    }

    pub fn xor(self, other: LogicState) -> LogicState {
        match (self.as_bool(), other.as_bool()) {
            (Some(a), Some(b)) => LogicState::from_bool(a != b),
            _ => LogicState::Error,
        }
    }

    /// Inversion keeps Floating and Error as they are
    pub fn invert(self) -> LogicState {
        match self {
            LogicState::Zero => LogicState::One,
            LogicState::One => LogicState::Zero,
            other => other,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            LogicState::Floating => 'F',
            LogicState::Zero => '0',
            LogicState::One => '1',
            LogicState::Error => 'X',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'F' | 'f' | 'Z' | 'z' => Some(LogicState::Floating),
            '0' => Some(LogicState::Zero),
            '1' => Some(LogicState::One),
            'X' | 'x' => Some(LogicState::Error),
            _ => None,
        }
    }
}

impl fmt::Display for LogicState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}
