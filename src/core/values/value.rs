use super::logic_state::LogicState;
use crate::core::errors::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bit-packed logic word of 1 to 32 lanes, two bits per lane.
///
/// Lane `i` lives in bits `2i..2i+2`. Bits above `2 * width` are always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawValue")]
pub struct Value {
    bits: u64,
    width: u8,
}

/// Unchecked wire form of [`Value`]
#[derive(Deserialize)]
struct RawValue {
    bits: u64,
    width: u8,
}

impl TryFrom<RawValue> for Value {
    type Error = SimError;

    fn try_from(raw: RawValue) -> SimResult<Self> {
        let value = Value::from_bits(raw.bits, raw.width)?;
        if value.bits != raw.bits {
            return Err(SimError::InvalidValue(format!("{:#x} has bits above width {}", raw.bits, raw.width)));
        }
        Ok(value)
    }
}

impl Value {
    pub const MAX_WIDTH: u8 = 32;

    pub const FLOATING: Value = Value { bits: 0b00, width: 1 };
    pub const ZERO: Value = Value { bits: 0b01, width: 1 };
    pub const ONE: Value = Value { bits: 0b10, width: 1 };
    pub const ERROR: Value = Value { bits: 0b11, width: 1 };

    /// An all-Floating value of the given width
    pub fn floating(width: u8) -> SimResult<Self> {
        Self::filled(LogicState::Floating, width)
    }

    /// Repeat `state` across every lane
    pub fn filled(state: LogicState, width: u8) -> SimResult<Self> {
        check_width(width)?;
        let mut bits = 0u64;
        for lane in 0..width {
            bits |= state.bits() << (2 * lane as u32);
        }
        Ok(Self { bits, width })
    }

    /// Build from a raw encoding; bits beyond the width are dropped
    pub fn from_bits(bits: u64, width: u8) -> SimResult<Self> {
        check_width(width)?;
        Ok(Self { bits: bits & lane_mask(width), width })
    }

    /// Build from lane states, lane 0 first
    pub fn from_states(states: &[LogicState]) -> SimResult<Self> {
        let width = u8::try_from(states.len()).map_err(|_| SimError::InvalidWidth(u8::MAX))?;
        check_width(width)?;
        let bits = states
            .iter()
            .enumerate()
            .fold(0u64, |acc, (lane, s)| acc | (s.bits() << (2 * lane as u32)));
        Ok(Self { bits, width })
    }

    pub fn from_bool(value: bool) -> Self {
        Value::from(LogicState::from_bool(value))
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn get(&self, index: u8) -> SimResult<LogicState> {
        self.check_index(index)?;
        Ok(LogicState::from_bits(self.bits >> (2 * index as u32)))
    }

    pub fn set(&mut self, index: u8, state: LogicState) -> SimResult<()> {
        self.check_index(index)?;
        let shift = 2 * index as u32;
        self.bits = (self.bits & !(0b11 << shift)) | (state.bits() << shift);
        Ok(())
    }

    /// Lane states, lane 0 first
    pub fn lanes(&self) -> impl Iterator<Item = LogicState> + '_ {
        (0..self.width).map(move |lane| LogicState::from_bits(self.bits >> (2 * lane as u32)))
    }

    pub fn is_floating(&self) -> bool {
        self.bits == 0
    }

    pub fn has_error(&self) -> bool {
        self.lanes().any(|s| s == LogicState::Error)
    }

    /// Wired resolution: lane-wise OR of the encodings
    pub fn resolve(&self, other: &Value) -> SimResult<Value> {
        self.check_width_matches(other)?;
        Ok(Value { bits: self.bits | other.bits, width: self.width })
    }

    pub fn and(&self, other: &Value) -> SimResult<Value> {
        self.zip_lanes(other, LogicState::and)
    }

    pub fn or(&self, other: &Value) -> SimResult<Value> {
        self.zip_lanes(other, LogicState::or)
    }

    pub fn xor(&self, other: &Value) -> SimResult<Value> {
        self.zip_lanes(other, LogicState::xor)
    }

    fn zip_lanes(&self, other: &Value, op: fn(LogicState, LogicState) -> LogicState) -> SimResult<Value> {
        self.check_width_matches(other)?;
        let mut out = *self;
        for (lane, (a, b)) in self.lanes().zip(other.lanes()).enumerate() {
            out.set(lane as u8, op(a, b))?;
        }
        Ok(out)
    }

    fn check_width_matches(&self, other: &Value) -> SimResult<()> {
        if self.width != other.width {
            return Err(SimError::WidthMismatch { left: self.width, right: other.width });
        }
        Ok(())
    }

    fn check_index(&self, index: u8) -> SimResult<()> {
        if index >= self.width {
            return Err(SimError::IndexOutOfRange { index, width: self.width });
        }
        Ok(())
    }
}

fn check_width(width: u8) -> SimResult<()> {
    if width == 0 || width > Value::MAX_WIDTH {
        return Err(SimError::InvalidWidth(width));
    }
    Ok(())
}

fn lane_mask(width: u8) -> u64 {
    if width >= Value::MAX_WIDTH {
        u64::MAX
    } else {
        (1u64 << (2 * width as u32)) - 1
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::FLOATING
    }
}

impl From<LogicState> for Value {
    fn from(state: LogicState) -> Self {
        Value { bits: state.bits(), width: 1 }
    }
}

impl std::ops::Not for Value {
    type Output = Value;

    fn not(self) -> Value {
        let mut out = self;
        for lane in 0..self.width {
            let shift = 2 * lane as u32;
            let state = LogicState::from_bits(self.bits >> shift).invert();
            out.bits = (out.bits & !(0b11 << shift)) | (state.bits() << shift);
        }
        out
    }
}

impl fmt::Display for Value {
    /// Most significant lane first, one of `F01X` per lane
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for lane in (0..self.width).rev() {
            write!(f, "{}", LogicState::from_bits(self.bits >> (2 * lane as u32)))?;
        }
        Ok(())
    }
}

impl FromStr for Value {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut states = s
            .chars()
            .map(|c| LogicState::from_char(c).ok_or_else(|| SimError::InvalidValue(s.to_string())))
            .collect::<SimResult<Vec<_>>>()?;
        if states.is_empty() {
            return Err(SimError::InvalidWidth(0));
        }
        states.reverse();
        Value::from_states(&states)
    }
}
