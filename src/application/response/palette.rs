use serde::{Deserialize, Serialize};
use std::fmt;

use super::Severity;

/// An RGB colour, serialised as `[r, g, b]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_packed(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xff) as u8,
            g: ((value >> 8) & 0xff) as u8,
            b: (value & 0xff) as u8,
        }
    }

    /// `0xRRGGBB`
    pub const fn packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    pub const fn rgb(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Colour {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Colour> for [u8; 3] {
    fn from(colour: Colour) -> Self {
        [colour.r, colour.g, colour.b]
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.packed())
    }
}

/// One colour per severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub success: Colour,
    pub error: Colour,
    pub neutral: Colour,
    pub pending: Colour,
    pub cancelled: Colour,
}

impl Palette {
    /// The built-in palette:
    ///
    /// | severity  | hex       | rgb             |
    /// |-----------|-----------|-----------------|
    /// | success   | `#99b898` | (153, 184, 152) |
    /// | error     | `#e84a5f` | (232, 74, 95)   |
    /// | neutral   | `#facea8` | (250, 206, 168) |
    /// | pending   | `#ff847c` | (255, 132, 124) |
    /// | cancelled | `#2a363b` | (42, 54, 59)    |
    pub const fn friday() -> Self {
        Self {
            success: Colour::new(153, 184, 152),
            error: Colour::new(232, 74, 95),
            neutral: Colour::new(250, 206, 168),
            pending: Colour::new(255, 132, 124),
            cancelled: Colour::new(42, 54, 59),
        }
    }

    pub fn colour(&self, severity: Severity) -> Colour {
        match severity {
            Severity::Success => self.success,
            Severity::Error => self.error,
            Severity::Neutral => self.neutral,
            Severity::Pending => self.pending,
            Severity::Cancelled => self.cancelled,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::friday()
    }
}
