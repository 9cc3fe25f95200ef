pub mod encoder;
pub mod segment;

pub use encoder::*;
pub use segment::*;

use std::fmt::{Display, Formatter};

use super::metadata::Version;

// Mode
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Mode {
    Numeric = 0b0001,
    Alphanumeric = 0b0010,
    Byte = 0b0100,
    Kanji = 0b1000,
    Eci = 0b0111,
}

impl Mode {
    pub const ALL: [Mode; 5] = [Self::Numeric, Self::Alphanumeric, Self::Byte, Self::Kanji, Self::Eci];

    /// 4 bit mode indicator.
    pub fn mode_bits(self) -> u8 {
        self as u8
    }

    /// Width of the character count field for the given version.
    pub fn char_cnt_bits(self, ver: Version) -> usize {
        let bracket = (*ver + 7) / 17;
        let widths = match self {
            Self::Numeric => [10, 12, 14],
            Self::Alphanumeric => [9, 11, 13],
            Self::Byte => [8, 16, 16],
            Self::Kanji => [8, 10, 12],
            Self::Eci => [0, 0, 0],
        };
        widths[bracket]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Numeric => "Numeric",
            Self::Alphanumeric => "Alphanumeric",
            Self::Byte => "Byte",
            Self::Kanji => "Kanji",
            Self::Eci => "ECI",
        }
    }

    pub fn contains(self, ch: char) -> bool {
        match self {
            Self::Numeric => ch.is_ascii_digit(),
            Self::Alphanumeric => ALPHANUMERIC_CHARSET.contains(ch),
            Self::Byte => true,
            Self::Kanji | Self::Eci => false,
        }
    }

    #[inline]
    pub(crate) fn alphanumeric_digit(ch: char) -> Option<u16> {
        ALPHANUMERIC_CHARSET.find(ch).map(|i| i as u16)
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}


// Global constants
//------------------------------------------------------------------------------

static ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";
