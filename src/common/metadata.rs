use std::fmt::{Display, Formatter};
use std::ops::{Add, Deref, Not, Sub};
use std::str::FromStr;

use super::error::{QRError, QRResult};
use super::mask::MaskPattern;

// Color
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Color {
    Light,
    Dark,
}

impl From<bool> for Color {
    fn from(is_dark: bool) -> Self {
        if is_dark {
            Self::Dark
        } else {
            Self::Light
        }
    }
}

impl Not for Color {
    type Output = Self;
    fn not(self) -> Self::Output {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

// Version
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub struct Version(usize);

impl Deref for Version {
    type Target = usize;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for Version {
    type Error = QRError;
    fn try_from(value: usize) -> QRResult<Self> {
        Self::new(value)
    }
}

impl Version {
    pub const MIN: Version = Version(1);
    pub const MAX: Version = Version(40);

    pub const fn new(version: usize) -> QRResult<Self> {
        match version {
            1..=40 => Ok(Self(version)),
            _ => Err(QRError::InvalidVersion(version)),
        }
    }

    pub(crate) fn range(min: Version, max: Version) -> impl Iterator<Item = Version> {
        (*min..=*max).map(Version)
    }

    pub const fn width(self) -> usize {
        self.0 * 4 + 17
    }

    // Modules left for data and ecc once every function pattern and info area is drawn
    pub fn raw_data_modules(self) -> usize {
        let v = self.0;
        let w = self.width();
        let mut res = w * w;
        res -= 8 * 8 * 3;
        res -= 15 * 2 + 1;
        res -= (w - 16) * 2;
        if v >= 2 {
            let n = v / 7 + 2;
            res -= (n - 1) * (n - 1) * 25;
            res -= (n - 2) * 2 * 20;
            if v >= 7 {
                res -= 6 * 3 * 2;
            }
        }
        res
    }

    pub fn total_codewords(self) -> usize {
        self.raw_data_modules() >> 3
    }

    pub fn ecc_per_block(self, ecl: ECLevel) -> usize {
        ECC_CODEWORDS_PER_BLOCK[ecl as usize][self.0] as usize
    }

    pub fn ec_blocks(self, ecl: ECLevel) -> usize {
        NUM_ERROR_CORRECTION_BLOCKS[ecl as usize][self.0] as usize
    }

    pub fn data_codewords(self, ecl: ECLevel) -> usize {
        self.total_codewords() - self.ecc_per_block(ecl) * self.ec_blocks(ecl)
    }

    pub fn data_bit_capacity(self, ecl: ECLevel) -> usize {
        self.data_codewords(ecl) << 3
    }

    pub fn alignment_pattern(self) -> Vec<usize> {
        let v = self.0;
        if v == 1 {
            return Vec::new();
        }
        let n = v / 7 + 2;
        let step = if v == 32 { 26 } else { (v * 4 + n * 2 + 1) / (n * 2 - 2) * 2 };
        let last = self.width() - 7;
        let mut res = vec![6; n];
        for (i, p) in res.iter_mut().enumerate().skip(1) {
            *p = last - (n - 1 - i) * step;
        }
        res
    }

    // 6 bit version followed by 12 bit BCH remainder
    pub fn info(self) -> u32 {
        debug_assert!(self.0 >= 7, "Version info is only drawn from version 7: {}", self.0);

        let v = self.0 as u32;
        let mut rem = v;
        for _ in 0..12 {
            rem = (rem << 1) ^ ((rem >> 11) * VERSION_INFO_GENERATOR);
        }
        let info = (v << 12) | rem;
        debug_assert!(info >> VERSION_INFO_BIT_LEN == 0, "Version info overflow: {info:#b}");
        info
    }
}


// Error correction level
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub enum ECLevel {
    L = 0,
    M = 1,
    Q = 2,
    H = 3,
}

impl ECLevel {
    pub const ALL: [ECLevel; 4] = [Self::L, Self::M, Self::Q, Self::H];

    pub fn name(self) -> &'static str {
        match self {
            Self::L => "Low",
            Self::M => "Medium",
            Self::Q => "Quartile",
            Self::H => "High",
        }
    }

    // 2 bit indicator written into format info
    pub fn format_bits(self) -> u32 {
        match self {
            Self::L => 0b01,
            Self::M => 0b00,
            Self::Q => 0b11,
            Self::H => 0b10,
        }
    }

    /// Fraction of codewords that can be damaged and still be recovered.
    pub fn max_damage(self) -> f32 {
        match self {
            Self::L => 0.07,
            Self::M => 0.15,
            Self::Q => 0.25,
            Self::H => 0.30,
        }
    }
}

impl Add<usize> for ECLevel {
    type Output = Self;
    fn add(self, rhs: usize) -> Self::Output {
        Self::ALL[(self as usize + rhs) % Self::ALL.len()]
    }
}

impl Sub<usize> for ECLevel {
    type Output = Self;
    fn sub(self, rhs: usize) -> Self::Output {
        let n = Self::ALL.len();
        Self::ALL[(self as usize + n - rhs % n) % n]
    }
}

impl TryFrom<u8> for ECLevel {
    type Error = QRError;
    fn try_from(id: u8) -> QRResult<Self> {
        Self::ALL.get(id as usize).copied().ok_or(QRError::InvalidECLevel)
    }
}

impl FromStr for ECLevel {
    type Err = QRError;
    fn from_str(s: &str) -> QRResult<Self> {
        Self::ALL
            .into_iter()
            .find(|l| s.eq_ignore_ascii_case(l.name()) || s.eq_ignore_ascii_case(&format!("{l:?}")))
            .ok_or(QRError::InvalidECLevel)
    }
}

impl Display for ECLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}


// Format info
//------------------------------------------------------------------------------

// 2 bit ec level + 3 bit mask, 10 bit BCH remainder, xored with fixed mask
pub fn format_info(ecl: ECLevel, mask: MaskPattern) -> u32 {
    let data = (ecl.format_bits() << 3) | *mask as u32;
    let mut rem = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * FORMAT_INFO_GENERATOR);
    }
    let info = ((data << 10) | rem) ^ FORMAT_INFO_MASK;
    debug_assert!(info >> FORMAT_INFO_BIT_LEN == 0, "Format info overflow: {info:#b}");
    info
}

#[cfg(test)]
mod format_info_tests {
    use test_case::test_case;

    use super::{format_info, ECLevel};
    use crate::common::mask::MaskPattern;

    #[test_case(ECLevel::M, 0, 0x5412)]
    #[test_case(ECLevel::L, 0, 0x77C4)]
    #[test_case(ECLevel::L, 4, 0x662F)]
    #[test_case(ECLevel::Q, 7, 0x2BED)]
    #[test_case(ECLevel::H, 3, 0x19D0)]
    fn test_format_info(ecl: ECLevel, mask: u8, exp: u32) {
        assert_eq!(format_info(ecl, MaskPattern::new(mask).unwrap()), exp);
    }
}

// Global constants
//------------------------------------------------------------------------------

pub static FORMAT_INFO_BIT_LEN: usize = 15;

pub static VERSION_INFO_BIT_LEN: usize = 18;

static FORMAT_INFO_GENERATOR: u32 = 0b101_0011_0111;

static FORMAT_INFO_MASK: u32 = 0b101_0100_0001_0010;

static VERSION_INFO_GENERATOR: u32 = 0b1_1111_0010_0101;

// Indexed by ec level then version, column 0 is padding
static ECC_CODEWORDS_PER_BLOCK: [[u8; 41]; 4] = [
    [
        0, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        0, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ],
    [
        0, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        0, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
];

static NUM_ERROR_CORRECTION_BLOCKS: [[u8; 41]; 4] = [
    [
        0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12, 13,
        14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ],
    [
        0, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ],
    [
        0, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29,
        34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ],
    [
        0, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ],
];
