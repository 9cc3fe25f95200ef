use std::ops::{Add, Deref, Sub};

use log::trace;

use super::error::{QRError, QRResult};
use super::metadata::Color;
use crate::builder::QR;

// Mask pattern
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub struct MaskPattern(u8);

impl MaskPattern {
    pub const ALL: [MaskPattern; 8] = [
        MaskPattern(0),
        MaskPattern(1),
        MaskPattern(2),
        MaskPattern(3),
        MaskPattern(4),
        MaskPattern(5),
        MaskPattern(6),
        MaskPattern(7),
    ];

    pub const fn new(pattern: u8) -> QRResult<Self> {
        match pattern {
            0..=7 => Ok(Self(pattern)),
            _ => Err(QRError::InvalidMaskingPattern(pattern)),
        }
    }
}

impl Deref for MaskPattern {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<u8> for MaskPattern {
    type Error = QRError;
    fn try_from(pattern: u8) -> QRResult<Self> {
        Self::new(pattern)
    }
}

impl Add<u8> for MaskPattern {
    type Output = Self;
    fn add(self, rhs: u8) -> Self::Output {
        Self(((self.0 as usize + rhs as usize) % Self::ALL.len()) as u8)
    }
}

impl Sub<u8> for MaskPattern {
    type Output = Self;
    fn sub(self, rhs: u8) -> Self::Output {
        let n = Self::ALL.len();
        Self(((self.0 as usize + n - rhs as usize % n) % n) as u8)
    }
}

// x is the column, y is the row
mod mask_functions {
    pub fn checkerboard(x: usize, y: usize) -> bool {
        (x + y) & 1 == 0
    }

    pub fn horizontal_lines(_: usize, y: usize) -> bool {
        y & 1 == 0
    }

    pub fn vertical_lines(x: usize, _: usize) -> bool {
        x % 3 == 0
    }

    pub fn diagonal_lines(x: usize, y: usize) -> bool {
        (x + y) % 3 == 0
    }

    pub fn large_checkerboard(x: usize, y: usize) -> bool {
        ((y >> 1) + (x / 3)) & 1 == 0
    }

    pub fn fields(x: usize, y: usize) -> bool {
        ((x * y) & 1) + ((x * y) % 3) == 0
    }

    pub fn diamonds(x: usize, y: usize) -> bool {
        (((x * y) & 1) + ((x * y) % 3)) & 1 == 0
    }

    pub fn meadow(x: usize, y: usize) -> bool {
        (((x + y) & 1) + ((x * y) % 3)) & 1 == 0
    }
}

impl MaskPattern {
    pub fn mask_function(self) -> fn(usize, usize) -> bool {
        match *self {
            0b000 => mask_functions::checkerboard,
            0b001 => mask_functions::horizontal_lines,
            0b010 => mask_functions::vertical_lines,
            0b011 => mask_functions::diagonal_lines,
            0b100 => mask_functions::large_checkerboard,
            0b101 => mask_functions::fields,
            0b110 => mask_functions::diamonds,
            0b111 => mask_functions::meadow,
            _ => unreachable!("Invalid pattern {}", self.0),
        }
    }

    /// Returns true if the module at column `x`, row `y` is flipped by this pattern.
    pub fn applies(self, x: usize, y: usize) -> bool {
        self.mask_function()(x, y)
    }
}


// Best mask
//------------------------------------------------------------------------------

pub fn apply_best_mask(qr: &mut QR) -> MaskPattern {
    let best_mask = MaskPattern::ALL
        .into_iter()
        .min_by_key(|&m| {
            qr.apply_mask(m);
            let pen = compute_total_penalty(qr);
            qr.unapply_mask(m);
            trace!("Mask {} scored penalty {pen}", *m);
            pen
        })
        .expect("Should return at least 1 mask");
    qr.apply_mask(best_mask);
    best_mask
}

// Penalty scores
//------------------------------------------------------------------------------

pub fn compute_total_penalty(qr: &QR) -> u32 {
    let line_pen = compute_line_penalty(qr, true) + compute_line_penalty(qr, false);
    let blk_pen = compute_block_penalty(qr);
    let bal_pen = compute_balance_penalty(qr);
    line_pen + blk_pen + bal_pen
}

// Seven most recent run lengths of a row or column, newest first
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct RunHistory {
    runs: [usize; 7],
    width: usize,
}

impl RunHistory {
    fn new(width: usize) -> Self {
        Self { runs: [0; 7], width }
    }

    fn push(&mut self, mut run: usize) {
        // Light border outside the symbol counts towards the first run
        if self.runs[0] == 0 {
            run += self.width;
        }
        self.runs.copy_within(0..6, 1);
        self.runs[0] = run;
    }

    // Number of dark-light-dark-dark-dark-light-dark shapes with a 4 module light
    // border ending at the newest run
    fn count_finder_patterns(&self) -> u32 {
        let [r0, r1, r2, r3, r4, r5, r6] = self.runs;
        let n = r1;
        debug_assert!(n <= self.width * 3, "Run length exceeds 3 widths: {n}");

        let core = n > 0 && r2 == n && r3 == n * 3 && r4 == n && r5 == n;
        u32::from(core && r0 >= n * 4 && r6 >= n) + u32::from(core && r6 >= n * 4 && r0 >= n)
    }

    fn terminate(&mut self, last_clr: Color, mut last_run: usize) -> u32 {
        if last_clr == Color::Dark {
            self.push(last_run);
            last_run = 0;
        }
        self.push(last_run + self.width);
        self.count_finder_patterns()
    }
}

// Adjacent runs of 5 or more & finder-like shapes along every row or every column
fn compute_line_penalty(qr: &QR, is_hor: bool) -> u32 {
    let w = qr.width();
    let mut pen = 0;
    for i in 0..w {
        let mut history = RunHistory::new(w);
        let mut run_clr = Color::Light;
        let mut run = 0;
        for j in 0..w {
            let clr = if is_hor { qr.color(i, j) } else { qr.color(j, i) };
            if clr == run_clr {
                run += 1;
                if run == 5 {
                    pen += ADJACENT_PENALTY;
                } else if run > 5 {
                    pen += 1;
                }
            } else {
                history.push(run);
                if run_clr == Color::Light {
                    pen += history.count_finder_patterns() * FINDER_PENALTY;
                }
                run_clr = clr;
                run = 1;
            }
        }
        pen += history.terminate(run_clr, run) * FINDER_PENALTY;
    }
    pen
}

fn compute_block_penalty(qr: &QR) -> u32 {
    let mut pen = 0;
    let w = qr.width();
    for r in 0..w - 1 {
        for c in 0..w - 1 {
            let clr = qr.color(r, c);
            if clr == qr.color(r + 1, c)
                && clr == qr.color(r, c + 1)
                && clr == qr.color(r + 1, c + 1)
            {
                pen += BLOCK_PENALTY;
            }
        }
    }
    pen
}

// 10 points for every full 5% the dark ratio strays from 50%
fn compute_balance_penalty(qr: &QR) -> u32 {
    let dark = qr.count_dark_modules();
    let w = qr.width();
    let tot = w * w;
    let k = ((dark * 20).abs_diff(tot * 10) + tot - 1) / tot - 1;
    k as u32 * BALANCE_PENALTY
}


// Global constants
//------------------------------------------------------------------------------

static ADJACENT_PENALTY: u32 = 3;

static BLOCK_PENALTY: u32 = 3;

static FINDER_PENALTY: u32 = 40;

static BALANCE_PENALTY: u32 = 10;
