use log::trace;

use super::Mode;
use crate::common::bitstream::BitStream;
use crate::common::error::{QRError, QRResult};
use crate::common::metadata::Version;

// Segment
//------------------------------------------------------------------------------

/// A run of data encoded in a single mode. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    mode: Mode,
    char_count: usize,
    data: BitStream,
}

impl Segment {
    pub fn new(mode: Mode, char_count: usize, data: BitStream) -> Self {
        Self { mode, char_count, data }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }

    pub fn data(&self) -> &BitStream {
        &self.data
    }

    pub fn bytes(data: &[u8]) -> Self {
        let mut bs = BitStream::with_capacity(data.len() << 3);
        bs.extend(data);
        Self::new(Mode::Byte, data.len(), bs)
    }

    pub fn numeric(digits: &str) -> QRResult<Self> {
        if let Some(ch) = digits.chars().find(|&c| !Mode::Numeric.contains(c)) {
            return Err(QRError::InvalidChar { ch, mode: Mode::Numeric });
        }
        Ok(Self::encode_numeric(digits.as_bytes()))
    }

    pub fn alphanumeric(text: &str) -> QRResult<Self> {
        if let Some(ch) = text.chars().find(|&c| !Mode::Alphanumeric.contains(c)) {
            return Err(QRError::InvalidChar { ch, mode: Mode::Alphanumeric });
        }
        Ok(Self::encode_alphanumeric(text.as_bytes()))
    }

    /// Extended channel interpretation header selecting the character set
    /// used by the segments that follow.
    pub fn eci(designator: u32) -> QRResult<Self> {
        let mut bs = BitStream::with_capacity(24);
        match designator {
            d if d < 1 << 7 => bs.push_bits(d, 8),
            d if d < 1 << 14 => {
                bs.push_bits(0b10_u32, 2);
                bs.push_bits(d, 14);
            }
            d if d < 1_000_000 => {
                bs.push_bits(0b110_u32, 3);
                bs.push_bits(d, 21);
            }
            d => return Err(QRError::InvalidEciDesignator(d)),
        }
        Ok(Self::new(Mode::Eci, 0, bs))
    }

    // Callers guarantee every byte is an ascii digit
    fn encode_numeric(digits: &[u8]) -> Self {
        let mut bs = BitStream::with_capacity(digits.len() * 10 / 3 + 4);
        for chunk in digits.chunks(3) {
            let val = chunk.iter().fold(0_u16, |n, b| n * 10 + (b - b'0') as u16);
            bs.push_bits(val, chunk.len() * 3 + 1);
        }
        Self::new(Mode::Numeric, digits.len(), bs)
    }

    // Callers guarantee every byte is in the alphanumeric charset
    fn encode_alphanumeric(text: &[u8]) -> Self {
        let mut bs = BitStream::with_capacity(text.len() * 11 / 2 + 6);
        for chunk in text.chunks(2) {
            let val = chunk.iter().fold(0_u16, |n, &b| {
                let digit = Mode::alphanumeric_digit(b as char);
                debug_assert!(digit.is_some(), "Invalid alphanumeric data: {b}");
                n * 45 + digit.unwrap_or_default()
            });
            let len = if chunk.len() == 2 { 11 } else { 6 };
            bs.push_bits(val, len);
        }
        Self::new(Mode::Alphanumeric, text.len(), bs)
    }
}


// Bit length estimation
//------------------------------------------------------------------------------

impl Segment {
    /// Upper bound on the encoded size of `n` digits, assuming the widest
    /// character count field.
    pub fn numeric_bit_length(n: usize) -> usize {
        4 + 14 + n / 3 * 10 + [0, 4, 7][n % 3]
    }

    /// Upper bound on the encoded size of `n` alphanumeric characters, assuming
    /// the widest character count field. Any non-empty run is charged 6 extra bits.
    pub fn alphanumeric_bit_length(n: usize) -> usize {
        4 + 13 + n / 2 * 11 + if n > 0 { 6 } else { 0 }
    }

    fn estimate_bit_length(mode: Mode, n: usize) -> usize {
        match mode {
            Mode::Numeric => Self::numeric_bit_length(n),
            Mode::Alphanumeric => Self::alphanumeric_bit_length(n),
            _ => unreachable!("No estimator for {mode} mode"),
        }
    }

    /// Exact number of bits the segments occupy in the given version, or `None`
    /// if a character count overflows its field or the total exceeds `i32::MAX`.
    pub fn bit_length(segs: &[Segment], ver: Version) -> Option<usize> {
        let mut total = 0_usize;
        for seg in segs {
            let cc_bits = seg.mode.char_cnt_bits(ver);
            if seg.char_count >= 1 << cc_bits {
                return None;
            }
            total = total.checked_add(4 + cc_bits + seg.data.len())?;
        }
        (total <= i32::MAX as usize).then_some(total)
    }
}

#[cfg(test)]
mod bit_length_tests {
    use proptest::prelude::*;
    use test_case::test_case;

    use super::Segment;
    use crate::common::metadata::Version;

    #[test_case(0, 18)]
    #[test_case(1, 22)]
    #[test_case(2, 25)]
    #[test_case(3, 28)]
    #[test_case(5, 35)]
    fn test_numeric_bit_length(n: usize, exp: usize) {
        assert_eq!(Segment::numeric_bit_length(n), exp);
    }

    #[test_case(0, 17)]
    #[test_case(1, 23)]
    #[test_case(2, 34)]
    #[test_case(11, 78)]
    fn test_alphanumeric_bit_length(n: usize, exp: usize) {
        assert_eq!(Segment::alphanumeric_bit_length(n), exp);
    }

    #[test]
    fn test_bit_length() {
        let segs = [Segment::alphanumeric("HELLO WORLD").unwrap(), Segment::bytes(b"!")];
        let v1 = Version::new(1).unwrap();
        assert_eq!(Segment::bit_length(&segs, v1), Some(4 + 9 + 61 + 4 + 8 + 8));
        let v10 = Version::new(10).unwrap();
        assert_eq!(Segment::bit_length(&segs, v10), Some(4 + 11 + 61 + 4 + 16 + 8));
        assert_eq!(Segment::bit_length(&[], v1), Some(0));
    }

    #[test]
    fn test_bit_length_count_overflow() {
        let v1 = Version::new(1).unwrap();
        let segs = [Segment::bytes(&[0; 256])];
        assert_eq!(Segment::bit_length(&segs, v1), None);
        let segs = [Segment::bytes(&[0; 255])];
        assert_eq!(Segment::bit_length(&segs, v1), Some(4 + 8 + 255 * 8));
    }

    #[test]
    fn test_bit_length_eci() {
        let v1 = Version::new(1).unwrap();
        let segs = [Segment::eci(26).unwrap()];
        assert_eq!(Segment::bit_length(&segs, v1), Some(12));
    }

    proptest! {
        #[test]
        fn proptest_numeric_shorter_than_bytes(digits in "[0-9]{1,255}") {
            let numeric = [Segment::numeric(&digits).unwrap()];
            let bytes = [Segment::bytes(digits.as_bytes())];
            for ver in Version::range(Version::MIN, Version::MAX) {
                let n = Segment::bit_length(&numeric, ver).unwrap();
                let b = Segment::bit_length(&bytes, ver).unwrap();
                prop_assert!(n < b, "Version {ver}: Numeric {n}, Bytes {b}");
            }
        }
    }
}

// Segmentation
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    mode: Mode,
    start: usize,
    end: usize,
}

impl Segment {
    /// Splits text into numeric, alphanumeric and byte segments, switching
    /// out of byte mode only for runs that are estimated to be shorter.
    pub fn from_text(text: &str) -> Vec<Segment> {
        if text.is_empty() {
            return vec![Segment::bytes(&[])];
        }

        let candidates = find_candidates(text);
        let mut segs = Vec::new();
        let mut cursor = 0;
        for cand in candidates {
            if cursor <= cand.start {
                if cursor < cand.start {
                    segs.push(Segment::bytes(text[cursor..cand.start].as_bytes()));
                }
                segs.push(Self::encode_candidate(text, cand.mode, cand.start, cand.end));
                cursor = cand.end;
            } else if cursor < cand.end {
                let count = cand.end - cursor;
                if Self::estimate_bit_length(cand.mode, count) < count * 8 {
                    segs.push(Self::encode_candidate(text, cand.mode, cursor, cand.end));
                    cursor = cand.end;
                } else {
                    trace!("Skipped {} run tail at {cursor}..{}", cand.mode, cand.end);
                }
            }
        }
        if cursor < text.len() {
            segs.push(Segment::bytes(text[cursor..].as_bytes()));
        }

        for seg in &segs {
            trace!("Segment: mode {}, char count {}", seg.mode, seg.char_count);
        }
        segs
    }

    fn encode_candidate(text: &str, mode: Mode, start: usize, end: usize) -> Segment {
        let chunk = &text.as_bytes()[start..end];
        match mode {
            Mode::Numeric => Self::encode_numeric(chunk),
            Mode::Alphanumeric => Self::encode_alphanumeric(chunk),
            _ => unreachable!("Candidates are numeric or alphanumeric: {mode}"),
        }
    }
}

// Maximal runs of ascii bytes belonging to the mode's charset
fn find_runs(text: &str, mode: Mode) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut runs = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii() || !mode.contains(bytes[i] as char) {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii() && mode.contains(bytes[i] as char) {
            i += 1;
        }
        runs.push((start, i));
    }
    runs
}

fn find_candidates(text: &str) -> Vec<Candidate> {
    let bytes = text.as_bytes();
    let numerics = find_runs(text, Mode::Numeric).into_iter().map(|(start, end)| Candidate {
        mode: Mode::Numeric,
        start,
        end,
    });
    let alphanumerics = find_runs(text, Mode::Alphanumeric)
        .into_iter()
        // Runs that are mostly digits are left to numeric mode
        .filter(|&(start, end)| {
            let digits = bytes[start..end].iter().filter(|b| b.is_ascii_digit()).count();
            digits * 2 <= end - start
        })
        .map(|(start, end)| Candidate { mode: Mode::Alphanumeric, start, end });

    // Runs are ascii so byte length equals utf-8 length
    let mut candidates: Vec<Candidate> = numerics
        .chain(alphanumerics)
        .filter(|c| Segment::estimate_bit_length(c.mode, c.end - c.start) < (c.end - c.start) * 8)
        .collect();
    candidates.sort_by_key(|c| (c.start, c.mode != Mode::Numeric));
    candidates
}
