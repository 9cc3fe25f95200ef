use log::debug;

use super::Segment;
use crate::common::bitstream::BitStream;
use crate::common::error::{QRError, QRResult};
use crate::common::metadata::{ECLevel, Version};

// Version search
//------------------------------------------------------------------------------

/// Finds the smallest version in `[min, max]` that holds the segments. With
/// `boost` the level is then raised as long as the same version still fits.
pub fn find_version(
    segs: &[Segment],
    ecl: ECLevel,
    min: Version,
    max: Version,
    boost: bool,
) -> QRResult<(Version, ECLevel)> {
    if min > max {
        return Err(QRError::InvalidVersionRange { min: *min, max: *max });
    }

    let fits = |ver: Version, ecl: ECLevel| {
        Segment::bit_length(segs, ver).is_some_and(|sz| sz <= ver.data_bit_capacity(ecl))
    };

    let ver = Version::range(min, max).find(|&v| fits(v, ecl)).ok_or(QRError::DataTooLong)?;

    let mut ecl = ecl;
    if boost {
        while ecl < ECLevel::H && fits(ver, ecl + 1) {
            ecl = ecl + 1;
        }
    }
    debug!("Selected version {ver}, level {ecl}");
    Ok((ver, ecl))
}


// Bitstream assembly
//------------------------------------------------------------------------------

/// Concatenates the segments and pads them to the data capacity of the
/// version at the given level. Segments must fit.
pub fn assemble(segs: &[Segment], ver: Version, ecl: ECLevel) -> Vec<u8> {
    let bit_capacity = ver.data_bit_capacity(ecl);
    let mut bs = BitStream::with_capacity(bit_capacity);
    for seg in segs {
        push_segment(seg, ver, &mut bs);
    }
    assert!(
        bs.len() <= bit_capacity,
        "Segments overflow capacity: Capacity {bit_capacity}, Size {}",
        bs.len()
    );

    push_terminator(&mut bs, bit_capacity);
    push_padding_bits(&mut bs);
    push_padding_codewords(&mut bs, bit_capacity);
    assert_eq!(bs.len(), bit_capacity, "Assembled bitstream must fill capacity");

    bs.to_bytes()
}

fn push_segment(seg: &Segment, ver: Version, out: &mut BitStream) {
    let cc_bits = seg.mode().char_cnt_bits(ver);
    debug_assert!(
        seg.char_count() < (1 << cc_bits),
        "Char count exceeds bit length: Char count {}, Char count bits {cc_bits}",
        seg.char_count()
    );
    out.push_bits(seg.mode().mode_bits(), 4);
    out.push_bits(seg.char_count(), cc_bits);
    out.append(seg.data());
}

fn push_terminator(out: &mut BitStream, bit_capacity: usize) {
    let term_len = std::cmp::min(4, bit_capacity - out.len());
    out.push_bits(0, term_len);
}

fn push_padding_bits(out: &mut BitStream) {
    let offset = out.len() & 7;
    if offset > 0 {
        out.push_bits(0, 8 - offset);
    }
}

fn push_padding_codewords(out: &mut BitStream, bit_capacity: usize) {
    debug_assert!(out.len() & 7 == 0, "Bit offset should be zero before padding codewords");

    let remain_byte_capacity = (bit_capacity - out.len()) >> 3;
    PADDING_CODEWORDS.iter().copied().cycle().take(remain_byte_capacity).for_each(|pc| {
        out.push_bits(pc, 8);
    });
}


// Global constants
//------------------------------------------------------------------------------

pub static PADDING_CODEWORDS: [u8; 2] = [0b1110_1100, 0b0001_0001];
