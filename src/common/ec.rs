use std::ops::Deref;

use log::debug;

use super::metadata::{ECLevel, Version};

// Galois field GF(256)
//------------------------------------------------------------------------------

// Exponent and log tables for the field reduced by x^8 + x^4 + x^3 + x^2 + 1
const fn build_exp_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        table[i] = x as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= REDUCING_POLYNOMIAL;
        }
        i += 1;
    }
    table[255] = table[0];
    table
}

const fn build_log_table() -> [u8; 256] {
    let exp = build_exp_table();
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 255 {
        table[exp[i] as usize] = i as u8;
        i += 1;
    }
    table
}

fn gf_mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let log_sum = LOG_TABLE[a as usize] as usize + LOG_TABLE[b as usize] as usize;
    EXP_TABLE[log_sum % 255]
}


// Reed-Solomon
//------------------------------------------------------------------------------

/// Generator polynomial of the given degree with roots 2^0..2^(degree-1).
/// Coefficients run from highest to lowest power, the monic leading term is omitted.
pub fn rs_divisor(degree: usize) -> Vec<u8> {
    assert!((1..=255).contains(&degree), "Degree out of range: {degree}");

    let mut res = vec![0u8; degree];
    res[degree - 1] = 1;
    let mut root = 1u8;
    for _ in 0..degree {
        for j in 0..degree {
            res[j] = gf_mul(res[j], root);
            if j + 1 < degree {
                res[j] ^= res[j + 1];
            }
        }
        root = gf_mul(root, 2);
    }
    res
}

/// Remainder of the data polynomial shifted by the divisor's degree, divided
/// by the divisor.
pub fn rs_remainder(data: &[u8], divisor: &[u8]) -> Vec<u8> {
    let mut res = vec![0u8; divisor.len()];
    for &b in data {
        let factor = b ^ res[0];
        res.copy_within(1.., 0);
        if let Some(last) = res.last_mut() {
            *last = 0;
        }
        for (r, &d) in res.iter_mut().zip(divisor) {
            *r ^= gf_mul(d, factor);
        }
    }
    res
}


// Blocks & interleaving
//------------------------------------------------------------------------------

/// Splits data codewords into error correction blocks. Short blocks come
/// first and carry one data codeword less than long blocks.
pub fn blockify(data: &[u8], ver: Version, ecl: ECLevel) -> Vec<&[u8]> {
    let num_blocks = ver.ec_blocks(ecl);
    let ecc_len = ver.ecc_per_block(ecl);
    let raw = ver.total_codewords();
    let num_short = num_blocks - raw % num_blocks;
    let short_len = raw / num_blocks - ecc_len;

    debug_assert!(
        data.len() == ver.data_codewords(ecl),
        "Data len doesn't match total size of blocks: Data len {}, Total block size {}",
        data.len(),
        ver.data_codewords(ecl)
    );

    let (short, long) = data.split_at(short_len * num_short);
    let mut blocks = Vec::with_capacity(num_blocks);
    blocks.extend(short.chunks(short_len));
    if !long.is_empty() {
        blocks.extend(long.chunks(short_len + 1));
    }
    blocks
}

pub fn interleave<T: Copy, V: Deref<Target = [T]>>(blocks: &[V]) -> Vec<T> {
    let max_block_size = blocks.iter().map(|b| b.len()).max().unwrap_or(0);
    let total_size = blocks.iter().map(|b| b.len()).sum::<usize>();
    let mut res = Vec::with_capacity(total_size);
    for i in 0..max_block_size {
        for b in blocks {
            if i < b.len() {
                res.push(b[i]);
            }
        }
    }
    res
}

/// Appends error correction codewords to the data codewords and interleaves
/// both across blocks, yielding the full codeword sequence of the symbol.
pub fn add_ecc_and_interleave(data: &[u8], ver: Version, ecl: ECLevel) -> Vec<u8> {
    let data_blocks = blockify(data, ver, ecl);
    let divisor = rs_divisor(ver.ecc_per_block(ecl));
    let ecc_blocks: Vec<Vec<u8>> = data_blocks.iter().map(|b| rs_remainder(b, &divisor)).collect();

    let mut res = interleave(&data_blocks);
    res.extend(interleave(&ecc_blocks));
    debug!(
        "Codewords: {} data, {} ecc in {} blocks",
        data.len(),
        res.len() - data.len(),
        data_blocks.len()
    );
    assert_eq!(res.len(), ver.total_codewords(), "Interleaved length must match raw codewords");
    res
}

#[cfg(test)]
mod block_tests {
    use test_case::test_case;

    use super::{add_ecc_and_interleave, blockify, interleave, rs_divisor, rs_remainder};
    use crate::common::metadata::{ECLevel, Version};

    #[test]
    fn test_interleave() {
        let blocks = vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9, 0]];
        let interleaved = interleave(&blocks);
        assert_eq!(interleaved, vec![1, 4, 7, 2, 5, 8, 3, 6, 9, 0]);
    }

    #[test_case(1, ECLevel::M, vec![16])]
    #[test_case(5, ECLevel::Q, vec![15, 15, 16, 16])]
    #[test_case(10, ECLevel::H, vec![15, 15, 15, 15, 15, 15, 16, 16])]
    #[test_case(40, ECLevel::L, [vec![118; 19], vec![119; 6]].concat())]
    fn test_blockify(v: usize, ecl: ECLevel, exp: Vec<usize>) {
        let ver = Version::new(v).unwrap();
        let data = vec![0u8; ver.data_codewords(ecl)];
        let lens: Vec<usize> = blockify(&data, ver, ecl).iter().map(|b| b.len()).collect();
        assert_eq!(lens, exp);
    }

    #[test]
    fn test_add_ecc_simple() {
        let msg = b" [\x0bx\xd1r\xdcMC@\xec\x11\xec\x11\xec\x11";
        let res = add_ecc_and_interleave(msg, Version::MIN, ECLevel::M);
        assert_eq!(&res[..16], msg);
        assert_eq!(&res[16..], b"\xc4\x23\x27\x77\xeb\xd7\xe7\xe2\x5d\x17");
    }

    #[test]
    fn test_add_ecc_complex() {
        let msg = b"CUF\x86W&U\xc2w2\x06\x12\x06g&\xf6\xf6B\x07v\x86\xf2\x07&V\x16\xc6\xc7\x92\x06\
                    \xb6\xe6\xf7w2\x07v\x86W&R\x06\x86\x972\x07F\xf7vV\xc2\x06\x972\x10\xec\x11\xec\
                    \x11\xec\x11\xec";
        let expected_ecc: [&[u8]; 4] = [
            b"\xd5\xc7\x0b\x2d\x73\xf7\xf1\xdf\xe5\xf8\x9a\x75\x9a\x6f\x56\xa1\x6f\x27",
            b"\x57\xcc\x60\x3c\xca\xb6\x7c\x9d\xc8\x86\x1b\x81\xd1\x11\xa3\xa3\x78\x85",
            b"\x94\x74\xb1\xd4\x4c\x85\x4b\xf2\xee\x4c\xc3\xe6\xbd\x0a\x6c\xf0\xc0\x8d",
            b"\xeb\x9f\x05\xad\x18\x93\x3b\x21\x6a\x28\xff\xac\x52\x02\x83\x20\xb2\xec",
        ];
        let ver = Version::new(5).unwrap();
        let divisor = rs_divisor(ver.ecc_per_block(ECLevel::Q));
        let blocks = blockify(msg, ver, ECLevel::Q);
        for (block, exp) in blocks.iter().zip(expected_ecc) {
            assert_eq!(rs_remainder(block, &divisor), exp);
        }

        let res = add_ecc_and_interleave(msg, ver, ECLevel::Q);
        assert_eq!(res.len(), 134);
        // First column of data, then the codeword only long blocks carry
        assert_eq!(res[..4], [msg[0], msg[15], msg[30], msg[46]]);
        assert_eq!(res[60..62], [msg[45], msg[61]]);
        assert_eq!(res[62..66], [0xd5, 0x57, 0x94, 0xeb]);
        assert_eq!(res[133], 0xec);
    }
}

// Global constants
//------------------------------------------------------------------------------

const REDUCING_POLYNOMIAL: u16 = 0x11D;

static EXP_TABLE: [u8; 256] = build_exp_table();

static LOG_TABLE: [u8; 256] = build_log_table();
