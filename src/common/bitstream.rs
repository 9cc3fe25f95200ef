use std::{fmt::Display, mem};

use num_traits::PrimInt;

use super::error::{QRError, QRResult};

// Bit stream
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitStream {
    data: Vec<u8>,
    // Bit length
    len: usize,
}

impl BitStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bit_capacity: usize) -> Self {
        Self { data: Vec::with_capacity(bit_capacity.div_ceil(8)), len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Packed bytes, MSB first. Bits past `len` in the last byte are zero.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.data.clone()
    }

    pub fn get(&self, index: usize) -> QRResult<bool> {
        if index >= self.len {
            return Err(QRError::IndexOutOfRange { index, len: self.len });
        }
        Ok((self.data[index >> 3] >> (7 - (index & 7))) & 1 == 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(|i| (self.data[i >> 3] >> (7 - (i & 7))) & 1 == 1)
    }
}

// Push bits for bit stream
//------------------------------------------------------------------------------

impl BitStream {
    pub fn push(&mut self, bit: bool) {
        let offset = self.len & 7;
        if offset == 0 {
            self.data.push(0);
        }
        if bit {
            let pos = self.len >> 3;
            self.data[pos] |= 0b10000000 >> offset;
        }
        self.len += 1;
    }

    /// Pushes the lowest `size` bits of `bits`, most significant first.
    pub fn push_bits<T>(&mut self, bits: T, size: usize)
    where
        T: PrimInt + Display,
    {
        let max_bits = mem::size_of::<T>() * 8;
        assert!(size <= max_bits, "Bit count exceeds type width: Length {size}, Width {max_bits}");
        assert!(
            size >= max_bits - bits.leading_zeros() as usize,
            "Bit count shouldn't exceed bit length: Length {size}, Bits {bits}"
        );

        for i in (0..size).rev() {
            self.push((bits >> i) & T::one() == T::one());
        }
    }

    /// Pushes every bit of `value` using the full width of its type.
    pub fn push_int<T>(&mut self, value: T)
    where
        T: PrimInt + Display,
    {
        self.push_bits(value, mem::size_of::<T>() * 8);
    }

    pub fn extend(&mut self, arr: &[u8]) {
        if self.len & 7 == 0 {
            self.data.extend_from_slice(arr);
            self.len += arr.len() << 3;
        } else {
            arr.iter().for_each(|&b| self.push_bits(b, 8));
        }
    }

    pub fn append(&mut self, other: &BitStream) {
        if self.len & 7 == 0 {
            self.data.extend_from_slice(&other.data);
            self.len += other.len;
        } else {
            other.iter().for_each(|b| self.push(b));
        }
    }
}

#[cfg(test)]
mod bit_stream_tests {
    use proptest::prelude::*;

    use super::BitStream;
    use crate::common::error::QRError;

    #[test]
    fn test_len() {
        let mut bs = BitStream::new();
        assert_eq!(bs.len(), 0);
        assert!(bs.is_empty());
        bs.push_bits(0, 0);
        assert_eq!(bs.len(), 0);
        bs.push_bits(0b1000, 4);
        assert_eq!(bs.len(), 4);
        bs.push_bits(0b1000, 8);
        assert_eq!(bs.len(), 12);
        bs.push_bits(0b1111111, 7);
        assert_eq!(bs.len(), 19);
        bs.push_bits(0b111111111111_u16, 16);
        assert_eq!(bs.len(), 35);
        assert_eq!(bs.data().len(), 5);
    }

    #[test]
    #[should_panic]
    fn test_push_bits_too_wide() {
        let mut bs = BitStream::new();
        bs.push_bits(0b10000, 4);
    }

    #[test]
    fn test_push() {
        let mut bs = BitStream::new();
        bs.push(false);
        assert_eq!(bs.data(), [0b00000000]);
        bs.push(true);
        assert_eq!(bs.data(), [0b01000000]);
    }

    #[test]
    fn test_push_bits() {
        let mut bs = BitStream::new();
        bs.push_bits(0b110, 3);
        bs.push_bits(0b10010, 5);
        bs.push_bits(0b0011_0100_1_u16, 9);
        assert_eq!(bs.data(), [0b11010010, 0b00110100, 0b10000000]);
        assert_eq!(bs.len(), 17);
    }

    #[test]
    fn test_push_int() {
        let mut bs = BitStream::new();
        bs.push(true);
        bs.push_int(0x0102_u16);
        bs.push_int(0xFF_u8);
        assert_eq!(bs.len(), 25);
        assert_eq!(bs.data(), [0b10000000, 0b10000001, 0b01111111, 0b10000000]);
    }

    #[test]
    fn test_extend_and_append() {
        let mut bs = BitStream::new();
        bs.extend(&[0xAB]);
        bs.push_bits(0b101, 3);
        bs.extend(&[0xFF]);
        assert_eq!(bs.len(), 19);
        assert_eq!(bs.data(), [0xAB, 0b10111111, 0b11100000]);

        let mut other = BitStream::new();
        other.push_bits(0b01, 2);
        bs.append(&other);
        assert_eq!(bs.len(), 21);
        assert_eq!(bs.data(), [0xAB, 0b10111111, 0b11101000]);

        let mut aligned = BitStream::new();
        aligned.extend(&[0x12]);
        aligned.append(&bs);
        assert_eq!(aligned.len(), 29);
        assert_eq!(aligned.data(), [0x12, 0xAB, 0b10111111, 0b11101000]);
    }

    #[test]
    fn test_get() {
        let mut bs = BitStream::new();
        bs.push_bits(0b101, 3);
        assert_eq!(bs.get(0), Ok(true));
        assert_eq!(bs.get(1), Ok(false));
        assert_eq!(bs.get(2), Ok(true));
        assert_eq!(bs.get(3), Err(QRError::IndexOutOfRange { index: 3, len: 3 }));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut bs = BitStream::new();
        bs.push_bits(0b11, 2);
        let copy = bs.clone();
        bs.push(true);
        assert_eq!(copy.len(), 2);
        assert_eq!(bs.len(), 3);
    }

    proptest! {
        #[test]
        fn proptest_push_bits_read_back(values in prop::collection::vec((1usize..=32, any::<u32>()), 0..40)) {
            let mut bs = BitStream::new();
            let mut expected = Vec::new();
            for &(w, v) in &values {
                let v = if w == 32 { v } else { v & ((1 << w) - 1) };
                bs.push_bits(v, w);
                expected.extend((0..w).rev().map(|i| (v >> i) & 1 == 1));
            }
            prop_assert_eq!(bs.len(), expected.len());
            prop_assert_eq!(bs.iter().collect::<Vec<_>>(), expected);
        }
    }
}
