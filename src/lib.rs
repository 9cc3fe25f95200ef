//! # qrmatrix
//!
//! A Rust library for encoding text and binary data into QR Code Model 2 symbols with
//! Reed-Solomon error correction. The result is a plain module matrix; turning it into
//! pixels, SVG or terminal output is left to the caller.
//!
//! ## Features
//!
//! - **Automatic segmentation**: Text is split into numeric, alphanumeric and byte segments,
//!   whichever packs tighter
//! - **Version search**: Finds the smallest version (1-40) that fits the data, optionally
//!   within a caller supplied range
//! - **Error correction**: Levels L, M, Q and H, with optional boosting to the highest level
//!   that still fits
//! - **Masking**: Picks the mask with the lowest penalty score, or applies a fixed one
//!
//! ## Quick Start
//!
//! ```rust
//! use qrmatrix::QRBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let qr = QRBuilder::text("HELLO WORLD").build()?;
//!
//! let mut out = String::new();
//! qr.paint_all(|x, _y, dark| {
//!     out.push(if dark { '#' } else { ' ' });
//!     if x + 1 == qr.width() {
//!         out.push('\n');
//!     }
//! });
//! # Ok(())
//! # }
//! ```
//!
//! ### Full Configuration
//!
//! ```rust
//! use qrmatrix::{ECLevel, MaskPattern, QRBuilder, Segment, Version};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let segs = vec![Segment::eci(26)?, Segment::bytes("Grüße".as_bytes())];
//! let qr = QRBuilder::with_segments(segs)
//!     .version_range(Version::new(2)?, Version::new(10)?) // Smallest fitting version in range
//!     .ec_level(ECLevel::Q)                                // Defaults to ECLevel::M
//!     .boost_ec_level(false)                               // Defaults to true
//!     .mask(MaskPattern::new(3)?)                          // Defaults to lowest penalty mask
//!     .build()?;
//!
//! assert_eq!(*qr.version(), 2);
//! assert_eq!(qr.ec_level(), ECLevel::Q);
//! # Ok(())
//! # }
//! ```
//!
//! ### Error Correction Levels
//! - **L (Low)**: ~7% error correction
//! - **M (Medium)**: ~15% error correction
//! - **Q (Quartile)**: ~25% error correction
//! - **H (High)**: ~30% error correction

#![allow(clippy::items_after_test_module, clippy::suspicious_arithmetic_impl)]

pub mod builder;
pub(crate) mod common;

pub use builder::{QRBuilder, QR};
pub use common::bitstream::BitStream;
pub use common::codec::{Mode, Segment};
pub use common::error::{QRError, QRResult};
pub use common::mask::MaskPattern;
pub use common::metadata::{Color, ECLevel, Version};
