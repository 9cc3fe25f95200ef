mod qr;

#[cfg(test)]
pub(crate) use qr::Module;
pub use qr::QR;

use std::borrow::Cow;

use log::debug;

use crate::common::{
    codec::{assemble, find_version, Segment},
    ec::add_ecc_and_interleave,
    error::QRResult,
    mask::{apply_best_mask, MaskPattern},
    metadata::{ECLevel, Version},
};

enum Payload<'a> {
    Bytes(&'a [u8]),
    Text(&'a str),
    Segments(Vec<Segment>),
}

pub struct QRBuilder<'a> {
    payload: Payload<'a>,
    min_version: Version,
    max_version: Version,
    ec_level: ECLevel,
    mask: Option<MaskPattern>,
    boost_ecl: bool,
}

impl<'a> QRBuilder<'a> {
    fn with_payload(payload: Payload<'a>) -> Self {
        Self {
            payload,
            min_version: Version::MIN,
            max_version: Version::MAX,
            ec_level: ECLevel::M,
            mask: None,
            boost_ecl: true,
        }
    }

    /// Encodes `data` as a single byte mode segment.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_payload(Payload::Bytes(data))
    }

    /// Splits `text` into numeric, alphanumeric and byte segments, whichever
    /// packs tighter.
    pub fn text(text: &'a str) -> Self {
        Self::with_payload(Payload::Text(text))
    }

    pub fn with_segments(segments: Vec<Segment>) -> Self {
        Self::with_payload(Payload::Segments(segments))
    }

    pub fn version(&mut self, version: Version) -> &mut Self {
        self.min_version = version;
        self.max_version = version;
        self
    }

    pub fn version_range(&mut self, min: Version, max: Version) -> &mut Self {
        self.min_version = min;
        self.max_version = max;
        self
    }

    pub fn unset_version(&mut self) -> &mut Self {
        self.version_range(Version::MIN, Version::MAX)
    }

    pub fn ec_level(&mut self, ec_level: ECLevel) -> &mut Self {
        self.ec_level = ec_level;
        self
    }

    pub fn mask(&mut self, mask: MaskPattern) -> &mut Self {
        self.mask = Some(mask);
        self
    }

    pub fn unset_mask(&mut self) -> &mut Self {
        self.mask = None;
        self
    }

    /// Raise the error correction level as long as the chosen version still fits.
    pub fn boost_ec_level(&mut self, boost: bool) -> &mut Self {
        self.boost_ecl = boost;
        self
    }

    pub fn metadata(&self) -> String {
        let version = if self.min_version == self.max_version {
            format!("{}", *self.min_version)
        } else {
            format!("{}..={}", *self.min_version, *self.max_version)
        };
        let mask = match self.mask {
            Some(m) => format!("{}", *m),
            None => "Auto".to_string(),
        };
        format!(
            "{{ Version: {version}, Ec level: {:?}, Mask: {mask}, Boost: {} }}",
            self.ec_level, self.boost_ecl
        )
    }
}


impl QRBuilder<'_> {
    pub fn build(&self) -> QRResult<QR> {
        debug!("Generating QR {}", self.metadata());

        let segs: Cow<[Segment]> = match &self.payload {
            Payload::Bytes(data) => Cow::Owned(vec![Segment::bytes(data)]),
            Payload::Text(text) => Cow::Owned(Segment::from_text(text)),
            Payload::Segments(segs) => Cow::Borrowed(segs),
        };

        let (ver, ecl) =
            find_version(&segs, self.ec_level, self.min_version, self.max_version, self.boost_ecl)?;

        let data = assemble(&segs, ver, ecl);
        let codewords = add_ecc_and_interleave(&data, ver, ecl);

        let mut qr = QR::new(ver, ecl);
        qr.draw_all_function_patterns();
        qr.draw_codewords(&codewords);

        let mask = match self.mask {
            Some(m) => {
                qr.apply_mask(m);
                m
            }
            None => apply_best_mask(&mut qr),
        };
        debug!("Applied mask {}", *mask);

        let total_modules = qr.width() * qr.width();
        let dark_modules = qr.count_dark_modules();
        debug!(
            "Generated QR {}: Dark cells {dark_modules}, Light cells {}, Balance {}%",
            qr.metadata(),
            total_modules - dark_modules,
            dark_modules * 100 / total_modules
        );

        Ok(qr)
    }
}
