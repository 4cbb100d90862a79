use std::fmt;
use encoding;
use encoding::EncodingRef;

use super::validate::Validator;

/// How a MultiPoint record stores its point count.
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum MultiPointCount {
    /// An 8-byte little-endian double. This is what the files our consumers
    /// produce have always been read with.
    Legacy,
    /// A 4-byte little-endian integer, as in the ESRI whitepaper.
    Standard,
}

impl Default for MultiPointCount {
    fn default() -> MultiPointCount {
        MultiPointCount::Legacy
    }
}

/// Knobs for `ShpReader::with_options()`.
///
/// # Example
///
/// ```
/// # extern crate encoding;
/// # extern crate shpwkt;
///
/// # fn main() {
/// use shpwkt::read::shapefile::{DecodeOptions, MultiPointCount, NoValidator};
///
/// let options = DecodeOptions::default()
///     .prj_encoding(encoding::all::UTF_8)
///     .multipoint_count(MultiPointCount::Standard)
///     .sdo_ordinates(true)
///     .validator(Box::new(NoValidator));
/// assert!(options.sdo_ordinates);
/// # }
/// ```
pub struct DecodeOptions {
    /// Encoding of the ".prj" file.
    pub prj_encoding: EncodingRef,
    pub multipoint_count: MultiPointCount,
    /// Also write Oracle SDO ordinates for Polygons.
    pub sdo_ordinates: bool,
    /// `None` means `validate::default_validator()`.
    pub validator: Option<Box<dyn Validator>>,
}

impl DecodeOptions {
    pub fn prj_encoding(mut self, encoding: EncodingRef) -> DecodeOptions {
        self.prj_encoding = encoding;
        self
    }

    pub fn multipoint_count(mut self, count: MultiPointCount) -> DecodeOptions {
        self.multipoint_count = count;
        self
    }

    pub fn sdo_ordinates(mut self, sdo_ordinates: bool) -> DecodeOptions {
        self.sdo_ordinates = sdo_ordinates;
        self
    }

    pub fn validator(mut self, validator: Box<dyn Validator>) -> DecodeOptions {
        self.validator = Some(validator);
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> DecodeOptions {
        DecodeOptions {
            prj_encoding: encoding::all::WINDOWS_1252,
            multipoint_count: MultiPointCount::default(),
            sdo_ordinates: false,
            validator: None,
        }
    }
}

// encoding::EncodingRef does not implement std::fmt::Debug
impl fmt::Debug for DecodeOptions {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("DecodeOptions")
            .field("prj_encoding", &self.prj_encoding.name())
            .field("multipoint_count", &self.multipoint_count)
            .field("sdo_ordinates", &self.sdo_ordinates)
            .field("validator", &self.validator)
            .finish()
    }
}
