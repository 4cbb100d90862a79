//! Reads ".shp" files and turns their shapes into WKT.
//!
//! There are two pieces of information ".shp" files _don't_ contain:
//!
//! * The _projection_ isn't specified. Sometimes there's a ".prj" file that
//!   contains that information, but no file format can represent all the
//!   projections out there in the world. This library recognizes geographic
//!   WGS 84 and SIRGAS 2000, reports `Crs::Undefined` when there is no
//!   ".prj", and fails on anything else.
//! * Record _attributes_ live in the ".dbf" file. This library ignores it.
//!
//! # Examples
//!
//! Open by ".shp" filename:
//!
//! ```
//! use shpwkt::read::shapefile;
//!
//! # let mut path = std::env::current_dir().unwrap();
//! # path.push("test/read/shapefile/shp/lines.shp");
//! let reader = shapefile::open(&path).unwrap();
//!
//! for record in reader {
//!     // record is a Result<ShpRecord, ShpError>
//!     println!("{:?}", record.unwrap().geometry);
//! }
//! ```
//!
//! Open by `io::BufRead + io::Seek` implementor, with options:
//!
//! ```
//! use std::fs;
//! use std::io;
//! use shpwkt::read::shapefile;
//!
//! # let mut path = std::env::current_dir().unwrap();
//! # path.push("test/read/shapefile/shp/polygons.shp");
//! let shp_r = io::BufReader::new(fs::File::open(&path).unwrap());
//! let options = shapefile::DecodeOptions::default().sdo_ordinates(true);
//!
//! let reader = shapefile::ShpReader::with_options(shp_r, Some(path.as_path()), options).unwrap();
//!
//! for record in reader {
//!     let record = record.unwrap();
//!     println!("{} / {}", record.geometry.text, record.geometry.sdo.unwrap());
//! }
//! ```
//!
//! Read everything at once:
//!
//! ```
//! use shpwkt::read::shapefile;
//!
//! # let mut path = std::env::current_dir().unwrap();
//! # path.push("test/read/shapefile/shp/polygons.shp");
//! let shp = shapefile::decode(&path).unwrap();
//!
//! assert_eq!(2, shp.records.len());
//! assert!(shp.records[1].geometry.text.starts_with("MULTIPOLYGON(((0.0000000000000 0.0000000000000, "));
//! ```

use std::fs;
use std::io;
use std::path::Path;
use encoding;

pub mod options;
pub mod prj;
pub mod shapefile;
pub mod shp;
pub mod validate;
pub mod wkt;

pub use self::options::{DecodeOptions, MultiPointCount};
pub use self::prj::{Crs, PrjError};
pub use self::shp::{ShpBoundingBox, ShpError, ShpHeader, ShpPart, ShpPoint, ShpReader, ShpRecord, ShpShape, ShpShapeKind, ShpShapeType};
pub use self::shapefile::{decode, decode_with_options, open, open_with_options, Shapefile};
pub use self::validate::{NoValidator, Validator, Validity};
#[cfg(feature = "validate")]
pub use self::validate::WktValidator;
pub use self::wkt::Geometry;

/// Opens a ".shp" whose ".prj" is UTF-8.
pub fn open_utf8(shp_path: &Path) -> Result<ShpReader<io::BufReader<fs::File>>, ShpError> {
    open_with_options(shp_path, DecodeOptions::default().prj_encoding(encoding::all::UTF_8))
}

/// Opens a ".shp" whose ".prj" is Windows-1252, the encoding ESRI tools write.
pub fn open_windows1252(shp_path: &Path) -> Result<ShpReader<io::BufReader<fs::File>>, ShpError> {
    open_with_options(shp_path, DecodeOptions::default().prj_encoding(encoding::all::WINDOWS_1252))
}
