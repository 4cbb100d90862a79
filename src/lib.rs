extern crate byteorder;
extern crate encoding;
extern crate itertools;
#[macro_use] extern crate lazy_static;
#[macro_use] extern crate log;
extern crate regex;

#[cfg(feature = "validate")] extern crate geo_types;
#[cfg(feature = "validate")] extern crate wkt;

pub mod read;

pub use read::shapefile::{decode, open, Crs, Geometry, Shapefile, ShpError, ShpHeader, ShpReader, ShpRecord};
