use std::fs;
use std::io;
use std::path::Path;
use super::options::DecodeOptions;
use super::shp::{ShpError, ShpHeader, ShpReader, ShpRecord};

/// Everything in a ".shp" file: the header, and every record that has a
/// geometry, in file order.
#[derive(Debug,Clone,PartialEq)]
pub struct Shapefile {
    pub header: ShpHeader,
    pub records: Vec<ShpRecord>,
}

/// Open by ".shp" filename.
///
/// This looks for an accompanying ".prj"; if there is none, the CRS is
/// `Crs::Undefined`. If there is one we can't understand, this fails.
///
/// # Example
///
/// ```
/// use shpwkt::read::shapefile::shapefile;
///
/// # let mut path = std::env::current_dir().unwrap();
/// # path.push("test/read/shapefile/shp/points.shp");
/// let reader = shapefile::open(&path).unwrap();
///
/// for record in reader {
///     // record is a Result<ShpRecord, ShpError>
///     println!("{}", record.unwrap().geometry.text);
/// }
/// ```
pub fn open(shp_path: &Path) -> Result<ShpReader<io::BufReader<fs::File>>, ShpError> {
    open_with_options(shp_path, DecodeOptions::default())
}

pub fn open_with_options(shp_path: &Path, options: DecodeOptions) -> Result<ShpReader<io::BufReader<fs::File>>, ShpError> {
    match fs::File::open(shp_path) {
        Err(err) => Err(ShpError::IOError(err)),
        Ok(f) => {
            let r = io::BufReader::new(f);
            ShpReader::with_options(r, Some(shp_path), options)
        }
    }
}

/// Reads a whole ".shp" file. Any error means no records at all.
///
/// # Example
///
/// ```
/// use shpwkt::read::shapefile::shapefile;
///
/// # let mut path = std::env::current_dir().unwrap();
/// # path.push("test/read/shapefile/shp/points.shp");
/// let shp = shapefile::decode(&path).unwrap();
///
/// assert_eq!(Some("Point"), shp.header.shape_kind.name());
/// assert_eq!(4326, shp.header.crs.code());
/// assert_eq!("POINT(1.500000 2.500000)", shp.records[0].geometry.text);
/// ```
pub fn decode(shp_path: &Path) -> Result<Shapefile, ShpError> {
    open(shp_path).and_then(|reader| reader.read_all())
}

pub fn decode_with_options(shp_path: &Path, options: DecodeOptions) -> Result<Shapefile, ShpError> {
    open_with_options(shp_path, options).and_then(|reader| reader.read_all())
}
