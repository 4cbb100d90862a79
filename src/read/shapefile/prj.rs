//! Reads the ".prj" file that sits next to a ".shp" file.
//!
//! No file format can represent all the projections out there in the world,
//! and we don't try. We recognize two geographic coordinate systems, WGS 84
//! and SIRGAS 2000, by the names ESRI writes or the EPSG codes OGC writes.
//! Anything else is an error.
use std::error;
use std::fmt;
use std::fs;
use std::io;
use std::io::{BufRead, Read};
use std::path::{Path, PathBuf};
use encoding::{DecoderTrap, EncodingRef};
use regex::Regex;

// fgets() limit in the tools that first wrote these files
const PRJ_LINE_LIMIT: u64 = 4096;

const PRJ_EXTENSIONS: [&'static str; 2] = ["prj", "PRJ"];

lazy_static! {
    static ref GEOGCS: Regex = Regex::new(r"(?i)^GEOGCS").unwrap();
    static ref PROJCS: Regex = Regex::new(r"(?i)^PROJCS").unwrap();

    // First match wins.
    static ref DATUMS: [(Crs, Regex); 2] = [
        (Crs::Wgs84, Regex::new(r#"(?i)(?:D|GCS)_WGS_1984|AUTHORITY\["EPSG",\s*"4326"\]"#).unwrap()),
        (Crs::Sirgas2000, Regex::new(r#"(?i)(?:D|GCS)_SIRGAS_2000|AUTHORITY\["EPSG",\s*"4674"\]"#).unwrap()),
    ];
}

/// A coordinate reference system we know how to handle.
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum Crs {
    /// EPSG:4326
    Wgs84,
    /// EPSG:4674
    Sirgas2000,
    /// There is no ".prj" file.
    Undefined,
}

impl Crs {
    /// The EPSG code, or -1 for `Undefined`.
    pub fn code(&self) -> i32 {
        match *self {
            Crs::Wgs84 => 4326,
            Crs::Sirgas2000 => 4674,
            Crs::Undefined => -1,
        }
    }

    pub fn with_code(code: i32) -> Option<Crs> {
        match code {
            4326 => Some(Crs::Wgs84),
            4674 => Some(Crs::Sirgas2000),
            -1 => Some(Crs::Undefined),
            _ => None,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Crs::Undefined => write!(f, "undefined"),
            _ => write!(f, "EPSG:{}", self.code()),
        }
    }
}

#[derive(Debug)]
pub enum PrjError {
    IOError(io::Error),
    DecodeError(String),
    /// A GEOGCS we don't recognize.
    UnrecognizedProjection(String),
    /// A PROJCS: UTM, Polyconic and so on.
    ProjectedUnsupported(String),
    /// Neither GEOGCS nor PROJCS.
    UnsupportedSystem(String),
}

impl error::Error for PrjError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            PrjError::IOError(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for PrjError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PrjError::IOError(ref err) => err.fmt(f),
            PrjError::DecodeError(ref description) => write!(f, "Could not decode .prj file: {}", description),
            PrjError::UnrecognizedProjection(ref wkt) => write!(f, "Unrecognized projection: {}", wkt),
            PrjError::ProjectedUnsupported(_) => write!(f, "Projected coordinate systems (UTM, Polyconic, ...) are not supported yet"),
            PrjError::UnsupportedSystem(_) => write!(f, "Only geographic WGS 84 and SIRGAS 2000 are supported"),
        }
    }
}

/// Finds the ".prj" file for `shp_path`, if it exists.
pub fn sidecar_path(shp_path: &Path) -> Option<PathBuf> {
    PRJ_EXTENSIONS.iter()
        .map(|ext| shp_path.with_extension(ext))
        .find(|path| path.is_file())
}

/// Classifies the first line of a ".prj" file.
pub fn classify(line: &str) -> Result<Crs, PrjError> {
    let line = line.trim_start_matches('\u{feff}').trim();

    if GEOGCS.is_match(line) {
        DATUMS.iter()
            .find(|&&(_, ref re)| re.is_match(line))
            .map(|&(crs, _)| crs)
            .ok_or_else(|| PrjError::UnrecognizedProjection(line.to_string()))
    } else if PROJCS.is_match(line) {
        Err(PrjError::ProjectedUnsupported(line.to_string()))
    } else {
        Err(PrjError::UnsupportedSystem(line.to_string()))
    }
}

fn read_first_line(path: &Path, encoding: EncodingRef) -> Result<String, PrjError> {
    let f = fs::File::open(path).map_err(PrjError::IOError)?;
    let mut buf = Vec::<u8>::new();
    io::BufReader::new(f).take(PRJ_LINE_LIMIT).read_until(b'\n', &mut buf).map_err(PrjError::IOError)?;

    encoding.decode(&buf, DecoderTrap::Replace)
        .map_err(|err| PrjError::DecodeError(err.into_owned()))
}

/// Resolves the CRS of the Shapefile at `shp_path`.
///
/// Returns `Crs::Undefined` when there is no ".prj" file.
///
/// # Example
///
/// ```
/// # extern crate encoding;
/// # extern crate shpwkt;
///
/// # fn main() {
/// use shpwkt::read::shapefile::prj;
///
/// # let mut path = std::env::current_dir().unwrap();
/// # path.push("test/read/shapefile/shp/points.shp");
/// let crs = prj::resolve(&path, encoding::all::UTF_8).unwrap();
/// assert_eq!(4326, crs.code());
/// # }
/// ```
pub fn resolve(shp_path: &Path, encoding: EncodingRef) -> Result<Crs, PrjError> {
    match sidecar_path(shp_path) {
        None => Ok(Crs::Undefined),
        Some(prj_path) => {
            let line = read_first_line(&prj_path, encoding)?;
            let crs = classify(&line)?;
            debug!("Resolved {} from {}", crs, prj_path.display());
            Ok(crs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ESRI_WGS84: &'static str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;
    const ESRI_SIRGAS: &'static str = r#"GEOGCS["GCS_SIRGAS_2000",DATUM["D_SIRGAS_2000",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;
    const OGC_WGS84: &'static str = r#"GEOGCS["WGS 84",DATUM["WGS 84",SPHEROID["WGS 84",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433],AUTHORITY["EPSG","4326"]]"#;
    const OGC_SIRGAS: &'static str = r#"GEOGCS["SIRGAS 2000",DATUM["Sistema de Referencia Geocentrico para las AmericaS 2000",SPHEROID["GRS 1980",6378137,298.257222101]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433],AUTHORITY["EPSG","4674"]]"#;

    #[test]
    fn esri_names() {
        assert_eq!(Crs::Wgs84, classify(ESRI_WGS84).unwrap());
        assert_eq!(Crs::Sirgas2000, classify(ESRI_SIRGAS).unwrap());
    }

    #[test]
    fn epsg_authorities() {
        assert_eq!(Crs::Wgs84, classify(OGC_WGS84).unwrap());
        assert_eq!(Crs::Sirgas2000, classify(OGC_SIRGAS).unwrap());
    }

    #[test]
    fn case_and_whitespace_do_not_matter() {
        assert_eq!(Crs::Wgs84, classify("  geogcs[\"gcs_wgs_1984\"]\r\n").unwrap());
        assert_eq!(Crs::Sirgas2000, classify("\u{feff}GEOGCS[\"x\",DATUM[\"d_sirgas_2000\"]]").unwrap());
    }

    #[test]
    fn unknown_geographic_system() {
        match classify(r#"GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983"]]"#) {
            Err(PrjError::UnrecognizedProjection(ref wkt)) => assert!(wkt.contains("North_American")),
            other => panic!("expected UnrecognizedProjection, got {:?}", other),
        }
    }

    #[test]
    fn projected_system() {
        match classify(r#"PROJCS["SIRGAS_2000_UTM_Zone_23S",GEOGCS["GCS_SIRGAS_2000"]]"#) {
            Err(PrjError::ProjectedUnsupported(_)) => {}
            other => panic!("expected ProjectedUnsupported, got {:?}", other),
        }
    }

    #[test]
    fn something_else() {
        match classify("COMPD_CS[\"whatever\"]") {
            Err(PrjError::UnsupportedSystem(_)) => {}
            other => panic!("expected UnsupportedSystem, got {:?}", other),
        }
    }

    #[test]
    fn codes() {
        assert_eq!(4326, Crs::Wgs84.code());
        assert_eq!(4674, Crs::Sirgas2000.code());
        assert_eq!(-1, Crs::Undefined.code());
        assert_eq!(Some(Crs::Sirgas2000), Crs::with_code(4674));
        assert_eq!(None, Crs::with_code(31983));
    }
}
