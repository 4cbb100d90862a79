//! Reads ESRI ".shp" Shapefile, as per
//! https://www.esri.com/library/whitepapers/pdfs/shapefile.pdf
//!
//! Only the 2D shape types (Point, PolyLine, Polygon, MultiPoint) produce
//! geometries. Null records and every other known or unknown shape type are
//! skipped.
use std::error;
use std::fmt;
use std::io;
use std::io::Read;
use std::path::Path;
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use itertools::Itertools;

use super::options::{DecodeOptions, MultiPointCount};
use super::prj::{self, Crs, PrjError};
use super::validate::{self, Validator, WKT_FORMAT};
use super::wkt::{self, Geometry};

pub const SHP_HEADER_LENGTH: u64 = 100;
const SHP_FILE_LENGTH_OFFSET: u64 = 24;
const SHP_SHAPE_TYPE_OFFSET: u64 = 32;
const SHP_RECORD_SHAPE_TYPE_LENGTH: u64 = 4;

#[derive(Debug)]
pub enum ShpError {
    IOError(io::Error),
    Truncated { offset: u64, needed: usize },
    ParseError(String),
    PrjError(PrjError),
}

impl error::Error for ShpError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            ShpError::IOError(ref err) => Some(err),
            ShpError::PrjError(ref err) => Some(err),
            ShpError::Truncated { .. } | ShpError::ParseError(_) => None,
        }
    }
}

impl fmt::Display for ShpError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ShpError::IOError(ref err) => err.fmt(f),
            ShpError::Truncated { offset, needed } => write!(f, "Truncated file: needed {} bytes at offset {}, but the file ends first", needed, offset),
            ShpError::ParseError(ref description) => write!(f, "Parse error: {}", description),
            ShpError::PrjError(ref err) => err.fmt(f),
        }
    }
}

impl From<PrjError> for ShpError {
    fn from(err: PrjError) -> ShpError {
        ShpError::PrjError(err)
    }
}

#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum ShpShapeType {
    Null,
    Point,
    PolyLine,
    Polygon,
    MultiPoint,
    PointZ,
    PolyLineZ,
    PolygonZ,
    MultiPointZ,
    PointM,
    PolyLineM,
    PolygonM,
    MultiPointM,
    MultiPatch,
}

impl ShpShapeType {
    pub fn with_u32(u: u32) -> Option<ShpShapeType> {
        match u {
            0  => Some(ShpShapeType::Null),
            1  => Some(ShpShapeType::Point),
            3  => Some(ShpShapeType::PolyLine),
            5  => Some(ShpShapeType::Polygon),
            8  => Some(ShpShapeType::MultiPoint),
            11 => Some(ShpShapeType::PointZ),
            13 => Some(ShpShapeType::PolyLineZ),
            15 => Some(ShpShapeType::PolygonZ),
            18 => Some(ShpShapeType::MultiPointZ),
            21 => Some(ShpShapeType::PointM),
            23 => Some(ShpShapeType::PolyLineM),
            25 => Some(ShpShapeType::PolygonM),
            28 => Some(ShpShapeType::MultiPointM),
            31 => Some(ShpShapeType::MultiPatch),
            _ => None,
        }
    }

    /// The name GIS tools print for this shape type.
    pub fn name(&self) -> &'static str {
        match *self {
            ShpShapeType::Null => "Null Shape",
            ShpShapeType::Point => "Point",
            ShpShapeType::PolyLine => "PolyLine",
            ShpShapeType::Polygon => "Polygon",
            ShpShapeType::MultiPoint => "MultiPoint",
            ShpShapeType::PointZ => "PointZ",
            ShpShapeType::PolyLineZ => "PolyLineZ",
            ShpShapeType::PolygonZ => "PolygonZ",
            ShpShapeType::MultiPointZ => "MultiPointZ",
            ShpShapeType::PointM => "PointM",
            ShpShapeType::PolyLineM => "PolyLineM",
            ShpShapeType::PolygonM => "PolygonM",
            ShpShapeType::MultiPointM => "MultiPointM",
            ShpShapeType::MultiPatch => "MultiPatch",
        }
    }
}

/// A shape type as found in the file: the raw code, plus the type it means
/// (`None` when the code is not one we know).
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct ShpShapeKind {
    pub code: u32,
    pub shape_type: Option<ShpShapeType>,
}

impl ShpShapeKind {
    pub fn with_u32(code: u32) -> ShpShapeKind {
        ShpShapeKind {
            code: code,
            shape_type: ShpShapeType::with_u32(code),
        }
    }

    pub fn name(&self) -> Option<&'static str> {
        self.shape_type.map(|t| t.name())
    }
}

#[derive(Debug,Copy,Clone,PartialEq)]
pub struct ShpBoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl ShpBoundingBox {
    /// The degenerate box around a single point.
    pub fn around(point: ShpPoint) -> ShpBoundingBox {
        ShpBoundingBox {
            xmin: point.0,
            ymin: point.1,
            xmax: point.0,
            ymax: point.1,
        }
    }
}

#[derive(Debug,Clone,Copy,PartialEq,PartialOrd)]
pub struct ShpPoint(pub f64, pub f64);

/// A contiguous run of points in a PolyLine or Polygon record.
///
/// For Polygons this is a ring, but we don't care whether it's an outer ring
/// or a hole.
#[derive(Debug,Clone,PartialEq)]
pub struct ShpPart(pub Box<[ShpPoint]>);

/// The decoded payload of one record.
#[derive(Debug,Clone,PartialEq)]
pub enum ShpShape {
    Point(ShpPoint),
    MultiPoint {
        bounding_box: ShpBoundingBox,
        points: Box<[ShpPoint]>,
    },
    PolyLine {
        bounding_box: ShpBoundingBox,
        parts: Box<[ShpPart]>,
    },
    Polygon {
        bounding_box: ShpBoundingBox,
        parts: Box<[ShpPart]>,
    },
}

#[derive(Debug,Copy,Clone,PartialEq)]
pub struct ShpHeader {
    /// File length as written in the header: a count of 16-bit words.
    pub file_length: u32,
    pub shape_kind: ShpShapeKind,
    pub bounding_box: ShpBoundingBox,
    pub crs: Crs,
}

impl ShpHeader {
    pub fn file_n_bytes(&self) -> u64 {
        self.file_length as u64 * 2
    }
}

#[derive(Debug,Clone,PartialEq)]
pub struct ShpRecord {
    pub record_number: u32,
    pub shape_kind: ShpShapeKind,
    pub shape: ShpShape,
    pub geometry: Geometry,
}

/// A byte source plus the offset we've read up to.
///
/// Every read either reads all the bytes it asks for or fails. A short read
/// is `ShpError::Truncated`, never end-of-file.
#[derive(Debug)]
struct ShpCursor<R> {
    file: R,
    offset: u64,
}

impl<R: io::BufRead + io::Seek> ShpCursor<R> {
    fn seek(&mut self, offset: u64) -> Result<(), ShpError> {
        self.file.seek(io::SeekFrom::Start(offset)).map_err(ShpError::IOError)?;
        self.offset = offset;
        Ok(())
    }

    /// True iff there are no more bytes. Only meaningful between records.
    fn at_end(&mut self) -> Result<bool, ShpError> {
        self.file.fill_buf()
            .map(|buf| buf.is_empty())
            .map_err(ShpError::IOError)
    }

    fn consumed<T>(&mut self, result: io::Result<T>, n_bytes: usize) -> Result<T, ShpError> {
        match result {
            Ok(value) => {
                self.offset += n_bytes as u64;
                Ok(value)
            }
            Err(ref err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                Err(ShpError::Truncated { offset: self.offset, needed: n_bytes })
            }
            Err(err) => Err(ShpError::IOError(err)),
        }
    }

    fn read_u32_be(&mut self) -> Result<u32, ShpError> {
        let r = self.file.read_u32::<BigEndian>();
        self.consumed(r, 4)
    }

    fn read_u32_le(&mut self) -> Result<u32, ShpError> {
        let r = self.file.read_u32::<LittleEndian>();
        self.consumed(r, 4)
    }

    fn read_f64_le(&mut self) -> Result<f64, ShpError> {
        let r = self.file.read_f64::<LittleEndian>();
        self.consumed(r, 8)
    }

    fn skip(&mut self, n_bytes: u64) -> Result<(), ShpError> {
        let copied = io::copy(&mut (&mut self.file).take(n_bytes), &mut io::sink()).map_err(ShpError::IOError)?;
        if copied < n_bytes {
            self.offset += copied;
            Err(ShpError::Truncated { offset: self.offset, needed: (n_bytes - copied) as usize })
        } else {
            self.offset += n_bytes;
            Ok(())
        }
    }

    fn read_point(&mut self) -> Result<ShpPoint, ShpError> {
        let x = self.read_f64_le()?;
        let y = self.read_f64_le()?;
        Ok(ShpPoint(x, y))
    }

    fn read_bounding_box(&mut self) -> Result<ShpBoundingBox, ShpError> {
        Ok(ShpBoundingBox {
            xmin: self.read_f64_le()?,
            ymin: self.read_f64_le()?,
            xmax: self.read_f64_le()?,
            ymax: self.read_f64_le()?,
        })
    }
}

/// Reads the file length, shape type and bounding box from the header, and
/// the CRS from the ".prj" next to `shp_path` (if there is a path).
///
/// Side-effect: leaves the file cursor at byte 68, just past the bounding box.
fn read_shp_header<R: io::BufRead + io::Seek>(cursor: &mut ShpCursor<R>, shp_path: Option<&Path>, options: &DecodeOptions) -> Result<ShpHeader, ShpError> {
    cursor.seek(SHP_FILE_LENGTH_OFFSET)?;
    let file_length = cursor.read_u32_be()?;

    cursor.seek(SHP_SHAPE_TYPE_OFFSET)?;
    let shape_kind = ShpShapeKind::with_u32(cursor.read_u32_le()?);
    let bounding_box = cursor.read_bounding_box()?;

    let crs = match shp_path {
        Some(path) => prj::resolve(path, options.prj_encoding)?,
        None => Crs::Undefined,
    };

    Ok(ShpHeader {
        file_length: file_length,
        shape_kind: shape_kind,
        bounding_box: bounding_box,
        crs: crs,
    })
}

/// Reads the bounding box, part indices and points shared by PolyLine and
/// Polygon records, and splits the points into parts.
fn read_parts<R: io::BufRead + io::Seek>(cursor: &mut ShpCursor<R>, record_number: u32) -> Result<(ShpBoundingBox, Box<[ShpPart]>), ShpError> {
    let bounding_box = cursor.read_bounding_box()?;
    let num_parts = cursor.read_u32_le()? as usize;
    let num_points = cursor.read_u32_le()? as usize;

    if num_parts == 0 {
        return Err(ShpError::ParseError(format!("Record number {} has no parts", record_number)));
    }

    // The file holds part starts; the last part ends where the points end.
    let mut part_starts = Vec::<usize>::new();
    for _ in 0..num_parts {
        part_starts.push(cursor.read_u32_le()? as usize);
    }
    part_starts.push(num_points);

    let mut points = Vec::<ShpPoint>::new();
    for _ in 0..num_points {
        points.push(cursor.read_point()?);
    }

    let mut parts = Vec::<ShpPart>::with_capacity(num_parts);
    for (&part_start, &part_end) in part_starts.iter().tuple_windows() {
        if part_start > part_end || part_end > points.len() {
            return Err(ShpError::ParseError(format!("Record number {} has a part with points {}-{}, but there are only {} points in the record", record_number, part_start, part_end, num_points)));
        }
        parts.push(ShpPart(points[part_start .. part_end].to_vec().into_boxed_slice()));
    }

    Ok((bounding_box, parts.into_boxed_slice()))
}

fn read_multi_point<R: io::BufRead + io::Seek>(cursor: &mut ShpCursor<R>, record_number: u32, count: MultiPointCount) -> Result<ShpShape, ShpError> {
    let bounding_box = cursor.read_bounding_box()?;

    let num_points = match count {
        MultiPointCount::Legacy => {
            let n = cursor.read_f64_le()?;
            if !n.is_finite() || n < 0. || n > u32::max_value() as f64 {
                return Err(ShpError::ParseError(format!("Record number {} has an invalid point count {}", record_number, n)));
            }
            n.ceil() as usize
        }
        MultiPointCount::Standard => cursor.read_u32_le()? as usize,
    };

    if num_points == 0 {
        return Err(ShpError::ParseError(format!("Record number {} has no points", record_number)));
    }

    let mut points = Vec::<ShpPoint>::new();
    for _ in 0..num_points {
        points.push(cursor.read_point()?);
    }

    Ok(ShpShape::MultiPoint {
        bounding_box: bounding_box,
        points: points.into_boxed_slice(),
    })
}

/// Reads the next record from the file. Returns `None` for the shape (but
/// still consumes the record) when the record's type has no geometry.
///
/// Side effect: advances the file cursor to the next record.
fn read_record<R: io::BufRead + io::Seek>(cursor: &mut ShpCursor<R>, options: &DecodeOptions) -> Result<(u32, ShpShapeKind, Option<ShpShape>), ShpError> {
    let record_number = cursor.read_u32_be()?;
    let content_length = cursor.read_u32_be()?;
    let shape_kind = ShpShapeKind::with_u32(cursor.read_u32_le()?);

    let shape = match shape_kind.shape_type {
        Some(ShpShapeType::Point) => Some(ShpShape::Point(cursor.read_point()?)),
        Some(ShpShapeType::PolyLine) => {
            let (bounding_box, parts) = read_parts(cursor, record_number)?;
            Some(ShpShape::PolyLine { bounding_box: bounding_box, parts: parts })
        }
        Some(ShpShapeType::Polygon) => {
            let (bounding_box, parts) = read_parts(cursor, record_number)?;
            Some(ShpShape::Polygon { bounding_box: bounding_box, parts: parts })
        }
        Some(ShpShapeType::MultiPoint) => Some(read_multi_point(cursor, record_number, options.multipoint_count)?),
        Some(ShpShapeType::Null) => {
            // No payload, whatever the content length says.
            trace!("Skipping null record number {}", record_number);
            None
        }
        _ => {
            // We can't parse the payload, so we trust the record header to
            // tell us where the next record starts.
            let n_bytes = (content_length as u64 * 2).saturating_sub(SHP_RECORD_SHAPE_TYPE_LENGTH);
            cursor.skip(n_bytes)?;
            trace!("Skipping record number {} with shape type {} ({:?})", record_number, shape_kind.code, shape_kind.name());
            None
        }
    };

    Ok((record_number, shape_kind, shape))
}

/// Reads an ESRI ".shp" Shapefile, following instructions at
/// https://www.esri.com/library/whitepapers/pdfs/shapefile.pdf
///
/// Iterating yields every record that has a geometry, in file order. After
/// the first error, iteration stops.
///
/// # Example
///
/// ```
/// use std::fs;
/// use std::io;
/// use shpwkt::read::shapefile::shp::ShpReader;
///
/// # let mut path = std::env::current_dir().unwrap();
/// # path.push("test/read/shapefile/shp/polygons.shp");
///
/// let f = fs::File::open(&path).unwrap();
/// let r = io::BufReader::new(f);
///
/// // builder returns Result<ShpReader, ShpError>
/// let mut shp_reader = ShpReader::new(r, Some(path.as_path())).unwrap();
///
/// assert_eq!(420, shp_reader.header.file_n_bytes());
/// assert_eq!(Some("Polygon"), shp_reader.header.shape_kind.name());
/// assert_eq!(4674, shp_reader.header.crs.code());
///
/// // shp_reader.next(), an Iterator method, returns
/// // Option<Result<ShpRecord, ShpError>>
/// let record = shp_reader.next().unwrap().unwrap();
///
/// assert_eq!(1, record.geometry.n_parts);
/// assert!(record.geometry.text.starts_with("POLYGON(0.0000000000000 0.0000000000000, "));
/// ```
#[derive(Debug)]
pub struct ShpReader<R> {
    cursor: ShpCursor<R>,
    pub header: ShpHeader,
    options: DecodeOptions,
    validator: Box<dyn Validator>,
    done: bool,
}

impl<R: io::BufRead + io::Seek> ShpReader<R> {
    /// Reads the header. `shp_path` is only used to find the ".prj" file;
    /// pass `None` for a CRS of `Crs::Undefined`.
    pub fn new(file: R, shp_path: Option<&Path>) -> Result<ShpReader<R>, ShpError> {
        ShpReader::with_options(file, shp_path, DecodeOptions::default())
    }

    pub fn with_options(file: R, shp_path: Option<&Path>, mut options: DecodeOptions) -> Result<ShpReader<R>, ShpError> {
        let mut cursor = ShpCursor { file: file, offset: 0 };
        let header = read_shp_header(&mut cursor, shp_path, &options)?;
        debug!("Read shapefile header: {:?}", header);

        cursor.seek(SHP_HEADER_LENGTH)?;

        let validator = options.validator.take().unwrap_or_else(validate::default_validator);
        if !validator.is_available() {
            warn!("No geometry validator is available; geometries will not be validated");
        }

        Ok(ShpReader {
            cursor: cursor,
            header: header,
            options: options,
            validator: validator,
            done: false,
        })
    }

    /// Reads every remaining record. Fails if any record fails: there are no
    /// partial results.
    pub fn read_all(self) -> Result<super::Shapefile, ShpError> {
        let header = self.header;
        let records = self.collect::<Result<Vec<_>, _>>()?;
        Ok(super::Shapefile {
            header: header,
            records: records,
        })
    }

    fn read_next(&mut self) -> Result<Option<ShpRecord>, ShpError> {
        if self.cursor.at_end()? {
            self.done = true;
            return Ok(None);
        }

        let (record_number, shape_kind, shape) = read_record(&mut self.cursor, &self.options)?;

        Ok(shape.map(|shape| {
            let mut geometry = wkt::assemble(&shape, self.options.sdo_ordinates);
            if let Some(validity) = self.validator.check(&geometry.text, WKT_FORMAT) {
                geometry.merge_validity(validity);
            }

            ShpRecord {
                record_number: record_number,
                shape_kind: shape_kind,
                shape: shape,
                geometry: geometry,
            }
        }))
    }
}

impl<R: io::BufRead + io::Seek> Iterator for ShpReader<R> {
    type Item = Result<ShpRecord, ShpError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.read_next() {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => {}
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
        None
    }
}
