//! Builds ".shp" bytes in memory.
#![allow(dead_code)]

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

pub const NULL: u32 = 0;
pub const POINT: u32 = 1;
pub const POLYLINE: u32 = 3;
pub const POLYGON: u32 = 5;
pub const MULTIPOINT: u32 = 8;
pub const POINTZ: u32 = 11;

pub struct ShpBuilder {
    shape_type: u32,
    bounding_box: [f64; 4],
    records: Vec<u8>,
    n_records: u32,
}

impl ShpBuilder {
    pub fn new(shape_type: u32) -> ShpBuilder {
        ShpBuilder {
            shape_type: shape_type,
            bounding_box: [0., 0., 10., 10.],
            records: Vec::new(),
            n_records: 0,
        }
    }

    pub fn bounding_box(mut self, xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> ShpBuilder {
        self.bounding_box = [xmin, ymin, xmax, ymax];
        self
    }

    /// Appends a record whose content is the shape type plus `payload`.
    pub fn record(mut self, shape_type: u32, payload: &[u8]) -> ShpBuilder {
        self.n_records += 1;
        let content_length = (4 + payload.len()) / 2;
        self.records.write_u32::<BigEndian>(self.n_records).unwrap();
        self.records.write_u32::<BigEndian>(content_length as u32).unwrap();
        self.records.write_u32::<LittleEndian>(shape_type).unwrap();
        self.records.extend_from_slice(payload);
        self
    }

    pub fn null(self) -> ShpBuilder {
        self.record(NULL, &[])
    }

    pub fn point(self, x: f64, y: f64) -> ShpBuilder {
        let mut payload = Vec::new();
        payload.write_f64::<LittleEndian>(x).unwrap();
        payload.write_f64::<LittleEndian>(y).unwrap();
        self.record(POINT, &payload)
    }

    /// A PolyLine or Polygon with one part per slice.
    pub fn parts(self, shape_type: u32, parts: &[&[(f64, f64)]]) -> ShpBuilder {
        let points: Vec<(f64, f64)> = parts.iter().flat_map(|part| part.iter().cloned()).collect();
        let mut payload = Vec::new();
        write_bounding_box(&mut payload, &points);
        payload.write_u32::<LittleEndian>(parts.len() as u32).unwrap();
        payload.write_u32::<LittleEndian>(points.len() as u32).unwrap();
        let mut start = 0;
        for part in parts {
            payload.write_u32::<LittleEndian>(start).unwrap();
            start += part.len() as u32;
        }
        for &(x, y) in &points {
            payload.write_f64::<LittleEndian>(x).unwrap();
            payload.write_f64::<LittleEndian>(y).unwrap();
        }
        self.record(shape_type, &payload)
    }

    /// A MultiPoint whose count is an 8-byte double.
    pub fn legacy_multi_point(self, points: &[(f64, f64)]) -> ShpBuilder {
        let mut payload = Vec::new();
        write_bounding_box(&mut payload, points);
        payload.write_f64::<LittleEndian>(points.len() as f64).unwrap();
        for &(x, y) in points {
            payload.write_f64::<LittleEndian>(x).unwrap();
            payload.write_f64::<LittleEndian>(y).unwrap();
        }
        self.record(MULTIPOINT, &payload)
    }

    pub fn build(self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.write_u32::<BigEndian>(9994).unwrap();
        for _ in 0..5 {
            buf.write_u32::<BigEndian>(0).unwrap();
        }
        buf.write_u32::<BigEndian>(((100 + self.records.len()) / 2) as u32).unwrap();
        buf.write_u32::<LittleEndian>(1000).unwrap();
        buf.write_u32::<LittleEndian>(self.shape_type).unwrap();
        for &v in &self.bounding_box {
            buf.write_f64::<LittleEndian>(v).unwrap();
        }
        for _ in 0..4 {
            buf.write_f64::<LittleEndian>(0.).unwrap();
        }
        buf.extend_from_slice(&self.records);
        buf
    }
}

fn write_bounding_box(buf: &mut Vec<u8>, points: &[(f64, f64)]) {
    let xs = points.iter().map(|p| p.0);
    let ys = points.iter().map(|p| p.1);
    buf.write_f64::<LittleEndian>(xs.clone().fold(::std::f64::INFINITY, f64::min)).unwrap();
    buf.write_f64::<LittleEndian>(ys.clone().fold(::std::f64::INFINITY, f64::min)).unwrap();
    buf.write_f64::<LittleEndian>(xs.fold(::std::f64::NEG_INFINITY, f64::max)).unwrap();
    buf.write_f64::<LittleEndian>(ys.fold(::std::f64::NEG_INFINITY, f64::max)).unwrap();
}
