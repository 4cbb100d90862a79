//! Turns decoded shapes into WKT-like text.
//!
//! The text is what downstream consumers of this crate have always received,
//! quirks included:
//!
//! * Points and MultiPoints are printed with 6 fractional digits; PolyLines
//!   and Polygons with 13.
//! * A single-part Polygon is printed without its ring parentheses:
//!   `POLYGON(0 0, 0 1, 1 1, 0 0)`.
//! * A multi-part Polygon is printed as a MULTIPOLYGON with one polygon per
//!   part. Holes are not detected.
use itertools::Itertools;

use super::shp::{ShpBoundingBox, ShpPart, ShpPoint, ShpShape};
use super::validate::Validity;

pub const POINT_PRECISION: usize = 6;
pub const PART_PRECISION: usize = 13;

#[derive(Debug,Clone,PartialEq)]
pub struct Geometry {
    pub bounding_box: Option<ShpBoundingBox>,
    /// Number of parts (PolyLine, Polygon) or points (Point, MultiPoint).
    /// Always at least 1: records with no parts or points fail to decode.
    pub n_parts: usize,
    pub text: String,
    /// Oracle SDO ordinates, only for Polygons and only when asked for.
    pub sdo: Option<String>,
    pub validity: Option<Validity>,
}

impl Geometry {
    /// Attaches a validator's verdict. Never changes `text`.
    pub fn merge_validity(&mut self, validity: Validity) {
        self.validity = Some(validity);
    }
}

fn format_point(point: &ShpPoint, precision: usize) -> String {
    format!("{:.*} {:.*}", precision, point.0, precision, point.1)
}

/// Formats the parts of a PolyLine or Polygon.
///
/// With one part, returns one string per point. With several parts, returns
/// one parenthesized string per part.
fn format_parts(parts: &[ShpPart]) -> Vec<String> {
    if parts.len() == 1 {
        parts[0].0.iter().map(|p| format_point(p, PART_PRECISION)).collect()
    } else {
        parts.iter()
            .map(|part| format!("({})", part.0.iter().map(|p| format_point(p, PART_PRECISION)).join(", ")))
            .collect()
    }
}

/// Oracle SDO ordinate list: every separator becomes a comma.
fn format_sdo(formatted_parts: &[String], multi_part: bool) -> String {
    let ordinates = formatted_parts.iter()
        .map(|s| s.replace(", ", ",").replace(" ", ","))
        .join(",");

    if multi_part {
        format!("( {})", ordinates)
    } else {
        ordinates
    }
}

pub fn assemble(shape: &ShpShape, sdo_ordinates: bool) -> Geometry {
    match *shape {
        ShpShape::Point(point) => {
            Geometry {
                bounding_box: Some(ShpBoundingBox::around(point)),
                n_parts: 1,
                text: format!("POINT({})", format_point(&point, POINT_PRECISION)),
                sdo: None,
                validity: None,
            }
        }
        ShpShape::MultiPoint { bounding_box, ref points } => {
            let text = points.iter()
                .map(|p| format!("({})", format_point(p, POINT_PRECISION)))
                .join(", ");

            Geometry {
                bounding_box: Some(bounding_box),
                n_parts: points.len(),
                text: format!("MULTIPOINT({})", text),
                sdo: None,
                validity: None,
            }
        }
        ShpShape::PolyLine { bounding_box, ref parts } => {
            let formatted = format_parts(parts);
            let text = if parts.len() > 1 {
                format!("MULTILINESTRING({})", formatted.join(", "))
            } else {
                format!("LINESTRING({})", formatted.join(", "))
            };

            Geometry {
                bounding_box: Some(bounding_box),
                n_parts: parts.len(),
                text: text,
                sdo: None,
                validity: None,
            }
        }
        ShpShape::Polygon { bounding_box, ref parts } => {
            let formatted = format_parts(parts);
            let text = if parts.len() > 1 {
                format!("MULTIPOLYGON(({}))", formatted.join("), ("))
            } else {
                format!("POLYGON({})", formatted.join(", "))
            };
            let sdo = if sdo_ordinates {
                Some(format_sdo(&formatted, parts.len() > 1))
            } else {
                None
            };

            Geometry {
                bounding_box: Some(bounding_box),
                n_parts: parts.len(),
                text: text,
                sdo: sdo,
                validity: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox() -> ShpBoundingBox {
        ShpBoundingBox { xmin: 0., ymin: 0., xmax: 10., ymax: 10. }
    }

    fn part(points: &[(f64, f64)]) -> ShpPart {
        ShpPart(points.iter().map(|&(x, y)| ShpPoint(x, y)).collect::<Vec<_>>().into_boxed_slice())
    }

    fn square() -> ShpPart {
        part(&[(0., 0.), (0., 1.), (1., 1.), (0., 0.)])
    }

    #[test]
    fn point() {
        let geometry = assemble(&ShpShape::Point(ShpPoint(1.5, -2.25)), false);
        assert_eq!("POINT(1.500000 -2.250000)", geometry.text);
        assert_eq!(1, geometry.n_parts);
        assert_eq!(Some(ShpBoundingBox { xmin: 1.5, ymin: -2.25, xmax: 1.5, ymax: -2.25 }), geometry.bounding_box);
    }

    #[test]
    fn point_rounds_to_six_digits() {
        let geometry = assemble(&ShpShape::Point(ShpPoint(-46.6333333333, -23.5500000001)), false);
        assert_eq!("POINT(-46.633333 -23.550000)", geometry.text);
    }

    #[test]
    fn multi_point() {
        let shape = ShpShape::MultiPoint {
            bounding_box: bbox(),
            points: vec![ShpPoint(1., 2.), ShpPoint(3., 4.)].into_boxed_slice(),
        };
        let geometry = assemble(&shape, false);
        assert_eq!("MULTIPOINT((1.000000 2.000000), (3.000000 4.000000))", geometry.text);
        assert_eq!(2, geometry.n_parts);
    }

    #[test]
    fn single_part_line_string() {
        let shape = ShpShape::PolyLine { bounding_box: bbox(), parts: vec![part(&[(0., 0.), (2.5, 1.)])].into_boxed_slice() };
        let geometry = assemble(&shape, false);
        assert_eq!("LINESTRING(0.0000000000000 0.0000000000000, 2.5000000000000 1.0000000000000)", geometry.text);
        assert_eq!(Some(bbox()), geometry.bounding_box);
    }

    #[test]
    fn multi_part_line_string() {
        let shape = ShpShape::PolyLine {
            bounding_box: bbox(),
            parts: vec![part(&[(0., 0.), (1., 1.)]), part(&[(2., 2.), (3., 3.)])].into_boxed_slice(),
        };
        let geometry = assemble(&shape, false);
        assert_eq!(
            "MULTILINESTRING((0.0000000000000 0.0000000000000, 1.0000000000000 1.0000000000000), (2.0000000000000 2.0000000000000, 3.0000000000000 3.0000000000000))",
            geometry.text
        );
        assert_eq!(2, geometry.n_parts);
    }

    #[test]
    fn single_part_polygon_has_no_ring_parentheses() {
        let shape = ShpShape::Polygon { bounding_box: bbox(), parts: vec![square()].into_boxed_slice() };
        assert_eq!(
            "POLYGON(0.0000000000000 0.0000000000000, 0.0000000000000 1.0000000000000, 1.0000000000000 1.0000000000000, 0.0000000000000 0.0000000000000)",
            assemble(&shape, false).text
        );
    }

    #[test]
    fn multi_part_polygon_is_one_polygon_per_part() {
        let shape = ShpShape::Polygon { bounding_box: bbox(), parts: vec![square(), square()].into_boxed_slice() };
        let ring = "(0.0000000000000 0.0000000000000, 0.0000000000000 1.0000000000000, 1.0000000000000 1.0000000000000, 0.0000000000000 0.0000000000000)";
        assert_eq!(format!("MULTIPOLYGON(({}), ({}))", ring, ring), assemble(&shape, false).text);
    }

    #[test]
    fn sdo_only_when_asked() {
        let shape = ShpShape::Polygon { bounding_box: bbox(), parts: vec![square()].into_boxed_slice() };
        assert_eq!(None, assemble(&shape, false).sdo);
        assert_eq!(
            Some("0.0000000000000,0.0000000000000,0.0000000000000,1.0000000000000,1.0000000000000,1.0000000000000,0.0000000000000,0.0000000000000".to_string()),
            assemble(&shape, true).sdo
        );
    }

    #[test]
    fn multi_part_sdo() {
        let shape = ShpShape::Polygon {
            bounding_box: bbox(),
            parts: vec![part(&[(0., 0.), (1., 1.)]), part(&[(2., 2.), (3., 3.)])].into_boxed_slice(),
        };
        assert_eq!(
            Some("( (0.0000000000000,0.0000000000000,1.0000000000000,1.0000000000000),(2.0000000000000,2.0000000000000,3.0000000000000,3.0000000000000))".to_string()),
            assemble(&shape, true).sdo
        );
    }

    #[test]
    fn line_strings_never_carry_sdo() {
        let shape = ShpShape::PolyLine { bounding_box: bbox(), parts: vec![square()].into_boxed_slice() };
        assert_eq!(None, assemble(&shape, true).sdo);
    }
}
