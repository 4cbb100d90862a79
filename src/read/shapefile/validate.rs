//! Optional geometry validation.
//!
//! A `Validator` looks at the text of each geometry and says whether it is a
//! valid geometry. Its answer is stored next to the text; it never changes
//! the text. Build with the `validate` feature for a real validator; without
//! it, nothing is validated.
use std::fmt;

pub const WKT_FORMAT: &'static str = "wkt";

#[derive(Debug,Clone,PartialEq,Eq)]
pub struct Validity {
    pub valid: bool,
    pub reason: Option<String>,
}

impl Validity {
    pub fn valid() -> Validity {
        Validity { valid: true, reason: None }
    }

    pub fn invalid(reason: String) -> Validity {
        Validity { valid: false, reason: Some(reason) }
    }
}

pub trait Validator: fmt::Debug {
    /// False when this validator can't actually validate anything.
    fn is_available(&self) -> bool {
        true
    }

    /// Returns `None` when the validator has nothing to say.
    fn check(&self, text: &str, format: &str) -> Option<Validity>;
}

/// Stands in when no validator is available.
#[derive(Debug,Clone,Copy,Default)]
pub struct NoValidator;

impl Validator for NoValidator {
    fn is_available(&self) -> bool {
        false
    }

    fn check(&self, _text: &str, _format: &str) -> Option<Validity> {
        None
    }
}

#[cfg(feature = "validate")]
pub use self::wkt_validator::WktValidator;

/// The best validator this build has.
#[cfg(feature = "validate")]
pub fn default_validator() -> Box<dyn Validator> {
    Box::new(WktValidator)
}

/// The best validator this build has.
#[cfg(not(feature = "validate"))]
pub fn default_validator() -> Box<dyn Validator> {
    Box::new(NoValidator)
}

#[cfg(feature = "validate")]
mod wkt_validator {
    use std::convert::TryFrom;
    use std::str::FromStr;
    use geo_types::{Coord, Geometry, LineString, Polygon};
    use wkt::Wkt;
    use super::{Validator, Validity, WKT_FORMAT};

    /// Parses WKT and checks the coordinates and point counts.
    #[derive(Debug,Clone,Copy,Default)]
    pub struct WktValidator;

    fn check_coord(coord: &Coord<f64>) -> Option<String> {
        if coord.x.is_finite() && coord.y.is_finite() {
            None
        } else {
            Some(format!("Invalid coordinate ({} {})", coord.x, coord.y))
        }
    }

    fn check_line_string(line_string: &LineString<f64>) -> Option<String> {
        if line_string.0.len() < 2 {
            return Some(format!("Too few points in line string: {}", line_string.0.len()));
        }
        line_string.0.iter().filter_map(check_coord).next()
    }

    fn check_polygon(polygon: &Polygon<f64>) -> Option<String> {
        ::std::iter::once(polygon.exterior())
            .chain(polygon.interiors().iter())
            .filter_map(|ring| {
                if ring.0.len() < 4 {
                    Some(format!("Too few points in ring: {}", ring.0.len()))
                } else {
                    ring.0.iter().filter_map(check_coord).next()
                }
            })
            .next()
    }

    fn check_geometry(geometry: &Geometry<f64>) -> Option<String> {
        match *geometry {
            Geometry::Point(ref point) => check_coord(&point.0),
            Geometry::LineString(ref line_string) => check_line_string(line_string),
            Geometry::Polygon(ref polygon) => check_polygon(polygon),
            Geometry::MultiPoint(ref multi_point) => multi_point.0.iter().filter_map(|p| check_coord(&p.0)).next(),
            Geometry::MultiLineString(ref multi) => multi.0.iter().filter_map(check_line_string).next(),
            Geometry::MultiPolygon(ref multi) => multi.0.iter().filter_map(check_polygon).next(),
            _ => None,
        }
    }

    impl Validator for WktValidator {
        fn check(&self, text: &str, format: &str) -> Option<Validity> {
            if !format.eq_ignore_ascii_case(WKT_FORMAT) {
                return Some(Validity::invalid(format!("Unsupported geometry format: {}", format)));
            }

            let wkt = match Wkt::<f64>::from_str(text) {
                Ok(wkt) => wkt,
                Err(err) => return Some(Validity::invalid(format!("Parse error: {}", err))),
            };

            let geometry = match Geometry::<f64>::try_from(wkt) {
                Ok(geometry) => geometry,
                Err(err) => return Some(Validity::invalid(format!("Conversion error: {}", err))),
            };

            Some(match check_geometry(&geometry) {
                None => Validity::valid(),
                Some(reason) => Validity::invalid(reason),
            })
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_validator_says_nothing() {
        assert!(!NoValidator.is_available());
        assert_eq!(None, NoValidator.check("POINT(1 2)", WKT_FORMAT));
    }

    #[cfg(not(feature = "validate"))]
    #[test]
    fn default_is_unavailable_without_feature() {
        assert!(!default_validator().is_available());
    }

    #[cfg(feature = "validate")]
    #[test]
    fn default_is_available_with_feature() {
        assert!(default_validator().is_available());
    }
}
