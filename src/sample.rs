// ============================================================================
// SAMPLE PARSER
// ============================================================================

use std::num::{ParseFloatError, ParseIntError};

/// Field separator emitted by the sensor bridge firmware
pub const FIELD_SEPARATOR: &str = ", ";

/// One range reading as reported by the sensor
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolarSample {
    /// Bearing in degrees, sensor frame (0 = forward)
    pub angle_deg: f64,
    /// Range in millimetres
    pub distance_mm: u32,
}

/// Why a line was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("expected 2 fields, found {0}")]
    FieldCount(usize),

    #[error("invalid angle: {0}")]
    Angle(#[from] ParseFloatError),

    #[error("angle is not finite")]
    NonFiniteAngle,

    #[error("invalid distance: {0}")]
    Distance(#[from] ParseIntError),
}

/// Parse one decoded line into a sample.
///
/// Purely syntactic: the angle is returned exactly as sent, the origin shift is
/// applied later by [`crate::geometry::to_cartesian`].
pub fn parse(line: &str) -> Result<PolarSample, ParseError> {
    let fields: Vec<&str> = line.trim().split(FIELD_SEPARATOR).collect();
    let [angle, distance] = fields.as_slice() else {
        return Err(ParseError::FieldCount(fields.len()));
    };

    let angle_deg: f64 = angle.trim().parse()?;
    if !angle_deg.is_finite() {
        return Err(ParseError::NonFiniteAngle);
    }
    let distance_mm: u32 = distance.trim().parse()?;

    Ok(PolarSample {
        angle_deg,
        distance_mm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_lines() {
        assert_eq!(
            parse("12.5, 340").unwrap(),
            PolarSample {
                angle_deg: 12.5,
                distance_mm: 340
            }
        );
        assert_eq!(parse("0, 0").unwrap().distance_mm, 0);
        assert_eq!(parse("-45, 7").unwrap().angle_deg, -45.0);
        assert_eq!(parse("359.99, 12000").unwrap().angle_deg, 359.99);
    }

    #[test]
    fn strips_line_endings() {
        let sample = parse("90, 50\r\n").unwrap();
        assert_eq!(sample.angle_deg, 90.0);
        assert_eq!(sample.distance_mm, 50);
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert_eq!(parse(""), Err(ParseError::FieldCount(1)));
        assert_eq!(parse("90"), Err(ParseError::FieldCount(1)));
        assert_eq!(parse("90, 50, 3"), Err(ParseError::FieldCount(3)));
        // No space after the comma is not the wire format
        assert_eq!(parse("90,50"), Err(ParseError::FieldCount(1)));
    }

    #[test]
    fn rejects_bad_angle() {
        assert!(matches!(parse("north, 50"), Err(ParseError::Angle(_))));
        assert!(matches!(parse(", 50"), Err(ParseError::Angle(_))));
        assert_eq!(parse("NaN, 50"), Err(ParseError::NonFiniteAngle));
        assert_eq!(parse("inf, 50"), Err(ParseError::NonFiniteAngle));
    }

    #[test]
    fn rejects_bad_distance() {
        assert!(matches!(parse("90, 5.5"), Err(ParseError::Distance(_))));
        assert!(matches!(parse("90, -5"), Err(ParseError::Distance(_))));
        assert!(matches!(parse("90, far"), Err(ParseError::Distance(_))));
        assert!(matches!(parse("90,  "), Err(ParseError::FieldCount(1))));
        assert!(matches!(parse("90, \t"), Err(ParseError::FieldCount(1))));
        assert!(matches!(
            parse("90, 99999999999"),
            Err(ParseError::Distance(_))
        ));
    }

    #[test]
    fn rejects_firmware_chatter() {
        assert!(parse("Speed: 3600").is_err());
        assert!(parse("Angle: 8.000").is_err());
        assert!(parse("Frame dropped! Handle frames more quickly.").is_err());
    }
}
