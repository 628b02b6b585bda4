use proprisk_core::error::{PropriskError, Result};
use proprisk_core::models::Geometry;

/// Validation result with details
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validation error with location details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub location: String,
    pub reason: String,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, location: String, reason: String) {
        self.is_valid = false;
        self.errors.push(ValidationError { location, reason });
    }

    /// Turn the first recorded error into a `PropriskError`
    pub fn into_result(self, field: &str) -> Result<()> {
        match self.errors.into_iter().next() {
            None => Ok(()),
            Some(first) => Err(PropriskError::validation(
                field,
                format!("{}: {}", first.location, first.reason),
            )),
        }
    }
}

/// Check a longitude/latitude pair against the geographic ranges
pub fn validate_lon_lat(longitude: f64, latitude: f64) -> Result<()> {
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(PropriskError::validation(
            "longitude",
            format!("{} is outside [-180, 180]", longitude),
        ));
    }
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(PropriskError::validation(
            "latitude",
            format!("{} is outside [-90, 90]", latitude),
        ));
    }
    Ok(())
}

/// Validate a geometry's structure and coordinates
pub fn validate_geometry(geometry: &Geometry) -> ValidationResult {
    let mut result = ValidationResult::valid();

    for (i, [x, y]) in geometry.coords().enumerate() {
        if !x.is_finite() || !y.is_finite() {
            result
                .add_error(format!("coordinate[{}]", i), "Coordinates must be finite".to_string());
        }
    }

    match geometry {
        Geometry::LineString { coordinates } if coordinates.len() < 2 => {
            result.add_error(
                "LineString".to_string(),
                format!("LineString must have at least 2 points, found {}", coordinates.len()),
            );
        }
        Geometry::Polygon { coordinates } => validate_rings("Polygon", coordinates, &mut result),
        Geometry::MultiPolygon { coordinates } => {
            for (i, polygon) in coordinates.iter().enumerate() {
                validate_rings(&format!("MultiPolygon[{}]", i), polygon, &mut result);
            }
        }
        _ => {}
    }

    result
}

fn validate_rings(location: &str, rings: &[Vec<[f64; 2]>], result: &mut ValidationResult) {
    if rings.is_empty() {
        result.add_error(location.to_string(), "Polygon has no exterior ring".to_string());
        return;
    }

    for (i, ring) in rings.iter().enumerate() {
        let name = if i == 0 {
            format!("{} exterior", location)
        } else {
            format!("{} interior[{}]", location, i - 1)
        };

        if ring.len() < 4 {
            result.add_error(
                name.clone(),
                format!("Ring must have at least 4 points, found {}", ring.len()),
            );
        }
        if ring.first() != ring.last() {
            result.add_error(name, "Ring must be closed (first point == last point)".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lon_lat_ranges() {
        assert!(validate_lon_lat(151.2093, -33.8688).is_ok());
        assert!(validate_lon_lat(180.0, -90.0).is_ok());
        assert!(validate_lon_lat(180.5, 0.0).is_err());
        assert!(validate_lon_lat(0.0, -90.1).is_err());
        assert!(validate_lon_lat(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_unclosed_polygon_is_invalid() {
        let open = Geometry::polygon(vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]]);
        let result = validate_geometry(&open);
        assert!(!result.is_valid);
        assert!(result.into_result("geometry").is_err());
    }

    #[test]
    fn test_non_finite_point_is_invalid() {
        let point = Geometry::point(f64::INFINITY, 0.0);
        assert!(!validate_geometry(&point).is_valid);
        assert!(validate_geometry(&Geometry::rectangle(0.0, 0.0, 1.0, 1.0)).is_valid);
    }
}
