use num::{Float, NumCast};

/// A numeric type that can be used for the Burning Ship iteration.
///
/// The iteration needs:
/// - Mapping from an f64 plane coordinate, which may lose precision or fail for narrow types
/// - Addition, subtraction, multiplication and absolute value - to implement the map
/// - Comparison - for bounds-checking
///
/// All of that comes from `num::Float`; coloring is done in f64 regardless of the type.
pub trait ShipNumber: Float + Send + Sync + std::fmt::Debug {
    /// Converts from an f64 coordinate.
    ///
    /// Fails if the value is out of this type's range.
    fn from_coordinate(value: f64) -> Result<Self, String>;

    /// Widens back to f64 for coloring.
    fn widen(self) -> f64 {
        <f64 as NumCast>::from(self).unwrap_or(f64::NAN)
    }
}

impl ShipNumber for f64 {
    fn from_coordinate(value: f64) -> Result<Self, String> {
        Ok(value)
    }

    fn widen(self) -> f64 {
        self
    }
}

impl ShipNumber for f32 {
    fn from_coordinate(value: f64) -> Result<Self, String> {
        let narrowed = value as f32;
        if value.is_finite() && !narrowed.is_finite() {
            return Err(format!("failed conversion from {} to f32", value));
        }
        Ok(narrowed)
    }
}
