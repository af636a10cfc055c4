//! Building elements: identity, classification and geometry.

use std::fmt;

use serde::{Deserialize, Serialize};

use rodclash_geom::Shape;
use rodclash_math::Tolerance;
use rodclash_rules::ElementKind;

use crate::error::ElementError;

/// Caller-supplied element identifier, unique within one model.
///
/// The engine never parses or synthesizes ids; it only carries them
/// through to the clash records so findings can be traced back to the
/// source model.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Wrap a caller id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One element of the coordinated model.
///
/// `kind` is the domain classification driving clearance and trade
/// lookup; `shape` is the geometry, and the two are independent except
/// for one rule: rods must be cylinders.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Caller-supplied id, unique within the model.
    pub id: ElementId,
    /// Domain classification.
    pub kind: ElementKind,
    /// Geometry.
    pub shape: Shape,
    /// Building level, when the source model carries one. Used only for
    /// level-scoped detection runs.
    pub level: Option<i32>,
    /// Per-element required clearance in inches, overriding the table.
    pub clearance_override: Option<f64>,
}

impl Element {
    /// Create an element with no level and no clearance override.
    pub fn new(id: impl Into<ElementId>, kind: ElementKind, shape: Shape) -> Self {
        Self {
            id: id.into(),
            kind,
            shape,
            level: None,
            clearance_override: None,
        }
    }

    /// Attach a building level.
    pub fn with_level(mut self, level: i32) -> Self {
        self.level = Some(level);
        self
    }

    /// Attach a per-element clearance override, in inches.
    pub fn with_clearance_override(mut self, clearance: f64) -> Self {
        self.clearance_override = Some(clearance);
        self
    }

    /// Validate the element's geometry and attributes.
    pub fn validate(&self, tol: &Tolerance) -> Result<(), ElementError> {
        if !self.shape.is_finite() {
            return Err(ElementError::NonFinite);
        }
        match &self.shape {
            Shape::Cylinder(c) => {
                if c.radius < 0.0 {
                    return Err(ElementError::NegativeRadius(c.radius));
                }
            }
            Shape::Aabb(b) => {
                if !b.is_ordered() {
                    return Err(ElementError::InvertedBounds);
                }
            }
            Shape::Obb(o) => {
                for &h in &o.half_extents {
                    if h < 0.0 {
                        return Err(ElementError::NegativeHalfExtent(h));
                    }
                }
                if !o.axes_orthonormal(tol) {
                    return Err(ElementError::NonOrthonormalAxes);
                }
            }
        }
        if self.kind == ElementKind::Rod && !matches!(self.shape, Shape::Cylinder(_)) {
            return Err(ElementError::RodNotCylinder);
        }
        if let Some(c) = self.clearance_override {
            if !c.is_finite() || c < 0.0 {
                return Err(ElementError::InvalidClearanceOverride(c));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rodclash_geom::{Aabb3, Cylinder, Obb};
    use rodclash_math::{Point3, Vec3};

    fn tol() -> Tolerance {
        Tolerance::DEFAULT
    }

    fn unit_cylinder() -> Shape {
        Shape::Cylinder(Cylinder::new(
            Point3::origin(),
            Point3::new(0.0, 0.0, 10.0),
            0.5,
        ))
    }

    #[test]
    fn test_valid_rod() {
        let rod = Element::new("rod-1", ElementKind::Rod, unit_cylinder())
            .with_level(3)
            .with_clearance_override(2.5);
        assert!(rod.validate(&tol()).is_ok());
        assert_eq!(rod.level, Some(3));
    }

    #[test]
    fn test_rejects_non_finite() {
        let shape = Shape::Cylinder(Cylinder::new(
            Point3::new(f64::NAN, 0.0, 0.0),
            Point3::origin(),
            0.5,
        ));
        let e = Element::new("x", ElementKind::Pipe, shape);
        assert_eq!(e.validate(&tol()), Err(ElementError::NonFinite));
    }

    #[test]
    fn test_rejects_negative_radius() {
        let shape = Shape::Cylinder(Cylinder::new(
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            -0.5,
        ));
        let e = Element::new("x", ElementKind::Pipe, shape);
        assert_eq!(e.validate(&tol()), Err(ElementError::NegativeRadius(-0.5)));
    }

    #[test]
    fn test_rejects_inverted_box() {
        let shape = Shape::Aabb(Aabb3::new(
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 1.0),
        ));
        let e = Element::new("x", ElementKind::Duct, shape);
        assert_eq!(e.validate(&tol()), Err(ElementError::InvertedBounds));
    }

    #[test]
    fn test_rejects_skewed_obb_axes() {
        let shape = Shape::Obb(Obb::new(
            Point3::origin(),
            [Vec3::x(), Vec3::new(1.0, 1.0, 0.0), Vec3::z()],
            [1.0, 1.0, 1.0],
        ));
        let e = Element::new("x", ElementKind::Beam, shape);
        assert_eq!(e.validate(&tol()), Err(ElementError::NonOrthonormalAxes));
    }

    #[test]
    fn test_rejects_rod_without_cylinder() {
        let shape = Shape::Aabb(Aabb3::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)));
        let e = Element::new("x", ElementKind::Rod, shape);
        assert_eq!(e.validate(&tol()), Err(ElementError::RodNotCylinder));
    }

    #[test]
    fn test_rejects_bad_override() {
        let e = Element::new("x", ElementKind::Pipe, unit_cylinder()).with_clearance_override(-1.0);
        assert_eq!(
            e.validate(&tol()),
            Err(ElementError::InvalidClearanceOverride(-1.0))
        );
    }

    #[test]
    fn test_id_round_trip() {
        let id = ElementId::from("duct-17");
        assert_eq!(id.as_str(), "duct-17");
        assert_eq!(id.to_string(), "duct-17");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"duct-17\"");
    }
}
