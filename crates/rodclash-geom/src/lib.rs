#![warn(missing_docs)]

//! Geometry primitives and narrow-phase separation tests for rodclash.
//!
//! This crate owns the parametric shapes used to model building elements
//! (finite cylinders for rods, pipes and conduits; axis-aligned and
//! oriented boxes for ducts, beams and trays) and the exact distance math
//! between them. The broad phase only sees [`Aabb3`] bounds; everything
//! sharper lives in [`separation`].
//!
//! All separation tests return a *signed* penetration: positive means the
//! surfaces overlap, negative means they are clear by that margin. The
//! classifier upstream needs the clearance margin even for disjoint pairs,
//! so no test in this crate ever "fails to report" a disjoint result.

pub mod aabb;
pub mod separation;
pub mod shapes;

pub use aabb::Aabb3;
pub use separation::{
    closest_point_on_segment, cylinder_aabb, cylinder_cylinder, cylinder_obb, cylinder_shape,
    segment_closest_points, SamplingPolicy, Separation,
};
pub use shapes::{Cylinder, Obb, Shape};
