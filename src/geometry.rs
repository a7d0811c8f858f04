//! Planar joint geometry.

use crate::constants::EPSILON;
use crate::keypoint::Position;

/// Angle in degrees at vertex `b` between rays `b->a` and `b->c`, in [0, 180]
///
/// Uses the difference of the two rays' `atan2` headings. If either ray has
/// zero length the angle is undefined and 0 is returned.
#[must_use]
pub fn joint_angle(a: Position, b: Position, c: Position) -> f64 {
    let ray_a = a.to_point() - b.to_point();
    let ray_c = c.to_point() - b.to_point();

    if ray_a.norm() < EPSILON || ray_c.norm() < EPSILON {
        return 0.0;
    }

    let radians = ray_c.y.atan2(ray_c.x) - ray_a.y.atan2(ray_a.x);
    let degrees = radians.to_degrees().abs();

    if degrees > 180.0 {
        360.0 - degrees
    } else {
        degrees
    }
}

/// Straight-line pixel distance between two positions
#[must_use]
pub fn distance(a: Position, b: Position) -> f64 {
    nalgebra::distance(&a.to_point(), &b.to_point())
}

/// Vertical offset between two joints as a fraction of `scale`
#[must_use]
pub fn normalized_vertical_offset(a: Position, b: Position, scale: f64) -> f64 {
    (a.y - b.y).abs() / scale
}
