//! # Orthonormal Frame
//!
//! Origin plus three orthogonal unit axes. Cheaper than a full [`XForm`]
//! when the transform is rigid, e.g. a cutting plane's local coordinates.
//!
//! [`XForm`]: crate::XForm

use crate::plane::Plane;
use crate::vector::{Direction, Normal, Point, Vector};
use crate::xform::XForm;
use glam::{DMat4, DVec3, DVec4};

/// Returns a unit axis that is far from parallel to `v`.
fn least_aligned_axis(v: DVec3) -> DVec3 {
    let a = v.abs();
    if a.x <= a.y && a.x <= a.z {
        DVec3::X
    } else if a.y <= a.z {
        DVec3::Y
    } else {
        DVec3::Z
    }
}

/// Orthonormal basis anchored at an origin.
///
/// # Example
///
/// ```rust
/// use mesh_math::{Direction, Frame, Point};
///
/// let frame = Frame::new(Point::new(1.0, 0.0, 0.0), None, None, Some(Direction::new(0.0, 0.0, 1.0))).unwrap();
/// let local = frame.w2l_point(Point::new(1.0, 0.0, 3.0));
/// assert!((local.z - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Origin in world space.
    pub o: Point,
    /// Local X axis.
    pub x: Direction,
    /// Local Y axis.
    pub y: Direction,
    /// Local Z axis.
    pub z: Direction,
}

impl Frame {
    /// Builds a frame from any non-empty subset of axes.
    ///
    /// With one axis the other two are completed from the least aligned
    /// cardinal axis. With two or three axes, the first given axis in
    /// x, y, z order (or z when x is missing) is kept exactly and the others
    /// are re-orthogonalized around it. Returns `None` when no axis is given
    /// or the given axes are degenerate.
    pub fn new(
        o: Point,
        x: Option<Direction>,
        y: Option<Direction>,
        z: Option<Direction>,
    ) -> Option<Self> {
        let (x, y, z) = match (x, y, z) {
            (None, None, None) => return None,
            (Some(x), None, None) => {
                let x = x.as_dvec3();
                let z = x.cross(least_aligned_axis(x));
                (x, z.cross(x), z)
            }
            (None, Some(y), None) => {
                let y = y.as_dvec3();
                let x = y.cross(least_aligned_axis(y));
                (x, y, x.cross(y))
            }
            (None, None, Some(z)) => {
                let z = z.as_dvec3();
                let x = least_aligned_axis(z).cross(z);
                (x, z.cross(x), z)
            }
            (Some(x), Some(y), _) => {
                let (x, y) = (x.as_dvec3(), y.as_dvec3());
                let z = x.cross(y);
                (x, z.cross(x), z)
            }
            (Some(x), None, Some(z)) => {
                let (x, z) = (x.as_dvec3(), z.as_dvec3());
                let y = z.cross(x);
                (x, y, x.cross(y))
            }
            (None, Some(y), Some(z)) => {
                let (y, z) = (y.as_dvec3(), z.as_dvec3());
                let x = y.cross(z);
                (x, z.cross(x), z)
            }
        };

        let (x, y, z) = (Direction::from_dvec3(x), Direction::from_dvec3(y), Direction::from_dvec3(z));
        if x.length() == 0.0 || y.length() == 0.0 || z.length() == 0.0 {
            return None;
        }
        Some(Self { o, x, y, z })
    }

    /// Frame whose Z axis is the plane normal.
    pub fn from_plane(plane: &Plane, x: Option<Direction>, y: Option<Direction>) -> Option<Self> {
        Self::new(plane.o, x, y, Some(Direction::from(plane.n)))
    }

    fn dots(&self, v: DVec3) -> DVec3 {
        DVec3::new(self.x.dot(v), self.y.dot(v), self.z.dot(v))
    }

    fn mults(&self, v: DVec3) -> DVec3 {
        self.x.as_dvec3() * v.x + self.y.as_dvec3() * v.y + self.z.as_dvec3() * v.z
    }

    /// World point to frame coordinates.
    pub fn w2l_point(&self, p: Point) -> Point {
        Point(self.dots((p - self.o).as_dvec3()))
    }

    /// Frame coordinates to world point.
    pub fn l2w_point(&self, p: Point) -> Point {
        self.o + Vector(self.mults(p.as_dvec3()))
    }

    /// World vector to frame coordinates.
    pub fn w2l_vector(&self, v: Vector) -> Vector {
        Vector(self.dots(v.as_dvec3()))
    }

    /// Frame vector to world coordinates.
    pub fn l2w_vector(&self, v: Vector) -> Vector {
        Vector(self.mults(v.as_dvec3()))
    }

    /// World direction to frame coordinates.
    pub fn w2l_direction(&self, d: Direction) -> Direction {
        Direction::from_dvec3(self.dots(d.as_dvec3()))
    }

    /// Frame direction to world coordinates.
    pub fn l2w_direction(&self, d: Direction) -> Direction {
        Direction::from_dvec3(self.mults(d.as_dvec3()))
    }

    /// World normal to frame coordinates. Rigid frames keep normals as directions.
    pub fn w2l_normal(&self, n: Normal) -> Normal {
        Normal::from_dvec3(self.dots(n.as_dvec3()))
    }

    /// Frame normal to world coordinates.
    pub fn l2w_normal(&self, n: Normal) -> Normal {
        Normal::from_dvec3(self.mults(n.as_dvec3()))
    }

    /// Rotates the X and Y axes about Z.
    pub fn rotate_about_z(&mut self, radians: f64) {
        let (s, c) = radians.sin_cos();
        let (x, y) = (self.x.as_dvec3(), self.y.as_dvec3());
        self.x = Direction::from_dvec3(x * c + y * s);
        self.y = Direction::from_dvec3(-x * s + y * c);
    }

    /// Affine transform mapping frame coordinates to world.
    pub fn to_xform(&self) -> XForm {
        let m = DMat4::from_cols(
            self.x.as_dvec3().extend(0.0),
            self.y.as_dvec3().extend(0.0),
            self.z.as_dvec3().extend(0.0),
            DVec4::new(self.o.x, self.o.y, self.o.z, 1.0),
        );
        // orthonormal columns are always invertible
        XForm::try_new(m).unwrap_or_else(XForm::identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_orthonormal(f: &Frame) {
        assert_relative_eq!(f.x.length(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(f.y.length(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(f.z.length(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(f.x.dot(f.y.as_dvec3()), 0.0, epsilon = 1e-12);
        assert_relative_eq!(f.y.dot(f.z.as_dvec3()), 0.0, epsilon = 1e-12);
        assert_relative_eq!(f.z.dot(f.x.as_dvec3()), 0.0, epsilon = 1e-12);
        // right handed
        assert_relative_eq!(f.x.cross(f.y).dot(f.z.as_dvec3()), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_frame_requires_an_axis() {
        assert!(Frame::new(Point::ORIGIN, None, None, None).is_none());
    }

    #[test]
    fn test_frame_from_single_axis_is_orthonormal() {
        let d = Direction::new(0.3, -0.4, 0.8);
        for f in [
            Frame::new(Point::ORIGIN, Some(d), None, None),
            Frame::new(Point::ORIGIN, None, Some(d), None),
            Frame::new(Point::ORIGIN, None, None, Some(d)),
        ] {
            assert_orthonormal(&f.unwrap());
        }
    }

    #[test]
    fn test_frame_keeps_given_z() {
        let z = Direction::new(0.0, 1.0, 1.0);
        let f = Frame::new(Point::ORIGIN, None, None, Some(z)).unwrap();
        assert_relative_eq!(f.z.dot(z.as_dvec3()), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_frame_point_round_trip() {
        let f = Frame::new(
            Point::new(1.0, 2.0, 3.0),
            Some(Direction::new(1.0, 1.0, 0.0)),
            Some(Direction::new(0.0, 0.0, 1.0)),
            None,
        )
        .unwrap();
        let p = Point::new(-4.0, 0.5, 7.0);
        let back = f.l2w_point(f.w2l_point(p));
        assert_relative_eq!(back.x, p.x, epsilon = 1e-12);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-12);
        assert_relative_eq!(back.z, p.z, epsilon = 1e-12);
    }

    #[test]
    fn test_rotate_about_z_quarter_turn() {
        let mut f = Frame::new(
            Point::ORIGIN,
            Some(Direction::new(1.0, 0.0, 0.0)),
            Some(Direction::new(0.0, 1.0, 0.0)),
            None,
        )
        .unwrap();
        f.rotate_about_z(std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(f.x.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(f.y.x, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_to_xform_matches_frame() {
        let f = Frame::new(Point::new(0.0, 0.0, 5.0), None, None, Some(Direction::new(1.0, 0.0, 0.0))).unwrap();
        let xf = f.to_xform();
        let p = Point::new(1.0, 2.0, 3.0);
        let a = f.l2w_point(p);
        let b = xf.l2w_point(p);
        assert_relative_eq!(a.x, b.x, epsilon = 1e-12);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-12);
        assert_relative_eq!(a.z, b.z, epsilon = 1e-12);
    }
}
