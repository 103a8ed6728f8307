//! # Affine Transform
//!
//! `XForm` carries a 4×4 affine matrix, its inverse, and the derived 3×3
//! matrices for directions and normals:
//!
//! | matrix | maps |
//! |---|---|
//! | `mx_p` / `imx_p` | points |
//! | `mx_d` / `imx_d` | vectors and directions (linear part) |
//! | `mx_n` / `imx_n` | normals (inverse-transpose of the linear part) |
//!
//! The `l2w_*` methods map local to world through the forward matrices and
//! `w2l_*` map back through the inverses.

use crate::frame::Frame;
use crate::plane::Plane;
use crate::ray::Ray;
use crate::vector::{Direction, Normal, Point, Vector};
use config::constants::EPSILON;
use glam::{DMat3, DMat4};
use std::ops::Mul;

/// Invertible affine transform between local and world space.
///
/// # Example
///
/// ```rust
/// use glam::{DMat4, DVec3};
/// use mesh_math::{Point, XForm};
///
/// let xf = XForm::try_new(DMat4::from_translation(DVec3::new(0.0, 0.0, 2.0))).unwrap();
/// assert_eq!(xf.l2w_point(Point::ORIGIN), Point::new(0.0, 0.0, 2.0));
/// assert!(XForm::try_new(DMat4::ZERO).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XForm {
    mx_p: DMat4,
    imx_p: DMat4,
    mx_d: DMat3,
    imx_d: DMat3,
    mx_n: DMat3,
    imx_n: DMat3,
}

impl Default for XForm {
    fn default() -> Self {
        Self::identity()
    }
}

impl XForm {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            mx_p: DMat4::IDENTITY,
            imx_p: DMat4::IDENTITY,
            mx_d: DMat3::IDENTITY,
            imx_d: DMat3::IDENTITY,
            mx_n: DMat3::IDENTITY,
            imx_n: DMat3::IDENTITY,
        }
    }

    /// Builds a transform, or `None` if the matrix is singular or not finite.
    ///
    /// Singularity is judged relative to the axis lengths, so a uniformly
    /// tiny or huge scale is still accepted.
    pub fn try_new(mx: DMat4) -> Option<Self> {
        let mx_d = DMat3::from_mat4(mx);
        let det = mx.determinant();
        let volume = mx_d.x_axis.length() * mx_d.y_axis.length() * mx_d.z_axis.length();
        if !det.is_finite() || det == 0.0 || det.abs() <= EPSILON * volume {
            return None;
        }
        let imx = mx.inverse();
        if !imx.is_finite() {
            return None;
        }
        let imx_d = DMat3::from_mat4(imx);
        Some(Self {
            mx_p: mx,
            imx_p: imx,
            mx_d,
            imx_d,
            mx_n: imx_d.transpose(),
            imx_n: mx_d.transpose(),
        })
    }

    /// Local-to-world matrix.
    #[inline]
    pub fn matrix(&self) -> DMat4 {
        self.mx_p
    }

    /// World-to-local matrix.
    #[inline]
    pub fn inverse_matrix(&self) -> DMat4 {
        self.imx_p
    }

    /// Upper bound on how much `w2l_vector` can stretch a length: the
    /// Frobenius norm of the inverse linear part.
    pub fn w2l_length_bound(&self) -> f64 {
        let m = self.imx_d;
        (m.x_axis.length_squared() + m.y_axis.length_squared() + m.z_axis.length_squared()).sqrt()
    }

    /// The inverse transform.
    pub fn inverse(&self) -> XForm {
        Self {
            mx_p: self.imx_p,
            imx_p: self.mx_p,
            mx_d: self.imx_d,
            imx_d: self.mx_d,
            mx_n: self.imx_n,
            imx_n: self.mx_n,
        }
    }

    // -------------------------------------------------------------------------
    // local -> world
    // -------------------------------------------------------------------------

    /// Local point to world.
    #[inline]
    pub fn l2w_point(&self, p: Point) -> Point {
        Point(self.mx_p.transform_point3(p.as_dvec3()))
    }

    /// Local vector to world.
    #[inline]
    pub fn l2w_vector(&self, v: Vector) -> Vector {
        Vector(self.mx_d * v.as_dvec3())
    }

    /// Local direction to world, renormalized.
    #[inline]
    pub fn l2w_direction(&self, d: Direction) -> Direction {
        Direction::from_dvec3(self.mx_d * d.as_dvec3())
    }

    /// Local normal to world, renormalized.
    #[inline]
    pub fn l2w_normal(&self, n: Normal) -> Normal {
        Normal::from_dvec3(self.mx_n * n.as_dvec3())
    }

    /// Local ray to world. The far endpoint is transformed to recover the
    /// world length.
    pub fn l2w_ray(&self, ray: &Ray) -> Ray {
        let o = self.l2w_point(ray.o);
        let d = self.l2w_direction(ray.d);
        let max = match ray.end() {
            Some(end) => o.distance_to(self.l2w_point(end)),
            None => f64::INFINITY,
        };
        Ray { o, d, max }
    }

    /// Local plane to world.
    pub fn l2w_plane(&self, plane: &Plane) -> Plane {
        Plane::new(self.l2w_point(plane.o), self.l2w_normal(plane.n))
    }

    // -------------------------------------------------------------------------
    // world -> local
    // -------------------------------------------------------------------------

    /// World point to local.
    #[inline]
    pub fn w2l_point(&self, p: Point) -> Point {
        Point(self.imx_p.transform_point3(p.as_dvec3()))
    }

    /// World vector to local.
    #[inline]
    pub fn w2l_vector(&self, v: Vector) -> Vector {
        Vector(self.imx_d * v.as_dvec3())
    }

    /// World direction to local, renormalized.
    #[inline]
    pub fn w2l_direction(&self, d: Direction) -> Direction {
        Direction::from_dvec3(self.imx_d * d.as_dvec3())
    }

    /// World normal to local, renormalized.
    #[inline]
    pub fn w2l_normal(&self, n: Normal) -> Normal {
        Normal::from_dvec3(self.imx_n * n.as_dvec3())
    }

    /// World ray to local.
    pub fn w2l_ray(&self, ray: &Ray) -> Ray {
        let o = self.w2l_point(ray.o);
        let d = self.w2l_direction(ray.d);
        let max = match ray.end() {
            Some(end) => o.distance_to(self.w2l_point(end)),
            None => f64::INFINITY,
        };
        Ray { o, d, max }
    }

    /// World plane to local.
    pub fn w2l_plane(&self, plane: &Plane) -> Plane {
        Plane::new(self.w2l_point(plane.o), self.w2l_normal(plane.n))
    }

    /// Frame at the transformed origin with the transformed cardinal axes,
    /// re-orthogonalized around X and Y.
    pub fn to_frame(&self) -> Option<Frame> {
        Frame::new(
            self.l2w_point(Point::ORIGIN),
            Some(self.l2w_direction(Direction::new(1.0, 0.0, 0.0))),
            Some(self.l2w_direction(Direction::new(0.0, 1.0, 0.0))),
            Some(self.l2w_direction(Direction::new(0.0, 0.0, 1.0))),
        )
    }
}

impl Mul for XForm {
    type Output = XForm;

    /// `a * b` applies `b` first, then `a`.
    fn mul(self, rhs: XForm) -> XForm {
        let mx_d = self.mx_d * rhs.mx_d;
        let imx_d = rhs.imx_d * self.imx_d;
        XForm {
            mx_p: self.mx_p * rhs.mx_p,
            imx_p: rhs.imx_p * self.imx_p,
            mx_d,
            imx_d,
            mx_n: imx_d.transpose(),
            imx_n: mx_d.transpose(),
        }
    }
}

#[cfg(test)]
mod tests;
