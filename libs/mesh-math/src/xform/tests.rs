//! Tests for local/world conversion.

use super::*;
use approx::assert_relative_eq;
use glam::{DQuat, DVec3, DVec4};
use proptest::prelude::*;

fn scaled_rotated() -> XForm {
    let mx = DMat4::from_scale_rotation_translation(
        DVec3::new(2.0, 0.5, 3.0),
        DQuat::from_rotation_z(0.7),
        DVec3::new(1.0, -2.0, 4.0),
    );
    XForm::try_new(mx).unwrap()
}

fn assert_points_close(a: Point, b: Point, eps: f64) {
    assert_relative_eq!(a.x, b.x, epsilon = eps);
    assert_relative_eq!(a.y, b.y, epsilon = eps);
    assert_relative_eq!(a.z, b.z, epsilon = eps);
}

#[test]
fn singular_matrix_is_rejected() {
    let mx = DMat4::from_scale(DVec3::new(1.0, 0.0, 1.0));
    assert!(XForm::try_new(mx).is_none());
}

#[test]
fn tiny_and_huge_uniform_scales_are_accepted() {
    for scale in [1e-4, 1e-6, 1e6] {
        let xf = XForm::try_new(DMat4::from_scale(DVec3::splat(scale))).unwrap();
        let p = Point::new(3.0, -2.0, 0.5);
        assert_points_close(xf.l2w_point(xf.w2l_point(p)), p, 1e-9);
    }
    // axes sheared almost parallel
    let sheared = DMat4::from_cols(
        DVec4::new(1.0, 0.0, 0.0, 0.0),
        DVec4::new(1.0, 1e-12, 0.0, 0.0),
        DVec4::new(0.0, 0.0, 1.0, 0.0),
        DVec4::W,
    );
    assert!(XForm::try_new(sheared).is_none());
}

#[test]
fn identity_is_noop() {
    let xf = XForm::identity();
    let p = Point::new(1.0, 2.0, 3.0);
    assert_eq!(xf.l2w_point(p), p);
    assert_eq!(xf.w2l_point(p), p);
}

#[test]
fn normals_stay_perpendicular_under_nonuniform_scale() {
    let xf = XForm::try_new(DMat4::from_scale(DVec3::new(4.0, 1.0, 1.0))).unwrap();
    // plane x = y in local space
    let n = Normal::new(1.0, -1.0, 0.0);
    let tangent = Vector::new(1.0, 1.0, 0.0);
    let wn = xf.l2w_normal(n);
    let wt = xf.l2w_vector(tangent);
    assert_relative_eq!(wn.dot(wt.as_dvec3()), 0.0, epsilon = 1e-12);
}

#[test]
fn ray_max_follows_far_endpoint() {
    let xf = XForm::try_new(DMat4::from_scale(DVec3::splat(2.0))).unwrap();
    let ray = Ray::new(Point::ORIGIN, Direction::new(1.0, 0.0, 0.0), 0.0, 3.0);
    let world = xf.l2w_ray(&ray);
    assert_relative_eq!(world.max, 6.0, epsilon = 1e-12);
    let back = xf.w2l_ray(&world);
    assert_relative_eq!(back.max, 3.0, epsilon = 1e-12);
}

#[test]
fn infinite_ray_stays_infinite() {
    let ray = Ray::infinite(Point::ORIGIN, Direction::new(0.0, 1.0, 0.0));
    assert!(scaled_rotated().l2w_ray(&ray).max.is_infinite());
}

#[test]
fn plane_round_trip_keeps_membership() {
    let xf = scaled_rotated();
    let local = Plane::new(Point::new(0.0, 0.0, 0.5), Normal::new(0.0, 1.0, 1.0));
    let world = xf.l2w_plane(&local);
    let on_local = local.project(Point::new(3.0, -1.0, 2.0));
    assert_eq!(world.side(xf.l2w_point(on_local)), 0);
}

#[test]
fn composition_applies_right_first() {
    let t = XForm::try_new(DMat4::from_translation(DVec3::X)).unwrap();
    let s = XForm::try_new(DMat4::from_scale(DVec3::splat(2.0))).unwrap();
    let p = (t * s).l2w_point(Point::new(1.0, 0.0, 0.0));
    assert_points_close(p, Point::new(3.0, 0.0, 0.0), 1e-12);
    let q = (t * s).w2l_point(p);
    assert_points_close(q, Point::new(1.0, 0.0, 0.0), 1e-12);
}

#[test]
fn inverse_swaps_directions() {
    let xf = scaled_rotated();
    let p = Point::new(0.3, 0.2, 0.1);
    assert_points_close(xf.inverse().l2w_point(p), xf.w2l_point(p), 1e-12);
}

#[test]
fn length_bound_covers_inverse_stretch() {
    let xf = scaled_rotated();
    let bound = xf.w2l_length_bound();
    for v in [Vector::new(1.0, 0.0, 0.0), Vector::new(0.0, 1.0, 0.0), Vector::new(0.3, -0.4, 0.5)] {
        assert!(xf.w2l_vector(v).length() <= bound * v.length() + 1e-12);
    }
}

#[test]
fn to_frame_of_rigid_transform() {
    let mx = DMat4::from_rotation_translation(DQuat::from_rotation_x(0.4), DVec3::new(0.0, 1.0, 0.0));
    let frame = XForm::try_new(mx).unwrap().to_frame().unwrap();
    assert_points_close(frame.o, Point::new(0.0, 1.0, 0.0), 1e-12);
    assert_relative_eq!(frame.x.x, 1.0, epsilon = 1e-12);
}

proptest! {
    #[test]
    fn w2l_then_l2w_reproduces_point(
        sx in 1e-3f64..10.0, sy in 1e-3f64..10.0, sz in 1e-3f64..10.0,
        angle in -3.1f64..3.1,
        tx in -50.0f64..50.0, ty in -50.0f64..50.0, tz in -50.0f64..50.0,
        px in -100.0f64..100.0, py in -100.0f64..100.0, pz in -100.0f64..100.0,
    ) {
        let mx = DMat4::from_scale_rotation_translation(
            DVec3::new(sx, sy, sz),
            DQuat::from_axis_angle(DVec3::new(1.0, 1.0, 0.0).normalize(), angle),
            DVec3::new(tx, ty, tz),
        );
        let xf = XForm::try_new(mx).unwrap();
        let p = Point::new(px, py, pz);
        let back = xf.l2w_point(xf.w2l_point(p));
        prop_assert!(back.distance_to(p) < 1e-8);
    }
}
