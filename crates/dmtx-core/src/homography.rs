use nalgebra::{Matrix3, Point2, Vector3};

/// Planar projective transform `p' ~ H p`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        Point2::new((v.x / v.z) as f32, (v.y / v.z) as f32)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }
}

/// Projective map of the unit square onto `q`, with `(0,0) → q[0]`,
/// `(1,0) → q[1]`, `(1,1) → q[2]` and `(0,1) → q[3]`.
///
/// `None` when three of the corners are collinear.
fn unit_square_to_quad(q: &[Point2<f32>; 4]) -> Option<Matrix3<f64>> {
    let [p0, p1, p2, p3] = q.map(|p| Point2::new(p.x as f64, p.y as f64));

    // Deviation from a parallelogram decides the projective row.
    let sx = p0.x - p1.x + p2.x - p3.x;
    let sy = p0.y - p1.y + p2.y - p3.y;
    let (d1x, d1y) = (p1.x - p2.x, p1.y - p2.y);
    let (d2x, d2y) = (p3.x - p2.x, p3.y - p2.y);
    let den = d1x * d2y - d2x * d1y;
    let scale = (p2 - p0).norm().max((p3 - p1).norm()).max(1.0);
    if den.abs() < 1e-9 * scale * scale {
        return None;
    }
    let g = (sx * d2y - d2x * sy) / den;
    let h = (d1x * sy - sx * d1y) / den;

    Some(Matrix3::new(
        p1.x - p0.x + g * p1.x, p3.x - p0.x + h * p3.x, p0.x, //
        p1.y - p0.y + g * p1.y, p3.y - p0.y + h * p3.y, p0.y, //
        g, h, 1.0,
    ))
}

/// Compute H such that `dst ~ H * src` from 4 point correspondences.
///
/// Corner order must be consistent between `src` and `dst`. Returns `None`
/// for degenerate configurations (three collinear points, repeated points).
pub fn homography_from_4pt(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Homography> {
    let to_src = unit_square_to_quad(src)?;
    let to_dst = unit_square_to_quad(dst)?;
    let h = to_dst * to_src.try_inverse()?;
    let w = h[(2, 2)];
    if w.abs() < 1e-12 || h.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(Homography::new(h / w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_close(a: Point2<f32>, b: Point2<f32>, tol: f32) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = tol);
        assert_abs_diff_eq!(a.y, b.y, epsilon = tol);
    }

    #[test]
    fn unit_square_lands_on_corners() {
        let quad = [
            Point2::new(10.0_f32, 80.0),
            Point2::new(90.0, 70.0),
            Point2::new(85.0, 5.0),
            Point2::new(15.0, 12.0),
        ];
        let h = Homography::new(unit_square_to_quad(&quad).unwrap());
        let square = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        for (s, q) in square.iter().zip(&quad) {
            assert_close(h.apply(*s), *q, 1e-3);
        }
    }

    #[test]
    fn maps_module_grid_onto_rotated_quad() {
        // 12x12 module grid onto a square rotated by 90 degrees.
        let grid = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(12.0, 0.0),
            Point2::new(12.0, 12.0),
            Point2::new(0.0, 12.0),
        ];
        let quad = [
            Point2::new(100.0_f32, 10.0),
            Point2::new(100.0, 70.0),
            Point2::new(40.0, 70.0),
            Point2::new(40.0, 10.0),
        ];
        let h = homography_from_4pt(&grid, &quad).unwrap();
        for (g, q) in grid.iter().zip(quad.iter()) {
            assert_close(h.apply(*g), *q, 1e-3);
        }
        assert_close(h.apply(Point2::new(6.0, 6.0)), Point2::new(70.0, 40.0), 1e-3);
    }

    #[test]
    fn perspective_quad_is_recovered() {
        let truth = Homography::new(Matrix3::new(
            0.8, 0.05, 120.0, //
            -0.02, 1.1, 80.0, //
            0.0009, -0.0004, 1.0,
        ));
        let rect = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(18.0, 0.0),
            Point2::new(18.0, 8.0),
            Point2::new(0.0, 8.0),
        ];
        let dst = rect.map(|p| truth.apply(p));
        let h = homography_from_4pt(&rect, &dst).unwrap();

        for p in [
            Point2::new(0.5_f32, 0.5),
            Point2::new(9.0, 4.0),
            Point2::new(17.5, 7.5),
        ] {
            assert_close(h.apply(p), truth.apply(p), 1e-2);
        }
        let back = h.inverse().unwrap();
        assert_close(back.apply(dst[2]), rect[2], 1e-3);
    }

    #[test]
    fn collapsed_quad_is_rejected() {
        let rect = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let dst = [Point2::new(5.0_f32, 5.0); 4];
        assert!(homography_from_4pt(&rect, &dst).is_none());

        let collinear = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
            Point2::new(3.0, 3.0),
        ];
        assert!(homography_from_4pt(&collinear, &rect).is_none());
    }
}
