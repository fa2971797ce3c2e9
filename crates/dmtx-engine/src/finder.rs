//! Finder-pattern geometry: from a blob outline to oriented symbol frames.
//!
//! A symbol's dark modules form one blob around the solid "L" (left column
//! and bottom row). Its convex hull has the L vertex and both arm ends as
//! exact corners; the fourth corner is clipped because the top-right module
//! is always light, so it is rebuilt as a parallelogram completion.

use dmtx_codec::{SymbolSize, SYMBOL_SIZES};
use nalgebra::{Point2, Vector2};

/// Quads flatter than this (second-diagonal half-width over diameter) are rejected.
const MIN_QUAD_THICKNESS: f32 = 0.15;

/// Allowed relative mismatch between arm ratio and a size's aspect ratio.
const ASPECT_TOLERANCE: f32 = 0.25;

#[inline]
fn cross(a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Monotone-chain convex hull, counter-clockwise in y-down image terms, no
/// collinear vertices.
pub(crate) fn convex_hull(points: &[Point2<f32>]) -> Vec<Point2<f32>> {
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut hull: Vec<Point2<f32>> = Vec::with_capacity(pts.len() * 2);
    for pass in 0..2 {
        let start = hull.len();
        let iter: Box<dyn Iterator<Item = &Point2<f32>>> = if pass == 0 {
            Box::new(pts.iter())
        } else {
            Box::new(pts.iter().rev())
        };
        for &p in iter {
            while hull.len() >= start + 2 {
                let a = hull[hull.len() - 2];
                let b = hull[hull.len() - 1];
                if cross(b - a, p - a) <= 0.0 {
                    hull.pop();
                } else {
                    break;
                }
            }
            hull.push(p);
        }
        // Last point of each chain is the first of the next.
        hull.pop();
    }
    hull
}

/// Approximate symbol quadrilateral `[a, c1, b, c2]` in cyclic order, where
/// `a`–`b` is the hull diameter.
///
/// When one side of the diameter is too shallow (a blob that is little more
/// than the L), its vertex is completed as a parallelogram.
pub(crate) fn quad_from_hull(hull: &[Point2<f32>]) -> Option<[Point2<f32>; 4]> {
    if hull.len() < 3 {
        return None;
    }
    let mut best = (0usize, 0usize, -1f32);
    for i in 0..hull.len() {
        for j in i + 1..hull.len() {
            let d = (hull[j] - hull[i]).norm_squared();
            if d > best.2 {
                best = (i, j, d);
            }
        }
    }
    let (a, b) = (hull[best.0], hull[best.1]);
    let len = best.2.sqrt();
    if len <= 0.0 {
        return None;
    }
    let dir = b - a;

    let mut pos = (None, 0f32);
    let mut neg = (None, 0f32);
    for &p in hull {
        let s = cross(dir, p - a) / len;
        if s > pos.1 {
            pos = (Some(p), s);
        }
        if -s > neg.1 {
            neg = (Some(p), -s);
        }
    }

    let min_dist = MIN_QUAD_THICKNESS * len;
    let mid = Point2::from((a.coords + b.coords) * 0.5);
    let reflect = |p: Point2<f32>| Point2::from(mid.coords * 2.0 - p.coords);
    let (c1, c2) = match (pos, neg) {
        ((Some(p), dp), (Some(n), dn)) if dp >= min_dist && dn >= min_dist => (p, n),
        ((Some(p), dp), _) if dp >= min_dist => (p, reflect(p)),
        (_, (Some(n), dn)) if dn >= min_dist => (reflect(n), n),
        _ => return None,
    };
    Some([a, c1, b, c2])
}

/// One orientation hypothesis: which quad vertex is the L corner and which
/// arm is vertical.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Frame {
    /// L corner; module-space bottom-left.
    pub origin: Point2<f32>,
    /// End of the vertical arm; module-space top-left.
    pub top: Point2<f32>,
    /// End of the horizontal arm; module-space bottom-right.
    pub right: Point2<f32>,
    /// Handedness is flipped relative to a symbol seen from the front.
    pub mirrored: bool,
}

impl Frame {
    /// Module-space top-right.
    pub fn far(&self) -> Point2<f32> {
        self.top + (self.right - self.origin)
    }

    /// Bottom-left, bottom-right, top-right, top-left in module space.
    pub fn corners(&self) -> [Point2<f32>; 4] {
        [self.origin, self.right, self.far(), self.top]
    }

    /// Corners as they appear in the image: L corner first, then
    /// anti-clockwise on screen for both handedness variants.
    pub fn outline(&self) -> [Point2<f32>; 4] {
        if self.mirrored {
            [self.origin, self.top, self.far(), self.right]
        } else {
            self.corners()
        }
    }

    pub fn horizontal_len(&self) -> f32 {
        (self.right - self.origin).norm()
    }

    pub fn vertical_len(&self) -> f32 {
        (self.top - self.origin).norm()
    }

    /// Smallest module pitch this frame would have for `size`.
    pub fn pitch(&self, size: &SymbolSize) -> f32 {
        (self.horizontal_len() / size.cols as f32).min(self.vertical_len() / size.rows as f32)
    }

    /// Whether `p` lies inside the frame's parallelogram.
    pub fn contains(&self, p: Point2<f32>) -> bool {
        let c = self.corners();
        let mut sign = 0f32;
        for i in 0..4 {
            let s = cross(c[(i + 1) % 4] - c[i], p - c[i]);
            if s == 0.0 {
                continue;
            }
            if sign == 0.0 {
                sign = s.signum();
            } else if s.signum() != sign {
                return false;
            }
        }
        true
    }
}

/// Every orientation of `quad`, front-facing first for each vertex.
pub(crate) fn frames(quad: &[Point2<f32>; 4], allow_mirrored: bool) -> Vec<Frame> {
    let mut out = Vec::with_capacity(8);
    for i in 0..4 {
        let origin = quad[i];
        let prev = quad[(i + 3) % 4];
        let next = quad[(i + 1) % 4];
        // A front-facing symbol turns clockwise (y-down) from the vertical
        // arm to the horizontal one.
        let (top, right) = if cross(prev - origin, next - origin) > 0.0 {
            (prev, next)
        } else {
            (next, prev)
        };
        out.push(Frame {
            origin,
            top,
            right,
            mirrored: false,
        });
        if allow_mirrored {
            out.push(Frame {
                origin,
                top: right,
                right: top,
                mirrored: true,
            });
        }
    }
    out
}

/// Symbol sizes consistent with the frame's arm ratio and pitch bound.
pub(crate) fn candidate_sizes(
    frame: &Frame,
    min_module_px: f32,
) -> impl Iterator<Item = &'static SymbolSize> + '_ {
    let h = frame.horizontal_len();
    let v = frame.vertical_len();
    let observed = if v > 0.0 { h / v } else { f32::INFINITY };
    SYMBOL_SIZES.iter().filter(move |s| {
        let aspect = s.cols as f32 / s.rows as f32;
        (observed / aspect - 1.0).abs() <= ASPECT_TOLERANCE && frame.pitch(s) >= min_module_px
    })
}
