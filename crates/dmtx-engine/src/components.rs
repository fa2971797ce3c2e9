//! Connected components of dark pixels.

use nalgebra::Point2;

use crate::budget::SearchBudget;
use crate::threshold::DarkMask;

/// One 8-connected blob of dark pixels, in search-image coordinates.
#[derive(Clone, Debug)]
pub(crate) struct Component {
    pub pixels: usize,
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
    /// `(y, leftmost x, rightmost x)` for every row the blob touches.
    pub rows: Vec<(usize, usize, usize)>,
}

impl Component {
    pub fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }

    /// Centre of the bounding box, in pixel-corner coordinates.
    pub fn center(&self) -> Point2<f32> {
        Point2::new(
            (self.min_x + self.max_x + 1) as f32 * 0.5,
            (self.min_y + self.max_y + 1) as f32 * 0.5,
        )
    }

    /// Pixel-square corners of the extreme pixels of every row.
    ///
    /// The convex hull of these points is the hull of the blob.
    pub fn outline(&self) -> Vec<Point2<f32>> {
        let mut pts = Vec::with_capacity(self.rows.len() * 4);
        for &(y, x0, x1) in &self.rows {
            let (top, bottom) = (y as f32, (y + 1) as f32);
            let (left, right) = (x0 as f32, (x1 + 1) as f32);
            pts.push(Point2::new(left, top));
            pts.push(Point2::new(left, bottom));
            pts.push(Point2::new(right, top));
            pts.push(Point2::new(right, bottom));
        }
        pts
    }
}

/// Yields components in raster order of their first pixel.
///
/// Labelling polls the budget every [`SearchBudget::LABEL_POLL_PIXELS`]
/// pixels; once it expires the iterator ends, dropping any half-built blob.
pub(crate) struct ComponentScanner<'a> {
    mask: &'a DarkMask,
    budget: &'a SearchBudget,
    min_side: usize,
    visited: Vec<bool>,
    stack: Vec<usize>,
    row_min: Vec<usize>,
    row_max: Vec<usize>,
    cursor: usize,
    since_poll: usize,
    stopped: bool,
}

impl<'a> ComponentScanner<'a> {
    /// Blobs whose bounding box is narrower than `min_side` on both axes are skipped.
    pub fn new(mask: &'a DarkMask, min_side: usize, budget: &'a SearchBudget) -> Self {
        Self {
            mask,
            budget,
            min_side: min_side.max(1),
            visited: vec![false; mask.dark.len()],
            stack: Vec::new(),
            row_min: vec![usize::MAX; mask.height],
            row_max: vec![0; mask.height],
            cursor: 0,
            since_poll: 0,
            stopped: false,
        }
    }

    fn tick(&mut self) -> bool {
        self.since_poll += 1;
        if self.since_poll >= SearchBudget::LABEL_POLL_PIXELS {
            self.since_poll = 0;
            if self.budget.expired() {
                self.stopped = true;
            }
        }
        self.stopped
    }

    fn fill(&mut self, seed: usize) -> Option<Component> {
        let w = self.mask.width;
        let h = self.mask.height;
        let (sx, sy) = (seed % w, seed / w);
        let mut comp = Component {
            pixels: 0,
            min_x: sx,
            min_y: sy,
            max_x: sx,
            max_y: sy,
            rows: Vec::new(),
        };
        self.visited[seed] = true;
        self.stack.clear();
        self.stack.push(seed);

        while let Some(idx) = self.stack.pop() {
            if self.tick() {
                self.reset_rows(comp.min_y, comp.max_y);
                return None;
            }
            let (x, y) = (idx % w, idx / w);
            comp.pixels += 1;
            comp.min_x = comp.min_x.min(x);
            comp.max_x = comp.max_x.max(x);
            comp.min_y = comp.min_y.min(y);
            comp.max_y = comp.max_y.max(y);
            self.row_min[y] = self.row_min[y].min(x);
            self.row_max[y] = self.row_max[y].max(x);

            let x_lo = x.saturating_sub(1);
            let x_hi = (x + 1).min(w - 1);
            let y_lo = y.saturating_sub(1);
            let y_hi = (y + 1).min(h - 1);
            for ny in y_lo..=y_hi {
                for nx in x_lo..=x_hi {
                    let n = ny * w + nx;
                    if self.mask.dark[n] && !self.visited[n] {
                        self.visited[n] = true;
                        self.stack.push(n);
                    }
                }
            }
        }

        comp.rows = (comp.min_y..=comp.max_y)
            .filter(|&y| self.row_min[y] != usize::MAX)
            .map(|y| (y, self.row_min[y], self.row_max[y]))
            .collect();
        self.reset_rows(comp.min_y, comp.max_y);
        Some(comp)
    }

    fn reset_rows(&mut self, y0: usize, y1: usize) {
        for y in y0..=y1 {
            self.row_min[y] = usize::MAX;
            self.row_max[y] = 0;
        }
    }
}

impl Iterator for ComponentScanner<'_> {
    type Item = Component;

    fn next(&mut self) -> Option<Component> {
        while !self.stopped && self.cursor < self.mask.dark.len() {
            let idx = self.cursor;
            self.cursor += 1;
            if self.tick() {
                return None;
            }
            if !self.mask.dark[idx] || self.visited[idx] {
                continue;
            }
            let comp = self.fill(idx)?;
            if comp.width().max(comp.height()) >= self.min_side {
                return Some(comp);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn mask_from(rows: &[&str]) -> DarkMask {
        let width = rows[0].len();
        let dark = rows
            .iter()
            .flat_map(|r| r.bytes().map(|b| b == b'#'))
            .collect();
        DarkMask {
            width,
            height: rows.len(),
            dark,
        }
    }

    #[test]
    fn diagonal_pixels_are_connected() {
        let mask = mask_from(&["#...", ".#..", "..#.", "...."]);
        let budget = SearchBudget::unbounded();
        let comps: Vec<_> = ComponentScanner::new(&mask, 1, &budget).collect();
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].pixels, 3);
        assert_eq!((comps[0].width(), comps[0].height()), (3, 3));
    }

    #[test]
    fn components_come_in_raster_order() {
        let mask = mask_from(&["...##", "#....", "#....", "..#.."]);
        let budget = SearchBudget::unbounded();
        let comps: Vec<_> = ComponentScanner::new(&mask, 1, &budget).collect();
        let firsts: Vec<_> = comps.iter().map(|c| (c.min_x, c.min_y)).collect();
        assert_eq!(firsts, vec![(3, 0), (0, 1), (2, 3)]);
    }

    #[test]
    fn small_blobs_are_skipped() {
        let mask = mask_from(&["#.....", "......", ".####.", "......"]);
        let budget = SearchBudget::unbounded();
        let comps: Vec<_> = ComponentScanner::new(&mask, 3, &budget).collect();
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].rows, vec![(2, 1, 4)]);
    }

    #[test]
    fn outline_uses_pixel_corners() {
        let mask = mask_from(&["##", "#."]);
        let budget = SearchBudget::unbounded();
        let comp = ComponentScanner::new(&mask, 1, &budget).next().unwrap();
        let outline = comp.outline();
        assert!(outline.contains(&Point2::new(2.0, 0.0)));
        assert!(outline.contains(&Point2::new(0.0, 2.0)));
        assert!(outline.contains(&Point2::new(1.0, 2.0)));
        assert_eq!(comp.center(), Point2::new(1.0, 1.0));
    }

    #[test]
    fn expired_budget_ends_the_scan() {
        let mask = DarkMask {
            width: 128,
            height: 128,
            dark: vec![true; 128 * 128],
        };
        let budget = SearchBudget::new(Some(Duration::ZERO));
        assert!(ComponentScanner::new(&mask, 1, &budget).next().is_none());
    }
}
