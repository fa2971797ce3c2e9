use serde::{Deserialize, Serialize};

use crate::TagResult;

/// Integer pixel coordinate, origin at the top-left of the image, `y` pointing down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box with inclusive bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl BoundingBox {
    /// Degenerate box around a single point.
    pub fn from_point(p: Point) -> Self {
        Self {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }

    /// Smallest box containing all `points`, `None` if there are none.
    pub fn of_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut iter = points.into_iter();
        let mut bbox = Self::from_point(iter.next()?);
        for p in iter {
            bbox.include(p);
        }
        Some(bbox)
    }

    /// Box around the four corners of one tag.
    pub fn of_corners(tag: &TagResult) -> Self {
        let [c1, c2, c3, c4] = *tag.corners();
        let mut bbox = Self::from_point(c1);
        bbox.include(c2);
        bbox.include(c3);
        bbox.include(c4);
        bbox
    }

    pub fn include(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Bounding box of all corners of all `tags`; `None` for an empty sequence.
pub fn bounding_box<'a, I>(tags: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = &'a TagResult>,
{
    tags.into_iter()
        .map(BoundingBox::of_corners)
        .reduce(|acc, b| acc.union(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Payload;

    fn tag(corners: [(i32, i32); 4]) -> TagResult {
        TagResult::new(Payload::Numeric(1), corners.map(Point::from))
    }

    #[test]
    fn empty_sequence_has_no_box() {
        let tags: Vec<TagResult> = Vec::new();
        assert_eq!(bounding_box(&tags), None);
    }

    #[test]
    fn box_spans_all_corners_of_all_tags() {
        let tags = vec![
            tag([(10, 60), (60, 60), (60, 10), (10, 10)]),
            tag([(120, 80), (150, 95), (135, 125), (105, 110)]),
            tag([(5, 200), (40, 200), (40, 170), (5, 170)]),
        ];
        let bbox = bounding_box(&tags).unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                min_x: 5,
                min_y: 10,
                max_x: 150,
                max_y: 200
            }
        );
        assert_eq!(bbox.width(), 145);
        assert_eq!(bbox.height(), 190);
    }

    #[test]
    fn single_tag_box_matches_corner_extent() {
        let t = tag([(3, 9), (8, 7), (9, 2), (1, 4)]);
        let bbox = BoundingBox::of_corners(&t);
        assert_eq!((bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y), (1, 2, 9, 9));
        assert!(bbox.contains(Point::new(5, 5)));
        assert!(!bbox.contains(Point::new(10, 5)));
    }

    #[test]
    fn of_points_handles_empty_iterator() {
        assert_eq!(BoundingBox::of_points(std::iter::empty()), None);
        let b = BoundingBox::of_points([Point::new(2, 3), Point::new(-1, 7)]).unwrap();
        assert_eq!((b.min_x, b.max_y), (-1, 7));
    }
}
