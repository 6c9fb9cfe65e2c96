use crate::geometry::Vector2;
use crate::{Side, WINDOW_HEIGHT, WINDOW_WIDTH};

/// Number of waypoints in each lane.
pub const NUM_POINTS: usize = 15;

// Left lane as (width divisor, height fraction) pairs.
const LEFT_LANE: [(f64, f64); NUM_POINTS] = [
    (4.615, 0.0),
    (4.615, 0.09),
    (10.67, 0.09),
    (10.67, 0.20),
    (6.857, 0.20),
    (2.341, 0.20),
    (2.341, 0.35),
    (3.2, 0.35),
    (3.2, 0.61),
    (2.526, 0.61),
    (2.526, 0.90),
    (13.714, 0.90),
    (13.714, 0.65),
    (4.364, 0.65),
    (4.364, 1.0),
];

/// The two enemy lanes. The right lane mirrors the left one about the
/// vertical centerline of the window.
///
/// Waypoints are whole pixels. A path never changes after construction and
/// is shared between a game state and anything rendering it.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    left: [Vector2; NUM_POINTS],
    right: [Vector2; NUM_POINTS],
}

impl Path {
    pub fn new() -> Self {
        let mut left = [Vector2::default(); NUM_POINTS];
        let mut right = [Vector2::default(); NUM_POINTS];

        for (i, (divisor, fraction)) in LEFT_LANE.iter().enumerate() {
            let x = (WINDOW_WIDTH as f64 / divisor) as i32;
            let y = (WINDOW_HEIGHT as f64 * fraction) as i32;
            left[i] = Vector2::new(x as f32, y as f32);
            right[i] = Vector2::new((WINDOW_WIDTH - x) as f32, y as f32);
        }

        Self { left, right }
    }

    pub fn num_points(&self) -> usize {
        NUM_POINTS
    }

    /// Waypoint `index` of the given lane. Out-of-range indices clamp to the
    /// last waypoint.
    pub fn point_at(&self, side: Side, index: usize) -> Vector2 {
        let index = index.min(NUM_POINTS - 1);
        match side {
            Side::Left => self.left[index],
            Side::Right => self.right[index],
        }
    }

    /// Start and end of segment `index`, or `None` past the final waypoint.
    pub fn segment(&self, side: Side, index: usize) -> Option<(Vector2, Vector2)> {
        if index + 1 >= NUM_POINTS {
            return None;
        }
        Some((self.point_at(side, index), self.point_at(side, index + 1)))
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_count() {
        let path = Path::new();
        assert_eq!(path.num_points(), 15);
    }

    #[test]
    fn test_lane_endpoints() {
        let path = Path::new();
        let start = path.point_at(Side::Left, 0);
        assert_eq!(start, Vector2::new(325.0, 0.0));

        let end = path.point_at(Side::Left, NUM_POINTS - 1);
        assert_eq!(end.y, WINDOW_HEIGHT as f32);
    }

    #[test]
    fn test_right_lane_mirrors_left() {
        let path = Path::new();
        for i in 0..path.num_points() {
            let left = path.point_at(Side::Left, i);
            let right = path.point_at(Side::Right, i);
            assert_eq!(right.x, WINDOW_WIDTH as f32 - left.x);
            assert_eq!(right.y, left.y);
        }
    }

    #[test]
    fn test_left_lane_stays_in_left_half() {
        let path = Path::new();
        for i in 0..path.num_points() {
            assert!(path.point_at(Side::Left, i).x < WINDOW_WIDTH as f32 / 2.0);
        }
    }

    #[test]
    fn test_segments() {
        let path = Path::new();
        assert!(path.segment(Side::Right, NUM_POINTS - 2).is_some());
        assert!(path.segment(Side::Right, NUM_POINTS - 1).is_none());

        for i in 0..NUM_POINTS - 1 {
            let (a, b) = path.segment(Side::Left, i).unwrap();
            assert!(a.distance_to(&b) > 0.0, "segment {} has zero length", i);
        }
    }
}
