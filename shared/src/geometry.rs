use serde::{Deserialize, Serialize};

///A point or direction in window space.
/// Positive y points down the screen.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Vector2 { x, y }
    }

    ///Returns the magnitude of the vector.
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    ///Returns the scaled vector.
    pub fn scale(&self, scalar: f32) -> Vector2 {
        Vector2 {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    ///Returns the sum of two vectors.
    pub fn add(&self, other: &Vector2) -> Vector2 {
        Vector2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    ///Returns the vector pointing from `other` to `self`.
    pub fn sub(&self, other: &Vector2) -> Vector2 {
        Vector2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    pub fn distance_to(&self, other: &Vector2) -> f32 {
        self.sub(other).magnitude()
    }

    pub fn distance_squared_to(&self, other: &Vector2) -> f32 {
        let d = self.sub(other);
        d.x * d.x + d.y * d.y
    }

    ///Linear interpolation, `t = 0` yields `self` and `t = 1` yields `other`.
    pub fn lerp(&self, other: &Vector2, t: f32) -> Vector2 {
        Vector2 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    ///Sprite heading in degrees for a sprite drawn facing up.
    pub fn heading_degrees(&self) -> f32 {
        self.y.atan2(self.x).to_degrees() + 90.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_distance() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(3.0, 4.0);
        assert_approx_eq!(a.distance_to(&b), 5.0);
        assert_approx_eq!(a.distance_squared_to(&b), 25.0);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Vector2::new(10.0, 20.0);
        let b = Vector2::new(30.0, 60.0);
        assert_eq!(a.lerp(&b, 0.0), a);
        let mid = a.lerp(&b, 0.5);
        assert_approx_eq!(mid.x, 20.0);
        assert_approx_eq!(mid.y, 40.0);
    }

    #[test]
    fn test_heading_degrees() {
        // Straight down the screen.
        assert_approx_eq!(Vector2::new(0.0, 1.0).heading_degrees(), 180.0, 1e-3);
        // Straight right.
        assert_approx_eq!(Vector2::new(1.0, 0.0).heading_degrees(), 90.0, 1e-3);
        // Straight up.
        assert_approx_eq!(Vector2::new(0.0, -1.0).heading_degrees(), 0.0, 1e-3);
    }
}
