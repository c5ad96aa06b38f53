use serde::{Deserialize, Serialize};

use crate::geometry::{ConstructionPlane, Point2};

/// A curve drawn in a sketch, in plane coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SketchCurve {
    Line { start: Point2, end: Point2 },
    Circle { center: Point2, radius: f64 },
}

/// Direction a closed loop runs around the sketch plane normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Winding {
    CounterClockwise,
    Clockwise,
}

/// A closed planar loop of sketch curves, ready for one extrude or revolve.
///
/// Line loops are stored in traversal order: each curve's end is the next
/// curve's start. A circle is a loop on its own and is always counter-clockwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchProfile {
    pub plane: ConstructionPlane,
    pub curves: Vec<SketchCurve>,
    pub winding: Winding,
}

impl SketchProfile {
    /// Build a profile from an ordered loop, deriving the winding from the
    /// signed area.
    pub fn from_loop(plane: ConstructionPlane, curves: Vec<SketchCurve>) -> Self {
        let winding = if signed_area(&curves) < 0.0 {
            Winding::Clockwise
        } else {
            Winding::CounterClockwise
        };
        Self {
            plane,
            curves,
            winding,
        }
    }

    /// Start points of a line loop in traversal order. Empty for a circle.
    pub fn vertices(&self) -> Vec<Point2> {
        self.curves
            .iter()
            .filter_map(|c| match c {
                SketchCurve::Line { start, .. } => Some(*start),
                SketchCurve::Circle { .. } => None,
            })
            .collect()
    }

    /// The circle, if this profile is a single circle.
    pub fn as_circle(&self) -> Option<(Point2, f64)> {
        match self.curves.as_slice() {
            [SketchCurve::Circle { center, radius }] => Some((*center, *radius)),
            _ => None,
        }
    }

    pub fn signed_area(&self) -> f64 {
        signed_area(&self.curves)
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Area-weighted centroid of the enclosed region.
    pub fn centroid(&self) -> Point2 {
        if let Some((center, _)) = self.as_circle() {
            return center;
        }
        let pts = self.vertices();
        let a = shoelace(&pts);
        if a.abs() < 1e-15 {
            let n = pts.len().max(1) as f64;
            let (sx, sy) = pts.iter().fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
            return Point2::new(sx / n, sy / n);
        }
        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..pts.len() {
            let p = pts[i];
            let q = pts[(i + 1) % pts.len()];
            let cross = p.x * q.y - q.x * p.y;
            cx += (p.x + q.x) * cross;
            cy += (p.y + q.y) * cross;
        }
        Point2::new(cx / (6.0 * a), cy / (6.0 * a))
    }

    /// Point-in-region test. Points on the boundary count as inside.
    pub fn contains(&self, p: Point2, tol: f64) -> bool {
        if let Some((center, radius)) = self.as_circle() {
            return center.distance_to(&p) <= radius + tol;
        }
        let pts = self.vertices();
        if pts.len() < 3 {
            return false;
        }
        for i in 0..pts.len() {
            if distance_to_segment(p, pts[i], pts[(i + 1) % pts.len()]) <= tol {
                return true;
            }
        }
        // Even-odd ray cast along +x.
        let mut inside = false;
        let mut j = pts.len() - 1;
        for i in 0..pts.len() {
            let (a, b) = (pts[i], pts[j]);
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Shortest distance from an interior point to the loop boundary.
    pub fn boundary_distance(&self, p: Point2) -> f64 {
        if let Some((center, radius)) = self.as_circle() {
            return (radius - center.distance_to(&p)).abs();
        }
        let pts = self.vertices();
        (0..pts.len())
            .map(|i| distance_to_segment(p, pts[i], pts[(i + 1) % pts.len()]))
            .fold(f64::INFINITY, f64::min)
    }
}

fn signed_area(curves: &[SketchCurve]) -> f64 {
    let mut twice = 0.0;
    for curve in curves {
        match curve {
            SketchCurve::Line { start, end } => twice += start.x * end.y - end.x * start.y,
            SketchCurve::Circle { radius, .. } => {
                twice += 2.0 * std::f64::consts::PI * radius * radius
            }
        }
    }
    twice / 2.0
}

fn shoelace(pts: &[Point2]) -> f64 {
    let n = pts.len();
    let mut twice = 0.0;
    for i in 0..n {
        let p = pts[i];
        let q = pts[(i + 1) % n];
        twice += p.x * q.y - q.x * p.y;
    }
    twice / 2.0
}

/// Distance from `p` to the closed segment `a`–`b`.
pub fn distance_to_segment(p: Point2, a: Point2, b: Point2) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq < 1e-24 {
        return p.distance_to(&a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(&Point2::new(a.x + t * dx, a.y + t * dy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(reverse: bool) -> SketchProfile {
        let mut pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        if reverse {
            pts.reverse();
        }
        let curves = (0..4)
            .map(|i| SketchCurve::Line {
                start: pts[i],
                end: pts[(i + 1) % 4],
            })
            .collect();
        SketchProfile::from_loop(ConstructionPlane::XY, curves)
    }

    #[test]
    fn winding_follows_traversal_direction() {
        assert_eq!(square(false).winding, Winding::CounterClockwise);
        assert_eq!(square(true).winding, Winding::Clockwise);
        assert_relative_eq!(square(true).area(), 4.0);
    }

    #[test]
    fn centroid_and_containment() {
        let sq = square(true);
        let c = sq.centroid();
        assert_relative_eq!(c.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(c.y, 1.0, epsilon = 1e-12);
        assert!(sq.contains(Point2::new(0.5, 1.5), 1e-9));
        assert!(sq.contains(Point2::new(2.0, 1.0), 1e-9));
        assert!(!sq.contains(Point2::new(2.5, 1.0), 1e-9));
        assert_relative_eq!(sq.boundary_distance(c), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn circle_profile_is_counter_clockwise() {
        let p = SketchProfile::from_loop(
            ConstructionPlane::XY,
            vec![SketchCurve::Circle {
                center: Point2::ORIGIN,
                radius: 0.25,
            }],
        );
        assert_eq!(p.winding, Winding::CounterClockwise);
        assert_relative_eq!(p.area(), std::f64::consts::PI * 0.0625);
        assert!(p.vertices().is_empty());
    }
}
