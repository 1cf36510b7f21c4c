// Plain 2D geometry shared by the vertex and edge renderers and the hit-test
// index. No drawing-surface dependency.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

const EPS: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        (other - self).length()
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction, or `None` for a zero vector.
    pub fn normalized(self) -> Option<Point> {
        let len = self.length();
        if len < EPS {
            return None;
        }
        Some(Point::new(self.x / len, self.y / len))
    }

    pub fn offset(self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Rotate around `center` by `radians` (y axis pointing down, so positive
    /// angles turn clockwise on screen).
    pub fn rotate_about(self, center: Point, radians: f32) -> Point {
        let (sin, cos) = radians.sin_cos();
        let d = self - center;
        Point::new(
            center.x + d.x * cos - d.y * sin,
            center.y + d.x * sin + d.y * cos,
        )
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;
    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_center(center: Point, half_width: f32, half_height: f32) -> Self {
        Self::new(
            center.x - half_width,
            center.y - half_height,
            half_width * 2.0,
            half_height * 2.0,
        )
    }

    /// Smallest rectangle holding every point; `None` when `points` is empty.
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Some(Self::new(x0, y0, x1 - x0, y1 - y0))
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Shrink by `amount` on every side. Collapses to a zero-size rectangle at
    /// the center when the inset exceeds the available space.
    pub fn inset(&self, amount: f32) -> Rect {
        let w = self.width - amount * 2.0;
        let h = self.height - amount * 2.0;
        if w < 0.0 || h < 0.0 {
            let c = self.center();
            return Rect::new(c.x, c.y, w.max(0.0), h.max(0.0));
        }
        Rect::new(self.x + amount, self.y + amount, w, h)
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left() >= self.left() - EPS
            && other.right() <= self.right() + EPS
            && other.top() >= self.top() - EPS
            && other.bottom() <= self.bottom() + EPS
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() <= other.right()
            && other.left() <= self.right()
            && self.top() <= other.bottom()
            && other.top() <= self.bottom()
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left(), self.top()),
            Point::new(self.right(), self.top()),
            Point::new(self.right(), self.bottom()),
            Point::new(self.left(), self.bottom()),
        ]
    }

    pub fn distance_to_side(&self, p: Point, side: RectSide) -> f32 {
        match side {
            RectSide::Top => p.y - self.top(),
            RectSide::Bottom => self.bottom() - p.y,
            RectSide::Left => p.x - self.left(),
            RectSide::Right => self.right() - p.x,
        }
    }

    /// The side of this rectangle farthest from `p`. Ties resolve in the
    /// order top, left, right, bottom.
    pub fn farthest_side(&self, p: Point) -> RectSide {
        let mut best = RectSide::Top;
        let mut best_distance = self.distance_to_side(p, best);
        for side in [RectSide::Left, RectSide::Right, RectSide::Bottom] {
            let d = self.distance_to_side(p, side);
            if d > best_distance {
                best = side;
                best_distance = d;
            }
        }
        best
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RectSide {
    Top,
    Left,
    Right,
    Bottom,
}

impl RectSide {
    /// Outward unit direction in screen coordinates.
    pub fn direction(self) -> Point {
        match self {
            RectSide::Top => Point::new(0.0, -1.0),
            RectSide::Bottom => Point::new(0.0, 1.0),
            RectSide::Left => Point::new(-1.0, 0.0),
            RectSide::Right => Point::new(1.0, 0.0),
        }
    }
}

pub fn ray_polygon_intersection(origin: Point, dir: Point, poly: &[Point]) -> Option<Point> {
    if poly.len() < 2 {
        return None;
    }
    let mut best_t: Option<f32> = None;
    for i in 0..poly.len() {
        let p1 = poly[i];
        let p2 = poly[(i + 1) % poly.len()];
        let s = p2 - p1;
        let q = p1 - origin;
        let denom = dir.x * s.y - dir.y * s.x;
        if denom.abs() < EPS {
            continue;
        }
        let t = (q.x * s.y - q.y * s.x) / denom;
        let u = (q.x * dir.y - q.y * dir.x) / denom;
        if t >= 0.0 && (-EPS..=1.0 + EPS).contains(&u) {
            match best_t {
                Some(best) if t >= best => {}
                _ => best_t = Some(t),
            }
        }
    }
    best_t.map(|t| origin + dir * t)
}

pub fn ray_ellipse_intersection(
    origin: Point,
    dir: Point,
    center: Point,
    rx: f32,
    ry: f32,
) -> Option<Point> {
    let o = origin - center;
    let a = (dir.x * dir.x) / (rx * rx) + (dir.y * dir.y) / (ry * ry);
    let b = 2.0 * ((o.x * dir.x) / (rx * rx) + (o.y * dir.y) / (ry * ry));
    let c = (o.x * o.x) / (rx * rx) + (o.y * o.y) / (ry * ry) - 1.0;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 || a.abs() < EPS {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let t1 = (-b - sqrt_disc) / (2.0 * a);
    let t2 = (-b + sqrt_disc) / (2.0 * a);
    let t = if t1 >= 0.0 {
        t1
    } else if t2 >= 0.0 {
        t2
    } else {
        return None;
    };
    Some(origin + dir * t)
}

pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    fn orient(a: Point, b: Point, c: Point) -> f32 {
        (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
    }
    fn on_segment(a: Point, b: Point, c: Point) -> bool {
        c.x >= a.x.min(b.x) - EPS
            && c.x <= a.x.max(b.x) + EPS
            && c.y >= a.y.min(b.y) - EPS
            && c.y <= a.y.max(b.y) + EPS
    }

    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);

    if o1.abs() < EPS && on_segment(a, b, c) {
        return true;
    }
    if o2.abs() < EPS && on_segment(a, b, d) {
        return true;
    }
    if o3.abs() < EPS && on_segment(c, d, a) {
        return true;
    }
    if o4.abs() < EPS && on_segment(c, d, b) {
        return true;
    }
    (o1 > 0.0) != (o2 > 0.0) && (o3 > 0.0) != (o4 > 0.0)
}

/// Even-odd point-in-polygon test; points on the outline count as inside.
pub fn point_in_polygon(p: Point, poly: &[Point]) -> bool {
    if poly.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let (a, b) = (poly[i], poly[j]);
        if segments_intersect(a, b, p, p) {
            return true;
        }
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

pub fn polygon_intersects_rect(poly: &[Point], rect: &Rect) -> bool {
    if poly.iter().any(|p| rect.contains(*p)) {
        return true;
    }
    if rect.corners().iter().any(|c| point_in_polygon(*c, poly)) {
        return true;
    }
    let corners = rect.corners();
    for i in 0..poly.len() {
        let a = poly[i];
        let b = poly[(i + 1) % poly.len()];
        for k in 0..4 {
            if segments_intersect(a, b, corners[k], corners[(k + 1) % 4]) {
                return true;
            }
        }
    }
    false
}

pub fn circle_intersects_rect(center: Point, radius: f32, rect: &Rect) -> bool {
    let nearest = Point::new(
        center.x.clamp(rect.left(), rect.right()),
        center.y.clamp(rect.top(), rect.bottom()),
    );
    nearest.distance(center) <= radius
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn inset_shrinks_every_side() {
        let r = Rect::new(0.0, 0.0, 50.0, 50.0).inset(5.0);
        assert_eq!(r, Rect::new(5.0, 5.0, 40.0, 40.0));
    }

    #[test]
    fn inset_collapses_to_center_when_too_large() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0).inset(8.0);
        assert_eq!(r.center(), Point::new(5.0, 5.0));
        assert_eq!(r.width, 0.0);
    }

    #[test]
    fn farthest_side_from_point_near_top() {
        let r = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(r.farthest_side(Point::new(50.0, 5.0)), RectSide::Bottom);
        assert_eq!(r.farthest_side(Point::new(95.0, 50.0)), RectSide::Left);
        assert_eq!(r.farthest_side(Point::new(5.0, 50.0)), RectSide::Right);
        assert_eq!(r.farthest_side(Point::new(50.0, 95.0)), RectSide::Top);
    }

    #[test]
    fn ray_hits_square_outline() {
        let square = Rect::from_center(Point::new(0.0, 0.0), 2.0, 2.0).corners();
        let hit = ray_polygon_intersection(Point::new(0.0, 0.0), Point::new(1.0, 0.0), &square)
            .unwrap();
        assert!(approx(hit.x, 2.0) && approx(hit.y, 0.0));
    }

    #[test]
    fn ray_hits_circle_outline() {
        let hit = ray_ellipse_intersection(
            Point::new(10.0, 10.0),
            Point::new(0.0, 1.0),
            Point::new(10.0, 10.0),
            3.0,
            3.0,
        )
        .unwrap();
        assert!(approx(hit.x, 10.0) && approx(hit.y, 13.0));
    }

    #[test]
    fn rotation_quarter_turn() {
        let p = Point::new(1.0, 0.0).rotate_about(Point::default(), std::f32::consts::FRAC_PI_2);
        assert!(approx(p.x, 0.0) && approx(p.y, 1.0));
    }

    #[test]
    fn polygon_rect_overlap_cases() {
        let tri = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 10.0),
        ];
        assert!(polygon_intersects_rect(&tri, &Rect::new(4.0, 2.0, 1.0, 1.0)));
        assert!(polygon_intersects_rect(&tri, &Rect::new(-5.0, -5.0, 30.0, 30.0)));
        assert!(!polygon_intersects_rect(&tri, &Rect::new(20.0, 20.0, 5.0, 5.0)));
    }

    #[test]
    fn circle_rect_overlap_uses_nearest_point() {
        let rect = Rect::new(10.0, 10.0, 10.0, 10.0);
        assert!(circle_intersects_rect(Point::new(8.0, 15.0), 3.0, &rect));
        assert!(!circle_intersects_rect(Point::new(7.0, 7.0), 3.0, &rect));
    }
}
