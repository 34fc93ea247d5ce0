use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.max_x().max(other.max_x()) - x,
            self.max_y().max(other.max_y()) - y,
        )
    }
}

/// Point at `ratio` (0..=1) of the total length of a polyline.
pub fn point_along(route: &[(f64, f64)], ratio: f64) -> Option<(f64, f64)> {
    let first = *route.first()?;
    let total: f64 = route
        .windows(2)
        .map(|w| (w[1].0 - w[0].0).hypot(w[1].1 - w[0].1))
        .sum();
    if total <= 0.0 {
        return Some(first);
    }
    let mut remaining = total * ratio.clamp(0.0, 1.0);
    for w in route.windows(2) {
        let (a, b) = (w[0], w[1]);
        let seg = (b.0 - a.0).hypot(b.1 - a.1);
        if remaining <= seg && seg > 0.0 {
            let t = remaining / seg;
            return Some((a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t));
        }
        remaining -= seg;
    }
    route.last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_covers_both_rects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(-5.0, 20.0, 10.0, 5.0);
        assert_eq!(a.union(&b), Rect::new(-5.0, 0.0, 15.0, 25.0));
    }

    #[test]
    fn point_along_walks_segments() {
        let route = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)];
        assert_eq!(point_along(&route, 0.5), Some((10.0, 0.0)));
        assert_eq!(point_along(&route, 0.75), Some((10.0, 5.0)));
        assert_eq!(point_along(&route, 2.0), Some((10.0, 10.0)));
        assert_eq!(point_along(&[(3.0, 4.0)], 0.5), Some((3.0, 4.0)));
        assert_eq!(point_along(&[], 0.5), None);
    }
}
