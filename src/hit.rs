#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;

/// Which corner of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    Nw,
    Ne,
    Se,
    Sw,
}

impl Corner {
    /// All four corners, clockwise from the top-left.
    pub const ALL: [Corner; 4] = [Corner::Nw, Corner::Ne, Corner::Se, Corner::Sw];
}

/// Whether `pt` lies strictly inside the box at `(x, y)` with extents `w`, `h`.
///
/// Points on an edge are outside. Negative extents are measured from the
/// opposite side, so a box still being dragged out is handled too.
#[must_use]
pub fn strictly_inside(pt: Point, x: f64, y: f64, w: f64, h: f64) -> bool {
    let (min_x, max_x) = if w < 0.0 { (x + w, x) } else { (x, x + w) };
    let (min_y, max_y) = if h < 0.0 { (y + h, y) } else { (y, y + h) };
    pt.x > min_x && pt.x < max_x && pt.y > min_y && pt.y < max_y
}

/// Position of a corner of the box at `(x, y)` with extents `w`, `h`.
#[must_use]
pub fn corner_position(corner: Corner, x: f64, y: f64, w: f64, h: f64) -> Point {
    match corner {
        Corner::Nw => Point::new(x, y),
        Corner::Ne => Point::new(x + w, y),
        Corner::Se => Point::new(x + w, y + h),
        Corner::Sw => Point::new(x, y + h),
    }
}

/// Corner handle positions in `Corner::ALL` order.
#[must_use]
pub fn corner_handle_positions(x: f64, y: f64, w: f64, h: f64) -> [Point; 4] {
    Corner::ALL.map(|c| corner_position(c, x, y, w, h))
}
