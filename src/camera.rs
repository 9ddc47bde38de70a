#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use std::ops::{Add, Sub};

/// A point in raw pointer, surface, or logical space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Multiply both components by `factor`.
    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self { x: self.x * factor, y: self.y * factor }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

/// Pan/zoom transform between raw pointer pixels, surface pixels, and
/// logical diagram space.
///
/// Raw pointer events arrive in host layout pixels while the surface is sized
/// at `zoom` times the layout, so `zoom` is applied on the input side only.
/// `pan` is a logical-space translation applied before drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan: Point,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan: Point::default(), zoom: 1.0 }
    }
}

impl Camera {
    /// A camera with no pan at the given zoom factor.
    #[must_use]
    pub fn with_zoom(zoom: f64) -> Self {
        Self { pan: Point::default(), zoom }
    }

    /// Convert a raw pointer position to logical coordinates.
    #[must_use]
    pub fn to_logical(&self, raw: Point) -> Point {
        Point {
            x: raw.x * self.zoom - self.pan.x,
            y: raw.y * self.zoom - self.pan.y,
        }
    }

    /// Convert a logical point to surface pixel coordinates.
    #[must_use]
    pub fn to_surface(&self, logical: Point) -> Point {
        Point {
            x: logical.x + self.pan.x,
            y: logical.y + self.pan.y,
        }
    }

    /// Scale a raw pointer delta by the zoom factor and add it to the pan offset.
    pub fn pan_by_raw(&mut self, raw_delta: Point) {
        self.pan = self.pan + raw_delta.scale(self.zoom);
    }

    /// Surface pixel dimensions for a host layout size.
    #[must_use]
    pub fn surface_size(&self, layout_width: f64, layout_height: f64) -> (f64, f64) {
        (layout_width * self.zoom, layout_height * self.zoom)
    }
}
