//! Rendering: draws the full diagram scene to a 2D drawing surface.
//!
//! The renderer receives read-only views of the shape model and camera and
//! produces drawing calls. It never mutates application state and keeps no
//! state between frames, so identical inputs always produce the identical
//! call sequence.
//!
//! Drawing goes through the [`Surface`] trait. The browser implementation
//! for [`web_sys::CanvasRenderingContext2d`] lives here too; it is the only
//! place that touches the canvas context.
//!
//! Layers, bottom first: clear, background dot grid, elements in insertion
//! order (with selection chrome), in-progress creation preview.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::consts::SELECTION_LINE_WIDTH;
use crate::doc::{DiagramElement, DocStore};
use crate::hit;

/// A drawing call on the host surface failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("surface call failed: {0}")]
pub struct SurfaceError(pub String);

impl From<JsValue> for SurfaceError {
    fn from(value: JsValue) -> Self {
        Self(format!("{value:?}"))
    }
}

/// The subset of a 2D drawing context the renderer uses.
///
/// Coordinates are surface pixels after any active translation.
pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);
    /// # Errors
    /// Returns [`SurfaceError`] if the host rejects the transform.
    fn translate(&mut self, x: f64, y: f64) -> Result<(), SurfaceError>;
    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn set_fill_style(&mut self, color: &str);
    fn set_stroke_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    /// Clockwise arc around `(x, y)` from `start` to `end` radians.
    ///
    /// # Errors
    /// Returns [`SurfaceError`] for a radius the host rejects.
    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), SurfaceError>;
    fn close_path(&mut self);
    fn fill(&mut self);
    fn stroke(&mut self);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
}

impl Surface for CanvasRenderingContext2d {
    fn save(&mut self) {
        CanvasRenderingContext2d::save(self);
    }

    fn restore(&mut self) {
        CanvasRenderingContext2d::restore(self);
    }

    fn translate(&mut self, x: f64, y: f64) -> Result<(), SurfaceError> {
        CanvasRenderingContext2d::translate(self, x, y)?;
        Ok(())
    }

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::clear_rect(self, x, y, w, h);
    }

    fn set_fill_style(&mut self, color: &str) {
        self.set_fill_style_str(color);
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.set_stroke_style_str(color);
    }

    fn set_line_width(&mut self, width: f64) {
        CanvasRenderingContext2d::set_line_width(self, width);
    }

    fn begin_path(&mut self) {
        CanvasRenderingContext2d::begin_path(self);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        CanvasRenderingContext2d::move_to(self, x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        CanvasRenderingContext2d::line_to(self, x, y);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), SurfaceError> {
        CanvasRenderingContext2d::arc(self, x, y, radius, start, end)?;
        Ok(())
    }

    fn close_path(&mut self) {
        CanvasRenderingContext2d::close_path(self);
    }

    fn fill(&mut self) {
        CanvasRenderingContext2d::fill(self);
    }

    fn stroke(&mut self) {
        CanvasRenderingContext2d::stroke(self);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::fill_rect(self, x, y, w, h);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::stroke_rect(self, x, y, w, h);
    }
}

/// Whether the background grid is drawn at this zoom level.
#[must_use]
pub fn grid_visible(camera: &Camera, config: &EngineConfig) -> bool {
    camera.zoom < config.grid_max_zoom
}

/// Draw the full scene.
///
/// `width` and `height` are the surface size in pixels. `preview` is the
/// element being created, drawn on top in normalized form.
///
/// # Errors
///
/// Returns `Err` if any surface call fails.
pub fn draw<S: Surface + ?Sized>(
    surface: &mut S,
    doc: &DocStore,
    camera: &Camera,
    preview: Option<&DiagramElement>,
    config: &EngineConfig,
    width: f64,
    height: f64,
) -> Result<(), SurfaceError> {
    // Layer 1: clear.
    surface.clear_rect(0.0, 0.0, width, height);

    // Layer 2: grid, in surface space.
    if grid_visible(camera, config) {
        draw_grid(surface, camera, config, width, height)?;
    }

    // Layer 3: elements, in logical space shifted by the pan offset.
    surface.save();
    surface.translate(camera.pan.x, camera.pan.y)?;
    for element in doc.iter() {
        draw_element(surface, element, config)?;
    }

    // Layer 4: creation preview.
    if let Some(element) = preview {
        draw_element(surface, &element.normalized(), config)?;
    }
    surface.restore();

    Ok(())
}

// =============================================================
// Grid
// =============================================================

/// Dot lattice offset by `pan mod spacing`. Dot size alternates in a
/// checkerboard keyed on the logical lattice cell, so it stays attached to
/// the diagram while panning.
///
/// Only the parity of the pan's lattice cell matters, so it is taken in
/// `f64`; the cell index itself can exceed the `i64` range.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn draw_grid<S: Surface + ?Sized>(
    surface: &mut S,
    camera: &Camera,
    config: &EngineConfig,
    width: f64,
    height: f64,
) -> Result<(), SurfaceError> {
    let spacing = config.grid_spacing;
    let offset_x = camera.pan.x.rem_euclid(spacing);
    let offset_y = camera.pan.y.rem_euclid(spacing);
    let origin_parity = i64::from(cell_parity(camera.pan.x, spacing) != cell_parity(camera.pan.y, spacing));
    let cols = (width / spacing).ceil() as i64;
    let rows = (height / spacing).ceil() as i64;

    surface.set_fill_style(&config.grid_color);
    for row in -1..=rows {
        for col in -1..=cols {
            let x = offset_x + col as f64 * spacing;
            let y = offset_y + row as f64 * spacing;
            let radius = if (col + row + origin_parity).rem_euclid(2) == 0 {
                config.grid_dot_radius_major
            } else {
                config.grid_dot_radius_minor
            };
            surface.begin_path();
            surface.arc(x, y, radius, 0.0, TAU)?;
            surface.fill();
        }
    }
    Ok(())
}

/// Whether `floor(pan / spacing)` is odd.
fn cell_parity(pan: f64, spacing: f64) -> bool {
    (pan / spacing).floor().rem_euclid(2.0) == 1.0
}

// =============================================================
// Elements
// =============================================================

fn draw_element<S: Surface + ?Sized>(
    surface: &mut S,
    element: &DiagramElement,
    config: &EngineConfig,
) -> Result<(), SurfaceError> {
    rounded_rect_path(surface, element.x, element.y, element.width, element.height, element.corner_radius)?;
    surface.set_fill_style(&config.accent_color);
    surface.fill();
    surface.set_stroke_style(&config.accent_color);
    surface.stroke();

    if element.selected {
        draw_selection(surface, element, config);
    }
    Ok(())
}

/// Rounded rectangle: start on the top edge inset by the radius, then
/// straight edges joined by clockwise quarter arcs.
///
/// The radius is clamped to half the shorter side.
fn rounded_rect_path<S: Surface + ?Sized>(
    surface: &mut S,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    radius: f64,
) -> Result<(), SurfaceError> {
    let r = radius.min(w.min(h) / 2.0).max(0.0);

    surface.begin_path();
    surface.move_to(x + r, y);
    surface.line_to(x + w - r, y);
    surface.arc(x + w - r, y + r, r, -FRAC_PI_2, 0.0)?;
    surface.line_to(x + w, y + h - r);
    surface.arc(x + w - r, y + h - r, r, 0.0, FRAC_PI_2)?;
    surface.line_to(x + r, y + h);
    surface.arc(x + r, y + h - r, r, FRAC_PI_2, PI)?;
    surface.line_to(x, y + r);
    surface.arc(x + r, y + r, r, PI, PI + FRAC_PI_2)?;
    surface.close_path();
    Ok(())
}

fn draw_selection<S: Surface + ?Sized>(surface: &mut S, element: &DiagramElement, config: &EngineConfig) {
    surface.set_stroke_style(&config.handle_color);
    surface.set_line_width(SELECTION_LINE_WIDTH);
    surface.stroke_rect(element.x, element.y, element.width, element.height);

    let size = config.handle_size;
    surface.set_fill_style(&config.handle_color);
    for pos in hit::corner_handle_positions(element.x, element.y, element.width, element.height) {
        surface.fill_rect(pos.x - size / 2.0, pos.y - size / 2.0, size, size);
    }
    surface.set_line_width(1.0);
}
