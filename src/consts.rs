//! Shared numeric constants for the diagram crate.

// ── Grid ────────────────────────────────────────────────────────

/// Spacing between grid dots in logical units.
pub const GRID_SPACING: f64 = 100.0;

/// Smallest accepted grid spacing; bounds the dot count per frame.
pub const GRID_MIN_SPACING: f64 = 10.0;

/// The grid is only drawn while the zoom factor is strictly below this.
pub const GRID_MAX_ZOOM: f64 = 5.0;

/// Dot radius for lattice cells with even checkerboard parity.
pub const GRID_DOT_RADIUS_MAJOR: f64 = 8.0;

/// Dot radius for lattice cells with odd checkerboard parity.
pub const GRID_DOT_RADIUS_MINOR: f64 = 6.0;

// ── Selection ───────────────────────────────────────────────────

/// Side length of the square corner handles drawn on the selected element.
pub const HANDLE_SIZE: f64 = 10.0;

/// Line width of the selection outline.
pub const SELECTION_LINE_WIDTH: f64 = 2.0;

// ── Colours ─────────────────────────────────────────────────────

/// Fill and stroke colour for diagram elements.
pub const ACCENT_COLOR: &str = "#3F6FD8";

/// Colour of the selection outline and corner handles.
pub const HANDLE_COLOR: &str = "#F2A33A";

/// Colour of the background grid dots.
pub const GRID_COLOR: &str = "#D9DCE1";

// ── Persistence ─────────────────────────────────────────────────

/// Key under which the element list is stored.
pub const STORAGE_KEY: &str = "diagram.elements";
