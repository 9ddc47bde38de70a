//! Input model: tool modes, modifier keys, mouse buttons, and the interaction
//! state machine's states.
//!
//! `ToolMode` is the persistent tool the user picked from the host toolbar.
//! `InteractionState` is the transient phase of the current gesture; it is
//! driven by the tool mode but stored separately so neither aliases the other.
//! Each state variant carries exactly the context needed to handle the next
//! pointer event.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::doc::DiagramElement;

/// Tool selected in the host toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolMode {
    /// Drag to pan the canvas (default).
    #[default]
    Pan,
    /// Click to select elements.
    Select,
    /// Drag to create a rounded rectangle.
    CreateRectangle,
}

/// The kind of element armed for placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementKind {
    #[default]
    RoundedRect,
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` value.
    #[must_use]
    pub fn from_dom(button: i16) -> Option<Self> {
        match button {
            0 => Some(Self::Primary),
            1 => Some(Self::Middle),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the host (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape"
    }

    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.0 == "Delete" || self.0 == "Backspace"
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Pointer cursor requested from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Grabbing,
    Crosshair,
}

impl Cursor {
    /// CSS `cursor` value.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Grabbing => "grabbing",
            Self::Crosshair => "crosshair",
        }
    }
}

/// Persistent UI state visible to the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct UiState {
    /// Active toolbar mode.
    pub mode: ToolMode,
    /// Placement kind armed for the next pointer-down, if any.
    pub armed: Option<PlacementKind>,
}

/// Phase of the current interaction.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    /// Nothing in progress; a pointer-down starts a pan.
    #[default]
    Idle,
    /// The user is panning the canvas.
    Dragging {
        /// Raw pointer position of the previous event.
        anchor: Point,
    },
    /// A placement kind is armed; the next pointer-down starts creating it.
    ItemSelectedForPlacement {
        kind: PlacementKind,
    },
    /// The user is dragging out a new element.
    CreatingElement {
        kind: PlacementKind,
        /// Logical position where the gesture started.
        anchor: Point,
        /// Element under construction. Extents may be negative.
        provisional: DiagramElement,
    },
    /// Pointer-downs hit-test and select.
    SelectReady,
}

impl InteractionState {
    /// Short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging { .. } => "dragging",
            Self::ItemSelectedForPlacement { .. } => "item_selected_for_placement",
            Self::CreatingElement { .. } => "creating_element",
            Self::SelectReady => "select_ready",
        }
    }

    /// The element being created, if a creation gesture is in flight.
    #[must_use]
    pub fn provisional(&self) -> Option<&DiagramElement> {
        match self {
            Self::CreatingElement { provisional, .. } => Some(provisional),
            _ => None,
        }
    }
}
