use tracing::debug;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Camera, Point};
use crate::config::EngineConfig;
use crate::doc::{DiagramElement, DocStore, ElementId};
use crate::input::{Button, Cursor, InteractionState, Key, Modifiers, PlacementKind, ToolMode, UiState, WheelDelta};
use crate::persist::{self, KeyValueStore, LocalStorage, PersistError};
use crate::render::{self, Surface, SurfaceError};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The scene changed and must be repainted.
    RenderNeeded,
    SetCursor(Cursor),
    /// A creation gesture finished; carries the finalized element.
    ElementCreated(DiagramElement),
    /// An attribute edit was applied to the selected element.
    ElementUpdated(DiagramElement),
    ElementDeleted(ElementId),
    SelectionChanged(Option<ElementId>),
    /// The element collection changed; the host should persist `snapshot()`.
    SaveRequested,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no drawing surface is bound")]
    SurfaceUnbound,
    #[error("no element is selected")]
    NoSelection,
    #[error("invalid layout size: {width}x{height}")]
    InvalidLayout { width: f64, height: f64 },
    #[error("invalid corner radius: {0}")]
    InvalidCornerRadius(f64),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Attribute edits for the selected element. Only present fields are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElementPatch {
    pub corner_radius: Option<f64>,
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
#[derive(Debug)]
pub struct EngineCore {
    doc: DocStore,
    camera: Camera,
    ui: UiState,
    input: InteractionState,
    config: EngineConfig,
    surface_width: f64,
    surface_height: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::from_valid_config(EngineConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a core with a host-supplied configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if the configuration fails validation.
    pub fn with_config(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: EngineConfig) -> Self {
        Self {
            doc: DocStore::new(),
            camera: Camera::with_zoom(config.zoom),
            ui: UiState::default(),
            input: InteractionState::Idle,
            config,
            surface_width: 0.0,
            surface_height: 0.0,
        }
    }

    // --- Data inputs ---

    /// Replace the diagram with previously persisted elements.
    pub fn load(&mut self, elements: Vec<DiagramElement>) -> Vec<Action> {
        self.doc.replace_all(elements);
        vec![Action::RenderNeeded]
    }

    /// Decode and load a persisted JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Persist`] for a malformed payload; the current
    /// diagram is left untouched.
    pub fn load_json(&mut self, raw: &str) -> Result<Vec<Action>, EngineError> {
        let elements = persist::decode(raw)?;
        Ok(self.load(elements))
    }

    /// A copy of every element, in draw order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<DiagramElement> {
        self.doc.to_vec()
    }

    /// Record the host layout size and derive the surface pixel size from it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidLayout`] for zero, negative, or
    /// non-finite dimensions.
    pub fn set_surface_size(&mut self, layout_width: f64, layout_height: f64) -> Result<(f64, f64), EngineError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(layout_width) || !valid(layout_height) {
            return Err(EngineError::InvalidLayout { width: layout_width, height: layout_height });
        }
        let (w, h) = self.camera.surface_size(layout_width, layout_height);
        self.surface_width = w;
        self.surface_height = h;
        debug!(width = w, height = h, "surface resized");
        Ok((w, h))
    }

    // --- Tools ---

    /// Arm a placement kind, or disarm with `None`.
    pub fn select_item(&mut self, kind: Option<PlacementKind>) -> Vec<Action> {
        let cancelled_preview = self.input.provisional().is_some();
        self.ui.armed = kind;
        let actions = match kind {
            Some(kind) => {
                self.ui.mode = ToolMode::CreateRectangle;
                self.transition(InteractionState::ItemSelectedForPlacement { kind });
                vec![Action::SetCursor(Cursor::Crosshair)]
            }
            None => {
                self.ui.mode = ToolMode::Pan;
                self.transition(InteractionState::Idle);
                vec![Action::SetCursor(Cursor::Default)]
            }
        };
        with_render_if(actions, cancelled_preview)
    }

    /// Switch the toolbar mode. Selecting the current mode does nothing.
    pub fn select_mode(&mut self, mode: ToolMode) -> Vec<Action> {
        if mode == self.ui.mode {
            return Vec::new();
        }
        debug!(from = ?self.ui.mode, to = ?mode, "tool mode changed");
        match mode {
            ToolMode::Pan => self.enter_idle(),
            ToolMode::Select => {
                let cancelled_preview = self.input.provisional().is_some();
                self.ui.mode = ToolMode::Select;
                self.ui.armed = None;
                self.transition(InteractionState::SelectReady);
                with_render_if(vec![Action::SetCursor(Cursor::Default)], cancelled_preview)
            }
            ToolMode::CreateRectangle => self.select_item(Some(PlacementKind::RoundedRect)),
        }
    }

    /// Abandon any gesture and return to panning.
    pub fn enter_idle(&mut self) -> Vec<Action> {
        let cancelled_preview = self.input.provisional().is_some();
        self.ui.mode = ToolMode::Pan;
        self.ui.armed = None;
        self.transition(InteractionState::Idle);
        with_render_if(vec![Action::SetCursor(Cursor::Default)], cancelled_preview)
    }

    // --- Attribute editing ---

    /// Apply `patch` to the selected element. Without a selection this is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidCornerRadius`] for a negative or
    /// non-finite radius.
    pub fn update_selected(&mut self, patch: ElementPatch) -> Result<Vec<Action>, EngineError> {
        let Some(id) = self.doc.selected_id() else {
            return Ok(Vec::new());
        };
        if let Some(radius) = patch.corner_radius {
            if !radius.is_finite() || radius < 0.0 {
                return Err(EngineError::InvalidCornerRadius(radius));
            }
        }
        let Some(element) = self.doc.get_mut(&id) else {
            return Ok(Vec::new());
        };
        if let Some(radius) = patch.corner_radius {
            element.corner_radius = radius;
        }
        debug!(%id, corner_radius = element.corner_radius, "selected element updated");
        Ok(vec![Action::ElementUpdated(element.clone()), Action::RenderNeeded, Action::SaveRequested])
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        match self.input {
            InteractionState::Idle => {
                self.transition(InteractionState::Dragging { anchor: screen_pt });
                vec![Action::SetCursor(Cursor::Grabbing)]
            }
            InteractionState::ItemSelectedForPlacement { kind } => {
                let anchor = self.camera.to_logical(screen_pt);
                let provisional = DiagramElement::new(anchor.x, anchor.y, 0.0, 0.0);
                self.transition(InteractionState::CreatingElement { kind, anchor, provisional });
                vec![Action::RenderNeeded]
            }
            InteractionState::SelectReady => {
                let hit = self.doc.find_element_at(self.camera.to_logical(screen_pt));
                let before = self.doc.selected_id();
                let after = self.doc.set_selected(hit);
                if before == after {
                    vec![Action::RenderNeeded]
                } else {
                    vec![Action::SelectionChanged(after), Action::RenderNeeded]
                }
            }
            InteractionState::Dragging { .. } | InteractionState::CreatingElement { .. } => Vec::new(),
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        match &mut self.input {
            InteractionState::Dragging { anchor } => {
                self.camera.pan_by_raw(screen_pt - *anchor);
                *anchor = screen_pt;
                vec![Action::RenderNeeded]
            }
            InteractionState::CreatingElement { anchor, provisional, .. } => {
                let current = self.camera.to_logical(screen_pt);
                provisional.width = current.x - anchor.x;
                provisional.height = current.y - anchor.y;
                vec![Action::RenderNeeded]
            }
            _ => Vec::new(),
        }
    }

    /// Finish the current gesture. A creation gesture is finalized with the
    /// geometry left by the last pointer-move.
    pub fn on_pointer_up(&mut self, _screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        match &self.input {
            InteractionState::Dragging { .. } => {
                self.transition(InteractionState::Idle);
                vec![Action::SetCursor(Cursor::Default)]
            }
            InteractionState::CreatingElement { provisional, .. } => {
                let provisional = provisional.clone();
                self.finalize_creation(provisional)
            }
            _ => Vec::new(),
        }
    }

    /// Wheel hook. Zoom is fixed for the lifetime of the engine, so wheel
    /// input is accepted and ignored.
    pub fn on_wheel(&mut self, _screen_pt: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        debug!(dx = delta.dx, dy = delta.dy, "wheel ignored; zoom is fixed");
        Vec::new()
    }

    pub fn on_key_down(&mut self, key: Key, _modifiers: Modifiers) -> Vec<Action> {
        if key.is_escape() {
            return self.cancel();
        }
        if key.is_delete() {
            return self.delete_selected();
        }
        Vec::new()
    }

    pub fn on_key_up(&mut self, _key: Key, _modifiers: Modifiers) -> Vec<Action> {
        Vec::new()
    }

    // --- Render ---

    /// Repaint the whole scene onto `surface`.
    ///
    /// # Errors
    ///
    /// Propagates surface failures.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<(), EngineError> {
        render::draw(
            surface,
            &self.doc,
            &self.camera,
            self.input.provisional(),
            &self.config,
            self.surface_width,
            self.surface_height,
        )?;
        Ok(())
    }

    // --- Queries ---

    /// The currently selected element id, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ElementId> {
        self.doc.selected_id()
    }

    /// The selected element.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoSelection`] when nothing is selected.
    pub fn selected_element(&self) -> Result<&DiagramElement, EngineError> {
        self.doc.selected().ok_or(EngineError::NoSelection)
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn doc(&self) -> &DocStore {
        &self.doc
    }

    #[must_use]
    pub fn mode(&self) -> ToolMode {
        self.ui.mode
    }

    #[must_use]
    pub fn ui(&self) -> UiState {
        self.ui
    }

    #[must_use]
    pub fn state(&self) -> &InteractionState {
        &self.input
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Surface size in pixels, `(0, 0)` until a layout size is set.
    #[must_use]
    pub fn surface_size(&self) -> (f64, f64) {
        (self.surface_width, self.surface_height)
    }

    // --- Internals ---

    fn transition(&mut self, next: InteractionState) {
        debug!(from = self.input.name(), to = next.name(), "interaction state changed");
        self.input = next;
    }

    fn finalize_creation(&mut self, provisional: DiagramElement) -> Vec<Action> {
        let mut element = provisional.normalized();
        element.selected = true;
        let created = element.clone();
        let id = self.doc.add_element(element);

        self.ui.mode = ToolMode::Select;
        self.ui.armed = None;
        self.transition(InteractionState::SelectReady);
        debug!(%id, x = created.x, y = created.y, width = created.width, height = created.height, "element created");

        vec![
            Action::ElementCreated(created),
            Action::SelectionChanged(Some(id)),
            Action::SetCursor(Cursor::Default),
            Action::RenderNeeded,
            Action::SaveRequested,
        ]
    }

    /// Escape: drop an in-flight creation back to armed placement, otherwise
    /// clear the selection.
    fn cancel(&mut self) -> Vec<Action> {
        if let InteractionState::CreatingElement { kind, .. } = self.input {
            self.transition(InteractionState::ItemSelectedForPlacement { kind });
            return vec![Action::RenderNeeded];
        }
        if self.doc.selected_id().is_some() {
            self.doc.set_selected(None);
            return vec![Action::SelectionChanged(None), Action::RenderNeeded];
        }
        Vec::new()
    }

    fn delete_selected(&mut self) -> Vec<Action> {
        if self.input.provisional().is_some() {
            return Vec::new();
        }
        let Some(id) = self.doc.selected_id() else {
            return Vec::new();
        };
        if self.doc.remove(&id).is_none() {
            return Vec::new();
        }
        debug!(%id, "element deleted");
        vec![
            Action::ElementDeleted(id),
            Action::SelectionChanged(None),
            Action::RenderNeeded,
            Action::SaveRequested,
        ]
    }
}

fn with_render_if(mut actions: Vec<Action>, render: bool) -> Vec<Action> {
    if render {
        actions.push(Action::RenderNeeded);
    }
    actions
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas
/// element and, optionally, the store the diagram is persisted to.
///
/// Handlers repaint on `RenderNeeded` and save on `SaveRequested` before
/// returning the actions to the host, which still owns cursor changes.
pub struct Engine {
    canvas: Option<HtmlCanvasElement>,
    store: Option<Box<dyn KeyValueStore>>,
    pub core: EngineCore,
}

impl Engine {
    /// Create an engine with no surface bound yet.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if the configuration fails validation.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Ok(Self { canvas: None, store: None, core: EngineCore::with_config(config)? })
    }

    // --- Surface ---

    /// Bind the canvas element and size it from the host layout.
    ///
    /// The layout is checked first; on error no canvas is bound.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidLayout`] for an unusable layout size, or
    /// a surface error from the first paint.
    pub fn bind_surface(
        &mut self,
        canvas: HtmlCanvasElement,
        layout_width: f64,
        layout_height: f64,
    ) -> Result<(), EngineError> {
        self.core.set_surface_size(layout_width, layout_height)?;
        self.canvas = Some(canvas);
        self.apply_surface_size()
    }

    /// Host resize notification: re-derive the canvas pixel size and repaint.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SurfaceUnbound`] before [`Engine::bind_surface`].
    pub fn on_resize(&mut self, layout_width: f64, layout_height: f64) -> Result<(), EngineError> {
        if self.canvas.is_none() {
            return Err(EngineError::SurfaceUnbound);
        }
        self.core.set_surface_size(layout_width, layout_height)?;
        self.apply_surface_size()
    }

    /// Whether a canvas is bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.canvas.is_some()
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn apply_surface_size(&self) -> Result<(), EngineError> {
        let canvas = self.canvas.as_ref().ok_or(EngineError::SurfaceUnbound)?;
        let (w, h) = self.core.surface_size();
        canvas.set_width(w.round() as u32);
        canvas.set_height(h.round() as u32);
        self.render()
    }

    /// The 2D drawing context of the bound canvas.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SurfaceUnbound`] before a canvas is bound, or a
    /// surface error if the browser refuses a 2D context.
    pub fn context(&self) -> Result<CanvasRenderingContext2d, EngineError> {
        let canvas = self.canvas.as_ref().ok_or(EngineError::SurfaceUnbound)?;
        let ctx = canvas
            .get_context("2d")
            .map_err(SurfaceError::from)?
            .ok_or_else(|| SurfaceError("2d context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SurfaceError("context is not a CanvasRenderingContext2d".into()))?;
        Ok(ctx)
    }

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SurfaceUnbound`] before a canvas is bound, or
    /// any surface failure.
    pub fn render(&self) -> Result<(), EngineError> {
        let started_ms = js_sys::Date::now();
        let mut ctx = self.context()?;
        self.core.render(&mut ctx)?;
        debug!(elapsed_ms = (js_sys::Date::now() - started_ms).max(0.0), "rendered");
        Ok(())
    }

    // --- Persistence ---

    /// Load the persisted diagram from `store` and keep the store for saves.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Persist`] if the stored payload is malformed;
    /// the store is not attached in that case.
    pub fn attach_store(&mut self, store: Box<dyn KeyValueStore>) -> Result<Vec<Action>, EngineError> {
        let elements = persist::load(store.as_ref(), &self.core.config().storage_key)?;
        self.store = Some(store);
        let actions = self.core.load(elements);
        self.process(&actions)?;
        Ok(actions)
    }

    /// [`Engine::attach_store`] with the window's `localStorage`.
    ///
    /// # Errors
    ///
    /// Fails when `localStorage` is unavailable or holds a malformed payload.
    pub fn attach_local_storage(&mut self) -> Result<Vec<Action>, EngineError> {
        let store = LocalStorage::from_window()?;
        self.attach_store(Box::new(store))
    }

    /// Write the current diagram to the attached store, if any.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn save(&mut self) -> Result<(), EngineError> {
        let Some(store) = self.store.as_deref_mut() else {
            return Ok(());
        };
        persist::save(store, &self.core.config().storage_key, &self.core.snapshot())?;
        Ok(())
    }

    // --- Delegated inputs ---

    /// # Errors
    /// Propagates render and save failures.
    pub fn select_item(&mut self, kind: Option<PlacementKind>) -> Result<Vec<Action>, EngineError> {
        let actions = self.core.select_item(kind);
        self.process(&actions)?;
        Ok(actions)
    }

    /// # Errors
    /// Propagates render and save failures.
    pub fn select_mode(&mut self, mode: ToolMode) -> Result<Vec<Action>, EngineError> {
        let actions = self.core.select_mode(mode);
        self.process(&actions)?;
        Ok(actions)
    }

    /// # Errors
    /// Propagates validation, render, and save failures.
    pub fn update_selected(&mut self, patch: ElementPatch) -> Result<Vec<Action>, EngineError> {
        let actions = self.core.update_selected(patch)?;
        self.process(&actions)?;
        Ok(actions)
    }

    /// # Errors
    /// Propagates render and save failures.
    pub fn on_pointer_down(
        &mut self,
        screen_pt: Point,
        button: Button,
        modifiers: Modifiers,
    ) -> Result<Vec<Action>, EngineError> {
        let actions = self.core.on_pointer_down(screen_pt, button, modifiers);
        self.process(&actions)?;
        Ok(actions)
    }

    /// # Errors
    /// Propagates render and save failures.
    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Result<Vec<Action>, EngineError> {
        let actions = self.core.on_pointer_move(screen_pt, modifiers);
        self.process(&actions)?;
        Ok(actions)
    }

    /// # Errors
    /// Propagates render and save failures.
    pub fn on_pointer_up(
        &mut self,
        screen_pt: Point,
        button: Button,
        modifiers: Modifiers,
    ) -> Result<Vec<Action>, EngineError> {
        let actions = self.core.on_pointer_up(screen_pt, button, modifiers);
        self.process(&actions)?;
        Ok(actions)
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_wheel(screen_pt, delta, modifiers)
    }

    /// # Errors
    /// Propagates render and save failures.
    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Result<Vec<Action>, EngineError> {
        let actions = self.core.on_key_down(key, modifiers);
        self.process(&actions)?;
        Ok(actions)
    }

    pub fn on_key_up(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_up(key, modifiers)
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn selection(&self) -> Option<ElementId> {
        self.core.selection()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.core.camera()
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<DiagramElement> {
        self.core.snapshot()
    }

    fn process(&mut self, actions: &[Action]) -> Result<(), EngineError> {
        if actions.contains(&Action::SaveRequested) {
            self.save()?;
        }
        if actions.contains(&Action::RenderNeeded) && self.canvas.is_some() {
            self.render()?;
        }
        Ok(())
    }
}
