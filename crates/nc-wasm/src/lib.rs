//! WASM bridge for Node Canvas: exposes the canvas controller to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. Every input handler returns
//! the store commands it produced as a JSON array; the host forwards them
//! to its own store. An in-memory store mirrors them so the bridge can
//! render without a round trip.

mod render2d;

use nc_core::{CanvasConfig, Diagram, DiagramSnapshot, EdgeKind, NodeId, Viewport};
use nc_editor::{
    CanvasCommand, CanvasController, ConnectOutcome, DiagramStore, GestureState, InputEvent,
    MemoryStore, Modifiers, PointerButton, RejectReason, Selection,
};
use nc_render::style_for;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// The WASM-facing canvas.
///
/// Holds the controller and a mirror of the store. All interaction from
/// the host page goes through this struct.
#[wasm_bindgen]
pub struct NcCanvas {
    controller: CanvasController,
    store: MemoryStore,
    width: f64,
    height: f64,
    /// Dark mode flag: `false` = light (default), `true` = dark.
    dark_mode: bool,
}

#[wasm_bindgen]
impl NcCanvas {
    /// Create a canvas with the default config and an empty diagram.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();

        let mut controller = CanvasController::new(CanvasConfig::default());
        controller.set_surface_size(width, height);
        Self {
            controller,
            store: MemoryStore::default(),
            width,
            height,
            dark_mode: false,
        }
    }

    /// Replace the diagram with a JSON snapshot. Returns `false` (and keeps
    /// the previous diagram) if the snapshot is malformed.
    pub fn load_snapshot(&mut self, json: &str) -> bool {
        let snapshot: DiagramSnapshot = match serde_json::from_str(json) {
            Ok(s) => s,
            Err(err) => {
                log::error!("snapshot rejected: {err}");
                return false;
            }
        };
        match Diagram::from_snapshot(&snapshot) {
            Ok(diagram) => {
                self.store.diagram = diagram;
                true
            }
            Err(err) => {
                log::error!("snapshot rejected: {err}");
                false
            }
        }
    }

    /// Current diagram as a JSON snapshot.
    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.store.diagram.snapshot()).unwrap_or_default()
    }

    /// Swap in a new config. Viewport and selection carry over.
    pub fn load_config(&mut self, json: &str) -> bool {
        let config = match CanvasConfig::from_json(json) {
            Ok(c) => c,
            Err(err) => {
                log::error!("config rejected: {err}");
                return false;
            }
        };
        let viewport = *self.controller.viewport();
        let selection = self.controller.selection().clone();
        self.controller = CanvasController::new(config);
        self.controller.set_viewport(viewport);
        self.controller.set_selection(selection);
        self.controller.set_surface_size(self.width, self.height);
        true
    }

    // ─── Input ───────────────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        button: i16,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        self.dispatch(InputEvent::PointerDown {
            x,
            y,
            button: PointerButton::from_dom(button),
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        })
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64) -> String {
        self.dispatch(InputEvent::PointerMove { x, y })
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64) -> String {
        self.dispatch(InputEvent::PointerUp { x, y })
    }

    /// `pointercancel`, lost capture, or window blur.
    pub fn handle_pointer_cancel(&mut self) -> String {
        self.dispatch(InputEvent::PointerCancel)
    }

    pub fn handle_double_click(&mut self, x: f64, y: f64) -> String {
        self.dispatch(InputEvent::DoubleClick { x, y })
    }

    pub fn handle_wheel(&mut self, x: f64, y: f64, delta_y: f64) -> String {
        self.dispatch(InputEvent::Wheel { x, y, delta_y })
    }

    pub fn handle_key(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> String {
        self.dispatch(InputEvent::Key {
            key: key.to_string(),
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        })
    }

    // ─── Connections ─────────────────────────────────────────────────────

    /// Start a connection from a node's handle. Returns
    /// `{"outcome":"started"}` or `{"outcome":"rejected","reason":"..."}`.
    pub fn start_connection(&mut self, node_id: &str, kind: Option<String>) -> String {
        let kind = kind.as_deref().map(EdgeKind::from_tag);
        let outcome =
            self.controller
                .start_connection(NodeId::intern(node_id), kind, &self.store.diagram);
        outcome_json(outcome, &[])
    }

    /// Complete the connection in progress onto `node_id`.
    pub fn complete_connection(&mut self, node_id: &str) -> String {
        let (outcome, commands) = self
            .controller
            .complete_connection(NodeId::intern(node_id), &self.store.diagram);
        self.store.apply_all(&commands);
        outcome_json(outcome, &commands)
    }

    pub fn cancel_connection(&mut self) -> bool {
        self.controller.cancel_connection()
    }

    /// Real extents measured by the host for a node.
    pub fn report_bounds(&mut self, node_id: &str, width: f64, height: f64) -> bool {
        self.controller
            .report_bounds(&mut self.store.diagram, NodeId::intern(node_id), width, height)
    }

    // ─── State ───────────────────────────────────────────────────────────

    pub fn viewport_json(&self) -> String {
        serde_json::to_string(self.controller.viewport()).unwrap_or_default()
    }

    /// Adopt a viewport from the store. Zoom is clamped to the config range.
    pub fn set_viewport_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<Viewport>(json) {
            Ok(viewport) => {
                self.controller.set_viewport(viewport);
                self.store.viewport = *self.controller.viewport();
                true
            }
            Err(err) => {
                log::error!("viewport rejected: {err}");
                false
            }
        }
    }

    pub fn selection_json(&self) -> String {
        serde_json::to_string(self.controller.selection()).unwrap_or_default()
    }

    pub fn set_selection_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<Selection>(json) {
            Ok(selection) => {
                self.store.selection = selection.clone();
                self.controller.set_selection(selection);
                true
            }
            Err(err) => {
                log::error!("selection rejected: {err}");
                false
            }
        }
    }

    /// Name of the live gesture: `idle`, `panning`, `dragging-node`, or
    /// `connecting`.
    pub fn gesture_state(&self) -> String {
        self.controller.gesture().name().to_string()
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.controller.set_surface_size(width, height);
    }

    pub fn set_theme(&mut self, dark: bool) {
        self.dark_mode = dark;
    }

    /// Render edges, the temporary connection path, and node outlines.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let theme = if self.dark_mode {
            render2d::CanvasTheme::dark()
        } else {
            render2d::CanvasTheme::light()
        };
        let routed = self.controller.routed_edges(&self.store.diagram);
        let temporary = self.controller.temporary_path(&self.store.diagram).map(|path| {
            let kind = match *self.controller.gesture() {
                GestureState::Connecting { kind, .. } => kind.unwrap_or_default(),
                _ => EdgeKind::default(),
            };
            (path, style_for(kind))
        });
        let selection = self.controller.selection();
        let frame = render2d::Frame {
            diagram: &self.store.diagram,
            displaced: self.controller.displaced(),
            viewport: self.controller.viewport(),
            config: self.controller.config(),
            routed: &routed,
            temporary,
            active_node: selection.active_node,
            active_edge: selection.active_edge,
            selected: &selection.selected,
            width: self.width,
            height: self.height,
        };
        render2d::render_frame(ctx, &frame, &theme);
    }
}

impl NcCanvas {
    fn dispatch(&mut self, event: InputEvent) -> String {
        let commands = self.controller.handle(&event, &self.store.diagram);
        self.store.apply_all(&commands);
        commands_json(&commands)
    }
}

fn commands_json(commands: &[CanvasCommand]) -> String {
    serde_json::to_string(commands).unwrap_or_else(|_| "[]".to_string())
}

fn outcome_json(outcome: ConnectOutcome, commands: &[CanvasCommand]) -> String {
    let value = match outcome {
        ConnectOutcome::Started => serde_json::json!({ "outcome": "started" }),
        ConnectOutcome::Completed(edge) => serde_json::json!({
            "outcome": "completed",
            "edgeId": edge.as_str(),
            "commands": commands,
        }),
        ConnectOutcome::Rejected(reason) => {
            let reason = match reason {
                RejectReason::SelfLoop => "self-loop",
                RejectReason::UnknownNode => "unknown-node",
                RejectReason::Busy => "busy",
                RejectReason::NotConnecting => "not-connecting",
            };
            serde_json::json!({ "outcome": "rejected", "reason": reason })
        }
    };
    value.to_string()
}

/// Route panics to the browser console.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("NC WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
