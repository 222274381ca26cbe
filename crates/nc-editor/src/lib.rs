//! Interaction engine for the node canvas.
//!
//! [`CanvasController`] turns raw pointer, wheel, and keyboard events into
//! gesture transitions and emits [`CanvasCommand`]s for the store at commit
//! points only.

pub mod controller;
pub mod gesture;
pub mod input;
pub mod selection;
pub mod shortcuts;
pub mod store;

pub use controller::{CanvasController, ConnectOutcome, RejectReason};
pub use gesture::{GestureEnd, GestureMachine, GestureState, NodeDrag};
pub use input::{InputEvent, Modifiers, PointerButton};
pub use selection::Selection;
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use store::{CanvasCommand, DiagramStore, MemoryStore};
