//! The drag-and-drop reorder engine.
//!
//! Leaves first: [`layout`] and [`resolver`] answer "where would it land",
//! [`session`] is the drag state machine, [`commit`] applies a finished
//! move, [`motion`] and [`settle`] drive rendering. [`binding`] runs on the
//! input context and talks to [`reorder::ReorderEngine`] on the state
//! context through [`channel`]. [`autoscroll`] scrolls the host [`surface`]
//! near the viewport edges, and [`arbiter`] keeps one drag active per
//! process.

pub mod arbiter;
pub mod autoscroll;
pub mod binding;
pub mod channel;
pub mod commit;
pub mod haptics;
pub mod layout;
pub mod motion;
pub mod reorder;
pub mod resolver;
pub mod session;
pub mod settle;
pub mod surface;

pub use arbiter::{ClaimTicket, Claimed, DragArbiter, EngineId};
pub use autoscroll::{AutoScrollConfig, AutoScrollController, ScrollDirection};
pub use binding::{BindingConfig, GestureBinding, GestureResponse, HandleRegion};
pub use channel::{
    drag_channel, CancelReason, DragEvent, DragEventReceiver, DragEventSender, GestureId,
};
pub use commit::{commit, move_item, DragEnd, DragEndCallback, ReorderCommitter};
pub use haptics::{HapticPulse, Haptics, NoHaptics, TracingHaptics};
pub use layout::LayoutRegistry;
pub use motion::{ItemMotion, ItemMotionPresenter, MotionInput};
pub use reorder::{EngineConfig, RenderState, ReorderEngine};
pub use resolver::resolve_drop_index;
pub use session::{DragPhase, DragSession};
pub use settle::{slot_displacement, SettleAnimation};
pub use surface::{ScrollSurface, SharedScrollOffset};
