// Grid engine
// Time axis, overlap lanes, card geometry and the drag/resize state machine

pub mod board;
pub mod book;
pub mod drag;
pub mod interaction;
pub mod layout;
pub mod overlap;
pub mod resize;
pub mod time_axis;

pub use board::{GestureResult, ScheduleBoard};
pub use book::{AppointmentBook, Ticket};
pub use drag::{DragHover, DragSession};
pub use interaction::{
    AllowAll, EditPermission, GestureError, GestureOutcome, InteractionController,
    PreviewGeometry, Rejection, RejectionReason,
};
pub use layout::{compute_geometry, layout_day, DayLayout, Geometry, LayoutPolicy};
pub use overlap::{resolve_overlaps, AssignmentMap, SubColumnAssignment};
pub use resize::ResizeSession;
pub use time_axis::{snap_to_5_minutes, TimeAxis};
