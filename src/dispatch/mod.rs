//! Agent and admin actions on applications.
//!
//! Every action flips the local record first, then calls the backend, and
//! reverts the local change if the call fails. At most one action per
//! record is in flight at a time.

pub mod board;
pub mod dispatcher;
pub mod optimistic;

pub use board::{ApplicationBoard, InFlight, InFlightGuard};
pub use dispatcher::{Action, ActionDispatcher};
pub use optimistic::{RecordPatch, perform_optimistic_action};
