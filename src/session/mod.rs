//! Session orchestration: startup sequencing, UI-visible status, and
//! deterministic teardown.

pub mod controller;
pub mod status;

pub use controller::SessionController;
pub use status::{SessionEvent, SessionState, StatusLine};
