//! Remark scheduling: when to ask for a remark, and how long to show it.

pub mod fallback;
mod machine;
mod scheduler;
mod timer;

pub use fallback::{is_fallback, pick_fallback, FALLBACK_PHRASES};
pub use machine::{RemarkMachine, RemarkPhase, RemarkState, RemarkTicket, Resolution};
pub use scheduler::{RemarkScheduler, SchedulerCommand};
pub use timer::DisplayTimer;
