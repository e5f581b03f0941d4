//! Cursor companion core.
//!
//! A companion follows the pointer on a pair of damped springs, leans into
//! horizontal motion, and now and then says something short. Remarks come
//! from a remote text generator and fall back to canned phrases whenever
//! that fails.

pub mod api;
pub mod companion;
pub mod constants;
pub mod motion;
pub mod persona;
pub mod prelude;
pub mod remark;
pub mod utils;

pub use companion::{Companion, CompanionView};
pub use persona::{AnimalKind, Persona};
pub use remark::{RemarkScheduler, RemarkState};
pub use utils::config::Config;
pub use utils::error::{CompanionError, CompanionResult, GeneratorError};
