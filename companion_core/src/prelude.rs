//! Common imports for front-ends.
//!
//! ```rust,ignore
//! use companion_core::prelude::*;
//! ```

pub use crate::api::{build_generator, OfflineGenerator, RemarkAction, RemarkGenerator, RemarkPrompt};
pub use crate::companion::{Companion, CompanionView};
pub use crate::motion::{MotionTracker, PointerSample, SmoothedPosition, SpringConfig, TiltRule};
pub use crate::persona::{AnimalKind, Persona, Rgb, StylingTokens, PERSONAS};
pub use crate::remark::{RemarkScheduler, RemarkState, SchedulerCommand};
pub use crate::utils::config::{Config, GeneratorConfig, MotionConfig, Provider, RemarkConfig};
pub use crate::utils::error::{CompanionError, CompanionResult, GeneratorError};
