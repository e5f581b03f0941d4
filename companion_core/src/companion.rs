//! The companion as a front-end sees it: one object fed with pointer events
//! and polled once per frame for what to draw.

use serde::Serialize;
use std::sync::Arc;

use crate::api::RemarkGenerator;
use crate::motion::{MotionTracker, PointerSample, SmoothedPosition};
use crate::persona::{AnimalKind, Persona};
use crate::remark::{RemarkScheduler, RemarkState};
use crate::utils::config::Config;
use crate::utils::error::CompanionError;

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanionView {
    pub persona: AnimalKind,
    pub position: SmoothedPosition,
    /// Lean in degrees
    pub tilt: f32,
    /// Raw pointer location, if any event has arrived yet
    pub pointer: Option<PointerSample>,
    pub remark: RemarkState,
    pub remarks_enabled: bool,
}

pub struct Companion {
    tracker: MotionTracker,
    scheduler: RemarkScheduler,
    persona: AnimalKind,
    remarks_enabled: bool,
}

impl Companion {
    /// Builds the tracker and spawns the remark scheduler on the current
    /// tokio runtime.
    pub fn new(config: &Config, generator: Arc<dyn RemarkGenerator>) -> Self {
        let tracker = MotionTracker::new(config.motion.spring(), config.motion.tilt_rule());
        let scheduler = RemarkScheduler::spawn(
            generator,
            &config.remarks,
            config.persona,
            config.remarks_enabled,
        );
        Self::from_parts(tracker, scheduler, config.persona, config.remarks_enabled)
    }

    pub fn from_parts(
        tracker: MotionTracker,
        scheduler: RemarkScheduler,
        persona: AnimalKind,
        remarks_enabled: bool,
    ) -> Self {
        Self {
            tracker,
            scheduler,
            persona,
            remarks_enabled,
        }
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.tracker.on_pointer(PointerSample::new(x, y));
    }

    pub fn pointer_pressed(&self) -> Result<(), CompanionError> {
        self.scheduler.click()
    }

    pub fn persona(&self) -> &'static Persona {
        self.persona.persona()
    }

    pub fn select_persona(&mut self, persona: AnimalKind) -> Result<(), CompanionError> {
        self.persona = persona;
        self.scheduler.set_persona(persona)
    }

    pub fn remarks_enabled(&self) -> bool {
        self.remarks_enabled
    }

    pub fn set_remarks_enabled(&mut self, enabled: bool) -> Result<(), CompanionError> {
        self.remarks_enabled = enabled;
        self.scheduler.set_enabled(enabled)
    }

    pub fn toggle_remarks(&mut self) -> Result<bool, CompanionError> {
        let enabled = !self.remarks_enabled;
        self.set_remarks_enabled(enabled)?;
        Ok(enabled)
    }

    /// Advances the motion springs by `dt` seconds. Returns true while moving.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.tracker.advance(dt)
    }

    pub fn view(&self) -> CompanionView {
        CompanionView {
            persona: self.persona,
            position: self.tracker.position(),
            tilt: self.tracker.tilt(),
            pointer: self.tracker.target(),
            remark: self.scheduler.state(),
            remarks_enabled: self.remarks_enabled,
        }
    }

    pub async fn shutdown(self) {
        self.scheduler.shutdown().await;
    }
}
