//! Single-flight remark state machine.
//!
//! All transitions are synchronous and side-effect free; the async driver in
//! [`super::scheduler`] performs the requests and timers they ask for.

use serde::{Deserialize, Serialize};

use crate::api::RemarkAction;
use crate::persona::AnimalKind;

/// Snapshot of what a front-end should display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemarkState {
    /// Remark currently on screen
    pub text: Option<String>,
    /// A generator request is in flight
    pub pending: bool,
}

impl RemarkState {
    /// True while waiting for a first remark with nothing else on screen.
    pub fn is_thinking(&self) -> bool {
        self.pending && self.text.is_none()
    }
}

/// Identifies one generator request and the context it was issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemarkTicket {
    pub id: u64,
    /// Context epoch at issue time; see [`RemarkMachine::epoch`].
    pub epoch: u64,
    pub persona: AnimalKind,
    pub action: RemarkAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemarkPhase {
    Idle,
    /// A request is in flight. A click can interrupt a visible remark, which
    /// stays in `showing` until replaced or cleared by its own timer.
    Requesting {
        ticket: RemarkTicket,
        showing: Option<String>,
    },
    Visible {
        text: String,
    },
}

/// Outcome of feeding a generator result back into the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Text is now visible; arm the display timer for `display`.
    Shown { display: u64 },
    /// The response belonged to an outdated context and was dropped.
    Discarded,
    /// No request with that ticket is in flight.
    Unknown,
}

#[derive(Debug, Clone)]
pub struct RemarkMachine {
    phase: RemarkPhase,
    persona: AnimalKind,
    enabled: bool,
    tick_chance: f64,
    discard_stale: bool,
    epoch: u64,
    next_ticket: u64,
    /// Id of the most recent entry into a visible state.
    display: u64,
}

impl RemarkMachine {
    pub fn new(persona: AnimalKind, enabled: bool, tick_chance: f64, discard_stale: bool) -> Self {
        Self {
            phase: RemarkPhase::Idle,
            persona,
            enabled,
            tick_chance: tick_chance.clamp(0.0, 1.0),
            discard_stale,
            epoch: 0,
            next_ticket: 0,
            display: 0,
        }
    }

    pub fn phase(&self) -> &RemarkPhase {
        &self.phase
    }

    pub fn persona(&self) -> AnimalKind {
        self.persona
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Bumped whenever the persona or the enable flag changes.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, RemarkPhase::Requesting { .. })
    }

    pub fn visible_text(&self) -> Option<&str> {
        match &self.phase {
            RemarkPhase::Idle => None,
            RemarkPhase::Requesting { showing, .. } => showing.as_deref(),
            RemarkPhase::Visible { text } => Some(text),
        }
    }

    pub fn state(&self) -> RemarkState {
        RemarkState {
            text: self.visible_text().map(str::to_string),
            pending: self.is_pending(),
        }
    }

    /// Changing persona only affects future requests.
    pub fn set_persona(&mut self, persona: AnimalKind) {
        if persona != self.persona {
            self.persona = persona;
            self.epoch += 1;
        }
    }

    /// Disabling stops new requests; a visible remark still runs its course.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled != self.enabled {
            self.enabled = enabled;
            self.epoch += 1;
        }
    }

    /// A click requests a remark whenever enabled and nothing is in flight,
    /// even over a visible remark.
    pub fn click(&mut self) -> Option<RemarkTicket> {
        if !self.enabled || self.is_pending() {
            return None;
        }
        Some(self.begin_request(RemarkAction::Clicked))
    }

    /// Periodic chance of an ambient remark. `draw` is uniform in `[0, 1)`
    /// and must be strictly above `1 - tick_chance` to fire.
    pub fn tick(&mut self, draw: f64) -> Option<RemarkTicket> {
        if !self.enabled || self.is_pending() || self.visible_text().is_some() {
            return None;
        }
        if draw <= 1.0 - self.tick_chance {
            return None;
        }
        Some(self.begin_request(RemarkAction::Wandered))
    }

    fn begin_request(&mut self, action: RemarkAction) -> RemarkTicket {
        self.next_ticket += 1;
        let ticket = RemarkTicket {
            id: self.next_ticket,
            epoch: self.epoch,
            persona: self.persona,
            action,
        };
        let showing = match std::mem::replace(&mut self.phase, RemarkPhase::Idle) {
            RemarkPhase::Visible { text } => Some(text),
            _ => None,
        };
        self.phase = RemarkPhase::Requesting { ticket, showing };
        ticket
    }

    /// Feeds back the text (generated or fallback) for a finished request.
    pub fn resolve(&mut self, ticket_id: u64, text: String) -> Resolution {
        let (ticket, showing) = match &self.phase {
            RemarkPhase::Requesting { ticket, showing } if ticket.id == ticket_id => {
                (*ticket, showing.clone())
            }
            _ => return Resolution::Unknown,
        };

        if self.discard_stale && ticket.epoch != self.epoch {
            // Back to whatever was on screen before; its timer is still armed.
            self.phase = match showing {
                Some(text) => RemarkPhase::Visible { text },
                None => RemarkPhase::Idle,
            };
            return Resolution::Discarded;
        }

        self.display += 1;
        self.phase = RemarkPhase::Visible { text };
        Resolution::Shown {
            display: self.display,
        }
    }

    /// Display timer fired. Timers from superseded displays are ignored.
    /// Returns true if something was cleared.
    pub fn expire(&mut self, display: u64) -> bool {
        if display != self.display {
            return false;
        }
        if let RemarkPhase::Requesting { showing, .. } = &mut self.phase {
            return showing.take().is_some();
        }
        if matches!(self.phase, RemarkPhase::Visible { .. }) {
            self.phase = RemarkPhase::Idle;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn machine() -> RemarkMachine {
        RemarkMachine::new(AnimalKind::Cat, true, 0.3, true)
    }

    fn show(machine: &mut RemarkMachine, text: &str) -> u64 {
        let ticket = machine.click().expect("click should request");
        match machine.resolve(ticket.id, text.to_string()) {
            Resolution::Shown { display } => display,
            other => panic!("expected Shown, got {:?}", other),
        }
    }

    #[test]
    fn test_full_cycle() {
        let mut m = machine();
        assert_eq!(m.state(), RemarkState::default());

        let ticket = m.click().unwrap();
        assert_eq!(ticket.action, RemarkAction::Clicked);
        assert_eq!(m.state(), RemarkState { text: None, pending: true });
        assert!(m.state().is_thinking());

        let display = match m.resolve(ticket.id, "Laser!".to_string()) {
            Resolution::Shown { display } => display,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(m.visible_text(), Some("Laser!"));
        assert!(!m.is_pending());

        assert!(m.expire(display));
        assert_eq!(m.phase(), &RemarkPhase::Idle);
    }

    #[test]
    fn test_click_is_single_flight() {
        let mut m = machine();
        assert!(m.click().is_some());
        assert!(m.click().is_none());
        assert!(m.tick(0.99).is_none());
    }

    #[test]
    fn test_click_interrupts_visible_remark() {
        let mut m = machine();
        show(&mut m, "first");
        let ticket = m.click().unwrap();
        assert_matches!(
            m.phase(),
            RemarkPhase::Requesting { showing: Some(text), .. } if text == "first"
        );
        assert_eq!(m.state(), RemarkState { text: Some("first".into()), pending: true });
        assert!(!m.state().is_thinking());

        m.resolve(ticket.id, "second".to_string());
        assert_eq!(m.visible_text(), Some("second"));
    }

    #[test]
    fn test_tick_respects_probability() {
        let mut m = machine();
        assert!(m.tick(0.0).is_none());
        assert!(m.tick(0.69).is_none());
        let ticket = m.tick(0.71).unwrap();
        assert_eq!(ticket.action, RemarkAction::Wandered);
    }

    #[test]
    fn test_tick_threshold_is_exclusive() {
        let mut m = RemarkMachine::new(AnimalKind::Cat, true, 0.5, true);
        assert!(m.tick(0.5).is_none());
        assert!(m.tick(0.500_001).is_some());

        let mut never = RemarkMachine::new(AnimalKind::Cat, true, 0.0, true);
        assert!(never.tick(0.999_999).is_none());
    }

    #[test]
    fn test_tick_yields_to_visible_remark() {
        let mut m = machine();
        show(&mut m, "busy");
        assert!(m.tick(0.999).is_none());
        assert_eq!(m.visible_text(), Some("busy"));
    }

    #[test]
    fn test_disabled_never_requests() {
        let mut m = RemarkMachine::new(AnimalKind::Dog, false, 1.0, true);
        for draw in [0.0, 0.5, 0.99] {
            assert!(m.click().is_none());
            assert!(m.tick(draw).is_none());
        }
        assert_eq!(m.state(), RemarkState::default());
    }

    #[test]
    fn test_stale_timer_does_not_clear_new_remark() {
        let mut m = machine();
        let first = show(&mut m, "first");
        let second = show(&mut m, "second");
        assert_ne!(first, second);

        assert!(!m.expire(first));
        assert_eq!(m.visible_text(), Some("second"));
        assert!(m.expire(second));
        assert_eq!(m.visible_text(), None);
    }

    #[test]
    fn test_expire_while_requesting_clears_old_text_only() {
        let mut m = machine();
        let display = show(&mut m, "old");
        let ticket = m.click().unwrap();
        assert!(m.expire(display));
        assert_eq!(m.state(), RemarkState { text: None, pending: true });

        m.resolve(ticket.id, "new".to_string());
        assert_eq!(m.visible_text(), Some("new"));
    }

    #[test]
    fn test_persona_switch_keeps_visible_text() {
        let mut m = machine();
        show(&mut m, "purr");
        m.set_persona(AnimalKind::Fox);
        assert_eq!(m.visible_text(), Some("purr"));

        let ticket = m.click().unwrap();
        assert_eq!(ticket.persona, AnimalKind::Fox);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut m = machine();
        let ticket = m.click().unwrap();
        m.set_persona(AnimalKind::Dragon);
        assert_eq!(m.resolve(ticket.id, "meow".to_string()), Resolution::Discarded);
        assert_eq!(m.phase(), &RemarkPhase::Idle);
        // Nothing in flight any more, so a new request is allowed.
        assert!(m.click().is_some());
    }

    #[test]
    fn test_stale_discard_restores_previous_remark() {
        let mut m = machine();
        let display = show(&mut m, "still here");
        let ticket = m.click().unwrap();
        m.set_enabled(false);
        assert_eq!(m.resolve(ticket.id, "late".to_string()), Resolution::Discarded);
        assert_eq!(m.visible_text(), Some("still here"));
        assert!(m.expire(display));
    }

    #[test]
    fn test_stale_response_shown_when_guard_off() {
        let mut m = RemarkMachine::new(AnimalKind::Cat, true, 0.3, false);
        let ticket = m.click().unwrap();
        m.set_persona(AnimalKind::Panda);
        assert_matches!(m.resolve(ticket.id, "meow".to_string()), Resolution::Shown { .. });
        assert_eq!(m.visible_text(), Some("meow"));
    }

    #[test]
    fn test_unknown_ticket_is_ignored() {
        let mut m = machine();
        let ticket = m.click().unwrap();
        assert_eq!(m.resolve(ticket.id + 1, "x".to_string()), Resolution::Unknown);
        assert!(m.is_pending());
    }

    #[test]
    fn test_redundant_toggle_keeps_epoch() {
        let mut m = machine();
        m.set_enabled(true);
        m.set_persona(AnimalKind::Cat);
        assert_eq!(m.epoch(), 0);
        m.set_enabled(false);
        assert_eq!(m.epoch(), 1);
    }
}
