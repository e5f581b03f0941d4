use anyhow::Result;
use crossterm::event::{self, Event, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

use companion_core::api::RemarkGenerator;
use companion_core::constants::FRAME_INTERVAL_MS;
use companion_core::motion::MotionTracker;
use companion_core::{AnimalKind, Companion, CompanionView, Config, RemarkScheduler};

use crate::ui::layout::{
    action_for_key, bubble_rect, cell_to_point, lean_marker, point_to_cell, split_screen,
    thinking_dots, to_color, wrap_text, UiAction, MAX_BUBBLE_TEXT_WIDTH,
};
use crate::ui::tui::TerminalSession;

/// Application state (separate from terminal for borrow checker)
struct AppState {
    companion: Companion,
    frame: usize,
    last_frame: Instant,
}

impl AppState {
    /// Handles one terminal event. Returns true when the user asked to quit.
    fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Mouse(mouse) => {
                let (x, y) = cell_to_point(mouse.column, mouse.row);
                match mouse.kind {
                    MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                        self.companion.pointer_moved(x, y);
                    }
                    MouseEventKind::Down(_) => {
                        self.companion.pointer_moved(x, y);
                        self.companion.pointer_pressed()?;
                    }
                    _ => {}
                }
            }
            Event::Key(key) => match action_for_key(key) {
                Some(UiAction::Quit) => return Ok(true),
                Some(UiAction::SelectPersona(kind)) => {
                    self.companion.select_persona(kind)?;
                    tracing::info!(persona = %kind, "persona selected");
                }
                Some(UiAction::ToggleRemarks) => {
                    let enabled = self.companion.toggle_remarks()?;
                    tracing::info!(enabled, "remarks toggled");
                }
                None => {}
            },
            _ => {}
        }
        Ok(false)
    }

    fn tick(&mut self) {
        let dt = self.last_frame.elapsed().as_secs_f32();
        self.last_frame = Instant::now();
        self.companion.advance(dt);
        self.frame = self.frame.wrapping_add(1);
    }

    fn render(&self, f: &mut Frame, view: &CompanionView) {
        let (stage, panel) = split_screen(f.area());
        self.render_companion(f, stage, view);
        self.render_panel(f, panel, view);
    }

    fn render_companion(&self, f: &mut Frame, stage: Rect, view: &CompanionView) {
        if stage.width < 2 || stage.height == 0 {
            return;
        }
        let persona = view.persona.persona();
        let (column, row) = point_to_cell(view.position.x, view.position.y, stage);

        // Glyphs are two columns wide; centre them on the cell.
        let mut x = column.saturating_sub(1).max(stage.x);
        let marker = lean_marker(view.tilt);
        let marker_style = Style::default().fg(to_color(persona.styling.border));
        let mut spans = Vec::new();
        if view.tilt < 0.0 && !marker.is_empty() {
            x = x.saturating_sub(marker.len() as u16).max(stage.x);
            spans.push(Span::styled(marker, marker_style));
        }
        spans.push(Span::raw(persona.glyph));
        if view.tilt > 0.0 && !marker.is_empty() {
            spans.push(Span::styled(marker, marker_style));
        }

        let line = Line::from(spans);
        let width = (line.width() as u16).min(stage.right().saturating_sub(x));
        f.render_widget(Paragraph::new(line), Rect::new(x, row, width, 1));

        let text = match (&view.remark.text, view.remark.is_thinking()) {
            (Some(text), _) => text.as_str(),
            (None, true) => thinking_dots(self.frame),
            (None, false) => return,
        };
        let wrap_width = MAX_BUBBLE_TEXT_WIDTH.min(stage.width.saturating_sub(4));
        let lines = wrap_text(text, wrap_width);
        let rect = bubble_rect((column, row), &lines, stage);

        let fill = to_color(persona.styling.fill);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(to_color(persona.styling.border)).bg(fill))
            .style(Style::default().fg(Color::Black).bg(fill));
        let body: Vec<Line> = lines
            .into_iter()
            .map(|line| Line::from(format!(" {} ", line)))
            .collect();

        f.render_widget(Clear, rect);
        f.render_widget(Paragraph::new(body).block(block), rect);
    }

    fn render_panel(&self, f: &mut Frame, area: Rect, view: &CompanionView) {
        let mut personas = Vec::new();
        for (index, kind) in AnimalKind::ALL.iter().enumerate() {
            let persona = kind.persona();
            let style = if *kind == view.persona {
                Style::default()
                    .fg(Color::Black)
                    .bg(to_color(persona.styling.border))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            personas.push(Span::styled(
                format!(" {} {} {} ", index + 1, persona.glyph, kind.name()),
                style,
            ));
            personas.push(Span::raw(" "));
        }

        let key = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
        let remarks = if view.remarks_enabled {
            Span::styled("on", Style::default().fg(Color::Green))
        } else {
            Span::styled("off", Style::default().fg(Color::DarkGray))
        };
        let hints = Line::from(vec![
            Span::styled(" r ", key),
            Span::raw("remarks: "),
            remarks,
            Span::raw("   "),
            Span::styled("q ", key),
            Span::raw("quit"),
        ]);

        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray));
        f.render_widget(
            Paragraph::new(vec![Line::from(personas), hints]).block(block),
            area,
        );
    }
}

/// Runs a blocking frame loop on the current worker thread while the rest of
/// the runtime keeps driving the remark scheduler. Needs the multi-thread
/// runtime.
pub fn run_blocking<T>(frame_loop: impl FnOnce() -> T) -> T {
    tokio::task::block_in_place(frame_loop)
}

/// Main TUI Application
pub struct TuiApp {
    session: TerminalSession,
    state: AppState,
}

impl TuiApp {
    /// Takes over the terminal and starts the companion in the middle of the
    /// stage.
    pub fn new(config: &Config, generator: Arc<dyn RemarkGenerator>) -> Result<Self> {
        let session = TerminalSession::new()?;
        let size = session.terminal.size()?;
        let (stage, _) = split_screen(Rect::new(0, 0, size.width, size.height));
        let (x, y) = cell_to_point(stage.x + stage.width / 2, stage.y + stage.height / 2);

        let tracker = MotionTracker::new(config.motion.spring(), config.motion.tilt_rule())
            .starting_at(x, y);
        let scheduler = RemarkScheduler::spawn(
            generator,
            &config.remarks,
            config.persona,
            config.remarks_enabled,
        );
        let companion =
            Companion::from_parts(tracker, scheduler, config.persona, config.remarks_enabled);

        Ok(Self {
            session,
            state: AppState {
                companion,
                frame: 0,
                last_frame: Instant::now(),
            },
        })
    }

    /// Runs the frame loop until the user quits.
    pub fn run(&mut self) -> Result<()> {
        let frame_interval = Duration::from_millis(FRAME_INTERVAL_MS);
        loop {
            let view = self.state.companion.view();
            self.session
                .terminal
                .draw(|f| self.state.render(f, &view))?;

            let timeout = frame_interval.saturating_sub(self.state.last_frame.elapsed());
            if event::poll(timeout)? {
                // Drain everything queued so a burst of mouse reports costs one frame.
                loop {
                    if self.state.handle_event(event::read()?)? {
                        return Ok(());
                    }
                    if !event::poll(Duration::ZERO)? {
                        break;
                    }
                }
            }

            self.state.tick();
        }
    }

    /// Restores the terminal, then stops the remark scheduler.
    pub async fn shutdown(self) {
        let Self { session, state } = self;
        drop(session);
        state.companion.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use companion_core::api::OfflineGenerator;
    use companion_core::utils::config::{Provider, RemarkConfig};

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocking_frame_loop_leaves_scheduler_running() {
        let config = RemarkConfig {
            tick_chance: 0.0,
            ..RemarkConfig::default()
        };
        let scheduler = RemarkScheduler::spawn(
            Arc::new(OfflineGenerator::new(Provider::Gemini)),
            &config,
            AnimalKind::Cat,
            true,
        );
        scheduler.click().unwrap();

        let shown = run_blocking(|| {
            for _ in 0..200 {
                if scheduler.state().text.is_some() {
                    return true;
                }
                std::thread::sleep(Duration::from_millis(10));
            }
            false
        });
        assert!(shown, "scheduler made no progress during the frame loop");
        scheduler.shutdown().await;
    }
}
