use std::time::{Duration, Instant};

use am_ascii::compositor::CELL_WIDTH_RATIO;
use am_core::config::EffectConfig;
use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseEvent, MouseEventKind,
};
use ratatui::DefaultTerminal;

pub mod cli;
pub mod orchestrator;
pub mod ui;

use orchestrator::Orchestrator;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    let config = cli.resolve_config()?;
    let orchestrator = Orchestrator::new(config, Some(Box::new(|| log::info!("effect ready"))))?;

    let terminal = ratatui::init();
    let _ = crossterm::execute!(std::io::stdout(), EnableMouseCapture);

    let mut app = App::new(orchestrator);
    let result = app.run(terminal);

    // Restore the terminal ALWAYS, even on error.
    let _ = crossterm::execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AppState {
    Running,
    Paused,
    /// Inline text editor open (key `e`).
    TextEdit,
    Quitting,
}

/// Terminal host: event loop, resize tracking, and key bindings around
/// the orchestrator.
struct App {
    orchestrator: Orchestrator,
    state: AppState,
    /// Last known terminal size; (0, 0) forces a surface recompute.
    terminal_size: (u16, u16),
    edit_buf: String,
    fps: ui::FpsCounter,
}

impl App {
    fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            state: AppState::Running,
            terminal_size: (0, 0),
            edit_buf: String::new(),
            fps: ui::FpsCounter::new(60),
        }
    }

    fn run(&mut self, mut terminal: DefaultTerminal) -> Result<()> {
        self.orchestrator.start();
        let started = Instant::now();
        let mut last_frame = Instant::now();

        loop {
            if self.state == AppState::Quitting {
                break;
            }

            let frame_duration =
                Duration::from_secs_f64(1.0 / f64::from(self.orchestrator.config().target_fps));
            let now = Instant::now();
            let since_last = now - last_frame;
            if since_last < frame_duration {
                // Sleep off the remaining budget, but stay responsive.
                let remaining = frame_duration.saturating_sub(since_last);
                if event::poll(remaining)? {
                    self.handle_event(&event::read()?);
                }
                continue;
            }
            last_frame = now;

            while event::poll(Duration::ZERO)? {
                self.handle_event(&event::read()?);
            }

            self.check_resize()?;

            let elapsed = started.elapsed().as_secs_f32();
            self.orchestrator.tick(elapsed);
            self.fps.tick();

            let ctx = ui::DrawContext {
                orchestrator: &self.orchestrator,
                elapsed,
                fps: self.fps.fps(),
                paused: self.state == AppState::Paused,
                editing: (self.state == AppState::TextEdit).then_some(self.edit_buf.as_str()),
            };
            terminal.draw(|frame| ui::draw(frame, &ctx))?;
        }

        self.orchestrator.dispose();
        Ok(())
    }

    fn handle_event(&mut self, event: &Event) {
        match *event {
            Event::Resize(_, _) => self.terminal_size = (0, 0),
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Moved | MouseEventKind::Drag(_),
                column,
                row,
                ..
            }) => {
                // Cell coordinates → surface pixels, sampled at cell centers.
                let fs = self.orchestrator.config().ascii_font_size;
                self.orchestrator.pointer_moved(
                    (f32::from(column) + 0.5) * fs * CELL_WIDTH_RATIO,
                    (f32::from(row) + 0.5) * fs,
                );
            }
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => {
                if self.state == AppState::TextEdit {
                    self.handle_edit_key(code);
                } else {
                    self.handle_key(code);
                }
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.state = AppState::Quitting,
            KeyCode::Char(' ') => {
                if self.state == AppState::Paused {
                    self.orchestrator.start();
                    self.state = AppState::Running;
                } else {
                    self.orchestrator.stop();
                    self.state = AppState::Paused;
                }
            }
            KeyCode::Char('w') => self.update_config(|c| c.enable_waves = !c.enable_waves),
            KeyCode::Char('i') => self.update_config(|c| c.invert = !c.invert),
            KeyCode::Char('+' | '=') => {
                self.update_config(|c| c.ascii_font_size += 1.0);
                self.terminal_size = (0, 0); // cell size changed
            }
            KeyCode::Char('-') => {
                self.update_config(|c| c.ascii_font_size -= 1.0);
                self.terminal_size = (0, 0);
            }
            KeyCode::Char('e') => {
                self.edit_buf.clone_from(&self.orchestrator.config().text);
                self.state = AppState::TextEdit;
            }
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.state = AppState::Running,
            KeyCode::Enter => {
                let text = self.edit_buf.trim().to_string();
                if !text.is_empty() {
                    self.update_config(|c| c.text = text);
                }
                self.state = AppState::Running;
            }
            KeyCode::Backspace => {
                self.edit_buf.pop();
            }
            KeyCode::Char(ch) => self.edit_buf.push(ch),
            _ => {}
        }
    }

    /// Apply a config mutation through the orchestrator. Failures are
    /// logged, never fatal: the previous scene keeps rendering.
    fn update_config(&mut self, mutate: impl FnOnce(&mut EffectConfig)) {
        let mut new = self.orchestrator.config().clone();
        mutate(&mut new);
        new.clamp_all();
        if let Err(e) = self.orchestrator.apply_config(new) {
            log::error!("config change failed: {e}");
        }
    }

    /// Re-derive the effect surface from the terminal size. One row is
    /// reserved for the status line.
    fn check_resize(&mut self) -> Result<()> {
        let size = crossterm::terminal::size()?;
        if size != self.terminal_size {
            self.terminal_size = size;
            let fs = self.orchestrator.config().ascii_font_size;
            let width = f32::from(size.0) * fs * CELL_WIDTH_RATIO;
            let height = f32::from(size.1.saturating_sub(1)) * fs;
            self.orchestrator.set_surface(width, height)?;
            log::debug!("terminal resized to {}×{}", size.0, size.1);
        }
        Ok(())
    }
}
