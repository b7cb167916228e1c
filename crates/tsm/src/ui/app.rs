//! Interactive selection screen.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use crossterm::cursor::Show;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::{Frame, Terminal};
use tracing::warn;

use crate::app::selection::{Outcome, SelectionState, Selector};
use crate::domain::model::{Candidate, RankedCandidate};
use crate::ui::components::candidate_list::CandidateList;
use crate::ui::components::preview::Preview;
use crate::ui::keys::TerminalKeys;
use crate::ui::prompt::prompt_once;

const PREVIEW_HEIGHT: u16 = 4;

/// Entry point for picking a candidate, either full-screen or via the line prompt.
#[derive(Debug, Default)]
pub struct UiApp;

impl UiApp {
    pub fn new() -> Self {
        Self
    }

    /// Let the user pick one of `items`.
    ///
    /// Falls back to a numbered line prompt when stdin is not a terminal or raw mode cannot be
    /// acquired.
    pub fn select(&mut self, items: &[Candidate]) -> Result<Outcome> {
        if !io::stdin().is_terminal() {
            warn!("stdin is not a terminal; using line prompt");
            return self.prompt(items);
        }

        let guard = match TerminalGuard::acquire() {
            Ok(guard) => guard,
            Err(err) => {
                warn!(error = %err, "raw mode unavailable; using line prompt");
                return self.prompt(items);
            }
        };

        let outcome = self.interactive(items);
        drop(guard);
        outcome
    }

    fn interactive(&mut self, items: &[Candidate]) -> Result<Outcome> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend).context("failed to initialize terminal")?;
        terminal.hide_cursor().ok();

        let mut selector = Selector::new(items);
        let total = selector.total();
        selector.run(&mut TerminalKeys, |state, view| {
            terminal
                .draw(|frame| render_screen(frame, state, view, total))
                .context("failed to draw selection screen")?;
            Ok(())
        })
    }

    fn prompt(&mut self, items: &[Candidate]) -> Result<Outcome> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        prompt_once(items, &mut stdin.lock(), &mut stdout.lock())
    }
}

/// Draw the whole selection screen: hints, query, list and the optional preview.
pub fn render_screen(
    frame: &mut Frame<'_>,
    state: &SelectionState,
    view: &[RankedCandidate<'_>],
    total: usize,
) {
    let size = frame.size();
    if !state.preview_visible() {
        CandidateList.render(frame, size, state, view, total);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(PREVIEW_HEIGHT)])
        .split(size);
    CandidateList.render(frame, layout[0], state, view, total);
    let selected = view.get(state.cursor()).map(|ranked| ranked.candidate);
    Preview.render(frame, layout[1], selected);
}

/// Raw mode plus alternate screen, restored when dropped.
struct TerminalGuard;

impl TerminalGuard {
    fn acquire() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        if let Err(err) = execute!(io::stdout(), EnterAlternateScreen) {
            disable_raw_mode().ok();
            return Err(err).context("failed to enter alternate screen");
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        disable_raw_mode().ok();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use ratatui::backend::TestBackend;

    use crate::app::selection::Key;
    use crate::ui::components::testing::buffer_lines;

    fn items() -> Vec<Candidate> {
        vec![
            Candidate::repository("/Code/test/a"),
            Candidate::session("util"),
            Candidate::repository("/Code/ivuorinen/a"),
        ]
    }

    fn draw(selector: &Selector<'_>, width: u16, height: u16) -> Result<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height))?;
        let view = selector.view();
        terminal.draw(|frame| render_screen(frame, selector.state(), &view, selector.total()))?;
        Ok(buffer_lines(terminal.backend().buffer()).join("\n"))
    }

    #[test]
    fn selection_screen_with_preview() -> Result<()> {
        let items = items();
        let mut selector = Selector::new(&items);
        selector.handle_key(Key::TogglePreview);

        assert_snapshot!(draw(&selector, 80, 10)?, @r#"
        tsm ↑/↓ move · Ctrl-N/P move · Enter open · Ctrl-U clear · Tab preview · Home/En
        > type to filter  3/3
        ➤ G   ivuorinen_a              /Code/ivuorinen/a
          G   test_a                   /Code/test/a
          S   util

        ┌Preview───────────────────────────────────────────────────────────────────────┐
        │Action : new-session -ds "ivuorinen_a" -c "/Code/ivuorinen/a"; switch/attach  │
        │Path   : /Code/ivuorinen/a                                                    │
        └──────────────────────────────────────────────────────────────────────────────┘
        "#);
        Ok(())
    }

    #[test]
    fn preview_hidden_by_default() -> Result<()> {
        let items = items();
        let selector = Selector::new(&items);
        let screen = draw(&selector, 60, 8)?;
        assert!(!screen.contains("Preview"));
        assert!(screen.contains("S   util"));
        Ok(())
    }

    #[test]
    fn preview_tracks_cursor() -> Result<()> {
        let items = items();
        let mut selector = Selector::new(&items);
        selector.handle_key(Key::TogglePreview);
        selector.handle_key(Key::End);

        let screen = draw(&selector, 80, 10)?;
        assert!(screen.contains(r#"Action : switch to session "util""#));
        assert!(!screen.contains("Path   :"));
        Ok(())
    }
}
