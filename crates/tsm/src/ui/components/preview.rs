//! Preview block describing what confirming the highlighted candidate does.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::domain::model::Candidate;

#[derive(Debug, Default)]
pub struct Preview;

impl Preview {
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, selected: Option<&Candidate>) {
        let block = Block::default()
            .title("Preview")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        let lines = match selected {
            Some(candidate) => describe(candidate),
            None => vec![Line::styled(
                "nothing selected",
                Style::default().fg(Color::DarkGray),
            )],
        };

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }
}

/// Preview text for a candidate: the tmux action and, when known, its directory.
pub fn describe(candidate: &Candidate) -> Vec<Line<'static>> {
    let action = match candidate {
        Candidate::Session { name } => format!("switch to session {name:?}"),
        Candidate::Repository { name, path } | Candidate::Bookmark { name, path } => format!(
            "new-session -ds {name:?} -c {:?}; switch/attach",
            path.display().to_string()
        ),
    };

    let mut lines = vec![labelled("Action : ", action)];
    if let Some(path) = candidate.path() {
        lines.push(labelled("Path   : ", path.display().to_string()));
    }
    lines
}

fn labelled(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(Color::Cyan)),
        Span::raw(value),
    ])
}
