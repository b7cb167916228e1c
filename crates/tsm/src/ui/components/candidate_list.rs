//! Query line and ranked candidate list.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};

use crate::app::selection::{Phase, SelectionState};
use crate::domain::model::RankedCandidate;

const NAME_WIDTH: usize = 24;
const IDLE_PLACEHOLDER: &str = "type to filter";

const HINTS: &[(&str, &str)] = &[
    ("↑/↓", "move"),
    ("Ctrl-N/P", "move"),
    ("Enter", "open"),
    ("Ctrl-U", "clear"),
    ("Tab", "preview"),
    ("Home/End", "jump"),
    ("PgUp/PgDn", "page"),
    ("Esc", "cancel"),
];

/// Renders the key hints, the `> query` prompt and the ranked list with the cursor row
/// highlighted.
#[derive(Debug, Default)]
pub struct CandidateList;

impl CandidateList {
    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        state: &SelectionState,
        view: &[RankedCandidate<'_>],
        total: usize,
    ) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(1),
            ])
            .split(area);

        frame.render_widget(Paragraph::new(hint_line()), layout[0]);
        frame.render_widget(Paragraph::new(query_line(state, view.len(), total)), layout[1]);

        if view.is_empty() {
            let empty = Paragraph::new("  no matches").style(Style::default().fg(Color::DarkGray));
            frame.render_widget(empty, layout[2]);
            return;
        }

        let items: Vec<ListItem> = view.iter().map(candidate_item).collect();
        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("➤ ");

        let mut list_state = ListState::default();
        list_state.select(Some(state.cursor()));
        frame.render_stateful_widget(list, layout[2], &mut list_state);
    }
}

fn hint_line() -> Line<'static> {
    let mut spans = vec![Span::styled(
        "tsm ",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    for (idx, (key, action)) in HINTS.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw(" · "));
        }
        spans.push(Span::styled(*key, Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(
            format!(" {action}"),
            Style::default().fg(Color::Gray),
        ));
    }
    Line::from(spans)
}

fn query_line(state: &SelectionState, shown: usize, total: usize) -> Line<'static> {
    let query = match state.phase() {
        Phase::Idle => Span::styled(IDLE_PLACEHOLDER, Style::default().fg(Color::DarkGray)),
        Phase::Editing => Span::raw(state.query().to_string()),
    };
    Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Cyan)),
        query,
        Span::styled(
            format!("  {shown}/{total}"),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn candidate_item(ranked: &RankedCandidate<'_>) -> ListItem<'static> {
    let candidate = ranked.candidate;
    let path = candidate
        .path()
        .map(|path| path.display().to_string())
        .unwrap_or_default();
    ListItem::new(Line::from(vec![
        Span::styled(
            format!("{:<3} ", candidate.kind().tag()),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(format!("{:<width$} ", candidate.name(), width = NAME_WIDTH)),
        Span::styled(path, Style::default().fg(Color::DarkGray)),
    ]))
}
