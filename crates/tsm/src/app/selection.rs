//! Keystroke-driven selection state machine.
//!
//! [`Selector`] owns the query, cursor and preview flag and re-ranks the candidates after
//! every key. Keys come from a [`KeySource`], which is either the terminal or a scripted
//! sequence.

use std::collections::VecDeque;

use anyhow::{Result, anyhow};

use crate::app::rank::filter_and_rank;
use crate::domain::model::{Candidate, RankedCandidate};

/// Maximum number of ranked candidates shown at once.
pub const PAGE_LIMIT: usize = 30;
/// Cursor movement for page up / page down.
pub const PAGE_STEP: usize = 5;

/// Abstract input events understood by the selection loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    ClearQuery,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    TogglePreview,
    Confirm,
    Cancel,
    /// Re-render without changing state (terminal resize).
    Refresh,
}

/// Terminal result of a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Confirmed(Candidate),
    Cancelled,
}

/// Whether the user has typed a query or moved the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Editing,
}

/// Mutable state of the selection loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    query: String,
    cursor: usize,
    preview: bool,
}

impl SelectionState {
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Highlighted index within the current ranked view.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn preview_visible(&self) -> bool {
        self.preview
    }

    pub fn phase(&self) -> Phase {
        if !self.query.is_empty() || self.cursor > 0 {
            Phase::Editing
        } else {
            Phase::Idle
        }
    }
}

/// Source of keystrokes for [`Selector::run`].
pub trait KeySource {
    fn next_key(&mut self) -> Result<Key>;
}

/// Replays a fixed key sequence; running out of keys is an error.
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeys {
    keys: VecDeque<Key>,
}

impl ScriptedKeys {
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Script that types `text` character by character.
    pub fn typing(text: &str) -> Self {
        Self::new(text.chars().map(Key::Char))
    }

    pub fn then(mut self, key: Key) -> Self {
        self.keys.push_back(key);
        self
    }
}

impl KeySource for ScriptedKeys {
    fn next_key(&mut self) -> Result<Key> {
        self.keys
            .pop_front()
            .ok_or_else(|| anyhow!("key script exhausted"))
    }
}

/// Interactive controller over a fixed candidate list.
#[derive(Debug, Clone)]
pub struct Selector<'a> {
    items: &'a [Candidate],
    state: SelectionState,
    page_limit: usize,
}

impl<'a> Selector<'a> {
    pub fn new(items: &'a [Candidate]) -> Self {
        Self {
            items,
            state: SelectionState::default(),
            page_limit: PAGE_LIMIT,
        }
    }

    pub fn with_page_limit(mut self, limit: usize) -> Self {
        self.page_limit = limit;
        self
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Total number of candidates, regardless of the query.
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Ranked candidates for the current query.
    pub fn view(&self) -> Vec<RankedCandidate<'a>> {
        filter_and_rank(self.items, &self.state.query, self.page_limit)
    }

    /// Apply one key. Returns the outcome when the key terminates the loop.
    pub fn handle_key(&mut self, key: Key) -> Option<Outcome> {
        let state = &mut self.state;
        match key {
            Key::Char(ch) if !ch.is_control() => state.query.push(ch),
            Key::Char(_) | Key::Refresh => {}
            Key::Backspace => {
                state.query.pop();
            }
            Key::ClearQuery => {
                state.query.clear();
                state.cursor = 0;
            }
            Key::Up => state.cursor = state.cursor.saturating_sub(1),
            Key::Down => state.cursor = state.cursor.saturating_add(1),
            Key::Home => state.cursor = 0,
            Key::End => state.cursor = usize::MAX,
            Key::PageUp => state.cursor = state.cursor.saturating_sub(PAGE_STEP),
            Key::PageDown => state.cursor = state.cursor.saturating_add(PAGE_STEP),
            Key::TogglePreview => state.preview = !state.preview,
            Key::Confirm => {
                if let Some(ranked) = self.view().get(self.state.cursor) {
                    return Some(Outcome::Confirmed(ranked.candidate.clone()));
                }
            }
            Key::Cancel => return Some(Outcome::Cancelled),
        }

        self.clamp_cursor();
        None
    }

    fn clamp_cursor(&mut self) {
        let len = self.view().len();
        self.state.cursor = self.state.cursor.min(len.saturating_sub(1));
    }

    /// Drive the loop until the user confirms or cancels.
    ///
    /// `render` is called with the state and ranked view before every key read. State is reset
    /// on entry.
    pub fn run<S, R>(&mut self, keys: &mut S, mut render: R) -> Result<Outcome>
    where
        S: KeySource + ?Sized,
        R: FnMut(&SelectionState, &[RankedCandidate<'a>]) -> Result<()>,
    {
        self.state = SelectionState::default();
        loop {
            let view = self.view();
            render(&self.state, &view)?;
            if let Some(outcome) = self.handle_key(keys.next_key()?) {
                tracing::debug!(?outcome, "selection finished");
                return Ok(outcome);
            }
        }
    }
}
