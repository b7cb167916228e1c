//! Translation of terminal events into selection keys.

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::selection::{Key, KeySource};

/// Map a crossterm key event to a selection key, ignoring unbound combinations.
pub fn map_key(event: KeyEvent) -> Option<Key> {
    if event.kind == KeyEventKind::Release {
        return None;
    }

    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return match event.code {
            KeyCode::Char('c') => Some(Key::Cancel),
            KeyCode::Char('u') => Some(Key::ClearQuery),
            KeyCode::Char('n') => Some(Key::Down),
            KeyCode::Char('p') => Some(Key::Up),
            KeyCode::Char('h') => Some(Key::Backspace),
            _ => None,
        };
    }

    match event.code {
        KeyCode::Char(ch) if !event.modifiers.contains(KeyModifiers::ALT) => Some(Key::Char(ch)),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Enter => Some(Key::Confirm),
        KeyCode::Tab => Some(Key::TogglePreview),
        KeyCode::Esc => Some(Key::Cancel),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Home => Some(Key::Home),
        KeyCode::End => Some(Key::End),
        KeyCode::PageUp => Some(Key::PageUp),
        KeyCode::PageDown => Some(Key::PageDown),
        _ => None,
    }
}

/// Blocking key source reading from the terminal in raw mode.
#[derive(Debug, Default)]
pub struct TerminalKeys;

impl KeySource for TerminalKeys {
    fn next_key(&mut self) -> Result<Key> {
        loop {
            match event::read().context("failed to read terminal input")? {
                Event::Key(key) => {
                    if let Some(mapped) = map_key(key) {
                        return Ok(mapped);
                    }
                }
                Event::Resize(..) => return Ok(Key::Refresh),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    #[test]
    fn maps_control_chords() {
        assert_eq!(map_key(ctrl('c')), Some(Key::Cancel));
        assert_eq!(map_key(ctrl('u')), Some(Key::ClearQuery));
        assert_eq!(map_key(ctrl('n')), Some(Key::Down));
        assert_eq!(map_key(ctrl('p')), Some(Key::Up));
        assert_eq!(map_key(ctrl('x')), None);
    }

    #[test]
    fn maps_navigation_and_editing_keys() {
        assert_eq!(map_key(press(KeyCode::Enter)), Some(Key::Confirm));
        assert_eq!(map_key(press(KeyCode::Tab)), Some(Key::TogglePreview));
        assert_eq!(map_key(press(KeyCode::Backspace)), Some(Key::Backspace));
        assert_eq!(map_key(press(KeyCode::Home)), Some(Key::Home));
        assert_eq!(map_key(press(KeyCode::End)), Some(Key::End));
        assert_eq!(map_key(press(KeyCode::PageUp)), Some(Key::PageUp));
        assert_eq!(map_key(press(KeyCode::PageDown)), Some(Key::PageDown));
        assert_eq!(map_key(press(KeyCode::Esc)), Some(Key::Cancel));
        assert_eq!(map_key(press(KeyCode::F(5))), None);
    }

    #[test]
    fn plain_and_shifted_characters_extend_the_query() {
        assert_eq!(map_key(press(KeyCode::Char('a'))), Some(Key::Char('a')));
        let shifted = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(map_key(shifted), Some(Key::Char('A')));
        let alt = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::ALT);
        assert_eq!(map_key(alt), None);
    }

    #[test]
    fn key_releases_are_ignored() {
        let mut release = press(KeyCode::Char('a'));
        release.kind = KeyEventKind::Release;
        assert_eq!(map_key(release), None);
    }
}
