use crate::app::{App, Screen};
use crate::nav::{Direction, RemoteCommand};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Instant;
use tui_input::InputRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Quit,
}

/// Translate a key into a remote command, or into a text edit while the
/// search field has focus.
pub fn handle_key_event(app: &mut App, key: KeyEvent, now: Instant) -> InputResult {
    // Only process key press events, not release (Windows sends both)
    if key.kind != KeyEventKind::Press {
        return InputResult::Continue;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && matches!(key.code, KeyCode::Char('c')) {
        return InputResult::Quit;
    }

    let typing = app.screen == Screen::Search && app.nav.is_search_field_focused();
    if typing {
        handle_typing(app, key, ctrl, now);
        return InputResult::Continue;
    }

    let command = match key.code {
        KeyCode::Char('q') => return InputResult::Quit,
        KeyCode::Char('/') => {
            if app.can_open_search() {
                app.open_search();
            }
            return InputResult::Continue;
        }
        KeyCode::Up | KeyCode::Char('k') => RemoteCommand::Navigate(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => RemoteCommand::Navigate(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') => RemoteCommand::Navigate(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') => RemoteCommand::Navigate(Direction::Right),
        KeyCode::Enter | KeyCode::Char(' ') => RemoteCommand::Ok,
        KeyCode::Esc | KeyCode::Backspace => RemoteCommand::Back,
        _ => return InputResult::Continue,
    };
    app.handle_command(command);
    InputResult::Continue
}

fn handle_typing(app: &mut App, key: KeyEvent, ctrl: bool, now: Instant) {
    let request = match key.code {
        KeyCode::Esc => return app.handle_command(RemoteCommand::Back),
        // leave the field for the first result
        KeyCode::Enter | KeyCode::Down => {
            return app.handle_command(RemoteCommand::Navigate(Direction::Down))
        }
        KeyCode::Up => return app.handle_command(RemoteCommand::Navigate(Direction::Up)),
        KeyCode::Left => InputRequest::GoToPrevChar,
        KeyCode::Right => InputRequest::GoToNextChar,
        KeyCode::Home => InputRequest::GoToStart,
        KeyCode::End => InputRequest::GoToEnd,
        KeyCode::Backspace => InputRequest::DeletePrevChar,
        KeyCode::Delete => InputRequest::DeleteNextChar,
        KeyCode::Char('u') if ctrl => InputRequest::DeleteLine,
        KeyCode::Char('w') if ctrl => InputRequest::DeletePrevWord,
        KeyCode::Char(c) if !ctrl => InputRequest::InsertChar(c),
        _ => return,
    };
    app.handle_text_input(request, now);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AsyncAction;
    use crate::config::AppConfig;
    use crate::source::{CategoryEntry, ContentKind};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_on_categories() -> App {
        let mut app = App::new(&AppConfig::template());
        app.start();
        app.handle_async_action(AsyncAction::CategoriesLoaded(
            ["News", "Sports"]
                .iter()
                .map(|n| CategoryEntry {
                    id: n.to_string(),
                    name: n.to_string(),
                    kind: ContentKind::Live,
                })
                .collect(),
        ));
        app.take_tasks();
        app
    }

    #[test]
    fn test_release_events_ignored() {
        let mut app = app_on_categories();
        let mut release = key(KeyCode::Down);
        release.kind = KeyEventKind::Release;
        handle_key_event(&mut app, release, Instant::now());
        assert_eq!(app.nav.focused_index(), Some(0));
    }

    #[test]
    fn test_q_quits_outside_search_only() {
        let mut app = app_on_categories();
        let now = Instant::now();
        assert_eq!(handle_key_event(&mut app, key(KeyCode::Char('q')), now), InputResult::Quit);

        handle_key_event(&mut app, key(KeyCode::Char('/')), now);
        assert_eq!(app.screen, Screen::Search);
        assert_eq!(
            handle_key_event(&mut app, key(KeyCode::Char('q')), now),
            InputResult::Continue
        );
        assert_eq!(app.search_input.value(), "q");
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        let mut app = app_on_categories();
        handle_key_event(&mut app, key(KeyCode::Char('/')), Instant::now());
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key_event(&mut app, ctrl_c, Instant::now()), InputResult::Quit);
    }

    #[test]
    fn test_typing_edits_and_escape_leaves() {
        let mut app = app_on_categories();
        let now = Instant::now();
        handle_key_event(&mut app, key(KeyCode::Char('/')), now);
        for c in "nwes".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c)), now);
        }
        handle_key_event(&mut app, key(KeyCode::Backspace), now);
        handle_key_event(&mut app, key(KeyCode::Backspace), now);
        handle_key_event(&mut app, key(KeyCode::Left), now);
        handle_key_event(&mut app, key(KeyCode::Char('e')), now);
        assert_eq!(app.search_input.value(), "new");

        handle_key_event(&mut app, key(KeyCode::Esc), now);
        assert_eq!(app.screen, Screen::Categories);
    }

    #[test]
    fn test_enter_opens_focused_category() {
        let mut app = app_on_categories();
        handle_key_event(&mut app, key(KeyCode::Down), Instant::now());
        handle_key_event(&mut app, key(KeyCode::Enter), Instant::now());
        assert_eq!(app.screen, Screen::Channels);
        assert_eq!(
            app.current_category.as_ref().map(|c| c.name.as_str()),
            Some("Sports")
        );

        handle_key_event(&mut app, key(KeyCode::Backspace), Instant::now());
        assert_eq!(app.screen, Screen::Categories);
    }
}
