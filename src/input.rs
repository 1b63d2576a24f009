//! Input handling abstractions.
//!
//! Keyboard events are translated into [`Action`]s by mode-specific handlers,
//! so key bindings can be tested without a terminal or a running session.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Something the user asked the application to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Nothing to do.
    None,
    /// Leave the application.
    Quit,
    /// Move the song selection up.
    SelectPrevious,
    /// Move the song selection down.
    SelectNext,
    /// Load the selected song.
    LoadSelected,
    /// Start or resume playback.
    Play,
    /// Pause playback.
    Pause,
    /// Start synchronizing the loaded song.
    Sync,
    /// Enter search mode.
    StartSearch,
    /// Append a character to the search query.
    SearchInput(char),
    /// Delete the last search character.
    SearchBackspace,
    /// Leave search mode keeping the filter.
    SearchCommit,
    /// Leave search mode and clear the filter.
    SearchCancel,
    /// Close the error or help overlay.
    Dismiss,
    /// Show or hide the help overlay.
    ToggleHelp,
}

/// What the handlers need to know about the application.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputContext {
    /// Search query is being edited.
    pub search_active: bool,
    /// An error or help overlay is covering the screen.
    pub overlay_shown: bool,
}

/// Trait for handling keyboard input.
///
/// Implementations of this trait handle input for specific modes
/// or input contexts.
pub trait InputHandler {
    /// Translate a key event into an action.
    fn handle(&self, key: KeyEvent) -> Action;

    /// Get the name of this handler (for debugging).
    fn name(&self) -> &'static str;
}

/// Handler while an overlay is shown: any key closes it.
#[derive(Debug, Default)]
pub struct OverlayHandler;

impl InputHandler for OverlayHandler {
    fn handle(&self, _key: KeyEvent) -> Action {
        Action::Dismiss
    }

    fn name(&self) -> &'static str {
        "OverlayHandler"
    }
}

/// Handler for editing the search query.
#[derive(Debug, Default)]
pub struct SearchHandler;

impl InputHandler for SearchHandler {
    fn handle(&self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => Action::SearchCancel,
            KeyCode::Enter => Action::SearchCommit,
            KeyCode::Backspace => Action::SearchBackspace,
            KeyCode::Up => Action::SelectPrevious,
            KeyCode::Down => Action::SelectNext,
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => Action::SearchInput(c),
            _ => Action::None,
        }
    }

    fn name(&self) -> &'static str {
        "SearchHandler"
    }
}

/// Handler for the main player screen.
#[derive(Debug, Default)]
pub struct PlayerHandler;

impl InputHandler for PlayerHandler {
    fn handle(&self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Up | KeyCode::Char('k') => Action::SelectPrevious,
            KeyCode::Down | KeyCode::Char('j') => Action::SelectNext,
            KeyCode::Enter => Action::LoadSelected,
            KeyCode::Char('p') => Action::Play,
            KeyCode::Char(' ') => Action::Pause,
            KeyCode::Char('s') => Action::Sync,
            KeyCode::Char('/') => Action::StartSearch,
            KeyCode::Char('?') | KeyCode::F(1) => Action::ToggleHelp,
            _ => Action::None,
        }
    }

    fn name(&self) -> &'static str {
        "PlayerHandler"
    }
}

/// Route `key` to the handler for the current context.
pub fn dispatch(key: KeyEvent, ctx: InputContext) -> Action {
    let handler: &dyn InputHandler = if ctx.overlay_shown {
        &OverlayHandler
    } else if ctx.search_active {
        &SearchHandler
    } else {
        &PlayerHandler
    };
    let action = handler.handle(key);
    if action != Action::None {
        tracing::trace!("{} mapped {:?} to {action:?}", handler.name(), key.code);
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    #[test]
    fn test_overlay_swallows_any_key() {
        let ctx = InputContext { overlay_shown: true, search_active: true };
        assert_eq!(dispatch(make_key(KeyCode::Char('q')), ctx), Action::Dismiss);
    }

    #[test]
    fn test_search_captures_letters() {
        let ctx = InputContext { search_active: true, ..InputContext::default() };
        assert_eq!(dispatch(make_key(KeyCode::Char('s')), ctx), Action::SearchInput('s'));
        assert_eq!(dispatch(make_key(KeyCode::Esc), ctx), Action::SearchCancel);
    }

    #[test]
    fn test_player_bindings() {
        let ctx = InputContext::default();
        assert_eq!(dispatch(make_key(KeyCode::Char('s')), ctx), Action::Sync);
        assert_eq!(dispatch(make_key(KeyCode::Char(' ')), ctx), Action::Pause);
        assert_eq!(dispatch(make_key(KeyCode::Enter), ctx), Action::LoadSelected);
        assert_eq!(dispatch(make_key(KeyCode::Char('x')), ctx), Action::None);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(dispatch(key, InputContext::default()), Action::Quit);
    }
}
