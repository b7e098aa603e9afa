//! Keyboard event handling for the TUI.
//!
//! Maps crossterm keyboard events to application state changes. Key behavior
//! depends on the focused panel; an open confirmation popup takes every key.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Focus};
use crate::models::MainTab;

/// Handles a keyboard event and updates the app state accordingly.
///
/// Returns `true` if the application should quit, `false` otherwise.
///
/// # Event Handling
///
/// - `Ctrl+C`: quit from anywhere; `q` quits outside the title input
/// - `Tab` / `Shift+Tab`: cycle focus between panels of the active tab
/// - `Esc`: return to the first panel and clear the selection
/// - `1` / `2`: switch to the Search / Manage tab (outside the title input)
/// - Title input: typing edits the title query
/// - Tag picker: `j`/`k` move, `Space`/`Enter` select or deselect
/// - Note list: `j`/`k` navigate; in Manage `J`/`K` move the note, `d` deletes
/// - Detail view: `j`/`k` scroll
/// - Demo banner: `g` generate, `x` ask later, `X` never ask again
///
/// # Examples
///
/// ```
/// use getem::tui::{App, event::handle_key_event};
/// use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
///
/// let mut app = App::new();
/// let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
/// assert!(handle_key_event(&mut app, key));
/// ```
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if app.pending_delete().is_some() {
        handle_confirm_popup(app, key);
        return false;
    }

    match key.code {
        KeyCode::Tab => {
            app.next_focus();
            return false;
        }
        KeyCode::BackTab => {
            app.prev_focus();
            return false;
        }
        KeyCode::Esc => {
            app.reset_focus();
            return false;
        }
        _ => {}
    }

    if app.focus() == Focus::TitleInput {
        handle_title_input(app, key);
        return false;
    }

    match key.code {
        KeyCode::Char('q') if key.modifiers.is_empty() => return true,
        KeyCode::Char('1') => {
            app.switch_tab(MainTab::Search);
            return false;
        }
        KeyCode::Char('2') => {
            app.switch_tab(MainTab::Manage);
            return false;
        }
        KeyCode::Char('g') if app.demo_prompt() => {
            app.request_demo();
            return false;
        }
        KeyCode::Char('x') if app.demo_prompt() => {
            app.dismiss_demo_prompt();
            return false;
        }
        KeyCode::Char('X') if app.demo_prompt() => {
            app.hide_demo_permanently();
            return false;
        }
        _ => {}
    }

    match app.focus() {
        Focus::TitleInput => {}
        Focus::TagPicker => handle_tag_picker(app, key),
        Focus::NoteList => handle_note_list(app, key),
        Focus::DetailView => handle_detail_view(app, key),
    }

    false
}

fn handle_confirm_popup(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => app.answer_delete_confirm(true),
        KeyCode::Char('n') | KeyCode::Esc => app.answer_delete_confirm(false),
        _ => {}
    }
}

fn handle_title_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            app.push_title_char(c);
        }
        KeyCode::Backspace => app.pop_title_char(),
        KeyCode::Down | KeyCode::Enter => app.next_focus(),
        _ => {}
    }
}

fn handle_tag_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.tag_cursor_next(),
        KeyCode::Char('k') | KeyCode::Up => app.tag_cursor_previous(),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_tag_at_cursor(),
        _ => {}
    }
}

/// Vim-style navigation; shifted `J`/`K` reorder in the Manage tab.
fn handle_note_list(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Char('J') => app.move_selected(true),
        KeyCode::Char('K') => app.move_selected(false),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
        KeyCode::Enter => app.next_focus(),
        _ => {}
    }
}

fn handle_detail_view(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.scroll_detail_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_detail_up(1),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoteId;
    use crate::tui::Command;

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn ctrl_c_quits_from_any_focus() {
        let mut app = App::new();
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(handle_key_event(&mut app, key));

        app.next_focus();
        assert!(handle_key_event(&mut app, key));
    }

    #[test]
    fn q_types_into_title_but_quits_elsewhere() {
        let mut app = App::new();
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.title_input(), "q");

        press(&mut app, KeyCode::Tab);
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn tab_key_cycles_focus() {
        let mut app = App::new();

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus(), Focus::TagPicker);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus(), Focus::NoteList);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus(), Focus::DetailView);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus(), Focus::TitleInput);
    }

    #[test]
    fn shift_tab_cycles_focus_backwards() {
        let mut app = App::new();
        let key = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);

        handle_key_event(&mut app, key);
        assert_eq!(app.focus(), Focus::DetailView);
    }

    #[test]
    fn backspace_edits_title() {
        let mut app = App::new();
        press(&mut app, KeyCode::Char('h'));
        press(&mut app, KeyCode::Char('i'));
        press(&mut app, KeyCode::Backspace);

        assert_eq!(app.title_input(), "h");
        assert!(app.take_refresh());
    }

    #[test]
    fn number_keys_request_tab_switch() {
        let mut app = App::new();
        press(&mut app, KeyCode::Tab);

        press(&mut app, KeyCode::Char('1'));
        assert!(app.take_commands().is_empty());

        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.take_commands(), vec![Command::SwitchTab(MainTab::Manage)]);
    }

    #[test]
    fn popup_swallows_keys_until_answered() {
        let mut app = App::new();
        let id = NoteId::new("n1");
        app.open_delete_confirm(id.clone());

        assert!(!press(&mut app, KeyCode::Char('q')));
        assert!(app.pending_delete().is_some());

        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.take_commands(), vec![Command::ConfirmDelete(id)]);
    }

    #[test]
    fn esc_in_popup_cancels() {
        let mut app = App::new();
        app.open_delete_confirm(NoteId::new("n1"));

        press(&mut app, KeyCode::Esc);

        assert!(app.pending_delete().is_none());
        assert!(app.take_commands().is_empty());
    }

    #[test]
    fn detail_view_scrolls() {
        let mut app = App::new();
        app.prev_focus();
        assert_eq!(app.focus(), Focus::DetailView);

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.detail_scroll(), 1);
    }
}
