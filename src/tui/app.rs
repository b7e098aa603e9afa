use crate::models::{MainTab, NoteId, ResolvedNote, TagWithNotesInfo};
use crate::service::NoteService;
use crate::storage::KeyValueStore;
use crate::view::SearchQuery;

/// Application state for the TUI.
///
/// Holds a snapshot of what the service derived plus the view-only state:
/// focus, selection, the search query and an open confirmation popup.
/// Mutations are not applied here. Key handling queues a [`Command`] that
/// the event loop runs against the service before calling [`App::sync`].
#[derive(Debug, Clone, Default)]
pub struct App {
    /// Active main tab, mirrored from the persisted option
    tab: MainTab,
    /// Currently displayed notes (search results or all notes)
    notes: Vec<ResolvedNote>,
    /// Tags offered by the search picker
    tag_options: Vec<TagWithNotesInfo>,
    /// Currently selected note index (None if no selection)
    selected_index: Option<usize>,
    /// Cursor inside the tag picker
    tag_cursor: Option<usize>,
    /// Title query and selected tags
    query: SearchQuery,
    /// Currently focused panel
    focus: Focus,
    /// Scroll offset for detail view
    detail_scroll: u16,
    /// Note awaiting delete confirmation
    confirm_delete: Option<NoteId>,
    /// Whether the demo banner is shown
    demo_prompt: bool,
    /// Demo banner dismissed until next start
    demo_dismissed: bool,
    hide_tooltips: bool,
    /// `excludeUnusedTagsForSearch` as of the last sync
    exclude_unused: bool,
    /// Last error or info line shown in the shortcut bar
    status: Option<String>,
    needs_refresh: bool,
    pending: Vec<Command>,
}

/// Panel focus state for keyboard navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Title query input (Search tab only)
    #[default]
    TitleInput,
    /// Tag picker (Search tab only)
    TagPicker,
    /// Note list panel (j/k navigation)
    NoteList,
    /// Detail view panel (j/k scrolling)
    DetailView,
}

/// A state change requested by a key press, applied by the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SwitchTab(MainTab),
    MoveNote { active: NoteId, over: NoteId },
    RequestDelete(NoteId),
    ConfirmDelete(NoteId),
    GenerateDemo,
    HideDemoPermanently,
}

impl App {
    /// Creates a new App with default state.
    ///
    /// # Examples
    ///
    /// ```
    /// use getem::tui::{App, Focus};
    ///
    /// let app = App::new();
    /// assert!(app.notes().is_empty());
    /// assert_eq!(app.focus(), Focus::TitleInput);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the initial state from the service.
    pub fn from_service<S: KeyValueStore>(service: &NoteService<S>) -> Self {
        let mut app = Self::new();
        app.sync(service);
        app.focus = app.focus_ring()[0];
        app
    }

    /// Refreshes every derived field from the service.
    ///
    /// The selection follows the selected note by id when it is still shown.
    pub fn sync<S: KeyValueStore>(&mut self, service: &NoteService<S>) {
        let selected_id = self.selected_note().map(|note| note.id.clone());
        let options = service.options();

        self.tab = options.active_main_tab();
        self.hide_tooltips = options.hide_tooltips();
        self.demo_prompt = service.demo_prompt_visible() && !self.demo_dismissed;

        // Unused selections are dropped once, when the option is switched on.
        let exclude_unused = options.exclude_unused_tags_for_search();
        self.query.retain_existing(service.tags_with_notes_info());
        if exclude_unused && !self.exclude_unused {
            self.query.exclude_unused();
        }
        self.exclude_unused = exclude_unused;

        // Selected tags stay in the picker so they can be deselected.
        self.tag_options = service
            .tags_with_notes_info()
            .iter()
            .filter(|tag| {
                !exclude_unused || tag.is_used_by_notes() || self.query.is_selected(tag.id())
            })
            .cloned()
            .collect();
        self.tag_cursor = match self.tag_cursor {
            _ if self.tag_options.is_empty() => None,
            Some(i) => Some(i.min(self.tag_options.len() - 1)),
            None => None,
        };

        self.notes = match self.tab {
            MainTab::Search => service.search(&self.query).into_iter().cloned().collect(),
            MainTab::Manage => service.resolved_notes().to_vec(),
        };
        self.selected_index =
            selected_id.and_then(|id| self.notes.iter().position(|note| note.id == id));

        if !self.focus_ring().contains(&self.focus) {
            self.focus = self.focus_ring()[0];
        }
        if self
            .confirm_delete
            .as_ref()
            .is_some_and(|id| service.note(id).is_none())
        {
            self.confirm_delete = None;
        }
        self.needs_refresh = false;
    }

    /// Returns the active tab.
    pub fn tab(&self) -> MainTab {
        self.tab
    }

    /// Returns the currently displayed notes.
    pub fn notes(&self) -> &[ResolvedNote] {
        &self.notes
    }

    /// Returns the tags offered by the picker.
    pub fn tag_options(&self) -> &[TagWithNotesInfo] {
        &self.tag_options
    }

    /// Returns the currently selected note index.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn tag_cursor(&self) -> Option<usize> {
        self.tag_cursor
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// Returns the current focus state.
    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn pending_delete(&self) -> Option<&NoteId> {
        self.confirm_delete.as_ref()
    }

    pub fn demo_prompt(&self) -> bool {
        self.demo_prompt
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    /// A hint explaining an empty result caused by an unused selected tag.
    pub fn unused_tag_hint(&self) -> Option<&'static str> {
        (!self.hide_tooltips && self.query.has_unused_selection())
            .then_some("Selected tags include unused tags, so no note can match")
    }

    /// Returns the currently selected note, if any.
    pub fn selected_note(&self) -> Option<&ResolvedNote> {
        self.selected_index.and_then(|i| self.notes.get(i))
    }

    /// Returns `true` once if the view must be recomputed from the service.
    pub fn take_refresh(&mut self) -> bool {
        std::mem::take(&mut self.needs_refresh)
    }

    /// Drains the queued commands in request order.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.pending)
    }

    fn push_command(&mut self, command: Command) {
        self.status = None;
        self.pending.push(command);
    }

    // ---- focus ----

    fn focus_ring(&self) -> &'static [Focus] {
        match self.tab {
            MainTab::Search => &[
                Focus::TitleInput,
                Focus::TagPicker,
                Focus::NoteList,
                Focus::DetailView,
            ],
            MainTab::Manage => &[Focus::NoteList, Focus::DetailView],
        }
    }

    /// Cycles focus to the next panel of the active tab.
    ///
    /// # Examples
    ///
    /// ```
    /// use getem::tui::{App, Focus};
    ///
    /// let mut app = App::new();
    /// app.next_focus();
    /// assert_eq!(app.focus(), Focus::TagPicker);
    /// ```
    pub fn next_focus(&mut self) {
        let ring = self.focus_ring();
        let index = ring.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = ring[(index + 1) % ring.len()];
        self.auto_select_on_focus();
    }

    /// Cycles focus to the previous panel of the active tab.
    pub fn prev_focus(&mut self) {
        let ring = self.focus_ring();
        let index = ring.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = ring[(index + ring.len() - 1) % ring.len()];
        self.auto_select_on_focus();
    }

    fn auto_select_on_focus(&mut self) {
        match self.focus {
            Focus::NoteList if self.selected_index.is_none() && !self.notes.is_empty() => {
                self.selected_index = Some(0);
            }
            Focus::TagPicker if self.tag_cursor.is_none() && !self.tag_options.is_empty() => {
                self.tag_cursor = Some(0);
            }
            _ => {}
        }
    }

    /// Returns focus to the first panel of the active tab and clears the selection.
    pub fn reset_focus(&mut self) {
        self.focus = self.focus_ring()[0];
        self.selected_index = None;
    }

    /// Requests switching to `tab`; the choice is persisted by the event loop.
    pub fn switch_tab(&mut self, tab: MainTab) {
        if tab != self.tab {
            self.push_command(Command::SwitchTab(tab));
        }
    }

    // ---- note list ----

    /// Moves selection down in the notes list, wrapping at the end.
    pub fn select_next(&mut self) {
        self.selected_index = wrap_next(self.selected_index, self.notes.len());
        self.detail_scroll = 0;
    }

    /// Moves selection up in the notes list, wrapping at the start.
    pub fn select_previous(&mut self) {
        self.selected_index = wrap_previous(self.selected_index, self.notes.len());
        self.detail_scroll = 0;
    }

    /// Requests moving the selected note one place down (`down`) or up.
    ///
    /// Only the Manage tab reorders; the Search tab shows a filtered subset.
    pub fn move_selected(&mut self, down: bool) {
        if self.tab != MainTab::Manage {
            return;
        }
        let Some(index) = self.selected_index else {
            return;
        };
        let neighbor = if down {
            index.checked_add(1).filter(|i| *i < self.notes.len())
        } else {
            index.checked_sub(1)
        };
        if let Some(neighbor) = neighbor {
            let command = Command::MoveNote {
                active: self.notes[index].id.clone(),
                over: self.notes[neighbor].id.clone(),
            };
            self.push_command(command);
        }
    }

    /// Requests deleting the selected note (Manage tab only).
    pub fn delete_selected(&mut self) {
        if self.tab != MainTab::Manage {
            return;
        }
        if let Some(id) = self.selected_note().map(|note| note.id.clone()) {
            self.push_command(Command::RequestDelete(id));
        }
    }

    /// Opens the confirmation popup for `id`.
    pub fn open_delete_confirm(&mut self, id: NoteId) {
        self.confirm_delete = Some(id);
    }

    /// Answers the confirmation popup.
    pub fn answer_delete_confirm(&mut self, confirmed: bool) {
        if let Some(id) = self.confirm_delete.take()
            && confirmed
        {
            self.push_command(Command::ConfirmDelete(id));
        }
    }

    // ---- detail view ----

    /// Returns the current detail view scroll offset.
    pub fn detail_scroll(&self) -> u16 {
        self.detail_scroll
    }

    pub fn scroll_detail_down(&mut self, amount: u16) {
        self.detail_scroll = self.detail_scroll.saturating_add(amount);
    }

    pub fn scroll_detail_up(&mut self, amount: u16) {
        self.detail_scroll = self.detail_scroll.saturating_sub(amount);
    }

    // ---- search ----

    /// Returns the title query buffer.
    pub fn title_input(&self) -> &str {
        &self.query.title
    }

    pub fn push_title_char(&mut self, c: char) {
        self.query.title.push(c);
        self.needs_refresh = true;
    }

    pub fn pop_title_char(&mut self) {
        self.query.title.pop();
        self.needs_refresh = true;
    }

    pub fn tag_cursor_next(&mut self) {
        self.tag_cursor = wrap_next(self.tag_cursor, self.tag_options.len());
    }

    pub fn tag_cursor_previous(&mut self) {
        self.tag_cursor = wrap_previous(self.tag_cursor, self.tag_options.len());
    }

    /// Selects or deselects the tag under the picker cursor.
    pub fn toggle_tag_at_cursor(&mut self) {
        if let Some(tag) = self.tag_cursor.and_then(|i| self.tag_options.get(i)) {
            let tag = tag.clone();
            self.query.toggle_tag(&tag);
            self.needs_refresh = true;
        }
    }

    // ---- demo ----

    /// Hides the demo banner until the next start.
    pub fn dismiss_demo_prompt(&mut self) {
        self.demo_dismissed = true;
        self.demo_prompt = false;
    }

    pub fn request_demo(&mut self) {
        if self.demo_prompt {
            self.push_command(Command::GenerateDemo);
        }
    }

    pub fn hide_demo_permanently(&mut self) {
        if self.demo_prompt {
            self.push_command(Command::HideDemoPermanently);
        }
    }
}

fn wrap_next(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        Some(i) if i + 1 < len => i + 1,
        _ => 0,
    })
}

fn wrap_previous(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        None | Some(0) => len - 1,
        Some(i) => i - 1,
    })
}
