//! UI rendering functions for the TUI.
//!
//! Search tab: title input on top, then tag picker, note list and detail
//! view side by side. Manage tab: note list and detail view only.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

use super::app::{App, Focus};
use crate::models::MainTab;

const PREVIEW_CHARS: usize = 40;

/// Main rendering function for the TUI.
pub fn draw(frame: &mut Frame, app: &App) {
    let size = frame.area();
    let banner_height = if app.demo_prompt() { 3 } else { 0 };
    let input_height = if app.tab() == MainTab::Search { 3 } else { 0 };

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // Tab bar
            Constraint::Length(banner_height), // Demo banner
            Constraint::Length(input_height),  // Title input
            Constraint::Min(0),                // Content area
            Constraint::Length(1),             // Shortcut bar
        ])
        .split(size);

    render_tab_bar(frame, app, main_chunks[0]);
    if app.demo_prompt() {
        render_demo_banner(frame, main_chunks[1]);
    }

    match app.tab() {
        MainTab::Search => {
            render_title_input(frame, app, main_chunks[2]);
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(20), // Tag picker
                    Constraint::Percentage(30), // Note list
                    Constraint::Percentage(50), // Detail view
                ])
                .split(main_chunks[3]);
            render_tag_picker(frame, app, content_chunks[0]);
            render_note_list(frame, app, content_chunks[1]);
            render_detail_view(frame, app, content_chunks[2]);
        }
        MainTab::Manage => {
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
                .split(main_chunks[3]);
            render_note_list(frame, app, content_chunks[0]);
            render_detail_view(frame, app, content_chunks[1]);
        }
    }

    render_shortcut_bar(frame, app, main_chunks[4]);

    if app.pending_delete().is_some() {
        render_delete_popup(frame, app, size);
    }
}

fn focus_border(app: &App, focus: Focus) -> Style {
    if app.focus() == focus {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let selected = match app.tab() {
        MainTab::Search => 0,
        MainTab::Manage => 1,
    };
    let tabs = Tabs::new(vec!["1 Search", "2 Manage"])
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn render_demo_banner(frame: &mut Frame, area: Rect) {
    let key_style = Style::default().fg(Color::Green);
    let line = Line::from(vec![
        Span::raw("Generate some notes for demo purposes? Existing data is kept. "),
        Span::styled("g", key_style),
        Span::raw(": generate once  "),
        Span::styled("x", key_style),
        Span::raw(": ask later  "),
        Span::styled("X", key_style),
        Span::raw(": never ask again"),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Shows the title query with a cursor indicator when focused.
fn render_title_input(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Title")
        .border_style(focus_border(app, Focus::TitleInput));

    let mut content = app.title_input().to_string();
    if app.focus() == Focus::TitleInput {
        content.push('█');
    }

    frame.render_widget(Paragraph::new(content).block(block), area);
}

/// Lists the searchable tags; selected ones are marked and highlighted.
fn render_tag_picker(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Tags")
        .border_style(focus_border(app, Focus::TagPicker));

    let items: Vec<ListItem> = app
        .tag_options()
        .iter()
        .map(|tag| {
            let selected = app.query().is_selected(tag.id());
            let marker = if selected { "[x] " } else { "[ ] " };
            let mut style = Style::default();
            if selected {
                style = style.fg(Color::Cyan);
            }
            if !tag.is_used_by_notes() {
                style = style.add_modifier(Modifier::DIM);
            }
            ListItem::new(Line::from(vec![
                Span::raw(marker),
                Span::styled(tag.label().to_string(), style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut list_state = ListState::default();
    list_state.select(app.tag_cursor().filter(|_| app.focus() == Focus::TagPicker));

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn preview(title: &str) -> String {
    if title.chars().count() > PREVIEW_CHARS {
        let cut: String = title.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        title.to_string()
    }
}

/// Displays each note with its title preview and tag labels.
fn render_note_list(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.tab() {
        MainTab::Search => format!("Notes ({})", app.notes().len()),
        MainTab::Manage => "Notes".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(focus_border(app, Focus::NoteList));

    let items: Vec<ListItem> = app
        .notes()
        .iter()
        .map(|note| {
            let mut spans = vec![Span::raw(preview(&note.title))];
            if !note.tags.is_empty() {
                spans.push(Span::raw(" "));
                spans.push(Span::styled(
                    format!("[{}]", note.tag_labels().join(", ")),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::REVERSED),
    );

    let mut list_state = ListState::default();
    list_state.select(app.selected_index());

    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Shows the selected note: title, tags and the markdown-rendered body.
fn render_detail_view(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Detail")
        .border_style(focus_border(app, Focus::DetailView));

    let content = if let Some(note) = app.selected_note() {
        let mut text = Text::default();
        text.lines.push(Line::from(Span::styled(
            note.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )));

        if !note.tags.is_empty() {
            let mut spans = vec![Span::raw("Tags: ")];
            for (i, tag) in note.tags.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::raw(", "));
                }
                spans.push(Span::styled(tag.label(), Style::default().fg(Color::Cyan)));
            }
            text.lines.push(Line::from(spans));
        }

        text.lines.push(Line::from(""));
        text.lines.extend(tui_markdown::from_str(&note.body).lines);
        text
    } else if let Some(hint) = app.unused_tag_hint() {
        Text::from(hint)
    } else {
        Text::from("No note selected")
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll(), 0));

    frame.render_widget(paragraph, area);
}

fn render_delete_popup(frame: &mut Frame, app: &App, area: Rect) {
    let title = app
        .pending_delete()
        .and_then(|id| app.notes().iter().find(|note| &note.id == id))
        .map_or("this note", |note| note.title.as_str());

    let popup = centered_rect(50, 5, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Delete note")
        .border_style(Style::default().fg(Color::Red));
    let text = Text::from(vec![
        Line::from(format!("Delete \"{}\"?", preview(title))),
        Line::from(vec![
            Span::styled("y", Style::default().fg(Color::Red)),
            Span::raw(": delete  "),
            Span::styled("n", Style::default().fg(Color::Cyan)),
            Span::raw(": cancel"),
        ]),
    ]);

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(text).block(block), popup);
}

/// A rectangle `percent_x` wide and `height` tall, centered in `area`.
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = area.width.saturating_mul(percent_x) / 100;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

/// Shows context-aware keyboard shortcuts, or the last status message.
fn render_shortcut_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(status) = app.status() {
        let line = Line::from(Span::styled(status, Style::default().fg(Color::Yellow)));
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let key_style = Style::default().fg(Color::Cyan);
    let sep_style = Style::default().fg(Color::DarkGray);

    let mut spans = vec![
        Span::styled("Ctrl+C", key_style),
        Span::raw(": quit"),
        Span::styled(" | ", sep_style),
        Span::styled("Tab", key_style),
        Span::raw(": next panel"),
        Span::styled(" | ", sep_style),
        Span::styled("1/2", key_style),
        Span::raw(": tabs"),
    ];

    let extra: &[(&str, &str)] = match (app.tab(), app.focus()) {
        (_, Focus::TitleInput) => &[("Enter", "to tags")],
        (_, Focus::TagPicker) => &[("j/k", "move"), ("Space", "select")],
        (MainTab::Manage, Focus::NoteList) => {
            &[("j/k", "navigate"), ("J/K", "reorder"), ("d", "delete")]
        }
        (_, Focus::NoteList) => &[("j/k", "navigate")],
        (_, Focus::DetailView) => &[("j/k", "scroll")],
    };
    for (key, action) in extra {
        spans.push(Span::styled(" | ", sep_style));
        spans.push(Span::styled(*key, key_style));
        spans.push(Span::raw(format!(": {action}")));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
