use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use sshconf::{host_block_lines, Host};

use crate::app::{App, View};
use crate::editor::{EditorMode, ModalEditor};
use crate::status_manager::MessageType;

const ACCENT: Color = Color::Indexed(205);
const TAB_WIDTH: usize = 4;
const GUTTER_WIDTH: u16 = 5;

const BROWSE_HELP: &str =
    "q: quit | ↑↓: navigate | enter: connect | e: edit config | click: select server/edit config";
const NORMAL_HELP: &str =
    "i: insert | o: new line | dd: delete line | ZZ: save+quit | :: command | hjkl: move | ESC: exit";
const INSERT_HELP: &str = "ESC: normal mode | Type to edit";
const COMMAND_HELP: &str = ":w save | :q quit | :wq save+quit | :q! force quit | ESC: cancel";

/// Screen regions of the browse view. Shared with mouse hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowseLayout {
    pub list: Rect,
    pub details: Rect,
    pub preview: Rect,
    pub status: Rect,
}

impl BrowseLayout {
    pub fn new(area: Rect, list_width_percent: u16) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(list_width_percent),
                Constraint::Percentage(100 - list_width_percent),
            ])
            .split(rows[0]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[0]);

        Self {
            list: left[0],
            details: left[1],
            preview: columns[1],
            status: rows[1],
        }
    }
}

pub fn draw(f: &mut Frame, app: &mut App) {
    match app.view() {
        View::Edit => draw_editor(f, app),
        View::Browse => match app.load_error() {
            Some(error) => draw_load_error(f, error),
            None => draw_browse(f, app),
        },
    }
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))
}

fn draw_load_error(f: &mut Frame, error: &str) {
    let message = Paragraph::new(format!("Error loading SSH config: {}", error))
        .style(Style::default().fg(Color::Red))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(panel("hostdeck"));
    f.render_widget(message, f.size());
}

fn draw_browse(f: &mut Frame, app: &mut App) {
    let layout = BrowseLayout::new(f.size(), app.settings.list_width_percent);

    draw_host_list(f, app, layout.list);
    draw_details(f, app.selected_host(), layout.details);
    draw_preview(f, app, layout.preview);
    draw_status_bar(f, app, layout.status);
}

fn draw_host_list(f: &mut Frame, app: &mut App, area: Rect) {
    let block = panel("SSH Servers");

    if app.hosts().is_empty() {
        let empty = Paragraph::new("No servers found in SSH config")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .hosts()
        .iter()
        .map(|host| ListItem::new(host.name.clone()))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");

    f.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_details(f: &mut Frame, host: Option<&Host>, area: Rect) {
    let label = Style::default().fg(Color::Cyan);
    let mut lines = Vec::new();

    if let Some(host) = host {
        let mut push = |key: &str, value: &str| {
            lines.push(Line::from(vec![
                Span::styled(format!("{}: ", key), label),
                Span::raw(value.to_string()),
            ]));
        };

        push("Host", &host.name);
        if let Some(hostname) = &host.hostname {
            push("HostName", hostname);
        }
        if let Some(user) = &host.user {
            push("User", user);
        }
        if let Some(port) = &host.port {
            push("Port", port);
        }
        for (key, value) in host.sorted_options() {
            push(&title_case(key), value);
        }
    } else {
        lines.push(Line::styled(
            "No server selected",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let details = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(panel("Metadata"));
    f.render_widget(details, area);
}

fn draw_preview(f: &mut Frame, app: &App, area: Rect) {
    let content = app.config_content();
    let marks = app
        .selected_host()
        .map(|host| host_block_lines(content, &host.name))
        .unwrap_or_default();

    let highlight = Style::default().fg(ACCENT).add_modifier(Modifier::BOLD);
    let lines: Vec<Line> = content
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if marks.get(i).copied().unwrap_or(false) {
                Line::styled(line.to_string(), highlight)
            } else {
                Line::raw(line.to_string())
            }
        })
        .collect();

    // Keep the selected block on screen.
    let visible = usize::from(area.height.saturating_sub(2));
    let scroll = match marks.iter().position(|marked| *marked) {
        Some(first) if first + 1 > visible => first.saturating_sub(2),
        _ => 0,
    };

    let title = format!("{} (click to edit)", app.config_path().display());
    let preview = Paragraph::new(lines)
        .block(panel(&title))
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
    f.render_widget(preview, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let bar = match app.status.current_message() {
        Some(message) => {
            let color = match message.message_type {
                MessageType::Info => Color::Cyan,
                MessageType::Success => Color::Green,
                MessageType::Error => Color::Red,
            };
            Paragraph::new(message.content.clone()).style(Style::default().fg(color))
        }
        None if app.settings.show_help_bar => {
            Paragraph::new(BROWSE_HELP).style(Style::default().fg(Color::DarkGray))
        }
        None => Paragraph::new(""),
    };
    f.render_widget(bar, area);
}

fn draw_editor(f: &mut Frame, app: &App) {
    let editor = &app.editor;
    let outer = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT))
        .title(Span::styled(
            "SSH Config Editor (Vim Mode)",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ));
    let inner = outer.inner(f.size());
    f.render_widget(outer, f.size());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Length(1), // help
            Constraint::Length(1), // command line / messages
            Constraint::Min(0),    // text
        ])
        .split(inner);

    f.render_widget(Paragraph::new(header_line(app)), chunks[0]);

    let help = match editor.mode() {
        EditorMode::Normal => NORMAL_HELP,
        EditorMode::Insert => INSERT_HELP,
        EditorMode::Command => COMMAND_HELP,
    };
    f.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        chunks[1],
    );

    f.render_widget(Paragraph::new(message_line(editor)), chunks[2]);

    draw_text(f, editor, chunks[3]);
}

fn header_line(app: &App) -> Line<'static> {
    let editor = &app.editor;
    let (saved_label, saved_color) = if editor.is_modified() {
        ("[MODIFIED]", Color::Yellow)
    } else {
        ("[SAVED]", Color::Green)
    };

    let mode_color = match editor.mode() {
        EditorMode::Normal => Color::Blue,
        EditorMode::Insert => Color::Green,
        EditorMode::Command => Color::Yellow,
    };

    Line::from(vec![
        Span::styled(
            saved_label,
            Style::default().fg(saved_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            format!(" {} ", editor.mode().as_str()),
            Style::default()
                .fg(Color::Black)
                .bg(mode_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            app.config_path().display().to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn message_line(editor: &ModalEditor) -> Line<'static> {
    let state = editor.state();

    if editor.mode() == EditorMode::Command {
        return Line::styled(
            editor.command_line().to_string(),
            Style::default().fg(Color::Indexed(214)),
        );
    }
    if let Some(error) = &state.last_error {
        return Line::styled(format!("Error: {}", error), Style::default().fg(Color::Red));
    }
    if let Some(notice) = &state.notice {
        return Line::styled(notice.clone(), Style::default().fg(Color::Cyan));
    }
    if !editor.pending_keys().is_empty() {
        return Line::styled(
            editor.pending_keys().to_string(),
            Style::default().fg(Color::Blue),
        );
    }
    Line::raw("")
}

fn draw_text(f: &mut Frame, editor: &ModalEditor, area: Rect) {
    let buffer = editor.buffer();
    let (cursor_line, cursor_col) = buffer.cursor();
    let height = usize::from(area.height);
    if height == 0 {
        return;
    }

    let offset = (cursor_line + 1).saturating_sub(height);
    let end = (offset + height).min(buffer.line_count());

    let gutter = Style::default().fg(Color::DarkGray);
    let lines: Vec<Line> = (offset..end)
        .map(|i| {
            let text = buffer.line(i).unwrap_or_default();
            Line::from(vec![
                Span::styled(format!("{:4} ", i + 1), gutter),
                Span::raw(expand_tabs(&text)),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), area);

    let cursor_text = buffer.line(cursor_line).unwrap_or_default();
    if let Some((x, y)) = cursor_cell(
        area,
        display_width(&cursor_text, cursor_col),
        cursor_line - offset,
    ) {
        f.set_cursor(x, y);
    }
}

/// Screen cell for a cursor `col` columns into the text and `row` rows down,
/// or `None` when it falls outside `area`.
fn cursor_cell(area: Rect, col: usize, row: usize) -> Option<(u16, u16)> {
    let x = usize::from(area.x) + usize::from(GUTTER_WIDTH) + col;
    let y = usize::from(area.y) + row;
    if x >= usize::from(area.x) + usize::from(area.width)
        || y >= usize::from(area.y) + usize::from(area.height)
    {
        return None;
    }
    Some((u16::try_from(x).ok()?, u16::try_from(y).ok()?))
}

fn expand_tabs(text: &str) -> String {
    text.replace('\t', &" ".repeat(TAB_WIDTH))
}

/// Terminal columns taken by the first `chars` characters of `text`.
fn display_width(text: &str, chars: usize) -> usize {
    text.chars()
        .take(chars)
        .map(|c| match c {
            '\t' => TAB_WIDTH,
            c => c.width().unwrap_or(0),
        })
        .sum()
}

fn title_case(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browse_layout_splits_columns() {
        let layout = BrowseLayout::new(Rect::new(0, 0, 100, 41), 30);
        assert_eq!(layout.list.x, 0);
        assert_eq!(layout.list.width, 30);
        assert_eq!(layout.preview.x, 30);
        assert_eq!(layout.preview.width, 70);
        assert_eq!(layout.status.height, 1);
        assert_eq!(layout.status.y, 40);
        assert_eq!(layout.details.y, layout.list.y + layout.list.height);
    }

    #[test]
    fn test_display_width_counts_wide_chars_and_tabs() {
        assert_eq!(display_width("abc", 2), 2);
        assert_eq!(display_width("日本", 1), 2);
        assert_eq!(display_width("\tx", 1), TAB_WIDTH);
        assert_eq!(display_width("ab", 10), 2);
    }

    #[test]
    fn test_cursor_cell_stays_inside_area() {
        let area = Rect::new(2, 3, 40, 10);
        assert_eq!(cursor_cell(area, 0, 0), Some((2 + GUTTER_WIDTH, 3)));
        assert_eq!(cursor_cell(area, 34, 9), None);
        assert_eq!(cursor_cell(area, 0, 10), None);
        assert_eq!(cursor_cell(area, 70_015, 0), None);
    }

    #[test]
    fn test_draw_editor_with_very_long_line() {
        use crate::keys::Key;
        use ratatui::{backend::TestBackend, Terminal};

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config");
        let long = format!("Host web\n  ProxyCommand {}\n", "x".repeat(70_000));
        std::fs::write(&path, &long).unwrap();

        let mut app = App::new(crate::settings::Settings::default(), path);
        app.open_editor();
        app.editor.handle_key(Key::Down);
        for _ in 0..70_015 {
            app.editor.handle_key(Key::Right);
        }
        assert_eq!(app.editor.buffer().cursor(), (1, 70_015));

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("identityfile"), "Identityfile");
        assert_eq!(title_case(""), "");
    }
}
