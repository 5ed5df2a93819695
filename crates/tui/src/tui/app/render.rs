use std::cmp::min;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};
use ratatui::Frame;

use crate::model::{items_left, TodoRow};
use crate::remote::TodoStore;
use crate::tui::constants::APP_VERSION;
use crate::tui::filters::{empty_heading, filter_tabs};
use crate::tui::helpers::{
    accent_title, bottom_rect, build_help_lines, centered_rect, inset_rect, spinner_frame,
    BG_ACCENT, BG_BASE, BG_ERROR, BG_PANEL,
};

use super::{App, InputMode};

impl<S: TodoStore> App<S> {
    pub(crate) fn draw(&mut self, f: &mut Frame<'_>) {
        self.drain_notices();

        let size = f.size();
        f.render_widget(Clear, size);
        f.render_widget(Block::default().style(Style::default().bg(BG_BASE)), size);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(2),
            ])
            .split(size);

        self.draw_header(f, chunks[0]);
        self.draw_tabs(f, chunks[1]);
        self.draw_body(f, chunks[2]);
        self.draw_footer(f, chunks[3]);

        match self.input_mode {
            InputMode::Add => self.draw_input_overlay(f, size),
            InputMode::Help => self.draw_help_overlay(f, size),
            InputMode::Normal => {}
        }

        self.draw_error_toast(f, size);
    }

    fn draw_header(&self, f: &mut Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(area);

        let left_line = Line::from(vec![
            Span::styled(
                format!(" todos v{} ", APP_VERSION),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("· user {}", self.config.user_id())),
            Span::raw("  "),
            Span::styled(
                format!("🌐 {}", self.config.api_url()),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        f.render_widget(
            Paragraph::new(left_line).style(Style::default().bg(BG_BASE)),
            cols[0],
        );

        let right_line = if self.view.is_loading() {
            Line::from(vec![Span::styled(
                format!("{} syncing", spinner_frame(self.spinner_tick)),
                Style::default().fg(Color::Yellow),
            )])
        } else {
            Line::from(vec![Span::styled(
                "● synced",
                Style::default().fg(Color::DarkGray),
            )])
        };
        f.render_widget(
            Paragraph::new(right_line)
                .alignment(Alignment::Right)
                .style(Style::default().bg(BG_BASE)),
            cols[1],
        );
    }

    fn draw_tabs(&self, f: &mut Frame<'_>, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("Filter"))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));

        // Filters only make sense once there is something to filter.
        if self.view.todos().is_empty() {
            f.render_widget(block, area);
            return;
        }

        let titles: Vec<Line> = filter_tabs(self.view.todos())
            .iter()
            .map(|tab| Line::from(tab.title()))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.view.filter().index())
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Green)
                    .bg(BG_ACCENT)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(tabs, area);
    }

    fn draw_body(&mut self, f: &mut Frame<'_>, area: Rect) {
        if !self.view.is_loaded() {
            self.draw_message(f, area, vec![self.loading_line()]);
            return;
        }

        let rows = self.rows();
        if rows.is_empty() {
            let lines = self.empty_state(empty_heading(self.view.filter()));
            self.draw_message(f, area, lines);
            return;
        }

        let header = Row::new(vec![
            Cell::from(" "),
            Cell::from("#️⃣ ID"),
            Cell::from("📝 Title"),
            Cell::from(""),
        ])
        .style(Style::default().add_modifier(Modifier::BOLD));

        let spinner = spinner_frame(self.spinner_tick);
        let table_rows: Vec<Row> = rows
            .iter()
            .map(|row| self.table_row(row, spinner))
            .collect();

        let widths = [
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Min(20),
            Constraint::Length(12),
        ];

        let table = Table::new(table_rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .style(Style::default().bg(BG_PANEL)),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .bg(BG_ACCENT)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        f.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn table_row(&self, row: &TodoRow<'_>, spinner: &'static str) -> Row<'static> {
        let check = if row.completed() { "✔" } else { "○" };
        let title_style = if row.completed() {
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT)
        } else {
            Style::default()
        };

        match row {
            TodoRow::Committed(todo) => {
                let busy = self.view.is_deleting(todo.id);
                let state = if busy {
                    format!("{spinner} deleting")
                } else {
                    String::new()
                };
                let style = if busy {
                    Style::default().add_modifier(Modifier::DIM)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(check),
                    Cell::from(todo.id.to_string()),
                    Cell::from(todo.title.clone()).style(title_style),
                    Cell::from(state).style(Style::default().fg(Color::Yellow)),
                ])
                .style(style)
            }
            TodoRow::Pending(draft) => Row::new(vec![
                Cell::from(check),
                Cell::from("…"),
                Cell::from(draft.title.clone()).style(title_style.add_modifier(Modifier::ITALIC)),
                Cell::from(format!("{spinner} saving")).style(Style::default().fg(Color::Yellow)),
            ])
            .style(Style::default().add_modifier(Modifier::DIM)),
        }
    }

    fn draw_message(&self, f: &mut Frame<'_>, area: Rect, lines: Vec<Line<'static>>) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(area);
        f.render_widget(Clear, area);
        f.render_widget(block, area);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let width = inner.width.min(80).max(1);
        let mut height = (lines.len() as u16).saturating_add(2).min(inner.height);
        if height < 3 && inner.height >= 3 {
            height = 3;
        }
        let content_area = centered_rect(width, height, inner);
        f.render_widget(Clear, content_area);

        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center)
            .style(Style::default().bg(BG_PANEL));
        f.render_widget(paragraph, content_area);
    }

    fn loading_line(&self) -> Line<'static> {
        Line::from(vec![Span::styled(
            format!("{} Loading todos…", spinner_frame(self.spinner_tick)),
            Style::default().fg(Color::Yellow),
        )])
    }

    fn empty_state(&self, heading: &'static str) -> Vec<Line<'static>> {
        let hint_style = Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Line::from(vec![Span::styled(
                heading,
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )]),
            Line::default(),
            Line::from(vec![Span::styled("Press 'a' to add a todo.", hint_style)]),
        ];
        if !self.view.todos().is_empty() {
            lines.push(Line::from(vec![Span::styled(
                "Press Tab to switch filters.",
                hint_style,
            )]));
        }
        lines
    }

    fn draw_footer(&self, f: &mut Frame<'_>, area: Rect) {
        let lines = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        let mut spans = Vec::new();
        if !self.view.todos().is_empty() {
            spans.push(Span::styled(
                items_left(self.view.active_count()),
                Style::default().fg(Color::Green),
            ));
            spans.push(Span::raw("  "));
        }
        match &self.status {
            Some(status) => spans.push(Span::styled(status.text.clone(), status.style())),
            None if spans.is_empty() => spans.push(Span::raw("Ready")),
            None => {}
        }
        f.render_widget(Paragraph::new(Line::from(spans)), lines[0]);

        let help = match self.input_mode {
            InputMode::Normal => {
                let mut help = String::from(
                    "filters: tab/shift+tab or 1-3 | j/k move | a add ✚ | x delete 🗑️ | r reload 🔄 | h help ❔ | q quit",
                );
                if self.view.has_completed() {
                    help.push_str(" | c clear completed 🧹");
                }
                help
            }
            InputMode::Add => String::from("Enter to add ✍️ • Esc to close"),
            InputMode::Help => String::from("Enter/Esc to close ❔"),
        };
        let help_line = Line::from(vec![Span::styled(
            help,
            Style::default().fg(Color::DarkGray),
        )]);
        f.render_widget(Paragraph::new(help_line), lines[1]);
    }

    fn draw_input_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let width = min(area.width.saturating_sub(10), 80);
        let popup_area = centered_rect(width, 4, area);
        f.render_widget(Clear, popup_area);

        let title = if self.submitting {
            format!("{} Saving…", spinner_frame(self.spinner_tick))
        } else {
            String::from("➕ What needs to be done?")
        };
        let input_block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title(&title))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));
        let input_area = input_block.inner(popup_area);
        f.render_widget(input_block, popup_area);

        let text_style = if self.submitting {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        f.render_widget(
            Paragraph::new(self.input.as_str())
                .style(text_style.bg(BG_PANEL))
                .wrap(Wrap { trim: false }),
            input_area,
        );

        if !self.submitting && input_area.width > 0 {
            let column = (self.input.cursor_column() as u16).min(input_area.width - 1);
            f.set_cursor(input_area.x + column, input_area.y);
        }
    }

    fn draw_help_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let lines = build_help_lines();
        let width = min(area.width.saturating_sub(10), 70);
        let height = min(lines.len() as u16 + 4, area.height.saturating_sub(2)).max(8);
        let popup_area = centered_rect(width, height, area);
        f.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("⌨️ Keyboard Reference"))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        if inner.width < 3 || inner.height < 3 {
            return;
        }

        let help_rows: Vec<Row> = lines
            .into_iter()
            .map(|(combo, desc)| {
                Row::new(vec![
                    Cell::from(combo).style(Style::default().fg(Color::Cyan)),
                    Cell::from(desc),
                ])
            })
            .collect();
        let table = Table::new(help_rows, [Constraint::Length(18), Constraint::Min(10)])
            .block(Block::default().style(Style::default().bg(BG_PANEL)))
            .column_spacing(2);
        f.render_widget(table, inset_rect(inner, 1));
    }

    fn draw_error_toast(&self, f: &mut Frame<'_>, area: Rect) {
        let Some(message) = self.view.error() else {
            return;
        };
        let width = min(area.width.saturating_sub(6), 60);
        let toast_area = bottom_rect(width, 3, area);
        f.render_widget(Clear, toast_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .style(Style::default().bg(BG_ERROR));
        let line = Line::from(vec![
            Span::styled(
                format!("⚠️  {message}"),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  (Esc to dismiss)", Style::default().fg(Color::Gray)),
        ]);
        f.render_widget(
            Paragraph::new(line)
                .block(block)
                .alignment(Alignment::Center),
            toast_area,
        );
    }
}
