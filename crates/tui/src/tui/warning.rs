use ratatui::layout::Alignment;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::helpers::{accent_title, centered_rect, BG_BASE, BG_PANEL};

/// Shown instead of the todo list when no owner id is configured.
pub(crate) fn draw(f: &mut Frame<'_>) {
    let size = f.size();
    f.render_widget(Clear, size);
    f.render_widget(Block::default().style(Style::default().bg(BG_BASE)), size);

    let area = centered_rect(size.width.saturating_sub(4).min(72), 9, size);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(accent_title("⚠️ No user configured"))
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(BG_PANEL));

    let lines = warning_lines();
    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center),
        area,
    );
}

pub(crate) fn warning_lines() -> Vec<Line<'static>> {
    let hint = Style::default().fg(Color::Gray);
    vec![
        Line::default(),
        Line::from(vec![Span::styled(
            "Todos are scoped to a user id, and none is set.",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::default(),
        Line::from(vec![Span::styled(
            "Pass `--user-id <ID>` or set `TODOS_USER_ID`, then restart.",
            hint,
        )]),
        Line::from(vec![Span::styled("Press q to quit.", hint)]),
    ]
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;

    #[test]
    fn guard_view_explains_how_to_set_an_owner() {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).expect("terminal");
        terminal.draw(draw).expect("draw");
        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();

        assert!(screen.contains("none is set"));
        assert!(screen.contains("--user-id <ID>"));
        assert!(screen.contains("TODOS_USER_ID"));
        assert!(!screen.contains("items left"));
    }
}
