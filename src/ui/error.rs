use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use crate::app::App;
use crate::ui::colors::{BORDER, ERROR_RED, FOCUS_BG, FOCUS_FG, TEXT_PRIMARY};
use crate::ui::utils::centered_rect;

pub fn render_error(f: &mut Frame, app: &App, area: Rect) {
    let popup = centered_rect(70, 50, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(ERROR_RED))
        .title(" Something went wrong ");
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(inner);

    let message = app
        .error
        .as_ref()
        .map(|e| e.message.as_str())
        .unwrap_or("Unknown error");
    let lines: Vec<Line> = message.lines().map(Line::from).collect();
    f.render_widget(
        Paragraph::new(lines)
            .style(Style::default().fg(TEXT_PRIMARY))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        chunks[0],
    );

    let focused = app.nav.focused_index().is_some();
    let button_style = if focused {
        Style::default()
            .bg(FOCUS_BG)
            .fg(FOCUS_FG)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_PRIMARY)
    };
    let button_area = centered_rect(30, 100, chunks[1]);
    f.render_widget(
        Paragraph::new("Retry")
            .alignment(Alignment::Center)
            .style(button_style)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(BORDER)),
            ),
        button_area,
    );
}
