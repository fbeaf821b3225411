use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use crate::app::App;
use crate::ui::colors::{ACCENT, BORDER, TEXT_PRIMARY};
use crate::ui::utils::centered_rect;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn render_loading(f: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect(50, 20, area);
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER));

    let tick = app.loading_tick;
    let msg = app.loading_message.as_deref().unwrap_or("Loading...");
    let spinner = SPINNER[(tick % SPINNER.len() as u64) as usize];

    let text = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(format!(" {} ", spinner), Style::default().fg(ACCENT)),
            Span::styled(
                msg.to_string(),
                Style::default().fg(TEXT_PRIMARY).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    f.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).block(block),
        popup_area,
    );
}
