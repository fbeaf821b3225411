use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use chrono::Local;
use crate::app::{App, Screen};
use crate::ui::colors::{ACCENT, BORDER, TEXT_DIM, TEXT_PRIMARY};

fn breadcrumb(app: &App) -> String {
    match app.screen {
        Screen::Loading => "Connecting".to_string(),
        Screen::Categories => "Categories".to_string(),
        Screen::Channels => match &app.current_category {
            Some(c) => format!("Categories / {}", c.name),
            None => "Channels".to_string(),
        },
        Screen::Search => "Search".to_string(),
        Screen::Player => match &app.now_playing {
            Some(c) => format!("Now playing / {}", c.name),
            None => "Player".to_string(),
        },
        Screen::Error => "Error".to_string(),
    }
}

pub fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(48)])
        .split(area);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(BORDER));

    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            " COUCH IPTV ",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ▸ ", Style::default().fg(TEXT_DIM)),
        Span::styled(breadcrumb(app), Style::default().fg(TEXT_PRIMARY)),
    ]))
    .block(block.clone());
    f.render_widget(title, chunks[0]);

    let source = app
        .source_info
        .as_ref()
        .map(|info| info.summary())
        .unwrap_or_else(|| "-".to_string());
    let clock = Local::now().format("%H:%M").to_string();
    let stats = Paragraph::new(format!("{} | {} ", source, clock))
        .alignment(Alignment::Right)
        .style(Style::default().fg(TEXT_DIM))
        .block(block);
    f.render_widget(stats, chunks[1]);
}
