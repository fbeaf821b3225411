use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use crate::app::App;
use crate::ui::channels::render_channel_list;
use crate::ui::colors::{ACCENT, BORDER, ERROR_RED, TEXT_DIM, TEXT_PRIMARY};

pub fn render_search(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let field_focused = app.nav.is_search_field_focused();
    let inner_width = chunks[0].width.saturating_sub(2) as usize;
    let scroll = app.search_input.visual_scroll(inner_width);
    let input = Paragraph::new(app.search_input.value())
        .style(Style::default().fg(TEXT_PRIMARY))
        .scroll((0, scroll as u16))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(if field_focused { ACCENT } else { BORDER }))
                .title(" Search channels "),
        );
    f.render_widget(input, chunks[0]);

    if field_focused {
        let cursor = app.search_input.visual_cursor().saturating_sub(scroll) as u16;
        f.set_cursor_position((chunks[0].x + 1 + cursor, chunks[0].y + 1));
    }

    let typed = app.search_input.value().trim().chars().count();
    let message = if let Some(err) = &app.search_error {
        Some((format!("Search failed: {}", err), ERROR_RED))
    } else if app.loading_message.is_some() && app.search_results.is_empty() {
        app.loading_message.clone().map(|m| (m, TEXT_DIM))
    } else if typed < app.min_search_len {
        Some((
            format!("Type at least {} characters", app.min_search_len),
            TEXT_DIM,
        ))
    } else if app.search_results.is_empty() {
        app.shown_query
            .as_ref()
            .map(|q| (format!("No results for \"{}\"", q), TEXT_DIM))
    } else {
        None
    };

    match message {
        Some((text, color)) => {
            let p = Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(Style::default().fg(color))
                .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(BORDER)));
            f.render_widget(p, chunks[1]);
        }
        None => {
            let title = match &app.shown_query {
                Some(q) => format!("Results for \"{}\"", q),
                None => "Results".to_string(),
            };
            render_channel_list(
                f,
                chunks[1],
                &title,
                &app.search_results,
                app.nav.focused_index(),
            );
        }
    }
}
