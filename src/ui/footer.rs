use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use crate::app::{App, Screen};
use crate::ui::colors::{ACCENT, TEXT_PRIMARY};

fn hints(app: &App) -> Vec<(&'static str, &'static str)> {
    let typing = app.screen == Screen::Search && app.nav.is_search_field_focused();
    if typing {
        return vec![
            ("type", "Search"),
            ("↓/Enter", "Results"),
            ("Esc", "Back"),
        ];
    }
    match app.screen {
        Screen::Categories => vec![
            ("←↑↓→", "Move"),
            ("Enter", "Open"),
            ("/", "Search"),
            ("q", "Quit"),
        ],
        Screen::Channels | Screen::Search => vec![
            ("↑↓", "Move"),
            ("Enter", "Play"),
            ("Esc/Bksp", "Back"),
            ("q", "Quit"),
        ],
        Screen::Player => vec![("Esc/Bksp", "Stop"), ("q", "Quit")],
        Screen::Error => vec![("Enter", "Retry"), ("Esc", "Back"), ("q", "Quit")],
        Screen::Loading => vec![("q", "Quit")],
    }
}

pub fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let key_style = Style::default().fg(ACCENT).add_modifier(Modifier::BOLD);
    let label_style = Style::default().fg(TEXT_PRIMARY);

    let spans: Vec<Span> = hints(app)
        .into_iter()
        .flat_map(|(key, label)| {
            [
                Span::styled(format!(" {} ", key), key_style),
                Span::styled(format!("{}  ", label), label_style),
            ]
        })
        .collect();

    f.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Left),
        area,
    );
}
