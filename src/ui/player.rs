use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use crate::app::App;
use crate::ui::colors::{ACCENT, BORDER, OK_GREEN, TEXT_DIM, TEXT_PRIMARY};
use crate::ui::utils::{centered_rect, kind_badge};

pub fn render_player(f: &mut Frame, app: &App, area: Rect) {
    let popup = centered_rect(70, 50, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER))
        .title(" Now playing ");

    let Some(channel) = &app.now_playing else {
        f.render_widget(Paragraph::new("Nothing is playing").block(block), popup);
        return;
    };

    let status = if app.playback_confirmed {
        Span::styled("● Playing in external player", Style::default().fg(OK_GREEN))
    } else {
        Span::styled(
            app.loading_message.as_deref().unwrap_or("Starting...").to_string(),
            Style::default().fg(ACCENT),
        )
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            kind_badge(channel.kind),
            Span::styled(
                channel.name.clone(),
                Style::default().fg(TEXT_PRIMARY).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];
    if let Some(group) = &channel.group_name {
        lines.push(Line::from(Span::styled(group.clone(), Style::default().fg(TEXT_DIM))));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(status));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press Back to stop and return",
        Style::default().fg(TEXT_DIM),
    )));

    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block),
        popup,
    );
}
