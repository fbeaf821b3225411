use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState},
    Frame,
};
use crate::source::Channel;
use crate::ui::colors::{ACCENT, BORDER, FOCUS_BG, FOCUS_FG, TEXT_DIM, TEXT_PRIMARY};
use crate::ui::utils::kind_badge;

/// Channel rows with the remote's focus highlighted
pub fn render_channel_list(
    f: &mut Frame,
    area: Rect,
    title: &str,
    channels: &[Channel],
    focused: Option<usize>,
) {
    let items: Vec<ListItem> = channels
        .iter()
        .map(|c| {
            let mut spans = vec![
                kind_badge(c.kind),
                Span::styled(c.name.clone(), Style::default().fg(TEXT_PRIMARY)),
            ];
            if let Some(group) = &c.group_name {
                spans.push(Span::styled(
                    format!("  {}", group),
                    Style::default().fg(TEXT_DIM),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let border_color = if focused.is_some() { ACCENT } else { BORDER };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(border_color))
                .title(format!(" {} ({}) ", title, channels.len())),
        )
        .highlight_style(
            Style::default()
                .bg(FOCUS_BG)
                .fg(FOCUS_FG)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut state = ListState::default().with_selected(focused);
    f.render_stateful_widget(list, area, &mut state);
}
