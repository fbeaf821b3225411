use crate::source::ContentKind;
use crate::ui::colors::{LIVE_BADGE, VOD_BADGE};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Span,
};

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// How many tiles of `cell_width` fit side by side in `width`
pub fn grid_columns(width: u16, cell_width: u16) -> usize {
    (width / cell_width.max(1)).max(1) as usize
}

/// First row to draw so that `focused_row` stays on screen
pub fn first_visible_row(focused_row: usize, visible_rows: usize) -> usize {
    let visible_rows = visible_rows.max(1);
    (focused_row + 1).saturating_sub(visible_rows)
}

pub fn kind_badge(kind: ContentKind) -> Span<'static> {
    let color = match kind {
        ContentKind::Live => LIVE_BADGE,
        ContentKind::Vod => VOD_BADGE,
    };
    Span::styled(
        format!(" {} ", kind.label()),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

/// Cut `text` to `max` characters, marking the cut with an ellipsis
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max - 1).collect();
    out.push('…');
    out
}
