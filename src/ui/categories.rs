use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use crate::app::App;
use crate::ui::colors::{ACCENT, BORDER, FOCUS_BG, FOCUS_FG, TEXT_DIM, TEXT_PRIMARY};
use crate::ui::utils::{first_visible_row, grid_columns, kind_badge, truncate};

/// Height of one tile including its border
const CELL_HEIGHT: u16 = 4;

/// Category tiles laid out in rows. The number of columns follows the
/// terminal width and is pushed back to the app so Left/Right line up.
pub fn render_categories(f: &mut Frame, app: &mut App, area: Rect) {
    let columns = grid_columns(area.width, app.grid_cell_width);
    app.set_grid_columns(columns);

    if app.categories.is_empty() {
        let p = Paragraph::new("No categories available")
            .alignment(Alignment::Center)
            .style(Style::default().fg(TEXT_DIM));
        f.render_widget(p, area);
        return;
    }

    let cell_width = area.width / columns as u16;
    let visible_rows = (area.height / CELL_HEIGHT).max(1) as usize;
    let focused = app.nav.focused_index();
    let focused_row = focused.unwrap_or(0) / columns;
    let first_row = first_visible_row(focused_row, visible_rows);

    for (index, category) in app
        .categories
        .iter()
        .enumerate()
        .skip(first_row * columns)
        .take(visible_rows * columns)
    {
        let row = (index / columns - first_row) as u16;
        let col = (index % columns) as u16;
        let cell = Rect {
            x: area.x + col * cell_width,
            y: area.y + row * CELL_HEIGHT,
            width: cell_width,
            height: CELL_HEIGHT,
        }
        .intersection(area);

        let is_focused = focused == Some(index);
        let (border, name_style) = if is_focused {
            (
                Style::default().fg(ACCENT),
                Style::default()
                    .bg(FOCUS_BG)
                    .fg(FOCUS_FG)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            (Style::default().fg(BORDER), Style::default().fg(TEXT_PRIMARY))
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(if is_focused {
                BorderType::Thick
            } else {
                BorderType::Rounded
            })
            .border_style(border);

        let name_width = cell.width.saturating_sub(2) as usize;
        let text = vec![
            Line::from(Span::styled(truncate(&category.name, name_width), name_style)),
            Line::from(kind_badge(category.kind)),
        ];
        f.render_widget(
            Paragraph::new(text).alignment(Alignment::Center).block(block),
            cell,
        );
    }
}
