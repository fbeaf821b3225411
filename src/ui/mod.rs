pub mod colors;
pub mod utils;
pub mod header;
pub mod footer;
pub mod loading;
pub mod categories;
pub mod channels;
pub mod search;
pub mod player;
pub mod error;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::app::{App, Screen};

pub fn ui(f: &mut Frame, app: &mut App) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Footer
        ])
        .split(area);

    header::render_header(f, app, chunks[0]);
    footer::render_footer(f, app, chunks[2]);

    let content = chunks[1];
    match app.screen {
        Screen::Loading => loading::render_loading(f, app, content),
        Screen::Categories => categories::render_categories(f, app, content),
        Screen::Channels => {
            let title = app
                .current_category
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "Channels".to_string());
            channels::render_channel_list(
                f,
                content,
                &title,
                &app.channels,
                app.nav.focused_index(),
            );
            if app.loading_message.is_some() {
                loading::render_loading(f, app, content);
            }
        }
        Screen::Search => search::render_search(f, app, content),
        Screen::Player => player::render_player(f, app, content),
        Screen::Error => error::render_error(f, app, content),
    }
}
