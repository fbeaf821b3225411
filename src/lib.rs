pub mod api;
pub mod app;
pub mod config;
pub mod debounce;
pub mod errors;
pub mod flex_id;
pub mod handlers;
pub mod logging;
pub mod m3u;
pub mod nav;
pub mod player;
pub mod setup;
pub mod source;
pub mod ui;

#[cfg(test)]
mod tests {
    use crate::app::{App, Screen};
    use crate::config::AppConfig;

    #[test]
    fn test_app_new() {
        let app = App::new(&AppConfig::template());
        assert_eq!(app.screen, Screen::Loading);
        assert!(app.nav.items().is_empty());
    }
}
