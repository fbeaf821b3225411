use ratatui::style::Color;

// Living-room palette, readable from across the room
pub const ACCENT: Color = Color::Rgb(0, 200, 255);
pub const FOCUS_BG: Color = Color::Rgb(0, 120, 215);
pub const FOCUS_FG: Color = Color::White;
pub const BORDER: Color = Color::Rgb(70, 80, 95);
pub const TEXT_PRIMARY: Color = Color::Rgb(235, 235, 235);
pub const TEXT_DIM: Color = Color::Rgb(140, 145, 155);
pub const LIVE_BADGE: Color = Color::Rgb(255, 80, 80);
pub const VOD_BADGE: Color = Color::Rgb(255, 200, 80);
pub const ERROR_RED: Color = Color::Rgb(255, 95, 95);
pub const OK_GREEN: Color = Color::Rgb(80, 220, 120);
