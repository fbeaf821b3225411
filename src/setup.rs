use crate::config::PlayerConfig;
use crate::errors::PlaybackError;
use std::io::{self, Write};
use std::process::Command;

fn player_installed(command: &str) -> bool {
    Command::new(command)
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Make sure the configured player can be launched before the TUI starts
pub fn check_player(config: &PlayerConfig) -> Result<(), PlaybackError> {
    print!("Checking player... ");
    let _ = io::stdout().flush();

    if player_installed(&config.command) {
        println!("✓ {} found.", config.command);
        return Ok(());
    }

    println!("x {} NOT found.", config.command);
    if config.command == "mpv" {
        println!("Please install mpv (e.g. 'brew install mpv', 'sudo apt install mpv' or 'winget install mpv').");
    }
    Err(PlaybackError::Spawn {
        command: config.command.clone(),
        reason: "not found".to_string(),
    })
}
