use crate::config::PlayerConfig;
use crate::errors::PlaybackError;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// How long the player must stay alive before playback counts as started
const CONFIRM_AFTER: Duration = Duration::from_millis(2000);

/// Handle to the external media player. Clones share the same process.
#[derive(Clone)]
pub struct Player {
    config: PlayerConfig,
    process: Arc<Mutex<Option<Child>>>,
}

impl Player {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config,
            process: Arc::new(Mutex::new(None)),
        }
    }

    fn args(&self, url: &str, title: &str) -> Vec<String> {
        let mut args = vec![
            url.to_string(),
            "--force-window".to_string(),
            "--cache=yes".to_string(),
            "--demuxer-max-bytes=128MiB".to_string(),
            "--msg-level=all=no".to_string(),
            "--hwdec=auto".to_string(),
        ];
        if self.config.fullscreen {
            args.push("--fs".to_string());
        }
        if !title.is_empty() {
            args.push(format!("--force-media-title={}", title));
        }
        args.extend(self.config.args.iter().cloned());
        args
    }

    /// Start playing `url`, replacing whatever was playing before
    pub fn play(&self, url: &str, title: &str) -> Result<(), PlaybackError> {
        if url.trim().is_empty() {
            return Err(PlaybackError::MissingUrl);
        }
        self.stop();

        let child = Command::new(&self.config.command)
            .args(self.args(url, title))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PlaybackError::Spawn {
                command: self.config.command.clone(),
                reason: e.to_string(),
            })?;

        info!(pid = child.id(), title, "player started");
        let mut guard = self
            .process
            .lock()
            .map_err(|e| PlaybackError::State(e.to_string()))?;
        *guard = Some(child);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        match self.process.lock() {
            Ok(mut guard) => match guard.as_mut() {
                Some(child) => matches!(child.try_wait(), Ok(None)),
                None => false,
            },
            Err(_) => false,
        }
    }

    /// Exit status of a player that has quit on its own. The process handle
    /// is released, so each exit is reported once.
    pub fn take_exit_status(&self) -> Option<ExitStatus> {
        let mut guard = self.process.lock().ok()?;
        let status = guard.as_mut()?.try_wait().ok()??;
        guard.take();
        debug!(?status, "player exited");
        Some(status)
    }

    /// Block until the player quits and release its handle
    pub fn wait(&self) -> Result<ExitStatus, PlaybackError> {
        let child = self
            .process
            .lock()
            .map_err(|e| PlaybackError::State(e.to_string()))?
            .take();
        let mut child =
            child.ok_or_else(|| PlaybackError::State("no player running".to_string()))?;
        let status = child
            .wait()
            .map_err(|e| PlaybackError::State(e.to_string()))?;
        info!(?status, "player exited");
        Ok(status)
    }

    /// Poll until the player has survived long enough to count as playing.
    /// `Ok(false)` when it died first.
    pub async fn wait_for_playback(&self, timeout: Duration) -> Result<bool, PlaybackError> {
        use tokio::time::{sleep, Instant};

        let start = Instant::now();
        sleep(Duration::from_millis(500)).await;

        while start.elapsed() < timeout {
            if !self.is_running() {
                return Ok(false);
            }
            if start.elapsed() > CONFIRM_AFTER {
                return Ok(true);
            }
            sleep(Duration::from_millis(200)).await;
        }
        Ok(self.is_running())
    }

    pub fn stop(&self) {
        match self.process.lock() {
            Ok(mut guard) => {
                if let Some(mut child) = guard.take() {
                    let _ = child.kill();
                    let _ = child.wait();
                    debug!("player stopped");
                }
            }
            Err(e) => warn!("player state poisoned: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_carry_title_and_extras() {
        let player = Player::new(PlayerConfig {
            command: "mpv".to_string(),
            args: vec!["--volume=50".to_string()],
            fullscreen: false,
        });
        let args = player.args("http://cdn/a.m3u8", "News HD");
        assert_eq!(args[0], "http://cdn/a.m3u8");
        assert!(args.contains(&"--force-media-title=News HD".to_string()));
        assert!(!args.contains(&"--fs".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("--volume=50"));
    }

    #[test]
    fn test_missing_url_and_missing_binary() {
        let player = Player::new(PlayerConfig {
            command: "couch-iptv-no-such-player".to_string(),
            ..PlayerConfig::default()
        });
        assert_eq!(player.play("  ", "x"), Err(PlaybackError::MissingUrl));
        assert!(matches!(
            player.play("http://cdn/a.m3u8", "x"),
            Err(PlaybackError::Spawn { .. })
        ));
        assert!(!player.is_running());
        assert!(player.take_exit_status().is_none());
        assert!(matches!(player.wait(), Err(PlaybackError::State(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_wait_reports_exit_status() {
        let player = |command: &str| {
            Player::new(PlayerConfig {
                command: command.to_string(),
                args: Vec::new(),
                fullscreen: false,
            })
        };

        let ok = player("true");
        ok.play("http://cdn/a.m3u8", "").unwrap();
        assert!(ok.wait().unwrap().success());
        assert!(!ok.is_running());

        let failing = player("false");
        failing.play("http://cdn/a.m3u8", "").unwrap();
        assert!(!failing.wait().unwrap().success());
    }
}
