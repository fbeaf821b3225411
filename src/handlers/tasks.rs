use crate::app::{AsyncAction, LoadStage, Task};
use crate::config::AppConfig;
use crate::player::Player;
use crate::source::DataSource;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Runs the coordinator's tasks on the tokio runtime and reports back over
/// the action channel. Owns the connected source and the player.
pub struct TaskRunner {
    config: Arc<AppConfig>,
    source: Arc<Mutex<Option<DataSource>>>,
    player: Player,
    tx: mpsc::Sender<AsyncAction>,
}

impl TaskRunner {
    pub fn new(config: AppConfig, player: Player, tx: mpsc::Sender<AsyncAction>) -> Self {
        Self {
            config: Arc::new(config),
            source: Arc::new(Mutex::new(None)),
            player,
            tx,
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    fn current_source(&self) -> Option<DataSource> {
        self.source.lock().ok().and_then(|guard| guard.clone())
    }

    fn send(&self, action: AsyncAction) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(action).await;
        });
    }

    /// Player start and stop run inline so they keep the order they were
    /// requested in. Everything else is spawned.
    pub fn run(&self, task: Task) {
        debug!(task = task_name(&task), "running task");
        match task {
            Task::Connect => self.connect(),
            Task::LoadChannels { ticket, category } => {
                let Some(source) = self.current_source() else {
                    return self.not_connected(LoadStage::Channels, ticket);
                };
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let action = match source.load_channels(&category).await {
                        Ok(channels) => {
                            info!(category = %category.name, count = channels.len(), "channels loaded");
                            AsyncAction::ChannelsLoaded { ticket, channels }
                        }
                        Err(e) => {
                            error!(category = %category.name, "channel load failed: {}", e);
                            AsyncAction::LoadFailed {
                                stage: LoadStage::Channels,
                                ticket: Some(ticket),
                                message: e.diagnostics(),
                            }
                        }
                    };
                    let _ = tx.send(action).await;
                });
            }
            Task::Search { ticket, query } => {
                let Some(source) = self.current_source() else {
                    return self.not_connected(LoadStage::Search, ticket);
                };
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let action = match source.search(&query).await {
                        Ok(results) => {
                            debug!(%query, count = results.len(), "search finished");
                            AsyncAction::SearchResults {
                                ticket,
                                query,
                                results,
                            }
                        }
                        Err(e) => {
                            warn!(%query, "search failed: {}", e);
                            AsyncAction::LoadFailed {
                                stage: LoadStage::Search,
                                ticket: Some(ticket),
                                message: e.to_string(),
                            }
                        }
                    };
                    let _ = tx.send(action).await;
                });
            }
            Task::Play { ticket, url, title } => self.play(ticket, &url, &title),
            Task::StopPlayback => self.player.stop(),
        }
    }

    fn not_connected(&self, stage: LoadStage, ticket: u64) {
        warn!(?stage, "no source connected");
        self.send(AsyncAction::LoadFailed {
            stage,
            ticket: Some(ticket),
            message: "Not connected to a source".to_string(),
        });
    }

    fn connect(&self) {
        let config = Arc::clone(&self.config);
        let slot = Arc::clone(&self.source);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let failed = |e: crate::errors::IptvError| {
                error!(stage = %e.stage(), "source unavailable: {}", e);
                AsyncAction::LoadFailed {
                    stage: LoadStage::Connect,
                    ticket: None,
                    message: e.diagnostics(),
                }
            };

            let (source, info) = match DataSource::connect(&config).await {
                Ok(connected) => connected,
                Err(e) => {
                    let _ = tx.send(failed(e)).await;
                    return;
                }
            };
            store_source(&slot, source.clone());
            let _ = tx
                .send(AsyncAction::Connected(info))
                .await;

            let action = match source.load_categories().await {
                Ok(categories) => AsyncAction::CategoriesLoaded(categories),
                Err(e) => failed(e),
            };
            let _ = tx.send(action).await;
        });
    }

    fn play(&self, ticket: u64, url: &str, title: &str) {
        if let Err(e) = self.player.play(url, title) {
            error!("playback failed: {}", e);
            return self.send(AsyncAction::PlayerFailed {
                ticket,
                reason: e.to_string(),
            });
        }

        let player = self.player.clone();
        let timeout = self.config.playback_timeout();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let action = match player.wait_for_playback(timeout).await {
                Ok(true) => AsyncAction::PlayerStarted { ticket },
                Ok(false) => AsyncAction::PlayerFailed {
                    ticket,
                    reason: crate::errors::PlaybackError::ExitedEarly.to_string(),
                },
                Err(e) => AsyncAction::PlayerFailed {
                    ticket,
                    reason: e.to_string(),
                },
            };
            let _ = tx.send(action).await;
        });
    }

    /// Report a player that was closed from its own window
    pub fn poll_player_exit(&self) -> Option<AsyncAction> {
        let status = self.player.take_exit_status()?;
        Some(AsyncAction::PlayerExited {
            success: status.success(),
        })
    }
}

fn store_source(slot: &Mutex<Option<DataSource>>, source: DataSource) {
    match slot.lock() {
        Ok(mut guard) => *guard = Some(source),
        Err(e) => error!("source slot poisoned: {}", e),
    }
}

// Play URLs embed credentials, so tasks are logged by name only
fn task_name(task: &Task) -> &'static str {
    match task {
        Task::Connect => "connect",
        Task::LoadChannels { .. } => "load_channels",
        Task::Search { .. } => "search",
        Task::Play { .. } => "play",
        Task::StopPlayback => "stop_playback",
    }
}

/// Upper bound for one pass of the event loop
pub fn poll_interval(next_deadline: Option<std::time::Instant>) -> Duration {
    const IDLE: Duration = Duration::from_millis(250);
    match next_deadline {
        Some(deadline) => deadline
            .saturating_duration_since(std::time::Instant::now())
            .min(IDLE),
        None => IDLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlayerConfig, SourceConfig};
    use crate::source::{CategoryEntry, ContentKind};

    fn runner() -> (TaskRunner, mpsc::Receiver<AsyncAction>) {
        let (tx, rx) = mpsc::channel(8);
        let config = AppConfig::with_source(SourceConfig::M3u {
            url: "http://127.0.0.1:9/tv.m3u".to_string(),
        });
        let player = Player::new(PlayerConfig {
            command: "couch-iptv-no-such-player".to_string(),
            ..PlayerConfig::default()
        });
        (TaskRunner::new(config, player, tx), rx)
    }

    #[tokio::test]
    async fn test_channels_without_source_fail() {
        let (runner, mut rx) = runner();
        runner.run(Task::LoadChannels {
            ticket: 7,
            category: CategoryEntry {
                id: "News".to_string(),
                name: "News".to_string(),
                kind: ContentKind::Live,
            },
        });
        match rx.recv().await {
            Some(AsyncAction::LoadFailed { stage, ticket, .. }) => {
                assert_eq!(stage, LoadStage::Channels);
                assert_eq!(ticket, Some(7));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_player_reports_failure() {
        let (runner, mut rx) = runner();
        runner.run(Task::Play {
            ticket: 3,
            url: "http://cdn/a.m3u8".to_string(),
            title: "A".to_string(),
        });
        match rx.recv().await {
            Some(AsyncAction::PlayerFailed { ticket, reason }) => {
                assert_eq!(ticket, 3);
                assert!(reason.contains("couch-iptv-no-such-player"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(runner.poll_player_exit().is_none());
    }

    #[test]
    fn test_poll_interval_bounds() {
        assert_eq!(poll_interval(None), Duration::from_millis(250));
        let soon = std::time::Instant::now() + Duration::from_millis(40);
        assert!(poll_interval(Some(soon)) <= Duration::from_millis(40));
        let past = std::time::Instant::now() - Duration::from_millis(40);
        assert_eq!(poll_interval(Some(past)), Duration::ZERO);
    }
}
