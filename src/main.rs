use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use couch_iptv_lib::app::{App, AsyncAction};
use couch_iptv_lib::config::AppConfig;
use couch_iptv_lib::errors::ConfigError;
use couch_iptv_lib::handlers::input::{handle_key_event, InputResult};
use couch_iptv_lib::handlers::tasks::{poll_interval, TaskRunner};
use couch_iptv_lib::player::Player;
use couch_iptv_lib::source::DataSource;
use couch_iptv_lib::{logging, setup, ui};

#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config file to use instead of the platform default
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a config template and exit
    #[arg(long)]
    init: bool,

    /// Check configuration and verify the source answers
    #[arg(long)]
    check: bool,

    /// Play this URL directly and wait for the player to close
    #[arg(short, long)]
    play: Option<String>,

    /// Log filter such as "debug" or "couch_iptv_lib=trace". Overrides RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    use clap::Parser;
    let args = Args::parse();

    if args.init {
        let path = match &args.config {
            Some(p) => p.clone(),
            None => AppConfig::default_path()?,
        };
        if path.exists() {
            bail!("{} already exists, not overwriting it", path.display());
        }
        AppConfig::template().save(&path)?;
        println!("Wrote config template to {}", path.display());
        println!("Edit the source section, then run couch-iptv again.");
        return Ok(());
    }

    let log_dir = AppConfig::data_dir().unwrap_or_else(|_| std::env::temp_dir());
    let log_path = logging::init(&log_dir, args.log_level.as_deref())
        .with_context(|| format!("could not open log file in {}", log_dir.display()))?;
    info!("Log file: {:?}", log_path);

    let config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(ConfigError::NotFound(path)) if args.play.is_some() => {
            info!("no config at {:?}, using player defaults", path);
            AppConfig::template()
        }
        Err(e @ ConfigError::NotFound(_)) => {
            return Err(e).context("run `couch-iptv --init` to create one");
        }
        Err(e) => return Err(e.into()),
    };

    // -- CLI MODE --
    if let Some(url) = args.play {
        setup::check_player(&config.player)?;
        let player = Player::new(config.player.clone());
        println!("Playing: {}", url);
        player.play(&url, "")?;
        let status = tokio::task::spawn_blocking(move || player.wait()).await??;
        if !status.success() {
            bail!("{} exited with {}", config.player.command, status);
        }
        println!("Player closed.");
        return Ok(());
    }

    if args.check {
        return check(&config).await;
    }

    // -- TUI MODE (Default) --
    if let Err(e) = setup::check_player(&config.player) {
        warn!("{}", e);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config);
    let (tx, mut rx) = mpsc::channel::<AsyncAction>(32);
    let runner = TaskRunner::new(config.clone(), Player::new(config.player.clone()), tx);

    app.start();
    let res = run_app(&mut terminal, &mut app, &runner, &mut rx).await;

    runner.player().stop();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("{:?}", err);
        println!("{:?}", err);
    }
    info!("bye");
    Ok(())
}

async fn check(config: &AppConfig) -> Result<(), anyhow::Error> {
    if let Err(e) = setup::check_player(&config.player) {
        println!("{}", e);
    }
    println!("Connecting to source...");
    let (source, info) = match DataSource::connect(config).await {
        Ok(connected) => connected,
        Err(e) => bail!("{}", e.diagnostics()),
    };
    let categories = source
        .load_categories()
        .await
        .map_err(|e| anyhow::anyhow!(e.diagnostics()))?;
    println!(
        "✓ {} source OK: {} categories.",
        info.label,
        categories.len()
    );
    if let Some(status) = &info.account_status {
        println!("  Account: {}", status);
    }
    println!("  Expires: {}", info.expires.as_deref().unwrap_or("never"));
    if let Some(connections) = &info.connections {
        println!("  Connections: {}", connections);
    }
    if let Some(timezone) = &info.timezone {
        println!("  Server timezone: {}", timezone);
    }
    if let Some(epg) = &info.epg_url {
        println!("  EPG: {}", epg);
    }
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    runner: &TaskRunner,
    rx: &mut mpsc::Receiver<AsyncAction>,
) -> anyhow::Result<()> {
    loop {
        for task in app.take_tasks() {
            runner.run(task);
        }

        terminal.draw(|f| ui::ui(f, app))?;

        // 1. Results of background work (non-blocking)
        while let Ok(action) = rx.try_recv() {
            app.handle_async_action(action);
        }
        if app.is_watching() {
            if let Some(action) = runner.poll_player_exit() {
                app.handle_async_action(action);
            }
        }

        // 2. Remote input, waking up in time for a pending search
        if event::poll(poll_interval(app.next_search_deadline()))? {
            if let Event::Key(key) = event::read()? {
                if handle_key_event(app, key, Instant::now()) == InputResult::Quit {
                    app.should_quit = true;
                }
            }
        }

        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}
