use crate::config::AppConfig;
use crate::debounce::Debouncer;
use crate::nav::{Activation, FocusableItem, Layout, NavEvent, NavigationEngine, RemoteCommand};
use crate::source::{CategoryEntry, Channel, SourceInfo};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use tui_input::{Input, InputRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Categories,
    Channels,
    Search,
    Player,
    Error,
}

/// What a focusable entry points back to. Positions are checked together
/// with ids so a key from a replaced list never resolves.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKey {
    Category { index: usize, id: String },
    Channel { index: usize, id: String },
    Retry,
}

/// Outcome of activating an item through the screen's selection callback
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    OpenCategory(CategoryEntry),
    Play(Channel),
}

pub type Navigation = NavigationEngine<Screen, ItemKey, Intent>;

/// Side effects requested by the coordinator, run by the task runner
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// Authenticate or download the playlist, then load categories
    Connect,
    LoadChannels { ticket: u64, category: CategoryEntry },
    Search { ticket: u64, query: String },
    Play { ticket: u64, url: String, title: String },
    StopPlayback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Connect,
    Channels,
    Search,
}

/// Results reported back by the task runner
#[derive(Debug, Clone)]
pub enum AsyncAction {
    Connected(SourceInfo),
    CategoriesLoaded(Vec<CategoryEntry>),
    ChannelsLoaded { ticket: u64, channels: Vec<Channel> },
    SearchResults { ticket: u64, query: String, results: Vec<Channel> },
    LoadFailed { stage: LoadStage, ticket: Option<u64>, message: String },
    PlayerStarted { ticket: u64 },
    PlayerFailed { ticket: u64, reason: String },
    PlayerExited { success: bool },
}

/// What the Retry button on the error screen does
#[derive(Debug, Clone, PartialEq)]
pub enum RetryAction {
    Reconnect,
    ReloadChannels(CategoryEntry),
    Replay(Channel),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorState {
    pub message: String,
    pub retry: RetryAction,
    /// Screen Back returns to; `None` when there is nothing to go back to
    pub back_to: Option<Screen>,
}

pub struct App {
    pub screen: Screen,
    pub nav: Navigation,
    pub should_quit: bool,
    pub source_info: Option<SourceInfo>,

    pub categories: Arc<Vec<CategoryEntry>>,
    pub current_category: Option<CategoryEntry>,
    pub channels: Arc<Vec<Channel>>,

    pub search_input: Input,
    pub search_results: Arc<Vec<Channel>>,
    /// Query whose results are on screen
    pub shown_query: Option<String>,
    pub search_error: Option<String>,
    debouncer: Debouncer,

    pub now_playing: Option<Channel>,
    pub playback_confirmed: bool,
    pub error: Option<ErrorState>,
    pub loading_message: Option<String>,
    pub loading_tick: u64,

    pub grid_columns: usize,
    pub grid_cell_width: u16,
    pub min_search_len: usize,

    next_ticket: u64,
    pending_channels: Option<u64>,
    pending_search: Option<u64>,
    pending_play: Option<u64>,
    tasks: Vec<Task>,
}

impl App {
    pub fn new(config: &AppConfig) -> App {
        App {
            screen: Screen::Loading,
            nav: Navigation::new(),
            should_quit: false,
            source_info: None,

            categories: Arc::new(Vec::new()),
            current_category: None,
            channels: Arc::new(Vec::new()),

            search_input: Input::default(),
            search_results: Arc::new(Vec::new()),
            shown_query: None,
            search_error: None,
            debouncer: Debouncer::new(config.search_debounce(), config.min_search_len),

            now_playing: None,
            playback_confirmed: false,
            error: None,
            loading_message: None,
            loading_tick: 0,

            grid_columns: 1,
            grid_cell_width: config.grid_cell_width,
            min_search_len: config.min_search_len,

            next_ticket: 0,
            pending_channels: None,
            pending_search: None,
            pending_play: None,
            tasks: Vec::new(),
        }
    }

    /// Drain the side effects requested since the last call
    pub fn take_tasks(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.tasks)
    }

    fn ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    /// Hand the engine the items of `screen`. The screen is only switched
    /// (and focus reset) when it actually changes, so re-renders of the
    /// same screen keep the remote's position.
    fn present(&mut self, screen: Screen, layout: Layout, items: Vec<FocusableItem<ItemKey>>) {
        self.screen = screen;
        if self.nav.screen() != Some(screen) {
            self.nav.set_screen(screen, layout);
        }
        self.nav.update_items(items);
    }

    pub fn start(&mut self) {
        self.error = None;
        self.loading_message = Some("Connecting...".to_string());
        self.present(Screen::Loading, Layout::List, Vec::new());
        self.nav.clear_on_select();
        self.tasks.push(Task::Connect);
    }

    pub fn show_categories(&mut self) {
        self.loading_message = None;
        let items = self
            .categories
            .iter()
            .enumerate()
            .map(|(index, c)| {
                FocusableItem::new(
                    ItemKey::Category {
                        index,
                        id: c.id.clone(),
                    },
                    c.name.clone(),
                )
            })
            .collect();
        self.present(
            Screen::Categories,
            Layout::Grid {
                columns: self.grid_columns,
            },
            items,
        );

        let categories = Arc::clone(&self.categories);
        self.nav.set_on_select(move |item| match &item.key {
            ItemKey::Category { index, id } => categories
                .get(*index)
                .filter(|c| &c.id == id)
                .cloned()
                .map(Intent::OpenCategory),
            _ => None,
        });
    }

    fn channel_items(channels: &[Channel]) -> Vec<FocusableItem<ItemKey>> {
        channels
            .iter()
            .enumerate()
            .map(|(index, c)| {
                FocusableItem::new(
                    ItemKey::Channel {
                        index,
                        id: c.id.clone(),
                    },
                    c.name.clone(),
                )
            })
            .collect()
    }

    fn channel_resolver(channels: Arc<Vec<Channel>>) -> impl FnMut(&FocusableItem<ItemKey>) -> Option<Intent> {
        move |item| match &item.key {
            ItemKey::Channel { index, id } => channels
                .get(*index)
                .filter(|c| &c.id == id)
                .cloned()
                .map(Intent::Play),
            _ => None,
        }
    }

    pub fn show_channels(&mut self) {
        let items = Self::channel_items(&self.channels);
        self.present(Screen::Channels, Layout::List, items);
        self.nav
            .set_on_select(Self::channel_resolver(Arc::clone(&self.channels)));
    }

    pub fn select_category(&mut self, category: CategoryEntry) {
        info!(category = %category.name, kind = category.kind.label(), "opening category");
        let ticket = self.ticket();
        self.pending_channels = Some(ticket);
        self.channels = Arc::new(Vec::new());
        self.loading_message = Some(format!("Loading {}...", category.name));
        self.current_category = Some(category.clone());

        // a fresh category always starts at the top
        self.nav.set_screen(Screen::Channels, Layout::List);
        self.show_channels();
        self.tasks.push(Task::LoadChannels { ticket, category });
    }

    pub fn open_search(&mut self) {
        self.search_input.reset();
        self.search_results = Arc::new(Vec::new());
        self.shown_query = None;
        self.search_error = None;
        self.pending_search = None;
        self.debouncer.cancel();
        self.loading_message = None;

        self.nav.set_screen(Screen::Search, Layout::List);
        self.show_search_results();
        self.nav.focus_search_field();
    }

    fn show_search_results(&mut self) {
        let items = Self::channel_items(&self.search_results);
        self.present(Screen::Search, Layout::List, items);
        self.nav
            .set_on_select(Self::channel_resolver(Arc::clone(&self.search_results)));
    }

    pub fn play_channel(&mut self, channel: Channel) {
        info!(channel = %channel.name, "play requested");
        let ticket = self.ticket();
        self.pending_play = Some(ticket);
        self.playback_confirmed = false;
        self.loading_message = Some(format!("Starting {}...", channel.name));
        self.tasks.push(Task::Play {
            ticket,
            url: channel.play_url.clone(),
            title: channel.name.clone(),
        });
        self.now_playing = Some(channel);
        self.present(Screen::Player, Layout::List, Vec::new());
        self.nav.clear_on_select();
    }

    fn show_error(&mut self, message: String, retry: RetryAction, back_to: Option<Screen>) {
        warn!(%message, "showing error screen");
        self.loading_message = None;
        self.error = Some(ErrorState {
            message,
            retry,
            back_to,
        });
        self.nav.set_screen(Screen::Error, Layout::List);
        self.present(
            Screen::Error,
            Layout::List,
            vec![FocusableItem::new(ItemKey::Retry, "Retry")],
        );
        // Retry relies on the default activation of its own item
        self.nav.clear_on_select();
    }

    pub fn retry(&mut self) {
        let Some(error) = self.error.take() else {
            return;
        };
        match error.retry {
            RetryAction::Reconnect => self.start(),
            RetryAction::ReloadChannels(category) => self.select_category(category),
            RetryAction::Replay(channel) => self.play_channel(channel),
        }
    }

    fn stop_playback(&mut self) {
        self.tasks.push(Task::StopPlayback);
        self.pending_play = None;
        self.playback_confirmed = false;
        self.now_playing = None;
        self.loading_message = None;
    }

    /// Leave the player for the list it logically belongs to
    fn leave_player(&mut self) {
        self.stop_playback();
        if self.current_category.is_some() {
            self.show_channels();
        } else {
            self.show_categories();
        }
    }

    pub fn go_back(&mut self) {
        match self.screen {
            Screen::Channels => {
                self.pending_channels = None;
                self.current_category = None;
                self.show_categories();
            }
            Screen::Search => {
                self.pending_search = None;
                self.debouncer.cancel();
                self.show_categories();
            }
            Screen::Player => self.leave_player(),
            Screen::Error => match self.error.as_ref().and_then(|e| e.back_to) {
                Some(Screen::Channels) => {
                    self.error = None;
                    self.show_channels();
                }
                Some(Screen::Search) => {
                    self.error = None;
                    self.show_search_results();
                }
                Some(Screen::Categories) => {
                    self.error = None;
                    self.current_category = None;
                    self.show_categories();
                }
                _ => debug!("back ignored on error screen"),
            },
            Screen::Categories | Screen::Loading => debug!("back ignored on {:?}", self.screen),
        }
    }

    /// Feed one remote command through the engine and act on the result
    pub fn handle_command(&mut self, command: RemoteCommand) {
        match self.nav.handle(command) {
            Some(NavEvent::Activated(Activation::Selected(Intent::OpenCategory(category)))) => {
                self.select_category(category)
            }
            Some(NavEvent::Activated(Activation::Selected(Intent::Play(channel)))) => {
                self.play_channel(channel)
            }
            Some(NavEvent::Activated(Activation::Default(ItemKey::Retry))) => self.retry(),
            Some(NavEvent::Activated(Activation::Default(key))) => {
                debug!(?key, "item has no default action")
            }
            Some(NavEvent::Activated(Activation::Unresolved)) => {
                debug!("activated item no longer on screen")
            }
            Some(NavEvent::Back) => self.go_back(),
            Some(NavEvent::Moved) | None => {}
        }
    }

    pub fn can_open_search(&self) -> bool {
        matches!(self.screen, Screen::Categories)
    }

    /// Edit the search field. Ignored unless the field has focus.
    pub fn handle_text_input(&mut self, request: InputRequest, now: Instant) {
        if self.screen != Screen::Search || !self.nav.is_search_field_focused() {
            return;
        }
        match self.search_input.handle(request) {
            Some(changed) if changed.value => {
                self.debouncer.schedule(self.search_input.value(), now)
            }
            _ => {}
        }
    }

    /// Periodic work: spinner animation and debounced searches
    pub fn tick(&mut self, now: Instant) {
        self.loading_tick = self.loading_tick.wrapping_add(1);
        if self.screen != Screen::Search {
            return;
        }
        if let Some(query) = self.debouncer.poll(now) {
            debug!(%query, "search due");
            let ticket = self.ticket();
            self.pending_search = Some(ticket);
            self.search_error = None;
            self.loading_message = Some(format!("Searching \"{}\"...", query));
            self.tasks.push(Task::Search { ticket, query });
        }
    }

    pub fn next_search_deadline(&self) -> Option<Instant> {
        self.debouncer.next_deadline()
    }

    /// The player has been confirmed and nothing else is pending for it
    pub fn is_watching(&self) -> bool {
        self.screen == Screen::Player && self.playback_confirmed && self.pending_play.is_none()
    }

    pub fn set_grid_columns(&mut self, columns: usize) {
        let columns = columns.max(1);
        if columns != self.grid_columns {
            self.grid_columns = columns;
            self.nav.set_columns(columns);
        }
    }

    pub fn handle_async_action(&mut self, action: AsyncAction) {
        match action {
            AsyncAction::Connected(info) => {
                info!(
                    source = info.label,
                    status = info.account_status.as_deref().unwrap_or("-"),
                    expires = info.expires.as_deref().unwrap_or("-"),
                    "source connected"
                );
                self.source_info = Some(info);
                self.loading_message = Some("Loading categories...".to_string());
            }
            AsyncAction::CategoriesLoaded(categories) => {
                if self.screen != Screen::Loading {
                    debug!("category list arrived after leaving the loading screen");
                    return;
                }
                self.categories = Arc::new(categories);
                self.current_category = None;
                self.show_categories();
            }
            AsyncAction::ChannelsLoaded { ticket, channels } => {
                if self.screen != Screen::Channels || self.pending_channels != Some(ticket) {
                    debug!(ticket, "stale channel list dropped");
                    return;
                }
                self.pending_channels = None;
                self.loading_message = None;
                self.channels = Arc::new(channels);
                self.show_channels();
            }
            AsyncAction::SearchResults {
                ticket,
                query,
                results,
            } => {
                if self.screen != Screen::Search || self.pending_search != Some(ticket) {
                    debug!(ticket, %query, "stale search results dropped");
                    return;
                }
                self.pending_search = None;
                self.loading_message = None;
                self.search_results = Arc::new(results);
                self.shown_query = Some(query);
                self.show_search_results();
            }
            AsyncAction::LoadFailed {
                stage,
                ticket,
                message,
            } => self.on_load_failed(stage, ticket, message),
            AsyncAction::PlayerStarted { ticket } => {
                if self.screen != Screen::Player || self.pending_play != Some(ticket) {
                    debug!(ticket, "stale player start ignored");
                    return;
                }
                self.pending_play = None;
                self.playback_confirmed = true;
                self.loading_message = None;
            }
            AsyncAction::PlayerFailed { ticket, reason } => {
                if self.screen != Screen::Player || self.pending_play != Some(ticket) {
                    debug!(ticket, "stale player failure ignored");
                    return;
                }
                let Some(channel) = self.now_playing.clone() else {
                    return;
                };
                let back_to = self.playback_origin();
                self.stop_playback();
                self.show_error(
                    format!("Could not play {}: {}", channel.name, reason),
                    RetryAction::Replay(channel),
                    Some(back_to),
                );
            }
            AsyncAction::PlayerExited { success } => {
                if !self.is_watching() {
                    return;
                }
                if success {
                    self.leave_player();
                } else if let Some(channel) = self.now_playing.clone() {
                    let back_to = self.playback_origin();
                    self.stop_playback();
                    self.show_error(
                        "Playback stopped with an error. Try another channel.".to_string(),
                        RetryAction::Replay(channel),
                        Some(back_to),
                    );
                }
            }
        }
    }

    fn playback_origin(&self) -> Screen {
        if self.current_category.is_some() {
            Screen::Channels
        } else {
            Screen::Categories
        }
    }

    fn on_load_failed(&mut self, stage: LoadStage, ticket: Option<u64>, message: String) {
        match stage {
            LoadStage::Connect => {
                if self.screen != Screen::Loading {
                    debug!("connect failure after leaving the loading screen");
                    return;
                }
                self.show_error(message, RetryAction::Reconnect, None);
            }
            LoadStage::Channels => {
                if self.screen != Screen::Channels || ticket.is_none() || self.pending_channels != ticket {
                    debug!(?ticket, "stale channel failure dropped");
                    return;
                }
                self.pending_channels = None;
                let Some(category) = self.current_category.clone() else {
                    return;
                };
                self.show_error(
                    format!("Could not load {}: {}", category.name, message),
                    RetryAction::ReloadChannels(category),
                    Some(Screen::Categories),
                );
            }
            LoadStage::Search => {
                if self.screen != Screen::Search || ticket.is_none() || self.pending_search != ticket {
                    debug!(?ticket, "stale search failure dropped");
                    return;
                }
                // search failures stay on the search screen
                self.pending_search = None;
                self.loading_message = None;
                self.search_error = Some(message);
            }
        }
    }
}
