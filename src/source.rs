use crate::api::{
    http_client, normalize_base_url, Category, ServerInfo, Stream, UserInfo, XtreamClient,
};
use crate::config::{AppConfig, SourceConfig};
use crate::errors::IptvError;
use crate::m3u::{self, M3uChannel, Playlist};
use std::sync::Arc;
use tracing::{info, warn};

const PLAYLIST_USER_AGENT: &str = concat!("couch-iptv/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Live,
    Vod,
}

impl ContentKind {
    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Live => "LIVE",
            ContentKind::Vod => "VOD",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryEntry {
    pub id: String,
    pub name: String,
    pub kind: ContentKind,
}

/// A playable entry, independent of where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub group_name: Option<String>,
    pub play_url: String,
    pub kind: ContentKind,
}

/// What the source reported about itself while connecting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceInfo {
    pub label: &'static str,
    pub account_status: Option<String>,
    pub expires: Option<String>,
    pub connections: Option<String>,
    pub timezone: Option<String>,
    pub epg_url: Option<String>,
}

impl SourceInfo {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            ..Default::default()
        }
    }

    fn xtream(user: &UserInfo, server: Option<&ServerInfo>) -> Self {
        Self {
            account_status: user.status.clone().filter(|s| !s.trim().is_empty()),
            expires: user.expiry_date(),
            connections: user.connections(),
            timezone: server.and_then(|s| s.timezone.clone()),
            ..Self::new("Xtream")
        }
    }

    /// One-line form for the header, e.g. `Xtream | Active | exp 2026-12-31`
    pub fn summary(&self) -> String {
        let mut parts = vec![self.label.to_string()];
        if let Some(status) = &self.account_status {
            parts.push(status.clone());
        }
        if let Some(expires) = &self.expires {
            parts.push(format!("exp {}", expires));
        }
        parts.join(" | ")
    }
}

/// Normalized access to either backend. Cloning is cheap.
#[derive(Debug, Clone)]
pub enum DataSource {
    Xtream(XtreamClient),
    M3u(Arc<Playlist>),
}

impl DataSource {
    /// Authenticate against the panel or download the playlist
    pub async fn connect(config: &AppConfig) -> Result<(Self, SourceInfo), IptvError> {
        match &config.source {
            SourceConfig::Xtream {
                url,
                username,
                password,
            } => {
                let base = normalize_base_url(url, config.force_https);
                let client = XtreamClient::new(
                    &base,
                    username.clone(),
                    password.clone(),
                    config.request_timeout(),
                )?;
                let (user, server) = client.authenticate().await?;
                let info = SourceInfo::xtream(&user, server.as_ref());
                Ok((DataSource::Xtream(client), info))
            }
            SourceConfig::M3u { url } => {
                let url = normalize_base_url(url, config.force_https);
                let http = http_client(PLAYLIST_USER_AGENT, config.request_timeout())?;
                let playlist = m3u::fetch(&http, &url).await?;
                let info = SourceInfo {
                    epg_url: playlist.epg_url.clone(),
                    ..SourceInfo::new("M3U")
                };
                Ok((DataSource::M3u(Arc::new(playlist)), info))
            }
        }
    }

    /// Live categories first, then VOD
    pub async fn load_categories(&self) -> Result<Vec<CategoryEntry>, IptvError> {
        match self {
            DataSource::Xtream(client) => {
                let (live, vod) = futures::try_join!(
                    client.get_live_categories(),
                    client.get_vod_categories()
                )?;
                let categories: Vec<CategoryEntry> = live
                    .into_iter()
                    .filter_map(|c| category_entry(c, ContentKind::Live))
                    .chain(vod.into_iter().filter_map(|c| category_entry(c, ContentKind::Vod)))
                    .collect();
                info!(count = categories.len(), "categories loaded");
                Ok(categories)
            }
            DataSource::M3u(playlist) => Ok(playlist
                .group_names()
                .map(|name| CategoryEntry {
                    id: name.to_string(),
                    name: name.to_string(),
                    kind: ContentKind::Live,
                })
                .collect()),
        }
    }

    pub async fn load_channels(&self, category: &CategoryEntry) -> Result<Vec<Channel>, IptvError> {
        match self {
            DataSource::Xtream(client) => {
                let streams = match category.kind {
                    ContentKind::Live => client.get_live_streams(Some(&category.id)).await?,
                    ContentKind::Vod => client.get_vod_streams(Some(&category.id)).await?,
                };
                Ok(streams
                    .into_iter()
                    .filter_map(|s| xtream_channel(client, s, category.kind))
                    .collect())
            }
            DataSource::M3u(playlist) => Ok(playlist
                .channels_in(&category.id)
                .into_iter()
                .map(m3u_channel)
                .collect()),
        }
    }

    /// Name search over every channel the source offers. Xtream results list
    /// live matches before VOD matches.
    pub async fn search(&self, query: &str) -> Result<Vec<Channel>, IptvError> {
        let needle = query.to_lowercase();
        match self {
            DataSource::Xtream(client) => {
                let (live, vod) = futures::try_join!(
                    client.get_live_streams(None),
                    client.get_vod_streams(None)
                )?;
                let matches = |kind: ContentKind| {
                    let needle = needle.clone();
                    move |s: Stream| {
                        if s.name.to_lowercase().contains(&needle) {
                            xtream_channel(client, s, kind)
                        } else {
                            None
                        }
                    }
                };
                Ok(live
                    .into_iter()
                    .filter_map(matches(ContentKind::Live))
                    .chain(vod.into_iter().filter_map(matches(ContentKind::Vod)))
                    .collect())
            }
            DataSource::M3u(playlist) => {
                Ok(playlist.search(&needle).into_iter().map(m3u_channel).collect())
            }
        }
    }
}

fn category_entry(category: Category, kind: ContentKind) -> Option<CategoryEntry> {
    let id = category.category_id.key()?;
    Some(CategoryEntry {
        id,
        name: category.category_name,
        kind,
    })
}

/// Streams without an id cannot be played and are dropped
fn xtream_channel(client: &XtreamClient, stream: Stream, kind: ContentKind) -> Option<Channel> {
    let Some(id) = stream.stream_id.key() else {
        warn!(name = %stream.name, "stream without id skipped");
        return None;
    };
    let play_url = match kind {
        ContentKind::Live => client.get_stream_url(&id),
        ContentKind::Vod => client.get_vod_url(&id, stream.container_extension.as_deref()),
    };
    Some(Channel {
        name: stream.name,
        group_name: stream.category_name.filter(|s| !s.trim().is_empty()),
        play_url,
        kind,
        id,
    })
}

fn m3u_channel(channel: &M3uChannel) -> Channel {
    Channel {
        id: channel.id.clone(),
        name: channel.name.clone(),
        group_name: Some(channel.group.clone()),
        play_url: channel.url.clone(),
        kind: ContentKind::Live,
    }
}
