//! M3U / M3U8 playlist parsing.
//!
//! A playlist is a sequence of `#EXTINF:` lines, each followed by the URL of
//! the stream it describes:
//!
//! ```text
//! #EXTM3U x-tvg-url="http://epg.example/guide.xml"
//! #EXTINF:-1 tvg-id="news.us" tvg-logo="http://logo/news.png" group-title="News",News HD
//! http://cdn.example/news.m3u8
//! ```

use crate::errors::IptvError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, info};

/// Group assigned to entries without a `group-title`
pub const DEFAULT_GROUP: &str = "General";

static ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([A-Za-z0-9_-]+)="([^"]*)""#).expect("static regex"));
static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("static regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct M3uChannel {
    pub id: String,
    pub name: String,
    pub group: String,
    pub url: String,
}

#[derive(Debug, Clone, Default)]
pub struct Playlist {
    pub channels: Vec<M3uChannel>,
    pub epg_url: Option<String>,
    /// Group names in first-appearance order with the indices of their channels
    groups: Vec<(String, Vec<usize>)>,
}

impl Playlist {
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    pub fn channels_in(&self, group: &str) -> Vec<&M3uChannel> {
        self.groups
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, indices)| indices.iter().filter_map(|&i| self.channels.get(i)).collect())
            .unwrap_or_default()
    }

    /// Case-insensitive substring match on the channel name
    pub fn search(&self, query: &str) -> Vec<&M3uChannel> {
        let needle = query.to_lowercase();
        self.channels
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .collect()
    }
}

/// Download a playlist and parse it
pub async fn fetch(client: &reqwest::Client, url: &str) -> Result<Playlist, IptvError> {
    let text = client.get(url).send().await?.error_for_status()?.text().await?;
    let playlist = parse(&text);
    if playlist.channels.is_empty() {
        return Err(IptvError::EmptyResponse(
            "playlist contains no playable entries".to_string(),
        ));
    }
    info!(
        channels = playlist.channels.len(),
        groups = playlist.groups.len(),
        "playlist loaded"
    );
    Ok(playlist)
}

pub fn parse(content: &str) -> Playlist {
    let mut playlist = Playlist::default();
    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut pending: Option<ExtInf> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix("#EXTM3U") {
            let attrs = attributes(header);
            playlist.epg_url = attrs
                .get("x-tvg-url")
                .or_else(|| attrs.get("url-tvg"))
                .filter(|v| !v.is_empty())
                .cloned();
        } else if let Some(info) = line.strip_prefix("#EXTINF:") {
            pending = Some(parse_ext_inf(info));
        } else if line.starts_with('#') {
            continue;
        } else if let Some(info) = pending.take() {
            let index = playlist.channels.len();
            let id = info
                .tvg_id
                .unwrap_or_else(|| fallback_id(&info.name, index));
            let group = info.group.unwrap_or_else(|| DEFAULT_GROUP.to_string());

            let slot = *group_index.entry(group.clone()).or_insert_with(|| {
                playlist.groups.push((group.clone(), Vec::new()));
                playlist.groups.len() - 1
            });
            playlist.groups[slot].1.push(index);

            playlist.channels.push(M3uChannel {
                id,
                name: info.name,
                group,
                url: line.to_string(),
            });
        } else {
            debug!(line, "url without #EXTINF skipped");
        }
    }

    playlist
}

struct ExtInf {
    tvg_id: Option<String>,
    name: String,
    group: Option<String>,
}

fn parse_ext_inf(info: &str) -> ExtInf {
    let (meta, title) = split_title(info);
    let attrs = attributes(meta);
    let non_empty = |key: &str| attrs.get(key).filter(|v| !v.trim().is_empty()).cloned();

    let name = non_empty("tvg-name").unwrap_or_else(|| title.trim().to_string());

    ExtInf {
        tvg_id: non_empty("tvg-id"),
        name,
        group: non_empty("group-title"),
    }
}

/// Split at the first comma that is not inside a quoted attribute value
fn split_title(info: &str) -> (&str, &str) {
    let mut in_quotes = false;
    for (i, ch) in info.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => return (&info[..i], &info[i + 1..]),
            _ => {}
        }
    }
    (info, "")
}

fn attributes(meta: &str) -> HashMap<String, String> {
    ATTR_RE
        .captures_iter(meta)
        .map(|cap| (cap[1].to_lowercase(), cap[2].to_string()))
        .collect()
}

/// Id for entries without `tvg-id`: the slugged name, or the position when
/// the name has no usable characters.
pub fn fallback_id(name: &str, index: usize) -> String {
    let lowered = name.to_lowercase();
    let slug = SLUG_RE.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        format!("channel-{}", index)
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"#EXTM3U x-tvg-url="http://epg.example/guide.xml"
#EXTINF:-1 tvg-id="news.us" tvg-name="News HD" tvg-logo="http://logo/news.png" group-title="News",News (backup name)
http://cdn.example/news.m3u8

#EXTINF:-1 group-title="Sports, Live",Sports One
#EXTVLCOPT:http-user-agent=Foo
http://cdn.example/sports1.m3u8
#EXTINF:-1 tvg-logo="",Música Ao Vivo
http://cdn.example/music.ts
#EXTINF:-1 tvg-id="news.uk" group-title="News",World News
http://cdn.example/world.m3u8
http://cdn.example/orphan.m3u8
"#;

    #[test]
    fn test_parse_channels_and_attributes() {
        let playlist = parse(SAMPLE);
        assert_eq!(playlist.channels.len(), 4);
        assert_eq!(playlist.epg_url.as_deref(), Some("http://epg.example/guide.xml"));

        let news = &playlist.channels[0];
        assert_eq!(news.id, "news.us");
        assert_eq!(news.name, "News HD");
        assert_eq!(news.group, "News");
        assert_eq!(news.url, "http://cdn.example/news.m3u8");
    }

    #[test]
    fn test_comma_inside_group_title() {
        let playlist = parse(SAMPLE);
        let sports = &playlist.channels[1];
        assert_eq!(sports.group, "Sports, Live");
        assert_eq!(sports.name, "Sports One");
        assert_eq!(sports.id, "sports-one");
        assert_eq!(sports.url, "http://cdn.example/sports1.m3u8");
    }

    #[test]
    fn test_defaults_for_missing_attributes() {
        let playlist = parse(SAMPLE);
        let music = &playlist.channels[2];
        assert_eq!(music.group, DEFAULT_GROUP);
        assert_eq!(music.id, "m-sica-ao-vivo");
    }

    #[test]
    fn test_groups_keep_first_appearance_order() {
        let playlist = parse(SAMPLE);
        let groups: Vec<&str> = playlist.group_names().collect();
        assert_eq!(groups, vec!["News", "Sports, Live", DEFAULT_GROUP]);

        let news: Vec<&str> = playlist
            .channels_in("News")
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(news, vec!["News HD", "World News"]);
        assert!(playlist.channels_in("Missing").is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let playlist = parse(SAMPLE);
        let hits: Vec<&str> = playlist.search("NEWS").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(hits, vec!["News HD", "World News"]);
        assert!(playlist.search("cartoon").is_empty());
    }

    #[test]
    fn test_fallback_id_for_symbol_only_name() {
        assert_eq!(fallback_id("***", 3), "channel-3");
        assert_eq!(fallback_id("  CNN International ", 0), "cnn-international");
    }
}
