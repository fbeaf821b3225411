use crate::errors::IptvError;
use crate::flex_id::FlexId;
use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::{debug, info};

const USER_AGENT: &str = "IPTV Smarters Pro";

/// Some panels send `null` where a string belongs
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Category {
    pub category_id: FlexId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Stream {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, alias = "series_id")]
    pub stream_id: FlexId,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub container_extension: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct UserInfo {
    #[serde(default)]
    pub auth: FlexId,
    pub status: Option<String>,
    pub exp_date: Option<FlexId>,
    pub max_connections: Option<FlexId>,
    pub active_cons: Option<FlexId>,
}

impl UserInfo {
    pub fn is_authorized(&self) -> bool {
        self.auth == FlexId::Number(1)
    }

    /// Expiry as `YYYY-MM-DD`. Unlimited accounts send null or 0.
    pub fn expiry_date(&self) -> Option<String> {
        let FlexId::Number(ts) = self.exp_date.as_ref()? else {
            return None;
        };
        if *ts <= 0 {
            return None;
        }
        DateTime::from_timestamp(*ts, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
    }

    /// Active over allowed streams, e.g. `1/2`
    pub fn connections(&self) -> Option<String> {
        let max = self.max_connections.as_ref()?.key()?;
        let active = self
            .active_cons
            .as_ref()
            .and_then(FlexId::key)
            .unwrap_or_else(|| "0".to_string());
        Some(format!("{}/{}", active, max))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ServerInfo {
    pub timezone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    user_info: Option<UserInfo>,
    server_info: Option<ServerInfo>,
}

/// Strip the trailing slash and optionally upgrade `http://` to `https://`
pub fn normalize_base_url(base_url: &str, force_https: bool) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    match trimmed.strip_prefix("http://") {
        Some(rest) if force_https => format!("https://{}", rest),
        _ => trimmed.to_string(),
    }
}

/// HTTP client with the panel user agent and request timeout
pub fn http_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client, IptvError> {
    Ok(reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()?)
}

#[derive(Debug, Clone)]
pub struct XtreamClient {
    pub base_url: String,
    pub username: String,
    password: String,
    client: reqwest::Client,
}

impl XtreamClient {
    pub fn new(
        base_url: &str,
        username: String,
        password: String,
        timeout: Duration,
    ) -> Result<Self, IptvError> {
        Ok(Self {
            base_url: normalize_base_url(base_url, false),
            username,
            password,
            client: http_client(USER_AGENT, timeout)?,
        })
    }

    async fn call<T>(&self, action: Option<&str>, category_id: Option<&str>) -> Result<T, IptvError>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut query: Vec<(&str, &str)> = vec![
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ];
        if let Some(action) = action {
            query.push(("action", action));
        }
        if let Some(id) = category_id {
            query.push(("category_id", id));
        }

        debug!(
            action = action.unwrap_or("auth"),
            category_id = category_id.unwrap_or("-"),
            "xtream request"
        );
        let resp = self
            .client
            .get(format!("{}/player_api.php", self.base_url))
            .query(&query)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json::<T>().await?)
    }

    pub async fn authenticate(&self) -> Result<(UserInfo, Option<ServerInfo>), IptvError> {
        let resp: AuthResponse = self.call(None, None).await?;
        match resp.user_info {
            Some(info) if info.is_authorized() => {
                info!(
                    status = info.status.as_deref().unwrap_or("unknown"),
                    "xtream login accepted"
                );
                Ok((info, resp.server_info))
            }
            Some(info) => Err(IptvError::AuthenticationFailed(format!(
                "account status {}",
                info.status.as_deref().unwrap_or("unknown")
            ))),
            None => Err(IptvError::AuthenticationFailed(
                "panel did not return user_info".to_string(),
            )),
        }
    }

    pub async fn get_live_categories(&self) -> Result<Vec<Category>, IptvError> {
        self.call(Some("get_live_categories"), None).await
    }

    pub async fn get_vod_categories(&self) -> Result<Vec<Category>, IptvError> {
        self.call(Some("get_vod_categories"), None).await
    }

    /// `None` fetches every live stream on the panel
    pub async fn get_live_streams(&self, category_id: Option<&str>) -> Result<Vec<Stream>, IptvError> {
        self.call(Some("get_live_streams"), category_id).await
    }

    /// `None` fetches every VOD entry on the panel
    pub async fn get_vod_streams(&self, category_id: Option<&str>) -> Result<Vec<Stream>, IptvError> {
        self.call(Some("get_vod_streams"), category_id).await
    }

    pub fn get_stream_url(&self, stream_id: &str) -> String {
        format!(
            "{}/live/{}/{}/{}.m3u8",
            self.base_url, self.username, self.password, stream_id
        )
    }

    pub fn get_vod_url(&self, stream_id: &str, extension: Option<&str>) -> String {
        let extension = extension
            .map(str::trim)
            .filter(|ext| !ext.is_empty())
            .unwrap_or("mkv");
        format!(
            "{}/movie/{}/{}/{}.{}",
            self.base_url, self.username, self.password, stream_id, extension
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConnectionStage;

    fn client() -> XtreamClient {
        XtreamClient::new(
            "http://panel.example:8080/",
            "user".to_string(),
            "pass".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_trailing_slash_removed() {
        assert_eq!(client().base_url, "http://panel.example:8080");
    }

    #[test]
    fn test_force_https_upgrade() {
        assert_eq!(
            normalize_base_url("http://panel.example/", true),
            "https://panel.example"
        );
        assert_eq!(
            normalize_base_url("http://panel.example", false),
            "http://panel.example"
        );
        assert_eq!(
            normalize_base_url("https://panel.example", true),
            "https://panel.example"
        );
    }

    #[test]
    fn test_stream_urls() {
        let c = client();
        assert_eq!(
            c.get_stream_url("101"),
            "http://panel.example:8080/live/user/pass/101.m3u8"
        );
        assert_eq!(
            c.get_vod_url("7", Some("mp4")),
            "http://panel.example:8080/movie/user/pass/7.mp4"
        );
        assert_eq!(
            c.get_vod_url("7", None),
            "http://panel.example:8080/movie/user/pass/7.mkv"
        );
    }

    #[test]
    fn test_stream_tolerates_loose_fields() {
        let json = r#"[
            {"num": 1, "name": "News HD", "stream_type": "live", "stream_id": "55",
             "stream_icon": "http://logo/news.png", "category_id": 3},
            {"num": "2", "name": null, "series_id": 9, "cover": null,
             "category_name": null, "container_extension": "mp4"}
        ]"#;
        let streams: Vec<Stream> = serde_json::from_str(json).unwrap();
        assert_eq!(streams[0].stream_id, FlexId::Number(55));
        assert_eq!(streams[1].name, "");
        assert_eq!(streams[1].stream_id, FlexId::Number(9));
        assert!(streams[1].category_name.is_none());
        assert_eq!(streams[1].container_extension.as_deref(), Some("mp4"));
    }

    #[test]
    fn test_client_setup_error_is_reported() {
        let err = http_client("bad\nagent", Duration::from_secs(5)).unwrap_err();
        assert_eq!(err.stage(), ConnectionStage::Connect);
        assert!(err.to_string().contains("HTTP client setup failed"));
    }

    #[test]
    fn test_auth_flag() {
        let info: UserInfo = serde_json::from_str(r#"{"auth": "1", "status": "Active"}"#).unwrap();
        assert!(info.is_authorized());
        let info: UserInfo = serde_json::from_str(r#"{"auth": 0}"#).unwrap();
        assert!(!info.is_authorized());
    }

    #[test]
    fn test_account_expiry_and_connections() {
        let info: UserInfo = serde_json::from_str(
            r#"{"auth": 1, "status": "Active", "exp_date": "1798675200",
                "max_connections": "2", "active_cons": 1}"#,
        )
        .unwrap();
        assert_eq!(info.expiry_date().as_deref(), Some("2026-12-31"));
        assert_eq!(info.connections().as_deref(), Some("1/2"));

        let unlimited: UserInfo =
            serde_json::from_str(r#"{"auth": 1, "exp_date": null, "max_connections": 1}"#).unwrap();
        assert!(unlimited.expiry_date().is_none());
        assert_eq!(unlimited.connections().as_deref(), Some("0/1"));

        let zero: UserInfo = serde_json::from_str(r#"{"auth": 1, "exp_date": "0"}"#).unwrap();
        assert!(zero.expiry_date().is_none());
        assert!(zero.connections().is_none());
    }
}
