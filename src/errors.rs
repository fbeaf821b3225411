use std::path::PathBuf;
use thiserror::Error;

/// Stage of a request at which a source call failed
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStage {
    /// Could not connect to the server at all
    Connect,
    /// Request was sent but the server never answered in time
    Response,
    /// Credentials rejected by the panel
    Authentication,
    /// Body arrived but did not decode
    Decode,
}

impl std::fmt::Display for ConnectionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl ConnectionStage {
    pub fn display_name(&self) -> &'static str {
        match self {
            ConnectionStage::Connect => "Connection",
            ConnectionStage::Response => "Response",
            ConnectionStage::Authentication => "Authentication",
            ConnectionStage::Decode => "Response Parsing",
        }
    }

    /// Actionable hint shown under the error message
    pub fn suggestion(&self) -> &'static str {
        match self {
            ConnectionStage::Connect => "Check the server URL and your network connection.",
            ConnectionStage::Response => "The server is slow or offline. Try again later.",
            ConnectionStage::Authentication => "Verify the username and password in the config file.",
            ConnectionStage::Decode => "The provider returned an unexpected response.",
        }
    }
}

/// Failures of the data source (Xtream panel or M3U playlist)
#[derive(Debug, Error, Clone)]
pub enum IptvError {
    #[error("{0} failed: {1}")]
    Connection(ConnectionStage, String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Server returned {0}: {1}")]
    ServerError(u16, String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Empty or invalid response received: {0}")]
    EmptyResponse(String),
}

impl IptvError {
    /// Map a transport error onto the stage it happened at.
    /// The URL is stripped first since it embeds credentials.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let err = err.without_url();
        let reason = err.to_string();
        if err.is_builder() {
            IptvError::Connection(
                ConnectionStage::Connect,
                format!("HTTP client setup failed: {}", reason),
            )
        } else if err.is_decode() {
            IptvError::ParseError(reason)
        } else if let Some(status) = err.status() {
            IptvError::ServerError(status.as_u16(), reason)
        } else if err.is_timeout() {
            IptvError::Connection(ConnectionStage::Response, reason)
        } else {
            IptvError::Connection(ConnectionStage::Connect, reason)
        }
    }

    pub fn stage(&self) -> ConnectionStage {
        match self {
            IptvError::Connection(stage, _) => stage.clone(),
            IptvError::AuthenticationFailed(_) => ConnectionStage::Authentication,
            IptvError::ServerError(_, _) => ConnectionStage::Response,
            IptvError::ParseError(_) | IptvError::EmptyResponse(_) => ConnectionStage::Decode,
        }
    }

    /// Multi-line text for the error screen
    pub fn diagnostics(&self) -> String {
        format!("{}\nSuggestion: {}", self, self.stage().suggestion())
    }
}

impl From<reqwest::Error> for IptvError {
    fn from(err: reqwest::Error) -> Self {
        IptvError::from_reqwest(err)
    }
}

/// Failures of the external player
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("Failed to start {command}: {reason}. Make sure it is installed and in PATH.")]
    Spawn { command: String, reason: String },

    #[error("Player exited before playback started")]
    ExitedEarly,

    #[error("Stream URL is missing")]
    MissingUrl,

    #[error("Player state unavailable: {0}")]
    State(String),
}

/// Problems with the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No configuration found at {0}")]
    NotFound(PathBuf),

    #[error("Could not determine a configuration directory for this platform")]
    NoConfigDir,

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Incomplete configuration: {0}")]
    Incomplete(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_include_suggestion() {
        let err = IptvError::AuthenticationFailed("auth=0".to_string());
        let text = err.diagnostics();
        assert!(text.starts_with("Authentication failed: auth=0"));
        assert!(text.contains(ConnectionStage::Authentication.suggestion()));
    }

    #[test]
    fn test_server_error_maps_to_response_stage() {
        let err = IptvError::ServerError(503, "unavailable".to_string());
        assert_eq!(err.stage(), ConnectionStage::Response);
        assert_eq!(err.to_string(), "Server returned 503: unavailable");
    }
}
