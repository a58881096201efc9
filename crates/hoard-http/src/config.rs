//! Downloader configuration.

use std::time::Duration;

use hoard_core::OfflineSettings;

/// Configuration for [`crate::HttpTrackDownloader`].
///
/// Server URL and token stay optional here; their absence is reported per
/// download so the coordinator can record it against the track.
#[derive(Debug, Clone)]
pub struct HttpDownloaderConfig {
    pub(crate) server_url: Option<String>,
    pub(crate) access_token: Option<String>,
    pub(crate) user_agent: String,
    pub(crate) connect_timeout: Duration,
}

impl Default for HttpDownloaderConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            access_token: None,
            user_agent: concat!("hoard/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: Duration::from_secs(15),
        }
    }
}

impl HttpDownloaderConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take server URL and token from offline settings.
    #[must_use]
    pub fn from_settings(settings: &OfflineSettings) -> Self {
        Self {
            server_url: settings.server_url.clone(),
            access_token: settings.access_token.clone(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the connect timeout. Defaults to 15 seconds.
    ///
    /// There is no whole-request timeout; large files may take a while.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}
