//! Streaming track downloader over reqwest.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use hoard_core::{DownloadedPayload, ProgressReporter, SourceError, TrackDownloaderPort};

use crate::config::HttpDownloaderConfig;
use crate::content_type::extension_for_content_type;
use crate::url::direct_play_url;

/// Upper bound on the buffer reserved up front from `Content-Length`.
const MAX_PREALLOCATE_BYTES: usize = 64 * 1024 * 1024;

/// Downloads track bytes with a direct-play GET against the media server.
pub struct HttpTrackDownloader {
    client: Client,
    config: HttpDownloaderConfig,
}

impl HttpTrackDownloader {
    pub fn new(config: HttpDownloaderConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| SourceError::transport(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Use a pre-built client (shared connection pool, custom TLS).
    pub fn with_client(client: Client, config: HttpDownloaderConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl TrackDownloaderPort for HttpTrackDownloader {
    async fn download(
        &self,
        track_key: &str,
        part_key: &str,
        progress: &ProgressReporter,
    ) -> Result<DownloadedPayload, SourceError> {
        let url = direct_play_url(
            self.config.server_url.as_deref(),
            self.config.access_token.as_deref(),
            part_key,
        )?;

        tracing::debug!(target: "hoard.http", track = %track_key, part = %part_key, "Requesting track bytes");

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(target: "hoard.http", track = %track_key, status = status.as_u16(), "Server refused track download");
            return Err(SourceError::UnexpectedStatus(status.as_u16()));
        }

        let expected_bytes = response.content_length().filter(|len| *len > 0);
        let suggested_extension = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(extension_for_content_type);

        let reserve = expected_bytes
            .and_then(|len| usize::try_from(len).ok())
            .map_or(0, |len| len.min(MAX_PREALLOCATE_BYTES));
        let mut data = Vec::with_capacity(reserve);

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(transport)?;
            data.extend_from_slice(&chunk);
            progress.report(data.len() as u64, expected_bytes);
        }

        let mut payload = DownloadedPayload::new(data);
        payload.expected_bytes = expected_bytes;
        payload.suggested_extension = suggested_extension;
        Ok(payload)
    }
}

/// The URL carries the access token, so it is stripped from the message.
fn transport(err: reqwest::Error) -> SourceError {
    SourceError::transport(err.without_url().to_string())
}
