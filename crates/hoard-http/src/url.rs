//! Direct-play URL construction.

use hoard_core::SourceError;
use url::Url;

/// Query parameter carrying the access token.
pub const TOKEN_QUERY_KEY: &str = "X-Plex-Token";

/// Build `<server><part_key>?X-Plex-Token=<token>`.
///
/// Blank server URLs and tokens count as missing. A part key without a
/// leading slash is joined with one.
pub fn direct_play_url(
    server_url: Option<&str>,
    access_token: Option<&str>,
    part_key: &str,
) -> Result<Url, SourceError> {
    let server = server_url
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(SourceError::MissingServerUrl)?;
    let token = access_token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(SourceError::MissingAuthToken)?;

    let base = server.trim_end_matches('/');
    let raw = if part_key.starts_with('/') {
        format!("{base}{part_key}")
    } else {
        format!("{base}/{part_key}")
    };

    let mut url = Url::parse(&raw)
        .map_err(|e| SourceError::transport(format!("Invalid media URL for {server}: {e}")))?;
    url.query_pairs_mut().append_pair(TOKEN_QUERY_KEY, token);
    Ok(url)
}
