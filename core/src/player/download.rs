//! Track downloads
//!
//! Tracks are fetched whole into memory before decoding, with a hard size
//! cap checked against `Content-Length` up front and against the running
//! total while streaming.

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use url::Url;

use super::PlayerError;

/// Percent-encode every path segment of `raw`.
///
/// Catalog URLs carry album and track titles verbatim, so segments may hold
/// spaces, `%` and other characters that are not valid in a URL path.
pub fn encode_url(raw: &str) -> Result<Url, PlayerError> {
    let mut url = Url::parse(raw)?;

    let origin = url.origin().ascii_serialization();
    if let Some(rest) = raw.strip_prefix(origin.as_str()) {
        let path = rest.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        if let Ok(mut out) = url.path_segments_mut() {
            out.clear().extend(segments);
        }
    }
    Ok(url)
}

/// GET `url` and collect the body, refusing anything over `max_bytes`.
pub async fn fetch(client: &reqwest::Client, url: Url, max_bytes: usize) -> Result<Bytes, PlayerError> {
    let response = client.get(url.clone()).send().await?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(PlayerError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    if let Some(len) = response.content_length() {
        if len > max_bytes as u64 {
            return Err(PlayerError::TooLarge { limit: max_bytes });
        }
    }

    let mut body = BytesMut::with_capacity(
        response
            .content_length()
            .map_or(0, |len| len as usize)
            .min(max_bytes),
    );
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if body.len() + chunk.len() > max_bytes {
            return Err(PlayerError::TooLarge { limit: max_bytes });
        }
        body.extend_from_slice(&chunk);
    }

    tracing::debug!(url = %url, bytes = body.len(), "track downloaded");
    Ok(body.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_spaces_are_encoded() {
        let url = encode_url(
            "https://cdn.dopogoto.com/Dopo Goto - Pillbox/Dopo Goto - Pillbox - 01 A Song.mp3",
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://cdn.dopogoto.com/Dopo%20Goto%20-%20Pillbox/Dopo%20Goto%20-%20Pillbox%20-%2001%20A%20Song.mp3"
        );
    }

    #[test]
    fn test_percent_sign_is_encoded() {
        let url = encode_url("https://cdn.example/a/100% Real.mp3").unwrap();
        assert_eq!(url.path(), "/a/100%25%20Real.mp3");
    }

    #[test]
    fn test_plain_url_untouched() {
        let url = encode_url("http://127.0.0.1:8080/track.mp3").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/track.mp3");
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(matches!(
            encode_url("not a url"),
            Err(PlayerError::InvalidUrl(_))
        ));
    }
}
