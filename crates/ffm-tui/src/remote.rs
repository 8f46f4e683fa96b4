//! Remote audio client — list, upload and delete against the storage
//! service, authenticated with a bearer credential.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("invalid server url: {0}")]
    InvalidBase(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(StatusCode),
    #[error("upload response carried no Location header")]
    MissingLocation,
}

/// Result of a listing call. 404 is a first-time station, not an error.
#[derive(Debug, Clone)]
pub enum ListOutcome {
    /// Relative clip URLs (`/audio/<token>/<file>`), oldest first.
    Files(Vec<String>),
    NoRecordings,
}

/// The listing body has had two shapes across server revisions: a bare
/// array of relative URLs, or an object also carrying the frequency.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListingBody {
    Files(Vec<String>),
    Station {
        files: Vec<String>,
        #[serde(default)]
        #[allow(dead_code)]
        frequency: Option<f64>,
    },
}

impl ListingBody {
    fn into_files(self) -> Vec<String> {
        match self {
            ListingBody::Files(files) => files,
            ListingBody::Station { files, .. } => files,
        }
    }
}

/// Last path segment of an upload response's `Location` header.
pub fn file_name_from_location(location: &str) -> &str {
    match location.rfind('/') {
        Some(idx) => &location[idx + 1..],
        None => location,
    }
}

pub struct RemoteClient {
    http: reqwest::Client,
    base: Url,
}

impl RemoteClient {
    pub fn new(base: &str) -> Result<Self, RemoteError> {
        let base = Url::parse(base).map_err(|e| RemoteError::InvalidBase(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(RemoteError::InvalidBase(base.to_string()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| RemoteError::InvalidBase(self.base.to_string()))?;
            path.pop_if_empty();
            for segment in segments {
                // percent-encodes each segment
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// `GET /audio` — the caller's prior recordings.
    pub async fn list_recordings(&self, credential: &str) -> Result<ListOutcome, RemoteError> {
        let url = self.endpoint(&["audio"])?;
        debug!("Listing recordings from {}", url);
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {credential}"))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(ListOutcome::NoRecordings);
        }
        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status()));
        }

        let body: ListingBody = response.json().await?;
        Ok(ListOutcome::Files(body.into_files()))
    }

    /// `POST /audio` with the raw clip body. The stored file name comes
    /// back as the last segment of the `Location` header.
    pub async fn upload_clip(
        &self,
        credential: &str,
        bytes: Vec<u8>,
        mime: &str,
    ) -> Result<String, RemoteError> {
        let url = self.endpoint(&["audio"])?;
        info!("Uploading {} byte clip as {}", bytes.len(), mime);
        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {credential}"))
            .header(CONTENT_TYPE, mime)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status()));
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(RemoteError::MissingLocation)?;
        Ok(file_name_from_location(location).to_string())
    }

    /// `DELETE /audio/<token>/<file_name>`.
    pub async fn delete_clip(
        &self,
        credential: &str,
        token: &str,
        file_name: &str,
    ) -> Result<(), RemoteError> {
        let url = self.endpoint(&["audio", token, file_name])?;
        info!("Deleting clip {}", file_name);
        let response = self
            .http
            .delete(url)
            .header(AUTHORIZATION, format!("Bearer {credential}"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_from_location() {
        assert_eq!(
            file_name_from_location("/audio/5f2c-tok/alice01.wav"),
            "alice01.wav"
        );
        assert_eq!(file_name_from_location("alice01.wav"), "alice01.wav");
        assert_eq!(file_name_from_location("/audio/tok/"), "");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = RemoteClient::new("http://localhost:7625").unwrap();
        let url = client
            .endpoint(&["audio", "tok", "clip with spaces.wav"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:7625/audio/tok/clip%20with%20spaces.wav"
        );
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let client = RemoteClient::new("http://localhost:7625/").unwrap();
        let url = client.endpoint(&["audio"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:7625/audio");
    }

    #[test]
    fn test_bad_base_is_rejected() {
        assert!(RemoteClient::new("not a url").is_err());
    }

    #[test]
    fn test_listing_body_both_shapes() {
        let bare: ListingBody = serde_json::from_str(r#"["/audio/t/a.wav"]"#).unwrap();
        assert_eq!(bare.into_files(), vec!["/audio/t/a.wav"]);

        let with_frequency: ListingBody =
            serde_json::from_str(r#"{"frequency": 91.0, "files": ["/audio/t/a.wav"]}"#).unwrap();
        assert_eq!(with_frequency.into_files(), vec!["/audio/t/a.wav"]);
    }
}
