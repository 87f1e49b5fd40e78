//! HTTP client for the music server's playback and metadata API.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Error;

/// Server-side playback state. Anything other than playing/paused (stopped,
/// buffering, future additions) is treated as "nothing to show".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum PlayState {
    Playing,
    Paused,
    Other,
}

impl From<String> for PlayState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "playing" => Self::Playing,
            "paused" => Self::Paused,
            _ => Self::Other,
        }
    }
}

/// A point-in-time snapshot of what the server thinks is playing.
///
/// `position_ms` is the position as of `updated_at_ms`, not "now" —
/// consumers must extrapolate. A missing `duration_ms` means the duration
/// is unknown (e.g. a live stream), not zero.
#[derive(Debug, Clone, Deserialize)]
pub struct Playback {
    #[allow(dead_code)]
    pub playback_id: i64,
    pub track_id: i64,
    #[allow(dead_code)]
    pub user_id: i64,
    pub position_ms: i64,
    pub state: PlayState,
    #[allow(dead_code)]
    pub activity_ms: i64,
    pub updated_at_ms: i64,
    pub duration_ms: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    #[serde(rename = "db_id")]
    #[allow(dead_code)]
    pub id: i64,
    #[serde(rename = "artist_name")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Album {
    #[serde(rename = "db_id")]
    pub id: i64,
    #[serde(rename = "album_title")]
    pub title: String,
    #[serde(default)]
    pub year: i32,
}

/// Track metadata with embedded artists and albums. The first album, when
/// present, is the primary one used for the album line and cover art.
#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    #[serde(rename = "db_id")]
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub albums: Vec<Album>,
}

impl Track {
    /// Artist names joined for display. A track with no artists yields an
    /// empty string rather than an error.
    pub fn artist_line(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Source of playback snapshots and track metadata.
#[async_trait]
pub trait PlaybackSource {
    async fn active_playback(&self) -> Result<Option<Playback>, Error>;
    async fn track(&self, id: i64) -> Result<Track, Error>;
}

/// Source of raw cover image bytes, keyed by album id.
#[async_trait]
pub trait CoverFetch: Send + Sync {
    async fn cover_bytes(&self, album_id: i64) -> Result<Vec<u8>, Error>;
}

#[derive(Clone)]
pub struct ServerClient {
    http: reqwest::Client,
    base_url: String,
}

impl ServerClient {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }
}

#[async_trait]
impl PlaybackSource for ServerClient {
    async fn active_playback(&self) -> Result<Option<Playback>, Error> {
        let url = format!("{}/api/playbacks?active=true", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::transport("playbacks", e))?;

        if !response.status().is_success() {
            return Err(Error::UnexpectedStatus {
                op: "playbacks",
                status: response.status(),
            });
        }

        let mut playbacks: Vec<Playback> = response
            .json()
            .await
            .map_err(|e| Error::decode("playbacks", e))?;

        if playbacks.is_empty() {
            Ok(None)
        } else {
            Ok(Some(playbacks.remove(0)))
        }
    }

    async fn track(&self, id: i64) -> Result<Track, Error> {
        let url = format!("{}/api/tracks/{}?inc=albums,artists", self.base_url, id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::transport("track", e))?;

        if !response.status().is_success() {
            return Err(Error::UnexpectedStatus {
                op: "track",
                status: response.status(),
            });
        }

        response.json().await.map_err(|e| Error::decode("track", e))
    }
}

#[async_trait]
impl CoverFetch for ServerClient {
    async fn cover_bytes(&self, album_id: i64) -> Result<Vec<u8>, Error> {
        let url = format!("{}/api/albums/{}/cover", self.base_url, album_id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::transport("cover", e))?;

        if !response.status().is_success() {
            return Err(Error::UnexpectedStatus {
                op: "cover",
                status: response.status(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::transport("cover", e))?;
        Ok(bytes.to_vec())
    }
}
