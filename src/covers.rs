//! Cover art resolution: fetch the album cover from the music server,
//! upload it to a public image host, and cache the resulting URL so each
//! album is uploaded at most once per process lifetime.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::{ImagesConfig, UploaderKind};
use crate::error::Error;
use crate::server::CoverFetch;

const LITTERBOX_URL: &str = "https://litterbox.catbox.moe/resources/internals/api.php";
const IMGUR_URL: &str = "https://api.imgur.com/3/image";

/// Resolves an album id to a publicly reachable image URL.
#[async_trait]
pub trait CoverResolver {
    async fn resolve(&mut self, album_id: i64) -> Result<String, Error>;
}

/// An image host that turns raw cover bytes into a public URL.
///
/// Adding a host means adding an implementation here and a branch in
/// [`select_host`]; the engine never changes.
#[async_trait]
pub trait ArtHost: Send + Sync {
    fn name(&self) -> &'static str;
    async fn upload(&self, image: Vec<u8>) -> Result<String, Error>;
}

/// Temporary hosting on litterbox: uploads are kept for 72 hours, and the
/// response body is the URL as plain text.
pub struct LitterboxHost {
    http: reqwest::Client,
}

impl LitterboxHost {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ArtHost for LitterboxHost {
    fn name(&self) -> &'static str {
        "litterbox"
    }

    async fn upload(&self, image: Vec<u8>) -> Result<String, Error> {
        let form = reqwest::multipart::Form::new()
            .text("reqtype", "fileupload")
            .text("time", "72h")
            .part(
                "fileToUpload",
                reqwest::multipart::Part::bytes(image).file_name("cover.jpg"),
            );

        let response = self
            .http
            .post(LITTERBOX_URL)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::transport("litterbox upload", e))?;

        if !response.status().is_success() {
            return Err(Error::ImageHostRejected {
                host: self.name(),
                status: response.status(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::decode("litterbox upload", e))?;
        Ok(body.trim().to_string())
    }
}

/// Permanent hosting on imgur, authenticated with a client id.
pub struct ImgurHost {
    http: reqwest::Client,
    client_id: String,
}

impl ImgurHost {
    pub fn new(http: reqwest::Client, client_id: String) -> Self {
        Self { http, client_id }
    }
}

#[derive(Deserialize)]
struct ImgurEnvelope {
    data: ImgurData,
}

#[derive(Deserialize)]
struct ImgurData {
    link: String,
}

#[async_trait]
impl ArtHost for ImgurHost {
    fn name(&self) -> &'static str {
        "imgur"
    }

    async fn upload(&self, image: Vec<u8>) -> Result<String, Error> {
        let form = reqwest::multipart::Form::new().text("type", "file").part(
            "image",
            reqwest::multipart::Part::bytes(image).file_name("cover.jpg"),
        );

        let response = self
            .http
            .post(IMGUR_URL)
            .header("Authorization", format!("Client-ID {}", self.client_id))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::transport("imgur upload", e))?;

        if !response.status().is_success() {
            return Err(Error::ImageHostRejected {
                host: self.name(),
                status: response.status(),
            });
        }

        let envelope: ImgurEnvelope = response
            .json()
            .await
            .map_err(|e| Error::decode("imgur upload", e))?;
        Ok(envelope.data.link)
    }
}

/// Pick the upload backend once, at configuration time. `None` means
/// uploads are disabled and every resolution fails fast.
pub fn select_host(images: &ImagesConfig, http: reqwest::Client) -> Option<Box<dyn ArtHost>> {
    match images.uploader {
        UploaderKind::None => None,
        UploaderKind::Litterbox => Some(Box::new(LitterboxHost::new(http))),
        UploaderKind::Imgur => Some(Box::new(ImgurHost::new(
            http,
            images.imgur_client_id.clone(),
        ))),
    }
}

/// Cover art cache with a pluggable upload backend. Entries are write-once
/// per album id and never evicted; failed resolutions are not cached, so a
/// later attempt retries the upload.
pub struct CoverArt<F> {
    fetch: F,
    host: Option<Box<dyn ArtHost>>,
    cache: HashMap<i64, String>,
}

impl<F: CoverFetch> CoverArt<F> {
    pub fn new(fetch: F, host: Option<Box<dyn ArtHost>>) -> Self {
        Self {
            fetch,
            host,
            cache: HashMap::new(),
        }
    }
}

#[async_trait]
impl<F: CoverFetch> CoverResolver for CoverArt<F> {
    async fn resolve(&mut self, album_id: i64) -> Result<String, Error> {
        let host = self.host.as_ref().ok_or(Error::UploadsDisabled)?;

        if let Some(url) = self.cache.get(&album_id) {
            return Ok(url.clone());
        }

        let image = self.fetch.cover_bytes(album_id).await?;
        let url = host.upload(image).await?;
        tracing::debug!(album_id, host = host.name(), url = %url, "uploaded cover art");

        self.cache.insert(album_id, url.clone());
        Ok(url)
    }
}
