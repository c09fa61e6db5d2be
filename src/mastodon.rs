//! Mastodon REST client.
//!
//! Only the three endpoints a media post needs:
//!
//! ```text
//! POST /api/v2/media           multipart "file"   → 200 (ready) or 202 (processing)
//! GET  /api/v1/media/:id       after a 202        → 206 (processing) or 200
//! POST /api/v1/statuses        status + media_ids → the new status
//! ```
//!
//! Large images and videos are processed asynchronously by the server, so an
//! attachment answered with `202 Accepted` is polled until it is ready before
//! the status referencing it is created.

use crate::poster::{PostError, Poster};
use crate::text::truncate_chars;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response, multipart};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

const MEDIA_POLL_INTERVAL: Duration = Duration::from_secs(1);
const MEDIA_POLL_LIMIT: u32 = 60;
/// Error bodies are cut to this many characters in `PostError::Status`.
const MAX_BODY_CHARS: usize = 200;

/// Who can see the published status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Unlisted,
    Private,
    Direct,
}

#[derive(Debug, Deserialize)]
struct MediaAttachment {
    id: String,
}

#[derive(Debug, Serialize)]
struct NewStatus<'a> {
    status: &'a str,
    #[serde(skip_serializing_if = "no_media")]
    media_ids: &'a [String],
    sensitive: bool,
    visibility: Visibility,
}

fn no_media(ids: &&[String]) -> bool {
    ids.is_empty()
}

pub struct MastodonClient {
    http: Client,
    base_url: String,
    access_token: String,
    visibility: Visibility,
}

impl MastodonClient {
    pub fn new(
        hostname: &str,
        access_token: &str,
        visibility: Visibility,
        timeout: Duration,
    ) -> Result<Self, PostError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url(hostname),
            access_token: access_token.to_string(),
            visibility,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response, PostError> {
        let response = request.bearer_auth(&self.access_token).send()?;
        check_status(endpoint, response)
    }

    fn upload_media(&self, media: &Path) -> Result<String, PostError> {
        let form = multipart::Form::new().file("file", media)?;
        let endpoint = "/api/v2/media";
        let response = self.send(endpoint, self.http.post(self.url(endpoint)).multipart(form))?;
        let processing = response.status() == StatusCode::ACCEPTED;
        let attachment: MediaAttachment = response.json()?;
        debug!(id = %attachment.id, processing, "uploaded {}", media.display());

        if processing {
            self.wait_for_media(&attachment.id)?;
        }
        Ok(attachment.id)
    }

    fn wait_for_media(&self, id: &str) -> Result<(), PostError> {
        let endpoint = format!("/api/v1/media/{id}");
        for _ in 0..MEDIA_POLL_LIMIT {
            thread::sleep(MEDIA_POLL_INTERVAL);
            let response = self.send(&endpoint, self.http.get(self.url(&endpoint)))?;
            if response.status() != StatusCode::PARTIAL_CONTENT
                && response.status() != StatusCode::ACCEPTED
            {
                return Ok(());
            }
            debug!(id, "media still processing");
        }
        Err(PostError::MediaNotReady(id.to_string()))
    }

    fn create_status(
        &self,
        text: &str,
        media_ids: &[String],
        sensitive: bool,
    ) -> Result<(), PostError> {
        let endpoint = "/api/v1/statuses";
        let body = NewStatus {
            status: text,
            media_ids,
            sensitive,
            visibility: self.visibility,
        };
        self.send(endpoint, self.http.post(self.url(endpoint)).json(&body))?;
        info!("status published on {}", self.base_url);
        Ok(())
    }
}

impl Poster for MastodonClient {
    fn post_image(&self, text: &str, media: &Path, sensitive: bool) -> Result<(), PostError> {
        let id = self.upload_media(media)?;
        self.create_status(text, &[id], sensitive)
    }

    fn post_text(&self, text: &str) -> Result<(), PostError> {
        self.create_status(text, &[], false)
    }
}

/// Turn a configured hostname into a base URL: `https://` is assumed when no
/// scheme is given, trailing slashes are dropped.
pub fn base_url(hostname: &str) -> String {
    let host = hostname.trim().trim_end_matches('/');
    if host.starts_with("https://") || host.starts_with("http://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

fn check_status(endpoint: &str, response: Response) -> Result<Response, PostError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(PostError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body: truncate_chars(&body, MAX_BODY_CHARS),
    })
}
